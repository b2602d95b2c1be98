use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Access level of a registered user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Treasurer / board member, may mutate every table
    Admin,
    /// Regular resident, read-only access
    Resident,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Resident => "resident",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the `users` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique login name
    pub username: String,
    /// Stored credential hash, never sent over the API
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub role: Role,
    /// Name shown in the UI and on receipts
    pub display_name: String,
}

/// Direction of a cash movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Money coming into the association's cash box
    Income,
    /// Money leaving the cash box
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "Income",
            TransactionType::Expense => "Expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the `transaksi` (cash ledger) table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Short random token, unique within the table
    pub id: String,
    /// Entry date as written by the collaborator (usually `YYYY-MM-DD`)
    pub date: String,
    pub transaction_type: TransactionType,
    /// Soft reference to a category name
    pub category: String,
    /// Non-negative amount, direction is given by `transaction_type`
    pub amount: f64,
    pub note: String,
    /// Username of the admin who recorded the entry
    pub entered_by: String,
    /// Opaque reference to an uploaded receipt, `-` when absent
    pub attachment_ref: String,
}

/// A row of the `kategori` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Empty for categories that have not been persisted yet
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub category_type: TransactionType,
}

/// Payment state of a dues record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrearsStatus {
    Unpaid,
    Paid,
}

impl ArrearsStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArrearsStatus::Unpaid => "Unpaid",
            ArrearsStatus::Paid => "Paid",
        }
    }
}

/// A row of the `tunggakan` (dues arrears) table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrearsRecord {
    /// Empty for records added during a bulk edit; an id is assigned on save
    #[serde(default)]
    pub id: String,
    pub resident_name: String,
    /// Free-text billing period label, e.g. "January 2026"
    pub period: String,
    pub amount: f64,
    pub status: ArrearsStatus,
}

/// A row of the `arisan_peserta` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotteryParticipant {
    pub id: String,
    pub resident_name: String,
    /// Whether this participant already received the pot in the current round
    pub has_won: bool,
}

/// A row of the `arisan_bayar` table. The stored status is always "Paid".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotteryPayment {
    pub id: String,
    pub resident_name: String,
    pub period: String,
    pub amount: f64,
    pub paid_date: String,
}

/// Lottery round state derived from the participant set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    /// At least one participant has not won yet
    InRound,
    /// Everyone has won; the next draw starts a new round
    RoundExhausted,
}

/// Period granularity for ledger grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    #[default]
    Month,
    Year,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LedgerTotals {
    pub income: f64,
    pub expense: f64,
}

/// Income and expense sums of one period. Both are always present.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PeriodTotals {
    pub income: f64,
    pub expense: f64,
}

// ---------------------------------------------------------------------------
// Session / users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub username: String,
    pub role: Role,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token to send in the `Authorization` header
    pub token: String,
    pub session: SessionInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedAdminResponse {
    pub created: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub display_name: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<User>,
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryListResponse {
    pub categories: Vec<Category>,
    /// Table version the list was read at, echo it back when replacing
    pub version: u64,
    /// Type filter the list was made with, echo it back when replacing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_type: Option<TransactionType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplaceCategoriesRequest {
    pub categories: Vec<Category>,
    pub version: Option<u64>,
    /// When set, only categories of this type are replaced
    #[serde(default)]
    pub category_type: Option<TransactionType>,
}

/// Category names offered when entering a transaction of one type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryNamesResponse {
    pub category_type: TransactionType,
    pub names: Vec<String>,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTransactionRequest {
    /// Defaults to today's date when absent
    pub date: Option<String>,
    pub transaction_type: TransactionType,
    pub category: String,
    pub amount: f64,
    #[serde(default)]
    pub note: String,
    pub attachment_ref: Option<String>,
}

/// Partial edit of a transaction; absent fields keep their current value
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateTransactionRequest {
    pub date: Option<String>,
    pub transaction_type: Option<TransactionType>,
    pub category: Option<String>,
    pub amount: Option<f64>,
    pub note: Option<String>,
    pub attachment_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<Transaction>,
    pub totals: LedgerTotals,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummaryResponse {
    pub balance: f64,
    pub totals: LedgerTotals,
    pub granularity: Granularity,
    pub periods: BTreeMap<String, PeriodTotals>,
}

// ---------------------------------------------------------------------------
// Arrears
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateArrearsRequest {
    pub resident_name: String,
    pub period: String,
    pub amount: f64,
    /// Defaults to `Unpaid`
    pub status: Option<ArrearsStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrearsListResponse {
    pub records: Vec<ArrearsRecord>,
    pub outstanding_total: f64,
    pub version: u64,
    /// Period filter the list was made with, echo it back when editing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkEditArrearsRequest {
    /// The complete edited listing, not a diff
    pub records: Vec<ArrearsRecord>,
    /// Version of the list the edit started from
    pub version: Option<u64>,
    /// Period filter of that list; rows outside it are left alone
    #[serde(default)]
    pub period: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkEditArrearsResponse {
    pub version: u64,
    pub outstanding_total: f64,
}

// ---------------------------------------------------------------------------
// Lottery (arisan)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateParticipantRequest {
    pub resident_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantListResponse {
    pub participants: Vec<LotteryParticipant>,
    pub round_state: RoundState,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawResponse {
    pub winner: String,
    /// True when the pool was exhausted and a new round started with this draw
    pub round_reset: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResetRoundResponse {
    pub participants_reset: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePaymentRequest {
    pub resident_name: String,
    pub period: String,
    pub amount: f64,
    /// Defaults to today's date when absent
    pub paid_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentListResponse {
    pub payments: Vec<LotteryPayment>,
    pub total_amount: f64,
}

// ---------------------------------------------------------------------------
// Generic responses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub deleted_count: usize,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
