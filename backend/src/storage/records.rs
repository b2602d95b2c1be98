//! Typed records at the RecordStore boundary.
//!
//! Everything in the backend is text. This module is the only place where rows
//! are parsed into entities and encoded back; the domain never sees a [`Row`].
//! Parsing is total: malformed amounts become `0` and unknown enum labels fall
//! back to the negative/default member, so a report over a messy table never
//! fails.

use super::traits::{Row, Table};
use shared::{
    ArrearsRecord, ArrearsStatus, Category, LotteryParticipant, LotteryPayment, Role, Transaction,
    TransactionType, User,
};
use tracing::warn;

/// Stored status of every lottery payment row
pub const PAYMENT_STATUS_PAID: &str = "Paid";

/// Placeholder written when a transaction has no attachment
pub const NO_ATTACHMENT: &str = "-";

/// An entity stored as one row of a known table
pub trait TableRecord: Sized + Clone + Send + Sync + 'static {
    const TABLE: Table;
    /// Field that uniquely identifies a row
    const KEY_FIELD: &'static str = "id";

    fn key(&self) -> &str;
    fn from_row(row: &Row) -> Self;
    fn to_row(&self) -> Row;
}

/// Parse an amount field, coercing anything that is not a finite,
/// non-negative number to `0`.
pub fn coerce_amount(table: Table, key: &str, raw: &str) -> f64 {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => value,
        _ => {
            warn!(
                table = %table,
                key,
                raw,
                "malformed amount coerced to 0"
            );
            0.0
        }
    }
}

pub fn format_amount(amount: f64) -> String {
    amount.to_string()
}

/// Unknown labels read as `Expense`
pub fn parse_transaction_type(raw: &str) -> TransactionType {
    match raw.trim() {
        "Income" | "Pemasukan" => TransactionType::Income,
        _ => TransactionType::Expense,
    }
}

/// Only an explicit unpaid label counts as unpaid
pub fn parse_arrears_status(raw: &str) -> ArrearsStatus {
    match raw.trim() {
        "Unpaid" | "Belum Lunas" => ArrearsStatus::Unpaid,
        _ => ArrearsStatus::Paid,
    }
}

pub fn parse_has_won(raw: &str) -> bool {
    matches!(raw.trim(), "Yes" | "Sudah")
}

pub fn format_has_won(has_won: bool) -> &'static str {
    if has_won {
        "Yes"
    } else {
        "No"
    }
}

/// Anything but `admin` gets the least privileged role
pub fn parse_role(raw: &str) -> Role {
    if raw.trim().eq_ignore_ascii_case("admin") {
        Role::Admin
    } else {
        Role::Resident
    }
}

impl TableRecord for User {
    const TABLE: Table = Table::Users;
    const KEY_FIELD: &'static str = "username";

    fn key(&self) -> &str {
        &self.username
    }

    fn from_row(row: &Row) -> Self {
        User {
            username: row.text("username").trim().to_string(),
            password_hash: row.text("passwordHash").trim().to_string(),
            role: parse_role(row.text("role")),
            display_name: row.text("displayName").to_string(),
        }
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("username", self.username.as_str())
            .with("passwordHash", self.password_hash.as_str())
            .with("role", self.role.as_str())
            .with("displayName", self.display_name.as_str())
    }
}

impl TableRecord for Category {
    const TABLE: Table = Table::Categories;

    fn key(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row) -> Self {
        Category {
            id: row.text("id").to_string(),
            name: row.text("name").to_string(),
            category_type: parse_transaction_type(row.text("type")),
        }
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("id", self.id.as_str())
            .with("name", self.name.as_str())
            .with("type", self.category_type.as_str())
    }
}

impl TableRecord for Transaction {
    const TABLE: Table = Table::Transactions;

    fn key(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row) -> Self {
        let id = row.text("id").to_string();
        let amount = coerce_amount(Self::TABLE, &id, row.text("amount"));
        let attachment_ref = match row.text("attachmentRef").trim() {
            "" => NO_ATTACHMENT.to_string(),
            other => other.to_string(),
        };
        Transaction {
            date: row.text("date").trim().to_string(),
            transaction_type: parse_transaction_type(row.text("type")),
            category: row.text("category").to_string(),
            amount,
            note: row.text("note").to_string(),
            entered_by: row.text("enteredBy").to_string(),
            attachment_ref,
            id,
        }
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("id", self.id.as_str())
            .with("date", self.date.as_str())
            .with("type", self.transaction_type.as_str())
            .with("category", self.category.as_str())
            .with("amount", format_amount(self.amount))
            .with("note", self.note.as_str())
            .with("enteredBy", self.entered_by.as_str())
            .with("attachmentRef", self.attachment_ref.as_str())
    }
}

impl TableRecord for ArrearsRecord {
    const TABLE: Table = Table::Arrears;

    fn key(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row) -> Self {
        let id = row.text("id").to_string();
        ArrearsRecord {
            amount: coerce_amount(Self::TABLE, &id, row.text("amount")),
            resident_name: row.text("residentName").to_string(),
            period: row.text("period").to_string(),
            status: parse_arrears_status(row.text("status")),
            id,
        }
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("id", self.id.as_str())
            .with("residentName", self.resident_name.as_str())
            .with("period", self.period.as_str())
            .with("amount", format_amount(self.amount))
            .with("status", self.status.as_str())
    }
}

impl TableRecord for LotteryParticipant {
    const TABLE: Table = Table::LotteryParticipants;

    fn key(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row) -> Self {
        LotteryParticipant {
            id: row.text("id").to_string(),
            resident_name: row.text("residentName").to_string(),
            has_won: parse_has_won(row.text("hasWon")),
        }
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("id", self.id.as_str())
            .with("residentName", self.resident_name.as_str())
            .with("hasWon", format_has_won(self.has_won))
    }
}

impl TableRecord for LotteryPayment {
    const TABLE: Table = Table::LotteryPayments;

    fn key(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row) -> Self {
        let id = row.text("id").to_string();
        LotteryPayment {
            amount: coerce_amount(Self::TABLE, &id, row.text("amount")),
            resident_name: row.text("residentName").to_string(),
            period: row.text("period").to_string(),
            paid_date: row.text("paidDate").trim().to_string(),
            id,
        }
    }

    fn to_row(&self) -> Row {
        Row::new()
            .with("id", self.id.as_str())
            .with("residentName", self.resident_name.as_str())
            .with("period", self.period.as_str())
            .with("amount", format_amount(self.amount))
            .with("status", PAYMENT_STATUS_PAID)
            .with("paidDate", self.paid_date.as_str())
    }
}
