//! # Domain Module
//!
//! Bookkeeping logic of the association: the cash ledger, dues arrears, the
//! arisan lottery, users and categories.
//!
//! Pure components ([`ledger`], [`arrears`], [`lottery`], [`report_filter`])
//! work on typed records and never touch storage. Services wrap them with
//! [`TableRepository`](crate::storage::TableRepository) reads and writes,
//! check the caller's [`SessionContext`] and pass the version they read back
//! to the store on every read-modify-write.

pub mod arrears;
pub mod arrears_service;
pub mod auth;
pub mod category_service;
pub mod dates;
pub mod export_service;
pub mod ids;
pub mod ledger;
pub mod ledger_service;
pub mod lottery;
pub mod lottery_service;
pub mod report_filter;
pub mod session;
pub mod user_service;
pub mod validation;

pub use arrears_service::ArrearsService;
pub use auth::{PasswordVerifier, Sha256Verifier};
pub use category_service::CategoryService;
pub use export_service::ExportService;
pub use ledger_service::{LedgerReport, LedgerService};
pub use lottery_service::{DrawOutcome, LotteryService};
pub use report_filter::DateFilter;
pub use session::SessionContext;
pub use user_service::UserService;
