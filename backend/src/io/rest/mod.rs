//! # REST API Interface Layer
//!
//! HTTP endpoints over the domain services. Handlers only translate: they
//! extract the caller's session, deserialize the request, call one service
//! operation and map its error through [`ApiError`](error::ApiError).
//!
//! Every route except login and admin seeding needs an
//! `Authorization: Bearer <token>` header obtained from `/api/auth/login`.

pub mod arrears_apis;
pub mod auth_apis;
pub mod category_apis;
pub mod error;
pub mod export_apis;
pub mod ledger_apis;
pub mod lottery_apis;
pub mod query;
pub mod session;
pub mod transaction_apis;
pub mod user_apis;

#[cfg(test)]
mod test_utils;

pub use error::{ApiError, ApiResult};
pub use session::{CurrentSession, SessionRegistry};
