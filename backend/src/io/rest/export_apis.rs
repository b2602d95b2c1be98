//! # REST API for Data Export
//!
//! CSV downloads for the ledger, arrears and lottery payments.

use super::error::ApiResult;
use super::query::{DateQuery, PeriodQuery};
use super::session::CurrentSession;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::Utc;
use tracing::info;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/transactions.csv", get(export_transactions_csv))
        .route("/arrears.csv", get(export_arrears_csv))
        .route("/lottery.csv", get(export_lottery_csv))
}

fn csv_response(filename: String, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

pub async fn export_transactions_csv(
    State(state): State<AppState>,
    _session: CurrentSession,
    Query(query): Query<DateQuery>,
) -> ApiResult<Response> {
    info!("GET /api/export/transactions.csv - query: {:?}", query);
    let report = state.ledger_service.report(&query.to_filter()?).await?;
    let body = state.export_service.ledger_csv(&report)?;
    let filename = state.export_service.filename("transactions", report.generated_at);
    Ok(csv_response(filename, body))
}

pub async fn export_arrears_csv(
    State(state): State<AppState>,
    _session: CurrentSession,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Response> {
    info!("GET /api/export/arrears.csv - query: {:?}", query);
    let snapshot = state.arrears_service.list(query.period.as_deref()).await?;
    let body = state.export_service.records_csv(&snapshot.records)?;
    let filename = state.export_service.filename("arrears", Utc::now());
    Ok(csv_response(filename, body))
}

pub async fn export_lottery_csv(
    State(state): State<AppState>,
    _session: CurrentSession,
    Query(query): Query<DateQuery>,
) -> ApiResult<Response> {
    info!("GET /api/export/lottery.csv - query: {:?}", query);
    let (payments, _) = state
        .lottery_service
        .list_payments(&query.to_filter()?)
        .await?;
    let body = state.export_service.records_csv(&payments)?;
    let filename = state.export_service.filename("lottery", Utc::now());
    Ok(csv_response(filename, body))
}
