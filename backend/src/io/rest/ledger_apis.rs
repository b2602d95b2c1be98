//! # REST API for Ledger Summaries

use super::error::ApiResult;
use super::session::CurrentSession;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use shared::{Granularity, LedgerSummaryResponse};
use tracing::info;

pub fn router() -> Router<AppState> {
    Router::new().route("/summary", get(get_summary))
}

#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub granularity: Option<Granularity>,
}

/// Balance, totals and per-period sums for the dashboard
pub async fn get_summary(
    State(state): State<AppState>,
    _session: CurrentSession,
    Query(query): Query<SummaryQuery>,
) -> ApiResult<Json<LedgerSummaryResponse>> {
    info!("GET /api/ledger/summary - query: {:?}", query);
    let summary = state
        .ledger_service
        .summary(query.granularity.unwrap_or_default())
        .await?;
    Ok(Json(summary))
}
