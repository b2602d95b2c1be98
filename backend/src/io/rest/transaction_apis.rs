//! # REST API for the Cash Ledger
//!
//! List, record, edit and delete transactions.

use super::error::ApiResult;
use super::query::DateQuery;
use super::session::CurrentSession;
use crate::domain::ledger::{balance, totals};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use shared::{
    CreateTransactionRequest, DeleteResponse, Transaction, TransactionListResponse,
    UpdateTransactionRequest,
};
use tracing::info;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_transactions).post(create_transaction))
        .route("/:id", put(update_transaction).delete(delete_transaction))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    _session: CurrentSession,
    Query(query): Query<DateQuery>,
) -> ApiResult<Json<TransactionListResponse>> {
    info!("GET /api/transactions - query: {:?}", query);
    let filter = query.to_filter()?;
    let transactions = state.ledger_service.list(&filter).await?;
    Ok(Json(TransactionListResponse {
        totals: totals(&transactions),
        balance: balance(&transactions),
        transactions,
    }))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(request): Json<CreateTransactionRequest>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    info!("POST /api/transactions - request: {:?}", request);
    let transaction = state.ledger_service.record(&session.ctx, request).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn update_transaction(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<String>,
    Json(request): Json<UpdateTransactionRequest>,
) -> ApiResult<Json<Transaction>> {
    info!("PUT /api/transactions/{} - request: {:?}", id, request);
    let transaction = state.ledger_service.edit(&session.ctx, &id, request).await?;
    Ok(Json(transaction))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    info!("DELETE /api/transactions/{}", id);
    let deleted_count = state.ledger_service.delete(&session.ctx, &id).await?;
    Ok(Json(DeleteResponse {
        deleted_count,
        success_message: format!("Transaction {id} deleted"),
    }))
}
