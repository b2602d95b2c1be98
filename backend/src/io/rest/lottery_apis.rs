//! # REST API for the Arisan Lottery
//!
//! Participants, draws, round resets and contribution payments.

use super::error::ApiResult;
use super::query::DateQuery;
use super::session::CurrentSession;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use shared::{
    CreateParticipantRequest, CreatePaymentRequest, DeleteResponse, DrawResponse,
    LotteryParticipant, LotteryPayment, ParticipantListResponse, PaymentListResponse,
    ResetRoundResponse,
};
use tracing::info;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/participants", get(list_participants).post(create_participant))
        .route("/draw", post(draw))
        .route("/reset", post(reset_round))
        .route("/payments", get(list_payments).post(create_payment))
        .route("/payments/:id", delete(delete_payment))
}

pub async fn list_participants(
    State(state): State<AppState>,
    _session: CurrentSession,
) -> ApiResult<Json<ParticipantListResponse>> {
    info!("GET /api/lottery/participants");
    let (participants, round_state) = state.lottery_service.list_participants().await?;
    Ok(Json(ParticipantListResponse {
        participants,
        round_state,
    }))
}

pub async fn create_participant(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(request): Json<CreateParticipantRequest>,
) -> ApiResult<(StatusCode, Json<LotteryParticipant>)> {
    info!("POST /api/lottery/participants - request: {:?}", request);
    let participant = state
        .lottery_service
        .add_participant(&session.ctx, request)
        .await?;
    Ok((StatusCode::CREATED, Json(participant)))
}

pub async fn draw(
    State(state): State<AppState>,
    session: CurrentSession,
) -> ApiResult<Json<DrawResponse>> {
    info!("POST /api/lottery/draw");
    let outcome = state.lottery_service.draw(&session.ctx).await?;
    Ok(Json(DrawResponse {
        winner: outcome.winner.resident_name,
        round_reset: outcome.round_reset,
    }))
}

pub async fn reset_round(
    State(state): State<AppState>,
    session: CurrentSession,
) -> ApiResult<Json<ResetRoundResponse>> {
    info!("POST /api/lottery/reset");
    let participants_reset = state.lottery_service.reset_round(&session.ctx).await?;
    Ok(Json(ResetRoundResponse { participants_reset }))
}

pub async fn list_payments(
    State(state): State<AppState>,
    _session: CurrentSession,
    Query(query): Query<DateQuery>,
) -> ApiResult<Json<PaymentListResponse>> {
    info!("GET /api/lottery/payments - query: {:?}", query);
    let filter = query.to_filter()?;
    let (payments, total_amount) = state.lottery_service.list_payments(&filter).await?;
    Ok(Json(PaymentListResponse {
        payments,
        total_amount,
    }))
}

pub async fn create_payment(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(request): Json<CreatePaymentRequest>,
) -> ApiResult<(StatusCode, Json<LotteryPayment>)> {
    info!("POST /api/lottery/payments - request: {:?}", request);
    let payment = state
        .lottery_service
        .record_payment(&session.ctx, request)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn delete_payment(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    info!("DELETE /api/lottery/payments/{}", id);
    let deleted_count = state
        .lottery_service
        .delete_payment(&session.ctx, &id)
        .await?;
    Ok(Json(DeleteResponse {
        deleted_count,
        success_message: format!("Lottery payment {id} deleted"),
    }))
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::TestApp;
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_draw_on_empty_pool_is_422() {
        let app = TestApp::new().await;
        let token = app.admin_token().await;
        let (status, body) = app.json(Method::POST, "/api/lottery/draw", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "no_participants");
    }

    #[tokio::test]
    async fn test_round_over_http() {
        let app = TestApp::new().await;
        let token = app.admin_token().await;
        for name in ["A", "B", "C"] {
            let (status, _) = app
                .json(
                    Method::POST,
                    "/api/lottery/participants",
                    Some(&token),
                    Some(json!({ "resident_name": name })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let mut winners = HashSet::new();
        for _ in 0..3 {
            let (status, body) = app.json(Method::POST, "/api/lottery/draw", Some(&token), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body["round_reset"], false);
            winners.insert(body["winner"].as_str().unwrap().to_string());
        }
        assert_eq!(winners.len(), 3);

        let (_, body) = app
            .json(Method::GET, "/api/lottery/participants", Some(&token), None)
            .await;
        assert_eq!(body["round_state"], "RoundExhausted");

        let (_, body) = app.json(Method::POST, "/api/lottery/draw", Some(&token), None).await;
        assert_eq!(body["round_reset"], true);

        let (_, body) = app.json(Method::POST, "/api/lottery/reset", Some(&token), None).await;
        assert_eq!(body["participants_reset"], 3);
    }

    #[tokio::test]
    async fn test_payments() {
        let app = TestApp::new().await;
        let token = app.admin_token().await;
        let (status, created) = app
            .json(
                Method::POST,
                "/api/lottery/payments",
                Some(&token),
                Some(json!({
                    "resident_name": "Bu Ani",
                    "period": "Arisan Januari 2026",
                    "amount": 100000.0,
                    "paid_date": "2026-01-12"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, body) = app
            .json(Method::GET, "/api/lottery/payments?month=1&year=2026", Some(&token), None)
            .await;
        assert_eq!(body["total_amount"], 100000.0);

        let id = created["id"].as_str().unwrap();
        let (status, _) = app
            .json(Method::DELETE, &format!("/api/lottery/payments/{id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}
