//! # REST API for Sessions
//!
//! Login, logout and first-run admin seeding.

use super::error::ApiResult;
use super::session::CurrentSession;
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use shared::{LoginRequest, LoginResponse, SeedAdminResponse};
use tracing::info;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/seed-admin", post(seed_admin))
}

pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    info!("POST /api/auth/login - username: {}", request.username);
    let ctx = state
        .user_service
        .authenticate(&request.username, &request.password)
        .await?;
    let session = ctx.to_info();
    let token = state.sessions.open(ctx).await;
    Ok(Json(LoginResponse { token, session }))
}

pub async fn logout(State(state): State<AppState>, session: CurrentSession) -> StatusCode {
    info!("POST /api/auth/logout - username: {}", session.ctx.username);
    state.sessions.close(&session.token).await;
    StatusCode::NO_CONTENT
}

pub async fn seed_admin(State(state): State<AppState>) -> ApiResult<Json<SeedAdminResponse>> {
    info!("POST /api/auth/seed-admin");
    let created = state
        .user_service
        .ensure_seed_admin(&state.config.seed_admin)
        .await?;
    let message = if created {
        format!("Admin '{}' created", state.config.seed_admin.username)
    } else {
        "Users already exist, nothing to do".to_string()
    };
    Ok(Json(SeedAdminResponse { created, message }))
}
