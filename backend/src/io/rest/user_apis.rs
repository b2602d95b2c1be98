//! # REST API for Users

use super::error::ApiResult;
use super::session::CurrentSession;
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use shared::{CreateUserRequest, User, UserListResponse};
use tracing::info;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_users).post(create_user))
}

pub async fn list_users(
    State(state): State<AppState>,
    session: CurrentSession,
) -> ApiResult<Json<UserListResponse>> {
    info!("GET /api/users");
    let users = state.user_service.list(&session.ctx).await?;
    Ok(Json(UserListResponse { users }))
}

pub async fn create_user(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(request): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    info!("POST /api/users - username: {}", request.username);
    let user = state.user_service.register(&session.ctx, request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::TestApp;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_residents_cannot_list_users() {
        let app = TestApp::new().await;
        let resident = app.resident_token().await;
        let (status, body) = app.json(Method::GET, "/api/users", Some(&resident), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");

        let admin = app.admin_token().await;
        let (status, body) = app.json(Method::GET, "/api/users", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        let users = body["users"].as_array().unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.iter().all(|u| u.get("password_hash").is_none()));
    }
}
