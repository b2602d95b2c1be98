//! # REST API for Dues Arrears
//!
//! The bulk edit endpoint takes the complete listing as shown to the
//! reviewer together with the version and period filter it was listed at.
//! Rows outside that filter are not touched by the edit.

use super::error::ApiResult;
use super::query::PeriodQuery;
use super::session::CurrentSession;
use crate::domain::arrears::outstanding_total;
use crate::storage::Version;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use shared::{
    ArrearsListResponse, ArrearsRecord, BulkEditArrearsRequest, BulkEditArrearsResponse,
    CreateArrearsRequest, DeleteResponse,
};
use tracing::info;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_arrears).post(create_arrears).put(bulk_edit_arrears))
        .route("/:id", delete(delete_arrears))
}

/// Records matching `?period=`; the outstanding total covers the listed records
pub async fn list_arrears(
    State(state): State<AppState>,
    _session: CurrentSession,
    Query(query): Query<PeriodQuery>,
) -> ApiResult<Json<ArrearsListResponse>> {
    info!("GET /api/arrears - query: {:?}", query);
    let period = query.period.filter(|p| !p.trim().is_empty());
    let snapshot = state.arrears_service.list(period.as_deref()).await?;
    Ok(Json(ArrearsListResponse {
        outstanding_total: outstanding_total(&snapshot.records),
        records: snapshot.records,
        version: snapshot.version.0,
        period,
    }))
}

pub async fn create_arrears(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(request): Json<CreateArrearsRequest>,
) -> ApiResult<(StatusCode, Json<ArrearsRecord>)> {
    info!("POST /api/arrears - request: {:?}", request);
    let record = state.arrears_service.add(&session.ctx, request).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn bulk_edit_arrears(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(request): Json<BulkEditArrearsRequest>,
) -> ApiResult<Json<BulkEditArrearsResponse>> {
    info!(
        "PUT /api/arrears - {} records at version {:?}, period {:?}",
        request.records.len(),
        request.version,
        request.period
    );
    let (version, outstanding_total) = state
        .arrears_service
        .bulk_edit(
            &session.ctx,
            request.records,
            request.version.map(Version),
            request.period.as_deref(),
        )
        .await?;
    Ok(Json(BulkEditArrearsResponse {
        version: version.0,
        outstanding_total,
    }))
}

pub async fn delete_arrears(
    State(state): State<AppState>,
    session: CurrentSession,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    info!("DELETE /api/arrears/{}", id);
    let deleted_count = state.arrears_service.delete(&session.ctx, &id).await?;
    Ok(Json(DeleteResponse {
        deleted_count,
        success_message: format!("Arrears record {id} deleted"),
    }))
}

#[cfg(test)]
mod tests {
    use super::super::test_utils::TestApp;
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    async fn add(app: &TestApp, token: &str, name: &str, period: &str, amount: f64, status: &str) {
        let (code, body) = app
            .json(
                Method::POST,
                "/api/arrears",
                Some(token),
                Some(json!({
                    "resident_name": name,
                    "period": period,
                    "amount": amount,
                    "status": status
                })),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED, "{body}");
    }

    #[tokio::test]
    async fn test_bulk_edit_flow() {
        let app = TestApp::new().await;
        let token = app.admin_token().await;
        add(&app, &token, "Pak Budi", "January 2026", 50000.0, "Unpaid").await;
        add(&app, &token, "Bu Ani", "January 2026", 30000.0, "Paid").await;
        add(&app, &token, "Pak Joko", "February 2026", 20000.0, "Unpaid").await;

        let (_, listed) = app.json(Method::GET, "/api/arrears", Some(&token), None).await;
        assert_eq!(listed["outstanding_total"], 70000.0);

        let mut records: Vec<Value> = listed["records"].as_array().unwrap().clone();
        records[0]["status"] = json!("Paid");
        let edit = json!({ "records": records, "version": listed["version"] });

        let (status, body) = app
            .json(Method::PUT, "/api/arrears", Some(&token), Some(edit.clone()))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["outstanding_total"], 20000.0);

        // Same edit again: the version moved on, so it must be re-listed first.
        let (status, _) = app
            .json(Method::PUT, "/api/arrears", Some(&token), Some(edit))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_saving_filtered_listing_keeps_hidden_rows() {
        let app = TestApp::new().await;
        let token = app.admin_token().await;
        add(&app, &token, "Pak Budi", "January 2026", 50000.0, "Unpaid").await;
        add(&app, &token, "Bu Ani", "January 2026", 30000.0, "Paid").await;
        add(&app, &token, "Pak Joko", "February 2026", 20000.0, "Unpaid").await;

        let (_, listed) = app
            .json(Method::GET, "/api/arrears?period=january", Some(&token), None)
            .await;
        assert_eq!(listed["period"], "january");
        let mut records: Vec<Value> = listed["records"].as_array().unwrap().clone();
        assert_eq!(records.len(), 2);
        records[0]["status"] = json!("Paid");

        let edit = json!({
            "records": records,
            "version": listed["version"],
            "period": listed["period"]
        });
        let (status, body) = app
            .json(Method::PUT, "/api/arrears", Some(&token), Some(edit))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["outstanding_total"], 20000.0);

        let (_, all) = app.json(Method::GET, "/api/arrears", Some(&token), None).await;
        assert_eq!(all["records"].as_array().unwrap().len(), 3);
        assert!(all.get("period").is_none());
    }

    #[tokio::test]
    async fn test_period_filter_and_delete() {
        let app = TestApp::new().await;
        let token = app.admin_token().await;
        add(&app, &token, "Pak Budi", "January 2026", 10.0, "Unpaid").await;
        add(&app, &token, "Bu Ani", "March 2026", 20.0, "Unpaid").await;

        let (_, body) = app
            .json(Method::GET, "/api/arrears?period=march", Some(&token), None)
            .await;
        let records = body["records"].as_array().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(body["outstanding_total"], 20.0);

        let id = records[0]["id"].as_str().unwrap();
        let (status, _) = app
            .json(Method::DELETE, &format!("/api/arrears/{id}"), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = app.json(Method::GET, "/api/arrears", Some(&token), None).await;
        assert_eq!(body["records"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_residents_read_only() {
        let app = TestApp::new().await;
        let resident = app.resident_token().await;
        let (status, _) = app.json(Method::GET, "/api/arrears", Some(&resident), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = app
            .json(
                Method::PUT,
                "/api/arrears",
                Some(&resident),
                Some(json!({ "records": [], "version": 0 })),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
