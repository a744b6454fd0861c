use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};
use trending_core::{application::TOP_N, refresh::RefreshAck};

use crate::{
    config::AccessMode,
    error::AppError,
    session::{expired_cookie, session_cookie},
    state::AppState,
};

#[derive(Deserialize)]
pub struct QueryParams {
    query: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    is_logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
}

/// Rejects the request when the gate is on and the caller has no session.
/// Runs before any core service is touched.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    if state.config.access == AccessMode::Gated && !state.sessions.is_authenticated(headers) {
        warn!("Rejected unauthenticated request");
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

/// Runs blocking core work (file reads, subprocesses) off the async workers.
async fn blocking<T, F>(state: &Arc<AppState>, work: F) -> Result<T, AppError>
where
    F: FnOnce(&AppState) -> trending_core::ports::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || work(&state))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .map_err(AppError::from)
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<QueryParams>,
) -> Response {
    if let Err(e) = authorize(&state, &headers) {
        return e.into_response();
    }

    let query = params.query.unwrap_or_default();
    let lowered = query.to_lowercase();

    match blocking(&state, move |state| state.queries.search(&query)).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(AppError::DataUnavailable) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": AppError::DataUnavailable.to_string(),
                "results": [],
                "not_found": true,
                "query": lowered,
            })),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

pub async fn scrape_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = params
        .query
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::Validation("Query is required".to_string()))?;

    let results = blocking(&state, move |state| state.scraper.scrape(&query))
        .await
        .map_err(|e| {
            warn!("Live search failed: {e}");
            e
        })?;

    Ok(Json(json!({ "results": results })))
}

pub async fn refresh_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    authorize(&state, &headers)?;

    let message = match state
        .refresh
        .trigger(&state.config.region, state.config.refresh_limit)
    {
        RefreshAck::Scheduled => "Trending data refresh initiated!",
        RefreshAck::AlreadyRunning => "Trending data refresh already in progress",
    };

    Ok((StatusCode::ACCEPTED, Json(json!({ "message": message }))))
}

pub async fn videos_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    authorize(&state, &headers)?;
    let videos = blocking(&state, |state| state.queries.list_videos()).await?;
    Ok(Json(videos))
}

pub async fn graph_data_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    authorize(&state, &headers)?;
    let chart = blocking(&state, |state| state.queries.top_by_views(TOP_N)).await?;
    Ok(Json(chart))
}

pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(login) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    if !state
        .config
        .credentials
        .matches(&login.username, &login.password)
    {
        warn!("Invalid login attempt for {}", login.username);
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid credentials" })),
        )
            .into_response());
    }

    let id = state.sessions.create(&login.username);
    info!("{} logged in", login.username);

    Ok((
        [(SET_COOKIE, session_cookie(&id))],
        Json(json!({ "message": "Login successful", "user": login.username })),
    )
        .into_response())
}

pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(user) = state.sessions.end(&headers) {
        info!("{user} logged out");
    }

    (
        [(SET_COOKIE, expired_cookie())],
        Json(json!({ "message": "Logged out successfully" })),
    )
}

pub async fn check_session_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let user = state.sessions.user(&headers);
    Json(SessionStatus {
        is_logged_in: user.is_some(),
        user,
    })
}
