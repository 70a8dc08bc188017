use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    ingest,
    query::{self, ListParams},
    state,
};
use store::{ANALYTICS, VISITORS};

/// POST `/api/visitors` and POST `/api/analytics-events` share one handler;
/// the payload itself decides which record kind is created.
pub async fn create_handler(
    State(state): State<Arc<state::State>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload = ingest::parse_payload(&body);

    #[cfg(feature = "verbose")]
    println!("Create payload: {payload:?}");

    let record = ingest::create(state.store.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list_visitors_handler(
    State(state): State<Arc<state::State>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let envelope = query::list(state.store.as_ref(), VISITORS, params).await?;
    Ok(Json(envelope))
}

pub async fn list_analytics_handler(
    State(state): State<Arc<state::State>>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let envelope = query::list(state.store.as_ref(), ANALYTICS, params).await?;
    Ok(Json(envelope))
}

/// Every `/api/*` path answers OPTIONS with a bare 200; the CORS layer
/// attaches the headers.
pub async fn options_handler() -> StatusCode {
    StatusCode::OK
}

/// Preflight requests to unrouted paths still answer 200 so the browser
/// never blocks a tracking call; anything else is a JSON 404.
pub async fn fallback_handler(method: Method, uri: Uri) -> impl IntoResponse {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    let body = Json(json!({
        "error": "Not found",
        "path": uri.path(),
    }));
    (StatusCode::NOT_FOUND, body).into_response()
}
