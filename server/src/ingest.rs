//! # Ingestion
//!
//! One handler accepts every creation payload. The kind is decided by the
//! presence of an event type: payloads carrying one become analytics events,
//! everything else creates a visitor. Older tracking scripts drifted between
//! camelCase and snake_case field names, so both spellings are accepted at
//! the deserialization boundary and normalized into one canonical record.
//!
//! Ids and `created_at` are always server-generated; a client-supplied
//! `timestamp` is accepted only on events, as an override of "now".
use serde::Deserialize;
use serde_json::{Value, json};
use store::records::{AnalyticsEvent, Visitor, new_id, now_iso};
use store::{ANALYTICS, ListQuery, RecordStore, StoreError, VISITORS};
use tracing::{info, warn};

pub const PAGE_VISIT: &str = "page_visit";

/// Canonical creation payload across all clients.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IngestPayload {
    #[serde(rename = "eventType", alias = "event_type")]
    pub event_type: Option<String>,
    #[serde(rename = "visitorToken", alias = "visitor_token")]
    pub visitor_token: Option<String>,
    pub visitor_email: Option<String>,
    #[serde(rename = "data", alias = "event_data")]
    pub data: Option<Value>,
    pub page_url: Option<String>,
    pub session_id: Option<String>,
    pub user_agent: Option<String>,
    pub timestamp: Option<String>,

    pub email: Option<String>,
    pub token: Option<String>,
    pub name: Option<String>,
    pub company: Option<String>,
    pub status: Option<String>,
}

/// Parses a request body. Malformed or empty JSON yields an empty payload,
/// which downstream turns into a visitor with defaulted fields; tracking
/// requests are never rejected over a bad body.
pub fn parse_payload(body: &[u8]) -> IngestPayload {
    if body.is_empty() {
        return IngestPayload::default();
    }
    serde_json::from_slice(body).unwrap_or_default()
}

pub async fn create(
    store: &dyn RecordStore,
    mut payload: IngestPayload,
) -> Result<Value, StoreError> {
    match payload.event_type.take().filter(|t| !t.is_empty()) {
        Some(event_type) => create_event(store, event_type, payload).await,
        None => create_visitor(store, payload).await,
    }
}

async fn create_visitor(
    store: &dyn RecordStore,
    payload: IngestPayload,
) -> Result<Value, StoreError> {
    let visitor = Visitor {
        id: new_id("visitor"),
        email: payload.email.unwrap_or_default(),
        token: payload.token.unwrap_or_default(),
        name: payload.name.unwrap_or_default(),
        company: payload.company.unwrap_or_default(),
        status: payload.status.unwrap_or_else(|| "active".to_string()),
        access_count: 0,
        first_access: None,
        last_access: None,
        created_at: now_iso(),
    };

    let saved = store
        .insert(VISITORS, serde_json::to_value(&visitor).unwrap())
        .await?;

    info!("Visitor created: {}", visitor.email);
    Ok(saved)
}

async fn create_event(
    store: &dyn RecordStore,
    event_type: String,
    payload: IngestPayload,
) -> Result<Value, StoreError> {
    let data = payload.data.unwrap_or_else(|| json!({}));

    let event = AnalyticsEvent {
        id: new_id("event"),
        visitor_token: payload.visitor_token.unwrap_or_default(),
        visitor_email: payload.visitor_email.unwrap_or_default(),
        page_url: payload
            .page_url
            .or_else(|| field(&data, "page"))
            .unwrap_or_default(),
        session_id: payload
            .session_id
            .or_else(|| field(&data, "session"))
            .unwrap_or_default(),
        user_agent: payload
            .user_agent
            .or_else(|| field(&data, "user_agent"))
            .unwrap_or_default(),
        timestamp: payload.timestamp.unwrap_or_else(now_iso),
        created_at: now_iso(),
        event_data: data,
        event_type,
    };

    let saved = store
        .insert(ANALYTICS, serde_json::to_value(&event).unwrap())
        .await?;

    if event.event_type == PAGE_VISIT && !event.visitor_token.is_empty() {
        // Touching the visitor is best-effort. The event itself is already
        // persisted and stays persisted even if this update fails.
        if let Err(error) = touch_visitor(store, &event.visitor_token).await {
            warn!(
                "Failed to update visitor access for {}: {error}",
                event.visitor_token
            );
        }
    }

    info!("Analytics event: {} {}", event.event_type, event.visitor_token);
    Ok(saved)
}

fn field(data: &Value, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Bumps the access counters of the visitor owning `token`.
///
/// Lookup-then-patch, not atomic: two concurrent page visits for the same
/// token can both read the same `access_count` and one increment is lost.
/// Accepted at this traffic level.
async fn touch_visitor(store: &dyn RecordStore, token: &str) -> Result<(), StoreError> {
    let found = store
        .list(VISITORS, ListQuery::new().exact("token", token).limit(1))
        .await?;
    let Some(visitor) = found.rows.first() else {
        return Ok(());
    };

    let access_count = visitor
        .get("access_count")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let now = now_iso();

    let mut patch = json!({
        "access_count": access_count + 1,
        "last_access": now,
    });
    if visitor.get("first_access").is_none_or(Value::is_null) {
        patch["first_access"] = json!(now);
    }

    store.update(VISITORS, ("token", token), patch).await?;
    Ok(())
}
