//! # Listings
//!
//! Paginated, filterable views over both collections for the admin surface.
//!
//! Pagination is offset-based: `offset = (page - 1) * limit`, page 1 and
//! limit 100 by default. Newest records come first, ordered by `created_at`
//! for visitors and `timestamp` for analytics events.
//!
//! Free-text `search` is only honored on the fallback path; the durable
//! store is queried with exact-match filters alone. That asymmetry is
//! inherited behavior, kept so both paths answer exactly the way the admin
//! views expect.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use store::{ANALYTICS, ListQuery, RecordStore, StoreError};

pub const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub search: Option<String>,
    pub event_type: Option<String>,
    pub visitor_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListEnvelope {
    pub data: Vec<Value>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
    pub table: &'static str,
    pub source: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_count: Option<usize>,
}

pub async fn list(
    store: &dyn RecordStore,
    collection: &'static str,
    params: ListParams,
) -> Result<ListEnvelope, StoreError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let offset = params.offset.unwrap_or((page - 1) * limit);

    let order_field = if collection == ANALYTICS {
        "timestamp"
    } else {
        "created_at"
    };
    let mut query = ListQuery::new()
        .order_desc(order_field)
        .limit(limit)
        .offset(offset);

    if collection == ANALYTICS {
        if let Some(event_type) = params.event_type.as_deref().filter(|v| !v.is_empty()) {
            query = query.exact("event_type", event_type);
        }
        if let Some(token) = params.visitor_token.as_deref().filter(|v| !v.is_empty()) {
            query = query.exact("visitor_token", token);
        }
    }

    if store.source() == "memory" {
        if let Some(search) = params.search.as_deref().filter(|v| !v.is_empty()) {
            let fields: &[&str] = if collection == ANALYTICS {
                &["visitor_email", "event_type", "page_url"]
            } else {
                &["email", "name", "company"]
            };
            query = query.search(fields, search);
        }
    }

    let result = store.list(collection, query).await?;

    Ok(ListEnvelope {
        data: result.rows,
        total: result.total,
        page,
        limit,
        table: collection,
        source: store.source(),
        real_count: result.real_count,
        demo_count: result.demo_count,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use store::{ANALYTICS, MemoryStore, RecordStore, VISITORS};

    use super::{DEFAULT_LIMIT, ListParams, list};

    #[tokio::test]
    async fn test_defaults() {
        let store = MemoryStore::new();
        let envelope = list(&store, ANALYTICS, ListParams::default()).await.unwrap();

        assert_eq!(envelope.page, 1);
        assert_eq!(envelope.limit, DEFAULT_LIMIT);
        assert_eq!(envelope.table, "analytics");
        assert_eq!(envelope.source, "memory");
        assert_eq!(envelope.total, 4);
        assert_eq!(envelope.demo_count, Some(4));
        assert_eq!(envelope.real_count, Some(0));
    }

    #[tokio::test]
    async fn test_event_type_filter_newest_first() {
        let store = MemoryStore::new();
        for i in 1..=3 {
            store
                .insert(
                    ANALYTICS,
                    json!({
                        "id": format!("e{i}"),
                        "event_type": "download",
                        "timestamp": format!("2025-06-0{i}T00:00:00Z"),
                    }),
                )
                .await
                .unwrap();
        }

        let envelope = list(
            &store,
            ANALYTICS,
            ListParams {
                event_type: Some("download".to_string()),
                limit: Some(10),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(envelope.data.len() <= 10);
        assert_eq!(envelope.total, 4);
        assert!(envelope.data.iter().all(|e| e["event_type"] == "download"));
        assert_eq!(envelope.data[0]["id"], "e3");
    }

    #[tokio::test]
    async fn test_page_windows() {
        let store = MemoryStore::new();
        for i in 10..=19 {
            store
                .insert(
                    VISITORS,
                    json!({
                        "id": format!("v{i}"),
                        "token": format!("t{i}"),
                        "created_at": format!("2025-06-{i}T00:00:00Z"),
                    }),
                )
                .await
                .unwrap();
        }

        let second_page = list(
            &store,
            VISITORS,
            ListParams {
                page: Some(2),
                limit: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(second_page.total, 10);
        assert_eq!(second_page.data.len(), 3);
        // Newest first, so page 2 holds the 4th through 6th most recent.
        assert_eq!(second_page.data[0]["id"], "v16");
        assert_eq!(second_page.data[2]["id"], "v14");
    }

    #[tokio::test]
    async fn test_explicit_offset_wins_over_page() {
        let store = MemoryStore::new();
        for i in 1..=5 {
            store
                .insert(
                    VISITORS,
                    json!({"id": format!("v{i}"), "created_at": format!("2025-06-0{i}T00:00:00Z")}),
                )
                .await
                .unwrap();
        }

        let envelope = list(
            &store,
            VISITORS,
            ListParams {
                page: Some(3),
                limit: Some(2),
                offset: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(envelope.data[0]["id"], "v5");
    }

    #[tokio::test]
    async fn test_search_visitors_by_company() {
        let store = MemoryStore::new();
        store
            .insert(
                VISITORS,
                json!({"email": "a@b.com", "name": "Ana", "company": "Pension Fund AG"}),
            )
            .await
            .unwrap();
        store
            .insert(
                VISITORS,
                json!({"email": "c@d.com", "name": "Carl", "company": "Family Office"}),
            )
            .await
            .unwrap();

        let envelope = list(
            &store,
            VISITORS,
            ListParams {
                search: Some("pension".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(envelope.total, 1);
        assert_eq!(envelope.data[0]["email"], "a@b.com");
    }

    #[tokio::test]
    async fn test_visitor_token_filter() {
        let store = MemoryStore::new();
        let envelope = list(
            &store,
            ANALYTICS,
            ListParams {
                visitor_token: Some("zrch_demo_002".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(envelope.total, 2);
        assert!(
            envelope
                .data
                .iter()
                .all(|e| e["visitor_token"] == "zrch_demo_002")
        );
    }
}
