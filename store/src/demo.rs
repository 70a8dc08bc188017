//! Fixed demonstration events served by the in-memory fallback.
//!
//! These keep an unconfigured deployment's analytics view populated. They are
//! always reported separately (`demo_count`) so they cannot be mistaken for
//! persisted data.
use serde_json::{Value, json};

pub fn demo_events() -> Vec<Value> {
    vec![
        json!({
            "id": "demo_event_1",
            "visitor_token": "zrch_demo_001",
            "visitor_email": "juan.garcia@pension-fund.com",
            "event_type": "page_view",
            "event_data": { "page": "/index.html" },
            "page_url": "https://project-zurich-alter5.vercel.app/index.html",
            "timestamp": "2024-09-18T10:30:00Z"
        }),
        json!({
            "id": "demo_event_2",
            "visitor_token": "zrch_demo_001",
            "visitor_email": "juan.garcia@pension-fund.com",
            "event_type": "download",
            "event_data": { "type": "term-sheet", "file": "Project-ZURICH-TermSheet.docx" },
            "page_url": "https://project-zurich-alter5.vercel.app/index.html",
            "timestamp": "2024-09-18T10:35:00Z"
        }),
        json!({
            "id": "demo_event_3",
            "visitor_token": "zrch_demo_002",
            "visitor_email": "maria.lopez@family-office.es",
            "event_type": "page_view",
            "event_data": { "page": "/index.html" },
            "page_url": "https://project-zurich-alter5.vercel.app/index.html",
            "timestamp": "2024-09-18T09:15:00Z"
        }),
        json!({
            "id": "demo_event_4",
            "visitor_token": "zrch_demo_002",
            "visitor_email": "maria.lopez@family-office.es",
            "event_type": "nda_request",
            "event_data": { "action": "initiated" },
            "page_url": "https://project-zurich-alter5.vercel.app/index.html",
            "timestamp": "2024-09-18T09:20:00Z"
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::demo_events;

    #[test]
    fn test_demo_dataset_size() {
        assert_eq!(demo_events().len(), 4);
    }

    #[test]
    fn test_demo_ids_are_marked() {
        for event in demo_events() {
            assert!(event["id"].as_str().unwrap().starts_with("demo_event_"));
        }
    }
}
