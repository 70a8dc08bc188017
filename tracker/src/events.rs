//! Event emission.
//!
//! Every tracked interaction becomes one POST to the analytics endpoint,
//! spawned into the background and forgotten. The request client carries a
//! short timeout so an unresponsive API cannot pile up hanging tasks.
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde_json::{Value, json};
use tokio::sync::OnceCell;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Maps a download trigger to a file type. An explicit attribute wins;
/// otherwise the trigger's visible label is matched against known keywords.
pub fn classify_file_type(explicit: Option<&str>, label: &str) -> String {
    if let Some(file_type) = explicit.filter(|v| !v.is_empty()) {
        return file_type.to_string();
    }

    let label = label.to_lowercase();
    if label.contains("term") {
        "term-sheet".to_string()
    } else if label.contains("teaser") {
        "teaser".to_string()
    } else if label.contains("model") || label.contains("modelo") {
        "financial-model".to_string()
    } else if label.contains("nda") {
        "nda".to_string()
    } else {
        "unknown".to_string()
    }
}

pub struct Tracker {
    client: reqwest::Client,
    base_url: String,
    token: String,
    email: OnceCell<String>,
    started: Instant,
    session_end_sent: AtomicBool,
}

impl Tracker {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap(),
            base_url: base_url.into(),
            token: token.into(),
            email: OnceCell::new(),
            started: Instant::now(),
            session_end_sent: AtomicBool::new(false),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub async fn page_visit(&self, page: &str, referrer: &str) {
        self.send("page_visit", json!({ "page": page, "ref": referrer }))
            .await;
    }

    pub async fn download(&self, explicit: Option<&str>, label: &str, source: &str, page: &str) {
        let file_type = classify_file_type(explicit, label);
        self.send(
            "download",
            json!({ "file_type": file_type, "source": source, "page": page }),
        )
        .await;
    }

    pub async fn nda_request(&self, page: &str) {
        self.send("nda_request", json!({ "signed": false, "page": page }))
            .await;
    }

    pub async fn cta_click(&self, page: &str) {
        self.send("cta_click", json!({ "page": page })).await;
    }

    /// Reports the end of the session with its total duration in seconds.
    ///
    /// Both the hidden and the unload transitions call this; only the first
    /// call sends, so one session never produces two `session_end` events.
    /// Returns whether this call was the one that sent.
    pub async fn session_end(&self, page: &str) -> bool {
        if self.session_end_sent.swap(true, Ordering::SeqCst) {
            return false;
        }

        let total_time = self.started.elapsed().as_secs_f64().round() as u64;
        self.send(
            "session_end",
            json!({ "total_time": total_time, "page": page }),
        )
        .await;
        true
    }

    /// Looks up the email registered for this token, once, best-effort. An
    /// unknown token or a failed lookup is an empty email on every event.
    async fn visitor_email(&self) -> String {
        self.email
            .get_or_init(|| async {
                fetch_visitor_email(&self.client, &self.base_url, &self.token)
                    .await
                    .unwrap_or_default()
            })
            .await
            .clone()
    }

    async fn send(&self, event_type: &str, data: Value) {
        let payload = json!({
            "eventType": event_type,
            "visitorToken": self.token,
            "visitor_email": self.visitor_email().await,
            "data": data,
        });

        let client = self.client.clone();
        let url = format!("{}/api/analytics-events", self.base_url);

        // Fire-and-forget: the outcome is dropped, delivery is the server's
        // problem from here.
        tokio::spawn(async move {
            let _ = client.post(url).json(&payload).send().await;
        });
    }
}

async fn fetch_visitor_email(
    client: &reqwest::Client,
    base_url: &str,
    token: &str,
) -> Option<String> {
    let response = client
        .get(format!("{base_url}/api/visitors?limit=1000"))
        .send()
        .await
        .ok()?;
    let body: Value = response.json().await.ok()?;

    let visitors = match &body {
        Value::Array(rows) => rows.as_slice(),
        _ => body.get("data")?.as_array()?.as_slice(),
    };

    visitors
        .iter()
        .find(|v| v.get("token").and_then(Value::as_str) == Some(token))
        .and_then(|v| v.get("email").and_then(Value::as_str))
        .filter(|email| !email.is_empty())
        .map(str::to_string)
}
