//! Canonical record shapes for the two collections.
use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One tracked prospective investor or anonymous browsing session.
///
/// `token` is the public pseudonymous identifier carried in links and client
/// storage. Uniqueness across visitors is assumed, not enforced here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visitor {
    pub id: String,
    pub token: String,
    pub email: String,
    pub name: String,
    pub company: String,
    pub status: String,
    pub access_count: u64,
    pub first_access: Option<String>,
    pub last_access: Option<String>,
    pub created_at: String,
}

/// One discrete tracked interaction. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub id: String,
    pub event_type: String,
    pub visitor_token: String,
    pub visitor_email: String,
    pub event_data: Value,
    pub page_url: String,
    pub session_id: String,
    pub user_agent: String,
    pub timestamp: String,
    pub created_at: String,
}

/// Current time as an RFC 3339 string, the timestamp format both collections
/// store.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Generates a record id of the form `<prefix>_<millis base36>_<9 random
/// base36 chars>`. Opaque, unique enough for two low-volume tables.
pub fn new_id(prefix: &str) -> String {
    format!(
        "{prefix}_{}_{}",
        base36(Utc::now().timestamp_millis() as u64),
        random_base36(9)
    )
}

pub fn base36(mut n: u64) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap()
}

pub fn random_base36(len: usize) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::rng();
    (0..len)
        .map(|_| DIGITS[rng.random_range(0..36)] as char)
        .collect()
}
