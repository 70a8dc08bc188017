//! Visitor identity resolution.
//!
//! A token names a visitor across sessions. Precedence:
//! 1. A token carried in the opened link (investor-relations links embed
//!    one) — it wins over anything stored and is re-persisted everywhere.
//! 2. The first token found across the storage backends.
//! 3. A freshly generated anonymous token, persisted before it is returned.
//!
//! Tokens are persisted to every backend so clearing any single one does not
//! lose the identity. Storage failures are swallowed; identity is
//! best-effort, never a correctness gate.
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;
use store::records::{base36, random_base36};

pub trait TokenStorage: Send + Sync {
    fn load(&self) -> Option<String>;

    /// Best-effort write. Failures are ignored.
    fn store(&self, token: &str);
}

/// Session-scoped storage, gone when the process exits.
pub struct MemoryTokenStorage {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStorage {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl Default for MemoryTokenStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Option<String> {
        self.slot.lock().unwrap().clone()
    }

    fn store(&self, token: &str) {
        *self.slot.lock().unwrap() = Some(token.to_string());
    }
}

/// Profile-scoped storage, survives restarts the way a cookie would.
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Option<String> {
        let token = fs::read_to_string(&self.path).ok()?;
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    fn store(&self, token: &str) {
        let _ = fs::write(&self.path, token);
    }
}

pub fn resolve_token(link_token: Option<&str>, storages: &[&dyn TokenStorage]) -> String {
    if let Some(token) = link_token.filter(|t| !t.is_empty()) {
        persist_everywhere(token, storages);
        return token.to_string();
    }

    for storage in storages {
        if let Some(token) = storage.load() {
            return token;
        }
    }

    let anon = generate_anon_token();
    persist_everywhere(&anon, storages);
    anon
}

pub fn generate_anon_token() -> String {
    format!(
        "anon_{}_{}",
        base36(Utc::now().timestamp_millis() as u64),
        random_base36(8)
    )
}

fn persist_everywhere(token: &str, storages: &[&dyn TokenStorage]) {
    for storage in storages {
        storage.store(token);
    }
}
