use std::{env, fmt::Display, str::FromStr};

use store::StoreCredentials;
use tracing::{info, warn};

pub struct Config {
    pub port: u16,
    pub store: Option<StoreCredentials>,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "8787"),
            store: load_store_credentials(),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}

/// Record store credentials are optional. A deployment without them keeps
/// running against the in-memory fallback instead of crashing.
fn load_store_credentials() -> Option<StoreCredentials> {
    let url = var("SUPABASE_URL").ok()?;
    let key = env::var("SUPABASE_SERVICE_KEY")
        .or_else(|_| env::var("SUPABASE_ANON_KEY"))
        .ok()?;

    Some(StoreCredentials { url, key })
}
