use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use serde_json::{Value, json};
use tracker::{MemoryTokenStorage, Tracker, resolve_token};

/// Drives a registered-visitor journey against a running API server and
/// prints what the admin views would see afterwards.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the API server.
    #[arg(default_value = "http://localhost:8787")]
    base_url: String,

    #[arg(long, default_value = "smoke@invest.example")]
    email: String,

    #[arg(long, default_value = "zrch_smoke_001")]
    token: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let client = reqwest::Client::new();

    let visitor: Value = client
        .post(format!("{}/api/visitors", args.base_url))
        .json(&json!({ "email": args.email, "token": args.token }))
        .send()
        .await?
        .json()
        .await?;
    println!("Created visitor: {}", visitor["id"]);

    // The link token takes the same path a browser would: resolved, stored,
    // then used for every event.
    let storage = MemoryTokenStorage::new();
    let token = resolve_token(Some(args.token.as_str()), &[&storage]);

    let tracker = Tracker::new(args.base_url.clone(), token);
    tracker.page_visit("index.html", "").await;
    tracker
        .download(None, "Download Term Sheet", "doc-button", "index.html")
        .await;
    tracker.session_end("index.html").await;

    // Sends are fire-and-forget; give them a moment to land.
    tokio::time::sleep(Duration::from_millis(500)).await;

    let visitors: Value = client
        .get(format!("{}/api/visitors?limit=100", args.base_url))
        .send()
        .await?
        .json()
        .await?;

    let listed = visitors["data"]
        .as_array()
        .and_then(|rows| {
            rows.iter()
                .find(|v| v["token"].as_str() == Some(args.token.as_str()))
        })
        .cloned()
        .unwrap_or(Value::Null);
    println!("Visitor after visit: {listed}");

    let events: Value = client
        .get(format!(
            "{}/api/analytics-events?visitor_token={}&limit=10",
            args.base_url, args.token
        ))
        .send()
        .await?
        .json()
        .await?;
    println!(
        "Recorded events: {} (source: {})",
        events["total"], events["source"]
    );

    Ok(())
}
