//! Example: Discovering an API's links and invoking an action
//!
//! Loads configuration the same way a service would (`.env`, environment,
//! then `linkscout.toml`/`config.toml`), waits for the link document and
//! prints what it found.
//!
//! # Run
//!
//! ```bash
//! LINKSCOUT_BASE_URL=http://localhost:8080/ \
//! LINKSCOUT_BOOTSTRAP_MAX_WAIT_MS=30000 \
//!     cargo run -p linkscout-infra --example discover_links -- [action-rel]
//! ```

use anyhow::Context;
use linkscout_infra::config;
use linkscout_infra::observability::init_tracing;
use linkscout_infra::ApiClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::load().context("loading configuration")?;
    init_tracing(&config.log)?;

    let client = ApiClient::connect(config).await.context("discovering API links")?;

    for link in client.links().await?.iter() {
        println!("{:<60} {}", link.rel(), link.href());
    }

    match client.health_check_url().await {
        Ok(url) => {
            let healthy = client.check_health().await?;
            println!("\nhealth: {url} ({})", if healthy { "up" } else { "down" });
        }
        Err(err) => println!("\nhealth: {err}"),
    }

    if let Some(rel) = std::env::args().nth(1) {
        let url = client.use_take_action_link(&rel).await?;
        let response = client.take_action().await?;
        println!("\n{} {url} -> {}", client.config().action_method, response.status());
        println!("{}", response.text());
    }

    Ok(())
}
