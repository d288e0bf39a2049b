use anyhow::Result;

use droidpulse_core::{feed::FeedFetcher, AppConfig};

use super::build_digest;

pub async fn run(config: &AppConfig) -> Result<()> {
    let fetcher = FeedFetcher::new(config)?;
    let digest = build_digest(config, &fetcher)?;
    let message = digest.preview().await?;

    println!("{}", message);

    Ok(())
}
