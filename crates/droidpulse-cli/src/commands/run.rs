use anyhow::Result;

use droidpulse_core::{
    feed::FeedFetcher,
    notify::TelegramNotifier,
    AppConfig, RunOutcome,
};

use super::build_digest;

pub async fn run(config: &AppConfig) -> Result<()> {
    // Fail on missing Telegram credentials before any remote call
    let fetcher = FeedFetcher::new(config)?;
    let notifier = TelegramNotifier::new(fetcher.client().clone(), config)?;

    let digest = build_digest(config, &fetcher)?;

    match digest.run(&notifier).await? {
        RunOutcome::NothingNew => {
            tracing::info!("Run finished, nothing new");
            println!("No new items. Everything already processed.");
        }
        RunOutcome::Delivered { drafts, recorded } => {
            tracing::info!("Run finished: {} drafts sent, {} ids recorded", drafts, recorded);
            println!("Sent {} drafts, marked {} items as processed.", drafts, recorded);
        }
    }

    Ok(())
}
