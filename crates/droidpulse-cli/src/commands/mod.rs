pub mod preview;
pub mod run;
pub mod state;

use anyhow::Result;

use droidpulse_core::{
    ai::DraftGenerator,
    feed::{BlogSource, FeedFetcher, GerritSource},
    storage::StateStore,
    AppConfig, Digest,
};

/// State store at the configured path
pub fn state_store(config: &AppConfig) -> StateStore {
    StateStore::new(config.state_path(), config.general.seen_cap)
}

/// Wire the real feed sources, draft generator and state store
pub fn build_digest(config: &AppConfig, fetcher: &FeedFetcher) -> Result<Digest> {
    let generator = DraftGenerator::from_config(config, fetcher.client().clone())?;
    match generator.provider_name() {
        Some(name) => tracing::info!("Drafting with {}", name),
        None => tracing::info!("Drafting from templates"),
    }

    let digest = Digest::new(
        Box::new(GerritSource::new(fetcher.clone(), config)),
        Box::new(BlogSource::new(fetcher.clone(), config)?),
        generator,
        state_store(config),
    )
    .with_limits(config.sources.change_limit, config.sources.blog_limit);

    Ok(digest)
}
