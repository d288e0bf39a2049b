use anyhow::Result;

use droidpulse_core::AppConfig;

use super::state_store;

const RECENT_SHOWN: usize = 10;

pub fn show(config: &AppConfig) -> Result<()> {
    let store = state_store(config);
    let state = store.load();

    println!("State file: {}", store.path().display());

    if state.is_empty() {
        println!("No processed items yet.");
        return Ok(());
    }

    println!(
        "{} processed items (cap {}). Most recent:\n",
        state.len(),
        config.general.seen_cap
    );
    for id in state.recent(RECENT_SHOWN).iter().rev() {
        println!("  {}", id);
    }

    Ok(())
}

pub fn reset(config: &AppConfig) -> Result<()> {
    let store = state_store(config);

    if store.reset()? {
        println!("Removed {}", store.path().display());
    } else {
        println!("No state file at {}", store.path().display());
    }

    Ok(())
}
