use std::collections::HashSet;

use crate::ai::DraftGenerator;
use crate::feed::{BlogEntry, BlogFeedSource, ChangeRecord, ChangeSource};
use crate::notify::{format_message, Notifier, NOTHING_NEW_DRAFT};
use crate::storage::{SeenState, StateStore};
use crate::Result;

const DEFAULT_FETCH_LIMIT: usize = 10;

/// Records not yet present in the seen state
#[derive(Debug, Clone, Default)]
pub struct FreshItems {
    pub changes: Vec<ChangeRecord>,
    pub entries: Vec<BlogEntry>,
}

impl FreshItems {
    /// Keep only records whose id is not in `state`
    pub fn filter(changes: Vec<ChangeRecord>, entries: Vec<BlogEntry>, state: &SeenState) -> Self {
        let seen: HashSet<&str> = state.id_set();
        Self {
            changes: changes
                .into_iter()
                .filter(|c| !seen.contains(c.id().as_str()))
                .collect(),
            entries: entries
                .into_iter()
                .filter(|e| !seen.contains(e.id().as_str()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len() + self.entries.len()
    }

    /// Ids to record once these items are delivered: changes first, then blog entries
    pub fn ids(&self) -> Vec<String> {
        self.changes
            .iter()
            .map(ChangeRecord::id)
            .chain(self.entries.iter().map(BlogEntry::id))
            .collect()
    }
}

/// What a run ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Everything fetched was already processed; state untouched
    NothingNew,
    /// Drafts were delivered and the fresh ids persisted
    Delivered { drafts: usize, recorded: usize },
}

/// One poll → filter → draft → notify cycle
pub struct Digest {
    changes: Box<dyn ChangeSource>,
    blog: Box<dyn BlogFeedSource>,
    generator: DraftGenerator,
    store: StateStore,
    change_limit: usize,
    blog_limit: usize,
}

impl Digest {
    pub fn new(
        changes: Box<dyn ChangeSource>,
        blog: Box<dyn BlogFeedSource>,
        generator: DraftGenerator,
        store: StateStore,
    ) -> Self {
        Self {
            changes,
            blog,
            generator,
            store,
            change_limit: DEFAULT_FETCH_LIMIT,
            blog_limit: DEFAULT_FETCH_LIMIT,
        }
    }

    pub fn with_limits(mut self, change_limit: usize, blog_limit: usize) -> Self {
        self.change_limit = change_limit;
        self.blog_limit = blog_limit;
        self
    }

    /// Fetch both sources and drop already-processed records.
    /// Fetch errors are fatal for the run.
    pub async fn collect(&self, state: &SeenState) -> Result<FreshItems> {
        let changes = self.changes.latest_changes(self.change_limit).await?;
        let entries = self.blog.latest_entries(self.blog_limit).await?;

        let fetched = changes.len() + entries.len();
        let fresh = FreshItems::filter(changes, entries, state);

        tracing::info!(
            "{} of {} fetched items are new ({} changes, {} blog entries)",
            fresh.len(),
            fetched,
            fresh.changes.len(),
            fresh.entries.len()
        );

        Ok(fresh)
    }

    /// Run once: deliver drafts for fresh items, then persist their ids
    pub async fn run(&self, notifier: &dyn Notifier) -> Result<RunOutcome> {
        let mut state = self.store.load();
        let fresh = self.collect(&state).await?;

        if fresh.is_empty() {
            notifier.send(&format_message(&[NOTHING_NEW_DRAFT.to_string()])).await?;
            tracing::info!("Nothing new, state left unchanged");
            return Ok(RunOutcome::NothingNew);
        }

        let drafts = self.generator.generate(&fresh.changes, &fresh.entries).await;
        notifier.send(&format_message(&drafts)).await?;

        let ids = fresh.ids();
        let recorded = ids.len();
        state.record(ids);
        self.store.save(&state)?;

        tracing::info!("Delivered {} drafts, recorded {} new ids", drafts.len(), recorded);
        Ok(RunOutcome::Delivered {
            drafts: drafts.len(),
            recorded,
        })
    }

    /// Build the message a run would send, without sending it or touching state
    pub async fn preview(&self) -> Result<String> {
        let state = self.store.load();
        let fresh = self.collect(&state).await?;

        if fresh.is_empty() {
            return Ok(format_message(&[NOTHING_NEW_DRAFT.to_string()]));
        }

        let drafts = self.generator.generate(&fresh.changes, &fresh.entries).await;
        Ok(format_message(&drafts))
    }
}
