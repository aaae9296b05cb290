//! Per-user pagination loop across the four interaction collections.
//!
//! The walker fetches pages strictly in cursor order and hands every page to
//! the aggregator on a separate task, so ingesting page N overlaps with
//! fetching page N+1. Any failed page ends the walk for that user; pages
//! ingested before the failure stay in the result.

use std::num::NonZeroU32;
use std::sync::Arc;

use tokio::task::JoinSet;

use crate::github::{Collection, FetchError, FetchState, InteractionGateway, RepoRef, Username};

use super::aggregator::ResultAggregator;

/// Tuning for a single walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkOptions {
    /// Maximum number of queries per user. `None` walks until GitHub reports
    /// every collection exhausted.
    pub max_pages: Option<NonZeroU32>,
}

/// How a walk finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEnd {
    /// Every collection reported no further pages.
    Exhausted,
    /// A page fetch failed; the error was recorded.
    Failed,
    /// The page ceiling was reached with collections still open.
    PageLimitReached,
}

/// Summary of one user's walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkOutcome {
    /// Number of gateway queries issued.
    pub queries: u32,
    /// Reason the walk stopped.
    pub end: WalkEnd,
}

/// Drives one user's collections to exhaustion.
pub struct CollectionWalker<G> {
    gateway: Arc<G>,
    aggregator: Arc<ResultAggregator>,
    options: WalkOptions,
}

impl<G> Clone for CollectionWalker<G> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            aggregator: Arc::clone(&self.aggregator),
            options: self.options,
        }
    }
}

impl<G> CollectionWalker<G>
where
    G: InteractionGateway,
{
    /// Creates a walker that reports into `aggregator`.
    #[must_use]
    pub const fn new(
        gateway: Arc<G>,
        aggregator: Arc<ResultAggregator>,
        options: WalkOptions,
    ) -> Self {
        Self {
            gateway,
            aggregator,
            options,
        }
    }

    /// Walks every collection for `username`.
    ///
    /// Returns once the walk has stopped and every page it fetched has been
    /// ingested.
    pub async fn walk(&self, username: Username) -> WalkOutcome {
        let mut state = FetchState::new(username.clone());
        let mut ingests = JoinSet::new();
        let mut queries: u32 = 0;

        let end = loop {
            let Some(query) = state.next_query() else {
                break WalkEnd::Exhausted;
            };

            if let Some(limit) = self.options.max_pages.filter(|limit| queries >= limit.get()) {
                tracing::warn!("stopping {username} after {queries} pages with collections open");
                self.spawn_ingest(
                    &mut ingests,
                    &username,
                    Some(FetchError::PageLimitExceeded { limit: limit.get() }),
                    Vec::new(),
                );
                break WalkEnd::PageLimitReached;
            }

            queries = queries.saturating_add(1);
            match self.gateway.fetch(&query).await {
                Ok(page) => {
                    for collection in state.record(&page) {
                        warn_missing_cursor(&username, collection);
                    }
                    let repo_refs: Vec<RepoRef> = page.into_repo_refs().collect();
                    tracing::debug!(
                        "fetched page {queries} for {username}: {} repositories",
                        repo_refs.len()
                    );
                    self.spawn_ingest(&mut ingests, &username, None, repo_refs);
                }
                Err(error) => {
                    tracing::warn!("fetching page {queries} for {username} failed: {error}");
                    self.spawn_ingest(&mut ingests, &username, Some(error), Vec::new());
                    break WalkEnd::Failed;
                }
            }
        };

        while let Some(joined) = ingests.join_next().await {
            if let Err(error) = joined {
                tracing::warn!("ingest task for {username} did not complete: {error}");
            }
        }

        WalkOutcome { queries, end }
    }

    fn spawn_ingest(
        &self,
        ingests: &mut JoinSet<()>,
        username: &Username,
        error: Option<FetchError>,
        repo_refs: Vec<RepoRef>,
    ) {
        let aggregator = Arc::clone(&self.aggregator);
        let login = username.clone();
        ingests.spawn(async move {
            aggregator.ingest(&login, error.as_ref(), repo_refs);
        });
    }
}

fn warn_missing_cursor(username: &Username, collection: Collection) {
    tracing::warn!(
        "{field} for {username} reported more pages without an end cursor; closing it",
        field = collection.field_name()
    );
}
