//! Shared sink merging every walker's pages into one response.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::github::{FetchError, RepoRef, Username};

/// Failure recorded against one login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserError {
    /// Login whose fetch failed.
    pub username: String,
    /// Human-readable failure description.
    pub error: String,
}

/// Combined result of one batch.
///
/// `urls` holds each public repository URL once, in the order it was first
/// ingested during this run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedResult {
    /// Deduplicated public repository URLs.
    pub urls: Vec<String>,
    /// One entry per failed fetch.
    pub errors: Vec<UserError>,
}

#[derive(Debug, Default)]
struct AggregatorState {
    result: AggregatedResult,
    seen: HashSet<String>,
}

/// Thread-safe, deduplicating, privacy-filtering result sink.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    state: Mutex<AggregatorState>,
}

impl ResultAggregator {
    /// Creates an empty aggregator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one page worth of results for `username`.
    ///
    /// The error, if any, is appended first. Private repositories and URLs
    /// already present are skipped.
    pub fn ingest<I>(&self, username: &Username, error: Option<&FetchError>, repo_refs: I)
    where
        I: IntoIterator<Item = RepoRef>,
    {
        let mut state = self.lock();

        if let Some(fetch_error) = error {
            state.result.errors.push(UserError {
                username: username.as_str().to_owned(),
                error: fetch_error.to_string(),
            });
        }

        let AggregatorState { result, seen } = &mut *state;
        for repo in repo_refs {
            if repo.is_private || seen.contains(&repo.url) {
                continue;
            }
            seen.insert(repo.url.clone());
            result.urls.push(repo.url);
        }
    }

    /// Copies the current result.
    #[must_use]
    pub fn snapshot(&self) -> AggregatedResult {
        self.lock().result.clone()
    }

    /// Consumes the aggregator and returns the result.
    #[must_use]
    pub fn into_result(self) -> AggregatedResult {
        self.state
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .result
    }

    // Ingest only appends, so state left by a panicking holder is still valid.
    fn lock(&self) -> MutexGuard<'_, AggregatorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
