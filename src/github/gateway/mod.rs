//! Gateway for querying user interactions through Octocrab.
//!
//! The trait-based design lets the walker run against mocks in tests while the
//! Octocrab implementation issues real GraphQL requests.

mod error_mapping;
mod graphql;

pub use graphql::{DEFAULT_PAGE_SIZE, OctocrabInteractionGateway};

use async_trait::async_trait;

use crate::github::error::FetchError;
use crate::github::models::{InteractionPage, InteractionQuery};

/// Gateway that executes one paginated interaction query.
///
/// Implementations return a page for every collection the query requested.
/// Skipped collections are `None` in the returned page.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InteractionGateway: Send + Sync {
    /// Fetch one combined page of interactions.
    async fn fetch(&self, query: &InteractionQuery) -> Result<InteractionPage, FetchError>;
}
