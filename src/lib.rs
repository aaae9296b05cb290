//! Interaction fetcher library crate.
//!
//! Given a batch of GitHub logins, the library pages through each user's
//! issues, issue comments, owned repositories and contributed-to repositories
//! through Octocrab's GraphQL client, and merges every public repository URL
//! into one deduplicated result. Failures are reported per user and never
//! abort the batch.

pub mod config;
pub mod github;
pub mod interactions;
pub mod server;

pub use config::FetcherConfig;
pub use github::{
    FetchError, InteractionGateway, OctocrabInteractionGateway, PersonalAccessToken, Username,
};
pub use interactions::{AggregatedResult, BatchCoordinator, UserError, WalkOptions};
