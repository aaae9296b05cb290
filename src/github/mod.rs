//! GitHub user interaction queries and token handling.
//!
//! This module wraps Octocrab's GraphQL client to page through the issues,
//! issue comments, owned repositories and contributed-to repositories of a
//! user. Errors are mapped into [`FetchError`] so callers can report them per
//! user without exposing Octocrab internals.

pub mod error;
pub mod gateway;
pub mod login;
pub mod models;
pub mod pagination;

pub use error::FetchError;
pub use gateway::{DEFAULT_PAGE_SIZE, InteractionGateway, OctocrabInteractionGateway};
pub use login::{PersonalAccessToken, Username, UsernameSet};
pub use models::{
    Collection, CollectionPage, CollectionRequest, InteractionPage, InteractionQuery, PageState,
    PerCollection, RepoRef,
};
pub use pagination::{FetchState, PaginationCursor};

#[cfg(test)]
pub use gateway::MockInteractionGateway;
