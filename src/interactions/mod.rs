//! Batch engine collecting the repositories a set of users interacted with.
//!
//! [`BatchCoordinator`] fans out one [`CollectionWalker`] per unique login.
//! Each walker pages through the GitHub gateway and streams every page into
//! the shared [`ResultAggregator`], which deduplicates URLs and drops private
//! repositories.

pub mod aggregator;
pub mod batch;
pub mod walker;

pub use aggregator::{AggregatedResult, ResultAggregator, UserError};
pub use batch::BatchCoordinator;
pub use walker::{CollectionWalker, WalkEnd, WalkOptions, WalkOutcome};
