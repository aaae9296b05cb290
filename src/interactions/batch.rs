//! Fan-out over the unique logins of one request.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::Instrument;

use crate::github::{FetchError, InteractionGateway, UsernameSet};

use super::aggregator::{AggregatedResult, ResultAggregator};
use super::walker::{CollectionWalker, WalkOptions};

/// Runs one walker per unique login and collects their results.
pub struct BatchCoordinator<G> {
    gateway: Arc<G>,
    options: WalkOptions,
}

impl<G> BatchCoordinator<G>
where
    G: InteractionGateway + 'static,
{
    /// Creates a coordinator sharing `gateway` across every walk.
    #[must_use]
    pub const fn new(gateway: Arc<G>, options: WalkOptions) -> Self {
        Self { gateway, options }
    }

    /// Fetches the interaction URLs for every login in `raw_usernames`.
    ///
    /// Logins are normalised and deduplicated first. Every walk runs on its
    /// own task and the call returns only after all of them have finished.
    /// Failures never abort the batch: each failed login contributes one
    /// entry to [`AggregatedResult::errors`].
    pub async fn fetch_user_info<I, S>(&self, raw_usernames: I) -> AggregatedResult
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let usernames = UsernameSet::from_raw(raw_usernames);
        tracing::info!("fetching interactions for {} users", usernames.len());

        let aggregator = Arc::new(ResultAggregator::new());
        let walker = CollectionWalker::new(
            Arc::clone(&self.gateway),
            Arc::clone(&aggregator),
            self.options,
        );

        let mut walks = JoinSet::new();
        let mut logins = HashMap::new();
        for username in usernames {
            let task_walker = walker.clone();
            let login = username.clone();
            let span = tracing::debug_span!("walk", username = %username);
            let handle = walks.spawn(async move { task_walker.walk(login).await }.instrument(span));
            logins.insert(handle.id(), username);
        }
        drop(walker);

        while let Some(joined) = walks.join_next_with_id().await {
            match joined {
                Ok((id, outcome)) => {
                    if let Some(username) = logins.get(&id) {
                        tracing::debug!(
                            "walk for {username} ended {:?} after {} queries",
                            outcome.end,
                            outcome.queries
                        );
                    }
                }
                Err(error) => {
                    let Some(username) = logins.get(&error.id()) else {
                        tracing::warn!("untracked walk task failed: {error}");
                        continue;
                    };
                    tracing::warn!("walk for {username} did not complete: {error}");
                    let failure = FetchError::Task {
                        message: error.to_string(),
                    };
                    aggregator.ingest(username, Some(&failure), Vec::new());
                }
            }
        }

        let result = match Arc::try_unwrap(aggregator) {
            Ok(owned) => owned.into_result(),
            Err(shared) => shared.snapshot(),
        };
        tracing::info!(
            "batch finished with {} urls and {} errors",
            result.urls.len(),
            result.errors.len()
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use rstest::rstest;

    use super::BatchCoordinator;
    use crate::github::{
        CollectionPage, FetchError, InteractionGateway, InteractionPage, InteractionQuery,
        MockInteractionGateway, PageState, PerCollection, RepoRef,
    };
    use crate::interactions::aggregator::UserError;
    use crate::interactions::walker::WalkOptions;

    fn final_page(collections: PerCollection<Vec<RepoRef>>) -> InteractionPage {
        let mut pages = collections.into_values();
        InteractionPage {
            collections: PerCollection::from_fn(|_| {
                Some(CollectionPage {
                    nodes: pages.next().unwrap_or_default(),
                    page_state: PageState::default(),
                })
            }),
        }
    }

    fn coordinator(gateway: MockInteractionGateway) -> BatchCoordinator<MockInteractionGateway> {
        BatchCoordinator::new(Arc::new(gateway), WalkOptions::default())
    }

    fn login_is(expected: &'static str) -> impl Fn(&InteractionQuery) -> bool + Send + 'static {
        move |query| query.login.as_str() == expected
    }

    #[tokio::test]
    async fn duplicate_logins_are_walked_once() {
        let mut gateway = MockInteractionGateway::new();
        gateway
            .expect_fetch()
            .withf(login_is("alice"))
            .times(1)
            .returning(|_| Ok(InteractionPage::default()));
        gateway
            .expect_fetch()
            .withf(login_is("bob"))
            .times(1)
            .returning(|_| Ok(InteractionPage::default()));

        let result = coordinator(gateway)
            .fetch_user_info(["alice", "alice", " \"bob\" ", "\"alice\""])
            .await;

        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn urls_are_merged_across_users_without_private_repositories() {
        let mut gateway = MockInteractionGateway::new();
        gateway
            .expect_fetch()
            .withf(login_is("alice"))
            .times(1)
            .returning(|_| {
                Ok(final_page(PerCollection {
                    repositories: vec![RepoRef::public("X"), RepoRef::public("Y")],
                    ..PerCollection::default()
                }))
            });
        gateway
            .expect_fetch()
            .withf(login_is("bob"))
            .times(1)
            .returning(|_| {
                Ok(final_page(PerCollection {
                    issues: vec![RepoRef::public("Y"), RepoRef::private("Z")],
                    ..PerCollection::default()
                }))
            });

        let mut result = coordinator(gateway)
            .fetch_user_info(["alice", "alice", " \"bob\" "])
            .await;

        result.urls.sort();
        assert_eq!(result.urls, vec!["X", "Y"]);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn failing_user_does_not_affect_the_others() {
        let mut gateway = MockInteractionGateway::new();
        gateway
            .expect_fetch()
            .withf(login_is("deleted-user"))
            .times(1)
            .returning(|_| {
                Err(FetchError::GraphQl {
                    messages: vec![
                        "Could not resolve to a User with the login of 'deleted-user'.".to_owned(),
                    ],
                })
            });
        gateway
            .expect_fetch()
            .withf(login_is("octocat"))
            .times(1)
            .returning(|_| {
                Ok(final_page(PerCollection {
                    repositories_contributed_to: vec![RepoRef::public("https://github.com/o/r")],
                    ..PerCollection::default()
                }))
            });

        let result = coordinator(gateway)
            .fetch_user_info(["deleted-user", "octocat"])
            .await;

        assert_eq!(result.urls, vec!["https://github.com/o/r"]);
        assert_eq!(
            result.errors,
            vec![UserError {
                username: "deleted-user".to_owned(),
                error: "GitHub GraphQL error: Could not resolve to a User with the login of \
                        'deleted-user'."
                    .to_owned(),
            }]
        );
    }

    #[tokio::test]
    async fn all_failures_still_produce_a_result() {
        let mut gateway = MockInteractionGateway::new();
        gateway.expect_fetch().times(2).returning(|_| {
            Err(FetchError::Network {
                message: "timed out".to_owned(),
            })
        });

        let result = coordinator(gateway).fetch_user_info(["a", "b"]).await;

        assert!(result.urls.is_empty());
        let mut failed: Vec<_> = result.errors.into_iter().map(|entry| entry.username).collect();
        failed.sort();
        assert_eq!(failed, vec!["a", "b"]);
    }

    /// Panics for the login `boom`, answers an empty page otherwise.
    struct PanickingGateway;

    #[async_trait]
    impl InteractionGateway for PanickingGateway {
        async fn fetch(&self, query: &InteractionQuery) -> Result<InteractionPage, FetchError> {
            assert_ne!(query.login.as_str(), "boom", "gateway exploded");
            Ok(InteractionPage::default())
        }
    }

    #[tokio::test]
    async fn panicking_walk_is_recorded_as_a_task_error() {
        let coordinator = BatchCoordinator::new(Arc::new(PanickingGateway), WalkOptions::default());

        let result = coordinator.fetch_user_info(["boom", "octocat"]).await;

        assert_eq!(result.errors.len(), 1);
        let entry = result.errors.first().expect("one error entry");
        assert_eq!(entry.username, "boom");
        assert!(entry.error.starts_with("task failed:"), "{}", entry.error);
    }

    #[rstest]
    #[case::no_logins(Vec::new())]
    #[tokio::test]
    async fn empty_request_yields_empty_result(#[case] logins: Vec<String>) {
        let gateway = MockInteractionGateway::new();

        let result = coordinator(gateway).fetch_user_info(logins).await;

        assert!(result.urls.is_empty());
        assert!(result.errors.is_empty());
    }
}
