//! Domain models for user interaction queries.

use super::login::Username;

/// One of the four interaction lists fetched for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Issues opened by the user.
    Issues,
    /// Comments the user left on issues.
    IssueComments,
    /// Repositories owned by the user.
    Repositories,
    /// Repositories the user has contributed to.
    RepositoriesContributedTo,
}

impl Collection {
    /// Every collection, in query order.
    pub const ALL: [Self; 4] = [
        Self::Issues,
        Self::IssueComments,
        Self::Repositories,
        Self::RepositoriesContributedTo,
    ];

    /// Name of the field on the GraphQL `User` type.
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Issues => "issues",
            Self::IssueComments => "issueComments",
            Self::Repositories => "repositories",
            Self::RepositoriesContributedTo => "repositoriesContributedTo",
        }
    }

    /// Name of the GraphQL variable carrying this collection's cursor.
    #[must_use]
    pub const fn cursor_variable(self) -> &'static str {
        match self {
            Self::Issues => "issuesAfter",
            Self::IssueComments => "issueCommentsAfter",
            Self::Repositories => "repositoriesAfter",
            Self::RepositoriesContributedTo => "repositoriesContributedToAfter",
        }
    }

    /// True when nodes are repositories themselves rather than items that
    /// point at a repository.
    #[must_use]
    pub const fn yields_repositories(self) -> bool {
        matches!(self, Self::Repositories | Self::RepositoriesContributedTo)
    }
}

/// One value per [`Collection`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerCollection<T> {
    /// Value for [`Collection::Issues`].
    pub issues: T,
    /// Value for [`Collection::IssueComments`].
    pub issue_comments: T,
    /// Value for [`Collection::Repositories`].
    pub repositories: T,
    /// Value for [`Collection::RepositoriesContributedTo`].
    pub repositories_contributed_to: T,
}

impl<T> PerCollection<T> {
    /// Builds a value for every collection.
    pub fn from_fn(mut build: impl FnMut(Collection) -> T) -> Self {
        Self {
            issues: build(Collection::Issues),
            issue_comments: build(Collection::IssueComments),
            repositories: build(Collection::Repositories),
            repositories_contributed_to: build(Collection::RepositoriesContributedTo),
        }
    }

    /// Borrow the value for `collection`.
    #[must_use]
    pub const fn get(&self, collection: Collection) -> &T {
        match collection {
            Collection::Issues => &self.issues,
            Collection::IssueComments => &self.issue_comments,
            Collection::Repositories => &self.repositories,
            Collection::RepositoriesContributedTo => &self.repositories_contributed_to,
        }
    }

    /// Mutably borrow the value for `collection`.
    pub const fn get_mut(&mut self, collection: Collection) -> &mut T {
        match collection {
            Collection::Issues => &mut self.issues,
            Collection::IssueComments => &mut self.issue_comments,
            Collection::Repositories => &mut self.repositories,
            Collection::RepositoriesContributedTo => &mut self.repositories_contributed_to,
        }
    }

    /// Iterates `(collection, value)` pairs in query order.
    pub fn iter(&self) -> impl Iterator<Item = (Collection, &T)> {
        Collection::ALL
            .into_iter()
            .map(move |collection| (collection, self.get(collection)))
    }

    /// Consumes the values in query order.
    pub fn into_values(self) -> impl Iterator<Item = T> {
        [
            self.issues,
            self.issue_comments,
            self.repositories,
            self.repositories_contributed_to,
        ]
        .into_iter()
    }
}

/// Repository surfaced by one of the collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// Repository HTML URL.
    pub url: String,
    /// Whether the repository is private.
    pub is_private: bool,
}

impl RepoRef {
    /// Public repository reference.
    #[must_use]
    pub fn public(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_private: false,
        }
    }

    /// Private repository reference.
    #[must_use]
    pub fn private(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_private: true,
        }
    }
}

/// Pagination state reported for one collection page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
    /// Cursor of the last node on the page.
    pub end_cursor: Option<String>,
    /// Whether GitHub has more nodes after this page.
    pub has_next_page: bool,
}

/// One page of a single collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionPage {
    /// Repositories referenced by the page's nodes.
    pub nodes: Vec<RepoRef>,
    /// Pagination state after this page.
    pub page_state: PageState,
}

/// How a query should treat one collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionRequest {
    /// Fetch the first page.
    First,
    /// Fetch the page after the given cursor.
    After(String),
    /// Leave the collection out of the query.
    Skip,
}

/// A single combined query covering up to four collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionQuery {
    /// Login the query is about.
    pub login: Username,
    /// Per-collection paging instruction.
    pub requests: PerCollection<CollectionRequest>,
}

impl InteractionQuery {
    /// Collections this query actually requests.
    pub fn requested(&self) -> impl Iterator<Item = (Collection, &CollectionRequest)> {
        self.requests
            .iter()
            .filter(|(_, request)| **request != CollectionRequest::Skip)
    }
}

/// Result of one combined query.
///
/// Collections that were skipped in the query are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionPage {
    /// Per-collection page, if it was requested.
    pub collections: PerCollection<Option<CollectionPage>>,
}

impl InteractionPage {
    /// Consumes the page and yields every repository reference it carried.
    pub fn into_repo_refs(self) -> impl Iterator<Item = RepoRef> {
        self.collections
            .into_values()
            .flatten()
            .flat_map(|page| page.nodes)
    }
}
