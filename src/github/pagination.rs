//! Cursor state for walking a user's interaction collections.
//!
//! Each collection keeps its own [`PaginationCursor`]. A [`FetchState`] owns
//! the four cursors for one user and derives the next query from them, so the
//! initial query and every continuation are built by the same function.

use super::login::Username;
use super::models::{
    Collection, CollectionRequest, InteractionPage, InteractionQuery, PageState, PerCollection,
};

/// Position within one collection.
///
/// A fresh cursor has no token and reports more pages, which requests the
/// first page. Once `has_more` turns false the cursor is closed for good.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationCursor {
    token: Option<String>,
    has_more: bool,
}

impl PaginationCursor {
    /// Cursor positioned before the first page.
    #[must_use]
    pub const fn start() -> Self {
        Self {
            token: None,
            has_more: true,
        }
    }

    /// Returns true while further pages should be requested.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    /// Paging instruction for the next query.
    #[must_use]
    pub fn request(&self) -> CollectionRequest {
        match (&self.token, self.has_more) {
            (_, false) => CollectionRequest::Skip,
            (None, true) => CollectionRequest::First,
            (Some(token), true) => CollectionRequest::After(token.clone()),
        }
    }

    /// Applies the pagination state of a freshly fetched page.
    ///
    /// Returns false when the page claimed more results without supplying an
    /// end cursor; the cursor is closed in that case.
    fn advance(&mut self, page_state: Option<&PageState>) -> bool {
        if !self.has_more {
            return true;
        }
        let Some(state) = page_state else {
            self.has_more = false;
            return true;
        };

        match (&state.end_cursor, state.has_next_page) {
            (Some(cursor), true) => {
                self.token = Some(cursor.clone());
                true
            }
            (None, true) => {
                self.has_more = false;
                false
            }
            (end_cursor, false) => {
                self.token.clone_from(end_cursor);
                self.has_more = false;
                true
            }
        }
    }
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self::start()
    }
}

/// Per-user pagination state across all four collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchState {
    username: Username,
    cursors: PerCollection<PaginationCursor>,
}

impl FetchState {
    /// State before the initial fetch.
    #[must_use]
    pub fn new(username: Username) -> Self {
        Self {
            username,
            cursors: PerCollection::default(),
        }
    }

    /// Borrow the cursor for `collection`.
    #[must_use]
    pub const fn cursor(&self, collection: Collection) -> &PaginationCursor {
        self.cursors.get(collection)
    }

    /// Returns true once every collection reports no further pages.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.cursors.iter().all(|(_, cursor)| !cursor.has_more())
    }

    /// Builds the next query from the current cursors.
    ///
    /// Exhausted collections are skipped. Returns `None` when nothing is left
    /// to fetch.
    #[must_use]
    pub fn next_query(&self) -> Option<InteractionQuery> {
        if self.is_exhausted() {
            return None;
        }
        Some(InteractionQuery {
            login: self.username.clone(),
            requests: PerCollection::from_fn(|collection| self.cursor(collection).request()),
        })
    }

    /// Folds a fetched page into the cursors.
    ///
    /// Returns the collections whose page claimed more results but carried no
    /// end cursor. Those collections are closed.
    pub fn record(&mut self, page: &InteractionPage) -> Vec<Collection> {
        Collection::ALL
            .into_iter()
            .filter(|collection| {
                let page_state = page
                    .collections
                    .get(*collection)
                    .as_ref()
                    .map(|collection_page| &collection_page.page_state);
                !self.cursors.get_mut(*collection).advance(page_state)
            })
            .collect()
    }
}
