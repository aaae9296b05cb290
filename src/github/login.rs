//! Identity wrappers for GitHub logins and tokens.

use std::collections::HashSet;
use std::fmt;

use super::error::FetchError;

/// GitHub login after request-level normalisation.
///
/// Normalisation trims surrounding whitespace, then removes one leading and
/// one trailing double quote. Nothing else is validated: an empty login is
/// passed through and GitHub reports it as a per-user error.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Normalises a raw login as received in a request body.
    ///
    /// # Example
    ///
    /// ```
    /// use interaction_fetcher::github::Username;
    ///
    /// assert_eq!(Username::normalise(" \"bob\" ").as_str(), "bob");
    /// assert_eq!(Username::normalise("alice").as_str(), "alice");
    /// ```
    #[must_use]
    pub fn normalise(raw: &str) -> Self {
        let trimmed = raw.trim();
        let unquoted_start = trimmed.strip_prefix('"').unwrap_or(trimmed);
        let unquoted = unquoted_start.strip_suffix('"').unwrap_or(unquoted_start);
        Self(unquoted.to_owned())
    }

    /// Borrow the login value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Normalised, deduplicated logins for one request.
///
/// Iteration yields logins in first-occurrence order; later duplicates are
/// dropped silently. Comparison is exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsernameSet {
    ordered: Vec<Username>,
}

impl UsernameSet {
    /// Builds the set from raw request values.
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let ordered = raw
            .into_iter()
            .map(|value| Username::normalise(value.as_ref()))
            .filter(|username| seen.insert(username.clone()))
            .collect();
        Self { ordered }
    }

    /// Number of unique logins.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.ordered.len()
    }

    /// Returns true when the request named no logins.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.ordered.is_empty()
    }

    /// Iterates the logins in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = &Username> {
        self.ordered.iter()
    }
}

impl IntoIterator for UsernameSet {
    type Item = Username;
    type IntoIter = std::vec::IntoIter<Username>;

    fn into_iter(self) -> Self::IntoIter {
        self.ordered.into_iter()
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, FetchError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(FetchError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}
