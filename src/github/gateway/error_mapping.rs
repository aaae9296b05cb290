//! Error mapping helpers for the Octocrab interaction gateway.
//!
//! Transport and HTTP-status failures arrive as [`octocrab::Error`]. GraphQL
//! failures arrive inside a 200 response as an `errors` array and are mapped
//! separately.

use http::StatusCode;

use crate::github::error::FetchError;

/// GraphQL error types that mean the token lacks access.
const AUTH_ERROR_TYPES: [&str; 2] = ["FORBIDDEN", "INSUFFICIENT_SCOPES"];

/// One entry of a GraphQL `errors` array.
pub(super) struct GraphQlErrorEntry {
    /// The `type` field, e.g. `NOT_FOUND`.
    pub(super) kind: Option<String>,
    pub(super) message: String,
}

/// Checks if a GitHub error status indicates an authentication failure.
const fn is_auth_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Checks if an octocrab error represents a network/transport issue.
const fn is_network_error(error: &octocrab::Error) -> bool {
    matches!(
        error,
        octocrab::Error::Http { .. }
            | octocrab::Error::Hyper { .. }
            | octocrab::Error::Service { .. }
    )
}

pub(super) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> FetchError {
    if let octocrab::Error::GitHub { source, .. } = error {
        let status = source.status_code;
        let message = &source.message;
        return if is_auth_failure(status) {
            FetchError::Authentication {
                message: format!("{operation} failed: GitHub returned {status} {message}"),
            }
        } else {
            FetchError::Api {
                message: format!("{operation} failed with status {status}: {message}"),
            }
        };
    }

    if is_network_error(error) {
        return FetchError::Network {
            message: format!("{operation} failed: {error}"),
        };
    }

    FetchError::Api {
        message: format!("{operation} failed: {error}"),
    }
}

/// Maps a non-empty GraphQL `errors` array.
///
/// Scope and permission errors become [`FetchError::Authentication`]; anything
/// else, including unknown logins, becomes [`FetchError::GraphQl`].
pub(super) fn map_graphql_errors(
    entries: impl IntoIterator<Item = GraphQlErrorEntry>,
) -> FetchError {
    let mut auth_failure = false;
    let messages: Vec<String> = entries
        .into_iter()
        .map(|entry| {
            auth_failure |= entry
                .kind
                .as_deref()
                .is_some_and(|kind| AUTH_ERROR_TYPES.contains(&kind));
            entry.message
        })
        .collect();

    if auth_failure {
        FetchError::Authentication {
            message: messages.join("; "),
        }
    } else {
        FetchError::GraphQl { messages }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{GraphQlErrorEntry, map_graphql_errors};
    use crate::github::error::FetchError;

    fn entry(kind: Option<&str>, message: &str) -> GraphQlErrorEntry {
        GraphQlErrorEntry {
            kind: kind.map(str::to_owned),
            message: message.to_owned(),
        }
    }

    #[rstest]
    fn unknown_login_maps_to_graphql_error() {
        let error = map_graphql_errors([entry(Some("NOT_FOUND"), "no such user")]);

        assert_eq!(
            error,
            FetchError::GraphQl {
                messages: vec!["no such user".to_owned()],
            }
        );
    }

    #[rstest]
    #[case("FORBIDDEN")]
    #[case("INSUFFICIENT_SCOPES")]
    fn permission_errors_map_to_authentication(#[case] kind: &str) {
        let error = map_graphql_errors([
            entry(None, "first"),
            entry(Some(kind), "token lacks read:user"),
        ]);

        assert_eq!(
            error,
            FetchError::Authentication {
                message: "first; token lacks read:user".to_owned(),
            }
        );
    }
}
