//! HTTP surface for the batch engine.
//!
//! One JSON endpoint accepts the logins to look up; every other route falls
//! back to the configured static `index.html`.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use camino::Utf8Path;
use serde::Deserialize;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;

use crate::github::{FetchError, InteractionGateway};
use crate::interactions::BatchCoordinator;

/// Route of the user lookup endpoint.
pub const USER_INFO_PATH: &str = "/api/v1/userInfo";

/// Request body of the user lookup endpoint.
///
/// Both `{"users": [...]}` and a bare JSON array are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum UserInfoRequest {
    /// Object form with a required `users` array.
    Wrapped {
        /// Logins to look up.
        users: Vec<String>,
    },
    /// Bare array of logins.
    Bare(Vec<String>),
}

impl UserInfoRequest {
    /// Consumes the request and returns the raw logins.
    #[must_use]
    pub fn into_users(self) -> Vec<String> {
        match self {
            Self::Wrapped { users } | Self::Bare(users) => users,
        }
    }
}

/// Builds the service router.
pub fn router<G>(coordinator: Arc<BatchCoordinator<G>>, static_dir: Option<&Utf8Path>) -> Router
where
    G: InteractionGateway + 'static,
{
    let routes = Router::new()
        .route(USER_INFO_PATH, post(user_info::<G>))
        .with_state(coordinator);

    let with_fallback = match static_dir {
        Some(dir) => routes.fallback_service(ServeFile::new(dir.join("index.html"))),
        None => routes,
    };

    with_fallback.layer(TraceLayer::new_for_http())
}

/// Binds `address` and serves `app` until the process stops.
///
/// # Errors
///
/// Returns [`FetchError::Io`] when the address cannot be bound or the server
/// fails.
pub async fn serve(address: &str, app: Router) -> Result<(), FetchError> {
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| FetchError::Io {
            message: format!("failed to bind {address}: {error}"),
        })?;
    tracing::info!("listening on {address}");

    axum::serve(listener, app)
        .await
        .map_err(|error| FetchError::Io {
            message: format!("server error: {error}"),
        })
}

async fn user_info<G>(
    State(coordinator): State<Arc<BatchCoordinator<G>>>,
    payload: Result<Json<UserInfoRequest>, JsonRejection>,
) -> Response
where
    G: InteractionGateway + 'static,
{
    match payload {
        Ok(Json(request)) => {
            let result = coordinator.fetch_user_info(request.into_users()).await;
            (StatusCode::OK, Json(result)).into_response()
        }
        Err(rejection) => {
            tracing::debug!("rejected user info request: {}", rejection.body_text());
            (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": rejection.body_text() })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use camino::Utf8Path;
    use rstest::rstest;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::{USER_INFO_PATH, UserInfoRequest, router};
    use crate::github::{
        CollectionPage, InteractionPage, MockInteractionGateway, PageState, PerCollection, RepoRef,
    };
    use crate::interactions::{BatchCoordinator, WalkOptions};

    fn app(gateway: MockInteractionGateway, static_dir: Option<&Utf8Path>) -> Router {
        let coordinator = Arc::new(BatchCoordinator::new(
            Arc::new(gateway),
            WalkOptions::default(),
        ));
        router(coordinator, static_dir)
    }

    fn repositories_gateway() -> MockInteractionGateway {
        let mut gateway = MockInteractionGateway::new();
        gateway.expect_fetch().returning(|query| {
            Ok(InteractionPage {
                collections: PerCollection {
                    repositories: Some(CollectionPage {
                        nodes: vec![RepoRef::public(format!(
                            "https://github.com/{}/repo",
                            query.login
                        ))],
                        page_state: PageState::default(),
                    }),
                    ..PerCollection::default()
                },
            })
        });
        gateway
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::post(USER_INFO_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .expect("request should build")
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        serde_json::from_slice(&bytes).expect("body should be JSON")
    }

    #[rstest]
    #[case::wrapped(r#"{"users": ["octocat"]}"#)]
    #[case::bare(r#"["octocat"]"#)]
    #[tokio::test]
    async fn user_info_returns_aggregated_result(#[case] body: &str) {
        let response = app(repositories_gateway(), None)
            .oneshot(post_json(body))
            .await
            .expect("router should respond");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            json!({ "urls": ["https://github.com/octocat/repo"], "errors": [] })
        );
    }

    #[rstest]
    #[case::missing_users(r#"{"people": ["octocat"]}"#)]
    #[case::not_json("octocat")]
    #[case::wrong_element_type(r#"[1, 2]"#)]
    #[tokio::test]
    async fn malformed_body_is_rejected(#[case] body: &str) {
        let gateway = MockInteractionGateway::new();

        let response = app(gateway, None)
            .oneshot(post_json(body))
            .await
            .expect("router should respond");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let payload = json_body(response).await;
        assert!(payload.get("error").is_some(), "unexpected body: {payload}");
    }

    #[tokio::test]
    async fn unknown_route_serves_index_page() {
        let dir = tempfile::TempDir::new().expect("temp dir should be created");
        std::fs::write(dir.path().join("index.html"), "<h1>fetcher</h1>")
            .expect("index should be written");
        let static_dir = Utf8Path::from_path(dir.path()).expect("temp dir should be UTF-8");

        let response = app(MockInteractionGateway::new(), Some(static_dir))
            .oneshot(
                Request::get("/some/page")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("router should respond");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        assert_eq!(bytes.as_ref(), b"<h1>fetcher</h1>");
    }

    #[tokio::test]
    async fn unknown_route_is_not_found_without_static_dir() {
        let response = app(MockInteractionGateway::new(), None)
            .oneshot(
                Request::get("/some/page")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("router should respond");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[rstest]
    fn request_forms_yield_the_same_users() {
        let wrapped: UserInfoRequest =
            serde_json::from_str(r#"{"users": ["a", "b"]}"#).expect("wrapped form parses");
        let bare: UserInfoRequest =
            serde_json::from_str(r#"["a", "b"]"#).expect("bare form parses");

        assert_eq!(wrapped.into_users(), bare.into_users());
    }
}
