//! Octocrab-backed GraphQL gateway for user interactions.

use async_trait::async_trait;
use http::Uri;
use octocrab::Octocrab;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::github::error::FetchError;
use crate::github::login::PersonalAccessToken;
use crate::github::models::{
    Collection, CollectionPage, CollectionRequest, InteractionPage, InteractionQuery, PageState,
    PerCollection, RepoRef,
};

use super::InteractionGateway;
use super::error_mapping::{GraphQlErrorEntry, map_graphql_errors, map_octocrab_error};

/// Nodes requested per collection page; the GraphQL API maximum.
pub const DEFAULT_PAGE_SIZE: u8 = 100;

const REPOSITORY_FIELDS: &str = "url isPrivate";
const PAGE_INFO_FIELDS: &str = "pageInfo { endCursor hasNextPage }";

/// Octocrab-backed interaction gateway.
pub struct OctocrabInteractionGateway {
    client: Octocrab,
    page_size: u8,
}

impl OctocrabInteractionGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self {
            client,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Builds an Octocrab client for the given token and API base URL.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::InvalidUrl` when the base URI cannot be parsed or
    /// `FetchError::Api` when Octocrab fails to construct a client.
    pub fn for_token(token: &PersonalAccessToken, api_base: &str) -> Result<Self, FetchError> {
        let base_uri: Uri = api_base
            .parse::<Uri>()
            .map_err(|error| FetchError::InvalidUrl(format!("{api_base}: {error}")))?;

        let octocrab = Octocrab::builder()
            .personal_token(token.as_ref())
            .base_uri(base_uri)
            .map_err(|error| FetchError::InvalidUrl(format!("{api_base}: {error}")))?
            .build()
            .map_err(|error| map_octocrab_error("build client", &error))?;
        Ok(Self::new(octocrab))
    }

    /// Overrides the number of nodes requested per collection page.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Configuration` unless `page_size` is within
    /// `1..=100`.
    pub fn with_page_size(mut self, page_size: u8) -> Result<Self, FetchError> {
        validate_page_size(page_size)?;
        self.page_size = page_size;
        Ok(self)
    }
}

#[async_trait]
impl InteractionGateway for OctocrabInteractionGateway {
    async fn fetch(&self, query: &InteractionQuery) -> Result<InteractionPage, FetchError> {
        let payload = serde_json::json!({
            "query": build_query_document(query, self.page_size),
            "variables": build_variables(query),
        });

        let response: ApiResponse = self
            .client
            .graphql(&payload)
            .await
            .map_err(|error| map_octocrab_error("user interactions", &error))?;

        response.into_page(query)
    }
}

fn validate_page_size(page_size: u8) -> Result<(), FetchError> {
    if page_size == 0 || page_size > DEFAULT_PAGE_SIZE {
        return Err(FetchError::Configuration {
            message: format!(
                "page size must be between 1 and {DEFAULT_PAGE_SIZE}, got {page_size}"
            ),
        });
    }
    Ok(())
}

/// Renders the GraphQL document for the collections the query requests.
fn build_query_document(query: &InteractionQuery, page_size: u8) -> String {
    let mut declarations = String::from("$login: String!");
    let mut selections = String::new();

    for (collection, request) in query.requested() {
        let arguments = match request {
            CollectionRequest::After(_) => {
                let variable = collection.cursor_variable();
                declarations.push_str(&format!(", ${variable}: String"));
                format!("first: {page_size}, after: ${variable}")
            }
            CollectionRequest::First | CollectionRequest::Skip => format!("first: {page_size}"),
        };
        let nodes = if collection.yields_repositories() {
            format!("nodes {{ {REPOSITORY_FIELDS} }}")
        } else {
            format!("nodes {{ repository {{ {REPOSITORY_FIELDS} }} }}")
        };
        selections.push_str(&format!(
            " {field}({arguments}) {{ {nodes} {PAGE_INFO_FIELDS} }}",
            field = collection.field_name(),
        ));
    }

    format!("query({declarations}) {{ user(login: $login) {{{selections} }} }}")
}

fn build_variables(query: &InteractionQuery) -> Value {
    let mut variables = Map::new();
    variables.insert(
        "login".to_owned(),
        Value::String(query.login.as_str().to_owned()),
    );
    for (collection, request) in query.requested() {
        if let CollectionRequest::After(cursor) = request {
            variables.insert(
                collection.cursor_variable().to_owned(),
                Value::String(cursor.clone()),
            );
        }
    }
    Value::Object(variables)
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    data: Option<ApiData>,
    errors: Option<Vec<ApiGraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct ApiGraphQlError {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    user: Option<ApiUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUser {
    issues: Option<ApiConnection<ApiRepositoryHolder>>,
    issue_comments: Option<ApiConnection<ApiRepositoryHolder>>,
    repositories: Option<ApiConnection<ApiRepository>>,
    repositories_contributed_to: Option<ApiConnection<ApiRepository>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", bound(deserialize = "N: Deserialize<'de>"))]
struct ApiConnection<N> {
    #[serde(default)]
    nodes: Vec<Option<N>>,
    page_info: ApiPageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiPageInfo {
    end_cursor: Option<String>,
    has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiRepository {
    url: String,
    is_private: bool,
}

#[derive(Debug, Deserialize)]
struct ApiRepositoryHolder {
    repository: Option<ApiRepository>,
}

impl From<ApiRepository> for RepoRef {
    fn from(value: ApiRepository) -> Self {
        Self {
            url: value.url,
            is_private: value.is_private,
        }
    }
}

impl From<ApiGraphQlError> for GraphQlErrorEntry {
    fn from(value: ApiGraphQlError) -> Self {
        Self {
            kind: value.kind,
            message: value.message,
        }
    }
}

impl From<ApiPageInfo> for PageState {
    fn from(value: ApiPageInfo) -> Self {
        Self {
            end_cursor: value.end_cursor,
            has_next_page: value.has_next_page,
        }
    }
}

impl ApiConnection<ApiRepository> {
    fn into_page(self) -> CollectionPage {
        CollectionPage {
            nodes: self.nodes.into_iter().flatten().map(RepoRef::from).collect(),
            page_state: self.page_info.into(),
        }
    }
}

impl ApiConnection<ApiRepositoryHolder> {
    fn into_page(self) -> CollectionPage {
        CollectionPage {
            nodes: self
                .nodes
                .into_iter()
                .flatten()
                .filter_map(|holder| holder.repository)
                .map(RepoRef::from)
                .collect(),
            page_state: self.page_info.into(),
        }
    }
}

impl ApiResponse {
    fn into_page(self, query: &InteractionQuery) -> Result<InteractionPage, FetchError> {
        if let Some(errors) = self.errors.filter(|errors| !errors.is_empty()) {
            return Err(map_graphql_errors(errors.into_iter().map(GraphQlErrorEntry::from)));
        }

        let user = self
            .data
            .ok_or_else(|| FetchError::MalformedResponse {
                message: "response has no data".to_owned(),
            })?
            .user
            .ok_or_else(|| FetchError::MalformedResponse {
                message: format!("no user returned for login '{}'", query.login),
            })?;

        let collections = PerCollection {
            issues: user.issues.map(ApiConnection::<ApiRepositoryHolder>::into_page),
            issue_comments: user
                .issue_comments
                .map(ApiConnection::<ApiRepositoryHolder>::into_page),
            repositories: user
                .repositories
                .map(ApiConnection::<ApiRepository>::into_page),
            repositories_contributed_to: user
                .repositories_contributed_to
                .map(ApiConnection::<ApiRepository>::into_page),
        };

        ensure_requested_collections_present(query, &collections)?;
        Ok(InteractionPage { collections })
    }
}

fn ensure_requested_collections_present(
    query: &InteractionQuery,
    collections: &PerCollection<Option<CollectionPage>>,
) -> Result<(), FetchError> {
    let missing: Vec<Collection> = query
        .requested()
        .map(|(collection, _)| collection)
        .filter(|collection| collections.get(*collection).is_none())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    let fields: Vec<&str> = missing.into_iter().map(Collection::field_name).collect();
    Err(FetchError::MalformedResponse {
        message: format!("requested collections missing: {}", fields.join(", ")),
    })
}
