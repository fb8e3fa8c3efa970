//! Client for the PocketBase REST API.
//!
//! A [`BackendClient`] is a plain value: the shared connection pool, the
//! base URL and, for signed-in requests, the user's token. Each request
//! builds its own client from the session cookie, so no auth state is shared
//! between requests.

pub mod error;
pub mod filter;

pub use self::error::{ApiErrorBody, BackendError};
pub use self::filter::{Filter, Sort};

use std::fmt;

use reqwest::{Method, RequestBuilder, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use shared::types::{AuthResponse, ListResult};

pub const MUSIC_POSTS: &str = "music_posts";
pub const USERS: &str = "users";

#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl BackendClient {
    /// Anonymous client.
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn collection<'a>(&'a self, name: &'a str) -> Collection<'a> {
        Collection { client: self, name }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.header(header::AUTHORIZATION, token),
            None => builder,
        }
    }
}

/// Optional list parameters.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub sort: Option<Sort>,
    pub filter: Option<Filter>,
}

/// Operations on one named collection.
pub struct Collection<'a> {
    client: &'a BackendClient,
    name: &'a str,
}

impl Collection<'_> {
    fn records_url(&self) -> String {
        format!(
            "{}/api/collections/{}/records",
            self.client.base_url, self.name
        )
    }

    fn record_url(&self, id: &str) -> String {
        format!("{}/{}", self.records_url(), urlencoding::encode(id))
    }

    pub async fn create<B, R>(&self, body: &B) -> Result<R, BackendError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!("Creating record in {}", self.name);
        let req = self
            .client
            .request(Method::POST, &self.records_url())
            .json(body);
        send_json(req).await
    }

    /// Replace the given fields on an existing record.
    pub async fn update<B, R>(&self, id: &str, body: &B) -> Result<R, BackendError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        debug!("Updating record {} in {}", id, self.name);
        let req = self
            .client
            .request(Method::PATCH, &self.record_url(id))
            .json(body);
        send_json(req).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), BackendError> {
        debug!("Deleting record {} from {}", id, self.name);
        let req = self.client.request(Method::DELETE, &self.record_url(id));
        send(req).await.map(|_| ())
    }

    pub async fn get_one<R>(&self, id: &str) -> Result<R, BackendError>
    where
        R: DeserializeOwned,
    {
        let req = self.client.request(Method::GET, &self.record_url(id));
        send_json(req).await
    }

    pub async fn get_list<R>(
        &self,
        page: u32,
        per_page: u32,
        options: &ListOptions,
    ) -> Result<ListResult<R>, BackendError>
    where
        R: DeserializeOwned,
    {
        let mut query: Vec<(&str, String)> = vec![
            ("page", page.to_string()),
            ("perPage", per_page.to_string()),
        ];
        if let Some(sort) = &options.sort {
            query.push(("sort", sort.render()));
        }
        if let Some(filter) = &options.filter {
            query.push(("filter", filter.render()));
        }

        debug!("Listing {} page {} ({} per page)", self.name, page, per_page);
        let req = self
            .client
            .request(Method::GET, &self.records_url())
            .query(&query);
        send_json(req).await
    }

    /// Password sign-in against an auth collection.
    pub async fn auth_with_password(
        &self,
        identity: &str,
        password: &str,
    ) -> Result<AuthResponse, BackendError> {
        let url = format!(
            "{}/api/collections/{}/auth-with-password",
            self.client.base_url, self.name
        );
        let body = serde_json::json!({ "identity": identity, "password": password });
        let req = self.client.request(Method::POST, &url).json(&body);
        send_json(req).await
    }
}

async fn send(req: RequestBuilder) -> Result<bytes::Bytes, BackendError> {
    let response = req.send().await?;
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(BackendError::Status {
            status: status.as_u16(),
            body: ApiErrorBody::from_bytes(status.as_u16(), &body),
        });
    }

    Ok(body)
}

async fn send_json<R: DeserializeOwned>(req: RequestBuilder) -> Result<R, BackendError> {
    let body = send(req).await?;
    Ok(serde_json::from_slice(&body)?)
}
