//! Async HTTP client wrapping the phonebook REST backend.

use std::time::Duration;

use anyhow::{Context, Result};
use phonebook_core::contact::{
  Contact, ContactDraft, ContactFlag, Snapshot, vocabulary_from_value,
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, warn};

/// How many records the directory asks for in one snapshot.
pub const DIRECTORY_LIMIT: usize = 1000;

/// How many records the admin table asks for.
pub const ADMIN_LIMIT: usize = 500;

/// Connection settings for the backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  /// Bearer token from a previous `login`, if any.
  pub token:    Option<String>,
}

/// A non-2xx response from the backend.
#[derive(Debug, Error)]
pub enum ClientError {
  #[error("not authorized: {0}")]
  Unauthorized(String),

  #[error("forbidden: {0}")]
  Forbidden(String),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("server error: {0}")]
  Server(String),

  #[error("request failed ({status}): {message}")]
  Status { status: StatusCode, message: String },
}

impl ClientError {
  async fn from_response(resp: Response) -> Self {
    let status = resp.status();
    let body: Option<Value> = resp.json().await.ok();
    let message = body
      .as_ref()
      .and_then(|v| v.get("message").or_else(|| v.get("detail")))
      .and_then(Value::as_str)
      .map(str::to_owned)
      .unwrap_or_else(|| {
        status.canonical_reason().unwrap_or("request failed").to_owned()
      });

    match status {
      StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
      StatusCode::FORBIDDEN => Self::Forbidden(message),
      StatusCode::NOT_FOUND => Self::NotFound(message),
      s if s.is_server_error() => Self::Server(message),
      status => Self::Status { status, message },
    }
  }

  /// Whether `err` is (or wraps) a 401 from the backend.
  pub fn is_unauthorized(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<Self>(), Some(Self::Unauthorized(_)))
  }
}

#[derive(Deserialize)]
struct LoginResponse {
  access_token: String,
}

/// Accept either a bare contact object or `{ "contact": {...} }`.
fn contact_from_body(body: &Value) -> Option<Contact> {
  let obj = body.get("contact").unwrap_or(body);
  Contact::from_value(obj).ok()
}

/// Async HTTP client for the phonebook REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  pub fn set_token(&mut self, token: Option<String>) { self.config.token = token; }

  pub fn has_token(&self) -> bool { self.config.token.is_some() }

  pub fn base_url(&self) -> &str { &self.config.base_url }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn auth(&self, req: RequestBuilder) -> RequestBuilder {
    match &self.config.token {
      Some(token) => req.bearer_auth(token),
      None => req,
    }
  }

  async fn send(&self, req: RequestBuilder, what: &str) -> Result<Response> {
    let resp = self
      .auth(req)
      .send()
      .await
      .with_context(|| format!("{what} failed"))?;

    if !resp.status().is_success() {
      let err = ClientError::from_response(resp).await;
      warn!(%err, "{what}");
      return Err(err.into());
    }
    debug!(status = %resp.status(), "{what}");
    Ok(resp)
  }

  async fn json(&self, req: RequestBuilder, what: &str) -> Result<Value> {
    self
      .send(req, what)
      .await?
      .json()
      .await
      .with_context(|| format!("decoding {what} response"))
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  /// `GET /api/contacts?page=1&limit=<n>&sortBy=name[&include_pictures=true]`
  pub async fn list_contacts(
    &self,
    limit: usize,
    include_pictures: bool,
  ) -> Result<Snapshot> {
    let mut query = vec![
      ("page", "1".to_string()),
      ("limit", limit.to_string()),
      ("sortBy", "name".to_string()),
    ];
    if include_pictures {
      query.push(("include_pictures", "true".to_string()));
    }

    let body = self
      .json(self.client.get(self.url("/contacts")).query(&query), "GET /contacts")
      .await?;
    Ok(Snapshot::from_value(&body))
  }

  /// `GET /api/contacts/{id}`
  pub async fn get_contact(&self, id: &str) -> Result<Contact> {
    let what = format!("GET /contacts/{id}");
    let body = self
      .json(self.client.get(self.url(&format!("/contacts/{id}"))), &what)
      .await?;
    contact_from_body(&body).with_context(|| format!("decoding {what} response"))
  }

  /// `GET /api/tags`
  pub async fn tags(&self) -> Result<Vec<String>> {
    let body = self.json(self.client.get(self.url("/tags")), "GET /tags").await?;
    Ok(vocabulary_from_value(&body, "tags"))
  }

  /// `GET /api/languages`
  pub async fn languages(&self) -> Result<Vec<String>> {
    let body = self
      .json(self.client.get(self.url("/languages")), "GET /languages")
      .await?;
    Ok(vocabulary_from_value(&body, "languages"))
  }

  // ── Admin writes ──────────────────────────────────────────────────────────

  /// `POST /api/admin/contacts`
  pub async fn create_contact(&self, draft: &ContactDraft) -> Result<Option<Contact>> {
    let body = self
      .json(
        self.client.post(self.url("/admin/contacts")).json(draft),
        "POST /admin/contacts",
      )
      .await?;
    Ok(contact_from_body(&body))
  }

  /// `PUT /api/admin/contacts/{id}`
  pub async fn update_contact(
    &self,
    id: &str,
    draft: &ContactDraft,
  ) -> Result<Option<Contact>> {
    let what = format!("PUT /admin/contacts/{id}");
    let body = self
      .json(
        self
          .client
          .put(self.url(&format!("/admin/contacts/{id}")))
          .json(draft),
        &what,
      )
      .await?;
    Ok(contact_from_body(&body))
  }

  /// `DELETE /api/admin/contacts/{id}`
  pub async fn delete_contact(&self, id: &str) -> Result<()> {
    let what = format!("DELETE /admin/contacts/{id}");
    self
      .send(self.client.delete(self.url(&format!("/admin/contacts/{id}"))), &what)
      .await?;
    Ok(())
  }

  /// `PATCH /api/admin/contacts/{id}/{flag}?{key}=<value>`
  pub async fn set_flag(&self, id: &str, flag: ContactFlag, value: bool) -> Result<()> {
    let path = format!("/admin/contacts/{id}/{}", flag.path_segment());
    let what = format!("PATCH {path}");
    self
      .send(
        self
          .client
          .patch(self.url(&path))
          .query(&[(flag.query_key(), value.to_string())]),
        &what,
      )
      .await?;
    Ok(())
  }

  // ── Auth ──────────────────────────────────────────────────────────────────

  /// `POST /api/auth/login` — returns the bearer token.
  pub async fn login(&self, username: &str, password: &str) -> Result<String> {
    let resp = self
      .send(
        self
          .client
          .post(self.url("/auth/login"))
          .json(&json!({ "username": username, "password": password })),
        "POST /auth/login",
      )
      .await?;
    let body: LoginResponse = resp.json().await.context("decoding login response")?;
    Ok(body.access_token)
  }

  /// `GET /api/auth/me`
  pub async fn me(&self) -> Result<Value> {
    self.json(self.client.get(self.url("/auth/me")), "GET /auth/me").await
  }
}
