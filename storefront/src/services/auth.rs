// storefront/src/services/auth.rs

//! Client for the hosted auth service (`{project}/auth/v1`).

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::services::session::AuthUser;

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[async_trait]
pub trait Authenticator: Send + Sync {
  async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser>;

  /// Resolves a bearer token to the user it was issued to.
  async fn user_for_token(&self, access_token: &str) -> Result<AuthUser>;

  async fn sign_out(&self, access_token: &str) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct RemoteUser {
  id: Uuid,
  email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
  access_token: String,
  user: RemoteUser,
}

#[derive(Debug, Clone)]
pub struct AuthClient {
  client: Client,
  auth_url: String,
  api_key: String,
}

impl AuthClient {
  pub fn new(client: Client, config: &AppConfig) -> Self {
    Self {
      client,
      auth_url: config.auth_url(),
      api_key: config.supabase_anon_key.clone(),
    }
  }

  async fn send(request: reqwest::RequestBuilder) -> Result<Response> {
    let response = request
      .send()
      .await
      .map_err(|e| AppError::Internal(format!("Auth service unreachable: {}", e)))?;
    let status = response.status();
    if status.is_success() {
      return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), %body, "Auth service rejected request.");
    Err(AppError::Auth(format!("auth service returned {}", status.as_u16())))
  }

  async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    response
      .json::<T>()
      .await
      .map_err(|e| AppError::Internal(format!("Unexpected auth service response: {}", e)))
  }
}

#[async_trait]
impl Authenticator for AuthClient {
  #[instrument(name = "AuthClient::sign_in", skip(self, password), fields(email = %email), err(Display))]
  async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
    let request = self
      .client
      .post(format!("{}/token", self.auth_url))
      .query(&[("grant_type", "password")])
      .header("apikey", &self.api_key)
      .json(&json!({ "email": email, "password": password }));
    let token: TokenResponse = Self::decode(Self::send(request).await?).await?;
    info!(user_id = %token.user.id, "Signed in.");
    Ok(AuthUser {
      id: token.user.id,
      email: token.user.email,
      access_token: token.access_token,
    })
  }

  #[instrument(name = "AuthClient::user_for_token", skip_all, err(Display))]
  async fn user_for_token(&self, access_token: &str) -> Result<AuthUser> {
    let request = self
      .client
      .get(format!("{}/user", self.auth_url))
      .header("apikey", &self.api_key)
      .header(header::AUTHORIZATION, format!("Bearer {}", access_token));
    let user: RemoteUser = Self::decode(Self::send(request).await?).await?;
    Ok(AuthUser {
      id: user.id,
      email: user.email,
      access_token: access_token.to_string(),
    })
  }

  #[instrument(name = "AuthClient::sign_out", skip_all, err(Display))]
  async fn sign_out(&self, access_token: &str) -> Result<()> {
    let request = self
      .client
      .post(format!("{}/logout", self.auth_url))
      .header("apikey", &self.api_key)
      .header(header::AUTHORIZATION, format!("Bearer {}", access_token));
    Self::send(request).await?;
    Ok(())
  }
}
