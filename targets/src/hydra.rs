//! Ory Hydra adapter: OAuth2 client-credentials grants and introspection

use async_trait::async_trait;
use rand::distr::Alphanumeric;
use rand::Rng;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ory_bench_core::{TargetAdapter, TargetError};

use crate::http;

const CLIENT_NAME: &str = "ory-bench-client";
const TOKEN_SCOPE: &str = "read";

/// Adapter exercising Ory Hydra.
///
/// `setup` registers one shared OAuth2 client; every `write` performs a
/// client-credentials grant against it (each grant mints a distinct token),
/// and every `read` introspects the granted token on the admin API.
pub struct HydraAdapter {
    http: reqwest::Client,
    admin_url: String,
    public_url: String,
    client_id: String,
    client_secret: String,
}

/// Bearer token minted by a successful grant; the minimal payload the
/// paired introspection needs.
#[derive(Debug, Clone)]
pub struct AccessToken(String);

impl HydraAdapter {
    /// Create an adapter for the given admin and public base URLs.
    ///
    /// The OAuth2 client credentials are generated here (fresh UUID id,
    /// random secret) and registered later by `setup`.
    pub fn new(
        admin_url: impl Into<String>,
        public_url: impl Into<String>,
    ) -> Result<Self, TargetError> {
        let client_secret: String = rand::rng()
            .sample_iter(&Alphanumeric)
            .take(20)
            .map(char::from)
            .collect();

        Ok(Self {
            http: http::build_client()?,
            admin_url: admin_url.into(),
            public_url: public_url.into(),
            client_id: Uuid::new_v4().to_string(),
            client_secret,
        })
    }
}

#[derive(Serialize)]
struct CreateClientRequest<'a> {
    access_token_strategy: &'a str,
    client_id: &'a str,
    client_name: &'a str,
    client_secret: &'a str,
    client_secret_expires_at: i64,
    grant_types: &'a [&'a str],
    response_types: &'a [&'a str],
    scope: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct IntrospectionResponse {
    active: bool,
}

#[async_trait]
impl TargetAdapter for HydraAdapter {
    type Item = AccessToken;

    fn name(&self) -> &'static str {
        "hydra"
    }

    /// Register the shared OAuth2 client. Expects 201.
    async fn setup(&self) -> Result<(), TargetError> {
        let body = CreateClientRequest {
            access_token_strategy: "jwt",
            client_id: &self.client_id,
            client_name: CLIENT_NAME,
            client_secret: &self.client_secret,
            client_secret_expires_at: 0,
            grant_types: &["authorization_code", "refresh_token", "client_credentials"],
            response_types: &["token", "code"],
            scope: "openid offline read",
        };

        let response = self
            .http
            .post(format!("{}/admin/clients", self.admin_url))
            .json(&body)
            .send()
            .await
            .map_err(http::transport)?;
        http::expect_status(response, StatusCode::CREATED).await?;

        tracing::info!(client_id = %self.client_id, "OAuth2 client registered");
        Ok(())
    }

    /// Client-credentials grant. Expects 200 with an access token.
    async fn write(&self) -> Result<Self::Item, TargetError> {
        let response = self
            .http
            .post(format!("{}/oauth2/token", self.public_url))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials"), ("scope", TOKEN_SCOPE)])
            .send()
            .await
            .map_err(http::transport)?;
        let response = http::expect_status(response, StatusCode::OK).await?;
        let token: TokenResponse = http::decode(response).await?;

        Ok(AccessToken(token.access_token))
    }

    /// Introspect a granted token on the admin API; positive means active.
    async fn read(&self, item: &Self::Item) -> Result<bool, TargetError> {
        let response = self
            .http
            .post(format!("{}/admin/oauth2/introspect", self.admin_url))
            .form(&[("token", item.0.as_str())])
            .send()
            .await
            .map_err(http::transport)?;
        let response = http::expect_status(response, StatusCode::OK).await?;
        let introspection: IntrospectionResponse = http::decode(response).await?;

        Ok(introspection.active)
    }
}
