//! Ory Kratos adapter: identity registration and lookup

use async_trait::async_trait;
use rand::distr::Alphanumeric;
use rand::Rng;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use ory_bench_core::{TargetAdapter, TargetError};

use crate::http;

/// Adapter exercising Ory Kratos.
///
/// Each `write` runs the API self-service registration flow with a freshly
/// generated identity; each `read` looks the identity up by its credentials
/// identifier on the admin API and reports whether it is active. An empty
/// lookup result is a definitive negative, not a failure.
pub struct KratosAdapter {
    http: reqwest::Client,
    admin_url: String,
    public_url: String,
}

/// Credentials identifier of a registered identity; the minimal payload the
/// paired lookup needs.
#[derive(Debug, Clone)]
pub struct RegisteredIdentity {
    email: String,
}

impl KratosAdapter {
    /// Create an adapter for the given admin and public base URLs.
    pub fn new(
        admin_url: impl Into<String>,
        public_url: impl Into<String>,
    ) -> Result<Self, TargetError> {
        Ok(Self {
            http: http::build_client()?,
            admin_url: admin_url.into(),
            public_url: public_url.into(),
        })
    }
}

fn random_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

/// A fresh identity per write call; emails must never collide across
/// iterations or runs.
fn generate_identity() -> (String, String, String, String) {
    let first = random_token(8);
    let last = random_token(10);
    let email = format!("{first}.{last}@loadtest.invalid");
    let password: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();
    (email, first, last, password)
}

#[derive(Deserialize)]
struct RegistrationFlow {
    id: String,
}

#[derive(Serialize)]
struct RegistrationRequest<'a> {
    method: &'a str,
    password: &'a str,
    traits: IdentityTraits<'a>,
}

#[derive(Serialize)]
struct IdentityTraits<'a> {
    email: &'a str,
    name: IdentityName<'a>,
}

#[derive(Serialize)]
struct IdentityName<'a> {
    first: &'a str,
    last: &'a str,
}

#[derive(Deserialize)]
struct RegistrationResponse {
    identity: RegisteredIdentityBody,
}

#[derive(Deserialize)]
struct RegisteredIdentityBody {
    id: String,
}

#[derive(Deserialize)]
struct IdentityStatus {
    state: String,
}

#[async_trait]
impl TargetAdapter for KratosAdapter {
    type Item = RegisteredIdentity;

    fn name(&self) -> &'static str {
        "kratos"
    }

    /// Create a registration flow, then submit a password registration for
    /// a freshly generated identity. Both steps expect 200.
    async fn write(&self) -> Result<Self::Item, TargetError> {
        let response = self
            .http
            .get(format!("{}/self-service/registration/api", self.public_url))
            .send()
            .await
            .map_err(http::transport)?;
        let response = http::expect_status(response, StatusCode::OK).await?;
        let flow: RegistrationFlow = http::decode(response).await?;

        let (email, first, last, password) = generate_identity();
        let body = RegistrationRequest {
            method: "password",
            password: &password,
            traits: IdentityTraits {
                email: &email,
                name: IdentityName {
                    first: &first,
                    last: &last,
                },
            },
        };

        let response = self
            .http
            .post(format!(
                "{}/self-service/registration?flow={}",
                self.public_url, flow.id
            ))
            .json(&body)
            .send()
            .await
            .map_err(http::transport)?;
        let response = http::expect_status(response, StatusCode::OK).await?;
        let registered: RegistrationResponse = http::decode(response).await?;

        tracing::debug!(identity = %registered.identity.id, "identity registered");
        Ok(RegisteredIdentity { email })
    }

    /// Look the identity up by credentials identifier; positive means the
    /// first matching identity is active.
    async fn read(&self, item: &Self::Item) -> Result<bool, TargetError> {
        let response = self
            .http
            .get(format!("{}/admin/identities", self.admin_url))
            .query(&[("credentials_identifier", item.email.as_str())])
            .send()
            .await
            .map_err(http::transport)?;
        let response = http::expect_status(response, StatusCode::OK).await?;
        let identities: Vec<IdentityStatus> = http::decode(response).await?;

        Ok(identities
            .first()
            .is_some_and(|identity| identity.state == "active"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_body_shape() {
        let body = RegistrationRequest {
            method: "password",
            password: "hunter2hunter2",
            traits: IdentityTraits {
                email: "jane.doe@loadtest.invalid",
                name: IdentityName {
                    first: "jane",
                    last: "doe",
                },
            },
        };
        let json = serde_json::to_string(&body).unwrap();

        assert!(json.contains("\"method\":\"password\""));
        assert!(json.contains("\"traits\":{\"email\":\"jane.doe@loadtest.invalid\""));
        assert!(json.contains("\"name\":{\"first\":\"jane\",\"last\":\"doe\"}"));
    }

    #[test]
    fn test_registration_flow_decoding() {
        let flow: RegistrationFlow = serde_json::from_str(
            r#"{"id":"f81f7a44-1e1c-4b8a-9c3e-000000000001","type":"api","state":"choose_method"}"#,
        )
        .unwrap();
        assert_eq!(flow.id, "f81f7a44-1e1c-4b8a-9c3e-000000000001");
    }

    #[test]
    fn test_identity_list_decoding() {
        let identities: Vec<IdentityStatus> = serde_json::from_str(
            r#"[{"id":"abc","state":"active","schema_id":"default"},{"id":"def","state":"inactive"}]"#,
        )
        .unwrap();
        assert_eq!(identities.len(), 2);
        assert_eq!(identities[0].state, "active");

        let empty: Vec<IdentityStatus> = serde_json::from_str("[]").unwrap();
        assert!(empty.first().is_none());
    }

    #[test]
    fn test_generated_identities_are_unique() {
        let (email_a, ..) = generate_identity();
        let (email_b, ..) = generate_identity();
        assert_ne!(email_a, email_b);
        assert!(email_a.ends_with("@loadtest.invalid"));
    }
}
