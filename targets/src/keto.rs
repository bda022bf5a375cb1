//! Ory Keto adapter: relation tuple writes and permission checks

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ory_bench_core::{TargetAdapter, TargetError};

use crate::http;

const NAMESPACE: &str = "documents";
const RELATION: &str = "viewer";

/// Adapter exercising Ory Keto.
///
/// Each `write` inserts a relation tuple with fresh object and subject
/// identifiers; each `read` checks the same tuple against the read API and
/// reports whether the permission is allowed.
pub struct KetoAdapter {
    http: reqwest::Client,
    write_url: String,
    read_url: String,
}

/// One relation tuple, carried verbatim from the write to its checks.
/// The same shape serves as the write body and the check request.
#[derive(Debug, Clone, Serialize)]
pub struct RelationTuple {
    /// Namespace the tuple lives in.
    pub namespace: String,
    /// Object the permission applies to.
    pub object: String,
    /// Relation being granted.
    pub relation: String,
    /// Subject the permission is granted to.
    pub subject_id: String,
}

#[derive(Deserialize)]
struct CheckResponse {
    allowed: bool,
}

impl KetoAdapter {
    /// Create an adapter for the given write and read base URLs.
    pub fn new(
        write_url: impl Into<String>,
        read_url: impl Into<String>,
    ) -> Result<Self, TargetError> {
        Ok(Self {
            http: http::build_client()?,
            write_url: write_url.into(),
            read_url: read_url.into(),
        })
    }

    fn fresh_tuple() -> RelationTuple {
        RelationTuple {
            namespace: NAMESPACE.to_string(),
            object: Uuid::new_v4().to_string(),
            relation: RELATION.to_string(),
            subject_id: format!("user:{}", Uuid::new_v4()),
        }
    }
}

#[async_trait]
impl TargetAdapter for KetoAdapter {
    type Item = RelationTuple;

    fn name(&self) -> &'static str {
        "keto"
    }

    /// Insert a fresh relation tuple. Any 2xx status counts as written.
    async fn write(&self) -> Result<Self::Item, TargetError> {
        let tuple = Self::fresh_tuple();

        let response = self
            .http
            .put(format!("{}/admin/relation-tuples", self.write_url))
            .json(&tuple)
            .send()
            .await
            .map_err(http::transport)?;
        http::expect_success(response).await?;

        tracing::debug!(
            object = %tuple.object,
            subject = %tuple.subject_id,
            "relation tuple written"
        );
        Ok(tuple)
    }

    /// Check the tuple's permission; positive means allowed.
    async fn read(&self, item: &Self::Item) -> Result<bool, TargetError> {
        let response = self
            .http
            .post(format!("{}/relation-tuples/check", self.read_url))
            .json(item)
            .send()
            .await
            .map_err(http::transport)?;
        let response = http::expect_status(response, StatusCode::OK).await?;
        let check: CheckResponse = http::decode(response).await?;

        Ok(check.allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_body_shape() {
        let tuple = RelationTuple {
            namespace: "documents".into(),
            object: "doc-1".into(),
            relation: "viewer".into(),
            subject_id: "user:alice".into(),
        };
        let json = serde_json::to_string(&tuple).unwrap();

        assert_eq!(
            json,
            r#"{"namespace":"documents","object":"doc-1","relation":"viewer","subject_id":"user:alice"}"#
        );
    }

    #[test]
    fn test_check_response_decoding() {
        let allowed: CheckResponse = serde_json::from_str(r#"{"allowed":true}"#).unwrap();
        assert!(allowed.allowed);

        let denied: CheckResponse = serde_json::from_str(r#"{"allowed":false}"#).unwrap();
        assert!(!denied.allowed);
    }

    #[test]
    fn test_fresh_tuples_never_collide() {
        let a = KetoAdapter::fresh_tuple();
        let b = KetoAdapter::fresh_tuple();
        assert_ne!(a.object, b.object);
        assert_ne!(a.subject_id, b.subject_id);
        assert!(a.subject_id.starts_with("user:"));
        assert_eq!(a.namespace, "documents");
        assert_eq!(a.relation, "viewer");
    }
}
