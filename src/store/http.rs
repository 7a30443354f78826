//! HTTP implementation of [`IndexStore`] against the Elasticsearch REST API.

use super::{AliasAction, AliasBindings, ClusterHealth, IndexStore, ReindexStats, StoreError};
use crate::naming::{AliasName, IndexName};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;

/// HTTP client for index lifecycle operations against an Elasticsearch host.
///
/// The underlying client carries no global timeout: a reindex-copy of a large
/// index may legitimately run for a long time. The health probe sets its own
/// per-request timeout instead.
#[derive(Clone)]
pub struct HttpIndexStore {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl fmt::Debug for HttpIndexStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpIndexStore")
            .field("base_url", &self.base_url)
            .field("has_token", &self.auth_token.is_some())
            .finish()
    }
}

impl HttpIndexStore {
    /// Create a new store client.
    ///
    /// `base_url` is the store root (e.g., `http://localhost:9200`).
    /// Trailing slashes are stripped.
    pub fn new(base_url: &str, auth_token: Option<String>) -> Self {
        let client = Client::builder()
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
        }
    }

    fn add_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(ref token) = self.auth_token {
            req.bearer_auth(token)
        } else {
            req
        }
    }

    /// Map a non-2xx response to a `StoreError`.
    ///
    /// Reads the response body as text so the store's diagnostic payload is
    /// reported verbatim.
    async fn map_error(resp: reqwest::Response) -> StoreError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();

        match status {
            StatusCode::UNAUTHORIZED => StoreError::Unauthorized,
            StatusCode::NOT_FOUND => StoreError::NotFound(if body.is_empty() {
                "resource not found".to_string()
            } else {
                body
            }),
            StatusCode::BAD_REQUEST => StoreError::BadRequest(if body.is_empty() {
                "bad request".to_string()
            } else {
                body
            }),
            s if s.is_server_error() => StoreError::ServerError(if body.is_empty() {
                format!("status {s}")
            } else {
                body
            }),
            _ => StoreError::ServerError(format!("unexpected status {status}: {body}")),
        }
    }

    /// Map a reqwest error (network/timeout) to a `StoreError`.
    fn map_network_error(e: reqwest::Error) -> StoreError {
        if e.is_timeout() {
            StoreError::Network(format!("request timed out: {e}"))
        } else if e.is_connect() {
            StoreError::Network(format!("connection failed: {e}"))
        } else {
            StoreError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl IndexStore for HttpIndexStore {
    async fn health(&self, timeout: Duration) -> Result<ClusterHealth, StoreError> {
        let url = format!(
            "{}/_cluster/health?timeout={}s",
            self.base_url,
            timeout.as_secs().max(1)
        );
        // Give the transport slightly longer than the store-side timeout so
        // the store's own answer wins when it can produce one.
        let resp = self
            .add_auth(self.client.get(&url))
            .timeout(timeout + Duration::from_secs(1))
            .send()
            .await
            .map_err(Self::map_network_error)?;

        if resp.status().is_success() {
            let raw: serde_json::Value = resp
                .json()
                .await
                .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
            let mut health: ClusterHealth = serde_json::from_value(raw.clone())
                .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
            health.raw = raw;
            Ok(health)
        } else {
            Err(Self::map_error(resp).await)
        }
    }

    async fn exists(&self, index: &IndexName) -> Result<bool, StoreError> {
        let url = format!("{}/{}", self.base_url, index);
        let resp = self
            .add_auth(self.client.head(&url))
            .send()
            .await
            .map_err(Self::map_network_error)?;

        if resp.status().is_success() {
            Ok(true)
        } else if resp.status() == StatusCode::NOT_FOUND {
            Ok(false)
        } else {
            Err(Self::map_error(resp).await)
        }
    }

    async fn create(
        &self,
        index: &IndexName,
        mapping: &serde_json::Value,
    ) -> Result<serde_json::Value, StoreError> {
        let url = format!("{}/{}", self.base_url, index);
        tracing::debug!(index = %index, "creating index");
        let resp = self
            .add_auth(self.client.put(&url))
            .header("Content-Type", "application/json")
            .json(mapping)
            .send()
            .await
            .map_err(Self::map_network_error)?;

        if resp.status().is_success() {
            resp.json()
                .await
                .map_err(|e| StoreError::InvalidResponse(e.to_string()))
        } else {
            Err(Self::map_error(resp).await)
        }
    }

    async fn delete(&self, index: &IndexName) -> Result<serde_json::Value, StoreError> {
        let url = format!("{}/{}", self.base_url, index);
        tracing::debug!(index = %index, "deleting index");
        let resp = self
            .add_auth(self.client.delete(&url))
            .send()
            .await
            .map_err(Self::map_network_error)?;

        if resp.status().is_success() {
            resp.json()
                .await
                .map_err(|e| StoreError::InvalidResponse(e.to_string()))
        } else {
            Err(Self::map_error(resp).await)
        }
    }

    async fn reindex_copy(
        &self,
        source: &IndexName,
        dest: &IndexName,
    ) -> Result<ReindexStats, StoreError> {
        let url = format!(
            "{}/_reindex?wait_for_completion=true&refresh=true",
            self.base_url
        );
        let body = serde_json::json!({
            "source": { "index": source.as_str() },
            "dest": { "index": dest.as_str() },
        });
        tracing::info!(source = %source, dest = %dest, "reindex started");
        let resp = self
            .add_auth(self.client.post(&url))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(Self::map_network_error)?;

        if resp.status().is_success() {
            let raw: serde_json::Value = resp
                .json()
                .await
                .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
            let mut stats: ReindexStats = serde_json::from_value(raw.clone())
                .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
            stats.raw = raw;
            Ok(stats)
        } else {
            Err(Self::map_error(resp).await)
        }
    }

    async fn alias_bindings(&self, alias: &AliasName) -> Result<AliasBindings, StoreError> {
        let url = format!("{}/_alias/{}", self.base_url, alias);
        let resp = self
            .add_auth(self.client.get(&url))
            .send()
            .await
            .map_err(Self::map_network_error)?;

        if resp.status() == StatusCode::NOT_FOUND {
            // Unbound alias: zero bindings, not an error.
            return Ok(AliasBindings::new());
        }
        if !resp.status().is_success() {
            return Err(Self::map_error(resp).await);
        }

        // Response shape: { "<index>": { "aliases": { "<alias>": {} } }, ... }
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;
        let obj = body.as_object().ok_or_else(|| {
            StoreError::InvalidResponse(format!("expected object, got: {body}"))
        })?;

        let mut bindings = AliasBindings::new();
        for (index, entry) in obj {
            let aliases = entry
                .get("aliases")
                .and_then(|a| a.as_object())
                .map(|a| a.keys().cloned().collect())
                .unwrap_or_default();
            bindings.insert(index.clone(), aliases);
        }
        Ok(bindings)
    }

    async fn update_aliases(&self, actions: &[AliasAction]) -> Result<(), StoreError> {
        let url = format!("{}/_aliases", self.base_url);
        let body = serde_json::json!({ "actions": actions });
        tracing::debug!(action_count = actions.len(), "updating aliases");
        let resp = self
            .add_auth(self.client.post(&url))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(Self::map_network_error)?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(Self::map_error(resp).await)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(name: &str) -> IndexName {
        IndexName::raw(name)
    }

    #[test]
    fn test_client_debug_hides_token() {
        let store = HttpIndexStore::new("http://localhost:9200", Some("secret".to_string()));
        let debug = format!("{:?}", store);
        assert!(debug.contains("HttpIndexStore"));
        assert!(debug.contains("localhost:9200"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_client_strips_trailing_slash() {
        let store = HttpIndexStore::new("http://localhost:9200/", None);
        assert_eq!(store.base_url, "http://localhost:9200");
    }

    // -----------------------------------------------------------------------
    // Wiremock integration tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_health_ok() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/_cluster/health"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"cluster_name": "es-test", "status": "green"}),
            ))
            .mount(&server)
            .await;

        let store = HttpIndexStore::new(&server.uri(), None);
        let health = store.health(Duration::from_secs(2)).await.unwrap();
        assert_eq!(health.cluster_name, "es-test");
        assert_eq!(health.status, "green");
        // Full response body is preserved for verbose display.
        assert_eq!(health.raw["status"], "green");
    }

    #[tokio::test]
    async fn test_health_unreachable() {
        // Port 1 is never listening.
        let store = HttpIndexStore::new("http://127.0.0.1:1", None);
        let err = store.health(Duration::from_secs(2)).await.unwrap_err();
        match err {
            StoreError::Network(_) => {}
            other => panic!("expected Network, got: {other}"),
        }
    }

    #[tokio::test]
    async fn test_exists_true_and_false() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("HEAD"))
            .and(wiremock::matchers::path("/app-users_v1"))
            .respond_with(wiremock::ResponseTemplate::new(200))
            .mount(&server)
            .await;
        wiremock::Mock::given(wiremock::matchers::method("HEAD"))
            .and(wiremock::matchers::path("/app-users_v2"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = HttpIndexStore::new(&server.uri(), None);
        assert!(store.exists(&index("app-users_v1")).await.unwrap());
        assert!(!store.exists(&index("app-users_v2")).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_sends_mapping_body() {
        let server = wiremock::MockServer::start().await;
        let mapping = serde_json::json!({"mappings": {"properties": {"name": {"type": "text"}}}});

        wiremock::Mock::given(wiremock::matchers::method("PUT"))
            .and(wiremock::matchers::path("/app-users_v2"))
            .and(wiremock::matchers::body_json(&mapping))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"acknowledged": true})),
            )
            .mount(&server)
            .await;

        let store = HttpIndexStore::new(&server.uri(), None);
        let ack = store.create(&index("app-users_v2"), &mapping).await.unwrap();
        assert_eq!(ack["acknowledged"], true);
    }

    #[tokio::test]
    async fn test_create_rejection_reported_verbatim() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("PUT"))
            .and(wiremock::matchers::path("/app-users_v2"))
            .respond_with(
                wiremock::ResponseTemplate::new(400)
                    .set_body_string(r#"{"error":"mapper_parsing_exception"}"#),
            )
            .mount(&server)
            .await;

        let store = HttpIndexStore::new(&server.uri(), None);
        let err = store
            .create(&index("app-users_v2"), &serde_json::json!({"mappings": {}}))
            .await
            .unwrap_err();
        match err {
            StoreError::BadRequest(body) => assert!(body.contains("mapper_parsing_exception")),
            other => panic!("expected BadRequest, got: {other}"),
        }
    }

    #[tokio::test]
    async fn test_reindex_waits_and_refreshes() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/_reindex"))
            .and(wiremock::matchers::query_param("wait_for_completion", "true"))
            .and(wiremock::matchers::query_param("refresh", "true"))
            .and(wiremock::matchers::body_json(serde_json::json!({
                "source": {"index": "app-users_v1"},
                "dest": {"index": "app-users_v2"},
            })))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"took": 42, "total": 7, "created": 7, "updated": 0}),
            ))
            .mount(&server)
            .await;

        let store = HttpIndexStore::new(&server.uri(), None);
        let stats = store
            .reindex_copy(&index("app-users_v1"), &index("app-users_v2"))
            .await
            .unwrap();
        assert_eq!(stats.total, 7);
        assert_eq!(stats.created, 7);
        assert_eq!(stats.raw["took"], 42);
    }

    #[tokio::test]
    async fn test_alias_bindings_parses_response() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/_alias/app-users"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_json(
                serde_json::json!({
                    "app-users_v1": {"aliases": {"app-users": {}}},
                    "app-users_v2": {"aliases": {"app-users": {}, "other": {}}},
                }),
            ))
            .mount(&server)
            .await;

        let store = HttpIndexStore::new(&server.uri(), None);
        let bindings = store
            .alias_bindings(&AliasName::raw("app-users"))
            .await
            .unwrap();
        assert_eq!(bindings.len(), 2);
        assert!(bindings["app-users_v1"].contains("app-users"));
        assert!(bindings["app-users_v2"].contains("other"));
    }

    #[tokio::test]
    async fn test_alias_bindings_404_means_unbound() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/_alias/app-users"))
            .respond_with(wiremock::ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let store = HttpIndexStore::new(&server.uri(), None);
        let bindings = store
            .alias_bindings(&AliasName::raw("app-users"))
            .await
            .unwrap();
        assert!(bindings.is_empty());
    }

    #[tokio::test]
    async fn test_update_aliases_sends_action_batch() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/_aliases"))
            .and(wiremock::matchers::body_json(serde_json::json!({
                "actions": [
                    {"remove": {"index": "app-users_v1", "alias": "app-users"}},
                    {"add": {"index": "app-users_v2", "alias": "app-users"}},
                ]
            })))
            .respond_with(
                wiremock::ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"acknowledged": true})),
            )
            .mount(&server)
            .await;

        let store = HttpIndexStore::new(&server.uri(), None);
        let alias = AliasName::raw("app-users");
        let actions = vec![
            AliasAction::remove("app-users_v1", &alias),
            AliasAction::add(&index("app-users_v2"), &alias),
        ];
        store.update_aliases(&actions).await.unwrap();
    }
}
