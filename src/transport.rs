//! HTTP transport for the cluster management API.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::debug;

use crate::config::ClusterConfig;
use crate::error::{QumuloError, Result};

/// The single seam between the core and the network.
///
/// Paths are relative to the cluster's `/api` root; pagination `next`
/// values come back from the server in exactly that form, so callers can
/// pass them straight through.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET and decode the JSON body.
    async fn get(&self, path: &str) -> Result<Value>;

    /// Issue a POST with a JSON body and decode the JSON response.
    async fn post(&self, path: &str, body: Value) -> Result<Value>;
}

/// reqwest-backed [`Transport`] carrying bearer auth and JSON headers.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    base_url: String,
    headers: HeaderMap,
    http: Client,
}

impl HttpTransport {
    /// Build a transport for one cluster. TLS verification is skipped only
    /// when the configuration explicitly opted in.
    pub fn new(config: &ClusterConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", config.token);
        let auth = HeaderValue::from_str(&auth).map_err(|_| QumuloError::Auth {
            status: 401,
            message: "bearer token is not a valid header value".to_string(),
        })?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout);
        if config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let http = builder.build().map_err(QumuloError::Http)?;

        Ok(Self {
            base_url: config.api_root(),
            headers,
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    async fn check_response(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if status.as_u16() == 401 {
            let message = response.text().await.map_err(QumuloError::Http)?;
            return Err(QumuloError::Auth {
                status: 401,
                message,
            });
        }
        if !status.is_success() {
            let body = response.text().await.map_err(QumuloError::Http)?;
            return Err(QumuloError::Api {
                status: status.as_u16(),
                body,
            });
        }
        response.json().await.map_err(QumuloError::Http)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str) -> Result<Value> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self
            .http
            .get(&url)
            .headers(self.headers.clone())
            .send()
            .await?;
        Self::check_response(response).await
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self
            .http
            .post(&url)
            .headers(self.headers.clone())
            .json(&body)
            .send()
            .await?;
        Self::check_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn transport() -> HttpTransport {
        let config = ClusterConfig::new("cluster.example.com", "session-v1:abc")
            .timeout(Duration::from_secs(5));
        HttpTransport::new(&config).expect("transport builds")
    }

    #[test]
    fn url_joins_relative_paths() {
        let t = transport();
        assert_eq!(
            t.url("v1/files/locks/smb/share-mode/"),
            "https://cluster.example.com/api/v1/files/locks/smb/share-mode/"
        );
    }

    #[test]
    fn url_accepts_server_returned_next_paths() {
        let t = transport();
        assert_eq!(
            t.url("/v1/smb/files/?resolve_paths=true&after=50"),
            "https://cluster.example.com/api/v1/smb/files/?resolve_paths=true&after=50"
        );
    }

    #[test]
    fn token_with_control_characters_is_rejected() {
        let config = ClusterConfig::new("c", "bad\ntoken");
        let err = HttpTransport::new(&config).expect_err("invalid header");
        assert!(matches!(err, QumuloError::Auth { .. }));
    }

    #[test]
    fn insecure_mode_builds() {
        let config = ClusterConfig::new("c", "t").accept_invalid_certs(true);
        HttpTransport::new(&config).expect("insecure transport builds");
    }
}
