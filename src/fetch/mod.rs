// src/fetch/mod.rs

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::fmt;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::Config;
use crate::decode::decode;
use crate::error::IngestError;

/// Which remote document is being retrieved; only affects error messages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Schema,
    Definitions,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Schema => "schemabestand",
            ResourceKind::Definitions => "definitiebestand",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fetched document, or the errors explaining why there is none.
#[derive(Debug, Default)]
pub struct Fetched {
    pub value: Option<Value>,
    pub errors: Vec<IngestError>,
}

struct FetchFailure {
    code: u16,
    reason: String,
}

impl FetchFailure {
    fn network(e: &reqwest::Error) -> Self {
        Self {
            code: e.status().map(|s| s.as_u16()).unwrap_or(0),
            reason: e.to_string(),
        }
    }
}

/// Retrieves JSON resources that live under one base URL.
#[derive(Clone, Debug)]
pub struct ResourceFetcher {
    client: Client,
    base_url: String,
}

impl ResourceFetcher {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("building HTTP client")?;
        Ok(Self::with_client(client, config.base_url.clone()))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// GET `<base_url><filename>` once and decode the body as JSON.
    ///
    /// Any transport or status failure yields exactly one
    /// [`IngestError::Fetch`]; decode failures of the body are forwarded as-is.
    #[instrument(level = "info", skip(self), fields(base = %self.base_url))]
    pub async fn fetch(&self, filename: &str, kind: ResourceKind) -> Fetched {
        let url = format!("{}{}", self.base_url, filename);
        match self.get_bytes(&url).await {
            Ok(bytes) => {
                let decoded = decode(filename, &bytes);
                if decoded.errors.is_empty() {
                    info!("JSON bestand opgehaald van {}", url);
                }
                Fetched {
                    value: decoded.value,
                    errors: decoded.errors,
                }
            }
            Err(failure) => {
                warn!(%url, code = failure.code, reason = %failure.reason, "Fout bij ophalen {}", kind);
                Fetched {
                    value: None,
                    errors: vec![IngestError::Fetch {
                        kind,
                        filename: filename.to_string(),
                        code: failure.code,
                    }],
                }
            }
        }
    }

    async fn get_bytes(&self, url: &str) -> std::result::Result<Vec<u8>, FetchFailure> {
        let url = Url::parse(url).map_err(|e| FetchFailure {
            code: 0,
            reason: format!("invalid URL {}: {}", url, e),
        })?;
        debug!(%url, "GET");
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchFailure::network(&e))?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(FetchFailure {
                code: status.as_u16(),
                reason: format!("status {}", status),
            });
        }

        let bytes = resp.bytes().await.map_err(|e| FetchFailure::network(&e))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher_for(server: &MockServer) -> ResourceFetcher {
        ResourceFetcher::with_client(Client::new(), format!("{}/repo/", server.uri()))
    }

    #[tokio::test]
    async fn fetches_and_decodes_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repo/iv3_data_schema_v1_0.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"type": "object"})))
            .expect(1)
            .mount(&server)
            .await;

        let out = fetcher_for(&server)
            .fetch("iv3_data_schema_v1_0.json", ResourceKind::Schema)
            .await;
        assert!(out.errors.is_empty());
        assert_eq!(out.value, Some(json!({"type": "object"})));
    }

    #[tokio::test]
    async fn http_status_is_reported_as_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let out = fetcher_for(&server)
            .fetch("iv3_definities_gemeente_2023.json", ResourceKind::Definitions)
            .await;
        assert!(out.value.is_none());
        assert_eq!(
            out.errors,
            vec![IngestError::Fetch {
                kind: ResourceKind::Definitions,
                filename: "iv3_definities_gemeente_2023.json".into(),
                code: 404,
            }]
        );
    }

    #[tokio::test]
    async fn non_200_success_is_still_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let out = fetcher_for(&server)
            .fetch("iv3_data_schema_v1_0.json", ResourceKind::Schema)
            .await;
        assert_eq!(out.errors.len(), 1);
        assert_eq!(
            out.errors[0].to_string(),
            "Fout bij ophalen schemabestand: iv3_data_schema_v1_0.json (foutcode #204)"
        );
    }

    #[tokio::test]
    async fn body_that_is_not_json_forwards_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>niet gevonden</html>"))
            .mount(&server)
            .await;

        let out = fetcher_for(&server)
            .fetch("iv3_data_schema_v1_0.json", ResourceKind::Schema)
            .await;
        assert!(out.value.is_none());
        assert_eq!(
            out.errors,
            vec![IngestError::NotJson {
                name: "iv3_data_schema_v1_0.json".into()
            }]
        );
    }

    #[tokio::test]
    async fn unreachable_host_reports_code_zero() {
        // nothing listens on port 9 (discard) on the test host
        let fetcher = ResourceFetcher::with_client(Client::new(), "http://127.0.0.1:9/");
        let out = fetcher
            .fetch("iv3_data_schema_v1_0.json", ResourceKind::Schema)
            .await;
        assert!(out.value.is_none());
        assert_eq!(out.errors.len(), 1);
        assert!(out.errors[0].to_string().ends_with("(foutcode #0)"));
    }

    #[tokio::test]
    async fn malformed_base_url_reports_code_zero() {
        let fetcher = ResourceFetcher::with_client(Client::new(), "geen url/");
        let out = fetcher.fetch("x.json", ResourceKind::Schema).await;
        assert_eq!(
            out.errors,
            vec![IngestError::Fetch {
                kind: ResourceKind::Schema,
                filename: "x.json".into(),
                code: 0,
            }]
        );
    }
}
