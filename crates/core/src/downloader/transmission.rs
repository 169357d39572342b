//! Transmission download client implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::config::TransmissionConfig;
use crate::metrics::DAEMON_REQUESTS;

use super::{AddOutcome, DownloadClient, DownloadClientError, RemoveOutcome};

const SESSION_HEADER: &str = "X-Transmission-Session-Id";

/// Transmission RPC client.
///
/// Speaks the JSON-RPC dialect at `{url}/transmission/rpc`. The daemon
/// issues a session id via a 409 handshake; the id is cached and refreshed
/// once per request when it expires.
pub struct TransmissionClient {
    client: Client,
    config: TransmissionConfig,
    session: Arc<RwLock<Option<String>>>,
}

impl TransmissionClient {
    /// Create a new Transmission client.
    pub fn new(config: TransmissionConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            session: Arc::new(RwLock::new(None)),
        }
    }

    fn rpc_url(&self) -> String {
        format!("{}/transmission/rpc", self.config.url.trim_end_matches('/'))
    }

    async fn send(
        &self,
        body: &Value,
        session_id: Option<&str>,
    ) -> Result<reqwest::Response, DownloadClientError> {
        let mut request = self
            .client
            .post(self.rpc_url())
            .json(body)
            .basic_auth(&self.config.username, Some(&self.config.password));

        if let Some(id) = session_id {
            request = request.header(SESSION_HEADER, id);
        }

        request.send().await.map_err(|e| {
            if e.is_timeout() {
                DownloadClientError::Timeout
            } else if e.is_connect() {
                DownloadClientError::ConnectionFailed(e.to_string())
            } else {
                DownloadClientError::Rpc(e.to_string())
            }
        })
    }

    /// Issue an RPC call, negotiating the session id on 409.
    async fn rpc_call(&self, method: &str, arguments: Value) -> Result<Value, DownloadClientError> {
        let body = json!({ "method": method, "arguments": arguments });

        let session_id = self.session.read().await.clone();
        let mut response = self.send(&body, session_id.as_deref()).await?;

        if response.status() == StatusCode::CONFLICT {
            // Session expired or never established; the 409 carries a fresh id.
            let new_id = response
                .headers()
                .get(SESSION_HEADER)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
                .ok_or_else(|| {
                    DownloadClientError::Rpc("409 without session id header".to_string())
                })?;
            debug!("Transmission session id refreshed");
            {
                let mut session = self.session.write().await;
                *session = Some(new_id.clone());
            }
            response = self.send(&body, Some(&new_id)).await?;
        }

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(DownloadClientError::AuthenticationFailed(format!(
                "HTTP {}",
                status
            )));
        }
        if !status.is_success() {
            return Err(DownloadClientError::Rpc(format!("HTTP {}", status)));
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| DownloadClientError::Rpc(e.to_string()))?;

        let result = payload
            .get("result")
            .and_then(|v| v.as_str())
            .unwrap_or("missing result");
        if result != "success" {
            return Err(DownloadClientError::Rpc(result.to_string()));
        }

        Ok(payload.get("arguments").cloned().unwrap_or(Value::Null))
    }

    /// Look up a torrent by hash, returning its display name when present.
    async fn find_torrent(&self, hash: &str) -> Result<Option<String>, DownloadClientError> {
        let arguments = self
            .rpc_call(
                "torrent-get",
                json!({ "ids": [hash], "fields": ["hashString", "name"] }),
            )
            .await?;

        let name = arguments
            .get("torrents")
            .and_then(|t| t.as_array())
            .and_then(|torrents| torrents.first())
            .and_then(|t| t.get("name"))
            .and_then(|n| n.as_str())
            .map(|s| s.to_string());

        Ok(name)
    }

    fn record(&self, method: &str, ok: bool) {
        DAEMON_REQUESTS
            .with_label_values(&[method, if ok { "success" } else { "error" }])
            .inc();
    }
}

#[async_trait]
impl DownloadClient for TransmissionClient {
    fn name(&self) -> &str {
        "transmission"
    }

    async fn exists(&self, hash: &str) -> bool {
        match self.find_torrent(hash).await {
            Ok(found) => {
                self.record("torrent-get", true);
                found.is_some()
            }
            Err(e) => {
                self.record("torrent-get", false);
                warn!(hash, error = %e, "Torrent lookup failed");
                false
            }
        }
    }

    async fn remove_torrent(&self, hash: &str, delete_data: bool) -> RemoveOutcome {
        let name = match self.find_torrent(hash).await {
            Ok(Some(name)) => name,
            Ok(None) => {
                self.record("torrent-get", true);
                return RemoveOutcome {
                    success: true,
                    found: false,
                    name: None,
                    message: format!("Torrent not found in Transmission: {}", hash),
                };
            }
            Err(e) => {
                self.record("torrent-get", false);
                warn!(hash, error = %e, "Torrent lookup failed during removal");
                return RemoveOutcome::failure(e.to_string());
            }
        };

        match self
            .rpc_call(
                "torrent-remove",
                json!({ "ids": [hash], "delete-local-data": delete_data }),
            )
            .await
        {
            Ok(_) => {
                self.record("torrent-remove", true);
                debug!(hash, name = %name, delete_data, "Removed torrent");
                RemoveOutcome {
                    success: true,
                    found: true,
                    name: Some(name.clone()),
                    message: format!("Torrent removed from Transmission: {}", name),
                }
            }
            Err(e) => {
                self.record("torrent-remove", false);
                warn!(hash, error = %e, "Torrent removal failed");
                RemoveOutcome {
                    success: false,
                    found: true,
                    name: Some(name),
                    message: e.to_string(),
                }
            }
        }
    }

    async fn add_torrent(&self, link: &str, hash: Option<&str>) -> AddOutcome {
        if let Some(hash) = hash {
            if self.exists(hash).await {
                return AddOutcome {
                    success: true,
                    already_exists: true,
                    name: None,
                    message: format!("Torrent already present: {}", hash),
                };
            }
        }

        match self
            .rpc_call("torrent-add", json!({ "filename": link }))
            .await
        {
            Ok(arguments) => {
                self.record("torrent-add", true);
                // The daemon reports duplicates under a dedicated key rather
                // than as an error.
                if let Some(duplicate) = arguments.get("torrent-duplicate") {
                    let name = duplicate
                        .get("name")
                        .and_then(|n| n.as_str())
                        .map(|s| s.to_string());
                    return AddOutcome {
                        success: true,
                        already_exists: true,
                        name,
                        message: "Torrent already present".to_string(),
                    };
                }
                let name = arguments
                    .get("torrent-added")
                    .and_then(|t| t.get("name"))
                    .and_then(|n| n.as_str())
                    .map(|s| s.to_string());
                AddOutcome {
                    success: true,
                    already_exists: false,
                    name,
                    message: "Torrent added".to_string(),
                }
            }
            Err(e) => {
                self.record("torrent-add", false);
                // Older daemons surface duplicates as an error string.
                if e.to_string().to_lowercase().contains("duplicate") {
                    return AddOutcome {
                        success: true,
                        already_exists: true,
                        name: None,
                        message: "Torrent already present".to_string(),
                    };
                }
                warn!(link, error = %e, "Torrent add failed");
                AddOutcome::failure(e.to_string())
            }
        }
    }
}
