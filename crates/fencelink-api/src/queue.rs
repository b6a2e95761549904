// Device queue HTTP client
//
// Wraps `reqwest::Client` with network-server URL construction, bearer
// authentication, and status classification for the downlink queue
// endpoint (`POST {base}/devices/{devEUI}/queue`).

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Longest slice of a rejection body kept in error messages.
const BODY_PREVIEW_CHARS: usize = 200;

// ── Wire types ──────────────────────────────────────────────────────

/// One downlink queued for a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceQueueItem {
    pub confirmed: bool,
    /// Base64-encoded application payload.
    pub data: String,
    #[serde(rename = "devEUI")]
    pub dev_eui: String,
    #[serde(rename = "fPort")]
    pub f_port: u8,
}

#[derive(Serialize)]
struct EnqueueRequest<'a> {
    #[serde(rename = "deviceQueueItem")]
    device_queue_item: &'a DeviceQueueItem,
}

/// Body of a successful enqueue. Network servers that answer with an empty
/// or unfamiliar body produce the default (no frame counter).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct EnqueueResponse {
    #[serde(rename = "fCnt", default)]
    pub f_cnt: Option<u32>,
}

// ── Client ──────────────────────────────────────────────────────────

/// Async client for the network-server device queue.
///
/// Authenticates with a bearer token injected as a default header, so
/// every request built from the inner `reqwest::Client` carries it.
#[derive(Debug, Clone)]
pub struct QueueClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Option<Duration>,
}

impl QueueClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API token and transport config.
    ///
    /// `base_url` is the API root of the network server, e.g.
    /// `http://localhost:8080/api`.
    pub fn from_token(
        base_url: &str,
        token: &SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::InvalidToken(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::parse_base_url(base_url)?;

        Ok(Self {
            http,
            base_url,
            timeout: Some(transport.timeout),
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::parse_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            timeout: None,
        })
    }

    fn parse_base_url(raw: &str) -> Result<Url, Error> {
        let url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::UnsupportedBaseUrl(raw.to_owned()));
        }
        Ok(url)
    }

    /// The network-server API root.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Queue endpoint for one device: `{base}/devices/{dev_eui}/queue`.
    ///
    /// The device id is pushed as a single path segment, so reserved
    /// characters are percent-encoded rather than changing the route.
    pub fn queue_url(&self, dev_eui: &str) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Error::UnsupportedBaseUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().extend(["devices", dev_eui, "queue"]);
        }
        Ok(url)
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Queue one downlink. Only HTTP 200 counts as accepted.
    pub async fn enqueue(&self, item: &DeviceQueueItem) -> Result<EnqueueResponse, Error> {
        let url = self.queue_url(&item.dev_eui)?;
        debug!("POST {}", url);

        let body = EnqueueRequest {
            device_queue_item: item,
        };
        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Authentication {
                message: format!(
                    "network server rejected the API token (HTTP {})",
                    status.as_u16()
                ),
            });
        }

        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Rejected {
                status: status.as_u16(),
                message: preview(&body),
            });
        }

        let body = resp.text().await.map_err(|e| self.map_transport(e))?;
        trace!(body = %body, "enqueue accepted");

        Ok(serde_json::from_str(&body).unwrap_or_default())
    }

    fn map_transport(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            let timeout_ms = self
                .timeout
                .map_or(0, |t| u64::try_from(t.as_millis()).unwrap_or(u64::MAX));
            Error::Timeout { timeout_ms }
        } else {
            Error::Transport(err)
        }
    }
}

fn preview(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".into();
    }
    trimmed.chars().take(BODY_PREVIEW_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> QueueClient {
        QueueClient::from_reqwest(base, reqwest::Client::new()).unwrap()
    }

    #[test]
    fn queue_url_appends_to_api_root() {
        let url = client("http://localhost:8080/api")
            .queue_url("0011223344556677")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/devices/0011223344556677/queue"
        );
    }

    #[test]
    fn queue_url_tolerates_trailing_slash() {
        let url = client("http://ns.local:8080/api/").queue_url("abc").unwrap();
        assert_eq!(url.path(), "/api/devices/abc/queue");
    }

    #[test]
    fn queue_url_on_bare_host() {
        let url = client("http://ns.local").queue_url("abc").unwrap();
        assert_eq!(url.path(), "/devices/abc/queue");
    }

    #[test]
    fn queue_url_escapes_device_id() {
        let url = client("http://ns.local/api").queue_url("a/b").unwrap();
        assert_eq!(url.path(), "/api/devices/a%2Fb/queue");
    }

    #[test]
    fn rejects_non_base_urls() {
        let result = QueueClient::from_reqwest("mailto:ops@example.com", reqwest::Client::new());
        assert!(matches!(result, Err(Error::UnsupportedBaseUrl(_))));
    }

    #[test]
    fn queue_item_uses_network_server_field_names() {
        let item = DeviceQueueItem {
            confirmed: false,
            data: "AQ==".into(),
            dev_eui: "0011223344556677".into(),
            f_port: 10,
        };
        let body = serde_json::to_value(EnqueueRequest {
            device_queue_item: &item,
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "deviceQueueItem": {
                    "confirmed": false,
                    "data": "AQ==",
                    "devEUI": "0011223344556677",
                    "fPort": 10
                }
            })
        );
    }

    #[test]
    fn preview_truncates_long_bodies() {
        let body = "x".repeat(500);
        assert_eq!(preview(&body).len(), BODY_PREVIEW_CHARS);
        assert_eq!(preview("   "), "<empty body>");
    }
}
