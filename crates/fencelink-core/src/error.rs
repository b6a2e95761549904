// ── Core error types ──
//
// Domain errors from fencelink-core. Consumers never see reqwest errors
// directly; the `From<fencelink_api::Error>` impl translates transport-layer
// failures into domain variants. Dispatch failures never surface here at
// all: they end as `DispatchOutcome`s.

use thiserror::Error;

use crate::frame::FrameError;
use crate::model::GeofenceParseError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach network server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Network server timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Network server rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Geofence not found: {identifier}")]
    GeofenceNotFound { identifier: String },

    #[error("Invalid geofence: {0}")]
    InvalidGeofence(#[from] GeofenceParseError),

    #[error("Invalid frame: {0}")]
    InvalidFrame(#[from] FrameError),

    // ── Collaborator errors ──────────────────────────────────────────
    #[error("Storage error: {message}")]
    Storage { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fencelink_api::Error> for CoreError {
    fn from(err: fencelink_api::Error) -> Self {
        match err {
            fencelink_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            fencelink_api::Error::InvalidToken(reason) => CoreError::Config {
                message: format!("API token is not a valid header value: {reason}"),
            },
            fencelink_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_ms: 0 }
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                }
            }
            fencelink_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            fencelink_api::Error::UnsupportedBaseUrl(url) => CoreError::Config {
                message: format!("Network server URL cannot carry API paths: {url}"),
            },
            fencelink_api::Error::Timeout { timeout_ms } => CoreError::Timeout { timeout_ms },
            fencelink_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            fencelink_api::Error::Rejected { status, message } => {
                CoreError::Rejected { status, message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_timeout_keeps_duration() {
        let err = CoreError::from(fencelink_api::Error::Timeout { timeout_ms: 5000 });
        assert!(matches!(err, CoreError::Timeout { timeout_ms: 5000 }));
    }

    #[test]
    fn api_auth_maps_to_authentication_failed() {
        let err = CoreError::from(fencelink_api::Error::Authentication {
            message: "bad token".into(),
        });
        assert_eq!(err.to_string(), "Authentication failed: bad token");
    }
}
