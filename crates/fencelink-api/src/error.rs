use thiserror::Error;

/// Top-level error type for the `fencelink-api` crate.
///
/// Covers every failure mode of the network-server queue surface:
/// authentication, transport, and non-success responses.
/// `fencelink-core` maps these into domain errors and dispatch outcomes.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The network server rejected the bearer token (HTTP 401/403).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The API token cannot be carried in an HTTP header.
    #[error("Invalid API token: {0}")]
    InvalidToken(String),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The base URL cannot carry path segments (e.g. `mailto:`).
    #[error("Base URL cannot be used for API paths: {0}")]
    UnsupportedBaseUrl(String),

    /// Request timed out.
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Queue API ───────────────────────────────────────────────────
    /// The network server answered with anything other than HTTP 200.
    #[error("Queue request rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
}

impl Error {
    /// Returns `true` if the network server refused our credentials.
    pub fn is_auth_rejected(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Rejected { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// HTTP status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_transient() {
        let err = Error::Rejected {
            status: 503,
            message: "busy".into(),
        };
        assert!(err.is_transient());
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn client_errors_are_not_transient() {
        let err = Error::Rejected {
            status: 400,
            message: "bad devEUI".into(),
        };
        assert!(!err.is_transient());
        assert!(!err.is_auth_rejected());
    }

    #[test]
    fn timeouts_are_transient() {
        assert!(Error::Timeout { timeout_ms: 5000 }.is_transient());
    }
}
