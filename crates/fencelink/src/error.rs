//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use fencelink_config::ConfigError;
use fencelink_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
    pub const DISPATCH: i32 = 9;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach network server at {url}")]
    #[diagnostic(
        code(fencelink::connection_failed),
        help(
            "Check that the network server is running and accessible.\n\
             URL: {url}\n\
             Self-signed certificate? Retry with --insecure (-k)."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(fencelink::auth_failed),
        help(
            "Verify the network-server API token.\n\
             Run: fencelink config set-token"
        )
    )]
    AuthFailed { message: String },

    #[error("No API token configured for profile '{profile}'")]
    #[diagnostic(
        code(fencelink::no_credentials),
        help(
            "Configure a token with: fencelink config init\n\
             Or set the FENCELINK_API_TOKEN environment variable."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(fencelink::not_found))]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Network server rejected the request (HTTP {status}): {message}")]
    #[diagnostic(code(fencelink::rejected))]
    Rejected { status: u16, message: String },

    // ── Dispatch ─────────────────────────────────────────────────────
    #[error("{failed} of {total} downlinks were not queued")]
    #[diagnostic(
        code(fencelink::dispatch_failed),
        help("Rerun with -v to see each failure, or -o json for per-device errors.")
    )]
    DispatchFailed { failed: usize, total: usize },

    // ── Input ────────────────────────────────────────────────────────
    #[error("Invalid geofence in {path}: {reason}")]
    #[diagnostic(
        code(fencelink::invalid_geofence),
        help(
            "Expected a JSON record such as:\n\
             {{\"group_id\": 1, \"geofence_type\": \"circle\", \
             \"coordinates\": {{\"lat\": -33.45, \"lng\": -70.66, \"radius\": 50}}}}"
        )
    )]
    InvalidGeofence { path: String, reason: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(fencelink::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(fencelink::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: fencelink config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No network server configured")]
    #[diagnostic(
        code(fencelink::no_config),
        help(
            "Create a profile with: fencelink config init\n\
             Or pass --network-server and --api-token.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error("Configuration error: {0}")]
    #[diagnostic(code(fencelink::config))]
    Config(String),

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {timeout_ms}ms")]
    #[diagnostic(
        code(fencelink::timeout),
        help("Increase timeout with --timeout or check network-server responsiveness.")
    )]
    Timeout { timeout_ms: u64 },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(fencelink::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::DispatchFailed { .. } => exit_code::DISPATCH,
            Self::Validation { .. } | Self::InvalidGeofence { .. } | Self::NoConfig { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::Timeout { timeout_ms } => CliError::Timeout { timeout_ms },

            CoreError::Rejected { status, message } => CliError::Rejected { status, message },

            CoreError::GeofenceNotFound { identifier } => CliError::NotFound {
                resource_type: "geofence".into(),
                identifier,
            },

            CoreError::InvalidGeofence(e) => CliError::InvalidGeofence {
                path: "input".into(),
                reason: e.to_string(),
            },

            CoreError::InvalidFrame(e) => CliError::Validation {
                field: "payload".into(),
                reason: e.to_string(),
            },

            CoreError::Config { message } => CliError::Config(message),

            CoreError::Storage { message } => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { profile } => CliError::ProfileNotFound {
                name: profile,
                available: "(see: fencelink config profiles)".into(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_exit_codes() {
        let timeout = CliError::from(CoreError::Timeout { timeout_ms: 5000 });
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);

        let missing = CliError::from(CoreError::GeofenceNotFound {
            identifier: "7".into(),
        });
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);
        assert_eq!(missing.to_string(), "geofence '7' not found");
    }

    #[test]
    fn missing_token_is_an_auth_problem() {
        let err = CliError::from(ConfigError::NoCredentials {
            profile: "farm".into(),
        });
        assert_eq!(err.exit_code(), exit_code::AUTH);
    }
}
