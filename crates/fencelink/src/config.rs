//! CLI configuration: thin wrapper around `fencelink_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--network-server, --api-token, --insecure, --timeout).

use std::time::Duration;

use secrecy::SecretString;

use fencelink_core::{DispatchConfig, PoolConfig};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use fencelink_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

/// Build a `DispatchConfig` from the config file, profile, and CLI overrides.
///
/// Flags win over the profile. Without a profile, `--network-server` and
/// `--api-token` are enough on their own.
pub fn build_dispatch_config(global: &GlobalOpts) -> Result<DispatchConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    match cfg.profiles.get(&profile_name) {
        Some(profile) => resolve_profile(profile, &profile_name, &cfg.defaults, global),
        None if global.profile.is_some() => Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available_profiles(&cfg),
        }),
        None => from_flags(&profile_name, &cfg.defaults, global),
    }
}

/// Translate a `Profile` + global flags into a `DispatchConfig`.
fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<DispatchConfig, CliError> {
    // 1. Network server (flag > env > profile)
    let url_str = global
        .network_server
        .as_deref()
        .unwrap_or(&profile.network_server);
    let url = fencelink_config::parse_network_server(url_str)?;

    // 2. Token (flag > env var > keyring > plaintext)
    let token = match global.api_token {
        Some(ref token) => SecretString::from(token.clone()),
        None => fencelink_config::resolve_api_token(profile, profile_name)?,
    };

    let mut config = DispatchConfig::new(url, token);

    // 3. TLS verification
    config.tls = fencelink_config::tls_verification(
        global.insecure || profile.insecure.unwrap_or(defaults.insecure),
        profile.ca_cert.as_deref(),
    );

    // 4. Timeout and downlink parameters
    config.timeout = Duration::from_secs(
        global
            .timeout
            .or(profile.timeout)
            .unwrap_or(defaults.timeout),
    );
    config.f_port = profile.f_port.unwrap_or(defaults.f_port);
    config.confirmed = profile.confirmed.unwrap_or(false);
    config.pool = pool_config(defaults);

    Ok(config)
}

/// No profile: the flags must carry everything.
fn from_flags(
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<DispatchConfig, CliError> {
    let url_str = global
        .network_server
        .as_deref()
        .ok_or_else(|| CliError::NoConfig {
            path: config_path().display().to_string(),
        })?;
    let url = fencelink_config::parse_network_server(url_str)?;

    let token = global
        .api_token
        .clone()
        .map(SecretString::from)
        .ok_or_else(|| CliError::NoCredentials {
            profile: profile_name.to_owned(),
        })?;

    let mut config = DispatchConfig::new(url, token);
    config.tls = fencelink_config::tls_verification(global.insecure || defaults.insecure, None);
    config.timeout = Duration::from_secs(global.timeout.unwrap_or(defaults.timeout));
    config.f_port = defaults.f_port;
    config.pool = pool_config(defaults);
    Ok(config)
}

fn pool_config(defaults: &Defaults) -> PoolConfig {
    PoolConfig {
        workers: defaults.workers,
        queue_capacity: defaults.queue_capacity,
    }
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        "(none)".into()
    } else {
        cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }
}
