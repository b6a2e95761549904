//! Clap derive structures for the `fencelink` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// fencelink -- encode geofences as LoRaWAN downlinks and queue them on devices
#[derive(Debug, Parser)]
#[command(
    name = "fencelink",
    version,
    about = "Encode geofences as LoRaWAN downlinks and queue them for devices",
    long_about = "Reduces circle and polygon geofences to a single center and radius,\n\
        packs them into the 11-byte collar frame, and queues the frame on every\n\
        device of a group through the network server's device queue API.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Network-server profile to use
    #[arg(long, short = 'p', env = "FENCELINK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Network-server API root (overrides profile)
    #[arg(long, short = 'n', env = "FENCELINK_NETWORK_SERVER", global = true)]
    pub network_server: Option<String>,

    /// Network-server API token
    #[arg(long, env = "FENCELINK_API_TOKEN", global = true, hide_env_values = true)]
    pub api_token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "FENCELINK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "FENCELINK_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "FENCELINK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reduce and encode a geofence record without sending it
    #[command(alias = "enc")]
    Encode(EncodeArgs),

    /// Decode a base64 downlink payload
    #[command(alias = "dec")]
    Decode(DecodeArgs),

    /// Queue a geofence frame directly on one or more devices
    Send(SendArgs),

    /// Store a geofence and fan it out to its device group
    Push(PushArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FRAMES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EncodeArgs {
    /// Geofence record (JSON), or '-' for stdin
    pub file: PathBuf,
}

#[derive(Debug, Args)]
pub struct DecodeArgs {
    /// Base64 payload as carried in the queue `data` field
    pub payload: String,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DISPATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Geofence record (JSON), or '-' for stdin
    pub file: PathBuf,

    /// Target device EUI (repeatable)
    #[arg(long = "device", short = 'd', required = true, num_args = 1..)]
    pub devices: Vec<String>,

    /// LoRaWAN application port (overrides profile)
    #[arg(long)]
    pub f_port: Option<u8>,

    /// Request confirmed downlinks
    #[arg(long)]
    pub confirmed: bool,
}

#[derive(Debug, Args)]
pub struct PushArgs {
    /// Geofence record (JSON), or '-' for stdin
    pub file: PathBuf,

    /// Device group inventory: JSON array of {"id", "name"?, "devices": [...]}
    #[arg(long, short = 'i')]
    pub inventory: PathBuf,

    /// Concurrent dispatch workers (overrides config)
    #[arg(long)]
    pub workers: Option<usize>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current configuration (tokens masked)
    Show,

    /// Set a value on the active profile
    Set {
        /// Profile key (network_server, api_token_env, ca_cert, insecure, timeout, f_port, confirmed)
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store an API token in the system keyring
    SetToken {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
