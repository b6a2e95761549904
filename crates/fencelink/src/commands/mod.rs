//! Command dispatch: bridges CLI args to core operations and output formatting.

pub mod config_cmd;
pub mod encode;
pub mod push;
pub mod send;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a frame or network-server command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Encode(args) => encode::encode(&args, global),
        Command::Decode(args) => encode::decode(&args, global),
        Command::Send(args) => send::handle(&args, global).await,
        Command::Push(args) => push::handle(&args, global).await,
        Command::Config(args) => config_cmd::handle(args, global),
        Command::Completions(_) => Err(CliError::Internal(
            "completions are generated before dispatch".into(),
        )),
    }
}
