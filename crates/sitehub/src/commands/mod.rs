//! Command dispatch: bridges CLI args -> store operations -> output formatting.

pub mod config_cmd;
pub mod sites;
pub mod tags;
pub mod transfer;
pub mod util;

use sitehub_core::DocumentStore;

use crate::cli::{Command, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;

/// Dispatch a store-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    store: &DocumentStore,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<(), CliError> {
    match cmd {
        Command::Sites(args) => sites::handle(store, args, global).await,
        Command::Tags => tags::handle(store, global),
        Command::Import(args) => transfer::import(store, args, global).await,
        Command::Export(args) => transfer::export(store, &args, global, cfg),
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
