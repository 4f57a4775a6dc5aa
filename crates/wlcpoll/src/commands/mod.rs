//! Command dispatch: bridges CLI args -> core pipeline -> output formatting.

pub mod config_cmd;
pub mod poll;
pub mod run;
pub mod schema;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Run => run::handle(global).await,
        Command::Poll(args) => poll::handle(&args, global).await,
        Command::Schema(args) => schema::handle(&args, global),
        Command::Config(args) => config_cmd::handle(args, global),
        // Completions are generated before dispatch
        Command::Completions(_) => Ok(()),
    }
}

/// Run blocking core work (SNMP session setup, SQLite) off the runtime.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, CliError>
where
    F: FnOnce() -> Result<T, wlcpoll_core::CoreError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| CliError::Internal(format!("blocking task failed: {e}")))?
        .map_err(CliError::from)
}
