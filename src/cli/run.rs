use anyhow::{Result, bail};

use super::{
    args::{Arguments, Command},
    commands::{CommandResult, check::check, explain::explain, init::init},
};

/// Dispatch to the command handler.
///
/// Returns `Err` when the command cannot run at all (invalid config,
/// unreadable input); findings are reported through the `CommandResult`.
pub fn run(Arguments { command }: Arguments) -> Result<CommandResult> {
    match command {
        Some(Command::Check(cmd)) => check(cmd),
        Some(Command::Explain(cmd)) => explain(cmd),
        Some(Command::Init) => init(),
        None => bail!("No command provided. Use --help to see available commands."),
    }
}
