use std::path::Path;
use std::process::{Command, Stdio};

use log::{debug, info};

use crate::action_definitions::StandaloneOperation;
use crate::config::DEFAULT_COMPOSE_PROGRAM;
use crate::error::{Error, Result};

/// Runs external processes on behalf of the dispatcher.
pub trait CommandRunner {
    /// Runs `arguments` (program first) inside `working_directory` and blocks
    /// until it exits.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot start or exits unsuccessfully.
    fn run(&mut self, arguments: &[String], working_directory: &Path) -> Result<()>;

    /// Runs an operation that has no project context.
    ///
    /// # Errors
    ///
    /// Returns whatever error the operation reports.
    fn run_standalone(&mut self, operation: &StandaloneOperation) -> Result<()> {
        (operation.run)()
    }
}

/// Runs commands for real, with the terminal attached.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, arguments: &[String], working_directory: &Path) -> Result<()> {
        let Some((program, arguments)) = arguments.split_first() else {
            return Err(Error::SubProcess(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "empty command line",
            )));
        };

        info!(
            "Running `{program}` with {arguments:?} in `{}`",
            working_directory.display()
        );

        let mut command = Command::new(program);
        command.args(arguments).current_dir(working_directory);
        execute_command(command)
    }
}

/// Executes a command, inheriting stdio.
///
/// # Errors
///
/// Returns an error if command execution fails or exits with non-zero status.
pub fn execute_command(mut command: Command) -> Result<()> {
    let command = command
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    let status = command.spawn()?.wait()?;
    debug!("Sub process finished with {status}");

    if status.success() {
        Ok(())
    } else {
        Err(Error::SubProcessExit {
            code: status.code(),
        })
    }
}

/// Runs `docker` with `arguments` in the current directory.
///
/// # Errors
///
/// Returns an error if docker cannot be started or exits unsuccessfully.
pub fn run_docker(arguments: &[&str]) -> Result<()> {
    let mut command = Command::new(DEFAULT_COMPOSE_PROGRAM);
    command.args(arguments);
    execute_command(command)
}
