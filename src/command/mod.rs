//! A module for the commands portion of icesh.
//!
//! Every command the shell can run is an external executable. This module knows how to invoke
//! one: interactively, for its one-line purpose, or for its detailed help.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use self::foreground::{restore_interrupts_in_child, ForegroundGuard};

use crate::error::IceError;
use crate::Result;

pub mod exit;
mod foreground;
pub mod help;

pub use exit::{exit_code, terminates_shell, EXIT_CODE};
pub use help::HelpCommand;

/// Flag asking a command to print a one-line description of itself.
pub const PURPOSE_FLAG: &str = "-purpose";
/// Flag asking a command to print its detailed usage.
pub const HELP_FLAG: &str = "-help";

/// ExternalCommand is an executable resolved from a `CommandTable`, ready to be invoked.
#[derive(Debug, Clone)]
pub struct ExternalCommand<'a> {
    name: &'a str,
    path: &'a Path,
}

impl<'a> ExternalCommand<'a> {
    /// Creates a new ExternalCommand.
    ///
    /// # Arguments
    /// `name` - The name the command was looked up by.
    /// `path` - The executable that implements it.
    pub fn new(name: &'a str, path: &'a Path) -> ExternalCommand<'a> {
        ExternalCommand { name, path }
    }

    /// Runs the command with the given arguments and waits for it to finish.
    ///
    /// The child shares our stdin, stdout and stderr, so it can talk to the terminal directly. An
    /// interrupt sent while it runs reaches the child but leaves the shell alone.
    ///
    /// # Returns
    /// `Result<i32>` - The child's exit code, or `Launch` if it couldn't be started.
    pub fn execute<S: AsRef<str>>(&self, args: &[S]) -> Result<i32> {
        debug!(cmd = self.name, path = %self.path.display(), "dispatching");
        let mut cmd = Command::new(self.path);
        cmd.args(args.iter().map(|arg| arg.as_ref()))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        restore_interrupts_in_child(&mut cmd);

        let guard = ForegroundGuard::new();
        let status = cmd.status().map_err(|source| self.launch_failure(source));
        drop(guard);
        let status = status?;

        let code = exit_code(status);
        debug!(cmd = self.name, code, "command finished");
        Ok(code)
    }

    /// Asks the command for its one-line purpose.
    ///
    /// # Returns
    /// `Result<String>` - Whatever the command printed to stdout, trailing whitespace trimmed.
    /// Fails with `HelpQuery` if the command exits unsuccessfully.
    pub fn purpose(&self) -> Result<String> {
        let mut cmd = Command::new(self.path);
        cmd.arg(PURPOSE_FLAG)
            .stdin(Stdio::null())
            .stderr(Stdio::null());
        restore_interrupts_in_child(&mut cmd);

        let guard = ForegroundGuard::new();
        let output = cmd.output().map_err(|source| self.launch_failure(source));
        drop(guard);
        let output = output?;

        if !output.status.success() {
            return Err(IceError::HelpQuery {
                name: self.name.to_string(),
                reason: format!("exited with status {}", exit_code(output.status)),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .trim_end()
            .to_string())
    }

    /// Lets the command print its detailed help to the terminal.
    ///
    /// The exit code is ignored; asking for help never ends the shell.
    pub fn help(&self) -> Result<()> {
        self.execute(&[HELP_FLAG])?;
        Ok(())
    }

    fn launch_failure(&self, source: std::io::Error) -> IceError {
        warn!(cmd = self.name, path = %self.path.display(), %source, "failed to launch");
        IceError::Launch {
            path: PathBuf::from(self.path),
            source,
        }
    }
}
