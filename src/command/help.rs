use std::io::Write;

use chrono::{Datelike, Local};
use tracing::debug;

use super::ExternalCommand;
use crate::command_set::CommandTable;
use crate::error::IceError;
use crate::shell::Shell;
use crate::Result;

/// The product name shown in the help banner.
pub const PRODUCT: &str = "Ice Shell";
/// The shell's version, straight from the manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// The copyright holder shown in the help banner.
pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
/// The first year of the copyright range.
pub const SINCE: i32 = 2013;

#[derive(Debug, Clone)]
/// HelpCommand backs the `help` pseudo-command.
///
/// Without arguments it prints a banner and a listing of every command on the help path along
/// with its purpose. With a command name it lets that command print its own detailed help.
pub struct HelpCommand {
    year: i32,
}

impl Default for HelpCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl HelpCommand {
    /// Creates a new HelpCommand, stamped with the current year.
    pub fn new() -> HelpCommand {
        HelpCommand::with_year(Local::now().year())
    }

    /// Creates a new HelpCommand with a fixed year for the copyright line.
    pub fn with_year(year: i32) -> HelpCommand {
        HelpCommand { year }
    }

    /// Runs help.
    ///
    /// # Arguments
    /// `shell` - The shell whose commands to describe.
    /// `args` - Either nothing, or the name of a single command.
    /// `out` - Where the listing goes. Detailed help is written by the command itself, straight
    /// to the terminal.
    pub fn execute<S: AsRef<str>>(
        &self,
        shell: &Shell,
        args: &[S],
        out: &mut dyn Write,
    ) -> Result<()> {
        match args {
            [] => self.execute_no_args(&shell.help_commands()?, out),
            [name] => self.execute_with_args(&shell.commands()?, name.as_ref()),
            _ => Err(IceError::ExtraArgs {
                got: args.iter().map(|arg| arg.as_ref().to_string()).collect(),
            }),
        }
    }

    /// Writes the banner, the name and purpose of each command in `table`, and a usage hint.
    ///
    /// Commands that fail to report a purpose are left out of the listing.
    pub fn execute_no_args(&self, table: &CommandTable, out: &mut dyn Write) -> Result<()> {
        writeln!(
            out,
            "{} v.{}. Copyright (c) {}-{} by {}.",
            PRODUCT, VERSION, SINCE, self.year, AUTHOR
        )?;
        writeln!(out, "Here's the list of available system commands:")?;
        writeln!(out)?;

        for name in table.names() {
            let path = match table.get(&name) {
                Some(path) => path,
                None => continue,
            };
            match ExternalCommand::new(&name, path).purpose() {
                Ok(purpose) => writeln!(out, "{} — {}", name, purpose)?,
                Err(err) => debug!(cmd = %name, %err, "no purpose, leaving it out of help"),
            }
        }

        writeln!(out)?;
        writeln!(
            out,
            "Use `help COMMAND' to display information about specific command."
        )?;

        Ok(())
    }

    /// Lets the command called `name` print its own help.
    pub fn execute_with_args(&self, table: &CommandTable, name: &str) -> Result<()> {
        match table.get(name) {
            Some(path) => ExternalCommand::new(name, path).help(),
            None => Err(IceError::NoHelpTopic {
                name: name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::shell::test::{make_dummy_root, write_script};

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn listing(table: &CommandTable) -> String {
        let mut out = Vec::new();
        HelpCommand::with_year(2026)
            .execute_no_args(table, &mut out)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn lists_purposes_in_order() {
        let root = make_dummy_root();
        let table =
            CommandTable::scan(&[root.path().join("bin"), root.path().join("sbin")]).unwrap();

        let expected = format!(
            "Ice Shell v.{}. Copyright (c) 2013-2026 by {}.\n\
             Here's the list of available system commands:\n\
             \n\
             bar — Lists things.\n\
             foo1 — Ends the session.\n\
             \n\
             Use `help COMMAND' to display information about specific command.\n",
            VERSION, AUTHOR
        );

        // foo3 fails its purpose query and `exit' doesn't exist on disk, so both are skipped.
        assert_eq!(listing(&table), expected);
    }

    #[test]
    fn one_bad_command_does_not_stop_the_listing() {
        let dir = TempDir::new().unwrap();
        write_script(&dir.path().join("a"), "echo 'first'");
        write_script(&dir.path().join("b"), "echo 'broken' >&2; exit 2");
        write_script(&dir.path().join("c"), "echo 'third'");

        let table = CommandTable::scan(&[dir.path()]).unwrap();
        let out = listing(&table);

        assert!(out.contains("a — first\n"));
        assert!(!out.contains("b —"));
        assert!(!out.contains("broken"));
        assert!(out.contains("c — third\n"));
    }

    #[test]
    fn unknown_topic() {
        let root = make_dummy_root();
        let table = CommandTable::scan(&[root.path().join("bin")]).unwrap();

        match HelpCommand::with_year(2026).execute_with_args(&table, "nope") {
            Err(err @ IceError::NoHelpTopic { .. }) => assert_eq!(
                err.to_string(),
                "No help topics, command `nope' not found!"
            ),
            other => panic!("expected no help topic, got {:?}", other),
        }
    }

    #[test]
    fn known_topic() {
        let root = make_dummy_root();
        let table = CommandTable::scan(&[root.path().join("bin")]).unwrap();

        assert!(HelpCommand::with_year(2026)
            .execute_with_args(&table, "foo1")
            .is_ok());
    }
}
