//! A module for the shell portion of icesh.
//!
//! This module exposes the `Shell` struct, the heart of icesh. It owns the session's search paths
//! and templates, resolves each input line against the executables found on those paths and runs
//! them.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Datelike, Local};
use colored::*;
use once_cell::unsync::OnceCell;
use rustyline::error::ReadlineError;
use tracing::{debug, warn};

use crate::command::{terminates_shell, ExternalCommand, HelpCommand};
use crate::command_set::CommandTable;
use crate::error::IceError;
use crate::identity::PromptParams;
use crate::readline::Readline;
use crate::template::Template;
use crate::tokenizer::{Tokenizer, WhitespaceTokenizer};
use crate::Result;

/// The pseudo-command that shows help instead of running anything.
pub const HELP_COMMAND: &str = "help";

/// The shell.
///
/// A shell is rooted at a directory laid out as `bin/` and `sbin/` (the commands it may run) and
/// `etc/` (its `motd` and `prompt` templates).
///
/// # Examples
///
/// ```no_run
/// use icesh::shell::Shell;
///
/// let mut sh = Shell::new("./")?;
/// sh.path_mut().insert(0, "./my/extra/binary/path".into());
/// sh.run()?;
/// # Ok::<(), icesh::error::IceError>(())
/// ```
pub struct Shell {
    root: PathBuf,
    configs: PathBuf,
    path: Vec<PathBuf>,
    help_path: Option<Vec<PathBuf>>,
    tokenizer: WhitespaceTokenizer,
    motd: OnceCell<Template>,
    prompt: OnceCell<String>,
    prompt_params: OnceCell<PromptParams>,
}

impl Shell {
    /// Constructs a new shell rooted at the given directory.
    ///
    /// The search path starts out as `<root>/bin` followed by `<root>/sbin`, and the help path
    /// follows it until `set_help_path()` is called.
    ///
    /// # Arguments
    /// `root` - The root directory of the shell.
    pub fn new<P: AsRef<Path>>(root: P) -> Result<Shell> {
        let root = root.as_ref().to_path_buf();
        let unavailable = |source: io::Error| IceError::RootUnavailable {
            path: root.clone(),
            source,
        };

        let metadata = fs::metadata(&root).map_err(unavailable)?;
        if !metadata.is_dir() {
            return Err(unavailable(io::Error::new(
                io::ErrorKind::Other,
                "not a directory",
            )));
        }

        Ok(Shell {
            configs: root.join("etc"),
            path: vec![root.join("bin"), root.join("sbin")],
            help_path: None,
            root,
            tokenizer: WhitespaceTokenizer::new(),
            motd: OnceCell::new(),
            prompt: OnceCell::new(),
            prompt_params: OnceCell::new(),
        })
    }

    /// Returns the root path of this shell.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the config path of this shell, `<root>/etc`.
    pub fn configs(&self) -> &Path {
        &self.configs
    }

    /// Returns the directories searched for commands, lowest precedence first.
    pub fn path(&self) -> &[PathBuf] {
        &self.path
    }

    /// Returns the search path for modification. Only meant for setting the shell up before
    /// `run()`.
    pub fn path_mut(&mut self) -> &mut Vec<PathBuf> {
        &mut self.path
    }

    /// Returns the directories whose commands are listed by `help`.
    pub fn help_path(&self) -> &[PathBuf] {
        self.help_path.as_deref().unwrap_or(&self.path)
    }

    /// Overrides the help path. Once set, it no longer follows the search path.
    pub fn set_help_path(&mut self, help_path: Vec<PathBuf>) {
        self.help_path = Some(help_path);
    }

    /// Builds the table of commands that may be run, from the current contents of the search
    /// path.
    pub fn commands(&self) -> Result<CommandTable> {
        CommandTable::scan(&self.path)
    }

    /// Builds the table of commands listed by `help`.
    pub fn help_commands(&self) -> Result<CommandTable> {
        CommandTable::scan(self.help_path())
    }

    /// Returns the names of the commands starting with `prefix`.
    pub fn complete(&self, prefix: &str) -> Vec<String> {
        match self.commands() {
            Ok(table) => table.complete(prefix),
            Err(_) => Vec::new(),
        }
    }

    /// Returns the message of the day, as read from `<configs>/motd`.
    pub fn motd(&self) -> Result<&Template> {
        self.motd.get_or_try_init(|| Template::load(self.configs.join("motd")))
    }

    /// Returns the rendered message of the day for the given year.
    pub fn render_motd(&self, year: i32) -> Result<String> {
        let year = year.to_string();
        self.motd()?.render(&[("now", year.as_str())])
    }

    /// Returns the shell prompt, rendered from `<configs>/prompt` the first time it is asked for.
    pub fn prompt(&self) -> Result<&str> {
        let prompt = self.prompt.get_or_try_init(|| {
            let template = Template::load(self.configs.join("prompt"))?;
            template.render(&self.prompt_params()?.vars())
        })?;

        Ok(prompt.as_str())
    }

    /// Returns the prompt interpolation parameters, looked up the first time they are asked for.
    pub fn prompt_params(&self) -> Result<&PromptParams> {
        self.prompt_params.get_or_try_init(PromptParams::lookup)
    }

    /// Handles a single input line.
    ///
    /// The line is split on whitespace. `help` is handled in-process, anything else is looked up
    /// on the search path and run with the remaining words as its arguments.
    ///
    /// # Arguments
    /// `line` - The line to handle.
    ///
    /// # Returns
    /// `Result<Option<i32>>` - The exit code of the command that ran, or `None` if nothing ran
    /// (blank line, or `help`). Unknown commands and commands that can't be started are errors,
    /// none of which should end the session.
    pub fn handle(&self, line: &str) -> Result<Option<i32>> {
        let tokenization = self.tokenizer.tokenize(line);
        let (cmd_name, args) = match tokenization.tokens.split_first() {
            Some(split) => split,
            None => return Ok(None),
        };

        if *cmd_name == HELP_COMMAND {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            HelpCommand::new().execute(self, args, &mut out)?;
            out.flush()?;
            return Ok(None);
        }

        let table = self.commands()?;
        let path = table
            .get(cmd_name)
            .ok_or_else(|| IceError::UnknownCommand {
                name: cmd_name.to_string(),
            })?;

        let code = ExternalCommand::new(cmd_name, path).execute(args)?;
        Ok(Some(code))
    }

    /// Prints the message of the day and executes the shell's run-loop.
    ///
    /// The loop ends at end of input, or when a command exits with `EXIT_CODE`. Unknown commands
    /// and commands that fail to start are reported and the loop carries on, and an interrupt
    /// while waiting for input only prints `^C`.
    ///
    /// Only configuration problems (missing templates, empty search paths) are returned before
    /// the loop starts.
    pub fn run(&mut self) -> Result<()> {
        if self.path.is_empty() {
            return Err(IceError::EmptySearchPath { which: "command" });
        }
        if self.help_path().is_empty() {
            return Err(IceError::EmptySearchPath { which: "help" });
        }

        let motd = self.render_motd(Local::now().year())?;
        let prompt = self.prompt()?.to_string();
        let mut rl = Readline::new(self.path.clone());

        println!("{}", motd);
        println!();

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        rl.add_history_entry(trimmed);
                    }

                    match self.handle(trimmed) {
                        Ok(Some(code)) if terminates_shell(code) => {
                            debug!(code, "command asked the shell to exit");
                            break;
                        }
                        Ok(_) => {}
                        Err(err) => println!("{}", err.to_string().red()),
                    }
                }
                Err(ReadlineError::Interrupted) => println!("^C"),
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    warn!(%err, "line editor failed");
                    return Err(err.into());
                }
            }
        }

        Ok(())
    }
}
