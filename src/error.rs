use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum IceError {
    #[error("readline error")]
    ReadlineError(#[from] rustyline::error::ReadlineError),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("root directory `{}' is not accessible: {source}", .path.display())]
    RootUnavailable { path: PathBuf, source: io::Error },
    #[error("cannot read template `{}': {source}", .path.display())]
    TemplateUnreadable { path: PathBuf, source: io::Error },
    #[error("malformed template `{}': {msg}", .path.display())]
    TemplateMalformed { path: PathBuf, msg: String },
    #[error("{which} search path is empty")]
    EmptySearchPath { which: &'static str },
    #[error("cannot determine {what}: {source}")]
    Identity { what: &'static str, source: io::Error },
    #[error("Command `{name}' not found!")]
    UnknownCommand { name: String },
    #[error("No help topics, command `{name}' not found!")]
    NoHelpTopic { name: String },
    #[error("expected at most one argument, but got {got:?}")]
    ExtraArgs { got: Vec<String> },
    #[error("failed to launch `{}': {source}", .path.display())]
    Launch { path: PathBuf, source: io::Error },
    #[error("`{name}' could not describe itself: {reason}")]
    HelpQuery { name: String, reason: String },
}

impl IceError {
    /// Whether this error should keep the shell from starting.
    ///
    /// Only configuration problems are fatal; everything else is reported by the run-loop, which
    /// then keeps going.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            IceError::RootUnavailable { .. }
                | IceError::TemplateUnreadable { .. }
                | IceError::TemplateMalformed { .. }
                | IceError::EmptySearchPath { .. }
                | IceError::Identity { .. }
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn unknown_command_message() {
        let err = IceError::UnknownCommand {
            name: String::from("nope"),
        };

        assert_eq!(err.to_string(), "Command `nope' not found!");
        assert!(!err.is_fatal());
    }

    #[test]
    fn configuration_errors_are_fatal() {
        let err = IceError::EmptySearchPath { which: "help" };

        assert_eq!(err.to_string(), "help search path is empty");
        assert!(err.is_fatal());
    }
}
