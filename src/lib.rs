//! A restricted interactive shell.
//!
//! icesh only runs executables found in a curated set of directories. It offers line editing,
//! tab completion over the commands it found, a `help` pseudo-command that asks each command for
//! its purpose, and a sentinel exit code (`command::EXIT_CODE`) with which any command can end
//! the session.

use std::result;

pub mod command;
pub mod command_set;
pub mod error;
pub mod identity;
mod readline;
pub mod shell;
pub mod template;
mod tokenizer;

pub type Result<T> = result::Result<T, error::IceError>;
