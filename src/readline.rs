use std::borrow::Cow::{self, Owned};
use std::path::PathBuf;

use colored::*;

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::validate::Validator;
use rustyline::{Config, Context, Editor};
use rustyline_derive::Helper;

use crate::command_set::CommandTable;
use crate::tokenizer::{Tokenizer, WhitespaceTokenizer};

/// A wrapper around `rustyline::Editor`.
pub struct Readline {
    rl: Editor<ExecHelper>,
}

impl Readline {
    /// Constructs a new `Readline` that completes commands found on `path`.
    pub fn new(path: Vec<PathBuf>) -> Readline {
        let config = Config::builder()
            .completion_type(rustyline::CompletionType::List)
            .build();
        let mut rl = Editor::with_config(config);
        rl.set_helper(Some(ExecHelper::new(path)));
        Readline { rl }
    }

    /// Adds a history entry to the in-memory history.
    pub fn add_history_entry<E: AsRef<str> + Into<String>>(&mut self, line: E) -> bool {
        self.rl.add_history_entry(line)
    }

    /// Reads a line via the given prompt.
    ///
    /// # Arguments
    /// `prompt` - The prompt to display to the user.
    pub fn readline(&mut self, prompt: &str) -> rustyline::Result<String> {
        self.rl.readline(prompt)
    }
}

#[derive(Helper)]
/// An ExecHelper for supporting various `rustyline` features.
pub struct ExecHelper {
    completer: ExecCompleter,
    hinter: HistoryHinter,
}

impl ExecHelper {
    /// Constructs an `ExecHelper`.
    fn new(path: Vec<PathBuf>) -> ExecHelper {
        ExecHelper {
            completer: ExecCompleter::new(path),
            hinter: HistoryHinter {},
        }
    }
}

impl Completer for ExecHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        Ok(self.completer.complete(line, pos))
    }
}

impl Hinter for ExecHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for ExecHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        Owned(hint.dimmed().to_string())
    }
}

impl Validator for ExecHelper {}

/// ExecCompleter completes command names from the search path.
struct ExecCompleter {
    tokenizer: WhitespaceTokenizer,
    path: Vec<PathBuf>,
}

impl ExecCompleter {
    /// Constructs a new `ExecCompleter`.
    ///
    /// # Arguments
    /// `path` - The directories to complete commands from.
    fn new(path: Vec<PathBuf>) -> ExecCompleter {
        ExecCompleter {
            tokenizer: WhitespaceTokenizer::new(),
            path,
        }
    }

    /// Offers completion candidates for the word under the cursor.
    ///
    /// Only what comes before `pos` is considered, and the search path is rescanned every time so
    /// that commands installed mid-session show up. Candidates replace the partial word and carry
    /// a trailing space.
    ///
    /// # Arguments
    /// `line` - The line to try offering completion candidates for.
    /// `pos` - The position of the cursor on that line.
    ///
    /// # Returns
    /// `(usize, Vec<Pair>)` - Where the replacement starts, and the candidates.
    fn complete(&self, line: &str, pos: usize) -> (usize, Vec<Pair>) {
        let partial = match line.get(..pos) {
            Some(p) => p,
            None => return (0, Vec::new()),
        };

        let tokenization = self.tokenizer.tokenize(partial);
        let prefix = if tokenization.trailing_space {
            ""
        } else {
            tokenization.tokens.last().copied().unwrap_or("")
        };
        let start = pos - prefix.len();

        let table = match CommandTable::scan(&self.path) {
            Ok(table) => table,
            Err(_) => return (start, Vec::new()),
        };

        let pairs = table
            .complete(prefix)
            .into_iter()
            .map(|name| Pair {
                replacement: format!("{} ", name),
                display: name,
            })
            .collect();

        (start, pairs)
    }
}
