//! Loading and rendering of the message-of-the-day and prompt templates.
//!
//! Templates are plain text with named placeholders. Two spellings are understood, `%{name}` and
//! `%<name>s` (`%<name>d` is accepted as well), and `%%` renders a single `%`. A `%` followed by
//! anything else is left alone.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::IceError;
use crate::Result;

/// A template read from disk, with its trailing newline already chomped.
#[derive(Debug, Clone)]
pub struct Template {
    path: PathBuf,
    raw: String,
}

impl Template {
    /// Reads the template at `path`.
    ///
    /// # Arguments
    /// `path` - The file to read.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Template> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| IceError::TemplateUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Template::new(path, chomp(&raw)))
    }

    /// Constructs a template from text already in memory. `path` is only used in error messages.
    pub fn new<P: AsRef<Path>>(path: P, raw: &str) -> Template {
        Template {
            path: path.as_ref().to_path_buf(),
            raw: raw.to_string(),
        }
    }

    /// The template text, before any substitution.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Renders the template, substituting placeholders with the given values.
    ///
    /// # Arguments
    /// `vars` - The (name, value) pairs available to the template.
    ///
    /// # Returns
    /// `Result<String>` - The rendered text, or `TemplateMalformed` if a placeholder names an
    /// unknown variable or is never closed.
    pub fn render(&self, vars: &[(&str, &str)]) -> Result<String> {
        let mut rendered = String::with_capacity(self.raw.len());
        let mut rest = self.raw.as_str();

        while let Some(idx) = rest.find('%') {
            rendered.push_str(&rest[..idx]);
            let after = &rest[idx + 1..];

            rest = match after.chars().next() {
                Some('%') => {
                    rendered.push('%');
                    &after[1..]
                }
                Some('{') => {
                    let (name, remaining) = self.placeholder(&after[1..], '}')?;
                    rendered.push_str(self.lookup(vars, name)?);
                    remaining
                }
                Some('<') => {
                    let (name, remaining) = self.placeholder(&after[1..], '>')?;
                    let remaining = match remaining.chars().next() {
                        Some('s') | Some('d') => &remaining[1..],
                        _ => {
                            return Err(self.malformed(format!(
                                "`%<{}>' is missing its `s' conversion",
                                name
                            )))
                        }
                    };
                    rendered.push_str(self.lookup(vars, name)?);
                    remaining
                }
                _ => {
                    rendered.push('%');
                    after
                }
            };
        }
        rendered.push_str(rest);

        Ok(rendered)
    }

    /// Splits `text` at the first `close`, returning the placeholder name and what follows it.
    fn placeholder<'t>(&self, text: &'t str, close: char) -> Result<(&'t str, &'t str)> {
        match text.find(close) {
            Some(end) => Ok((&text[..end], &text[end + close.len_utf8()..])),
            None => Err(self.malformed(format!("unterminated placeholder, expected `{}'", close))),
        }
    }

    fn lookup<'v>(&self, vars: &[(&str, &'v str)], name: &str) -> Result<&'v str> {
        vars.iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .ok_or_else(|| self.malformed(format!("unknown variable `{}'", name)))
    }

    fn malformed(&self, msg: String) -> IceError {
        IceError::TemplateMalformed {
            path: self.path.clone(),
            msg,
        }
    }
}

/// Strips a single trailing line terminator.
fn chomp(s: &str) -> &str {
    s.strip_suffix("\r\n")
        .or_else(|| s.strip_suffix('\n'))
        .unwrap_or(s)
}
