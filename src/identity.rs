//! Who and where we are, for the prompt.

use crate::error::IceError;
use crate::Result;

/// The values the prompt template may interpolate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptParams {
    /// The effective user's login name.
    pub user: String,
    /// The host name, up to the first dot.
    pub host: String,
}

impl PromptParams {
    /// Looks up the current user and short host name.
    pub fn lookup() -> Result<PromptParams> {
        Ok(PromptParams {
            user: user_name()?,
            host: short_hostname()?,
        })
    }

    /// The (name, value) pairs to render a prompt template with.
    pub fn vars(&self) -> [(&str, &str); 2] {
        [("u", self.user.as_str()), ("h", self.host.as_str())]
    }
}

/// Returns the login name of the effective user, as `whoami` would.
pub fn user_name() -> Result<String> {
    whoami::fallible::username().map_err(|source| IceError::Identity {
        what: "user name",
        source,
    })
}

/// Returns the host name truncated at its first dot, as `hostname -s` would.
pub fn short_hostname() -> Result<String> {
    let full = hostname::get().map_err(|source| IceError::Identity {
        what: "host name",
        source,
    })?;

    Ok(shorten(&full.to_string_lossy()).to_string())
}

fn shorten(host: &str) -> &str {
    host.split('.').next().unwrap_or(host)
}

#[cfg(test)]
mod test {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn shorten_drops_domain() {
        assert_eq!(shorten("ice.example.com"), "ice");
        assert_eq!(shorten("ice"), "ice");
    }

    #[test]
    fn lookup_is_not_empty() {
        let params = PromptParams::lookup().unwrap();

        assert!(!params.user.is_empty());
        assert!(!params.host.contains('.'));
    }

    #[test]
    fn vars_name_user_and_host() {
        let params = PromptParams {
            user: String::from("chris"),
            host: String::from("ice"),
        };

        assert_eq!(params.vars(), [("u", "chris"), ("h", "ice")]);
    }
}
