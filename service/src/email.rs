//! Mail address syntax checking.
//!
//! Accepts a single RFC 5322 mailbox: either a bare `addr-spec`
//! (`local@domain`) or an angle address with an optional display name
//! (`<local@domain>`, `Name <local@domain>`, `"Last, First" <local@domain>`).
//!
//! The domain is a strict dot-atom. The local part is a quoted string or an
//! atom in which dots may lead, trail or repeat, as many real mailboxes
//! (and common mail parsers) allow. Atoms may contain UTF-8 characters.

use alloc::string::String;
use core::fmt;
use std::sync::LazyLock;

use regex::Regex;

#[expect(clippy::unwrap_used, reason = "the pattern is a compile-time constant")]
static MAILBOX: LazyLock<Regex> = LazyLock::new(|| {
    // visible characters other than specials, dot and space
    const ATEXT: &str = r#"[^\x00-\x20\x7F()<>\[\]:;@\\,".]"#;
    const QUOTED: &str = r#""(?:[^"\\\r\n]|\\[^\r\n])+""#;
    let domain = format!("{ATEXT}+(?:\\.{ATEXT}+)*");
    let word = format!("(?:(?:{ATEXT}|\\.)+|{QUOTED})");
    let addr_spec = format!("{word}@{domain}");
    let display_name = format!("{word}(?:[ \\t]+{word})*");
    Regex::new(&format!(
        "^(?:{addr_spec}|(?:{display_name}[ \\t]*)?<{addr_spec}>)$"
    ))
    .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid email address")]
pub struct InvalidAddress;

/// A syntactically valid mail address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address(String);

impl Address {
    /// Validate `raw` as-is. Callers trim surrounding whitespace first.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAddress`] when `raw` is not a single mailbox.
    pub fn parse(raw: &str) -> Result<Self, InvalidAddress> {
        if MAILBOX.is_match(raw) {
            Ok(Self(raw.to_owned()))
        } else {
            Err(InvalidAddress)
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
