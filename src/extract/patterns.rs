//! Regular expressions used to recognise links, emails and phone numbers
//!
//! Every pattern can be replaced by the operator. A pattern that defines a
//! capture group named `value` contributes only that group; otherwise the
//! whole match is extracted.

use crate::config::PatternConfig;
use crate::{ConfigError, ConfigResult};
use regex::Regex;

/// Absolute links inside a word of visible text
pub const DEFAULT_LINK_PATTERN: &str = r"https?://(www\.)?[-a-zA-Z0-9äöüÄÖÜ@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b[-a-zA-Z0-9äöüÄÖÜ()@:%_+.~#?&/=]*";

/// A whole `href` value: an absolute http(s) URL, or a relative reference whose
/// first segment carries no `:` (which rules out `mailto:`, `javascript:`, `tel:`)
pub const DEFAULT_HREF_PATTERN: &str = r"^(?:https?://\S+|[^\s:/?#]*(?:[/?#]\S*)?)$";

/// Email addresses; a leading `mailto:` is part of the match
pub const DEFAULT_EMAIL_PATTERN: &str = r"(mailto:)?[a-zA-Z0-9äöüÄÖÜ.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9äöüÄÖÜ](?:[a-zA-Z0-9äöüÄÖÜ-]{0,61}[a-zA-Z0-9äöüÄÖÜ])?(?:\.[a-zA-Z0-9äöüÄÖÜ](?:[a-zA-Z0-9äöüÄÖÜ-]{0,61}[a-zA-Z0-9äöüÄÖÜ])?)*";

/// A single phone number in a word, surrounded by at most non-digit punctuation
pub const DEFAULT_PHONE_NUMBER_PATTERN: &str = r"^[^0-9+(]*(?P<value>\+?\(?[0-9]{3}\)?[-.\s]?[0-9]{3}[-.\s]?[0-9]{4,6})[^0-9]*$";

/// Compiled extraction patterns
#[derive(Debug, Clone)]
pub struct Patterns {
    link: Regex,
    href: Regex,
    email: Regex,
    phone_number: Regex,
}

impl Patterns {
    /// Compiles the patterns, using the built-in default for every absent override
    ///
    /// # Arguments
    ///
    /// * `overrides` - Operator-supplied patterns
    ///
    /// # Returns
    ///
    /// * `Ok(Patterns)` - All patterns compiled
    /// * `Err(ConfigError::InvalidPattern)` - An override is not a valid regex
    pub fn new(overrides: &PatternConfig) -> ConfigResult<Self> {
        Ok(Self {
            link: compile("link", overrides.link.as_deref(), DEFAULT_LINK_PATTERN)?,
            href: compile("href", overrides.href.as_deref(), DEFAULT_HREF_PATTERN)?,
            email: compile("email", overrides.email.as_deref(), DEFAULT_EMAIL_PATTERN)?,
            phone_number: compile(
                "telephone",
                overrides.telephone.as_deref(),
                DEFAULT_PHONE_NUMBER_PATTERN,
            )?,
        })
    }

    /// Finds a link in a word of visible text
    pub fn find_link<'h>(&self, word: &'h str) -> Option<&'h str> {
        extract(&self.link, word)
    }

    /// Matches the value of a relevant attribute against the href pattern
    pub fn find_href<'h>(&self, value: &'h str) -> Option<&'h str> {
        extract(&self.href, value)
    }

    pub fn find_email<'h>(&self, haystack: &'h str) -> Option<&'h str> {
        extract(&self.email, haystack)
    }

    pub fn find_phone_number<'h>(&self, haystack: &'h str) -> Option<&'h str> {
        extract(&self.phone_number, haystack)
    }
}

#[cfg(test)]
impl Default for Patterns {
    fn default() -> Self {
        Self::new(&PatternConfig::default()).expect("built-in patterns are valid")
    }
}

fn compile(name: &'static str, custom: Option<&str>, standard: &str) -> ConfigResult<Regex> {
    Regex::new(custom.unwrap_or(standard))
        .map_err(|source| ConfigError::InvalidPattern { name, source })
}

fn extract<'h>(pattern: &Regex, haystack: &'h str) -> Option<&'h str> {
    let captures = pattern.captures(haystack)?;
    captures
        .name("value")
        .or_else(|| captures.get(0))
        .map(|m| m.as_str())
        .filter(|found| !found.is_empty())
}
