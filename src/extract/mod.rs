//! Extraction engine
//!
//! Turns raw markup into discovered artifacts without building a DOM.
//!
//! # Components
//!
//! - `MarkupTokenizer`: splits a byte stream into text and tag segments
//! - `AttributeScanner`: reads `key=value` pairs out of a tag
//! - `Patterns`: the link, href, email and phone number regexes
//! - `ArtifactStore`: the shared deduplicated sets
//!
//! [`ExtractionEngine`] ties them together: it matches words and attribute
//! values against the patterns, resolves links against the page they were
//! found on, and reports which links were new.

mod attributes;
mod patterns;
mod store;
mod tokenizer;

pub use attributes::{href_value, is_base_tag, Attribute, AttributeScanner, RELEVANT_KEYWORDS};
pub use patterns::{
    Patterns, DEFAULT_EMAIL_PATTERN, DEFAULT_HREF_PATTERN, DEFAULT_LINK_PATTERN,
    DEFAULT_PHONE_NUMBER_PATTERN,
};
pub use store::ArtifactStore;
pub use tokenizer::{MarkupTokenizer, Segment};

use crate::link::{resolve, AbsoluteLink};
use std::collections::HashSet;
use std::sync::Arc;

/// Pattern matching over text and tag segments, backed by the shared store
#[derive(Debug, Clone)]
pub struct ExtractionEngine {
    patterns: Arc<Patterns>,
    store: Arc<ArtifactStore>,
}

impl ExtractionEngine {
    pub fn new(patterns: Patterns, store: Arc<ArtifactStore>) -> Self {
        Self {
            patterns: Arc::new(patterns),
            store,
        }
    }

    pub fn store(&self) -> &Arc<ArtifactStore> {
        &self.store
    }

    /// Extracts artifacts from a segment of visible text
    ///
    /// Each space-separated word yields at most one artifact, checked in the
    /// order link, email, phone number.
    ///
    /// # Arguments
    ///
    /// * `text` - Whitespace-normalized text between two tags
    /// * `parent` - The link relative references are resolved against
    ///
    /// # Returns
    ///
    /// The links this call inserted into the store for the first time
    pub fn parse_text(&self, text: &str, parent: &AbsoluteLink) -> HashSet<AbsoluteLink> {
        let mut found = HashSet::new();

        for word in text.split(' ').filter(|word| !word.is_empty()) {
            if let Some(link) = self.patterns.find_link(word) {
                self.record_link(link, parent, &mut found);
            } else if let Some(email) = self.patterns.find_email(word) {
                self.record_email(email);
            } else if let Some(phone_number) = self.patterns.find_phone_number(word) {
                if self.store.insert_phone_number(phone_number) {
                    tracing::debug!("Found phone number {}", phone_number);
                }
            }
        }

        found
    }

    /// Extracts artifacts from the raw text of a tag
    ///
    /// Only values of relevant attributes are considered. A value matching the
    /// href pattern is recorded as a link; otherwise it is tried as an email.
    ///
    /// # Arguments
    ///
    /// * `tag` - Raw tag content between `<` and `>`
    /// * `parent` - The link relative references are resolved against
    ///
    /// # Returns
    ///
    /// The links this call inserted into the store for the first time
    pub fn parse_attributes(&self, tag: &str, parent: &AbsoluteLink) -> HashSet<AbsoluteLink> {
        let mut found = HashSet::new();

        for attribute in AttributeScanner::new(tag) {
            if !attribute.is_relevant() || attribute.value.is_empty() {
                continue;
            }

            if let Some(link) = self.patterns.find_href(attribute.value) {
                self.record_link(link, parent, &mut found);
            } else if let Some(email) = self.patterns.find_email(attribute.value) {
                self.record_email(email);
            }
        }

        found
    }

    fn record_link(
        &self,
        found: &str,
        parent: &AbsoluteLink,
        new_links: &mut HashSet<AbsoluteLink>,
    ) {
        let link = resolve(Some(parent), found);
        if self.store.insert_link(link.clone()) {
            tracing::debug!("Found link {}", link);
            new_links.insert(link);
        }
    }

    fn record_email(&self, email: &str) {
        if self.store.insert_email(email) {
            tracing::debug!("Found email {}", email);
        }
    }
}

#[cfg(test)]
impl Default for ExtractionEngine {
    fn default() -> Self {
        Self::new(Patterns::default(), Arc::new(ArtifactStore::new()))
    }
}
