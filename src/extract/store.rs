//! Process-wide deduplicated collections of everything the crawl discovers

use crate::link::AbsoluteLink;
use dashmap::DashSet;

/// The three discovered-artifact sets
///
/// Every insert is an atomic check-and-set on a single key, so concurrent
/// discoveries of the same value produce exactly one winner. Nothing is ever
/// removed while the crawl runs.
#[derive(Debug, Default)]
pub struct ArtifactStore {
    links: DashSet<AbsoluteLink>,
    emails: DashSet<String>,
    phone_numbers: DashSet<String>,
}

impl ArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a link
    ///
    /// # Returns
    ///
    /// `true` if this call added the link, `false` if it was already known
    pub fn insert_link(&self, link: AbsoluteLink) -> bool {
        self.links.insert(link)
    }

    /// Inserts an email address, returning `true` if it was new
    pub fn insert_email(&self, email: &str) -> bool {
        if self.emails.contains(email) {
            return false;
        }
        self.emails.insert(email.to_string())
    }

    /// Inserts a phone number, returning `true` if it was new
    pub fn insert_phone_number(&self, phone_number: &str) -> bool {
        if self.phone_numbers.contains(phone_number) {
            return false;
        }
        self.phone_numbers.insert(phone_number.to_string())
    }

    /// All links found so far, sorted by their absolute form
    pub fn links(&self) -> Vec<AbsoluteLink> {
        let mut links: Vec<AbsoluteLink> = self.links.iter().map(|l| l.key().clone()).collect();
        links.sort_by_cached_key(|link| link.to_string());
        links
    }

    pub fn emails(&self) -> Vec<String> {
        sorted(&self.emails)
    }

    pub fn phone_numbers(&self) -> Vec<String> {
        sorted(&self.phone_numbers)
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn email_count(&self) -> usize {
        self.emails.len()
    }

    pub fn phone_number_count(&self) -> usize {
        self.phone_numbers.len()
    }
}

fn sorted(set: &DashSet<String>) -> Vec<String> {
    let mut values: Vec<String> = set.iter().map(|v| v.key().clone()).collect();
    values.sort();
    values
}
