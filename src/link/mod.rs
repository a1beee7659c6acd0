//! Link model for Spoder
//!
//! This module defines the deduplication identity of a discovered reference
//! ([`AbsoluteLink`]), the schemes the crawler is allowed to fetch, and the
//! remaining-depth counter carried by every crawl task.

mod resolve;

pub use resolve::resolve;

use std::fmt;

/// URL schemes the crawler fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Http,
    Https,
}

impl Scheme {
    /// All allowed schemes, in prefix-check order
    pub const ALL: [Scheme; 2] = [Scheme::Http, Scheme::Https];

    /// Returns the literal prefix of this scheme, including `://`
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Http => "http://",
            Self::Https => "https://",
        }
    }

    /// Determines the scheme of a URL by literal prefix inspection
    ///
    /// No parsing happens here: `HTTP://` or ` https://` are not recognised.
    ///
    /// # Examples
    ///
    /// ```
    /// use spoder::link::Scheme;
    ///
    /// assert_eq!(Scheme::of("https://example.com"), Some(Scheme::Https));
    /// assert_eq!(Scheme::of("ftp://example.com"), None);
    /// ```
    pub fn of(url: &str) -> Option<Scheme> {
        Self::ALL
            .into_iter()
            .find(|scheme| url.starts_with(scheme.prefix()))
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Https => write!(f, "https"),
        }
    }
}

/// A fully resolved reference to a resource
///
/// The link is stored as the pair `(base, reference)`: `reference` is the
/// string literally found in the markup and `base` is the part of the parent
/// URL it was resolved against (empty when the reference was already absolute).
/// The absolute URL is the concatenation of both, which is also what
/// [`Display`](fmt::Display) prints.
///
/// Equality and hashing are structural over both fields. This is the
/// deduplication key of the crawl, and it is deliberately not URL
/// normalization: `https://a.com/x` found verbatim and `/x` found on a page of
/// `a.com` are two different links, as are case or trailing-slash variants.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AbsoluteLink {
    base: String,
    reference: String,
}

impl AbsoluteLink {
    /// Creates a link from an explicit base and reference
    pub fn new(base: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            reference: reference.into(),
        }
    }

    /// Creates a link from a reference that is already absolute
    ///
    /// The seed URL enters the crawl this way.
    pub fn absolute(url: impl Into<String>) -> Self {
        Self::new(String::new(), url)
    }

    /// The resolution base, empty for references that were already absolute
    pub fn base(&self) -> &str {
        &self.base
    }

    /// The reference exactly as it was found
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Returns the scheme of the concatenated URL, if it is an allowed one
    pub fn scheme(&self) -> Option<Scheme> {
        if self.base.is_empty() {
            Scheme::of(&self.reference)
        } else {
            Scheme::of(&self.base)
        }
    }
}

impl fmt::Display for AbsoluteLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.base, self.reference)
    }
}

/// Remaining recursion depth of a crawl task
///
/// `Limited(0)` means "do not fetch"; `Unlimited` never reaches zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Depth {
    Limited(u32),
    Unlimited,
}

impl Depth {
    /// Returns true if a task with this depth must terminate without fetching
    pub fn is_exhausted(self) -> bool {
        matches!(self, Self::Limited(0))
    }

    /// The depth handed to tasks spawned from a page crawled at this depth
    pub fn child(self) -> Depth {
        match self {
            Self::Limited(n) => Self::Limited(n.saturating_sub(1)),
            Self::Unlimited => Self::Unlimited,
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Limited(n) => write!(f, "{}", n),
            Self::Unlimited => write!(f, "unlimited"),
        }
    }
}
