//! Output module for reporting crawl results
//!
//! At the end of a crawl the collected links, emails and phone numbers are
//! printed to stdout or appended to the configured file.

mod report;

pub use report::{write_report, CrawlReport};
