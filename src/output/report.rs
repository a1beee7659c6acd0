//! Plain-text crawl report
//!
//! Three sections (links, emails, phone numbers), each listing the collected
//! values in sorted order followed by a count and a separator.

use crate::crawler::CrawlSummary;
use crate::extract::ArtifactStore;
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

const SEPARATOR: &str = "####################################################################################";

/// Snapshot of everything a crawl collected
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub summary: CrawlSummary,
    pub links: Vec<String>,
    pub emails: Vec<String>,
    pub phone_numbers: Vec<String>,
}

impl CrawlReport {
    /// Takes a sorted snapshot of the store
    pub fn new(store: &ArtifactStore, summary: CrawlSummary) -> Self {
        Self {
            summary,
            links: store.links().iter().map(|link| link.to_string()).collect(),
            emails: store.emails(),
            phone_numbers: store.phone_numbers(),
        }
    }

    /// Renders the report
    pub fn format(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Duration: {} ms", self.summary.duration.as_millis());
        let _ = writeln!(
            out,
            "Total tasks registered: {} ({})\n",
            self.summary.registered_tasks, self.summary.reason
        );

        format_section(&mut out, "Links", &self.links);
        format_section(&mut out, "Emails", &self.emails);
        format_section(&mut out, "Phone numbers", &self.phone_numbers);

        out
    }
}

fn format_section(out: &mut String, title: &str, values: &[String]) {
    let _ = writeln!(out, "{}:\n", title);
    for value in values {
        let _ = writeln!(out, "{}", value);
    }
    let _ = writeln!(
        out,
        "\nNumber of {} found: {}\n",
        title.to_lowercase(),
        values.len()
    );
    let _ = writeln!(out, "{}\n{}\n", SEPARATOR, SEPARATOR);
}

/// Writes the report to stdout, or appends it to `path`
///
/// # Arguments
///
/// * `report` - The report to write
/// * `path` - Output file; created if missing, never truncated
///
/// # Returns
///
/// * `Ok(())` - Report written
/// * `Err(std::io::Error)` - The file could not be opened or written
pub fn write_report(report: &CrawlReport, path: Option<&Path>) -> std::io::Result<()> {
    let text = report.format();

    match path {
        Some(path) => {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            file.write_all(text.as_bytes())?;
            tracing::info!("Report appended to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
