//! Statistics generation from the download-state database
//!
//! This module provides functionality for extracting and displaying
//! harvest statistics from the storage layer.

use crate::download::DownloadSummary;
use crate::storage::{DomainCount, DownloadStore};
use crate::HarvestError;
use std::fmt::Write;

/// Download-state statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatistics {
    /// Total number of posts ever seen
    pub total_rows: u64,

    /// Posts with a resolved media URL
    pub rows_with_media: u64,

    /// Posts whose media was downloaded
    pub downloaded_rows: u64,

    /// Counts per hosting domain, largest first
    pub domains: Vec<DomainCount>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(StoreStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn DownloadStore) -> Result<StoreStatistics, HarvestError> {
    Ok(StoreStatistics {
        total_rows: storage.count_rows()?,
        rows_with_media: storage.count_with_media()?,
        downloaded_rows: storage.count_downloaded()?,
        domains: storage.domain_breakdown()?,
    })
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole > 0 {
        (part as f64 / whole as f64) * 100.0
    } else {
        0.0
    }
}

/// Formats statistics as a plain-text report
///
/// The summary of the current run, when given, is shown first.
pub fn format_statistics(stats: &StoreStatistics, run: Option<&DownloadSummary>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Harvest Statistics ===\n");

    if let Some(run) = run {
        let _ = writeln!(out, "This run:");
        let _ = writeln!(out, "  Posts discovered: {}", run.discovered);
        let _ = writeln!(out, "  Posts with media: {}", run.downloadable);
        let _ = writeln!(out, "  Files downloaded: {}", run.downloaded);
        let _ = writeln!(out, "  Already downloaded: {}", run.already_downloaded);
        let _ = writeln!(out, "  Failed transfers: {}", run.failed);
        let _ = writeln!(out, "  Without media: {}", run.skipped_unresolved);
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Total posts recorded: {}", stats.total_rows);
    let _ = writeln!(
        out,
        "  Posts with media: {} ({:.1}%)",
        stats.rows_with_media,
        percentage(stats.rows_with_media, stats.total_rows)
    );
    let _ = writeln!(
        out,
        "  Downloaded: {} ({:.1}% of media)",
        stats.downloaded_rows,
        percentage(stats.downloaded_rows, stats.rows_with_media)
    );

    if !stats.domains.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Domains ({}):", stats.domains.len());
        for domain in &stats.domains {
            let name = if domain.domain.is_empty() {
                "(none)"
            } else {
                domain.domain.as_str()
            };
            let _ = writeln!(
                out,
                "  {}: {} post(s), {} with media, {} downloaded",
                name, domain.rows, domain.with_media, domain.downloaded
            );
        }
    }

    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &StoreStatistics, run: Option<&DownloadSummary>) {
    print!("{}", format_statistics(stats, run));
}
