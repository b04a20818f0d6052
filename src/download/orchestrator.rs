//! Download orchestration over the crawl output
//!
//! Every crawled record is upserted into the store. Records with a resolved
//! media URL that are not downloaded yet are transferred into the destination
//! directory and marked downloaded.

use crate::download::MediaTransfer;
use crate::state::PostRecord;
use crate::storage::DownloadStore;
use crate::HarvestError;
use chrono::Utc;
use std::path::PathBuf;

/// Outcome counts of one download pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Records received from the crawl
    pub discovered: usize,

    /// Records with a resolved media URL
    pub downloadable: usize,

    /// Files transferred in this pass
    pub downloaded: usize,

    /// Records skipped because an earlier run downloaded them
    pub already_downloaded: usize,

    /// Records skipped for lack of a resolved media URL
    pub skipped_unresolved: usize,

    /// Transfers that failed
    pub failed: usize,
}

/// Downloads the media of crawled records exactly once
pub struct DownloadOrchestrator<T: MediaTransfer> {
    transfer: T,
    destination: PathBuf,
    verbose: bool,
}

impl<T: MediaTransfer> DownloadOrchestrator<T> {
    /// Creates an orchestrator writing files into `destination`
    ///
    /// With `verbose` set, progress is logged at info level.
    pub fn new(transfer: T, destination: PathBuf, verbose: bool) -> Self {
        Self {
            transfer,
            destination,
            verbose,
        }
    }

    fn report_progress(&self, index: usize, total: usize, url: &str) {
        if self.verbose {
            tracing::info!("Downloading {}/{}: {}", index, total, url);
        } else {
            tracing::debug!("Downloading {}/{}: {}", index, total, url);
        }
    }

    /// Processes the crawl output in order
    ///
    /// Store failures abort the pass. Transfer failures are logged, their
    /// HTTP status (when known) is recorded and the pass continues.
    pub async fn run<S: DownloadStore>(
        &self,
        store: &mut S,
        records: Vec<PostRecord>,
    ) -> Result<DownloadSummary, HarvestError> {
        let mut summary = DownloadSummary {
            discovered: records.len(),
            downloadable: records.iter().filter(|r| r.media.is_resolved()).count(),
            ..DownloadSummary::default()
        };
        let mut index = 0;

        for record in records {
            let row_id = store.upsert(&record)?;

            let (Some(url), Some(filename)) = (&record.media.resolved_url, &record.media.filename)
            else {
                summary.skipped_unresolved += 1;
                continue;
            };
            index += 1;

            if store.is_downloaded(&record.source_url)? {
                tracing::debug!("Already downloaded: {}", record.source_url);
                summary.already_downloaded += 1;
                continue;
            }

            self.report_progress(index, summary.downloadable, url);
            let destination = self.destination.join(filename);

            match self.transfer.transfer(url, &destination).await {
                Ok(status) => {
                    store.record_fetch_status(row_id, status)?;
                    store.mark_downloaded(row_id, Utc::now())?;
                    summary.downloaded += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to download {}: {}", url, e);
                    if let HarvestError::TransferStatus { status, .. } = e {
                        store.record_fetch_status(row_id, status)?;
                    }
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            "Downloaded {} of {} file(s) ({} already present, {} failed, {} without media)",
            summary.downloaded,
            summary.downloadable,
            summary.already_downloaded,
            summary.failed,
            summary.skipped_unresolved
        );

        Ok(summary)
    }
}
