//! Download module: media transfer and the download pass over crawl output

mod orchestrator;
mod transfer;

pub use orchestrator::{DownloadOrchestrator, DownloadSummary};
pub use transfer::{HttpTransfer, MediaTransfer};
