//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PostRecord` / `MediaReference`: one discovered post and its resolved media
//! - `CrawlState`: the transient queue and page cursor of a single crawl
//! - `CrawlPhase`: the phases of the pagination state machine

mod crawl_state;
mod post_record;

// Re-export main types
pub use crawl_state::{CrawlPhase, CrawlState};
pub use post_record::{MediaReference, PostRecord};
