//! Crawler module for listing pages
//!
//! This module contains the crawling side of the harvester:
//! - Plain HTTP page fetches (used by media resolvers)
//! - The render session that confirms interstitial dialogs
//! - Listing page extraction into post records
//! - Per-domain politeness delays
//! - The pagination loop

mod extractor;
mod fetcher;
mod page_crawler;
mod politeness;
mod session;

pub use extractor::{parse_listing, ExtractError, ExtractedPage, ParsedListing, PostExtractor, RawPost};
pub use fetcher::{build_http_client, user_agent_string, HttpFetcher, PageFetcher};
pub(crate) use fetcher::classify_error;
pub use page_crawler::PageCrawler;
pub use politeness::{PolitenessPolicy, PolitenessTracker};
pub use session::{
    Confirmation, HttpSession, RenderSession, RenderedPage, SessionOptions, SNAPSHOT_FILENAME,
};
