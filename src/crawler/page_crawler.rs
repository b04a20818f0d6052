//! Pagination loop over listing pages
//!
//! The crawler owns the render session for the duration of a crawl, walks
//! the listing from the start page through the next-page links and collects
//! the post records of every page in order.

use crate::crawler::politeness::PolitenessPolicy;
use crate::crawler::session::{Confirmation, RenderSession, RenderedPage};
use crate::crawler::PostExtractor;
use crate::state::{CrawlState, PostRecord};
use crate::HarvestError;

/// Drives the crawl through the listing pages
pub struct PageCrawler {
    extractor: PostExtractor,
    politeness: PolitenessPolicy,
}

impl PageCrawler {
    pub fn new(extractor: PostExtractor, politeness: PolitenessPolicy) -> Self {
        Self {
            extractor,
            politeness,
        }
    }

    /// Crawls from `start_url`, visiting at most `max_pages` pages
    ///
    /// `max_pages == 0` means the crawl runs until a page has no next-page
    /// link. The session is closed before returning, whether the crawl
    /// succeeded or not.
    ///
    /// Render failures are not fatal: the page counts as visited with no
    /// posts. Only an extraction error (a hosting domain refused by the
    /// resolver registry) aborts the crawl.
    pub async fn crawl<S: RenderSession>(
        &self,
        mut session: S,
        start_url: &str,
        max_pages: u32,
    ) -> Result<Vec<PostRecord>, HarvestError> {
        let result = self.run(&mut session, start_url, max_pages).await;

        if let Err(e) = session.close().await {
            tracing::warn!("Failed to close render session: {}", e);
        }

        result
    }

    async fn run<S: RenderSession>(
        &self,
        session: &mut S,
        start_url: &str,
        max_pages: u32,
    ) -> Result<Vec<PostRecord>, HarvestError> {
        let mut state = CrawlState::new(start_url);
        let mut politeness = self.politeness.tracker();
        let mut dropped = 0;

        tracing::info!("Starting crawl at {}", start_url);

        while let Some(url) = state.current_url.clone() {
            politeness.wait_turn(&url).await;
            tracing::debug!("Fetching listing page {} ({})", state.pages_visited + 1, url);

            let page = match session.render(&url).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("Failed to render {}: {}", url, e);
                    RenderedPage {
                        url: url.clone(),
                        html: String::new(),
                        status: 0,
                        confirmation: Confirmation::NotRequired,
                    }
                }
            };
            if page.confirmation == Confirmation::TimedOut {
                tracing::debug!("Continuing with the HTML obtained for {}", url);
            }
            state.page_fetched();

            let extracted = self.extractor.extract(&page.html, &page.url).await?;
            dropped += extracted.dropped;
            state.page_extracted(extracted.records);

            if state.advance(extracted.next_page, max_pages).is_terminal() {
                break;
            }
        }

        tracing::info!(
            "Crawl finished after {} page(s): {} post(s), {} dropped",
            state.pages_visited,
            state.queue.len(),
            dropped
        );

        Ok(state.into_records())
    }
}
