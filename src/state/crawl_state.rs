//! Crawl state threaded through the pagination loop
//!
//! A `CrawlState` lives for exactly one crawl invocation. It owns the queue of
//! records discovered so far and the cursor over listing pages.

use crate::state::PostRecord;
use std::collections::VecDeque;
use std::fmt;

/// Phase of the pagination state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Rendering the current listing page
    Fetching,

    /// Turning the rendered page into post records
    Extracting,

    /// Deciding whether (and where) to continue
    Advancing,

    /// Crawl finished; the queue is final
    Done,
}

impl CrawlPhase {
    /// Returns true if no further pages will be visited
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Checks whether moving from this phase to `next` is legal
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Fetching, Self::Extracting)
                | (Self::Extracting, Self::Advancing)
                | (Self::Advancing, Self::Fetching)
                | (Self::Advancing, Self::Done)
        )
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Advancing => "advancing",
            Self::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// In-memory state of one crawl
#[derive(Debug, Clone)]
pub struct CrawlState {
    /// Records discovered so far, in page order
    pub queue: VecDeque<PostRecord>,

    /// Listing page being processed; `None` once pagination ran out
    pub current_url: Option<String>,

    /// Number of listing pages fully processed
    pub pages_visited: u32,

    /// Current phase of the state machine
    pub phase: CrawlPhase,
}

impl CrawlState {
    /// Creates the initial state: fetching `start_url`, nothing visited
    pub fn new(start_url: &str) -> Self {
        Self {
            queue: VecDeque::new(),
            current_url: Some(start_url.to_string()),
            pages_visited: 0,
            phase: CrawlPhase::Fetching,
        }
    }

    /// Fetching -> Extracting
    pub fn page_fetched(&mut self) {
        self.transition(CrawlPhase::Extracting);
    }

    /// Appends the records of the current page; Extracting -> Advancing
    pub fn page_extracted(&mut self, records: Vec<PostRecord>) {
        self.queue.extend(records);
        self.transition(CrawlPhase::Advancing);
    }

    /// Counts the page and moves the cursor to `next_page`
    ///
    /// Transitions to `Done` when `max_pages > 0` and that many pages have
    /// been visited, or when there is no next page. `max_pages == 0` means
    /// unbounded. Returns the new phase.
    pub fn advance(&mut self, next_page: Option<String>, max_pages: u32) -> CrawlPhase {
        self.pages_visited += 1;
        self.current_url = next_page;

        let limit_reached = max_pages > 0 && self.pages_visited >= max_pages;
        if limit_reached || self.current_url.is_none() {
            self.transition(CrawlPhase::Done);
        } else {
            self.transition(CrawlPhase::Fetching);
        }
        self.phase
    }

    /// Consumes the state, yielding the accumulated records
    pub fn into_records(self) -> Vec<PostRecord> {
        self.queue.into()
    }

    fn transition(&mut self, next: CrawlPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid crawl transition {} -> {}",
            self.phase,
            next
        );
        tracing::trace!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
    }
}
