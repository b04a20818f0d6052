//! Listing page extraction
//!
//! Turns the markup of one listing page into post records:
//! - Post containers are `div`s whose class list reads `thing id-t3...`
//! - Each container yields an outbound link, title, domain label, posting
//!   time and comments link
//! - The next page is the link inside `span.next-button`
//!
//! Parsing is synchronous; media resolution happens afterwards so that no
//! parsed document is held across an await point.

use crate::media::{FilenameDeriver, ResolverRegistry};
use crate::state::{MediaReference, PostRecord};
use crate::url::resolve_link;
use crate::HarvestError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use url::Url;

/// Class list of a post container: `thing` immediately followed by `id-t3...`
const THING_CLASS_PATTERN: &str = r"(?:^|\s)thing\s+id-t3\S*";

/// Reasons a post container is dropped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("post container has no outbound link")]
    MissingOutboundUrl,

    #[error("post container {outbound_url} has no comments link")]
    MissingCommentsLink { outbound_url: String },
}

/// Fields scraped from one post container, before media resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPost {
    pub outbound_url: String,
    pub domain_label: String,
    pub title: String,
    pub posted_at: Option<String>,
    pub comments_url: String,
}

/// Everything found on one listing page
#[derive(Debug, Clone)]
pub struct ParsedListing {
    /// One entry per post container, in page order
    pub posts: Vec<Result<RawPost, ExtractError>>,

    /// Absolute URL of the next listing page
    pub next_page: Option<String>,
}

fn thing_class() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(THING_CLASS_PATTERN).ok())
        .as_ref()
}

/// Returns true if a class attribute marks a post container
fn is_post_container(class: &str) -> bool {
    thing_class().is_some_and(|pattern| pattern.is_match(class))
}

fn text_of(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_match<'a>(scope: ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    scope.select(&selector).next()
}

/// Extracts the fields of one post container
fn extract_post(container: ElementRef<'_>, page_url: &Url) -> Result<RawPost, ExtractError> {
    let title_link = first_match(container, "p.title a");

    let outbound_url = title_link
        .and_then(|link| link.value().attr("href"))
        .and_then(|href| resolve_link(href, page_url))
        .ok_or(ExtractError::MissingOutboundUrl)?;

    let comments_url = first_match(container, "li.first a")
        .and_then(|link| link.value().attr("href"))
        .and_then(|href| resolve_link(href, page_url))
        .ok_or_else(|| ExtractError::MissingCommentsLink {
            outbound_url: outbound_url.clone(),
        })?;

    let title = title_link.map(text_of).unwrap_or_default();

    let domain_label = first_match(container, "p.title span.domain a")
        .map(text_of)
        .unwrap_or_default();

    let posted_at = first_match(container, "time")
        .and_then(|time| time.value().attr("datetime"))
        .map(|datetime| datetime.trim().to_string())
        .filter(|datetime| !datetime.is_empty());

    Ok(RawPost {
        outbound_url,
        domain_label,
        title,
        posted_at,
        comments_url,
    })
}

/// Parses a listing page into raw posts and the next-page link
///
/// Relative links are resolved against `page_url`. A container missing its
/// outbound or comments link is reported as an `ExtractError` in place; the
/// other containers are unaffected.
///
/// # Example
///
/// ```
/// use listing_harvester::crawler::parse_listing;
/// use url::Url;
///
/// let html = r#"
///     <div class="thing id-t3_abc link">
///         <p class="title"><a href="https://i.redd.it/abc.png">A picture</a></p>
///         <ul><li class="first"><a href="/r/pics/comments/abc/">comments</a></li></ul>
///     </div>
///     <span class="next-button"><a href="/r/pics/?after=t3_abc">next</a></span>
/// "#;
/// let page = Url::parse("https://old.reddit.com/r/pics/").unwrap();
/// let parsed = parse_listing(html, &page);
///
/// assert_eq!(parsed.posts.len(), 1);
/// assert_eq!(
///     parsed.next_page.as_deref(),
///     Some("https://old.reddit.com/r/pics/?after=t3_abc")
/// );
/// ```
pub fn parse_listing(html: &str, page_url: &Url) -> ParsedListing {
    let document = Html::parse_document(html);
    let mut posts = Vec::new();

    if let Ok(div_selector) = Selector::parse("div[class]") {
        for container in document.select(&div_selector) {
            let is_thing = container
                .value()
                .attr("class")
                .is_some_and(is_post_container);

            if is_thing {
                posts.push(extract_post(container, page_url));
            }
        }
    }

    let next_page = Selector::parse("span.next-button a")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .and_then(|link| link.value().attr("href"))
                .and_then(|href| resolve_link(href, page_url))
        });

    ParsedListing { posts, next_page }
}

/// Records extracted from one listing page
#[derive(Debug, Clone)]
pub struct ExtractedPage {
    /// Valid records, in page order
    pub records: Vec<PostRecord>,

    /// Absolute URL of the next listing page
    pub next_page: Option<String>,

    /// Number of malformed containers that were dropped
    pub dropped: usize,
}

/// Produces post records from listing pages
///
/// Wraps the synchronous page parser and resolves each post's media through
/// the resolver registry.
pub struct PostExtractor {
    registry: Arc<ResolverRegistry>,
    filenames: FilenameDeriver,
}

impl PostExtractor {
    /// Creates an extractor resolving media through `registry`
    pub fn new(registry: Arc<ResolverRegistry>, filenames: FilenameDeriver) -> Self {
        Self {
            registry,
            filenames,
        }
    }

    /// Extracts the post records of one listing page
    ///
    /// Malformed containers are dropped with a warning. Media that cannot be
    /// resolved leaves the record's `MediaReference` empty. An error is only
    /// returned when the registry refuses a hosting domain under the `Fail`
    /// policy.
    pub async fn extract(&self, html: &str, page_url: &str) -> Result<ExtractedPage, HarvestError> {
        let base = Url::parse(page_url)?;
        let parsed = parse_listing(html, &base);

        let mut records = Vec::with_capacity(parsed.posts.len());
        let mut dropped = 0;

        for post in parsed.posts {
            let post = match post {
                Ok(post) => post,
                Err(e) => {
                    tracing::warn!("Dropping post on {}: {}", page_url, e);
                    dropped += 1;
                    continue;
                }
            };

            let tag = self
                .registry
                .hosting_tag(&post.domain_label, &post.outbound_url);
            let resolved = self.registry.resolve(&post.outbound_url, tag).await?;
            let media = MediaReference::from_resolved(resolved, &self.filenames);

            tracing::trace!(
                "Post {} [{}] -> {:?}",
                post.outbound_url,
                post.domain_label,
                media.resolved_url
            );

            records.push(PostRecord {
                source_url: post.outbound_url,
                media,
                hosting_domain: post.domain_label,
                title: post.title,
                posted_at: post.posted_at,
                comments_url: post.comments_url,
                origin_page: page_url.to_string(),
                last_fetch_status: 0,
            });
        }

        tracing::debug!(
            "Extracted {} post(s) from {} ({} dropped)",
            records.len(),
            page_url,
            dropped
        );

        Ok(ExtractedPage {
            records,
            next_page: parsed.next_page,
            dropped,
        })
    }
}
