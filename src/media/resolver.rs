//! Media link resolution
//!
//! Posts usually link to a hosting site rather than to the media file itself.
//! A `ResolverRegistry` maps hosting-domain tags to resolution strategies and
//! turns an outbound link into a direct media URL when it can.

use crate::crawler::PageFetcher;
use crate::media::FilenameDeriver;
use crate::HarvestError;
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::sync::Arc;

/// Marker of the direct video source on gfycat pages
pub const GFYCAT_SOURCE_SELECTOR: &str = "source#webmSource";

/// Strategy for turning a post link on one hosting site into a media URL
#[async_trait]
pub trait MediaResolver: Send + Sync {
    /// Returns the direct media URL for `post_url`, or `None` if there is none
    ///
    /// Failures to reach the hosting site are reported as `None`.
    async fn resolve(&self, post_url: &str) -> Option<String>;
}

/// Resolver for hosts whose posts need no special handling
///
/// Gallery and self posts land here: there is no single file to download.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMediaResolver;

#[async_trait]
impl MediaResolver for NoMediaResolver {
    async fn resolve(&self, _post_url: &str) -> Option<String> {
        None
    }
}

/// Resolver for hosts embedding the direct media source in their page
///
/// Fetches the post page and returns the `src` of the first element matching
/// the configured selector.
pub struct EmbeddedSourceResolver {
    fetcher: Arc<dyn PageFetcher>,
    selector: String,
}

impl EmbeddedSourceResolver {
    /// Creates a resolver looking for `selector` on fetched pages
    ///
    /// Returns `None` if the selector does not parse.
    pub fn new(fetcher: Arc<dyn PageFetcher>, selector: &str) -> Option<Self> {
        Selector::parse(selector).ok()?;
        Some(Self {
            fetcher,
            selector: selector.to_string(),
        })
    }

    /// Extracts the embedded source from fetched markup
    fn find_source(&self, html: &str) -> Option<String> {
        let selector = Selector::parse(&self.selector).ok()?;
        let document = Html::parse_document(html);
        document
            .select(&selector)
            .next()
            .and_then(|element| element.value().attr("src"))
            .map(|src| src.trim().to_string())
            .filter(|src| !src.is_empty())
    }
}

#[async_trait]
impl MediaResolver for EmbeddedSourceResolver {
    async fn resolve(&self, post_url: &str) -> Option<String> {
        match self.fetcher.fetch(post_url).await {
            Ok(html) => self.find_source(&html),
            Err(e) => {
                tracing::debug!("Could not fetch {} for media resolution: {}", post_url, e);
                None
            }
        }
    }
}

/// What the registry does for posts on hosts without a registered resolver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownDomainPolicy {
    /// Treat the post as unresolvable
    #[default]
    Skip,

    /// Abort with `HarvestError::UnknownHostingDomain`
    Fail,
}

/// Registry of per-hosting-domain resolvers
///
/// Tags are matched in registration order. Posts whose tag has no resolver
/// fall back to the `UnknownDomainPolicy` (by default: unresolvable).
pub struct ResolverRegistry {
    resolvers: Vec<(String, Arc<dyn MediaResolver>)>,
    filenames: FilenameDeriver,
    unknown_domain: UnknownDomainPolicy,
}

impl ResolverRegistry {
    /// Creates an empty registry
    pub fn new(filenames: FilenameDeriver, unknown_domain: UnknownDomainPolicy) -> Self {
        Self {
            resolvers: Vec::new(),
            filenames,
            unknown_domain,
        }
    }

    /// Registers (or replaces) the resolver for a hosting-domain tag
    pub fn register(&mut self, tag: &str, resolver: Arc<dyn MediaResolver>) {
        match self.resolvers.iter().position(|(t, _)| t == tag) {
            Some(index) => self.resolvers[index].1 = resolver,
            None => self.resolvers.push((tag.to_string(), resolver)),
        }
    }

    /// Registered tags, in match order
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.resolvers.iter().map(|(tag, _)| tag.as_str())
    }

    /// Determines the hosting-domain tag of a post
    ///
    /// The domain label shown on the listing is checked first; the outbound
    /// URL is the fallback.
    pub fn hosting_tag(&self, domain_label: &str, post_url: &str) -> Option<&str> {
        let label = domain_label.to_lowercase();
        let url = post_url.to_lowercase();

        self.tags()
            .find(|tag| !label.is_empty() && label.contains(tag))
            .or_else(|| self.tags().find(|tag| url.contains(tag)))
    }

    /// Resolves the media URL of a post
    ///
    /// Links that already point at a file with a known extension are returned
    /// unchanged. Otherwise the resolver registered for `tag` decides. Under
    /// the default `Skip` policy this never fails.
    pub async fn resolve(
        &self,
        post_url: &str,
        tag: Option<&str>,
    ) -> Result<Option<String>, HarvestError> {
        if self.filenames.known_extension(post_url).is_some() {
            return Ok(Some(post_url.to_string()));
        }

        let resolver = tag.and_then(|tag| {
            self.resolvers
                .iter()
                .find(|(t, _)| t == tag)
                .map(|(_, resolver)| resolver)
        });

        match resolver {
            Some(resolver) => Ok(resolver.resolve(post_url).await),
            None => match self.unknown_domain {
                UnknownDomainPolicy::Skip => {
                    tracing::trace!("No resolver for {}, skipping", post_url);
                    Ok(None)
                }
                UnknownDomainPolicy::Fail => Err(HarvestError::UnknownHostingDomain {
                    url: post_url.to_string(),
                }),
            },
        }
    }
}

/// Builds the registry for the configured hosting domains
///
/// gfycat pages embed their video source and get an `EmbeddedSourceResolver`;
/// every other configured tag is registered with `NoMediaResolver`.
pub fn build_default_registry(
    hosting_domains: &[String],
    filenames: FilenameDeriver,
    unknown_domain: UnknownDomainPolicy,
    fetcher: Arc<dyn PageFetcher>,
) -> ResolverRegistry {
    let mut registry = ResolverRegistry::new(filenames, unknown_domain);

    for tag in hosting_domains {
        let resolver: Arc<dyn MediaResolver> = match tag.as_str() {
            "gfycat" => {
                match EmbeddedSourceResolver::new(fetcher.clone(), GFYCAT_SOURCE_SELECTOR) {
                    Some(resolver) => Arc::new(resolver),
                    None => Arc::new(NoMediaResolver),
                }
            }
            _ => Arc::new(NoMediaResolver),
        };
        registry.register(tag, resolver);
    }

    registry
}
