use crate::media::UnknownDomainPolicy;
use serde::Deserialize;

/// Main configuration structure for Listing-Harvester
///
/// Every section is optional in the TOML file; missing sections fall back to
/// the defaults below.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub politeness: Vec<PolitenessEntry>,
    pub media: MediaConfig,
    pub resolver: ResolverConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            user_agent: UserAgentConfig::default(),
            politeness: vec![PolitenessEntry {
                domain: "*.reddit.com".to_string(),
                delay_secs: 2,
            }],
            media: MediaConfig::default(),
            resolver: ResolverConfig::default(),
        }
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Delay between listing pages for sites without a politeness entry (seconds)
    #[serde(rename = "default-delay-secs")]
    pub default_delay_secs: u64,

    /// Bounded wait on the interstitial confirmation dialog (seconds)
    #[serde(rename = "confirm-timeout-secs")]
    pub confirm_timeout_secs: u64,

    /// Timeout for a single HTTP request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Write the page HTML to `<DIRECTORY>/snapshot.html` when confirmation times out
    #[serde(rename = "save-snapshot-on-timeout")]
    pub save_snapshot_on_timeout: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            default_delay_secs: 2,
            confirm_timeout_secs: 10,
            request_timeout_secs: 30,
            save_snapshot_on_timeout: true,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "ListingHarvester".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://github.com/listing-harvester/listing-harvester".to_string(),
        }
    }
}

/// Per-site politeness factor
#[derive(Debug, Clone, Deserialize)]
pub struct PolitenessEntry {
    /// Domain pattern of the listing site (e.g., "old.reddit.com" or "*.reddit.com")
    pub domain: String,

    /// Seconds to wait between two listing pages of this site
    #[serde(rename = "delay-secs")]
    pub delay_secs: u64,
}

/// Known media formats and hosting sites
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// File extensions treated as direct media, in match order
    pub extensions: Vec<String>,

    /// Hosting-domain tags a resolver is registered for, in match order
    #[serde(rename = "hosting-domains")]
    pub hosting_domains: Vec<String>,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            extensions: [".jpg", ".jpeg", ".png", ".gif", ".webm"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            hosting_domains: ["reddit", "imgur", "gfycat", "tumblr", "blogspot"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Resolver dispatch configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// What to do with posts whose hosting domain has no registered resolver
    #[serde(rename = "unknown-domain")]
    pub unknown_domain: UnknownDomainPolicy,
}
