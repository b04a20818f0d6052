//! Render sessions for listing pages
//!
//! A render session is held for the whole crawl and reused page after page.
//! Listing sites may put an interstitial confirmation in front of the real
//! page (an "are you sure you want to continue" form); the session confirms it
//! and keeps the resulting cookies for the following pages.

use crate::config::{Config, UserAgentConfig};
use crate::crawler::{build_http_client, classify_error};
use crate::url::resolve_link;
use crate::HarvestError;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Marker of the confirmation button on interstitial pages
const CONFIRM_BUTTON_SELECTOR: &str = "button[type='submit'][value='yes']";

/// Snapshot file written into the destination directory on confirmation timeout
pub const SNAPSHOT_FILENAME: &str = "snapshot.html";

/// How the interstitial confirmation of a page went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The page had no confirmation dialog
    NotRequired,

    /// The dialog was confirmed and the real page loaded
    Confirmed,

    /// Loading after confirmation exceeded the bounded wait
    TimedOut,

    /// Submitting the confirmation failed
    Failed,
}

/// Final HTML of a rendered page
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// URL the HTML was served from (after redirects)
    pub url: String,

    /// The page markup
    pub html: String,

    /// HTTP status of the response the markup came from
    pub status: u16,

    /// Outcome of the confirmation step
    pub confirmation: Confirmation,
}

/// Capability to render listing pages within one long-lived session
///
/// A session is not safe to share between concurrent crawls.
#[async_trait]
pub trait RenderSession: Send {
    /// Renders `url`, confirming an interstitial dialog if one is shown
    ///
    /// A confirmation timeout is not an error: the page is returned with
    /// whatever HTML was obtained and `Confirmation::TimedOut`.
    async fn render(&mut self, url: &str) -> Result<RenderedPage, HarvestError>;

    /// Releases the session
    async fn close(&mut self) -> Result<(), HarvestError>;
}

/// Options of an `HttpSession`
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Timeout for a single request
    pub request_timeout: Duration,

    /// Bounded wait on the confirmation step
    pub confirm_timeout: Duration,

    /// Where to write the page HTML when confirmation times out
    pub snapshot_path: Option<PathBuf>,
}

impl SessionOptions {
    /// Builds the options from the crawler configuration
    ///
    /// The snapshot, when enabled, goes to `<destination>/snapshot.html`.
    pub fn from_config(config: &Config, destination: &Path) -> Self {
        Self {
            request_timeout: Duration::from_secs(config.crawler.request_timeout_secs),
            confirm_timeout: Duration::from_secs(config.crawler.confirm_timeout_secs),
            snapshot_path: config
                .crawler
                .save_snapshot_on_timeout
                .then(|| destination.join(SNAPSHOT_FILENAME)),
        }
    }
}

/// HTTP method of a confirmation form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormMethod {
    Get,
    Post,
}

/// A confirmation form ready to be submitted
#[derive(Debug, Clone, PartialEq, Eq)]
struct ConfirmForm {
    action: String,
    method: FormMethod,
    fields: Vec<(String, String)>,
}

/// Finds the confirmation dialog on a page, if any
///
/// Collects the hidden inputs of the enclosing form plus the button's own
/// name/value pair. A form without an action submits to the page itself.
fn find_confirm_form(html: &str, page_url: &Url) -> Option<ConfirmForm> {
    let button_selector = Selector::parse(CONFIRM_BUTTON_SELECTOR).ok()?;
    let hidden_selector = Selector::parse("input[type='hidden'][name]").ok()?;

    let document = Html::parse_document(html);
    let button = document.select(&button_selector).next()?;

    let form = button
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|element| element.value().name() == "form");

    let mut fields = Vec::new();
    let mut action = page_url.to_string();
    let mut method = FormMethod::Post;

    if let Some(form) = form {
        for input in form.select(&hidden_selector) {
            if let Some(name) = input.value().attr("name") {
                let value = input.value().attr("value").unwrap_or_default();
                fields.push((name.to_string(), value.to_string()));
            }
        }

        if let Some(target) = form
            .value()
            .attr("action")
            .and_then(|href| resolve_link(href, page_url))
        {
            action = target;
        }

        if form
            .value()
            .attr("method")
            .is_some_and(|m| m.eq_ignore_ascii_case("get"))
        {
            method = FormMethod::Get;
        }
    }

    if let Some(name) = button.value().attr("name") {
        fields.push((name.to_string(), "yes".to_string()));
    }

    Some(ConfirmForm {
        action,
        method,
        fields,
    })
}

/// Render session backed by a cookie-keeping HTTP client
pub struct HttpSession {
    client: Client,
    options: SessionOptions,
    pages_rendered: u32,
}

impl HttpSession {
    /// Opens a session with a fresh cookie jar
    pub fn open(user_agent: &UserAgentConfig, options: SessionOptions) -> Result<Self, HarvestError> {
        let client = build_http_client(user_agent, options.request_timeout, true)?;
        tracing::debug!("Render session opened");
        Ok(Self {
            client,
            options,
            pages_rendered: 0,
        })
    }

    /// Number of pages rendered so far
    pub fn pages_rendered(&self) -> u32 {
        self.pages_rendered
    }

    async fn get(&self, url: &str) -> Result<RenderedPage, HarvestError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let html = response.text().await.map_err(|e| classify_error(url, e))?;

        Ok(RenderedPage {
            url: final_url,
            html,
            status,
            confirmation: Confirmation::NotRequired,
        })
    }

    async fn submit(&self, form: &ConfirmForm) -> Result<RenderedPage, HarvestError> {
        let request = match form.method {
            FormMethod::Get => self.client.get(&form.action).query(&form.fields),
            FormMethod::Post => self.client.post(&form.action).form(&form.fields),
        };

        let response = request
            .send()
            .await
            .map_err(|e| classify_error(&form.action, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .map_err(|e| classify_error(&form.action, e))?;

        Ok(RenderedPage {
            url: final_url,
            html,
            status,
            confirmation: Confirmation::Confirmed,
        })
    }

    async fn save_snapshot(&self, html: &str) {
        let Some(path) = &self.options.snapshot_path else {
            return;
        };

        match tokio::fs::write(path, html).await {
            Ok(()) => tracing::info!("Saved page snapshot to {}", path.display()),
            Err(e) => tracing::warn!("Could not save page snapshot to {}: {}", path.display(), e),
        }
    }
}

#[async_trait]
impl RenderSession for HttpSession {
    async fn render(&mut self, url: &str) -> Result<RenderedPage, HarvestError> {
        let page = self.get(url).await?;
        self.pages_rendered += 1;

        let page_url = Url::parse(&page.url)?;
        let Some(form) = find_confirm_form(&page.html, &page_url) else {
            return Ok(page);
        };

        tracing::debug!("Confirming interstitial dialog on {}", page.url);

        match tokio::time::timeout(self.options.confirm_timeout, self.submit(&form)).await {
            Ok(Ok(confirmed)) => Ok(confirmed),
            Ok(Err(e)) => {
                tracing::warn!("Confirming the dialog on {} failed: {}", page.url, e);
                self.save_snapshot(&page.html).await;
                Ok(RenderedPage {
                    confirmation: Confirmation::Failed,
                    ..page
                })
            }
            Err(_) => {
                tracing::warn!(
                    "Loading {} took longer than {:?} after confirmation",
                    page.url,
                    self.options.confirm_timeout
                );
                self.save_snapshot(&page.html).await;
                Ok(RenderedPage {
                    confirmation: Confirmation::TimedOut,
                    ..page
                })
            }
        }
    }

    async fn close(&mut self) -> Result<(), HarvestError> {
        tracing::debug!(
            "Render session closed after {} page(s)",
            self.pages_rendered
        );
        Ok(())
    }
}
