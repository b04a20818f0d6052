//! Integration tests for the harvester
//!
//! These tests use wiremock to serve listing pages, hosting-site pages and
//! media files, and run the crawl and download passes end-to-end against a
//! temporary destination directory.

use listing_harvester::config::{Config, PolitenessEntry};
use listing_harvester::crawler::{
    build_http_client, Confirmation, HttpFetcher, HttpSession, PageCrawler, PolitenessPolicy,
    PostExtractor, RenderSession, SessionOptions, SNAPSHOT_FILENAME,
};
use listing_harvester::download::{DownloadOrchestrator, DownloadSummary, HttpTransfer};
use listing_harvester::media::{build_default_registry, FilenameDeriver, UnknownDomainPolicy};
use listing_harvester::storage::{DownloadStore, SqliteStorage};
use listing_harvester::HarvestError;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a configuration without politeness delays and a short confirm wait
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.default_delay_secs = 0;
    config.crawler.confirm_timeout_secs = 1;
    config.crawler.request_timeout_secs = 10;
    config.politeness = vec![PolitenessEntry {
        domain: "127.0.0.1".to_string(),
        delay_secs: 0,
    }];
    config
}

fn build_crawler(config: &Config) -> PageCrawler {
    let client = build_http_client(&config.user_agent, Duration::from_secs(5), false)
        .expect("Failed to build HTTP client");
    let filenames = FilenameDeriver::new(config.media.extensions.clone());
    let registry = build_default_registry(
        &config.media.hosting_domains,
        filenames.clone(),
        config.resolver.unknown_domain,
        Arc::new(HttpFetcher::new(client)),
    );
    PageCrawler::new(
        PostExtractor::new(Arc::new(registry), filenames),
        PolitenessPolicy::from_config(config),
    )
}

fn open_session(config: &Config, destination: &Path) -> HttpSession {
    HttpSession::open(
        &config.user_agent,
        SessionOptions::from_config(config, destination),
    )
    .expect("Failed to open session")
}

/// Runs a crawl and a download pass, as the binary does
async fn harvest(
    config: &Config,
    start_url: &str,
    destination: &Path,
    max_pages: u32,
) -> Result<DownloadSummary, HarvestError> {
    let mut storage = SqliteStorage::open_destination(destination)?;
    let records = build_crawler(config)
        .crawl(open_session(config, destination), start_url, max_pages)
        .await?;

    let client = build_http_client(&config.user_agent, Duration::from_secs(5), false)?;
    DownloadOrchestrator::new(HttpTransfer::new(client), destination.to_path_buf(), false)
        .run(&mut storage, records)
        .await
}

/// Markup of one post container
fn thing(id: &str, href: &str, label: &str, with_comments: bool) -> String {
    let comments = if with_comments {
        format!(r#"<li class="first"><a href="/r/pics/comments/{id}/">3 comments</a></li>"#)
    } else {
        String::new()
    };
    format!(
        r#"<div class="thing id-t3_{id} link">
            <div class="entry">
                <p class="title">
                    <a class="title" href="{href}">Post {id}</a>
                    <span class="domain">(<a href="/domain/{label}/">{label}</a>)</span>
                </p>
                <p class="tagline">submitted <time datetime="2017-03-01T12:00:00+00:00">x</time></p>
                <ul class="flat-list buttons">{comments}</ul>
            </div>
        </div>"#
    )
}

/// Markup of a listing page
fn listing(things: &[String], next: Option<&str>) -> String {
    let next = next
        .map(|href| format!(r#"<span class="next-button"><a href="{href}">next</a></span>"#))
        .unwrap_or_default();
    format!(
        r#"<html><body><div id="siteTable" class="sitetable linklisting">{}</div>
        <div class="nav-buttons">{}</div></body></html>"#,
        things.concat(),
        next
    )
}

async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_media(server: &MockServer, media_path: &str, body: &[u8], expected: u64) {
    Mock::given(method("GET"))
        .and(path(media_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .expect(expected)
        .mount(server)
        .await;
}

/// Mounts the two-page listing at /r/pics/
///
/// Page 1: a direct png, a story on an unknown domain and a gfycat clip.
/// Page 2: a self post, and no next-page link.
async fn mount_two_page_listing(server: &MockServer) {
    let base = server.uri();

    let page1 = listing(
        &[
            thing("a1", &format!("{base}/media/a1.png"), "i.redd.it", true),
            thing("b2", "https://example.org/story", "example.org", true),
            thing("c3", &format!("{base}/gfycat/SomeClip"), "gfycat.com", true),
        ],
        Some("/r/pics/page2"),
    );
    let page2 = listing(
        &[thing("d4", "/r/pics/comments/d4/self/", "self.pics", true)],
        None,
    );

    mount_page(server, "/r/pics/", page1).await;
    mount_page(server, "/r/pics/page2", page2).await;
    mount_page(
        server,
        "/gfycat/SomeClip",
        format!(r#"<html><body><video><source id="webmSource" src="{base}/media/SomeClip.webm"></video></body></html>"#),
    )
    .await;
}

#[tokio::test]
async fn test_two_page_crawl() {
    let server = MockServer::start().await;
    mount_two_page_listing(&server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config();
    let start = format!("{}/r/pics/", server.uri());

    let records = build_crawler(&config)
        .crawl(open_session(&config, dir.path()), &start, 0)
        .await
        .expect("Crawl failed");

    assert_eq!(records.len(), 4);

    let resolved: Vec<_> = records
        .iter()
        .filter_map(|r| r.media.filename.as_deref())
        .collect();
    assert_eq!(resolved, vec!["a1.png", "SomeClip.webm"]);

    let gfycat = &records[2];
    assert_eq!(gfycat.hosting_domain, "gfycat.com");
    assert_eq!(
        gfycat.media.resolved_url,
        Some(format!("{}/media/SomeClip.webm", server.uri()))
    );

    let self_post = &records[3];
    assert_eq!(
        self_post.source_url,
        format!("{}/r/pics/comments/d4/self/", server.uri())
    );
    assert_eq!(self_post.origin_page, format!("{}/r/pics/page2", server.uri()));
    assert!(!self_post.media.is_resolved());
}

#[tokio::test]
async fn test_max_pages_bound() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/r/pics/",
        listing(
            &[thing("a1", "https://i.redd.it/a1.png", "i.redd.it", true)],
            Some("/r/pics/page2"),
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/r/pics/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(&[], None)))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config();

    let records = build_crawler(&config)
        .crawl(
            open_session(&config, dir.path()),
            &format!("{}/r/pics/", server.uri()),
            1,
        )
        .await
        .expect("Crawl failed");

    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn test_malformed_container_is_dropped() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/r/pics/",
        listing(
            &[
                thing("a1", "https://i.redd.it/a1.png", "i.redd.it", true),
                thing("b2", "https://i.redd.it/b2.png", "i.redd.it", false),
                thing("c3", "https://i.redd.it/c3.png", "i.redd.it", true),
            ],
            None,
        ),
    )
    .await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config();

    let records = build_crawler(&config)
        .crawl(
            open_session(&config, dir.path()),
            &format!("{}/r/pics/", server.uri()),
            0,
        )
        .await
        .expect("Crawl failed");

    let urls: Vec<_> = records.iter().map(|r| r.source_url.as_str()).collect();
    assert_eq!(urls, vec!["https://i.redd.it/a1.png", "https://i.redd.it/c3.png"]);
}

#[tokio::test]
async fn test_harvest_downloads_and_rerun_skips() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_two_page_listing(&server).await;
    mount_media(&server, "/media/a1.png", b"png-bytes", 1).await;
    mount_media(&server, "/media/SomeClip.webm", b"webm-bytes", 1).await;
    mount_media(&server, "/media/e5.jpg", b"jpg-bytes", 1).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config();

    // First run: the whole two-page listing
    let first = harvest(&config, &format!("{base}/r/pics/"), dir.path(), 0)
        .await
        .expect("First harvest failed");

    assert_eq!(first.discovered, 4);
    assert_eq!(first.downloadable, 2);
    assert_eq!(first.downloaded, 2);
    assert_eq!(first.skipped_unresolved, 2);
    assert_eq!(std::fs::read(dir.path().join("a1.png")).unwrap(), b"png-bytes");
    assert_eq!(
        std::fs::read(dir.path().join("SomeClip.webm")).unwrap(),
        b"webm-bytes"
    );

    // Second run: a listing showing the old png again next to a new post
    mount_page(
        &server,
        "/r/new/",
        listing(
            &[
                thing("a1", &format!("{base}/media/a1.png"), "i.redd.it", true),
                thing("e5", &format!("{base}/media/e5.jpg"), "i.redd.it", true),
            ],
            None,
        ),
    )
    .await;

    let second = harvest(&config, &format!("{base}/r/new/"), dir.path(), 0)
        .await
        .expect("Second harvest failed");

    assert_eq!(second.already_downloaded, 1);
    assert_eq!(second.downloaded, 1);
    assert!(dir.path().join("e5.jpg").exists());

    let storage = SqliteStorage::open_destination(dir.path()).expect("Failed to reopen store");
    assert_eq!(storage.count_rows().unwrap(), 5);
    assert_eq!(storage.count_downloaded().unwrap(), 3);

    let row = storage
        .get_row_by_url(&format!("{base}/media/a1.png"))
        .unwrap()
        .expect("Row should exist");
    assert!(row.downloaded);
    assert_eq!(row.last_fetch_status, 200);
}

#[tokio::test]
async fn test_failed_transfer_is_recorded() {
    let server = MockServer::start().await;
    let base = server.uri();
    mount_page(
        &server,
        "/r/pics/",
        listing(
            &[
                thing("a1", &format!("{base}/media/gone.png"), "i.redd.it", true),
                thing("b2", &format!("{base}/media/b2.png"), "i.redd.it", true),
            ],
            None,
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/media/gone.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_media(&server, "/media/b2.png", b"png", 1).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let summary = harvest(&create_test_config(), &format!("{base}/r/pics/"), dir.path(), 0)
        .await
        .expect("Harvest failed");

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.downloaded, 1);
    assert!(!dir.path().join("gone.png").exists());

    let storage = SqliteStorage::open_destination(dir.path()).expect("Failed to reopen store");
    let row = storage
        .get_row_by_url(&format!("{base}/media/gone.png"))
        .unwrap()
        .expect("Row should exist");
    assert_eq!(row.last_fetch_status, 404);
    assert!(!row.downloaded);
}

#[tokio::test]
async fn test_unknown_domain_fail_policy_aborts() {
    let server = MockServer::start().await;
    mount_two_page_listing(&server).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let mut config = create_test_config();
    config.resolver.unknown_domain = UnknownDomainPolicy::Fail;

    let result = build_crawler(&config)
        .crawl(
            open_session(&config, dir.path()),
            &format!("{}/r/pics/", server.uri()),
            0,
        )
        .await;

    match result {
        Err(HarvestError::UnknownHostingDomain { url }) => {
            assert_eq!(url, "https://example.org/story");
        }
        other => panic!("Expected UnknownHostingDomain, got {:?}", other),
    }
}

/// The interstitial served to visitors without the confirmation cookie
fn over18_page() -> String {
    r#"<html><body>
        <form method="post" action="/over18" class="pretty-form">
            <input type="hidden" name="dest" value="/r/nsfw/">
            <button type="submit" name="over18" value="no">no thank you</button>
            <button type="submit" name="over18" value="yes">continue</button>
        </form>
    </body></html>"#
        .to_string()
}

#[tokio::test]
async fn test_interstitial_confirmation() {
    let server = MockServer::start().await;

    // Mounted first so that it wins over the interstitial once the cookie is set
    Mock::given(method("GET"))
        .and(path("/r/nsfw/"))
        .and(header("cookie", "over18=1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing(
            &[thing("a1", "https://i.redd.it/a1.png", "i.redd.it", true)],
            None,
        )))
        .mount(&server)
        .await;
    mount_page(&server, "/r/nsfw/", over18_page()).await;
    Mock::given(method("POST"))
        .and(path("/over18"))
        .respond_with(
            ResponseTemplate::new(303)
                .insert_header("set-cookie", "over18=1; Path=/")
                .insert_header("location", "/r/nsfw/"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config();
    let mut session = open_session(&config, dir.path());

    let page = session
        .render(&format!("{}/r/nsfw/", server.uri()))
        .await
        .expect("Render failed");

    assert_eq!(page.confirmation, Confirmation::Confirmed);
    assert_eq!(page.status, 200);
    assert!(page.html.contains("id-t3_a1"));

    // The cookie jar keeps the confirmation: no second dialog
    let again = session
        .render(&format!("{}/r/nsfw/", server.uri()))
        .await
        .expect("Render failed");
    assert_eq!(again.confirmation, Confirmation::NotRequired);

    session.close().await.expect("Close failed");
    assert!(!dir.path().join(SNAPSHOT_FILENAME).exists());
}

#[tokio::test]
async fn test_confirmation_timeout_saves_snapshot() {
    let server = MockServer::start().await;
    mount_page(&server, "/r/nsfw/", over18_page()).await;
    Mock::given(method("POST"))
        .and(path("/over18"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = create_test_config();
    let mut session = open_session(&config, dir.path());

    let page = session
        .render(&format!("{}/r/nsfw/", server.uri()))
        .await
        .expect("A confirmation timeout must not be an error");

    assert_eq!(page.confirmation, Confirmation::TimedOut);
    assert!(page.html.contains("pretty-form"));

    let snapshot = std::fs::read_to_string(dir.path().join(SNAPSHOT_FILENAME))
        .expect("Snapshot should be written");
    assert!(snapshot.contains("over18"));
}
