//! End-to-end crawls against mock servers

use crate::{html, test_config, urlset, xml};
use site_crawler::config::Config;
use site_crawler::crawler::{crawl_url, Coordinator, Fetcher};
use site_crawler::storage::{MemoryStorage, SqliteStorage, Storage};
use site_crawler::{CrawlOptions, FilterRules};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options(max_pages: usize) -> CrawlOptions {
    CrawlOptions {
        max_pages,
        parallel: 5,
        crawl_delay: Duration::ZERO,
        use_sitemaps: false,
        ..Default::default()
    }
}

fn coordinator<S: Storage>(config: &Config, storage: S, options: CrawlOptions) -> Coordinator<S> {
    Coordinator::new(
        Fetcher::new(config).unwrap(),
        Arc::new(Mutex::new(storage)),
        FilterRules::default(),
        options,
    )
}

async fn mount_page(server: &MockServer, at: &str, title: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(html(title, body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_page_budget_is_respected() {
    let server = MockServer::start().await;

    let links: String = (1..=20)
        .map(|i| format!(r#"<a href="/p{}">Page {}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", "Home", &links).await;
    for i in 1..=20 {
        mount_page(&server, &format!("/p{}", i), &format!("Page {}", i), "content").await;
    }

    let c = coordinator(&test_config(), MemoryStorage::new(), options(10));
    let pages = c.crawl_pages(&server.uri()).await.unwrap();

    assert_eq!(pages.len(), 10);
    assert_eq!(pages[0].url, format!("{}/", server.uri()));
    assert_eq!(pages[0].title.as_deref(), Some("Home"));
}

#[tokio::test]
async fn test_cached_page_fetched_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html("About", "<p>About us</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&test_config()).unwrap();
    let storage = Mutex::new(MemoryStorage::new());
    let url = format!("{}/about", server.uri());

    let first = crawl_url(&fetcher, &storage, &url).await.unwrap().unwrap();
    let second = crawl_url(&fetcher, &storage, &url).await.unwrap().unwrap();

    assert_eq!(first.title.as_deref(), Some("About"));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_failed_pages_do_not_stop_crawl() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        "Home",
        r#"<a href="/ok">ok</a><a href="/broken">broken</a><a href="/missing">missing</a>"#,
    )
    .await;
    mount_page(&server, "/ok", "Ok", "fine").await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let c = coordinator(&test_config(), MemoryStorage::new(), options(10));
    let pages = c.crawl_pages(&server.uri()).await.unwrap();

    let mut urls: Vec<String> = pages.iter().map(|p| p.url.clone()).collect();
    urls.sort();
    assert_eq!(
        urls,
        vec![
            format!("{}/", server.uri()),
            format!("{}/missing", server.uri()),
            format!("{}/ok", server.uri()),
        ]
    );

    let missing = pages.iter().find(|p| p.url.ends_with("/missing")).unwrap();
    assert_eq!(missing.status_code, Some(404));
    assert!(missing.error.is_none());

    let broken = c
        .storage()
        .lock()
        .unwrap()
        .get_cached_page(&format!("{}/broken", server.uri()))
        .unwrap()
        .unwrap();
    assert_eq!(broken.status_code, Some(500));
    assert!(broken.error.is_some());
}

#[tokio::test]
async fn test_not_found_page_keeps_html_and_links() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", r#"<a href="/gone">gone</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_raw(
            r#"<html><head><title>Not found</title></head><body><a href="/found">Try this</a></body></html>"#,
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/found"))
        .respond_with(html("Found", ""))
        .expect(1)
        .mount(&server)
        .await;

    let c = coordinator(&test_config(), MemoryStorage::new(), options(10));
    let pages = c.crawl_pages(&server.uri()).await.unwrap();

    let gone = pages.iter().find(|p| p.url.ends_with("/gone")).unwrap();
    assert_eq!(gone.status_code, Some(404));
    assert_eq!(gone.title.as_deref(), Some("Not found"));
    assert!(gone.html.is_some());
    assert!(pages.iter().any(|p| p.url.ends_with("/found")));
}

#[tokio::test]
async fn test_links_resolved_against_redirect_target() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", "Home", r#"<a href="/docs">docs</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/docs/"))
        .mount(&server)
        .await;
    mount_page(&server, "/docs/", "Docs", r#"<a href="intro">Intro</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/docs/intro"))
        .respond_with(html("Intro", ""))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/intro"))
        .respond_with(html("Wrong", ""))
        .expect(0)
        .mount(&server)
        .await;

    let c = coordinator(&test_config(), MemoryStorage::new(), options(10));
    let pages = c.crawl_pages(&base).await.unwrap();

    let mut urls: Vec<String> = pages.iter().map(|p| p.url.clone()).collect();
    urls.sort();
    assert_eq!(
        urls,
        vec![
            format!("{}/", base),
            format!("{}/docs", base),
            format!("{}/docs/intro", base),
        ]
    );
}

#[tokio::test]
async fn test_homepage_always_crawled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("Home", "welcome"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/deep/page", "Deep", "no links here").await;

    let c = coordinator(&test_config(), MemoryStorage::new(), options(10));
    let pages = c
        .crawl_pages(&format!("{}/deep/page/", server.uri()))
        .await
        .unwrap();

    assert_eq!(pages.len(), 2);
    // The first pull prioritizes the homepage
    assert_eq!(pages[0].url, format!("{}/", server.uri()));
}

#[tokio::test]
async fn test_links_are_filtered_and_scoped() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        "Home",
        r#"<a href="/blog/post">post</a>
           <a href="/wp-admin/edit">admin</a>
           <a href="/brochure.pdf">pdf</a>
           <a href="https://elsewhere.example.com/">external</a>
           <a href="mailto:hi@example.com">mail</a>"#,
    )
    .await;
    mount_page(&server, "/blog/post", "Post", "text").await;
    Mock::given(method("GET"))
        .and(path("/wp-admin/edit"))
        .respond_with(html("Admin", ""))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/brochure.pdf"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let c = coordinator(&test_config(), MemoryStorage::new(), options(10));
    let pages = c.crawl_pages(&server.uri()).await.unwrap();

    assert_eq!(pages.len(), 2);
}

#[tokio::test]
async fn test_unfiltered_crawl_keeps_scope_only() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        "Home",
        r#"<a href="/wp-admin/edit">admin</a><a href="https://elsewhere.example.com/">x</a>"#,
    )
    .await;
    mount_page(&server, "/wp-admin/edit", "Admin", "").await;

    let c = coordinator(
        &test_config(),
        MemoryStorage::new(),
        CrawlOptions {
            filter_urls: false,
            ..options(10)
        },
    );
    let pages = c.crawl_pages(&server.uri()).await.unwrap();

    assert_eq!(pages.len(), 2);
}

#[tokio::test]
async fn test_sitemap_urls_seed_the_queue() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", "Home", "no links").await;
    mount_page(&server, "/only-in-sitemap", "Hidden", "").await;
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(urlset(&[format!("{}/only-in-sitemap", base)])))
        .mount(&server)
        .await;

    let c = coordinator(
        &test_config(),
        MemoryStorage::new(),
        CrawlOptions {
            use_sitemaps: true,
            ..options(10)
        },
    );
    let pages = c.crawl_pages(&base).await.unwrap();

    assert!(pages
        .iter()
        .any(|p| p.url == format!("{}/only-in-sitemap", base)));
}

#[tokio::test]
async fn test_respects_robots_when_enabled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .mount(&server)
        .await;
    mount_page(
        &server,
        "/",
        "Home",
        r#"<a href="/public">public</a><a href="/private">private</a>"#,
    )
    .await;
    mount_page(&server, "/public", "Public", "").await;
    Mock::given(method("GET"))
        .and(path("/private"))
        .respond_with(html("Private", ""))
        .expect(0)
        .mount(&server)
        .await;

    let c = coordinator(
        &test_config(),
        MemoryStorage::new(),
        CrawlOptions {
            respect_robots: true,
            ..options(10)
        },
    )
    .with_robots_agent("TestBot");
    let pages = c.crawl_pages(&server.uri()).await.unwrap();

    assert_eq!(pages.len(), 2);
}

#[tokio::test]
async fn test_second_run_served_from_sqlite_cache() {
    let server = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("crawl.db");

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("Home", r#"<a href="/a">a</a>"#))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html("A", ""))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config();
    let first = coordinator(&config, SqliteStorage::new(&db_path).unwrap(), options(2))
        .crawl_pages(&server.uri())
        .await
        .unwrap();
    assert_eq!(first.len(), 2);

    // A fresh process reopening the database needs no network
    let c = coordinator(&config, SqliteStorage::new(&db_path).unwrap(), options(2));
    let second = c.crawl_pages(&server.uri()).await.unwrap();
    assert_eq!(second.len(), 2);

    let stats = c.storage().lock().unwrap().domain_stats("127.0.0.1").unwrap();
    assert_eq!(stats.cached_pages, 2);
    assert_eq!(stats.crawled, 2);
}
