//! Sitemap discovery against mock servers

use crate::{sitemap_index, test_config, urlset, xml};
use site_crawler::crawler::Fetcher;
use site_crawler::{discover_urls_from_sitemaps, DiscoveryOptions, FilterRules};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_xml(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(xml(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_index_with_two_urlsets() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_xml(
        &server,
        "/sitemap.xml",
        sitemap_index(&[format!("{}/sitemap-a.xml", base), format!("{}/sitemap-b.xml", base)]),
    )
    .await;
    mount_xml(
        &server,
        "/sitemap-a.xml",
        urlset(&[
            format!("{}/a1", base),
            format!("{}/a2", base),
            format!("{}/a3", base),
        ]),
    )
    .await;
    mount_xml(
        &server,
        "/sitemap-b.xml",
        urlset(&[
            format!("{}/b1", base),
            format!("{}/b2", base),
            format!("{}/", base),
        ]),
    )
    .await;

    let fetcher = Fetcher::new(&test_config()).unwrap();
    let urls = discover_urls_from_sitemaps(
        &fetcher,
        &base,
        &DiscoveryOptions::default(),
        &FilterRules::default(),
    )
    .await;

    assert_eq!(urls.len(), 6);
    assert_eq!(urls[0].url, format!("{}/", base));
    assert!(urls.iter().all(|u| u.source.as_str() == "sitemap"));
}

#[tokio::test]
async fn test_robots_sitemap_and_filtering() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("User-agent: *\nSitemap: {}/custom-map.xml\n", base)),
        )
        .mount(&server)
        .await;
    mount_xml(
        &server,
        "/custom-map.xml",
        urlset(&[
            format!("{}/about", base),
            format!("{}/wp-admin/settings", base),
            format!("{}/files/report.pdf", base),
            "https://other.example.com/page".to_string(),
            format!("{}/about?b=2&a=1#team", base),
            format!("{}/pricing/", base),
        ]),
    )
    .await;

    let fetcher = Fetcher::new(&test_config()).unwrap();
    let urls = discover_urls_from_sitemaps(
        &fetcher,
        &base,
        &DiscoveryOptions::default(),
        &FilterRules::default(),
    )
    .await;

    let found: Vec<&str> = urls.iter().map(|u| u.url.as_str()).collect();
    assert_eq!(
        found,
        vec![format!("{}/about", base), format!("{}/pricing", base)]
    );
}

#[tokio::test]
async fn test_depth_limit_stops_nested_indexes() {
    let server = MockServer::start().await;
    let base = server.uri();

    // Level 1 -> level 2 -> level 3 (a urlset and another index) -> 4 -> 5
    mount_xml(&server, "/sitemap.xml", sitemap_index(&[format!("{}/level2.xml", base)])).await;
    mount_xml(
        &server,
        "/level2.xml",
        sitemap_index(&[
            format!("{}/level3-pages.xml", base),
            format!("{}/level3.xml", base),
        ]),
    )
    .await;
    mount_xml(&server, "/level3-pages.xml", urlset(&[format!("{}/level3-page", base)])).await;
    mount_xml(&server, "/level3.xml", sitemap_index(&[format!("{}/level4.xml", base)])).await;

    Mock::given(method("GET"))
        .and(path("/level4.xml"))
        .respond_with(xml(sitemap_index(&[format!("{}/level5.xml", base)])))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/level5.xml"))
        .respond_with(xml(urlset(&[format!("{}/level5-page", base)])))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&test_config()).unwrap();
    let options = DiscoveryOptions {
        max_depth: 3,
        ..Default::default()
    };
    let urls = discover_urls_from_sitemaps(&fetcher, &base, &options, &FilterRules::default()).await;

    let found: Vec<&str> = urls.iter().map(|u| u.url.as_str()).collect();
    assert_eq!(found, vec![format!("{}/level3-page", base)]);
}

#[tokio::test]
async fn test_failing_sitemap_does_not_stop_others() {
    let server = MockServer::start().await;
    let base = server.uri();

    let robots: String = (1..=5)
        .map(|i| format!("Sitemap: {}/part{}.xml\n", base, i))
        .collect();
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(robots))
        .mount(&server)
        .await;

    for i in [1, 2, 4, 5] {
        mount_xml(
            &server,
            &format!("/part{}.xml", i),
            urlset(&[format!("{}/page-{}", base, i)]),
        )
        .await;
    }
    Mock::given(method("GET"))
        .and(path("/part3.xml"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&test_config()).unwrap();
    let urls = discover_urls_from_sitemaps(
        &fetcher,
        &base,
        &DiscoveryOptions::default(),
        &FilterRules::default(),
    )
    .await;

    let mut found: Vec<String> = urls.into_iter().map(|u| u.url).collect();
    found.sort();
    assert_eq!(
        found,
        vec![
            format!("{}/page-1", base),
            format!("{}/page-2", base),
            format!("{}/page-4", base),
            format!("{}/page-5", base),
        ]
    );
}

#[tokio::test]
async fn test_no_sitemaps_yields_nothing() {
    let server = MockServer::start().await;

    let fetcher = Fetcher::new(&test_config()).unwrap();
    let urls = discover_urls_from_sitemaps(
        &fetcher,
        &server.uri(),
        &DiscoveryOptions::default(),
        &FilterRules::default(),
    )
    .await;

    assert!(urls.is_empty());
}

#[tokio::test]
async fn test_sitemaps_per_level_capped_at_twenty() {
    let server = MockServer::start().await;
    let base = server.uri();

    let children: Vec<String> = (1..=25).map(|i| format!("{}/child-{}.xml", base, i)).collect();
    mount_xml(&server, "/sitemap.xml", sitemap_index(&children)).await;
    for i in 1..=25 {
        Mock::given(method("GET"))
            .and(path(format!("/child-{}.xml", i)))
            .respond_with(xml(urlset(&[format!("{}/page-{}", base, i)])))
            .expect(if i <= 20 { 1 } else { 0 })
            .mount(&server)
            .await;
    }

    let fetcher = Fetcher::new(&test_config()).unwrap();
    let urls = discover_urls_from_sitemaps(
        &fetcher,
        &base,
        &DiscoveryOptions::default(),
        &FilterRules::default(),
    )
    .await;

    assert_eq!(urls.len(), 20);
}

#[tokio::test]
async fn test_urlset_entries_capped_at_one_thousand() {
    let server = MockServer::start().await;
    let base = server.uri();

    let entries: Vec<String> = (1..=1005).map(|i| format!("{}/item-{}", base, i)).collect();
    mount_xml(&server, "/sitemap.xml", urlset(&entries)).await;

    let fetcher = Fetcher::new(&test_config()).unwrap();
    let options = DiscoveryOptions {
        max_urls: 5000,
        ..Default::default()
    };
    let urls = discover_urls_from_sitemaps(&fetcher, &base, &options, &FilterRules::default()).await;

    assert_eq!(urls.len(), 1000);
    assert!(!urls.iter().any(|u| u.url == format!("{}/item-1001", base)));
}

#[tokio::test]
async fn test_candidates_truncated_to_max_sitemaps() {
    let server = MockServer::start().await;
    let base = server.uri();

    let robots: String = (1..=3)
        .map(|i| format!("Sitemap: {}/listed-{}.xml\n", base, i))
        .collect();
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(robots))
        .mount(&server)
        .await;
    for i in 1..=3 {
        Mock::given(method("GET"))
            .and(path(format!("/listed-{}.xml", i)))
            .respond_with(xml(urlset(&[format!("{}/listed-page-{}", base, i)])))
            .expect(if i <= 2 { 1 } else { 0 })
            .mount(&server)
            .await;
    }
    // Well-known locations come after the robots.txt entries
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(urlset(&[format!("{}/well-known", base)])))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&test_config()).unwrap();
    let options = DiscoveryOptions {
        max_sitemaps: 2,
        ..Default::default()
    };
    let urls = discover_urls_from_sitemaps(&fetcher, &base, &options, &FilterRules::default()).await;

    let mut found: Vec<String> = urls.into_iter().map(|u| u.url).collect();
    found.sort();
    assert_eq!(
        found,
        vec![format!("{}/listed-page-1", base), format!("{}/listed-page-2", base)]
    );
}

#[tokio::test]
async fn test_max_urls_applied_before_sorting() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_xml(
        &server,
        "/sitemap.xml",
        format!(
            r#"<urlset>
                <url><loc>{base}/low</loc><priority>0.1</priority></url>
                <url><loc>{base}/mid</loc><priority>0.2</priority></url>
                <url><loc>{base}/</loc><priority>1.0</priority></url>
            </urlset>"#,
            base = base
        ),
    )
    .await;

    let fetcher = Fetcher::new(&test_config()).unwrap();
    let options = DiscoveryOptions {
        max_urls: 2,
        ..Default::default()
    };
    let urls = discover_urls_from_sitemaps(&fetcher, &base, &options, &FilterRules::default()).await;

    // The homepage is cut by the cap even though it would sort first
    let found: Vec<&str> = urls.iter().map(|u| u.url.as_str()).collect();
    assert_eq!(found, vec![format!("{}/mid", base), format!("{}/low", base)]);
}

#[tokio::test]
async fn test_index_cycles_fetched_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(xml(sitemap_index(&[
            format!("{}/sitemap.xml", base),
            format!("{}/child.xml", base),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/child.xml"))
        .respond_with(xml(sitemap_index(&[
            format!("{}/sitemap.xml", base),
            format!("{}/child.xml", base),
            format!("{}/pages.xml", base),
        ])))
        .expect(1)
        .mount(&server)
        .await;
    mount_xml(&server, "/pages.xml", urlset(&[format!("{}/leaf", base)])).await;

    let fetcher = Fetcher::new(&test_config()).unwrap();
    let options = DiscoveryOptions {
        max_depth: 5,
        ..Default::default()
    };
    let urls = discover_urls_from_sitemaps(&fetcher, &base, &options, &FilterRules::default()).await;

    let found: Vec<&str> = urls.iter().map(|u| u.url.as_str()).collect();
    assert_eq!(found, vec![format!("{}/leaf", base)]);
}
