//! End-to-end pipeline tests against a local mock HTTP server

use async_trait::async_trait;
use kodegen_tools_metascrape::{
    DocumentFetcher, FetchError, HtmlFetcher, MetaScraper, RawDocument, ScrapeConfig,
};
use mockito::Server;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const ARTICLE: &str = r#"<!doctype html>
<html>
<head>
  <title>  Launch Day  </title>
  <meta property="og:title" content="Launch Day (OG)">
  <meta property="og:description" content="We shipped.">
  <meta property="og:image" content="https://cdn.test/hero.jpg">
  <meta name="twitter:card" content="summary_large_image">
  <meta name="author" content="Someone">
  <link rel="canonical" href="https://blog.test/launch">
  <script type="application/ld+json">{"@type": "BlogPosting", "headline": "Launch Day"}</script>
  <script type="application/ld+json">{oops</script>
  <script type="application/ld+json">{"@type": ["Product"], "name": "Widget", "offers": {"price": "9.99"}}</script>
</head>
<body>
  <img src="https://cdn.test/hero.jpg">
  <img src="data:image/gif;base64,R0lGODlhAQABAAAAACw=">
  <img data-lazy-src="https://cdn.test/lazy.jpg">
</body>
</html>"#;

/// Render fetcher stand-in that counts calls
struct FakeRender {
    result: Result<&'static str, &'static str>,
    calls: AtomicUsize,
}

#[async_trait]
impl HtmlFetcher for FakeRender {
    async fn fetch(&self, _url: &str) -> Result<RawDocument, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.result {
            Ok(html) => Ok(RawDocument {
                html: html.to_string(),
                rendered: true,
            }),
            Err(message) => Err(FetchError::Render(message.to_string())),
        }
    }
}

fn fake_render(result: Result<&'static str, &'static str>) -> Arc<FakeRender> {
    Arc::new(FakeRender {
        result,
        calls: AtomicUsize::new(0),
    })
}

fn config(fallback: bool) -> ScrapeConfig {
    ScrapeConfig {
        enable_render_fallback: fallback,
        fetch_timeout: Duration::from_secs(5),
        ..ScrapeConfig::default()
    }
}

fn scraper(config: ScrapeConfig, render: Arc<FakeRender>) -> MetaScraper {
    let document = Arc::new(DocumentFetcher::new(&config).unwrap());
    MetaScraper::with_fetchers(config, document, render)
}

#[tokio::test]
async fn static_fetch_produces_full_envelope() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/launch")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(ARTICLE)
        .expect(1)
        .create_async()
        .await;

    let render = fake_render(Ok("<title>unused</title>"));
    let url = format!("{}/launch", server.url());
    let outcome = scraper(config(true), render.clone()).scrape(&url).await;
    mock.assert_async().await;

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["url"], url.as_str());
    assert_eq!(json["title"], "Launch Day");
    assert_eq!(json["description"], "We shipped.");
    assert_eq!(json["canonical"], "https://blog.test/launch");
    assert_eq!(
        json["images"],
        serde_json::json!(["https://cdn.test/hero.jpg", "https://cdn.test/lazy.jpg"])
    );
    assert_eq!(json["og"]["twitter:card"], "summary_large_image");
    assert!(json["og"].get("author").is_none());
    assert_eq!(json["jsonLd"].as_array().unwrap().len(), 2);
    assert_eq!(json["product"]["name"], "Widget");
    assert_eq!(json["rendered"], false);
    assert!(json.get("error").is_none());
    assert_eq!(render.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn og_keys_are_lowercase_and_namespaced() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/")
        .with_status(200)
        .with_body(
            r#"<meta property="OG:TYPE" content="website">
               <meta name="TWITTER:SITE" content="@x">
               <meta name="viewport" content="width=device-width">"#,
        )
        .create_async()
        .await;

    let outcome = scraper(config(false), fake_render(Err("unused")))
        .scrape(&server.url())
        .await;
    let og = &outcome.result().unwrap().og;
    assert_eq!(og.len(), 2);
    for key in og.keys() {
        assert_eq!(key, &key.to_lowercase());
        assert!(key.starts_with("og:") || key.starts_with("twitter:") || key == "description");
    }
}

#[tokio::test]
async fn http_error_without_fallback_is_failure() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/gone")
        .with_status(410)
        .create_async()
        .await;

    let render = fake_render(Ok("<title>rendered</title>"));
    let url = format!("{}/gone", server.url());
    let outcome = scraper(config(false), render.clone()).scrape(&url).await;

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().unwrap().contains("410"));
    assert!(json.get("title").is_none());
    assert_eq!(render.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn blocked_static_fetch_falls_back_to_render() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/spa")
        .with_status(403)
        .create_async()
        .await;

    let render = fake_render(Ok(
        r#"<title>Hydrated</title><script type="application/ld+json">{"@type":"Product","name":"Widget"}</script>"#,
    ));
    let url = format!("{}/spa", server.url());
    let outcome = scraper(config(true), render.clone()).scrape(&url).await;

    let result = outcome.result().expect("render fallback should succeed");
    assert!(result.rendered);
    assert_eq!(result.title, "Hydrated");
    assert_eq!(result.canonical, url);
    assert_eq!(result.product.as_ref().unwrap()["name"], "Widget");
    assert_eq!(render.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn both_paths_failing_reports_static_error() {
    let render = fake_render(Err("chrome exploded"));
    // Nothing listens on the discard port
    let outcome = scraper(config(true), render.clone())
        .scrape("http://127.0.0.1:9/")
        .await;

    assert!(!outcome.is_success());
    let error = outcome.error().unwrap();
    assert!(error.contains("network failure"), "got: {error}");
    assert!(!error.contains("chrome exploded"));
    assert_eq!(render.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn images_are_capped_unique_and_clean() {
    let mut body = String::from(r#"<meta property="og:image" content="/a.png">"#);
    for src in ["/a.png", "", "data:image/png;base64,AA", "/b.png", "/b.png", "/c.png", "/d.png", "/e.png", "/f.png", "/g.png"] {
        body.push_str(&format!(r#"<img src="{src}">"#));
    }

    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/gallery")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let outcome = scraper(config(false), fake_render(Err("unused")))
        .scrape(&format!("{}/gallery", server.url()))
        .await;
    let images = &outcome.result().unwrap().images;

    assert!(images.len() <= 6);
    assert_eq!(images, &vec!["/a.png", "/b.png", "/c.png", "/d.png"]);
    assert!(images.iter().all(|i| !i.is_empty() && !i.starts_with("data:")));
}

#[tokio::test]
async fn envelope_always_has_exactly_one_shape() {
    let mut server = Server::new_async().await;
    let _ok = server
        .mock("GET", "/ok")
        .with_status(200)
        .with_body("<p>plain</p>")
        .create_async()
        .await;
    let _bad = server
        .mock("GET", "/bad")
        .with_status(500)
        .create_async()
        .await;

    let scraper = scraper(config(false), fake_render(Err("unused")));
    for path in ["/ok", "/bad"] {
        let outcome = scraper.scrape(&format!("{}{path}", server.url())).await;
        let json: Value = serde_json::to_value(&outcome).unwrap();
        let success = json["success"].as_bool().unwrap();
        assert_eq!(success, json.get("error").is_none());
        assert_eq!(success, json.get("title").is_some());
        assert_eq!(success, outcome.is_success());
    }
}
