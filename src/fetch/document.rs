//! Static HTML fetch over plain HTTP

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::{HtmlFetcher, RawDocument};
use crate::ScrapeConfig;
use crate::utils::FetchError;

/// Single GET with a fixed timeout and spoofed identity headers
///
/// Any non-2xx status is an error. Redirects follow reqwest's default policy.
#[derive(Clone)]
pub struct DocumentFetcher {
    client: Client,
    timeout: Duration,
}

impl DocumentFetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value("User-Agent", &config.user_agent)?);
        headers.insert(
            ACCEPT_LANGUAGE,
            header_value("Accept-Language", &config.accept_language)?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.fetch_timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            timeout: config.fetch_timeout,
        })
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
                message: err.to_string(),
            }
        } else if err.is_builder() {
            // reqwest defers URL parsing to send time and reports it as a builder error
            FetchError::InvalidUrl {
                url: url.to_string(),
                message: std::error::Error::source(&err)
                    .map_or_else(|| err.to_string(), ToString::to_string),
            }
        } else {
            FetchError::from(err)
        }
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, FetchError> {
    HeaderValue::from_str(value)
        .map_err(|e| FetchError::Client(format!("invalid {name} header: {e}")))
}

#[async_trait]
impl HtmlFetcher for DocumentFetcher {
    async fn fetch(&self, url: &str) -> Result<RawDocument, FetchError> {
        let t0 = Instant::now();
        debug!(url, timeout_ms = self.timeout.as_millis() as u64, "document.fetch.start");

        let result = async {
            let response = self
                .client
                .get(url)
                .send()
                .await?
                .error_for_status()?;
            let html = response.text().await?;
            Ok::<_, reqwest::Error>(html)
        }
        .await;

        match result {
            Ok(html) => {
                debug!(
                    url,
                    bytes = html.len(),
                    duration_ms = t0.elapsed().as_millis() as u64,
                    "document.fetch.ok"
                );
                Ok(RawDocument {
                    html,
                    rendered: false,
                })
            }
            Err(e) => {
                let err = self.classify(url, e);
                warn!(url, error = %err, "document.fetch.failed");
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn config() -> ScrapeConfig {
        ScrapeConfig {
            user_agent: "TestBot/1.0".to_string(),
            fetch_timeout: Duration::from_secs(5),
            ..ScrapeConfig::default()
        }
    }

    #[tokio::test]
    async fn returns_body_and_sends_identity_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/page")
            .match_header("user-agent", "TestBot/1.0")
            .match_header("accept-language", Matcher::Regex("en-US".to_string()))
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<title>Hi</title>")
            .expect(1)
            .create_async()
            .await;

        let fetcher = DocumentFetcher::new(&config()).unwrap();
        let doc = fetcher
            .fetch(&format!("{}/page", server.url()))
            .await
            .unwrap();

        assert_eq!(doc.html, "<title>Hi</title>");
        assert!(!doc.rendered);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_body("nope")
            .expect(1)
            .create_async()
            .await;

        let fetcher = DocumentFetcher::new(&config()).unwrap();
        let err = fetcher
            .fetch(&format!("{}/missing", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert!(err.to_string().contains("404"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn does_not_retry_server_errors() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/flaky")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let fetcher = DocumentFetcher::new(&config()).unwrap();
        assert!(fetcher.fetch(&format!("{}/flaky", server.url())).await.is_err());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn connection_refused_is_network_failure() {
        // Port 9 (discard) on loopback is not listening in test environments
        let fetcher = DocumentFetcher::new(&config()).unwrap();
        let err = fetcher.fetch("http://127.0.0.1:9/").await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
        assert!(err.to_string().starts_with("network failure"));
    }

    #[tokio::test]
    async fn malformed_url_is_reported_as_invalid_url() {
        let fetcher = DocumentFetcher::new(&config()).unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();

        assert!(matches!(err, FetchError::InvalidUrl { ref url, .. } if url == "not a url"));
        let text = err.to_string();
        assert!(text.starts_with("invalid request URL not a url"), "got: {text}");
        assert!(!text.contains("HTTP client"));
    }

    #[tokio::test]
    async fn silent_server_hits_fetch_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept connections and hold them open without ever answering
        let server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = ScrapeConfig {
            fetch_timeout: Duration::from_millis(300),
            ..config()
        };
        let fetcher = DocumentFetcher::new(&config).unwrap();
        let started = Instant::now();
        let err = fetcher
            .fetch(&format!("http://{addr}/slow"))
            .await
            .unwrap_err();
        server.abort();

        assert!(
            matches!(err, FetchError::Timeout { timeout_ms: 300, .. }),
            "got: {err:?}"
        );
        assert!(err.to_string().starts_with("request timed out after 300ms"));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn rejects_unencodable_user_agent() {
        let config = ScrapeConfig {
            user_agent: "bad\nagent".to_string(),
            ..ScrapeConfig::default()
        };
        assert!(matches!(
            DocumentFetcher::new(&config),
            Err(FetchError::Client(_))
        ));
    }
}
