//! Job posting fetcher: downloads a posting page and reduces it to plain text lines.

use std::time::Duration;

use anyhow::Result;
use futures::StreamExt;
use reqwest::{Client, Url};
use tracing::debug;

use crate::analysis::non_empty_lines;
use crate::errors::AppError;

/// Some job boards reject unknown agents outright.
const USER_AGENT: &str = "Mozilla/5.0";
/// Upper bound on posting text forwarded to the model.
pub const MAX_JOB_CHARS: usize = 40_000;
/// Render width for html2text; wide enough that paragraphs are not re-wrapped.
const RENDER_WIDTH: usize = 1_000;
/// Bytes of posting HTML read before the rest of the body is dropped.
pub const MAX_HTML_BYTES: usize = 4 * 1024 * 1024;

/// Parses a user-supplied posting URL. Only http and https are fetched.
pub fn parse_job_url(raw: &str) -> Result<Url, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::Validation("job_url cannot be empty".to_string()));
    }
    let url = Url::parse(raw)
        .map_err(|e| AppError::Validation(format!("job_url is not a valid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::Validation(format!(
            "job_url must use http or https, got '{other}'"
        ))),
    }
}

/// Converts posting HTML to trimmed, non-empty text lines, capped at `MAX_JOB_CHARS`.
pub fn html_to_text(html: &str) -> String {
    let rendered = html2text::from_read(html.as_bytes(), RENDER_WIDTH);
    let text = non_empty_lines(&rendered);
    match text.char_indices().nth(MAX_JOB_CHARS) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text,
    }
}

#[derive(Clone)]
pub struct JobPostingFetcher {
    client: Client,
    max_html_bytes: usize,
}

impl JobPostingFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .user_agent(USER_AGENT)
                .timeout(timeout)
                .build()?,
            max_html_bytes: MAX_HTML_BYTES,
        })
    }

    pub fn with_max_html_bytes(mut self, limit: usize) -> Self {
        self.max_html_bytes = limit;
        self
    }

    /// Fetches the posting and returns its readable text.
    pub async fn fetch(&self, url: &Url) -> Result<String, AppError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::JobFetch(e.to_string()))?;

        let mut body = response.bytes_stream();
        let mut html: Vec<u8> = Vec::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| AppError::JobFetch(e.to_string()))?;
            let room = self.max_html_bytes - html.len();
            if chunk.len() >= room {
                html.extend_from_slice(&chunk[..room]);
                debug!("Job posting {url} truncated at {} bytes", self.max_html_bytes);
                break;
            }
            html.extend_from_slice(&chunk);
        }

        let html_len = html.len();
        let text = tokio::task::spawn_blocking(move || html_to_text(&String::from_utf8_lossy(&html)))
            .await
            .map_err(|e| AppError::Internal(e.into()))?;
        if text.is_empty() {
            return Err(AppError::JobFetch(
                "the page contained no readable text".to_string(),
            ));
        }

        debug!(
            "Fetched job posting {} ({} bytes html, {} chars text)",
            url,
            html_len,
            text.len()
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const POSTING_HTML: &str = r#"<!doctype html>
        <html><head><title>Careers</title></head>
        <body>
          <h1>Senior Rust Engineer</h1>

          <p>   Build low-latency trading systems.   </p>
          <ul><li>5+ years Rust</li><li>Linux internals</li></ul>
        </body></html>"#;

    #[test]
    fn test_parse_job_url_accepts_https() {
        let url = parse_job_url("  https://jobs.example.com/123?src=x ").unwrap();
        assert_eq!(url.host_str(), Some("jobs.example.com"));
    }

    #[test]
    fn test_parse_job_url_rejects_other_schemes() {
        assert!(matches!(
            parse_job_url("ftp://jobs.example.com/1"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            parse_job_url("file:///etc/passwd"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_job_url_rejects_garbage_and_empty() {
        assert!(matches!(parse_job_url("not a url"), Err(AppError::Validation(_))));
        assert!(matches!(parse_job_url("   "), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_html_to_text_keeps_content_drops_markup() {
        let text = html_to_text(POSTING_HTML);
        assert!(text.contains("Senior Rust Engineer"));
        assert!(text.contains("Build low-latency trading systems."));
        assert!(text.contains("5+ years Rust"));
        assert!(!text.contains("<h1>"));
        assert!(text.lines().all(|l| !l.trim().is_empty() && l == l.trim()));
    }

    #[test]
    fn test_html_to_text_is_capped() {
        let html = format!("<p>{}</p>", "é".repeat(MAX_JOB_CHARS + 500));
        let text = html_to_text(&html);
        assert_eq!(text.chars().count(), MAX_JOB_CHARS);
    }

    #[tokio::test]
    async fn test_fetch_sends_browser_agent_and_returns_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/careers/42"))
            .and(header("user-agent", USER_AGENT))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html; charset=utf-8")
                    .set_body_string(POSTING_HTML),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = JobPostingFetcher::new(Duration::from_secs(5)).unwrap();
        let url = parse_job_url(&format!("{}/careers/42", server.uri())).unwrap();
        let text = fetcher.fetch(&url).await.unwrap();
        assert!(text.contains("Senior Rust Engineer"));
        assert!(text.contains("Linux internals"));
    }

    #[tokio::test]
    async fn test_fetch_stops_reading_at_html_limit() {
        let server = MockServer::start().await;
        let html = format!(
            "<html><body><h1>Platform Engineer</h1><p>{}</p><p>trailing-section</p></body></html>",
            "requirement ".repeat(8 * 1024)
        );
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&server)
            .await;

        let fetcher = JobPostingFetcher::new(Duration::from_secs(5))
            .unwrap()
            .with_max_html_bytes(16 * 1024);
        let url = parse_job_url(&server.uri()).unwrap();
        let text = fetcher.fetch(&url).await.unwrap();
        assert!(text.contains("Platform Engineer"));
        assert!(!text.contains("trailing-section"));
    }

    #[tokio::test]
    async fn test_fetch_maps_http_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = JobPostingFetcher::new(Duration::from_secs(5)).unwrap();
        let url = parse_job_url(&format!("{}/gone", server.uri())).unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, AppError::JobFetch(ref msg) if msg.contains("404")));
    }

    #[tokio::test]
    async fn test_fetch_rejects_empty_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>  </body></html>"))
            .mount(&server)
            .await;

        let fetcher = JobPostingFetcher::new(Duration::from_secs(5)).unwrap();
        let url = parse_job_url(&server.uri()).unwrap();
        assert!(matches!(
            fetcher.fetch(&url).await,
            Err(AppError::JobFetch(_))
        ));
    }
}
