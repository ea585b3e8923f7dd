//! Form state and the single-flight analysis session.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use reqwest::Url;
use tracing::{debug, info};

use crate::client::ApiClient;
use crate::errors::ClientError;
use crate::stream::accumulate;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// A résumé picked from disk. Only PDFs are accepted.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ResumeFile {
    pub async fn load(path: &Path) -> Result<Self, ClientError> {
        let is_pdf_name = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if !is_pdf_name {
            return Err(ClientError::InvalidInput(format!(
                "{} is not a PDF; the résumé must be a .pdf file",
                path.display()
            )));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| ClientError::ReadFile {
                path: path.to_path_buf(),
                source,
            })?;
        if !bytes.starts_with(PDF_MAGIC) {
            return Err(ClientError::InvalidInput(format!(
                "{} does not look like a PDF file",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("resume.pdf")
            .to_string();
        Ok(Self { file_name, bytes })
    }
}

/// What the user submits: a posting URL and, optionally, a résumé.
#[derive(Debug, Clone)]
pub struct AnalysisForm {
    pub job_url: Url,
    pub resume: Option<ResumeFile>,
}

impl AnalysisForm {
    pub fn new(job_url: &str, resume: Option<ResumeFile>) -> Result<Self, ClientError> {
        let raw = job_url.trim();
        if raw.is_empty() {
            return Err(ClientError::InvalidInput(
                "A job posting URL is required".to_string(),
            ));
        }
        let job_url = Url::parse(raw)
            .map_err(|e| ClientError::InvalidInput(format!("Invalid job posting URL: {e}")))?;
        if !matches!(job_url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidInput(
                "The job posting URL must start with http:// or https://".to_string(),
            ));
        }
        Ok(Self { job_url, resume })
    }
}

/// Clears the loading flag on every exit path.
struct LoadingGuard<'a>(&'a AtomicBool);

impl<'a> LoadingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Accumulated output, loading flag and last error for one analysis view.
///
/// At most one request is in flight: a second `submit` while one is running
/// fails with `ClientError::Busy` and issues no request.
pub struct AnalysisSession {
    client: ApiClient,
    loading: AtomicBool,
    output: Mutex<String>,
    error: Mutex<Option<String>>,
}

impl AnalysisSession {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            loading: AtomicBool::new(false),
            output: Mutex::new(String::new()),
            error: Mutex::new(None),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn output(&self) -> String {
        lock(&self.output).clone()
    }

    pub fn error(&self) -> Option<String> {
        lock(&self.error).clone()
    }

    /// Sends the form and streams the answer, calling `on_chunk` with each decoded
    /// piece as it arrives. Returns the full Markdown on success.
    ///
    /// On failure the error message is recorded and returned; text already
    /// delivered stays in `output`.
    pub async fn submit<F>(&self, form: &AnalysisForm, mut on_chunk: F) -> Result<String, ClientError>
    where
        F: FnMut(&str),
    {
        let _loading = LoadingGuard::acquire(&self.loading).ok_or(ClientError::Busy)?;
        *lock(&self.error) = None;
        lock(&self.output).clear();

        info!(
            "Submitting {} (resume: {})",
            form.job_url,
            form.resume
                .as_ref()
                .map(|r| r.file_name.as_str())
                .unwrap_or("none")
        );

        let result = async {
            let body = self.client.analyze(form).await?;
            accumulate(body, |text| {
                lock(&self.output).push_str(text);
                on_chunk(text);
            })
            .await
        }
        .await;

        if let Err(e) = &result {
            debug!("Analysis failed: {e:?}");
            *lock(&self.error) = Some(e.to_string());
        }
        result
    }
}
