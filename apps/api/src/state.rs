use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;

use crate::analysis::job_posting::JobPostingFetcher;
use crate::config::Config;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable text generator. Production: `LlmClient`.
    pub generator: Arc<dyn TextGenerator>,
    pub job_fetcher: JobPostingFetcher,
    pub s3: S3Client,
    pub config: Config,
}
