//! Axum route handlers for the Analysis API.

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use futures::TryStreamExt;
use reqwest::Url;
use tracing::{debug, error, info};

use crate::analysis::job_posting::parse_job_url;
use crate::analysis::prompts::build_analysis_prompt;
use crate::analysis::resume::extract_resume_text;
use crate::errors::AppError;
use crate::llm_client::prompts::MARKDOWN_ADVISOR_SYSTEM;
use crate::state::AppState;

pub const STREAM_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

/// The résumé part of the form, when one was actually attached.
#[derive(Debug)]
pub struct UploadedResume {
    pub file_name: String,
    pub bytes: Bytes,
}

#[derive(Debug)]
pub struct AnalysisForm {
    pub job_url: Url,
    pub resume: Option<UploadedResume>,
}

/// Keeps the body-limit rejection distinct from malformed input.
fn form_error(part: &str, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Could not read {part}: {e}"))
    }
}

/// Reads `job_url` and the optional `resume` file out of the multipart body.
/// A file part with no file name or no bytes is treated as "no résumé".
async fn read_form(mut multipart: Multipart) -> Result<AnalysisForm, AppError> {
    let mut job_url: Option<String> = None;
    let mut resume: Option<UploadedResume> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| form_error("form data", e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "job_url" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| form_error("job_url", e))?;
                job_url = Some(value);
            }
            "resume" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| form_error("resume", e))?;
                if !file_name.is_empty() && !bytes.is_empty() {
                    resume = Some(UploadedResume { file_name, bytes });
                }
            }
            other => debug!("Ignoring unexpected form field '{other}'"),
        }
    }

    let job_url = job_url.ok_or_else(|| AppError::Validation("job_url is required".to_string()))?;

    Ok(AnalysisForm {
        job_url: parse_job_url(&job_url)?,
        resume,
    })
}

/// POST /analyze/
///
/// Fetches the posting, extracts the résumé, and streams the model's Markdown
/// back as an unframed UTF-8 body. Failures before the first byte are JSON errors;
/// a failure mid-answer aborts the body.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let form = read_form(multipart).await?;
    info!(
        "Analysis requested for {} (resume: {})",
        form.job_url,
        form.resume
            .as_ref()
            .map(|r| r.file_name.as_str())
            .unwrap_or("none")
    );

    let job_content = state.job_fetcher.fetch(&form.job_url).await?;

    let resume_text = match form.resume {
        Some(resume) => extract_resume_text(resume.bytes).await?,
        None => None,
    };

    let prompt = build_analysis_prompt(&job_content, resume_text.as_deref());
    let text = state
        .generator
        .stream_text(&prompt, MARKDOWN_ADVISOR_SYSTEM)
        .await?;

    let body = Body::from_stream(text.inspect_err(|e| error!("Analysis stream aborted: {e}")));

    Ok((
        [
            (header::CONTENT_TYPE, STREAM_CONTENT_TYPE),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response())
}
