//! Axum route handlers for the Storage API.

use std::time::Duration;

use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::{DateTime, DateTimeFormat};
use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::storage::{display_name, resume_key, sanitize_file_name, RESUME_PREFIX};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Both fields are optional at the extractor level so that a missing one
/// produces our JSON validation error rather than a plain-text rejection.
#[derive(Debug, Deserialize)]
pub struct PresignQuery {
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PresignResponse {
    pub url: String,
    pub key: String,
    pub bucket: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoredResume {
    pub key: String,
    pub file_name: String,
    pub size_bytes: i64,
    /// RFC 3339
    pub last_modified: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<StoredResume>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /s3/presign?filename=&content_type=
///
/// Issues a presigned PUT for a new résumé object. The signature binds the
/// content type, so the client must send the same `Content-Type` header.
pub async fn handle_presign(
    State(state): State<AppState>,
    Query(query): Query<PresignQuery>,
) -> Result<Json<PresignResponse>, AppError> {
    let raw_name = query
        .filename
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| AppError::Validation("filename is required".to_string()))?;
    let content_type = query
        .content_type
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Validation("content_type is required".to_string()))?;

    let file_name = sanitize_file_name(&raw_name).ok_or_else(|| {
        AppError::Validation(format!("filename '{raw_name}' has no usable characters"))
    })?;

    let bucket = state.config.s3_bucket.clone();
    let key = resume_key(&file_name, Uuid::new_v4(), Utc::now().date_naive());

    let presigning = PresigningConfig::expires_in(Duration::from_secs(state.config.presign_ttl_secs))
        .map_err(|e| AppError::Internal(e.into()))?;

    let request = state
        .s3
        .put_object()
        .bucket(&bucket)
        .key(&key)
        .content_type(&content_type)
        .presigned(presigning)
        .await
        .map_err(|e| AppError::S3(DisplayErrorContext(&e).to_string()))?;

    info!("Presigned upload for s3://{bucket}/{key} ({content_type})");

    Ok(Json(PresignResponse {
        url: request.uri().to_string(),
        key,
        bucket,
    }))
}

/// GET /s3/resumes
///
/// Lists stored résumés, newest first.
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<ResumeListResponse>, AppError> {
    let bucket = &state.config.s3_bucket;
    let mut resumes = Vec::new();
    let mut continuation: Option<String> = None;

    loop {
        let page = state
            .s3
            .list_objects_v2()
            .bucket(bucket)
            .prefix(RESUME_PREFIX)
            .set_continuation_token(continuation.take())
            .send()
            .await
            .map_err(|e| AppError::S3(DisplayErrorContext(&e).to_string()))?;

        resumes.extend(page.contents().iter().filter_map(|object| {
            let key = object.key()?;
            let modified = object.last_modified().copied();
            Some((
                modified,
                StoredResume {
                    key: key.to_string(),
                    file_name: display_name(key),
                    size_bytes: object.size().unwrap_or_default(),
                    last_modified: modified.and_then(|t| t.fmt(DateTimeFormat::DateTime).ok()),
                },
            ))
        }));

        match page.next_continuation_token() {
            Some(token) if page.is_truncated().unwrap_or(false) => {
                continuation = Some(token.to_string());
            }
            _ => break,
        }
    }

    Ok(Json(ResumeListResponse {
        resumes: newest_first(resumes),
    }))
}

/// Orders on the storage timestamp itself; formatted strings drop or keep
/// fractional seconds and do not sort chronologically.
fn newest_first(mut listed: Vec<(Option<DateTime>, StoredResume)>) -> Vec<StoredResume> {
    listed.sort_by_key(|(modified, _)| {
        std::cmp::Reverse(modified.map(|t| (t.secs(), t.subsec_nanos())))
    });
    listed.into_iter().map(|(_, resume)| resume).collect()
}
