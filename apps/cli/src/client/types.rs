use serde::Deserialize;

/// `GET /s3/presign` response.
#[derive(Debug, Clone, Deserialize)]
pub struct PresignResponse {
    pub url: String,
    pub key: String,
    pub bucket: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoredResume {
    pub key: String,
    pub file_name: String,
    pub size_bytes: i64,
    pub last_modified: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<StoredResume>,
}

/// `{ "error": { "code", "message" } }`
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[allow(dead_code)]
    pub code: String,
    pub message: String,
}
