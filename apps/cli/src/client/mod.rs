//! HTTP client for the tailoring service and presigned storage uploads.

use bytes::Bytes;
use futures::Stream;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use tracing::debug;

use crate::errors::ClientError;
use crate::session::AnalysisForm;

pub mod types;
pub mod upload;

use types::{ErrorBody, PresignResponse, ResumeListResponse, StoredResume};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url.trim()).map_err(|e| {
            ClientError::InvalidInput(format!("Invalid service URL '{base_url}': {e}"))
        })?;
        // Url::join replaces the last path segment unless the base ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http: Client::builder().build()?,
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::InvalidInput(format!("Invalid endpoint '{path}': {e}")))
    }

    /// POST /analyze/ and return the raw body stream of the Markdown answer.
    pub async fn analyze(
        &self,
        form: &AnalysisForm,
    ) -> Result<impl Stream<Item = reqwest::Result<Bytes>>, ClientError> {
        let mut multipart = Form::new().text("job_url", form.job_url.to_string());
        if let Some(resume) = &form.resume {
            let part = Part::bytes(resume.bytes.clone())
                .file_name(resume.file_name.clone())
                .mime_str(PDF_CONTENT_TYPE)?;
            multipart = multipart.part("resume", part);
        }

        let url = self.endpoint("analyze/")?;
        debug!("POST {url}");
        let response = self.http.post(url).multipart(multipart).send().await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes_stream())
    }

    /// GET /s3/presign?filename=&content_type=
    pub async fn presign(
        &self,
        file_name: &str,
        content_type: &str,
    ) -> Result<PresignResponse, ClientError> {
        let url = self.endpoint("s3/presign")?;
        let response = self
            .http
            .get(url)
            .query(&[("filename", file_name), ("content_type", content_type)])
            .send()
            .await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    /// PUT the raw bytes to a presigned URL. The content type must match the one
    /// the URL was signed for.
    pub async fn put_presigned(
        &self,
        presign: &PresignResponse,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), ClientError> {
        let response = self
            .http
            .put(&presign.url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Upload {
                status: status.as_u16(),
                message: storage_error_message(&body)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string()),
            });
        }
        Ok(())
    }

    /// GET /s3/resumes
    pub async fn list_resumes(&self) -> Result<Vec<StoredResume>, ClientError> {
        let url = self.endpoint("s3/resumes")?;
        let response = self.http.get(url).send().await?;
        let list: ResumeListResponse = ensure_success(response).await?.json().await?;
        Ok(list.resumes)
    }
}

/// Turns a non-2xx service response into `ClientError::Server`, preferring the
/// message from the JSON error envelope.
async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.error.message)
        .ok()
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());

    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}

/// Pulls `<Message>` out of an S3 XML error document.
fn storage_error_message(body: &str) -> Option<String> {
    let start = body.find("<Message>")? + "<Message>".len();
    let end = body[start..].find("</Message>")? + start;
    Some(body[start..end].trim().to_string()).filter(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = ApiClient::new("http://localhost:8000/api").unwrap();
        assert_eq!(
            client.endpoint("analyze/").unwrap().as_str(),
            "http://localhost:8000/api/analyze/"
        );
        let client = ApiClient::new("http://localhost:8000").unwrap();
        assert_eq!(
            client.endpoint("s3/presign").unwrap().as_str(),
            "http://localhost:8000/s3/presign"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ApiClient::new("localhost without scheme"),
            Err(ClientError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_storage_error_message() {
        let xml = "<?xml version=\"1.0\"?><Error><Code>SignatureDoesNotMatch</Code>\
                   <Message>The request signature we calculated does not match</Message></Error>";
        assert_eq!(
            storage_error_message(xml).as_deref(),
            Some("The request signature we calculated does not match")
        );
        assert_eq!(storage_error_message("plain text"), None);
    }

    #[tokio::test]
    async fn test_presign_sends_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s3/presign"))
            .and(query_param("filename", "cv.pdf"))
            .and(query_param("content_type", "application/pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "url": "http://minio:9000/resumes-bucket/resumes/x-cv.pdf?X-Amz-Signature=abc",
                "key": "resumes/x-cv.pdf",
                "bucket": "resumes-bucket"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let presign = client.presign("cv.pdf", PDF_CONTENT_TYPE).await.unwrap();
        assert_eq!(presign.key, "resumes/x-cv.pdf");
        assert_eq!(presign.bucket, "resumes-bucket");
    }

    #[tokio::test]
    async fn test_server_error_envelope_becomes_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s3/presign"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"code": "VALIDATION_ERROR", "message": "filename is required"}
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let err = client.presign("", PDF_CONTENT_TYPE).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "The service returned 400: filename is required"
        );
    }

    #[tokio::test]
    async fn test_non_json_error_body_is_used_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway from proxy\n"))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let err = client.list_resumes().await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Server { status: 502, ref message } if message == "Bad Gateway from proxy"
        ));
    }

    #[tokio::test]
    async fn test_list_resumes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s3/resumes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "resumes": [{
                    "key": "resumes/2026/10/16/6f1c2b9e-3d4a-4e5f-8a7b-1c2d3e4f5a6b-cv.pdf",
                    "file_name": "cv.pdf",
                    "size_bytes": 250880,
                    "last_modified": "2026-10-16T12:30:00Z"
                }]
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let resumes = client.list_resumes().await.unwrap();
        assert_eq!(resumes.len(), 1);
        assert_eq!(resumes[0].file_name, "cv.pdf");
        assert_eq!(resumes[0].size_bytes, 250880);
    }
}
