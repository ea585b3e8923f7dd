//! Direct-to-storage upload: presign through the service, then PUT the bytes.

use std::path::Path;

use tracing::info;

use crate::client::types::PresignResponse;
use crate::client::{ApiClient, PDF_CONTENT_TYPE};
use crate::errors::ClientError;

/// Content type from the file extension; storage only needs it to match the signature.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => PDF_CONTENT_TYPE,
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        "md" => "text/markdown",
        _ => "application/octet-stream",
    }
}

/// Uploads `path` to object storage and returns where it landed.
pub async fn upload_file(
    client: &ApiClient,
    path: &Path,
    content_type: Option<&str>,
) -> Result<PresignResponse, ClientError> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            ClientError::InvalidInput(format!("{} has no usable file name", path.display()))
        })?
        .to_string();
    let content_type = content_type.unwrap_or_else(|| content_type_for(path));

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| ClientError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

    let presign = client.presign(&file_name, content_type).await?;
    let size = bytes.len();
    client.put_presigned(&presign, content_type, bytes).await?;

    info!(
        "Uploaded {} ({size} bytes) to s3://{}/{}",
        path.display(),
        presign.bucket,
        presign.key
    );
    Ok(presign)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use wiremock::matchers::{body_bytes, header, method, path as url_path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn write_temp(name: &str, bytes: &[u8]) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tailor-upload-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join(name);
        std::fs::write(&file, bytes).unwrap();
        file
    }

    async fn mount_presign(server: &MockServer, file_name: &str, content_type: &str) {
        Mock::given(method("GET"))
            .and(url_path("/s3/presign"))
            .and(query_param("filename", file_name))
            .and(query_param("content_type", content_type))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "url": format!("{}/bucket/resumes/k-{file_name}?X-Amz-Signature=sig", server.uri()),
                "key": format!("resumes/k-{file_name}"),
                "bucket": "bucket"
            })))
            .expect(1)
            .mount(server)
            .await;
    }

    #[test]
    fn test_content_type_for_extension() {
        assert_eq!(content_type_for(Path::new("cv.PDF")), "application/pdf");
        assert_eq!(content_type_for(Path::new("notes.txt")), "text/plain");
        assert_eq!(content_type_for(Path::new("archive")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_upload_presigns_then_puts_raw_bytes() {
        let server = MockServer::start().await;
        mount_presign(&server, "cv-upload.pdf", "application/pdf").await;
        Mock::given(method("PUT"))
            .and(url_path("/bucket/resumes/k-cv-upload.pdf"))
            .and(query_param("X-Amz-Signature", "sig"))
            .and(header("content-type", "application/pdf"))
            .and(body_bytes(b"%PDF-1.4 resume".to_vec()))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let file = write_temp("cv-upload.pdf", b"%PDF-1.4 resume");
        let client = ApiClient::new(&server.uri()).unwrap();
        let presign = upload_file(&client, &file, None).await.unwrap();
        assert_eq!(presign.key, "resumes/k-cv-upload.pdf");
    }

    #[tokio::test]
    async fn test_rejected_put_surfaces_storage_message() {
        let server = MockServer::start().await;
        mount_presign(&server, "cv-denied.pdf", "application/pdf").await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_string(
                "<Error><Code>AccessDenied</Code><Message>Request has expired</Message></Error>",
            ))
            .mount(&server)
            .await;

        let file = write_temp("cv-denied.pdf", b"%PDF-1.4");
        let client = ApiClient::new(&server.uri()).unwrap();
        let err = upload_file(&client, &file, None).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Upload to storage failed (403): Request has expired"
        );
    }

    #[tokio::test]
    async fn test_missing_file_fails_before_any_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri()).unwrap();
        let err = upload_file(&client, Path::new("/nonexistent/cv.pdf"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ReadFile { .. }));
    }
}
