//! Résumé text extraction from uploaded PDF bytes.

use bytes::Bytes;
use tracing::{debug, warn};

use crate::analysis::non_empty_lines;
use crate::errors::AppError;

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Extracts the résumé's text as trimmed, non-empty lines.
///
/// Returns `Ok(None)` when the PDF is readable but yields no text (scanned images),
/// which the prompt treats the same as no résumé at all.
pub async fn extract_resume_text(pdf: Bytes) -> Result<Option<String>, AppError> {
    if !pdf.starts_with(PDF_MAGIC) {
        return Err(AppError::ResumeRead("the file is not a PDF".to_string()));
    }

    let size = pdf.len();
    // pdf-extract is CPU-bound and panics on some malformed inputs; both stay off the runtime.
    let extracted = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
        .await
        .map_err(|e| {
            warn!("PDF extraction task failed: {e}");
            AppError::ResumeRead("the PDF could not be parsed".to_string())
        })?
        .map_err(|e| AppError::ResumeRead(e.to_string()))?;

    let text = non_empty_lines(&extracted);
    debug!("Extracted {} chars of résumé text from {size} byte PDF", text.len());

    Ok((!text.is_empty()).then_some(text))
}
