// Résumé object storage: presigned direct uploads and listing.
// File bytes never pass through this service; clients PUT straight to S3.

use chrono::NaiveDate;
use uuid::Uuid;

pub mod handlers;

/// Every résumé object lives under this prefix.
pub const RESUME_PREFIX: &str = "resumes/";
const MAX_FILE_NAME_CHARS: usize = 128;

/// Reduces a client-supplied file name to a safe object-key segment.
///
/// Directory components are dropped, anything outside `[A-Za-z0-9._-]` becomes `_`,
/// and leading dots are stripped. Returns `None` if nothing usable remains.
pub fn sanitize_file_name(raw: &str) -> Option<String> {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw).trim();

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned: String = cleaned
        .trim_start_matches('.')
        .chars()
        .take(MAX_FILE_NAME_CHARS)
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        None
    } else {
        Some(cleaned)
    }
}

/// `resumes/YYYY/MM/DD/<uuid>-<file name>`
pub fn resume_key(file_name: &str, id: Uuid, date: NaiveDate) -> String {
    format!(
        "{RESUME_PREFIX}{}/{id}-{file_name}",
        date.format("%Y/%m/%d")
    )
}

/// Recovers the uploaded file name from a key built by `resume_key`.
pub fn display_name(key: &str) -> String {
    let last = key.rsplit('/').next().unwrap_or(key);
    match (last.get(..36), last.get(36..)) {
        (Some(id), Some(rest)) if Uuid::parse_str(id).is_ok() && rest.starts_with('-') => {
            rest[1..].to_string()
        }
        _ => last.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_plain_names() {
        assert_eq!(sanitize_file_name("resume-2026_v2.pdf").as_deref(), Some("resume-2026_v2.pdf"));
    }

    #[test]
    fn test_sanitize_strips_directories_and_odd_chars() {
        assert_eq!(
            sanitize_file_name("../../etc/Jane Doe (final).pdf").as_deref(),
            Some("Jane_Doe__final_.pdf")
        );
        assert_eq!(
            sanitize_file_name(r"C:\Users\jane\cv.pdf").as_deref(),
            Some("cv.pdf")
        );
    }

    #[test]
    fn test_sanitize_rejects_empty_and_dot_names() {
        assert_eq!(sanitize_file_name(""), None);
        assert_eq!(sanitize_file_name("   "), None);
        assert_eq!(sanitize_file_name(".."), None);
        assert_eq!(sanitize_file_name("uploads/"), None);
        assert_eq!(sanitize_file_name("???"), None);
    }

    #[test]
    fn test_sanitize_caps_length() {
        let long = format!("{}.pdf", "a".repeat(300));
        assert_eq!(sanitize_file_name(&long).unwrap().len(), MAX_FILE_NAME_CHARS);
    }

    #[test]
    fn test_resume_key_layout() {
        let id = Uuid::parse_str("6f1c2b9e-3d4a-4e5f-8a7b-1c2d3e4f5a6b").unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        assert_eq!(
            resume_key("cv.pdf", id, date),
            "resumes/2026/10/16/6f1c2b9e-3d4a-4e5f-8a7b-1c2d3e4f5a6b-cv.pdf"
        );
    }

    #[test]
    fn test_display_name_strips_uuid_prefix() {
        assert_eq!(
            display_name("resumes/2026/10/16/6f1c2b9e-3d4a-4e5f-8a7b-1c2d3e4f5a6b-cv.pdf"),
            "cv.pdf"
        );
        assert_eq!(display_name("resumes/legacy/my-cv.pdf"), "my-cv.pdf");
    }
}
