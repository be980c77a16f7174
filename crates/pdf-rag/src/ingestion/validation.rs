//! Upload validation

use crate::config::UploadConfig;
use crate::error::{Error, Result};

/// An uploaded file as read from the multipart body
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original filename
    pub file_name: String,
    /// Declared content type
    pub content_type: Option<String>,
    /// File bytes
    pub data: bytes::Bytes,
}

impl UploadedFile {
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Check presence, content type and size of an upload
pub fn validate_pdf_upload(file: Option<&UploadedFile>, config: &UploadConfig) -> Result<()> {
    let file = file.ok_or_else(|| Error::validation("No file uploaded."))?;

    let mime = file
        .content_type
        .as_deref()
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim().to_ascii_lowercase());
    let allowed = mime
        .as_deref()
        .is_some_and(|m| config.allowed_mime_types.iter().any(|a| a.eq_ignore_ascii_case(m)));
    if !allowed {
        return Err(Error::validation(
            "Invalid file type. Only PDF files are allowed.",
        ));
    }

    if file.size() > config.max_file_size {
        return Err(Error::validation(size_exceeded_message(config)));
    }

    Ok(())
}

/// Rejection message for uploads above `max_file_size`
pub fn size_exceeded_message(config: &UploadConfig) -> String {
    format!(
        "File size exceeds the maximum allowed size of {}.",
        describe_size(config.max_file_size)
    )
}

/// Whole megabytes when exact, otherwise kilobytes rounded up
fn describe_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB && bytes % MB == 0 {
        format!("{}MB", bytes / MB)
    } else if bytes >= KB {
        format!("{}KB", bytes.div_ceil(KB))
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: Option<&str>, size: usize) -> UploadedFile {
        UploadedFile {
            file_name: "report.pdf".to_string(),
            content_type: content_type.map(str::to_string),
            data: bytes::Bytes::from(vec![0u8; size]),
        }
    }

    #[test]
    fn test_missing_file() {
        let err = validate_pdf_upload(None, &UploadConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "No file uploaded.");
    }

    #[test]
    fn test_content_type() {
        let config = UploadConfig::default();
        assert!(validate_pdf_upload(Some(&upload(Some("application/pdf"), 10)), &config).is_ok());
        assert!(validate_pdf_upload(
            Some(&upload(Some("Application/PDF; charset=binary"), 10)),
            &config
        )
        .is_ok());

        let err = validate_pdf_upload(Some(&upload(Some("image/png"), 10)), &config).unwrap_err();
        assert_eq!(err.to_string(), "Invalid file type. Only PDF files are allowed.");
        assert!(validate_pdf_upload(Some(&upload(None, 10)), &config).is_err());
    }

    #[test]
    fn test_size_limit() {
        let config = UploadConfig {
            max_file_size: 2 * 1024 * 1024,
            ..UploadConfig::default()
        };
        assert!(validate_pdf_upload(Some(&upload(Some("application/pdf"), 2 * 1024 * 1024)), &config).is_ok());

        let err = validate_pdf_upload(
            Some(&upload(Some("application/pdf"), 2 * 1024 * 1024 + 1)),
            &config,
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "File size exceeds the maximum allowed size of 2MB."
        );
    }

    #[test]
    fn test_small_limits_are_not_rounded_to_zero() {
        let config = UploadConfig {
            max_file_size: 1024,
            ..UploadConfig::default()
        };
        let err = validate_pdf_upload(Some(&upload(Some("application/pdf"), 2048)), &config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "File size exceeds the maximum allowed size of 1KB."
        );

        assert_eq!(describe_size(1536 * 1024), "1536KB");
        assert_eq!(describe_size(1500), "2KB");
        assert_eq!(describe_size(500), "500 bytes");
        assert_eq!(describe_size(50 * 1024 * 1024), "50MB");
    }
}
