//! Intake validation — runs before any external call or database write.
//! A rejected upload leaves no side effects behind.

use thiserror::Error;

use crate::errors::AppError;

/// Upload size ceiling (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Document formats accepted at intake. The padding/OCR path is exercised
/// for PDF; legacy word-processor formats pass through to the OCR
/// collaborator unmodified.
const ALLOWED_EXTENSIONS: [&str; 3] = ["pdf", "docx", "doc"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Filename is missing")]
    MissingFilename,

    #[error("Unsupported file type '{extension}'. Allowed types: .pdf, .docx, .doc")]
    UnsupportedFormat { extension: String },

    #[error("File too large ({size} bytes). Maximum 10MB allowed")]
    TooLarge { size: usize },
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// An upload that passed intake checks.
#[derive(Debug, Clone)]
pub struct ValidatedUpload {
    pub filename: String,
    /// Lowercased extension without the leading dot.
    pub extension: String,
}

impl ValidatedUpload {
    pub fn is_pdf(&self) -> bool {
        self.extension == "pdf"
    }
}

/// Validates filename and declared size. Fail fast: the caller must not
/// have touched storage, the database, or any collaborator yet.
pub fn validate_upload(
    filename: Option<&str>,
    size: usize,
) -> Result<ValidatedUpload, ValidationError> {
    let filename = match filename {
        Some(name) if !name.trim().is_empty() => name.trim(),
        _ => return Err(ValidationError::MissingFilename),
    };

    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ValidationError::UnsupportedFormat { extension });
    }

    if size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge { size });
    }

    Ok(ValidatedUpload {
        filename: filename.to_string(),
        extension,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_allowed_extensions() {
        for name in ["cv.pdf", "cv.docx", "cv.doc", "CV.PDF"] {
            let validated = validate_upload(Some(name), 1024).unwrap();
            assert_eq!(validated.filename, name);
        }
    }

    #[test]
    fn test_extension_is_lowercased() {
        let validated = validate_upload(Some("Resume.Pdf"), 1024).unwrap();
        assert_eq!(validated.extension, "pdf");
        assert!(validated.is_pdf());
    }

    #[test]
    fn test_rejects_unsupported_extension() {
        let err = validate_upload(Some("cv.exe"), 1024).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedFormat {
                extension: "exe".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_double_extension_trick() {
        let err = validate_upload(Some("cv.pdf.exe"), 1024).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_rejects_no_extension() {
        let err = validate_upload(Some("resume"), 1024).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedFormat {
                extension: String::new()
            }
        );
    }

    #[test]
    fn test_rejects_missing_filename() {
        assert_eq!(
            validate_upload(None, 1024).unwrap_err(),
            ValidationError::MissingFilename
        );
        assert_eq!(
            validate_upload(Some("  "), 1024).unwrap_err(),
            ValidationError::MissingFilename
        );
    }

    #[test]
    fn test_size_ceiling_boundary() {
        assert!(validate_upload(Some("cv.pdf"), MAX_UPLOAD_BYTES).is_ok());
        assert_eq!(
            validate_upload(Some("cv.pdf"), MAX_UPLOAD_BYTES + 1).unwrap_err(),
            ValidationError::TooLarge {
                size: MAX_UPLOAD_BYTES + 1
            }
        );
    }

    #[test]
    fn test_validation_runs_extension_check_before_size() {
        // Both checks fail; the format error wins so the caller gets the
        // most actionable message first.
        let err = validate_upload(Some("cv.exe"), MAX_UPLOAD_BYTES + 1).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedFormat { .. }));
    }

    #[test]
    fn test_docx_is_not_pdf() {
        let validated = validate_upload(Some("cv.docx"), 1024).unwrap();
        assert!(!validated.is_pdf());
    }
}
