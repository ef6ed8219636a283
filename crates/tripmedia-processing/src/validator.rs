use tripmedia_core::AppError;

/// Upload rejections raised before any side effect
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: usize, max: usize },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Empty file")]
    EmptyFile,
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            _ => AppError::InvalidInput(err.to_string()),
        }
    }
}

/// Size and filename checks for uploads.
///
/// Any kind of file is accepted; unsupported kinds are stored as `unknown`.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size: usize,
}

impl UploadValidator {
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    pub fn validate_file_size(&self, size: usize) -> Result<(), ValidationError> {
        if size == 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    pub fn validate_filename(&self, filename: &str) -> Result<(), ValidationError> {
        let trimmed = filename.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::InvalidFilename(
                "filename is required".to_string(),
            ));
        }
        if trimmed.len() > 255 || trimmed.contains('\0') {
            return Err(ValidationError::InvalidFilename(filename.to_string()));
        }
        Ok(())
    }

    pub fn validate(&self, filename: &str, size: usize) -> Result<(), ValidationError> {
        self.validate_filename(filename)?;
        self.validate_file_size(size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_file_size() {
        let validator = UploadValidator::new(1024);
        assert!(validator.validate_file_size(1).is_ok());
        assert!(validator.validate_file_size(1024).is_ok());
        assert_eq!(
            validator.validate_file_size(0),
            Err(ValidationError::EmptyFile)
        );
        assert!(matches!(
            validator.validate_file_size(1025),
            Err(ValidationError::FileTooLarge { size: 1025, max: 1024 })
        ));
    }

    #[test]
    fn test_validate_filename() {
        let validator = UploadValidator::new(1024);
        assert!(validator.validate_filename("beach.jpg").is_ok());
        assert!(validator.validate_filename("   ").is_err());
        assert!(validator.validate_filename(&"a".repeat(300)).is_err());
    }

    #[test]
    fn test_maps_to_app_error() {
        let too_large: AppError = ValidationError::FileTooLarge { size: 2, max: 1 }.into();
        assert!(matches!(too_large, AppError::PayloadTooLarge(_)));
        let empty: AppError = ValidationError::EmptyFile.into();
        assert!(matches!(empty, AppError::InvalidInput(_)));
    }
}
