use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecommendError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Worker pool error: {0}")]
    ThreadPoolError(#[from] rayon::ThreadPoolBuildError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Missing required column(s) in {} table: {}", .table, .columns.join(", "))]
    MissingRequiredColumn { table: String, columns: Vec<String> },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Processing,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl RecommendError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::CsvError(_) | Self::MissingRequiredColumn { .. } => ErrorCategory::Input,
            Self::ProcessingError { .. } | Self::SerializationError(_) => {
                ErrorCategory::Processing
            }
            Self::IoError(_) | Self::ZipError(_) | Self::ThreadPoolError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Processing => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::MissingRequiredColumn { table, .. } => format!(
                "Check the header row of the {} file or map the column names in the configuration",
                table
            ),
            Self::CsvError(_) => {
                "Make sure the input is a well-formed CSV/TSV file with a header row".to_string()
            }
            Self::IoError(_) => "Check that the file paths exist and are readable/writable".to_string(),
            Self::InvalidConfigValueError { field, .. }
            | Self::ConfigValidationError { field, .. }
            | Self::MissingConfigError { field } => {
                format!("Fix the '{}' setting and run again", field)
            }
            Self::ConfigError { .. } => "Review the configuration file syntax".to_string(),
            Self::ThreadPoolError(_) => "Lower the --threads setting".to_string(),
            Self::ZipError(_) | Self::SerializationError(_) | Self::ProcessingError { .. } => {
                "Re-run with --verbose for details".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::MissingRequiredColumn { table, columns } => format!(
                "The {} file is missing required column(s): {}",
                table,
                columns.join(", ")
            ),
            Self::IoError(e) => format!("File access failed: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RecommendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_message_lists_every_column() {
        let err = RecommendError::MissingRequiredColumn {
            table: "ODP".to_string(),
            columns: vec!["AVAI".to_string(), "USED".to_string()],
        };

        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert!(err.to_string().contains("AVAI, USED"));
        assert!(err.user_friendly_message().contains("ODP"));
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = RecommendError::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "odp.csv",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
