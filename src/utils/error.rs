use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Failed to load order data from '{origin}': {message}")]
    DataLoad { origin: String, message: String },

    #[error("Invalid order data at line {line}, column '{column}' (value '{value}'): {reason}")]
    DataValidation {
        line: u64,
        column: String,
        value: String,
        reason: String,
    },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration field '{field}' is invalid: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field '{field}'")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Validation,
    Configuration,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Bad input or configuration; fixable by the user.
    High,
    /// Could not write results.
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(self) -> i32 {
        match self {
            Self::High => 1,
            Self::Critical => 3,
        }
    }
}

impl DashboardError {
    pub fn data_load(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataLoad {
            origin: origin.into(),
            message: message.into(),
        }
    }

    pub fn data_validation(
        line: u64,
        column: &str,
        value: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::DataValidation {
            line,
            column: column.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DataLoad { .. } | Self::CsvError(_) => ErrorCategory::Input,
            Self::DataValidation { .. } => ErrorCategory::Validation,
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::ZipError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Validation | ErrorCategory::Configuration => {
                ErrorSeverity::High
            }
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::DataLoad { .. } | Self::CsvError(_) => {
                "Check that the orders file exists, is readable CSV and has all required columns"
            }
            Self::DataValidation { .. } => {
                "Fix the reported row in the orders export and run again"
            }
            Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => {
                "Review the configuration file or command-line flags"
            }
            Self::ZipError(_) | Self::IoError(_) | Self::SerializationError(_) => {
                "Check that the output directory is writable and has free space"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::DataLoad { origin, message } => {
                format!("Could not read orders from '{}': {}", origin, message)
            }
            Self::DataValidation {
                line,
                column,
                value,
                reason,
            } => format!(
                "Row on line {} has a bad '{}' value ('{}'): {}",
                line, column, value, reason
            ),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message_names_line_and_column() {
        let err = DashboardError::data_validation(3, "purchase-hour", "25", "hour out of range");
        let msg = err.to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("purchase-hour"));
        assert!(msg.contains("25"));
        assert_eq!(err.category(), ErrorCategory::Validation);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = DashboardError::from(std::io::Error::other("disk full"));
        assert_eq!(err.category(), ErrorCategory::Output);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert_eq!(err.severity().exit_code(), 3);
    }

    #[test]
    fn test_input_and_config_errors_exit_with_one() {
        let errors = [
            DashboardError::data_load("orders.csv", "No such file"),
            DashboardError::data_validation(2, "sku", "", "sku is required"),
            DashboardError::MissingConfigError {
                field: "output.formats".to_string(),
            },
            DashboardError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: "expected `=`".to_string(),
            },
        ];
        for err in errors {
            assert_eq!(err.severity(), ErrorSeverity::High, "{}", err);
            assert_eq!(err.severity().exit_code(), 1);
        }
    }
}
