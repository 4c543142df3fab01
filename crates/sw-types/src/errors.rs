use thiserror::Error;

/// Main error type for the Stockwatch system
#[derive(Error, Debug)]
pub enum SwError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Formatting error: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Data-related errors. All of these are fatal for a run: they are raised
/// before any record reaches the classifier.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Data source not found: {0}")]
    SourceNotFound(String),

    #[error("Source {source_name} is missing required columns: {}", .columns.join(", "))]
    MissingColumns {
        source_name: String,
        columns: Vec<String>,
    },

    #[error("Source {source_name} has unexpected columns: {}", .columns.join(", "))]
    UnexpectedColumns {
        source_name: String,
        columns: Vec<String>,
    },

    #[error("Source {source_name} maps column '{column}' more than once")]
    DuplicateColumn { source_name: String, column: String },

    #[error("Data loading failed: {message}")]
    LoadingFailed { message: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid sales window: {message}")]
    InvalidWindow { message: String },

    #[error("No data sources configured")]
    NoSources,

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Stockwatch operations
pub type SwResult<T> = Result<T, SwError>;

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::SwError::Config($crate::ConfigError::Other(format!($($arg)*)))
    };
}

/// Macro for creating loading errors
#[macro_export]
macro_rules! data_error {
    ($($arg:tt)*) => {
        $crate::SwError::Data($crate::DataError::LoadingFailed { message: format!($($arg)*) })
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_display() {
        let error = DataError::MissingColumns {
            source_name: "purchase 1.csv".to_string(),
            columns: vec!["Stock".to_string(), "Cost".to_string()],
        };

        let msg = error.to_string();
        assert!(msg.contains("purchase 1.csv"));
        assert!(msg.contains("Stock, Cost"));
    }

    #[test]
    fn test_error_conversion() {
        let data_error = DataError::SourceNotFound("missing.csv".to_string());
        let sw_error: SwError = data_error.into();

        match sw_error {
            SwError::Data(DataError::SourceNotFound(_)) => (),
            _ => panic!("Expected Data error"),
        }
    }

    #[test]
    fn test_macros() {
        let config_err = config_error!("Missing required field: {}", "sources");
        assert!(config_err.to_string().contains("sources"));

        let data_err = data_error!("bad row {}", 3);
        assert!(matches!(data_err, SwError::Data(DataError::LoadingFailed { .. })));
    }
}
