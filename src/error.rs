//! Error types for readaloud.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReadaloudError {
    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Input errors (fatal, before the pipeline starts)
    #[error("Input error: {message}")]
    Input { message: String },

    #[error("Input text is empty after normalization; nothing to narrate")]
    EmptyInput,

    // Synthesis errors
    #[error("Synthesis failed: {message}")]
    Synthesis { message: String },

    #[error("All {attempted} units failed to synthesize")]
    EmptyResult { attempted: usize },

    // Assembly errors
    #[error("Failed to decode audio segment: {message}")]
    AudioDecode { message: String },

    #[error("No audio segment could be assembled")]
    EmptyAssembly,

    // Export errors
    #[error("Failed to export audio: {message}")]
    Export { message: String },

    #[error("Interrupted")]
    Cancelled,

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

impl ReadaloudError {
    /// Shorthand for [`ReadaloudError::ConfigInvalidValue`].
    pub fn invalid_value(key: &str, message: impl Into<String>) -> Self {
        Self::ConfigInvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ReadaloudError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_config_invalid_value_display() {
        let error = ReadaloudError::invalid_value("audio.tempo", "must be positive");
        assert_eq!(
            error.to_string(),
            "Invalid configuration value for audio.tempo: must be positive"
        );
    }

    #[test]
    fn test_input_display() {
        let error = ReadaloudError::Input {
            message: "file not found: notes.md".to_string(),
        };
        assert_eq!(error.to_string(), "Input error: file not found: notes.md");
    }

    #[test]
    fn test_empty_result_reports_attempt_count() {
        let error = ReadaloudError::EmptyResult { attempted: 3 };
        assert_eq!(error.to_string(), "All 3 units failed to synthesize");
    }

    #[test]
    fn test_synthesis_display() {
        let error = ReadaloudError::Synthesis {
            message: "HTTP 429".to_string(),
        };
        assert_eq!(error.to_string(), "Synthesis failed: HTTP 429");
    }

    #[test]
    fn test_audio_decode_display() {
        let error = ReadaloudError::AudioDecode {
            message: "unsupported container".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to decode audio segment: unsupported container"
        );
    }

    #[test]
    fn test_export_display() {
        let error = ReadaloudError::Export {
            message: "disk full".to_string(),
        };
        assert_eq!(error.to_string(), "Failed to export audio: disk full");
    }

    #[test]
    fn test_from_io_error() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let error: ReadaloudError = io_error.into();
        assert!(error.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_error = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let error: ReadaloudError = toml_error.into();
        assert!(error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_source_chain_io() {
        let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let error: ReadaloudError = io_error.into();

        let error_trait: &dyn std::error::Error = &error;
        assert!(error_trait.source().is_some());
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<ReadaloudError>();
        assert_sync::<ReadaloudError>();
    }
}
