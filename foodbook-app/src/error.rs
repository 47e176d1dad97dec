//! Error types for foodbook-app
//!
//! Four user-facing kinds: validation (caught before any request), network
//! and API failures, and suggestion failures. Storage errors from the common
//! crate pass through as `Store`.

use std::time::Duration;
use thiserror::Error;

/// Message used when the extraction service gives no reason
pub const GENERIC_EXTRACTION_FAILURE: &str = "Failed to extract recipe";

/// Message shown for any suggestion failure
pub const GENERIC_SUGGESTION_FAILURE: &str =
    "Could not generate suggestions. Check the suggestion service settings and try again.";

/// Import and suggestion errors
#[derive(Debug, Error)]
pub enum ImportError {
    /// Input rejected before any network call
    #[error("{0}")]
    Validation(String),

    /// Connection-level failure
    #[error("Network error: {0}")]
    Network(String),

    /// No response within the configured timeout
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Non-success HTTP status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Service answered but reported failure (`success` not true)
    #[error("{0}")]
    Rejected(String),

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Suggestion request or parse failure
    #[error("Could not generate suggestions: {0}")]
    Suggestion(String),

    /// Local storage failure
    #[error(transparent)]
    Store(#[from] foodbook_common::Error),
}

impl ImportError {
    /// Text suitable for a transient status message
    pub fn user_message(&self) -> String {
        match self {
            ImportError::Validation(msg) => msg.clone(),
            ImportError::Network(msg) => format!("Error: {}", msg),
            ImportError::Timeout(_) => {
                "The recipe service is taking too long to respond. Please try again.".to_string()
            }
            ImportError::Api { message, .. } => message.clone(),
            ImportError::Rejected(msg) => msg.clone(),
            ImportError::InvalidResponse(_) => GENERIC_EXTRACTION_FAILURE.to_string(),
            ImportError::Suggestion(_) => GENERIC_SUGGESTION_FAILURE.to_string(),
            ImportError::Store(e) => format!("Failed to save recipe: {}", e),
        }
    }

    /// Whether the failure happened before anything left the process
    pub fn is_validation(&self) -> bool {
        matches!(self, ImportError::Validation(_))
    }
}

/// Result type for import operations
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        assert_eq!(
            ImportError::Validation("Please enter a TikTok URL".into()).user_message(),
            "Please enter a TikTok URL"
        );
        assert_eq!(
            ImportError::Api { status: 500, message: "Video is private".into() }.user_message(),
            "Video is private"
        );
        assert_eq!(
            ImportError::InvalidResponse("no recipe".into()).user_message(),
            GENERIC_EXTRACTION_FAILURE
        );
        assert_eq!(
            ImportError::Suggestion("bad json".into()).user_message(),
            GENERIC_SUGGESTION_FAILURE
        );
        assert!(ImportError::Network("connection refused".into())
            .user_message()
            .contains("connection refused"));
    }

    #[test]
    fn test_timeout_display() {
        let err = ImportError::Timeout(Duration::from_secs(90));
        assert_eq!(err.to_string(), "Request timed out after 90s");
        assert!(!err.is_validation());
    }
}
