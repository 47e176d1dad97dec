//! Transient status messages
//!
//! Every outcome the user sees is one of these. Success and error messages
//! dismiss themselves after five seconds; a loading message stays until it is
//! replaced.

use std::fmt;
use std::time::Duration;

use crate::error::ImportError;

const AUTO_DISMISS: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
    pub dismiss_after: Option<Duration>,
}

impl StatusMessage {
    pub fn loading(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Loading,
            text: text.into(),
            dismiss_after: None,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
            dismiss_after: Some(AUTO_DISMISS),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
            dismiss_after: Some(AUTO_DISMISS),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == StatusKind::Error
    }
}

impl From<&ImportError> for StatusMessage {
    fn from(err: &ImportError) -> Self {
        StatusMessage::error(err.user_message())
    }
}

impl fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.kind {
            StatusKind::Loading => "...",
            StatusKind::Success => "ok",
            StatusKind::Error => "error",
        };
        write!(f, "[{}] {}", marker, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_never_dismisses() {
        let status = StatusMessage::loading("Extracting recipe...");
        assert_eq!(status.dismiss_after, None);
        assert!(!status.is_error());
    }

    #[test]
    fn test_outcomes_dismiss_after_five_seconds() {
        assert_eq!(StatusMessage::success("Saved").dismiss_after, Some(Duration::from_secs(5)));
        assert_eq!(StatusMessage::error("Nope").dismiss_after, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_from_import_error() {
        let err = ImportError::Rejected("Could not find a recipe in this video".into());
        let status = StatusMessage::from(&err);
        assert!(status.is_error());
        assert_eq!(status.text, "Could not find a recipe in this video");
        assert_eq!(status.to_string(), "[error] Could not find a recipe in this video");
    }
}
