//! Error types for braindb operations.
//!
//! This module provides the error hierarchy shared by every component, with
//! structured error codes and suggestions for resolution. Precondition
//! failures inside a review session or the graph linker have their own small
//! enums ([`ReviewError`], [`LinkError`]) that convert into [`BrainError`].

use thiserror::Error;

/// Result type alias for braindb operations.
pub type BrainResult<T> = Result<T, BrainError>;

/// Main error type for all braindb operations.
#[derive(Error, Debug)]
pub enum BrainError {
    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        suggestion: Option<String>,
    },

    /// Record not found.
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        code: ErrorCode,
        record_id: Option<String>,
    },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Review session rejected an edit.
    #[error("Review error: {0}")]
    Review(#[from] ReviewError),

    /// Graph linker rejected a link.
    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Rejected review-session edits. The session is unchanged when one of these
/// is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("no active review session")]
    Inactive,

    #[error("invalid chunk position {position} (session has {len} chunks)")]
    InvalidPosition { position: usize, len: usize },

    #[error("chunk text cannot be empty")]
    EmptyText,

    #[error("unknown idea type '{0}'")]
    UnknownType(String),

    #[error("invalid split point {offset} for text of length {len}")]
    InvalidSplitPoint { offset: usize, len: usize },

    #[error("split would create an empty chunk")]
    EmptySplit,

    #[error("need at least 2 selected chunks to merge, have {selected}")]
    InsufficientSelection { selected: usize },

    #[error("no ideas to save")]
    NothingToSave,

    #[error("ideas already saved, retry the commit to finish")]
    CommitPending,
}

/// Rejected link operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("invalid link type '{0}'")]
    InvalidType(String),

    #[error("cannot link idea '{0}' to itself")]
    SelfLink(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValEmptyInput,
    ValTooLong,
    ValInvalidType,

    // Ideas (IDEA_xxx)
    IdeaNotFound,

    // Review (REV_xxx)
    ReviewRejected,

    // Graph (GRP_xxx)
    GrpInvalidLink,

    // Database (DB_xxx)
    DbConnectionFailed,
    DbOperationFailed,

    // Parse (PARSE_xxx)
    ParseInvalidJson,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValEmptyInput => "VAL_002",
            ErrorCode::ValTooLong => "VAL_003",
            ErrorCode::ValInvalidType => "VAL_004",
            ErrorCode::IdeaNotFound => "IDEA_001",
            ErrorCode::ReviewRejected => "REV_001",
            ErrorCode::GrpInvalidLink => "GRP_001",
            ErrorCode::DbConnectionFailed => "DB_001",
            ErrorCode::DbOperationFailed => "DB_002",
            ErrorCode::ParseInvalidJson => "PARSE_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl BrainError {
    /// Create a validation error with a specific code and suggestion.
    pub fn validation_with_suggestion(
        message: impl Into<String>,
        code: ErrorCode,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            code,
            suggestion: Some(suggestion.into()),
        }
    }

    /// Create a not found error for an idea.
    pub fn idea_not_found(idea_id: impl Into<String>) -> Self {
        let id = idea_id.into();
        Self::NotFound {
            message: format!("Idea with id '{}' not found", id),
            code: ErrorCode::IdeaNotFound,
            record_id: Some(id),
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: None,
        }
    }

    /// Create a database connection error.
    pub fn database_connection(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            code: ErrorCode::DbConnectionFailed,
            source: None,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::NotFound { code, .. } => *code,
            Self::Database { code, .. } => *code,
            Self::Review(ReviewError::UnknownType(_)) => ErrorCode::ValInvalidType,
            Self::Review(_) => ErrorCode::ReviewRejected,
            Self::Link(_) => ErrorCode::GrpInvalidLink,
            Self::Serialization(_) => ErrorCode::ParseInvalidJson,
            _ => ErrorCode::Internal,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            Self::NotFound { .. } => Some("Please check the id and ensure the record exists"),
            Self::Database { .. } => {
                Some("The operation was aborted; no partial write should be assumed durable")
            }
            Self::Review(ReviewError::InsufficientSelection { .. }) => {
                Some("Select at least two ideas before merging")
            }
            Self::Link(LinkError::SelfLink(_)) => Some("Choose two different ideas to link"),
            _ => None,
        }
    }

    /// Whether the error came from the store rather than from rejected input.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Database { .. } | Self::Io(_) | Self::Internal(_))
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for BrainError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            code: ErrorCode::DbOperationFailed,
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = BrainError::validation_with_suggestion(
            "Input too long",
            ErrorCode::ValTooLong,
            "Split the text",
        );
        assert_eq!(err.code(), ErrorCode::ValTooLong);
        assert_eq!(err.suggestion(), Some("Split the text"));
        assert!(err.to_string().contains("Input too long"));
    }

    #[test]
    fn test_not_found_error() {
        let err = BrainError::idea_not_found("idea_1");
        assert_eq!(err.code(), ErrorCode::IdeaNotFound);
        assert!(err.suggestion().is_some());
        assert!(err.to_string().contains("idea_1"));
    }

    #[test]
    fn test_review_error_converts() {
        let err: BrainError = ReviewError::InsufficientSelection { selected: 1 }.into();
        assert_eq!(err.code(), ErrorCode::ReviewRejected);
        assert_eq!(err.suggestion(), Some("Select at least two ideas before merging"));
    }

    #[test]
    fn test_store_failure_flag() {
        assert!(BrainError::database("disk full").is_store_failure());
        let rejected =
            BrainError::validation_with_suggestion("empty", ErrorCode::ValEmptyInput, "Type something");
        assert!(!rejected.is_store_failure());
    }

    #[test]
    fn test_unknown_type_maps_to_invalid_type() {
        let err: BrainError = ReviewError::UnknownType("opinion".into()).into();
        assert_eq!(err.code(), ErrorCode::ValInvalidType);
        assert_eq!(err.code().as_str(), "VAL_004");
    }

    #[test]
    fn test_database_connection_code() {
        let err = BrainError::database_connection("unable to open database file");
        assert_eq!(err.code(), ErrorCode::DbConnectionFailed);
        assert_eq!(err.code().as_str(), "DB_001");
        assert!(err.is_store_failure());
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::ValEmptyInput.as_str(), "VAL_002");
        assert_eq!(ErrorCode::IdeaNotFound.as_str(), "IDEA_001");
        assert_eq!(ErrorCode::DbOperationFailed.as_str(), "DB_002");
    }
}
