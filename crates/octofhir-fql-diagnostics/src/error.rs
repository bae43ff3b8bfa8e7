//! FQL error types

use crate::SourceLocation;
use thiserror::Error;

/// Main FQL error type
///
/// Every failure surfaced by the query engine falls into one of these
/// variants. Parse and validation errors are fatal for the statement;
/// an expired search is fatal only for that continuation request.
#[derive(Debug, Clone, Error)]
pub enum FqlError {
    /// Malformed grammar; always carries the position of the offending token
    #[error("{message} at {location}")]
    Parse {
        message: String,
        location: SourceLocation,
    },

    /// Grammatically well-formed but semantically invalid statement
    #[error("{message}")]
    Validation {
        message: String,
        location: Option<SourceLocation>,
    },

    /// Continuation identifier no longer resolvable by the store
    #[error("Search {search_id} is no longer available")]
    ExpiredSearch { search_id: String },

    /// Failure reported by the record store
    #[error("Record store failure: {message}")]
    Store { message: String },

    /// Contract misuse or internal invariant violation
    #[error("{message}")]
    System { message: String },
}

impl FqlError {
    /// Create a parse error at a location
    pub fn parse(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::Parse {
            message: message.into(),
            location,
        }
    }

    /// Create a validation error without a location
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            location: None,
        }
    }

    /// Create a validation error pointing at a source location
    pub fn validation_at(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::Validation {
            message: message.into(),
            location: Some(location),
        }
    }

    /// Create an expired-search error
    pub fn expired_search(search_id: impl Into<String>) -> Self {
        Self::ExpiredSearch {
            search_id: search_id.into(),
        }
    }

    /// Create a store error
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store {
            message: message.into(),
        }
    }

    /// Create a system error
    pub fn system(message: impl Into<String>) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    /// Get the source location if the error carries one
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Parse { location, .. } => Some(location),
            Self::Validation { location, .. } => location.as_ref(),
            _ => None,
        }
    }

    /// The bare message, without any location suffix
    pub fn message(&self) -> &str {
        match self {
            Self::Parse { message, .. } => message,
            Self::Validation { message, .. } => message,
            Self::ExpiredSearch { search_id } => search_id,
            Self::Store { message } => message,
            Self::System { message } => message,
        }
    }
}
