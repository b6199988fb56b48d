//! Error handling for the RoadViz-RS pipeline
//!
//! This module defines custom error types and a Result alias for use
//! throughout the application.

use thiserror::Error;

/// Main error type for RoadViz-RS operations
#[derive(Error, Debug)]
pub enum RoadVizError {
    /// A candidate fragment was not valid structured data (recoverable;
    /// the fragment is dropped and decoding continues)
    #[error("Decode error: {0}")]
    Decode(String),

    /// The inbound model stream or the outbound event channel failed
    /// (terminal for the current session)
    #[error("Transport error: {0}")]
    Transport(String),

    /// A received push event payload was not valid structured data
    /// (recoverable; the event is skipped)
    #[error("Consumer parse error: {0}")]
    ConsumerParse(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to channel communication
    #[error("Channel error: {0}")]
    Channel(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<RoadVizError>,
    },
}

impl RoadVizError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        RoadVizError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for RoadViz-RS operations
pub type Result<T> = std::result::Result<T, RoadVizError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
