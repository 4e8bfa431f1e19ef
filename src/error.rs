//! Error types for the autofulfill system.
//!
//! Dependency failures are split by kind so a cycle can tell "element
//! absent" apart from "element malformed" and "not initialised yet".

use thiserror::Error;

use crate::config::ConfigurationError;
use crate::gateway::GatewayError;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AutofulfillError {
    /// Invalid command input or configuration value. Never changes state.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    /// The colony surface, or a required element of it, cannot be located.
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),
    /// A located element exists but does not have the expected shape.
    #[error("Dependency shape mismatch: {0}")]
    DependencyShapeMismatch(String),
    /// The dependency exists but reports it is not initialised yet.
    #[error("Dependency not ready: {0}")]
    TransientNotReady(String),
    /// The main loop inbox or a responder channel was dropped.
    #[error("Channel closed: {0}")]
    ChannelClosed(String),
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AutofulfillError {
    /// Errors that belong to the startup backoff path rather than to users.
    pub fn is_transient(&self) -> bool {
        matches!(self, AutofulfillError::TransientNotReady(_))
    }
}

impl From<GatewayError> for AutofulfillError {
    fn from(error: GatewayError) -> Self {
        match error {
            GatewayError::Unavailable(msg) => AutofulfillError::DependencyUnavailable(msg),
            GatewayError::ShapeMismatch(msg) => AutofulfillError::DependencyShapeMismatch(msg),
            GatewayError::NotReady(msg) => AutofulfillError::TransientNotReady(msg),
        }
    }
}

impl From<ConfigurationError> for AutofulfillError {
    fn from(error: ConfigurationError) -> Self {
        AutofulfillError::ConfigurationError(error.to_string())
    }
}

impl<T> From<tokio::sync::mpsc::error::SendError<T>> for AutofulfillError {
    fn from(_: tokio::sync::mpsc::error::SendError<T>) -> Self {
        AutofulfillError::ChannelClosed("main loop inbox closed".to_string())
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for AutofulfillError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        AutofulfillError::ChannelClosed("command responder dropped".to_string())
    }
}

pub type Result<T> = std::result::Result<T, AutofulfillError>;
