//! Error types for element handles
//!
//! Every failure is returned to the caller. Nothing is only logged.

use dom::DomError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ElementError>;

#[derive(Debug, Error)]
pub enum ElementError {
    /// A value outside the accessor's contract
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The handle's node was removed and nothing was adopted since
    #[error("Element handle is detached: its node was removed")]
    DetachedNodeAccess,

    #[error("An element cannot be its own parent")]
    SelfParentingAttempt,

    #[error("Host error: {0}")]
    Host(#[from] DomError),
}

impl ElementError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::warn!("Rejected input: {}", message);
        ElementError::InvalidInput(message)
    }
}
