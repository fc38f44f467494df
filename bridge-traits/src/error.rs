//! Errors raised by host bridge implementations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// The host has no implementation for this capability.
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    /// The host accepted the call but could not complete it.
    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    /// The host side of the bridge has shut down.
    #[error("Bridge closed: {0}")]
    Closed(String),
}

impl BridgeError {
    /// Whether retrying later can succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, BridgeError::OperationFailed(_))
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(BridgeError::OperationFailed("busy".into()).is_transient());
        assert!(!BridgeError::Closed("host exited".into()).is_transient());
        assert_eq!(
            BridgeError::NotAvailable("logger".into()).to_string(),
            "Bridge capability not available: logger"
        );
    }
}
