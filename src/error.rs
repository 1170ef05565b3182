//! Error types used by the session controller and the command dispatcher.
//!
//! This module defines two error enums:
//!
//! - [`EngineError`] - failures reported by the instrumentation engine.
//! - [`DispatchError`] - failures to hand a command over to the dispatcher.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.

use std::any::Any;

use thiserror::Error;

/// # Errors reported by an instrumentation engine.
///
/// The controller never retries an engine call; it rolls its own state back
/// and hands the error to the caller.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The engine tried and failed (attach, deploy, detach...).
    #[error("engine operation failed: {error}")]
    Failed {
        /// The underlying error message.
        error: String,
    },

    /// The engine refused the request without trying.
    #[error("engine rejected request: {reason}")]
    Rejected {
        /// Why the request was refused.
        reason: String,
    },

    /// The engine is not reachable (shut down, not attached).
    #[error("engine unavailable")]
    Unavailable,
}

impl EngineError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use tracevisor::EngineError;
    ///
    /// let err = EngineError::Rejected { reason: "busy".into() };
    /// assert_eq!(err.as_label(), "engine_rejected");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            EngineError::Failed { .. } => "engine_failed",
            EngineError::Rejected { .. } => "engine_rejected",
            EngineError::Unavailable => "engine_unavailable",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            EngineError::Failed { error } => format!("error: {error}"),
            EngineError::Rejected { reason } => format!("rejected: {reason}"),
            EngineError::Unavailable => "engine unavailable".to_string(),
        }
    }
}

/// # Errors returned when posting a command for delivery.
///
/// Posting never blocks, so a saturated or stopped dispatcher is reported
/// instead of waited on. The command is dropped in both cases.
#[non_exhaustive]
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// The worker queue for this session is full.
    #[error("dispatch queue full")]
    Full,

    /// The dispatcher was shut down.
    #[error("dispatcher closed")]
    Closed,
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Full => "dispatch_full",
            DispatchError::Closed => "dispatch_closed",
        }
    }
}

/// Extracts a readable message from a caught panic payload.
pub(crate) fn panic_info(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_message_carries_detail() {
        let failed = EngineError::Failed {
            error: "attach refused".into(),
        };
        assert_eq!(failed.as_message(), "error: attach refused");
        assert_eq!(
            EngineError::Rejected {
                reason: "busy".into()
            }
            .as_message(),
            "rejected: busy"
        );
        assert_eq!(EngineError::Unavailable.as_message(), "engine unavailable");
    }

    #[test]
    fn test_panic_info_renders_payloads() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("static");
        let other: Box<dyn Any + Send> = Box::new(7u8);

        assert_eq!(panic_info(owned.as_ref()), "owned");
        assert_eq!(panic_info(borrowed.as_ref()), "static");
        assert_eq!(panic_info(other.as_ref()), "unknown panic");
    }
}
