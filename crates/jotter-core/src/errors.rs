//! Unified error system for Jotter
//!
//! Every fallible operation in the client reports one of these variants.
//! Validation and precondition errors are raised before any remote call;
//! remote errors carry the collaborator's own failure as their cause.

use crate::effects::StoreError;
use std::fmt;

/// Authentication failure reasons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthFailure {
    /// The user abandoned the interactive exchange
    Cancelled,
    /// The identity provider refused to issue an identity
    Rejected,
    /// The identity provider could not be reached
    ProviderUnavailable,
    /// The cached identity is past its expiry
    Expired,
    /// The operation needs an authenticated session
    NotAuthenticated,
}

impl fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "cancelled"),
            Self::Rejected => write!(f, "rejected by provider"),
            Self::ProviderUnavailable => write!(f, "provider unavailable"),
            Self::Expired => write!(f, "identity expired"),
            Self::NotAuthenticated => write!(f, "not authenticated"),
        }
    }
}

/// Unified error type for all Jotter operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JotterError {
    /// Locally detectable bad input (blank title or content)
    #[error("Invalid input: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// The requested position is outside the current view
    #[error("Precondition failed: {message}")]
    Precondition {
        /// Which precondition did not hold
        message: String,
    },

    /// The remote store failed, timed out or was unreachable
    #[error("Remote store error: {cause}")]
    Remote {
        /// Failure reported by the store handle
        cause: StoreError,
    },

    /// Login or logout exchange failed
    #[error("Authentication failed ({reason}): {context}")]
    Auth {
        /// Why authentication failed
        reason: AuthFailure,
        /// Additional detail from the provider or the session
        context: String,
    },

    /// Another mutating operation is still in flight
    #[error("Another note operation is in progress")]
    Busy,

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration problem
        message: String,
    },
}

impl JotterError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Wrap a store failure
    pub fn remote(cause: StoreError) -> Self {
        Self::Remote { cause }
    }

    /// Create an authentication error
    pub fn auth(reason: AuthFailure, context: impl Into<String>) -> Self {
        Self::Auth {
            reason,
            context: context.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Shorthand for an operation attempted without a bound store handle
    pub fn not_authenticated(context: impl Into<String>) -> Self {
        Self::auth(AuthFailure::NotAuthenticated, context)
    }

    /// Classify this error for frontend handling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } => ErrorCategory::Input,
            Self::Precondition { .. } => ErrorCategory::NotFound,
            Self::Remote { cause } => match cause {
                StoreError::Unauthorized { .. } => ErrorCategory::Capability,
                StoreError::IndexOutOfRange { .. } => ErrorCategory::NotFound,
                StoreError::Unreachable { .. } | StoreError::Timeout { .. } => {
                    ErrorCategory::Network
                }
                StoreError::Rejected { .. } | StoreError::Decode { .. } => {
                    ErrorCategory::Operation
                }
            },
            Self::Auth { .. } => ErrorCategory::Capability,
            Self::Busy => ErrorCategory::Operation,
            Self::Config { .. } => ErrorCategory::Config,
        }
    }

    /// Get a short error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION",
            Self::Precondition { .. } => "PRECONDITION",
            Self::Remote { cause } => match cause {
                StoreError::Unreachable { .. } => "REMOTE_UNREACHABLE",
                StoreError::Timeout { .. } => "REMOTE_TIMEOUT",
                StoreError::Unauthorized { .. } => "REMOTE_UNAUTHORIZED",
                StoreError::IndexOutOfRange { .. } => "REMOTE_INDEX",
                StoreError::Rejected { .. } => "REMOTE_REJECTED",
                StoreError::Decode { .. } => "REMOTE_DECODE",
            },
            Self::Auth { reason, .. } => match reason {
                AuthFailure::Cancelled => "AUTH_CANCELLED",
                AuthFailure::Rejected => "AUTH_REJECTED",
                AuthFailure::ProviderUnavailable => "AUTH_UNAVAILABLE",
                AuthFailure::Expired => "AUTH_EXPIRED",
                AuthFailure::NotAuthenticated => "AUTH_REQUIRED",
            },
            Self::Busy => "BUSY",
            Self::Config { .. } => "CONFIG",
        }
    }

    /// Whether the failure came back from the store, i.e. the call was made
    /// and may have been applied.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }

    /// Whether the failing operation may succeed if simply retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Busy => true,
            Self::Remote { .. } => self.category().is_transient(),
            _ => false,
        }
    }
}

impl From<StoreError> for JotterError {
    fn from(cause: StoreError) -> Self {
        Self::remote(cause)
    }
}

/// Convenience alias used across the workspace
pub type Result<T> = std::result::Result<T, JotterError>;

/// High-level error categories for frontend error handling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// User input validation errors (correctable by user)
    Input,
    /// Configuration errors (correctable by modifying settings)
    Config,
    /// Authorization errors (log in again)
    Capability,
    /// Addressed note does not exist (view may be stale)
    NotFound,
    /// Network connectivity errors (often transient)
    Network,
    /// General operation failures (catch-all)
    Operation,
}

impl ErrorCategory {
    /// Check if this error category is user-correctable.
    #[must_use]
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, Self::Input | Self::Config)
    }

    /// Check if this error category is likely transient.
    ///
    /// Transient errors may resolve on retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network | Self::NotFound)
    }

    /// Get a short label for this category.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Config => "Config",
            Self::Capability => "Permission",
            Self::NotFound => "Not Found",
            Self::Network => "Network",
            Self::Operation => "Operation",
        }
    }

    /// Get a hint for the user on how to resolve this category of error.
    #[must_use]
    pub fn resolution_hint(&self) -> &'static str {
        match self {
            Self::Input => "Both title and content are required",
            Self::Config => "Review your network configuration",
            Self::Capability => "Log in and try again",
            Self::NotFound => "The note list changed; refresh and retry",
            Self::Network => "Check your network connection and retry",
            Self::Operation => "An unexpected error occurred",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = JotterError::validation("title must not be blank");
        assert_eq!(err.to_string(), "Invalid input: title must not be blank");
        assert_eq!(err.code(), "VALIDATION");
        assert_eq!(err.category(), ErrorCategory::Input);
        assert!(err.category().is_user_correctable());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_remote_error_wraps_cause() {
        let err: JotterError = StoreError::unreachable("connection refused").into();
        assert_eq!(
            err.to_string(),
            "Remote store error: Store unreachable: connection refused"
        );
        assert_eq!(err.code(), "REMOTE_UNREACHABLE");
        assert_eq!(err.category(), ErrorCategory::Network);
        assert!(err.is_retryable());
        assert!(err.is_remote());
        assert!(!JotterError::Busy.is_remote());
    }

    #[test]
    fn test_auth_error_display() {
        let err = JotterError::auth(AuthFailure::Cancelled, "window closed");
        assert_eq!(
            err.to_string(),
            "Authentication failed (cancelled): window closed"
        );
        assert_eq!(err.code(), "AUTH_CANCELLED");
        assert_eq!(err.category(), ErrorCategory::Capability);
    }

    #[test]
    fn test_busy_is_retryable() {
        assert!(JotterError::Busy.is_retryable());
        assert_eq!(JotterError::Busy.code(), "BUSY");
    }

    #[test]
    fn test_error_category_resolution_hints() {
        for category in [
            ErrorCategory::Input,
            ErrorCategory::Config,
            ErrorCategory::Capability,
            ErrorCategory::NotFound,
            ErrorCategory::Network,
            ErrorCategory::Operation,
        ] {
            assert!(!category.resolution_hint().is_empty());
            assert_eq!(format!("{category}"), category.label());
        }
    }
}
