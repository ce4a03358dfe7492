//! Identity provider effects
//!
//! The provider owns the interactive authentication protocol. The client
//! only sees its outcome: a signed [`Identity`], or a reason there is none.

use crate::identity::Identity;
use async_trait::async_trait;

/// Identity provider errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityProviderError {
    /// The user closed or abandoned the exchange
    #[error("Login cancelled by user")]
    Cancelled,
    /// The provider refused to issue an identity
    #[error("Provider rejected login: {reason}")]
    Rejected {
        /// Reason reported by the provider
        reason: String,
    },
    /// The provider could not be reached
    #[error("Provider unavailable: {reason}")]
    Unavailable {
        /// Transport-level reason
        reason: String,
    },
}

/// Effect trait for the external identity provider
#[async_trait]
pub trait IdentityProviderEffects: Send + Sync {
    /// Run the interactive authorize exchange against `provider_url`.
    ///
    /// Suspends until the user completes or abandons the exchange.
    async fn authorize(&self, provider_url: &str) -> Result<Identity, IdentityProviderError>;

    /// Identity established by an earlier exchange, if the provider still holds one
    async fn current_identity(&self) -> Result<Option<Identity>, IdentityProviderError>;

    /// Forget the held identity
    async fn logout(&self) -> Result<(), IdentityProviderError>;
}
