//! Caller identities
//!
//! An [`Identity`] is the signed credential the identity provider hands out
//! after an interactive login. The store authorizes every call by the
//! [`Principal`] the identity speaks for, so two identities with different
//! principals see disjoint note sequences.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Textual principal presented by callers that never logged in.
pub const ANONYMOUS_PRINCIPAL: &str = "2vxsx-fae";

/// Number of characters kept by [`Principal::short`].
const SHORT_PRINCIPAL_LEN: usize = 20;

/// Textual identifier of an authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Wrap a principal's textual form
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The principal shared by all unauthenticated callers
    pub fn anonymous() -> Self {
        Self(ANONYMOUS_PRINCIPAL.to_string())
    }

    /// Whether this is the anonymous principal
    pub fn is_anonymous(&self) -> bool {
        self.0 == ANONYMOUS_PRINCIPAL
    }

    /// Full textual form
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display form truncated for headers and log lines
    pub fn short(&self) -> String {
        match self.0.char_indices().nth(SHORT_PRINCIPAL_LEN) {
            Some((cut, _)) => format!("{}...", &self.0[..cut]),
            None => self.0.clone(),
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Opaque signature material proving the identity provider vouched for a principal
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedCredential(Vec<u8>);

impl SignedCredential {
    /// Wrap raw credential bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Raw credential bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Short hex fingerprint, safe to log
    pub fn fingerprint(&self) -> String {
        hex::encode(&self.0[..self.0.len().min(4)])
    }
}

// Never print the full credential.
impl fmt::Debug for SignedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignedCredential({}..)", self.fingerprint())
    }
}

/// Signed identity issued by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    principal: Principal,
    credential: SignedCredential,
    expires_at_ms: Option<u64>,
}

impl Identity {
    /// Create an identity for `principal` backed by `credential`
    pub fn new(principal: Principal, credential: SignedCredential) -> Self {
        Self {
            principal,
            credential,
            expires_at_ms: None,
        }
    }

    /// The identity every caller has before logging in
    pub fn anonymous() -> Self {
        Self::new(Principal::anonymous(), SignedCredential::new(Vec::new()))
    }

    /// Set the instant (ms since epoch) after which the identity is no longer valid
    #[must_use]
    pub fn with_expiry(mut self, expires_at_ms: u64) -> Self {
        self.expires_at_ms = Some(expires_at_ms);
        self
    }

    /// Principal this identity speaks for
    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Signature material
    pub fn credential(&self) -> &SignedCredential {
        &self.credential
    }

    /// Expiry instant, if the provider set one
    pub fn expires_at_ms(&self) -> Option<u64> {
        self.expires_at_ms
    }

    /// Whether the identity is anonymous
    pub fn is_anonymous(&self) -> bool {
        self.principal.is_anonymous()
    }

    /// Whether the identity has expired at `now_ms`
    pub fn is_expired(&self, now_ms: u64) -> bool {
        self.expires_at_ms.is_some_and(|expiry| now_ms >= expiry)
    }
}
