//! Identity verification seam.
//!
//! Handlers never decode tokens themselves; they go through an
//! [`IdentityVerifier`] held in the application state.

use async_trait::async_trait;

use super::jwt::{validate_token, JwtConfig};

/// A verified subject as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub picture: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The token is malformed, forged or expired.
    #[error("invalid identity token: {0}")]
    Invalid(String),

    /// The provider could not be reached.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError>;
}

/// Verifies HS256 tokens locally against a shared secret.
pub struct JwtVerifier {
    config: JwtConfig,
}

impl JwtVerifier {
    pub fn new(config: JwtConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let claims = validate_token(token, &self.config)
            .map_err(|e| IdentityError::Invalid(e.to_string()))?;

        Ok(VerifiedIdentity {
            uid: claims.sub,
            email: claims.email,
            name: claims.name,
            picture: claims.picture,
        })
    }
}
