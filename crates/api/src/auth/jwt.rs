//! HS256 identity tokens.
//!
//! The identity provider signs a short-lived token whose subject is the
//! account uid. This server only verifies; [`issue_token`] exists for local
//! tooling and tests.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by an identity token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IdentityClaims {
    /// Subject -- the identity provider's uid.
    pub sub: String,
    pub email: Option<String>,
    pub name: Option<String>,
    /// Profile photo URL.
    pub picture: Option<String>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

/// Configuration for identity token verification.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret shared with the identity provider.
    pub secret: String,
    /// Expected `iss` claim, if any.
    pub issuer: Option<String>,
}

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var      | Required | Default |
    /// |--------------|----------|---------|
    /// | `JWT_SECRET` | **yes**  | --      |
    /// | `JWT_ISSUER` | no       | --      |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        Self {
            secret,
            issuer: std::env::var("JWT_ISSUER").ok().filter(|v| !v.is_empty()),
        }
    }
}

/// Validate and decode an identity token.
///
/// Checks the signature, expiry and (when configured) the issuer.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<IdentityClaims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default(); // HS256, validates exp
    if let Some(issuer) = &config.issuer {
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);
    }

    let token_data = decode::<IdentityClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )?;
    Ok(token_data.claims)
}

/// Sign an identity token valid for `ttl_secs` seconds.
pub fn issue_token(
    uid: &str,
    email: Option<&str>,
    name: Option<&str>,
    ttl_secs: i64,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = IdentityClaims {
        sub: uid.to_string(),
        email: email.map(str::to_string),
        name: name.map(str::to_string),
        picture: None,
        exp: now + ttl_secs,
        iat: now,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret".into(),
            issuer: None,
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let token = issue_token("uid-1", Some("a@example.com"), Some("Ann"), 60, &config()).unwrap();
        let claims = validate_token(&token, &config()).unwrap();
        assert_eq!(claims.sub, "uid-1");
        assert_eq!(claims.email.as_deref(), Some("a@example.com"));
        assert_eq!(claims.name.as_deref(), Some("Ann"));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("uid-1", None, None, 60, &config()).unwrap();
        let other = JwtConfig {
            secret: "other".into(),
            issuer: None,
        };
        assert!(validate_token(&token, &other).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Beyond the default 60s leeway.
        let token = issue_token("uid-1", None, None, -300, &config()).unwrap();
        assert!(validate_token(&token, &config()).is_err());
    }

    #[test]
    fn issuer_is_enforced_when_configured() {
        let token = issue_token("uid-1", None, None, 60, &config()).unwrap();
        let strict = JwtConfig {
            secret: "test-secret".into(),
            issuer: Some("https://id.example".into()),
        };
        assert!(validate_token(&token, &strict).is_err());
    }
}
