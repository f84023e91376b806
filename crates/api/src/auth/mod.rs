//! Identity token verification.
//!
//! - [`jwt`] -- HS256 token validation (and issuance for tooling/tests).
//! - [`identity`] -- the [`identity::IdentityVerifier`] seam used by the
//!   request extractors.

pub mod identity;
pub mod jwt;
