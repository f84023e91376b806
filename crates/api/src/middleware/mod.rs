//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Any caller with a valid identity token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireStaffViewer`] -- Requires `admin` or `representative`.

pub mod auth;
pub mod rbac;
