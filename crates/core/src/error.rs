/// Domain-level error shared by every layer of the workspace.
///
/// The HTTP layer maps each variant to a status code and a machine-readable
/// `code` string; see `AppError` in the api crate.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The identifier or token does not resolve to a record. The payload is
    /// the client-facing message (e.g. `"Request not found"`).
    #[error("{0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The response action is not one of the supported values.
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// The one-time response token has already been consumed.
    #[error("This response link has already been used.")]
    TokenAlreadyUsed,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
