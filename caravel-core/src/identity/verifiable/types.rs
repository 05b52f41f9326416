use rst_common::with_errors::thiserror::{self, Error};

pub const CREDENTIAL_TYPE: &str = "VerifiableCredential";

#[derive(Debug, Error, Clone, PartialEq)]
pub enum VerifiableError {
    #[error("repo error: {0}")]
    RepoError(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("message type error: {0}")]
    MessageTypeError(String),

    #[error("unknown error: {0}")]
    UnknownError(String),

    #[error("trait: method not implemented")]
    MethodNotImplemented,
}

/// `PaginationParams` used when we need to load a list of something from persistent storage
/// it assumed using common pagination params contains of page, limit and skip
pub struct PaginationParams {
    pub page: usize,
    pub limit: usize,
    pub skip: usize,
}
