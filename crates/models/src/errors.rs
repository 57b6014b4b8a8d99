use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("invalid owner id: {0}")]
    InvalidOwnerId(String),
    #[error("invalid kit name: {0}")]
    InvalidKitName(String),
}
