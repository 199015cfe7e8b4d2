use thiserror::Error;

/// Failure outcomes of the cart, checkout and order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("insufficient stock for {0}")]
    InsufficientStock(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type OrderResult<T> = Result<T, OrderError>;
