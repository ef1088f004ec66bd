use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Cart is empty")]
    EmptyCart,
    #[error("Not enough stock for {product}")]
    InsufficientStock { product: String },
    #[error("Internal error: {0}")]
    Internal(String),
}
