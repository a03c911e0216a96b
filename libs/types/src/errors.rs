//! Error taxonomy for order submission

use crate::numeric::{Price, Quantity};
use thiserror::Error;

/// Rejections for order templates that violate the submission contract.
///
/// These are strategy programming errors; the engine refuses the order
/// rather than letting a malformed record reach the book.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    #[error("order quantity must be positive, got {0}")]
    InvalidQuantity(Quantity),

    #[error("limit order price must be positive, got {0}")]
    InvalidPrice(Price),
}
