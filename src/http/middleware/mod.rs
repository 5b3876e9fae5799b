//! HTTP middleware.

pub mod error_normalization;

pub use error_normalization::{error_normalization_middleware, panic_to_raised_error};
