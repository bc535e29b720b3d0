//! Utility module
//!
//! - [`AppError`] / [`ApiResponse`] (re-exported from `shared::error`)
//! - logging setup, input validation, business-timezone time helpers,
//!   decimal money helpers

pub mod logger;
pub mod money;
pub mod time;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
