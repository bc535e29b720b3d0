//! Data models
//!
//! Shared between mostrador-server and the dashboard frontend (via API).
//! All IDs are `i64` snowflakes, all timestamps Unix milliseconds.
//! Money is carried as `f64` and rounded to cents by the server.

pub mod category;
pub mod client;
pub mod expense;
pub mod payment;
pub mod product;
pub mod sale;
pub mod settings;

// Re-exports
pub use category::*;
pub use client::*;
pub use expense::*;
pub use payment::*;
pub use product::*;
pub use sale::*;
pub use settings::*;
