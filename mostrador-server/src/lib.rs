//! Mostrador Server - retail dashboard backend
//!
//! Financial metrics and reporting for a small shop: dashboard figures,
//! period-bucketed sales, top products, category shares, margin tiers,
//! financial balance, and report export, over a catalog/sales/expense
//! store that is either an embedded redb file or a remote table API.
//!
//! # Module structure
//!
//! ```text
//! mostrador-server/src/
//! ├── core/      # config, state, errors, server
//! ├── store/     # Repository trait, local + remote backends
//! ├── metrics/   # pure metric computations
//! ├── cart/      # sale-in-progress state machine
//! ├── report/    # sales report + JSON/CSV/text export
//! ├── services/  # store-backed business operations
//! ├── api/       # HTTP handlers
//! ├── routes/    # router assembly and middleware
//! └── utils/     # logging, money, time, validation
//! ```

pub mod api;
pub mod cart;
pub mod core;
pub mod metrics;
pub mod report;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

pub use core::{Config, Server, ServerState};
pub use routes::build_app;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env` and start logging from `LOG_LEVEL` / `LOG_DIR`
///
/// Runs before [`Config::from_env`] so configuration warnings are logged.
pub fn setup_environment() {
    let _ = dotenv::dotenv();
    let level = std::env::var("LOG_LEVEL").ok();
    let dir = std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty());
    init_logger_with_file(level.as_deref(), dir.as_deref());
}

pub fn print_banner() {
    println!(
        r#"
                        _                  _
  _ __ ___   ___  ___| |_ _ __ __ _  __| | ___  _ __
 | '_ ` _ \ / _ \/ __| __| '__/ _` |/ _` |/ _ \| '__|
 | | | | | | (_) \__ \ |_| | | (_| | (_| | (_) | |
 |_| |_| |_|\___/|___/\__|_|  \__,_|\__,_|\___/|_|
    "#
    );
}
