//! Service layer
//!
//! # Services
//!
//! - [`CatalogService`] - products and categories
//! - [`ClientService`] - client directory
//! - [`SalesService`] - sale submission, status changes, stock bookkeeping
//! - [`ExpenseService`] - expenses
//! - [`SettingsService`] - business profile
//! - [`ReportService`] - dashboard and report figures
//!
//! Services are cheap to clone and are built per request from
//! [`ServerState`](crate::core::ServerState).

pub mod catalog;
pub mod clients;
pub mod expenses;
pub mod reports;
pub mod sales;
pub mod settings;

pub use catalog::CatalogService;
pub use clients::ClientService;
pub use expenses::ExpenseService;
pub use reports::{ReportOptions, ReportService};
pub use sales::SalesService;
pub use settings::SettingsService;
