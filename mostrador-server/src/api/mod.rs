//! HTTP API
//!
//! # Structure
//!
//! - [`health`] - liveness and store check
//! - [`products`] - products and low-stock listing
//! - [`categories`] - product categories
//! - [`clients`] - client directory
//! - [`sales`] - sale submission and status changes
//! - [`expenses`] - expenses
//! - [`dashboard`] - headline figures
//! - [`reports`] - charts, margins, balance, exports
//! - [`settings`] - business profile

pub mod query;

pub mod health;

pub mod categories;
pub mod clients;
pub mod dashboard;
pub mod expenses;
pub mod products;
pub mod reports;
pub mod sales;
pub mod settings;

pub use crate::utils::AppResult;
