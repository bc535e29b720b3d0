//! Reports API
//!
//! | Path | Query | Response |
//! |------|-------|----------|
//! | /api/reports/sales | period, start, end | bucketed sales |
//! | /api/reports/top-products | days, start, end | top 5 by quantity |
//! | /api/reports/categories | days, start, end | revenue share per category |
//! | /api/reports/margins | - | margin tiers of active products |
//! | /api/reports/balance | period, start, end | revenue, costs, profit, trends |
//! | /api/reports/export | period, start, end, format | file download |

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reports", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/sales", get(handler::sales))
        .route("/top-products", get(handler::top_products))
        .route("/categories", get(handler::categories))
        .route("/margins", get(handler::margins))
        .route("/balance", get(handler::balance))
        .route("/export", get(handler::export))
}
