//! Query builder for the remote table API
//!
//! Produces PostgREST-style query parameters:
//!
//! ```text
//! TableQuery::new().select("*").gte("sold_at", 0).order("sold_at", false).limit(10)
//!   → select=*&sold_at=gte.0&order=sold_at.desc&limit=10
//! ```

use std::fmt::Display;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableQuery {
    params: Vec<(String, String)>,
}

impl TableQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(self, columns: &str) -> Self {
        self.push("select", columns.to_string())
    }

    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.push(column, format!("eq.{value}"))
    }

    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.push(column, format!("gte.{value}"))
    }

    pub fn lt(self, column: &str, value: impl Display) -> Self {
        self.push(column, format!("lt.{value}"))
    }

    pub fn lte(self, column: &str, value: impl Display) -> Self {
        self.push(column, format!("lte.{value}"))
    }

    pub fn order(self, column: &str, ascending: bool) -> Self {
        let dir = if ascending { "asc" } else { "desc" };
        self.push("order", format!("{column}.{dir}"))
    }

    pub fn limit(self, n: usize) -> Self {
        self.push("limit", n.to_string())
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    fn push(mut self, key: &str, value: String) -> Self {
        self.params.push((key.to_string(), value));
        self
    }
}
