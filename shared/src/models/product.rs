//! Product Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Highest accepted sale or cost price
pub const MAX_PRICE: f64 = 1_000_000_000.0;

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Category reference (Category.id)
    #[serde(default)]
    pub category_id: Option<i64>,
    /// Category stored by name in records written before ids were used.
    /// Resolved to `category_id` and cleared by the catalog service.
    #[serde(default, alias = "categoria", skip_serializing_if = "Option::is_none")]
    pub legacy_category: Option<String>,
    pub sale_price: f64,
    pub cost_price: f64,
    pub stock: i64,
    /// 0 means "use the business low-stock threshold"
    #[serde(default)]
    pub min_stock: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

fn default_true() -> bool {
    true
}

impl Product {
    pub fn is_out_of_stock(&self) -> bool {
        self.stock <= 0
    }

    /// `stock > 0 && stock <= min_stock`; `fallback_min` applies when `min_stock` is 0
    pub fn is_low_stock(&self, fallback_min: i64) -> bool {
        let min = if self.min_stock > 0 {
            self.min_stock
        } else {
            fallback_min
        };
        self.stock > 0 && self.stock <= min
    }
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    pub category_id: Option<i64>,
    #[validate(range(min = 0.0, message = "sale price must not be negative"))]
    pub sale_price: f64,
    #[validate(range(min = 0.0, message = "cost price must not be negative"))]
    pub cost_price: f64,
    #[serde(default)]
    #[validate(range(min = 0, max = 1_000_000_000, message = "stock must be between 0 and 1000000000"))]
    pub stock: i64,
    #[serde(default)]
    #[validate(range(min = 0, message = "minimum stock must not be negative"))]
    pub min_stock: i64,
    pub is_active: Option<bool>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "name must be 1-200 characters"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "sale price must not be negative"))]
    pub sale_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, message = "cost price must not be negative"))]
    pub cost_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, max = 1_000_000_000, message = "stock must be between 0 and 1000000000"))]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0, message = "minimum stock must not be negative"))]
    pub min_stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// Set by the server on every update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64, min_stock: i64) -> Product {
        Product {
            id: 1,
            name: "Yerba 1kg".into(),
            description: None,
            category_id: None,
            legacy_category: None,
            sale_price: 100.0,
            cost_price: 70.0,
            stock,
            min_stock,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_low_stock_predicate() {
        assert!(product(3, 5).is_low_stock(0));
        assert!(product(5, 5).is_low_stock(0));
        assert!(!product(6, 5).is_low_stock(0));
        // out of stock is not low stock
        assert!(!product(0, 5).is_low_stock(0));
        assert!(product(0, 5).is_out_of_stock());
    }

    #[test]
    fn test_low_stock_fallback_threshold() {
        assert!(product(2, 0).is_low_stock(3));
        assert!(!product(2, 0).is_low_stock(0));
    }

    #[test]
    fn test_legacy_category_alias() {
        let json = r#"{"id":1,"name":"Té","categoria":"Infusiones","sale_price":10.0,
            "cost_price":5.0,"stock":1,"created_at":0,"updated_at":0}"#;
        let p: Product = serde_json::from_str(json).unwrap();
        assert_eq!(p.legacy_category.as_deref(), Some("Infusiones"));
        assert!(p.category_id.is_none());
        assert!(p.is_active);
    }

    #[test]
    fn test_create_validation() {
        let create = ProductCreate {
            name: String::new(),
            description: None,
            category_id: None,
            sale_price: -1.0,
            cost_price: 0.0,
            stock: 0,
            min_stock: 0,
            is_active: None,
        };
        let errors = create.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("sale_price"));
        assert!(!fields.contains_key("cost_price"));
    }

    #[test]
    fn test_update_rejects_absurd_stock() {
        let update = ProductUpdate {
            stock: Some(i64::MAX),
            ..Default::default()
        };
        assert!(update.validate().unwrap_err().field_errors().contains_key("stock"));
    }
}
