//! Sale draft (cart)
//!
//! In-memory draft assembled before a sale is persisted. Totals are
//! recomputed after every mutation:
//!
//! ```text
//! subtotal = Σ quantity × unit_price
//! total    = max(0, subtotal - discount)
//! ```
//!
//! Line quantities always stay in `[1, available_stock]`.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use shared::error::{AppError, ErrorCode};
use shared::models::{PaymentMethod, Product, Sale, SaleLine, SaleStatus};
use thiserror::Error;

use crate::utils::money;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CartError {
    #[error("Product is inactive: {0}")]
    ProductInactive(String),

    #[error("Product is out of stock: {0}")]
    OutOfStock(String),

    #[error("No cart line for product {0}")]
    LineNotFound(i64),

    #[error("Invalid discount: {0}")]
    InvalidDiscount(f64),

    #[error("Cart is empty")]
    Empty,

    #[error("A submission is already in progress")]
    SubmissionInProgress,
}

pub type CartResult<T> = Result<T, CartError>;

impl From<CartError> for AppError {
    fn from(err: CartError) -> Self {
        let code = match &err {
            CartError::ProductInactive(_) => ErrorCode::ProductInactive,
            CartError::OutOfStock(_) => ErrorCode::ProductOutOfStock,
            CartError::LineNotFound(_) => ErrorCode::SaleLineNotFound,
            CartError::InvalidDiscount(_) => ErrorCode::SaleInvalidDiscount,
            CartError::Empty => ErrorCode::SaleEmpty,
            CartError::SubmissionInProgress => ErrorCode::SaleSubmissionInProgress,
        };
        AppError::with_message(code, err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub product_id: i64,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i64,
    /// Stock at the time the product was added
    pub available_stock: i64,
}

impl CartLine {
    pub fn subtotal(&self) -> f64 {
        money::line_total(self.quantity, self.unit_price)
    }
}

#[derive(Debug, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    discount: f64,
    subtotal: f64,
    total: f64,
    pub client_id: Option<i64>,
    pub customer_name: Option<String>,
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    submitting: Arc<AtomicBool>,
}

/// A copy is a separate draft with its own submission state
impl Clone for Cart {
    fn clone(&self) -> Self {
        Self {
            lines: self.lines.clone(),
            discount: self.discount,
            subtotal: self.subtotal,
            total: self.total,
            client_id: self.client_id,
            customer_name: self.customer_name.clone(),
            payment_method: self.payment_method,
            notes: self.notes.clone(),
            submitting: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: i64) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn subtotal(&self) -> f64 {
        self.subtotal
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    /// Add one unit of `product`, or one more unit if it is already in the
    /// cart (capped at stock).
    pub fn add_product(&mut self, product: &Product) -> CartResult<()> {
        if !product.is_active {
            return Err(CartError::ProductInactive(product.name.clone()));
        }
        if product.is_out_of_stock() {
            return Err(CartError::OutOfStock(product.name.clone()));
        }

        match self.lines.iter_mut().find(|l| l.product_id == product.id) {
            Some(line) => {
                line.available_stock = product.stock;
                line.quantity = line.quantity.saturating_add(1).min(product.stock);
            }
            None => self.lines.push(CartLine {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.sale_price,
                quantity: 1,
                available_stock: product.stock,
            }),
        }
        self.recompute();
        Ok(())
    }

    /// Set a line quantity, clamped to `[1, available_stock]`.
    /// Returns the quantity actually applied.
    pub fn set_quantity(&mut self, product_id: i64, quantity: i64) -> CartResult<i64> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product_id)
            .ok_or(CartError::LineNotFound(product_id))?;
        line.quantity = quantity.clamp(1, line.available_stock.max(1));
        let applied = line.quantity;
        self.recompute();
        Ok(applied)
    }

    pub fn remove(&mut self, product_id: i64) -> CartResult<()> {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        if self.lines.len() == before {
            return Err(CartError::LineNotFound(product_id));
        }
        self.recompute();
        Ok(())
    }

    /// Discounts above the subtotal floor the total at 0
    pub fn set_discount(&mut self, discount: f64) -> CartResult<()> {
        if !discount.is_finite() || discount < 0.0 {
            return Err(CartError::InvalidDiscount(discount));
        }
        self.discount = money::round_money(discount);
        self.recompute();
        Ok(())
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.discount = 0.0;
        self.recompute();
    }

    fn recompute(&mut self) {
        let subtotal =
            money::sum_decimal(self.lines.iter().map(|l| money::to_decimal(l.subtotal())));
        self.subtotal = money::to_f64(subtotal);
        self.total = money::discounted_total(self.subtotal, self.discount);
    }

    /// Mark the cart as being submitted.
    ///
    /// Fails while another guard for this cart is alive; dropping the guard
    /// re-enables submission.
    pub fn try_begin_submit(&self) -> CartResult<SubmitGuard> {
        self.submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| CartError::SubmissionInProgress)?;
        Ok(SubmitGuard {
            flag: self.submitting.clone(),
        })
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Build the sale record for this draft (id assigned by the store)
    pub fn to_sale(&self, status: SaleStatus, sold_at: i64) -> CartResult<Sale> {
        if self.lines.is_empty() {
            return Err(CartError::Empty);
        }
        Ok(Sale {
            id: 0,
            client_id: self.client_id,
            customer_name: self.customer_name.clone(),
            lines: self
                .lines
                .iter()
                .map(|l| SaleLine {
                    product_id: Some(l.product_id),
                    product_name: l.name.clone(),
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                    subtotal: l.subtotal(),
                })
                .collect(),
            subtotal: self.subtotal,
            discount: self.discount,
            total: self.total,
            payment_method: self.payment_method,
            status,
            sold_at,
            notes: self.notes.clone(),
        })
    }
}

/// Held for the duration of a submission
#[derive(Debug)]
pub struct SubmitGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for SubmitGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
