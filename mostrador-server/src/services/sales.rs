//! Sales service
//!
//! Submitting a sale writes the sale record and then decrements stock
//! product by product. If a stock write fails, the already-applied
//! decrements are restored and the sale record is removed, so a failed
//! submission leaves the store as it was.
//!
//! Stock read-check-write sequences run under one shared lock.

use std::collections::HashMap;
use std::sync::Arc;

use shared::error::ErrorCode;
use shared::models::{Product, ProductUpdate, Sale, SaleCreate, SaleStatus, SaleUpdate};
use shared::util::now_millis;
use tokio::sync::Mutex;

use crate::cart::Cart;
use crate::store::EntityStore;
use crate::utils::time::TimeWindow;
use crate::utils::validation::{require_finite, validate_payload};
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct SalesService {
    store: EntityStore,
    stock_lock: Arc<Mutex<()>>,
}

fn sale_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::SaleNotFound, format!("Sale {id} not found"))
}

fn product_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found"))
}

fn insufficient_stock(product: &Product, requested: i64) -> AppError {
    AppError::with_message(
        ErrorCode::InsufficientStock,
        format!(
            "Only {} unit(s) of {} in stock, {} requested",
            product.stock, product.name, requested
        ),
    )
    .with_detail("product_id", product.id)
    .with_detail("available", product.stock)
    .with_detail("requested", requested)
}

impl SalesService {
    pub fn new(store: EntityStore, stock_lock: Arc<Mutex<()>>) -> Self {
        Self { store, stock_lock }
    }

    /// Newest first; restricted to `window` when given
    pub async fn list(&self, window: Option<TimeWindow>) -> AppResult<Vec<Sale>> {
        let mut sales = match window {
            Some(w) => self.store.sales.list_between(w.start_ms, w.end_ms).await?,
            None => self.store.sales.list().await?,
        };
        sales.sort_by(|a, b| b.sold_at.cmp(&a.sold_at));
        Ok(sales)
    }

    pub async fn get(&self, id: i64) -> AppResult<Sale> {
        self.store
            .sales
            .get(id)
            .await?
            .ok_or_else(|| sale_not_found(id))
    }

    async fn get_product(&self, id: i64) -> AppResult<Product> {
        self.store
            .products
            .get(id)
            .await?
            .ok_or_else(|| product_not_found(id))
    }

    /// Create a sale from an API payload.
    ///
    /// Quantities above the available stock are rejected, never clamped.
    pub async fn create(&self, payload: SaleCreate, now: i64) -> AppResult<Sale> {
        validate_payload(&payload)?;
        require_finite(payload.discount, "discount")?;

        let status = payload.status.unwrap_or_default();
        if !status.counts_as_revenue() {
            return Err(AppError::with_message(
                ErrorCode::SaleInvalidTransition,
                format!("A new sale cannot start as {}", status.as_str()),
            ));
        }
        if let Some(client_id) = payload.client_id {
            if self.store.clients.get(client_id).await?.is_none() {
                return Err(AppError::with_message(
                    ErrorCode::ClientNotFound,
                    format!("Client {client_id} not found"),
                ));
            }
        }

        // merge repeated product ids, keeping first-seen order; a saturated
        // sum still exceeds any stock and is rejected below
        let mut order: Vec<i64> = Vec::new();
        let mut requested: HashMap<i64, i64> = HashMap::new();
        for line in &payload.lines {
            if !requested.contains_key(&line.product_id) {
                order.push(line.product_id);
            }
            let total = requested.entry(line.product_id).or_default();
            *total = total.saturating_add(line.quantity);
        }

        let mut cart = Cart::new();
        for product_id in order {
            let quantity = requested[&product_id];
            let product = self.get_product(product_id).await?;
            if product.is_active && quantity > product.stock {
                return Err(insufficient_stock(&product, quantity));
            }
            cart.add_product(&product)?;
            if cart.set_quantity(product_id, quantity)? != quantity {
                return Err(insufficient_stock(&product, quantity));
            }
        }
        cart.set_discount(payload.discount)?;
        cart.client_id = payload.client_id;
        cart.customer_name = payload.customer_name;
        cart.payment_method = payload.payment_method;
        cart.notes = payload.notes;

        self.submit(&cart, status, payload.sold_at.unwrap_or(now))
            .await
    }

    /// Persist a completed sale from a cart
    pub async fn checkout(&self, cart: &Cart, sold_at: i64) -> AppResult<Sale> {
        self.submit(cart, SaleStatus::Completed, sold_at).await
    }

    async fn submit(&self, cart: &Cart, status: SaleStatus, sold_at: i64) -> AppResult<Sale> {
        let _submit = cart.try_begin_submit()?;
        let sale = cart.to_sale(status, sold_at)?;

        let _stock = self.stock_lock.lock().await;

        // stock may have moved since the cart was filled
        let mut decrements: Vec<(Product, i64)> = Vec::with_capacity(cart.lines().len());
        for line in cart.lines() {
            let product = self.get_product(line.product_id).await?;
            if !product.is_active {
                return Err(AppError::with_message(
                    ErrorCode::ProductInactive,
                    format!("Product is inactive: {}", product.name),
                ));
            }
            if line.quantity > product.stock {
                return Err(insufficient_stock(&product, line.quantity));
            }
            decrements.push((product, line.quantity));
        }

        let created = self.store.sales.create(sale).await?;

        let mut applied: Vec<(i64, i64)> = Vec::with_capacity(decrements.len());
        for (product, quantity) in decrements {
            let patch = ProductUpdate {
                stock: Some(product.stock - quantity),
                updated_at: Some(now_millis()),
                ..Default::default()
            };
            if let Err(e) = self.store.products.update(product.id, patch).await {
                tracing::error!(
                    sale_id = created.id,
                    product_id = product.id,
                    error = %e,
                    "Stock update failed, rolling back sale"
                );
                self.roll_back(created.id, &applied).await;
                return Err(e.into());
            }
            applied.push((product.id, product.stock));
        }

        tracing::info!(
            sale_id = created.id,
            total = created.total,
            lines = created.lines.len(),
            status = created.status.as_str(),
            "Sale submitted"
        );
        Ok(created)
    }

    /// Restore `(product_id, previous_stock)` pairs and drop the sale
    async fn roll_back(&self, sale_id: i64, applied: &[(i64, i64)]) {
        for &(product_id, stock) in applied.iter().rev() {
            let patch = ProductUpdate {
                stock: Some(stock),
                ..Default::default()
            };
            if let Err(e) = self.store.products.update(product_id, patch).await {
                tracing::error!(product_id, error = %e, "Failed to restore stock during rollback");
            }
        }
        if let Err(e) = self.store.sales.delete(sale_id).await {
            tracing::error!(sale_id, error = %e, "Failed to remove sale during rollback");
        }
    }

    /// Add each line's quantity back to its product; returns the applied
    /// `(product_id, previous_stock)` pairs.
    async fn restock(&self, sale: &Sale) -> AppResult<Vec<(i64, i64)>> {
        let mut applied = Vec::new();
        for line in &sale.lines {
            let Some(product_id) = line.product_id else {
                continue;
            };
            let Some(product) = self.store.products.get(product_id).await? else {
                tracing::warn!(sale_id = sale.id, product_id, "Product gone, stock not restored");
                continue;
            };
            let patch = ProductUpdate {
                stock: Some(product.stock.saturating_add(line.quantity)),
                updated_at: Some(now_millis()),
                ..Default::default()
            };
            if let Err(e) = self.store.products.update(product_id, patch).await {
                self.undo_restock(&applied).await;
                return Err(e.into());
            }
            applied.push((product_id, product.stock));
        }
        Ok(applied)
    }

    async fn undo_restock(&self, applied: &[(i64, i64)]) {
        for &(product_id, stock) in applied {
            let patch = ProductUpdate {
                stock: Some(stock),
                ..Default::default()
            };
            if let Err(e) = self.store.products.update(product_id, patch).await {
                tracing::error!(product_id, error = %e, "Failed to undo stock restore");
            }
        }
    }

    /// Move a sale to `next`, enforcing the status transition table.
    /// Cancelling or refunding gives the sold units back to stock.
    pub async fn update_status(&self, id: i64, next: SaleStatus) -> AppResult<Sale> {
        let _stock = self.stock_lock.lock().await;
        let sale = self.get(id).await?;
        if sale.status == next {
            return Ok(sale);
        }
        if !sale.status.can_transition_to(next) {
            return Err(AppError::with_message(
                ErrorCode::SaleInvalidTransition,
                format!(
                    "Cannot change sale from {} to {}",
                    sale.status.as_str(),
                    next.as_str()
                ),
            )
            .with_detail("from", sale.status.as_str())
            .with_detail("to", next.as_str()));
        }

        let restored = if next.restores_stock() && !sale.status.restores_stock() {
            self.restock(&sale).await?
        } else {
            Vec::new()
        };

        let patch = SaleUpdate {
            status: Some(next),
            notes: None,
        };
        match self.store.sales.update(id, patch).await {
            Ok(updated) => {
                tracing::info!(
                    sale_id = id,
                    from = sale.status.as_str(),
                    to = next.as_str(),
                    "Sale status changed"
                );
                Ok(updated)
            }
            Err(e) => {
                self.undo_restock(&restored).await;
                Err(e.into())
            }
        }
    }

    /// Status changes go through [`Self::update_status`]; notes are patched directly
    pub async fn update(&self, id: i64, payload: SaleUpdate) -> AppResult<Sale> {
        validate_payload(&payload)?;
        let mut sale = match payload.status {
            Some(status) => self.update_status(id, status).await?,
            None => self.get(id).await?,
        };
        if payload.notes.is_some() {
            let patch = SaleUpdate {
                status: None,
                notes: payload.notes,
            };
            sale = self.store.sales.update(id, patch).await?;
        }
        Ok(sale)
    }

    /// Deleting a sale that still holds stock gives its units back
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let _stock = self.stock_lock.lock().await;
        let sale = self.get(id).await?;
        let restored = if sale.status.restores_stock() {
            Vec::new()
        } else {
            self.restock(&sale).await?
        };
        match self.store.sales.delete(id).await {
            Ok(true) => {
                tracing::info!(sale_id = id, "Sale deleted");
                Ok(())
            }
            Ok(false) => {
                self.undo_restock(&restored).await;
                Err(sale_not_found(id))
            }
            Err(e) => {
                self.undo_restock(&restored).await;
                Err(e.into())
            }
        }
    }
}
