//! Catalog service - products and categories
//!
//! Products reference categories by id. Records that still carry the old
//! category name (`legacy_category`) are resolved against the category list
//! when the catalog is read, and the resolved id is written back.

use shared::error::ErrorCode;
use shared::models::{
    Category, CategoryCreate, CategoryUpdate, Product, ProductCreate, ProductUpdate,
};

use super::SettingsService;
use crate::metrics::resolve_category;
use crate::store::EntityStore;
use crate::utils::validation::{MAX_NAME_LEN, require_price, validate_payload, validate_required_text};
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct CatalogService {
    store: EntityStore,
}

impl CatalogService {
    pub fn new(store: EntityStore) -> Self {
        Self { store }
    }

    // =========================================================================
    // Products
    // =========================================================================

    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        let mut products = self.store.products.list().await?;
        if products.iter().any(|p| p.category_id.is_none() && p.legacy_category.is_some()) {
            let categories = self.store.categories.list().await?;
            for product in products.iter_mut() {
                self.migrate_legacy_category(product, &categories).await;
            }
        }
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn migrate_legacy_category(&self, product: &mut Product, categories: &[Category]) {
        if product.category_id.is_some() || product.legacy_category.is_none() {
            return;
        }
        let Some(category_id) = resolve_category(product, categories) else {
            return;
        };
        let patch = ProductUpdate {
            category_id: Some(category_id),
            ..Default::default()
        };
        match self.store.products.update(product.id, patch).await {
            Ok(updated) => *product = updated,
            Err(e) => {
                tracing::warn!(product_id = product.id, error = %e, "Failed to migrate legacy category");
                product.category_id = Some(category_id);
            }
        }
    }

    pub async fn get_product(&self, id: i64) -> AppResult<Product> {
        self.store.products.get(id).await?.ok_or_else(|| {
            AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found"))
        })
    }

    pub async fn create_product(&self, payload: ProductCreate, now: i64) -> AppResult<Product> {
        validate_payload(&payload)?;
        validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
        require_price(payload.sale_price, "sale_price")?;
        require_price(payload.cost_price, "cost_price")?;
        if let Some(category_id) = payload.category_id {
            self.get_category(category_id).await?;
        }

        let product = Product {
            id: 0,
            name: payload.name.trim().to_string(),
            description: payload.description,
            category_id: payload.category_id,
            legacy_category: None,
            sale_price: payload.sale_price,
            cost_price: payload.cost_price,
            stock: payload.stock,
            min_stock: payload.min_stock,
            is_active: payload.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        };
        let created = self.store.products.create(product).await?;
        tracing::info!(product_id = created.id, name = %created.name, "Product created");
        Ok(created)
    }

    pub async fn update_product(
        &self,
        id: i64,
        mut payload: ProductUpdate,
        now: i64,
    ) -> AppResult<Product> {
        validate_payload(&payload)?;
        if let Some(name) = &payload.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        for (value, field) in [
            (payload.sale_price, "sale_price"),
            (payload.cost_price, "cost_price"),
        ] {
            if let Some(v) = value {
                require_price(v, field)?;
            }
        }
        if let Some(category_id) = payload.category_id {
            self.get_category(category_id).await?;
        }
        self.get_product(id).await?;

        payload.updated_at = Some(now);
        let updated = self.store.products.update(id, payload).await?;
        tracing::info!(product_id = id, "Product updated");
        Ok(updated)
    }

    pub async fn delete_product(&self, id: i64) -> AppResult<()> {
        if !self.store.products.delete(id).await? {
            return Err(AppError::with_message(
                ErrorCode::ProductNotFound,
                format!("Product {id} not found"),
            ));
        }
        tracing::info!(product_id = id, "Product deleted");
        Ok(())
    }

    /// Active products at or below their minimum stock, out-of-stock ones
    /// included, lowest stock first.
    pub async fn low_stock(&self) -> AppResult<Vec<Product>> {
        let threshold = SettingsService::new(self.store.clone())
            .low_stock_threshold()
            .await;
        let mut products: Vec<Product> = self
            .store
            .products
            .list()
            .await?
            .into_iter()
            .filter(|p| p.is_active && (p.is_out_of_stock() || p.is_low_stock(threshold)))
            .collect();
        products.sort_by(|a, b| a.stock.cmp(&b.stock).then_with(|| a.name.cmp(&b.name)));
        Ok(products)
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        let mut categories = self.store.categories.list().await?;
        categories.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
        Ok(categories)
    }

    pub async fn get_category(&self, id: i64) -> AppResult<Category> {
        self.store.categories.get(id).await?.ok_or_else(|| {
            AppError::with_message(ErrorCode::CategoryNotFound, format!("Category {id} not found"))
        })
    }

    async fn ensure_unique_name(&self, name: &str, exclude_id: Option<i64>) -> AppResult<()> {
        let wanted = name.trim().to_lowercase();
        let taken = self
            .store
            .categories
            .list()
            .await?
            .iter()
            .any(|c| Some(c.id) != exclude_id && c.name.trim().to_lowercase() == wanted);
        if taken {
            return Err(AppError::with_message(
                ErrorCode::CategoryNameExists,
                format!("Category '{}' already exists", name.trim()),
            ));
        }
        Ok(())
    }

    pub async fn create_category(&self, payload: CategoryCreate) -> AppResult<Category> {
        validate_payload(&payload)?;
        validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
        self.ensure_unique_name(&payload.name, None).await?;

        let category = Category {
            id: 0,
            name: payload.name.trim().to_string(),
            description: payload.description,
            color: payload.color,
            icon: payload.icon,
            is_active: true,
            sort_order: payload.sort_order.unwrap_or(0),
        };
        let created = self.store.categories.create(category).await?;
        tracing::info!(category_id = created.id, name = %created.name, "Category created");
        Ok(created)
    }

    pub async fn update_category(&self, id: i64, payload: CategoryUpdate) -> AppResult<Category> {
        validate_payload(&payload)?;
        self.get_category(id).await?;
        if let Some(name) = &payload.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
            self.ensure_unique_name(name, Some(id)).await?;
        }
        let updated = self.store.categories.update(id, payload).await?;
        tracing::info!(category_id = id, "Category updated");
        Ok(updated)
    }

    /// Categories still referenced by a product cannot be deleted
    pub async fn delete_category(&self, id: i64) -> AppResult<()> {
        let category = self.get_category(id).await?;
        let categories = [category];
        let in_use = self
            .store
            .products
            .list()
            .await?
            .iter()
            .filter(|p| resolve_category(p, &categories) == Some(id))
            .count();
        if in_use > 0 {
            return Err(AppError::with_message(
                ErrorCode::CategoryHasProducts,
                format!("Category has {in_use} product(s)"),
            )
            .with_detail("product_count", in_use));
        }
        self.store.categories.delete(id).await?;
        tracing::info!(category_id = id, "Category deleted");
        Ok(())
    }
}
