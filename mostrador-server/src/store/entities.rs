//! Collection bindings for the shared models

use shared::models::{
    BusinessProfile, BusinessProfileUpdate, Category, CategoryUpdate, Client, ClientUpdate,
    Expense, ExpenseUpdate, Product, ProductUpdate, Sale, SaleUpdate,
};

use super::{Entity, Patch};

macro_rules! set_if_some {
    ($target:ident, $patch:ident, $($field:ident),+ $(,)?) => {
        $(
            if let Some(v) = &$patch.$field {
                $target.$field = v.clone();
            }
        )+
    };
}

macro_rules! set_option_if_some {
    ($target:ident, $patch:ident, $($field:ident),+ $(,)?) => {
        $(
            if let Some(v) = &$patch.$field {
                $target.$field = Some(v.clone());
            }
        )+
    };
}

impl Entity for Product {
    const COLLECTION: &'static str = "productos";
    const LABEL: &'static str = "Product";
    type Patch = ProductUpdate;

    fn id(&self) -> i64 {
        self.id
    }
    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl Patch<Product> for ProductUpdate {
    fn apply_to(&self, target: &mut Product) {
        set_if_some!(target, self, name, sale_price, cost_price, stock, min_stock, is_active, updated_at);
        set_option_if_some!(target, self, description);
        if let Some(category_id) = self.category_id {
            target.category_id = Some(category_id);
            target.legacy_category = None;
        }
    }
}

impl Entity for Category {
    const COLLECTION: &'static str = "categorias";
    const LABEL: &'static str = "Category";
    type Patch = CategoryUpdate;

    fn id(&self) -> i64 {
        self.id
    }
    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl Patch<Category> for CategoryUpdate {
    fn apply_to(&self, target: &mut Category) {
        set_if_some!(target, self, name, is_active, sort_order);
        set_option_if_some!(target, self, description, color, icon);
    }
}

impl Entity for Client {
    const COLLECTION: &'static str = "clientes";
    const LABEL: &'static str = "Client";
    const DATE_FIELD: Option<&'static str> = Some("registered_at");
    type Patch = ClientUpdate;

    fn id(&self) -> i64 {
        self.id
    }
    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
    fn date_millis(&self) -> Option<i64> {
        Some(self.registered_at)
    }
}

impl Patch<Client> for ClientUpdate {
    fn apply_to(&self, target: &mut Client) {
        set_if_some!(target, self, name, address, status);
        set_option_if_some!(target, self, email, phone, notes);
    }
}

impl Entity for Sale {
    const COLLECTION: &'static str = "ventas";
    const LABEL: &'static str = "Sale";
    const DATE_FIELD: Option<&'static str> = Some("sold_at");
    type Patch = SaleUpdate;

    fn id(&self) -> i64 {
        self.id
    }
    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
    fn date_millis(&self) -> Option<i64> {
        Some(self.sold_at)
    }
}

impl Patch<Sale> for SaleUpdate {
    fn apply_to(&self, target: &mut Sale) {
        set_if_some!(target, self, status);
        set_option_if_some!(target, self, notes);
    }
}

impl Entity for Expense {
    const COLLECTION: &'static str = "egresos";
    const LABEL: &'static str = "Expense";
    const DATE_FIELD: Option<&'static str> = Some("spent_at");
    type Patch = ExpenseUpdate;

    fn id(&self) -> i64 {
        self.id
    }
    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
    fn date_millis(&self) -> Option<i64> {
        Some(self.spent_at)
    }
}

impl Patch<Expense> for ExpenseUpdate {
    fn apply_to(&self, target: &mut Expense) {
        set_if_some!(target, self, description, category, amount, payment_method, spent_at);
        set_option_if_some!(target, self, payee, notes);
    }
}

impl Entity for BusinessProfile {
    const COLLECTION: &'static str = "configuracion";
    const LABEL: &'static str = "Business profile";
    type Patch = BusinessProfileUpdate;

    fn id(&self) -> i64 {
        self.id
    }
    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

impl Patch<BusinessProfile> for BusinessProfileUpdate {
    fn apply_to(&self, target: &mut BusinessProfile) {
        set_if_some!(
            target,
            self,
            name,
            address,
            currency,
            tax_rate,
            max_discount,
            low_stock_threshold,
            notify_low_stock,
            notify_daily_summary,
            notify_new_sale,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::SaleStatus;

    #[test]
    fn test_product_patch_resolves_legacy_category() {
        let mut product = Product {
            id: 1,
            name: "Mate".into(),
            description: None,
            category_id: None,
            legacy_category: Some("Bazar".into()),
            sale_price: 10.0,
            cost_price: 4.0,
            stock: 3,
            min_stock: 1,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        };
        let patch = ProductUpdate {
            category_id: Some(9),
            stock: Some(8),
            description: Some("calabaza".into()),
            ..Default::default()
        };
        patch.apply_to(&mut product);
        assert_eq!(product.category_id, Some(9));
        assert!(product.legacy_category.is_none());
        assert_eq!(product.stock, 8);
        assert_eq!(product.description.as_deref(), Some("calabaza"));
        assert_eq!(product.name, "Mate");
    }

    #[test]
    fn test_sale_patch_only_touches_status_and_notes() {
        let mut sale = Sale {
            id: 3,
            client_id: None,
            customer_name: None,
            lines: vec![],
            subtotal: 10.0,
            discount: 0.0,
            total: 10.0,
            payment_method: Default::default(),
            status: SaleStatus::Pending,
            sold_at: 5,
            notes: None,
        };
        SaleUpdate {
            status: Some(SaleStatus::Completed),
            notes: None,
        }
        .apply_to(&mut sale);
        assert_eq!(sale.status, SaleStatus::Completed);
        assert_eq!(sale.total, 10.0);
        assert_eq!(sale.date_millis(), Some(5));
    }
}
