//! Expense service

use shared::error::ErrorCode;
use shared::models::{Expense, ExpenseCreate, ExpenseUpdate};

use crate::store::EntityStore;
use crate::utils::time::TimeWindow;
use crate::utils::validation::{MAX_NAME_LEN, require_finite, validate_payload, validate_required_text};
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct ExpenseService {
    store: EntityStore,
}

impl ExpenseService {
    pub fn new(store: EntityStore) -> Self {
        Self { store }
    }

    /// Newest first; restricted to `window` when given
    pub async fn list(&self, window: Option<TimeWindow>) -> AppResult<Vec<Expense>> {
        let mut expenses = match window {
            Some(w) => self.store.expenses.list_between(w.start_ms, w.end_ms).await?,
            None => self.store.expenses.list().await?,
        };
        expenses.sort_by(|a, b| b.spent_at.cmp(&a.spent_at));
        Ok(expenses)
    }

    pub async fn get(&self, id: i64) -> AppResult<Expense> {
        self.store.expenses.get(id).await?.ok_or_else(|| {
            AppError::with_message(ErrorCode::ExpenseNotFound, format!("Expense {id} not found"))
        })
    }

    fn check_amount(amount: f64) -> AppResult<()> {
        require_finite(amount, "amount")?;
        if amount <= 0.0 {
            return Err(AppError::with_message(
                ErrorCode::ExpenseInvalidAmount,
                format!("Expense amount must be positive, got {amount}"),
            ));
        }
        Ok(())
    }

    pub async fn create(&self, payload: ExpenseCreate) -> AppResult<Expense> {
        Self::check_amount(payload.amount)?;
        validate_payload(&payload)?;
        validate_required_text(&payload.description, "description", MAX_NAME_LEN)?;
        validate_required_text(&payload.category, "category", MAX_NAME_LEN)?;

        let expense = Expense {
            id: 0,
            description: payload.description.trim().to_string(),
            category: payload.category.trim().to_string(),
            amount: payload.amount,
            payee: payload.payee,
            payment_method: payload.payment_method,
            spent_at: payload.spent_at,
            notes: payload.notes,
        };
        let created = self.store.expenses.create(expense).await?;
        tracing::info!(expense_id = created.id, amount = created.amount, "Expense created");
        Ok(created)
    }

    pub async fn update(&self, id: i64, payload: ExpenseUpdate) -> AppResult<Expense> {
        if let Some(amount) = payload.amount {
            Self::check_amount(amount)?;
        }
        validate_payload(&payload)?;
        self.get(id).await?;
        let updated = self.store.expenses.update(id, payload).await?;
        tracing::info!(expense_id = id, "Expense updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.store.expenses.delete(id).await? {
            return Err(AppError::with_message(
                ErrorCode::ExpenseNotFound,
                format!("Expense {id} not found"),
            ));
        }
        tracing::info!(expense_id = id, "Expense deleted");
        Ok(())
    }
}
