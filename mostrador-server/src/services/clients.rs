//! Client service

use shared::error::ErrorCode;
use shared::models::{Client, ClientCreate, ClientUpdate};

use crate::store::EntityStore;
use crate::utils::validation::{MAX_NAME_LEN, validate_payload, validate_required_text};
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct ClientService {
    store: EntityStore,
}

fn normalize_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

impl ClientService {
    pub fn new(store: EntityStore) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> AppResult<Vec<Client>> {
        let mut clients = self.store.clients.list().await?;
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    pub async fn get(&self, id: i64) -> AppResult<Client> {
        self.store.clients.get(id).await?.ok_or_else(|| {
            AppError::with_message(ErrorCode::ClientNotFound, format!("Client {id} not found"))
        })
    }

    async fn ensure_unique_email(&self, email: &str, exclude_id: Option<i64>) -> AppResult<()> {
        let taken = self.store.clients.list().await?.iter().any(|c| {
            Some(c.id) != exclude_id
                && c.email
                    .as_deref()
                    .is_some_and(|e| e.trim().eq_ignore_ascii_case(email))
        });
        if taken {
            return Err(AppError::with_message(
                ErrorCode::ClientEmailExists,
                format!("A client with email {email} already exists"),
            ));
        }
        Ok(())
    }

    pub async fn create(&self, payload: ClientCreate, now: i64) -> AppResult<Client> {
        validate_payload(&payload)?;
        validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
        let email = normalize_email(payload.email);
        if let Some(email) = &email {
            self.ensure_unique_email(email, None).await?;
        }

        let client = Client {
            id: 0,
            name: payload.name.trim().to_string(),
            email,
            phone: payload.phone,
            address: payload.address,
            registered_at: now,
            notes: payload.notes,
            status: payload.status.unwrap_or_default(),
        };
        let created = self.store.clients.create(client).await?;
        tracing::info!(client_id = created.id, "Client created");
        Ok(created)
    }

    pub async fn update(&self, id: i64, mut payload: ClientUpdate) -> AppResult<Client> {
        validate_payload(&payload)?;
        if let Some(name) = &payload.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        self.get(id).await?;
        payload.email = normalize_email(payload.email);
        if let Some(email) = &payload.email {
            self.ensure_unique_email(email, Some(id)).await?;
        }
        let updated = self.store.clients.update(id, payload).await?;
        tracing::info!(client_id = id, "Client updated");
        Ok(updated)
    }

    /// Past sales keep their `client_id`; reports simply stop resolving it
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        if !self.store.clients.delete(id).await? {
            return Err(AppError::with_message(
                ErrorCode::ClientNotFound,
                format!("Client {id} not found"),
            ));
        }
        tracing::info!(client_id = id, "Client deleted");
        Ok(())
    }
}
