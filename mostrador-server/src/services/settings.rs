//! Business profile service

use shared::models::{BUSINESS_PROFILE_ID, BusinessProfile, BusinessProfileUpdate};

use crate::store::{EntityStore, RepoError};
use crate::utils::{AppError, AppResult};
use crate::utils::validation::validate_payload;

#[derive(Clone)]
pub struct SettingsService {
    store: EntityStore,
}

impl SettingsService {
    pub fn new(store: EntityStore) -> Self {
        Self { store }
    }

    /// Current profile; a default one is stored on first access
    pub async fn get(&self) -> AppResult<BusinessProfile> {
        if let Some(profile) = self.store.settings.get(BUSINESS_PROFILE_ID).await? {
            return Ok(profile);
        }
        match self.store.settings.create(BusinessProfile::default()).await {
            Ok(profile) => {
                tracing::info!("Business profile initialized with defaults");
                Ok(profile)
            }
            // created concurrently
            Err(RepoError::Duplicate(_)) => self
                .store
                .settings
                .get(BUSINESS_PROFILE_ID)
                .await?
                .ok_or_else(|| AppError::internal("Business profile vanished")),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update(&self, patch: BusinessProfileUpdate) -> AppResult<BusinessProfile> {
        validate_payload(&patch)?;
        self.get().await?;
        let profile = self.store.settings.update(BUSINESS_PROFILE_ID, patch).await?;
        tracing::info!(low_stock_threshold = profile.low_stock_threshold, "Business profile updated");
        Ok(profile)
    }

    /// Low-stock threshold for products without their own minimum.
    /// Read failures fall back to the default profile.
    pub async fn low_stock_threshold(&self) -> i64 {
        match self.get().await {
            Ok(profile) => profile.low_stock_threshold,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read business profile, using default threshold");
                BusinessProfile::default().low_stock_threshold
            }
        }
    }
}
