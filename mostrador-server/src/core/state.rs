use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::core::config::StoreBackend;
use crate::core::{Config, Result};
use crate::services::{
    CatalogService, ClientService, ExpenseService, ReportOptions, ReportService, SalesService,
    SettingsService,
};
use crate::store::{EntityStore, LocalStore, RemoteStore};

/// Server state - shared handles to everything a request needs
///
/// Cloning is cheap: every field is an `Arc` or a handle.
///
/// # Fields
///
/// | Field | Type | Meaning |
/// |-------|------|---------|
/// | config | Config | configuration (immutable) |
/// | store | EntityStore | per-entity repositories |
/// | shutdown | CancellationToken | cancelled on shutdown, aborts pending loads |
/// | stock_lock | Arc<Mutex<()>> | serializes stock-changing writes |
/// | started_at | Instant | process start, for uptime |
///
/// # Example
///
/// ```ignore
/// let state = ServerState::initialize(&config)?;
/// let metrics = state.reports().dashboard(now_millis()).await;
/// ```
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub store: EntityStore,
    pub shutdown: CancellationToken,
    pub stock_lock: Arc<Mutex<()>>,
    pub started_at: Instant,
}

impl ServerState {
    /// Open the configured backend
    ///
    /// The local backend creates `WORK_DIR` when missing.
    pub fn initialize(config: &Config) -> Result<Self> {
        let store = match &config.backend {
            StoreBackend::Local => {
                std::fs::create_dir_all(&config.work_dir)?;
                let local = LocalStore::open(&config.database_path)?;
                tracing::info!(path = %config.database_path.display(), "Local store opened");
                EntityStore::from_backend(local)
            }
            StoreBackend::Remote { url, api_key } => {
                let remote = RemoteStore::new(
                    url,
                    api_key,
                    Duration::from_millis(config.request_timeout_ms),
                )?;
                tracing::info!(url = %remote.base_url(), "Remote store configured");
                EntityStore::from_backend(remote)
            }
        };
        Ok(Self::with_store(config.clone(), store))
    }

    /// Build state around an existing store (tests, embedding)
    pub fn with_store(config: Config, store: EntityStore) -> Self {
        Self {
            config,
            store,
            shutdown: CancellationToken::new(),
            stock_lock: Arc::new(Mutex::new(())),
            started_at: Instant::now(),
        }
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            tz: self.config.timezone,
            locale: self.config.label_locale,
            active_client_window_days: self.config.active_client_window_days,
            top_products_window_days: self.config.top_products_window_days,
        }
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.store.clone())
    }

    pub fn clients(&self) -> ClientService {
        ClientService::new(self.store.clone())
    }

    /// Sales share one stock lock across requests
    pub fn sales(&self) -> SalesService {
        SalesService::new(self.store.clone(), self.stock_lock.clone())
    }

    pub fn expenses(&self) -> ExpenseService {
        ExpenseService::new(self.store.clone())
    }

    pub fn settings(&self) -> SettingsService {
        SettingsService::new(self.store.clone())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(
            self.store.clone(),
            self.shutdown.clone(),
            self.report_options(),
        )
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}
