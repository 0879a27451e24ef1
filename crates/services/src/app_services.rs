use focus_core::catalog::Catalog;
use storage::repository::FocusStore;

use crate::Clock;
use crate::config::FocusConfig;
use crate::error::{AppServicesError, LifecycleError};
use crate::history::HistoryService;
use crate::lifecycle::FocusController;

/// Assembles app-facing services around one store.
#[derive(Clone)]
pub struct AppServices {
    config: FocusConfig,
    clock: Clock,
    store: FocusStore,
    catalog: Catalog,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the
    /// configured character is unknown.
    pub async fn new_sqlite(config: FocusConfig, clock: Clock) -> Result<Self, AppServicesError> {
        let store = FocusStore::sqlite(&config.db_url).await?;
        Self::with_store(config, clock, store)
    }

    /// Build services over a fresh in-memory store.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the configured character is unknown.
    pub fn in_memory(config: FocusConfig, clock: Clock) -> Result<Self, AppServicesError> {
        Self::with_store(config, clock, FocusStore::in_memory())
    }

    fn with_store(
        config: FocusConfig,
        clock: Clock,
        store: FocusStore,
    ) -> Result<Self, AppServicesError> {
        let catalog = Catalog::builtin();
        if catalog.get(&config.character_id).is_none() {
            return Err(LifecycleError::UnknownCharacter(config.character_id.clone()).into());
        }
        Ok(Self {
            config,
            clock,
            store,
            catalog,
        })
    }

    /// A controller loaded from the store with the configured character and timings.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if persisted state cannot be read.
    pub async fn load_controller(&self) -> Result<FocusController, AppServicesError> {
        let mut controller = FocusController::load(
            self.clock,
            self.catalog.clone(),
            self.store.clone(),
            self.config.utc_offset,
        )
        .await?
        .with_timings(self.config.timings);
        controller.select_character(&self.config.character_id)?;
        Ok(controller)
    }

    #[must_use]
    pub fn history(&self) -> HistoryService {
        HistoryService::new(self.store.clone(), self.config.utc_offset)
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn config(&self) -> &FocusConfig {
        &self.config
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }
}
