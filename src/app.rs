//! Wiring of the native backends into the core services.

use anyhow::Result;
use std::sync::Arc;

use solace_core::generator::Generator;
use solace_core::journal::JournalCoordinator;
use solace_core::presenter::{NullPresenter, Presenter};
use solace_core::session::SessionEngine;
use solace_core::settings::Settings;

use crate::config::Config;
use crate::gemini::create_generator;
use crate::settings_file::FileSettings;
use crate::sqlite_store::SqliteStore;

/// Everything a command needs, built from one [`Config`].
pub struct AppContext {
    pub config: Config,
    pub store: Arc<SqliteStore>,
    pub settings: Settings,
    pub generator: Arc<dyn Generator>,
}

impl AppContext {
    /// Open settings and build the generator. The database itself is opened
    /// lazily by the first store operation.
    pub fn open(config: &Config) -> Result<Self> {
        let settings = Settings::new(Arc::new(FileSettings::open(&config.settings.path)?));
        let generator = create_generator(&config.generator, settings.clone())?;
        Ok(Self {
            config: config.clone(),
            store: Arc::new(SqliteStore::new(&config.db.path)),
            settings,
            generator,
        })
    }

    pub fn journal(&self) -> JournalCoordinator {
        JournalCoordinator::new(self.store.clone(), Arc::new(NullPresenter))
    }

    pub fn session(&self, presenter: Arc<dyn Presenter>) -> SessionEngine {
        SessionEngine::new(
            self.store.clone(),
            self.generator.clone(),
            self.settings.clone(),
            presenter,
        )
        .with_fallback(self.config.session.fallback)
    }
}
