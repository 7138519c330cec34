use std::sync::Arc;

use storage::repository::{HistoryRepository, Storage};

use crate::Clock;
use crate::error::AppServicesError;
use crate::history_service::HistoryService;
use crate::practice_service::PracticeService;
use crate::settings_service::SettingsService;
use crate::sync::{RemoteAccount, SyncService};

/// Assembles app-facing services over one storage backend and an optional remote account.
#[derive(Clone)]
pub struct AppServices {
    settings: Arc<SettingsService>,
    history: Arc<HistoryService>,
    practice: Arc<PracticeService>,
    sync: Arc<SyncService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        remote: Option<RemoteAccount>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, remote))
    }

    #[must_use]
    pub fn in_memory(clock: Clock, remote: Option<RemoteAccount>) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, remote)
    }

    /// Wire services over existing storage.
    ///
    /// History reads go to the local store, which holds the last played session even
    /// when its remote copy failed. The remote account is read only while the local
    /// history is empty or unreadable.
    #[must_use]
    pub fn from_storage(storage: &Storage, clock: Clock, remote: Option<RemoteAccount>) -> Self {
        let settings = Arc::new(SettingsService::new(Arc::clone(&storage.settings)));

        let mut sources: Vec<Arc<dyn HistoryRepository>> = vec![Arc::clone(&storage.history)];
        if let Some(account) = &remote {
            sources.push(Arc::new(account.history()));
        }
        let history = Arc::new(HistoryService::new(sources, clock));

        let sync = Arc::new(SyncService::new(
            Arc::clone(&storage.history),
            Arc::clone(&storage.settings),
            remote.as_ref(),
        ));
        let practice = Arc::new(PracticeService::new(
            clock,
            Arc::clone(&settings),
            Arc::clone(&storage.history),
            remote,
        ));

        Self {
            settings,
            history,
            practice,
            sync,
        }
    }

    #[must_use]
    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings)
    }

    #[must_use]
    pub fn history(&self) -> Arc<HistoryService> {
        Arc::clone(&self.history)
    }

    #[must_use]
    pub fn practice(&self) -> Arc<PracticeService> {
        Arc::clone(&self.practice)
    }

    #[must_use]
    pub fn sync(&self) -> Arc<SyncService> {
        Arc::clone(&self.sync)
    }
}
