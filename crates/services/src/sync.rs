use std::sync::Arc;

use storage::remote::{RemoteDocumentStore, RemoteHistory};
use storage::repository::{HistoryRepository, SettingsRepository};
use tracing::info;

use crate::error::SyncError;

/// How many local summaries a manual sync pushes.
pub const SYNC_PUSH_LIMIT: usize = 5;
/// How many remote summaries a restore pulls.
pub const RESTORE_PULL_LIMIT: usize = 10;

/// A remote document store together with the user whose documents it holds.
#[derive(Clone)]
pub struct RemoteAccount {
    pub store: Arc<dyn RemoteDocumentStore>,
    pub user_id: String,
}

impl RemoteAccount {
    #[must_use]
    pub fn new(store: Arc<dyn RemoteDocumentStore>, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn history(&self) -> RemoteHistory {
        RemoteHistory::new(Arc::clone(&self.store), self.user_id.clone())
    }
}

/// What a sync or restore moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncReport {
    pub sessions: usize,
    pub settings: bool,
}

/// Manual transfers of history and settings between local storage and a remote account.
#[derive(Clone)]
pub struct SyncService {
    local_history: Arc<dyn HistoryRepository>,
    local_settings: Arc<dyn SettingsRepository>,
    remote: Option<RemoteAccount>,
}

impl SyncService {
    #[must_use]
    pub fn new(
        local_history: Arc<dyn HistoryRepository>,
        local_settings: Arc<dyn SettingsRepository>,
        remote: Option<&RemoteAccount>,
    ) -> Self {
        Self {
            local_history,
            local_settings,
            remote: remote.cloned(),
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.remote.is_some()
    }

    /// Push stored settings and the most recent local summaries to the remote store.
    ///
    /// Settings are pushed only when some were saved locally.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::NoRemote` without an account, or `SyncError::Storage` when a
    /// read or write fails.
    pub async fn sync_local_to_remote(&self) -> Result<SyncReport, SyncError> {
        let account = self.remote.as_ref().ok_or(SyncError::NoRemote)?;
        let mut report = SyncReport::default();

        if let Some(settings) = self.local_settings.get_settings().await? {
            account.store.put_settings(&account.user_id, &settings).await?;
            report.settings = true;
        }

        let remote = account.history();
        let recent = self.local_history.list(SYNC_PUSH_LIMIT).await?;
        for summary in &recent {
            remote.append(summary).await?;
        }
        report.sessions = recent.len();

        info!(
            count = report.sessions,
            settings = report.settings,
            user = %account.user_id,
            "pushed local data"
        );
        Ok(report)
    }

    /// Overwrite local settings and history with the remote copies.
    ///
    /// Missing remote settings or an empty remote history leave the local side
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::NoRemote` without an account, or `SyncError::Storage` when a
    /// read or write fails.
    pub async fn restore_remote_to_local(&self) -> Result<SyncReport, SyncError> {
        let account = self.remote.as_ref().ok_or(SyncError::NoRemote)?;
        let mut report = SyncReport::default();

        if let Some(settings) = account.store.get_settings(&account.user_id).await? {
            self.local_settings.save_settings(&settings).await?;
            report.settings = true;
        }

        let pulled = account.history().list(RESTORE_PULL_LIMIT).await?;
        if !pulled.is_empty() {
            self.local_history.replace_all(&pulled).await?;
            report.sessions = pulled.len();
        }

        info!(
            count = report.sessions,
            settings = report.settings,
            user = %account.user_id,
            "restored remote data"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drill_core::model::{
        OperationConfig, OperationKind, PracticeSettings, SessionCounters, SessionLength,
        SessionSummary, SummaryId, SummarySettings, TerminationReason,
    };
    use drill_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use storage::remote::InMemoryRemote;
    use storage::repository::Storage;

    fn summary(rng: &mut StdRng, minute: i64) -> SessionSummary {
        let started = fixed_now() + chrono::Duration::minutes(minute);
        SessionSummary::from_counters(
            SummaryId::random(rng),
            started,
            started + chrono::Duration::seconds(30),
            SummarySettings {
                skills: vec![OperationKind::PercentOf],
                length_sec: SessionLength::Short,
                termination_reason: TerminationReason::Exit,
            },
            &SessionCounters::default(),
        )
        .unwrap()
    }

    fn account() -> RemoteAccount {
        RemoteAccount::new(Arc::new(InMemoryRemote::new()), "ada")
    }

    fn sync_over(storage: &Storage, account: Option<&RemoteAccount>) -> SyncService {
        SyncService::new(
            Arc::clone(&storage.history),
            Arc::clone(&storage.settings),
            account,
        )
    }

    #[tokio::test]
    async fn without_account_sync_is_rejected() {
        let sync = sync_over(&Storage::in_memory(), None);
        assert!(!sync.enabled());
        assert!(matches!(
            sync.sync_local_to_remote().await,
            Err(SyncError::NoRemote)
        ));
    }

    #[tokio::test]
    async fn pushes_five_most_recent() {
        let storage = Storage::in_memory();
        let local = Arc::clone(&storage.history);
        let mut rng = StdRng::seed_from_u64(41);
        let all: Vec<_> = (0..8).map(|i| summary(&mut rng, i)).collect();
        for s in &all {
            local.append(s).await.unwrap();
        }
        let account = account();
        let sync = sync_over(&storage, Some(&account));

        let report = sync.sync_local_to_remote().await.unwrap();
        assert_eq!(report.sessions, SYNC_PUSH_LIMIT);
        assert!(!report.settings);
        assert!(account.store.get_settings("ada").await.unwrap().is_none());
        let remote = account.history().list(10).await.unwrap();
        assert_eq!(remote.len(), SYNC_PUSH_LIMIT);
        assert_eq!(remote[0].id(), all[7].id());
        assert_eq!(remote[4].id(), all[3].id());
    }

    #[tokio::test]
    async fn restore_replaces_local_only_when_remote_has_data() {
        let storage = Storage::in_memory();
        let local = Arc::clone(&storage.history);
        let mut rng = StdRng::seed_from_u64(42);
        let kept = summary(&mut rng, 0);
        local.append(&kept).await.unwrap();
        let account = account();
        let sync = sync_over(&storage, Some(&account));

        assert_eq!(
            sync.restore_remote_to_local().await.unwrap(),
            SyncReport::default()
        );
        assert!(storage.settings.get_settings().await.unwrap().is_none());
        assert_eq!(local.list(10).await.unwrap(), vec![kept]);

        let remote = account.history();
        let pulled: Vec<_> = (1..=12).map(|i| summary(&mut rng, i)).collect();
        for s in &pulled {
            remote.append(s).await.unwrap();
        }
        let report = sync.restore_remote_to_local().await.unwrap();
        assert_eq!(report.sessions, RESTORE_PULL_LIMIT);
        let restored = local.list(10).await.unwrap();
        assert_eq!(restored.len(), 10);
        assert_eq!(restored[0].id(), pulled[11].id());
        assert_eq!(local.latest().await.unwrap().map(|s| s.id()), Some(pulled[11].id()));
    }

    #[tokio::test]
    async fn settings_travel_both_ways() {
        let account = account();
        let laptop = Storage::in_memory();
        let chosen = PracticeSettings::new(
            OperationConfig::only(&[OperationKind::Subtraction]),
            SessionLength::Long,
        );
        laptop.settings.save_settings(&chosen).await.unwrap();

        let report = sync_over(&laptop, Some(&account))
            .sync_local_to_remote()
            .await
            .unwrap();
        assert_eq!(report, SyncReport { sessions: 0, settings: true });

        let phone = Storage::in_memory();
        let report = sync_over(&phone, Some(&account))
            .restore_remote_to_local()
            .await
            .unwrap();
        assert_eq!(report, SyncReport { sessions: 0, settings: true });
        assert_eq!(phone.settings.get_settings().await.unwrap(), Some(chosen));
    }
}
