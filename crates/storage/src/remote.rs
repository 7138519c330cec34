use async_trait::async_trait;
use drill_core::model::{PracticeSettings, SessionSummary, SummaryId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::repository::{HistoryRepository, StorageError};

/// Per-user document store: one document per session, keyed by summary id, plus one
/// settings document.
#[async_trait]
pub trait RemoteDocumentStore: Send + Sync {
    /// Create or overwrite the document for `summary`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be written.
    async fn put_session(
        &self,
        user_id: &str,
        summary: &SessionSummary,
    ) -> Result<(), StorageError>;

    /// Up to `limit` sessions for the user, newest `startedAt` first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the documents cannot be read.
    async fn list_sessions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<SessionSummary>, StorageError>;

    /// Create or overwrite the user's settings document.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be written.
    async fn put_settings(
        &self,
        user_id: &str,
        settings: &PracticeSettings,
    ) -> Result<(), StorageError>;

    /// The user's settings document, if one was ever written.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the document cannot be read.
    async fn get_settings(
        &self,
        user_id: &str,
    ) -> Result<Option<PracticeSettings>, StorageError>;
}

#[derive(Default)]
struct UserDocuments {
    sessions: HashMap<SummaryId, SessionSummary>,
    settings: Option<PracticeSettings>,
}

/// In-memory document store for tests and offline runs.
#[derive(Clone, Default)]
pub struct InMemoryRemote {
    users: Arc<Mutex<HashMap<String, UserDocuments>>>,
}

impl InMemoryRemote {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RemoteDocumentStore for InMemoryRemote {
    async fn put_session(
        &self,
        user_id: &str,
        summary: &SessionSummary,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .entry(user_id.to_owned())
            .or_default()
            .sessions
            .insert(summary.id(), summary.clone());
        Ok(())
    }

    async fn list_sessions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<SessionSummary>, StorageError> {
        let guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut sessions: Vec<_> = guard
            .get(user_id)
            .map(|docs| docs.sessions.values().cloned().collect())
            .unwrap_or_default();
        sessions.sort_by(|a, b| b.started_at().cmp(&a.started_at()));
        sessions.truncate(limit);
        Ok(sessions)
    }

    async fn put_settings(
        &self,
        user_id: &str,
        settings: &PracticeSettings,
    ) -> Result<(), StorageError> {
        let mut guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.entry(user_id.to_owned()).or_default().settings = Some(settings.clone());
        Ok(())
    }

    async fn get_settings(
        &self,
        user_id: &str,
    ) -> Result<Option<PracticeSettings>, StorageError> {
        let guard = self
            .users
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(user_id).and_then(|docs| docs.settings.clone()))
    }
}

/// One user's remote documents seen as a history source.
#[derive(Clone)]
pub struct RemoteHistory {
    store: Arc<dyn RemoteDocumentStore>,
    user_id: String,
}

impl RemoteHistory {
    #[must_use]
    pub fn new(store: Arc<dyn RemoteDocumentStore>, user_id: impl Into<String>) -> Self {
        Self {
            store,
            user_id: user_id.into(),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[async_trait]
impl HistoryRepository for RemoteHistory {
    async fn append(&self, summary: &SessionSummary) -> Result<(), StorageError> {
        self.store.put_session(&self.user_id, summary).await
    }

    async fn list(&self, limit: usize) -> Result<Vec<SessionSummary>, StorageError> {
        self.store.list_sessions(&self.user_id, limit).await
    }

    async fn latest(&self) -> Result<Option<SessionSummary>, StorageError> {
        Ok(self.list(1).await?.into_iter().next())
    }

    /// Documents are keyed by id, so replacing upserts each summary.
    async fn replace_all(&self, summaries: &[SessionSummary]) -> Result<(), StorageError> {
        for summary in summaries {
            self.store.put_session(&self.user_id, summary).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drill_core::model::{
        OperationKind, SessionCounters, SessionLength, SummarySettings, TerminationReason,
    };
    use drill_core::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn summary(rng: &mut StdRng, minute: i64) -> SessionSummary {
        let started = fixed_now() + chrono::Duration::minutes(minute);
        SessionSummary::from_counters(
            SummaryId::random(rng),
            started,
            started,
            SummarySettings {
                skills: vec![OperationKind::Addition],
                length_sec: SessionLength::Standard,
                termination_reason: TerminationReason::Exit,
            },
            &SessionCounters::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn lists_newest_first_per_user() {
        let remote = InMemoryRemote::new();
        let mut rng = StdRng::seed_from_u64(31);
        let old = summary(&mut rng, 0);
        let new = summary(&mut rng, 10);
        remote.put_session("ada", &old).await.unwrap();
        remote.put_session("ada", &new).await.unwrap();
        remote.put_session("bob", &summary(&mut rng, 5)).await.unwrap();

        let listed = remote.list_sessions("ada", 10).await.unwrap();
        assert_eq!(listed, vec![new, old]);
        assert!(remote.list_sessions("nobody", 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn put_is_idempotent_per_id() {
        let remote = InMemoryRemote::new();
        let mut rng = StdRng::seed_from_u64(32);
        let s = summary(&mut rng, 0);
        remote.put_session("ada", &s).await.unwrap();
        remote.put_session("ada", &s).await.unwrap();
        assert_eq!(remote.list_sessions("ada", 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn settings_document_is_per_user() {
        use drill_core::model::OperationConfig;

        let remote = InMemoryRemote::new();
        assert!(remote.get_settings("ada").await.unwrap().is_none());

        let settings = PracticeSettings::new(
            OperationConfig::only(&[OperationKind::Division]),
            SessionLength::Long,
        );
        remote.put_settings("ada", &settings).await.unwrap();
        assert_eq!(remote.get_settings("ada").await.unwrap(), Some(settings));
        assert!(remote.get_settings("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn remote_history_reads_through_store() {
        let store: Arc<dyn RemoteDocumentStore> = Arc::new(InMemoryRemote::new());
        let history = RemoteHistory::new(Arc::clone(&store), "ada");
        let mut rng = StdRng::seed_from_u64(33);
        assert!(history.latest().await.unwrap().is_none());

        let a = summary(&mut rng, 1);
        let b = summary(&mut rng, 2);
        history.replace_all(&[a.clone(), b.clone()]).await.unwrap();
        assert_eq!(history.latest().await.unwrap(), Some(b));
        assert_eq!(history.list(10).await.unwrap().len(), 2);
    }
}
