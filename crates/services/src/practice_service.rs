use std::sync::Arc;

use drill_core::model::SessionSummary;
use drill_core::{Clock, PracticeSession, ProblemSynthesizer};
use storage::repository::HistoryRepository;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::settings_service::SettingsService;
use crate::sync::RemoteAccount;

/// What happened to a finished session's summary.
#[derive(Debug)]
pub struct Recorded {
    pub saved_locally: bool,
    /// Background remote write, when an account is configured.
    pub mirror: Option<JoinHandle<()>>,
}

/// Starts sessions from stored settings and records their summaries.
#[derive(Clone)]
pub struct PracticeService {
    clock: Clock,
    settings: Arc<SettingsService>,
    local: Arc<dyn HistoryRepository>,
    remote: Option<RemoteAccount>,
}

impl PracticeService {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: Arc<SettingsService>,
        local: Arc<dyn HistoryRepository>,
        remote: Option<RemoteAccount>,
    ) -> Self {
        Self {
            clock,
            settings,
            local,
            remote,
        }
    }

    /// Start a session with the stored settings and an OS-seeded problem stream.
    pub async fn start(&self) -> PracticeSession {
        let settings = self.settings.load().await;
        info!(
            length = settings.length().secs(),
            kinds = settings.operations().effective_kinds().len(),
            "session started"
        );
        let synthesizer = ProblemSynthesizer::from_os_rng(settings.operations().clone());
        PracticeSession::start(&settings, synthesizer, self.clock)
    }

    /// Start a session whose problems replay for a given seed.
    pub async fn start_seeded(&self, seed: u64) -> PracticeSession {
        let settings = self.settings.load().await;
        PracticeSession::seeded(&settings, seed, self.clock)
    }

    /// Store a finished session's summary.
    ///
    /// The local write is awaited; failures are logged, never returned, so the player
    /// always gets to see the summary. The remote copy is written in the background.
    pub async fn record(&self, summary: &SessionSummary) -> Recorded {
        let saved_locally = match self.local.append(summary).await {
            Ok(()) => true,
            Err(err) => {
                warn!(id = %summary.id(), error = %err, "failed to store session summary");
                false
            }
        };
        info!(
            id = %summary.id(),
            reason = %summary.termination_reason(),
            attempted = summary.totals().attempted,
            accuracy = summary.totals().accuracy_pct,
            "session recorded"
        );

        Recorded {
            saved_locally,
            mirror: self.mirror(summary),
        }
    }

    fn mirror(&self, summary: &SessionSummary) -> Option<JoinHandle<()>> {
        let account = self.remote.as_ref()?;
        let Ok(runtime) = Handle::try_current() else {
            warn!("no async runtime available, skipping remote copy");
            return None;
        };

        let store = Arc::clone(&account.store);
        let user_id = account.user_id.clone();
        let summary = summary.clone();
        Some(runtime.spawn(async move {
            match store.put_session(&user_id, &summary).await {
                Ok(()) => debug!(id = %summary.id(), "remote copy stored"),
                Err(err) => warn!(id = %summary.id(), error = %err, "remote copy failed"),
            }
        }))
    }
}
