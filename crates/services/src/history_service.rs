use std::sync::Arc;

use drill_core::Clock;
use drill_core::model::{GoalsReport, HISTORY_CAP, HistoryStats, SessionSummary};
use storage::repository::{HistoryRepository, StorageError};
use tracing::warn;

use crate::error::HistoryError;

/// Reads history from ranked sources: the first source with data wins.
///
/// A failing source is logged and skipped. An error is returned only when every
/// source failed.
#[derive(Clone)]
pub struct HistoryService {
    sources: Vec<Arc<dyn HistoryRepository>>,
    clock: Clock,
}

impl HistoryService {
    #[must_use]
    pub fn new(sources: Vec<Arc<dyn HistoryRepository>>, clock: Clock) -> Self {
        Self { sources, clock }
    }

    #[must_use]
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Up to `limit` summaries, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` with the last failure if no source could be read.
    pub async fn recent(&self, limit: usize) -> Result<Vec<SessionSummary>, HistoryError> {
        let mut last_err: Option<StorageError> = None;
        let mut any_ok = false;
        for source in &self.sources {
            match source.list(limit).await {
                Ok(list) if !list.is_empty() => return Ok(list),
                Ok(_) => any_ok = true,
                Err(err) => {
                    warn!(error = %err, "history source failed, trying next");
                    last_err = Some(err);
                }
            }
        }
        match last_err {
            Some(err) if !any_ok => Err(err.into()),
            _ => Ok(Vec::new()),
        }
    }

    /// The last played session, from the first source that has one.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` with the last failure if no source could be read.
    pub async fn latest(&self) -> Result<Option<SessionSummary>, HistoryError> {
        let mut last_err: Option<StorageError> = None;
        let mut any_ok = false;
        for source in &self.sources {
            match source.latest().await {
                Ok(Some(summary)) => return Ok(Some(summary)),
                Ok(None) => any_ok = true,
                Err(err) => {
                    warn!(error = %err, "history source failed, trying next");
                    last_err = Some(err);
                }
            }
        }
        match last_err {
            Some(err) if !any_ok => Err(err.into()),
            _ => Ok(None),
        }
    }

    /// Aggregate statistics over the retained history.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError` when no source could be read.
    pub async fn stats(&self) -> Result<HistoryStats, HistoryError> {
        let summaries = self.recent(HISTORY_CAP).await?;
        Ok(HistoryStats::from_summaries(&summaries))
    }

    /// Goal and daily-challenge progress as of the service clock's now.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError` when no source could be read.
    pub async fn goals(&self) -> Result<GoalsReport, HistoryError> {
        let summaries = self.recent(HISTORY_CAP).await?;
        Ok(GoalsReport::evaluate(&summaries, &self.clock))
    }
}
