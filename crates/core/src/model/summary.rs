use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::ids::SummaryId;
use super::operation::OperationKind;
use super::settings::SessionLength;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SummaryError {
    #[error("endedAt is before startedAt")]
    InvalidTimeRange,

    #[error("correct ({correct}) exceeds attempted ({attempted})")]
    CountMismatch { attempted: u32, correct: u32 },

    #[error("accuracy out of range: {0}")]
    InvalidAccuracy(u32),

    #[error("final streak ({final_streak}) exceeds max streak ({max_streak})")]
    StreakMismatch { final_streak: u32, max_streak: u32 },
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminationReason {
    Timeout,
    Exit,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationReason::Timeout => f.write_str("timeout"),
            TerminationReason::Exit => f.write_str("exit"),
        }
    }
}

/// Raw counters accumulated by a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionCounters {
    pub attempted: u32,
    pub correct: u32,
    pub sum_response_time_ms: u64,
    pub current_streak: u32,
    pub max_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarySettings {
    pub skills: Vec<OperationKind>,
    pub length_sec: SessionLength,
    pub termination_reason: TerminationReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryTotals {
    pub attempted: u32,
    pub correct: u32,
    pub accuracy_pct: u32,
    pub avg_time_ms: u64,
    pub max_streak: u32,
    pub final_streak: u32,
}

impl SummaryTotals {
    /// Reduce counters into totals.
    ///
    /// Accuracy and average time use round-half-up integer division; both are 0 when
    /// nothing was attempted.
    #[must_use]
    pub fn from_counters(counters: &SessionCounters) -> Self {
        let attempted = u64::from(counters.attempted);
        let accuracy_pct = if attempted == 0 {
            0
        } else {
            let pct = round_div(100 * u64::from(counters.correct), attempted);
            u32::try_from(pct).unwrap_or(100).min(100)
        };
        let avg_time_ms = if attempted == 0 {
            0
        } else {
            round_div(counters.sum_response_time_ms, attempted)
        };

        Self {
            attempted: counters.attempted,
            correct: counters.correct,
            accuracy_pct,
            avg_time_ms,
            max_streak: counters.max_streak,
            final_streak: counters.current_streak,
        }
    }
}

fn round_div(numerator: u64, denominator: u64) -> u64 {
    numerator
        .saturating_mul(2)
        .saturating_add(denominator)
        / denominator.saturating_mul(2)
}

/// Immutable record of one finished practice session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "PersistedSummary")]
pub struct SessionSummary {
    id: SummaryId,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
    settings: SummarySettings,
    totals: SummaryTotals,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSummary {
    id: SummaryId,
    started_at: DateTime<Utc>,
    ended_at: DateTime<Utc>,
    settings: SummarySettings,
    totals: SummaryTotals,
}

impl TryFrom<PersistedSummary> for SessionSummary {
    type Error = SummaryError;

    fn try_from(raw: PersistedSummary) -> Result<Self, Self::Error> {
        Self::from_persisted(raw.id, raw.started_at, raw.ended_at, raw.settings, raw.totals)
    }
}

impl SessionSummary {
    /// Build the summary for a session that just terminated.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError::InvalidTimeRange` if `ended_at` is before `started_at`, or
    /// `SummaryError::CountMismatch` if the counters are inconsistent.
    pub fn from_counters(
        id: SummaryId,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        settings: SummarySettings,
        counters: &SessionCounters,
    ) -> Result<Self, SummaryError> {
        Self::from_persisted(
            id,
            started_at,
            ended_at,
            settings,
            SummaryTotals::from_counters(counters),
        )
    }

    /// Summary for a live session whose counters already uphold the invariants.
    /// A clock that stepped backwards is clamped so `ended_at >= started_at`.
    pub(crate) fn from_session(
        id: SummaryId,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        settings: SummarySettings,
        counters: &SessionCounters,
    ) -> Self {
        Self {
            id,
            started_at,
            ended_at: ended_at.max(started_at),
            settings,
            totals: SummaryTotals::from_counters(counters),
        }
    }

    /// Rehydrate a summary from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `SummaryError` when the record violates the summary invariants.
    pub fn from_persisted(
        id: SummaryId,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
        settings: SummarySettings,
        totals: SummaryTotals,
    ) -> Result<Self, SummaryError> {
        if ended_at < started_at {
            return Err(SummaryError::InvalidTimeRange);
        }
        if totals.correct > totals.attempted {
            return Err(SummaryError::CountMismatch {
                attempted: totals.attempted,
                correct: totals.correct,
            });
        }
        if totals.accuracy_pct > 100 {
            return Err(SummaryError::InvalidAccuracy(totals.accuracy_pct));
        }
        if totals.final_streak > totals.max_streak {
            return Err(SummaryError::StreakMismatch {
                final_streak: totals.final_streak,
                max_streak: totals.max_streak,
            });
        }

        Ok(Self {
            id,
            started_at,
            ended_at,
            settings,
            totals,
        })
    }

    #[must_use]
    pub fn id(&self) -> SummaryId {
        self.id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> DateTime<Utc> {
        self.ended_at
    }

    #[must_use]
    pub fn settings(&self) -> &SummarySettings {
        &self.settings
    }

    #[must_use]
    pub fn totals(&self) -> &SummaryTotals {
        &self.totals
    }

    #[must_use]
    pub fn termination_reason(&self) -> TerminationReason {
        self.settings.termination_reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn settings(reason: TerminationReason) -> SummarySettings {
        SummarySettings {
            skills: OperationKind::ALL.to_vec(),
            length_sec: SessionLength::Standard,
            termination_reason: reason,
        }
    }

    fn counters(attempted: u32, correct: u32, sum_ms: u64) -> SessionCounters {
        SessionCounters {
            attempted,
            correct,
            sum_response_time_ms: sum_ms,
            current_streak: 0,
            max_streak: correct.min(1),
        }
    }

    #[test]
    fn seventy_percent_accuracy() {
        let totals = SummaryTotals::from_counters(&counters(10, 7, 12_345));
        assert_eq!(totals.accuracy_pct, 70);
        assert_eq!(totals.avg_time_ms, 1_235);
    }

    #[test]
    fn zero_attempts_avoid_division_by_zero() {
        let totals = SummaryTotals::from_counters(&counters(0, 0, 0));
        assert_eq!(totals.accuracy_pct, 0);
        assert_eq!(totals.avg_time_ms, 0);
    }

    #[test]
    fn half_rounds_up() {
        assert_eq!(SummaryTotals::from_counters(&counters(8, 7, 0)).accuracy_pct, 88);
        assert_eq!(SummaryTotals::from_counters(&counters(3, 1, 0)).accuracy_pct, 33);
        assert_eq!(SummaryTotals::from_counters(&counters(3, 2, 0)).accuracy_pct, 67);
    }

    #[test]
    fn rejects_reversed_time_range() {
        let id = SummaryId::random(&mut StdRng::seed_from_u64(1));
        let err = SessionSummary::from_counters(
            id,
            fixed_now(),
            fixed_now() - chrono::Duration::seconds(1),
            settings(TerminationReason::Exit),
            &counters(1, 1, 10),
        )
        .unwrap_err();
        assert_eq!(err, SummaryError::InvalidTimeRange);
    }

    #[test]
    fn json_shape_uses_camel_case_fields() {
        let id = SummaryId::random(&mut StdRng::seed_from_u64(2));
        let summary = SessionSummary::from_counters(
            id,
            fixed_now(),
            fixed_now(),
            settings(TerminationReason::Timeout),
            &counters(4, 2, 4_000),
        )
        .unwrap();

        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["settings"]["terminationReason"], "timeout");
        assert_eq!(value["settings"]["lengthSec"], 60);
        assert_eq!(value["settings"]["skills"][4], "percent");
        assert_eq!(value["totals"]["accuracyPct"], 50);
        assert_eq!(value["totals"]["avgTimeMs"], 1_000);
        assert_eq!(value["startedAt"], "2023-11-14T22:13:20Z");

        let back: SessionSummary = serde_json::from_value(value).unwrap();
        assert_eq!(back, summary);
    }

    #[test]
    fn deserialize_rejects_inconsistent_totals() {
        let raw = serde_json::json!({
            "id": "0b0f6a4e-5f5c-4c8e-9a52-3d3c1f0b9a11",
            "startedAt": "2023-11-14T22:13:20Z",
            "endedAt": "2023-11-14T22:14:20Z",
            "settings": { "skills": ["addition"], "lengthSec": 60, "terminationReason": "exit" },
            "totals": {
                "attempted": 1, "correct": 2, "accuracyPct": 100,
                "avgTimeMs": 10, "maxStreak": 2, "finalStreak": 2
            }
        });
        assert!(serde_json::from_value::<SessionSummary>(raw).is_err());
    }
}
