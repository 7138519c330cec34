use serde::{Deserialize, Serialize};

use super::summary::SessionSummary;

/// Aggregate performance over a set of stored summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total_sessions: u32,
    pub total_attempted: u64,
    pub total_correct: u64,
    pub average_accuracy: u32,
    pub best_streak: u32,
    pub average_time_per_task_ms: u64,
}

impl HistoryStats {
    /// Accuracy is computed over all attempts, and average time is weighted by each
    /// session's attempt count.
    #[must_use]
    pub fn from_summaries(summaries: &[SessionSummary]) -> Self {
        if summaries.is_empty() {
            return Self::default();
        }

        let mut stats = Self {
            total_sessions: u32::try_from(summaries.len()).unwrap_or(u32::MAX),
            ..Self::default()
        };
        let mut weighted_time: u64 = 0;

        for summary in summaries {
            let totals = summary.totals();
            stats.total_attempted += u64::from(totals.attempted);
            stats.total_correct += u64::from(totals.correct);
            stats.best_streak = stats.best_streak.max(totals.max_streak);
            weighted_time = weighted_time
                .saturating_add(totals.avg_time_ms.saturating_mul(u64::from(totals.attempted)));
        }

        if stats.total_attempted > 0 {
            let half = stats.total_attempted / 2;
            let pct = (stats.total_correct * 100 + half) / stats.total_attempted;
            stats.average_accuracy = u32::try_from(pct).unwrap_or(100);
            stats.average_time_per_task_ms = (weighted_time + half) / stats.total_attempted;
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        OperationKind, SessionCounters, SessionLength, SummaryId, SummarySettings,
        TerminationReason,
    };
    use crate::time::fixed_now;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn summary(rng: &mut StdRng, counters: SessionCounters) -> SessionSummary {
        SessionSummary::from_counters(
            SummaryId::random(rng),
            fixed_now(),
            fixed_now(),
            SummarySettings {
                skills: vec![OperationKind::Multiplication],
                length_sec: SessionLength::Short,
                termination_reason: TerminationReason::Timeout,
            },
            &counters,
        )
        .unwrap()
    }

    #[test]
    fn empty_history_is_all_zero() {
        assert_eq!(HistoryStats::from_summaries(&[]), HistoryStats::default());
    }

    #[test]
    fn aggregates_across_sessions() {
        let mut rng = StdRng::seed_from_u64(5);
        let a = summary(
            &mut rng,
            SessionCounters {
                attempted: 10,
                correct: 9,
                sum_response_time_ms: 10_000,
                current_streak: 4,
                max_streak: 6,
            },
        );
        let b = summary(
            &mut rng,
            SessionCounters {
                attempted: 30,
                correct: 15,
                sum_response_time_ms: 60_000,
                current_streak: 0,
                max_streak: 8,
            },
        );

        let stats = HistoryStats::from_summaries(&[a, b]);
        assert_eq!(stats.total_sessions, 2);
        assert_eq!(stats.total_attempted, 40);
        assert_eq!(stats.total_correct, 24);
        assert_eq!(stats.average_accuracy, 60);
        assert_eq!(stats.best_streak, 8);
        // (1000 * 10 + 2000 * 30) / 40
        assert_eq!(stats.average_time_per_task_ms, 1_750);
    }
}
