use std::collections::HashSet;

use super::summary::SessionSummary;

/// Maximum number of summaries kept in the local history.
pub const HISTORY_CAP: usize = 10;

/// Merge a freshly produced summary into a most-recent-first history.
///
/// The new summary is prepended, ids are deduplicated keeping the first occurrence of the
/// existing history, and the result is truncated to [`HISTORY_CAP`]. A summary whose id is
/// already present leaves the history unchanged.
#[must_use]
pub fn merge_into_history(
    history: Vec<SessionSummary>,
    summary: SessionSummary,
) -> Vec<SessionSummary> {
    if history.iter().any(|existing| existing.id() == summary.id()) {
        return dedupe_and_cap(history);
    }

    let mut merged = Vec::with_capacity(history.len() + 1);
    merged.push(summary);
    merged.extend(history);
    dedupe_and_cap(merged)
}

/// Drop repeated ids (first occurrence wins) and cap the length.
#[must_use]
pub fn dedupe_and_cap(history: Vec<SessionSummary>) -> Vec<SessionSummary> {
    let mut seen = HashSet::new();
    history
        .into_iter()
        .filter(|summary| seen.insert(summary.id()))
        .take(HISTORY_CAP)
        .collect()
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

    fn summary(rng: &mut StdRng, minute: i64) -> SessionSummary {
        let started = fixed_now() + chrono::Duration::minutes(minute);
        SessionSummary::from_counters(
            SummaryId::random(rng),
            started,
            started + chrono::Duration::seconds(60),
            SummarySettings {
                skills: vec![OperationKind::Addition],
                length_sec: SessionLength::Standard,
                termination_reason: TerminationReason::Timeout,
            },
            &SessionCounters::default(),
        )
        .unwrap()
    }

    #[test]
    fn fifteen_appends_keep_ten_most_recent_first() {
        let mut rng = StdRng::seed_from_u64(11);
        let all: Vec<_> = (0..15).map(|i| summary(&mut rng, i)).collect();

        let mut history = Vec::new();
        for s in &all {
            history = merge_into_history(history, s.clone());
        }

        assert_eq!(history.len(), HISTORY_CAP);
        assert_eq!(history[0].id(), all[14].id());
        assert_eq!(history[9].id(), all[5].id());
    }

    #[test]
    fn duplicate_id_leaves_history_unchanged() {
        let mut rng = StdRng::seed_from_u64(12);
        let first = summary(&mut rng, 0);
        let second = summary(&mut rng, 1);
        let third = summary(&mut rng, 2);

        let mut history = Vec::new();
        for s in [&first, &second, &third] {
            history = merge_into_history(history, s.clone());
        }
        let before: Vec<_> = history.iter().map(SessionSummary::id).collect();

        let history = merge_into_history(history, first.clone());
        let after: Vec<_> = history.iter().map(SessionSummary::id).collect();

        assert_eq!(after, before);
        assert_eq!(after[2], first.id());
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let mut rng = StdRng::seed_from_u64(13);
        let a = summary(&mut rng, 0);
        let b = summary(&mut rng, 1);
        let cleaned = dedupe_and_cap(vec![a.clone(), b.clone(), a.clone()]);
        assert_eq!(cleaned, vec![a, b]);
    }
}
