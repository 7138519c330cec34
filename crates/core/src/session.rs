use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use rand::rngs::StdRng;
use serde::Serialize;
use thiserror::Error;

use crate::generator::ProblemSynthesizer;
use crate::model::{
    PracticeSettings, Problem, ProblemId, SessionCounters, SessionLength, SessionSummary,
    SummaryId, SummarySettings, TerminationReason,
};
use crate::time::{Clock, elapsed_ms};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session has already ended")]
    Ended,

    #[error("session is paused")]
    Paused,
}

/// Lifecycle of a practice session. `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Active,
    Paused,
    Ended(TerminationReason),
}

/// Result of one submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub problem_id: ProblemId,
    pub is_correct: bool,
    /// Answer of the problem that was just replaced, for feedback.
    pub expected_answer: String,
    pub response_time_ms: u64,
    pub current_streak: u32,
}

/// Plain data a view renders after every tick and submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub time_remaining: u32,
    pub length_sec: u32,
    pub prompt_text: String,
    pub attempted: u32,
    pub correct: u32,
    pub current_streak: u32,
    pub max_streak: u32,
    pub paused: bool,
    pub ended: bool,
}

/// A timed practice session.
///
/// The session owns no timer: a driver calls [`PracticeSession::advance`] once per
/// elapsed second and stops when [`PracticeSession::is_ended`] turns true.
#[derive(Debug)]
pub struct PracticeSession<R = StdRng> {
    synthesizer: ProblemSynthesizer<R>,
    clock: Clock,
    length: SessionLength,
    started_at: DateTime<Utc>,
    last_submit_at: DateTime<Utc>,
    time_remaining: u32,
    current: Problem,
    counters: SessionCounters,
    phase: SessionPhase,
    summary: Option<SessionSummary>,
}

impl PracticeSession<StdRng> {
    /// Session with a deterministic problem stream.
    #[must_use]
    pub fn seeded(settings: &PracticeSettings, seed: u64, clock: Clock) -> Self {
        Self::start(
            settings,
            ProblemSynthesizer::seeded(settings.operations().clone(), seed),
            clock,
        )
    }
}

impl<R: Rng> PracticeSession<R> {
    /// Start a session: first problem generated, counters at zero, full time remaining.
    pub fn start(
        settings: &PracticeSettings,
        mut synthesizer: ProblemSynthesizer<R>,
        clock: Clock,
    ) -> Self {
        let started_at = clock.now();
        let current = synthesizer.next_problem();
        Self {
            synthesizer,
            clock,
            length: settings.length(),
            started_at,
            last_submit_at: started_at,
            time_remaining: settings.length().secs(),
            current,
            counters: SessionCounters::default(),
            phase: SessionPhase::Active,
            summary: None,
        }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn is_ended(&self) -> bool {
        matches!(self.phase, SessionPhase::Ended(_))
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.phase == SessionPhase::Paused
    }

    #[must_use]
    pub fn current_problem(&self) -> &Problem {
        &self.current
    }

    #[must_use]
    pub fn counters(&self) -> SessionCounters {
        self.counters
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    #[must_use]
    pub fn length(&self) -> SessionLength {
        self.length
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// The summary, once the session has ended.
    #[must_use]
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView {
            time_remaining: self.time_remaining,
            length_sec: self.length.secs(),
            prompt_text: self.current.prompt_text().to_owned(),
            attempted: self.counters.attempted,
            correct: self.counters.correct,
            current_streak: self.counters.current_streak,
            max_streak: self.counters.max_streak,
            paused: self.is_paused(),
            ended: self.is_ended(),
        }
    }

    /// Countdown tick. Only an active session loses time; a fixed clock moves with it.
    ///
    /// Returns the summary when this tick ran the clock out.
    pub fn advance(&mut self, delta_secs: u32) -> Option<SessionSummary> {
        if self.is_ended() {
            return None;
        }
        self.clock.advance(Duration::seconds(i64::from(delta_secs)));
        if self.phase == SessionPhase::Paused {
            return None;
        }

        self.time_remaining = self.time_remaining.saturating_sub(delta_secs);
        if self.time_remaining == 0 {
            return self.terminate(TerminationReason::Timeout);
        }
        None
    }

    /// Score an answer and move to a fresh problem.
    ///
    /// The check is exact string equality on the trimmed input, so `"5.0"` does not
    /// match `"5"`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Ended` after termination and `SessionError::Paused`
    /// while paused; counters are untouched in both cases.
    pub fn submit(&mut self, answer: &str) -> Result<SubmitOutcome, SessionError> {
        match self.phase {
            SessionPhase::Ended(_) => return Err(SessionError::Ended),
            SessionPhase::Paused => return Err(SessionError::Paused),
            SessionPhase::Active => {}
        }

        let now = self.clock.now();
        let response_time_ms = elapsed_ms(self.last_submit_at, now);
        self.last_submit_at = now;

        let is_correct = self.current.is_correct(answer);
        let counters = &mut self.counters;
        counters.attempted += 1;
        counters.sum_response_time_ms = counters
            .sum_response_time_ms
            .saturating_add(response_time_ms);
        if is_correct {
            counters.correct += 1;
            counters.current_streak += 1;
            counters.max_streak = counters.max_streak.max(counters.current_streak);
        } else {
            counters.current_streak = 0;
        }

        let next = self.synthesizer.next_problem();
        let answered = std::mem::replace(&mut self.current, next);

        Ok(SubmitOutcome {
            problem_id: answered.id(),
            is_correct,
            expected_answer: answered.correct_answer().to_owned(),
            response_time_ms,
            current_streak: self.counters.current_streak,
        })
    }

    /// Returns `true` if the session was active and is now paused.
    pub fn pause(&mut self) -> bool {
        if self.phase == SessionPhase::Active {
            self.phase = SessionPhase::Paused;
            return true;
        }
        false
    }

    /// Returns `true` if the session was paused and is active again.
    pub fn resume(&mut self) -> bool {
        if self.phase == SessionPhase::Paused {
            self.phase = SessionPhase::Active;
            return true;
        }
        false
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.pause() || self.resume()
    }

    /// End the session early. Only the first call produces a summary.
    pub fn exit(&mut self) -> Option<SessionSummary> {
        self.terminate(TerminationReason::Exit)
    }

    fn terminate(&mut self, reason: TerminationReason) -> Option<SessionSummary> {
        if self.is_ended() {
            return None;
        }
        self.phase = SessionPhase::Ended(reason);

        let settings = SummarySettings {
            skills: self.synthesizer.config().effective_kinds(),
            length_sec: self.length,
            termination_reason: reason,
        };
        let id = SummaryId::random(self.synthesizer.rng_mut());
        let summary = SessionSummary::from_session(
            id,
            self.started_at,
            self.clock.now(),
            settings,
            &self.counters,
        );
        self.summary = Some(summary.clone());
        Some(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OperationConfig, OperationKind};
    use crate::time::{fixed_clock, fixed_now};

    fn settings(length: SessionLength) -> PracticeSettings {
        PracticeSettings::new(OperationConfig::default(), length)
    }

    fn answer_right(session: &mut PracticeSession) -> SubmitOutcome {
        let answer = session.current_problem().correct_answer().to_owned();
        session.submit(&answer).unwrap()
    }

    #[test]
    fn start_initializes_counters_and_time() {
        let session = PracticeSession::seeded(&settings(SessionLength::Standard), 1, fixed_clock());
        let view = session.view();
        assert_eq!(view.time_remaining, 60);
        assert_eq!(view.length_sec, 60);
        assert_eq!(view.attempted, 0);
        assert!(!view.prompt_text.is_empty());
        assert_eq!(session.started_at(), fixed_now());
        assert_eq!(session.phase(), SessionPhase::Active);
    }

    #[test]
    fn five_right_one_wrong_two_right_then_exit() {
        let mut session =
            PracticeSession::seeded(&settings(SessionLength::Standard), 2024, fixed_clock());

        for _ in 0..5 {
            session.advance(1);
            assert!(answer_right(&mut session).is_correct);
        }
        session.advance(1);
        let wrong = session.submit("not a number").unwrap();
        assert!(!wrong.is_correct);
        for _ in 0..2 {
            session.advance(1);
            answer_right(&mut session);
        }

        let summary = session.exit().expect("first exit yields a summary");
        let totals = summary.totals();
        assert_eq!(totals.attempted, 8);
        assert_eq!(totals.correct, 7);
        assert_eq!(totals.accuracy_pct, 88);
        assert_eq!(totals.max_streak, 5);
        assert_eq!(totals.final_streak, 2);
        assert_eq!(totals.avg_time_ms, 1_000);
        assert_eq!(summary.termination_reason(), TerminationReason::Exit);
        assert_eq!(summary.settings().skills, OperationKind::ALL.to_vec());
        assert_eq!(summary.settings().length_sec, SessionLength::Standard);
        assert_eq!(summary.ended_at() - summary.started_at(), Duration::seconds(8));
    }

    #[test]
    fn exit_twice_yields_one_summary() {
        let mut session = PracticeSession::seeded(&settings(SessionLength::Short), 3, fixed_clock());
        let first = session.exit();
        assert!(first.is_some());
        assert!(session.exit().is_none());
        assert_eq!(session.summary(), first.as_ref());
        assert_eq!(session.submit("1"), Err(SessionError::Ended));
    }

    #[test]
    fn countdown_reaches_zero_and_times_out_once() {
        let mut session = PracticeSession::seeded(&settings(SessionLength::Short), 4, fixed_clock());
        assert!(session.advance(10).is_none());
        assert!(session.advance(10).is_none());
        let summary = session.advance(15).expect("timeout summary");
        assert_eq!(summary.termination_reason(), TerminationReason::Timeout);
        assert_eq!(session.time_remaining(), 0);
        assert!(session.advance(1).is_none());
        assert!(session.exit().is_none());
        assert_eq!(session.phase(), SessionPhase::Ended(TerminationReason::Timeout));
    }

    #[test]
    fn paused_session_ignores_ticks_and_answers() {
        let mut session =
            PracticeSession::seeded(&settings(SessionLength::Standard), 5, fixed_clock());
        session.advance(5);
        assert!(session.pause());
        assert!(!session.pause());
        session.advance(30);
        assert_eq!(session.time_remaining(), 55);
        assert_eq!(session.submit("1"), Err(SessionError::Paused));
        assert!(session.toggle_pause());
        assert_eq!(session.phase(), SessionPhase::Active);
        session.advance(5);
        assert_eq!(session.time_remaining(), 50);
        assert_eq!(session.counters().attempted, 0);
    }

    #[test]
    fn counters_stay_consistent_across_mixed_answers() {
        let mut session = PracticeSession::seeded(&settings(SessionLength::Long), 6, fixed_clock());
        for i in 0..200_u32 {
            let before = session.counters().attempted;
            if i % 3 == 0 {
                session.submit("?").unwrap();
            } else {
                answer_right(&mut session);
            }
            let counters = session.counters();
            assert_eq!(counters.attempted, before + 1);
            assert!(counters.correct <= counters.attempted);
            assert!(counters.current_streak <= counters.max_streak);
        }
    }

    #[test]
    fn submit_reports_previous_answer_and_moves_on() {
        let mut session =
            PracticeSession::seeded(&settings(SessionLength::Standard), 7, fixed_clock());
        let first = session.current_problem().clone();
        let outcome = session.submit(" garbage ").unwrap();
        assert_eq!(outcome.problem_id, first.id());
        assert_eq!(outcome.expected_answer, first.correct_answer());
        assert_ne!(session.current_problem().id(), first.id());
    }

    #[test]
    fn zero_attempt_exit_has_zero_totals() {
        let mut session = PracticeSession::seeded(&settings(SessionLength::Short), 8, fixed_clock());
        let summary = session.exit().unwrap();
        assert_eq!(summary.totals().accuracy_pct, 0);
        assert_eq!(summary.totals().avg_time_ms, 0);
    }
}
