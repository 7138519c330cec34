//! Terminal driver: a one-second ticker and stdin answers feeding a practice session.

use std::error::Error;
use std::time::Duration;

use drill_core::model::{GoalsReport, HistoryStats, SessionSummary};
use drill_core::{PracticeSession, SessionError, SessionView};
use services::AppServices;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

/// How long to wait for the background remote copy before exiting.
const MIRROR_GRACE: Duration = Duration::from_secs(5);

fn should_announce(remaining: u32) -> bool {
    remaining % 10 == 0 || remaining <= 5
}

fn render(view: &SessionView) {
    println!(
        "[{:>3}s] {:<24} score {}/{}  streak {}",
        view.time_remaining, view.prompt_text, view.correct, view.attempted, view.current_streak
    );
}

pub async fn play(services: &AppServices, seed: Option<u64>) -> Result<(), Box<dyn Error>> {
    let practice = services.practice();
    let mut session = match seed {
        Some(seed) => practice.start_seeded(seed).await,
        None => practice.start().await,
    };

    println!("Type an answer and press enter. `p` pauses, `q` quits.");
    render(&session.view());

    let Some(summary) = run_session(&mut session).await? else {
        return Ok(());
    };

    let recorded = practice.record(&summary).await;
    print_summary(&summary);
    if !recorded.saved_locally {
        println!("(this session could not be saved)");
    }
    if let Some(handle) = recorded.mirror {
        if tokio::time::timeout(MIRROR_GRACE, handle).await.is_err() {
            warn!("remote copy still pending at exit");
        }
    }
    Ok(())
}

/// Drive the session until it ends; the ticker stops with the loop.
async fn run_session(
    session: &mut PracticeSession,
) -> Result<Option<SessionSummary>, Box<dyn Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(summary) = session.advance(1) {
                    println!("Time's up!");
                    return Ok(Some(summary));
                }
                let view = session.view();
                if !view.paused && should_announce(view.time_remaining) {
                    println!("{}s left", view.time_remaining);
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(session.exit());
                };
                match line.trim() {
                    "" => {}
                    "q" => return Ok(session.exit()),
                    "p" => {
                        session.toggle_pause();
                        if session.is_paused() {
                            println!("Paused. Press p to resume.");
                        } else {
                            render(&session.view());
                        }
                    }
                    answer => match session.submit(answer) {
                        Ok(outcome) => {
                            if outcome.is_correct {
                                println!("✓ correct");
                            } else {
                                println!("✗ answer was {}", outcome.expected_answer);
                            }
                            render(&session.view());
                        }
                        Err(SessionError::Paused) => println!("Paused. Press p to resume."),
                        Err(err) => return Err(err.into()),
                    },
                }
            }
        }
    }
}

pub fn print_summary(summary: &SessionSummary) {
    let totals = summary.totals();
    println!();
    println!("Session over ({})", summary.termination_reason());
    println!("  attempted     {}", totals.attempted);
    println!("  correct       {}", totals.correct);
    println!("  accuracy      {}%", totals.accuracy_pct);
    println!("  avg time      {} ms", totals.avg_time_ms);
    println!("  best streak   {}", totals.max_streak);
    println!("  final streak  {}", totals.final_streak);
}

pub fn print_history(summaries: &[SessionSummary]) {
    if summaries.is_empty() {
        println!("No sessions yet.");
        return;
    }
    println!(
        "{:<17} {:>5} {:>8} {:>9} {:>8} {:>7}",
        "started", "len", "score", "accuracy", "avg ms", "streak"
    );
    for summary in summaries {
        let totals = summary.totals();
        println!(
            "{:<17} {:>4}s {:>8} {:>8}% {:>8} {:>7}",
            summary.started_at().format("%Y-%m-%d %H:%M"),
            summary.settings().length_sec.secs(),
            format!("{}/{}", totals.correct, totals.attempted),
            totals.accuracy_pct,
            totals.avg_time_ms,
            totals.max_streak,
        );
    }
}

pub fn print_stats(stats: &HistoryStats) {
    println!("sessions          {}", stats.total_sessions);
    println!("problems solved   {}/{}", stats.total_correct, stats.total_attempted);
    println!("accuracy          {}%", stats.average_accuracy);
    println!("best streak       {}", stats.best_streak);
    println!("avg time/problem  {} ms", stats.average_time_per_task_ms);
}

fn check(completed: bool) -> &'static str {
    if completed { "[x]" } else { "[ ]" }
}

pub fn print_goals(report: &GoalsReport) {
    println!("Goals ({})", report.day);
    for goal in &report.goals {
        println!(
            "  {} {:<16} {:>5} / {:<5} {}",
            check(goal.completed),
            goal.title,
            goal.current,
            goal.target,
            goal.description
        );
    }
    println!();
    println!("Daily challenges");
    for challenge in &report.challenges {
        println!(
            "  {} {:<16} {:>5} / {:<5} {}",
            check(challenge.completed),
            challenge.title,
            challenge.current,
            challenge.target,
            challenge.description
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn announces_every_ten_seconds_and_the_final_five() {
        let announced: Vec<u32> = (1..=30).rev().filter(|s| should_announce(*s)).collect();
        assert_eq!(announced, vec![30, 20, 10, 5, 4, 3, 2, 1]);
    }
}
