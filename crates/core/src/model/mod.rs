mod goals;
mod history;
mod ids;
mod operation;
mod problem;
mod settings;
mod stats;
mod summary;

pub use goals::{ChallengeProgress, Difficulty, GoalCategory, GoalProgress, GoalsReport};
pub use history::{HISTORY_CAP, dedupe_and_cap, merge_into_history};
pub use ids::{ParseIdError, ProblemId, SummaryId};
pub use operation::{DigitRange, OperationConfig, OperationKind, OperationSettings};
pub use problem::{Problem, evaluate};
pub use settings::{PracticeSettings, SessionLength, SettingsDraft, SettingsError};
pub use stats::HistoryStats;
pub use summary::{
    SessionCounters, SessionSummary, SummaryError, SummarySettings, SummaryTotals,
    TerminationReason,
};
