#![forbid(unsafe_code)]

pub mod generator;
pub mod model;
pub mod session;
pub mod time;

pub use generator::ProblemSynthesizer;
pub use session::{PracticeSession, SessionError, SessionPhase, SessionView, SubmitOutcome};
pub use time::Clock;
