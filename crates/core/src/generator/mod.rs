//! Constraint-driven arithmetic problem generation.

pub mod operands;
mod synth;
pub mod triviality;

pub use synth::ProblemSynthesizer;
pub use triviality::is_trivial;
