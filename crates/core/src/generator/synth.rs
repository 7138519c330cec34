use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::operands::{
    digit_bounds, digit_count, draw_digits, draw_operand, draw_operand_at_least, percent_step,
    random_int,
};
use super::triviality::is_trivial;
use crate::model::{
    DigitRange, OperationConfig, OperationKind, OperationSettings, Problem, ProblemId,
};

const BASIC_ATTEMPTS: usize = 20;
const DIVISION_ATTEMPTS: usize = 20;
const DIVISION_FALLBACK_ATTEMPTS: usize = 5;
const PERCENT_ATTEMPTS: usize = 100;
const PERCENT_FALLBACK_ATTEMPTS: usize = 10;
/// Last-resort percent problem: 50% of 200 = 100.
const PERCENT_SAFE: (i64, i64) = (50, 200);

/// Builds problems from an [`OperationConfig`] and an injected random source.
///
/// Generation never fails: exhausted retry budgets degrade to a valid, possibly easier
/// problem.
#[derive(Debug, Clone)]
pub struct ProblemSynthesizer<R = StdRng> {
    config: OperationConfig,
    rng: R,
}

impl ProblemSynthesizer<StdRng> {
    /// Deterministic synthesizer for replays and tests.
    #[must_use]
    pub fn seeded(config: OperationConfig, seed: u64) -> Self {
        Self::new(config, StdRng::seed_from_u64(seed))
    }

    #[must_use]
    pub fn from_os_rng(config: OperationConfig) -> Self {
        Self::new(config, StdRng::from_os_rng())
    }
}

impl<R: Rng> ProblemSynthesizer<R> {
    #[must_use]
    pub fn new(config: OperationConfig, rng: R) -> Self {
        Self { config, rng }
    }

    #[must_use]
    pub fn config(&self) -> &OperationConfig {
        &self.config
    }

    /// The random source, for callers that need ids from the same stream.
    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Problem of a kind chosen uniformly among the enabled kinds (Addition if none).
    pub fn next_problem(&mut self) -> Problem {
        let kinds = self.config.effective_kinds();
        let kind = kinds[self.rng.random_range(0..kinds.len())];
        self.generate(kind)
    }

    /// Problem of a specific kind using that kind's configured digit ranges.
    pub fn generate(&mut self, kind: OperationKind) -> Problem {
        let OperationSettings {
            first_operand_digits: first,
            second_operand_digits: second,
            ..
        } = self.config.settings_for(kind);

        let (a, b) = match kind {
            OperationKind::Addition | OperationKind::Multiplication => {
                self.basic_pair(kind, first, second)
            }
            OperationKind::Subtraction => self.subtraction_pair(first, second),
            OperationKind::Division => self.division_pair(first, second),
            OperationKind::PercentOf => self.percent_pair(second),
        };

        let id = ProblemId::random(&mut self.rng);
        Problem::build(id, kind, a, b)
    }

    fn basic_pair(
        &mut self,
        kind: OperationKind,
        first: DigitRange,
        second: DigitRange,
    ) -> (i64, i64) {
        let mut pair = (0, 0);
        for _ in 0..BASIC_ATTEMPTS {
            pair = (
                draw_operand(&mut self.rng, first),
                draw_operand(&mut self.rng, second),
            );
            if !is_trivial(kind, pair.0, pair.1) {
                break;
            }
        }
        pair
    }

    fn subtraction_pair(&mut self, first: DigitRange, second: DigitRange) -> (i64, i64) {
        let mut pair = (0, 0);
        for _ in 0..BASIC_ATTEMPTS {
            let a = draw_operand(&mut self.rng, first);
            let b = draw_operand(&mut self.rng, second);
            pair = if a >= b { (a, b) } else { (b, a) };
            if !is_trivial(OperationKind::Subtraction, pair.0, pair.1) {
                break;
            }
        }
        pair
    }

    /// Dividend is built as `divisor * k` so the quotient is always exact.
    ///
    /// The dividend's digit length is matched against a target drawn from the first
    /// range on a best-effort basis; the last candidate stands if no attempt matches.
    fn division_pair(&mut self, first: DigitRange, second: DigitRange) -> (i64, i64) {
        let mut pair = (0, 1);
        for _ in 0..DIVISION_ATTEMPTS {
            let b = draw_operand_at_least(&mut self.rng, second, 1);
            let k = random_int(&mut self.rng, 1, 9);
            let target = draw_digits(&mut self.rng, first);
            pair = (b * k, b);
            let matched = target == 1 || digit_count(pair.0) == target;
            if matched && !is_trivial(OperationKind::Division, pair.0, pair.1) {
                return pair;
            }
        }

        if is_trivial(OperationKind::Division, pair.0, pair.1) {
            for _ in 0..DIVISION_FALLBACK_ATTEMPTS {
                let b = draw_operand_at_least(&mut self.rng, second, 2);
                let k = random_int(&mut self.rng, 2, 8);
                pair = (b * k, b);
                if !is_trivial(OperationKind::Division, pair.0, pair.1) {
                    break;
                }
            }
        }
        pair
    }

    /// Returns `(percentage, base)` with an integral result.
    fn percent_pair(&mut self, second: DigitRange) -> (i64, i64) {
        for _ in 0..PERCENT_ATTEMPTS {
            let y = draw_operand_at_least(&mut self.rng, second, 1);
            let Some(step) = percent_step(y) else {
                continue;
            };
            let max_k = 100 / step;
            let x = step * random_int(&mut self.rng, 1, max_k - 1);
            if !is_trivial(OperationKind::PercentOf, x, y) {
                return (x, y);
            }
        }
        self.percent_fallback(second)
    }

    /// Direct draws of `x` in `[10, 90]`, kept only when `x * y` is a multiple of 100.
    fn percent_fallback(&mut self, second: DigitRange) -> (i64, i64) {
        for _ in 0..PERCENT_FALLBACK_ATTEMPTS {
            let (min, max) = digit_bounds(draw_digits(&mut self.rng, second));
            let y = random_int(&mut self.rng, min.max(2), max);
            let x = random_int(&mut self.rng, 10, 90);
            if (x * y) % 100 == 0 && !is_trivial(OperationKind::PercentOf, x, y) {
                return (x, y);
            }
        }
        PERCENT_SAFE
    }
}
