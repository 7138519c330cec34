use serde::{Deserialize, Serialize};

use super::ids::ProblemId;
use super::operation::OperationKind;

/// One generated arithmetic problem.
///
/// Immutable once built; `correct_answer` is the exact decimal rendering of the result
/// computed from `operands`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    id: ProblemId,
    kind: OperationKind,
    operands: (i64, i64),
    correct_answer: String,
    prompt_text: String,
}

impl Problem {
    /// Builds a problem, deriving the answer and prompt from the operands.
    ///
    /// Callers in this crate guarantee that the operation is exact (non-zero divisor,
    /// divisible dividend, integral percentage).
    pub(crate) fn build(id: ProblemId, kind: OperationKind, a: i64, b: i64) -> Self {
        let answer = evaluate(kind, a, b).unwrap_or_default();
        let prompt_text = match kind {
            OperationKind::PercentOf => format!("{a}% of {b} = ?"),
            _ => format!("{a} {} {b} = ?", kind.symbol()),
        };
        Self {
            id,
            kind,
            operands: (a, b),
            correct_answer: answer.to_string(),
            prompt_text,
        }
    }

    #[must_use]
    pub fn id(&self) -> ProblemId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    #[must_use]
    pub fn operator(&self) -> &'static str {
        self.kind.symbol()
    }

    #[must_use]
    pub fn operands(&self) -> (i64, i64) {
        self.operands
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn prompt_text(&self) -> &str {
        &self.prompt_text
    }

    /// Strict answer check: trimmed input must equal the answer string exactly.
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        answer.trim() == self.correct_answer
    }
}

/// Exact integer result of `a <op> b`, or `None` when the result would not be an integer.
#[must_use]
pub fn evaluate(kind: OperationKind, a: i64, b: i64) -> Option<i64> {
    match kind {
        OperationKind::Addition => a.checked_add(b),
        OperationKind::Subtraction => a.checked_sub(b),
        OperationKind::Multiplication => a.checked_mul(b),
        OperationKind::Division => {
            if b == 0 || a % b != 0 {
                None
            } else {
                Some(a / b)
            }
        }
        OperationKind::PercentOf => {
            let product = a.checked_mul(b)?;
            if product % 100 == 0 {
                Some(product / 100)
            } else {
                None
            }
        }
    }
}
