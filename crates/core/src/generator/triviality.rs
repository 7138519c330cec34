use crate::model::OperationKind;

/// Whether the operand pair makes the problem a giveaway.
///
/// Subtraction expects `a >= b`; percent reads `a` as the percentage and `b` as the base.
#[must_use]
pub fn is_trivial(kind: OperationKind, a: i64, b: i64) -> bool {
    match kind {
        OperationKind::Addition | OperationKind::Multiplication => {
            a == 0 || b == 0 || a == 1 || b == 1
        }
        OperationKind::Subtraction => b == 0 || a == 0 || a - b == 1,
        OperationKind::Division => b == 1 || a == 0 || a == b || (b != 0 && a % b != 0 && a < b),
        OperationKind::PercentOf => a == 0 || b == 0 || a == 100 || b == 1,
    }
}
