//! Random operand helpers shared by every operation.

use rand::Rng;

use crate::model::DigitRange;

/// Uniform inclusive integer. Caller guarantees `min <= max`.
pub fn random_int<R: Rng>(rng: &mut R, min: i64, max: i64) -> i64 {
    rng.random_range(min..=max)
}

/// Numeric bounds for a digit count.
///
/// One digit includes zero (`0..=9`); longer counts exclude leading-zero forms
/// (`10^(d-1)..=10^d - 1`).
#[must_use]
pub fn digit_bounds(digits: u8) -> (i64, i64) {
    if digits <= 1 {
        return (0, 9);
    }
    let exp = u32::from(digits);
    (10_i64.pow(exp - 1), 10_i64.pow(exp) - 1)
}

/// Number of decimal digits in `n` (ignoring sign).
#[must_use]
pub fn digit_count(n: i64) -> u8 {
    let mut n = n.unsigned_abs();
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

/// Euclid on absolute values.
#[must_use]
pub fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Pick a digit count from the (unordered) range.
pub fn draw_digits<R: Rng>(rng: &mut R, range: DigitRange) -> u8 {
    let (lo, hi) = range.ordered();
    rng.random_range(lo..=hi)
}

/// Draw an operand: a digit count from the range, then a value with that many digits.
pub fn draw_operand<R: Rng>(rng: &mut R, range: DigitRange) -> i64 {
    let (min, max) = digit_bounds(draw_digits(rng, range));
    random_int(rng, min, max)
}

/// Like [`draw_operand`] but never below `floor`.
pub fn draw_operand_at_least<R: Rng>(rng: &mut R, range: DigitRange, floor: i64) -> i64 {
    let (min, max) = digit_bounds(draw_digits(rng, range));
    random_int(rng, min.max(floor), max.max(floor))
}

/// Smallest percentage step that makes `step% of y` an integer, or `None` when only
/// 0% and 100% would do.
#[must_use]
pub fn percent_step(y: i64) -> Option<i64> {
    if y == 0 {
        return None;
    }
    let step = 100 / gcd(y, 100);
    (step < 100).then_some(step)
}
