//! Integer helpers for multiples and random draws

use rand::Rng;

use crate::error::MathError;

/// Greatest common divisor (Euclid), always non-negative.
///
/// `gcd(0, 0)` is degenerate and returns 0.
pub fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    // Only gcd(i64::MIN, 0) and friends exceed i64::MAX
    i64::try_from(a).unwrap_or(i64::MAX)
}

/// Least common multiple, non-negative.
///
/// Fails when both inputs are zero (gcd is zero) or the result overflows.
pub fn lcm(a: i64, b: i64) -> Result<i64, MathError> {
    let g = gcd(a, b);
    if g == 0 {
        return Err(MathError::DivideByZero { a, b });
    }
    (a / g)
        .checked_mul(b)
        .and_then(i64::checked_abs)
        .ok_or(MathError::Overflow { a, b })
}

/// True when `n` is divisible by both `a` and `b`.
///
/// A zero divisor has no multiples, so it yields `false`.
pub fn is_common_multiple(n: i64, a: i64, b: i64) -> bool {
    if a == 0 || b == 0 {
        return false;
    }
    n % a == 0 && n % b == 0
}

/// Uniform integer in `[min, max]`, inclusive on both ends.
///
/// Reversed bounds are swapped rather than rejected.
pub fn random_int<R: Rng + ?Sized>(rng: &mut R, min: i64, max: i64) -> i64 {
    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    rng.random_range(lo..=hi)
}
