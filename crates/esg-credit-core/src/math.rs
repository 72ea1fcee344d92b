//! Decimal transcendental helpers shared by the statistical model.
//! All arithmetic uses `rust_decimal::Decimal`. No `f64`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Exponential via range reduction (x = n*ln2 + r) and Taylor series.
pub fn decimal_exp(x: Decimal) -> Decimal {
    // Saturate far tails; the logistic consumers only need ~28 digits.
    if x <= dec!(-60) {
        return Decimal::ZERO;
    }
    if x >= dec!(60) {
        return Decimal::MAX / dec!(10_000_000_000);
    }

    let ln2 = dec!(0.6931471805599453);
    let n_raw = x / ln2;
    let n = if n_raw >= Decimal::ZERO {
        n_raw.floor()
    } else {
        n_raw.ceil() - Decimal::ONE
    };
    let r = x - n * ln2;

    let mut term = Decimal::ONE;
    let mut sum = Decimal::ONE;
    for i in 1u32..40 {
        term = term * r / Decimal::from(i);
        sum += term;
    }

    let n_i64 = n.to_string().parse::<i64>().unwrap_or(0);
    if n_i64 >= 0 {
        let mut pow2 = Decimal::ONE;
        for _ in 0..n_i64 {
            pow2 *= dec!(2);
        }
        sum * pow2
    } else {
        let mut pow2 = Decimal::ONE;
        for _ in 0..(-n_i64) {
            pow2 *= dec!(2);
        }
        sum / pow2
    }
}

/// Natural log for positive values; returns a large negative floor at 0.
pub fn decimal_ln(x: Decimal) -> Decimal {
    if x <= Decimal::ZERO {
        return dec!(-23);
    }
    let ln2 = dec!(0.6931471805599453);
    let mut val = x;
    let mut adjust = Decimal::ZERO;
    while val > dec!(2.0) {
        val /= dec!(2);
        adjust += ln2;
    }
    while val < dec!(0.5) {
        val *= dec!(2);
        adjust -= ln2;
    }
    let z = (val - Decimal::ONE) / (val + Decimal::ONE);
    let z2 = z * z;
    let mut term = z;
    let mut sum = z;
    for k in 1u32..40 {
        term *= z2;
        let denom = Decimal::from(2 * k + 1);
        sum += term / denom;
    }
    dec!(2) * sum + adjust
}

/// Square root via Newton's method (20 iterations).
pub fn decimal_sqrt(x: Decimal) -> Decimal {
    if x <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let mut guess = x / dec!(2);
    if guess.is_zero() {
        guess = Decimal::ONE;
    }
    for _ in 0..20 {
        guess = (guess + x / guess) / dec!(2);
    }
    guess
}

/// Logistic sigmoid: 1 / (1 + e^-x), clamped to (0, 1).
pub fn sigmoid(x: Decimal) -> Decimal {
    // Evaluate on the negative branch to avoid huge e^x intermediates.
    if x >= Decimal::ZERO {
        let e = decimal_exp(-x);
        Decimal::ONE / (Decimal::ONE + e)
    } else {
        let e = decimal_exp(x);
        e / (Decimal::ONE + e)
    }
}
