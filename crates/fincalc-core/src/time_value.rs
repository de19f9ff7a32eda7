use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::types::{Money, Percent, Rate, Years};

/// ln(2) to 28 significant digits.
pub const LN_2: Decimal = dec!(0.6931471805599453094172321215);

const SERIES_EPSILON: Decimal = dec!(0.0000000000000000000000001);
const MAX_SERIES_TERMS: u32 = 200;

// ---------------------------------------------------------------------------
// Rounding and rate conversion
// ---------------------------------------------------------------------------

/// Round a currency amount to cents, half away from zero (statement rounding).
pub fn round_money(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a user-entered percentage (6.5) to a decimal rate (0.065).
pub fn pct_to_rate(pct: Percent) -> Rate {
    pct / dec!(100)
}

/// Periodic rate from an annual percentage: `APR / 100 / periods_per_year`.
pub fn periodic_rate(annual_pct: Percent, periods_per_year: u32) -> Rate {
    if periods_per_year == 0 {
        return Decimal::ZERO;
    }
    pct_to_rate(annual_pct) / Decimal::from(periods_per_year)
}

// ---------------------------------------------------------------------------
// Powers, exp and ln on Decimal
// ---------------------------------------------------------------------------

/// Raise `base` to an integer power by square-and-multiply.
/// Saturates at `Decimal::MAX` instead of panicking on overflow.
pub fn pow_int(base: Decimal, n: u64) -> Decimal {
    let mut result = Decimal::ONE;
    let mut b = base;
    let mut exp = n;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result.saturating_mul(b);
        }
        exp >>= 1;
        if exp > 0 {
            b = b.saturating_mul(b);
        }
    }
    result
}

/// Taylor-series exponential with range reduction `x = k ln2 + r`.
pub fn exp_decimal(x: Decimal) -> Decimal {
    let mut k: i64 = 0;
    let mut r = x;
    if r.abs() > dec!(1) {
        let k_approx = (x / LN_2).round();
        k = k_approx.try_into().unwrap_or(if x > Decimal::ZERO { 96 } else { -96 });
        r = x - Decimal::from(k) * LN_2;
    }

    let mut sum = Decimal::ONE;
    let mut term = Decimal::ONE;
    for n in 1..=MAX_SERIES_TERMS {
        term = term * r / Decimal::from(n);
        sum += term;
        if term.abs() < SERIES_EPSILON {
            break;
        }
    }

    let scale = pow_int(dec!(2), k.unsigned_abs());
    if k >= 0 {
        sum.saturating_mul(scale)
    } else {
        sum / scale
    }
}

/// `ln(1 + x)` for `x > -1`, via `2 atanh(x / (x + 2))`.
pub fn ln_one_plus(x: Decimal) -> Decimal {
    if x <= dec!(-1) {
        return Decimal::MIN;
    }
    if x.is_zero() {
        return Decimal::ZERO;
    }
    // Keep the atanh argument well inside (-1, 1) so the series converges fast.
    if x > Decimal::ONE {
        let halved = (Decimal::ONE + x) / dec!(2);
        return LN_2 + ln_one_plus(halved - Decimal::ONE);
    }
    if x < dec!(-0.5) {
        let inverse = -x / (Decimal::ONE + x);
        return -ln_one_plus(inverse);
    }
    two_atanh(x / (x + dec!(2)))
}

fn two_atanh(y: Decimal) -> Decimal {
    let y2 = y * y;
    let mut term = y;
    let mut sum = y;
    for k in 1..=MAX_SERIES_TERMS {
        term *= y2;
        let contribution = term / Decimal::from(2 * k + 1);
        sum += contribution;
        if contribution.abs() < SERIES_EPSILON {
            break;
        }
    }
    sum * dec!(2)
}

/// `(1 + rate)^periods` for a possibly fractional number of periods.
/// Integer exponents use exact multiplication; fractional ones go through exp/ln.
pub fn compound_factor(rate: Rate, periods: Decimal) -> Decimal {
    if periods.is_zero() {
        return Decimal::ONE;
    }
    if periods.fract().is_zero() && periods > Decimal::ZERO {
        if let Ok(n) = u64::try_from(periods) {
            return pow_int(Decimal::ONE + rate, n);
        }
    }
    exp_decimal(periods * ln_one_plus(rate))
}

// ---------------------------------------------------------------------------
// Annuity primitives
// ---------------------------------------------------------------------------

/// Level payment retiring `principal` over `n` periods at `rate` per period.
///
/// `rate == 0` divides by `n`, never by the rate. Returns zero when there is
/// nothing to amortize.
pub fn level_payment(principal: Money, rate: Rate, n: u32) -> Money {
    if n == 0 || principal <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if rate.is_zero() {
        return principal / Decimal::from(n);
    }
    let growth = pow_int(Decimal::ONE + rate, u64::from(n));
    let discount = Decimal::ONE - Decimal::ONE / growth;
    if discount.is_zero() {
        return principal / Decimal::from(n);
    }
    principal * rate / discount
}

/// Future-value factor of a unit annuity over `n` (possibly fractional) periods:
/// `((1 + rate)^n - 1) / rate`, or `n` when the rate is zero.
/// Saturates at `Decimal::MAX` when the quotient is out of range.
pub fn annuity_factor(rate: Rate, n: Decimal) -> Decimal {
    if rate.is_zero() {
        return n;
    }
    (compound_factor(rate, n) - Decimal::ONE)
        .checked_div(rate)
        .unwrap_or(Decimal::MAX)
}

/// Effective annual yield of a nominal annual rate compounded `m` times a year.
pub fn effective_annual_yield(nominal_annual: Rate, m: u32) -> Rate {
    if m == 0 {
        return Decimal::ZERO;
    }
    pow_int(Decimal::ONE + nominal_annual / Decimal::from(m), u64::from(m)) - Decimal::ONE
}

/// Years to double: `ln 2 / (m ln(1 + j/m))`. `None` means it never doubles.
pub fn doubling_time(nominal_annual: Rate, m: u32) -> Option<Years> {
    if nominal_annual <= Decimal::ZERO || m == 0 {
        return None;
    }
    let m_dec = Decimal::from(m);
    let growth = m_dec * ln_one_plus(nominal_annual / m_dec);
    if growth <= Decimal::ZERO {
        return None;
    }
    Some(LN_2 / growth)
}
