//! Fixed-point primitives on a 10^18 scale
//!
//! All values are `U256` integers where `ONE` (10^18) represents 1.0.
//! Division truncates toward zero. Products that can exceed 256 bits are
//! formed in `U512` and narrowed with an explicit overflow check, never
//! wrapped.

use crate::error::{MathError, MathResult};
use primitive_types::{U256, U512};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tidepool_config::protocol::iterations::{MAX_EXP_TERMS, MAX_LN_TERMS, MAX_SQRT_ITERATIONS};
use tidepool_config::protocol::{BPS_DENOMINATOR, SCALE, SCALE_DECIMALS};

/// 1.0 in fixed point
pub const ONE: U256 = U256([SCALE, 0, 0, 0]);

/// 10000 basis points
pub const BPS: U256 = U256([BPS_DENOMINATOR, 0, 0, 0]);

/// ln(2) * 10^18, truncated
pub const LN_2: U256 = U256([693_147_180_559_945_309, 0, 0, 0]);

/// Largest accepted exp input (135.0); e^136 * 10^18 no longer fits in 256 bits
pub const MAX_EXP_INPUT: U256 = U256([5_872_791_484_033_138_688, 7, 0, 0]);

/// A fixed-point magnitude with a sign, produced by `ln` for inputs below 1.0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedFixed {
    pub negative: bool,
    pub magnitude: U256,
}

impl SignedFixed {
    pub fn positive(magnitude: U256) -> Self {
        Self {
            negative: false,
            magnitude,
        }
    }

    pub fn negative(magnitude: U256) -> Self {
        Self {
            negative: !magnitude.is_zero(),
            magnitude,
        }
    }

    /// Narrow to a signed 128-bit fixed-point value
    pub fn to_i128(self) -> MathResult<i128> {
        if self.magnitude.bits() > 127 {
            return Err(MathError::overflow("SignedFixed::to_i128"));
        }
        let value = self.magnitude.low_u128() as i128;
        Ok(if self.negative { -value } else { value })
    }
}

/// Integer and fixed-point approximations used by every quoting component
pub struct FixedPointMath;

impl FixedPointMath {
    /// `floor(a * b / denominator)` with a 512-bit intermediate product
    pub fn mul_div(a: U256, b: U256, denominator: U256) -> MathResult<U256> {
        if denominator.is_zero() {
            return Err(MathError::domain("mul_div", "division by zero"));
        }
        let quotient = a.full_mul(b) / U512::from(denominator);
        U256::try_from(quotient).map_err(|_| MathError::overflow("mul_div"))
    }

    /// `ceil(a * b / denominator)` with a 512-bit intermediate product
    pub fn mul_div_up(a: U256, b: U256, denominator: U256) -> MathResult<U256> {
        if denominator.is_zero() {
            return Err(MathError::domain("mul_div_up", "division by zero"));
        }
        let (quotient, remainder) = a.full_mul(b).div_mod(U512::from(denominator));
        let quotient = if remainder.is_zero() {
            quotient
        } else {
            quotient + U512::one()
        };
        U256::try_from(quotient).map_err(|_| MathError::overflow("mul_div_up"))
    }

    /// Checked 256-bit product, tagged with the calling operation
    pub fn checked_mul(a: U256, b: U256, operation: &'static str) -> MathResult<U256> {
        a.checked_mul(b).ok_or(MathError::overflow(operation))
    }

    /// Checked 256-bit sum, tagged with the calling operation
    pub fn checked_add(a: U256, b: U256, operation: &'static str) -> MathResult<U256> {
        a.checked_add(b).ok_or(MathError::overflow(operation))
    }

    /// Integer square root `floor(sqrt(x))` by Newton-Raphson
    ///
    /// Seeded with `2^ceil(bits(x) / 2)`, which is never below the root, so
    /// the iterates decrease monotonically until they stop decreasing.
    pub fn sqrt(x: U256) -> U256 {
        if x.is_zero() {
            return U256::zero();
        }

        let mut current = U256::one() << ((x.bits() + 1) / 2);
        for _ in 0..MAX_SQRT_ITERATIONS {
            let next = (current + x / current) >> 1;
            if next >= current {
                return current;
            }
            current = next;
        }
        current
    }

    /// Square root of a fixed-point value: `sqrt(x * 10^18)`
    pub fn sqrt_fixed(x: U256) -> MathResult<U256> {
        let widened = Self::checked_mul(x, ONE, "sqrt_fixed")?;
        Ok(Self::sqrt(widened))
    }

    /// e^x for a non-negative fixed-point `x`
    ///
    /// Range-reduced as `x = k * ln2 + r`, `r` in `[0, ln2)`; the Taylor
    /// series runs on `r` until a term truncates to zero, then the result
    /// is shifted left by `k`.
    pub fn exp(x: U256) -> MathResult<U256> {
        if x > MAX_EXP_INPUT {
            return Err(MathError::overflow("exp"));
        }

        let k = x / LN_2;
        let remainder = x - k * LN_2;

        let mut term = ONE;
        let mut sum = ONE;
        for i in 1..=MAX_EXP_TERMS {
            term = term * remainder / (ONE * U256::from(i));
            if term.is_zero() {
                break;
            }
            sum += term;
        }

        let shift = k.low_u32() as usize;
        if sum.bits() + shift > 256 {
            return Err(MathError::overflow("exp"));
        }
        Ok(sum << shift)
    }

    /// Natural logarithm of a positive fixed-point value
    ///
    /// Inputs below 1.0 use `ln(x) = -ln(1/x)`.
    pub fn ln(x: U256) -> MathResult<SignedFixed> {
        if x.is_zero() {
            return Err(MathError::domain("ln", "logarithm of a non-positive value"));
        }
        if x >= ONE {
            return Ok(SignedFixed::positive(Self::ln_at_least_one(x)));
        }
        let inverse = Self::mul_div(ONE, ONE, x)?;
        Ok(SignedFixed::negative(Self::ln_at_least_one(inverse)))
    }

    /// ln for `x >= 1.0`: factor out `2^n`, then `ln(y) = 2 * atanh((y-1)/(y+1))`
    /// on the remaining `y` in `[1, 2)`
    fn ln_at_least_one(x: U256) -> U256 {
        let whole = x / ONE;
        let n = whole.bits() - 1;
        let reduced = x >> n;

        // z < 1/3, so each term shrinks by at least 9x
        let z = (reduced - ONE) * ONE / (reduced + ONE);
        let z_squared = z * z / ONE;

        let mut power = z;
        let mut series = z;
        for k in 1..MAX_LN_TERMS {
            power = power * z_squared / ONE;
            if power.is_zero() {
                break;
            }
            series += power / U256::from(2 * k + 1);
        }

        LN_2 * U256::from(n) + (series << 1)
    }
}

/// Whole units to fixed point (`3` becomes `3 * 10^18`)
pub fn from_whole(units: u64) -> U256 {
    U256::from(units) * ONE
}

/// Fixed-point value as a `Decimal` for display; `None` beyond Decimal's 96-bit mantissa
pub fn to_decimal(value: U256) -> Option<Decimal> {
    if value.bits() > 127 {
        return None;
    }
    Decimal::try_from_i128_with_scale(value.low_u128() as i128, SCALE_DECIMALS).ok()
}

/// Basis points as a percentage (`30` becomes `0.30`)
pub fn bps_to_percent(bps: U256) -> Option<Decimal> {
    if bps.bits() > 63 {
        return None;
    }
    Some(Decimal::from(bps.low_u64()) / dec!(100))
}
