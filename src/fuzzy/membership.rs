//! Ramp membership functions for two-term linguistic variables.
//!
//! Each input variable has two terms, "low" and "high", defined by a pair of
//! breakpoints `a < b`:
//!
//! ```text
//! high(x) = 0                    for x <= a
//! high(x) = (x - a) / (b - a)    for a < x < b
//! high(x) = 1                    for x >= b
//! low(x)  = 1 - high(x)
//! ```
//!
//! The ramps are open-ended on both sides, so every real input is covered.

use crate::domain::Term;

/// Degrees of membership of one crisp value in the "low" and "high" terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MembershipPair {
    pub low: f64,
    pub high: f64,
}

impl MembershipPair {
    pub const FULLY_LOW: MembershipPair = MembershipPair { low: 1.0, high: 0.0 };
    pub const FULLY_HIGH: MembershipPair = MembershipPair { low: 0.0, high: 1.0 };

    pub fn degree(&self, term: Term) -> f64 {
        match term {
            Term::Low => self.low,
            Term::High => self.high,
        }
    }
}

/// Fuzzify `value` against the `[low_breakpoint, high_breakpoint]` transition band.
///
/// Callers are expected to pass `low_breakpoint < high_breakpoint`.
/// A NaN `value` fails both comparisons and yields a NaN pair.
pub fn fuzzify(value: f64, low_breakpoint: f64, high_breakpoint: f64) -> MembershipPair {
    if value <= low_breakpoint {
        return MembershipPair::FULLY_LOW;
    }
    if value >= high_breakpoint {
        return MembershipPair::FULLY_HIGH;
    }

    let high = (value - low_breakpoint) / (high_breakpoint - low_breakpoint);
    MembershipPair { low: 1.0 - high, high }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const A: f64 = 340_532.0;
    const B: f64 = 360_936.0;

    #[test]
    fn breakpoints_themselves_are_saturated() {
        assert_eq!(fuzzify(A, A, B), MembershipPair::FULLY_LOW);
        assert_eq!(fuzzify(B, A, B), MembershipPair::FULLY_HIGH);
    }

    #[test]
    fn midpoint_is_even_blend() {
        let m = fuzzify((A + B) / 2.0, A, B);
        assert!((m.low - 0.5).abs() < 1e-12);
        assert!((m.high - 0.5).abs() < 1e-12);
    }

    #[test]
    fn infinities_saturate_and_nan_propagates() {
        assert_eq!(fuzzify(f64::NEG_INFINITY, A, B), MembershipPair::FULLY_LOW);
        assert_eq!(fuzzify(f64::INFINITY, A, B), MembershipPair::FULLY_HIGH);

        let m = fuzzify(f64::NAN, A, B);
        assert!(m.low.is_nan() && m.high.is_nan());
    }

    proptest! {
        #[test]
        fn below_band_is_fully_low(x in -1.0e9f64..=A) {
            prop_assert_eq!(fuzzify(x, A, B), MembershipPair::FULLY_LOW);
        }

        #[test]
        fn above_band_is_fully_high(x in B..1.0e9f64) {
            prop_assert_eq!(fuzzify(x, A, B), MembershipPair::FULLY_HIGH);
        }

        #[test]
        fn inside_band_degrees_are_complementary(x in (A + 1e-6)..B) {
            let m = fuzzify(x, A, B);
            prop_assert!((m.low + m.high - 1.0).abs() < 1e-12);
            prop_assert!((0.0..=1.0).contains(&m.low));
            prop_assert!((0.0..=1.0).contains(&m.high));
        }

        #[test]
        fn high_degree_is_monotone(x in A..B, dx in 0.0f64..1_000.0) {
            prop_assert!(fuzzify(x + dx, A, B).high >= fuzzify(x, A, B).high);
        }
    }
}
