//! Two-input, four-rule fuzzy inference.
//!
//! Rule strengths are the `min` (fuzzy AND) of the antecedent degrees, taken
//! over the Cartesian product of the BPBI and Jamkesda terms. Two
//! defuzzifications are provided:
//!
//! - **Sugeno**: `Σ(w_i · z_i) / Σ w_i` over all four rules.
//! - **Mamdani (simplified)**: mean of the consequents of every rule whose
//!   strength equals the maximum strength. Ties are all included. This is not
//!   a centroid over an aggregated output set, and downstream results assume
//!   exactly this form.
//!
//! A non-positive (or NaN) total strength returns `0.0` instead of dividing.
//! The fuzzy AND propagates NaN, so a NaN in either input reaches that check
//! rather than being dropped by `f64::min`.

use crate::domain::{Breakpoints, Calibration, Consequent, Method, RuleTable};
use crate::fuzzy::membership::{MembershipPair, fuzzify};

/// Firing strengths in rule order `[(low,low), (low,high), (high,low), (high,high)]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RuleStrengths(pub [f64; 4]);

impl RuleStrengths {
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Largest strength, or NaN if any strength is NaN.
    pub fn max(&self) -> f64 {
        if self.0.iter().any(|w| w.is_nan()) {
            return f64::NAN;
        }
        self.0.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Fuzzy AND (minimum). Unlike `f64::min`, a NaN operand yields NaN.
fn fuzzy_and(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() { f64::NAN } else { a.min(b) }
}

/// Combine the memberships of both inputs into the four rule strengths.
pub fn rule_strengths(bpbi: MembershipPair, jamkesda: MembershipPair) -> RuleStrengths {
    let mut out = [0.0; 4];
    for (slot, (t_bpbi, t_jamkesda)) in out.iter_mut().zip(RuleTable::ANTECEDENTS) {
        *slot = fuzzy_and(bpbi.degree(t_bpbi), jamkesda.degree(t_jamkesda));
    }
    RuleStrengths(out)
}

/// Weighted-average defuzzification.
pub fn sugeno_defuzzify(strengths: &RuleStrengths, rules: &RuleTable, consequent: &Consequent) -> f64 {
    let total = strengths.total();
    if !(total > 0.0) {
        return 0.0;
    }

    let numer: f64 = strengths
        .0
        .iter()
        .enumerate()
        .map(|(i, w)| w * consequent.value(rules.output(i)))
        .sum();
    numer / total
}

/// Mean of the consequents attached to the maximum-strength rule(s).
pub fn mamdani_defuzzify(strengths: &RuleStrengths, rules: &RuleTable, consequent: &Consequent) -> f64 {
    let max = strengths.max();
    if !(max > 0.0) {
        return 0.0;
    }

    let (sum, count) = strengths
        .0
        .iter()
        .enumerate()
        .filter(|(_, w)| **w == max)
        .fold((0.0, 0usize), |(sum, count), (i, _)| {
            (sum + consequent.value(rules.output(i)), count + 1)
        });
    sum / count as f64
}

/// Sugeno estimate with the default rule table.
pub fn sugeno_predict(
    bpbi: f64,
    jamkesda: f64,
    breakpoints_bpbi: Breakpoints,
    breakpoints_jamkesda: Breakpoints,
    consequent_low: f64,
    consequent_high: f64,
) -> f64 {
    let strengths = rule_strengths(
        fuzzify(bpbi, breakpoints_bpbi.low, breakpoints_bpbi.high),
        fuzzify(jamkesda, breakpoints_jamkesda.low, breakpoints_jamkesda.high),
    );
    sugeno_defuzzify(
        &strengths,
        &RuleTable::default(),
        &Consequent::new(consequent_low, consequent_high),
    )
}

/// Simplified Mamdani estimate with the default rule table.
pub fn mamdani_predict(
    bpbi: f64,
    jamkesda: f64,
    breakpoints_bpbi: Breakpoints,
    breakpoints_jamkesda: Breakpoints,
    consequent_low: f64,
    consequent_high: f64,
) -> f64 {
    let strengths = rule_strengths(
        fuzzify(bpbi, breakpoints_bpbi.low, breakpoints_bpbi.high),
        fuzzify(jamkesda, breakpoints_jamkesda.low, breakpoints_jamkesda.high),
    );
    mamdani_defuzzify(
        &strengths,
        &RuleTable::default(),
        &Consequent::new(consequent_low, consequent_high),
    )
}

/// Intermediate values of one inference, for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inference {
    pub bpbi: MembershipPair,
    pub jamkesda: MembershipPair,
    pub strengths: RuleStrengths,
    pub value: f64,
}

/// A calibrated predictor.
///
/// Holds no state beyond its calibration; `predict` is pure and `Sync`, so a
/// single instance can be shared across a parallel row map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyPredictor {
    calibration: Calibration,
}

impl FuzzyPredictor {
    pub fn new(calibration: Calibration) -> Self {
        Self { calibration }
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn predict(&self, method: Method, bpbi: f64, jamkesda: f64) -> f64 {
        self.explain(method, bpbi, jamkesda).value
    }

    pub fn explain(&self, method: Method, bpbi: f64, jamkesda: f64) -> Inference {
        let c = &self.calibration;
        let m_bpbi = fuzzify(bpbi, c.bpbi.low, c.bpbi.high);
        let m_jamkesda = fuzzify(jamkesda, c.jamkesda.low, c.jamkesda.high);
        let strengths = rule_strengths(m_bpbi, m_jamkesda);

        let value = match method {
            Method::Sugeno => sugeno_defuzzify(&strengths, &c.rules, &c.consequent),
            Method::Mamdani => mamdani_defuzzify(&strengths, &c.rules, &c.consequent),
        };

        Inference {
            bpbi: m_bpbi,
            jamkesda: m_jamkesda,
            strengths,
            value,
        }
    }
}

impl Default for FuzzyPredictor {
    fn default() -> Self {
        Self::new(Calibration::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DEFAULT_BPBI_BREAKPOINTS, DEFAULT_CONSEQUENT, DEFAULT_JAMKESDA_BREAKPOINTS, Term};
    use proptest::prelude::*;

    const LOW: f64 = 148_805.0;
    const HIGH: f64 = 149_840.0;

    fn sugeno(bpbi: f64, jamkesda: f64) -> f64 {
        sugeno_predict(
            bpbi,
            jamkesda,
            DEFAULT_BPBI_BREAKPOINTS,
            DEFAULT_JAMKESDA_BREAKPOINTS,
            DEFAULT_CONSEQUENT.low,
            DEFAULT_CONSEQUENT.high,
        )
    }

    fn mamdani(bpbi: f64, jamkesda: f64) -> f64 {
        mamdani_predict(
            bpbi,
            jamkesda,
            DEFAULT_BPBI_BREAKPOINTS,
            DEFAULT_JAMKESDA_BREAKPOINTS,
            DEFAULT_CONSEQUENT.low,
            DEFAULT_CONSEQUENT.high,
        )
    }

    #[test]
    fn both_inputs_low_gives_low_consequent() {
        assert_eq!(sugeno(340_532.0, 41_924.0), LOW);
        assert_eq!(sugeno(300_000.0, 40_000.0), LOW);
    }

    #[test]
    fn both_inputs_high_gives_high_consequent() {
        assert_eq!(sugeno(360_936.0, 42_747.0), HIGH);
        assert_eq!(sugeno(400_000.0, 50_000.0), HIGH);
    }

    #[test]
    fn mid_band_input_is_strictly_between_consequents() {
        let y = sugeno(350_000.0, 42_300.0);
        assert!(y > LOW && y < HIGH, "got {y}");
    }

    #[test]
    fn mamdani_mid_band_picks_strongest_rule() {
        // (low, low) is the single strongest rule at this point.
        assert_eq!(mamdani(350_000.0, 42_300.0), LOW);
    }

    #[test]
    fn mamdani_averages_tied_rules() {
        // BPBI at its midpoint and Jamkesda fully high: (low,high) and
        // (high,high) tie at 0.5 and map to different outputs.
        let y = mamdani(350_734.0, 45_000.0);
        assert_eq!(y, (LOW + HIGH) / 2.0);
    }

    #[test]
    fn zero_total_strength_falls_back_to_zero() {
        let none = MembershipPair { low: 0.0, high: 0.0 };
        let s = rule_strengths(none, MembershipPair::FULLY_HIGH);
        assert_eq!(s.total(), 0.0);

        let rules = RuleTable::default();
        assert_eq!(sugeno_defuzzify(&s, &rules, &DEFAULT_CONSEQUENT), 0.0);
        assert_eq!(mamdani_defuzzify(&s, &rules, &DEFAULT_CONSEQUENT), 0.0);
    }

    #[test]
    fn nan_inputs_fall_back_to_zero() {
        assert_eq!(sugeno(f64::NAN, f64::NAN), 0.0);
        assert_eq!(mamdani(f64::NAN, f64::NAN), 0.0);
    }

    #[test]
    fn single_nan_input_falls_back_to_zero() {
        assert_eq!(sugeno(f64::NAN, 42_300.0), 0.0);
        assert_eq!(sugeno(350_000.0, f64::NAN), 0.0);
        assert_eq!(mamdani(f64::NAN, 42_300.0), 0.0);
        assert_eq!(mamdani(350_000.0, f64::NAN), 0.0);

        // Saturated finite input on the other side must not mask the NaN.
        assert_eq!(sugeno(300_000.0, f64::NAN), 0.0);
        assert_eq!(mamdani(f64::NAN, 50_000.0), 0.0);
    }

    #[test]
    fn nan_membership_poisons_every_rule() {
        let nan = MembershipPair { low: f64::NAN, high: f64::NAN };
        let s = rule_strengths(MembershipPair::FULLY_LOW, nan);
        assert!(s.0.iter().all(|w| w.is_nan()));
        assert!(s.max().is_nan());

        let inf = FuzzyPredictor::default().explain(Method::Mamdani, 350_000.0, f64::NAN);
        assert_eq!(inf.value, 0.0);
        assert!(inf.strengths.total().is_nan());
    }

    #[test]
    fn custom_rule_table_is_honoured() {
        let mut calibration = Calibration::default();
        calibration.rules = RuleTable {
            outputs: [Term::High, Term::High, Term::Low, Term::Low],
        };
        let p = FuzzyPredictor::new(calibration);
        assert_eq!(p.predict(Method::Sugeno, 300_000.0, 40_000.0), HIGH);
        assert_eq!(p.predict(Method::Sugeno, 400_000.0, 40_000.0), LOW);
    }

    #[test]
    fn explain_exposes_strengths_in_rule_order() {
        let inf = FuzzyPredictor::default().explain(Method::Sugeno, 300_000.0, 50_000.0);
        assert_eq!(inf.strengths.0, [0.0, 1.0, 0.0, 0.0]);
        assert_eq!(inf.value, LOW);
    }

    proptest! {
        #[test]
        fn sugeno_stays_within_consequents(
            bpbi in 300_000.0f64..400_000.0,
            jamkesda in 40_000.0f64..45_000.0,
        ) {
            let y = sugeno(bpbi, jamkesda);
            prop_assert!(y >= LOW - 1e-6 && y <= HIGH + 1e-6, "got {}", y);
        }

        #[test]
        fn sugeno_is_continuous(
            bpbi in 330_000.0f64..370_000.0,
            jamkesda in 41_500.0f64..43_000.0,
            d in -1.0f64..1.0,
        ) {
            // Lipschitz bound: one unit of input moves the output by far less
            // than the consequent span.
            let dy = (sugeno(bpbi + d, jamkesda + d) - sugeno(bpbi, jamkesda)).abs();
            prop_assert!(dy < 10.0, "jump of {} at ({}, {})", dy, bpbi, jamkesda);
        }

        #[test]
        fn mamdani_has_three_possible_outputs(
            bpbi in 300_000.0f64..400_000.0,
            jamkesda in 40_000.0f64..45_000.0,
        ) {
            let y = mamdani(bpbi, jamkesda);
            prop_assert!(y == LOW || y == HIGH || y == (LOW + HIGH) / 2.0, "got {}", y);
        }
    }
}
