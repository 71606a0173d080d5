//! Fuzzy inference core: membership ramps, rule strengths, defuzzification.
//!
//! Everything here is pure arithmetic on `f64`; nothing logs or allocates.

pub mod inference;
pub mod membership;

pub use inference::*;
pub use membership::*;
