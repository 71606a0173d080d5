//! Built-in reference year used when no input file is given.
//!
//! Twelve months of actual PBI, BPBI and Jamkesda participant counts. The
//! default calibration breakpoints are the BPBI and Jamkesda min/max of this
//! year, and the default consequents are the PBI min/max.

use crate::domain::MonthRow;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

const PBI: [f64; 12] = [
    148_947.0, 148_907.0, 148_868.0, 148_823.0, 148_827.0, 148_805.0, 149_097.0, 149_150.0, 149_361.0,
    149_345.0, 149_733.0, 149_840.0,
];

const BPBI: [f64; 12] = [
    341_886.0, 340_532.0, 342_814.0, 347_362.0, 349_364.0, 349_993.0, 350_033.0, 349_978.0, 352_938.0,
    357_049.0, 359_199.0, 360_936.0,
];

const JAMKESDA: [f64; 12] = [
    42_747.0, 42_719.0, 42_715.0, 42_708.0, 42_652.0, 42_609.0, 42_644.0, 42_610.0, 42_558.0, 42_201.0,
    41_924.0, 42_701.0,
];

/// The reference year as monthly rows.
pub fn default_rows() -> Vec<MonthRow> {
    (0..MONTHS.len())
        .map(|i| MonthRow {
            label: MONTHS[i].to_string(),
            actual: Some(PBI[i]),
            bpbi: BPBI[i],
            jamkesda: JAMKESDA[i],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibrate::derive_calibration;
    use crate::domain::Calibration;

    #[test]
    fn reference_year_reproduces_default_calibration() {
        let derived = derive_calibration(&default_rows()).unwrap();
        let default = Calibration::default();
        assert_eq!(derived.bpbi, default.bpbi);
        assert_eq!(derived.jamkesda, default.jamkesda);
        assert_eq!(derived.consequent, default.consequent);
    }
}
