//! Input data sources.

pub mod sample;

pub use sample::default_rows;
