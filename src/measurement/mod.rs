//! Measurement model quality: indicator validity and construct reliability.

pub mod reliability;
pub mod validity;

pub use self::reliability::ConstructReliability;
pub use self::validity::{IndicatorValidity, MeasurementValidator, ValidityReport};
