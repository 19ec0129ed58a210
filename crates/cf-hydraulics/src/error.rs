//! Error types for hydraulic calculations.

use cf_core::error::CfError;
use thiserror::Error;

/// Errors that can occur in gate and storage calculations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HydraulicsError {
    #[error("Invalid parameter {parameter} = {value} (expected {expected})")]
    InvalidParameter {
        parameter: &'static str,
        value: f64,
        expected: &'static str,
    },

    #[error("Non-physical value: {what}")]
    NonPhysical { what: &'static str },
}

pub type HydraulicsResult<T> = Result<T, HydraulicsError>;

impl From<CfError> for HydraulicsError {
    fn from(e: CfError) -> Self {
        match e {
            CfError::OutOfRange {
                what,
                value,
                expected,
            } => HydraulicsError::InvalidParameter {
                parameter: what,
                value,
                expected,
            },
            CfError::NonFinite { what, value } => HydraulicsError::InvalidParameter {
                parameter: what,
                value,
                expected: "finite",
            },
        }
    }
}
