//! Fare splitting between co-riders

use serde::Serialize;
use thiserror::Error;

pub const MIN_RIDERS: u32 = 2;
pub const MAX_RIDERS: u32 = 10;

/// Invalid fare split input
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FareError {
    #[error("Total fare must be a non-negative amount")]
    InvalidTotal,

    #[error("Number of riders must be between 2 and 10, got {0}")]
    InvalidRiderCount(u32),
}

/// Per-person share of a cab fare
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FareSplit {
    pub total_fare: f64,
    pub riders: u32,
    pub per_person: f64,
}

/// Split `total_fare` evenly between `riders`, rounding the share to two decimals
pub fn split_fare(total_fare: f64, riders: u32) -> Result<FareSplit, FareError> {
    if !total_fare.is_finite() || total_fare < 0.0 {
        return Err(FareError::InvalidTotal);
    }

    if !(MIN_RIDERS..=MAX_RIDERS).contains(&riders) {
        return Err(FareError::InvalidRiderCount(riders));
    }

    let per_person = (total_fare / f64::from(riders) * 100.0).round() / 100.0;

    Ok(FareSplit {
        total_fare,
        riders,
        per_person,
    })
}
