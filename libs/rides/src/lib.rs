//! Ride matching core for the rideshare application
//!
//! This crate holds the pure decision logic used by the services: the
//! ride request model, the comparators that feed the compatibility score,
//! the scorer itself, and the fare split calculator. Nothing in here
//! performs I/O.

pub mod address;
pub mod fare;
pub mod geo;
pub mod models;
pub mod route;
pub mod scorer;
pub mod time_window;

pub use address::{AddressMatch, address_similarity};
pub use fare::{FareError, FareSplit, split_fare};
pub use geo::distance_km;
pub use models::{
    CandidateMatch, CandidateMatchStatus, Coordinate, GenderPreference, MatchableRide,
    ProfileSnapshot, RequestStatus, RideRequest, ShareRequest, ShareRequestStatus,
};
pub use route::route_similarity;
pub use scorer::{CompatibilityResult, score_pair};
pub use time_window::time_windows_overlap;

/// Example usage of the scorer
///
/// ```rust
/// use chrono::Utc;
/// use rides::{Coordinate, GenderPreference, RequestStatus, RideRequest, score_pair};
/// use uuid::Uuid;
///
/// let ride = |lat: f64, lng: f64| RideRequest {
///     id: Uuid::new_v4(),
///     user_id: Uuid::new_v4(),
///     pickup: Some(Coordinate::new(lat, lng)),
///     drop: Some(Coordinate::new(12.93, 77.62)),
///     pickup_text: "MG Road, 560001".to_string(),
///     drop_text: "Koramangala 5th Block".to_string(),
///     time_start: "2024-05-01T09:00:00".to_string(),
///     time_end: "2024-05-01T09:30:00".to_string(),
///     gender_preference: GenderPreference::Any,
///     route_polyline: None,
///     status: RequestStatus::Active,
///     created_at: Utc::now(),
/// };
///
/// let (a, b) = (ride(12.9716, 77.5946), ride(12.9720, 77.5950));
/// let result = score_pair(&a.matchable().unwrap(), &b.matchable().unwrap());
/// assert!(result.is_match);
/// ```
pub fn example_usage() {}
