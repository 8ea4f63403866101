//! Pairwise ride compatibility scoring
//!
//! Six independent criteria each add points and may count as a passed
//! check:
//!
//! | criterion         | points                         | passed check |
//! |-------------------|--------------------------------|--------------|
//! | pickup distance   | 20 within 5 km, 10 within 10 km | 5 km only   |
//! | pickup text       | 15 (+5 postal), else 5 if score > 20 | match  |
//! | drop text         | 20 (+5 postal), else 10 if score > 20 | match |
//! | route             | 15 if similar, else 10 when both texts matched | similar |
//! | time window       | 15                             | overlap      |
//! | gender preference | 15                             | compatible   |
//!
//! A pair qualifies when both texts match, or when it has two passed checks
//! or 30 points, and at least 20 points.

use serde::Serialize;
use tracing::debug;

use crate::address::{AddressMatch, address_similarity};
use crate::geo::distance_km;
use crate::models::MatchableRide;
use crate::route::route_similarity;
use crate::time_window::time_windows_overlap;

pub const FULL_DISTANCE_KM: f64 = 5.0;
pub const PARTIAL_DISTANCE_KM: f64 = 10.0;

const DISTANCE_POINTS: u32 = 20;
const PARTIAL_DISTANCE_POINTS: u32 = 10;
const PICKUP_TEXT_POINTS: u32 = 15;
const PARTIAL_PICKUP_TEXT_POINTS: u32 = 5;
const DROP_TEXT_POINTS: u32 = 20;
const PARTIAL_DROP_TEXT_POINTS: u32 = 10;
const PINCODE_BONUS_POINTS: u32 = 5;
const ROUTE_POINTS: u32 = 15;
const SUBSTITUTE_ROUTE_POINTS: u32 = 10;
const TIME_POINTS: u32 = 15;
const GENDER_POINTS: u32 = 15;

/// Address score above which a non-matching text still earns partial points
const PARTIAL_TEXT_SCORE: f64 = 20.0;

const MAX_SCORE: u32 = 100;
const BOTH_LOCATIONS_SCORE_FLOOR: u32 = 50;
const BOTH_LOCATIONS_CHECKS_FLOOR: u32 = 2;
const MIN_PASSED_CHECKS: u32 = 2;
const CORROBORATED_SCORE: u32 = 30;
const MIN_SCORE: u32 = 20;

/// Outcome of scoring one pair of requests
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityResult {
    pub score: u32,
    pub passed_checks: u32,
    pub is_match: bool,
    /// Distance between pickups, rounded to one decimal
    pub distance_km: f64,
    pub both_locations_match: bool,
    pub pickup: AddressMatch,
    pub drop: AddressMatch,
}

fn text_points(result: &AddressMatch, full: u32, partial: u32) -> (u32, bool) {
    if result.is_match {
        let bonus = if result.pincode_match {
            PINCODE_BONUS_POINTS
        } else {
            0
        };
        (full + bonus, true)
    } else if result.score > PARTIAL_TEXT_SCORE {
        (partial, false)
    } else {
        (0, false)
    }
}

/// Score `candidate` against `origin`, the querying or newly created request
pub fn score_pair(origin: &MatchableRide<'_>, candidate: &MatchableRide<'_>) -> CompatibilityResult {
    let a = origin.request;
    let b = candidate.request;

    let mut score = 0;
    let mut passed_checks = 0;

    let distance = distance_km(origin.pickup, candidate.pickup);
    if distance <= FULL_DISTANCE_KM {
        score += DISTANCE_POINTS;
        passed_checks += 1;
    } else if distance <= PARTIAL_DISTANCE_KM {
        score += PARTIAL_DISTANCE_POINTS;
    }

    let pickup = address_similarity(&a.pickup_text, &b.pickup_text, true);
    let (points, passed) = text_points(&pickup, PICKUP_TEXT_POINTS, PARTIAL_PICKUP_TEXT_POINTS);
    score += points;
    passed_checks += u32::from(passed);

    let drop = address_similarity(&a.drop_text, &b.drop_text, true);
    let (points, passed) = text_points(&drop, DROP_TEXT_POINTS, PARTIAL_DROP_TEXT_POINTS);
    score += points;
    passed_checks += u32::from(passed);

    let both_locations_match = pickup.is_match && drop.is_match;

    if route_similarity(a.route_polyline.as_deref(), b.route_polyline.as_deref()) {
        score += ROUTE_POINTS;
        passed_checks += 1;
    } else if both_locations_match {
        score += SUBSTITUTE_ROUTE_POINTS;
    }

    if time_windows_overlap(&a.time_start, &a.time_end, &b.time_start, &b.time_end) {
        score += TIME_POINTS;
        passed_checks += 1;
    }

    if a.gender_preference.is_compatible_with(&b.gender_preference) {
        score += GENDER_POINTS;
        passed_checks += 1;
    }

    if both_locations_match {
        score = score.max(BOTH_LOCATIONS_SCORE_FLOOR);
        passed_checks = passed_checks.max(BOTH_LOCATIONS_CHECKS_FLOOR);
    }

    let score = score.min(MAX_SCORE);
    let is_match = both_locations_match
        || ((passed_checks >= MIN_PASSED_CHECKS || score >= CORROBORATED_SCORE)
            && score >= MIN_SCORE);

    debug!(
        origin = %a.id,
        candidate = %b.id,
        score,
        passed_checks,
        distance_km = distance,
        is_match,
        "Scored ride pair"
    );

    CompatibilityResult {
        score,
        passed_checks,
        is_match,
        distance_km: (distance * 10.0).round() / 10.0,
        both_locations_match,
        pickup,
        drop,
    }
}
