//! API models for request and response payloads

use rides::{
    CandidateMatch, CandidateMatchStatus, Coordinate, GenderPreference, ShareRequest,
    ShareRequestStatus,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to create a ride request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRideRequest {
    pub pickup: Option<Coordinate>,
    pub drop: Option<Coordinate>,
    #[serde(default)]
    pub pickup_text: String,
    #[serde(default)]
    pub drop_text: String,
    #[serde(default)]
    pub time_start: String,
    #[serde(default)]
    pub time_end: String,
    #[serde(default)]
    pub gender_preference: GenderPreference,
    pub route_polyline: Option<String>,
}

impl NewRideRequest {
    /// Check the fields a rider must fill in; coordinates stay optional
    pub fn validate(&self) -> Result<(), String> {
        if self.pickup_text.trim().is_empty() {
            return Err("pickupText is required".to_string());
        }

        if self.drop_text.trim().is_empty() {
            return Err("dropText is required".to_string());
        }

        if self.time_start.trim().is_empty() || self.time_end.trim().is_empty() {
            return Err("timeStart and timeEnd are required".to_string());
        }

        Ok(())
    }
}

/// Payload of the on-demand match query
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindMatchesRequest {
    pub request_id: Option<Uuid>,
}

/// One match returned by the on-demand query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub user_id: Uuid,
    pub ride_request_id: Uuid,
    pub name: String,
    pub gender: String,
    pub age: Option<i32>,
    pub phone: String,
    pub photo_url: Option<String>,
    pub pickup_text: String,
    pub drop_text: String,
    pub time_start: String,
    pub time_end: String,
    pub compatibility_score: u32,
    pub distance: f64,
}

/// Response of the on-demand match query
#[derive(Debug, Clone, Serialize)]
pub struct FindMatchesResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<MatchSummary>>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub expired: bool,
}

/// Query parameters for candidate match listing
#[derive(Debug, Clone, Deserialize)]
pub struct CandidateMatchQuery {
    pub status: Option<CandidateMatchStatus>,
}

/// Request to advance a candidate match
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCandidateStatusRequest {
    pub status: CandidateMatchStatus,
}

/// Candidate match listing
#[derive(Debug, Clone, Serialize)]
pub struct CandidateMatchListResponse {
    pub items: Vec<CandidateMatch>,
    pub total: usize,
}

/// Request to invite a matched rider
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendShareRequest {
    pub ride_request_id: Option<Uuid>,
    pub matched_ride_request_id: Option<Uuid>,
}

/// Query parameters for share request listing
#[derive(Debug, Clone, Deserialize)]
pub struct ShareRequestQuery {
    pub status: Option<ShareRequestStatus>,
}

/// A share request as seen by one of its two riders
#[derive(Debug, Clone, Serialize)]
pub struct ShareRequestView {
    #[serde(flatten)]
    pub request: ShareRequest,
    /// `true` when the caller is the recipient
    pub incoming: bool,
}

impl ShareRequestView {
    pub fn for_user(request: ShareRequest, user_id: Uuid) -> Self {
        let incoming = request.is_incoming_for(user_id);
        Self { request, incoming }
    }
}

/// Request for a fare split
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareSplitRequest {
    pub total_fare: f64,
    pub riders: u32,
}
