//! Ride request and candidate match models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for deterministic candidate match identifiers
const CANDIDATE_MATCH_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a8e_93b4_4d57_a0e2_5c1d_7b9f_3e40);

/// A point on the globe, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Who a rider is willing to share with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderPreference {
    #[default]
    Any,
    Male,
    Female,
}

impl GenderPreference {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenderPreference::Any => "any",
            GenderPreference::Male => "male",
            GenderPreference::Female => "female",
        }
    }

    /// Two preferences are compatible when either side accepts anyone or both agree
    pub fn is_compatible_with(&self, other: &GenderPreference) -> bool {
        *self == GenderPreference::Any || *other == GenderPreference::Any || self == other
    }
}

impl FromStr for GenderPreference {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "any" => Ok(GenderPreference::Any),
            "male" => Ok(GenderPreference::Male),
            "female" => Ok(GenderPreference::Female),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Ride request lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Active,
    Inactive,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Active => "active",
            RequestStatus::Inactive => "inactive",
        }
    }
}

impl FromStr for RequestStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(RequestStatus::Active),
            "inactive" => Ok(RequestStatus::Inactive),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Candidate match lifecycle state, ordered from first shown to acted upon
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandidateMatchStatus {
    #[default]
    New,
    Viewed,
    Sent,
}

impl CandidateMatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateMatchStatus::New => "new",
            CandidateMatchStatus::Viewed => "viewed",
            CandidateMatchStatus::Sent => "sent",
        }
    }

    /// Status only ever moves forward; re-applying the current status is a no-op
    pub fn can_advance_to(&self, next: CandidateMatchStatus) -> bool {
        next >= *self
    }
}

impl FromStr for CandidateMatchStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(CandidateMatchStatus::New),
            "viewed" => Ok(CandidateMatchStatus::Viewed),
            "sent" => Ok(CandidateMatchStatus::Sent),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// Error returned when parsing an enum from its stored text form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variant: {}", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

/// One user's ask for a shared ride
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RideRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub pickup: Option<Coordinate>,
    pub drop: Option<Coordinate>,
    pub pickup_text: String,
    pub drop_text: String,
    /// Raw timestamp as submitted by the client; parsed lazily when compared
    pub time_start: String,
    pub time_end: String,
    pub gender_preference: GenderPreference,
    pub route_polyline: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

impl RideRequest {
    /// Whether the request has outlived its matching window, regardless of status
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at > ttl
    }

    pub fn is_active(&self) -> bool {
        self.status == RequestStatus::Active
    }

    /// Borrow the request as a matchable view.
    ///
    /// Returns `None` when pickup/drop coordinates are missing or either
    /// address text is blank; such requests never take part in matching.
    pub fn matchable(&self) -> Option<MatchableRide<'_>> {
        let pickup = self.pickup?;
        let drop = self.drop?;

        if self.pickup_text.trim().is_empty() || self.drop_text.trim().is_empty() {
            return None;
        }

        Some(MatchableRide {
            request: self,
            pickup,
            drop,
        })
    }
}

/// A ride request known to carry everything the scorer needs
#[derive(Debug, Clone, Copy)]
pub struct MatchableRide<'a> {
    pub request: &'a RideRequest,
    pub pickup: Coordinate,
    pub drop: Coordinate,
}

/// Denormalized view of a user's profile at the time a match is proposed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    pub name: String,
    pub gender: String,
    pub age: Option<i32>,
    pub phone: String,
    pub photo_url: Option<String>,
}

impl Default for ProfileSnapshot {
    fn default() -> Self {
        Self {
            name: "User".to_string(),
            gender: "N/A".to_string(),
            age: None,
            phone: "Not provided".to_string(),
            photo_url: None,
        }
    }
}

/// A directional proposal: `user_id` should be shown `matched_user_id`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateMatch {
    pub id: Uuid,
    pub user_id: Uuid,
    pub ride_request_id: Uuid,
    pub matched_user_id: Uuid,
    pub matched_ride_request_id: Uuid,
    pub matched_profile: ProfileSnapshot,
    pub pickup_text: String,
    pub drop_text: String,
    pub time_start: String,
    pub time_end: String,
    pub compatibility_score: u32,
    pub distance_km: f64,
    pub status: CandidateMatchStatus,
    pub created_at: DateTime<Utc>,
}

impl CandidateMatch {
    /// Build the proposal shown to the owner of `owner`, describing `matched`
    pub fn propose(
        owner: &RideRequest,
        matched: &RideRequest,
        matched_profile: ProfileSnapshot,
        compatibility_score: u32,
        distance_km: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Self::deterministic_id(owner, matched),
            user_id: owner.user_id,
            ride_request_id: owner.id,
            matched_user_id: matched.user_id,
            matched_ride_request_id: matched.id,
            matched_profile,
            pickup_text: matched.pickup_text.clone(),
            drop_text: matched.drop_text.clone(),
            time_start: matched.time_start.clone(),
            time_end: matched.time_end.clone(),
            compatibility_score,
            distance_km,
            status: CandidateMatchStatus::New,
            created_at,
        }
    }

    /// Identifier derived from `(min(user ids), owner request, matched request)`.
    ///
    /// Stable across re-deliveries of the same pair, distinct per direction.
    pub fn deterministic_id(owner: &RideRequest, matched: &RideRequest) -> Uuid {
        let lower_user = owner.user_id.min(matched.user_id);
        let key = format!("{}:{}:{}", lower_user, owner.id, matched.id);
        Uuid::new_v5(&CANDIDATE_MATCH_NAMESPACE, key.as_bytes())
    }
}

/// State of a share request between two riders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareRequestStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    /// Both riders agreed; contact details may be exchanged
    Mutual,
}

impl ShareRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShareRequestStatus::Pending => "pending",
            ShareRequestStatus::Accepted => "accepted",
            ShareRequestStatus::Declined => "declined",
            ShareRequestStatus::Mutual => "mutual",
        }
    }

    /// `pending` resolves to `accepted` or `declined`; only `accepted` is promoted to `mutual`
    pub fn can_transition_to(&self, next: ShareRequestStatus) -> bool {
        use ShareRequestStatus::*;
        matches!(
            (self, next),
            (Pending, Accepted) | (Pending, Declined) | (Accepted, Mutual)
        )
    }
}

impl FromStr for ShareRequestStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ShareRequestStatus::Pending),
            "accepted" => Ok(ShareRequestStatus::Accepted),
            "declined" => Ok(ShareRequestStatus::Declined),
            "mutual" => Ok(ShareRequestStatus::Mutual),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// An invitation from one rider to share a ride with a matched rider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub sender_ride_request_id: Uuid,
    pub recipient_ride_request_id: Uuid,
    pub status: ShareRequestStatus,
    pub created_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
    pub mutual_match_at: Option<DateTime<Utc>>,
}

impl ShareRequest {
    /// A new pending request from the owner of `sender` to the owner of `recipient`
    pub fn new(sender: &RideRequest, recipient: &RideRequest, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id: sender.user_id,
            recipient_id: recipient.user_id,
            sender_ride_request_id: sender.id,
            recipient_ride_request_id: recipient.id,
            status: ShareRequestStatus::Pending,
            created_at,
            responded_at: None,
            mutual_match_at: None,
        }
    }

    pub fn involves(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id || self.recipient_id == user_id
    }

    /// Whether `user_id` received this request rather than sent it
    pub fn is_incoming_for(&self, user_id: Uuid) -> bool {
        self.recipient_id == user_id
    }
}
