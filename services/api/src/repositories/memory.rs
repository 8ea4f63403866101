//! In-memory store used by the service tests

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rides::{
    CandidateMatch, CandidateMatchStatus, ProfileSnapshot, RequestStatus, RideRequest,
    ShareRequest, ShareRequestStatus,
};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{CandidateMatchStore, HealthCheck, ProfileStore, RideRequestStore, ShareRequestStore};
use crate::models::NewRideRequest;

#[derive(Debug, Default)]
struct Tables {
    ride_requests: Vec<RideRequest>,
    expired_at: HashMap<Uuid, DateTime<Utc>>,
    profiles: HashMap<Uuid, ProfileSnapshot>,
    failing_profiles: HashSet<Uuid>,
    candidate_matches: Vec<CandidateMatch>,
    share_requests: Vec<ShareRequest>,
    fail_listing: bool,
}

/// Implements every store trait over shared in-process tables
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_request(&self, request: RideRequest) {
        self.tables.lock().await.ride_requests.push(request);
    }

    pub async fn insert_profile(&self, user_id: Uuid, profile: ProfileSnapshot) {
        self.tables.lock().await.profiles.insert(user_id, profile);
    }

    /// Make profile lookups for `user_id` return an error
    pub async fn fail_profile_lookup(&self, user_id: Uuid) {
        self.tables.lock().await.failing_profiles.insert(user_id);
    }

    /// Make listing active requests return an error
    pub async fn fail_listing(&self) {
        self.tables.lock().await.fail_listing = true;
    }

    pub async fn request(&self, id: Uuid) -> Option<RideRequest> {
        let tables = self.tables.lock().await;
        tables.ride_requests.iter().find(|r| r.id == id).cloned()
    }

    pub async fn expired_at(&self, id: Uuid) -> Option<DateTime<Utc>> {
        self.tables.lock().await.expired_at.get(&id).copied()
    }

    pub async fn candidate_matches(&self) -> Vec<CandidateMatch> {
        self.tables.lock().await.candidate_matches.clone()
    }

    pub async fn share_requests(&self) -> Vec<ShareRequest> {
        self.tables.lock().await.share_requests.clone()
    }
}

impl HealthCheck for InMemoryStore {
    async fn is_healthy(&self) -> bool {
        true
    }
}

impl RideRequestStore for InMemoryStore {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<RideRequest>> {
        Ok(self.request(id).await)
    }

    async fn list_active(&self) -> Result<Vec<RideRequest>> {
        let tables = self.tables.lock().await;
        if tables.fail_listing {
            anyhow::bail!("connection reset while listing ride requests");
        }

        Ok(tables
            .ride_requests
            .iter()
            .filter(|r| r.status == RequestStatus::Active)
            .cloned()
            .collect())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<RideRequest>> {
        let tables = self.tables.lock().await;
        let mut requests: Vec<RideRequest> = tables
            .ride_requests
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn create(&self, user_id: Uuid, request: &NewRideRequest) -> Result<RideRequest> {
        let created = RideRequest {
            id: Uuid::new_v4(),
            user_id,
            pickup: request.pickup,
            drop: request.drop,
            pickup_text: request.pickup_text.trim().to_string(),
            drop_text: request.drop_text.trim().to_string(),
            time_start: request.time_start.clone(),
            time_end: request.time_end.clone(),
            gender_preference: request.gender_preference,
            route_polyline: request.route_polyline.clone().filter(|p| !p.is_empty()),
            status: RequestStatus::Active,
            created_at: Utc::now(),
        };

        self.insert_request(created.clone()).await;
        Ok(created)
    }

    async fn set_status(&self, id: Uuid, status: RequestStatus) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if let Some(request) = tables.ride_requests.iter_mut().find(|r| r.id == id) {
            request.status = status;
        }
        Ok(())
    }

    async fn mark_expired(&self, id: Uuid, expired_at: DateTime<Utc>) -> Result<()> {
        let mut guard = self.tables.lock().await;
        let tables = &mut *guard;
        if let Some(request) = tables.ride_requests.iter_mut().find(|r| r.id == id) {
            request.status = RequestStatus::Inactive;
            tables.expired_at.entry(id).or_insert(expired_at);
        }
        Ok(())
    }
}

impl ProfileStore for InMemoryStore {
    async fn find_profile(&self, user_id: Uuid) -> Result<Option<ProfileSnapshot>> {
        let tables = self.tables.lock().await;
        if tables.failing_profiles.contains(&user_id) {
            anyhow::bail!("profile lookup timed out for {}", user_id);
        }
        Ok(tables.profiles.get(&user_id).cloned())
    }
}

impl CandidateMatchStore for InMemoryStore {
    async fn create_if_absent(&self, candidate: &CandidateMatch) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        if tables.candidate_matches.iter().any(|c| c.id == candidate.id) {
            return Ok(false);
        }
        tables.candidate_matches.push(candidate.clone());
        Ok(true)
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<CandidateMatchStatus>,
    ) -> Result<Vec<CandidateMatch>> {
        let tables = self.tables.lock().await;
        let mut matches: Vec<CandidateMatch> = tables
            .candidate_matches
            .iter()
            .filter(|c| c.user_id == user_id && status.is_none_or(|s| c.status == s))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.compatibility_score.cmp(&a.compatibility_score));
        Ok(matches)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<CandidateMatch>> {
        let tables = self.tables.lock().await;
        Ok(tables.candidate_matches.iter().find(|c| c.id == id).cloned())
    }

    async fn set_status(&self, id: Uuid, status: CandidateMatchStatus) -> Result<()> {
        let mut tables = self.tables.lock().await;
        if let Some(candidate) = tables.candidate_matches.iter_mut().find(|c| c.id == id) {
            candidate.status = status;
        }
        Ok(())
    }
}

impl ShareRequestStore for InMemoryStore {
    async fn create_pending(&self, share: &ShareRequest) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let duplicate = tables.share_requests.iter().any(|s| {
            s.status == ShareRequestStatus::Pending
                && s.sender_id == share.sender_id
                && s.recipient_id == share.recipient_id
        });
        if duplicate {
            return Ok(false);
        }
        tables.share_requests.push(share.clone());
        Ok(true)
    }

    async fn find_pending(&self, sender_id: Uuid, recipient_id: Uuid) -> Result<Option<ShareRequest>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .share_requests
            .iter()
            .find(|s| {
                s.status == ShareRequestStatus::Pending
                    && s.sender_id == sender_id
                    && s.recipient_id == recipient_id
            })
            .cloned())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<ShareRequest>> {
        let tables = self.tables.lock().await;
        Ok(tables.share_requests.iter().find(|s| s.id == id).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<ShareRequestStatus>,
    ) -> Result<Vec<ShareRequest>> {
        let tables = self.tables.lock().await;
        let mut shares: Vec<ShareRequest> = tables
            .share_requests
            .iter()
            .filter(|s| s.involves(user_id) && status.is_none_or(|st| s.status == st))
            .cloned()
            .collect();
        shares.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(shares)
    }

    async fn respond(
        &self,
        id: Uuid,
        status: ShareRequestStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        match tables
            .share_requests
            .iter_mut()
            .find(|s| s.id == id && s.status == ShareRequestStatus::Pending)
        {
            Some(share) => {
                share.status = status;
                share.responded_at = Some(responded_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn promote_to_mutual(&self, id: Uuid, mutual_match_at: DateTime<Utc>) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        match tables
            .share_requests
            .iter_mut()
            .find(|s| s.id == id && s.status == ShareRequestStatus::Accepted)
        {
            Some(share) => {
                share.status = ShareRequestStatus::Mutual;
                share.mutual_match_at = Some(mutual_match_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
