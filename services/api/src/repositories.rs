//! Store interfaces and their PostgreSQL implementations
//!
//! The matching services only talk to these traits, so they can run
//! against PostgreSQL in production and against an in-memory store in
//! tests.

use std::future::Future;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rides::{
    CandidateMatch, CandidateMatchStatus, ProfileSnapshot, RequestStatus, RideRequest,
    ShareRequest, ShareRequestStatus,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::NewRideRequest;

pub mod candidate_match;
#[cfg(test)]
pub mod memory;
pub mod profile;
pub mod ride_request;
pub mod share_request;

pub use candidate_match::CandidateMatchRepository;
pub use profile::ProfileRepository;
pub use ride_request::RideRequestRepository;
pub use share_request::ShareRequestRepository;

/// Liveness of the backing storage
pub trait HealthCheck: Clone + Send + Sync + 'static {
    fn is_healthy(&self) -> impl Future<Output = bool> + Send;
}

impl HealthCheck for PgPool {
    async fn is_healthy(&self) -> bool {
        matches!(common::database::health_check(self).await, Ok(true))
    }
}

/// Access to persisted ride requests
pub trait RideRequestStore: Clone + Send + Sync + 'static {
    /// Get a ride request by ID
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = Result<Option<RideRequest>>> + Send;

    /// List every request whose status is `active`, expired or not
    fn list_active(&self) -> impl Future<Output = Result<Vec<RideRequest>>> + Send;

    /// List a user's requests, newest first
    fn list_by_user(&self, user_id: Uuid) -> impl Future<Output = Result<Vec<RideRequest>>> + Send;

    /// Persist a new active request owned by `user_id`
    fn create(
        &self,
        user_id: Uuid,
        request: &NewRideRequest,
    ) -> impl Future<Output = Result<RideRequest>> + Send;

    /// Overwrite the status field
    fn set_status(&self, id: Uuid, status: RequestStatus)
    -> impl Future<Output = Result<()>> + Send;

    /// Flip an expired request to `inactive` and record when that was noticed
    fn mark_expired(
        &self,
        id: Uuid,
        expired_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Point lookups of user profiles
pub trait ProfileStore: Clone + Send + Sync + 'static {
    /// Find a profile snapshot, `None` when the user has no profile
    fn find_profile(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Option<ProfileSnapshot>>> + Send;
}

/// Persisted candidate match proposals
pub trait CandidateMatchStore: Clone + Send + Sync + 'static {
    /// Insert unless a record with the same ID exists; returns whether it was inserted
    fn create_if_absent(
        &self,
        candidate: &CandidateMatch,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// List a user's candidate matches, best score first
    fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<CandidateMatchStatus>,
    ) -> impl Future<Output = Result<Vec<CandidateMatch>>> + Send;

    /// Get a candidate match by ID
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = Result<Option<CandidateMatch>>> + Send;

    /// Overwrite the status field
    fn set_status(
        &self,
        id: Uuid,
        status: CandidateMatchStatus,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// Share requests exchanged between matched riders
pub trait ShareRequestStore: Clone + Send + Sync + 'static {
    /// Insert unless the sender already has a pending request to the same
    /// recipient; returns whether it was inserted
    fn create_pending(&self, share: &ShareRequest) -> impl Future<Output = Result<bool>> + Send;

    /// The open request from `sender_id` to `recipient_id`, if any
    fn find_pending(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
    ) -> impl Future<Output = Result<Option<ShareRequest>>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = Result<Option<ShareRequest>>> + Send;

    /// Requests sent or received by a user, newest first
    fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<ShareRequestStatus>,
    ) -> impl Future<Output = Result<Vec<ShareRequest>>> + Send;

    /// Resolve a pending request; returns false when it was no longer pending
    fn respond(
        &self,
        id: Uuid,
        status: ShareRequestStatus,
        responded_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool>> + Send;

    /// Promote an accepted request to mutual; returns false when it was not accepted
    fn promote_to_mutual(
        &self,
        id: Uuid,
        mutual_match_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool>> + Send;
}
