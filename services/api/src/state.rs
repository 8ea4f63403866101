//! Application state shared across handlers

use chrono::Duration;
use sqlx::PgPool;

use crate::matching::{MatchIngestService, MatchQueryService};
use crate::middleware::AuthConfig;
use crate::repositories::{
    CandidateMatchRepository, CandidateMatchStore, HealthCheck, ProfileRepository, ProfileStore,
    RideRequestRepository, RideRequestStore, ShareRequestRepository, ShareRequestStore,
};

/// The set of stores a running service is wired to
pub trait Backend: Clone + Send + Sync + 'static {
    type Requests: RideRequestStore;
    type Profiles: ProfileStore;
    type Candidates: CandidateMatchStore;
    type Shares: ShareRequestStore;
    type Health: HealthCheck;
}

/// PostgreSQL-backed stores
#[derive(Clone)]
pub struct Postgres;

impl Backend for Postgres {
    type Requests = RideRequestRepository;
    type Profiles = ProfileRepository;
    type Candidates = CandidateMatchRepository;
    type Shares = ShareRequestRepository;
    type Health = PgPool;
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState<B: Backend> {
    pub health: B::Health,
    pub ride_requests: B::Requests,
    pub candidate_matches: B::Candidates,
    pub share_requests: B::Shares,
    pub match_query: MatchQueryService<B::Requests, B::Profiles>,
    pub match_ingest: MatchIngestService<B::Requests, B::Profiles, B::Candidates>,
    pub auth: AuthConfig,
}

impl<B: Backend> AppState<B> {
    /// Wire the matching services on top of the given stores
    pub fn new(
        health: B::Health,
        ride_requests: B::Requests,
        profiles: B::Profiles,
        candidate_matches: B::Candidates,
        share_requests: B::Shares,
        request_ttl: Duration,
        auth: AuthConfig,
    ) -> Self {
        let match_query =
            MatchQueryService::new(ride_requests.clone(), profiles.clone(), request_ttl);
        let match_ingest = MatchIngestService::new(
            ride_requests.clone(),
            profiles,
            candidate_matches.clone(),
            request_ttl,
        );

        Self {
            health,
            ride_requests,
            candidate_matches,
            share_requests,
            match_query,
            match_ingest,
            auth,
        }
    }
}

impl AppState<Postgres> {
    /// Build every PostgreSQL repository from one pool
    pub fn from_pool(pool: PgPool, request_ttl: Duration, auth: AuthConfig) -> Self {
        Self::new(
            pool.clone(),
            RideRequestRepository::new(pool.clone()),
            ProfileRepository::new(pool.clone()),
            CandidateMatchRepository::new(pool.clone()),
            ShareRequestRepository::new(pool),
            request_ttl,
            auth,
        )
    }
}

#[cfg(test)]
impl Backend for crate::repositories::memory::InMemoryStore {
    type Requests = Self;
    type Profiles = Self;
    type Candidates = Self;
    type Shares = Self;
    type Health = Self;
}

#[cfg(test)]
impl AppState<crate::repositories::memory::InMemoryStore> {
    /// Every store backed by the same in-memory tables
    pub fn in_memory(
        store: crate::repositories::memory::InMemoryStore,
        request_ttl: Duration,
        auth: AuthConfig,
    ) -> Self {
        Self::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            request_ttl,
            auth,
        )
    }
}
