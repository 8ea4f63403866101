//! Creation-triggered fan-out of candidate matches
//!
//! Runs once per newly created request, scores it against the active pool
//! and writes one candidate match per direction for every qualifying pair.
//! Nothing is reported to a caller: failures are logged and swallowed.

use anyhow::Result;
use chrono::{Duration, Utc};
use rides::{CandidateMatch, CompatibilityResult, MatchableRide, score_pair};
use tracing::{error, info, warn};

use super::eligible_candidates;
use crate::repositories::{CandidateMatchStore, ProfileStore, RideRequestStore};

/// Counters describing one ingest run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub scanned: usize,
    pub matched: usize,
    /// Candidate match records actually inserted
    pub written: usize,
    /// Records that already existed from an earlier delivery
    pub duplicates: usize,
    pub failed: usize,
}

/// Reacts to ride request creation by persisting candidate matches for both sides
#[derive(Clone)]
pub struct MatchIngestService<R, P, C> {
    requests: R,
    profiles: P,
    candidates: C,
    request_ttl: Duration,
}

impl<R, P, C> MatchIngestService<R, P, C>
where
    R: RideRequestStore,
    P: ProfileStore,
    C: CandidateMatchStore,
{
    pub fn new(requests: R, profiles: P, candidates: C, request_ttl: Duration) -> Self {
        Self {
            requests,
            profiles,
            candidates,
            request_ttl,
        }
    }

    /// Trigger entry point; never fails past this boundary
    pub async fn on_ride_request_created(&self, request: rides::RideRequest) {
        match self.ingest(&request).await {
            Ok(report) => info!(
                "Ingested ride request {}: scanned {}, matched {}, wrote {}, duplicates {}, failed {}",
                request.id,
                report.scanned,
                report.matched,
                report.written,
                report.duplicates,
                report.failed
            ),
            Err(e) => error!("Error in real-time matching for {}: {}", request.id, e),
        }
    }

    /// Score `request` against the active pool and persist every match
    pub async fn ingest(&self, request: &rides::RideRequest) -> Result<IngestReport> {
        let mut report = IngestReport::default();

        if !request.is_active() {
            return Ok(report);
        }

        let now = Utc::now();
        if request.is_expired(now, self.request_ttl) {
            info!("Ride request {} expired before ingest, deactivating", request.id);
            self.requests.mark_expired(request.id, now).await?;
            return Ok(report);
        }

        let Some(origin) = request.matchable() else {
            warn!(
                "Ride request {} lacks coordinates or address text, not matching",
                request.id
            );
            return Ok(report);
        };

        let pool = self.requests.list_active().await?;

        for candidate in eligible_candidates(request, &pool, now, self.request_ttl) {
            report.scanned += 1;

            let result = score_pair(&origin, &candidate);
            if !result.is_match {
                continue;
            }
            report.matched += 1;

            match self.persist_pair(&origin, &candidate, &result).await {
                Ok(inserted) => {
                    report.written += inserted;
                    report.duplicates += 2 - inserted;
                    info!(
                        "Match found between {} and {}",
                        request.user_id, candidate.request.user_id
                    );
                }
                Err(e) => {
                    report.failed += 1;
                    error!(
                        "Failed to persist match between {} and {}: {}",
                        request.id, candidate.request.id, e
                    );
                }
            }
        }

        Ok(report)
    }

    /// Write the proposal for each side; returns how many records were new
    async fn persist_pair(
        &self,
        origin: &MatchableRide<'_>,
        candidate: &MatchableRide<'_>,
        result: &CompatibilityResult,
    ) -> Result<usize> {
        let origin_profile = self
            .profiles
            .find_profile(origin.request.user_id)
            .await?
            .unwrap_or_default();
        let candidate_profile = self
            .profiles
            .find_profile(candidate.request.user_id)
            .await?
            .unwrap_or_default();

        let now = Utc::now();
        let for_origin = CandidateMatch::propose(
            origin.request,
            candidate.request,
            candidate_profile,
            result.score,
            result.distance_km,
            now,
        );
        let for_candidate = CandidateMatch::propose(
            candidate.request,
            origin.request,
            origin_profile,
            result.score,
            result.distance_km,
            now,
        );

        let mut inserted = 0;
        for proposal in [&for_origin, &for_candidate] {
            if self.candidates.create_if_absent(proposal).await? {
                inserted += 1;
            }
        }

        Ok(inserted)
    }
}
