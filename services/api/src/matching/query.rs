//! On-demand match query for a caller-owned ride request

use chrono::{Duration, Utc};
use rides::{CompatibilityResult, RideRequest, score_pair};
use tracing::{info, warn};
use uuid::Uuid;

use super::{MatchError, eligible_candidates};
use crate::models::MatchSummary;
use crate::repositories::{ProfileStore, RideRequestStore};

/// What the caller gets back from a match query
#[derive(Debug, Clone, PartialEq)]
pub enum MatchQueryOutcome {
    /// Matches sorted by compatibility score, best first
    Matches(Vec<MatchSummary>),
    /// The caller's own request had expired and was deactivated
    Expired,
}

/// Answers "find matches for this request" on demand
#[derive(Clone)]
pub struct MatchQueryService<R, P> {
    requests: R,
    profiles: P,
    request_ttl: Duration,
}

impl<R: RideRequestStore, P: ProfileStore> MatchQueryService<R, P> {
    pub fn new(requests: R, profiles: P, request_ttl: Duration) -> Self {
        Self {
            requests,
            profiles,
            request_ttl,
        }
    }

    /// Find matches for `request_id`, which must belong to `caller`.
    ///
    /// Read-only on candidates. The only write is deactivating the caller's
    /// own request when it is found to be expired.
    pub async fn find_matches(
        &self,
        caller: Uuid,
        request_id: Uuid,
    ) -> Result<MatchQueryOutcome, MatchError> {
        let own = self
            .requests
            .get_by_id(request_id)
            .await?
            .ok_or(MatchError::RequestNotFound(request_id))?;

        if own.user_id != caller {
            return Err(MatchError::PermissionDenied);
        }

        let now = Utc::now();

        if own.is_expired(now, self.request_ttl) {
            if own.is_active() {
                info!("Ride request {} expired, deactivating", own.id);
                self.requests.mark_expired(own.id, now).await?;
            }
            return Ok(MatchQueryOutcome::Expired);
        }

        if !own.is_active() {
            info!("Ride request {} is inactive, no matches", own.id);
            return Ok(MatchQueryOutcome::Matches(Vec::new()));
        }

        let Some(origin) = own.matchable() else {
            warn!("Ride request {} lacks coordinates or address text", own.id);
            return Ok(MatchQueryOutcome::Matches(Vec::new()));
        };

        let pool = self.requests.list_active().await?;
        let mut matches = Vec::new();

        for candidate in eligible_candidates(&own, &pool, now, self.request_ttl) {
            let result = score_pair(&origin, &candidate);
            if !result.is_match {
                continue;
            }

            let profile = match self.profiles.find_profile(candidate.request.user_id).await {
                Ok(profile) => profile.unwrap_or_default(),
                Err(e) => {
                    warn!(
                        "Skipping candidate {}: profile lookup failed: {}",
                        candidate.request.id, e
                    );
                    continue;
                }
            };

            matches.push(summarize(candidate.request, profile, &result));
        }

        matches.sort_by(|a, b| b.compatibility_score.cmp(&a.compatibility_score));

        info!(
            "Found {} matches for ride request {} among {} active requests",
            matches.len(),
            own.id,
            pool.len()
        );

        Ok(MatchQueryOutcome::Matches(matches))
    }
}

fn summarize(
    candidate: &RideRequest,
    profile: rides::ProfileSnapshot,
    result: &CompatibilityResult,
) -> MatchSummary {
    MatchSummary {
        user_id: candidate.user_id,
        ride_request_id: candidate.id,
        name: profile.name,
        gender: profile.gender,
        age: profile.age,
        phone: profile.phone,
        photo_url: profile.photo_url,
        pickup_text: candidate.pickup_text.clone(),
        drop_text: candidate.drop_text.clone(),
        time_start: candidate.time_start.clone(),
        time_end: candidate.time_end.clone(),
        compatibility_score: result.score,
        distance: result.distance_km,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::test_support::ride;
    use crate::repositories::memory::InMemoryStore;
    use rides::{Coordinate, GenderPreference, ProfileSnapshot, RequestStatus};
    use tokio_test::assert_ok;

    fn service(store: &InMemoryStore) -> MatchQueryService<InMemoryStore, InMemoryStore> {
        MatchQueryService::new(store.clone(), store.clone(), Duration::minutes(30))
    }

    fn expect_matches(outcome: MatchQueryOutcome) -> Vec<MatchSummary> {
        match outcome {
            MatchQueryOutcome::Matches(matches) => matches,
            MatchQueryOutcome::Expired => panic!("expected matches, got expired"),
        }
    }

    #[tokio::test]
    async fn test_returns_matches_sorted_by_score() {
        let store = InMemoryStore::new();
        let caller = Uuid::new_v4();
        let own = ride(caller, "MG Road, 560001", "Indiranagar Metro");

        let strong = ride(Uuid::new_v4(), "MG Road 560001", "Indiranagar Metro");
        let mut weaker = ride(Uuid::new_v4(), "Brigade Road", "Domlur Flyover");
        weaker.pickup = Some(Coordinate::new(12.9719, 77.6070));

        store.insert_request(own.clone()).await;
        store.insert_request(weaker.clone()).await;
        store.insert_request(strong.clone()).await;
        store
            .insert_profile(
                strong.user_id,
                ProfileSnapshot {
                    name: "Asha".to_string(),
                    gender: "female".to_string(),
                    age: Some(29),
                    phone: "+91 98450 00000".to_string(),
                    photo_url: None,
                },
            )
            .await;

        let outcome = assert_ok!(service(&store).find_matches(caller, own.id).await);
        let found = expect_matches(outcome);

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].ride_request_id, strong.id);
        assert_eq!(found[0].name, "Asha");
        assert_eq!(found[1].ride_request_id, weaker.id);
        assert_eq!(found[1].name, "User");
        assert!(found[0].compatibility_score >= found[1].compatibility_score);
    }

    #[tokio::test]
    async fn test_skips_expired_and_malformed_candidates() {
        let store = InMemoryStore::new();
        let caller = Uuid::new_v4();
        let own = ride(caller, "MG Road", "Indiranagar");

        let mut stale = ride(Uuid::new_v4(), "MG Road", "Indiranagar");
        stale.created_at = Utc::now() - Duration::minutes(31);
        let mut no_drop = ride(Uuid::new_v4(), "MG Road", "Indiranagar");
        no_drop.drop = None;
        let blank_pickup = ride(Uuid::new_v4(), "", "Indiranagar");

        for request in [own.clone(), stale.clone(), no_drop, blank_pickup] {
            store.insert_request(request).await;
        }

        let found = expect_matches(assert_ok!(service(&store).find_matches(caller, own.id).await));

        assert!(found.is_empty());
        // Candidates are never written to
        let stale_after = store.request(stale.id).await.unwrap();
        assert_eq!(stale_after.status, RequestStatus::Active);
    }

    #[tokio::test]
    async fn test_skips_other_requests_of_the_caller() {
        let store = InMemoryStore::new();
        let caller = Uuid::new_v4();
        let own = ride(caller, "MG Road", "Indiranagar");
        let second = ride(caller, "MG Road", "Indiranagar");

        store.insert_request(own.clone()).await;
        store.insert_request(second).await;

        let found = expect_matches(assert_ok!(service(&store).find_matches(caller, own.id).await));
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_expired_own_request_is_deactivated() {
        let store = InMemoryStore::new();
        let caller = Uuid::new_v4();
        let mut own = ride(caller, "MG Road", "Indiranagar");
        own.created_at = Utc::now() - Duration::hours(2);

        store.insert_request(own.clone()).await;
        store
            .insert_request(ride(Uuid::new_v4(), "MG Road", "Indiranagar"))
            .await;

        let outcome = assert_ok!(service(&store).find_matches(caller, own.id).await);

        assert_eq!(outcome, MatchQueryOutcome::Expired);
        let after = store.request(own.id).await.unwrap();
        assert_eq!(after.status, RequestStatus::Inactive);
        assert!(store.expired_at(own.id).await.is_some());
    }

    #[tokio::test]
    async fn test_rejects_unknown_request_and_other_owner() {
        let store = InMemoryStore::new();
        let owner = Uuid::new_v4();
        let own = ride(owner, "MG Road", "Indiranagar");
        store.insert_request(own.clone()).await;

        let missing = Uuid::new_v4();
        let result = service(&store).find_matches(owner, missing).await;
        assert!(matches!(result, Err(MatchError::RequestNotFound(id)) if id == missing));

        let result = service(&store).find_matches(Uuid::new_v4(), own.id).await;
        assert!(matches!(result, Err(MatchError::PermissionDenied)));
    }

    #[tokio::test]
    async fn test_profile_failure_only_drops_that_candidate() {
        let store = InMemoryStore::new();
        let caller = Uuid::new_v4();
        let own = ride(caller, "MG Road", "Indiranagar");
        let healthy = ride(Uuid::new_v4(), "MG Road", "Indiranagar");
        let broken = ride(Uuid::new_v4(), "MG Road", "Indiranagar");

        for request in [own.clone(), broken.clone(), healthy.clone()] {
            store.insert_request(request).await;
        }
        store.fail_profile_lookup(broken.user_id).await;

        let found = expect_matches(assert_ok!(service(&store).find_matches(caller, own.id).await));

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].ride_request_id, healthy.id);
    }

    #[tokio::test]
    async fn test_gender_mismatch_still_matches_on_locations() {
        let store = InMemoryStore::new();
        let caller = Uuid::new_v4();
        let mut own = ride(caller, "MG Road", "Indiranagar");
        own.gender_preference = GenderPreference::Male;
        let mut other = ride(Uuid::new_v4(), "MG Road", "Indiranagar");
        other.gender_preference = GenderPreference::Female;

        store.insert_request(own.clone()).await;
        store.insert_request(other.clone()).await;

        let found = expect_matches(assert_ok!(service(&store).find_matches(caller, own.id).await));

        assert_eq!(found.len(), 1);
        // 20 + 15 + 20 + 10 + 15, no gender points
        assert_eq!(found[0].compatibility_score, 80);
    }

    #[tokio::test]
    async fn test_store_failure_is_reported() {
        let store = InMemoryStore::new();
        let caller = Uuid::new_v4();
        let own = ride(caller, "MG Road", "Indiranagar");
        store.insert_request(own.clone()).await;
        store.fail_listing().await;

        let result = service(&store).find_matches(caller, own.id).await;
        assert!(matches!(result, Err(MatchError::Store(_))));
    }
}
