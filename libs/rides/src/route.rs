//! Route overlap check

/// Whether two encoded route polylines describe similar routes.
///
/// Only checks that both polylines are present and non-empty; the paths
/// are not decoded. A missing polyline is never a disqualifier for the
/// scorer, it only forfeits the route criterion.
pub fn route_similarity(first: Option<&str>, second: Option<&str>) -> bool {
    matches!(
        (first, second),
        (Some(a), Some(b)) if !a.is_empty() && !b.is_empty()
    )
}
