// src/crawl/cookies.rs
// =============================================================================
// This module holds the session cookie propagation policy used by the
// crawler.
//
// The heuristic: a larger cookie set usually means a more authenticated
// session (login forms deeper in a site hand out session cookies that the
// landing page never sees). So when a crawl branch comes back with more
// cookies than we went in with, we keep the bigger set and let the next
// sibling visit inherit it.
//
// This is a best-effort policy, not a causal cookie jar - and it is
// deliberately a named, testable function instead of an inline comparison.
// =============================================================================

use std::collections::HashMap;

/// The cookies observed for one page fetch: cookie name -> value.
pub type CookieSet = HashMap<String, String>;

/// Picks the richer of two cookie sets.
///
/// "Richer" means strictly more cookies. On a tie (same cardinality,
/// possibly different content) the existing set wins, so an ancestor's
/// session is never replaced by an equally-sized one from a child visit.
/// That tie-break keeps propagation deterministic.
pub fn richer(current: CookieSet, candidate: CookieSet) -> CookieSet {
    if candidate.len() > current.len() {
        candidate
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pairs: &[(&str, &str)]) -> CookieSet {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_larger_candidate_wins() {
        let current = set(&[("session", "1")]);
        let candidate = set(&[("session", "2"), ("auth", "tok")]);
        let chosen = richer(current, candidate.clone());
        assert_eq!(chosen, candidate);
    }

    #[test]
    fn test_smaller_candidate_loses() {
        let current = set(&[("session", "1"), ("auth", "tok")]);
        let chosen = richer(current.clone(), set(&[("tracking", "x")]));
        assert_eq!(chosen, current);
    }

    #[test]
    fn test_tie_keeps_current() {
        // Equal cardinality but different content: the existing set stays.
        let current = set(&[("session", "ancestor")]);
        let chosen = richer(current.clone(), set(&[("session", "child")]));
        assert_eq!(chosen, current);
    }

    #[test]
    fn test_empty_sets() {
        assert!(richer(CookieSet::new(), CookieSet::new()).is_empty());
        let candidate = set(&[("a", "1")]);
        assert_eq!(richer(CookieSet::new(), candidate.clone()), candidate);
    }
}
