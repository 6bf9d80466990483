use tracing::debug;

use crate::config::ScoringPolicy;
use crate::menu::{CandidateItem, MatchResult, MatchStatus, ReferenceItem};
use crate::score::score_with;

/// Match every candidate against the catalog with the default policy
pub fn compare(references: &[ReferenceItem], candidates: &[CandidateItem]) -> Vec<MatchResult> {
    compare_with(references, candidates, &ScoringPolicy::default())
}

/// Match every candidate against the catalog.
///
/// Results follow candidate order. Each candidate keeps the highest-scoring
/// reference; on equal scores the earlier reference wins. The best reference
/// is `None` only when `references` is empty.
pub fn compare_with(
    references: &[ReferenceItem],
    candidates: &[CandidateItem],
    policy: &ScoringPolicy,
) -> Vec<MatchResult> {
    let results: Vec<MatchResult> = candidates
        .iter()
        .map(|candidate| best_match(references, candidate, policy))
        .collect();

    debug!(
        references = references.len(),
        candidates = candidates.len(),
        "comparison finished"
    );

    results
}

fn best_match(
    references: &[ReferenceItem],
    candidate: &CandidateItem,
    policy: &ScoringPolicy,
) -> MatchResult {
    let mut best: Option<(&ReferenceItem, f64)> = None;

    for reference in references {
        let s = score_with(reference, candidate, policy);
        match best {
            Some((_, best_score)) if s <= best_score => {}
            _ => best = Some((reference, s)),
        }
    }

    let best_score = best.map(|(_, s)| s).unwrap_or(0.0);

    MatchResult {
        candidate: candidate.clone(),
        best_reference: best.map(|(r, _)| r.clone()),
        score: to_percent(best_score),
        status: classify(best_score, policy),
    }
}

/// Band a raw score into a match status.
///
/// Bands use the unrounded score, not the displayed percentage: a raw
/// 0.49996 prints as 50.0 but is still a partial match.
pub fn classify(score: f64, policy: &ScoringPolicy) -> MatchStatus {
    if score >= policy.match_threshold {
        MatchStatus::Match
    } else if score >= policy.partial_threshold {
        MatchStatus::PartialMatch
    } else {
        MatchStatus::NoMatch
    }
}

/// 0.7333 -> 73.3
fn to_percent(score: f64) -> f64 {
    (score * 1000.0).round() / 10.0
}
