use crate::config::ScoringPolicy;
use crate::menu::{CandidateItem, ReferenceItem};
use crate::similarity::{containment, dice, edit_similarity, jaccard, price_similarity};

/// Score for a (reference, candidate) pair
#[derive(Debug, Clone)]
pub struct PairScore {
    pub total: f64,
    /// Raw value of each signal before weighting
    pub signals: Vec<(&'static str, f64)>,
}

/// Semantic similarity of a catalog dish and an extracted item, in `[0, 1]`,
/// using the default weights.
pub fn score(reference: &ReferenceItem, candidate: &CandidateItem) -> f64 {
    score_breakdown(reference, candidate, &ScoringPolicy::default()).total
}

/// Same as [`score`] with an explicit policy
pub fn score_with(reference: &ReferenceItem, candidate: &CandidateItem, policy: &ScoringPolicy) -> f64 {
    score_breakdown(reference, candidate, policy).total
}

/// Score a pair and keep every signal for reporting
pub fn score_breakdown(
    reference: &ReferenceItem,
    candidate: &CandidateItem,
    policy: &ScoringPolicy,
) -> PairScore {
    let weights = &policy.weights;
    let ref_name = reference.name.as_str();
    let cand_name = candidate.name.as_str();

    // Category + name on our side against everything the page told us
    let ref_context = format!("{} {}", reference.category, ref_name);
    let cand_context = format!("{} {}", cand_name, candidate.description);

    let signals = vec![
        ("name_jaccard", jaccard(ref_name, cand_name)),
        ("name_dice", dice(ref_name, cand_name)),
        ("name_edit", edit_similarity(ref_name, cand_name)),
        ("description_jaccard", jaccard(&reference.description, &candidate.description)),
        ("cross_signal", jaccard(&ref_context, &cand_context)),
        ("containment", containment(ref_name, cand_name)),
        (
            "price",
            price_similarity(reference.full_price, candidate.full_price, policy.missing_price_score),
        ),
    ];

    let weighted = [
        weights.name_jaccard,
        weights.name_dice,
        weights.name_edit,
        weights.description_jaccard,
        weights.cross_signal,
        weights.containment,
        weights.price,
    ];

    let total: f64 = signals
        .iter()
        .zip(weighted)
        .map(|((_, value), weight)| value * weight)
        .sum();

    PairScore {
        total: total.clamp(0.0, 1.0),
        signals,
    }
}
