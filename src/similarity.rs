//! Pairwise similarity metrics. Every function returns a value in `[0, 1]`
//! and is symmetric in its arguments.

use std::collections::{HashMap, HashSet};

use strsim::levenshtein;

use crate::normalize::{normalize_text, tokenize};

/// Default price similarity when either side has no usable price
pub const MISSING_PRICE_SCORE: f64 = 0.25;

/// Jaccard index over token sets
pub fn jaccard(a: &str, b: &str) -> f64 {
    let sa: HashSet<String> = tokenize(a).into_iter().collect();
    let sb: HashSet<String> = tokenize(b).into_iter().collect();
    if sa.is_empty() || sb.is_empty() {
        return 0.0;
    }

    let intersection = sa.intersection(&sb).count();
    let union = sa.union(&sb).count();
    intersection as f64 / union as f64
}

/// Sørensen–Dice coefficient over token multisets
pub fn dice(a: &str, b: &str) -> f64 {
    let ta = tokenize(a);
    let tb = tokenize(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for token in &ta {
        *counts.entry(token.as_str()).or_insert(0) += 1;
    }

    let mut hits = 0usize;
    for token in &tb {
        if let Some(n) = counts.get_mut(token.as_str()) {
            if *n > 0 {
                *n -= 1;
                hits += 1;
            }
        }
    }

    (2 * hits) as f64 / (ta.len() + tb.len()) as f64
}

/// Edit-distance similarity of the normalized strings:
/// `1 - distance / max(len)`
pub fn edit_similarity(a: &str, b: &str) -> f64 {
    let s = normalize_text(a);
    let t = normalize_text(b);
    match (s.is_empty(), t.is_empty()) {
        (true, true) => return 1.0,
        (true, false) | (false, true) => return 0.0,
        _ => {}
    }

    let dist = levenshtein(&s, &t);
    let longest = s.chars().count().max(t.chars().count());
    1.0 - dist as f64 / longest as f64
}

/// 1 when one normalized string contains the other, else 0
pub fn containment(a: &str, b: &str) -> f64 {
    let na = normalize_text(a);
    let nb = normalize_text(b);
    if na.is_empty() || nb.is_empty() {
        return 0.0;
    }

    if na.contains(&nb) || nb.contains(&na) {
        1.0
    } else {
        0.0
    }
}

/// Relative price closeness. Missing, zero or negative prices score `missing`.
pub fn price_similarity(a: Option<f64>, b: Option<f64>, missing: f64) -> f64 {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) if a > 0.0 && b > 0.0 && a.is_finite() && b.is_finite() => (a, b),
        _ => return missing,
    };

    let max = a.max(b);
    let diff = (a - b).abs();
    (1.0 - diff / max).max(0.0)
}
