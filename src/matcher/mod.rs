//! Brute-force descriptor matching.
//!
//! For every query descriptor the matcher finds the closest candidate
//! descriptor by Hamming distance and sums those minima into one
//! dissimilarity score. The comparison runs query to candidate only, never
//! the reverse: a candidate is never penalized for features the query lacks.
//!
//! Empty sets have no defined brute-force score. Two empty sets count as a
//! perfect match (no evidence of mismatch, score 0); if exactly one side is
//! empty the match is undefined and the function returns `None`, which the
//! scanner treats as "exclude this candidate".

use crate::feature::DescriptorSet;

/// Aggregate dissimilarity between a query and a candidate.
///
/// Returns `None` when exactly one of the sets is empty.
pub fn match_score(query: &DescriptorSet, candidate: &DescriptorSet) -> Option<f32> {
    match (query.is_empty(), candidate.is_empty()) {
        (true, true) => return Some(0.0),
        (true, false) | (false, true) => return None,
        (false, false) => {}
    }

    let mut total = 0u64;
    for q in query {
        let best = candidate
            .iter()
            .map(|c| q.distance(c))
            .min()
            .unwrap_or(0);
        total += u64::from(best);
    }
    Some(total as f32)
}
