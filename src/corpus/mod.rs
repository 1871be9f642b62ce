//! Corpus scanning and ranking.
//!
//! A scan extracts the query descriptors once, then walks the candidate
//! directory in lexicographic path order, scoring every image that decodes.
//! Candidates that fail to decode, or whose match against the query is
//! undefined, are skipped rather than failing the scan. The final sort is
//! stable, so equal scores keep the enumeration order.
//!
//! There is no persistent index: every search rescans the directory from
//! scratch, which bounds this engine to corpora of at most a few hundred
//! images per query.

use std::fs;
use std::path::{Path, PathBuf};

use crate::feature::{self, DescriptorSet};
use crate::matcher::match_score;
use crate::search::CancelToken;
use crate::trace::{trace_event, trace_span};
use crate::util::{SearchError, SearchResult};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// One ranked candidate.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoredMatch {
    /// Aggregate dissimilarity; lower means more similar.
    pub score: f32,
    /// Path of the candidate image.
    pub path: PathBuf,
}

/// Ranked scan output: ascending by score, at most `top_n` entries.
pub type Ranking = Vec<ScoredMatch>;

/// Scans `dir` for the `top_n` images most similar to the query.
///
/// The whole scan fails if the query cannot be decoded or the directory
/// cannot be read. Individual candidates that cannot be scored are skipped.
/// Cancellation is honored between candidates and reports
/// [`SearchError::Cancelled`]; no partial ranking is ever returned.
pub fn scan(
    query_path: &Path,
    dir: &Path,
    top_n: usize,
    cancel: &CancelToken,
) -> SearchResult<Ranking> {
    let _span = trace_span!("scan", top_n = top_n).entered();

    let query = feature::extract(query_path)?;
    let files = candidate_files(dir)?;
    trace_event!("scan_candidates", count = files.len());

    let mut results = Vec::new();
    let mut skipped = 0usize;
    for path in files {
        if cancel.is_cancelled() {
            return Err(SearchError::Cancelled);
        }
        match score_candidate(&query, path) {
            Some(scored) => results.push(scored),
            None => skipped += 1,
        }
    }
    trace_event!("scan_scored", scored = results.len(), skipped = skipped);

    Ok(finish_ranking(results, top_n))
}

/// Parallel variant of [`scan`] with an identical contract and ranking.
///
/// Candidates are scored across the rayon pool; the indexed collection
/// restores the sequential enumeration order before ranking.
#[cfg(feature = "rayon")]
pub fn scan_par(
    query_path: &Path,
    dir: &Path,
    top_n: usize,
    cancel: &CancelToken,
) -> SearchResult<Ranking> {
    let _span = trace_span!("scan", top_n = top_n, parallel = true).entered();

    let query = feature::extract(query_path)?;
    let files = candidate_files(dir)?;
    trace_event!("scan_candidates", count = files.len());

    let scored: Vec<Option<ScoredMatch>> = files
        .into_par_iter()
        .map(|path| {
            if cancel.is_cancelled() {
                return None;
            }
            score_candidate(&query, path)
        })
        .collect();
    if cancel.is_cancelled() {
        return Err(SearchError::Cancelled);
    }

    let results: Vec<ScoredMatch> = scored.into_iter().flatten().collect();
    Ok(finish_ranking(results, top_n))
}

/// Lists candidate files in deterministic lexicographic order.
///
/// Non-recursive; directory entries that are not regular files are ignored.
fn candidate_files(dir: &Path) -> SearchResult<Vec<PathBuf>> {
    let directory_error = |err: std::io::Error| SearchError::Directory {
        path: dir.to_path_buf(),
        reason: err.to_string(),
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(directory_error)? {
        let path = entry.map_err(directory_error)?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Scores one candidate, or `None` when it cannot participate.
fn score_candidate(query: &DescriptorSet, path: PathBuf) -> Option<ScoredMatch> {
    let descriptors = match feature::extract(&path) {
        Ok(set) => set,
        Err(_) => {
            trace_event!("candidate_skipped");
            return None;
        }
    };
    let score = match_score(query, &descriptors)?;
    Some(ScoredMatch { score, path })
}

fn finish_ranking(mut results: Vec<ScoredMatch>, top_n: usize) -> Ranking {
    results.sort_by(|a, b| a.score.total_cmp(&b.score));
    results.truncate(top_n);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(score: f32, name: &str) -> ScoredMatch {
        ScoredMatch {
            score,
            path: PathBuf::from(name),
        }
    }

    #[test]
    fn ranking_is_ascending_and_truncated() {
        let results = vec![scored(3.0, "c"), scored(1.0, "a"), scored(2.0, "b")];
        let ranking = finish_ranking(results, 2);
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].path, PathBuf::from("a"));
        assert_eq!(ranking[1].path, PathBuf::from("b"));
    }

    #[test]
    fn equal_scores_keep_enumeration_order() {
        let results = vec![scored(1.0, "first"), scored(1.0, "second")];
        let ranking = finish_ranking(results, 10);
        assert_eq!(ranking[0].path, PathBuf::from("first"));
        assert_eq!(ranking[1].path, PathBuf::from("second"));
    }

    #[test]
    fn zero_top_n_yields_an_empty_ranking() {
        let results = vec![scored(1.0, "a")];
        assert!(finish_ranking(results, 0).is_empty());
    }
}
