//! Visim ranks the images in a local folder by visual similarity to a query.
//!
//! Every image is reduced to a canonical 400x400 grayscale frame, keypoint
//! descriptors are extracted and matched brute-force against the query, and
//! candidates come back in ascending dissimilarity order. Scans run off the
//! caller's thread through [`Orchestrator`]; per-candidate parallelism is
//! available via the `rayon` feature.

pub mod corpus;
pub mod feature;
pub mod image;
pub mod matcher;
pub mod search;
pub mod util;

mod trace;

#[cfg(feature = "rayon")]
pub use corpus::scan_par;
pub use corpus::{scan, Ranking, ScoredMatch};
pub use feature::{extract, Descriptor, DescriptorSet, KeyPoint};
pub use crate::image::{load_canonical, CANONICAL_SIZE};
pub use matcher::match_score;
pub use search::{CancelToken, Orchestrator, SearchHandle, SearchRequest, SearchState};
pub use util::{SearchError, SearchResult};
