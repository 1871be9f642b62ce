//! Image loading and canonicalization.
//!
//! Every image is resized to a fixed 400x400 canvas and converted to
//! single-channel intensity before feature extraction. The resize ignores the
//! source aspect ratio: scores stay comparable across corpora with mixed
//! resolutions at the cost of a known geometric distortion.

use std::path::Path;

use crate::util::{SearchError, SearchResult};

/// Edge length of the canonical frame applied before extraction.
pub const CANONICAL_SIZE: u32 = 400;

/// Loads an image from disk and converts it to the canonical grayscale frame.
pub fn load_canonical(path: &Path) -> SearchResult<::image::GrayImage> {
    let img = ::image::open(path).map_err(|err| SearchError::Decode {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    Ok(canonicalize(&img))
}

/// Resizes to the canonical square and drops color information.
pub fn canonicalize(img: &::image::DynamicImage) -> ::image::GrayImage {
    img.resize_exact(
        CANONICAL_SIZE,
        CANONICAL_SIZE,
        ::image::imageops::FilterType::Triangle,
    )
    .to_luma8()
}
