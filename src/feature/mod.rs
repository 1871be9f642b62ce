//! Keypoint detection and descriptor extraction.
//!
//! The extractor runs a FAST corner detector over the canonical grayscale
//! frame, estimates a per-keypoint orientation from the intensity centroid
//! and encodes a steered 256-bit binary descriptor. The sampling pattern is
//! fixed, so repeated extractions of the same image are bit-identical.

pub(crate) mod brief;
pub(crate) mod fast;

use std::path::Path;

use crate::image::load_canonical;
use crate::util::SearchResult;

/// Bytes per descriptor (256 intensity comparisons).
pub const DESCRIPTOR_LEN: usize = 32;

/// Detection threshold for the FAST segment test.
const FAST_THRESHOLD: u8 = 20;

/// A detected corner with its FAST response and orientation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KeyPoint {
    /// Column in the canonical frame.
    pub x: u32,
    /// Row in the canonical frame.
    pub y: u32,
    /// Corner strength used for non-maximum suppression.
    pub response: u32,
    /// Orientation in radians, from the intensity centroid.
    pub angle: f32,
}

/// Fixed-length binary keypoint descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Descriptor {
    bits: [u8; DESCRIPTOR_LEN],
}

impl Descriptor {
    pub(crate) fn new(bits: [u8; DESCRIPTOR_LEN]) -> Self {
        Self { bits }
    }

    /// Hamming distance to another descriptor.
    pub fn distance(&self, other: &Descriptor) -> u32 {
        self.bits
            .iter()
            .zip(other.bits.iter())
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }

    /// Raw descriptor bytes.
    pub fn as_bytes(&self) -> &[u8; DESCRIPTOR_LEN] {
        &self.bits
    }
}

/// Ordered descriptor set extracted from one image.
///
/// Empty when the image has no detectable keypoints; that is a valid
/// extraction result, not an error.
pub type DescriptorSet = Vec<Descriptor>;

/// Decodes `path`, canonicalizes the frame and extracts its descriptors.
pub fn extract(path: &Path) -> SearchResult<DescriptorSet> {
    let gray = load_canonical(path)?;
    Ok(extract_from_gray(&gray))
}

/// Extracts descriptors from an already canonicalized grayscale frame.
pub fn extract_from_gray(gray: &::image::GrayImage) -> DescriptorSet {
    let mut keypoints = fast::detect(gray, FAST_THRESHOLD);
    brief::describe(gray, &mut keypoints)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dotted_frame() -> ::image::GrayImage {
        let mut img = ::image::GrayImage::from_pixel(400, 400, ::image::Luma([220]));
        for i in 0..10u32 {
            let cx = 60 + i * 30;
            let cy = 50 + (i * 53) % 300;
            for dy in 0..3 {
                for dx in 0..3 {
                    img.put_pixel(cx + dx, cy + dy, ::image::Luma([15]));
                }
            }
        }
        img
    }

    #[test]
    fn dotted_frame_yields_keypoints() {
        let set = extract_from_gray(&dotted_frame());
        assert!(!set.is_empty());
    }

    #[test]
    fn flat_frame_yields_empty_set() {
        let img = ::image::GrayImage::from_pixel(400, 400, ::image::Luma([128]));
        assert!(extract_from_gray(&img).is_empty());
    }

    #[test]
    fn extraction_is_deterministic() {
        let img = dotted_frame();
        let a = extract_from_gray(&img);
        let b = extract_from_gray(&img);
        assert_eq!(a, b);
    }

    #[test]
    fn descriptor_distance_to_self_is_zero() {
        let set = extract_from_gray(&dotted_frame());
        let first = set.first().unwrap();
        assert_eq!(first.distance(first), 0);
    }
}
