//! Oriented binary descriptors.
//!
//! Each keypoint gets an orientation from the intensity centroid of its
//! patch, then a 256-bit descriptor built from pairwise intensity
//! comparisons along a fixed sampling pattern steered by that orientation.

use std::sync::OnceLock;

use super::{Descriptor, DescriptorSet, KeyPoint, DESCRIPTOR_LEN};

/// Half-width of the square patch the pattern is drawn from.
const HALF_PATCH: i32 = 15;

/// Intensity comparisons per descriptor.
const NUM_PAIRS: usize = DESCRIPTOR_LEN * 8;

static PATTERN: OnceLock<[(i32, i32, i32, i32); NUM_PAIRS]> = OnceLock::new();

/// Point-pair sampling pattern shared by every descriptor.
///
/// Drawn once from a fixed-seed generator so that repeated runs, and
/// separate processes, produce bit-identical descriptors.
fn sampling_pattern() -> &'static [(i32, i32, i32, i32); NUM_PAIRS] {
    PATTERN.get_or_init(|| {
        let mut state = 0x9e37_79b9u32;
        std::array::from_fn(|_| {
            (
                pattern_coord(&mut state),
                pattern_coord(&mut state),
                pattern_coord(&mut state),
                pattern_coord(&mut state),
            )
        })
    })
}

fn pattern_coord(state: &mut u32) -> i32 {
    (xorshift(state) % (2 * HALF_PATCH as u32 + 1)) as i32 - HALF_PATCH
}

fn xorshift(state: &mut u32) -> u32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    x
}

/// Assigns orientations and computes descriptors for `keypoints`.
///
/// The output is index-aligned with the keypoint slice.
pub(crate) fn describe(gray: &::image::GrayImage, keypoints: &mut [KeyPoint]) -> DescriptorSet {
    let pattern = sampling_pattern();
    let mut set = Vec::with_capacity(keypoints.len());
    for kp in keypoints.iter_mut() {
        kp.angle = orientation(gray, kp.x, kp.y);
        set.push(steered_descriptor(gray, kp, pattern));
    }
    set
}

/// Orientation of the patch around `(x, y)` from its intensity centroid.
fn orientation(gray: &::image::GrayImage, x: u32, y: u32) -> f32 {
    let mut m01 = 0.0f32;
    let mut m10 = 0.0f32;
    for dy in -HALF_PATCH..HALF_PATCH {
        for dx in -HALF_PATCH..HALF_PATCH {
            let value =
                f32::from(gray.get_pixel((x as i32 + dx) as u32, (y as i32 + dy) as u32)[0]);
            m01 += value * dy as f32;
            m10 += value * dx as f32;
        }
    }
    m01.atan2(m10)
}

fn steered_descriptor(
    gray: &::image::GrayImage,
    kp: &KeyPoint,
    pattern: &[(i32, i32, i32, i32); NUM_PAIRS],
) -> Descriptor {
    let (sin_a, cos_a) = kp.angle.sin_cos();
    let sample = |px: i32, py: i32| -> u8 {
        let rx = (cos_a * px as f32 - sin_a * py as f32).round() as i32;
        let ry = (sin_a * px as f32 + cos_a * py as f32).round() as i32;
        gray.get_pixel((kp.x as i32 + rx) as u32, (kp.y as i32 + ry) as u32)[0]
    };

    let mut bits = [0u8; DESCRIPTOR_LEN];
    for (idx, &(x0, y0, x1, y1)) in pattern.iter().enumerate() {
        if sample(x0, y0) < sample(x1, y1) {
            bits[idx / 8] |= 1u8 << (idx % 8);
        }
    }
    Descriptor::new(bits)
}
