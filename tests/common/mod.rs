#![allow(dead_code)]

//! Synthetic image fixtures shared by the integration tests.

use std::path::{Path, PathBuf};

use image::{GrayImage, Luma};

pub const FRAME: u32 = 400;

const BACKGROUND: u8 = 230;
const BLOB: u8 = 20;
const FEATURES: u32 = 48;

fn xorshift(state: &mut u32) -> u32 {
    let mut x = *state;
    x ^= x << 13;
    x ^= x >> 17;
    x ^= x << 5;
    *state = x;
    x
}

fn stamp_blob(img: &mut GrayImage, cx: i32, cy: i32) {
    for dy in -1..=1 {
        for dx in -1..=1 {
            let x = cx + dx;
            let y = cy + dy;
            if x >= 0 && y >= 0 && (x as u32) < FRAME && (y as u32) < FRAME {
                img.put_pixel(x as u32, y as u32, Luma([BLOB]));
            }
        }
    }
}

/// Deterministic textured frame; different seeds give different textures.
///
/// The texture is a scatter of dark blob pairs. Each pair's relative offset
/// is drawn from the seed, so two frames with different seeds disagree on
/// local geometry around every keypoint, while identical seeds reproduce the
/// frame exactly.
pub fn textured_image(seed: u32) -> GrayImage {
    let mut state = seed.max(1);
    let mut img = GrayImage::from_pixel(FRAME, FRAME, Luma([BACKGROUND]));
    for _ in 0..FEATURES {
        let cx = (40 + xorshift(&mut state) % (FRAME - 80)) as i32;
        let cy = (40 + xorshift(&mut state) % (FRAME - 80)) as i32;
        let dx = 5 + (xorshift(&mut state) % 8) as i32;
        let dy = 5 + (xorshift(&mut state) % 8) as i32;
        let sx = if xorshift(&mut state) & 1 == 0 { 1 } else { -1 };
        let sy = if xorshift(&mut state) & 1 == 0 { 1 } else { -1 };
        stamp_blob(&mut img, cx, cy);
        stamp_blob(&mut img, cx + sx * dx, cy + sy * dy);
    }
    img
}

/// Uniform frame with no detectable keypoints.
pub fn blank_image(value: u8) -> GrayImage {
    GrayImage::from_pixel(FRAME, FRAME, Luma([value]))
}

/// Saves `img` under `dir` with the format implied by the file extension.
pub fn save_image(dir: &Path, name: &str, img: &GrayImage) -> PathBuf {
    let path = dir.join(name);
    if path.extension().is_some_and(|ext| ext == "bmp") {
        // The BMP encoder wants RGB input.
        image::DynamicImage::ImageLuma8(img.clone())
            .to_rgb8()
            .save(&path)
            .expect("write bmp fixture");
    } else {
        img.save(&path).expect("write image fixture");
    }
    path
}

/// Writes a file that no image decoder will accept.
pub fn save_corrupt(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"this is not an image").expect("write corrupt fixture");
    path
}
