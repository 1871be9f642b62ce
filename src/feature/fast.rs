//! FAST corner detection on the canonical frame.

use super::KeyPoint;

/// Offsets of the 16-pixel Bresenham circle of radius 3, clockwise from 12
/// o'clock.
const CIRCLE: [(i32, i32); 16] = [
    (0, -3),
    (1, -3),
    (2, -2),
    (3, -1),
    (3, 0),
    (3, 1),
    (2, 2),
    (1, 3),
    (0, 3),
    (-1, 3),
    (-2, 2),
    (-3, 1),
    (-3, 0),
    (-3, -1),
    (-2, -2),
    (-1, -3),
];

/// Contiguous arc length required for a positive segment test.
const ARC_LEN: usize = 12;

/// Detection border. Wide enough that every steered descriptor sample around
/// a keypoint stays inside the frame (half-patch 15 rotated by up to 45
/// degrees reaches 22 pixels).
pub(crate) const MARGIN: u32 = 22;

/// Detects FAST corners with 3x3 local-maximum suppression.
///
/// Returned keypoints are in row-major scan order with `angle` still zero;
/// orientation is assigned during description.
pub(crate) fn detect(gray: &::image::GrayImage, threshold: u8) -> Vec<KeyPoint> {
    let (width, height) = gray.dimensions();
    if width <= 2 * MARGIN || height <= 2 * MARGIN {
        return Vec::new();
    }

    let mut response = vec![0u32; (width as usize) * (height as usize)];
    let mut corners = Vec::new();
    for y in MARGIN..height - MARGIN {
        for x in MARGIN..width - MARGIN {
            let center = gray.get_pixel(x, y)[0];
            if compass_pretest(gray, x, y, center, threshold)
                && segment_test(gray, x, y, center, threshold)
            {
                let score = corner_response(gray, x, y, center);
                response[(y * width + x) as usize] = score;
                corners.push(KeyPoint {
                    x,
                    y,
                    response: score,
                    angle: 0.0,
                });
            }
        }
    }

    suppress_non_maxima(corners, &response, width)
}

/// Quick rejection: for an arc of 12 at least three of the four compass
/// points must be brighter or darker than the center band.
fn compass_pretest(gray: &::image::GrayImage, x: u32, y: u32, center: u8, threshold: u8) -> bool {
    let upper = center.saturating_add(threshold);
    let lower = center.saturating_sub(threshold);
    let mut brighter = 0u8;
    let mut darker = 0u8;
    for idx in [0usize, 4, 8, 12] {
        let (dx, dy) = CIRCLE[idx];
        let value = circle_pixel(gray, x, y, dx, dy);
        if value > upper {
            brighter += 1;
        } else if value < lower {
            darker += 1;
        }
    }
    brighter >= 3 || darker >= 3
}

/// Full segment test: a wrapping run of at least [`ARC_LEN`] circle pixels
/// all brighter or all darker than the center band.
fn segment_test(gray: &::image::GrayImage, x: u32, y: u32, center: u8, threshold: u8) -> bool {
    let upper = center.saturating_add(threshold);
    let lower = center.saturating_sub(threshold);
    let mut brighter = [false; 16];
    let mut darker = [false; 16];
    for (idx, &(dx, dy)) in CIRCLE.iter().enumerate() {
        let value = circle_pixel(gray, x, y, dx, dy);
        brighter[idx] = value > upper;
        darker[idx] = value < lower;
    }
    longest_wrapping_run(&brighter) >= ARC_LEN || longest_wrapping_run(&darker) >= ARC_LEN
}

fn longest_wrapping_run(flags: &[bool; 16]) -> usize {
    if flags.iter().all(|&f| f) {
        return 16;
    }
    let mut best = 0usize;
    let mut run = 0usize;
    for idx in 0..32 {
        if flags[idx % 16] {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}

/// Corner strength: total absolute deviation of the circle from the center.
fn corner_response(gray: &::image::GrayImage, x: u32, y: u32, center: u8) -> u32 {
    CIRCLE
        .iter()
        .map(|&(dx, dy)| {
            let value = circle_pixel(gray, x, y, dx, dy);
            u32::from(value.abs_diff(center))
        })
        .sum()
}

fn circle_pixel(gray: &::image::GrayImage, x: u32, y: u32, dx: i32, dy: i32) -> u8 {
    gray.get_pixel((x as i32 + dx) as u32, (y as i32 + dy) as u32)[0]
}

/// Keeps a corner only if no 8-neighbor beats it. Ties go to the earlier
/// position in scan order so plateaus keep exactly one detection.
fn suppress_non_maxima(corners: Vec<KeyPoint>, response: &[u32], width: u32) -> Vec<KeyPoint> {
    let mut kept = Vec::with_capacity(corners.len());
    'corners: for kp in corners {
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let nx = (kp.x as i32 + dx) as u32;
                let ny = (kp.y as i32 + dy) as u32;
                let neighbor = response[(ny * width + nx) as usize];
                if neighbor > kp.response {
                    continue 'corners;
                }
                let earlier = ny < kp.y || (ny == kp.y && nx < kp.x);
                if neighbor == kp.response && neighbor > 0 && earlier {
                    continue 'corners;
                }
            }
        }
        kept.push(kp);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_blob_on_bright_field_is_a_corner() {
        let mut img = ::image::GrayImage::from_pixel(100, 100, ::image::Luma([200]));
        img.put_pixel(50, 50, ::image::Luma([10]));
        let kps = detect(&img, 20);
        assert_eq!(kps.len(), 1);
        assert_eq!((kps[0].x, kps[0].y), (50, 50));
    }

    #[test]
    fn flat_field_has_no_corners() {
        let img = ::image::GrayImage::from_pixel(100, 100, ::image::Luma([90]));
        assert!(detect(&img, 20).is_empty());
    }

    #[test]
    fn detections_respect_the_margin() {
        let mut img = ::image::GrayImage::from_pixel(100, 100, ::image::Luma([200]));
        // Blob sits inside the border band that detection never scans.
        img.put_pixel(5, 5, ::image::Luma([10]));
        assert!(detect(&img, 20).is_empty());
    }

    #[test]
    fn wrapping_run_crosses_the_seam() {
        let mut flags = [false; 16];
        for idx in [10, 11, 12, 13, 14, 15, 0, 1, 2, 3, 4, 5] {
            flags[idx] = true;
        }
        assert_eq!(longest_wrapping_run(&flags), 12);
    }
}
