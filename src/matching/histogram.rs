//! Color-histogram comparison for matched regions.
//!
//! Builds a joint RGB histogram with 8 bins per channel (512 bins total),
//! min-max normalizes it, and compares histograms by Pearson correlation.

use image::RgbImage;

/// Bins per color channel.
const BINS_PER_CHANNEL: usize = 8;
/// Right-shift mapping a channel value (0-255) to its bin (0-7).
const BIN_SHIFT: u32 = 5;
/// Total bin count for the joint histogram.
const BIN_COUNT: usize = BINS_PER_CHANNEL * BINS_PER_CHANNEL * BINS_PER_CHANNEL;

/// Color similarity between two image regions, in [0, 1].
///
/// Negative correlations (anti-correlated color distributions) clamp to 0.
pub fn color_similarity(region: &RgbImage, template: &RgbImage) -> f32 {
    let mut a = joint_histogram(region);
    let mut b = joint_histogram(template);
    normalize_min_max(&mut a);
    normalize_min_max(&mut b);
    correlation(&a, &b).max(0.0)
}

/// Joint 8x8x8 RGB histogram.
fn joint_histogram(img: &RgbImage) -> Vec<f32> {
    let mut hist = vec![0.0f32; BIN_COUNT];
    for pixel in img.pixels() {
        let r = (pixel[0] >> BIN_SHIFT) as usize;
        let g = (pixel[1] >> BIN_SHIFT) as usize;
        let b = (pixel[2] >> BIN_SHIFT) as usize;
        hist[(r * BINS_PER_CHANNEL + g) * BINS_PER_CHANNEL + b] += 1.0;
    }
    hist
}

/// Scales bin counts into [0, 1]. A histogram with no spread becomes all
/// zeros rather than dividing by a zero range.
fn normalize_min_max(hist: &mut [f32]) {
    let min = hist.iter().copied().fold(f32::INFINITY, f32::min);
    let max = hist.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let range = max - min;
    if range <= f32::EPSILON {
        hist.fill(0.0);
        return;
    }
    for v in hist.iter_mut() {
        *v = (*v - min) / range;
    }
}

/// Pearson correlation coefficient between two equal-length histograms.
///
/// Returns 0.0 when either histogram has zero variance.
fn correlation(a: &[f32], b: &[f32]) -> f32 {
    let n = a.len() as f64;
    let mean_a: f64 = a.iter().map(|&v| v as f64).sum::<f64>() / n;
    let mean_b: f64 = b.iter().map(|&v| v as f64).sum::<f64>() / n;

    let mut covariance = 0.0f64;
    let mut variance_a = 0.0f64;
    let mut variance_b = 0.0f64;
    for (&va, &vb) in a.iter().zip(b.iter()) {
        let da = va as f64 - mean_a;
        let db = vb as f64 - mean_b;
        covariance += da * db;
        variance_a += da * da;
        variance_b += db * db;
    }

    let denominator = (variance_a * variance_b).sqrt();
    if denominator <= 0.0 {
        return 0.0;
    }
    (covariance / denominator) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb(color))
    }

    fn checkerboard(width: u32, height: u32, a: [u8; 3], b: [u8; 3]) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 { Rgb(a) } else { Rgb(b) }
        })
    }

    #[test]
    fn identical_images_are_fully_similar() {
        let img = checkerboard(16, 16, [255, 0, 0], [0, 0, 255]);
        let similarity = color_similarity(&img, &img);
        assert!(similarity > 0.99, "similarity was {}", similarity);
    }

    #[test]
    fn disjoint_colors_are_dissimilar() {
        // All mass in one bin vs all mass in another; the correlation of the
        // two histograms is slightly negative and clamps to 0.
        let red = solid(16, 16, [255, 0, 0]);
        let blue = solid(16, 16, [0, 0, 255]);
        let similarity = color_similarity(&red, &blue);
        assert!(similarity < 0.01, "similarity was {}", similarity);
    }

    #[test]
    fn similarity_never_negative() {
        let a = checkerboard(8, 8, [255, 255, 255], [0, 0, 0]);
        let b = solid(8, 8, [128, 128, 128]);
        assert!(color_similarity(&a, &b) >= 0.0);
    }

    #[test]
    fn correlation_of_flat_histogram_is_zero() {
        // Zero-area images produce empty histograms with no spread.
        let empty = RgbImage::new(0, 0);
        assert_eq!(color_similarity(&empty, &empty), 0.0);
    }
}
