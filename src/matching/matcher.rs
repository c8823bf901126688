//! Template matching and match-quality scoring.
//!
//! For each (screenshot, template) pair, runs normalized cross-correlation
//! over the full screenshot, keeps the best-aligned location when its
//! confidence clears the threshold, and scores the occurrence on four
//! weighted factors: confidence, position, size, and color similarity.

use image::{GrayImage, RgbImage};
use imageproc::template_matching::{Extremes, MatchTemplateMethod, find_extremes, match_template};
use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::ScoringWeights;
use crate::matching::histogram;
use crate::matching::templates::Template;

/// One qualifying template occurrence within a screenshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Name of the matched template
    pub template_name: String,
    /// Raw cross-correlation value at the best location (0.0-1.0)
    pub confidence: f32,
    /// Top-left corner of the matched region
    pub top_left: (u32, u32),
    /// Width and height of the matched region (the template dimensions)
    pub size: (u32, u32),
    /// Closeness of the match center to the screenshot center (0.0-1.0)
    pub position_score: f32,
    /// Matched area relative to the screenshot area, capped at 1.0
    pub size_score: f32,
    /// Color-histogram correlation of the matched region vs the template
    pub color_similarity: f32,
    /// Weighted combination of the four sub-scores
    pub quality_score: f32,
    /// The template's configured point value, carried as-is
    pub point_value: u32,
}

/// Matches every template against one screenshot.
///
/// Templates fan out over a parallel iterator; each worker computes its own
/// record and the results are collected and sorted by a single thread.
/// Returns records ordered by (point_value desc, quality_score desc).
pub fn match_templates(
    rgb: &RgbImage,
    gray: &GrayImage,
    templates: &BTreeMap<String, Template>,
    threshold: f32,
    weights: &ScoringWeights,
) -> Vec<MatchRecord> {
    let mut matches: Vec<MatchRecord> = templates
        .par_iter()
        .filter_map(|(_, template)| match_one(rgb, gray, template, threshold, weights))
        .collect();
    sort_matches(&mut matches);
    matches
}

/// Matches a single template, returning a record if it clears the threshold.
fn match_one(
    rgb: &RgbImage,
    gray: &GrayImage,
    template: &Template,
    threshold: f32,
    weights: &ScoringWeights,
) -> Option<MatchRecord> {
    let (screen_w, screen_h) = gray.dimensions();
    let (tpl_w, tpl_h) = template.gray.dimensions();

    // A template that does not fit inside the screenshot cannot be located
    if tpl_w == 0 || tpl_h == 0 || tpl_w > screen_w || tpl_h > screen_h {
        debug!(
            "Skipping memoria {}: {}x{} does not fit in {}x{} screenshot",
            template.name, tpl_w, tpl_h, screen_w, screen_h
        );
        return None;
    }

    let scores = match_template(
        gray,
        &template.gray,
        MatchTemplateMethod::CrossCorrelationNormalized,
    );
    let Extremes {
        max_value,
        max_value_location,
        ..
    } = find_extremes(&scores);

    let confidence = max_value.clamp(0.0, 1.0);
    if confidence < threshold {
        return None;
    }

    let (x, y) = max_value_location;
    let region = image::imageops::crop_imm(rgb, x, y, tpl_w, tpl_h).to_image();

    let position_score = position_score(screen_w, screen_h, x, y, tpl_w, tpl_h);
    let size_score = size_score(screen_w, screen_h, tpl_w, tpl_h);
    let color_similarity = histogram::color_similarity(&region, &template.image);
    let quality_score = confidence * weights.confidence
        + position_score * weights.position
        + size_score * weights.size
        + color_similarity * weights.color;

    Some(MatchRecord {
        template_name: template.name.clone(),
        confidence,
        top_left: (x, y),
        size: (tpl_w, tpl_h),
        position_score,
        size_score,
        color_similarity,
        quality_score,
        point_value: template.point_value,
    })
}

/// Orders matches by point value, breaking ties on quality score and
/// finally on template name for determinism.
pub(crate) fn sort_matches(matches: &mut [MatchRecord]) {
    matches.sort_by(|a, b| {
        b.point_value
            .cmp(&a.point_value)
            .then_with(|| b.quality_score.total_cmp(&a.quality_score))
            .then_with(|| a.template_name.cmp(&b.template_name))
    });
}

/// Rewards matches near the screenshot center: 1.0 at the center, falling
/// to 0.0 at the corners.
fn position_score(screen_w: u32, screen_h: u32, x: u32, y: u32, tpl_w: u32, tpl_h: u32) -> f32 {
    let center_x = screen_w as f32 / 2.0;
    let center_y = screen_h as f32 / 2.0;
    let match_center_x = x as f32 + tpl_w as f32 / 2.0;
    let match_center_y = y as f32 + tpl_h as f32 / 2.0;

    let max_distance = (center_x * center_x + center_y * center_y).sqrt();
    let distance =
        ((center_x - match_center_x).powi(2) + (center_y - match_center_y).powi(2)).sqrt();
    (1.0 - distance / max_distance).max(0.0)
}

/// Rewards larger matched regions, capped at 1.0 once the template covers
/// a tenth of the screenshot.
fn size_score(screen_w: u32, screen_h: u32, tpl_w: u32, tpl_h: u32) -> f32 {
    let ratio = (tpl_w as f32 * tpl_h as f32) / (screen_w as f32 * screen_h as f32);
    (ratio * 10.0).min(1.0)
}
