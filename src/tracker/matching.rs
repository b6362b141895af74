//! Frame-to-entity matching: composite scores and greedy assignment.

use ndarray::Array2;

use crate::tracker::entity::TrackedEntity;
use crate::tracker::rect::Rect;
use crate::tracker::similarity;

/// One recognized text region for a single frame, before tracking.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Recognized text
    pub text: String,
    /// Bounding box in normalized coordinates
    pub bounding_box: Rect,
    /// Recognition confidence in [0, 1]
    pub confidence: f32,
}

impl Detection {
    pub fn new(text: impl Into<String>, bounding_box: Rect, confidence: f32) -> Self {
        Self {
            text: text.into(),
            bounding_box,
            confidence,
        }
    }
}

/// Configuration for composite match scoring.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Weight of the spatial score in the composite
    pub spatial_weight: f64,
    /// Weight of the text-similarity score in the composite
    pub text_weight: f64,
    /// Candidate pairs scoring below this are discarded
    pub min_composite: f64,
    /// Center distance (normalized units) at which proximity reaches zero
    pub max_center_distance: f32,
    /// Weight of center proximity within the spatial score
    pub proximity_weight: f64,
    /// Weight of IoU within the spatial score
    pub iou_weight: f64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            spatial_weight: 0.5,
            text_weight: 0.5,
            min_composite: 0.55,
            max_center_distance: 0.25,
            proximity_weight: 0.6,
            iou_weight: 0.4,
        }
    }
}

/// Outcome of reconciling one frame's detections against the live entity set.
/// Indices refer to the input slices.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// (entity index, detection index) pairs
    pub matched: Vec<(usize, usize)>,
    /// Detections with no surviving candidate; become new entities
    pub new_detections: Vec<usize>,
    /// Entities with no surviving candidate this frame
    pub unmatched_entities: Vec<usize>,
}

/// Reconcile a frame's detections against the existing entities.
pub fn reconcile(
    entities: &[TrackedEntity],
    detections: &[Detection],
    config: &MatcherConfig,
) -> MatchResult {
    let scores = composite_scores(entities, detections, config);
    let best_confidence: Vec<f32> = entities.iter().map(|e| e.best_confidence).collect();
    greedy_assignment(&scores, config.min_composite, &best_confidence)
}

/// Compute the composite score matrix (entities x detections).
///
/// Spatial score blends center proximity with IoU of the entity's smoothed
/// box against the candidate box; text similarity compares the entity's
/// best-seen text with the candidate's text. Pairs whose best possible score
/// cannot reach `min_composite` are left at zero without running the
/// edit-distance DP.
pub fn composite_scores(
    entities: &[TrackedEntity],
    detections: &[Detection],
    config: &MatcherConfig,
) -> Array2<f64> {
    let mut scores = Array2::zeros((entities.len(), detections.len()));

    let entity_chars: Vec<Vec<char>> = entities
        .iter()
        .map(|e| similarity::normalized_chars(&e.best_text))
        .collect();
    let det_chars: Vec<Vec<char>> = detections
        .iter()
        .map(|d| similarity::normalized_chars(&d.text))
        .collect();

    for (i, entity) in entities.iter().enumerate() {
        for (j, det) in detections.iter().enumerate() {
            let spatial = spatial_score(&entity.smoothed_box, &det.bounding_box, config);

            // Even a perfect text match cannot save a hopeless pair.
            if config.spatial_weight * spatial + config.text_weight < config.min_composite {
                continue;
            }

            let text_floor = if config.text_weight > 0.0 {
                (config.min_composite - config.spatial_weight * spatial) / config.text_weight
            } else {
                0.0
            };
            let text = similarity::char_similarity_with_floor(
                &entity_chars[i],
                &det_chars[j],
                text_floor,
            );

            scores[[i, j]] = config.spatial_weight * spatial + config.text_weight * text;
        }
    }

    scores
}

fn spatial_score(entity_box: &Rect, det_box: &Rect, config: &MatcherConfig) -> f64 {
    let dist = entity_box.center_distance(det_box);
    let proximity = 1.0 - (dist / config.max_center_distance).min(1.0);
    let iou = entity_box.iou(det_box);
    config.proximity_weight * proximity as f64 + config.iou_weight * iou as f64
}

/// Greedy best-score-first assignment.
///
/// Candidate pairs at or above `min_score` are sorted by descending score and
/// assigned highest first, each side leaving the pool once taken. Equal
/// scores prefer the entity with higher `best_confidence` (stability over
/// flicker); remaining ties fall back to index order for determinism.
pub fn greedy_assignment(
    scores: &Array2<f64>,
    min_score: f64,
    best_confidence: &[f32],
) -> MatchResult {
    let (num_entities, num_detections) = scores.dim();

    let mut candidates: Vec<(usize, usize, f64)> = Vec::new();
    for i in 0..num_entities {
        for j in 0..num_detections {
            let score = scores[[i, j]];
            if score >= min_score {
                candidates.push((i, j, score));
            }
        }
    }

    candidates.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                best_confidence[b.0]
                    .partial_cmp(&best_confidence[a.0])
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| (a.0, a.1).cmp(&(b.0, b.1)))
    });

    let mut entity_taken = vec![false; num_entities];
    let mut detection_taken = vec![false; num_detections];
    let mut matched = Vec::new();

    for (i, j, _) in candidates {
        if entity_taken[i] || detection_taken[j] {
            continue;
        }
        entity_taken[i] = true;
        detection_taken[j] = true;
        matched.push((i, j));
    }

    MatchResult {
        matched,
        new_detections: (0..num_detections).filter(|&j| !detection_taken[j]).collect(),
        unmatched_entities: (0..num_entities).filter(|&i| !entity_taken[i]).collect(),
    }
}
