//! Per-frame tracking driver: reconciles detections against the live entity
//! set and exposes the mutation surface used by translation write-backs.

use log::{debug, trace};

use crate::tracker::entity::TrackedEntity;
use crate::tracker::entity_state::DetectionState;
use crate::tracker::lifecycle::{LifecycleConfig, LifecycleController};
use crate::tracker::matching::{self, Detection, MatcherConfig};
use crate::tracker::similarity;
use crate::tracker::smoothing::{PositionSmoother, SmootherConfig};

/// Configuration for the text tracker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Detections below this confidence are discarded before matching
    pub min_confidence: f32,
    /// Minimum composite score for a candidate pair to survive
    pub match_threshold: f64,
    /// Weight of spatial proximity in the composite score
    pub spatial_weight: f64,
    /// Weight of text similarity in the composite score
    pub text_weight: f64,
    /// Center distance at which spatial proximity reaches zero
    pub max_center_distance: f32,
    /// Weight of center proximity within the spatial score
    pub proximity_weight: f64,
    /// Weight of IoU within the spatial score
    pub iou_weight: f64,
    /// Box smoothing factor
    pub smoothing_alpha: f32,
    /// EWMA retention for the quality score
    pub quality_smoothing: f32,
    /// Missed frames over which suspicion ramps to 1
    pub grace_period_frames: u32,
    /// Consecutive stable frames required before translation
    pub debounce_frames: u32,
    /// Similarity above which a matched frame extends the stable streak
    pub stability_threshold: f64,
    /// Missed frames after which an entity turns `Stale`
    pub stale_after_frames: u32,
    /// Missed frames after which an entity is removed
    pub removal_frames: u32,
    /// Translation attempts before giving up on an entity's current text
    pub max_translation_attempts: u32,
    /// Base frame gap between translation retries
    pub retry_backoff_frames: u32,
    /// Similarity below which text counts as materially changed
    pub retranslate_threshold: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        let matcher = MatcherConfig::default();
        let smoother = SmootherConfig::default();
        let lifecycle = LifecycleConfig::default();
        Self {
            min_confidence: 0.3,
            match_threshold: matcher.min_composite,
            spatial_weight: matcher.spatial_weight,
            text_weight: matcher.text_weight,
            max_center_distance: matcher.max_center_distance,
            proximity_weight: matcher.proximity_weight,
            iou_weight: matcher.iou_weight,
            smoothing_alpha: smoother.alpha,
            quality_smoothing: smoother.quality_smoothing,
            grace_period_frames: smoother.grace_period_frames,
            debounce_frames: lifecycle.debounce_frames,
            stability_threshold: lifecycle.stability_threshold,
            stale_after_frames: lifecycle.stale_after_frames,
            removal_frames: lifecycle.removal_frames,
            max_translation_attempts: lifecycle.max_translation_attempts,
            retry_backoff_frames: lifecycle.retry_backoff_frames,
            retranslate_threshold: lifecycle.retranslate_threshold,
        }
    }
}

/// A translation request for one entity, handed to the orchestrator.
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub entity_id: u64,
    /// The entity's best-seen text
    pub text: String,
    /// Already-assigned source language, if any
    pub source_language: Option<String>,
}

/// Tracks text entities across frames.
///
/// `update` is the synchronous frame path and must stay fast; translation
/// results re-enter through `apply_translation`, which tolerates the entity
/// having disappeared in the meantime. `clear` bumps a generation counter so
/// completions from before the clear are recognized and dropped.
pub struct TextTracker {
    entities: Vec<TrackedEntity>,
    frame_id: u64,
    generation: u64,
    config: TrackerConfig,
    matcher_config: MatcherConfig,
    smoother: PositionSmoother,
    lifecycle: LifecycleController,
}

impl TextTracker {
    pub fn new(config: TrackerConfig) -> Self {
        let matcher_config = MatcherConfig {
            spatial_weight: config.spatial_weight,
            text_weight: config.text_weight,
            min_composite: config.match_threshold,
            max_center_distance: config.max_center_distance,
            proximity_weight: config.proximity_weight,
            iou_weight: config.iou_weight,
        };
        let smoother = PositionSmoother::new(SmootherConfig {
            alpha: config.smoothing_alpha,
            quality_smoothing: config.quality_smoothing,
            grace_period_frames: config.grace_period_frames,
        });
        let lifecycle = LifecycleController::new(LifecycleConfig {
            debounce_frames: config.debounce_frames,
            stability_threshold: config.stability_threshold,
            stale_after_frames: config.stale_after_frames,
            removal_frames: config.removal_frames,
            max_translation_attempts: config.max_translation_attempts,
            retry_backoff_frames: config.retry_backoff_frames,
            retranslate_threshold: config.retranslate_threshold,
        });
        Self {
            entities: Vec::new(),
            frame_id: 0,
            generation: 0,
            config,
            matcher_config,
            smoother,
            lifecycle,
        }
    }

    /// Reconcile one frame of raw detections and return snapshots of the live
    /// entity set for the rendering consumer.
    pub fn update(&mut self, detections: Vec<Detection>) -> Vec<TrackedEntity> {
        self.frame_id += 1;

        // Drop noise before matching: empty/punctuation-only text and
        // low-confidence fragments never become entities.
        let detections: Vec<Detection> = detections
            .into_iter()
            .filter(|d| d.confidence >= self.config.min_confidence)
            .filter(|d| similarity::is_translatable(&d.text))
            .collect();

        let result = matching::reconcile(&self.entities, &detections, &self.matcher_config);

        for &(entity_idx, det_idx) in &result.matched {
            let entity = &mut self.entities[entity_idx];
            let det = &detections[det_idx];
            let stable = similarity::similarity(&det.text, &entity.best_text)
                >= self.config.stability_threshold;
            entity.record_observation(det, stable);
            self.lifecycle.on_match(entity);
            self.smoother.on_match(entity);
        }

        for &entity_idx in &result.unmatched_entities {
            let entity = &mut self.entities[entity_idx];
            entity.record_miss();
            self.smoother.on_miss(entity);
            self.lifecycle.on_miss(entity);
        }

        for &det_idx in &result.new_detections {
            let entity = TrackedEntity::from_detection(&detections[det_idx]);
            trace!(
                "frame {}: new entity {} {:?}",
                self.frame_id, entity.id, entity.raw_text
            );
            self.entities.push(entity);
        }

        self.entities.retain(|e| e.state.is_live());
        self.snapshots()
    }

    /// Immutable copies of all live entities.
    pub fn snapshots(&self) -> Vec<TrackedEntity> {
        self.entities.clone()
    }

    /// Entities whose debounce criterion is met and which are eligible for a
    /// translation attempt this cycle.
    pub fn translation_candidates(&self) -> Vec<TranslationRequest> {
        self.entities
            .iter()
            .filter(|e| self.lifecycle.ready_for_translation(e, self.frame_id))
            .map(|e| TranslationRequest {
                entity_id: e.id,
                text: e.best_text.clone(),
                source_language: e.source_language.clone(),
            })
            .collect()
    }

    /// Record a detected source language for an entity.
    pub fn assign_language(&mut self, entity_id: u64, language: &str) {
        if let Some(entity) = find_entity(&mut self.entities, entity_id) {
            entity.source_language = Some(language.to_string());
        }
    }

    /// Mark an entity as having a translation request in flight. Returns false
    /// if the entity no longer exists.
    pub fn mark_translating(&mut self, entity_id: u64) -> bool {
        let frame_id = self.frame_id;
        match find_entity(&mut self.entities, entity_id) {
            Some(entity) => {
                self.lifecycle.mark_translating(entity, frame_id);
                true
            }
            None => false,
        }
    }

    /// Merge a completed translation back in. `Some` is a successful
    /// translation, `None` a per-text failure. Returns false when the result
    /// was discarded because the entity set was cleared or the entity is gone;
    /// that is an expected race, not an error.
    pub fn apply_translation(
        &mut self,
        entity_id: u64,
        generation: u64,
        translation: Option<String>,
    ) -> bool {
        if generation != self.generation {
            debug!(
                "discarding translation for entity {entity_id}: generation {generation} superseded"
            );
            return false;
        }
        match find_entity(&mut self.entities, entity_id) {
            Some(entity) => {
                match translation {
                    Some(text) => self.lifecycle.apply_success(entity, text),
                    None => self.lifecycle.apply_failure(entity),
                }
                true
            }
            None => {
                debug!("discarding translation for entity {entity_id}: no longer tracked");
                false
            }
        }
    }

    /// Atomically empty the live set. In-flight translation completions see
    /// the bumped generation and are dropped on arrival.
    pub fn clear(&mut self) {
        debug!("clearing {} tracked entities", self.entities.len());
        self.entities.clear();
        self.generation += 1;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }
}

fn find_entity(entities: &mut [TrackedEntity], entity_id: u64) -> Option<&mut TrackedEntity> {
    entities
        .iter_mut()
        .find(|e| e.id == entity_id && e.state != DetectionState::Removed)
}
