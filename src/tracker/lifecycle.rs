//! State machine driving each entity from detection through translation to
//! removal.

use log::debug;

use crate::tracker::entity::TrackedEntity;
use crate::tracker::entity_state::DetectionState;
use crate::tracker::similarity;

/// Thresholds governing entity state transitions.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Consecutive stable matched frames required before translation
    pub debounce_frames: u32,
    /// Similarity to `best_text` above which a matched frame counts as stable
    pub stability_threshold: f64,
    /// Missed frames after which an entity is marked `Stale`
    pub stale_after_frames: u32,
    /// Missed frames after which an entity is removed
    pub removal_frames: u32,
    /// Translation attempts before the entity is marked failed
    pub max_translation_attempts: u32,
    /// Frames to wait between attempts, multiplied by the attempt count
    pub retry_backoff_frames: u32,
    /// Similarity below which the current text counts as materially changed
    /// from the text that was translated, forcing a re-debounce
    pub retranslate_threshold: f64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            debounce_frames: 3,
            stability_threshold: 0.85,
            stale_after_frames: 3,
            removal_frames: 30,
            max_translation_attempts: 3,
            retry_backoff_frames: 15,
            retranslate_threshold: 0.8,
        }
    }
}

/// Applies lifecycle transitions to individual entities. Holds no per-entity
/// state of its own; everything lives on the [`TrackedEntity`].
#[derive(Debug, Clone, Default)]
pub struct LifecycleController {
    config: LifecycleConfig,
}

impl LifecycleController {
    pub fn new(config: LifecycleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Advance state after a successful match (called once the observation has
    /// been folded in, so `raw_text` is the current frame's text).
    pub fn on_match(&self, entity: &mut TrackedEntity) {
        // A stale entity that reappears resumes where it left off.
        if entity.state == DetectionState::Stale {
            entity.state = if entity.best_translation.is_some() {
                DetectionState::Translated
            } else {
                DetectionState::Detected
            };
        }

        // Material text change invalidates the existing translation attempt
        // history and sends the entity back through the debounce.
        if let Some(source) = entity.translation_source.clone() {
            if similarity::similarity(&entity.raw_text, &source) < self.config.retranslate_threshold
            {
                debug!(
                    "entity {} text changed materially, re-debouncing (was {:?})",
                    entity.id, source
                );
                entity.state = DetectionState::Detected;
                entity.translation = None;
                entity.translation_failed = false;
                entity.translation_attempts = 0;
                entity.translation_source = None;
                entity.stable_frames = 1;
            }
        }
    }

    /// Advance state after a missed frame.
    pub fn on_miss(&self, entity: &mut TrackedEntity) {
        if entity.frames_since_seen > self.config.removal_frames {
            debug!(
                "entity {} unseen for {} frames, removing",
                entity.id, entity.frames_since_seen
            );
            entity.mark_removed();
        } else if entity.frames_since_seen >= self.config.stale_after_frames
            && entity.state != DetectionState::Removed
        {
            entity.state = DetectionState::Stale;
        }
    }

    /// Whether the entity has debounced long enough to be translated this
    /// cycle. Language assignment is checked by the orchestrator, which can
    /// still resolve it; failed entities stay parked until their text changes.
    pub fn ready_for_translation(&self, entity: &TrackedEntity, frame_id: u64) -> bool {
        if entity.state != DetectionState::Detected
            || entity.translation_failed
            || entity.stable_frames < self.config.debounce_frames
        {
            return false;
        }

        // Frame-based backoff between retries; the frame path never sleeps.
        if entity.translation_attempts > 0 {
            let wait = self.config.retry_backoff_frames as u64 * entity.translation_attempts as u64;
            if frame_id.saturating_sub(entity.last_attempt_frame) < wait {
                return false;
            }
        }

        true
    }

    /// Record dispatch of a translation request for the entity's best text.
    pub fn mark_translating(&self, entity: &mut TrackedEntity, frame_id: u64) {
        entity.state = DetectionState::Translating;
        entity.translation_attempts += 1;
        entity.last_attempt_frame = frame_id;
        entity.translation_source = Some(entity.best_text.clone());
    }

    /// Fold in a completed translation.
    pub fn apply_success(&self, entity: &mut TrackedEntity, translated: String) {
        entity.translation = Some(translated.clone());
        entity.best_translation = Some(translated);
        entity.translation_failed = false;
        entity.translation_attempts = 0;
        // A stale entity keeps fading; the translation is there when it
        // reappears.
        if entity.state == DetectionState::Translating {
            entity.state = DetectionState::Translated;
        }
    }

    /// Record a failed translation attempt. The entity keeps showing its
    /// original text; once the retry budget is spent it is parked until the
    /// source text changes materially.
    pub fn apply_failure(&self, entity: &mut TrackedEntity) {
        if entity.state == DetectionState::Translating {
            entity.state = DetectionState::Detected;
        }
        if entity.translation_attempts >= self.config.max_translation_attempts {
            debug!(
                "entity {} exhausted {} translation attempts",
                entity.id, entity.translation_attempts
            );
            entity.translation_failed = true;
        }
    }
}
