//! Persistent record for one piece of on-screen text across frames.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::tracker::entity_state::DetectionState;
use crate::tracker::matching::Detection;
use crate::tracker::rect::Rect;

/// Global entity ID counter for unique ID generation.
static ENTITY_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Reset the global entity ID counter (useful for testing).
pub fn reset_entity_id_counter() {
    ENTITY_ID_COUNTER.store(0, Ordering::SeqCst);
}

/// Get the next unique entity ID.
fn next_entity_id() -> u64 {
    ENTITY_ID_COUNTER.fetch_add(1, Ordering::SeqCst) + 1
}

/// A tracked text entity: the stable identity the rendering consumer keys
/// animations on, accumulated over the noisy per-frame detection stream.
#[derive(Debug, Clone)]
pub struct TrackedEntity {
    /// Unique identifier, stable for the entity's lifetime, never reused
    pub id: u64,
    /// Current lifecycle state
    pub state: DetectionState,
    /// Most recent recognized text
    pub raw_text: String,
    /// Highest-confidence text seen across the entity's history
    pub best_text: String,
    /// Latest raw detection box, normalized coordinates
    pub bounding_box: Rect,
    /// Temporally filtered box used for rendering
    pub smoothed_box: Rect,
    /// Latest recognition confidence, 0..1
    pub confidence: f32,
    /// Maximum confidence observed (monotonic per lineage)
    pub best_confidence: f32,
    /// Blend of confidence stability and match consistency, 0..1
    pub quality_score: f32,
    /// 0 when currently detected, rising toward 1 as the entity goes unseen
    pub suspicion_level: f32,
    /// Translation for the latest attempt, if any
    pub translation: Option<String>,
    /// Last successfully obtained translation, retained across misses
    pub best_translation: Option<String>,
    /// Set once the retry budget is exhausted; cleared on material text change
    pub translation_failed: bool,
    /// Number of translation attempts dispatched for the current source text
    pub translation_attempts: u32,
    /// Frame at which the last translation attempt was dispatched
    pub last_attempt_frame: u64,
    /// The text the most recent translation attempt was dispatched for
    pub translation_source: Option<String>,
    /// Detected or assigned source language code
    pub source_language: Option<String>,
    /// Geometric flag for vertical script layout
    pub is_vertical_text: bool,
    /// Frames since the last successful match
    pub frames_since_seen: u32,
    /// Consecutive matched frames with stable text (debounce counter)
    pub stable_frames: u32,
    /// Total frames with a successful match
    pub hits: u32,
    /// Total frames this entity has existed
    pub age: u32,
    /// Creation timestamp
    pub created_at: Instant,
    /// Timestamp of the last successful match
    pub last_seen_at: Instant,
}

impl TrackedEntity {
    /// Create a new entity from an unmatched detection. Assigns a fresh id.
    pub fn from_detection(det: &Detection) -> Self {
        let now = Instant::now();
        Self {
            id: next_entity_id(),
            state: DetectionState::Detected,
            raw_text: det.text.clone(),
            best_text: det.text.clone(),
            bounding_box: det.bounding_box,
            smoothed_box: det.bounding_box,
            confidence: det.confidence,
            best_confidence: det.confidence,
            quality_score: 0.0,
            suspicion_level: 0.0,
            translation: None,
            best_translation: None,
            translation_failed: false,
            translation_attempts: 0,
            last_attempt_frame: 0,
            translation_source: None,
            source_language: None,
            is_vertical_text: vertical_layout(&det.bounding_box, &det.text),
            frames_since_seen: 0,
            stable_frames: 1,
            hits: 1,
            age: 1,
            created_at: now,
            last_seen_at: now,
        }
    }

    /// Fold a matched detection into the entity. `stable` reports whether the
    /// detection's text was similar enough to `best_text` to extend the
    /// debounce streak.
    pub fn record_observation(&mut self, det: &Detection, stable: bool) {
        // Best text follows the highest confidence seen, not the latest frame.
        if det.confidence >= self.best_confidence {
            self.best_text = det.text.clone();
            self.best_confidence = det.confidence;
        }

        self.raw_text = det.text.clone();
        self.bounding_box = det.bounding_box;
        self.confidence = det.confidence;
        self.is_vertical_text = vertical_layout(&det.bounding_box, &det.text);

        self.stable_frames = if stable { self.stable_frames + 1 } else { 1 };
        self.frames_since_seen = 0;
        self.hits += 1;
        self.age += 1;
        self.last_seen_at = Instant::now();
    }

    /// Account for a frame with no matching detection.
    pub fn record_miss(&mut self) {
        self.frames_since_seen += 1;
        self.age += 1;
        self.stable_frames = 0;
    }

    /// Fraction of this entity's lifetime it was actually matched.
    pub fn hit_ratio(&self) -> f32 {
        if self.age == 0 {
            return 0.0;
        }
        self.hits as f32 / self.age as f32
    }

    pub fn mark_removed(&mut self) {
        self.state = DetectionState::Removed;
    }
}

/// Vertical-script heuristic: a tall, narrow box holding more than one
/// character is laid out top-to-bottom.
fn vertical_layout(bbox: &Rect, text: &str) -> bool {
    text.chars().count() > 1 && bbox.height > bbox.width * 1.5
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(text: &str, conf: f32) -> Detection {
        Detection::new(text, Rect::new(0.1, 0.1, 0.2, 0.05), conf)
    }

    #[test]
    fn test_best_confidence_monotonic() {
        let mut e = TrackedEntity::from_detection(&det("menu", 0.8));
        assert_eq!(e.best_confidence, 0.8);

        e.record_observation(&det("menv", 0.5), true);
        assert_eq!(e.confidence, 0.5);
        assert_eq!(e.best_confidence, 0.8);
        assert_eq!(e.best_text, "menu");

        e.record_observation(&det("menu!", 0.95), true);
        assert_eq!(e.best_confidence, 0.95);
        assert_eq!(e.best_text, "menu!");
    }

    #[test]
    fn test_stable_streak_resets() {
        let mut e = TrackedEntity::from_detection(&det("menu", 0.8));
        assert_eq!(e.stable_frames, 1);

        e.record_observation(&det("menu", 0.8), true);
        e.record_observation(&det("menu", 0.8), true);
        assert_eq!(e.stable_frames, 3);

        e.record_observation(&det("completely different", 0.8), false);
        assert_eq!(e.stable_frames, 1);
    }

    #[test]
    fn test_miss_bookkeeping() {
        let mut e = TrackedEntity::from_detection(&det("menu", 0.8));
        e.record_miss();
        e.record_miss();
        assert_eq!(e.frames_since_seen, 2);
        assert_eq!(e.age, 3);
        assert_eq!(e.hits, 1);

        e.record_observation(&det("menu", 0.8), true);
        assert_eq!(e.frames_since_seen, 0);
        assert!((e.hit_ratio() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_vertical_layout() {
        let tall = Rect::new(0.1, 0.1, 0.05, 0.3);
        let wide = Rect::new(0.1, 0.1, 0.3, 0.05);
        assert!(TrackedEntity::from_detection(&Detection::new("縦書き", tall, 0.9)).is_vertical_text);
        assert!(!TrackedEntity::from_detection(&Detection::new("menu", wide, 0.9)).is_vertical_text);
        // Single characters never count as vertical.
        assert!(!TrackedEntity::from_detection(&Detection::new("A", tall, 0.9)).is_vertical_text);
    }

    #[test]
    fn test_ids_unique() {
        let a = TrackedEntity::from_detection(&det("a", 0.9));
        let b = TrackedEntity::from_detection(&det("b", 0.9));
        assert_ne!(a.id, b.id);
    }
}
