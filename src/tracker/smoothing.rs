//! Temporal filtering of entity boxes and quality/suspicion scores.

use crate::tracker::entity::TrackedEntity;

/// Configuration for position and quality smoothing.
#[derive(Debug, Clone)]
pub struct SmootherConfig {
    /// Lerp factor toward the newest raw box. Tuned so motion looks
    /// continuous while still tracking real movement within a few frames.
    pub alpha: f32,
    /// EWMA retention for the quality score (fraction of the old value kept)
    pub quality_smoothing: f32,
    /// Missed frames over which suspicion ramps from 0 to 1
    pub grace_period_frames: u32,
}

impl Default for SmootherConfig {
    fn default() -> Self {
        Self {
            alpha: 0.4,
            quality_smoothing: 0.7,
            grace_period_frames: 10,
        }
    }
}

/// Smooths box motion and maintains `quality_score` / `suspicion_level`.
#[derive(Debug, Clone, Default)]
pub struct PositionSmoother {
    config: SmootherConfig,
}

impl PositionSmoother {
    pub fn new(config: SmootherConfig) -> Self {
        Self { config }
    }

    /// Update after a successful match: glide the smoothed box toward the new
    /// raw box, refresh quality, and clear suspicion.
    pub fn on_match(&self, entity: &mut TrackedEntity) {
        entity.smoothed_box = entity
            .smoothed_box
            .lerp(&entity.bounding_box, self.config.alpha);
        entity.suspicion_level = 0.0;
        self.update_quality(entity);
    }

    /// Update after a miss: the box is frozen in place, suspicion rises as a
    /// saturating function of the miss streak, and quality decays through the
    /// reduced hit ratio.
    pub fn on_miss(&self, entity: &mut TrackedEntity) {
        entity.suspicion_level =
            (entity.frames_since_seen as f32 / self.config.grace_period_frames as f32).min(1.0);
        self.update_quality(entity);
    }

    /// Quality blends instantaneous confidence with match consistency, folded
    /// into an EWMA so a freshly detected entity reads as uncertain even at
    /// high instantaneous confidence.
    fn update_quality(&self, entity: &mut TrackedEntity) {
        let instant = 0.5 * entity.confidence + 0.5 * entity.hit_ratio();
        let keep = self.config.quality_smoothing;
        entity.quality_score = (keep * entity.quality_score + (1.0 - keep) * instant).clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::matching::Detection;
    use crate::tracker::rect::Rect;

    fn entity() -> TrackedEntity {
        TrackedEntity::from_detection(&Detection::new(
            "menu",
            Rect::new(0.1, 0.1, 0.2, 0.05),
            0.9,
        ))
    }

    #[test]
    fn test_box_glides_toward_detection() {
        let smoother = PositionSmoother::default();
        let mut e = entity();
        e.record_observation(
            &Detection::new("menu", Rect::new(0.2, 0.1, 0.2, 0.05), 0.9),
            true,
        );
        smoother.on_match(&mut e);

        // Moved 40% of the way from 0.1 to 0.2.
        assert!((e.smoothed_box.x - 0.14).abs() < 1e-6);
        assert_eq!(e.suspicion_level, 0.0);
    }

    #[test]
    fn test_box_frozen_on_miss() {
        let smoother = PositionSmoother::default();
        let mut e = entity();
        let before = e.smoothed_box;

        e.record_miss();
        smoother.on_miss(&mut e);
        assert_eq!(e.smoothed_box, before);
    }

    #[test]
    fn test_suspicion_ramps_and_resets() {
        let smoother = PositionSmoother::default();
        let mut e = entity();

        let mut last = 0.0;
        for _ in 0..5 {
            e.record_miss();
            smoother.on_miss(&mut e);
            assert!(e.suspicion_level > last);
            last = e.suspicion_level;
        }
        assert!((e.suspicion_level - 0.5).abs() < 1e-6);
        assert!(e.suspicion_level < 1.0);

        // Saturates at 1.0 past the grace period.
        for _ in 0..20 {
            e.record_miss();
            smoother.on_miss(&mut e);
        }
        assert_eq!(e.suspicion_level, 1.0);

        e.record_observation(
            &Detection::new("menu", Rect::new(0.1, 0.1, 0.2, 0.05), 0.9),
            true,
        );
        smoother.on_match(&mut e);
        assert_eq!(e.suspicion_level, 0.0);
    }

    #[test]
    fn test_quality_converges_from_uncertain() {
        let smoother = PositionSmoother::default();
        let mut e = entity();
        assert_eq!(e.quality_score, 0.0);

        let mut last = 0.0;
        for _ in 0..10 {
            e.record_observation(
                &Detection::new("menu", Rect::new(0.1, 0.1, 0.2, 0.05), 0.9),
                true,
            );
            smoother.on_match(&mut e);
            assert!(e.quality_score > last);
            last = e.quality_score;
        }
        // Converging toward 0.5 * 0.9 + 0.5 * 1.0.
        assert!(e.quality_score > 0.8);
    }
}
