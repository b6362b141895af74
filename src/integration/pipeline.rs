//! TrackingPipeline for combining recognition, tracking, and translation.

use std::sync::{Arc, Mutex};

use crate::tracker::{TextTracker, TrackedEntity, TrackerConfig};
use crate::translate::{
    LanguageDetector, TranslationCache, TranslationOrchestrator, Translator, lock_tracker,
};

use super::TextSource;

/// End-to-end pipeline: a recognition backend feeding a shared tracker, with
/// a translation orchestrator fusing results back in.
///
/// `process_frame` is the synchronous frame path; `translate_pending` is the
/// asynchronous translation cycle and may be driven from a separate task at
/// its own cadence.
pub struct TrackingPipeline<S: TextSource> {
    source: S,
    tracker: Arc<Mutex<TextTracker>>,
    orchestrator: TranslationOrchestrator,
}

impl<S: TextSource> TrackingPipeline<S> {
    /// Create a new pipeline with the given recognition source, tracker
    /// configuration, and translation collaborators.
    pub fn new(
        source: S,
        config: TrackerConfig,
        translator: Arc<dyn Translator>,
        detector: Arc<dyn LanguageDetector>,
        target_language: impl Into<String>,
    ) -> Self {
        let tracker = Arc::new(Mutex::new(TextTracker::new(config)));
        let cache = Arc::new(TranslationCache::default());
        let orchestrator = TranslationOrchestrator::new(
            Arc::clone(&tracker),
            cache,
            translator,
            detector,
            target_language,
        );
        Self {
            source,
            tracker,
            orchestrator,
        }
    }

    /// Process a single frame and return snapshots of the live entities.
    ///
    /// Runs recognition on the input image, then reconciles the detections
    /// against the tracked set. Never blocks on translation.
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<TrackedEntity>, S::Error> {
        let detections = self.source.recognize(input, width, height)?;
        Ok(lock_tracker(&self.tracker).update(detections))
    }

    /// Run one translation cycle for entities that have debounced. Returns
    /// the number of entities resolved.
    pub async fn translate_pending(&self) -> usize {
        self.orchestrator.run_cycle().await
    }

    /// Snapshots of the current live entity set, for on-demand rendering.
    pub fn entities(&self) -> Vec<TrackedEntity> {
        lock_tracker(&self.tracker).snapshots()
    }

    /// Atomically drop all tracked entities (e.g., on a mode switch).
    /// Translation results still in flight are discarded on arrival.
    pub fn clear(&self) {
        lock_tracker(&self.tracker).clear();
    }

    /// Get a reference to the underlying recognition source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a mutable reference to the underlying recognition source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Handle to the shared tracker.
    pub fn tracker(&self) -> Arc<Mutex<TextTracker>> {
        Arc::clone(&self.tracker)
    }

    /// The translation orchestrator driving this pipeline.
    pub fn orchestrator(&self) -> &TranslationOrchestrator {
        &self.orchestrator
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;

    use super::*;
    use crate::tracker::{Detection, Rect};
    use crate::translate::TranslateError;

    struct MockOcr {
        detections: Vec<Detection>,
    }

    impl TextSource for MockOcr {
        type Error = std::convert::Infallible;

        fn recognize(
            &mut self,
            _input: &[u8],
            _width: u32,
            _height: u32,
        ) -> Result<Vec<Detection>, Self::Error> {
            Ok(self.detections.clone())
        }
    }

    struct NullTranslator;

    #[async_trait]
    impl Translator for NullTranslator {
        async fn translate_batch(
            &self,
            _texts: &[String],
            _source_language: &str,
            _target_language: &str,
        ) -> Result<HashMap<String, String>, TranslateError> {
            Ok(HashMap::new())
        }
    }

    struct NullDetector;

    #[async_trait]
    impl LanguageDetector for NullDetector {
        async fn detect_languages(
            &self,
            _texts: &[String],
        ) -> Result<HashMap<String, Vec<String>>, TranslateError> {
            Ok(HashMap::new())
        }
    }

    #[test]
    fn test_pipeline_tracks_frames() {
        let source = MockOcr {
            detections: vec![Detection::new(
                "Menu",
                Rect::new(0.1, 0.1, 0.2, 0.05),
                0.9,
            )],
        };
        let mut pipeline = TrackingPipeline::new(
            source,
            TrackerConfig::default(),
            Arc::new(NullTranslator),
            Arc::new(NullDetector),
            "en",
        );

        let entities = pipeline.process_frame(&[], 640, 480).unwrap();
        assert_eq!(entities.len(), 1);
        let id = entities[0].id;

        let entities = pipeline.process_frame(&[], 640, 480).unwrap();
        assert_eq!(entities[0].id, id);

        pipeline.clear();
        assert!(pipeline.entities().is_empty());
    }
}
