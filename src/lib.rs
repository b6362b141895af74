//! Text tracking and translation fusion for per-frame OCR streams.
//!
//! An OCR stage running at camera frame rate produces noisy, per-frame text
//! detections. This crate turns that stream into a stable set of tracked
//! entities suitable for overlay rendering: detections are matched to
//! previously seen text by spatial proximity and edit-distance similarity,
//! positions are smoothed, and entities that have been observed stably for
//! long enough are translated in batches through an asynchronous collaborator,
//! with results fused back in without ever blocking the frame path.
//!
//! The synchronous frame path lives in [`tracker`]; asynchronous translation
//! batching, caching, and write-back live in [`translate`]; [`integration`]
//! bundles both behind a recognition-source trait.

pub mod integration;
pub mod tracker;
pub mod translate;

pub use integration::{DetectionBuilder, TextSource, TrackingPipeline};
pub use tracker::{
    Detection, DetectionState, Rect, TextTracker, TrackedEntity, TrackerConfig,
};
pub use translate::{
    LanguageDetector, TranslateError, TranslationCache, TranslationOrchestrator, Translator,
};
