//! Integration module for connecting recognition backends with the tracker.
//!
//! This module provides traits and utilities for feeding any OCR engine's
//! per-frame output into the tracking and translation pipeline.

mod builder;
mod pipeline;
mod recognizer;

pub use builder::DetectionBuilder;
pub use pipeline::TrackingPipeline;
pub use recognizer::{IntoDetections, TextSource};
