mod entity;
mod entity_state;
mod lifecycle;
mod matching;
mod rect;
pub mod similarity;
mod smoothing;
mod text_tracker;

pub use entity::{TrackedEntity, reset_entity_id_counter};
pub use entity_state::DetectionState;
pub use lifecycle::{LifecycleConfig, LifecycleController};
pub use matching::{Detection, MatchResult, MatcherConfig};
pub use rect::Rect;
pub use smoothing::{PositionSmoother, SmootherConfig};
pub use text_tracker::{TextTracker, TrackerConfig, TranslationRequest};
