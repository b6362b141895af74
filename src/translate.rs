//! Translation fusion: cache, collaborator traits, and the orchestrator that
//! connects asynchronous translation results back to the tracker.

mod backend;
mod cache;
mod orchestrator;

pub use backend::{LanguageDetector, TranslateError, Translator};
pub use cache::TranslationCache;
pub use orchestrator::TranslationOrchestrator;

pub(crate) use orchestrator::lock_tracker;
