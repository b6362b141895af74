//! Capability traits for the translation and language-detection
//! collaborators, so the core can be exercised against fakes without any real
//! network or language-pack dependency.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

/// Failures surfaced by the translation collaborators. None of these are
/// fatal to the frame path; they mark individual entities as failed at most.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("translation service unavailable: {0}")]
    Unavailable(String),
    #[error("no language pack installed for '{0}'")]
    MissingLanguagePack(String),
    #[error("translation request timed out")]
    Timeout,
    #[error("language detection failed: {0}")]
    Detection(String),
}

/// External translation service boundary.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate a batch of texts sharing one language pair.
    ///
    /// Partial results are acceptable: texts missing from the returned map
    /// are treated as per-text failures, not a batch failure.
    async fn translate_batch(
        &self,
        texts: &[String],
        source_language: &str,
        target_language: &str,
    ) -> Result<HashMap<String, String>, TranslateError>;
}

/// Canonical source-language decision for untagged text.
#[async_trait]
pub trait LanguageDetector: Send + Sync {
    /// Group the given texts by detected language code.
    async fn detect_languages(
        &self,
        texts: &[String],
    ) -> Result<HashMap<String, Vec<String>>, TranslateError>;
}
