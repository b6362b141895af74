/// Lifecycle state of a tracked text entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionState {
    /// Recently detected, accumulating stable observations before translation
    #[default]
    Detected,
    /// A translation request has been dispatched or queued
    Translating,
    /// A translation is available in `best_translation`
    Translated,
    /// Not re-detected past the stale threshold; rendering fades it out
    Stale,
    /// Dropped from the live set; terminal, ids are never reused
    Removed,
}

impl DetectionState {
    /// Whether the entity still belongs in the live set.
    pub fn is_live(&self) -> bool {
        *self != DetectionState::Removed
    }
}
