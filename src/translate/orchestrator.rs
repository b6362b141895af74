//! Batches translation work by source language, consults the cache, fans out
//! external calls, and merges results back into the tracker.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::future::join_all;
use log::warn;

use crate::tracker::{TextTracker, TranslationRequest};
use crate::translate::backend::{LanguageDetector, Translator};
use crate::translate::cache::TranslationCache;

/// Lock the shared tracker, absorbing poisoning: the tracker's state is a
/// per-frame reconciliation that the next frame rebuilds anyway.
pub(crate) fn lock_tracker(tracker: &Mutex<TextTracker>) -> MutexGuard<'_, TextTracker> {
    tracker
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Drives asynchronous translation for a shared [`TextTracker`].
///
/// One `run_cycle` call is one structured batch: candidates are gathered
/// under a short lock, grouped by source language, resolved from the cache
/// where possible, and the remaining groups are fanned out as parallel
/// batched calls that are awaited together. Write-backs reacquire the lock
/// per batch and are dropped silently if the entity set was cleared or the
/// entity disappeared in the meantime. The lock is never held across an
/// await.
pub struct TranslationOrchestrator {
    tracker: Arc<Mutex<TextTracker>>,
    cache: Arc<TranslationCache>,
    translator: Arc<dyn Translator>,
    detector: Arc<dyn LanguageDetector>,
    target_language: String,
}

impl TranslationOrchestrator {
    pub fn new(
        tracker: Arc<Mutex<TextTracker>>,
        cache: Arc<TranslationCache>,
        translator: Arc<dyn Translator>,
        detector: Arc<dyn LanguageDetector>,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            tracker,
            cache,
            translator,
            detector,
            target_language: target_language.into(),
        }
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    pub fn cache(&self) -> &Arc<TranslationCache> {
        &self.cache
    }

    /// Run one translation cycle. Returns the number of entities resolved
    /// this cycle (successfully or as per-text failures).
    pub async fn run_cycle(&self) -> usize {
        let (generation, mut candidates) = {
            let tracker = lock_tracker(&self.tracker);
            (tracker.generation(), tracker.translation_candidates())
        };
        if candidates.is_empty() {
            return 0;
        }

        self.resolve_languages(generation, &mut candidates).await;

        // Candidates the detector could not place wait for a later cycle.
        candidates.retain(|c| c.source_language.is_some());
        if candidates.is_empty() {
            return 0;
        }

        // Cache pass: hits resolve synchronously, misses group by language.
        let mut cache_hits: Vec<(u64, String)> = Vec::new();
        let mut groups: HashMap<String, Vec<TranslationRequest>> = HashMap::new();
        for candidate in candidates {
            let Some(language) = candidate.source_language.clone() else {
                continue;
            };
            match self
                .cache
                .get(&candidate.text, &language, &self.target_language)
            {
                Some(translation) => cache_hits.push((candidate.entity_id, translation)),
                None => groups.entry(language).or_default().push(candidate),
            }
        }

        let mut resolved = 0;
        {
            let mut tracker = lock_tracker(&self.tracker);
            if tracker.generation() != generation {
                return 0;
            }
            for (entity_id, translation) in cache_hits {
                if tracker.mark_translating(entity_id)
                    && tracker.apply_translation(entity_id, generation, Some(translation))
                {
                    resolved += 1;
                }
            }
            // Entities that vanished since the candidate snapshot drop out.
            for requests in groups.values_mut() {
                requests.retain(|r| tracker.mark_translating(r.entity_id));
            }
            groups.retain(|_, requests| !requests.is_empty());
        }

        // One batched call per language pair, awaited as a single scope.
        let batches = join_all(groups.into_iter().map(|(language, requests)| {
            let texts: Vec<String> = requests.iter().map(|r| r.text.clone()).collect();
            async move {
                let result = self
                    .translator
                    .translate_batch(&texts, &language, &self.target_language)
                    .await;
                (language, requests, result)
            }
        }))
        .await;

        for (language, requests, result) in batches {
            match result {
                Ok(translations) => {
                    let mut tracker = lock_tracker(&self.tracker);
                    for request in requests {
                        // Texts missing from the result are per-text failures.
                        match translations.get(&request.text) {
                            Some(translated) => {
                                self.cache.put(
                                    &request.text,
                                    &language,
                                    &self.target_language,
                                    translated.clone(),
                                );
                                tracker.apply_translation(
                                    request.entity_id,
                                    generation,
                                    Some(translated.clone()),
                                );
                            }
                            None => {
                                tracker.apply_translation(request.entity_id, generation, None);
                            }
                        }
                        resolved += 1;
                    }
                }
                Err(err) => {
                    warn!(
                        "translation batch '{language}' -> '{}' failed: {err}",
                        self.target_language
                    );
                    let mut tracker = lock_tracker(&self.tracker);
                    for request in requests {
                        tracker.apply_translation(request.entity_id, generation, None);
                        resolved += 1;
                    }
                }
            }
        }

        resolved
    }

    /// Ask the detection collaborator for languages of candidates that lack
    /// one, and record the assignments on both the tracker and the local
    /// candidate list.
    async fn resolve_languages(&self, generation: u64, candidates: &mut [TranslationRequest]) {
        let unknown: Vec<String> = candidates
            .iter()
            .filter(|c| c.source_language.is_none())
            .map(|c| c.text.clone())
            .collect();
        if unknown.is_empty() {
            return;
        }

        match self.detector.detect_languages(&unknown).await {
            Ok(grouped) => {
                let mut by_text: HashMap<&str, &str> = HashMap::new();
                for (language, texts) in &grouped {
                    for text in texts {
                        by_text.insert(text.as_str(), language.as_str());
                    }
                }

                let mut tracker = lock_tracker(&self.tracker);
                if tracker.generation() != generation {
                    return;
                }
                for candidate in candidates.iter_mut() {
                    if candidate.source_language.is_some() {
                        continue;
                    }
                    if let Some(&language) = by_text.get(candidate.text.as_str()) {
                        candidate.source_language = Some(language.to_string());
                        tracker.assign_language(candidate.entity_id, language);
                    }
                }
            }
            Err(err) => warn!("language detection failed: {err}"),
        }
    }
}
