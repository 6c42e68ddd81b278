//! Sliding-window matcher and greedy conflict resolution.
//!
//! A correction pass runs four stages over one hypothesis text:
//!
//! 1. collect: lazily generate candidate windows for each lexicon entry
//! 2. score: a [`DistanceBreakdown`] per (window, entry) pair, dropping
//!    pairs above the threshold as they are produced
//! 3. resolve: sort survivors and greedily accept non-overlapping spans
//! 4. apply: splice accepted replacements into the text left to right
//!
//! Resolution is an approximation: greedy acceptance can miss the
//! maximum-weight set of non-overlapping spans.

use crate::config::CorrectorConfig;
use crate::distance::SegmentalConfig;
use crate::error::Result;
use crate::text::{AnnotatedText, ENGLISH};
use crate::traits::Phonemizer;
use crate::types::{
    CorrectionResult, DistanceBreakdown, MatchCandidate, Metadata, PhoneticSequence, ReferenceEntry,
};
use std::cmp::Ordering;
use tracing::{debug, trace, warn};

/// Phonetic corrector: a validated config plus a phonemizer.
#[derive(Clone, Debug)]
pub struct Corrector<P> {
    config: CorrectorConfig,
    phonemizer: P,
}

impl<P: Phonemizer> Corrector<P> {
    /// Create a corrector.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::ConfigError`] if `config` fails validation.
    pub fn new(config: CorrectorConfig, phonemizer: P) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, phonemizer })
    }

    pub fn config(&self) -> &CorrectorConfig {
        &self.config
    }

    pub fn phonemizer(&self) -> &P {
        &self.phonemizer
    }

    /// Tokenize and phonemize `text`.
    pub fn annotate<'t>(&self, text: &'t str) -> Result<AnnotatedText<'t>> {
        Ok(AnnotatedText::annotate(
            text,
            &self.phonemizer,
            self.config.spelled_prosody,
        )?)
    }

    /// Build a lexicon entry by phonemizing `surface` token by token.
    ///
    /// The entry language is that of the first content token.
    pub fn entry(&self, surface: &str, metadata: Metadata) -> Result<ReferenceEntry> {
        let annotated = self.annotate(surface)?;
        let language = annotated.primary_language().unwrap_or(ENGLISH);

        Ok(ReferenceEntry::new(surface, language, annotated.full_sequence()).with_metadata(metadata))
    }

    /// Build a lexicon entry by phonemizing `surface` token by token as
    /// `language`.
    ///
    /// Tokens and acronyms are handled as in [`Corrector::annotate`], so a
    /// text equal to `surface` in that language scores zero against it.
    pub fn entry_in(&self, surface: &str, language: &str, metadata: Metadata) -> Result<ReferenceEntry> {
        let annotated = AnnotatedText::annotate_as(
            surface,
            &self.phonemizer,
            self.config.spelled_prosody,
            Some(language),
        )?;

        Ok(ReferenceEntry::new(surface, language, annotated.full_sequence()).with_metadata(metadata))
    }

    /// Every below-threshold candidate, in resolution order.
    pub fn suggest<'l>(&self, text: &str, lexicon: &'l [ReferenceEntry]) -> Result<Vec<MatchCandidate<'l>>> {
        if lexicon.is_empty() {
            return Ok(Vec::new());
        }

        let annotated = self.annotate(text)?;
        self.check_features(
            annotated
                .tokens()
                .iter()
                .map(|t| &t.sequence)
                .chain(lexicon.iter().map(ReferenceEntry::sequence)),
        );

        let mut candidates = self.score(&annotated, lexicon);
        candidates.sort_by(resolution_order);

        Ok(candidates)
    }

    /// Run a full correction pass.
    ///
    /// # Errors
    ///
    /// Phonemizer failures abort the pass; no partial result is returned.
    pub fn correct(&self, text: &str, lexicon: &[ReferenceEntry]) -> Result<CorrectionResult> {
        let candidates = self.suggest(text, lexicon)?;
        let accepted = resolve(candidates);

        debug!(accepted = accepted.len(), "resolved candidates");

        Ok(apply(text, accepted))
    }

    /// Distance between the phones of two strings.
    pub fn distance(&self, a: &str, b: &str) -> Result<DistanceBreakdown> {
        let a = self.annotate(a)?.full_sequence();
        let b = self.annotate(b)?.full_sequence();
        self.check_features([&a, &b]);

        Ok(self.config.model.breakdown(&a, &b))
    }

    /// Space-separated phone labels of `text`.
    pub fn transcribe(&self, text: &str) -> Result<String> {
        Ok(self.annotate(text)?.full_sequence().transcription())
    }

    fn check_features<'s>(&self, sequences: impl IntoIterator<Item = &'s PhoneticSequence>) {
        if lacks_features(&self.config.model.segmental, sequences) {
            warn!("feature-based metrics are configured but no phone carries a feature vector");
        }
    }

    /// Score every window of every entry, keeping those within the threshold.
    ///
    /// Windows are generated lazily per entry and dropped right after scoring.
    fn score<'l>(&self, annotated: &AnnotatedText<'_>, lexicon: &'l [ReferenceEntry]) -> Vec<MatchCandidate<'l>> {
        let model = &self.config.model;
        let window_config = &self.config.window;
        let threshold = self.config.threshold;

        let entry_candidates = move |(entry_index, entry): (usize, &'l ReferenceEntry)| {
            window_config.windows(annotated, entry).filter_map(move |window| {
                let breakdown = model.breakdown(&window.sequence, entry.sequence());
                (breakdown.total <= threshold).then_some(MatchCandidate {
                    window,
                    entry,
                    entry_index,
                    breakdown,
                })
            })
        };

        #[cfg(feature = "parallel")]
        let candidates: Vec<_> = {
            use rayon::prelude::*;
            lexicon.par_iter().enumerate().flat_map_iter(entry_candidates).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let candidates: Vec<_> = lexicon.iter().enumerate().flat_map(entry_candidates).collect();

        debug!(
            tokens = annotated.tokens().len(),
            entries = lexicon.len(),
            kept = candidates.len(),
            threshold,
            "scored candidate windows"
        );

        candidates
    }
}

/// Run one correction pass with a fresh [`Corrector`].
pub fn correct<P: Phonemizer>(
    text: &str,
    lexicon: &[ReferenceEntry],
    config: &CorrectorConfig,
    phonemizer: P,
) -> Result<CorrectionResult> {
    Corrector::new(config.clone(), phonemizer)?.correct(text, lexicon)
}

/// Feature metrics are weighted but none of the phones has features.
///
/// Such metrics then compare zero vectors only.
fn lacks_features<'s>(
    segmental: &SegmentalConfig,
    sequences: impl IntoIterator<Item = &'s PhoneticSequence>,
) -> bool {
    if !segmental.uses_features() {
        return false;
    }

    let mut units = sequences.into_iter().flat_map(|s| s.units()).peekable();
    units.peek().is_some() && units.all(|u| u.features().is_none())
}

/// Total ascending, then longer span, earlier start, lower entry index.
fn resolution_order(a: &MatchCandidate<'_>, b: &MatchCandidate<'_>) -> Ordering {
    a.breakdown
        .total
        .total_cmp(&b.breakdown.total)
        .then_with(|| b.window.span.len().cmp(&a.window.span.len()))
        .then_with(|| a.window.span.start.cmp(&b.window.span.start))
        .then_with(|| a.entry_index.cmp(&b.entry_index))
}

/// Greedily accept sorted candidates whose spans do not overlap.
///
/// Returns the accepted candidates in ascending start order.
fn resolve(sorted: Vec<MatchCandidate<'_>>) -> Vec<MatchCandidate<'_>> {
    let mut accepted: Vec<MatchCandidate<'_>> = Vec::new();

    for candidate in sorted {
        let span = candidate.window.span;
        if accepted.iter().all(|a| !a.window.span.overlaps(&span)) {
            accepted.push(candidate);
        }
    }

    accepted.sort_by_key(|c| c.window.span.start);
    accepted
}

fn apply(text: &str, accepted: Vec<MatchCandidate<'_>>) -> CorrectionResult {
    let mut corrected = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut substitutions = Vec::with_capacity(accepted.len());

    for candidate in &accepted {
        let bytes = &candidate.window.bytes;
        corrected.push_str(&text[cursor..bytes.start]);
        corrected.push_str(candidate.entry.surface());
        cursor = bytes.end;

        let substitution = candidate.substitution(text);
        trace!(
            span = %substitution.span,
            original = %substitution.original,
            replacement = %substitution.replacement,
            total = substitution.breakdown.total,
            "accepted substitution"
        );
        substitutions.push(substitution);
    }

    corrected.push_str(&text[cursor..]);

    CorrectionResult {
        text: corrected,
        substitutions,
    }
}
