//! Candidate window generation over annotated text.

use crate::text::AnnotatedText;
use crate::types::{CandidateWindow, ReferenceEntry};
use serde::{Deserialize, Serialize};

/// Default window length tolerance
const DEFAULT_TOLERANCE: usize = 1;

/// Unit used to measure window and entry length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthMeasure {
    /// Content tokens (Han characters, alphabetic words)
    #[default]
    Tokens,
    /// Phonetic units
    Phones,
}

/// Configuration for window generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Allowed length difference from the entry, in `measure` units
    pub tolerance: usize,
    pub measure: LengthMeasure,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            measure: LengthMeasure::default(),
        }
    }
}

impl WindowConfig {
    pub fn new(tolerance: usize, measure: LengthMeasure) -> Self {
        Self { tolerance, measure }
    }

    /// Length of `entry` in this config's measure.
    pub fn target_len(&self, entry: &ReferenceEntry) -> usize {
        match self.measure {
            LengthMeasure::Tokens => entry.token_count(),
            LengthMeasure::Phones => entry.sequence().len(),
        }
    }

    /// Create an iterator over candidate windows of `text` for `entry`.
    ///
    /// Windows start and end on content tokens and have a measured length in
    /// `[target - tolerance, target + tolerance]`. An entry of length 0
    /// yields nothing.
    pub fn windows<'a, 't>(
        &self,
        text: &'a AnnotatedText<'t>,
        entry: &ReferenceEntry,
    ) -> Windows<'a, 't> {
        let target = self.target_len(entry);
        let measure = self.measure;

        let prefix = std::iter::once(0)
            .chain(text.tokens().iter().scan(0, |acc, t| {
                *acc += match measure {
                    LengthMeasure::Tokens => 1,
                    LengthMeasure::Phones => t.sequence.len(),
                };
                Some(*acc)
            }))
            .collect();

        Windows {
            text,
            prefix,
            min_len: target.saturating_sub(self.tolerance),
            max_len: target.saturating_add(self.tolerance),
            empty: target == 0,
            start: 0,
            end: 1,
        }
    }
}

/// Generate candidate windows for one entry.
pub fn generate_windows<'a, 't>(
    text: &'a AnnotatedText<'t>,
    entry: &ReferenceEntry,
    tolerance: usize,
    measure: LengthMeasure,
) -> Windows<'a, 't> {
    WindowConfig::new(tolerance, measure).windows(text, entry)
}

/// Lazy iterator over candidate windows.
///
/// Independent per call; cloning restarts from the current position.
#[derive(Clone, Debug)]
pub struct Windows<'a, 't> {
    text: &'a AnnotatedText<'t>,
    /// prefix[i] = measured length of tokens 0..i
    prefix: Vec<usize>,
    min_len: usize,
    max_len: usize,
    empty: bool,
    start: usize,
    end: usize,
}

impl Windows<'_, '_> {
    fn token_count(&self) -> usize {
        self.prefix.len() - 1
    }

    fn measured(&self, start: usize, end: usize) -> usize {
        self.prefix[end] - self.prefix[start]
    }
}

impl Iterator for Windows<'_, '_> {
    type Item = CandidateWindow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.empty {
            return None;
        }

        let n = self.token_count();

        while self.start < n {
            if self.end > n || self.measured(self.start, self.end) > self.max_len {
                self.start += 1;
                self.end = self.start + 1;
                continue;
            }

            let (start, end) = (self.start, self.end);
            self.end += 1;

            if self.measured(start, end) >= self.min_len {
                let (span, bytes) = self.text.span(start..end);

                return Some(CandidateWindow {
                    span,
                    bytes,
                    tokens: start..end,
                    sequence: self.text.sequence(start..end),
                });
            }
        }

        None
    }
}
