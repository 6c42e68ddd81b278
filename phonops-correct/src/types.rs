//! Core types for phonops-correct

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Opaque key-value metadata carried by a lexicon entry.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Mandarin tone class (digits 1-5, 5 is neutral).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Tone {
    First,
    Second,
    Third,
    Fourth,
    Neutral,
}

impl Tone {
    pub const ALL: [Self; 5] = [
        Self::First,
        Self::Second,
        Self::Third,
        Self::Fourth,
        Self::Neutral,
    ];

    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            1 => Some(Self::First),
            2 => Some(Self::Second),
            3 => Some(Self::Third),
            4 => Some(Self::Fourth),
            5 => Some(Self::Neutral),
            _ => None,
        }
    }

    pub fn digit(self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
            Self::Fourth => 4,
            Self::Neutral => 5,
        }
    }
}

impl From<Tone> for u8 {
    fn from(tone: Tone) -> Self {
        tone.digit()
    }
}

impl TryFrom<u8> for Tone {
    type Error = String;

    fn try_from(digit: u8) -> Result<Self, Self::Error> {
        Self::from_digit(digit).ok_or_else(|| format!("invalid tone digit: {digit}"))
    }
}

impl FromStr for Tone {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(Self::from_digit)
            .ok_or_else(|| format!("invalid tone: {s:?}"))
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.digit())
    }
}

/// Lexical stress class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stress {
    Unstressed,
    Primary,
    Secondary,
}

impl Stress {
    /// IPA stress mark preceding a stressed syllable.
    pub fn from_mark(mark: char) -> Option<Self> {
        match mark {
            'ˈ' => Some(Self::Primary),
            'ˌ' => Some(Self::Secondary),
            _ => None,
        }
    }
}

impl FromStr for Stress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "primary" | "ˈ" => Ok(Self::Primary),
            "secondary" | "ˌ" => Ok(Self::Secondary),
            "unstressed" | "none" => Ok(Self::Unstressed),
            other => Err(format!("invalid stress: {other:?}")),
        }
    }
}

impl fmt::Display for Stress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unstressed => "unstressed",
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        };
        f.write_str(name)
    }
}

/// A single phonetic segment.
///
/// `source` is the half-open character range of the text the unit was derived
/// from. Tone and stress are absent rather than defaulted when the language
/// does not mark them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PhoneticUnit {
    /// Symbolic label (usually IPA)
    pub label: String,
    /// Articulatory feature vector, if the phonemizer provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<Tone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stress: Option<Stress>,
    pub source: Range<usize>,
}

impl PhoneticUnit {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            features: None,
            tone: None,
            stress: None,
            source: 0..0,
        }
    }

    pub fn with_features(mut self, features: Vec<f64>) -> Self {
        self.features = Some(features);
        self
    }

    pub fn with_tone(mut self, tone: Tone) -> Self {
        self.tone = Some(tone);
        self
    }

    pub fn with_stress(mut self, stress: Stress) -> Self {
        self.stress = Some(stress);
        self
    }

    pub fn with_source(mut self, source: Range<usize>) -> Self {
        self.source = source;
        self
    }

    pub fn features(&self) -> Option<&[f64]> {
        self.features.as_deref()
    }

    /// Copy of this unit with its source range shifted by `offset` characters.
    pub fn rebased(&self, offset: usize) -> Self {
        Self {
            source: self.source.start + offset..self.source.end + offset,
            ..self.clone()
        }
    }

    /// Copy of this unit with tone and stress removed.
    pub fn without_prosody(&self) -> Self {
        Self {
            tone: None,
            stress: None,
            ..self.clone()
        }
    }
}

/// Ordered phone sequence with tone and stress projections.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneticSequence {
    units: Vec<PhoneticUnit>,
}

impl PhoneticSequence {
    pub fn new(units: Vec<PhoneticUnit>) -> Self {
        Self { units }
    }

    pub fn units(&self) -> &[PhoneticUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Tones of the units that carry one, in order.
    pub fn tones(&self) -> Vec<Tone> {
        self.units.iter().filter_map(|unit| unit.tone).collect()
    }

    /// Stress classes of the units that carry one, in order.
    pub fn stresses(&self) -> Vec<Stress> {
        self.units.iter().filter_map(|unit| unit.stress).collect()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.units.iter().map(|unit| unit.label.as_str())
    }

    /// IPA-like rendering: unit labels separated by spaces.
    pub fn transcription(&self) -> String {
        self.labels().collect::<Vec<_>>().join(" ")
    }

    /// Concatenate sequences in order.
    pub fn concat<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a PhoneticSequence>,
    {
        parts
            .into_iter()
            .flat_map(|seq| seq.units.iter().cloned())
            .collect()
    }
}

impl FromIterator<PhoneticUnit> for PhoneticSequence {
    fn from_iter<T: IntoIterator<Item = PhoneticUnit>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl IntoIterator for PhoneticSequence {
    type Item = PhoneticUnit;
    type IntoIter = std::vec::IntoIter<PhoneticUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.into_iter()
    }
}

/// Half-open character span `[start, end)` in the hypothesis text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// True when both spans share at least one character index.
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Canonical replacement candidate.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReferenceEntry {
    surface: String,
    language: String,
    sequence: PhoneticSequence,
    metadata: Metadata,
    tokens: usize,
}

impl ReferenceEntry {
    pub fn new(
        surface: impl Into<String>,
        language: impl Into<String>,
        sequence: PhoneticSequence,
    ) -> Self {
        let surface = surface.into();
        let tokens = crate::text::tokenize(&surface).len();

        Self {
            surface,
            language: language.into(),
            sequence,
            metadata: Metadata::new(),
            tokens,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn surface(&self) -> &str {
        &self.surface
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn sequence(&self) -> &PhoneticSequence {
        &self.sequence
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Number of content tokens in the surface form.
    pub fn token_count(&self) -> usize {
        self.tokens
    }
}

/// Contiguous span of the hypothesis text evaluated against one entry.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateWindow {
    /// Character span
    pub span: Span,
    /// Byte range of the same span, for slicing
    pub bytes: Range<usize>,
    /// Content token indices covered
    pub tokens: Range<usize>,
    /// Phones of the covered tokens
    pub sequence: PhoneticSequence,
}

/// Per-component distances and their weighted total. Lower is more similar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DistanceBreakdown {
    pub segmental: f64,
    pub tone: f64,
    pub stress: f64,
    pub total: f64,
}

impl fmt::Display for DistanceBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={:.4} segmental={:.4} tone={:.4} stress={:.4}",
            self.total, self.segmental, self.tone, self.stress
        )
    }
}

/// Scored (window, entry) pair that passed the threshold.
#[derive(Clone, Debug)]
pub struct MatchCandidate<'l> {
    pub window: CandidateWindow,
    pub entry: &'l ReferenceEntry,
    /// Position of `entry` in the lexicon
    pub entry_index: usize,
    pub breakdown: DistanceBreakdown,
}

impl MatchCandidate<'_> {
    /// Substitution record for this candidate against `text`.
    pub fn substitution(&self, text: &str) -> Substitution {
        Substitution {
            span: self.window.span,
            original: text[self.window.bytes.clone()].to_owned(),
            replacement: self.entry.surface().to_owned(),
            entry_index: self.entry_index,
            breakdown: self.breakdown,
        }
    }
}

/// One applied replacement.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Substitution {
    pub span: Span,
    pub original: String,
    pub replacement: String,
    pub entry_index: usize,
    pub breakdown: DistanceBreakdown,
}

/// Output of one correction pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CorrectionResult {
    /// Corrected text
    pub text: String,
    /// Applied substitutions in ascending span order
    pub substitutions: Vec<Substitution>,
}

impl CorrectionResult {
    /// Result that leaves `text` unchanged.
    pub fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            substitutions: Vec::new(),
        }
    }

    pub fn is_changed(&self) -> bool {
        !self.substitutions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(label: &str) -> PhoneticUnit {
        PhoneticUnit::new(label)
    }

    #[test]
    fn projections_keep_order_and_skip_missing() {
        let seq = PhoneticSequence::new(vec![
            unit("m").with_stress(Stress::Primary),
            unit("ei").with_tone(Tone::Third),
            unit("k"),
            unit("uo").with_tone(Tone::Second),
            unit("o").with_stress(Stress::Unstressed),
        ]);

        assert_eq!(seq.tones(), vec![Tone::Third, Tone::Second]);
        assert_eq!(seq.stresses(), vec![Stress::Primary, Stress::Unstressed]);
    }

    #[test]
    fn spans_overlap_only_when_sharing_an_index() {
        let a = Span::new(0, 4);

        assert!(a.overlaps(&Span::new(2, 6)));
        assert!(a.overlaps(&Span::new(3, 4)));
        assert!(!a.overlaps(&Span::new(4, 8)));
        assert!(!Span::new(4, 8).overlaps(&a));
    }

    #[test]
    fn tone_parses_digits() {
        assert_eq!("3".parse::<Tone>(), Ok(Tone::Third));
        assert_eq!("5".parse::<Tone>(), Ok(Tone::Neutral));
        assert!("0".parse::<Tone>().is_err());
        assert!("x".parse::<Tone>().is_err());
    }

    #[test]
    fn stress_parses_names_and_marks() {
        assert_eq!("ˈ".parse::<Stress>(), Ok(Stress::Primary));
        assert_eq!("secondary".parse::<Stress>(), Ok(Stress::Secondary));
        assert_eq!("none".parse::<Stress>(), Ok(Stress::Unstressed));
        assert!("loud".parse::<Stress>().is_err());
    }

    #[test]
    fn rebased_shifts_source_range() {
        let shifted = unit("a").with_source(0..2).rebased(5);

        assert_eq!(shifted.source, 5..7);
        assert_eq!(shifted.label, "a");
    }

    #[test]
    fn entry_counts_content_tokens() {
        let entry = ReferenceEntry::new("美国 NBA", "zh", PhoneticSequence::default());

        // 美, 国, NBA
        assert_eq!(entry.token_count(), 3);
    }

    #[test]
    fn transcription_joins_labels() {
        let seq: PhoneticSequence = ["m", "æ", "ŋ"].into_iter().map(unit).collect();

        assert_eq!(seq.transcription(), "m æ ŋ");
    }
}
