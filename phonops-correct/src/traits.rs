//! Collaborator traits consumed by the correction core.

use crate::error::PhonemizerError;
use crate::types::PhoneticSequence;
use std::rc::Rc;
use std::sync::Arc;

/// Grapheme-to-phone conversion service.
///
/// Implementations must be deterministic for identical input, return an
/// empty sequence for an empty string, and leave `tone`/`stress` unset where
/// the language does not mark them. Unit `source` ranges are character
/// offsets relative to `text`.
///
/// Calls may be slow or cached; the core never assumes either.
pub trait Phonemizer {
    /// Convert `text` in `language` (a tag such as `"zh"` or `"en"`) to phones.
    fn phonemize(&self, text: &str, language: &str) -> Result<PhoneticSequence, PhonemizerError>;
}

impl<P: Phonemizer + ?Sized> Phonemizer for &P {
    fn phonemize(&self, text: &str, language: &str) -> Result<PhoneticSequence, PhonemizerError> {
        (**self).phonemize(text, language)
    }
}

impl<P: Phonemizer + ?Sized> Phonemizer for Box<P> {
    fn phonemize(&self, text: &str, language: &str) -> Result<PhoneticSequence, PhonemizerError> {
        (**self).phonemize(text, language)
    }
}

impl<P: Phonemizer + ?Sized> Phonemizer for Rc<P> {
    fn phonemize(&self, text: &str, language: &str) -> Result<PhoneticSequence, PhonemizerError> {
        (**self).phonemize(text, language)
    }
}

impl<P: Phonemizer + ?Sized> Phonemizer for Arc<P> {
    fn phonemize(&self, text: &str, language: &str) -> Result<PhoneticSequence, PhonemizerError> {
        (**self).phonemize(text, language)
    }
}
