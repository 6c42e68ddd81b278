//! Script-aware tokenization and phonetic annotation of text.

use crate::error::PhonemizerError;
use crate::traits::Phonemizer;
use crate::types::{PhoneticSequence, Span};
use std::ops::Range;

/// Language tag passed to the phonemizer for Han characters.
pub const MANDARIN: &str = "zh";

/// Language tag passed to the phonemizer for alphabetic words.
pub const ENGLISH: &str = "en";

/// CJK ideograph blocks (unified, extensions A-E, compatibility).
const CJK_BLOCKS: [(u32, u32); 7] = [
    (0x4E00, 0x9FFF),
    (0x3400, 0x4DBF),
    (0x20000, 0x2A6DF),
    (0x2A700, 0x2B73F),
    (0x2B740, 0x2B81F),
    (0x2B820, 0x2CEAF),
    (0xF900, 0xFAFF),
];

pub fn is_han(ch: char) -> bool {
    let code = ch as u32;
    CJK_BLOCKS
        .iter()
        .any(|&(start, end)| (start..=end).contains(&code))
}

/// Script of a content token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Script {
    /// Logographic: one token per character
    Han,
    /// Alphabetic: one token per word
    Alphabetic,
}

impl Script {
    pub fn language(self) -> &'static str {
        match self {
            Script::Han => MANDARIN,
            Script::Alphabetic => ENGLISH,
        }
    }
}

/// Content token of a text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub script: Script,
    /// Byte range in the source text
    pub bytes: Range<usize>,
    /// Character range in the source text
    pub chars: Range<usize>,
    /// All-uppercase word of two or more letters, spelled letter by letter
    pub acronym: bool,
}

impl Token {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.bytes.clone()]
    }
}

/// Split `text` into content tokens.
///
/// Each Han character is a token, each maximal alphabetic run is a token.
/// Whitespace, digits and punctuation are not tokens.
pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().enumerate().peekable();

    while let Some((char_start, (byte_start, ch))) = chars.next() {
        if is_han(ch) {
            tokens.push(Token {
                script: Script::Han,
                bytes: byte_start..byte_start + ch.len_utf8(),
                chars: char_start..char_start + 1,
                acronym: false,
            });
        } else if ch.is_alphabetic() {
            let mut byte_end = byte_start + ch.len_utf8();
            let mut char_end = char_start + 1;

            while let Some(&(_, (_, next))) = chars.peek()
                && next.is_alphabetic()
                && !is_han(next)
            {
                byte_end += next.len_utf8();
                char_end += 1;
                chars.next();
            }

            let word = &text[byte_start..byte_end];

            tokens.push(Token {
                script: Script::Alphabetic,
                bytes: byte_start..byte_end,
                chars: char_start..char_end,
                acronym: is_acronym(word),
            });
        }
    }

    tokens
}

fn is_acronym(word: &str) -> bool {
    word.chars().count() >= 2 && word.chars().all(char::is_uppercase)
}

/// Content token with its phones.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotatedToken {
    pub token: Token,
    pub sequence: PhoneticSequence,
}

/// Text with per-token phonetic annotation.
#[derive(Clone, Debug)]
pub struct AnnotatedText<'t> {
    text: &'t str,
    tokens: Vec<AnnotatedToken>,
}

impl<'t> AnnotatedText<'t> {
    /// Tokenize `text` and phonemize each content token.
    ///
    /// Acronyms are phonemized letter by letter. With `spelled_prosody` off,
    /// tone and stress are stripped from those letters.
    ///
    /// # Errors
    ///
    /// Returns the first phonemizer failure, or [`PhonemizerError::Malformed`]
    /// when the phonemizer output fails validation.
    pub fn annotate<P>(
        text: &'t str,
        phonemizer: &P,
        spelled_prosody: bool,
    ) -> Result<Self, PhonemizerError>
    where
        P: Phonemizer + ?Sized,
    {
        Self::annotate_as(text, phonemizer, spelled_prosody, None)
    }

    /// Like [`AnnotatedText::annotate`], but every token (and every spelled
    /// letter) is phonemized as `language` when one is given.
    pub fn annotate_as<P>(
        text: &'t str,
        phonemizer: &P,
        spelled_prosody: bool,
        language: Option<&str>,
    ) -> Result<Self, PhonemizerError>
    where
        P: Phonemizer + ?Sized,
    {
        let tokens = tokenize(text)
            .into_iter()
            .map(|token| {
                let sequence = if token.acronym {
                    spell(
                        token.text(text),
                        language.unwrap_or(ENGLISH),
                        token.chars.start,
                        phonemizer,
                        spelled_prosody,
                    )?
                } else {
                    phonemize_at(
                        token.text(text),
                        language.unwrap_or(token.script.language()),
                        token.chars.start,
                        phonemizer,
                    )?
                };
                Ok(AnnotatedToken { token, sequence })
            })
            .collect::<Result<Vec<_>, PhonemizerError>>()?;

        tracing::trace!(tokens = tokens.len(), "annotated text");

        Ok(Self { text, tokens })
    }

    pub fn text(&self) -> &'t str {
        self.text
    }

    pub fn tokens(&self) -> &[AnnotatedToken] {
        &self.tokens
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Character and byte spans covering content tokens `range`.
    ///
    /// `range` must be non-empty and within bounds.
    pub fn span(&self, range: Range<usize>) -> (Span, Range<usize>) {
        let first = &self.tokens[range.start].token;
        let last = &self.tokens[range.end - 1].token;

        (
            Span::new(first.chars.start, last.chars.end),
            first.bytes.start..last.bytes.end,
        )
    }

    /// Phones of content tokens `range`, concatenated.
    pub fn sequence(&self, range: Range<usize>) -> PhoneticSequence {
        PhoneticSequence::concat(self.tokens[range].iter().map(|t| &t.sequence))
    }

    /// Phones of the whole text.
    pub fn full_sequence(&self) -> PhoneticSequence {
        self.sequence(0..self.tokens.len())
    }

    /// Language of the first content token, if any.
    pub fn primary_language(&self) -> Option<&'static str> {
        self.tokens.first().map(|t| t.token.script.language())
    }
}

fn spell<P>(
    word: &str,
    language: &str,
    char_offset: usize,
    phonemizer: &P,
    spelled_prosody: bool,
) -> Result<PhoneticSequence, PhonemizerError>
where
    P: Phonemizer + ?Sized,
{
    let mut units = Vec::new();
    let mut buf = [0u8; 4];

    for (i, letter) in word.chars().enumerate() {
        let letter = letter.encode_utf8(&mut buf);
        let seq = phonemize_at(letter, language, char_offset + i, phonemizer)?;

        units.extend(seq.into_iter().map(|unit| {
            if spelled_prosody {
                unit
            } else {
                unit.without_prosody()
            }
        }));
    }

    Ok(PhoneticSequence::new(units))
}

fn phonemize_at<P>(
    text: &str,
    language: &str,
    char_offset: usize,
    phonemizer: &P,
) -> Result<PhoneticSequence, PhonemizerError>
where
    P: Phonemizer + ?Sized,
{
    let seq = phonemizer.phonemize(text, language)?;
    validate(text, &seq)?;

    Ok(seq.units().iter().map(|u| u.rebased(char_offset)).collect())
}

/// Check phonemizer output for a span of `text`.
pub fn validate(text: &str, seq: &PhoneticSequence) -> Result<(), PhonemizerError> {
    let char_len = text.chars().count();
    let malformed = |reason: String| PhonemizerError::Malformed {
        text: text.to_owned(),
        reason,
    };

    for (i, unit) in seq.units().iter().enumerate() {
        if unit.label.trim().is_empty() {
            return Err(malformed(format!("unit {i} has an empty label")));
        }

        if unit.source.start > unit.source.end || unit.source.end > char_len {
            return Err(malformed(format!(
                "unit {i} source {:?} outside 0..{char_len}",
                unit.source
            )));
        }

        if let Some(features) = unit.features()
            && features.iter().any(|f| !f.is_finite())
        {
            return Err(malformed(format!("unit {i} has a non-finite feature")));
        }
    }

    Ok(())
}
