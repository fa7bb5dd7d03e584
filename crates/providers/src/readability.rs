//! Flesch readability formulas.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

use crate::trait_::{ReadabilityScorer, Result};

static WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9]+(?:['’-][A-Za-z0-9]+)*").expect("word pattern is valid")
});

static SENTENCE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("sentence pattern is valid"));

/// Word, sentence and syllable counts of a text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TextStats {
    /// Number of words
    pub words: usize,
    /// Number of sentences (at least 1 when there are words)
    pub sentences: usize,
    /// Number of syllables
    pub syllables: usize,
}

impl TextStats {
    /// Count words, sentences and syllables.
    pub fn of(text: &str) -> Self {
        let mut words = 0;
        let mut syllables = 0;
        for m in WORD.find_iter(text) {
            words += 1;
            syllables += count_syllables(m.as_str());
        }

        if words == 0 {
            return Self::default();
        }

        let sentences = SENTENCE_BREAK
            .split(text)
            .filter(|s| s.chars().any(|c| c.is_alphanumeric()))
            .count()
            .max(1);

        Self {
            words,
            sentences,
            syllables,
        }
    }

    fn words_per_sentence(&self) -> f64 {
        self.words as f64 / self.sentences as f64
    }

    fn syllables_per_word(&self) -> f64 {
        self.syllables as f64 / self.words as f64
    }
}

/// Syllables in one word: vowel groups, minus a silent trailing `e`.
fn count_syllables(word: &str) -> usize {
    let letters: Vec<char> = word
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let mut count = 0;
    let mut prev_vowel = false;
    for &c in &letters {
        let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }

    let silent_e = letters.len() > 2
        && letters.ends_with(&['e'])
        && !letters.ends_with(&['l', 'e'])
        && count > 1;
    if silent_e {
        count -= 1;
    }

    count.max(1)
}

/// Flesch reading ease and Flesch-Kincaid grade level.
///
/// Texts without words score `0.0` on both. Scores are not clamped.
#[derive(Debug, Clone, Copy, Default)]
pub struct FleschScorer;

impl FleschScorer {
    /// Create a scorer.
    pub fn new() -> Self {
        Self
    }
}

impl ReadabilityScorer for FleschScorer {
    fn reading_ease(&self, text: &str) -> Result<f64> {
        let stats = TextStats::of(text);
        if stats.words == 0 {
            return Ok(0.0);
        }
        Ok(206.835 - 1.015 * stats.words_per_sentence() - 84.6 * stats.syllables_per_word())
    }

    fn grade_level(&self, text: &str) -> Result<f64> {
        let stats = TextStats::of(text);
        if stats.words == 0 {
            return Ok(0.0);
        }
        Ok(0.39 * stats.words_per_sentence() + 11.8 * stats.syllables_per_word() - 15.59)
    }
}
