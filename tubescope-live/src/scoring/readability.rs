//! Flesch-Kincaid readability scoring
//!
//! Grade level: `0.39 * words/sentence + 11.8 * syllables/word - 15.59`
//! Reading ease: `206.835 - 1.015 * words/sentence - 84.6 * syllables/word`

use super::TextScorer;

const CONSONANTS: &str = "bcdfghjklmnpqrstvwxyz";

/// Readability of one text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadabilityScore {
    /// Flesch-Kincaid grade level
    pub grade: f64,
    /// Flesch reading ease
    pub score: f64,
}

/// Scores for a batch of descriptions, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct ReadabilityReport {
    pub items: Vec<ReadabilityScore>,
    /// `None` when the batch was empty
    pub average_grade: Option<f64>,
    pub average_score: Option<f64>,
}

impl ReadabilityReport {
    pub fn from_descriptions(descriptions: &[String]) -> Self {
        let items: Vec<ReadabilityScore> = descriptions.iter().map(|d| score_text(d)).collect();

        if items.is_empty() {
            return Self {
                items,
                average_grade: None,
                average_score: None,
            };
        }

        let n = items.len() as f64;
        let average_grade = items.iter().map(|s| s.grade).sum::<f64>() / n;
        let average_score = items.iter().map(|s| s.score).sum::<f64>() / n;

        Self {
            items,
            average_grade: Some(average_grade),
            average_score: Some(average_score),
        }
    }
}

/// Readability scorer run behind the `description-readability` service
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadabilityScorer;

impl TextScorer for ReadabilityScorer {
    type Output = ReadabilityReport;

    fn name(&self) -> &'static str {
        super::READABILITY_SERVICE
    }

    fn score(&self, descriptions: &[String]) -> ReadabilityReport {
        ReadabilityReport::from_descriptions(descriptions)
    }
}

/// Score one text; empty text scores zero on both scales
pub fn score_text(text: &str) -> ReadabilityScore {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return ReadabilityScore {
            grade: 0.0,
            score: 0.0,
        };
    }

    let total_words = words.len() as f64;
    let total_sentences = count_sentences(text).max(1) as f64;
    let total_syllables: usize = words.iter().map(|w| count_syllables(w)).sum();

    let words_per_sentence = total_words / total_sentences;
    let syllables_per_word = total_syllables as f64 / total_words;

    ReadabilityScore {
        grade: 0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59,
        score: 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word,
    }
}

/// Count sentences split on `.!?;:`, ignoring trailing empty segments
pub fn count_sentences(text: &str) -> usize {
    let segments: Vec<&str> = text.split(&['.', '!', '?', ';', ':'][..]).collect();
    let trailing_empty = segments.iter().rev().take_while(|s| s.is_empty()).count();
    segments.len() - trailing_empty
}

/// Heuristic English syllable count, minimum one
pub fn count_syllables(word: &str) -> usize {
    let lowered = word.trim().to_lowercase();
    let mut chars: Vec<char> = lowered.chars().collect();
    if chars.len() == 1 {
        return 1;
    }

    if chars.last() == Some(&'e') {
        chars.pop();
    }

    let mut count = 0usize;
    let mut in_group = false;
    for &c in &chars {
        if is_vowel(c) {
            if !in_group {
                count += 1;
                in_group = true;
            }
        } else {
            in_group = false;
        }
    }

    let len = chars.len();
    let third_last_is_consonant = len >= 3 && is_consonant(chars[len - 3]);
    let ends_with = |suffix: &str| {
        let suffix: Vec<char> = suffix.chars().collect();
        len >= suffix.len() && chars[len - suffix.len()..] == suffix[..]
    };

    if len > 2 && ends_with("le") && third_last_is_consonant {
        count += 1;
    }
    if ends_with("ed") && count > 1 && third_last_is_consonant {
        count -= 1;
    }
    if ends_with("es") && count > 1 && third_last_is_consonant {
        count -= 1;
    }

    count.max(1)
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// `y` counts as a consonant here even though it is a vowel for grouping
pub fn is_consonant(c: char) -> bool {
    CONSONANTS.contains(c)
}
