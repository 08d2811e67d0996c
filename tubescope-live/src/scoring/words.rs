//! Word frequency statistics over description text
//!
//! Text is lower-cased and every non-letter is a separator, the same
//! normalisation the sentiment scorer uses.

use std::collections::HashMap;
use tubescope_common::WordCount;

/// Count every word across `texts`, most frequent first, ties alphabetical
pub fn word_frequencies<S: AsRef<str>>(texts: &[S]) -> Vec<WordCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for text in texts {
        let normalized: String = text
            .as_ref()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphabetic() { c } else { ' ' })
            .collect();
        for word in normalized.split_whitespace() {
            *counts.entry(word.to_string()).or_default() += 1;
        }
    }

    let mut words: Vec<WordCount> = counts
        .into_iter()
        .map(|(word, count)| WordCount { word, count })
        .collect();
    words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
    words
}
