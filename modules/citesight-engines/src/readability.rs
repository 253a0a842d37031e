//! Flesch reading ease over extracted body text.
//!
//! 206.835 - 1.015*(words/sentences) - 84.6*(syllables/words), clamped to
//! 0-100. Higher is easier. Texts under the readable-word floor score 0:
//! a 20-word page tells us nothing about prose legibility.

use crate::tuning::MIN_READABLE_WORDS;

pub fn reading_ease(text: &str) -> f64 {
    let words: Vec<&str> = text
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| !w.is_empty())
        .collect();

    if words.len() < MIN_READABLE_WORDS {
        return 0.0;
    }

    let sentences = sentence_count(text).max(1) as f64;
    let word_count = words.len() as f64;
    let syllables: usize = words.iter().map(|w| syllable_count(w)).sum();

    let score = 206.835 - 1.015 * (word_count / sentences) - 84.6 * (syllables as f64 / word_count);
    score.clamp(0.0, 100.0)
}

fn sentence_count(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|s| s.chars().any(|c| c.is_alphanumeric()))
        .count()
}

/// Vowel-group heuristic with a silent-e adjustment. Every word counts at
/// least one syllable.
fn syllable_count(word: &str) -> usize {
    let lower = word.to_lowercase();
    let mut count = 0;
    let mut prev_vowel = false;
    for c in lower.chars() {
        let vowel = matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }
    if lower.ends_with('e') && !lower.ends_with("le") && count > 1 {
        count -= 1;
    }
    count.max(1)
}
