//! Company name normalization

use std::sync::Arc;

use crate::lexicon::{token_key, Lexicon, WordCase};
use crate::segmenter::NameSegment;
use ors_core::Company;

/// Punctuation that never belongs at either end of a company name
const STRAY_PUNCTUATION: &[char] = &[',', ';', ':', '-', '&', '/', '+', '*', '#'];

/// Produces the canonical display name of a company segment
#[derive(Debug, Clone)]
pub struct CompanyNameNormalizer {
    lexicon: Arc<Lexicon>,
}

impl CompanyNameNormalizer {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Normalize a company segment. Never rejects.
    pub fn normalize_company(&self, segment: &NameSegment) -> Company {
        Company::new(self.normalize_text(&segment.text))
    }

    /// Normalize raw company text
    pub fn normalize_text(&self, text: &str) -> String {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let trimmed = collapsed
            .trim_start_matches(|c: char| {
                STRAY_PUNCTUATION.contains(&c) || c == '.' || c.is_whitespace()
            })
            .trim_end_matches(|c: char| STRAY_PUNCTUATION.contains(&c) || c.is_whitespace());

        if trimmed.is_empty() {
            return collapsed;
        }

        let has_letters = trimmed.chars().any(char::is_alphabetic);
        if has_letters && trimmed == trimmed.to_uppercase() {
            self.recase(trimmed)
        } else {
            trimmed.to_string()
        }
    }

    fn recase(&self, text: &str) -> String {
        text.split(' ')
            .enumerate()
            .map(|(i, word)| match self.lexicon.company_word_case(&token_key(word), i == 0) {
                WordCase::Upper => word.to_string(),
                WordCase::Joiner(_) => word.to_lowercase(),
                WordCase::Display(display) => apply_display(word, &display),
                WordCase::Title => title_word(word),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for CompanyNameNormalizer {
    fn default() -> Self {
        Self::new(Arc::new(Lexicon::new()))
    }
}

/// Copy the letter casing of `display` onto the letters of `word`, leaving
/// punctuation in place (`INC.` with `Inc` → `Inc.`)
fn apply_display(word: &str, display: &str) -> String {
    let mut letters = display.chars().filter(|c| c.is_alphanumeric());
    word.chars()
        .map(|c| {
            if c.is_alphanumeric() {
                letters.next().unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Title-case one word.
///
/// Capitalizes a leading letter and letters after `-`, `/` or `&`; after an
/// apostrophe only when at least two letters follow (`O'REILLY` vs `JOE'S`).
fn title_word(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    let mut out = String::with_capacity(word.len());

    for (i, &c) in chars.iter().enumerate() {
        let capitalize = match i.checked_sub(1).map(|p| chars[p]) {
            None => true,
            Some('-') | Some('/') | Some('&') => true,
            Some('\'') => chars[i..].iter().take_while(|c| c.is_alphabetic()).count() >= 2,
            Some(_) => false,
        };
        if capitalize {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
    }
    out
}
