//! Classifier module
//!
//! Decides whether a name segment denotes a company or a person. The rules
//! lean toward `Company`: a person misread as a company keeps its full text,
//! while a company misread as a person gets mangled by name parsing.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::lexicon::{token_key, token_keys, Lexicon};
use crate::segmenter::NameSegment;
use ors_core::{ClassifierConfig, OwnerKind};

/// Parenthetical ownership-share annotations: `(1/2 INT)`, `(UND 50 PCT)`
static SHARE_ANNOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\([^)]*\b(INT|INTEREST|SHARE|SHARES|UND|UNDIVIDED|PCT|PERCENT)\b[^)]*\)")
        .unwrap()
});

/// Evidence that a segment is a company
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanySignal {
    Keyword(String),
    Phrase,
    Digit,
    ShareAnnotation,
}

impl std::fmt::Display for CompanySignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Keyword(k) => write!(f, "keyword {}", k),
            Self::Phrase => write!(f, "company phrase"),
            Self::Digit => write!(f, "digit"),
            Self::ShareAnnotation => write!(f, "share annotation"),
        }
    }
}

/// Company vs person classifier
#[derive(Debug, Clone)]
pub struct Classifier {
    lexicon: Arc<Lexicon>,
    config: ClassifierConfig,
}

impl Classifier {
    pub fn new(lexicon: Arc<Lexicon>, config: ClassifierConfig) -> Self {
        Self { lexicon, config }
    }

    /// Classify a segment
    pub fn classify(&self, segment: &NameSegment) -> OwnerKind {
        self.classify_text(&segment.text)
    }

    /// Classify raw segment text
    pub fn classify_text(&self, text: &str) -> OwnerKind {
        match self.company_signal(text) {
            Some(signal) => {
                tracing::trace!("'{}' classified as company ({})", text, signal);
                OwnerKind::Company
            }
            None => OwnerKind::Person,
        }
    }

    /// First piece of company evidence found in the text
    pub fn company_signal(&self, text: &str) -> Option<CompanySignal> {
        let keys = token_keys(text);

        if let Some(keyword) = keys.iter().find(|k| self.lexicon.is_company_keyword(k)) {
            return Some(CompanySignal::Keyword(keyword.clone()));
        }
        if self.lexicon.contains_company_phrase(&keys) {
            return Some(CompanySignal::Phrase);
        }
        if self.has_digit(text) {
            return Some(CompanySignal::Digit);
        }
        if self.config.share_annotation_as_company
            && (text.contains('%') || SHARE_ANNOTATION.is_match(text))
        {
            return Some(CompanySignal::ShareAnnotation);
        }
        None
    }

    /// Digits outside ordinal suffixes (`2ND`, `3RD`)
    fn has_digit(&self, text: &str) -> bool {
        text.split_whitespace()
            .filter(|w| !self.lexicon.is_suffix(&token_key(w)))
            .any(|w| w.chars().any(|c| c.is_ascii_digit()))
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Arc::new(Lexicon::new()), ClassifierConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords() {
        let classifier = Classifier::default();
        assert_eq!(classifier.classify_text("ABC PROPERTIES LLC"), OwnerKind::Company);
        assert_eq!(classifier.classify_text("Acme Holdings, L.L.C."), OwnerKind::Company);
        assert_eq!(
            classifier.classify_text("FIRST BAPTIST CHURCH"),
            OwnerKind::Company
        );
        assert_eq!(classifier.classify_text("SMITH JOHN R"), OwnerKind::Person);
    }

    #[test]
    fn test_phrases() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.company_signal("UNITED STATES OF AMERICA"),
            Some(CompanySignal::Phrase)
        );
        assert_eq!(
            classifier.classify_text("NAVY FEDERAL CREDIT UNION"),
            OwnerKind::Company
        );
    }

    #[test]
    fn test_digits() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.company_signal("1234 MAIN"),
            Some(CompanySignal::Digit)
        );
        // Ordinal suffixes are name parts
        assert_eq!(classifier.classify_text("SMITH JOHN 3RD"), OwnerKind::Person);
    }

    #[test]
    fn test_share_annotation() {
        let classifier = Classifier::default();
        assert_eq!(
            classifier.company_signal("SMITH JOHN (UND INT)"),
            Some(CompanySignal::ShareAnnotation)
        );
        assert_eq!(classifier.classify_text("DOE JANE %"), OwnerKind::Company);

        let lenient = Classifier::new(
            Arc::new(Lexicon::new()),
            ClassifierConfig {
                share_annotation_as_company: false,
            },
        );
        assert_eq!(lenient.classify_text("SMITH JOHN (UND INT)"), OwnerKind::Person);
    }

    #[test]
    fn test_classify_is_pure() {
        let classifier = Classifier::default();
        let segment = NameSegment::new("SMITH & JONES LLC");
        let first = classifier.classify(&segment);
        for _ in 0..3 {
            assert_eq!(classifier.classify(&segment), first);
        }
    }
}
