//! Person name parsing
//!
//! Turns a person segment into `prefix / first / middle / last / suffix`.
//! Token order (given-name-first vs surname-first) is inferred by scoring
//! both candidate assignments over a small feature struct, so every weight is
//! visible and configurable in [`ScoringWeights`].

use std::sync::Arc;

use crate::lexicon::{title_case, Lexicon};
use crate::segmenter::{NameOrder, NameSegment};
use ors_core::{Person, ReasonCode, ScoringConfig, ScoringWeights};

// ============================================================================
// Scoring
// ============================================================================

/// Observable properties of one candidate assignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CandidateFeatures {
    pub nontrivial_first: bool,
    pub nontrivial_last: bool,
    pub carried_surname_match: bool,
    pub order_hint_agrees: bool,
    pub common_first_name: bool,
    pub single_letter_first: bool,
    pub single_letter_last: bool,
    pub affix_in_name_field: bool,
}

impl CandidateFeatures {
    /// Weighted sum of the active features
    pub fn score(&self, weights: &ScoringWeights) -> f32 {
        [
            (self.nontrivial_first, weights.nontrivial_first),
            (self.nontrivial_last, weights.nontrivial_last),
            (self.carried_surname_match, weights.carried_surname_match),
            (self.order_hint_agrees, weights.order_hint_agrees),
            (self.common_first_name, weights.common_first_name),
            (self.single_letter_first, weights.single_letter_first),
            (self.single_letter_last, weights.single_letter_last),
            (self.affix_in_name_field, weights.affix_in_name_field),
        ]
        .iter()
        .filter(|(active, _)| *active)
        .map(|(_, weight)| weight)
        .sum()
    }
}

/// One way of assigning name tokens to fields
#[derive(Debug, Clone, PartialEq)]
pub struct NameCandidate {
    pub order: NameOrder,
    pub first: String,
    pub middle: Vec<String>,
    pub last: Vec<String>,
    pub features: CandidateFeatures,
    pub score: f32,
}

/// Segment tokens with affixes split off
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct NameTokens {
    prefix: Option<String>,
    suffix: Option<String>,
    tokens: Vec<String>,
    /// Number of tokens before a surname comma, if any
    comma_at: Option<usize>,
}

// ============================================================================
// Parser
// ============================================================================

/// Rule-and-score person name parser
#[derive(Debug, Clone)]
pub struct PersonNameParser {
    lexicon: Arc<Lexicon>,
    scoring: ScoringConfig,
}

impl PersonNameParser {
    pub fn new(lexicon: Arc<Lexicon>, scoring: ScoringConfig) -> Self {
        Self { lexicon, scoring }
    }

    /// Parse a person segment, optionally inheriting a carried surname
    pub fn parse_person(
        &self,
        segment: &NameSegment,
        carried_surname: Option<&str>,
    ) -> std::result::Result<Person, ReasonCode> {
        let parts = self.split_affixes(segment);

        let person = match parts.tokens.as_slice() {
            [] => return Err(ReasonCode::EmptyAfterAffixRemoval),
            [only] => match carried_surname {
                Some(surname) => Person::new(title_case(only), surname),
                None => return Err(ReasonCode::SingleTokenNoFallback),
            },
            _ => {
                let best = self
                    .best_candidate(&parts, segment.hints.preferred_order, carried_surname)
                    .ok_or(ReasonCode::UnableToClassifyPerson)?;
                self.build_person(best, carried_surname)
            }
        };

        let person = match parts.prefix {
            Some(prefix) => person.with_prefix(prefix),
            None => person,
        };
        Ok(match parts.suffix {
            Some(suffix) => person.with_suffix(suffix),
            None => person,
        })
    }

    /// Both candidate orders for a segment, scored, in
    /// `[FirstLast, LastFirst]` order. Empty when fewer than two name tokens
    /// remain after affix removal.
    pub fn candidates(
        &self,
        segment: &NameSegment,
        carried_surname: Option<&str>,
    ) -> Vec<NameCandidate> {
        let parts = self.split_affixes(segment);
        if parts.tokens.len() < 2 {
            return Vec::new();
        }
        [NameOrder::FirstLast, NameOrder::LastFirst]
            .into_iter()
            .map(|order| {
                self.candidate(&parts, order, segment.hints.preferred_order, carried_surname)
            })
            .collect()
    }

    fn best_candidate(
        &self,
        parts: &NameTokens,
        hint: Option<NameOrder>,
        carried_surname: Option<&str>,
    ) -> Option<NameCandidate> {
        let first_last = self.candidate(parts, NameOrder::FirstLast, hint, carried_surname);
        let last_first = self.candidate(parts, NameOrder::LastFirst, hint, carried_surname);

        // Ties favor surname-first, the dominant convention in assessor rolls
        let best = if last_first.score >= first_last.score {
            last_first
        } else {
            first_last
        };

        if best.score < self.scoring.min_accept_score {
            tracing::trace!(
                "Best candidate {:?} scored {} below threshold",
                best.order,
                best.score
            );
            return None;
        }
        Some(best)
    }

    fn candidate(
        &self,
        parts: &NameTokens,
        order: NameOrder,
        hint: Option<NameOrder>,
        carried_surname: Option<&str>,
    ) -> NameCandidate {
        let tokens = &parts.tokens;
        let n = tokens.len();

        let (first, middle, last) = match order {
            NameOrder::FirstLast => {
                let split = self.surname_start_from_end(tokens);
                (
                    tokens[0].clone(),
                    tokens[1..split].to_vec(),
                    tokens[split..].to_vec(),
                )
            }
            NameOrder::LastFirst => {
                let len = parts
                    .comma_at
                    .filter(|&k| k >= 1 && k < n)
                    .unwrap_or_else(|| self.surname_len_from_start(tokens));
                (
                    tokens[len].clone(),
                    tokens[len + 1..].to_vec(),
                    tokens[..len].to_vec(),
                )
            }
        };

        let first_key = first.to_uppercase();
        let last_key = last.join(" ").to_uppercase();
        let first_len = first.chars().count();
        let last_len = last_key.chars().count();

        let features = CandidateFeatures {
            nontrivial_first: first_len > 1,
            nontrivial_last: last_len > 1,
            carried_surname_match: carried_surname
                .map(|s| s.to_uppercase() == last_key)
                .unwrap_or(false),
            order_hint_agrees: hint == Some(order),
            common_first_name: self.lexicon.is_common_first_name(&first_key),
            single_letter_first: first_len == 1,
            single_letter_last: last_len == 1,
            affix_in_name_field: self.lexicon.is_affix(&first_key)
                || last.iter().any(|t| self.lexicon.is_affix(&t.to_uppercase())),
        };
        let score = features.score(&self.scoring.weights);

        NameCandidate {
            order,
            first,
            middle,
            last,
            features,
            score,
        }
    }

    /// Index where the surname begins when it comes last.
    ///
    /// Particles bind to the following token (`JOHN VAN DYKE`), but never
    /// swallow the given name.
    fn surname_start_from_end(&self, tokens: &[String]) -> usize {
        let mut start = tokens.len() - 1;
        while start > 1 && self.lexicon.is_surname_particle(&tokens[start - 1].to_uppercase()) {
            start -= 1;
        }
        start
    }

    /// Number of tokens forming a leading surname (`DE LA CRUZ MARIA`)
    fn surname_len_from_start(&self, tokens: &[String]) -> usize {
        let mut len = 1;
        while len < tokens.len() - 1
            && self.lexicon.is_surname_particle(&tokens[len - 1].to_uppercase())
        {
            len += 1;
        }
        len
    }

    fn build_person(&self, candidate: NameCandidate, carried_surname: Option<&str>) -> Person {
        let mut middle: Vec<String> = candidate.middle.iter().map(|t| title_case(t)).collect();
        let mut last = title_case(&candidate.last.join(" "));

        if candidate.features.single_letter_last {
            if let Some(surname) = carried_surname {
                middle.push(last);
                last = surname.to_string();
            }
        }

        let person = Person::new(title_case(&candidate.first), last);
        if middle.is_empty() {
            person
        } else {
            person.with_middle(middle.join(" "))
        }
    }

    /// Tokenize and split off the honorific prefix and generational suffix
    fn split_affixes(&self, segment: &NameSegment) -> NameTokens {
        let mut comma_at = None;
        let mut tokens: Vec<String> = Vec::new();

        for word in segment.text.split_whitespace() {
            let token = clean_token(word);
            if token.is_empty() || self.lexicon.is_noise(&token.to_uppercase()) {
                continue;
            }
            tokens.push(token);
            if comma_at.is_none() && word.ends_with(',') {
                comma_at = Some(tokens.len());
            }
        }

        let mut prefix = None;
        while let Some(display) = tokens
            .first()
            .and_then(|t| self.lexicon.prefix_display(&t.to_uppercase()))
        {
            prefix.get_or_insert_with(|| display.to_string());
            tokens.remove(0);
            comma_at = comma_at.and_then(|k| k.checked_sub(1));
        }

        let mut suffix = None;
        while let Some(display) = tokens
            .last()
            .and_then(|t| self.lexicon.suffix_display(&t.to_uppercase()))
        {
            // The suffix nearest the name wins
            suffix = Some(display);
            tokens.pop();
        }

        if suffix.is_none() && tokens.len() >= 3 {
            let interior = (1..tokens.len() - 1)
                .find(|&i| self.lexicon.is_suffix(&tokens[i].to_uppercase()));
            if let Some(i) = interior {
                suffix = self.lexicon.suffix_display(&tokens.remove(i).to_uppercase());
                comma_at = comma_at.map(|k| if k > i { k - 1 } else { k });
            }
        }

        NameTokens {
            prefix,
            suffix,
            comma_at: comma_at.filter(|&k| k >= 1 && k < tokens.len()),
            tokens,
        }
    }
}

impl Default for PersonNameParser {
    fn default() -> Self {
        Self::new(Arc::new(Lexicon::new()), ScoringConfig::default())
    }
}

/// Keep letters, digits, hyphens and apostrophes
fn clean_token(word: &str) -> String {
    let kept: String = word
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '\''))
        .collect();
    kept.trim_matches(|c| c == '-' || c == '\'').to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str, carried: Option<&str>) -> std::result::Result<Person, ReasonCode> {
        PersonNameParser::default().parse_person(&NameSegment::new(text), carried)
    }

    #[test]
    fn test_prefix_and_suffix() {
        let person = parse("DR JOHN SMITH JR", None).unwrap();
        assert_eq!(person.prefix_name.as_deref(), Some("Dr"));
        assert_eq!(person.first_name, "John");
        assert_eq!(person.last_name, "Smith");
        assert_eq!(person.suffix_name.as_deref(), Some("Jr"));
        assert_eq!(person.middle_name, None);
    }

    #[test]
    fn test_surname_first() {
        let person = parse("SMITH JOHN R", None).unwrap();
        assert_eq!(person.first_name, "John");
        assert_eq!(person.middle_name.as_deref(), Some("R"));
        assert_eq!(person.last_name, "Smith");
    }

    #[test]
    fn test_given_name_first() {
        let person = parse("JOHN R SMITH", None).unwrap();
        assert_eq!(person.first_name, "John");
        assert_eq!(person.middle_name.as_deref(), Some("R"));
        assert_eq!(person.last_name, "Smith");

        let person = parse("JOHN SMITH", None).unwrap();
        assert_eq!(person.first_name, "John");
        assert_eq!(person.last_name, "Smith");
    }

    #[test]
    fn test_tie_favors_surname_first() {
        // Neither token is a common given name
        let person = parse("KOWALCZYK ZBIGNIEW", None).unwrap();
        assert_eq!(person.last_name, "Kowalczyk");
        assert_eq!(person.first_name, "Zbigniew");
    }

    #[test]
    fn test_comma_hint() {
        let segment = NameSegment::new("SMITH, JOHN").with_order(NameOrder::LastFirst);
        let person = PersonNameParser::default()
            .parse_person(&segment, None)
            .unwrap();
        assert_eq!(person.first_name, "John");
        assert_eq!(person.last_name, "Smith");
    }

    #[test]
    fn test_compound_surnames() {
        let segment = NameSegment::new("VAN DYKE, JOHN").with_order(NameOrder::LastFirst);
        let person = PersonNameParser::default()
            .parse_person(&segment, None)
            .unwrap();
        assert_eq!(person.first_name, "John");
        assert_eq!(person.last_name, "Van Dyke");

        let person = parse("JOHN VAN DYKE", None).unwrap();
        assert_eq!(person.first_name, "John");
        assert_eq!(person.last_name, "Van Dyke");
    }

    #[test]
    fn test_single_token_inherits() {
        let person = parse("MARY", Some("Smith")).unwrap();
        assert_eq!(person.first_name, "Mary");
        assert_eq!(person.last_name, "Smith");

        assert_eq!(parse("MARY", None), Err(ReasonCode::SingleTokenNoFallback));
    }

    #[test]
    fn test_initial_surname_folds_into_middle() {
        let person = parse("JANE M", Some("Smith")).unwrap();
        assert_eq!(person.first_name, "Jane");
        assert_eq!(person.middle_name.as_deref(), Some("M"));
        assert_eq!(person.last_name, "Smith");
    }

    #[test]
    fn test_rejections() {
        assert_eq!(parse("MR JR", None), Err(ReasonCode::EmptyAfterAffixRemoval));
        assert_eq!(parse("J R", None), Err(ReasonCode::UnableToClassifyPerson));
        assert_eq!(parse("...", None), Err(ReasonCode::EmptyAfterAffixRemoval));
    }

    #[test]
    fn test_suffix_nearest_name_kept() {
        let person = parse("JOHN SMITH JR MD", None).unwrap();
        assert_eq!(person.suffix_name.as_deref(), Some("Jr"));
        assert_eq!(person.last_name, "Smith");

        let person = parse("SMITH JOHN III", None).unwrap();
        assert_eq!(person.suffix_name.as_deref(), Some("III"));
    }

    #[test]
    fn test_interior_suffix() {
        let person = parse("SMITH JR JOHN", None).unwrap();
        assert_eq!(person.suffix_name.as_deref(), Some("Jr"));
        assert_eq!(person.first_name, "John");
        assert_eq!(person.last_name, "Smith");
    }

    #[test]
    fn test_title_case_punctuation() {
        let person = parse("O'BRIEN MARY-KATE", None).unwrap();
        assert_eq!(person.first_name, "Mary-Kate");
        assert_eq!(person.last_name, "O'Brien");
    }

    #[test]
    fn test_candidate_scores() {
        let parser = PersonNameParser::default();
        let candidates = parser.candidates(&NameSegment::new("SMITH JOHN"), Some("Smith"));
        assert_eq!(candidates.len(), 2);

        let first_last = &candidates[0];
        let last_first = &candidates[1];
        assert_eq!(first_last.order, NameOrder::FirstLast);
        assert_eq!(first_last.score, 4.0);
        // 2 + 2 + 1.5 carried + 1 common
        assert_eq!(last_first.score, 6.5);
    }

    #[test]
    fn test_features_score() {
        let weights = ScoringWeights::default();
        let features = CandidateFeatures {
            nontrivial_first: true,
            single_letter_last: true,
            affix_in_name_field: true,
            ..Default::default()
        };
        assert_eq!(features.score(&weights), 2.0 - 1.0 - 10.0);
        assert_eq!(CandidateFeatures::default().score(&weights), 0.0);
    }

    #[test]
    fn test_affix_in_name_field_penalized() {
        let parser = PersonNameParser::default();
        let segment = NameSegment::new("MARY SMITH DR");

        let candidates = parser.candidates(&segment, None);
        let (first_last, last_first) = (&candidates[0], &candidates[1]);
        assert_eq!(first_last.last, vec!["DR".to_string()]);
        assert!(first_last.features.affix_in_name_field);
        assert!(!last_first.features.affix_in_name_field);
        // 2 + 2 + 1 common - 10 affix
        assert_eq!(first_last.score, -5.0);
        assert_eq!(last_first.score, 4.0);

        let person = parser.parse_person(&segment, None).unwrap();
        assert_eq!(person.last_name, "Mary");
        assert_eq!(person.middle_name.as_deref(), Some("Dr"));

        // Both orders put the honorific in a name field
        assert_eq!(
            parser.parse_person(&NameSegment::new("JOHN MR"), None),
            Err(ReasonCode::UnableToClassifyPerson)
        );

        // Without the penalty the given-name-first reading wins
        let scoring = ScoringConfig {
            weights: ScoringWeights {
                affix_in_name_field: 0.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let lenient = PersonNameParser::new(Arc::new(Lexicon::new()), scoring);
        let person = lenient.parse_person(&segment, None).unwrap();
        assert_eq!(person.first_name, "Mary");
        assert_eq!(person.last_name, "Dr");
        assert!(lenient.parse_person(&NameSegment::new("JOHN MR"), None).is_ok());
    }

    #[test]
    fn test_suffix_before_surname_comma() {
        let segment = NameSegment::new("SMITH JR, JOHN").with_order(NameOrder::LastFirst);
        let person = PersonNameParser::default()
            .parse_person(&segment, None)
            .unwrap();
        assert_eq!(person.first_name, "John");
        assert_eq!(person.last_name, "Smith");
        assert_eq!(person.suffix_name.as_deref(), Some("Jr"));
    }

    #[test]
    fn test_parse_is_pure() {
        let parser = PersonNameParser::default();
        let segment = NameSegment::new("SMITH JOHN R");
        let first = parser.parse_person(&segment, Some("Doe"));
        assert_eq!(parser.parse_person(&segment, Some("Doe")), first);
    }
}
