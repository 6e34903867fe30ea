//! Segmenter module
//!
//! Splits one raw owner string into ordered candidate name segments.
//! Each line of a multi-line string is segmented on its own. Stages run in
//! a fixed order:
//! - placeholder and care-of rejection
//! - ownership noise stripping, including a trailing `TR` on a person
//! - connector normalization (`&`, `AND`, `AND/OR`, `/`, `+`)
//! - splitting, with single-token pieces merged back into a following company
//! - comma handling (surname separator vs list separator)

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::lexicon::{token_key, Lexicon};
use ors_core::ReasonCode;

// ============================================================================
// Segment types
// ============================================================================

/// Token order of a person name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameOrder {
    FirstLast,
    LastFirst,
}

impl NameOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirstLast => "first_last",
            Self::LastFirst => "last_first",
        }
    }
}

impl std::fmt::Display for NameOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Formatting hints observed on a segment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentHints {
    /// Segment kept a comma
    pub has_comma: bool,
    /// Segment equals its upper-cased form
    pub is_all_caps: bool,
    /// Order implied by a surname comma (`SMITH, JOHN`)
    pub preferred_order: Option<NameOrder>,
    /// Placeholder standing among real owners (`SMITH JOHN & N/A`)
    #[serde(default)]
    pub is_placeholder: bool,
}

/// One candidate name cut from a raw owner string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameSegment {
    pub text: String,
    pub hints: SegmentHints,
}

impl NameSegment {
    /// Build a segment, deriving the case hint from the text
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let hints = SegmentHints {
            has_comma: text.contains(','),
            is_all_caps: text == text.to_uppercase(),
            preferred_order: None,
            is_placeholder: false,
        };
        Self { text, hints }
    }

    /// Segment that names no owner and is reported as a placeholder
    pub fn placeholder(text: impl Into<String>) -> Self {
        let mut segment = Self::new(text);
        segment.hints.is_placeholder = true;
        segment
    }

    pub fn with_order(mut self, order: NameOrder) -> Self {
        self.hints.preferred_order = Some(order);
        self
    }
}

/// Intermediate token after connector normalization
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Connector(String),
}

/// Connector-delimited run of words
#[derive(Debug, Clone, Default)]
struct Piece {
    words: Vec<String>,
    /// Original text of the connector preceding this piece
    connector: Option<String>,
}

impl Piece {
    fn text(&self) -> String {
        self.words.join(" ")
    }
}

// ============================================================================
// Segmenter
// ============================================================================

/// Splits raw owner strings into name segments
#[derive(Debug, Clone)]
pub struct Segmenter {
    lexicon: Arc<Lexicon>,
}

impl Segmenter {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Split a raw owner string into ordered name segments.
    ///
    /// Returns an empty list for blank input, placeholders, care-of lines and
    /// strings consisting only of ownership noise. Line breaks always separate
    /// owners; a placeholder line among other lines, or a placeholder piece
    /// among other owners, comes back as a [`NameSegment::placeholder`].
    pub fn segment(&self, raw: &str) -> Vec<NameSegment> {
        let lines: Vec<&str> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        match lines.as_slice() {
            [] => Vec::new(),
            [line] => self.segment_line(line),
            _ => lines
                .iter()
                .flat_map(|line| match self.placeholder_segment(line) {
                    Some(segment) => vec![segment],
                    None => self.segment_line(line),
                })
                .collect(),
        }
    }

    fn segment_line(&self, raw: &str) -> Vec<NameSegment> {
        let words = split_words(raw);
        if words.is_empty() {
            return Vec::new();
        }
        if self.lexicon.is_placeholder(&words.join(" ")) {
            tracing::trace!("Placeholder owner entry: {}", raw);
            return Vec::new();
        }

        let keys: Vec<String> = words.iter().map(|w| token_key(w)).collect();
        if self.lexicon.care_of_len(&keys).is_some() {
            tracing::trace!("Care-of line skipped: {}", raw);
            return Vec::new();
        }

        let words = self.strip_trustee_abbreviations(self.strip_noise(&words, &keys));
        if words.is_empty() {
            return Vec::new();
        }

        let is_company = self.lexicon.mentions_company(&words.join(" "));
        let tokens = self.normalize_connectors(&words, is_company);
        let pieces = self.merge_company_pieces(split_pieces(tokens));

        pieces
            .iter()
            .flat_map(|piece| self.split_commas(piece))
            .filter(|segment| segment.text.chars().any(char::is_alphanumeric))
            .map(|segment| self.placeholder_segment(&segment.text).unwrap_or(segment))
            .collect()
    }

    fn placeholder_segment(&self, text: &str) -> Option<NameSegment> {
        let has_name = text.chars().any(char::is_alphanumeric);
        (has_name && self.lexicon.is_placeholder(text)).then(|| NameSegment::placeholder(text))
    }

    /// Reason recorded when `segment` yields nothing for this input
    pub fn empty_reason(&self, raw: &str) -> ReasonCode {
        if self.lexicon.is_placeholder(raw) {
            ReasonCode::PlaceholderEntry
        } else {
            ReasonCode::EmptyAfterClean
        }
    }

    /// Remove noise phrases anywhere, preserving list commas they carried
    fn strip_noise(&self, words: &[String], keys: &[String]) -> Vec<String> {
        let mut kept: Vec<String> = Vec::with_capacity(words.len());
        let mut i = 0;

        while i < words.len() {
            let consumed = if keys[i].is_empty() {
                1
            } else {
                self.lexicon.noise_match_len(keys, i).unwrap_or(0)
            };

            if consumed == 0 {
                kept.push(words[i].clone());
                i += 1;
                continue;
            }

            let last = &words[i + consumed - 1];
            if last.ends_with(',') {
                if let Some(prev) = kept.last_mut() {
                    if !prev.ends_with(',') {
                        prev.push(',');
                    }
                }
            }
            i += consumed;
        }

        // A comma left dangling at the end carries no meaning
        if let Some(last) = kept.last_mut() {
            while last.ends_with(',') {
                last.pop();
            }
        }
        kept.retain(|w| !w.is_empty());
        kept
    }

    /// Drop `TR`/`TRS` ending a person-shaped run of words (`DOE JOHN TR`),
    /// carrying its comma back like noise. Runs are delimited by connectors.
    fn strip_trustee_abbreviations(&self, words: Vec<String>) -> Vec<String> {
        let mut kept: Vec<String> = Vec::with_capacity(words.len());
        let mut run_start = 0;

        for (i, word) in words.iter().enumerate() {
            if is_connector(&word.trim_end_matches(',').to_uppercase()) {
                kept.push(word.clone());
                run_start = kept.len();
                continue;
            }

            let ends_run = word.ends_with(',')
                || words
                    .get(i + 1)
                    .map_or(true, |next| is_connector(&next.trim_end_matches(',').to_uppercase()));
            if ends_run
                && self.lexicon.is_trustee_abbreviation(&token_key(word))
                && self.is_person_shaped(&kept[run_start..])
            {
                if word.ends_with(',') {
                    if let Some(prev) = kept.last_mut() {
                        if !prev.ends_with(',') {
                            prev.push(',');
                        }
                    }
                }
                continue;
            }

            kept.push(word.clone());
        }

        kept
    }

    /// At least two words, no digits, no company keyword
    fn is_person_shaped(&self, words: &[String]) -> bool {
        words.len() >= 2
            && !words.iter().any(|w| w.chars().any(|c| c.is_ascii_digit()))
            && !self.lexicon.mentions_company(&words.join(" "))
    }

    fn normalize_connectors(&self, words: &[String], is_company: bool) -> Vec<Token> {
        let mut tokens = Vec::with_capacity(words.len());

        for word in words {
            let bare = word.trim_end_matches(',').to_uppercase();
            if is_connector(&bare) {
                tokens.push(Token::Connector(word.trim_end_matches(',').to_string()));
                continue;
            }
            match split_inline(word).filter(|_| !is_company) {
                Some(parts) => tokens.extend(parts),
                None => tokens.push(Token::Word(word.clone())),
            }
        }

        tokens
    }

    /// Fold single-token pieces into an immediately following company piece,
    /// working from the right so chains (`A & B & C LLC`) collapse fully
    fn merge_company_pieces(&self, pieces: Vec<Piece>) -> Vec<Piece> {
        let mut merged: Vec<Piece> = Vec::with_capacity(pieces.len());

        for piece in pieces.into_iter().rev() {
            let absorb = piece.words.len() == 1
                && merged
                    .last()
                    .map(|next| self.lexicon.mentions_company(&next.text()))
                    .unwrap_or(false);

            match merged.last_mut() {
                Some(next) if absorb => {
                    let mut words = piece.words;
                    if let Some(connector) = next.connector.take() {
                        words.push(connector);
                    }
                    words.append(&mut next.words);
                    next.words = words;
                    next.connector = piece.connector;
                }
                _ => merged.push(piece),
            }
        }

        merged.reverse();
        merged
    }

    /// Interpret commas inside one piece
    fn split_commas(&self, piece: &Piece) -> Vec<NameSegment> {
        let words = &piece.words;
        if self.lexicon.mentions_company(&piece.text()) {
            return vec![NameSegment::new(piece.text())];
        }

        let mut segments = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut order = None;

        for (i, word) in words.iter().enumerate() {
            let has_comma = word.ends_with(',');
            let rest = &words[i + 1..];

            if !has_comma || rest.is_empty() {
                current.push(word.trim_end_matches(',').to_string());
                continue;
            }

            current.push(word.clone());
            if rest.iter().all(|w| self.lexicon.is_suffix(&token_key(w))) {
                continue;
            }

            if order.is_none() && self.is_surname_before_comma(&current) {
                order = Some(NameOrder::LastFirst);
                continue;
            }

            // List separator
            if let Some(last) = current.last_mut() {
                last.truncate(last.trim_end_matches(',').len());
            }
            segments.push(build_segment(&current, order.take()));
            current.clear();
        }

        if !current.is_empty() {
            segments.push(build_segment(&current, order));
        }
        segments
    }

    /// Text before a comma reads as a surname: one token, or a compound
    /// surname led by a particle (`VAN DYKE`, `DE LA CRUZ`), either one
    /// optionally followed by suffixes (`SMITH JR`)
    fn is_surname_before_comma(&self, words: &[String]) -> bool {
        let mut keys: Vec<String> = words
            .iter()
            .map(|w| token_key(w))
            .filter(|k| !k.is_empty())
            .collect();
        while keys.len() > 1 && keys.last().map_or(false, |k| self.lexicon.is_suffix(k)) {
            keys.pop();
        }
        match keys.as_slice() {
            [_] => true,
            [first, ..] if keys.len() <= 4 => self.lexicon.is_surname_particle(first),
            _ => false,
        }
    }
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(Arc::new(Lexicon::new()))
    }
}

fn build_segment(words: &[String], order: Option<NameOrder>) -> NameSegment {
    let segment = NameSegment::new(words.join(" "));
    match order {
        Some(order) => segment.with_order(order),
        None => segment,
    }
}

/// Whitespace-split words with commas attached to the preceding word
fn split_words(raw: &str) -> Vec<String> {
    let spaced = raw.replace(',', ", ");
    let mut words: Vec<String> = Vec::new();

    for word in spaced.split_whitespace() {
        if word.chars().all(|c| c == ',') {
            match words.last_mut() {
                Some(prev) if !prev.ends_with(',') => prev.push(','),
                _ => {}
            }
            continue;
        }
        words.push(word.to_string());
    }

    // "SMITH,, JOHN" keeps a single comma
    for word in &mut words {
        while word.ends_with(",,") {
            word.pop();
        }
    }
    words
}

fn is_connector(upper: &str) -> bool {
    matches!(upper, "&" | "AND" | "AND/OR" | "&/OR" | "/" | "+")
}

/// Split `JOHN&MARY` style words at `&`, `/` or `+` flanked by alphabetic
/// runs of at least two letters on both sides
fn split_inline(word: &str) -> Option<Vec<Token>> {
    let chars: Vec<(usize, char)> = word.char_indices().collect();
    let mut cuts = Vec::new();

    for (pos, &(idx, c)) in chars.iter().enumerate() {
        if !matches!(c, '&' | '/' | '+') {
            continue;
        }
        let before = chars[..pos]
            .iter()
            .rev()
            .take_while(|(_, ch)| ch.is_alphabetic())
            .count();
        let after = chars[pos + 1..]
            .iter()
            .take_while(|(_, ch)| ch.is_alphabetic())
            .count();
        if before >= 2 && after >= 2 {
            cuts.push((idx, c));
        }
    }

    if cuts.is_empty() {
        return None;
    }

    let mut tokens = Vec::with_capacity(cuts.len() * 2 + 1);
    let mut start = 0;
    for (idx, c) in cuts {
        tokens.push(Token::Word(word[start..idx].to_string()));
        tokens.push(Token::Connector(c.to_string()));
        start = idx + c.len_utf8();
    }
    tokens.push(Token::Word(word[start..].to_string()));
    Some(tokens)
}

/// Split the token stream on connectors, dropping empty pieces
fn split_pieces(tokens: Vec<Token>) -> Vec<Piece> {
    let mut pieces = Vec::new();
    let mut current = Piece::default();

    for token in tokens {
        match token {
            Token::Word(word) => current.words.push(word),
            Token::Connector(text) => {
                if current.words.is_empty() {
                    current.connector = current.connector.or(Some(text));
                } else {
                    let finished = std::mem::take(&mut current);
                    pieces.push(finished);
                    current.connector = Some(text);
                }
            }
        }
    }

    if !current.words.is_empty() {
        pieces.push(current);
    }

    // A list comma directly before a connector is redundant
    for piece in &mut pieces {
        if let Some(last) = piece.words.last_mut() {
            while last.ends_with(',') {
                last.pop();
            }
        }
        piece.words.retain(|w| !w.is_empty());
    }
    pieces.retain(|p| !p.words.is_empty());
    pieces
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(segments: &[NameSegment]) -> Vec<&str> {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_simple_connectors() {
        let segmenter = Segmenter::default();

        let segments = segmenter.segment("SMITH JOHN R & JANE M");
        assert_eq!(texts(&segments), vec!["SMITH JOHN R", "JANE M"]);

        let segments = segmenter.segment("SMITH JOHN AND/OR DOE JANE");
        assert_eq!(texts(&segments), vec!["SMITH JOHN", "DOE JANE"]);

        let segments = segmenter.segment("JOHN + MARY SMITH");
        assert_eq!(texts(&segments), vec!["JOHN", "MARY SMITH"]);
    }

    #[test]
    fn test_inline_connectors() {
        let segmenter = Segmenter::default();

        let segments = segmenter.segment("SMITH JOHN&MARY");
        assert_eq!(texts(&segments), vec!["SMITH JOHN", "MARY"]);

        // Single-letter runs are initials, not names
        let segments = segmenter.segment("SMITH J/M");
        assert_eq!(texts(&segments), vec!["SMITH J/M"]);

        // Company mentions never split inline
        let segments = segmenter.segment("AT&T PROPERTIES/HOLDINGS LLC");
        assert_eq!(texts(&segments), vec!["AT&T PROPERTIES/HOLDINGS LLC"]);
    }

    #[test]
    fn test_company_merge() {
        let segmenter = Segmenter::default();

        let segments = segmenter.segment("SMITH & JONES LLC");
        assert_eq!(texts(&segments), vec!["SMITH & JONES LLC"]);

        let segments = segmenter.segment("SMITH AND JONES AND BROWN LLC");
        assert_eq!(texts(&segments), vec!["SMITH AND JONES AND BROWN LLC"]);

        let segments = segmenter.segment("DOE JOHN & ACME HOLDINGS LLC");
        assert_eq!(texts(&segments), vec!["DOE JOHN", "ACME HOLDINGS LLC"]);
    }

    #[test]
    fn test_noise_stripping() {
        let segmenter = Segmenter::default();

        let segments = segmenter.segment("DOE JOHN TRUSTEE");
        assert_eq!(texts(&segments), vec!["DOE JOHN"]);

        let segments = segmenter.segment("SMITH JOHN ET. AL.");
        assert_eq!(texts(&segments), vec!["SMITH JOHN"]);

        let segments = segmenter.segment("SMITH JOHN & MARY JTWROS");
        assert_eq!(texts(&segments), vec!["SMITH JOHN", "MARY"]);

        let segments = segmenter.segment("SMITH JOHN H/W");
        assert_eq!(texts(&segments), vec!["SMITH JOHN"]);

        let segments = segmenter.segment("JONES ROBERT HUSBAND AND WIFE");
        assert_eq!(texts(&segments), vec!["JONES ROBERT"]);

        assert!(segmenter.segment("ET AL").is_empty());
    }

    #[test]
    fn test_noise_keeps_list_comma() {
        let segmenter = Segmenter::default();
        let segments = segmenter.segment("SMITH JOHN TRUSTEE, DOE JANE");
        assert_eq!(texts(&segments), vec!["SMITH JOHN", "DOE JANE"]);
    }

    #[test]
    fn test_surname_comma() {
        let segmenter = Segmenter::default();

        let segments = segmenter.segment("SMITH, JOHN & MARY");
        assert_eq!(texts(&segments), vec!["SMITH, JOHN", "MARY"]);
        assert_eq!(
            segments[0].hints.preferred_order,
            Some(NameOrder::LastFirst)
        );
        assert!(segments[0].hints.has_comma);
        assert_eq!(segments[1].hints.preferred_order, None);

        let segments = segmenter.segment("VAN DYKE, JOHN");
        assert_eq!(texts(&segments), vec!["VAN DYKE, JOHN"]);
        assert_eq!(
            segments[0].hints.preferred_order,
            Some(NameOrder::LastFirst)
        );

        let segments = segmenter.segment("SMITH,JOHN");
        assert_eq!(texts(&segments), vec!["SMITH, JOHN"]);
    }

    #[test]
    fn test_list_comma() {
        let segmenter = Segmenter::default();

        let segments = segmenter.segment("SMITH JOHN, DOE JANE");
        assert_eq!(texts(&segments), vec!["SMITH JOHN", "DOE JANE"]);
        assert!(segments.iter().all(|s| s.hints.preferred_order.is_none()));

        let segments = segmenter.segment("SMITH, JOHN, DOE, JANE");
        assert_eq!(texts(&segments), vec!["SMITH, JOHN", "DOE, JANE"]);
    }

    #[test]
    fn test_suffix_comma_not_split() {
        let segmenter = Segmenter::default();
        let segments = segmenter.segment("JOHN SMITH, JR");
        assert_eq!(texts(&segments), vec!["JOHN SMITH, JR"]);
        assert_eq!(segments[0].hints.preferred_order, None);
    }

    #[test]
    fn test_company_commas_kept() {
        let segmenter = Segmenter::default();
        let segments = segmenter.segment("ABC HOLDINGS, LLC");
        assert_eq!(texts(&segments), vec!["ABC HOLDINGS, LLC"]);
    }

    #[test]
    fn test_empty_outcomes() {
        let segmenter = Segmenter::default();

        assert!(segmenter.segment("").is_empty());
        assert!(segmenter.segment("   ").is_empty());
        assert!(segmenter.segment("*** MULTIPLE OWNERS ***").is_empty());
        assert!(segmenter.segment("N/A").is_empty());
        assert!(segmenter.segment("C/O FIRST NATIONAL BANK").is_empty());

        assert_eq!(
            segmenter.empty_reason("*** MULTIPLE OWNERS ***"),
            ReasonCode::PlaceholderEntry
        );
        assert_eq!(
            segmenter.empty_reason("C/O JOHN SMITH"),
            ReasonCode::EmptyAfterClean
        );
        assert_eq!(
            segmenter.empty_reason("TRUSTEE ET AL"),
            ReasonCode::EmptyAfterClean
        );
    }

    #[test]
    fn test_hints() {
        let segmenter = Segmenter::default();
        let segments = segmenter.segment("John Smith & MARY JONES");
        assert!(!segments[0].hints.is_all_caps);
        assert!(segments[1].hints.is_all_caps);
    }

    #[test]
    fn test_whitespace_collapse() {
        let segmenter = Segmenter::default();
        let segments = segmenter.segment("  SMITH    JOHN \t &   MARY ");
        assert_eq!(texts(&segments), vec!["SMITH JOHN", "MARY"]);

        let segments = segmenter.segment("\n  \n SMITH JOHN \n");
        assert_eq!(texts(&segments), vec!["SMITH JOHN"]);
    }

    #[test]
    fn test_line_breaks_separate_owners() {
        let segmenter = Segmenter::default();

        let segments = segmenter.segment("SMITH JOHN\nDOE JANE");
        assert_eq!(texts(&segments), vec!["SMITH JOHN", "DOE JANE"]);

        let segments = segmenter.segment("SMITH JOHN &\r\nMARY");
        assert_eq!(texts(&segments), vec!["SMITH JOHN", "MARY"]);

        let segments = segmenter.segment("SMITH JOHN\nN/A\n----");
        assert_eq!(texts(&segments), vec!["SMITH JOHN", "N/A"]);
        assert!(!segments[0].hints.is_placeholder);
        assert!(segments[1].hints.is_placeholder);
    }

    #[test]
    fn test_placeholder_piece() {
        let segmenter = Segmenter::default();

        let segments = segmenter.segment("SMITH JOHN & N/A");
        assert_eq!(texts(&segments), vec!["SMITH JOHN", "N/A"]);
        assert!(segments[1].hints.is_placeholder);

        let segments = segmenter.segment("SMITH JOHN, UNKNOWN");
        assert_eq!(texts(&segments), vec!["SMITH JOHN", "UNKNOWN"]);
        assert!(segments[1].hints.is_placeholder);
    }

    #[test]
    fn test_suffix_before_surname_comma() {
        let segmenter = Segmenter::default();

        let segments = segmenter.segment("SMITH JR, JOHN");
        assert_eq!(texts(&segments), vec!["SMITH JR, JOHN"]);
        assert_eq!(
            segments[0].hints.preferred_order,
            Some(NameOrder::LastFirst)
        );

        let segments = segmenter.segment("VAN DYKE III, PETER & MARY");
        assert_eq!(texts(&segments), vec!["VAN DYKE III, PETER", "MARY"]);
    }

    #[test]
    fn test_trailing_trustee_abbreviation() {
        let segmenter = Segmenter::default();

        let segments = segmenter.segment("DOE JOHN TR");
        assert_eq!(texts(&segments), vec!["DOE JOHN"]);

        let segments = segmenter.segment("DOE JOHN TR & JANE");
        assert_eq!(texts(&segments), vec!["DOE JOHN", "JANE"]);

        let segments = segmenter.segment("DOE JOHN TR, SMITH MARY");
        assert_eq!(texts(&segments), vec!["DOE JOHN", "SMITH MARY"]);

        // Still a trust when the name is not person-shaped
        let segments = segmenter.segment("ACME HOLDINGS TR");
        assert_eq!(texts(&segments), vec!["ACME HOLDINGS TR"]);
        let segments = segmenter.segment("SMITH TR");
        assert_eq!(texts(&segments), vec!["SMITH TR"]);
    }

    #[test]
    fn test_dangling_connectors() {
        let segmenter = Segmenter::default();
        let segments = segmenter.segment("& SMITH JOHN &");
        assert_eq!(texts(&segments), vec!["SMITH JOHN"]);
    }
}
