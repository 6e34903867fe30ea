//! Lexicon module
//!
//! Static reference tables used by every stage of owner resolution:
//! company keywords, honorific prefixes, name suffixes, ownership noise
//! designators, placeholder entries and a common-first-name set that is only
//! ever used as a scoring signal.
//!
//! The tables are data. Jurisdiction-specific additions come from
//! [`LexiconConfig`] rather than from code changes.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;

use ors_core::LexiconConfig;

/// Roman-numeral generational suffixes. Single letters (I, V, X) are left
/// out because they are far more often middle initials.
static ROMAN_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(II|III|IV|VI|VII|VIII|IX|XI|XII|XIII)$").unwrap());

// ============================================================================
// Built-in tables
// ============================================================================

/// Single-token company keywords (compared after removing dots)
const COMPANY_KEYWORDS: &[&str] = &[
    // Legal-entity suffixes
    "LLC", "LC", "PLLC", "INC", "INCORPORATED", "CORP", "CORPORATION", "CO", "COMPANY", "LTD",
    "LIMITED", "LP", "LLP", "LLLP", "PC", "PLC", "GP", "FSB", "DBA",
    // Trusts and estates
    "TRUST", "TRUSTS", "TR", "REIT",
    // Finance
    "BANK", "BANCORP", "MORTGAGE", "FINANCIAL", "FINANCE", "LENDING", "LOAN", "LOANS",
    "SAVINGS", "INSURANCE", "CAPITAL", "FUND", "FUNDING", "EQUITY", "INVESTMENT",
    "INVESTMENTS", "INVESTORS", "FNMA", "FHLMC",
    // Real estate and business words
    "HOLDINGS", "HOLDING", "PROPERTIES", "PROPERTY", "REALTY", "ESTATES", "HOMES",
    "DEVELOPMENT", "DEVELOPERS", "BUILDERS", "CONSTRUCTION", "PARTNERS", "PARTNERSHIP",
    "ASSOCIATES", "ASSOCIATION", "ASSN", "VENTURES", "ENTERPRISES", "GROUP", "MANAGEMENT",
    "MGMT", "SERVICES", "SOLUTIONS", "SYSTEMS", "INDUSTRIES", "INTERNATIONAL", "RENTALS",
    "APARTMENTS", "CONDOMINIUM", "CONDO", "HOA", "COMMUNITIES", "FARMS", "RANCH",
    // Religious and civic
    "CHURCH", "MINISTRY", "MINISTRIES", "BAPTIST", "METHODIST", "LUTHERAN", "CATHOLIC",
    "PRESBYTERIAN", "DIOCESE", "PARISH", "CONGREGATION", "TEMPLE", "SYNAGOGUE", "MOSQUE",
    "CEMETERY", "FOUNDATION", "SOCIETY", "CLUB", "LODGE", "LEAGUE", "COUNCIL",
    "SCHOOL", "SCHOOLS", "ACADEMY", "COLLEGE", "UNIVERSITY", "HOSPITAL",
    // Government
    "CITY", "COUNTY", "STATE", "TOWN", "TOWNSHIP", "VILLAGE", "BOROUGH", "COMMONWEALTH",
    "MUNICIPAL", "MUNICIPALITY", "GOVERNMENT", "DEPARTMENT", "DEPT", "DISTRICT",
    "AUTHORITY", "COMMISSION", "BOARD", "AGENCY", "HUD", "USA",
];

/// Trust keywords that read as "trustee" when they trail a person's name
/// (`DOE JOHN TR`)
const TRUSTEE_ABBREVIATIONS: &[&str] = &["TR", "TRS"];

/// Multi-word company phrases whose words are not keywords on their own
const COMPANY_PHRASES: &[&str] = &[
    "UNITED STATES",
    "CREDIT UNION",
    "HOME OWNERS",
    "HOMEOWNERS ASSN",
    "OF AMERICA",
    "NATIONAL ASSOCIATION",
    "REAL ESTATE",
    "PUBLIC WORKS",
    "HABITAT FOR HUMANITY",
];

/// Ownership designators that are not part of any name
const NOISE_PHRASES: &[&str] = &[
    "ET AL", "ETAL", "ET UX", "ETUX", "ET VIR", "ETVIR", "ET CON",
    "TRUSTEE", "TRUSTEES", "TTEE", "TTEES", "TRSTE", "CO-TRUSTEE", "CO TRUSTEE",
    "CO-TRUSTEES", "SUCCESSOR TRUSTEE", "SUCC TRUSTEE", "AS TRUSTEE", "AS TRUSTEES",
    "JTWROS", "JT TEN", "JTTEN", "JT WROS", "WROS", "JTRS", "TEN COM", "TEN ENT",
    "TENANTS IN COMMON", "TIC",
    "LIFE ESTATE", "LIFE EST", "L/E",
    "H/W", "H&W", "HUSBAND AND WIFE", "HUSBAND & WIFE",
    "DECEASED", "DECD", "DEC'D",
    "ESTATE OF", "EST OF", "HEIRS OF", "UNKNOWN HEIRS OF",
    "EXECUTOR", "EXECUTRIX", "ADMINISTRATOR", "ADMINISTRATRIX",
    "PERSONAL REPRESENTATIVE", "ATTORNEY IN FACT", "POA", "GUARDIAN", "CUSTODIAN",
];

/// Leading markers indicating the remainder is an address, not an owner
const CARE_OF_MARKERS: &[&str] = &["C/O", "CO/", "CARE OF", "ATTN", "ATTENTION"];

/// Honorific prefixes and their display forms
const PREFIXES: &[(&str, &str)] = &[
    ("MR", "Mr"),
    ("MRS", "Mrs"),
    ("MS", "Ms"),
    ("MISS", "Miss"),
    ("MX", "Mx"),
    ("DR", "Dr"),
    ("DOCTOR", "Dr"),
    ("REV", "Rev"),
    ("REVEREND", "Rev"),
    ("HON", "Hon"),
    ("HONORABLE", "Hon"),
    ("PROF", "Prof"),
    ("SIR", "Sir"),
    ("DAME", "Dame"),
    ("FR", "Fr"),
    ("CAPT", "Capt"),
    ("COL", "Col"),
    ("GEN", "Gen"),
    ("LT", "Lt"),
    ("MAJ", "Maj"),
    ("SGT", "Sgt"),
];

/// Generational and professional suffixes and their display forms
const SUFFIXES: &[(&str, &str)] = &[
    ("JR", "Jr"),
    ("SR", "Sr"),
    ("2ND", "II"),
    ("3RD", "III"),
    ("4TH", "IV"),
    ("ESQ", "Esq"),
    ("ESQUIRE", "Esq"),
    ("MD", "MD"),
    ("PHD", "PhD"),
    ("DDS", "DDS"),
    ("DMD", "DMD"),
    ("DVM", "DVM"),
    ("CPA", "CPA"),
    ("RN", "RN"),
    ("PE", "PE"),
    ("RET", "Ret"),
    ("USMC", "USMC"),
    ("USN", "USN"),
    ("USAF", "USAF"),
];

/// Compound-surname particles (`VAN DYKE, JOHN`)
const SURNAME_PARTICLES: &[&str] = &[
    "VAN", "VON", "DE", "DEL", "DELA", "DELLA", "DA", "DI", "DU", "LA", "LE", "MC", "MAC",
    "ST", "SAINT", "DOS", "DAS", "TER", "TEN", "VANDER", "VANDEN", "BIN", "AL", "EL",
];

/// Placeholder values that never denote an owner (compared alphanumerically)
const PLACEHOLDERS: &[&str] = &[
    "NA", "N A", "NONE", "NULL", "NIL", "UNKNOWN", "UNKNOWN OWNER", "OWNER UNKNOWN",
    "NOT AVAILABLE", "NOT PROVIDED", "NOT ON FILE", "NO OWNER", "NO DATA", "NO NAME",
    "MULTIPLE OWNERS", "MULTIPLE", "VARIOUS", "VARIOUS OWNERS", "SEE DEED", "SEE RECORD",
    "SEE ABOVE", "SEE REMARKS", "CONFIDENTIAL", "CONFIDENTIAL OWNER", "REDACTED", "TBD",
    "OWNER OF RECORD", "CURRENT OWNER", "CURRENT RESIDENT", "OCCUPANT",
];

/// Common given names used as an ordering signal
const COMMON_FIRST_NAMES: &[&str] = &[
    "JAMES", "JOHN", "ROBERT", "MICHAEL", "WILLIAM", "DAVID", "RICHARD", "JOSEPH", "THOMAS",
    "CHARLES", "CHRISTOPHER", "DANIEL", "MATTHEW", "ANTHONY", "MARK", "DONALD", "STEVEN",
    "PAUL", "ANDREW", "JOSHUA", "KENNETH", "KEVIN", "BRIAN", "GEORGE", "TIMOTHY", "RONALD",
    "EDWARD", "JASON", "JEFFREY", "RYAN", "JACOB", "GARY", "NICHOLAS", "ERIC", "JONATHAN",
    "STEPHEN", "LARRY", "JUSTIN", "SCOTT", "BRANDON", "BENJAMIN", "SAMUEL", "GREGORY",
    "FRANK", "ALEXANDER", "RAYMOND", "PATRICK", "JACK", "DENNIS", "JERRY", "TYLER", "AARON",
    "JOSE", "ADAM", "HENRY", "NATHAN", "DOUGLAS", "ZACHARY", "PETER", "KYLE", "WALTER",
    "ETHAN", "JEREMY", "HAROLD", "KEITH", "CHRISTIAN", "ROGER", "NOAH", "GERALD", "CARL",
    "TERRY", "SEAN", "AUSTIN", "ARTHUR", "LAWRENCE", "JESSE", "DYLAN", "BRYAN", "JOE",
    "JORDAN", "BILLY", "BRUCE", "ALBERT", "WILLIE", "GABRIEL", "LOGAN", "ALAN", "JUAN",
    "WAYNE", "ROY", "RALPH", "RANDY", "EUGENE", "VINCENT", "RUSSELL", "ELIJAH", "LOUIS",
    "BOBBY", "PHILIP", "JOHNNY", "BOB", "BILL", "JIM", "TOM", "MIKE", "DAN", "STEVE",
    "MARY", "PATRICIA", "JENNIFER", "LINDA", "ELIZABETH", "BARBARA", "SUSAN", "JESSICA",
    "SARAH", "KAREN", "LISA", "NANCY", "BETTY", "MARGARET", "SANDRA", "ASHLEY", "KIMBERLY",
    "EMILY", "DONNA", "MICHELLE", "CAROL", "AMANDA", "DOROTHY", "MELISSA", "DEBORAH",
    "STEPHANIE", "REBECCA", "SHARON", "LAURA", "CYNTHIA", "KATHLEEN", "AMY", "ANGELA",
    "SHIRLEY", "ANNA", "BRENDA", "PAMELA", "EMMA", "NICOLE", "HELEN", "SAMANTHA",
    "KATHERINE", "CHRISTINE", "DEBRA", "RACHEL", "CAROLYN", "JANET", "CATHERINE", "MARIA",
    "HEATHER", "DIANE", "RUTH", "JULIE", "OLIVIA", "JOYCE", "VIRGINIA", "VICTORIA", "KELLY",
    "LAUREN", "CHRISTINA", "JOAN", "EVELYN", "JUDITH", "MEGAN", "ANDREA", "CHERYL",
    "HANNAH", "JACQUELINE", "MARTHA", "GLORIA", "TERESA", "ANN", "SARA", "MADISON",
    "FRANCES", "KATHRYN", "JANICE", "JEAN", "ABIGAIL", "ALICE", "JUDY", "SOPHIA", "GRACE",
    "DENISE", "AMBER", "DORIS", "MARILYN", "DANIELLE", "BEVERLY", "ISABELLA", "THERESA",
    "DIANA", "NATALIE", "BRITTANY", "CHARLOTTE", "MARIE", "KAYLA", "ALEXIS", "LORI", "JANE",
    "PEGGY", "SUE", "ROSE", "JO", "LEE", "ANNE", "CAROLE", "LOUISE", "JUNE", "IRENE",
];

/// Short all-caps tokens that are ordinary words rather than acronyms when
/// re-casing company names
const SHORT_WORDS: &[(&str, &str)] = &[
    ("INC", "Inc"),
    ("CO", "Co"),
    ("CORP", "Corp"),
    ("LTD", "Ltd"),
    ("ASSN", "Assn"),
    ("DEPT", "Dept"),
    ("MGMT", "Mgmt"),
    ("ST", "St"),
    ("MT", "Mt"),
    ("FT", "Ft"),
    ("THE", "The"),
    ("OF", "Of"),
    ("AND", "And"),
    ("FOR", "For"),
    ("AT", "At"),
    ("IN", "In"),
    ("ON", "On"),
    ("BY", "By"),
    ("TO", "To"),
    ("DE", "De"),
    ("DEL", "Del"),
    ("LA", "La"),
    ("LOS", "Los"),
    ("LAS", "Las"),
    ("EL", "El"),
    ("NEW", "New"),
    ("OLD", "Old"),
    ("BAY", "Bay"),
    ("OAK", "Oak"),
    ("ELM", "Elm"),
    ("SUN", "Sun"),
    ("SEA", "Sea"),
    ("SKY", "Sky"),
    ("RED", "Red"),
    ("BIG", "Big"),
    ("TOP", "Top"),
    ("AIR", "Air"),
    ("ONE", "One"),
    ("TWO", "Two"),
    ("FOX", "Fox"),
    ("KEY", "Key"),
    ("ACE", "Ace"),
    ("ALL", "All"),
    ("OUR", "Our"),
    ("WAY", "Way"),
    ("RUN", "Run"),
    ("GOD", "God"),
    ("LAND", "Land"),
];

/// Words kept lower-case when they appear inside a company name
const JOINER_WORDS: &[&str] = &["OF", "AND", "THE", "FOR", "AT", "IN", "ON", "BY", "TO", "DE", "DEL"];

// ============================================================================
// Token keys
// ============================================================================

/// Canonical lookup key for a raw word.
///
/// Upper-cases, removes dots and any punctuation other than `&`, `/`, `+`,
/// `'` and `-`, then trims leading/trailing apostrophes and hyphens.
/// `"L.L.C.,"` → `"LLC"`, `"Jr."` → `"JR"`.
pub fn token_key(word: &str) -> String {
    let kept: String = word
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '&' | '/' | '+' | '\'' | '-'))
        .collect();
    kept.trim_matches(|c| c == '\'' || c == '-').to_uppercase()
}

/// Split text into token keys, dropping words that become empty
pub fn token_keys(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(token_key)
        .filter(|k| !k.is_empty())
        .collect()
}

fn phrase_keys(phrase: &str) -> Vec<String> {
    token_keys(phrase)
}

/// How a word is cased when re-casing an all-caps company name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordCase {
    /// Keep upper-case (acronyms, legal abbreviations)
    Upper,
    /// Lower-case joiner inside the name
    Joiner(String),
    /// Fixed display form
    Display(String),
    /// Ordinary title case
    Title,
}

// ============================================================================
// Lexicon
// ============================================================================

/// Reference tables for owner-name resolution
#[derive(Debug, Clone)]
pub struct Lexicon {
    company_keywords: HashSet<String>,
    company_phrases: Vec<Vec<String>>,
    /// Longest phrases first so multi-word designators win
    noise_phrases: Vec<Vec<String>>,
    care_of_markers: Vec<Vec<String>>,
    prefixes: HashMap<String, String>,
    suffixes: HashMap<String, String>,
    surname_particles: HashSet<String>,
    placeholders: HashSet<String>,
    first_names: HashSet<String>,
    short_words: HashMap<String, String>,
    joiner_words: HashSet<String>,
}

impl Lexicon {
    /// Create a lexicon with the built-in tables
    pub fn new() -> Self {
        let mut lexicon = Self {
            company_keywords: HashSet::new(),
            company_phrases: Vec::new(),
            noise_phrases: Vec::new(),
            care_of_markers: Vec::new(),
            prefixes: HashMap::new(),
            suffixes: HashMap::new(),
            surname_particles: HashSet::new(),
            placeholders: HashSet::new(),
            first_names: HashSet::new(),
            short_words: HashMap::new(),
            joiner_words: HashSet::new(),
        };

        lexicon.init_company_tables();
        lexicon.init_name_tables();
        lexicon.init_noise_tables();
        lexicon.init_casing_tables();
        lexicon.sort_phrases();
        lexicon
    }

    /// Create a lexicon with the built-in tables plus configured additions
    pub fn with_config(config: &LexiconConfig) -> Self {
        let mut lexicon = Self::new();
        lexicon.extend(config);
        lexicon
    }

    /// Merge configured additions into this lexicon
    pub fn extend(&mut self, config: &LexiconConfig) {
        for keyword in &config.company_keywords {
            self.add_company_keyword(keyword);
        }
        for phrase in &config.company_phrases {
            self.add_company_phrase(phrase);
        }
        for phrase in &config.noise_phrases {
            self.add_noise_phrase(phrase);
        }
        for prefix in &config.prefixes {
            let display = title_case(&token_key(prefix));
            self.add_prefix(prefix, &display);
        }
        for suffix in &config.suffixes {
            let display = title_case(&token_key(suffix));
            self.add_suffix(suffix, &display);
        }
        for name in &config.first_names {
            self.first_names.insert(token_key(name));
        }
        for placeholder in &config.placeholders {
            self.placeholders.insert(placeholder_key(placeholder));
        }
        self.sort_phrases();
    }

    fn init_company_tables(&mut self) {
        for keyword in COMPANY_KEYWORDS {
            self.add_company_keyword(keyword);
        }
        for phrase in COMPANY_PHRASES {
            self.add_company_phrase(phrase);
        }
    }

    fn init_name_tables(&mut self) {
        for (key, display) in PREFIXES {
            self.add_prefix(key, display);
        }
        for (key, display) in SUFFIXES {
            self.add_suffix(key, display);
        }
        for particle in SURNAME_PARTICLES {
            self.surname_particles.insert(particle.to_string());
        }
        for name in COMMON_FIRST_NAMES {
            self.first_names.insert(name.to_string());
        }
    }

    fn init_noise_tables(&mut self) {
        for phrase in NOISE_PHRASES {
            self.add_noise_phrase(phrase);
        }
        for marker in CARE_OF_MARKERS {
            self.care_of_markers.push(phrase_keys(marker));
        }
        for placeholder in PLACEHOLDERS {
            self.placeholders.insert(placeholder_key(placeholder));
        }
    }

    fn init_casing_tables(&mut self) {
        for (key, display) in SHORT_WORDS {
            self.short_words.insert(key.to_string(), display.to_string());
        }
        for word in JOINER_WORDS {
            self.joiner_words.insert(word.to_string());
        }
    }

    fn sort_phrases(&mut self) {
        self.noise_phrases.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        self.noise_phrases.dedup();
        self.company_phrases.sort();
        self.company_phrases.dedup();
    }

    fn add_company_keyword(&mut self, keyword: &str) {
        let key = token_key(keyword);
        if !key.is_empty() {
            self.company_keywords.insert(key);
        }
    }

    fn add_company_phrase(&mut self, phrase: &str) {
        let keys = phrase_keys(phrase);
        match keys.len() {
            0 => {}
            1 => {
                self.company_keywords.extend(keys);
            }
            _ => self.company_phrases.push(keys),
        }
    }

    fn add_noise_phrase(&mut self, phrase: &str) {
        let keys = phrase_keys(phrase);
        if !keys.is_empty() {
            self.noise_phrases.push(keys);
        }
    }

    fn add_prefix(&mut self, key: &str, display: &str) {
        self.prefixes.insert(token_key(key), display.to_string());
    }

    fn add_suffix(&mut self, key: &str, display: &str) {
        self.suffixes.insert(token_key(key), display.to_string());
    }

    // ------------------------------------------------------------------------
    // Lookups (all take token keys, see `token_key`)
    // ------------------------------------------------------------------------

    pub fn is_company_keyword(&self, key: &str) -> bool {
        self.company_keywords.contains(key)
    }

    pub fn is_trustee_abbreviation(&self, key: &str) -> bool {
        TRUSTEE_ABBREVIATIONS.contains(&key)
    }

    /// Any multi-word company phrase occurs in the key sequence
    pub fn contains_company_phrase(&self, keys: &[String]) -> bool {
        self.company_phrases
            .iter()
            .any(|phrase| keys.windows(phrase.len()).any(|w| w == phrase.as_slice()))
    }

    /// Any keyword or phrase occurs in the text
    pub fn mentions_company(&self, text: &str) -> bool {
        let keys = token_keys(text);
        keys.iter().any(|k| self.is_company_keyword(k)) || self.contains_company_phrase(&keys)
    }

    /// Length of the longest noise phrase starting at `start`
    pub fn noise_match_len(&self, keys: &[String], start: usize) -> Option<usize> {
        let rest = keys.get(start..)?;
        self.noise_phrases
            .iter()
            .find(|phrase| rest.starts_with(phrase))
            .map(|phrase| phrase.len())
    }

    /// Single-token noise designator
    pub fn is_noise(&self, key: &str) -> bool {
        self.noise_phrases
            .iter()
            .any(|phrase| phrase.len() == 1 && phrase[0] == key)
    }

    /// Number of leading words forming a care-of marker
    pub fn care_of_len(&self, keys: &[String]) -> Option<usize> {
        self.care_of_markers
            .iter()
            .find(|marker| keys.starts_with(marker))
            .map(|marker| marker.len())
    }

    pub fn is_prefix(&self, key: &str) -> bool {
        self.prefixes.contains_key(key)
    }

    pub fn prefix_display(&self, key: &str) -> Option<&str> {
        self.prefixes.get(key).map(String::as_str)
    }

    pub fn is_suffix(&self, key: &str) -> bool {
        self.suffixes.contains_key(key) || ROMAN_SUFFIX.is_match(key)
    }

    pub fn suffix_display(&self, key: &str) -> Option<String> {
        if let Some(display) = self.suffixes.get(key) {
            return Some(display.clone());
        }
        ROMAN_SUFFIX.is_match(key).then(|| key.to_string())
    }

    /// Token is a prefix or a suffix
    pub fn is_affix(&self, key: &str) -> bool {
        self.is_prefix(key) || self.is_suffix(key)
    }

    pub fn is_surname_particle(&self, key: &str) -> bool {
        self.surname_particles.contains(key)
    }

    pub fn is_common_first_name(&self, key: &str) -> bool {
        self.first_names.contains(key)
    }

    /// Whole entry is a placeholder rather than an owner.
    ///
    /// Entries without a single alphanumeric character count as placeholders.
    pub fn is_placeholder(&self, raw: &str) -> bool {
        let key = placeholder_key(raw);
        key.is_empty() || self.placeholders.contains(&key)
    }

    /// Casing rule for one word of an all-caps company name
    pub fn company_word_case(&self, key: &str, is_first: bool) -> WordCase {
        if !is_first && self.joiner_words.contains(key) {
            return WordCase::Joiner(key.to_lowercase());
        }
        if let Some(display) = self.short_words.get(key) {
            return WordCase::Display(display.clone());
        }
        if key.chars().any(|c| c.is_ascii_digit()) {
            return WordCase::Title;
        }
        let letters = key.chars().filter(|c| c.is_alphabetic()).count();
        let has_vowel = key.chars().any(|c| "AEIOUY".contains(c));
        if letters <= 3 || !has_vowel {
            return WordCase::Upper;
        }
        WordCase::Title
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

/// Alphanumeric-only, space-collapsed, upper-cased form of an entry
fn placeholder_key(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Locale-naive title case.
///
/// Lower-cases everything, then capitalizes the first letter of the string
/// and every letter following a space, hyphen or apostrophe.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize = true;
    for c in s.chars() {
        if capitalize {
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
        capitalize = matches!(c, ' ' | '-' | '\'');
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
