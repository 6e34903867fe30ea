//! ORS Core - Domain models and shared types
//!
//! This crate defines the core abstractions used throughout the ORS system:
//! - Owner entity models (persons, companies)
//! - Ownership groups keyed by point in time
//! - Raw owner mentions and their temporal context
//! - Rejection reason codes
//! - Common error types
//! - Configuration management

pub mod config;
pub mod mention;

pub use config::{
    AppConfig, ClassifierConfig, ConfigError, LexiconConfig, LoggingConfig, OutputConfig,
    ScoringConfig, ScoringWeights,
};
pub use mention::{
    parse_transfer_date, OwnerContext, PropertyOwnership, RawOwnerMention, SaleHistoryRow,
};

use chrono::NaiveDate;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for ORS operations
#[derive(Error, Debug)]
pub enum OrsError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, OrsError>;

// ============================================================================
// Owner Entities
// ============================================================================

/// A natural person holding title
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_name: Option<String>,

    pub first_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,

    pub last_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suffix_name: Option<String>,
}

impl Person {
    /// Create a person with only given name and surname
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            prefix_name: None,
            first_name: first_name.into(),
            middle_name: None,
            last_name: last_name.into(),
            suffix_name: None,
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix_name = Some(prefix.into());
        self
    }

    pub fn with_middle(mut self, middle: impl Into<String>) -> Self {
        self.middle_name = Some(middle.into());
        self
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix_name = Some(suffix.into());
        self
    }

    /// Both mandatory name fields are present
    pub fn is_valid(&self) -> bool {
        !self.first_name.trim().is_empty() && !self.last_name.trim().is_empty()
    }
}

/// An organization holding title (LLC, trust, bank, municipality, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
}

impl Company {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Kind of owner a segment denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerKind {
    Person,
    Company,
}

impl OwnerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Company => "company",
        }
    }
}

impl std::fmt::Display for OwnerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured owner produced by the resolution pipeline
///
/// Serialized with a `type` tag (`"person"` or `"company"`) next to the
/// variant's fields. Equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OwnerEntity {
    Person(Person),
    Company(Company),
}

impl OwnerEntity {
    pub fn kind(&self) -> OwnerKind {
        match self {
            Self::Person(_) => OwnerKind::Person,
            Self::Company(_) => OwnerKind::Company,
        }
    }

    pub fn as_person(&self) -> Option<&Person> {
        match self {
            Self::Person(p) => Some(p),
            Self::Company(_) => None,
        }
    }

    pub fn as_company(&self) -> Option<&Company> {
        match self {
            Self::Company(c) => Some(c),
            Self::Person(_) => None,
        }
    }

    /// Mandatory fields are non-empty
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Person(p) => p.is_valid(),
            Self::Company(c) => c.is_valid(),
        }
    }

    /// Canonical comparison key used for deduplication.
    ///
    /// Companies: lower-cased trimmed name. Persons: the lower-cased
    /// `prefix|first|middle|last|suffix` tuple, absent fields empty.
    pub fn dedupe_key(&self) -> String {
        match self {
            Self::Company(c) => format!("company:{}", c.name.trim().to_lowercase()),
            Self::Person(p) => {
                let field = |v: &Option<String>| v.as_deref().unwrap_or("").trim().to_lowercase();
                format!(
                    "person:{}|{}|{}|{}|{}",
                    field(&p.prefix_name),
                    p.first_name.trim().to_lowercase(),
                    field(&p.middle_name),
                    p.last_name.trim().to_lowercase(),
                    field(&p.suffix_name),
                )
            }
        }
    }

    /// Looser key that ignores affixes and middle names.
    ///
    /// Used to decide whether an undated owner is already listed elsewhere.
    pub fn name_key(&self) -> String {
        match self {
            Self::Company(c) => c.name.trim().to_lowercase(),
            Self::Person(p) => format!(
                "{} {}",
                p.first_name.trim().to_lowercase(),
                p.last_name.trim().to_lowercase()
            ),
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> String {
        match self {
            Self::Company(c) => c.name.clone(),
            Self::Person(p) => [
                p.prefix_name.as_deref(),
                Some(p.first_name.as_str()),
                p.middle_name.as_deref(),
                Some(p.last_name.as_str()),
                p.suffix_name.as_deref(),
            ]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" "),
        }
    }
}

impl From<Person> for OwnerEntity {
    fn from(p: Person) -> Self {
        Self::Person(p)
    }
}

impl From<Company> for OwnerEntity {
    fn from(c: Company) -> Self {
        Self::Company(c)
    }
}

// ============================================================================
// Rejections
// ============================================================================

/// Stable rejection reason codes
///
/// These strings are aggregated by downstream QA tooling and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    EmptyAfterClean,
    PlaceholderEntry,
    EmptyAfterAffixRemoval,
    SingleTokenNoFallback,
    UnableToClassifyPerson,
}

impl ReasonCode {
    pub const ALL: [ReasonCode; 5] = [
        Self::EmptyAfterClean,
        Self::PlaceholderEntry,
        Self::EmptyAfterAffixRemoval,
        Self::SingleTokenNoFallback,
        Self::UnableToClassifyPerson,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyAfterClean => "empty_after_clean",
            Self::PlaceholderEntry => "placeholder_entry",
            Self::EmptyAfterAffixRemoval => "empty_after_affix_removal",
            Self::SingleTokenNoFallback => "single_token_no_fallback",
            Self::UnableToClassifyPerson => "unable_to_classify_person",
        }
    }
}

impl std::fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A raw owner string that could not be resolved
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvalidOwnerEntry {
    pub raw: String,
    pub reason: ReasonCode,
}

impl InvalidOwnerEntry {
    pub fn new(raw: impl Into<String>, reason: ReasonCode) -> Self {
        Self {
            raw: raw.into(),
            reason,
        }
    }
}

// ============================================================================
// Ownership Groups
// ============================================================================

/// Point in time an ownership group refers to
///
/// Ordering: transfer dates ascending, then synthetic unknown-date keys,
/// then the current owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupKey {
    Date(NaiveDate),
    Unknown(usize),
    Current,
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Unknown(n) => write!(f, "unknown_date_{}", n),
            Self::Current => write!(f, "current"),
        }
    }
}

impl std::str::FromStr for GroupKey {
    type Err = OrsError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "current" {
            return Ok(Self::Current);
        }
        if let Some(n) = s.strip_prefix("unknown_date_") {
            return n
                .parse()
                .map(Self::Unknown)
                .map_err(|_| OrsError::InvalidInput(format!("bad group key: {}", s)));
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Self::Date)
            .map_err(|_| OrsError::InvalidInput(format!("bad group key: {}", s)))
    }
}

impl Serialize for GroupKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GroupKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Deduplicated owners associated with one point in time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipGroup {
    pub key: GroupKey,
    pub owners: Vec<OwnerEntity>,
}

impl OwnershipGroup {
    pub fn new(key: GroupKey) -> Self {
        Self {
            key,
            owners: Vec::new(),
        }
    }

    /// Any owner in this group shares the given name key
    pub fn contains_name(&self, name_key: &str) -> bool {
        self.owners.iter().any(|o| o.name_key() == name_key)
    }
}

// ============================================================================
// Output Record
// ============================================================================

/// Final per-property output
///
/// Serializes as `{ "owners_by_date": { key: [...] }, "invalid_owners": [...] }`
/// with group keys in their chronological order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerRecord {
    pub owners_by_date: Vec<OwnershipGroup>,
    pub invalid_owners: Vec<InvalidOwnerEntry>,
}

impl OwnerRecord {
    /// Owners of a given group, if present
    pub fn group(&self, key: &GroupKey) -> Option<&[OwnerEntity]> {
        self.owners_by_date
            .iter()
            .find(|g| &g.key == key)
            .map(|g| g.owners.as_slice())
    }

    /// Group keys in emitted order
    pub fn keys(&self) -> Vec<String> {
        self.owners_by_date.iter().map(|g| g.key.to_string()).collect()
    }

    /// Serialize to JSON, optionally emitting absent person fields as `null`
    pub fn to_json(&self, null_optional_fields: bool, pretty: bool) -> Result<String> {
        let view = RecordView {
            record: self,
            nulls: null_optional_fields,
        };
        let json = if pretty {
            serde_json::to_string_pretty(&view)?
        } else {
            serde_json::to_string(&view)?
        };
        Ok(json)
    }
}

impl Serialize for OwnerRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        RecordView {
            record: self,
            nulls: false,
        }
        .serialize(serializer)
    }
}

struct RecordView<'a> {
    record: &'a OwnerRecord,
    nulls: bool,
}

struct GroupsView<'a> {
    groups: &'a [OwnershipGroup],
    nulls: bool,
}

struct OwnersView<'a> {
    owners: &'a [OwnerEntity],
    nulls: bool,
}

struct EntityView<'a> {
    entity: &'a OwnerEntity,
    nulls: bool,
}

impl Serialize for RecordView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("OwnerRecord", 2)?;
        state.serialize_field(
            "owners_by_date",
            &GroupsView {
                groups: &self.record.owners_by_date,
                nulls: self.nulls,
            },
        )?;
        state.serialize_field("invalid_owners", &self.record.invalid_owners)?;
        state.end()
    }
}

impl Serialize for GroupsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in self.groups {
            map.serialize_entry(
                &group.key,
                &OwnersView {
                    owners: &group.owners,
                    nulls: self.nulls,
                },
            )?;
        }
        map.end()
    }
}

impl Serialize for OwnersView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.owners.iter().map(|entity| EntityView {
            entity,
            nulls: self.nulls,
        }))
    }
}

impl Serialize for EntityView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let person = match self.entity {
            OwnerEntity::Company(_) => return self.entity.serialize(serializer),
            OwnerEntity::Person(p) => p,
        };
        if !self.nulls {
            return self.entity.serialize(serializer);
        }

        let mut map = serializer.serialize_map(Some(6))?;
        map.serialize_entry("type", "person")?;
        map.serialize_entry("prefix_name", &person.prefix_name)?;
        map.serialize_entry("first_name", &person.first_name)?;
        map.serialize_entry("middle_name", &person.middle_name)?;
        map.serialize_entry("last_name", &person.last_name)?;
        map.serialize_entry("suffix_name", &person.suffix_name)?;
        map.end()
    }
}
