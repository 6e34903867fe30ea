//! ORS Extractor - Owner-name resolution engine
//!
//! Turns scraped owner strings into typed [`OwnerEntity`] values,
//! deduplicates them and groups them by the point in time they held title.
//! Strings that cannot be resolved are reported with a stable
//! [`ReasonCode`] instead of failing.

use serde::{Deserialize, Serialize};

use ors_core::{OwnerEntity, ReasonCode};

pub mod classifier;
pub mod company;
pub mod dedupe;
pub mod grouper;
pub mod invalid;
pub mod lexicon;
pub mod metrics;
pub mod person;
pub mod pipeline;
pub mod segmenter;

pub use classifier::{Classifier, CompanySignal};
pub use company::CompanyNameNormalizer;
pub use dedupe::{dedupe, Deduplicator};
pub use grouper::TemporalGrouper;
pub use invalid::InvalidOwnerCollector;
pub use lexicon::Lexicon;
pub use metrics::{AggregateMetrics, EntityMetrics, Evaluator, GoldCase, KindMetrics};
pub use person::{CandidateFeatures, NameCandidate, PersonNameParser};
pub use pipeline::OwnerResolver;
pub use segmenter::{NameOrder, NameSegment, SegmentHints, Segmenter};

/// Trait for owner-name resolvers
pub trait NameResolver: Send + Sync {
    /// Resolve one raw owner string into deduplicated entities, recording
    /// anything that could not be resolved
    fn resolve_mention(&self, raw: &str, collector: &mut InvalidOwnerCollector)
        -> Vec<OwnerEntity>;
}

/// Result of resolving a single segment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentOutcome {
    Owner(OwnerEntity),
    Invalid(ReasonCode),
}

impl SegmentOutcome {
    /// Wrap an entity, falling back to `reason` if it is missing a
    /// mandatory field
    pub fn from_entity(entity: OwnerEntity, reason: ReasonCode) -> Self {
        if entity.is_valid() {
            Self::Owner(entity)
        } else {
            Self::Invalid(reason)
        }
    }

    pub fn is_owner(&self) -> bool {
        matches!(self, Self::Owner(_))
    }

    pub fn owner(&self) -> Option<&OwnerEntity> {
        match self {
            Self::Owner(entity) => Some(entity),
            Self::Invalid(_) => None,
        }
    }
}

/// Every segment of one raw string with its outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionResolution {
    pub raw: String,
    pub segments: Vec<NameSegment>,
    /// One outcome per segment, same order
    pub outcomes: Vec<SegmentOutcome>,
    /// Set when a non-blank string produced no segments at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected: Option<ReasonCode>,
}

impl MentionResolution {
    /// Resolved owners in segment order (not deduplicated)
    pub fn owners(&self) -> impl Iterator<Item = &OwnerEntity> {
        self.outcomes.iter().filter_map(SegmentOutcome::owner)
    }

    /// Segments that failed, with their reasons
    pub fn failures(&self) -> impl Iterator<Item = (&NameSegment, ReasonCode)> {
        self.segments
            .iter()
            .zip(&self.outcomes)
            .filter_map(|(segment, outcome)| match outcome {
                SegmentOutcome::Invalid(reason) => Some((segment, *reason)),
                SegmentOutcome::Owner(_) => None,
            })
    }
}
