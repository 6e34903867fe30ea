//! Owner resolution pipeline
//!
//! Wires the segmenter, classifier, person parser and company normalizer
//! into a per-mention fold, and the temporal grouper into a per-property
//! record.

use std::sync::Arc;

use crate::classifier::Classifier;
use crate::company::CompanyNameNormalizer;
use crate::dedupe::Deduplicator;
use crate::grouper::TemporalGrouper;
use crate::invalid::InvalidOwnerCollector;
use crate::lexicon::Lexicon;
use crate::person::PersonNameParser;
use crate::segmenter::{NameSegment, Segmenter};
use crate::{MentionResolution, NameResolver, SegmentOutcome};
use ors_core::{
    AppConfig, OwnerEntity, OwnerKind, OwnerRecord, PropertyOwnership, RawOwnerMention,
    ReasonCode,
};

/// Per-mention accumulator threaded through the segment fold
#[derive(Debug, Default)]
struct FoldState {
    /// Surname of the most recent person in this mention
    carried_surname: Option<String>,
    /// Single-token segments waiting for a surname from a later segment
    pending: Vec<usize>,
    outcomes: Vec<Option<SegmentOutcome>>,
}

/// Resolves raw owner strings into owner entities
#[derive(Debug, Clone)]
pub struct OwnerResolver {
    lexicon: Arc<Lexicon>,
    segmenter: Segmenter,
    classifier: Classifier,
    person_parser: PersonNameParser,
    company_normalizer: CompanyNameNormalizer,
}

impl OwnerResolver {
    /// Create a resolver with the built-in lexicon and default heuristics
    pub fn new() -> Self {
        Self::with_config(&AppConfig::default())
    }

    /// Create a resolver from application configuration
    pub fn with_config(config: &AppConfig) -> Self {
        let lexicon = Arc::new(Lexicon::with_config(&config.lexicon));
        Self {
            segmenter: Segmenter::new(lexicon.clone()),
            classifier: Classifier::new(lexicon.clone(), config.classifier.clone()),
            person_parser: PersonNameParser::new(lexicon.clone(), config.scoring.clone()),
            company_normalizer: CompanyNameNormalizer::new(lexicon.clone()),
            lexicon,
        }
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn segmenter(&self) -> &Segmenter {
        &self.segmenter
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn person_parser(&self) -> &PersonNameParser {
        &self.person_parser
    }

    /// Resolve every segment of one raw string, one outcome per segment
    pub fn resolve_segments(&self, raw: &str) -> MentionResolution {
        let segments = self.segmenter.segment(raw);

        let rejected = if segments.is_empty() && !raw.trim().is_empty() {
            Some(self.segmenter.empty_reason(raw))
        } else {
            None
        };

        let initial = FoldState {
            outcomes: vec![None; segments.len()],
            ..Default::default()
        };
        let state = segments
            .iter()
            .enumerate()
            .fold(initial, |state, (idx, segment)| {
                self.fold_segment(state, &segments, idx, segment)
            });

        let mut outcomes = state.outcomes;
        for idx in state.pending {
            outcomes[idx] = Some(SegmentOutcome::Invalid(ReasonCode::SingleTokenNoFallback));
        }

        MentionResolution {
            raw: raw.to_string(),
            segments,
            outcomes: outcomes
                .into_iter()
                .map(|o| o.unwrap_or(SegmentOutcome::Invalid(ReasonCode::EmptyAfterClean)))
                .collect(),
            rejected,
        }
    }

    fn fold_segment(
        &self,
        mut state: FoldState,
        segments: &[NameSegment],
        idx: usize,
        segment: &NameSegment,
    ) -> FoldState {
        if segment.hints.is_placeholder {
            state.outcomes[idx] = Some(SegmentOutcome::Invalid(ReasonCode::PlaceholderEntry));
            return state;
        }

        let outcome = match self.classifier.classify(segment) {
            OwnerKind::Company => {
                let company = self.company_normalizer.normalize_company(segment);
                SegmentOutcome::from_entity(company.into(), ReasonCode::EmptyAfterClean)
            }
            OwnerKind::Person => {
                match self
                    .person_parser
                    .parse_person(segment, state.carried_surname.as_deref())
                {
                    Ok(person) => {
                        let surname = person.last_name.clone();
                        for pending in std::mem::take(&mut state.pending) {
                            state.outcomes[pending] =
                                Some(self.parse_with_surname(&segments[pending], &surname));
                        }
                        state.carried_surname = Some(surname);
                        SegmentOutcome::from_entity(
                            person.into(),
                            ReasonCode::UnableToClassifyPerson,
                        )
                    }
                    Err(ReasonCode::SingleTokenNoFallback) => {
                        state.pending.push(idx);
                        return state;
                    }
                    Err(reason) => SegmentOutcome::Invalid(reason),
                }
            }
        };

        state.outcomes[idx] = Some(outcome);
        state
    }

    fn parse_with_surname(&self, segment: &NameSegment, surname: &str) -> SegmentOutcome {
        match self.person_parser.parse_person(segment, Some(surname)) {
            Ok(person) => {
                SegmentOutcome::from_entity(person.into(), ReasonCode::UnableToClassifyPerson)
            }
            Err(reason) => SegmentOutcome::Invalid(reason),
        }
    }

    /// Resolve one raw string to deduplicated entities, recording rejections
    pub fn resolve_mention(
        &self,
        raw: &str,
        collector: &mut InvalidOwnerCollector,
    ) -> Vec<OwnerEntity> {
        let resolution = self.resolve_segments(raw);
        if let Some(reason) = resolution.rejected {
            collector.record(raw, reason);
        }

        let mut owners = Deduplicator::new();
        for (segment, outcome) in resolution.segments.iter().zip(resolution.outcomes) {
            match outcome {
                SegmentOutcome::Owner(entity) => {
                    owners.insert(entity);
                }
                SegmentOutcome::Invalid(reason) => {
                    collector.record(&segment.text, reason);
                }
            }
        }
        owners.into_entities()
    }

    /// Resolve all mentions of one property into a grouped record
    pub fn resolve_property(&self, mentions: &[RawOwnerMention]) -> OwnerRecord {
        let mut collector = InvalidOwnerCollector::new();
        let groups = TemporalGrouper::new(self).group(mentions, &mut collector);

        OwnerRecord {
            owners_by_date: groups,
            invalid_owners: collector.into_entries(),
        }
    }

    /// Resolve a scraped property document
    pub fn resolve_document(&self, document: PropertyOwnership) -> OwnerRecord {
        self.resolve_property(&document.into_mentions())
    }
}

impl Default for OwnerResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl NameResolver for OwnerResolver {
    fn resolve_mention(
        &self,
        raw: &str,
        collector: &mut InvalidOwnerCollector,
    ) -> Vec<OwnerEntity> {
        OwnerResolver::resolve_mention(self, raw, collector)
    }
}
