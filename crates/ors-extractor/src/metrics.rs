//! Owner resolution quality metrics
//!
//! Measures resolution quality against a labeled corpus: precision, recall
//! and F1 over owner entities, plus a company/person confusion count. Used to
//! validate scoring weights before changing defaults.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::invalid::InvalidOwnerCollector;
use crate::NameResolver;
use ors_core::{OrsError, OwnerEntity, OwnerKind, Result};

// ============================================================================
// Entity Metrics
// ============================================================================

/// Metrics for entity resolution evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetrics {
    /// True positives (correctly resolved entities)
    pub true_positives: usize,
    /// False positives (resolved entities not in the gold standard)
    pub false_positives: usize,
    /// False negatives (missed entities)
    pub false_negatives: usize,
    /// Total entities in gold standard
    pub gold_total: usize,
    /// Total entities predicted
    pub predicted_total: usize,
}

impl EntityMetrics {
    /// Calculate precision (TP / (TP + FP))
    pub fn precision(&self) -> f32 {
        if self.true_positives + self.false_positives == 0 {
            0.0
        } else {
            self.true_positives as f32 / (self.true_positives + self.false_positives) as f32
        }
    }

    /// Calculate recall (TP / (TP + FN))
    pub fn recall(&self) -> f32 {
        if self.true_positives + self.false_negatives == 0 {
            0.0
        } else {
            self.true_positives as f32 / (self.true_positives + self.false_negatives) as f32
        }
    }

    /// Calculate F1 score (2 * P * R / (P + R))
    pub fn f1_score(&self) -> f32 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    fn add(&mut self, other: &EntityMetrics) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
        self.gold_total += other.gold_total;
        self.predicted_total += other.predicted_total;
    }
}

// ============================================================================
// Kind Metrics
// ============================================================================

/// Company/person confusion over positionally aligned entities
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindMetrics {
    pub company_as_company: usize,
    pub company_as_person: usize,
    pub person_as_person: usize,
    pub person_as_company: usize,
}

impl KindMetrics {
    fn record(&mut self, expected: OwnerKind, predicted: OwnerKind) {
        match (expected, predicted) {
            (OwnerKind::Company, OwnerKind::Company) => self.company_as_company += 1,
            (OwnerKind::Company, OwnerKind::Person) => self.company_as_person += 1,
            (OwnerKind::Person, OwnerKind::Person) => self.person_as_person += 1,
            (OwnerKind::Person, OwnerKind::Company) => self.person_as_company += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.company_as_company + self.company_as_person + self.person_as_person
            + self.person_as_company
    }

    /// Share of aligned entities whose kind was right
    pub fn accuracy(&self) -> f32 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.company_as_company + self.person_as_person) as f32 / total as f32
        }
    }

    fn add(&mut self, other: &KindMetrics) {
        self.company_as_company += other.company_as_company;
        self.company_as_person += other.company_as_person;
        self.person_as_person += other.person_as_person;
        self.person_as_company += other.person_as_company;
    }
}

// ============================================================================
// Gold Standard Types
// ============================================================================

/// One labeled raw owner string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldCase {
    pub raw: String,
    #[serde(default)]
    pub expected: Vec<OwnerEntity>,
}

impl GoldCase {
    pub fn new(raw: impl Into<String>, expected: Vec<OwnerEntity>) -> Self {
        Self {
            raw: raw.into(),
            expected,
        }
    }

    /// Parse a JSON array of labeled cases
    pub fn from_json(json: &str) -> Result<Vec<GoldCase>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON array of labeled cases from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Vec<GoldCase>> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| OrsError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&content)
    }
}

// ============================================================================
// Evaluator
// ============================================================================

/// Evaluator for resolution quality
pub struct Evaluator {
    /// Only the entity kind must match, not the parsed fields
    kind_only: bool,
}

impl Evaluator {
    /// Create a new evaluator requiring exact field matches
    pub fn new() -> Self {
        Self { kind_only: false }
    }

    /// Enable/disable kind-only matching
    pub fn with_kind_matching_only(mut self, kind_only: bool) -> Self {
        self.kind_only = kind_only;
        self
    }

    fn entities_match(&self, predicted: &OwnerEntity, gold: &OwnerEntity) -> bool {
        if self.kind_only {
            predicted.kind() == gold.kind()
        } else {
            predicted.dedupe_key() == gold.dedupe_key()
        }
    }

    /// Evaluate the entities resolved from one raw string
    pub fn evaluate_case(&self, predicted: &[OwnerEntity], gold: &[OwnerEntity]) -> EntityMetrics {
        let mut true_positives = 0;
        let mut matched_gold: HashSet<usize> = HashSet::new();

        for pred in predicted {
            for (idx, g) in gold.iter().enumerate() {
                if !matched_gold.contains(&idx) && self.entities_match(pred, g) {
                    true_positives += 1;
                    matched_gold.insert(idx);
                    break;
                }
            }
        }

        EntityMetrics {
            true_positives,
            false_positives: predicted.len() - true_positives,
            false_negatives: gold.len() - matched_gold.len(),
            gold_total: gold.len(),
            predicted_total: predicted.len(),
        }
    }

    /// Kind confusion between entities at the same position
    pub fn evaluate_kinds(&self, predicted: &[OwnerEntity], gold: &[OwnerEntity]) -> KindMetrics {
        let mut metrics = KindMetrics::default();
        for (pred, g) in predicted.iter().zip(gold) {
            metrics.record(g.kind(), pred.kind());
        }
        metrics
    }

    /// Run a resolver over a labeled corpus
    pub fn evaluate_corpus<R: NameResolver + ?Sized>(
        &self,
        resolver: &R,
        cases: &[GoldCase],
    ) -> AggregateMetrics {
        let mut aggregate = AggregateMetrics::default();

        for case in cases {
            let mut collector = InvalidOwnerCollector::new();
            let predicted = resolver.resolve_mention(&case.raw, &mut collector);

            let metrics = self.evaluate_case(&predicted, &case.expected);
            if metrics.false_positives > 0 || metrics.false_negatives > 0 {
                tracing::debug!(
                    "Mismatch for '{}': predicted {:?}",
                    case.raw,
                    predicted.iter().map(|e| e.display_name()).collect::<Vec<_>>()
                );
            }

            aggregate.add_entity_metrics(&metrics);
            aggregate.add_kind_metrics(&self.evaluate_kinds(&predicted, &case.expected));
            aggregate.rejections += collector.len();
            aggregate.num_cases += 1;
        }

        aggregate
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Aggregate Metrics
// ============================================================================

/// Aggregate metrics for a labeled corpus
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub entity_metrics: EntityMetrics,
    pub kind_metrics: KindMetrics,
    pub num_cases: usize,
    /// Rejections recorded while resolving the corpus
    pub rejections: usize,
}

impl AggregateMetrics {
    /// Add entity metrics to aggregate
    pub fn add_entity_metrics(&mut self, metrics: &EntityMetrics) {
        self.entity_metrics.add(metrics);
    }

    /// Add kind metrics to aggregate
    pub fn add_kind_metrics(&mut self, metrics: &KindMetrics) {
        self.kind_metrics.add(metrics);
    }

    /// Print a summary report
    pub fn report(&self) -> String {
        format!(
            "=== Owner Resolution Quality Report ===\n\n\
             Cases evaluated: {}\n\
             Rejections: {}\n\n\
             Entity Resolution:\n\
               Precision: {:.1}%\n\
               Recall:    {:.1}%\n\
               F1 Score:  {:.1}%\n\
               Gold: {} | Predicted: {} | TP: {} | FP: {} | FN: {}\n\n\
             Classification:\n\
               Accuracy:  {:.1}%\n\
               Company→Company: {} | Company→Person: {} | Person→Person: {} | Person→Company: {}\n",
            self.num_cases,
            self.rejections,
            self.entity_metrics.precision() * 100.0,
            self.entity_metrics.recall() * 100.0,
            self.entity_metrics.f1_score() * 100.0,
            self.entity_metrics.gold_total,
            self.entity_metrics.predicted_total,
            self.entity_metrics.true_positives,
            self.entity_metrics.false_positives,
            self.entity_metrics.false_negatives,
            self.kind_metrics.accuracy() * 100.0,
            self.kind_metrics.company_as_company,
            self.kind_metrics.company_as_person,
            self.kind_metrics.person_as_person,
            self.kind_metrics.person_as_company,
        )
    }

    /// Check if entity precision meets the given threshold (0.0 - 1.0)
    pub fn meets_threshold(&self, min_precision: f32) -> bool {
        self.entity_metrics.precision() >= min_precision
    }
}

// ============================================================================
// Tests
// ============================================================================
