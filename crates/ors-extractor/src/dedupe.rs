//! Deduplication of owner entities
//!
//! Two entities are duplicates when their canonical keys match (see
//! [`OwnerEntity::dedupe_key`]). Order is preserved and the first occurrence
//! wins.

use std::collections::HashSet;

use ors_core::OwnerEntity;

/// Incremental order-preserving deduplicator
#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
    entities: Vec<OwnerEntity>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity unless an equivalent one is already present.
    ///
    /// Returns `true` when the entity was added.
    pub fn insert(&mut self, entity: OwnerEntity) -> bool {
        if self.seen.insert(entity.dedupe_key()) {
            self.entities.push(entity);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, entity: &OwnerEntity) -> bool {
        self.seen.contains(&entity.dedupe_key())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> &[OwnerEntity] {
        &self.entities
    }

    pub fn into_entities(self) -> Vec<OwnerEntity> {
        self.entities
    }
}

impl Extend<OwnerEntity> for Deduplicator {
    fn extend<I: IntoIterator<Item = OwnerEntity>>(&mut self, iter: I) {
        for entity in iter {
            self.insert(entity);
        }
    }
}

impl FromIterator<OwnerEntity> for Deduplicator {
    fn from_iter<I: IntoIterator<Item = OwnerEntity>>(iter: I) -> Self {
        let mut dedup = Self::new();
        dedup.extend(iter);
        dedup
    }
}

/// Order-preserving dedupe, first occurrence wins
pub fn dedupe(entities: impl IntoIterator<Item = OwnerEntity>) -> Vec<OwnerEntity> {
    entities
        .into_iter()
        .collect::<Deduplicator>()
        .into_entities()
}
