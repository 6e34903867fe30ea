//! Temporal grouping of resolved owners
//!
//! Builds the `owners_by_date` structure for one property:
//! - dated mentions land in their transfer date's group (same date merges)
//! - current mentions land in the `current` group, which is always present
//! - prior-unmatched mentions are resolved last; owners already listed in any
//!   other group are dropped, survivors seed `unknown_date_N`

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::dedupe::Deduplicator;
use crate::invalid::InvalidOwnerCollector;
use crate::NameResolver;
use ors_core::{GroupKey, OwnerContext, OwnershipGroup, RawOwnerMention};

/// Assembles ownership groups from raw mentions
pub struct TemporalGrouper<'a, R: NameResolver + ?Sized> {
    resolver: &'a R,
}

impl<'a, R: NameResolver + ?Sized> TemporalGrouper<'a, R> {
    pub fn new(resolver: &'a R) -> Self {
        Self { resolver }
    }

    /// Resolve and group mentions, recording rejections in `collector`.
    ///
    /// Groups come back in emission order: dates ascending, then
    /// `unknown_date_N`, then `current`.
    pub fn group(
        &self,
        mentions: &[RawOwnerMention],
        collector: &mut InvalidOwnerCollector,
    ) -> Vec<OwnershipGroup> {
        let mut dated: BTreeMap<NaiveDate, Deduplicator> = BTreeMap::new();
        let mut current = Deduplicator::new();
        let mut deferred = Vec::new();

        for mention in mentions {
            match mention.context {
                OwnerContext::Current => {
                    current.extend(self.resolver.resolve_mention(&mention.text, collector));
                }
                OwnerContext::Date(date) => {
                    let owners = self.resolver.resolve_mention(&mention.text, collector);
                    dated.entry(date).or_default().extend(owners);
                }
                OwnerContext::PriorUnmatched => deferred.push(mention),
            }
        }

        let mut groups: Vec<OwnershipGroup> = dated
            .into_iter()
            .filter(|(_, owners)| !owners.is_empty())
            .map(|(date, owners)| OwnershipGroup {
                key: GroupKey::Date(date),
                owners: owners.into_entities(),
            })
            .collect();

        let current = OwnershipGroup {
            key: GroupKey::Current,
            owners: current.into_entities(),
        };

        let mut unknown: Vec<OwnershipGroup> = Vec::new();
        for mention in deferred {
            let survivors: Vec<_> = self
                .resolver
                .resolve_mention(&mention.text, collector)
                .into_iter()
                .filter(|owner| {
                    let name = owner.name_key();
                    let listed = groups
                        .iter()
                        .chain(unknown.iter())
                        .chain(std::iter::once(&current))
                        .any(|g| g.contains_name(&name));
                    if listed {
                        tracing::trace!("Prior owner '{}' already listed", owner.display_name());
                    }
                    !listed
                })
                .collect();

            if survivors.is_empty() {
                continue;
            }
            unknown.push(OwnershipGroup {
                key: GroupKey::Unknown(unknown.len() + 1),
                owners: survivors
                    .into_iter()
                    .collect::<Deduplicator>()
                    .into_entities(),
            });
        }

        groups.extend(unknown);
        groups.push(current);

        for group in &groups {
            tracing::debug!("Group {}: {} owner(s)", group.key, group.owners.len());
        }
        groups
    }
}
