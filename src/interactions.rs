//! Grouping of raw `(entity, item, rating)` records into per-entity item lists.
//!
//! [`group_by_entity`] keys groups by entity id, so record order does not
//! matter. [`group_contiguous`] keeps the streaming contract of pre-grouped
//! logs but rejects an entity that reappears after another one instead of
//! silently starting a second list for it.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One observed interaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interaction<E, I> {
    pub entity: E,
    pub item: I,
    pub rating: f64,
}

impl<E, I> Interaction<E, I> {
    pub fn new(entity: E, item: I, rating: f64) -> Self {
        Self { entity, item, rating }
    }
}

/// Items of one entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityItems<E, I> {
    pub entity: E,
    /// Every item the entity interacted with, in record order.
    pub items: Vec<I>,
    /// Items rated at or above the threshold.
    pub rated: Vec<I>,
}

impl<E, I: Clone> EntityItems<E, I> {
    fn new(entity: E) -> Self {
        Self { entity, items: Vec::new(), rated: Vec::new() }
    }

    fn push(&mut self, item: I, rating: f64, threshold: f64) {
        if rating >= threshold {
            self.rated.push(item.clone());
        }
        self.items.push(item);
    }
}

/// Group records by entity id. Groups come out in order of first appearance.
pub fn group_by_entity<E, I>(
    records: impl IntoIterator<Item = Interaction<E, I>>,
    threshold: f64,
) -> Vec<EntityItems<E, I>>
where
    E: Eq + Hash + Clone,
    I: Clone,
{
    let mut slots: HashMap<E, usize> = HashMap::new();
    let mut groups: Vec<EntityItems<E, I>> = Vec::new();
    let mut count = 0usize;

    for record in records {
        count += 1;
        let slot = match slots.entry(record.entity) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                let slot = groups.len();
                groups.push(EntityItems::new(e.key().clone()));
                e.insert(slot);
                slot
            }
        };
        groups[slot].push(record.item, record.rating, threshold);
    }

    info!("Grouped {} records into {} entities", count, groups.len());
    groups
}

/// Group a stream whose records are contiguous per entity.
///
/// # Errors
///
/// `Error::FragmentedEntity` when an entity shows up again after a different one.
pub fn group_contiguous<E, I>(
    records: impl IntoIterator<Item = Interaction<E, I>>,
    threshold: f64,
) -> Result<Vec<EntityItems<E, I>>>
where
    E: Eq + Hash + Clone + Debug,
    I: Clone,
{
    let mut seen: HashSet<E> = HashSet::new();
    let mut groups: Vec<EntityItems<E, I>> = Vec::new();

    for (position, record) in records.into_iter().enumerate() {
        let same_as_last = groups.last().is_some_and(|g| g.entity == record.entity);
        if !same_as_last {
            if seen.contains(&record.entity) {
                return Err(Error::FragmentedEntity {
                    entity: format!("{:?}", record.entity),
                    position,
                });
            }
            seen.insert(record.entity.clone());
            groups.push(EntityItems::new(record.entity.clone()));
        }
        if let Some(group) = groups.last_mut() {
            group.push(record.item, record.rating, threshold);
        }
    }

    debug!("Contiguous grouping produced {} entities", groups.len());
    Ok(groups)
}

/// Item lists of grouped entities, either all items or only the rated ones.
pub fn item_sets<E, I: Clone>(groups: &[EntityItems<E, I>], rated_only: bool) -> Vec<Vec<I>> {
    groups
        .iter()
        .map(|g| if rated_only { g.rated.clone() } else { g.items.clone() })
        .collect()
}
