//! Collectible animals earned by finishing study countdowns.
//!
//! Selection prefers animals the user does not own yet. Once the catalog is
//! complete, repeats are drawn weighted by [`Rarity::weight`]. The RNG is
//! injected so callers (and tests) control determinism.

mod catalog;
mod rarity;

pub use catalog::{Animal, Catalog};
pub use rarity::Rarity;

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};
use rand::distributions::{Distribution, WeightedIndex};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An animal the user owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectedAnimal {
    pub animal_id: String,
    pub rarity: Rarity,
    pub collected_at: DateTime<Utc>,
}

/// A sprite shown for the current app session only. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSprite {
    pub id: String,
    pub animal_id: String,
    pub spawned_at: DateTime<Utc>,
}

impl ActiveSprite {
    pub fn spawn(animal_id: &str, at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            animal_id: animal_id.to_string(),
            spawned_at: at,
        }
    }
}

/// Distinct ids among `collected`.
pub fn collected_ids(collected: &[CollectedAnimal]) -> HashSet<&str> {
    collected.iter().map(|c| c.animal_id.as_str()).collect()
}

/// Pick the animal to award for a finished study countdown.
///
/// Returns `None` only for an empty catalog.
pub fn pick_reward<'c, R: Rng + ?Sized>(
    catalog: &'c Catalog,
    collected: &[CollectedAnimal],
    rng: &mut R,
) -> Option<&'c Animal> {
    let owned = collected_ids(collected);
    let fresh: Vec<&Animal> = catalog
        .animals()
        .iter()
        .filter(|a| !owned.contains(a.id.as_str()))
        .collect();
    if !fresh.is_empty() {
        return fresh.choose(rng).copied();
    }

    let weights: Vec<u32> = catalog.animals().iter().map(|a| a.rarity.weight()).collect();
    match WeightedIndex::new(&weights) {
        Ok(dist) => catalog.animals().get(dist.sample(rng)),
        Err(_) => catalog.animals().choose(rng),
    }
}

/// Collected ids the user has not been shown yet.
pub fn new_arrivals<'a>(
    collected: &'a [CollectedAnimal],
    seen: &BTreeSet<String>,
) -> BTreeSet<&'a str> {
    collected
        .iter()
        .map(|c| c.animal_id.as_str())
        .filter(|id| !seen.contains(*id))
        .collect()
}

/// Owned count per rarity tier, in tier order.
pub fn rarity_breakdown(collected: &[CollectedAnimal]) -> Vec<(Rarity, usize)> {
    let mut seen = HashSet::new();
    let mut counts = [0usize; 4];
    for c in collected {
        if seen.insert(c.animal_id.as_str()) {
            counts[c.rarity as usize] += 1;
        }
    }
    Rarity::ALL.iter().copied().zip(counts).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    fn owned(ids: &[&str], catalog: &Catalog) -> Vec<CollectedAnimal> {
        ids.iter()
            .map(|id| CollectedAnimal {
                animal_id: id.to_string(),
                rarity: catalog.get(id).unwrap().rarity,
                collected_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn prefers_uncollected_animals() {
        let catalog = Catalog::builtin();
        let all: Vec<&str> = catalog.animals().iter().map(|a| a.id.as_str()).collect();
        let (missing, have) = all.split_last().unwrap();
        let collected = owned(have, &catalog);
        let mut rng = Pcg64::seed_from_u64(7);
        for _ in 0..20 {
            let pick = pick_reward(&catalog, &collected, &mut rng).unwrap();
            assert_eq!(pick.id, *missing);
        }
    }

    #[test]
    fn repeats_once_catalog_is_complete() {
        let catalog = Catalog::builtin();
        let all: Vec<&str> = catalog.animals().iter().map(|a| a.id.as_str()).collect();
        let collected = owned(&all, &catalog);
        let mut rng = Pcg64::seed_from_u64(42);
        let mut commons = 0;
        for _ in 0..500 {
            let pick = pick_reward(&catalog, &collected, &mut rng).unwrap();
            if pick.rarity == Rarity::Common {
                commons += 1;
            }
        }
        // Commons carry most of the weight.
        assert!(commons > 250, "commons = {commons}");
    }

    #[test]
    fn empty_catalog_awards_nothing() {
        let catalog = Catalog::new(vec![]);
        let mut rng = Pcg64::seed_from_u64(1);
        assert!(pick_reward(&catalog, &[], &mut rng).is_none());
    }

    #[test]
    fn new_arrivals_excludes_seen() {
        let catalog = Catalog::builtin();
        let collected = owned(&["cat", "fox", "cat"], &catalog);
        let seen: BTreeSet<String> = ["cat".to_string()].into_iter().collect();
        let fresh = new_arrivals(&collected, &seen);
        assert_eq!(fresh.into_iter().collect::<Vec<_>>(), vec!["fox"]);
    }

    #[test]
    fn breakdown_counts_distinct_animals() {
        let catalog = Catalog::builtin();
        let collected = owned(&["cat", "cat", "dog", "panda"], &catalog);
        let breakdown = rarity_breakdown(&collected);
        assert_eq!(breakdown[0], (Rarity::Common, 2));
        assert_eq!(breakdown[2], (Rarity::Epic, 1));
    }
}
