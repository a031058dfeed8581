use serde::{Deserialize, Serialize};

use super::rarity::Rarity;

/// Immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animal {
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
}

/// The roster of animals that can be earned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    animals: Vec<Animal>,
}

const BUILTIN: &[(&str, &str, Rarity)] = &[
    ("cat", "Cat", Rarity::Common),
    ("dog", "Dog", Rarity::Common),
    ("rabbit", "Rabbit", Rarity::Common),
    ("hamster", "Hamster", Rarity::Common),
    ("duck", "Duck", Rarity::Common),
    ("frog", "Frog", Rarity::Common),
    ("chick", "Chick", Rarity::Common),
    ("fox", "Fox", Rarity::Rare),
    ("owl", "Owl", Rarity::Rare),
    ("penguin", "Penguin", Rarity::Rare),
    ("koala", "Koala", Rarity::Rare),
    ("panda", "Panda", Rarity::Epic),
    ("red_panda", "Red Panda", Rarity::Epic),
    ("axolotl", "Axolotl", Rarity::Epic),
    ("snow_leopard", "Snow Leopard", Rarity::Legendary),
    ("white_tiger", "White Tiger", Rarity::Legendary),
];

impl Catalog {
    pub fn new(animals: Vec<Animal>) -> Self {
        Self { animals }
    }

    /// Animals shipped with the app. Ids are stable; they are persisted.
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN
                .iter()
                .map(|(id, name, rarity)| Animal {
                    id: (*id).to_string(),
                    name: (*name).to_string(),
                    rarity: *rarity,
                })
                .collect(),
        )
    }

    pub fn animals(&self) -> &[Animal] {
        &self.animals
    }

    pub fn get(&self, id: &str) -> Option<&Animal> {
        self.animals.iter().find(|a| a.id == id)
    }

    pub fn by_rarity(&self, rarity: Rarity) -> impl Iterator<Item = &Animal> {
        self.animals.iter().filter(move |a| a.rarity == rarity)
    }

    pub fn len(&self) -> usize {
        self.animals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animals.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
