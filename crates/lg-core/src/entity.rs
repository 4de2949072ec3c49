//! Actors, items and the factory that creates them
//!
//! The generators never look inside actors or items beyond `value`,
//! `danger` and a few placement-relevant traits. Creating them is delegated
//! to an [`EntityFactory`], which a game plugs in from its own data tables.
//! [`TableFactory`] is a small built-in table used by default and in tests.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::GameRng;

bitflags! {
    /// Placement-relevant actor traits
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct ActorTraits: u8 {
        /// Does not occupy its cell (other actors may share it)
        const ETHEREAL = 0x01;
        /// Can cross chasms and water
        const FLYING = 0x02;
        /// Scenery such as fire; never counted as a monster
        const AMBIENT = 0x04;
        /// Placed by population as a guardian
        const GUARDIAN = 0x08;
    }
}

impl Serialize for ActorTraits {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.bits().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ActorTraits {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let bits = u8::deserialize(deserializer)?;
        Ok(ActorTraits::from_bits_truncate(bits))
    }
}

/// Actor identifier assigned by the factory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// A placeable actor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub name: String,
    pub danger: u32,
    pub traits: ActorTraits,
}

impl Actor {
    pub fn is_ethereal(&self) -> bool {
        self.traits.contains(ActorTraits::ETHEREAL)
    }

    pub fn is_flying(&self) -> bool {
        self.traits.contains(ActorTraits::FLYING)
    }
}

/// Actor table row consulted by random actor filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorTemplate {
    pub name: String,
    pub danger: u32,
    pub traits: ActorTraits,
}

/// Item kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ItemKind {
    Gold,
    Weapon,
    Armour,
    Potion,
    Scroll,
    Gem,
    Misc,
}

/// A placeable item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    pub kind: ItemKind,
    /// Value of the whole stack
    pub value: u32,
    pub count: u32,
}

/// Item table row consulted by item filters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub name: String,
    pub kind: ItemKind,
    pub value: u32,
}

/// Request for random items
pub struct ItemConf<'a> {
    /// Only templates accepted by this predicate are eligible
    pub item: &'a dyn Fn(&ItemTemplate) -> bool,
    /// Templates worth more than this are never picked
    pub max_value: u32,
    pub n_items: usize,
}

/// Request for gold piles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoldConf {
    pub n_gold: usize,
    /// Wealth level; higher levels give larger piles
    pub n_level: u32,
    pub max_value: u32,
}

/// Creates actors and items for the generators
pub trait EntityFactory {
    /// Create an actor by its table name
    fn create_actor(&mut self, name: &str) -> Option<Actor>;

    /// Create a random actor among the templates accepted by `filter`
    fn create_random_actor(
        &mut self,
        rng: &mut GameRng,
        filter: &dyn Fn(&ActorTemplate) -> bool,
    ) -> Option<Actor>;

    /// Generate up to `conf.n_items` items
    fn generate_items(&mut self, rng: &mut GameRng, conf: &ItemConf<'_>) -> Vec<Item>;

    /// Generate gold piles
    fn generate_gold(&mut self, rng: &mut GameRng, conf: &GoldConf) -> Vec<Item>;
}

/// Table-driven factory
#[derive(Debug, Clone)]
pub struct TableFactory {
    actors: Vec<ActorTemplate>,
    items: Vec<ItemTemplate>,
    next_id: u32,
}

const ACTOR_TABLE: &[(&str, u32, u8)] = &[
    ("fire", 0, 0x04),
    ("rat", 1, 0),
    ("bat", 1, 0x02),
    ("goblin", 2, 0),
    ("kobold", 2, 0),
    ("cave spider", 3, 0),
    ("wolf", 3, 0),
    ("skeleton", 4, 0),
    ("orc warrior", 4, 0),
    ("ghost", 5, 0x03),
    ("ogre", 6, 0),
    ("wyvern", 7, 0x02),
    ("troll", 8, 0),
    ("wraith", 9, 0x03),
    ("dragon whelp", 10, 0x02),
    ("vampire bat", 11, 0x02),
    ("winged demon", 12, 0x02),
    ("lich", 14, 0),
];

// Consecutive values never more than double, so every `[v, 2v]` window from
// 5 up to 1600 contains an entry.
const ITEM_TABLE: &[(&str, ItemKind, u32)] = &[
    ("torch", ItemKind::Misc, 5),
    ("arrows", ItemKind::Weapon, 8),
    ("dagger", ItemKind::Weapon, 12),
    ("healing potion", ItemKind::Potion, 18),
    ("leather armour", ItemKind::Armour, 25),
    ("scroll of light", ItemKind::Scroll, 35),
    ("short sword", ItemKind::Weapon, 50),
    ("chain mail", ItemKind::Armour, 70),
    ("potion of strength", ItemKind::Potion, 100),
    ("longsword", ItemKind::Weapon, 140),
    ("amethyst", ItemKind::Gem, 200),
    ("plate armour", ItemKind::Armour, 280),
    ("scroll of teleport", ItemKind::Scroll, 400),
    ("runed axe", ItemKind::Weapon, 560),
    ("ruby", ItemKind::Gem, 800),
    ("mithril coat", ItemKind::Armour, 1100),
    ("crown", ItemKind::Misc, 1600),
    ("diamond", ItemKind::Gem, 2200),
    ("dragon scale mail", ItemKind::Armour, 3200),
];

impl Default for TableFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl TableFactory {
    /// Factory over the built-in tables
    pub fn new() -> Self {
        let actors = ACTOR_TABLE
            .iter()
            .map(|(name, danger, bits)| ActorTemplate {
                name: name.to_string(),
                danger: *danger,
                traits: ActorTraits::from_bits_truncate(*bits),
            })
            .collect();
        let items = ITEM_TABLE
            .iter()
            .map(|(name, kind, value)| ItemTemplate {
                name: name.to_string(),
                kind: *kind,
                value: *value,
            })
            .collect();
        Self::with_tables(actors, items)
    }

    /// Factory over caller-supplied tables
    pub fn with_tables(actors: Vec<ActorTemplate>, items: Vec<ItemTemplate>) -> Self {
        Self {
            actors,
            items,
            next_id: 1,
        }
    }

    fn instantiate(&mut self, template: &ActorTemplate) -> Actor {
        let id = ActorId(self.next_id);
        self.next_id += 1;
        Actor {
            id,
            name: template.name.clone(),
            danger: template.danger,
            traits: template.traits,
        }
    }
}

impl EntityFactory for TableFactory {
    fn create_actor(&mut self, name: &str) -> Option<Actor> {
        let template = self.actors.iter().find(|a| a.name == name)?.clone();
        Some(self.instantiate(&template))
    }

    fn create_random_actor(
        &mut self,
        rng: &mut GameRng,
        filter: &dyn Fn(&ActorTemplate) -> bool,
    ) -> Option<Actor> {
        let candidates: Vec<ActorTemplate> = self
            .actors
            .iter()
            .filter(|a| !a.traits.contains(ActorTraits::AMBIENT) && filter(a))
            .cloned()
            .collect();
        let template = rng.choose(&candidates)?.clone();
        Some(self.instantiate(&template))
    }

    fn generate_items(&mut self, rng: &mut GameRng, conf: &ItemConf<'_>) -> Vec<Item> {
        let candidates: Vec<&ItemTemplate> = self
            .items
            .iter()
            .filter(|t| t.value <= conf.max_value && (conf.item)(t))
            .collect();
        if candidates.is_empty() {
            return Vec::new();
        }
        (0..conf.n_items)
            .filter_map(|_| rng.choose(&candidates).copied())
            .map(|t| Item {
                name: t.name.clone(),
                kind: t.kind,
                value: t.value,
                count: 1,
            })
            .collect()
    }

    fn generate_gold(&mut self, rng: &mut GameRng, conf: &GoldConf) -> Vec<Item> {
        (0..conf.n_gold)
            .map(|_| {
                let coins = (conf.n_level.max(1) * rng.rnd(20)).min(conf.max_value.max(1));
                Item {
                    name: "gold coins".to_string(),
                    kind: ItemKind::Gold,
                    value: coins,
                    count: coins,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_actor_by_name() {
        let mut factory = TableFactory::new();
        let fire = factory.create_actor("fire").unwrap();
        assert!(fire.traits.contains(ActorTraits::AMBIENT));
        let rat = factory.create_actor("rat").unwrap();
        assert_ne!(fire.id, rat.id);
        assert!(factory.create_actor("no such thing").is_none());
    }

    #[test]
    fn test_random_actor_respects_filter() {
        let mut factory = TableFactory::new();
        let mut rng = GameRng::new(1);
        for _ in 0..100 {
            let actor = factory
                .create_random_actor(&mut rng, &|t| t.danger <= 3)
                .unwrap();
            assert!(actor.danger <= 3);
            assert_ne!(actor.name, "fire");
        }
        assert!(factory
            .create_random_actor(&mut rng, &|t| t.danger > 1000)
            .is_none());
    }

    #[test]
    fn test_flying_filter() {
        let mut factory = TableFactory::new();
        let mut rng = GameRng::new(2);
        for _ in 0..50 {
            let actor = factory
                .create_random_actor(&mut rng, &|t| t.traits.contains(ActorTraits::FLYING))
                .unwrap();
            assert!(actor.is_flying());
        }
    }

    #[test]
    fn test_generate_items_budget() {
        let mut factory = TableFactory::new();
        let mut rng = GameRng::new(3);
        let filter = |t: &ItemTemplate| t.value >= 100;
        let items = factory.generate_items(
            &mut rng,
            &ItemConf {
                item: &filter,
                max_value: 200,
                n_items: 5,
            },
        );
        assert_eq!(items.len(), 5);
        assert!(items.iter().all(|i| (100..=200).contains(&i.value)));
    }

    #[test]
    fn test_item_table_has_no_gaps() {
        for pair in ITEM_TABLE.windows(2) {
            assert!(pair[1].2 <= 2 * pair[0].2, "gap after {}", pair[0].0);
        }
    }

    #[test]
    fn test_gold_is_capped() {
        let mut factory = TableFactory::new();
        let mut rng = GameRng::new(4);
        let gold = factory.generate_gold(
            &mut rng,
            &GoldConf {
                n_gold: 3,
                n_level: 50,
                max_value: 30,
            },
        );
        assert_eq!(gold.len(), 3);
        assert!(gold.iter().all(|g| g.kind == ItemKind::Gold && g.value <= 30));
    }
}
