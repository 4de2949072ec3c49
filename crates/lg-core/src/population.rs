//! Placing actors and items on a generated level
//!
//! Every function here is best effort: when nothing can be placed the
//! result is simply zero (or `false`), never an error.

use crate::entity::{ActorTemplate, ActorTraits, EntityFactory, GoldConf, ItemConf};
use crate::geom::{BBox, box_around};
use crate::level::{Level, Room};
use crate::map::Cell;
use crate::{Coord, DEFAULT_MAX_DANGER, GUARDIAN_DANGER_BONUS, GameRng};

/// How far from the requested point a guardian or loot item may land
const PLACEMENT_RADIUS: i32 = 2;

/// Chance for one storeroom of a castle to also hold a gold stash
const GOLD_STASH_CHANCE: f64 = 0.1;

/// Settings for generic population
pub struct PopulateConf<'a> {
    pub max_danger: u32,
    pub max_value: u32,
    pub actors_per_room: usize,
    pub items_per_room: usize,
    /// Actor selection; `danger <= max_danger` when unset
    pub actor_filter: Option<&'a dyn Fn(&ActorTemplate) -> bool>,
}

impl Default for PopulateConf<'_> {
    fn default() -> Self {
        Self {
            max_danger: DEFAULT_MAX_DANGER,
            max_value: 100,
            actors_per_room: 1,
            items_per_room: 1,
            actor_filter: None,
        }
    }
}

impl PopulateConf<'_> {
    fn accepts(&self, t: &ActorTemplate) -> bool {
        match self.actor_filter {
            Some(f) => f(t),
            None => t.danger <= self.max_danger,
        }
    }
}

/// `point` itself, then the rings around it out to `radius`
fn cells_near(point: Coord, radius: i32) -> Vec<Coord> {
    let mut out = vec![point];
    for r in 1..=radius {
        out.extend(
            box_around(point.0, point.1, r, false)
                .into_iter()
                .filter(|&(x, y)| (x - point.0).abs() == r || (y - point.1).abs() == r),
        );
    }
    out
}

fn first_near(level: &Level, point: Coord, pred: impl Fn(&Cell) -> bool) -> Option<Coord> {
    cells_near(point, PLACEMENT_RADIUS)
        .into_iter()
        .find(|&(x, y)| level.map().get(x, y).is_some_and(&pred))
}

/// Place a guardian chosen by `filter` at or next to `point`
pub fn add_guardian_with(
    level: &mut Level,
    factory: &mut dyn EntityFactory,
    point: Coord,
    filter: &dyn Fn(&ActorTemplate) -> bool,
    rng: &mut GameRng,
) -> bool {
    let Some((x, y)) = first_near(level, point, Cell::is_free) else {
        return false;
    };
    let Some(mut actor) = factory.create_random_actor(rng, filter) else {
        return false;
    };
    actor.traits |= ActorTraits::GUARDIAN;
    level.add_actor(actor, x, y)
}

/// Place one random actor with `danger <= max_danger` at or next to `point`
pub fn add_point_guardian(
    level: &mut Level,
    factory: &mut dyn EntityFactory,
    point: Coord,
    max_danger: u32,
    rng: &mut GameRng,
) -> bool {
    add_guardian_with(level, factory, point, &|t| t.danger <= max_danger, rng)
}

/// Place one item worth between `max_value` and twice that near `point`.
///
/// Returns whether the item was placed, so callers can guard it only when
/// there is something to guard.
pub fn add_main_loot(
    level: &mut Level,
    factory: &mut dyn EntityFactory,
    point: Coord,
    max_value: u32,
    rng: &mut GameRng,
) -> bool {
    let Some((x, y)) = first_near(level, point, Cell::is_passable) else {
        return false;
    };
    let conf = ItemConf {
        item: &|t| t.value >= max_value,
        max_value: max_value.saturating_mul(2),
        n_items: 1,
    };
    match factory.generate_items(rng, &conf).pop() {
        Some(item) => level.add_item(item, x, y),
        None => false,
    }
}

fn random_free_in(level: &Level, bbox: &BBox, rng: &mut GameRng) -> Option<Coord> {
    let free: Vec<Coord> = bbox
        .coords()
        .into_iter()
        .filter(|&(x, y)| level.map().is_free(x, y))
        .collect();
    rng.choose(&free).copied()
}

fn add_items_in(
    level: &mut Level,
    factory: &mut dyn EntityFactory,
    bbox: &BBox,
    conf: &ItemConf<'_>,
    rng: &mut GameRng,
) -> usize {
    let mut n = 0;
    for item in factory.generate_items(rng, conf) {
        if let Some((x, y)) = random_free_in(level, bbox, rng) {
            if level.add_item(item, x, y) {
                n += 1;
            }
        }
    }
    n
}

fn add_actors_in(
    level: &mut Level,
    factory: &mut dyn EntityFactory,
    bbox: &BBox,
    conf: &PopulateConf<'_>,
    rng: &mut GameRng,
) -> usize {
    let mut n = 0;
    for _ in 0..conf.actors_per_room {
        let Some((x, y)) = random_free_in(level, bbox, rng) else {
            break;
        };
        let Some(actor) = factory.create_random_actor(rng, &|t| conf.accepts(t)) else {
            break;
        };
        if level.add_actor(actor, x, y) {
            n += 1;
        }
    }
    n
}

/// Put actors and items into the interior of every room.
///
/// Returns the number of entities placed.
pub fn populate_level(
    level: &mut Level,
    factory: &mut dyn EntityFactory,
    rooms: &[Room],
    conf: &PopulateConf<'_>,
    rng: &mut GameRng,
) -> usize {
    let items = ItemConf {
        item: &|_| true,
        max_value: conf.max_value,
        n_items: conf.items_per_room,
    };
    let mut n = 0;
    for room in rooms {
        let inner = room.inner();
        n += add_actors_in(level, factory, &inner, conf, rng);
        n += add_items_in(level, factory, &inner, &items, rng);
    }
    log::debug!("populated {} rooms with {} entities", rooms.len(), n);
    n
}

/// Put actors and items around a single point
pub fn populate_point(
    level: &mut Level,
    factory: &mut dyn EntityFactory,
    point: Coord,
    conf: &PopulateConf<'_>,
    rng: &mut GameRng,
) -> usize {
    let area = BBox::new(
        point.0 - PLACEMENT_RADIUS,
        point.1 - PLACEMENT_RADIUS,
        point.0 + PLACEMENT_RADIUS,
        point.1 + PLACEMENT_RADIUS,
    );
    let items = ItemConf {
        item: &|_| true,
        max_value: conf.max_value,
        n_items: conf.items_per_room,
    };
    add_actors_in(level, factory, &area, conf, rng) + add_items_in(level, factory, &area, &items, rng)
}

/// Gold piles sized by a random wealth level, scattered inside `bbox`
pub fn add_gold_stash(
    level: &mut Level,
    factory: &mut dyn EntityFactory,
    bbox: &BBox,
    max_value: u32,
    rng: &mut GameRng,
) -> usize {
    let wealth = rng.get_uniform_int(1, 5) as u32;
    let gold = GoldConf {
        n_gold: wealth as usize,
        n_level: wealth,
        max_value,
    };
    let mut n = 0;
    for pile in factory.generate_gold(rng, &gold) {
        if let Some((x, y)) = random_free_in(level, bbox, rng) {
            if level.add_item(pile, x, y) {
                n += 1;
            }
        }
    }
    log::debug!("gold stash of wealth {}: {} piles", wealth, n);
    n
}

/// Castle population.
///
/// Every storeroom gets one valuable item and a guardian, one storeroom may
/// also get a gold stash, a single item goes into one random plain room,
/// and one storeroom becomes the main loot room with a stronger guardian.
/// The chosen main loot room is recorded in the castle extras.
pub fn populate_castle(
    level: &mut Level,
    factory: &mut dyn EntityFactory,
    max_value: u32,
    max_danger: u32,
    rng: &mut GameRng,
) -> usize {
    let Some(castle) = level.extras().castle() else {
        return 0;
    };
    let storerooms = castle.storerooms.clone();
    let rooms = castle.rooms.clone();
    let mut n = 0;

    let valuable = ItemConf {
        item: &|t| t.value >= max_value,
        max_value: max_value.saturating_mul(2),
        n_items: 1,
    };
    for room in &storerooms {
        n += add_items_in(level, factory, &room.inner(), &valuable, rng);
        if add_point_guardian(level, factory, room.center(), max_danger, rng) {
            n += 1;
        }
    }

    if !storerooms.is_empty() && rng.get_uniform() < GOLD_STASH_CHANCE {
        let i = rng.rn2(storerooms.len() as u32) as usize;
        n += add_gold_stash(level, factory, &storerooms[i].inner(), max_value, rng);
    }

    if let Some(room) = rng.choose(&rooms) {
        let any = ItemConf {
            item: &|_| true,
            max_value,
            n_items: 1,
        };
        n += add_items_in(level, factory, &room.inner(), &any, rng);
    }

    if !storerooms.is_empty() {
        let main = rng.rn2(storerooms.len() as u32) as usize;
        let center = storerooms[main].center();
        if add_main_loot(level, factory, center, max_value, rng) {
            n += 1;
            if let crate::level::ExtrasKind::Castle(c) = &mut level.extras_mut().kind {
                c.main_loot_room = Some(main);
            }
            let boss = max_danger + GUARDIAN_DANGER_BONUS;
            if add_point_guardian(level, factory, center, boss, rng) {
                n += 1;
            }
        }
    }
    log::debug!("castle population placed {} entities", n);
    n
}
