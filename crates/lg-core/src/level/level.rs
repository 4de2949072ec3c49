//! A generated level: one map plus its extras

use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

use super::extras::LevelExtras;
use super::stairs::{Stairs, StairsDir};
use crate::Coord;
use crate::entity::{Actor, ActorId, Item};
use crate::map::{CellMap, Element, ElementKind, MarkerKind};

static NEXT_LEVEL_ID: AtomicU32 = AtomicU32::new(1);

/// Unique level identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelId(pub u32);

impl LevelId {
    fn next() -> Self {
        LevelId(NEXT_LEVEL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A level owns exactly one map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    id: LevelId,
    map: CellMap,
    extras: LevelExtras,
}

impl Level {
    pub fn new(map: CellMap) -> Self {
        Self {
            id: LevelId::next(),
            map,
            extras: LevelExtras::default(),
        }
    }

    pub fn id(&self) -> LevelId {
        self.id
    }

    pub fn map(&self) -> &CellMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut CellMap {
        &mut self.map
    }

    /// Replace the map, handing back the previous one
    pub fn set_map(&mut self, map: CellMap) -> CellMap {
        std::mem::replace(&mut self.map, map)
    }

    pub fn cols(&self) -> i32 {
        self.map.cols()
    }

    pub fn rows(&self) -> i32 {
        self.map.rows()
    }

    pub fn extras(&self) -> &LevelExtras {
        &self.extras
    }

    pub fn extras_mut(&mut self) -> &mut LevelExtras {
        &mut self.extras
    }

    pub fn set_extras(&mut self, extras: LevelExtras) {
        self.extras = extras;
    }

    /// Place an element; fails outside the map
    pub fn add_element(&mut self, elem: Element, x: i32, y: i32) -> bool {
        match self.map.get_mut(x, y) {
            Some(cell) => {
                cell.elements.push(elem);
                true
            }
            None => false,
        }
    }

    /// Remove all elements of `kind` at a position, returning how many went
    pub fn remove_elements(&mut self, kind: ElementKind, x: i32, y: i32) -> usize {
        let Some(cell) = self.map.get_mut(x, y) else {
            return 0;
        };
        let before = cell.elements.len();
        cell.elements.retain(|e| e.kind() != kind);
        before - cell.elements.len()
    }

    /// Add stairs owned by this level
    pub fn add_stairs(&mut self, dir: StairsDir, x: i32, y: i32) -> bool {
        let stairs = Stairs::new(dir, self.id, (x, y));
        self.add_element(Element::Stairs(stairs), x, y)
    }

    pub fn stairs_at(&self, x: i32, y: i32) -> Option<&Stairs> {
        self.map.get(x, y)?.elements.iter().find_map(|e| match e {
            Element::Stairs(s) => Some(s),
            _ => None,
        })
    }

    /// Place an actor. Solid actors need a free cell.
    pub fn add_actor(&mut self, actor: Actor, x: i32, y: i32) -> bool {
        let Some(cell) = self.map.get_mut(x, y) else {
            return false;
        };
        let fits = if actor.is_ethereal() {
            cell.is_passable()
        } else {
            cell.is_free()
        };
        // Flyers may hover over chasms
        let fits = fits || (actor.is_flying() && cell.base.is_chasm() && cell.actors.is_empty());
        if !fits {
            return false;
        }
        cell.actors.push(actor);
        true
    }

    pub fn add_item(&mut self, item: Item, x: i32, y: i32) -> bool {
        match self.map.get_mut(x, y) {
            Some(cell) if cell.is_passable() => {
                cell.items.push(item);
                true
            }
            _ => false,
        }
    }

    pub fn remove_actor(&mut self, id: ActorId) -> Option<Actor> {
        self.map.iter_mut().find_map(|cell| cell.remove_actor(id))
    }

    /// All actors with their positions
    pub fn actors(&self) -> Vec<(Coord, &Actor)> {
        self.map
            .iter()
            .flat_map(|c| c.actors.iter().map(move |a| (c.xy(), a)))
            .collect()
    }

    /// All items with their positions
    pub fn items(&self) -> Vec<(Coord, &Item)> {
        self.map
            .iter()
            .flat_map(|c| c.items.iter().map(move |i| (c.xy(), i)))
            .collect()
    }

    pub fn free_cells(&self) -> Vec<Coord> {
        self.map.free_cells()
    }

    /// Free cells on the outermost ring of the map
    pub fn free_edge_cells(&self) -> Vec<Coord> {
        self.map
            .coords_where(|c| c.is_free() && self.map.is_edge(c.x, c.y))
    }

    pub fn cells_with_marker(&self, kind: MarkerKind) -> Vec<Coord> {
        self.map.coords_where(|c| c.has_marker(kind))
    }

    pub fn cells_with_element(&self, kind: ElementKind) -> Vec<Coord> {
        self.map.coords_where(|c| c.has_element(kind))
    }

    /// Add a marker at a position
    pub fn add_marker(&mut self, kind: MarkerKind, x: i32, y: i32) -> bool {
        match self.map.get_mut(x, y) {
            Some(cell) => {
                cell.add_marker(kind);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{ActorTraits, ItemKind};
    use crate::map::Terrain;

    fn actor(id: u32, traits: ActorTraits) -> Actor {
        Actor {
            id: ActorId(id),
            name: "orc".to_string(),
            danger: 2,
            traits,
        }
    }

    #[test]
    fn test_unique_ids() {
        let a = Level::new(CellMap::new(3, 3, Terrain::Floor));
        let b = Level::new(CellMap::new(3, 3, Terrain::Floor));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_set_map_returns_old() {
        let mut level = Level::new(CellMap::new(3, 3, Terrain::Floor));
        let old = level.set_map(CellMap::new(5, 4, Terrain::Wall));
        assert_eq!(old.cols(), 3);
        assert_eq!(level.cols(), 5);
        assert_eq!(level.rows(), 4);
    }

    #[test]
    fn test_actor_placement() {
        let mut level = Level::new(CellMap::from_ascii("#..#"));
        assert!(level.add_actor(actor(1, ActorTraits::empty()), 1, 0));
        assert!(!level.add_actor(actor(2, ActorTraits::empty()), 1, 0));
        assert!(level.add_actor(actor(3, ActorTraits::ETHEREAL), 1, 0));
        assert!(!level.add_actor(actor(4, ActorTraits::empty()), 0, 0));
        assert!(!level.add_actor(actor(5, ActorTraits::empty()), 9, 0));
        assert_eq!(level.actors().len(), 2);
        assert!(level.remove_actor(ActorId(1)).is_some());
        assert_eq!(level.actors().len(), 1);
    }

    #[test]
    fn test_items_and_elements() {
        let mut level = Level::new(CellMap::from_ascii("#..#"));
        let gold = Item {
            name: "gold".to_string(),
            kind: ItemKind::Gold,
            value: 10,
            count: 10,
        };
        assert!(level.add_item(gold.clone(), 2, 0));
        assert!(!level.add_item(gold, 0, 0));
        assert_eq!(level.items().len(), 1);

        level.add_marker(MarkerKind::Loot, 1, 0);
        level.add_marker(MarkerKind::Loot, 2, 0);
        assert_eq!(level.cells_with_marker(MarkerKind::Loot), vec![(1, 0), (2, 0)]);
        assert_eq!(level.remove_elements(ElementKind::Marker, 1, 0), 1);
        assert_eq!(level.cells_with_element(ElementKind::Marker), vec![(2, 0)]);
    }

    #[test]
    fn test_free_edge_cells() {
        let level = Level::new(CellMap::from_ascii("#.#\n...\n#.#"));
        let edge = level.free_edge_cells();
        assert_eq!(edge.len(), 4);
        assert!(!edge.contains(&(1, 1)));
    }
}
