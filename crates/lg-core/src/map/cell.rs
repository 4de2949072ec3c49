//! A single map cell

use serde::{Deserialize, Serialize};

use super::element::{Door, Element, ElementKind, MarkerKind};
use super::terrain::Terrain;
use crate::entity::{Actor, ActorId, Item};

/// One grid cell: a base terrain plus whatever was placed on it
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
    pub base: Terrain,
    pub actors: Vec<Actor>,
    pub items: Vec<Item>,
    pub elements: Vec<Element>,
}

impl Cell {
    pub fn new(x: i32, y: i32, base: Terrain) -> Self {
        Self {
            x,
            y,
            base,
            ..Default::default()
        }
    }

    pub fn xy(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    /// Base passable and nothing blocking on it
    pub fn is_passable(&self) -> bool {
        self.base.is_passable() && !self.elements.iter().any(Element::blocks_passage)
    }

    /// Passable with closed doors of every kind opened
    pub fn is_passable_with_doors(&self) -> bool {
        self.base.is_passable()
    }

    /// Passable and not occupied by a solid actor
    pub fn is_free(&self) -> bool {
        self.is_passable() && self.actors.iter().all(Actor::is_ethereal)
    }

    pub fn blocks_light(&self) -> bool {
        self.base.blocks_light() || self.elements.iter().any(Element::blocks_light)
    }

    pub fn has_element(&self, kind: ElementKind) -> bool {
        self.elements.iter().any(|e| e.kind() == kind)
    }

    pub fn has_door(&self) -> bool {
        self.elements.iter().any(Element::is_door)
    }

    pub fn has_marker(&self, kind: MarkerKind) -> bool {
        self.elements.iter().any(|e| e.marker() == Some(kind))
    }

    pub fn markers(&self) -> impl Iterator<Item = MarkerKind> + '_ {
        self.elements.iter().filter_map(Element::marker)
    }

    /// Add a marker unless the cell already carries one of that kind
    pub fn add_marker(&mut self, kind: MarkerKind) {
        if !self.has_marker(kind) {
            self.elements.push(Element::Marker(kind));
        }
    }

    /// Remove every marker of `kind`, returning whether any was present
    pub fn remove_marker(&mut self, kind: MarkerKind) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| e.marker() != Some(kind));
        before != self.elements.len()
    }

    /// Put a closed door here unless one is already present
    pub fn add_door(&mut self) -> bool {
        if self.has_door() {
            return false;
        }
        self.elements.push(Element::Door(Door { closed: true }));
        true
    }

    pub fn remove_actor(&mut self, id: ActorId) -> Option<Actor> {
        let idx = self.actors.iter().position(|a| a.id == id)?;
        Some(self.actors.remove(idx))
    }

    /// Character shown for this cell in ASCII dumps
    pub fn symbol(&self) -> char {
        if !self.actors.is_empty() {
            return '@';
        }
        // Markers are shown only on bare cells
        let concrete = self.elements.iter().find(|e| e.marker().is_none());
        if let Some(elem) = concrete {
            return elem.symbol();
        }
        if !self.items.is_empty() {
            return '$';
        }
        if let Some(elem) = self.elements.first() {
            return elem.symbol();
        }
        self.base.symbol()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ActorTraits;
    use crate::map::element::LeverDoor;

    fn actor(traits: ActorTraits) -> Actor {
        Actor {
            id: ActorId(1),
            name: "ghost".to_string(),
            danger: 1,
            traits,
        }
    }

    #[test]
    fn test_free_with_ethereal_actor() {
        let mut cell = Cell::new(1, 1, Terrain::Floor);
        cell.actors.push(actor(ActorTraits::ETHEREAL));
        assert!(cell.is_free());
        cell.actors.push(actor(ActorTraits::empty()));
        assert!(!cell.is_free());
        assert!(cell.is_passable());
    }

    #[test]
    fn test_lever_door_blocks() {
        let mut cell = Cell::new(0, 0, Terrain::Floor);
        cell.elements
            .push(Element::LeverDoor(LeverDoor { closed: true }));
        assert!(!cell.is_passable());
        assert!(cell.is_passable_with_doors());
        assert!(cell.blocks_light());
    }

    #[test]
    fn test_markers() {
        let mut cell = Cell::new(0, 0, Terrain::Floor);
        cell.add_marker(MarkerKind::Door);
        cell.add_marker(MarkerKind::Door);
        assert_eq!(cell.markers().count(), 1);
        assert_eq!(cell.symbol(), '+');
        assert!(cell.remove_marker(MarkerKind::Door));
        assert!(!cell.remove_marker(MarkerKind::Door));
        assert_eq!(cell.symbol(), '.');
    }

    #[test]
    fn test_add_door_once() {
        let mut cell = Cell::new(0, 0, Terrain::Floor);
        assert!(cell.add_door());
        assert!(!cell.add_door());
        assert!(cell.is_passable());
        assert!(cell.blocks_light());
    }
}
