//! A* shortest paths on the grid
//!
//! Every function returns the full path including both end points, or an
//! empty vector when the target cannot be reached. Callers treat empty as
//! "no path" and apply their own fallback.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::Coord;
use crate::geom::BBox;
use crate::map::{Cell, CellMap};

/// Movement topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Topology {
    /// Orthogonal steps only
    Four,
    /// Orthogonal and diagonal steps
    #[default]
    Eight,
}

impl Topology {
    fn dirs(self) -> &'static [(i32, i32)] {
        match self {
            Topology::Four => &[(0, -1), (1, 0), (0, 1), (-1, 0)],
            Topology::Eight => &lg_rng::DIRS_8,
        }
    }

    /// Admissible distance estimate for this topology
    pub fn distance(self, a: Coord, b: Coord) -> i32 {
        let dx = (a.0 - b.0).abs();
        let dy = (a.1 - b.1).abs();
        match self {
            Topology::Four => dx + dy,
            Topology::Eight => dx.max(dy),
        }
    }
}

/// A* from `from` to `to`. `passable` is consulted for every cell entered.
pub fn shortest_path(
    from: Coord,
    to: Coord,
    topology: Topology,
    passable: impl Fn(i32, i32) -> bool,
) -> Vec<Coord> {
    if from == to {
        return vec![from];
    }
    let mut open = BinaryHeap::new();
    let mut came_from: HashMap<Coord, Coord> = HashMap::new();
    let mut cost: HashMap<Coord, i32> = HashMap::new();
    // Insertion counter keeps tie-breaking deterministic
    let mut counter: u64 = 0;

    cost.insert(from, 0);
    open.push(Reverse((topology.distance(from, to), 0u64, from)));

    while let Some(Reverse((_, _, current))) = open.pop() {
        if current == to {
            return rebuild(&came_from, from, to);
        }
        let g = cost.get(&current).copied().unwrap_or(i32::MAX);
        for (dx, dy) in topology.dirs() {
            let next = (current.0 + dx, current.1 + dy);
            if !passable(next.0, next.1) {
                continue;
            }
            let tentative = g + 1;
            if cost.get(&next).is_some_and(|&c| c <= tentative) {
                continue;
            }
            cost.insert(next, tentative);
            came_from.insert(next, current);
            counter += 1;
            open.push(Reverse((tentative + topology.distance(next, to), counter, next)));
        }
    }
    Vec::new()
}

fn rebuild(came_from: &HashMap<Coord, Coord>, from: Coord, to: Coord) -> Vec<Coord> {
    let mut path = vec![to];
    let mut cur = to;
    while cur != from {
        match came_from.get(&cur) {
            Some(&prev) => {
                path.push(prev);
                cur = prev;
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}

/// Path ignoring terrain, confined to the box spanned by the end points
pub fn grid_path(from: Coord, to: Coord, topology: Topology) -> Vec<Coord> {
    let span = BBox::new(from.0, from.1, to.0, to.1);
    shortest_path(from, to, topology, |x, y| span.contains(x, y))
}

/// Path through passable cells
pub fn shortest_passable_path(map: &CellMap, from: Coord, to: Coord) -> Vec<Coord> {
    shortest_path(from, to, Topology::Eight, |x, y| map.is_passable(x, y))
}

/// Path through passable cells, treating closed doors of every kind as open
pub fn shortest_passable_path_with_doors(map: &CellMap, from: Coord, to: Coord) -> Vec<Coord> {
    shortest_path(from, to, Topology::Eight, |x, y| {
        map.get(x, y).is_some_and(Cell::is_passable_with_doors)
    })
}

/// Path where every in-bounds cell counts as passable (walls included)
pub fn path_through_walls(map: &CellMap, from: Coord, to: Coord) -> Vec<Coord> {
    shortest_path(from, to, Topology::Four, |x, y| map.has_xy(x, y))
}

/// Cell filter usable with [`min_weight_or_shortest`]
pub type CellFilter<'a> = &'a dyn Fn(&CellMap, i32, i32) -> bool;

/// Try each filter in turn and return the first non-empty path
pub fn min_weight_or_shortest(
    map: &CellMap,
    from: Coord,
    to: Coord,
    filters: &[CellFilter<'_>],
) -> Vec<Coord> {
    for filter in filters {
        let path = shortest_path(from, to, Topology::Eight, |x, y| {
            map.has_xy(x, y) && filter(map, x, y)
        });
        if !path.is_empty() {
            return path;
        }
    }
    Vec::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Terrain;

    #[test]
    fn test_straight_path_includes_end_points() {
        let map = CellMap::new(10, 10, Terrain::Floor);
        let path = shortest_passable_path(&map, (1, 1), (5, 1));
        assert_eq!(path.first(), Some(&(1, 1)));
        assert_eq!(path.last(), Some(&(5, 1)));
        assert_eq!(path.len(), 5);
    }

    #[test]
    fn test_diagonal_topology_is_shorter() {
        let four = grid_path((0, 0), (4, 4), Topology::Four);
        let eight = grid_path((0, 0), (4, 4), Topology::Eight);
        assert_eq!(four.len(), 9);
        assert_eq!(eight.len(), 5);
    }

    #[test]
    fn test_unreachable_is_empty() {
        let map = CellMap::from_ascii(
            "#######\n\
             #..#..#\n\
             #######",
        );
        assert!(shortest_passable_path(&map, (1, 1), (5, 1)).is_empty());
        let through = path_through_walls(&map, (1, 1), (5, 1));
        assert_eq!(through.len(), 5);
        assert!(through.contains(&(3, 1)));
    }

    #[test]
    fn test_doors_are_opened_on_request() {
        let mut map = CellMap::from_ascii(
            "#####\n\
             #...#\n\
             #####",
        );
        map.get_mut(2, 1)
            .unwrap()
            .elements
            .push(crate::map::Element::LeverDoor(crate::map::LeverDoor { closed: true }));
        assert!(shortest_passable_path(&map, (1, 1), (3, 1)).is_empty());
        assert_eq!(shortest_passable_path_with_doors(&map, (1, 1), (3, 1)).len(), 3);
    }

    #[test]
    fn test_min_weight_falls_back() {
        let map = CellMap::from_ascii(
            "#####\n\
             #.#.#\n\
             #####",
        );
        let floor_only = |m: &CellMap, x: i32, y: i32| m.is_passable(x, y);
        let anything = |_: &CellMap, _: i32, _: i32| true;
        let both: [CellFilter<'_>; 2] = [&floor_only, &anything];
        let path = min_weight_or_shortest(&map, (1, 1), (3, 1), &both);
        assert_eq!(path.len(), 3);
        let strict: [CellFilter<'_>; 1] = [&floor_only];
        let none = min_weight_or_shortest(&map, (1, 1), (3, 1), &strict);
        assert!(none.is_empty());
    }
}
