//! Flood fills and connectivity checks

use hashbrown::HashSet;

use crate::Coord;
use crate::map::{Cell, CellMap};

/// Every cell reachable from `start` through cells accepted by `pred`.
///
/// The start cell is included only if it satisfies `pred`.
pub fn floodfill(
    map: &CellMap,
    start: Coord,
    pred: impl Fn(&Cell) -> bool,
    diagonal: bool,
) -> HashSet<Coord> {
    let mut seen = HashSet::new();
    let Some(first) = map.get(start.0, start.1) else {
        return seen;
    };
    if !pred(first) {
        return seen;
    }
    let mut stack = vec![start];
    seen.insert(start);
    while let Some((x, y)) = stack.pop() {
        for next in map.neighbours(x, y, diagonal) {
            if seen.contains(&next) {
                continue;
            }
            if map.get(next.0, next.1).is_some_and(&pred) {
                seen.insert(next);
                stack.push(next);
            }
        }
    }
    seen
}

/// Passable region containing the first passable cell of the map
pub fn floodfill_passable(map: &CellMap) -> HashSet<Coord> {
    match map.iter().find(|c| c.is_passable()) {
        Some(seed) => floodfill(map, seed.xy(), Cell::is_passable, true),
        None => HashSet::new(),
    }
}

/// Passable cells not reachable from `seed`
pub fn unreachable_passable(map: &CellMap, seed: Coord) -> Vec<Coord> {
    let reached = floodfill(map, seed, Cell::is_passable, true);
    map.passable_cells()
        .into_iter()
        .filter(|p| !reached.contains(p))
        .collect()
}

/// Split the cells accepted by `pred` into connected regions, largest first
pub fn regions(map: &CellMap, pred: impl Fn(&Cell) -> bool, diagonal: bool) -> Vec<Vec<Coord>> {
    let mut assigned: HashSet<Coord> = HashSet::new();
    let mut out: Vec<Vec<Coord>> = Vec::new();
    for cell in map.iter() {
        let pos = cell.xy();
        if assigned.contains(&pos) || !pred(cell) {
            continue;
        }
        let region = floodfill(map, pos, &pred, diagonal);
        let mut coords: Vec<Coord> = region.into_iter().collect();
        coords.sort_unstable();
        assigned.extend(coords.iter().copied());
        out.push(coords);
    }
    out.sort_by(|a, b| b.len().cmp(&a.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_rooms() -> CellMap {
        CellMap::from_ascii(
            "#########\n\
             #...#...#\n\
             #...#...#\n\
             #########",
        )
    }

    #[test]
    fn test_floodfill_stays_in_region() {
        let map = two_rooms();
        let fill = floodfill(&map, (1, 1), Cell::is_passable, true);
        assert_eq!(fill.len(), 6);
        assert!(!fill.contains(&(5, 1)));
    }

    #[test]
    fn test_unreachable_passable() {
        let map = two_rooms();
        assert_eq!(unreachable_passable(&map, (1, 1)).len(), 6);
        assert_eq!(floodfill_passable(&map).len(), 6);
    }

    #[test]
    fn test_regions_sorted_by_size() {
        let map = CellMap::from_ascii(
            "#######\n\
             #.#...#\n\
             #######",
        );
        let regs = regions(&map, Cell::is_passable, false);
        assert_eq!(regs.len(), 2);
        assert_eq!(regs[0].len(), 3);
        assert_eq!(regs[1], vec![(1, 1)]);
    }

    #[test]
    fn test_start_outside_predicate() {
        let map = two_rooms();
        assert!(floodfill(&map, (0, 0), Cell::is_passable, true).is_empty());
        assert!(floodfill(&map, (-3, 0), Cell::is_passable, true).is_empty());
    }
}
