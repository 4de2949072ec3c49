//! Marker resolution and cleanup

use crate::error::{GenError, GenResult, report};
use crate::geom::box_around;
use crate::level::Level;
use crate::map::{Element, Lever, LeverDoor, MarkerKind, Terrain};
use crate::Coord;

/// Positions of the castle elements created from markers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedMarkers {
    pub doors: Vec<Coord>,
    pub levers: Vec<Coord>,
    pub lever_doors: Vec<Coord>,
    pub living_quarters: Vec<Coord>,
}

/// Replace every door marker with a closed door.
///
/// Returns the converted positions; a second call finds nothing to do.
pub fn markers_to_doors(level: &mut Level) -> Vec<Coord> {
    let cells = level.cells_with_marker(MarkerKind::Door);
    for &(x, y) in &cells {
        if let Some(cell) = level.map_mut().get_mut(x, y) {
            cell.remove_marker(MarkerKind::Door);
            cell.add_door();
        }
    }
    cells
}

/// Turn castle markers into doors, lever doors, levers and living quarters.
///
/// Each lever controls every lever door in the box around it; a lever with
/// none is an authoring error.
pub fn resolve_castle_markers(level: &mut Level) -> GenResult<ResolvedMarkers> {
    let doors = markers_to_doors(level);

    let lever_doors = level.cells_with_marker(MarkerKind::LeverDoor);
    for &(x, y) in &lever_doors {
        if let Some(cell) = level.map_mut().get_mut(x, y) {
            cell.remove_marker(MarkerKind::LeverDoor);
            cell.elements.push(Element::LeverDoor(LeverDoor { closed: true }));
        }
    }

    let living_quarters = level.cells_with_marker(MarkerKind::LivingQuarter);
    for &(x, y) in &living_quarters {
        if let Some(cell) = level.map_mut().get_mut(x, y) {
            cell.remove_marker(MarkerKind::LivingQuarter);
            cell.base = Terrain::FloorHouse;
        }
    }

    let levers = level.cells_with_marker(MarkerKind::Lever);
    for &(x, y) in &levers {
        let targets: Vec<Coord> = box_around(x, y, 1, false)
            .into_iter()
            .filter(|p| lever_doors.contains(p))
            .collect();
        if targets.is_empty() {
            return Err(report(GenError::LeverWithoutDoor { x, y }));
        }
        if let Some(cell) = level.map_mut().get_mut(x, y) {
            cell.remove_marker(MarkerKind::Lever);
            cell.elements.push(Element::Lever(Lever { targets }));
        }
    }

    log::debug!(
        "resolved {} doors, {} levers, {} lever doors",
        doors.len(),
        levers.len(),
        lever_doors.len()
    );
    Ok(ResolvedMarkers {
        doors,
        levers,
        lever_doors,
        living_quarters,
    })
}

/// Remove every marker whose kind is not in `preserve`; returns how many went
pub fn remove_markers(level: &mut Level, preserve: &[MarkerKind]) -> usize {
    let mut n = 0;
    for cell in level.map_mut().iter_mut() {
        let before = cell.elements.len();
        cell.elements
            .retain(|e| e.marker().is_none_or(|m| preserve.contains(&m)));
        n += before - cell.elements.len();
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_PRESERVED_MARKERS;
    use crate::map::{CellMap, ElementKind};

    fn level_from(text: &str) -> Level {
        Level::new(CellMap::from_ascii(text))
    }

    #[test]
    fn test_three_door_markers() {
        let mut level = level_from("#####\n#+.+#\n#.+.#\n#####");
        let doors = markers_to_doors(&mut level);
        assert_eq!(doors.len(), 3);
        assert!(level.cells_with_marker(MarkerKind::Door).is_empty());
        assert_eq!(level.cells_with_element(ElementKind::Door).len(), 3);
        assert!(markers_to_doors(&mut level).is_empty());
        assert_eq!(level.cells_with_element(ElementKind::Door).len(), 3);
    }

    #[test]
    fn test_lever_links_adjacent_lever_doors() {
        let mut level = level_from("#####\n#.&.#\n##|##\n");
        let resolved = resolve_castle_markers(&mut level).unwrap();
        assert_eq!(resolved.levers, vec![(2, 1)]);
        let lever = level
            .map()
            .get(2, 1)
            .and_then(|c| {
                c.elements.iter().find_map(|e| match e {
                    Element::Lever(l) => Some(l.clone()),
                    _ => None,
                })
            })
            .unwrap();
        assert_eq!(lever.targets, vec![(2, 2)]);
        assert!(!level.map().is_passable(2, 2));
    }

    #[test]
    fn test_lever_without_door_fails() {
        let mut level = level_from("#####\n#.&.#\n#...#\n#..|#\n#####");
        let err = resolve_castle_markers(&mut level).unwrap_err();
        assert_eq!(err, GenError::LeverWithoutDoor { x: 2, y: 1 });
    }

    #[test]
    fn test_living_quarters_become_house_floor() {
        let mut level = level_from("#####\n#.:.#\n#####");
        let resolved = resolve_castle_markers(&mut level).unwrap();
        assert_eq!(resolved.living_quarters, vec![(2, 1)]);
        assert_eq!(level.map().base(2, 1), Some(Terrain::FloorHouse));
    }

    #[test]
    fn test_cleanup_keeps_allow_list() {
        let mut level = level_from("#####\n#s?e#\n#####");
        level.add_marker(MarkerKind::CriticalPath, 2, 1);
        let removed = remove_markers(&mut level, &DEFAULT_PRESERVED_MARKERS);
        assert_eq!(removed, 1);
        assert_eq!(level.cells_with_marker(MarkerKind::StartPoint), vec![(1, 1)]);
        assert_eq!(level.cells_with_marker(MarkerKind::CriticalPath), vec![(2, 1)]);
        assert!(level.cells_with_marker(MarkerKind::Loot).is_empty());
        assert_eq!(remove_markers(&mut level, &[]), 3);
    }
}
