//! Stairs and mutual stairs linkage between levels

use serde::{Deserialize, Serialize};

use super::{Level, LevelId};
use crate::Coord;
use crate::error::{GenError, GenResult, report};
use crate::map::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StairsDir {
    Down,
    Up,
}

impl StairsDir {
    pub const fn symbol(&self) -> char {
        match self {
            StairsDir::Down => '>',
            StairsDir::Up => '<',
        }
    }

    pub const fn opposite(&self) -> StairsDir {
        match self {
            StairsDir::Down => StairsDir::Up,
            StairsDir::Up => StairsDir::Down,
        }
    }
}

/// Where a stairs leads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StairsTarget {
    pub level: LevelId,
    pub pos: Coord,
}

/// A stairs element. The target is only ever set by [`connect_stairs`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stairs {
    pub dir: StairsDir,
    pub level: LevelId,
    pub pos: Coord,
    target: Option<StairsTarget>,
}

impl Stairs {
    pub fn new(dir: StairsDir, level: LevelId, pos: Coord) -> Self {
        Self {
            dir,
            level,
            pos,
            target: None,
        }
    }

    pub fn target(&self) -> Option<StairsTarget> {
        self.target
    }

    pub fn is_connected(&self) -> bool {
        self.target.is_some()
    }
}

fn stairs_mut(level: &mut Level, pos: Coord) -> Option<&mut Stairs> {
    let cell = level.map_mut().get_mut(pos.0, pos.1)?;
    cell.elements.iter_mut().find_map(|e| match e {
        Element::Stairs(s) => Some(s),
        _ => None,
    })
}

/// Link the stairs at `pos_a` on `a` with the stairs at `pos_b` on `b`.
///
/// Both sides are updated or neither: if either stairs is missing the call
/// fails and no target is touched.
pub fn connect_stairs(a: &mut Level, pos_a: Coord, b: &mut Level, pos_b: Coord) -> GenResult<()> {
    let (id_a, id_b) = (a.id(), b.id());
    if a.stairs_at(pos_a.0, pos_a.1).is_none() {
        return Err(report(GenError::StairsMismatch(format!(
            "no stairs at {:?} on level {}",
            pos_a, id_a.0
        ))));
    }
    if b.stairs_at(pos_b.0, pos_b.1).is_none() {
        return Err(report(GenError::StairsMismatch(format!(
            "no stairs at {:?} on level {}",
            pos_b, id_b.0
        ))));
    }
    if let Some(sa) = stairs_mut(a, pos_a) {
        sa.target = Some(StairsTarget {
            level: id_b,
            pos: pos_b,
        });
    }
    if let Some(sb) = stairs_mut(b, pos_b) {
        sb.target = Some(StairsTarget {
            level: id_a,
            pos: pos_a,
        });
    }
    Ok(())
}

/// Do the two stairs point at each other?
pub fn stairs_linked(a: &Level, pos_a: Coord, b: &Level, pos_b: Coord) -> bool {
    let (Some(sa), Some(sb)) = (a.stairs_at(pos_a.0, pos_a.1), b.stairs_at(pos_b.0, pos_b.1)) else {
        return false;
    };
    sa.target
        == Some(StairsTarget {
            level: b.id(),
            pos: pos_b,
        })
        && sb.target
            == Some(StairsTarget {
                level: a.id(),
                pos: pos_a,
            })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{CellMap, Terrain};

    fn level() -> Level {
        Level::new(CellMap::new(10, 10, Terrain::Floor))
    }

    #[test]
    fn test_connect_sets_both_sides() {
        let mut a = level();
        let mut b = level();
        assert!(a.add_stairs(StairsDir::Down, 2, 2));
        assert!(b.add_stairs(StairsDir::Up, 7, 7));
        assert!(!stairs_linked(&a, (2, 2), &b, (7, 7)));
        connect_stairs(&mut a, (2, 2), &mut b, (7, 7)).unwrap();
        assert!(stairs_linked(&a, (2, 2), &b, (7, 7)));
        assert!(stairs_linked(&b, (7, 7), &a, (2, 2)));
        let target = a.stairs_at(2, 2).unwrap().target().unwrap();
        assert_eq!(target.level, b.id());
        assert_eq!(target.pos, (7, 7));
    }

    #[test]
    fn test_failed_connect_touches_nothing() {
        let mut a = level();
        let mut b = level();
        a.add_stairs(StairsDir::Down, 2, 2);
        let res = connect_stairs(&mut a, (2, 2), &mut b, (7, 7));
        assert!(matches!(res, Err(GenError::StairsMismatch(_))));
        assert!(a.stairs_at(2, 2).unwrap().target().is_none());
    }

    #[test]
    fn test_stairs_carry_owning_level() {
        let mut a = level();
        a.add_stairs(StairsDir::Up, 1, 1);
        assert_eq!(a.stairs_at(1, 1).unwrap().level, a.id());
        assert_eq!(StairsDir::Up.opposite(), StairsDir::Down);
    }
}
