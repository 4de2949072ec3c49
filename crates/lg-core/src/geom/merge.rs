//! Copying one map into another

use crate::map::{Cell, CellMap};

/// Merge `src` into `dst` with `src`'s origin at `(ox, oy)`.
///
/// `cb(dst_cell, src_cell)` decides per cell whether the destination is
/// overwritten with the source cell's terrain and contents; cells falling
/// outside `dst` are skipped. Returns the number of cells overwritten.
pub fn merge_maps(
    dst: &mut CellMap,
    src: &CellMap,
    ox: i32,
    oy: i32,
    mut cb: impl FnMut(&Cell, &Cell) -> bool,
) -> usize {
    let mut n = 0;
    for cell in src.iter() {
        let Some(target) = dst.get_mut(cell.x + ox, cell.y + oy) else {
            continue;
        };
        if cb(target, cell) {
            target.base = cell.base;
            target.elements = cell.elements.clone();
            target.actors = cell.actors.clone();
            target.items = cell.items.clone();
            n += 1;
        }
    }
    n
}

/// Overwrite every cell
pub fn copy_cell(_dst: &Cell, _src: &Cell) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::{MarkerKind, Terrain};

    #[test]
    fn test_merge_with_offset_and_clipping() {
        let mut dst = CellMap::new(5, 5, Terrain::Wall);
        let mut src = CellMap::new(3, 3, Terrain::Floor);
        src.get_mut(1, 1).unwrap().add_marker(MarkerKind::Loot);
        let n = merge_maps(&mut dst, &src, 3, 3, copy_cell);
        assert_eq!(n, 4);
        assert_eq!(dst.base(3, 3), Some(Terrain::Floor));
        assert_eq!(dst.base(2, 2), Some(Terrain::Wall));
        assert!(dst.get(4, 4).unwrap().has_marker(MarkerKind::Loot));
        assert_eq!(dst.get(4, 4).map(|c| c.xy()), Some((4, 4)));
    }

    #[test]
    fn test_conditional_merge() {
        let mut dst = CellMap::new(3, 1, Terrain::Floor);
        dst.get_mut(1, 0).unwrap().add_marker(MarkerKind::Loot);
        let src = CellMap::from_ascii("#.#");
        let n = merge_maps(&mut dst, &src, 0, 0, |_, s| s.base.is_wall());
        assert_eq!(n, 2);
        assert_eq!(dst.to_ascii(), "#.#");
        assert!(dst.get(1, 0).unwrap().has_marker(MarkerKind::Loot));
    }

    #[test]
    fn test_callback_sees_the_destination() {
        let mut dst = CellMap::from_ascii("#..");
        let src = CellMap::new(3, 1, Terrain::Water);
        let n = merge_maps(&mut dst, &src, 0, 0, |d, _| !d.base.is_wall());
        assert_eq!(n, 2);
        assert_eq!(dst.base(0, 0), Some(Terrain::Wall));
        assert_eq!(dst.base(2, 0), Some(Terrain::Water));
    }
}
