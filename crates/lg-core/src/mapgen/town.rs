//! BSP towns: one house per large enough leaf

use super::conf::TownConf;
use crate::GameRng;
use crate::geom::{BBox, hollow_box};
use crate::level::{Room, RoomCategory};
use crate::map::{CellMap, Door, Element, Terrain};

/// Split `area` recursively until leaves are below twice `min_leaf`
pub fn bsp_leaves(area: BBox, min_leaf: i32, rng: &mut GameRng) -> Vec<BBox> {
    let mut leaves = Vec::new();
    let mut todo = vec![area];
    let min_leaf = min_leaf.max(3);
    while let Some(b) = todo.pop() {
        let can_split_x = b.width() >= 2 * min_leaf;
        let can_split_y = b.height() >= 2 * min_leaf;
        let split_x = match (can_split_x, can_split_y) {
            (false, false) => {
                leaves.push(b);
                continue;
            }
            (true, false) => true,
            (false, true) => false,
            (true, true) => {
                if b.width() > b.height() * 5 / 4 {
                    true
                } else if b.height() > b.width() * 5 / 4 {
                    false
                } else {
                    rng.one_in(2)
                }
            }
        };
        if split_x {
            let at = rng.get_uniform_int(b.ulx + min_leaf, b.lrx + 1 - min_leaf);
            todo.push(BBox::new(b.ulx, b.uly, at - 1, b.lry));
            todo.push(BBox::new(at, b.uly, b.lrx, b.lry));
        } else {
            let at = rng.get_uniform_int(b.uly + min_leaf, b.lry + 1 - min_leaf);
            todo.push(BBox::new(b.ulx, b.uly, b.lrx, at - 1));
            todo.push(BBox::new(b.ulx, at, b.lrx, b.lry));
        }
    }
    leaves.sort_by_key(|b| (b.uly, b.ulx));
    leaves
}

/// Town map, houses and leaves left free.
///
/// Each house keeps a one-cell halo inside its leaf, so houses never touch.
pub fn town(
    cols: i32,
    rows: i32,
    conf: &TownConf,
    rng: &mut GameRng,
) -> (CellMap, Vec<Room>, Vec<BBox>) {
    let mut map = CellMap::new(cols, rows, conf.ground);
    let mut houses = Vec::new();
    let mut free = Vec::new();
    let min_house = conf.min_house.max(3);

    for leaf in bsp_leaves(map.bbox(), conf.min_leaf, rng) {
        let room = leaf.shrink(1);
        if room.width() < min_house || room.height() < min_house {
            free.push(leaf);
            continue;
        }
        let w = rng.get_uniform_int(min_house, room.width().min(conf.max_house.max(min_house)));
        let h = rng.get_uniform_int(min_house, room.height().min(conf.max_house.max(min_house)));
        let x = rng.get_uniform_int(room.ulx, room.lrx + 1 - w);
        let y = rng.get_uniform_int(room.uly, room.lry + 1 - h);
        let house = BBox::from_size(x, y, w, h);
        houses.push(build_house(&mut map, house, conf, rng));
    }
    log::debug!("town: {} houses, {} free leaves", houses.len(), free.len());
    (map, houses, free)
}

fn build_house(map: &mut CellMap, bbox: BBox, conf: &TownConf, rng: &mut GameRng) -> Room {
    let mut room = Room::named(RoomCategory::Custom, bbox, "house");
    for (x, y) in hollow_box(&bbox) {
        map.set_base(x, y, Terrain::WallHouse);
    }
    map.fill(&bbox.shrink(1), Terrain::FloorHouse);

    // Door and windows sit on wall cells away from the corners
    let corners = bbox.corners();
    let sides: Vec<(i32, i32)> = hollow_box(&bbox)
        .into_iter()
        .filter(|p| !corners.contains(p))
        .collect();
    if let Some(&(dx, dy)) = rng.choose(&sides) {
        map.set_base(dx, dy, Terrain::FloorHouse);
        if let Some(cell) = map.get_mut(dx, dy) {
            cell.elements.push(Element::Door(Door { closed: true }));
        }
        room.add_door((dx, dy));
    }
    for &(x, y) in &sides {
        if !room.doors.contains(&(x, y)) && rng.get_uniform() < conf.window_chance / 4.0 {
            map.set_base(x, y, Terrain::Window);
        }
    }
    room
}
