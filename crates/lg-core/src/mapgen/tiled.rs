//! Template-tiled maps (castle, crypt, nest)

use super::conf::TiledConf;
use crate::GameRng;
use crate::error::GenResult;
use crate::map::{CellMap, MarkerKind, Terrain};
use crate::template::{TemplateCatalog, TileTemplate, TiledMap, TilingConf, WALL, tile_map};

/// Convert tiled ASCII into a map with the given wall and floor terrain.
///
/// Template symbols become floor carrying their marker when `preserve` is
/// set, bare floor otherwise. The map is `cols` × `rows`; anything the tiles
/// do not cover stays wall.
pub fn tiled_to_map(
    tiled: &TiledMap,
    cols: i32,
    rows: i32,
    wall: Terrain,
    floor: Terrain,
    preserve: bool,
) -> CellMap {
    let mut map = CellMap::new(cols, rows, wall);
    for (y, line) in tiled.rows.iter().enumerate() {
        for (x, c) in line.chars().enumerate() {
            let Some(cell) = map.get_mut(x as i32, y as i32) else {
                continue;
            };
            if c == WALL {
                continue;
            }
            cell.base = floor;
            if preserve && MarkerKind::is_template_symbol(c) {
                if let Some(kind) = MarkerKind::from_symbol(c) {
                    cell.add_marker(kind);
                }
            }
        }
    }
    map
}

/// Tile a `cols` × `rows` area from `catalog` and convert the result
pub fn create_tiled(
    catalog: &TemplateCatalog,
    cols: i32,
    rows: i32,
    conf: &TiledConf,
    filter: Option<&dyn Fn(&TileTemplate) -> bool>,
    wall: Terrain,
    floor: Terrain,
    rng: &mut GameRng,
) -> GenResult<(CellMap, TiledMap)> {
    let params = conf.gen_params.clamped();
    let tiles_x = (cols as usize / params.tile_w()).max(1);
    let tiles_y = (rows as usize / params.tile_h()).max(1);
    let tiling = TilingConf {
        tiles_x,
        tiles_y,
        gen_params: params,
        room_count: conf.room_count,
        start_room: conf.start_room.clone(),
        constraint: conf.constraint,
        filter,
        try_to_match_all_exits: conf.try_to_match_all_exits,
    };
    let tiled = tile_map(catalog, &tiling, rng)?;
    log::debug!(
        "tiled {}x{} slots, {} tiles placed",
        tiles_x,
        tiles_y,
        tiled.placed.len()
    );
    let map = tiled_to_map(&tiled, cols, rows, wall, floor, conf.preserve_markers);
    Ok((map, tiled))
}
