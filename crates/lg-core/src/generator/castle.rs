//! Tiled castles with gates, levers and storerooms

use serde::{Deserialize, Serialize};

use super::markers;
use crate::entity::{EntityFactory, TableFactory};
use crate::error::{GenError, GenResult, check_dimensions, report};
use crate::geom::{Dir, copy_cell, merge_maps};
use crate::level::{CastleExtras, ExtrasKind, Level, LevelExtras, Room, RoomCategory};
use crate::map::{CellMap, MarkerKind, Terrain};
use crate::mapgen::{TiledConf, create_tiled};
use crate::population::populate_castle;
use crate::template::{Constraint, GenParams, StartRoom, TileCategory, TiledMap, castle_catalog};
use crate::{Coord, DEFAULT_MAX_DANGER, DEFAULT_PRESERVED_MARKERS, GameRng};

/// Terrain expected next to each side of the castle; `None` leaves the side open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CellsAround {
    pub n: Option<Terrain>,
    pub e: Option<Terrain>,
    pub s: Option<Terrain>,
    pub w: Option<Terrain>,
}

impl CellsAround {
    pub fn side(&self, dir: Dir) -> Option<Terrain> {
        match dir {
            Dir::N => self.n,
            Dir::E => self.e,
            Dir::S => self.s,
            Dir::W => self.w,
        }
    }

    /// Sides a gate must not open towards
    pub fn blocked(&self) -> Vec<Dir> {
        Dir::ALL
            .into_iter()
            .filter(|&d| self.side(d).is_some_and(|t| !t.is_passable()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CastleOptions {
    pub room_count: Option<usize>,
    pub n_gates: usize,
    pub cells_around: Option<CellsAround>,
    /// Wrap the castle in a band of outside terrain
    pub surround: bool,
    pub surround_width: i32,
    pub gen_params: GenParams,
    pub wall_type: Terrain,
    pub floor_type: Terrain,
    /// Corridors along the centre row and column
    pub central_corridors: bool,
    pub try_to_match_all_exits: bool,
    pub populate: bool,
    /// Required when `populate` is set
    pub max_value: Option<u32>,
    pub max_danger: u32,
    pub remove_markers: bool,
    pub preserve_markers: Vec<MarkerKind>,
}

impl Default for CastleOptions {
    fn default() -> Self {
        Self {
            room_count: None,
            n_gates: 2,
            cells_around: None,
            surround: false,
            surround_width: 3,
            gen_params: GenParams::default(),
            wall_type: Terrain::WallCastle,
            floor_type: Terrain::FloorCastle,
            central_corridors: false,
            try_to_match_all_exits: true,
            populate: false,
            max_value: None,
            max_danger: DEFAULT_MAX_DANGER,
            remove_markers: true,
            preserve_markers: DEFAULT_PRESERVED_MARKERS.to_vec(),
        }
    }
}

pub struct CastleGenerator {
    factory: Box<dyn EntityFactory>,
}

impl Default for CastleGenerator {
    fn default() -> Self {
        Self::new(Box::new(TableFactory::new()))
    }
}

impl CastleGenerator {
    pub fn new(factory: Box<dyn EntityFactory>) -> Self {
        Self { factory }
    }
}

fn start_room(opts: &CastleOptions) -> StartRoom {
    let blocked = opts.cells_around.map(|c| c.blocked()).unwrap_or_default();
    if blocked.is_empty() {
        StartRoom::from_gate_count(opts.n_gates)
    } else {
        StartRoom::GatesAvoiding {
            blocked,
            n_gates: opts.n_gates.max(1),
        }
    }
}

impl super::LevelGenerator for CastleGenerator {
    type Options = CastleOptions;
    type Output = Level;

    fn create(
        &mut self,
        cols: i32,
        rows: i32,
        opts: &CastleOptions,
        rng: &mut GameRng,
    ) -> GenResult<Level> {
        check_dimensions(cols, rows)?;
        if opts.populate && opts.max_value.is_none() {
            return Err(report(GenError::MissingOption("max_value")));
        }
        let catalog = castle_catalog()?;
        let conf = TiledConf {
            gen_params: opts.gen_params,
            room_count: opts.room_count,
            start_room: start_room(opts),
            constraint: if opts.central_corridors {
                Constraint::Cross
            } else {
                Constraint::None
            },
            try_to_match_all_exits: opts.try_to_match_all_exits,
            preserve_markers: true,
        };
        let (mut map, tiled) = create_tiled(
            &catalog,
            cols,
            rows,
            &conf,
            None,
            opts.wall_type,
            opts.floor_type,
            rng,
        )?;
        drop_sealed_levers(&mut map, &tiled);
        let gates = open_gates(&mut map, &tiled, opts.floor_type);

        let mut level = Level::new(map);
        let resolved = markers::resolve_castle_markers(&mut level)?;
        let mut castle = classify(&tiled, rng);
        castle.gates = gates;
        log::debug!(
            "castle: {} rooms, {} storerooms, {} vaults, {} gates, {} levers",
            castle.rooms.len(),
            castle.storerooms.len(),
            castle.vaults.len(),
            castle.gates.len(),
            resolved.levers.len()
        );
        level.set_extras(LevelExtras::with_kind(ExtrasKind::Castle(castle)));

        if let (true, Some(max_value)) = (opts.populate, opts.max_value) {
            let n = populate_castle(
                &mut level,
                self.factory.as_mut(),
                max_value,
                opts.max_danger,
                rng,
            );
            log::debug!("castle population placed {} entities", n);
        }
        if opts.surround {
            let around = opts.cells_around.unwrap_or_default();
            surround_with(&mut level, &around, opts.surround_width, rng);
        }
        if opts.remove_markers {
            markers::remove_markers(&mut level, &opts.preserve_markers);
        }
        Ok(level)
    }
}

/// Levers inside tiles with every exit sealed could never be reached
fn drop_sealed_levers(map: &mut CellMap, tiled: &TiledMap) {
    for tile in tiled.placed.iter().filter(|t| t.exits.iter().all(|e| !e)) {
        for (x, y) in tile.bbox.coords() {
            if let Some(cell) = map.get_mut(x, y) {
                if cell.has_marker(MarkerKind::Lever) {
                    cell.remove_marker(MarkerKind::Lever);
                    log::debug!("dropped lever in sealed tile {} at ({}, {})", tile.name, x, y);
                }
            }
        }
    }
}

/// Extend every gate opening straight out to the map border.
///
/// Returns the border cells reached.
fn open_gates(map: &mut CellMap, tiled: &TiledMap, floor: Terrain) -> Vec<Coord> {
    let mut gates = Vec::new();
    for (tile, dir) in tiled.gates() {
        let b = tile.bbox;
        let side: Vec<Coord> = match dir {
            Dir::N => (b.ulx..=b.lrx).map(|x| (x, b.uly)).collect(),
            Dir::S => (b.ulx..=b.lrx).map(|x| (x, b.lry)).collect(),
            Dir::E => (b.uly..=b.lry).map(|y| (b.lrx, y)).collect(),
            Dir::W => (b.uly..=b.lry).map(|y| (b.ulx, y)).collect(),
        };
        let (dx, dy) = dir.delta();
        let open: Vec<Coord> = side
            .into_iter()
            .filter(|&(x, y)| map.is_passable(x, y))
            .collect();
        for (mut x, mut y) in open {
            while !map.is_edge(x, y) && map.has_xy(x + dx, y + dy) {
                x += dx;
                y += dy;
                map.set_base(x, y, floor);
            }
            if map.is_edge(x, y) && !gates.contains(&(x, y)) {
                gates.push((x, y));
            }
        }
    }
    gates
}

fn category_of(tile: TileCategory) -> RoomCategory {
    match tile {
        TileCategory::Corridor => RoomCategory::Corridor,
        TileCategory::Cross => RoomCategory::Cross,
        TileCategory::Entrance => RoomCategory::Entrance,
        TileCategory::Storeroom => RoomCategory::Storeroom,
        TileCategory::Vault => RoomCategory::Vault,
        TileCategory::Nest => RoomCategory::Nest,
        TileCategory::Room | TileCategory::Filler => RoomCategory::Room,
    }
}

/// Sort placed tiles into castle room lists.
///
/// A castle with no storeroom tile gets one of its plain rooms promoted.
fn classify(tiled: &TiledMap, rng: &mut GameRng) -> CastleExtras {
    let mut castle = CastleExtras::default();
    for tile in tiled.placed.iter().filter(|t| t.category != TileCategory::Filler) {
        let room = Room::named(category_of(tile.category), tile.bbox, &tile.name);
        match tile.category {
            TileCategory::Corridor | TileCategory::Cross => castle.corridors.push(room),
            TileCategory::Entrance => castle.entrances.push(room),
            TileCategory::Storeroom => castle.storerooms.push(room),
            TileCategory::Vault => castle.vaults.push(room),
            TileCategory::Room | TileCategory::Nest | TileCategory::Filler => castle.rooms.push(room),
        }
    }
    if castle.storerooms.is_empty() && !castle.rooms.is_empty() {
        let i = rng.rn2(castle.rooms.len() as u32) as usize;
        let mut room = castle.rooms.remove(i);
        room.category = RoomCategory::Storeroom;
        log::debug!("promoted {:?} to storeroom", room.name);
        castle.storerooms.push(room);
    }
    castle
}

/// Wrap `level` in a band of outside terrain `width` cells wide.
///
/// Each side takes its terrain from `around`, grass with the odd tree when
/// unset. The old map is copied in at `(width, width)` and every extras
/// coordinate shifts with it.
pub fn surround_with(level: &mut Level, around: &CellsAround, width: i32, rng: &mut GameRng) {
    let width = width.max(1);
    let (cols, rows) = (level.cols() + 2 * width, level.rows() + 2 * width);
    let mut outside = CellMap::new(cols, rows, Terrain::Grass);
    for x in 0..cols {
        for y in 0..rows {
            let side = if y < width {
                Dir::N
            } else if y >= rows - width {
                Dir::S
            } else if x < width {
                Dir::W
            } else {
                Dir::E
            };
            let base = match around.side(side) {
                Some(t) => t,
                None if rng.one_in(8) => Terrain::Tree,
                None => Terrain::Grass,
            };
            outside.set_base(x, y, base);
        }
    }
    merge_maps(&mut outside, level.map(), width, width, copy_cell);
    level.set_map(outside);
    level.extras_mut().translate(width, width);
    log::debug!("surrounded castle with a {} cell band", width);
}
