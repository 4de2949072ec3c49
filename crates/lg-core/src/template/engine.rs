//! Tiling a grid of slots with matching templates

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::catalog::TemplateCatalog;
use super::start::{Constraint, Slot, StartRoom};
use super::tile::{GenParams, TileCategory, TileTemplate, WALL};
use crate::GameRng;
use crate::error::{GenError, GenResult, report};
use crate::geom::{BBox, Dir};

/// Configuration of one tiling run
pub struct TilingConf<'a> {
    pub tiles_x: usize,
    pub tiles_y: usize,
    pub gen_params: GenParams,
    /// Stop growing once this many non-filler tiles are placed
    pub room_count: Option<usize>,
    pub start_room: StartRoom,
    pub constraint: Constraint,
    /// Only templates accepted here are used for growth
    pub filter: Option<&'a dyn Fn(&TileTemplate) -> bool>,
    /// Try to close dangling exits with extra tiles before sealing
    pub try_to_match_all_exits: bool,
}

impl Default for TilingConf<'_> {
    fn default() -> Self {
        Self {
            tiles_x: 3,
            tiles_y: 3,
            gen_params: GenParams::default(),
            room_count: None,
            start_room: StartRoom::Default,
            constraint: Constraint::None,
            filter: None,
            try_to_match_all_exits: false,
        }
    }
}

/// A non-filler tile in the output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedTile {
    pub name: String,
    pub category: TileCategory,
    pub slot: Slot,
    pub bbox: BBox,
    pub gate: Option<Dir>,
    /// Exits left open after sealing, indexed by [`Dir::index`]
    pub exits: [bool; 4],
}

/// Result of a tiling run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TiledMap {
    pub rows: Vec<String>,
    pub tile_w: usize,
    pub tile_h: usize,
    pub tiles_x: usize,
    pub tiles_y: usize,
    pub placed: Vec<PlacedTile>,
}

impl TiledMap {
    pub fn width(&self) -> usize {
        self.tile_w * self.tiles_x
    }

    pub fn height(&self) -> usize {
        self.tile_h * self.tiles_y
    }

    pub fn ascii(&self) -> String {
        self.rows.join("\n")
    }

    /// Template name to the boxes it was placed at
    pub fn by_name(&self) -> HashMap<String, Vec<BBox>> {
        let mut out: HashMap<String, Vec<BBox>> = HashMap::new();
        for p in &self.placed {
            out.entry(p.name.clone()).or_default().push(p.bbox);
        }
        out
    }

    /// Placed gate tiles with the side they open to
    pub fn gates(&self) -> Vec<(&PlacedTile, Dir)> {
        self.placed
            .iter()
            .filter_map(|p| p.gate.map(|g| (p, g)))
            .collect()
    }

    pub fn translate(&mut self, dx: i32, dy: i32) {
        for p in &mut self.placed {
            p.bbox = p.bbox.translate(dx, dy);
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Placement {
    tpl: usize,
    gate: Option<Dir>,
}

struct Grid<'c> {
    w: usize,
    h: usize,
    templates: &'c [TileTemplate],
    slots: Vec<Option<Placement>>,
}

impl<'c> Grid<'c> {
    fn idx(&self, (x, y): Slot) -> usize {
        y * self.w + x
    }

    fn get(&self, slot: Slot) -> Option<Placement> {
        self.slots[self.idx(slot)]
    }

    fn set(&mut self, slot: Slot, p: Placement) {
        let i = self.idx(slot);
        self.slots[i] = Some(p);
    }

    fn neighbour(&self, (x, y): Slot, dir: Dir) -> Option<Slot> {
        let (dx, dy) = dir.delta();
        let nx = x as i64 + dx as i64;
        let ny = y as i64 + dy as i64;
        if nx < 0 || ny < 0 || nx >= self.w as i64 || ny >= self.h as i64 {
            return None;
        }
        Some((nx as usize, ny as usize))
    }

    fn template(&self, p: Placement) -> &'c TileTemplate {
        &self.templates[p.tpl]
    }

    /// Does `t` fit at `slot` given everything committed so far?
    ///
    /// In closing mode the tile may not open towards empty slots either.
    fn fits(&self, t: &TileTemplate, slot: Slot, gate: Option<Dir>, closing: bool) -> bool {
        Dir::ALL.iter().all(|&d| {
            let exit = t.has_exit(d);
            match self.neighbour(slot, d) {
                None => {
                    if gate == Some(d) {
                        exit
                    } else {
                        !exit
                    }
                }
                Some(n) => match self.get(n) {
                    Some(p) => self.template(p).has_exit(d.opposite()) == exit,
                    None => !(closing && exit),
                },
            }
        })
    }

    /// Does a committed non-filler neighbour open towards this empty slot?
    fn is_frontier(&self, slot: Slot) -> bool {
        self.get(slot).is_none()
            && Dir::ALL.iter().any(|&d| {
                self.neighbour(slot, d)
                    .and_then(|n| self.get(n))
                    .is_some_and(|p| self.template(p).has_exit(d.opposite()))
            })
    }

    fn all_slots(&self) -> Vec<Slot> {
        (0..self.h)
            .flat_map(|y| (0..self.w).map(move |x| (x, y)))
            .collect()
    }

    /// Open exits of a committed slot after matching neighbours
    fn open_exits(&self, slot: Slot) -> [bool; 4] {
        let Some(p) = self.get(slot) else {
            return [false; 4];
        };
        let t = self.template(p);
        Dir::ALL.map(|d| {
            t.has_exit(d)
                && match self.neighbour(slot, d) {
                    None => p.gate == Some(d),
                    Some(n) => self
                        .get(n)
                        .is_some_and(|q| self.template(q).has_exit(d.opposite())),
                }
        })
    }
}

struct Tiler<'c> {
    grid: Grid<'c>,
    pool: Vec<usize>,
    filler: usize,
}

impl Tiler<'_> {
    /// Weighted pick among pool templates passing `extra` that fit the slot
    fn place(
        &mut self,
        slot: Slot,
        gate: Option<Dir>,
        closing: bool,
        extra: &dyn Fn(&TileTemplate) -> bool,
        rng: &mut GameRng,
    ) -> bool {
        let weighted: Vec<(usize, u32)> = self
            .pool
            .iter()
            .copied()
            .filter(|&i| {
                let t = &self.grid.templates[i];
                extra(t) && self.grid.fits(t, slot, gate, closing)
            })
            .map(|i| (i, self.grid.templates[i].weight.max(1)))
            .collect();
        match rng.get_weighted(&weighted) {
            Some(tpl) => {
                self.grid.set(slot, Placement { tpl, gate });
                true
            }
            None => false,
        }
    }

    fn placed_rooms(&self) -> usize {
        self.grid
            .slots
            .iter()
            .flatten()
            .filter(|p| p.tpl != self.filler)
            .count()
    }
}

/// Tile a `tiles_x` × `tiles_y` grid from `catalog`.
///
/// Every shared edge of two placed tiles ends up with identical exit
/// positions or fully walled; exits facing the grid border stay open only
/// on gate tiles.
pub fn tile_map(
    catalog: &TemplateCatalog,
    conf: &TilingConf<'_>,
    rng: &mut GameRng,
) -> GenResult<TiledMap> {
    let (w, h) = (conf.tiles_x, conf.tiles_y);
    if w == 0 || h == 0 {
        return Err(report(GenError::InvalidDimensions {
            cols: w as i32,
            rows: h as i32,
        }));
    }
    let templates = catalog.templates();
    let filler = catalog.filler_index();
    let pool: Vec<usize> = (0..templates.len())
        .filter(|&i| !templates[i].is_filler())
        .collect();
    let mut tiler = Tiler {
        grid: Grid {
            w,
            h,
            templates,
            slots: vec![None; w * h],
        },
        pool,
        filler,
    };

    // Forced slots prefer corridor-like tiles
    for forced in conf.constraint.forced(w, h) {
        let wants = |t: &TileTemplate| forced.exits.iter().zip(t.exits()).all(|(want, has)| !want || has);
        let corridor_like = |t: &TileTemplate| {
            wants(t) && matches!(t.category, TileCategory::Corridor | TileCategory::Cross)
        };
        if !tiler.place(forced.slot, None, false, &corridor_like, rng) {
            tiler.place(forced.slot, None, false, &wants, rng);
        }
    }

    for seed in conf.start_room.seeds(w, h, rng) {
        if tiler.grid.get(seed.slot).is_some() {
            continue;
        }
        let any = |_: &TileTemplate| true;
        if !tiler.place(seed.slot, seed.gate, false, &any, rng) {
            log::debug!("no template fits start slot {:?}", seed.slot);
        }
    }
    if tiler.placed_rooms() == 0 {
        let slot = (rng.rn2(w as u32) as usize, rng.rn2(h as u32) as usize);
        let any = |_: &TileTemplate| true;
        tiler.place(slot, None, false, &any, rng);
    }

    let target = conf.room_count.unwrap_or(usize::MAX);
    while tiler.placed_rooms() < target {
        let frontier: Vec<Slot> = tiler
            .grid
            .all_slots()
            .into_iter()
            .filter(|&s| tiler.grid.is_frontier(s))
            .collect();
        let Some(&slot) = rng.choose(&frontier) else {
            break;
        };
        let filter = |t: &TileTemplate| tiler_filter(conf, t);
        if !tiler.place(slot, None, false, &filter, rng) {
            tiler.grid.set(slot, Placement { tpl: filler, gate: None });
        }
    }

    if conf.try_to_match_all_exits {
        loop {
            let mut dangling: Vec<Slot> = tiler
                .grid
                .all_slots()
                .into_iter()
                .filter(|&s| tiler.grid.is_frontier(s))
                .collect();
            rng.shuffle(&mut dangling);
            let mut closed_any = false;
            for slot in dangling {
                let filter = |t: &TileTemplate| tiler_filter(conf, t);
                if tiler.grid.get(slot).is_none() && tiler.place(slot, None, true, &filter, rng) {
                    closed_any = true;
                }
            }
            if !closed_any {
                break;
            }
        }
    }

    for slot in tiler.grid.all_slots() {
        if tiler.grid.get(slot).is_none() {
            tiler.grid.set(slot, Placement { tpl: filler, gate: None });
        }
    }

    let out = render(&tiler.grid, &conf.gen_params, filler);
    log::debug!(
        "tiled {}x{} grid: {} tiles placed",
        w,
        h,
        out.placed.len()
    );
    Ok(out)
}

fn tiler_filter(conf: &TilingConf<'_>, t: &TileTemplate) -> bool {
    conf.filter.is_none_or(|f| f(t))
}

/// Draw every slot, walling exits that do not meet a matching exit
fn render(grid: &Grid<'_>, params: &GenParams, filler: usize) -> TiledMap {
    let params = params.clamped();
    let (tw, th) = (params.tile_w(), params.tile_h());
    let mut canvas = vec![vec![WALL; tw * grid.w]; th * grid.h];
    let mut resized: HashMap<usize, Vec<Vec<char>>> = HashMap::new();
    let mut placed = Vec::new();

    for slot in grid.all_slots() {
        let Some(p) = grid.get(slot) else {
            continue;
        };
        let t = grid.template(p);
        let mut cells = resized
            .entry(p.tpl)
            .or_insert_with(|| t.resized(&params))
            .clone();
        let open = grid.open_exits(slot);
        for d in Dir::ALL {
            if t.has_exit(d) && !open[d.index()] {
                seal(&mut cells, d, &params);
            }
        }
        let (ox, oy) = (slot.0 * tw, slot.1 * th);
        for (y, row) in cells.iter().enumerate() {
            for (x, c) in row.iter().enumerate() {
                canvas[oy + y][ox + x] = *c;
            }
        }
        if p.tpl != filler {
            placed.push(PlacedTile {
                name: t.name.clone(),
                category: t.category,
                slot,
                bbox: BBox::from_size(ox as i32, oy as i32, tw as i32, th as i32),
                gate: p.gate,
                exits: open,
            });
        }
    }

    TiledMap {
        rows: canvas.into_iter().map(|r| r.into_iter().collect()).collect(),
        tile_w: tw,
        tile_h: th,
        tiles_x: grid.w,
        tiles_y: grid.h,
        placed,
    }
}

/// Wall the exit band of one edge
fn seal(cells: &mut [Vec<char>], dir: Dir, params: &GenParams) {
    let (tw, th) = (params.tile_w(), params.tile_h());
    let xs = params.x[0]..params.x[0] + params.x[1];
    let ys = params.y[0]..params.y[0] + params.y[1];
    match dir {
        Dir::N => xs.for_each(|x| cells[0][x] = WALL),
        Dir::S => xs.for_each(|x| cells[th - 1][x] = WALL),
        Dir::W => ys.for_each(|y| cells[y][0] = WALL),
        Dir::E => ys.for_each(|y| cells[y][tw - 1] = WALL),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::builtin::castle_catalog;

    fn edge_openings(rows: &[Vec<char>], cells: impl Iterator<Item = (usize, usize)>) -> Vec<usize> {
        cells
            .enumerate()
            .filter(|(_, (x, y))| rows[*y][*x] != WALL)
            .map(|(i, _)| i)
            .collect()
    }

    fn assert_adjacency(map: &TiledMap) {
        let rows: Vec<Vec<char>> = map.rows.iter().map(|r| r.chars().collect()).collect();
        let (tw, th) = (map.tile_w, map.tile_h);
        for ty in 0..map.tiles_y {
            for tx in 0..map.tiles_x {
                let (ox, oy) = (tx * tw, ty * th);
                if tx + 1 < map.tiles_x {
                    let a = edge_openings(&rows, (0..th).map(|y| (ox + tw - 1, oy + y)));
                    let b = edge_openings(&rows, (0..th).map(|y| (ox + tw, oy + y)));
                    assert_eq!(a, b, "east edge of slot ({}, {})", tx, ty);
                }
                if ty + 1 < map.tiles_y {
                    let a = edge_openings(&rows, (0..tw).map(|x| (ox + x, oy + th - 1)));
                    let b = edge_openings(&rows, (0..tw).map(|x| (ox + x, oy + th)));
                    assert_eq!(a, b, "south edge of slot ({}, {})", tx, ty);
                }
            }
        }
    }

    #[test]
    fn test_output_size_and_adjacency() {
        let cat = castle_catalog().unwrap();
        let mut rng = GameRng::new(11);
        let conf = TilingConf {
            tiles_x: 6,
            tiles_y: 5,
            ..Default::default()
        };
        let map = tile_map(&cat, &conf, &mut rng).unwrap();
        assert_eq!(map.rows.len(), 35);
        assert!(map.rows.iter().all(|r| r.chars().count() == 42));
        assert!(!map.placed.is_empty());
        assert_adjacency(&map);
    }

    #[test]
    fn test_room_count_target() {
        let cat = castle_catalog().unwrap();
        let mut rng = GameRng::new(12);
        let conf = TilingConf {
            tiles_x: 8,
            tiles_y: 8,
            room_count: Some(5),
            ..Default::default()
        };
        let map = tile_map(&cat, &conf, &mut rng).unwrap();
        assert!(map.placed.len() <= 5);
        assert_adjacency(&map);
    }

    #[test]
    fn test_gates_open_to_the_outside() {
        let cat = castle_catalog().unwrap();
        let mut rng = GameRng::new(13);
        let conf = TilingConf {
            tiles_x: 5,
            tiles_y: 5,
            start_room: StartRoom::FourGates,
            ..Default::default()
        };
        let map = tile_map(&cat, &conf, &mut rng).unwrap();
        let gates = map.gates();
        assert_eq!(gates.len(), 4);
        for (tile, dir) in gates {
            assert!(tile.exits[dir.index()]);
        }
        // Only gates open onto the border
        let rows: Vec<Vec<char>> = map.rows.iter().map(|r| r.chars().collect()).collect();
        let (w, h) = (map.width(), map.height());
        let border_open = (0..w).filter(|&x| rows[0][x] != WALL).count()
            + (0..w).filter(|&x| rows[h - 1][x] != WALL).count()
            + (0..h).filter(|&y| rows[y][0] != WALL).count()
            + (0..h).filter(|&y| rows[y][w - 1] != WALL).count();
        assert_eq!(border_open, 4);
    }

    #[test]
    fn test_cross_constraint() {
        let cat = castle_catalog().unwrap();
        let mut rng = GameRng::new(14);
        let conf = TilingConf {
            tiles_x: 5,
            tiles_y: 5,
            constraint: Constraint::Cross,
            room_count: Some(9),
            ..Default::default()
        };
        let map = tile_map(&cat, &conf, &mut rng).unwrap();
        let centre = map.placed.iter().find(|p| p.slot == (2, 2)).unwrap();
        assert_eq!(centre.exits, [true, true, true, true]);
        for x in 0..5 {
            assert!(map.placed.iter().any(|p| p.slot == (x, 2)));
        }
        assert_adjacency(&map);
    }

    #[test]
    fn test_match_all_exits_and_widened_bands() {
        let cat = castle_catalog().unwrap();
        let mut rng = GameRng::new(15);
        let conf = TilingConf {
            tiles_x: 4,
            tiles_y: 4,
            gen_params: GenParams {
                x: [2, 3, 2],
                y: [3, 2, 3],
            },
            room_count: Some(3),
            try_to_match_all_exits: true,
            ..Default::default()
        };
        let map = tile_map(&cat, &conf, &mut rng).unwrap();
        assert_eq!(map.tile_w, 7);
        assert_eq!(map.tile_h, 8);
        assert!(map.placed.iter().all(|p| p.bbox.width() == 7 && p.bbox.height() == 8));
        assert_adjacency(&map);
    }

    #[test]
    fn test_filter_and_by_name() {
        let cat = castle_catalog().unwrap();
        let mut rng = GameRng::new(16);
        let no_vaults = |t: &TileTemplate| t.category != TileCategory::Vault;
        let conf = TilingConf {
            tiles_x: 6,
            tiles_y: 6,
            start_room: StartRoom::Center,
            filter: Some(&no_vaults),
            ..Default::default()
        };
        let map = tile_map(&cat, &conf, &mut rng).unwrap();
        let names = map.by_name();
        let total: usize = names.values().map(Vec::len).sum();
        assert_eq!(total, map.placed.len());
        assert!(
            map.placed
                .iter()
                .filter(|p| p.slot != (3, 3))
                .all(|p| p.category != TileCategory::Vault)
        );
    }

    #[test]
    fn test_same_seed_same_tiling() {
        let cat = castle_catalog().unwrap();
        let conf = TilingConf {
            tiles_x: 5,
            tiles_y: 4,
            ..Default::default()
        };
        let a = tile_map(&cat, &conf, &mut GameRng::new(99)).unwrap();
        let b = tile_map(&cat, &conf, &mut GameRng::new(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_grid_is_an_error() {
        let cat = castle_catalog().unwrap();
        let conf = TilingConf {
            tiles_x: 0,
            ..Default::default()
        };
        assert!(tile_map(&cat, &conf, &mut GameRng::new(1)).is_err());
    }
}
