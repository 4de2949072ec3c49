//! Miner-carved caves, optionally collapsed into chasms with catwalks

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::markers;
use super::nest::{NestGenerator, NestOptions};
use crate::entity::{ActorTemplate, ActorTraits, EntityFactory, TableFactory};
use crate::error::{GenError, GenResult, check_dimensions, report};
use crate::geom::{BBox, Topology, shortest_passable_path, shortest_path};
use crate::level::{CaveExtras, ExtrasKind, Level, LevelExtras, StairsDir};
use crate::map::{CellMap, MarkerKind, Terrain};
use crate::mapgen::{Brush, CaveConf, MinerStart, connect_regions, layout_miners, mine};
use crate::population::{PopulateConf, add_guardian_with, add_main_loot, populate_point};
use crate::{
    Coord, DEFAULT_MAX_DANGER, DEFAULT_PRESERVED_MARKERS, GUARDIAN_DANGER_BONUS, GameRng,
};

/// Chance of a collapsed cave when the caller does not decide
const COLLAPSE_CHANCE: f64 = 0.1;

/// Cave sub-types, each with its own miner layout
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CaveType {
    #[default]
    Cave,
    Grotto,
    /// One entrance from the edge and a boss at the far end
    Lair,
    Cavern,
}

impl CaveType {
    /// `base` with the miner layout of this sub-type
    pub fn miner_conf(self, base: &CaveConf) -> CaveConf {
        let (primary, additional, ratio) = match self {
            CaveType::Cave => (MinerStart::Center, 2, base.target_ratio),
            CaveType::Grotto => (MinerStart::Center, 0, 0.25),
            CaveType::Lair => (MinerStart::Edge, 1, base.target_ratio),
            CaveType::Cavern => (MinerStart::Center, 5, 0.45),
        };
        CaveConf {
            primary,
            additional,
            target_ratio: ratio,
            ..base.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaveOptions {
    pub cave_type: CaveType,
    /// Forced collapse; rolled when unset
    pub is_collapsed: Option<bool>,
    pub max_danger: u32,
    pub max_value: u32,
    pub add_actors: bool,
    pub add_items: bool,
    pub add_nest: bool,
    pub nest_tries: usize,
    pub nest: NestOptions,
    /// Attempts at finding an end point far enough from the start
    pub end_watchdog: usize,
    pub max_spurs: usize,
    pub cave: CaveConf,
    pub remove_markers: bool,
    pub preserve_markers: Vec<MarkerKind>,
}

impl Default for CaveOptions {
    fn default() -> Self {
        Self {
            cave_type: CaveType::Cave,
            is_collapsed: None,
            max_danger: DEFAULT_MAX_DANGER,
            max_value: 100,
            add_actors: true,
            add_items: true,
            add_nest: true,
            nest_tries: 10,
            nest: NestOptions::default(),
            end_watchdog: 20,
            max_spurs: 10,
            cave: CaveConf::default(),
            remove_markers: true,
            preserve_markers: DEFAULT_PRESERVED_MARKERS.to_vec(),
        }
    }
}

pub struct CaveGenerator {
    nest: NestGenerator,
    factory: Box<dyn EntityFactory>,
}

impl Default for CaveGenerator {
    fn default() -> Self {
        Self::new(Box::new(TableFactory::new()))
    }
}

impl CaveGenerator {
    pub fn new(factory: Box<dyn EntityFactory>) -> Self {
        Self {
            nest: NestGenerator::new(),
            factory,
        }
    }

    /// Try random footprints until one fits away from the key points
    fn embed_nest(
        &mut self,
        map: &mut CellMap,
        keep_clear: &[Coord],
        opts: &CaveOptions,
        rng: &mut GameRng,
    ) -> GenResult<Option<(BBox, Vec<Coord>)>> {
        let params = opts.nest.gen_params.clamped();
        let (tw, th) = (params.tile_w() as i32, params.tile_h() as i32);
        for attempt in 1..=opts.nest_tries {
            let n = rng.get_uniform_int(1, 2);
            let (w, h) = (n * tw, n * th);
            if w > map.cols() - 2 || h > map.rows() - 2 {
                continue;
            }
            let x = rng.get_uniform_int(1, map.cols() - 1 - w);
            let y = rng.get_uniform_int(1, map.rows() - 1 - h);
            let bbox = BBox::from_size(x, y, w, h);
            let open = bbox
                .coords()
                .into_iter()
                .filter(|&(cx, cy)| map.is_passable(cx, cy))
                .count() as i32;
            if open * 4 < bbox.area() || keep_clear.iter().any(|&(px, py)| bbox.contains(px, py)) {
                log::debug!("nest attempt {} at {:?} rejected", attempt, bbox);
                continue;
            }
            let loot = self.nest.create_and_embed(map, bbox, &opts.nest, rng)?;
            return Ok(Some((bbox, loot)));
        }
        log::warn!("gave up embedding a nest after {} attempts", opts.nest_tries);
        Ok(None)
    }

    fn populate(
        &mut self,
        level: &mut Level,
        points: &[Coord],
        nest_loot: &[Coord],
        collapsed: bool,
        opts: &CaveOptions,
        rng: &mut GameRng,
    ) {
        let max_danger = opts.max_danger;
        let flying: &dyn Fn(&ActorTemplate) -> bool =
            &move |t| t.danger <= max_danger && t.traits.contains(ActorTraits::FLYING);
        let conf = PopulateConf {
            max_danger,
            max_value: opts.max_value,
            actors_per_room: usize::from(opts.add_actors),
            items_per_room: usize::from(opts.add_items),
            actor_filter: collapsed.then_some(flying),
        };
        // Over chasm only flyers can reach anything off the catwalks
        let guard_danger = max_danger + GUARDIAN_DANGER_BONUS;
        let guardian = move |t: &ActorTemplate| {
            t.danger <= guard_danger && (!collapsed || t.traits.contains(ActorTraits::FLYING))
        };
        let factory = self.factory.as_mut();
        let mut n = 0;
        if opts.add_actors || opts.add_items {
            for &p in points {
                n += populate_point(level, factory, p, &conf, rng);
            }
        }
        if opts.add_items {
            for &p in nest_loot {
                n += usize::from(add_main_loot(level, factory, p, opts.max_value, rng));
            }
        }
        if opts.add_actors {
            if let Some(&p) = nest_loot.first() {
                n += usize::from(add_guardian_with(level, factory, p, &guardian, rng));
            }
        }

        if opts.cave_type == CaveType::Lair {
            if let Some(end) = level.extras().end_point {
                if add_guardian_with(level, factory, end, &guardian, rng) {
                    n += 1;
                } else {
                    log::warn!("no boss fits the lair end point {:?}", end);
                }
                n += usize::from(add_main_loot(level, factory, end, opts.max_value, rng));
            }
        }
        log::debug!("cave population placed {} entities", n);
    }
}

impl super::LevelGenerator for CaveGenerator {
    type Options = CaveOptions;
    type Output = Level;

    fn create(
        &mut self,
        cols: i32,
        rows: i32,
        opts: &CaveOptions,
        rng: &mut GameRng,
    ) -> GenResult<Level> {
        check_dimensions(cols, rows)?;
        let conf = opts.cave_type.miner_conf(&opts.cave);
        let miners = layout_miners(cols, rows, &conf, rng);
        let (mut map, miners) = mine(cols, rows, &conf, miners, rng);
        connect_regions(&mut map, conf.floor);

        let mut starts: Vec<Coord> = Vec::new();
        for m in &miners {
            if map.is_passable(m.start.0, m.start.1) && !starts.contains(&m.start) {
                starts.push(m.start);
            }
        }
        let mut pool = map.passable_cells();
        let (start, end, path) = pick_points(&map, &starts, &mut pool, opts.end_watchdog, rng)
            .ok_or_else(|| report(GenError::NoRooms("cave end points")))?;

        let collapsed = opts
            .is_collapsed
            .unwrap_or_else(|| rng.get_uniform() < COLLAPSE_CHANCE);
        let n_spurs = rng.get_uniform_int(1, opts.max_spurs.max(1) as i32) as usize;
        let spur_points = rng.get_unique_items(&pool, n_spurs);

        let mut nest_box = None;
        let mut nest_loot = Vec::new();
        if opts.add_nest {
            let mut keep_clear = path.clone();
            keep_clear.extend(&spur_points);
            if let Some((bbox, loot)) = self.embed_nest(&mut map, &keep_clear, opts, rng)? {
                connect_regions(&mut map, conf.floor);
                nest_box = Some(bbox);
                nest_loot = loot;
            }
        }

        if collapsed {
            let mut anchors = spur_points.clone();
            if let Some(bbox) = nest_box {
                let entry = nest_loot.first().copied().or_else(|| {
                    bbox.coords()
                        .into_iter()
                        .find(|&(x, y)| map.is_passable(x, y))
                });
                anchors.extend(entry);
            }
            collapse(&mut map, &path, &anchors, nest_box, conf.floor);
        }

        let mut level = Level::new(map);
        level.add_stairs(StairsDir::Up, start.0, start.1);
        level.add_stairs(StairsDir::Down, end.0, end.1);
        level.add_marker(MarkerKind::StartPoint, start.0, start.1);
        level.add_marker(MarkerKind::EndPoint, end.0, end.1);
        for &(x, y) in &path {
            level.add_marker(MarkerKind::CriticalPath, x, y);
        }

        let mut extras = LevelExtras::with_kind(ExtrasKind::Cave(CaveExtras {
            cave_type: opts.cave_type,
            collapsed,
            spur_points: spur_points.clone(),
            nest: nest_box,
            nest_loot: nest_loot.clone(),
        }));
        extras.start_point = Some(start);
        extras.end_point = Some(end);
        extras.critical_path = path;
        level.set_extras(extras);

        self.populate(&mut level, &spur_points, &nest_loot, collapsed, opts, rng);
        if opts.remove_markers {
            markers::remove_markers(&mut level, &opts.preserve_markers);
        }
        log::debug!(
            "{} cave {}x{}{}",
            opts.cave_type,
            cols,
            rows,
            if collapsed { ", collapsed" } else { "" }
        );
        Ok(level)
    }
}

/// Start, end and the path between them.
///
/// Two distinct miner starts are used when available. Otherwise the end is
/// sampled from `pool` until its path is longer than the shorter map side;
/// the accepted path is removed from `pool`.
fn pick_points(
    map: &CellMap,
    starts: &[Coord],
    pool: &mut Vec<Coord>,
    watchdog: usize,
    rng: &mut GameRng,
) -> Option<(Coord, Coord, Vec<Coord>)> {
    if starts.len() >= 2 {
        let pair = rng.get_unique_items(starts, 2);
        let path = shortest_passable_path(map, pair[0], pair[1]);
        if !path.is_empty() {
            pool.retain(|p| !path.contains(p));
            return Some((pair[0], pair[1], path));
        }
    }

    let start = match starts.first() {
        Some(&s) => s,
        None => *rng.choose(pool)?,
    };
    let wanted = map.cols().min(map.rows()) as usize;
    let mut best: Option<(Coord, Vec<Coord>)> = None;
    for _ in 0..watchdog.max(1) {
        let Some(&end) = rng.choose(pool) else {
            break;
        };
        if end == start {
            continue;
        }
        let path = shortest_passable_path(map, start, end);
        if path.len() > best.as_ref().map_or(0, |b| b.1.len()) {
            let done = path.len() > wanted;
            best = Some((end, path));
            if done {
                break;
            }
        }
    }
    let (end, path) = best?;
    if path.len() <= wanted {
        log::warn!(
            "cave end point watchdog exhausted, path of {} cells",
            path.len()
        );
    }
    pool.retain(|p| !path.contains(p));
    Some((start, end, path))
}

/// Width of the floor left along every catwalk
const CATWALK_BRUSH: Brush = Brush::Cross(1);

/// Turn the floor into chasm, keeping catwalks along the main path and
/// out to every anchor. Cells inside `keep` are left as they are.
fn collapse(
    map: &mut CellMap,
    path: &[Coord],
    anchors: &[Coord],
    keep: Option<BBox>,
    floor: Terrain,
) {
    let mut walks: Vec<Vec<Coord>> = vec![path.to_vec()];
    for &anchor in anchors {
        let Some(&from) = path
            .iter()
            .min_by_key(|&&p| Topology::Eight.distance(p, anchor))
        else {
            continue;
        };
        let walk = shortest_path(from, anchor, Topology::Eight, |x, y| map.is_passable(x, y));
        walks.push(walk);
    }
    let kept = |x: i32, y: i32| keep.is_some_and(|b| b.contains(x, y));
    for cell in map.iter_mut() {
        if cell.base == floor && !kept(cell.x, cell.y) {
            cell.base = Terrain::Chasm;
        }
    }
    for walk in &walks {
        for &(x, y) in walk {
            for (bx, by) in CATWALK_BRUSH.cells(x, y) {
                if (bx, by) == (x, y) || map.base(bx, by) == Some(Terrain::Chasm) {
                    map.set_base(bx, by, floor);
                }
            }
        }
    }
    log::debug!("collapsed cave keeps {} catwalks", walks.len());
}
