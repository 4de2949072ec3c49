//! Room and corridor dungeons
//!
//! A dungeon is built in one linear pass:
//! 1. Dig rooms and corridors
//! 2. Inject big rooms within the dug budget
//! 3. Splash a feature into the first big room, stamp room markers and
//!    light ambient fires
//! 4. Place stairs in the two rooms furthest apart (best of N samples)
//! 5. Trace the critical path, lengthening it by breaking doors
//! 6. Embed a nest into a reserved footprint
//! 7. Populate
//!
//! The result is then verified for connectivity, optionally regenerated,
//! and stripped of transient markers.

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use super::nest::{NestGenerator, NestOptions};
use super::{markers, nearest_where};
use crate::entity::{EntityFactory, TableFactory};
use crate::error::{GenError, GenResult, check_dimensions, report};
use crate::geom::{
    BBox, Topology, floodfill, hollow_box, shortest_passable_path_with_doors, shortest_path,
};
use crate::level::{
    BigRoom, BigRoomKind, DungeonExtras, ExtrasKind, Level, LevelExtras, Room, StairsDir,
};
use crate::map::{Cell, CellMap, ElementKind, MarkerKind, Terrain};
use crate::mapgen::{DiggerConf, DugBudget, RoomsAux, connect_regions, dead_ends, dig_corridor, rooms_map};
use crate::population::{PopulateConf, add_main_loot, add_point_guardian, populate_level};
use crate::{
    Coord, DEFAULT_MAX_DANGER, DEFAULT_PRESERVED_MARKERS, GUARDIAN_DANGER_BONUS, GameRng,
    UNREACHABLE_TOLERANCE,
};

/// Search radius when a room centre is not passable
const ANCHOR_RADIUS: i32 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonOptions {
    pub min_num_rooms: usize,
    /// Every room at the same size
    pub uniform_rooms: bool,
    pub digger: DiggerConf,
    pub wall_type: Terrain,
    pub floor_type: Terrain,
    /// Chance of one big room when `big_room_count` is unset
    pub big_room_chance: f64,
    pub big_room_count: Option<usize>,
    /// Kinds to pick big rooms from; empty means all
    pub big_room_kinds: Vec<BigRoomKind>,
    pub add_splash: bool,
    pub add_fire: bool,
    /// Room pairs sampled when looking for the stairs rooms
    pub stairs_tries: usize,
    pub min_path_len: usize,
    pub break_tries: usize,
    pub nest: NestOptions,
    pub add_actors: bool,
    pub add_items: bool,
    pub max_danger: u32,
    pub max_value: u32,
    pub verify: bool,
    pub error_on_failure: bool,
    pub rerun_on_failure: bool,
    pub max_reruns: usize,
    pub remove_markers: bool,
    pub preserve_markers: Vec<MarkerKind>,
}

impl Default for DungeonOptions {
    fn default() -> Self {
        Self {
            min_num_rooms: 4,
            uniform_rooms: false,
            digger: DiggerConf::default(),
            wall_type: Terrain::Wall,
            floor_type: Terrain::Floor,
            big_room_chance: 0.3,
            big_room_count: None,
            big_room_kinds: Vec::new(),
            add_splash: true,
            add_fire: true,
            stairs_tries: 20,
            min_path_len: 20,
            break_tries: 10,
            nest: NestOptions::default(),
            add_actors: true,
            add_items: true,
            max_danger: DEFAULT_MAX_DANGER,
            max_value: 100,
            verify: true,
            error_on_failure: false,
            rerun_on_failure: false,
            max_reruns: 5,
            remove_markers: true,
            preserve_markers: DEFAULT_PRESERVED_MARKERS.to_vec(),
        }
    }
}

/// Room and corridor level generator
pub struct DungeonGenerator {
    nest: NestGenerator,
    factory: Box<dyn EntityFactory>,
}

impl Default for DungeonGenerator {
    fn default() -> Self {
        Self::new(Box::new(TableFactory::new()))
    }
}

impl DungeonGenerator {
    pub fn new(factory: Box<dyn EntityFactory>) -> Self {
        Self {
            nest: NestGenerator::new(),
            factory,
        }
    }

    fn create_once(
        &mut self,
        cols: i32,
        rows: i32,
        opts: &DungeonOptions,
        rng: &mut GameRng,
    ) -> GenResult<Level> {
        let (wall, floor) = (opts.wall_type, opts.floor_type);
        let digger = DiggerConf {
            min_num_rooms: opts.min_num_rooms,
            ..opts.digger.clone()
        };
        let (mut map, aux) = rooms_map(cols, rows, &digger, opts.uniform_rooms, wall, floor, rng);
        let RoomsAux {
            mut rooms,
            corridors,
            mut budget,
        } = aux;

        let big_rooms = add_big_rooms(&mut map, &mut rooms, &mut budget, opts, rng);
        let mut level = Level::new(map);

        if opts.add_splash {
            if let Some(first) = big_rooms.first() {
                self.add_splash(&mut level, first, rng);
            }
        }
        let dead = add_room_markers(&mut level, &rooms);
        if opts.add_fire {
            self.add_ambient_fire(&mut level, &rooms, rng);
        }

        markers::markers_to_doors(&mut level);
        let nest_box = big_rooms
            .iter()
            .find(|b| b.kind == BigRoomKind::Nest)
            .map(|b| b.room.bbox);
        let (start, end, start_room, end_room) = place_stairs(&mut level, &rooms, nest_box, opts, rng)?;

        let (critical_path, bridges) = critical_path(&mut level, start, end, nest_box, opts, rng);

        let mut nest_loot = Vec::new();
        if let Some(bbox) = nest_box {
            nest_loot = self
                .nest
                .create_and_embed(level.map_mut(), bbox, &opts.nest, rng)?;
            let joined = connect_regions(level.map_mut(), floor);
            log::debug!("nest embedded, {} regions joined", joined);
        }

        let mut extras = LevelExtras::with_kind(ExtrasKind::Dungeon(DungeonExtras {
            rooms,
            corridors,
            big_rooms,
            dead_ends: dead,
            start_room,
            end_room,
            bridges,
            nest_loot: nest_loot.clone(),
        }));
        extras.start_point = Some(start);
        extras.end_point = Some(end);
        extras.critical_path = critical_path;
        level.set_extras(extras);

        self.populate(&mut level, start_room, &nest_loot, opts, rng);
        Ok(level)
    }

    fn add_splash(&mut self, level: &mut Level, big: &BigRoom, rng: &mut GameRng) {
        let area = big.room.inner().shrink(1);
        if area.is_empty() {
            return;
        }
        let (cx, cy) = area.center();
        let r = (area.width().min(area.height()) / 3).max(0);
        let patch: Vec<Coord> = area
            .coords()
            .into_iter()
            .filter(|&(x, y)| (x - cx) * (x - cx) + (y - cy) * (y - cy) <= r * r)
            .filter(|&(x, y)| level.map().is_passable(x, y))
            .collect();
        let terrain = match big.kind {
            BigRoomKind::Center => Some(Terrain::Water),
            BigRoomKind::LargeCorridor { .. } => Some(Terrain::Chasm),
            BigRoomKind::Cross => Some(Terrain::Tree),
            BigRoomKind::SmallVault | BigRoomKind::LargeVault => None,
            BigRoomKind::Nest => return,
        };
        match terrain {
            Some(t) => {
                for &(x, y) in &patch {
                    level.map_mut().set_base(x, y, t);
                }
            }
            None => {
                for &(x, y) in &patch {
                    if !rng.one_in(2) {
                        continue;
                    }
                    if let Some(fire) = self.factory.create_actor("fire") {
                        level.add_actor(fire, x, y);
                    }
                }
            }
        }
        log::debug!("splashed {} cells into {} room", patch.len(), big.kind);
    }

    fn add_ambient_fire(&mut self, level: &mut Level, rooms: &[Room], rng: &mut GameRng) {
        let Some(room) = rng.choose(rooms) else {
            return;
        };
        for (x, y) in room.inner().corners() {
            if let Some(fire) = self.factory.create_actor("fire") {
                level.add_actor(fire, x, y);
            }
        }
    }

    fn populate(
        &mut self,
        level: &mut Level,
        start_room: Option<usize>,
        nest_loot: &[Coord],
        opts: &DungeonOptions,
        rng: &mut GameRng,
    ) {
        if !opts.add_actors && !opts.add_items {
            return;
        }
        let rooms: Vec<Room> = level
            .extras()
            .dungeon()
            .map(|d| {
                d.rooms
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| Some(*i) != start_room)
                    .map(|(_, r)| r.clone())
                    .collect()
            })
            .unwrap_or_default();
        let conf = PopulateConf {
            max_danger: opts.max_danger,
            max_value: opts.max_value,
            actors_per_room: usize::from(opts.add_actors),
            items_per_room: usize::from(opts.add_items),
            actor_filter: None,
        };
        let factory = self.factory.as_mut();
        let mut n = populate_level(level, factory, &rooms, &conf, rng);
        if opts.add_items {
            for &p in nest_loot {
                n += usize::from(add_main_loot(level, factory, p, opts.max_value, rng));
            }
        }
        if opts.add_actors {
            if let Some(&p) = nest_loot.first() {
                let boss = opts.max_danger + GUARDIAN_DANGER_BONUS;
                n += usize::from(add_point_guardian(level, factory, p, boss, rng));
            }
        }
        log::debug!("dungeon population placed {} entities", n);
    }
}

impl super::LevelGenerator for DungeonGenerator {
    type Options = DungeonOptions;
    type Output = Level;

    fn create(
        &mut self,
        cols: i32,
        rows: i32,
        opts: &DungeonOptions,
        rng: &mut GameRng,
    ) -> GenResult<Level> {
        check_dimensions(cols, rows)?;
        let attempts = if opts.rerun_on_failure {
            opts.max_reruns.max(1)
        } else {
            1
        };
        let mut attempt = 0;
        let mut level = loop {
            attempt += 1;
            let level = self.create_once(cols, rows, opts, rng)?;
            if !opts.verify {
                break level;
            }
            let unreachable = count_unreachable(&level);
            if unreachable <= UNREACHABLE_TOLERANCE {
                break level;
            }
            if attempt < attempts {
                log::warn!(
                    "attempt {}: {} cells unreachable, regenerating",
                    attempt,
                    unreachable
                );
                continue;
            }
            if opts.error_on_failure {
                return Err(report(GenError::Unreachable {
                    unreachable,
                    tolerance: UNREACHABLE_TOLERANCE,
                }));
            }
            log::warn!("accepting level with {} unreachable cells", unreachable);
            break level;
        };
        if opts.remove_markers {
            markers::remove_markers(&mut level, &opts.preserve_markers);
        }
        Ok(level)
    }
}

/// Passable cells the start point cannot reach with every door opened
/// Passable cells the start point cannot walk to. Plain doors open, closed
/// lever doors stay shut.
pub(crate) fn count_unreachable(level: &Level) -> usize {
    let map = level.map();
    let seed = level
        .extras()
        .start_point
        .or_else(|| map.coords_where(Cell::is_passable).first().copied());
    let Some(seed) = seed else {
        return 0;
    };
    let reached = floodfill(map, seed, Cell::is_passable, true);
    map.coords_where(Cell::is_passable)
        .into_iter()
        .filter(|p| !reached.contains(p))
        .count()
}

fn pick_kind(opts: &DungeonOptions, rng: &mut GameRng) -> Option<BigRoomKind> {
    if opts.big_room_kinds.is_empty() {
        rng.choose(&BigRoomKind::ALL).copied()
    } else {
        rng.choose(&opts.big_room_kinds).copied()
    }
}

fn corner_box(cols: i32, rows: i32, w: i32, h: i32, rng: &mut GameRng) -> BBox {
    let x = if rng.one_in(2) { 1 } else { cols - 1 - w };
    let y = if rng.one_in(2) { 1 } else { rows - 1 - h };
    BBox::from_size(x, y, w, h)
}

/// Outer boxes for one big room; a cross gives two intersecting bars
fn big_room_boxes(kind: BigRoomKind, cols: i32, rows: i32, nest: &NestOptions, rng: &mut GameRng) -> Vec<BBox> {
    let boxes = match kind {
        BigRoomKind::Center => {
            let (w, h) = ((cols / 3).max(5), (rows / 3).max(5));
            vec![BBox::from_size((cols - w) / 2, (rows - h) / 2, w, h)]
        }
        BigRoomKind::LargeCorridor { horizontal: true } => {
            let y = rng.get_uniform_int(1, (rows - 7).max(1));
            vec![BBox::from_size(2, y, cols - 4, 5)]
        }
        BigRoomKind::LargeCorridor { horizontal: false } => {
            let x = rng.get_uniform_int(1, (cols - 7).max(1));
            vec![BBox::from_size(x, 2, 5, rows - 4)]
        }
        BigRoomKind::Cross => {
            let (w, h) = ((cols / 2).max(5), (rows / 2).max(5));
            vec![
                BBox::from_size((cols - w) / 2, rows / 2 - 2, w, 5),
                BBox::from_size(cols / 2 - 2, (rows - h) / 2, 5, h),
            ]
        }
        BigRoomKind::SmallVault => vec![corner_box(cols, rows, 7, 7, rng)],
        BigRoomKind::LargeVault => vec![corner_box(cols, rows, 11, 9, rng)],
        BigRoomKind::Nest => {
            let params = nest.gen_params.clamped();
            let (w, h) = (2 * params.tile_w() as i32, 2 * params.tile_h() as i32);
            vec![corner_box(cols, rows, w, h, rng)]
        }
    };
    let inside = BBox::new(1, 1, cols - 2, rows - 2);
    if boxes.iter().all(|b| inside.contains_bbox(b) && b.width() >= 3 && b.height() >= 3) {
        boxes
    } else {
        Vec::new()
    }
}

fn is_closed_kind(kind: BigRoomKind) -> bool {
    matches!(
        kind,
        BigRoomKind::SmallVault | BigRoomKind::LargeVault | BigRoomKind::Nest
    )
}

/// Carve big rooms while the dug budget allows; returns them in order
fn add_big_rooms(
    map: &mut CellMap,
    rooms: &mut [Room],
    budget: &mut DugBudget,
    opts: &DungeonOptions,
    rng: &mut GameRng,
) -> Vec<BigRoom> {
    let count = opts
        .big_room_count
        .unwrap_or_else(|| usize::from(rng.get_uniform() < opts.big_room_chance));
    let total = (map.cols() - 2).max(1) * (map.rows() - 2).max(1);
    let mut out: Vec<BigRoom> = Vec::new();

    for _ in 0..count {
        let Some(kind) = pick_kind(opts, rng) else {
            break;
        };
        let boxes = big_room_boxes(kind, map.cols(), map.rows(), &opts.nest, rng);
        if boxes.is_empty() {
            log::debug!("no space for a {} room", kind);
            continue;
        }
        let clashes = out.iter().any(|b| {
            (is_closed_kind(b.kind) || is_closed_kind(kind))
                && boxes.iter().any(|n| n.overlaps(&b.room.bbox))
        });
        if clashes || (kind == BigRoomKind::Nest && out.iter().any(|b| b.kind == kind)) {
            continue;
        }
        let area: i32 = boxes.iter().map(|b| b.shrink(1).area()).sum();
        if !budget.has_room_for(area, total) {
            log::debug!("{} room skipped, dug {:.2}", kind, budget.dug());
            continue;
        }
        for bbox in boxes {
            let mut room = Room::new(kind.category(), bbox);
            carve_big_room(map, &mut room, kind, opts.floor_type, opts.wall_type);
            if kind != BigRoomKind::Nest {
                join_to_nearest(map, &mut room, rooms, opts.floor_type, rng);
            }
            out.push(BigRoom { room, kind });
        }
        budget.add_area(area, total);
    }
    if !out.is_empty() {
        log::debug!("added {} big rooms, dug {:.2}", out.len(), budget.dug());
    }
    out
}

fn carve_big_room(map: &mut CellMap, room: &mut Room, kind: BigRoomKind, floor: Terrain, wall: Terrain) {
    if is_closed_kind(kind) {
        // Corridors crossing the ring become doors, the rest is walled
        for (x, y) in hollow_box(&room.bbox) {
            if map.is_passable(x, y) {
                if let Some(cell) = map.get_mut(x, y) {
                    cell.add_marker(MarkerKind::Door);
                }
                room.add_door((x, y));
            } else {
                map.set_base(x, y, wall);
            }
        }
    }
    map.fill(&room.inner(), floor);
}

/// Dig from the big room towards the nearest ordinary room
fn join_to_nearest(map: &mut CellMap, big: &mut Room, rooms: &mut [Room], floor: Terrain, rng: &mut GameRng) {
    let from = big.center();
    let Some(target) = rooms
        .iter()
        .filter(|r| !big.bbox.contains(r.center().0, r.center().1))
        .min_by_key(|r| Topology::Four.distance(r.center(), from))
        .map(Room::center)
    else {
        return;
    };
    for (x, y) in dig_corridor(map, from, target, floor, rng) {
        if big.is_wall(x, y) {
            big.add_door((x, y));
            if let Some(cell) = map.get_mut(x, y) {
                cell.add_marker(MarkerKind::Door);
            }
        }
        for room in rooms.iter_mut() {
            if room.is_wall(x, y) {
                room.add_door((x, y));
            }
        }
    }
}

/// Door, boundary and dead-end markers; returns the dead ends
fn add_room_markers(level: &mut Level, rooms: &[Room]) -> Vec<Coord> {
    for room in rooms {
        for &(x, y) in &room.doors {
            level.add_marker(MarkerKind::Door, x, y);
        }
        for (x, y) in hollow_box(&room.bbox) {
            if !room.doors.contains(&(x, y)) && !level.map().is_passable(x, y) {
                level.add_marker(MarkerKind::RoomBoundary, x, y);
            }
        }
    }
    let dead = dead_ends(level.map());
    for &(x, y) in &dead {
        level.add_marker(MarkerKind::DeadEnd, x, y);
    }
    dead
}

fn anchor(map: &CellMap, p: Coord) -> Option<Coord> {
    nearest_where(map, p, ANCHOR_RADIUS, Cell::is_passable)
}

/// Best of N random room pairs by walking distance
fn place_stairs(
    level: &mut Level,
    rooms: &[Room],
    nest_box: Option<BBox>,
    opts: &DungeonOptions,
    rng: &mut GameRng,
) -> GenResult<(Coord, Coord, Option<usize>, Option<usize>)> {
    let map = level.map();
    let candidates: Vec<(usize, Coord)> = rooms
        .iter()
        .enumerate()
        .filter(|(_, r)| nest_box.is_none_or(|n| !n.overlaps(&r.bbox)))
        .filter_map(|(i, r)| anchor(map, r.center()).map(|p| (i, p)))
        .collect();

    let mut best: Option<(usize, usize, usize)> = None;
    if candidates.len() >= 2 {
        for _ in 0..opts.stairs_tries.max(1) {
            let pair = rng.get_unique_items(&candidates, 2);
            let (a, b) = (pair[0], pair[1]);
            let len = shortest_passable_path_with_doors(map, a.1, b.1).len();
            if best.is_none_or(|(_, _, l)| len > l) {
                best = Some((a.0, b.0, len));
            }
        }
    }

    let (start, end, start_room, end_room) = match best {
        Some((i, j, _)) => {
            let pos = |k: usize| candidates.iter().find(|c| c.0 == k).map(|c| c.1);
            match (pos(i), pos(j)) {
                (Some(s), Some(e)) => (s, e, Some(i), Some(j)),
                _ => return Err(report(GenError::NoRooms("stairs"))),
            }
        }
        None => {
            log::warn!("fewer than two usable rooms, placing stairs on free cells");
            let free = level.free_cells();
            let pair = rng.get_unique_items(&free, 2);
            if pair.len() < 2 {
                return Err(report(GenError::NoRooms("stairs")));
            }
            (pair[0], pair[1], None, None)
        }
    };
    level.add_stairs(StairsDir::Up, start.0, start.1);
    level.add_stairs(StairsDir::Down, end.0, end.1);
    level.add_marker(MarkerKind::StartPoint, start.0, start.1);
    level.add_marker(MarkerKind::EndPoint, end.0, end.1);
    Ok((start, end, start_room, end_room))
}

fn path_avoiding(map: &CellMap, from: Coord, to: Coord, nest_box: Option<BBox>) -> Vec<Coord> {
    shortest_path(from, to, Topology::Eight, |x, y| {
        nest_box.is_none_or(|n| !n.contains(x, y))
            && map
                .get(x, y)
                .is_some_and(|c| c.is_passable_with_doors() && !c.has_marker(MarkerKind::PathBroken))
    })
}

/// Critical path from start to end and the bridges laid for it.
///
/// Without a walkable route the path goes through walls and every blocked
/// cell on it becomes a bridge. A path shorter than `min_path_len` is
/// lengthened by breaking doors on it; a break that leaves no route is
/// undone. Broken doors end up as walls.
fn critical_path(
    level: &mut Level,
    start: Coord,
    end: Coord,
    nest_box: Option<BBox>,
    opts: &DungeonOptions,
    rng: &mut GameRng,
) -> (Vec<Coord>, Vec<Coord>) {
    let mut bridges = Vec::new();
    let mut path = path_avoiding(level.map(), start, end, nest_box);
    if path.is_empty() {
        let map = level.map();
        path = shortest_path(start, end, Topology::Four, |x, y| {
            map.has_xy(x, y) && !map.is_edge(x, y) && nest_box.is_none_or(|n| !n.contains(x, y))
        });
        for &(x, y) in &path {
            if !level.map().is_passable(x, y) {
                level.map_mut().set_base(x, y, Terrain::Bridge);
                level.remove_elements(ElementKind::Door, x, y);
                bridges.push((x, y));
            }
        }
        log::debug!("critical path needed {} bridges", bridges.len());
    }

    let mut broken = Vec::new();
    let mut rejected: HashSet<Coord> = HashSet::new();
    let mut tries = 0;
    while path.len() < opts.min_path_len && tries < opts.break_tries {
        tries += 1;
        let doors: Vec<Coord> = path
            .iter()
            .copied()
            .filter(|&p| p != start && p != end)
            .filter(|&(x, y)| level.map().get(x, y).is_some_and(Cell::has_door))
            .filter(|p| !rejected.contains(p))
            .collect();
        let Some(&(x, y)) = rng.choose(&doors) else {
            break;
        };
        level.add_marker(MarkerKind::PathBroken, x, y);
        let detour = path_avoiding(level.map(), start, end, nest_box);
        if detour.len() < path.len() {
            if let Some(cell) = level.map_mut().get_mut(x, y) {
                cell.remove_marker(MarkerKind::PathBroken);
            }
            rejected.insert((x, y));
            continue;
        }
        broken.push((x, y));
        path = detour;
    }
    if path.len() < opts.min_path_len {
        log::warn!(
            "critical path has {} cells, wanted {}",
            path.len(),
            opts.min_path_len
        );
    }

    for &(x, y) in &broken {
        level.remove_elements(ElementKind::Door, x, y);
        level.map_mut().set_base(x, y, opts.wall_type);
    }
    for &(x, y) in &path {
        level.add_marker(MarkerKind::CriticalPath, x, y);
    }
    (path, bridges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::LevelGenerator;
    use crate::map::{Element, LeverDoor};

    fn quiet() -> DungeonOptions {
        DungeonOptions {
            add_actors: false,
            add_items: false,
            add_fire: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_dead_end_door_is_tried_once() {
        let ascii = "###############\n#..+....+.....#\n#######.#.#####\n\
                     #######...#####\n###############";
        for seed in 0..20 {
            let mut level = Level::new(CellMap::from_ascii(ascii));
            markers::markers_to_doors(&mut level);
            let opts = DungeonOptions {
                min_path_len: 100,
                break_tries: 2,
                ..quiet()
            };
            let mut rng = GameRng::new(seed);
            let (path, _) = critical_path(&mut level, (1, 1), (13, 1), None, &opts, &mut rng);
            assert_eq!(level.map().base(8, 1), Some(Terrain::Wall), "seed {}", seed);
            assert!(level.map().get(3, 1).is_some_and(Cell::has_door));
            assert!(path.len() >= 13 && !path.contains(&(8, 1)));
        }
    }

    #[test]
    fn test_closed_lever_door_counts_as_a_wall() {
        let map = CellMap::from_ascii("#############\n#...#.......#\n#############");
        let mut level = Level::new(map);
        level.map_mut().set_base(4, 1, Terrain::Floor);
        if let Some(cell) = level.map_mut().get_mut(4, 1) {
            cell.elements.push(Element::LeverDoor(LeverDoor { closed: true }));
        }
        level.extras_mut().start_point = Some((1, 1));
        assert_eq!(count_unreachable(&level), 7);

        if let Some(cell) = level.map_mut().get_mut(4, 1) {
            cell.elements.clear();
            cell.elements.push(Element::LeverDoor(LeverDoor { closed: false }));
        }
        assert_eq!(count_unreachable(&level), 0);
    }

    #[test]
    fn test_stairs_and_extras() {
        let mut rng = GameRng::new(51);
        let level = DungeonGenerator::default()
            .create(80, 40, &quiet(), &mut rng)
            .unwrap();
        let extras = level.extras();
        let (start, end) = (extras.start_point.unwrap(), extras.end_point.unwrap());
        assert_ne!(start, end);
        assert!(level.stairs_at(start.0, start.1).is_some());
        assert!(level.stairs_at(end.0, end.1).is_some());
        assert_eq!(extras.critical_path.first(), Some(&start));
        assert_eq!(extras.critical_path.last(), Some(&end));
        let dungeon = extras.dungeon().unwrap();
        assert!(dungeon.rooms.len() >= 2);
        assert!(level.cells_with_marker(MarkerKind::Door).is_empty());
        assert!(level.cells_with_marker(MarkerKind::RoomBoundary).is_empty());
    }

    #[test]
    fn test_big_rooms_respect_budget() {
        let mut rng = GameRng::new(52);
        let opts = DungeonOptions {
            big_room_count: Some(3),
            big_room_kinds: vec![BigRoomKind::SmallVault, BigRoomKind::Center],
            ..quiet()
        };
        let level = DungeonGenerator::default()
            .create(80, 40, &opts, &mut rng)
            .unwrap();
        let dungeon = level.extras().dungeon().unwrap();
        assert!(!dungeon.big_rooms.is_empty());
        for big in &dungeon.big_rooms {
            let (cx, cy) = big.room.inner().center();
            assert!(level.map().get(cx, cy).is_some());
            assert!(big.room.bbox.ulx >= 1 && big.room.bbox.lrx <= 78);
        }
    }

    #[test]
    fn test_vault_ring_is_walled_except_doors() {
        let mut map = CellMap::new(20, 20, Terrain::Wall);
        map.fill(&BBox::new(1, 5, 18, 5), Terrain::Floor);
        let mut room = Room::new(crate::level::RoomCategory::Vault, BBox::new(3, 3, 9, 9));
        carve_big_room(&mut map, &mut room, BigRoomKind::SmallVault, Terrain::Floor, Terrain::Wall);
        assert_eq!(room.doors, vec![(3, 5), (9, 5)]);
        assert!(map.get(3, 5).is_some_and(|c| c.has_marker(MarkerKind::Door)));
        assert!(map.is_wall(3, 4));
        assert!(map.is_passable(6, 6));
    }

    #[test]
    fn test_nest_is_embedded() {
        let mut rng = GameRng::new(53);
        let opts = DungeonOptions {
            big_room_count: Some(1),
            big_room_kinds: vec![BigRoomKind::Nest],
            ..quiet()
        };
        let level = DungeonGenerator::default()
            .create(80, 40, &opts, &mut rng)
            .unwrap();
        let dungeon = level.extras().dungeon().unwrap();
        assert_eq!(dungeon.big_rooms.len(), 1);
        let bbox = dungeon.big_rooms[0].room.bbox;
        assert!(level.map().iter().any(|c| bbox.contains(c.x, c.y) && c.base == Terrain::WallCave));
    }

    #[test]
    fn test_population_places_entities() {
        let mut rng = GameRng::new(54);
        let level = DungeonGenerator::default()
            .create(80, 40, &DungeonOptions::default(), &mut rng)
            .unwrap();
        assert!(!level.actors().is_empty());
        assert!(!level.items().is_empty());
    }

    #[test]
    fn test_critical_path_is_walkable() {
        let mut rng = GameRng::new(55);
        let level = DungeonGenerator::default()
            .create(80, 40, &quiet(), &mut rng)
            .unwrap();
        let path = &level.extras().critical_path;
        for &(x, y) in path {
            assert!(level.map().get(x, y).is_some_and(Cell::is_passable_with_doors));
        }
    }
}
