//! Room and corridor digging
//!
//! Rooms are placed at random without touching each other and joined in
//! four phases:
//! 1. Connect neighbours in placement order (room i to room i+1)
//! 2. Connect rooms two steps apart if not already connected
//! 3. Join whatever is still in a separate equivalence class
//! 4. Add a few random extra corridors

use serde::{Deserialize, Serialize};

use super::conf::DiggerConf;
use crate::geom::BBox;
use crate::level::{Room, RoomCategory};
use crate::map::{CellMap, Terrain};
use crate::{Coord, GameRng, MAX_DUG_PERCENTAGE};

/// Running share of the map dug out as floor, clamped to `max`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DugBudget {
    dug: f64,
    max: f64,
}

impl Default for DugBudget {
    fn default() -> Self {
        Self::new(MAX_DUG_PERCENTAGE)
    }
}

impl DugBudget {
    pub fn new(max: f64) -> Self {
        Self {
            dug: 0.0,
            max: max.clamp(0.0, 1.0),
        }
    }

    pub fn dug(&self) -> f64 {
        self.dug
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Record `area` more cells out of `total`; returns the new share
    pub fn add_area(&mut self, area: i32, total: i32) -> f64 {
        if total > 0 {
            self.dug = (self.dug + area as f64 / total as f64).min(self.max);
        }
        self.dug
    }

    /// Would `area` more cells stay under the cap?
    pub fn has_room_for(&self, area: i32, total: i32) -> bool {
        total > 0 && self.dug + area as f64 / total as f64 <= self.max
    }
}

/// Rooms, corridors and the budget used to dig them
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoomsAux {
    pub rooms: Vec<Room>,
    pub corridors: Vec<Room>,
    pub budget: DugBudget,
}

/// Tracks room connectivity using equivalence classes
#[derive(Debug, Clone)]
pub struct ConnectivityTracker {
    classes: Vec<usize>,
}

impl ConnectivityTracker {
    pub fn new(num_rooms: usize) -> Self {
        Self {
            classes: (0..num_rooms).collect(),
        }
    }

    pub fn are_connected(&self, a: usize, b: usize) -> bool {
        if a >= self.classes.len() || b >= self.classes.len() {
            return false;
        }
        self.classes[a] == self.classes[b]
    }

    /// Merge `b`'s class into `a`'s
    pub fn merge(&mut self, a: usize, b: usize) {
        if a >= self.classes.len() || b >= self.classes.len() {
            return;
        }
        let old = self.classes[b];
        let new = self.classes[a];
        for c in &mut self.classes {
            if *c == old {
                *c = new;
            }
        }
    }

    pub fn all_connected(&self) -> bool {
        match self.classes.first() {
            Some(first) => self.classes.iter().all(|c| c == first),
            None => true,
        }
    }
}

/// Generate a rooms map, retrying while fewer than `min_num_rooms` fit.
///
/// After `watchdog` attempts the last map is accepted as it is.
pub fn rooms_map(
    cols: i32,
    rows: i32,
    conf: &DiggerConf,
    uniform: bool,
    wall: Terrain,
    floor: Terrain,
    rng: &mut GameRng,
) -> (CellMap, RoomsAux) {
    let mut out = dig_once(cols, rows, conf, uniform, wall, floor, rng);
    for attempt in 1..conf.watchdog.max(1) {
        if out.1.rooms.len() >= conf.min_num_rooms {
            break;
        }
        log::debug!(
            "digger attempt {} produced {} rooms, retrying",
            attempt,
            out.1.rooms.len()
        );
        out = dig_once(cols, rows, conf, uniform, wall, floor, rng);
    }
    if out.1.rooms.len() < conf.min_num_rooms {
        log::warn!(
            "digger watchdog exhausted: {} rooms, wanted {}",
            out.1.rooms.len(),
            conf.min_num_rooms
        );
    }
    out
}

fn dig_once(
    cols: i32,
    rows: i32,
    conf: &DiggerConf,
    uniform: bool,
    wall: Terrain,
    floor: Terrain,
    rng: &mut GameRng,
) -> (CellMap, RoomsAux) {
    let mut map = CellMap::new(cols, rows, wall);
    let total = (cols - 2).max(1) * (rows - 2).max(1);
    let target = conf.dug_percentage.min(MAX_DUG_PERCENTAGE);
    let mut budget = DugBudget::default();
    let mut rooms: Vec<Room> = Vec::new();
    let fixed = (
        (conf.room_width.0 + conf.room_width.1) / 2,
        (conf.room_height.0 + conf.room_height.1) / 2,
    );

    for _ in 0..conf.placement_tries {
        if budget.dug() >= target {
            break;
        }
        let (w, h) = if uniform {
            fixed
        } else {
            (
                rng.get_uniform_int(conf.room_width.0, conf.room_width.1),
                rng.get_uniform_int(conf.room_height.0, conf.room_height.1),
            )
        };
        // Outer walls stay off the map border
        let max_x = cols - 1 - (w + 2);
        let max_y = rows - 1 - (h + 2);
        if max_x < 1 || max_y < 1 {
            continue;
        }
        let x = rng.get_uniform_int(1, max_x);
        let y = rng.get_uniform_int(1, max_y);
        let room = Room::new(RoomCategory::Room, BBox::from_size(x, y, w + 2, h + 2));
        if rooms.iter().any(|r| r.bbox.expand(1).overlaps(&room.bbox)) {
            continue;
        }
        map.fill(&room.inner(), floor);
        budget.add_area(w * h, total);
        rooms.push(room);
    }

    rooms.sort_by_key(|r| (r.bbox.ulx, r.bbox.uly));
    let corridors = generate_corridors(&mut map, &mut rooms, floor, rng);
    log::debug!(
        "dug {} rooms and {} corridors ({:.0}% of the map)",
        rooms.len(),
        corridors.len(),
        budget.dug() * 100.0
    );
    (
        map,
        RoomsAux {
            rooms,
            corridors,
            budget,
        },
    )
}

/// A cell on `room`'s wall facing `target`, away from the corners
fn find_door_position(room: &Room, target: &Room, rng: &mut GameRng) -> Coord {
    let (rx, ry) = room.center();
    let (tx, ty) = target.center();
    let inner = room.inner();
    if (tx - rx).abs() > (ty - ry).abs() {
        let y = rng.get_uniform_int(inner.uly, inner.lry);
        if tx > rx {
            (room.bbox.lrx, y)
        } else {
            (room.bbox.ulx, y)
        }
    } else {
        let x = rng.get_uniform_int(inner.ulx, inner.lrx);
        if ty > ry {
            (x, room.bbox.lry)
        } else {
            (x, room.bbox.uly)
        }
    }
}

/// Dig a wandering corridor from `from` to `to`, both included.
///
/// Every step moves towards the target, so the walk ends after
/// `|dx| + |dy|` steps. Cells on the map border are never dug.
pub fn dig_corridor(
    map: &mut CellMap,
    from: Coord,
    to: Coord,
    floor: Terrain,
    rng: &mut GameRng,
) -> Vec<Coord> {
    let (mut x, mut y) = from;
    let mut dug = Vec::new();
    let mut carve = |map: &mut CellMap, x: i32, y: i32| {
        if map.has_xy(x, y) && !map.is_edge(x, y) {
            if !map.is_passable(x, y) {
                map.set_base(x, y, floor);
            }
            dug.push((x, y));
        }
    };
    carve(map, x, y);
    while (x, y) != to {
        let dx = to.0 - x;
        let dy = to.1 - y;
        let (mx, my) = if dx.abs() > dy.abs() {
            if rng.rn2((dx.abs() + 1) as u32) > 0 || dy == 0 {
                (dx.signum(), 0)
            } else {
                (0, dy.signum())
            }
        } else if dy.abs() > dx.abs() {
            if rng.rn2((dy.abs() + 1) as u32) > 0 || dx == 0 {
                (0, dy.signum())
            } else {
                (dx.signum(), 0)
            }
        } else if rng.one_in(2) {
            (dx.signum(), 0)
        } else {
            (0, dy.signum())
        };
        x += mx;
        y += my;
        carve(map, x, y);
    }
    dug
}

fn join_rooms(
    map: &mut CellMap,
    rooms: &mut [Room],
    a: usize,
    b: usize,
    tracker: &mut ConnectivityTracker,
    floor: Terrain,
    rng: &mut GameRng,
) -> Option<Room> {
    if a >= rooms.len() || b >= rooms.len() || a == b {
        return None;
    }
    let from = find_door_position(&rooms[a], &rooms[b], rng);
    let to = find_door_position(&rooms[b], &rooms[a], rng);
    let path = dig_corridor(map, from, to, floor, rng);

    // Every room wall the corridor crosses gets a door
    for &(x, y) in &path {
        for room in rooms.iter_mut() {
            if room.is_wall(x, y) {
                room.add_door((x, y));
            }
        }
    }
    tracker.merge(a, b);

    let (first, rest) = path.split_first()?;
    let span = rest.iter().fold(BBox::new(first.0, first.1, first.0, first.1), |b, &(x, y)| {
        BBox::new(b.ulx.min(x), b.uly.min(y), b.lrx.max(x), b.lry.max(y))
    });
    Some(Room::new(RoomCategory::Corridor, span))
}

/// Join `rooms` with corridors; returns the corridors dug
pub fn generate_corridors(
    map: &mut CellMap,
    rooms: &mut [Room],
    floor: Terrain,
    rng: &mut GameRng,
) -> Vec<Room> {
    let n = rooms.len();
    let mut corridors = Vec::new();
    if n < 2 {
        return corridors;
    }
    let mut tracker = ConnectivityTracker::new(n);

    for i in 0..n - 1 {
        corridors.extend(join_rooms(map, rooms, i, i + 1, &mut tracker, floor, rng));
        if rng.rn2(50) == 0 {
            break;
        }
    }

    for i in 0..n.saturating_sub(2) {
        if !tracker.are_connected(i, i + 2) {
            corridors.extend(join_rooms(map, rooms, i, i + 2, &mut tracker, floor, rng));
        }
    }

    while !tracker.all_connected() {
        let pair = (0..n)
            .flat_map(|a| (0..n).map(move |b| (a, b)))
            .find(|&(a, b)| !tracker.are_connected(a, b));
        let Some((a, b)) = pair else {
            break;
        };
        corridors.extend(join_rooms(map, rooms, a, b, &mut tracker, floor, rng));
    }

    if n > 2 {
        let extra = (rng.rn2(n as u32) as usize + 2).min(6);
        for _ in 0..extra {
            let a = rng.rn2(n as u32) as usize;
            let mut b = rng.rn2((n - 2) as u32) as usize;
            if b >= a {
                b += 2;
            }
            if b < n {
                corridors.extend(join_rooms(map, rooms, a, b, &mut tracker, floor, rng));
            }
        }
    }
    corridors
}
