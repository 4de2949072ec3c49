//! Miner-carved caves
//!
//! A miner walks the map one step at a time, picking its direction from a
//! weight table and carving a brush around every cell it visits. Caves stop
//! growing once enough of the map is floor or every miner has stopped.

use serde::{Deserialize, Serialize};

use super::conf::{CaveConf, MinerStart};
use crate::geom::{box_around, cross_around};
use crate::map::CellMap;
use crate::{Coord, GameRng};

/// When a miner stops digging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StopRule {
    #[default]
    Never,
    /// Zero the weights once the miner reaches the map edge
    AtEdge,
}

/// Shape carved around each visited cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Brush {
    Point,
    Cross(i32),
    Square(i32),
}

impl Brush {
    pub fn cells(&self, x: i32, y: i32) -> Vec<Coord> {
        match *self {
            Brush::Point => vec![(x, y)],
            Brush::Cross(r) => cross_around(x, y, r, true),
            Brush::Square(r) => box_around(x, y, r, true),
        }
    }
}

/// A directional digging agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Miner {
    pub name: String,
    /// Where the miner started
    pub start: Coord,
    pub pos: Coord,
    /// `(dx, dy, weight)` for every direction the miner may step in
    pub dir_weights: Vec<(i32, i32, u32)>,
    pub brush: Brush,
    pub stop: StopRule,
}

impl Miner {
    pub fn new(name: &str, start: Coord, dir_weights: Vec<(i32, i32, u32)>, brush: Brush) -> Self {
        Self {
            name: name.to_string(),
            start,
            pos: start,
            dir_weights,
            brush,
            stop: StopRule::Never,
        }
    }

    /// Same chance for each of the eight directions
    pub fn uniform_weights() -> Vec<(i32, i32, u32)> {
        lg_rng::DIRS_8.iter().map(|&(dx, dy)| (dx, dy, 1)).collect()
    }

    /// Weights leaning towards `(tx, ty)`
    pub fn weights_towards(from: Coord, to: Coord) -> Vec<(i32, i32, u32)> {
        let (sx, sy) = ((to.0 - from.0).signum(), (to.1 - from.1).signum());
        lg_rng::DIRS_8
            .iter()
            .map(|&(dx, dy)| {
                let along = dx * sx + dy * sy;
                (dx, dy, (2 + along * 2).max(1) as u32)
            })
            .collect()
    }

    pub fn is_active(&self) -> bool {
        self.dir_weights.iter().any(|w| w.2 > 0)
    }

    fn halt(&mut self) {
        for w in &mut self.dir_weights {
            w.2 = 0;
        }
    }

    /// Take one step inside the map interior and carve around the new cell
    fn step(&mut self, map: &mut CellMap, conf: &CaveConf, rng: &mut GameRng) -> usize {
        let choices: Vec<(Coord, u32)> = self
            .dir_weights
            .iter()
            .map(|&(dx, dy, w)| ((dx, dy), w))
            .filter(|&(_, w)| w > 0)
            .collect();
        let Some((dx, dy)) = rng.get_weighted(&choices) else {
            return 0;
        };
        let x = (self.pos.0 + dx).clamp(1, map.cols() - 2);
        let y = (self.pos.1 + dy).clamp(1, map.rows() - 2);
        self.pos = (x, y);
        let carved = carve(map, &self.brush.cells(x, y), conf);
        if self.stop == StopRule::AtEdge && (x <= 1 || y <= 1 || x >= map.cols() - 2 || y >= map.rows() - 2) {
            self.halt();
        }
        carved
    }
}

/// Turn interior cells of `cells` into floor; returns newly carved cells
fn carve(map: &mut CellMap, cells: &[Coord], conf: &CaveConf) -> usize {
    let mut n = 0;
    for &(x, y) in cells {
        if map.has_xy(x, y) && !map.is_edge(x, y) && !map.is_passable(x, y) {
            map.set_base(x, y, conf.floor);
            n += 1;
        }
    }
    n
}

fn edge_start(cols: i32, rows: i32, rng: &mut GameRng) -> Coord {
    match rng.get_cardinal_dir_letter() {
        'N' => (rng.get_uniform_int(1, cols - 2), 1),
        'S' => (rng.get_uniform_int(1, cols - 2), rows - 2),
        'E' => (cols - 2, rng.get_uniform_int(1, rows - 2)),
        _ => (1, rng.get_uniform_int(1, rows - 2)),
    }
}

fn middle_start(cols: i32, rows: i32, rng: &mut GameRng) -> Coord {
    (
        rng.get_uniform_int(cols / 4, cols - 1 - cols / 4),
        rng.get_uniform_int(rows / 4, rows - 1 - rows / 4),
    )
}

/// Miners for a cave layout: the primary one plus `additional` middle miners
pub fn layout_miners(cols: i32, rows: i32, conf: &CaveConf, rng: &mut GameRng) -> Vec<Miner> {
    let brush = Brush::Cross(conf.brush.max(0));
    let center = (cols / 2, rows / 2);
    let mut miners = Vec::with_capacity(conf.additional + 1);
    match conf.primary {
        MinerStart::Center => {
            miners.push(Miner::new("primary", center, Miner::uniform_weights(), brush));
        }
        MinerStart::Edge => {
            let start = edge_start(cols, rows, rng);
            let weights = Miner::weights_towards(start, center);
            miners.push(Miner::new("edge", start, weights, brush));
        }
    }
    for i in 0..conf.additional {
        let mut miner = Miner::new(
            &format!("additional {}", i + 1),
            middle_start(cols, rows, rng),
            Miner::uniform_weights(),
            brush,
        );
        miner.stop = StopRule::AtEdge;
        miners.push(miner);
    }
    miners
}

/// Run `miners` over a wall-filled map until the floor target is reached
pub fn mine(
    cols: i32,
    rows: i32,
    conf: &CaveConf,
    mut miners: Vec<Miner>,
    rng: &mut GameRng,
) -> (CellMap, Vec<Miner>) {
    let mut map = CellMap::new(cols, rows, conf.wall);
    let interior = ((cols - 2).max(0) * (rows - 2).max(0)) as f64;
    let target = (interior * conf.target_ratio.clamp(0.0, 0.9)) as usize;
    let mut floor = 0;
    for m in &miners {
        floor += carve(&mut map, &m.brush.cells(m.start.0, m.start.1), conf);
    }

    let max_rounds = (cols * rows * 4) as usize;
    let mut rounds = 0;
    while floor < target && rounds < max_rounds && miners.iter().any(Miner::is_active) {
        for m in miners.iter_mut().filter(|m| m.is_active()) {
            floor += m.step(&mut map, conf, rng);
        }
        rounds += 1;
    }
    log::debug!(
        "{} miners carved {} cells in {} rounds",
        miners.len(),
        floor,
        rounds
    );
    (map, miners)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::floodfill_passable;

    #[test]
    fn test_single_miner_cave_is_connected() {
        let mut rng = GameRng::new(21);
        let conf = CaveConf {
            additional: 0,
            ..Default::default()
        };
        let miners = layout_miners(40, 30, &conf, &mut rng);
        let (map, miners) = mine(40, 30, &conf, miners, &mut rng);
        assert_eq!(miners.len(), 1);
        assert!(map.count_passable() > 0);
        // One miner walking with a brush leaves a single region
        assert_eq!(floodfill_passable(&map).len(), map.count_passable());
    }

    #[test]
    fn test_floor_target_and_border() {
        let mut rng = GameRng::new(22);
        let conf = CaveConf::default();
        let miners = layout_miners(50, 40, &conf, &mut rng);
        let (map, _) = mine(50, 40, &conf, miners, &mut rng);
        let interior = 48 * 38;
        assert!(map.count_passable() as f64 >= interior as f64 * 0.3);
        for x in 0..50 {
            assert!(!map.is_passable(x, 0));
            assert!(!map.is_passable(x, 39));
        }
    }

    #[test]
    fn test_edge_miner_leans_inwards() {
        let w = Miner::weights_towards((1, 10), (20, 10));
        let east = w.iter().find(|&&(dx, dy, _)| dx == 1 && dy == 0).unwrap().2;
        let west = w.iter().find(|&&(dx, dy, _)| dx == -1 && dy == 0).unwrap().2;
        assert!(east > west);
        assert!(w.iter().all(|t| t.2 > 0));
    }

    #[test]
    fn test_stop_at_edge() {
        let mut map = CellMap::new(10, 10, crate::map::Terrain::WallCave);
        let conf = CaveConf::default();
        let mut miner = Miner::new("east", (7, 5), vec![(1, 0, 1)], Brush::Point);
        miner.stop = StopRule::AtEdge;
        let mut rng = GameRng::new(1);
        miner.step(&mut map, &conf, &mut rng);
        assert!(!miner.is_active());
        assert_eq!(miner.pos, (8, 5));
    }
}
