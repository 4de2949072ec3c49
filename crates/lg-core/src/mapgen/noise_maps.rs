//! Noise-driven outdoor maps: mountain, summit, forest, lake, arctic and the
//! crux wall band

use noise::{NoiseFn, Perlin};

use super::conf::{MountainConf, PatchConf, SummitConf, WallConf};
use crate::geom::{CellFilter, cross_around, min_weight_or_shortest, path_through_walls};
use crate::map::{CellMap, Terrain};
use crate::{Coord, GameRng};

/// Perlin field seeded from the level RNG
pub struct NoiseField {
    perlin: Perlin,
    scale: f64,
}

impl NoiseField {
    pub fn new(scale: f64, rng: &mut GameRng) -> Self {
        Self {
            perlin: Perlin::new(rng.rn2(u32::MAX)),
            scale,
        }
    }

    /// Value in about [-1, 1]
    pub fn at(&self, x: i32, y: i32) -> f64 {
        self.perlin.get([x as f64 * self.scale, y as f64 * self.scale])
    }
}

/// Terrain band for a noise value
pub fn mountain_terrain(n: f64, conf: &MountainConf) -> Terrain {
    if n >= conf.highrock {
        Terrain::Highrock
    } else if n >= conf.steep_cliff {
        Terrain::SteepCliff
    } else if n >= conf.cliff {
        Terrain::Cliff
    } else if n >= conf.stone {
        Terrain::Stone
    } else if n >= conf.snow {
        Terrain::Snow
    } else if n > conf.chasm {
        Terrain::Floor
    } else if n > conf.deep_chasm {
        Terrain::Chasm
    } else if n > conf.abyss {
        Terrain::DeepChasm
    } else {
        Terrain::Abyss
    }
}

/// Mountain side; returns the map and any road paths carved
pub fn mountain(
    cols: i32,
    rows: i32,
    conf: &MountainConf,
    rng: &mut GameRng,
) -> (CellMap, Vec<Vec<Coord>>) {
    let field = NoiseField::new(conf.noise_scale, rng);
    let mut map = CellMap::new(cols, rows, Terrain::Floor);
    for cell in map.iter_mut() {
        cell.base = mountain_terrain(field.at(cell.x, cell.y), conf);
    }
    let paths = if conf.road {
        vec![mountain_road(&mut map, conf, rng)]
    } else {
        Vec::new()
    };
    (map, paths)
}

fn is_free_cell(map: &CellMap, x: i32, y: i32) -> bool {
    map.is_free(x, y)
}

fn is_low_cell(map: &CellMap, x: i32, y: i32) -> bool {
    map.base(x, y).is_some_and(|t| t.z() <= 2 && !t.is_chasm())
}

/// Zig-zag road from the top row to the bottom row.
///
/// Legs between successive anchors prefer free cells, then cells of low
/// elevation, then any cell.
pub fn mountain_road(map: &mut CellMap, conf: &MountainConf, rng: &mut GameRng) -> Vec<Coord> {
    let (cols, rows) = (map.cols(), map.rows());
    let n = conf.road_anchors.max(1) as i32;
    let anchors: Vec<Coord> = (0..=n)
        .map(|i| {
            let y = (rows - 1) * i / n;
            (rng.get_uniform_int(1, (cols - 2).max(1)), y)
        })
        .collect();

    let mut road: Vec<Coord> = Vec::new();
    for pair in anchors.windows(2) {
        let leg = carve_road(map, pair[0], pair[1], conf.road_brush);
        let skip = usize::from(road.last() == leg.first());
        road.extend(leg.into_iter().skip(skip));
    }
    road
}

/// Carve one road leg from `from` to `to` and return its centre line.
///
/// The leg prefers free cells, then cells of low elevation, then any cell.
/// Cells under the brush become road unless they are already free.
pub fn carve_road(map: &mut CellMap, from: Coord, to: Coord, brush: i32) -> Vec<Coord> {
    let filters: [CellFilter<'_>; 2] = [&is_free_cell, &is_low_cell];
    let mut leg = min_weight_or_shortest(map, from, to, &filters);
    if leg.is_empty() {
        leg = path_through_walls(map, from, to);
    }
    for &(x, y) in &leg {
        for (bx, by) in cross_around(x, y, brush.max(0), true) {
            if (bx, by) == (x, y) || !map.is_free(bx, by) {
                map.set_base(bx, by, Terrain::Road);
            }
        }
    }
    leg
}

/// Summit: a blob grown from the centre, snowy inside, mountain bands outside
pub fn summit(
    cols: i32,
    rows: i32,
    mconf: &MountainConf,
    conf: &SummitConf,
    rng: &mut GameRng,
) -> CellMap {
    let field = NoiseField::new(mconf.noise_scale, rng);
    let mut map = CellMap::new(cols, rows, Terrain::Floor);
    for cell in map.iter_mut() {
        cell.base = mountain_terrain(field.at(cell.x, cell.y), mconf);
    }

    let target = ((cols * rows) as f64 * conf.area_ratio.clamp(0.0, 1.0)) as usize;
    let blob = grow_blob(cols, rows, target, rng);
    for &(x, y) in &blob {
        let base = if field.at(x, y) > conf.snow_bias {
            Terrain::Snow
        } else {
            Terrain::Floor
        };
        map.set_base(x, y, base);
    }
    log::debug!("summit blob covers {} cells", blob.len());
    map
}

/// Random growth from the map centre until `target` cells are covered
pub fn grow_blob(cols: i32, rows: i32, target: usize, rng: &mut GameRng) -> Vec<Coord> {
    let mut inside = vec![false; (cols * rows).max(0) as usize];
    let idx = |x: i32, y: i32| (y * cols + x) as usize;
    let center = (cols / 2, rows / 2);
    let mut blob = vec![center];
    let mut frontier = vec![center];
    inside[idx(center.0, center.1)] = true;

    while blob.len() < target && !frontier.is_empty() {
        let i = rng.rn2(frontier.len() as u32) as usize;
        let (x, y) = frontier[i];
        let open: Vec<Coord> = [(0, -1), (1, 0), (0, 1), (-1, 0)]
            .iter()
            .map(|(dx, dy)| (x + dx, y + dy))
            .filter(|&(nx, ny)| {
                nx > 0 && ny > 0 && nx < cols - 1 && ny < rows - 1 && !inside[idx(nx, ny)]
            })
            .collect();
        match rng.choose(&open) {
            Some(&next) => {
                inside[idx(next.0, next.1)] = true;
                blob.push(next);
                frontier.push(next);
            }
            None => {
                frontier.swap_remove(i);
            }
        }
    }
    blob
}

/// Ground with noise patches of `patch` and denser `dense` patches
fn patches(
    cols: i32,
    rows: i32,
    conf: &PatchConf,
    ground: Terrain,
    patch: Terrain,
    dense: Terrain,
    rng: &mut GameRng,
) -> CellMap {
    let field = NoiseField::new(conf.noise_scale, rng);
    let mut map = CellMap::new(cols, rows, ground);
    for cell in map.iter_mut() {
        let n = field.at(cell.x, cell.y);
        if n > conf.dense {
            cell.base = dense;
        } else if n > conf.threshold {
            cell.base = patch;
        }
    }
    map
}

pub fn forest(cols: i32, rows: i32, conf: &PatchConf, rng: &mut GameRng) -> CellMap {
    patches(cols, rows, conf, Terrain::Grass, Terrain::Tree, Terrain::Tree, rng)
}

pub fn lake(cols: i32, rows: i32, conf: &PatchConf, rng: &mut GameRng) -> CellMap {
    patches(cols, rows, conf, Terrain::Grass, Terrain::Water, Terrain::DeepWater, rng)
}

pub fn arctic(cols: i32, rows: i32, conf: &PatchConf, rng: &mut GameRng) -> CellMap {
    patches(cols, rows, conf, Terrain::Snow, Terrain::Ice, Terrain::WallIce, rng)
}

/// Horizontal band of high rock across the middle with ragged edges
pub fn wall_band(cols: i32, rows: i32, conf: &WallConf, rng: &mut GameRng) -> CellMap {
    let mut map = CellMap::new(cols, rows, conf.ground);
    let thickness = conf.thickness.clamp(1, rows);
    let top = (rows - thickness) / 2;
    let bottom = top + thickness - 1;
    for x in 0..cols {
        let t = (top - rng.get_uniform_int(0, conf.ragged.max(0))).max(0);
        let b = (bottom + rng.get_uniform_int(0, conf.ragged.max(0))).min(rows - 1);
        for y in t..=b {
            map.set_base(x, y, Terrain::Highrock);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mountain_bands_are_ordered() {
        let conf = MountainConf::default();
        assert_eq!(mountain_terrain(0.9, &conf), Terrain::Highrock);
        assert_eq!(mountain_terrain(0.45, &conf), Terrain::Cliff);
        assert_eq!(mountain_terrain(0.0, &conf), Terrain::Floor);
        assert_eq!(mountain_terrain(-0.5, &conf), Terrain::Chasm);
        assert_eq!(mountain_terrain(-0.65, &conf), Terrain::DeepChasm);
        assert_eq!(mountain_terrain(-0.95, &conf), Terrain::Abyss);
    }

    #[test]
    fn test_road_runs_top_to_bottom() {
        let mut rng = GameRng::new(17);
        let conf = MountainConf {
            road: true,
            ..Default::default()
        };
        let (map, paths) = mountain(40, 60, &conf, &mut rng);
        let road = &paths[0];
        assert_eq!(road.first().map(|p| p.1), Some(0));
        assert_eq!(road.last().map(|p| p.1), Some(59));
        assert!(road.iter().all(|&(x, y)| map.is_passable(x, y)));
    }

    #[test]
    fn test_summit_blob_reaches_target() {
        let mut rng = GameRng::new(5);
        let blob = grow_blob(30, 30, 200, &mut rng);
        assert_eq!(blob.len(), 200);
        let mut sorted = blob.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 200);
        let map = summit(30, 30, &MountainConf::default(), &SummitConf::default(), &mut rng);
        assert!(map.base(15, 15).is_some_and(|t| t == Terrain::Snow || t == Terrain::Floor));
    }

    #[test]
    fn test_wall_band_blocks_the_middle() {
        let mut rng = GameRng::new(2);
        let map = wall_band(30, 12, &WallConf::default(), &mut rng);
        for x in 0..30 {
            assert_eq!(map.base(x, 5), Some(Terrain::Highrock));
            assert_eq!(map.base(x, 0), Some(Terrain::Stone));
        }
    }

    #[test]
    fn test_patch_maps_use_their_terrain() {
        let mut rng = GameRng::new(9);
        let forest = forest(40, 40, &PatchConf::default(), &mut rng);
        assert!(forest.iter().all(|c| matches!(c.base, Terrain::Grass | Terrain::Tree)));
        let lake = lake(40, 40, &PatchConf::default(), &mut rng);
        assert!(lake.iter().any(|c| c.base != Terrain::Grass));
    }
}
