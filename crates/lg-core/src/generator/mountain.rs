//! Mountain face and summit
//!
//! One call builds two levels. The face is a noise mountain cut across by a
//! crux, a band of high rock with a single carved way through. Roads lead
//! from the bottom edge up to the crux and from the crux to the top edge,
//! where stairs climb to the summit.

use serde::{Deserialize, Serialize};

use crate::entity::{EntityFactory, TableFactory};
use crate::error::{GenResult, check_dimensions};
use crate::geom::{BBox, Topology, merge_maps, shortest_passable_path, shortest_path};
use crate::level::{
    ExtrasKind, Level, LevelExtras, MountainExtras, MountainPart, StairsDir, connect_stairs,
};
use crate::map::{MarkerKind, Terrain};
use crate::mapgen::{MountainConf, SummitConf, WallConf, carve_road, mountain, summit, wall_band};
use crate::population::add_point_guardian;
use crate::{Coord, DEFAULT_MAX_DANGER, GameRng};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MountainOptions {
    pub mountain: MountainConf,
    pub summit: SummitConf,
    /// Crux band; its thickness is fitted to the face height
    pub wall: WallConf,
    pub n_guardians: usize,
    pub max_danger: u32,
    pub add_actors: bool,
}

impl Default for MountainOptions {
    fn default() -> Self {
        Self {
            mountain: MountainConf::default(),
            summit: SummitConf::default(),
            wall: WallConf::default(),
            n_guardians: 3,
            max_danger: DEFAULT_MAX_DANGER,
            add_actors: true,
        }
    }
}

/// The two levels of a mountain, their stairs linked
#[derive(Debug)]
pub struct MountainLevels {
    pub face: Level,
    pub summit: Level,
}

pub struct MountainGenerator {
    factory: Box<dyn EntityFactory>,
}

impl Default for MountainGenerator {
    fn default() -> Self {
        Self::new(Box::new(TableFactory::new()))
    }
}

impl MountainGenerator {
    pub fn new(factory: Box<dyn EntityFactory>) -> Self {
        Self { factory }
    }

    fn create_face(&mut self, cols: i32, rows: i32, opts: &MountainOptions, rng: &mut GameRng) -> Level {
        let conf = MountainConf {
            road: false,
            ..opts.mountain.clone()
        };
        let (mut map, _) = mountain(cols, rows, &conf, rng);

        let band_h = (rows / 6).max(3).min(rows - 2);
        let wall = WallConf {
            thickness: (band_h - 2 * opts.wall.ragged.max(0)).max(1),
            ..opts.wall.clone()
        };
        let mut band = wall_band(cols, band_h, &wall, rng);
        let entry = (rng.get_uniform_int(1, cols - 2), 0);
        let exit = (rng.get_uniform_int(1, cols - 2), band_h - 1);
        let way = shortest_path(entry, exit, Topology::Four, |x, y| {
            x > 0 && x < cols - 1 && y >= 0 && y < band_h
        });
        let oy = rows / 2 - band_h / 2;
        let mut breaches = Vec::new();
        for &(x, y) in &way {
            if band.base(x, y) == Some(Terrain::Highrock) {
                breaches.push((x, y + oy));
            }
            band.set_base(x, y, Terrain::Road);
        }
        merge_maps(&mut map, &band, 0, oy, |_, src| {
            matches!(src.base, Terrain::Highrock | Terrain::Road)
        });
        let crux = BBox::from_size(0, oy, cols, band_h);

        let brush = opts.mountain.road_brush;
        let top = (rng.get_uniform_int(1, cols - 2), 0);
        let bottom = (rng.get_uniform_int(1, cols - 2), rows - 1);
        let (entry, exit) = ((entry.0, entry.1 + oy), (exit.0, exit.1 + oy));
        let upper = carve_road(&mut map, top, entry, brush);
        let lower = carve_road(&mut map, exit, bottom, brush);

        let mut critical_path = shortest_passable_path(&map, bottom, top);
        if critical_path.is_empty() {
            log::warn!("no walkable way up the face, using the carved legs");
            critical_path = lower.iter().rev().copied().collect();
            critical_path.extend(way.iter().rev().map(|&(x, y)| (x, y + oy)));
            critical_path.extend(upper.iter().rev().copied());
        }

        let mut level = Level::new(map);
        level.add_stairs(StairsDir::Up, top.0, top.1);
        level.add_marker(MarkerKind::StartPoint, bottom.0, bottom.1);
        level.add_marker(MarkerKind::EndPoint, top.0, top.1);
        let mut extras = LevelExtras::with_kind(ExtrasKind::Mountain(MountainExtras {
            part: MountainPart::Face,
            breaches: breaches.clone(),
            crux: Some(crux),
        }));
        extras.start_point = Some(bottom);
        extras.end_point = Some(top);
        extras.critical_path = critical_path;
        level.set_extras(extras);

        if opts.add_actors {
            let picks = rng.get_unique_items(&breaches, opts.n_guardians);
            let placed = picks
                .into_iter()
                .filter(|&p| add_point_guardian(&mut level, self.factory.as_mut(), p, opts.max_danger, rng))
                .count();
            log::debug!("{} crux guardians placed", placed);
        }
        log::debug!("mountain face with {} breaches", breaches.len());
        level
    }

    fn create_summit(&mut self, cols: i32, rows: i32, opts: &MountainOptions, rng: &mut GameRng) -> Level {
        let map = summit(cols, rows, &opts.mountain, &opts.summit, rng);
        let start: Coord = (cols / 2, rows / 2);
        let mut level = Level::new(map);
        level.add_stairs(StairsDir::Down, start.0, start.1);
        level.add_marker(MarkerKind::StartPoint, start.0, start.1);
        let mut extras = LevelExtras::with_kind(ExtrasKind::Mountain(MountainExtras {
            part: MountainPart::Summit,
            ..Default::default()
        }));
        extras.start_point = Some(start);
        level.set_extras(extras);
        level
    }
}

impl super::LevelGenerator for MountainGenerator {
    type Options = MountainOptions;
    type Output = MountainLevels;

    fn create(
        &mut self,
        cols: i32,
        rows: i32,
        opts: &MountainOptions,
        rng: &mut GameRng,
    ) -> GenResult<MountainLevels> {
        check_dimensions(cols, rows)?;
        let mut face = self.create_face(cols, rows, opts, rng);
        let mut summit = self.create_summit(cols, rows, opts, rng);
        if let (Some(end), Some(start)) = (face.extras().end_point, summit.extras().start_point) {
            connect_stairs(&mut face, end, &mut summit, start)?;
        }
        Ok(MountainLevels { face, summit })
    }
}
