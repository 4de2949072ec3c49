//! Level generators
//!
//! Each generator turns dimensions and its options struct into a furnished
//! [`Level`]: it asks [`mapgen`](crate::mapgen) for a base map, runs its own
//! structural passes, resolves markers, populates the level through an
//! [`EntityFactory`](crate::entity::EntityFactory) and strips transient
//! markers. Generators that embed others (dungeons and caves embed nests)
//! own the child generator and pass their RNG down, so one seed reproduces
//! the whole run.

mod castle;
mod cave;
mod crypt;
mod dungeon;
pub mod markers;
mod mountain;
mod nest;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::GenResult;
use crate::geom::box_around;
use crate::map::{Cell, CellMap};
use crate::{Coord, GameRng};

pub use castle::{CastleGenerator, CastleOptions, CellsAround, surround_with};
pub use cave::{CaveGenerator, CaveOptions, CaveType};
pub use crypt::{CryptGenerator, CryptOptions, ZonePopulator};
pub use dungeon::{DungeonGenerator, DungeonOptions};
pub use markers::{ResolvedMarkers, markers_to_doors, remove_markers, resolve_castle_markers};
pub use mountain::{MountainGenerator, MountainLevels, MountainOptions};
pub use nest::{NestGenerator, NestOptions};

/// Common shape of every level generator
pub trait LevelGenerator {
    type Options: Default + Serialize + DeserializeOwned;
    /// What one call produces; a single level for most generators
    type Output;

    fn default_options(&self) -> Self::Options {
        Self::Options::default()
    }

    fn create(
        &mut self,
        cols: i32,
        rows: i32,
        options: &Self::Options,
        rng: &mut GameRng,
    ) -> GenResult<Self::Output>;
}

/// `p` itself or the closest cell around it accepted by `pred`
pub(crate) fn nearest_where(
    map: &CellMap,
    p: Coord,
    radius: i32,
    pred: impl Fn(&Cell) -> bool,
) -> Option<Coord> {
    (0..=radius).find_map(|r| {
        box_around(p.0, p.1, r, true)
            .into_iter()
            .filter(|&(x, y)| (x - p.0).abs() == r || (y - p.1).abs() == r)
            .find(|&(x, y)| map.get(x, y).is_some_and(&pred))
    })
}
