//! Authored tile templates and band resizing

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::geom::Dir;
use crate::{TEMPLATE_BANDS, TEMPLATE_SIZE};

/// Wall character of the authoring format
pub const WALL: char = '#';

/// Offset of the exit band on every edge of an authored tile
const EXIT_OFFSET: usize = TEMPLATE_BANDS[0];

/// Tile category, fixed when the template is authored
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum TileCategory {
    Room,
    Corridor,
    Cross,
    Entrance,
    Storeroom,
    Vault,
    Nest,
    Filler,
}

/// Band widths used to resize every tile of one tiling run.
///
/// An authored tile is split into bands 3|1|3 along each axis. The first and
/// last band keep their outer wall and replicate (or drop) their inner cells;
/// the middle band, which carries the exits, is replicated as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenParams {
    pub x: [usize; 3],
    pub y: [usize; 3],
}

impl Default for GenParams {
    fn default() -> Self {
        Self {
            x: TEMPLATE_BANDS,
            y: TEMPLATE_BANDS,
        }
    }
}

impl GenParams {
    /// Same widths on both axes
    pub fn uniform(bands: [usize; 3]) -> Self {
        Self { x: bands, y: bands }.clamped()
    }

    /// Every band at least one cell wide
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.map(|w| w.max(1)),
            y: self.y.map(|w| w.max(1)),
        }
    }

    pub fn tile_w(&self) -> usize {
        self.x.iter().sum()
    }

    pub fn tile_h(&self) -> usize {
        self.y.iter().sum()
    }
}

/// Authored index feeding output index `out` for the given band widths
fn source_index(out: usize, bands: [usize; 3]) -> usize {
    let [a, b, c] = bands;
    let last = TEMPLATE_SIZE - 1;
    if out < a {
        if out == 0 || a <= 1 {
            0
        } else {
            1 + ((out - 1) * 2) / (a - 1)
        }
    } else if out < a + b {
        EXIT_OFFSET
    } else {
        let k = out - a - b;
        if k + 1 >= c {
            last
        } else {
            EXIT_OFFSET + 1 + (k * 2) / (c - 1)
        }
    }
}

/// A named 7×7 ASCII block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileTemplate {
    pub name: String,
    pub category: TileCategory,
    pub weight: u32,
    rows: Vec<Vec<char>>,
}

impl TileTemplate {
    /// Validate and build a template.
    ///
    /// Rows must form a 7×7 square with wall corners, and border openings may
    /// only sit at the middle offset of an edge.
    pub fn from_rows(
        name: &str,
        category: TileCategory,
        weight: u32,
        rows: Vec<Vec<char>>,
    ) -> Result<Self, String> {
        if rows.len() != TEMPLATE_SIZE {
            return Err(format!("'{}' has {} rows, expected {}", name, rows.len(), TEMPLATE_SIZE));
        }
        if let Some(row) = rows.iter().find(|r| r.len() != TEMPLATE_SIZE) {
            return Err(format!(
                "'{}' has a row of width {}, expected {}",
                name,
                row.len(),
                TEMPLATE_SIZE
            ));
        }
        let last = TEMPLATE_SIZE - 1;
        for i in 0..TEMPLATE_SIZE {
            let border = [(i, 0), (i, last), (0, i), (last, i)];
            for (x, y) in border {
                if rows[y][x] != WALL && i != EXIT_OFFSET {
                    return Err(format!("'{}' opens at ({}, {}) off the middle band", name, x, y));
                }
            }
        }
        Ok(Self {
            name: name.to_string(),
            category,
            weight,
            rows,
        })
    }

    /// All-wall template used for unused slots
    pub fn filler(name: &str) -> Self {
        Self {
            name: name.to_string(),
            category: TileCategory::Filler,
            weight: 0,
            rows: vec![vec![WALL; TEMPLATE_SIZE]; TEMPLATE_SIZE],
        }
    }

    pub fn is_filler(&self) -> bool {
        self.category == TileCategory::Filler
    }

    pub fn char_at(&self, x: usize, y: usize) -> char {
        self.rows
            .get(y)
            .and_then(|r| r.get(x))
            .copied()
            .unwrap_or(WALL)
    }

    pub fn rows(&self) -> &[Vec<char>] {
        &self.rows
    }

    /// Does the tile open towards `dir`?
    pub fn has_exit(&self, dir: Dir) -> bool {
        let last = TEMPLATE_SIZE - 1;
        let (x, y) = match dir {
            Dir::N => (EXIT_OFFSET, 0),
            Dir::E => (last, EXIT_OFFSET),
            Dir::S => (EXIT_OFFSET, last),
            Dir::W => (0, EXIT_OFFSET),
        };
        self.char_at(x, y) != WALL
    }

    /// Exits indexed by [`Dir::index`]
    pub fn exits(&self) -> [bool; 4] {
        Dir::ALL.map(|d| self.has_exit(d))
    }

    pub fn exit_count(&self) -> usize {
        self.exits().iter().filter(|e| **e).count()
    }

    /// Copy turned 90 degrees clockwise
    pub fn rotated(&self) -> Self {
        let n = TEMPLATE_SIZE;
        let rows = (0..n)
            .map(|y| (0..n).map(|x| self.rows[n - 1 - x][y]).collect())
            .collect();
        Self {
            name: self.name.clone(),
            category: self.category,
            weight: self.weight,
            rows,
        }
    }

    /// Rows resized to the band widths of `params`
    pub fn resized(&self, params: &GenParams) -> Vec<Vec<char>> {
        let params = params.clamped();
        (0..params.tile_h())
            .map(|oy| {
                let sy = source_index(oy, params.y);
                (0..params.tile_w())
                    .map(|ox| self.rows[sy][source_index(ox, params.x)])
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(text: &str) -> Vec<Vec<char>> {
        text.lines().map(|l| l.trim().chars().collect()).collect()
    }

    fn corridor() -> TileTemplate {
        TileTemplate::from_rows(
            "corridor",
            TileCategory::Corridor,
            5,
            rows(
                "#######
                 #######
                 ##...##
                 .......
                 ##...##
                 #######
                 #######",
            ),
        )
        .unwrap()
    }

    #[test]
    fn test_exits() {
        let t = corridor();
        assert_eq!(t.exits(), [false, true, false, true]);
        assert_eq!(t.exit_count(), 2);
    }

    #[test]
    fn test_rotation_turns_exits() {
        let r = corridor().rotated();
        assert_eq!(r.exits(), [true, false, true, false]);
        assert_eq!(r.name, "corridor");
        let full = r.rotated().rotated().rotated();
        assert_eq!(full.rows(), corridor().rows());
    }

    #[test]
    fn test_rejects_off_band_exit() {
        let res = TileTemplate::from_rows(
            "bad",
            TileCategory::Room,
            1,
            rows(
                "#.#####
                 #.....#
                 #.....#
                 #.....#
                 #.....#
                 #.....#
                 #######",
            ),
        );
        assert!(res.is_err());
        assert!(TileTemplate::from_rows("short", TileCategory::Room, 1, rows("###")).is_err());
    }

    #[test]
    fn test_resize_widens_exit_band() {
        let params = GenParams {
            x: [3, 3, 3],
            y: [2, 1, 2],
        };
        let out = corridor().resized(&params);
        assert_eq!(out.len(), 5);
        assert_eq!(out[0].len(), 9);
        // exit row stays open end to end, outer walls stay walls
        assert!(out[2].iter().all(|c| *c == '.'));
        assert!(out[0].iter().all(|c| *c == WALL));
        assert!(out[4].iter().all(|c| *c == WALL));
    }

    #[test]
    fn test_default_resize_is_identity() {
        let t = corridor();
        assert_eq!(t.resized(&GenParams::default()), t.rows().to_vec());
    }

    #[test]
    fn test_source_index_keeps_outer_walls() {
        for bands in [[1, 1, 1], [2, 3, 2], [5, 1, 4]] {
            let total: usize = bands.iter().sum();
            assert_eq!(source_index(0, bands), 0);
            assert_eq!(source_index(total - 1, bands), TEMPLATE_SIZE - 1);
            for out in 0..total {
                assert!(source_index(out, bands) < TEMPLATE_SIZE);
            }
        }
    }
}
