//! Fixed-size grid of cells

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use super::cell::Cell;
use super::element::MarkerKind;
use super::terrain::Terrain;
use crate::Coord;
use crate::geom::BBox;

/// Rectangular grid of cells, stored column-major as `cells[x][y]`.
///
/// The size is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellMap {
    cols: i32,
    rows: i32,
    cells: Vec<Vec<Cell>>,
}

impl CellMap {
    /// Create a map filled with `base`
    pub fn new(cols: i32, rows: i32, base: Terrain) -> Self {
        let cols = cols.max(0);
        let rows = rows.max(0);
        let cells = (0..cols)
            .map(|x| (0..rows).map(|y| Cell::new(x, y, base)).collect())
            .collect();
        Self { cols, rows, cells }
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// Bounding box of the whole map
    pub fn bbox(&self) -> BBox {
        BBox::new(0, 0, self.cols - 1, self.rows - 1)
    }

    pub fn has_xy(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.cols && y < self.rows
    }

    /// Is the position on the outermost ring?
    pub fn is_edge(&self, x: i32, y: i32) -> bool {
        self.has_xy(x, y) && (x == 0 || y == 0 || x == self.cols - 1 || y == self.rows - 1)
    }

    pub fn get(&self, x: i32, y: i32) -> Option<&Cell> {
        if !self.has_xy(x, y) {
            return None;
        }
        Some(&self.cells[x as usize][y as usize])
    }

    pub fn get_mut(&mut self, x: i32, y: i32) -> Option<&mut Cell> {
        if !self.has_xy(x, y) {
            return None;
        }
        Some(&mut self.cells[x as usize][y as usize])
    }

    pub fn base(&self, x: i32, y: i32) -> Option<Terrain> {
        self.get(x, y).map(|c| c.base)
    }

    /// Set the base terrain; out-of-bounds positions are ignored
    pub fn set_base(&mut self, x: i32, y: i32, base: Terrain) -> bool {
        match self.get_mut(x, y) {
            Some(cell) => {
                cell.base = base;
                true
            }
            None => false,
        }
    }

    pub fn is_passable(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(Cell::is_passable)
    }

    pub fn is_free(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_some_and(Cell::is_free)
    }

    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.base(x, y).is_some_and(|t| t.is_wall())
    }

    /// Column `x`, top to bottom
    pub fn column(&self, x: i32) -> &[Cell] {
        if x < 0 || x >= self.cols {
            return &[];
        }
        &self.cells[x as usize]
    }

    /// Row `y`, left to right
    pub fn row(&self, y: i32) -> Vec<&Cell> {
        if y < 0 || y >= self.rows {
            return Vec::new();
        }
        self.cells.iter().map(|col| &col[y as usize]).collect()
    }

    /// All cells, column by column
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut().flatten()
    }

    /// Coordinates of every cell matching `pred`
    pub fn coords_where(&self, pred: impl Fn(&Cell) -> bool) -> Vec<Coord> {
        self.iter().filter(|c| pred(c)).map(Cell::xy).collect()
    }

    pub fn free_cells(&self) -> Vec<Coord> {
        self.coords_where(Cell::is_free)
    }

    pub fn passable_cells(&self) -> Vec<Coord> {
        self.coords_where(Cell::is_passable)
    }

    pub fn count_passable(&self) -> usize {
        self.iter().filter(|c| c.is_passable()).count()
    }

    /// Fill a box (clipped to the map) with terrain
    pub fn fill(&mut self, bbox: &BBox, base: Terrain) {
        for (x, y) in bbox.coords() {
            self.set_base(x, y, base);
        }
    }

    /// In-bounds neighbours of a position
    pub fn neighbours(&self, x: i32, y: i32, diagonal: bool) -> Vec<Coord> {
        let dirs: &[(i32, i32)] = if diagonal {
            &lg_rng::DIRS_8
        } else {
            &[(0, -1), (1, 0), (0, 1), (-1, 0)]
        };
        dirs.iter()
            .map(|(dx, dy)| (x + dx, y + dy))
            .filter(|&(nx, ny)| self.has_xy(nx, ny))
            .collect()
    }

    /// Number of the eight neighbours whose base is a wall; off-map counts as wall
    pub fn wall_neighbours(&self, x: i32, y: i32) -> usize {
        lg_rng::DIRS_8
            .iter()
            .filter(|(dx, dy)| {
                let (nx, ny) = (x + dx, y + dy);
                !self.has_xy(nx, ny) || self.is_wall(nx, ny)
            })
            .count()
    }

    /// Cells visible from `(x, y)` within `range` (recursive shadowcasting)
    pub fn visible_cells(&self, x: i32, y: i32, range: i32) -> Vec<Coord> {
        if !self.has_xy(x, y) {
            return Vec::new();
        }
        let mut seen = vec![false; (self.cols * self.rows) as usize];
        seen[(y * self.cols + x) as usize] = true;
        for oct in 0..8 {
            self.scan_octant(&mut seen, (x, y), range, 1, Slope::new(1, 1), Slope::new(0, 1), oct);
        }
        let mut out = Vec::new();
        for cx in 0..self.cols {
            for cy in 0..self.rows {
                if seen[(cy * self.cols + cx) as usize] {
                    out.push((cx, cy));
                }
            }
        }
        out
    }

    #[allow(clippy::too_many_arguments)]
    fn scan_octant(
        &self,
        seen: &mut [bool],
        orig: Coord,
        range: i32,
        dist: i32,
        start: Slope,
        end: Slope,
        oct: u8,
    ) {
        if dist > range {
            return;
        }
        let mut blocked = false;
        let mut cur_start = start;
        for y in (0..=dist).rev() {
            let top = Slope::new(2 * y + 1, 2 * dist - 1);
            let bot = Slope::new(2 * y - 1, 2 * dist + 1);
            if !(cur_start.greater_or_equal(&bot) && top.greater_than(&end)) {
                continue;
            }
            let (px, py) = transform_octant(orig, dist, y, oct);
            let Some(cell) = self.get(px, py) else {
                continue;
            };
            let (dx, dy) = (px - orig.0, py - orig.1);
            if dx * dx + dy * dy <= range * range {
                seen[(py * self.cols + px) as usize] = true;
            }
            if cell.blocks_light() {
                if !blocked {
                    self.scan_octant(seen, orig, range, dist + 1, cur_start, top, oct);
                    blocked = true;
                }
                cur_start = bot;
            } else {
                blocked = false;
            }
        }
        if !blocked {
            self.scan_octant(seen, orig, range, dist + 1, cur_start, end, oct);
        }
    }

    /// Render as rows of characters joined by newlines
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(((self.cols + 1) * self.rows) as usize);
        for y in 0..self.rows {
            for x in 0..self.cols {
                out.push(self.cells[x as usize][y as usize].symbol());
            }
            if y + 1 < self.rows {
                out.push('\n');
            }
        }
        out
    }

    /// Build a map from ASCII rows.
    ///
    /// Marker symbols become floor carrying that marker, other characters
    /// map to the first terrain drawn with them. Unknown characters are
    /// floor; short rows are padded with wall.
    pub fn from_ascii(text: &str) -> Self {
        Self::from_ascii_with(text, |c| {
            if let Some(kind) = MarkerKind::from_symbol(c) {
                return (Terrain::Floor, Some(kind));
            }
            let base = Terrain::iter()
                .find(|t| t.symbol() == c)
                .unwrap_or(Terrain::Floor);
            (base, None)
        })
    }

    /// Build a map from ASCII rows with a custom symbol conversion
    pub fn from_ascii_with(
        text: &str,
        convert: impl Fn(char) -> (Terrain, Option<MarkerKind>),
    ) -> Self {
        let lines: Vec<Vec<char>> = text
            .lines()
            .filter(|l| !l.is_empty())
            .map(|l| l.chars().collect())
            .collect();
        let rows = lines.len() as i32;
        let cols = lines.iter().map(Vec::len).max().unwrap_or(0) as i32;
        let mut map = CellMap::new(cols, rows, Terrain::Wall);
        for (y, line) in lines.iter().enumerate() {
            for (x, c) in line.iter().enumerate() {
                let (base, marker) = convert(*c);
                if let Some(cell) = map.get_mut(x as i32, y as i32) {
                    cell.base = base;
                    if let Some(kind) = marker {
                        cell.add_marker(kind);
                    }
                }
            }
        }
        map
    }
}

#[derive(Clone, Copy)]
struct Slope {
    y: i32,
    x: i32,
}

impl Slope {
    fn new(y: i32, x: i32) -> Self {
        Self { y, x }
    }

    fn greater_or_equal(&self, other: &Slope) -> bool {
        self.y * other.x >= other.y * self.x
    }

    fn greater_than(&self, other: &Slope) -> bool {
        self.y * other.x > other.y * self.x
    }
}

fn transform_octant(orig: Coord, col: i32, row: i32, oct: u8) -> Coord {
    let (ox, oy) = orig;
    match oct {
        0 => (ox + col, oy - row),
        1 => (ox + row, oy - col),
        2 => (ox - row, oy - col),
        3 => (ox - col, oy - row),
        4 => (ox - col, oy + row),
        5 => (ox - row, oy + col),
        6 => (ox + row, oy + col),
        7 => (ox + col, oy + row),
        _ => orig,
    }
}
