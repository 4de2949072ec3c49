//! Inclusive bounding boxes and box/cross coordinate helpers

use serde::{Deserialize, Serialize};

use crate::Coord;

/// Inclusive box from upper-left `(ulx, uly)` to lower-right `(lrx, lry)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BBox {
    pub ulx: i32,
    pub uly: i32,
    pub lrx: i32,
    pub lry: i32,
}

impl BBox {
    /// Create a box, ordering the corners
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            ulx: x1.min(x2),
            uly: y1.min(y2),
            lrx: x1.max(x2),
            lry: y1.max(y2),
        }
    }

    /// Box with upper-left corner `(x, y)` spanning `w` × `h` cells
    pub fn from_size(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            ulx: x,
            uly: y,
            lrx: x + w - 1,
            lry: y + h - 1,
        }
    }

    pub fn width(&self) -> i32 {
        self.lrx - self.ulx + 1
    }

    pub fn height(&self) -> i32 {
        self.lry - self.uly + 1
    }

    /// Empty boxes come out of shrinking too far
    pub fn is_empty(&self) -> bool {
        self.lrx < self.ulx || self.lry < self.uly
    }

    pub fn area(&self) -> i32 {
        if self.is_empty() {
            0
        } else {
            self.width() * self.height()
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.ulx && x <= self.lrx && y >= self.uly && y <= self.lry
    }

    pub fn contains_bbox(&self, other: &BBox) -> bool {
        self.contains(other.ulx, other.uly) && self.contains(other.lrx, other.lry)
    }

    /// Check if two boxes share at least one cell
    pub fn overlaps(&self, other: &BBox) -> bool {
        !(self.lrx < other.ulx
            || other.lrx < self.ulx
            || self.lry < other.uly
            || other.lry < self.uly)
    }

    pub fn center(&self) -> Coord {
        ((self.ulx + self.lrx) / 2, (self.uly + self.lry) / 2)
    }

    /// Shrink by `n` on every side (may become empty)
    pub fn shrink(&self, n: i32) -> BBox {
        BBox {
            ulx: self.ulx + n,
            uly: self.uly + n,
            lrx: self.lrx - n,
            lry: self.lry - n,
        }
    }

    pub fn expand(&self, n: i32) -> BBox {
        self.shrink(-n)
    }

    pub fn translate(&self, dx: i32, dy: i32) -> BBox {
        BBox {
            ulx: self.ulx + dx,
            uly: self.uly + dy,
            lrx: self.lrx + dx,
            lry: self.lry + dy,
        }
    }

    /// Intersection with `other`, or `None` when disjoint
    pub fn clip(&self, other: &BBox) -> Option<BBox> {
        let clipped = BBox {
            ulx: self.ulx.max(other.ulx),
            uly: self.uly.max(other.uly),
            lrx: self.lrx.min(other.lrx),
            lry: self.lry.min(other.lry),
        };
        (!clipped.is_empty()).then_some(clipped)
    }

    /// Corners in order upper-left, upper-right, lower-left, lower-right
    pub fn corners(&self) -> [Coord; 4] {
        [
            (self.ulx, self.uly),
            (self.lrx, self.uly),
            (self.ulx, self.lry),
            (self.lrx, self.lry),
        ]
    }

    /// Every coordinate inside the box, row by row
    pub fn coords(&self) -> Vec<Coord> {
        if self.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(self.area() as usize);
        for y in self.uly..=self.lry {
            for x in self.ulx..=self.lrx {
                out.push((x, y));
            }
        }
        out
    }
}

/// Perimeter of a box, each coordinate once
pub fn hollow_box(bbox: &BBox) -> Vec<Coord> {
    if bbox.is_empty() {
        return Vec::new();
    }
    bbox.coords()
        .into_iter()
        .filter(|&(x, y)| x == bbox.ulx || x == bbox.lrx || y == bbox.uly || y == bbox.lry)
        .collect()
}

/// Square of radius `r` around a point
pub fn box_around(x: i32, y: i32, r: i32, include_center: bool) -> Vec<Coord> {
    BBox::new(x - r, y - r, x + r, y + r)
        .coords()
        .into_iter()
        .filter(|&p| include_center || p != (x, y))
        .collect()
}

/// Plus-shaped arms of length `r` around a point
pub fn cross_around(x: i32, y: i32, r: i32, include_center: bool) -> Vec<Coord> {
    let mut out = Vec::with_capacity((4 * r + 1) as usize);
    if include_center {
        out.push((x, y));
    }
    for i in 1..=r {
        out.extend([(x, y - i), (x + i, y), (x, y + i), (x - i, y)]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_dimensions() {
        let b = BBox::new(5, 5, 2, 3);
        assert_eq!((b.ulx, b.uly, b.lrx, b.lry), (2, 3, 5, 5));
        assert_eq!(b.width(), 4);
        assert_eq!(b.height(), 3);
        assert_eq!(b.area(), 12);
        assert_eq!(BBox::from_size(1, 1, 3, 3), BBox::new(1, 1, 3, 3));
    }

    #[test]
    fn test_overlap_and_contains() {
        let a = BBox::new(0, 0, 4, 4);
        let b = BBox::new(4, 4, 6, 6);
        let c = BBox::new(5, 0, 6, 3);
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
        assert!(a.contains(4, 0));
        assert!(!a.contains(5, 0));
        assert!(a.contains_bbox(&a.shrink(1)));
        assert_eq!(a.clip(&b), Some(BBox::new(4, 4, 4, 4)));
        assert_eq!(a.clip(&c), None);
    }

    #[test]
    fn test_shrink_to_empty() {
        let b = BBox::new(0, 0, 2, 2);
        assert_eq!(b.shrink(1).area(), 1);
        assert!(b.shrink(2).is_empty());
        assert!(b.shrink(2).coords().is_empty());
    }

    #[test]
    fn test_hollow_box() {
        let b = BBox::new(0, 0, 3, 2);
        let ring = hollow_box(&b);
        assert_eq!(ring.len(), 10);
        assert!(!ring.contains(&(1, 1)));
    }

    #[test]
    fn test_box_and_cross() {
        assert_eq!(box_around(0, 0, 1, false).len(), 8);
        assert_eq!(box_around(0, 0, 1, true).len(), 9);
        let cross = cross_around(5, 5, 2, true);
        assert_eq!(cross.len(), 9);
        assert!(cross.contains(&(5, 3)));
        assert!(!cross.contains(&(6, 6)));
    }
}
