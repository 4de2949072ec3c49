//! Start-room and constraint functions for the tiling engine
//!
//! A start-room function picks the slots seeded before growth, and which of
//! them are gates (border slots whose tile must lead out of the grid). A
//! constraint function forces slots to fixed exit patterns before seeding.

use serde::{Deserialize, Serialize};

use crate::GameRng;
use crate::geom::Dir;

/// Grid slot, `(column, row)`
pub type Slot = (usize, usize);

/// A slot seeded before growth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartSeed {
    pub slot: Slot,
    /// Side of the grid the tile must open towards
    pub gate: Option<Dir>,
}

/// A slot whose exits are fixed before seeding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForcedSlot {
    pub slot: Slot,
    /// Exits the tile must have, indexed by [`Dir::index`]
    pub exits: [bool; 4],
}

/// How the first tiles are chosen
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StartRoom {
    /// One random slot
    #[default]
    Default,
    Center,
    OneGate,
    TwoGatesOpposite,
    TwoGatesAdjacent,
    FourGates,
    /// `n_gates` gates on sides not listed in `blocked`
    GatesAvoiding { blocked: Vec<Dir>, n_gates: usize },
}

impl StartRoom {
    /// Gate-count driven start function
    pub fn from_gate_count(n_gates: usize) -> Self {
        match n_gates {
            0 => StartRoom::Default,
            1 => StartRoom::OneGate,
            2 => StartRoom::TwoGatesOpposite,
            _ => StartRoom::FourGates,
        }
    }

    pub fn seeds(&self, w: usize, h: usize, rng: &mut GameRng) -> Vec<StartSeed> {
        match self {
            StartRoom::Default => start_default(w, h, rng),
            StartRoom::Center => start_center(w, h),
            StartRoom::OneGate => start_one_gate(w, h, rng),
            StartRoom::TwoGatesOpposite => start_two_gates_opposite(w, h, rng),
            StartRoom::TwoGatesAdjacent => start_two_gates_adjacent(w, h, rng),
            StartRoom::FourGates => start_four_gates(w, h, rng),
            StartRoom::GatesAvoiding { blocked, n_gates } => {
                start_gates_avoiding(w, h, blocked, *n_gates, rng)
            }
        }
    }
}

fn rand_below(n: usize, rng: &mut GameRng) -> usize {
    rng.rn2(n as u32) as usize
}

/// Random position along a side, keeping off the corners when possible
fn along(len: usize, rng: &mut GameRng) -> usize {
    if len > 2 {
        1 + rand_below(len - 2, rng)
    } else {
        rand_below(len, rng)
    }
}

fn gate_on(side: Dir, w: usize, h: usize, rng: &mut GameRng) -> StartSeed {
    let slot = match side {
        Dir::N => (along(w, rng), 0),
        Dir::S => (along(w, rng), h - 1),
        Dir::E => (w - 1, along(h, rng)),
        Dir::W => (0, along(h, rng)),
    };
    StartSeed {
        slot,
        gate: Some(side),
    }
}

pub fn start_default(w: usize, h: usize, rng: &mut GameRng) -> Vec<StartSeed> {
    let slot = (rand_below(w, rng), rand_below(h, rng));
    vec![StartSeed { slot, gate: None }]
}

pub fn start_center(w: usize, h: usize) -> Vec<StartSeed> {
    vec![StartSeed {
        slot: (w / 2, h / 2),
        gate: None,
    }]
}

pub fn start_one_gate(w: usize, h: usize, rng: &mut GameRng) -> Vec<StartSeed> {
    let side = Dir::ALL[rand_below(4, rng)];
    vec![gate_on(side, w, h, rng)]
}

pub fn start_two_gates_opposite(w: usize, h: usize, rng: &mut GameRng) -> Vec<StartSeed> {
    let side = if rng.one_in(2) { Dir::N } else { Dir::E };
    vec![gate_on(side, w, h, rng), gate_on(side.opposite(), w, h, rng)]
}

pub fn start_two_gates_adjacent(w: usize, h: usize, rng: &mut GameRng) -> Vec<StartSeed> {
    let side = Dir::ALL[rand_below(4, rng)];
    vec![gate_on(side, w, h, rng), gate_on(side.clockwise(), w, h, rng)]
}

pub fn start_four_gates(w: usize, h: usize, rng: &mut GameRng) -> Vec<StartSeed> {
    Dir::ALL.iter().map(|d| gate_on(*d, w, h, rng)).collect()
}

/// Gates only on sides not in `blocked`. If every side is blocked the
/// blocking is ignored.
pub fn start_gates_avoiding(
    w: usize,
    h: usize,
    blocked: &[Dir],
    n_gates: usize,
    rng: &mut GameRng,
) -> Vec<StartSeed> {
    if n_gates == 0 {
        return start_default(w, h, rng);
    }
    let mut open: Vec<Dir> = Dir::ALL.into_iter().filter(|d| !blocked.contains(d)).collect();
    if open.is_empty() {
        log::warn!("every side blocked, placing gates anywhere");
        open = Dir::ALL.to_vec();
    }
    rng.shuffle(&mut open);
    open.into_iter()
        .take(n_gates)
        .map(|side| gate_on(side, w, h, rng))
        .collect()
}

/// Shape constraints applied before seeding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Constraint {
    #[default]
    None,
    /// Centre row and column are corridors meeting in a cross
    Cross,
}

impl Constraint {
    pub fn forced(&self, w: usize, h: usize) -> Vec<ForcedSlot> {
        match self {
            Constraint::None => constraint_none(),
            Constraint::Cross => constraint_cross(w, h),
        }
    }
}

pub fn constraint_none() -> Vec<ForcedSlot> {
    Vec::new()
}

/// Centre first, then the arms outwards so each slot sees its committed
/// inner neighbour.
pub fn constraint_cross(w: usize, h: usize) -> Vec<ForcedSlot> {
    let (cx, cy) = (w / 2, h / 2);
    let mut out = vec![ForcedSlot {
        slot: (cx, cy),
        exits: [cy > 0, cx + 1 < w, cy + 1 < h, cx > 0],
    }];
    let reach = w.max(h);
    for d in 1..=reach {
        if cx + d < w {
            out.push(ForcedSlot {
                slot: (cx + d, cy),
                exits: [false, cx + d + 1 < w, false, true],
            });
        }
        if d <= cx {
            out.push(ForcedSlot {
                slot: (cx - d, cy),
                exits: [false, true, false, cx - d > 0],
            });
        }
        if cy + d < h {
            out.push(ForcedSlot {
                slot: (cx, cy + d),
                exits: [true, false, cy + d + 1 < h, false],
            });
        }
        if d <= cy {
            out.push(ForcedSlot {
                slot: (cx, cy - d),
                exits: [cy - d > 0, false, true, false],
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_side(seed: &StartSeed, w: usize, h: usize) -> bool {
        let (x, y) = seed.slot;
        match seed.gate {
            Some(Dir::N) => y == 0,
            Some(Dir::S) => y == h - 1,
            Some(Dir::E) => x == w - 1,
            Some(Dir::W) => x == 0,
            None => false,
        }
    }

    #[test]
    fn test_gate_seeds_sit_on_their_side() {
        let mut rng = GameRng::new(5);
        for _ in 0..20 {
            for seed in start_four_gates(5, 4, &mut rng) {
                assert!(on_side(&seed, 5, 4));
            }
            let two = start_two_gates_opposite(5, 4, &mut rng);
            assert_eq!(two[0].gate.map(|d| d.opposite()), two[1].gate);
            let adj = start_two_gates_adjacent(5, 4, &mut rng);
            assert_eq!(adj[0].gate.map(|d| d.clockwise()), adj[1].gate);
        }
    }

    #[test]
    fn test_gates_avoid_blocked_sides() {
        let mut rng = GameRng::new(6);
        for _ in 0..20 {
            let seeds = start_gates_avoiding(6, 6, &[Dir::N, Dir::E], 4, &mut rng);
            assert_eq!(seeds.len(), 2);
            for s in &seeds {
                assert!(matches!(s.gate, Some(Dir::S) | Some(Dir::W)));
            }
        }
        let all_blocked = start_gates_avoiding(6, 6, &Dir::ALL, 1, &mut rng);
        assert_eq!(all_blocked.len(), 1);
    }

    #[test]
    fn test_cross_constraint_covers_centre_lines() {
        let forced = constraint_cross(5, 3);
        assert_eq!(forced.len(), 5 + 3 - 1);
        assert_eq!(forced[0].slot, (2, 1));
        assert_eq!(forced[0].exits, [true, true, true, true]);
        let west_end = forced.iter().find(|f| f.slot == (0, 1)).unwrap();
        assert_eq!(west_end.exits, [false, true, false, false]);
    }

    #[test]
    fn test_gate_count_mapping() {
        assert_eq!(StartRoom::from_gate_count(1), StartRoom::OneGate);
        assert_eq!(StartRoom::from_gate_count(4), StartRoom::FourGates);
        let mut rng = GameRng::new(1);
        assert_eq!(StartRoom::Center.seeds(5, 5, &mut rng)[0].slot, (2, 2));
    }
}
