//! Random number service for level generation
//!
//! Uses a seeded ChaCha RNG so that a whole generation run, nested
//! sub-generators included, is reproducible from a single seed.
//! There is no global instance: every generator takes `&mut GameRng`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// The eight unit offsets, clockwise from north.
pub const DIRS_8: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

/// Cardinal direction letters in N/S/E/W order.
pub const CARDINAL_LETTERS: [char; 4] = ['N', 'S', 'E', 'W'];

/// Level generation random number generator
///
/// Wraps ChaCha8Rng. Only the seed is serialized; deserializing restarts the
/// stream from the beginning.
#[derive(Debug, Clone)]
pub struct GameRng {
    rng: ChaCha8Rng,
    seed: u64,
    /// Number of values drawn since construction
    draws: u64,
}

impl Serialize for GameRng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.seed.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GameRng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(GameRng::new(seed))
    }
}

impl GameRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            draws: 0,
        }
    }

    /// Create a new RNG with a random seed
    pub fn from_entropy() -> Self {
        let seed = rand::random();
        Self::new(seed)
    }

    /// Get the seed used to create this RNG
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// How many values have been drawn so far.
    ///
    /// Two runs with the same seed stay in lockstep only while this matches.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Derive an independent child RNG from the next value of this stream.
    pub fn fork(&mut self) -> GameRng {
        self.draws += 1;
        let seed: u64 = self.rng.gen_range(0..u64::MAX);
        GameRng::new(seed)
    }

    /// Returns 0..n-1, or 0 if n is 0.
    pub fn rn2(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.draws += 1;
        self.rng.gen_range(0..n)
    }

    /// Returns 1..=n, or 0 if n is 0.
    pub fn rnd(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.draws += 1;
        self.rng.gen_range(1..=n)
    }

    /// Roll n dice with m sides
    pub fn dice(&mut self, n: u32, m: u32) -> u32 {
        (0..n).map(|_| self.rnd(m)).sum()
    }

    /// Returns true with probability 1/n
    pub fn one_in(&mut self, n: u32) -> bool {
        self.rn2(n) == 0
    }

    /// Returns true with probability percent/100
    pub fn percent(&mut self, percent: u32) -> bool {
        self.rn2(100) < percent
    }

    /// Uniform integer in `min..=max`. Arguments may come in either order.
    pub fn get_uniform_int(&mut self, min: i32, max: i32) -> i32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        if lo == hi {
            return lo;
        }
        self.draws += 1;
        self.rng.gen_range(lo..=hi)
    }

    /// Uniform float in `[0, 1)`.
    pub fn get_uniform(&mut self) -> f64 {
        self.draws += 1;
        self.rng.gen_range(0.0..1.0)
    }

    /// Choose a random element from a slice
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.rn2(items.len() as u32) as usize])
        }
    }

    /// Alias of [`GameRng::choose`] kept under the level-generation name.
    pub fn array_get_rand<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        self.choose(items)
    }

    /// Pick `n` distinct elements without replacement.
    ///
    /// Returns every element (shuffled) when `n >= items.len()`.
    pub fn get_unique_items<T: Clone>(&mut self, items: &[T], n: usize) -> Vec<T> {
        let mut indices: Vec<usize> = (0..items.len()).collect();
        self.shuffle(&mut indices);
        indices
            .into_iter()
            .take(n)
            .map(|i| items[i].clone())
            .collect()
    }

    /// Shuffle a slice in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.rn2(i as u32 + 1) as usize;
            items.swap(i, j);
        }
    }

    /// One of the eight unit offsets
    pub fn get_rand_dir(&mut self) -> (i32, i32) {
        DIRS_8[self.rn2(8) as usize]
    }

    /// One of 'N', 'S', 'E', 'W'
    pub fn get_cardinal_dir_letter(&mut self) -> char {
        CARDINAL_LETTERS[self.rn2(4) as usize]
    }

    /// Weighted choice. Zero weights are never picked; `None` if every
    /// weight is zero or the slice is empty.
    pub fn get_weighted<K: Clone>(&mut self, items: &[(K, u32)]) -> Option<K> {
        let total: u32 = items.iter().map(|(_, w)| *w).sum();
        if total == 0 {
            return None;
        }
        let mut roll = self.rn2(total);
        for (key, weight) in items {
            if roll < *weight {
                return Some(key.clone());
            }
            roll -= weight;
        }
        None
    }

    /// Generate a random coordinate within `0..max_x` × `0..max_y`
    pub fn random_coord(&mut self, max_x: i32, max_y: i32) -> (i32, i32) {
        (
            self.get_uniform_int(0, max_x - 1),
            self.get_uniform_int(0, max_y - 1),
        )
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rn2_bounds() {
        let mut rng = GameRng::new(42);
        for _ in 0..1000 {
            let n = rng.rn2(10);
            assert!(n < 10);
        }
    }

    #[test]
    fn test_uniform_int_inclusive() {
        let mut rng = GameRng::new(42);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..2000 {
            let n = rng.get_uniform_int(-2, 3);
            assert!((-2..=3).contains(&n));
            seen_min |= n == -2;
            seen_max |= n == 3;
        }
        assert!(seen_min && seen_max);
        assert_eq!(rng.get_uniform_int(7, 7), 7);
        assert!((1..=5).contains(&rng.get_uniform_int(5, 1)));
    }

    #[test]
    fn test_uniform_float_range() {
        let mut rng = GameRng::new(7);
        for _ in 0..1000 {
            let f = rng.get_uniform();
            assert!((0.0..1.0).contains(&f));
        }
    }

    #[test]
    fn test_unique_items_are_distinct() {
        let mut rng = GameRng::new(3);
        let items: Vec<u32> = (0..20).collect();
        let picked = rng.get_unique_items(&items, 8);
        assert_eq!(picked.len(), 8);
        let mut sorted = picked.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), 8);

        let all = rng.get_unique_items(&items, 50);
        assert_eq!(all.len(), 20);
    }

    #[test]
    fn test_weighted_never_picks_zero_weight() {
        let mut rng = GameRng::new(11);
        let items = [('a', 0), ('b', 5), ('c', 0)];
        for _ in 0..200 {
            assert_eq!(rng.get_weighted(&items), Some('b'));
        }
        assert_eq!(rng.get_weighted::<char>(&[('x', 0)]), None);
        assert_eq!(rng.get_weighted::<char>(&[]), None);
    }

    #[test]
    fn test_directions() {
        let mut rng = GameRng::new(5);
        for _ in 0..100 {
            let (dx, dy) = rng.get_rand_dir();
            assert!(dx.abs() <= 1 && dy.abs() <= 1 && (dx, dy) != (0, 0));
            assert!(CARDINAL_LETTERS.contains(&rng.get_cardinal_dir_letter()));
        }
    }

    #[test]
    fn test_reproducibility() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.rn2(100), rng2.rn2(100));
        }
        assert_eq!(rng1.draws(), rng2.draws());
    }

    #[test]
    fn test_fork_is_deterministic() {
        let mut a = GameRng::new(9);
        let mut b = GameRng::new(9);
        let mut fa = a.fork();
        let mut fb = b.fork();
        assert_eq!(fa.rn2(1000), fb.rn2(1000));
    }

    #[test]
    fn test_zero_inputs() {
        let mut rng = GameRng::new(42);
        assert_eq!(rng.rn2(0), 0);
        assert_eq!(rng.rnd(0), 0);
        assert_eq!(rng.dice(0, 6), 0);
        assert_eq!(rng.dice(2, 0), 0);
        assert!(rng.choose::<u8>(&[]).is_none());
    }

    #[test]
    fn test_serializes_as_seed() {
        let rng = GameRng::new(1234);
        let json = serde_json::to_string(&rng).unwrap();
        assert_eq!(json, "1234");
        let back: GameRng = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seed(), 1234);
    }
}
