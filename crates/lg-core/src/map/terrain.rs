//! Base terrain elements

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Base terrain of a cell. Every cell has exactly one.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    #[default]
    Floor,
    Wall,
    FloorCave,
    WallCave,
    FloorCastle,
    WallCastle,
    FloorCrypt,
    WallCrypt,
    FloorHouse,
    WallHouse,
    WallIce,
    Window,
    Bridge,
    Road,
    Water,
    DeepWater,
    Chasm,
    DeepChasm,
    Abyss,
    Grass,
    Tree,
    Snow,
    Ice,
    Stone,
    Cliff,
    SteepCliff,
    Highrock,
    Sky,
}

impl Terrain {
    /// Check if this is a wall type
    pub const fn is_wall(&self) -> bool {
        matches!(
            self,
            Terrain::Wall
                | Terrain::WallCave
                | Terrain::WallCastle
                | Terrain::WallCrypt
                | Terrain::WallHouse
                | Terrain::WallIce
                | Terrain::Window
        )
    }

    /// Check if this is one of the floor types
    pub const fn is_floor(&self) -> bool {
        matches!(
            self,
            Terrain::Floor
                | Terrain::FloorCave
                | Terrain::FloorCastle
                | Terrain::FloorCrypt
                | Terrain::FloorHouse
        )
    }

    /// Check if walkers can enter
    pub const fn is_passable(&self) -> bool {
        matches!(
            self,
            Terrain::Floor
                | Terrain::FloorCave
                | Terrain::FloorCastle
                | Terrain::FloorCrypt
                | Terrain::FloorHouse
                | Terrain::Bridge
                | Terrain::Road
                | Terrain::Water
                | Terrain::Grass
                | Terrain::Tree
                | Terrain::Snow
                | Terrain::Ice
                | Terrain::Stone
                | Terrain::Cliff
                | Terrain::SteepCliff
        )
    }

    /// Chasm-like terrain that only flyers can cross
    pub const fn is_chasm(&self) -> bool {
        matches!(self, Terrain::Chasm | Terrain::DeepChasm | Terrain::Abyss)
    }

    /// Check if this terrain blocks line of sight
    pub const fn blocks_light(&self) -> bool {
        matches!(
            self,
            Terrain::Wall
                | Terrain::WallCave
                | Terrain::WallCastle
                | Terrain::WallCrypt
                | Terrain::WallHouse
                | Terrain::WallIce
                | Terrain::Tree
                | Terrain::Highrock
        )
    }

    /// Height used by mountain terrain. Zero is ground level.
    pub const fn z(&self) -> i32 {
        match self {
            Terrain::Stone | Terrain::Snow => 1,
            Terrain::Cliff => 2,
            Terrain::SteepCliff => 3,
            Terrain::Highrock => 4,
            Terrain::Water | Terrain::Chasm => -1,
            Terrain::DeepWater | Terrain::DeepChasm => -2,
            Terrain::Abyss => -3,
            _ => 0,
        }
    }

    /// Display character
    pub const fn symbol(&self) -> char {
        match self {
            Terrain::Floor
            | Terrain::FloorCave
            | Terrain::FloorCastle
            | Terrain::FloorCrypt
            | Terrain::FloorHouse => '.',
            Terrain::Wall
            | Terrain::WallCave
            | Terrain::WallCastle
            | Terrain::WallCrypt
            | Terrain::WallHouse
            | Terrain::WallIce => '#',
            Terrain::Window => 'o',
            Terrain::Bridge => '=',
            Terrain::Road => '-',
            Terrain::Water => '~',
            Terrain::DeepWater => 'w',
            Terrain::Chasm => 'v',
            Terrain::DeepChasm => 'V',
            Terrain::Abyss => 'U',
            Terrain::Grass => '"',
            Terrain::Tree => 'T',
            Terrain::Snow => '*',
            Terrain::Ice => '_',
            Terrain::Stone => ',',
            Terrain::Cliff => '^',
            Terrain::SteepCliff => 'A',
            Terrain::Highrock => 'M',
            Terrain::Sky => ' ',
        }
    }

    /// Wall terrain matching a floor family (used when sealing tiles)
    pub const fn matching_wall(&self) -> Terrain {
        match self {
            Terrain::FloorCave => Terrain::WallCave,
            Terrain::FloorCastle => Terrain::WallCastle,
            Terrain::FloorCrypt => Terrain::WallCrypt,
            Terrain::FloorHouse => Terrain::WallHouse,
            Terrain::Snow | Terrain::Ice => Terrain::WallIce,
            _ => Terrain::Wall,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_walls_are_impassable() {
        for t in Terrain::iter().filter(|t| t.is_wall()) {
            assert!(!t.is_passable(), "{} should block", t);
        }
    }

    #[test]
    fn test_floors_are_passable() {
        for t in Terrain::iter().filter(|t| t.is_floor()) {
            assert!(t.is_passable(), "{} should be passable", t);
            assert!(!t.blocks_light());
        }
    }

    #[test]
    fn test_parse_by_name() {
        assert_eq!(Terrain::from_str("wall_castle").unwrap(), Terrain::WallCastle);
        assert_eq!(Terrain::from_str("floor").unwrap(), Terrain::Floor);
        assert!(Terrain::from_str("lava_lake").is_err());
        assert_eq!(Terrain::SteepCliff.to_string(), "steep_cliff");
    }

    #[test]
    fn test_heights() {
        assert!(Terrain::Highrock.z() > Terrain::Cliff.z());
        assert!(Terrain::Abyss.z() < Terrain::Chasm.z());
        assert!(Terrain::Chasm.is_chasm() && !Terrain::Chasm.is_passable());
    }
}
