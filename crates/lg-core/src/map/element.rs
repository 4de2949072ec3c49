//! Non-terrain cell elements: doors, levers, stairs and markers

use serde::{Deserialize, Serialize};
use strum::{Display, EnumDiscriminants, EnumIter};

use crate::Coord;
use crate::level::Stairs;

/// Deferred-decision placeholders left by raw generation.
///
/// A marker is resolved into a concrete element (door, lever, ...) or used as
/// a hint by a later pass, and removed before the level is handed out unless
/// explicitly preserved.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Door,
    Lever,
    LeverDoor,
    LivingQuarter,
    Loot,
    NestLoot,
    RoomBoundary,
    DeadEnd,
    StartPoint,
    EndPoint,
    CriticalPath,
    PathBroken,
}

impl MarkerKind {
    /// Character used for this marker in ASCII tiles and dumps
    pub const fn symbol(&self) -> char {
        match self {
            MarkerKind::Door => '+',
            MarkerKind::Lever => '&',
            MarkerKind::LeverDoor => '|',
            MarkerKind::LivingQuarter => ':',
            MarkerKind::Loot => '?',
            MarkerKind::NestLoot => 'n',
            MarkerKind::RoomBoundary => 'b',
            MarkerKind::DeadEnd => 'd',
            MarkerKind::StartPoint => 's',
            MarkerKind::EndPoint => 'e',
            MarkerKind::CriticalPath => 'p',
            MarkerKind::PathBroken => 'x',
        }
    }

    /// Inverse of [`MarkerKind::symbol`]
    pub const fn from_symbol(c: char) -> Option<MarkerKind> {
        match c {
            '+' => Some(MarkerKind::Door),
            '&' => Some(MarkerKind::Lever),
            '|' => Some(MarkerKind::LeverDoor),
            ':' => Some(MarkerKind::LivingQuarter),
            '?' => Some(MarkerKind::Loot),
            'n' => Some(MarkerKind::NestLoot),
            'b' => Some(MarkerKind::RoomBoundary),
            'd' => Some(MarkerKind::DeadEnd),
            's' => Some(MarkerKind::StartPoint),
            'e' => Some(MarkerKind::EndPoint),
            'p' => Some(MarkerKind::CriticalPath),
            'x' => Some(MarkerKind::PathBroken),
            _ => None,
        }
    }

    /// Symbols that may appear in authored tile templates
    pub const fn is_template_symbol(c: char) -> bool {
        matches!(c, '+' | '&' | '|' | ':' | '?')
    }

    /// Inspectable tag, e.g. `"lever_door"`
    pub fn tag(&self) -> String {
        self.to_string()
    }
}

/// An ordinary door
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Door {
    pub closed: bool,
}

/// A door opened only by a lever
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeverDoor {
    pub closed: bool,
}

/// A lever toggling the lever doors at `targets`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Lever {
    pub targets: Vec<Coord>,
}

/// Anything besides terrain, actors and items that sits in a cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumDiscriminants)]
#[strum_discriminants(name(ElementKind))]
#[strum_discriminants(derive(Display, Hash, EnumIter))]
#[strum_discriminants(strum(serialize_all = "snake_case"))]
pub enum Element {
    Door(Door),
    Lever(Lever),
    LeverDoor(LeverDoor),
    Stairs(Stairs),
    Marker(MarkerKind),
}

impl Element {
    pub fn kind(&self) -> ElementKind {
        ElementKind::from(self)
    }

    /// Does this element stop walkers?
    pub fn blocks_passage(&self) -> bool {
        matches!(self, Element::LeverDoor(LeverDoor { closed: true }))
    }

    /// Does this element stop line of sight?
    pub fn blocks_light(&self) -> bool {
        matches!(
            self,
            Element::Door(Door { closed: true }) | Element::LeverDoor(LeverDoor { closed: true })
        )
    }

    pub fn is_door(&self) -> bool {
        matches!(self, Element::Door(_) | Element::LeverDoor(_))
    }

    pub fn marker(&self) -> Option<MarkerKind> {
        match self {
            Element::Marker(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Display character
    pub fn symbol(&self) -> char {
        match self {
            Element::Door(d) => {
                if d.closed {
                    '+'
                } else {
                    '\''
                }
            }
            Element::Lever(_) => '&',
            Element::LeverDoor(_) => '|',
            Element::Stairs(s) => s.dir.symbol(),
            Element::Marker(kind) => kind.symbol(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_marker_symbol_round_trip() {
        for kind in MarkerKind::iter() {
            assert_eq!(MarkerKind::from_symbol(kind.symbol()), Some(kind));
        }
        assert_eq!(MarkerKind::from_symbol('#'), None);
        assert_eq!(MarkerKind::from_symbol('.'), None);
    }

    #[test]
    fn test_marker_tags() {
        assert_eq!(MarkerKind::Door.tag(), "door");
        assert_eq!(MarkerKind::LeverDoor.tag(), "lever_door");
        assert_eq!(MarkerKind::CriticalPath.tag(), "critical_path");
    }

    #[test]
    fn test_template_symbols() {
        for c in ['+', '&', '|', ':', '?'] {
            assert!(MarkerKind::is_template_symbol(c));
            assert!(MarkerKind::from_symbol(c).is_some());
        }
        assert!(!MarkerKind::is_template_symbol('s'));
    }

    #[test]
    fn test_element_blocking() {
        assert!(!Element::Door(Door { closed: true }).blocks_passage());
        assert!(Element::Door(Door { closed: true }).blocks_light());
        assert!(Element::LeverDoor(LeverDoor { closed: true }).blocks_passage());
        assert!(!Element::LeverDoor(LeverDoor { closed: false }).blocks_passage());
        assert_eq!(Element::Marker(MarkerKind::Loot).kind(), ElementKind::Marker);
        assert_eq!(ElementKind::LeverDoor.to_string(), "lever_door");
    }
}
