//! Shared generation constants

/// Passable cells allowed to be unreachable before a level fails verification
pub const UNREACHABLE_TOLERANCE: usize = 10;

/// Markers kept on a level after cleanup unless the caller says otherwise
pub const DEFAULT_PRESERVED_MARKERS: [crate::map::MarkerKind; 3] = [
    crate::map::MarkerKind::StartPoint,
    crate::map::MarkerKind::EndPoint,
    crate::map::MarkerKind::CriticalPath,
];

/// Side of an authored tile template
pub const TEMPLATE_SIZE: usize = 7;

/// Band widths an authored template is split into along each axis
pub const TEMPLATE_BANDS: [usize; 3] = [3, 1, 3];

/// Upper bound for the share of a map carved out as floor by room digging
pub const MAX_DUG_PERCENTAGE: f64 = 0.9;

/// Default danger limit for actors picked by generic population
pub const DEFAULT_MAX_DANGER: u32 = 5;

/// Bonus danger given to guardians of main loot and lair bosses
pub const GUARDIAN_DANGER_BONUS: u32 = 4;
