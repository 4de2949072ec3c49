//! Generation errors and the shared error-reporting hook
//!
//! Only fatal configuration problems become `Err`. Recoverable shortfalls are
//! handled by bounded retries inside the generators and merely logged.

use thiserror::Error;

/// Errors that abort a generation call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenError {
    #[error("Unknown map style '{0}'")]
    UnknownStyle(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Missing required option '{0}'")]
    MissingOption(&'static str),

    #[error("Invalid level dimensions {cols}x{rows}")]
    InvalidDimensions { cols: i32, rows: i32 },

    #[error("Template catalog line {line}: {reason}")]
    TemplateParse { line: usize, reason: String },

    #[error("No template named '{0}'")]
    UnknownTemplate(String),

    #[error("Lever at ({x}, {y}) has no adjacent lever door")]
    LeverWithoutDoor { x: i32, y: i32 },

    #[error("Level verification failed: {unreachable} passable cells unreachable (tolerance {tolerance})")]
    Unreachable { unreachable: usize, tolerance: usize },

    #[error("Stairs mismatch: {0}")]
    StairsMismatch(String),

    #[error("Level has no rooms to place {0} in")]
    NoRooms(&'static str),
}

/// Result alias used across the crate
pub type GenResult<T> = Result<T, GenError>;

/// Report a fatal error through the log and hand it back for propagation.
///
/// Usage: `return Err(report(GenError::UnknownStyle(name)))`.
pub fn report(err: GenError) -> GenError {
    log::error!("{}", err);
    err
}

/// Validate dimensions shared by every generator entry point
pub fn check_dimensions(cols: i32, rows: i32) -> GenResult<()> {
    if cols < 3 || rows < 3 {
        return Err(report(GenError::InvalidDimensions { cols, rows }));
    }
    Ok(())
}
