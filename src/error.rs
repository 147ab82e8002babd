// src/error.rs

use std::io;

/// Everything that can go wrong at the session boundary.
///
/// Geometry validation happens in the setters, so the projector and the
/// optimizer never see a degenerate model and have no error path of their own.
#[derive(Debug, thiserror::Error)]
pub enum MandexError {
    #[error("unit cell needs 6 parameters (a b c alpha beta gamma), got {found}")]
    UnitCellArity { found: usize },
    #[error("invalid unit cell: {reason}")]
    InvalidUnitCell { reason: String },
    #[error("{name} must be finite and positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{name} must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },
    #[error("resolution {resolution} Å needs Miller indices beyond ±{max_index}")]
    ResolutionTooFine { resolution: f64, max_index: i32 },
    #[error("{command} expects {expected} value(s), got {found}")]
    WrongArity {
        command: &'static str,
        expected: String,
        found: usize,
    },
    #[error("'{token}' is not a number")]
    NotNumeric { token: String },
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("unknown Bravais lattice '{0}', expected one of P C I F")]
    UnknownLattice(String),
    #[error("line {line}: {source}")]
    Script {
        line: usize,
        #[source]
        source: Box<MandexError>,
    },
    #[error("matrix file rejected: {0}")]
    MatrixFile(String),
    #[error("matrix is not a proper rotation (det = {det:.6})")]
    NotARotation { det: f64 },
    #[error("invalid axis: {0}")]
    InvalidAxis(String),
    #[error("no reflections are being watched; pick some spots before refining")]
    EmptyWatchSet,
    #[error("reflection {index} does not exist ({count} predicted)")]
    NoSuchReflection { index: usize, count: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MandexError>;

/// Rejects zero, negative and non-finite scalars.
pub fn ensure_positive(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(MandexError::NonPositive { name, value })
    }
}

/// Rejects NaN and infinities.
pub fn ensure_finite(name: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MandexError::NonFinite { name, value })
    }
}
