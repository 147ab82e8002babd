// src/io/commands.rs

use crate::error::{MandexError, Result};
use std::fmt;

/// How many values a command takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(self, n: usize) -> bool {
        match self {
            Self::Exactly(k) => n == k,
            Self::AtLeast(k) => n >= k,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(k) => write!(f, "{}", k),
            Self::AtLeast(k) => write!(f, "at least {}", k),
        }
    }
}

/// The numeric entry commands a front end can send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    UnitCell,
    BringAxis,
    BeamCentre,
    Resolution,
    Distance,
    Wavelength,
    RlpSize,
    DegreeStep,
}

impl CommandKind {
    pub const ALL: [CommandKind; 8] = [
        Self::UnitCell,
        Self::BringAxis,
        Self::BeamCentre,
        Self::Resolution,
        Self::Distance,
        Self::Wavelength,
        Self::RlpSize,
        Self::DegreeStep,
    ];

    pub fn arity(self) -> Arity {
        match self {
            Self::UnitCell => Arity::Exactly(6),
            Self::BringAxis => Arity::AtLeast(3),
            Self::BeamCentre => Arity::Exactly(2),
            Self::Resolution
            | Self::Distance
            | Self::Wavelength
            | Self::RlpSize
            | Self::DegreeStep => Arity::Exactly(1),
        }
    }

    /// Script keyword
    pub fn keyword(self) -> &'static str {
        match self {
            Self::UnitCell => "cell",
            Self::BringAxis => "axis",
            Self::BeamCentre => "beam",
            Self::Resolution => "resolution",
            Self::Distance => "distance",
            Self::Wavelength => "wavelength",
            Self::RlpSize => "rlp",
            Self::DegreeStep => "degrees",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.keyword() == word)
    }
}

/// A validated numeric command; `values` always satisfies the kind's arity.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    kind: CommandKind,
    values: Vec<f64>,
}

impl Command {
    pub fn new(kind: CommandKind, values: Vec<f64>) -> Result<Self> {
        let arity = kind.arity();
        log::debug!("{} has {} parameters.", kind.keyword(), values.len());
        if !arity.accepts(values.len()) {
            return Err(MandexError::WrongArity {
                command: kind.keyword(),
                expected: arity.to_string(),
                found: values.len(),
            });
        }
        Ok(Self { kind, values })
    }

    /// Parse the text a dialog hands over, e.g. `"79.2 79.2 38.0 90 90 90"`.
    pub fn parse(kind: CommandKind, input: &str) -> Result<Self> {
        Self::new(kind, tokenize(input)?)
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Split on spaces, left to right, and parse each token as a number.
///
/// Runs of spaces and surrounding whitespace do not produce empty tokens.
/// Any non-numeric token rejects the whole string; so do `nan` and `inf`,
/// which `f64::from_str` would otherwise accept.
pub fn tokenize(input: &str) -> Result<Vec<f64>> {
    input
        .trim()
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(|token| match token.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(MandexError::NotNumeric { token: token.to_string() }),
        })
        .collect()
}
