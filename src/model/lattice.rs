// src/model/lattice.rs

use crate::error::{MandexError, Result};
use serde::{Deserialize, Serialize};

/// Lattice centering. Selects which (h, k, l) survive systematic absences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BravaisLattice {
    #[default]
    Primitive,
    /// C-centred
    Base,
    /// I-centred
    Body,
    /// F-centred
    Face,
}

impl BravaisLattice {
    /// Reflection condition for the centering.
    pub fn admits(self, h: i32, k: i32, l: i32) -> bool {
        match self {
            Self::Primitive => true,
            Self::Base => (h + k).rem_euclid(2) == 0,
            Self::Body => (h + k + l).rem_euclid(2) == 0,
            Self::Face => {
                let parity = [h.rem_euclid(2), k.rem_euclid(2), l.rem_euclid(2)];
                parity == [0, 0, 0] || parity == [1, 1, 1]
            }
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Primitive => 'P',
            Self::Base => 'C',
            Self::Body => 'I',
            Self::Face => 'F',
        }
    }

    pub fn from_symbol(symbol: &str) -> Result<Self> {
        match symbol.trim().to_ascii_uppercase().as_str() {
            "P" => Ok(Self::Primitive),
            "C" => Ok(Self::Base),
            "I" => Ok(Self::Body),
            "F" => Ok(Self::Face),
            _ => Err(MandexError::UnknownLattice(symbol.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflection_conditions() {
        assert!(BravaisLattice::Primitive.admits(1, 0, 0));

        assert!(BravaisLattice::Base.admits(1, 1, 0));
        assert!(BravaisLattice::Base.admits(1, -1, 7));
        assert!(!BravaisLattice::Base.admits(1, 0, 0));

        assert!(BravaisLattice::Body.admits(1, 1, 0));
        assert!(BravaisLattice::Body.admits(-1, 0, 1));
        assert!(!BravaisLattice::Body.admits(1, 0, 0));
        assert!(!BravaisLattice::Body.admits(-1, -1, -1));

        assert!(BravaisLattice::Face.admits(1, 1, 1));
        assert!(BravaisLattice::Face.admits(2, 0, -2));
        assert!(BravaisLattice::Face.admits(-1, 3, -5));
        assert!(!BravaisLattice::Face.admits(1, 1, 0));
        assert!(!BravaisLattice::Face.admits(-1, 0, 0));
    }

    #[test]
    fn test_symbols_roundtrip() {
        for lattice in [
            BravaisLattice::Primitive,
            BravaisLattice::Base,
            BravaisLattice::Body,
            BravaisLattice::Face,
        ] {
            let symbol = lattice.symbol().to_string();
            assert_eq!(BravaisLattice::from_symbol(&symbol).unwrap(), lattice);
        }
        assert_eq!(BravaisLattice::from_symbol(" i ").unwrap(), BravaisLattice::Body);
        assert!(BravaisLattice::from_symbol("R").is_err());
    }
}
