// src/model/miller.rs
use nalgebra::Vector3;

/// One admissible reflection: its indices and reciprocal-lattice vector in the
/// crystal frame (Å⁻¹). Regenerated whenever the cell, lattice or resolution
/// changes, so indices into a Miller list are only stable between regenerations.
#[derive(Debug, Clone, PartialEq)]
pub struct MillerIndex {
    pub h: i32,
    pub k: i32,
    pub l: i32,
    pub reciprocal: Vector3<f64>,
}

impl MillerIndex {
    pub fn new(h: i32, k: i32, l: i32, reciprocal: Vector3<f64>) -> Self {
        Self { h, k, l, reciprocal }
    }

    pub fn hkl(&self) -> (i32, i32, i32) {
        (self.h, self.k, self.l)
    }

    /// |q| in Å⁻¹
    pub fn length(&self) -> f64 {
        self.reciprocal.norm()
    }

    /// Resolution of the reflection, d = 1/|q| (Å).
    pub fn d_spacing(&self) -> f64 {
        let len = self.length();
        if len > 0.0 { 1.0 / len } else { f64::INFINITY }
    }
}
