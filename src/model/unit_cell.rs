// src/model/unit_cell.rs

use crate::error::{MandexError, Result};
use crate::utils::linalg::inverse_transpose;
use nalgebra::{Matrix3, Vector3};

/// Real-space unit cell with its real and reciprocal basis matrices.
///
/// Lengths are in Å, angles in degrees. Basis matrices store the vectors as
/// COLUMNS: `real_basis = [a | b | c]`, `reciprocal_basis = [a* | b* | c*]`,
/// with the crystallographic convention `a·a* = 1` (no factor of 2π).
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCell {
    params: [f64; 6],
    real: Matrix3<f64>,
    reciprocal: Matrix3<f64>,
}

impl UnitCell {
    /// Build a cell from `[a, b, c, alpha, beta, gamma]`.
    ///
    /// Standard setting: a along x, b in the xy plane, c completing a
    /// right-handed frame.
    pub fn new(params: [f64; 6]) -> Result<Self> {
        let [a, b, c, alpha, beta, gamma] = params;

        for (name, len) in [("a", a), ("b", b), ("c", c)] {
            if !(len.is_finite() && len > 0.0) {
                return Err(MandexError::InvalidUnitCell {
                    reason: format!("length {} must be positive, got {}", name, len),
                });
            }
        }
        for (name, angle) in [("alpha", alpha), ("beta", beta), ("gamma", gamma)] {
            if !(angle.is_finite() && angle > 0.0 && angle < 180.0) {
                return Err(MandexError::InvalidUnitCell {
                    reason: format!("angle {} must lie in (0, 180), got {}", name, angle),
                });
            }
        }

        let (ca, cb, cg) = (
            alpha.to_radians().cos(),
            beta.to_radians().cos(),
            gamma.to_radians().cos(),
        );
        let sg = gamma.to_radians().sin();

        // V / (abc)
        let vol_factor_sq = 1.0 - ca * ca - cb * cb - cg * cg + 2.0 * ca * cb * cg;
        if vol_factor_sq <= 1e-10 {
            return Err(MandexError::InvalidUnitCell {
                reason: format!(
                    "angles {} {} {} do not describe a cell with volume",
                    alpha, beta, gamma
                ),
            });
        }
        let vol_factor = vol_factor_sq.sqrt();

        let real = Matrix3::new(
            a, b * cg, c * cb,
            0.0, b * sg, c * (ca - cb * cg) / sg,
            0.0, 0.0, c * vol_factor / sg,
        );

        let reciprocal = inverse_transpose(&real).ok_or_else(|| MandexError::InvalidUnitCell {
            reason: "real-space basis is singular".to_string(),
        })?;

        Ok(Self { params, real, reciprocal })
    }

    /// Build a cell from an untrusted value list; exactly six values required.
    pub fn from_values(values: &[f64]) -> Result<Self> {
        let params: [f64; 6] = values
            .try_into()
            .map_err(|_| MandexError::UnitCellArity { found: values.len() })?;
        Self::new(params)
    }

    pub fn params(&self) -> [f64; 6] {
        self.params
    }

    pub fn real_basis(&self) -> &Matrix3<f64> {
        &self.real
    }

    pub fn reciprocal_basis(&self) -> &Matrix3<f64> {
        &self.reciprocal
    }

    pub fn volume(&self) -> f64 {
        self.real.determinant()
    }

    /// Lengths of a, b, c.
    pub fn axis_lengths(&self) -> [f64; 3] {
        [
            self.real.column(0).norm(),
            self.real.column(1).norm(),
            self.real.column(2).norm(),
        ]
    }

    /// Lengths of a*, b*, c* (Å⁻¹).
    pub fn reciprocal_lengths(&self) -> [f64; 3] {
        [
            self.reciprocal.column(0).norm(),
            self.reciprocal.column(1).norm(),
            self.reciprocal.column(2).norm(),
        ]
    }

    /// Reciprocal-lattice vector `h a* + k b* + l c*` in the crystal frame.
    pub fn reciprocal_vector(&self, h: i32, k: i32, l: i32) -> Vector3<f64> {
        self.reciprocal * Vector3::new(h as f64, k as f64, l as f64)
    }
}

impl Default for UnitCell {
    fn default() -> Self {
        let params = [79.2, 79.2, 38.0, 90.0, 90.0, 90.0];
        let real = Matrix3::from_diagonal(&Vector3::new(params[0], params[1], params[2]));
        let reciprocal = Matrix3::from_diagonal(&Vector3::new(
            1.0 / params[0],
            1.0 / params[1],
            1.0 / params[2],
        ));
        Self { params, real, reciprocal }
    }
}
