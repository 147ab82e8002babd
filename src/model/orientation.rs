// src/model/orientation.rs

use crate::error::{MandexError, Result};
use crate::utils::linalg::{nearest_rotation, orthonormality_error};
use nalgebra::{Matrix3, Rotation3, Unit, Vector3};

/// Matrices further than this from orthonormal are refused instead of cleaned up.
const ORTHONORMAL_TOLERANCE: f64 = 1e-3;

/// Crystal-to-lab rotation.
///
/// Lab frame: x horizontal, y vertical, z along the beam. The effective
/// rotation is `Rx(horizontal) · Ry(vertical) · base`; the two tilt angles are
/// the knobs the refinement turns and are folded into `base` by [`commit`].
///
/// Every mutation composes pure rotations, so the matrix stays orthonormal.
///
/// [`commit`]: Orientation::commit
#[derive(Debug, Clone, PartialEq)]
pub struct Orientation {
    base: Rotation3<f64>,
    horizontal: f64,
    vertical: f64,
}

impl Default for Orientation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Orientation {
    pub fn identity() -> Self {
        Self::from_rotation(Rotation3::identity())
    }

    pub fn from_rotation(rotation: Rotation3<f64>) -> Self {
        Self { base: rotation, horizontal: 0.0, vertical: 0.0 }
    }

    /// Accept a nearly orthonormal, proper matrix and re-orthonormalise it.
    pub fn from_matrix(m: &Matrix3<f64>) -> Result<Self> {
        if m.iter().any(|v| !v.is_finite()) || orthonormality_error(m) > ORTHONORMAL_TOLERANCE {
            return Err(MandexError::NotARotation { det: m.determinant() });
        }
        nearest_rotation(m)
            .map(Self::from_rotation)
            .ok_or(MandexError::NotARotation { det: m.determinant() })
    }

    pub fn from_row_major(values: [f64; 9]) -> Result<Self> {
        Self::from_matrix(&Matrix3::from_row_slice(&values))
    }

    pub fn to_row_major(&self) -> [f64; 9] {
        let m = self.matrix();
        let mut out = [0.0; 9];
        for row in 0..3 {
            for col in 0..3 {
                out[row * 3 + col] = m[(row, col)];
            }
        }
        out
    }

    pub fn rotation(&self) -> Rotation3<f64> {
        let tilt_h = Rotation3::from_axis_angle(&Vector3::x_axis(), self.horizontal);
        let tilt_v = Rotation3::from_axis_angle(&Vector3::y_axis(), self.vertical);
        tilt_h * tilt_v * self.base
    }

    pub fn matrix(&self) -> Matrix3<f64> {
        self.rotation().into_inner()
    }

    /// Crystal-frame vector expressed in the lab frame.
    pub fn apply(&self, v: &Vector3<f64>) -> Vector3<f64> {
        self.rotation() * v
    }

    pub fn horizontal(&self) -> f64 {
        self.horizontal
    }

    pub fn set_horizontal(&mut self, radians: f64) {
        self.horizontal = radians;
    }

    pub fn vertical(&self) -> f64 {
        self.vertical
    }

    pub fn set_vertical(&mut self, radians: f64) {
        self.vertical = radians;
    }

    /// Fold the tilt angles into the base rotation and zero them.
    pub fn commit(&mut self) {
        self.base = self.rotation();
        self.horizontal = 0.0;
        self.vertical = 0.0;
    }

    /// Rotate the whole crystal about a lab-frame axis.
    pub fn rotate_about(&mut self, axis: &Unit<Vector3<f64>>, radians: f64) {
        self.commit();
        self.base = Rotation3::from_axis_angle(axis, radians) * self.base;
    }

    /// Pre-multiply by an arbitrary lab-frame rotation.
    pub fn rotate_by(&mut self, rotation: &Rotation3<f64>) {
        self.commit();
        self.base = rotation * self.base;
    }
}
