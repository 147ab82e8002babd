// src/utils/linalg.rs

use nalgebra::{Matrix3, Rotation3, Unit, Vector3};

/// Convert fractional lattice coordinates to Cartesian using a basis matrix
///
/// # Arguments
/// * `frac` - Fractional coordinates [u, v, w] along the three basis vectors
/// * `basis` - Basis matrix whose COLUMNS are the basis vectors (a, b, c)
///
/// # Formula
/// ```text
/// Cartesian = Basis × Fractional
/// ```
pub fn frac_to_cart(frac: [f64; 3], basis: &Matrix3<f64>) -> Vector3<f64> {
  basis * Vector3::from(frac)
}

/// Inverse transpose of a basis matrix, or `None` when it is singular.
///
/// Applied to a real-space basis (columns a, b, c) this yields the reciprocal
/// basis (columns a*, b*, c*) with `a·a* = 1` and `a·b* = 0`.
pub fn inverse_transpose(basis: &Matrix3<f64>) -> Option<Matrix3<f64>> {
  basis.try_inverse().map(|inv| inv.transpose())
}

/// Largest deviation of `mᵀm` from the identity.
pub fn orthonormality_error(m: &Matrix3<f64>) -> f64 {
  (m.transpose() * m - Matrix3::identity()).abs().max()
}

/// Closest proper rotation to `m` (polar decomposition via SVD).
///
/// Returns `None` for singular or improper (det < 0) input.
pub fn nearest_rotation(m: &Matrix3<f64>) -> Option<Rotation3<f64>> {
  if m.determinant() <= 1e-9 {
    return None;
  }

  let svd = m.svd(true, true);
  let u = svd.u?;
  let v_t = svd.v_t?;
  let r = u * v_t;

  if r.determinant() <= 0.0 {
    return None;
  }
  Some(Rotation3::from_matrix_unchecked(r))
}

/// Rotation taking direction `from` onto direction `to`.
///
/// Antiparallel inputs get a half turn about an arbitrary perpendicular axis,
/// which nalgebra's `rotation_between` leaves undefined.
pub fn rotation_onto(from: &Vector3<f64>, to: &Vector3<f64>) -> Option<Rotation3<f64>> {
  if from.norm() < 1e-12 || to.norm() < 1e-12 {
    return None;
  }

  if let Some(rot) = Rotation3::rotation_between(from, to) {
    return Some(rot);
  }

  let mut perp = from.cross(&Vector3::x());
  if perp.norm() < 1e-9 {
    perp = from.cross(&Vector3::y());
  }
  Some(Rotation3::from_axis_angle(
    &Unit::new_normalize(perp),
    std::f64::consts::PI,
  ))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_frac_to_cart_cubic() {
    let basis = Matrix3::from_diagonal(&Vector3::new(5.0, 5.0, 5.0));
    let cart = frac_to_cart([0.5, 0.5, 0.5], &basis);

    assert!((cart.x - 2.5).abs() < 1e-10);
    assert!((cart.y - 2.5).abs() < 1e-10);
    assert!((cart.z - 2.5).abs() < 1e-10);
  }

  #[test]
  fn test_inverse_transpose_roundtrip() {
    // Non-orthogonal basis
    let basis = Matrix3::new(4.0, 2.0, 0.0, 0.0, 3.46, 0.0, 0.0, 0.0, 5.0);
    let recip = inverse_transpose(&basis).unwrap();
    let back = inverse_transpose(&recip).unwrap();

    assert!((back - basis).abs().max() < 1e-10);
    // a · a* = 1, a · b* = 0
    assert!((basis.column(0).dot(&recip.column(0)) - 1.0).abs() < 1e-12);
    assert!(basis.column(0).dot(&recip.column(1)).abs() < 1e-12);
  }

  #[test]
  fn test_singular_has_no_inverse() {
    let flat = Matrix3::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0);
    assert!(inverse_transpose(&flat).is_none());
    assert!(nearest_rotation(&flat).is_none());
  }

  #[test]
  fn test_nearest_rotation_cleans_noise() {
    let rot = Rotation3::from_euler_angles(0.3, -0.2, 1.1);
    let noisy = rot.matrix() + Matrix3::repeat(1e-4);
    let cleaned = nearest_rotation(&noisy).unwrap();

    assert!(orthonormality_error(cleaned.matrix()) < 1e-12);
    assert!((cleaned.matrix() - rot.matrix()).abs().max() < 1e-3);
  }

  #[test]
  fn test_improper_matrix_rejected() {
    let mirror = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, -1.0));
    assert!(nearest_rotation(&mirror).is_none());
  }

  #[test]
  fn test_rotation_onto_antiparallel() {
    let from = Vector3::new(1.0, 0.0, 0.0);
    let to = Vector3::new(-2.0, 0.0, 0.0);
    let rot = rotation_onto(&from, &to).unwrap();
    let moved = rot * from;

    assert!((moved - Vector3::new(-1.0, 0.0, 0.0)).norm() < 1e-12);
  }
}
