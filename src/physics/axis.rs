// src/physics/axis.rs
use crate::error::{MandexError, Result};
use crate::model::crystal::Crystal;
use crate::utils::linalg::{frac_to_cart, rotation_onto};
use nalgebra::{Rotation3, Unit, Vector3};

/// Lab axes for interactive rotation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationAxis {
    /// x, across the screen
    Horizontal,
    /// y, up the screen
    Vertical,
    /// z, into the screen
    Beam,
}

impl RotationAxis {
    pub fn unit(self) -> Unit<Vector3<f64>> {
        match self {
            Self::Horizontal => Vector3::x_axis(),
            Self::Vertical => Vector3::y_axis(),
            Self::Beam => Vector3::z_axis(),
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.to_ascii_lowercase().as_str() {
            "h" | "horizontal" | "x" => Some(Self::Horizontal),
            "v" | "vertical" | "y" => Some(Self::Vertical),
            "b" | "beam" | "z" => Some(Self::Beam),
            _ => None,
        }
    }
}

/// Lab-frame direction of the real-space lattice vector [u v w].
fn lab_direction(crystal: &Crystal, uvw: &[f64]) -> Result<Vector3<f64>> {
    let frac = [uvw[0], uvw[1], uvw[2]];
    let dir = crystal.orientation().apply(&frac_to_cart(frac, crystal.unit_cell().real_basis()));
    // Written negated so NaN fails the test
    if !(dir.norm() >= 1e-9 && dir.norm().is_finite()) {
        return Err(MandexError::InvalidAxis(format!("[{} {} {}] has no length", frac[0], frac[1], frac[2])));
    }
    Ok(dir)
}

/// Rotation that lays one or two lattice directions flat on the detector.
///
/// `values` holds [u v w] and optionally a second [u v w]. The first is
/// turned onto the lab horizontal; the second is then spun about that axis
/// until it lies in the detector plane pointing up (+y). Extra values past
/// the sixth are ignored, as is an incomplete second triple.
pub fn bring_axis_on_screen(crystal: &Crystal, values: &[f64]) -> Result<Rotation3<f64>> {
    if values.len() < 3 {
        return Err(MandexError::WrongArity {
            command: "axis",
            expected: "at least 3".to_string(),
            found: values.len(),
        });
    }

    let first = lab_direction(crystal, &values[0..3])?;
    let onto_x = rotation_onto(&first, &Vector3::x())
        .ok_or_else(|| MandexError::InvalidAxis("first direction is degenerate".to_string()))?;

    if values.len() < 6 {
        return Ok(onto_x);
    }

    let second = onto_x * lab_direction(crystal, &values[3..6])?;
    let in_plane = Vector3::new(0.0, second.y, second.z);
    if in_plane.norm() < 1e-9 * second.norm() {
        return Err(MandexError::InvalidAxis("the two directions are parallel".to_string()));
    }

    // Current angle of the second direction away from +y, measured about +x
    let phi = second.z.atan2(second.y);
    let spin = Rotation3::from_axis_angle(&Vector3::x_axis(), -phi);
    Ok(spin * onto_x)
}

/// In-plane axis through two detector points, or `None` if they coincide.
pub fn axis_through_points(p1: [f64; 2], p2: [f64; 2]) -> Option<Unit<Vector3<f64>>> {
    let dir = Vector3::new(p2[0] - p1[0], p2[1] - p1[1], 0.0);
    if !(dir.norm() >= 1e-9 && dir.norm().is_finite()) {
        return None;
    }
    Some(Unit::new_normalize(dir))
}

/// Axis a single rotation step turns about: the fixed axis if one is set.
pub fn step_axis(crystal: &Crystal, requested: RotationAxis) -> Unit<Vector3<f64>> {
    crystal.fixed_axis_unit().unwrap_or_else(|| requested.unit())
}

/// Angle between two lab directions, degrees.
pub fn angle_between(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let cos = a.dot(b) / (a.norm() * b.norm());
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::lattice::BravaisLattice;
    use crate::model::orientation::Orientation;
    use crate::model::unit_cell::UnitCell;

    fn tilted_crystal(params: [f64; 6]) -> Crystal {
        let cell = UnitCell::new(params).unwrap();
        let mut crystal = Crystal::new(cell, BravaisLattice::Primitive, 10.0, 0.01).unwrap();
        crystal.set_orientation(Orientation::from_rotation(Rotation3::from_euler_angles(0.7, -0.4, 1.9)));
        crystal
    }

    #[test]
    fn test_single_axis_lands_on_horizontal() {
        let mut crystal = tilted_crystal([79.2, 79.2, 38.0, 90.0, 90.0, 90.0]);
        let rot = bring_axis_on_screen(&crystal, &[0.0, 0.0, 1.0]).unwrap();
        crystal.orientation_mut().rotate_by(&rot);

        let c = lab_direction(&crystal, &[0.0, 0.0, 1.0]).unwrap();
        assert!((c.normalize() - Vector3::x()).norm() < 1e-9);
    }

    #[test]
    fn test_two_axes_both_on_screen() {
        let mut crystal = tilted_crystal([10.0, 12.0, 15.0, 80.0, 95.0, 110.0]);
        let rot = bring_axis_on_screen(&crystal, &[1.0, 0.0, 0.0, 0.0, 0.0, 1.0]).unwrap();
        crystal.orientation_mut().rotate_by(&rot);

        let a = lab_direction(&crystal, &[1.0, 0.0, 0.0]).unwrap();
        let c = lab_direction(&crystal, &[0.0, 0.0, 1.0]).unwrap();
        assert!((a.normalize() - Vector3::x()).norm() < 1e-9);
        assert!(c.z.abs() < 1e-9);
        assert!(c.y > 0.0);
        // Cell angle beta between a and c is preserved
        assert!((angle_between(&a, &c) - 95.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_degenerate_requests() {
        let crystal = tilted_crystal([79.2, 79.2, 38.0, 90.0, 90.0, 90.0]);
        assert!(matches!(
            bring_axis_on_screen(&crystal, &[1.0, 0.0]),
            Err(MandexError::WrongArity { .. })
        ));
        assert!(bring_axis_on_screen(&crystal, &[0.0, 0.0, 0.0]).is_err());
        assert!(bring_axis_on_screen(&crystal, &[1.0, 0.0, 0.0, 2.0, 0.0, 0.0]).is_err());
        assert!(matches!(
            bring_axis_on_screen(&crystal, &[f64::NAN, 0.0, 0.0]),
            Err(MandexError::InvalidAxis(_))
        ));
        assert!(bring_axis_on_screen(&crystal, &[1.0, 0.0, 0.0, 0.0, f64::INFINITY, 0.0]).is_err());
    }

    #[test]
    fn test_angle_between() {
        assert!((angle_between(&Vector3::x(), &Vector3::y()) - 90.0).abs() < 1e-12);
        assert!((angle_between(&Vector3::x(), &Vector3::new(1.0, 1.0, 0.0)) - 45.0).abs() < 1e-12);
    }

    #[test]
    fn test_axis_through_points() {
        let axis = axis_through_points([0.0, 0.0], [3.0, 4.0]).unwrap();
        assert!((axis.into_inner() - Vector3::new(0.6, 0.8, 0.0)).norm() < 1e-12);
        assert!(axis_through_points([5.0, 5.0], [5.0, 5.0]).is_none());
        assert!(axis_through_points([f64::NAN, 0.0], [1.0, 1.0]).is_none());
    }

    #[test]
    fn test_step_axis_prefers_fixed() {
        let mut crystal = tilted_crystal([79.2, 79.2, 38.0, 90.0, 90.0, 90.0]);
        assert_eq!(step_axis(&crystal, RotationAxis::Beam), Vector3::z_axis());
        let fixed = axis_through_points([0.0, 0.0], [1.0, 1.0]).unwrap();
        crystal.set_fixed_axis(Some(fixed));
        assert_eq!(step_axis(&crystal, RotationAxis::Beam), fixed);
    }
}
