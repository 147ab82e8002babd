// src/physics/ewald.rs
use crate::error::{ensure_positive, Result};
use crate::model::crystal::Crystal;
use crate::model::watch::WatchSet;
use nalgebra::Vector3;

/// Ewald sphere for a beam travelling along +z.
///
/// Radius 1/λ, centred at (0, 0, -1/λ) so that the reciprocal origin lies on
/// the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EwaldSphere {
    radius: f64,
}

impl EwaldSphere {
    pub fn new(wavelength: f64) -> Result<Self> {
        let wavelength = ensure_positive("wavelength", wavelength)?;
        Ok(Self { radius: 1.0 / wavelength })
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn centre(&self) -> Vector3<f64> {
        Vector3::new(0.0, 0.0, -self.radius)
    }

    /// Signed distance from the surface: positive outside, negative inside.
    pub fn distance_from_surface(&self, lab: &Vector3<f64>) -> f64 {
        (lab - self.centre()).norm() - self.radius
    }

    /// Diffracted-beam direction for a lab-frame reciprocal point.
    pub fn diffracted_direction(&self, lab: &Vector3<f64>) -> Vector3<f64> {
        lab - self.centre()
    }
}

/// Weight of a reflection given its closeness (distance / rlp size).
///
/// Linear falloff: 1 on the sphere, 0 once a full rlp half-width away.
pub fn weight_for_closeness(closeness: f64) -> f64 {
    (1.0 - closeness.abs()).max(0.0)
}

/// Where one reflection sits relative to the Ewald sphere.
#[derive(Debug, Clone, PartialEq)]
pub struct EwaldProjection {
    /// Position in the crystal's Miller list
    pub index: usize,
    /// Rotated reciprocal vector (lab frame)
    pub lab: Vector3<f64>,
    pub distance: f64,
    pub closeness: f64,
    pub weight: f64,
}

impl EwaldProjection {
    pub fn should_display(&self) -> bool {
        self.weight > 0.0
    }
}

pub fn project_one(crystal: &Crystal, sphere: &EwaldSphere, index: usize) -> Option<EwaldProjection> {
    let miller = crystal.millers().get(index)?;
    let lab = crystal.orientation().apply(&miller.reciprocal);
    Some(projection_for(index, lab, sphere, crystal.rlp_size()))
}

/// Project every reflection of the crystal.
pub fn project_all(crystal: &Crystal, sphere: &EwaldSphere) -> Vec<EwaldProjection> {
    let rotation = crystal.orientation().rotation();
    let rlp_size = crystal.rlp_size();

    crystal
        .millers()
        .iter()
        .enumerate()
        .map(|(index, miller)| projection_for(index, rotation * miller.reciprocal, sphere, rlp_size))
        .collect()
}

fn projection_for(index: usize, lab: Vector3<f64>, sphere: &EwaldSphere, rlp_size: f64) -> EwaldProjection {
    let distance = sphere.distance_from_surface(&lab);
    let closeness = distance / rlp_size;
    EwaldProjection {
        index,
        lab,
        distance,
        closeness,
        weight: weight_for_closeness(closeness),
    }
}

/// Refinement objective: mean squared closeness over the watched reflections.
///
/// Indices that no longer exist are skipped; an empty selection scores 0.
pub fn closeness_score(crystal: &Crystal, sphere: &EwaldSphere, watched: &WatchSet) -> f64 {
    let rotation = crystal.orientation().rotation();
    let rlp_size = crystal.rlp_size();
    let millers = crystal.millers();

    let mut sum = 0.0;
    let mut n = 0usize;
    for index in watched.iter() {
        let Some(miller) = millers.get(index) else { continue };
        let closeness = sphere.distance_from_surface(&(rotation * miller.reciprocal)) / rlp_size;
        sum += closeness * closeness;
        n += 1;
    }

    if n == 0 { 0.0 } else { sum / n as f64 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::lattice::BravaisLattice;
    use crate::model::unit_cell::UnitCell;

    #[test]
    fn test_weight_profile() {
        assert_eq!(weight_for_closeness(0.0), 1.0);
        assert!((weight_for_closeness(0.25) - 0.75).abs() < 1e-12);
        assert!((weight_for_closeness(-0.25) - 0.75).abs() < 1e-12);
        assert_eq!(weight_for_closeness(1.0), 0.0);
        assert_eq!(weight_for_closeness(-3.0), 0.0);

        let mut last = 1.0;
        for i in 0..=200 {
            let w = weight_for_closeness(i as f64 * 0.01);
            assert!(w >= 0.0 && w <= last);
            last = w;
        }
    }

    #[test]
    fn test_origin_lies_on_sphere() {
        let sphere = EwaldSphere::new(0.0251).unwrap();
        assert!(sphere.distance_from_surface(&Vector3::zeros()).abs() < 1e-12);
        assert!((sphere.radius() - 1.0 / 0.0251).abs() < 1e-9);
    }

    #[test]
    fn test_signed_distance() {
        let sphere = EwaldSphere::new(1.0).unwrap();
        // Point straight back through the centre: inside by 1
        assert!((sphere.distance_from_surface(&Vector3::new(0.0, 0.0, -1.0)) + 1.0).abs() < 1e-12);
        // Far forward: outside
        assert!(sphere.distance_from_surface(&Vector3::new(0.0, 0.0, 1.0)) > 0.0);
    }

    #[test]
    fn test_rejects_bad_wavelength() {
        assert!(EwaldSphere::new(0.0).is_err());
        assert!(EwaldSphere::new(-0.5).is_err());
    }

    #[test]
    fn test_projection_weights_and_score() {
        let cell = UnitCell::new([10.0, 10.0, 10.0, 90.0, 90.0, 90.0]).unwrap();
        let crystal = Crystal::new(cell, BravaisLattice::Primitive, 2.0, 0.01).unwrap();
        let sphere = EwaldSphere::new(1.0).unwrap();

        let all = project_all(&crystal, &sphere);
        assert_eq!(all.len(), crystal.miller_count());
        for p in &all {
            assert!(p.weight >= 0.0 && p.weight <= 1.0);
            assert_eq!(p.should_display(), p.distance.abs() < crystal.rlp_size());
            let single = project_one(&crystal, &sphere, p.index).unwrap();
            assert!((single.closeness - p.closeness).abs() < 1e-12);
        }

        let watched: WatchSet = [0, 1].into_iter().collect();
        let expected = (all[0].closeness.powi(2) + all[1].closeness.powi(2)) / 2.0;
        assert!((closeness_score(&crystal, &sphere, &watched) - expected).abs() < 1e-9);
        assert_eq!(closeness_score(&crystal, &sphere, &WatchSet::new()), 0.0);
    }
}
