// src/physics/projection.rs
use crate::physics::ewald::{EwaldProjection, EwaldSphere};
use crate::physics::lookup::PixelGrid;
use nalgebra::Vector3;

/// Flat detector perpendicular to the beam.
///
/// `distance` is the crystal-to-detector distance in pixel units, `beam` the
/// pixel where the direct beam lands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorFrame {
    pub beam: [f64; 2],
    pub distance: f64,
}

impl DetectorFrame {
    /// Pixel hit by the diffracted ray through `lab`, or `None` when the ray
    /// travels away from the detector.
    pub fn project(&self, sphere: &EwaldSphere, lab: &Vector3<f64>) -> Option<[f64; 2]> {
        let s = sphere.diffracted_direction(lab);
        if s.z <= 0.0 {
            return None;
        }
        Some([
            self.beam[0] + self.distance * s.x / s.z,
            self.beam[1] + self.distance * s.y / s.z,
        ])
    }
}

/// A reflection that landed on the detector.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictedSpot {
    /// Position in the crystal's Miller list
    pub index: usize,
    pub pixel: [f64; 2],
    pub weight: f64,
    pub closeness: f64,
    pub visible: bool,
}

/// Cached result of one `calculate_positions` pass plus its pick index.
#[derive(Debug, Clone, Default)]
pub struct Predictions {
    spots: Vec<PredictedSpot>,
    grid: PixelGrid,
}

impl Predictions {
    /// Project every reflection with non-zero weight and index the result.
    pub fn compute(
        projections: &[EwaldProjection],
        sphere: &EwaldSphere,
        frame: &DetectorFrame,
        pick_cutoff: f64,
    ) -> Self {
        let spots: Vec<PredictedSpot> = projections
            .iter()
            .filter(|p| p.weight > 0.0)
            .filter_map(|p| {
                frame.project(sphere, &p.lab).map(|pixel| PredictedSpot {
                    index: p.index,
                    pixel,
                    weight: p.weight,
                    closeness: p.closeness,
                    visible: p.should_display(),
                })
            })
            .collect();

        Self::from_spots(spots, pick_cutoff)
    }

    pub fn from_spots(spots: Vec<PredictedSpot>, pick_cutoff: f64) -> Self {
        let grid = PixelGrid::build(spots.iter().map(|s| s.pixel).collect(), pick_cutoff);
        Self { spots, grid }
    }

    pub fn spots(&self) -> &[PredictedSpot] {
        &self.spots
    }

    pub fn spot_for(&self, index: usize) -> Option<&PredictedSpot> {
        self.spots.iter().find(|s| s.index == index)
    }

    /// Miller index of the spot nearest (x, y), if any lies within `cutoff`.
    pub fn nearest(&self, x: f64, y: f64, cutoff: f64) -> Option<usize> {
        self.grid.nearest(x, y, cutoff).map(|slot| self.spots[slot].index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spot(index: usize, x: f64, y: f64) -> PredictedSpot {
        PredictedSpot { index, pixel: [x, y], weight: 0.5, closeness: 0.5, visible: true }
    }

    #[test]
    fn test_direct_beam_hits_beam_centre() {
        let sphere = EwaldSphere::new(0.0251).unwrap();
        let frame = DetectorFrame { beam: [2200.0, 2100.0], distance: 174286.0 };
        let pixel = frame.project(&sphere, &Vector3::zeros()).unwrap();
        assert!((pixel[0] - 2200.0).abs() < 1e-9);
        assert!((pixel[1] - 2100.0).abs() < 1e-9);
    }

    #[test]
    fn test_offset_follows_scattering_angle() {
        let sphere = EwaldSphere::new(1.0).unwrap();
        let frame = DetectorFrame { beam: [0.0, 0.0], distance: 100.0 };
        // 2θ = 90°: the ray runs parallel to the detector
        assert!(frame.project(&sphere, &Vector3::new(1.0, 0.0, -1.0)).is_none());

        // 2θ = 45°: s = (sin45, 0, cos45)
        let h = std::f64::consts::FRAC_1_SQRT_2;
        let q = Vector3::new(h, 0.0, h - 1.0);
        let pixel = frame.project(&sphere, &q).unwrap();
        assert!((pixel[0] - 100.0).abs() < 1e-9);
        assert!(pixel[1].abs() < 1e-12);
    }

    #[test]
    fn test_backscatter_not_projected() {
        let sphere = EwaldSphere::new(1.0).unwrap();
        let frame = DetectorFrame { beam: [0.0, 0.0], distance: 100.0 };
        assert!(frame.project(&sphere, &Vector3::new(0.0, 0.0, -2.0)).is_none());
    }

    #[test]
    fn test_nearest_maps_back_to_miller_index() {
        let predictions = Predictions::from_spots(
            vec![spot(17, 100.0, 100.0), spot(4, 120.0, 100.0), spot(9, 500.0, 500.0)],
            10.0,
        );
        assert_eq!(predictions.nearest(103.0, 100.0, 10.0), Some(17));
        assert_eq!(predictions.nearest(118.0, 95.0, 10.0), Some(4));
        assert_eq!(predictions.nearest(110.0, 100.0, 10.0), Some(17));
        assert_eq!(predictions.nearest(300.0, 300.0, 10.0), None);
        assert_eq!(predictions.spot_for(9).map(|s| s.pixel), Some([500.0, 500.0]));
    }
}
