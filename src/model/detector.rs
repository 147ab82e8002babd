// src/model/detector.rs

use crate::error::{ensure_finite, ensure_positive, Result};
use crate::model::crystal::Crystal;
use crate::physics::ewald::{project_all, EwaldSphere};
use crate::physics::projection::{DetectorFrame, Predictions};

/// Default pick radius around a predicted spot, in pixels.
pub const DEFAULT_PICK_CUTOFF: f64 = 10.0;

/// Experimental geometry plus the cache of predicted spot positions.
///
/// Setters only change geometry and drop the cache; recomputing positions is
/// the owner's job (see `Session`).
#[derive(Debug, Clone)]
pub struct Detector {
    beam_centre: [f64; 2],
    distance: f64,
    wavelength: f64,
    sphere: EwaldSphere,
    pick_cutoff: f64,
    predictions: Option<Predictions>,
}

fn checked_beam(beam: [f64; 2]) -> Result<[f64; 2]> {
    Ok([ensure_finite("beam centre x", beam[0])?, ensure_finite("beam centre y", beam[1])?])
}

impl Detector {
    pub fn new(beam_centre: [f64; 2], distance: f64, wavelength: f64) -> Result<Self> {
        Ok(Self {
            beam_centre: checked_beam(beam_centre)?,
            distance: ensure_positive("detector distance", distance)?,
            wavelength,
            sphere: EwaldSphere::new(wavelength)?,
            pick_cutoff: DEFAULT_PICK_CUTOFF,
            predictions: None,
        })
    }

    pub fn with_pick_cutoff(mut self, cutoff: f64) -> Result<Self> {
        self.pick_cutoff = ensure_positive("pick cutoff", cutoff)?;
        self.predictions = None;
        Ok(self)
    }

    pub fn beam_centre(&self) -> [f64; 2] {
        self.beam_centre
    }

    pub fn set_beam_centre(&mut self, x: f64, y: f64) -> Result<()> {
        self.beam_centre = checked_beam([x, y])?;
        self.invalidate();
        Ok(())
    }

    /// Nudge the beam centre; a move that overflows leaves it where it was.
    pub fn adjust_beam_centre(&mut self, dx: f64, dy: f64) -> Result<()> {
        let [x, y] = self.beam_centre;
        self.beam_centre = checked_beam([x + dx, y + dy])?;
        log::info!("New beam centre {} {}", self.beam_centre[0], self.beam_centre[1]);
        self.invalidate();
        Ok(())
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn set_detector_distance(&mut self, distance: f64) -> Result<()> {
        self.distance = ensure_positive("detector distance", distance)?;
        self.invalidate();
        Ok(())
    }

    pub fn wavelength(&self) -> f64 {
        self.wavelength
    }

    pub fn set_wavelength(&mut self, wavelength: f64) -> Result<()> {
        self.sphere = EwaldSphere::new(wavelength)?;
        self.wavelength = wavelength;
        self.invalidate();
        Ok(())
    }

    pub fn pick_cutoff(&self) -> f64 {
        self.pick_cutoff
    }

    pub fn ewald_sphere(&self) -> EwaldSphere {
        self.sphere
    }

    pub fn frame(&self) -> DetectorFrame {
        DetectorFrame { beam: self.beam_centre, distance: self.distance }
    }

    /// Drop cached positions and the pick table.
    pub fn invalidate(&mut self) {
        self.predictions = None;
    }

    pub fn is_stale(&self) -> bool {
        self.predictions.is_none()
    }

    /// Project every weighted reflection of `crystal` onto the detector and
    /// rebuild the pick table.
    pub fn calculate_positions(&mut self, crystal: &Crystal) -> &Predictions {
        let sphere = self.ewald_sphere();
        let projections = project_all(crystal, &sphere);
        let predictions = Predictions::compute(&projections, &sphere, &self.frame(), self.pick_cutoff);
        log::debug!(
            "{} of {} reflections predicted on the detector",
            predictions.spots().len(),
            crystal.miller_count()
        );
        self.predictions.insert(predictions)
    }

    pub fn predictions(&self) -> Option<&Predictions> {
        self.predictions.as_ref()
    }

    /// Miller index of the predicted spot nearest (x, y) within the pick
    /// cutoff. `None` when nothing is close enough or positions are stale.
    pub fn position_near_coord(&self, x: f64, y: f64) -> Option<usize> {
        self.predictions.as_ref()?.nearest(x, y, self.pick_cutoff)
    }
}
