// src/state.rs
use crate::config::{Config, RefinementSettings};
use crate::error::{ensure_positive, MandexError, Result};
use crate::io::commands::{Command, CommandKind};
use crate::io::matrix;
use crate::model::crystal::Crystal;
use crate::model::detector::Detector;
use crate::model::lattice::BravaisLattice;
use crate::model::orientation::Orientation;
use crate::model::unit_cell::UnitCell;
use crate::model::watch::WatchSet;
use crate::physics::axis::{axis_through_points, bring_axis_on_screen, step_axis, RotationAxis};
use crate::physics::ewald::{closeness_score, project_one};
use crate::physics::operations::refine::{refine_orientation, RefinementReport};
use crate::utils::geometry::Viewport;
use nalgebra::Vector3;
use std::path::Path;

/// Something that moves predicted spots. Queued for whoever draws them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryChange {
    UnitCell,
    Lattice,
    Resolution,
    RlpSize,
    Wavelength,
    Distance,
    BeamCentre,
    Orientation,
    FixedAxis,
}

impl GeometryChange {
    /// Changes that alter which reflections exist, not just where they land.
    pub fn repopulates(self) -> bool {
        matches!(self, Self::UnitCell | Self::Lattice | Self::Resolution | Self::RlpSize)
    }
}

/// One spot as a renderer needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem {
    pub index: usize,
    pub hkl: (i32, i32, i32),
    pub pixel: [f64; 2],
    pub weight: f64,
    pub visible: bool,
    pub watched: bool,
}

/// Everything known about the reflection under the cursor.
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectionReport {
    pub index: usize,
    pub hkl: (i32, i32, i32),
    pub d_spacing: f64,
    pub closeness: f64,
    pub weight: f64,
    pub pixel: [f64; 2],
    pub watched: bool,
}

/// A live indexing session: crystal, detector, the watched spots and the
/// queue of geometry changes not yet seen by the view.
///
/// Every public mutator keeps predicted positions current.
pub struct Session {
    crystal: Crystal,
    detector: Detector,
    watch: WatchSet,
    /// Radians
    degree_step: f64,
    refinement: RefinementSettings,
    changes: Vec<GeometryChange>,
}

impl Session {
    pub fn new(crystal: Crystal, detector: Detector) -> Self {
        let mut session = Self {
            crystal,
            detector,
            watch: WatchSet::new(),
            degree_step: 0.12f64.to_radians(),
            refinement: RefinementSettings::default(),
            changes: Vec::new(),
        };
        session.refresh();
        session
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        let cell = UnitCell::new(cfg.unit_cell)?;
        let crystal = Crystal::new(cell, cfg.lattice, cfg.resolution, cfg.rlp_size)?;
        let detector = Detector::new(cfg.beam_centre, cfg.detector_distance, cfg.wavelength)?
            .with_pick_cutoff(cfg.pick_cutoff)?;

        let mut session = Self::new(crystal, detector);
        session.set_degree_step(cfg.degree_step)?;
        session.refinement = cfg.refinement;
        log::info!(
            "Session ready: {} reflections to {} Å",
            session.crystal.miller_count(),
            session.crystal.resolution()
        );
        Ok(session)
    }

    // --- Accessors ---

    pub fn crystal(&self) -> &Crystal {
        &self.crystal
    }

    /// Direct access for transient edits (e.g. refinement parameters).
    /// Nothing is recomputed; call `notify` when done.
    pub fn crystal_mut(&mut self) -> &mut Crystal {
        &mut self.crystal
    }

    pub fn detector(&self) -> &Detector {
        &self.detector
    }

    pub fn watch_set(&self) -> &WatchSet {
        &self.watch
    }

    pub fn refinement_settings(&self) -> &RefinementSettings {
        &self.refinement
    }

    pub fn set_refinement_settings(&mut self, settings: RefinementSettings) {
        self.refinement = settings;
    }

    /// Degrees
    pub fn degree_step(&self) -> f64 {
        self.degree_step.to_degrees()
    }

    pub fn set_degree_step(&mut self, degrees: f64) -> Result<()> {
        self.degree_step = ensure_positive("degree step", degrees)?.to_radians();
        log::debug!("Rotation step set to {}°", degrees);
        Ok(())
    }

    /// Current refinement objective for the watched spots.
    pub fn score(&self) -> f64 {
        closeness_score(&self.crystal, &self.detector.ewald_sphere(), &self.watch)
    }

    // --- Change propagation ---

    /// Record a change, regenerate reflections if needed and recompute positions.
    pub fn notify(&mut self, change: GeometryChange) {
        if change.repopulates() {
            self.crystal.populate_millers();
            if !self.watch.is_empty() {
                log::info!("Reflection list rebuilt; clearing {} watched spots", self.watch.len());
                self.watch.clear();
            }
        }
        self.detector.invalidate();
        self.changes.push(change);
        self.refresh();
    }

    /// Recompute positions if they are stale.
    pub fn refresh(&mut self) {
        if self.detector.is_stale() {
            self.detector.calculate_positions(&self.crystal);
        }
    }

    /// Changes since the last drain, oldest first.
    pub fn drain_changes(&mut self) -> Vec<GeometryChange> {
        std::mem::take(&mut self.changes)
    }

    // --- Commands ---

    pub fn apply(&mut self, command: &Command) -> Result<()> {
        let v = command.values();
        match command.kind() {
            CommandKind::UnitCell => {
                self.crystal.set_unit_cell(v)?;
                self.notify(GeometryChange::UnitCell);
            }
            CommandKind::BringAxis => self.bring_axis_on_screen(v)?,
            CommandKind::BeamCentre => {
                self.detector.set_beam_centre(v[0], v[1])?;
                self.notify(GeometryChange::BeamCentre);
            }
            CommandKind::Resolution => {
                self.crystal.set_resolution(v[0])?;
                self.notify(GeometryChange::Resolution);
            }
            CommandKind::Distance => {
                self.detector.set_detector_distance(v[0])?;
                self.notify(GeometryChange::Distance);
            }
            CommandKind::Wavelength => {
                self.detector.set_wavelength(v[0])?;
                self.notify(GeometryChange::Wavelength);
            }
            CommandKind::RlpSize => {
                self.crystal.set_rlp_size(v[0])?;
                self.notify(GeometryChange::RlpSize);
            }
            CommandKind::DegreeStep => self.set_degree_step(v[0])?,
        }
        Ok(())
    }

    pub fn set_bravais_lattice(&mut self, lattice: BravaisLattice) {
        if self.crystal.bravais_lattice() == lattice {
            return;
        }
        self.crystal.set_bravais_lattice(lattice);
        self.notify(GeometryChange::Lattice);
    }

    pub fn adjust_beam_centre(&mut self, dx: f64, dy: f64) -> Result<()> {
        self.detector.adjust_beam_centre(dx, dy)?;
        self.notify(GeometryChange::BeamCentre);
        Ok(())
    }

    pub fn bring_axis_on_screen(&mut self, values: &[f64]) -> Result<()> {
        let rotation = bring_axis_on_screen(&self.crystal, values)?;
        self.crystal.orientation_mut().rotate_by(&rotation);
        self.notify(GeometryChange::Orientation);
        Ok(())
    }

    /// One keyboard step about `axis` (or the fixed axis), `sign` picks the sense.
    pub fn rotate_step(&mut self, axis: RotationAxis, sign: f64) {
        let about = step_axis(&self.crystal, axis);
        self.crystal.orientation_mut().rotate_about(&about, self.degree_step * sign.signum());
        self.notify(GeometryChange::Orientation);
    }

    /// Fix the rotation axis to the line through two detector points.
    pub fn fix_axis(&mut self, p1: [f64; 2], p2: [f64; 2]) -> Result<()> {
        let axis = axis_through_points(p1, p2)
            .ok_or_else(|| MandexError::InvalidAxis("the two points coincide".to_string()))?;
        log::info!("Fixed rotation axis ({:.3}, {:.3})", axis.x, axis.y);
        self.crystal.set_fixed_axis(Some(axis));
        self.notify(GeometryChange::FixedAxis);
        Ok(())
    }

    pub fn clear_fixed_axis(&mut self) {
        self.crystal.set_fixed_axis(None);
        self.notify(GeometryChange::FixedAxis);
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.crystal.set_orientation(orientation);
        self.notify(GeometryChange::Orientation);
    }

    // --- Picking ---

    pub fn position_near_coord(&self, x: f64, y: f64) -> Option<usize> {
        self.detector.position_near_coord(x, y)
    }

    /// Pick from a scaled view of the detector image.
    pub fn position_near_window(&self, viewport: &Viewport, window: [f64; 2]) -> Option<usize> {
        let [x, y] = viewport.window_to_detector(window);
        self.position_near_coord(x, y)
    }

    /// Returns whether the reflection is now watched.
    pub fn toggle_watch(&mut self, index: usize) -> Result<bool> {
        let miller = self.crystal.miller(index)?;
        let (h, k, l) = miller.hkl();
        let watched = self.watch.toggle(index);
        log::info!(
            "{} ({} {} {}); {} spots watched",
            if watched { "Watching" } else { "Released" },
            h,
            k,
            l,
            self.watch.len()
        );
        Ok(watched)
    }

    /// Toggle the spot under (x, y), if any. Returns its index and new state.
    pub fn watch_near(&mut self, x: f64, y: f64) -> Option<(usize, bool)> {
        let index = self.position_near_coord(x, y)?;
        self.toggle_watch(index).ok().map(|watched| (index, watched))
    }

    pub fn identify(&self, x: f64, y: f64) -> Option<ReflectionReport> {
        let index = self.position_near_coord(x, y)?;
        let spot = self.detector.predictions()?.spot_for(index)?;
        let projection = project_one(&self.crystal, &self.detector.ewald_sphere(), index)?;
        let miller = self.crystal.millers().get(index)?;
        Some(ReflectionReport {
            index,
            hkl: miller.hkl(),
            d_spacing: miller.d_spacing(),
            closeness: projection.closeness,
            weight: projection.weight,
            pixel: spot.pixel,
            watched: self.watch.is_watched(index),
        })
    }

    /// Minimise the watched spots' distance from the Ewald sphere.
    pub fn refine(&mut self) -> Result<RefinementReport> {
        let settings = self.refinement;
        refine_orientation(self, &settings)
    }

    /// Fold refined tilts into the base rotation and drop the watch set.
    pub(crate) fn finish_refinement(&mut self) {
        self.crystal.orientation_mut().commit();
        self.watch.clear();
        self.notify(GeometryChange::Orientation);
    }

    // --- Rendering hand-off ---

    pub fn render_items(&self) -> Vec<RenderItem> {
        let Some(predictions) = self.detector.predictions() else {
            return Vec::new();
        };
        let millers = self.crystal.millers();
        predictions
            .spots()
            .iter()
            .filter_map(|spot| {
                let miller = millers.get(spot.index)?;
                Some(RenderItem {
                    index: spot.index,
                    hkl: miller.hkl(),
                    pixel: spot.pixel,
                    weight: spot.weight,
                    visible: spot.visible,
                    watched: self.watch.is_watched(spot.index),
                })
            })
            .collect()
    }

    pub fn scaled_basis_vectors(&self, length: f64) -> [Vector3<f64>; 3] {
        self.crystal.scaled_basis_vectors(length)
    }

    pub fn fixed_axis(&self) -> Vector3<f64> {
        self.crystal.fixed_axis()
    }

    // --- Matrix files ---

    pub fn load_matrix(&mut self, path: &Path) -> Result<()> {
        let orientation = matrix::load_matrix(path)?;
        self.set_orientation(orientation);
        Ok(())
    }

    pub fn save_matrix(&self, path: &Path) -> Result<()> {
        matrix::save_matrix(path, self.crystal.orientation())
    }
}
