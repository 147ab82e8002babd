// src/model/crystal.rs

use crate::error::{ensure_positive, MandexError, Result};
use crate::model::lattice::BravaisLattice;
use crate::model::miller::MillerIndex;
use crate::model::orientation::Orientation;
use crate::model::unit_cell::UnitCell;
use crate::physics::miller_gen::{check_enumeration, populate_millers};
use nalgebra::{Unit, Vector3};

/// Crystal model: cell, centering, resolution cut-off, spot size, orientation
/// and the Miller list derived from them.
#[derive(Debug, Clone)]
pub struct Crystal {
    cell: UnitCell,
    lattice: BravaisLattice,
    resolution: f64,
    rlp_size: f64,
    orientation: Orientation,
    fixed_axis: Option<Unit<Vector3<f64>>>,
    millers: Vec<MillerIndex>,
}

impl Crystal {
    pub fn new(cell: UnitCell, lattice: BravaisLattice, resolution: f64, rlp_size: f64) -> Result<Self> {
        check_enumeration(&cell, ensure_positive("resolution", resolution)?)?;
        let mut crystal = Self {
            cell,
            lattice,
            resolution: ensure_positive("resolution", resolution)?,
            rlp_size: ensure_positive("rlp size", rlp_size)?,
            orientation: Orientation::identity(),
            fixed_axis: None,
            millers: Vec::new(),
        };
        crystal.populate_millers();
        Ok(crystal)
    }

    /// Regenerate the Miller list from the current cell, lattice and resolution.
    pub fn populate_millers(&mut self) {
        self.millers = populate_millers(&self.cell, self.lattice, self.resolution);
    }

    pub fn unit_cell(&self) -> &UnitCell {
        &self.cell
    }

    /// Replace the cell; anything but six valid parameters leaves it untouched.
    /// The Miller list is not regenerated here.
    pub fn set_unit_cell(&mut self, values: &[f64]) -> Result<()> {
        let cell = UnitCell::from_values(values)?;
        check_enumeration(&cell, self.resolution)?;
        self.cell = cell;
        Ok(())
    }

    pub fn bravais_lattice(&self) -> BravaisLattice {
        self.lattice
    }

    pub fn set_bravais_lattice(&mut self, lattice: BravaisLattice) {
        self.lattice = lattice;
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn set_resolution(&mut self, resolution: f64) -> Result<()> {
        let resolution = ensure_positive("resolution", resolution)?;
        check_enumeration(&self.cell, resolution)?;
        self.resolution = resolution;
        Ok(())
    }

    pub fn rlp_size(&self) -> f64 {
        self.rlp_size
    }

    pub fn set_rlp_size(&mut self, rlp_size: f64) -> Result<()> {
        self.rlp_size = ensure_positive("rlp size", rlp_size)?;
        Ok(())
    }

    pub fn orientation(&self) -> &Orientation {
        &self.orientation
    }

    pub fn orientation_mut(&mut self) -> &mut Orientation {
        &mut self.orientation
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.orientation = orientation;
    }

    pub fn millers(&self) -> &[MillerIndex] {
        &self.millers
    }

    pub fn miller_count(&self) -> usize {
        self.millers.len()
    }

    pub fn miller(&self, index: usize) -> Result<&MillerIndex> {
        self.millers.get(index).ok_or(MandexError::NoSuchReflection {
            index,
            count: self.millers.len(),
        })
    }

    /// Rotated real-space axes a, b, c, scaled so the longest is `length`
    /// long (screen units). Only meant for drawing.
    pub fn scaled_basis_vectors(&self, length: f64) -> [Vector3<f64>; 3] {
        let rotation = self.orientation.rotation();
        let basis = self.cell.real_basis();
        let longest = self.cell.axis_lengths().into_iter().fold(0.0, f64::max);
        let scale = if longest > 0.0 { length / longest } else { 0.0 };

        [0, 1, 2].map(|i| rotation * basis.column(i).into_owned() * scale)
    }

    /// Fixed rotation axis (lab frame), or the zero vector when unset.
    pub fn fixed_axis(&self) -> Vector3<f64> {
        self.fixed_axis.map(|a| a.into_inner()).unwrap_or_else(Vector3::zeros)
    }

    pub fn fixed_axis_unit(&self) -> Option<Unit<Vector3<f64>>> {
        self.fixed_axis
    }

    pub fn set_fixed_axis(&mut self, axis: Option<Unit<Vector3<f64>>>) {
        self.fixed_axis = axis;
    }
}
