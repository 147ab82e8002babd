// src/config.rs

use crate::error::Result;
use crate::model::lattice::BravaisLattice;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

// --- Refinement ---

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefinementSettings {
  /// Nelder–Mead iterations per run
  pub cycles: usize,
  /// Initial simplex step for each tilt angle (radians)
  pub step: f64,
  /// Per-parameter convergence tolerance (radians)
  pub tolerance: f64,
  /// Allow stopping before `cycles` once the simplex is within tolerance
  #[serde(default = "default_true")]
  pub early_exit: bool,
}

fn default_true() -> bool {
  true
}

impl Default for RefinementSettings {
  fn default() -> Self {
    Self {
      cycles: 15,
      step: 0.002,
      tolerance: 0.0002,
      early_exit: true,
    }
  }
}

// --- Main Config Struct ---

/// Start-up values for a session. These are defaults, not saved session state.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
  /// a b c (Å) alpha beta gamma (°)
  pub unit_cell: [f64; 6],
  #[serde(default)]
  pub lattice: BravaisLattice,
  /// High-resolution limit (Å)
  pub resolution: f64,
  /// Å
  pub wavelength: f64,
  /// Half-width of a reciprocal lattice point (Å⁻¹)
  pub rlp_size: f64,
  /// Pixels
  pub beam_centre: [f64; 2],
  /// Pixel-equivalent units
  pub detector_distance: f64,
  /// Degrees per interactive rotation step
  pub degree_step: f64,
  /// Pick radius in pixels
  pub pick_cutoff: f64,

  #[serde(default)]
  pub refinement: RefinementSettings,

  #[serde(default = "default_log_level")]
  pub log_level: String,
}

fn default_log_level() -> String {
  "info".to_string()
}

impl Default for Config {
  fn default() -> Self {
    Self {
      unit_cell: [79.2, 79.2, 38.0, 90.0, 90.0, 90.0],
      lattice: BravaisLattice::Primitive,
      resolution: 1.8,
      wavelength: 0.0251,
      rlp_size: 0.002,
      beam_centre: [2200.0, 2200.0],
      detector_distance: 174286.0,
      degree_step: 0.12,
      pick_cutoff: 10.0,
      refinement: RefinementSettings::default(),
      log_level: default_log_level(),
    }
  }
}

impl Config {
  /// Loads config from the standard OS location (e.g. ~/.config/mandexing/settings.json).
  /// Falls back to defaults when the file is missing or broken.
  pub fn load() -> Self {
    let path = Self::get_path();
    if !path.exists() {
      log::debug!("No config found at {:?}. Using defaults.", path);
      return Self::default();
    }

    match Self::load_from(&path) {
      Ok(cfg) => {
        log::info!("Config loaded from {:?}", path);
        cfg
      }
      Err(e) => {
        log::warn!("Error reading config {:?}: {}. Using defaults.", path, e);
        Self::default()
      }
    }
  }

  pub fn load_from(path: &Path) -> Result<Self> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
  }

  /// Saves config to the standard OS location
  pub fn save(&self) -> Result<PathBuf> {
    let path = Self::get_path();
    self.save_to(&path)?;
    Ok(path)
  }

  pub fn save_to(&self, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, self)?;
    log::info!("Config saved to {:?}", path);
    Ok(())
  }

  pub fn get_path() -> PathBuf {
    if let Some(proj) = ProjectDirs::from("org", "mandexing", "mandexing") {
      proj.config_dir().join("settings.json")
    } else {
      PathBuf::from("settings.json")
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_roundtrip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("settings.json");

    let mut cfg = Config::default();
    cfg.lattice = BravaisLattice::Face;
    cfg.refinement.cycles = 40;
    cfg.save_to(&path).unwrap();

    let back = Config::load_from(&path).unwrap();
    assert_eq!(back, cfg);
  }

  #[test]
  fn test_missing_optional_fields_get_defaults() {
    let json = r#"{
      "unit_cell": [10.0, 10.0, 10.0, 90.0, 90.0, 90.0],
      "resolution": 2.0,
      "wavelength": 1.0,
      "rlp_size": 0.01,
      "beam_centre": [512.0, 512.0],
      "detector_distance": 1000.0,
      "degree_step": 0.5,
      "pick_cutoff": 8.0
    }"#;
    let cfg: Config = serde_json::from_str(json).unwrap();
    assert_eq!(cfg.lattice, BravaisLattice::Primitive);
    assert_eq!(cfg.refinement, RefinementSettings::default());
    assert_eq!(cfg.log_level, "info");
  }

  #[test]
  fn test_broken_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(Config::load_from(&path).is_err());
  }
}
