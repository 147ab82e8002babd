// src/model/mod.rs
pub mod crystal;
pub mod detector;
pub mod lattice;
pub mod miller;
pub mod orientation;
pub mod unit_cell;
pub mod watch;

// Re-export common types
pub use crystal::Crystal;
pub use detector::Detector;
pub use lattice::BravaisLattice;
pub use miller::MillerIndex;
pub use orientation::Orientation;
pub use unit_cell::UnitCell;
pub use watch::WatchSet;
