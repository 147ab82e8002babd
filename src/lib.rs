// src/lib.rs

//! Predict where Bragg reflections of an oriented crystal land on a flat
//! detector, and refine the orientation against spots the user picks.

pub mod config;
pub mod error;
pub mod io;
pub mod model;
pub mod physics;
pub mod state;
pub mod utils;

pub use error::{MandexError, Result};
pub use state::{GeometryChange, Session};
