// src/physics/operations/mod.rs
pub mod refine;

pub use refine::{refine_orientation, refine_with, RefinementReport};
