// src/physics/mod.rs
pub mod axis;
pub mod ewald;
pub mod lookup;
pub mod miller_gen;
pub mod operations;
pub mod projection;
