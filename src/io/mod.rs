// src/io/mod.rs
pub mod commands;
pub mod matrix;
pub mod script;

pub use commands::{tokenize, Command, CommandKind};
pub use matrix::{load_matrix, save_matrix};
