// src/io/matrix.rs

use crate::error::{MandexError, Result};
use crate::model::orientation::Orientation;
use std::fs;
use std::path::Path;

const HEADER: &str = "rotation";

/// `rotation v0 v1 ... v8` with the matrix in row-major order.
pub fn format_matrix(orientation: &Orientation) -> String {
    let values: Vec<String> = orientation.to_row_major().iter().map(|v| v.to_string()).collect();
    format!("{} {}\n", HEADER, values.join(" "))
}

pub fn parse_matrix(contents: &str) -> Result<Orientation> {
    let tokens: Vec<&str> = contents.split_whitespace().collect();

    if tokens.len() < 10 {
        return Err(MandexError::MatrixFile(format!(
            "not enough components, expecting 10 space-separated values, found {}",
            tokens.len()
        )));
    }
    if tokens[0] != HEADER {
        return Err(MandexError::MatrixFile(format!(
            "expecting the first component to be '{}', found '{}'",
            HEADER, tokens[0]
        )));
    }

    let mut values = [0.0; 9];
    for (slot, token) in values.iter_mut().zip(&tokens[1..10]) {
        *slot = token
            .parse()
            .map_err(|_| MandexError::MatrixFile(format!("'{}' is not a number", token)))?;
    }

    Orientation::from_row_major(values)
}

pub fn save_matrix(path: &Path, orientation: &Orientation) -> Result<()> {
    fs::write(path, format_matrix(orientation))?;
    log::info!("Saved rotation matrix to {:?}", path);
    Ok(())
}

pub fn load_matrix(path: &Path) -> Result<Orientation> {
    let contents = fs::read_to_string(path)?;
    let orientation = parse_matrix(&contents).map_err(|e| {
        log::warn!("Could not load matrix from {:?}: {}", path, e);
        e
    })?;
    log::info!("Loaded rotation matrix from {:?}", path);
    Ok(orientation)
}
