// src/physics/miller_gen.rs
use crate::error::{MandexError, Result};
use crate::model::lattice::BravaisLattice;
use crate::model::miller::MillerIndex;
use crate::model::unit_cell::UnitCell;

/// Largest |h|, |k| or |l| the generator will enumerate.
pub const MAX_INDEX: i32 = 256;

/// Largest |h|, |k|, |l| that can reach `resolution`, capped at `MAX_INDEX`.
///
/// Since `h = q·a`, any reflection with `|q| <= 1/d` has `|h| <= |a|/d`.
/// Unlike `1/(d|a*|)` this stays a hard bound for oblique cells.
pub fn index_bounds(cell: &UnitCell, resolution: f64) -> [i32; 3] {
    cell.axis_lengths()
        .map(|length| (length / resolution).floor().clamp(0.0, MAX_INDEX as f64) as i32)
}

/// Refuse a cell and resolution pair whose index bounds would pass `MAX_INDEX`.
pub fn check_enumeration(cell: &UnitCell, resolution: f64) -> Result<()> {
    let longest = cell.axis_lengths().into_iter().fold(0.0, f64::max);
    if longest / resolution > MAX_INDEX as f64 {
        return Err(MandexError::ResolutionTooFine { resolution, max_index: MAX_INDEX });
    }
    Ok(())
}

/// Enumerate every (h, k, l) inside the resolution sphere that the
/// centering admits. The origin is never emitted.
pub fn populate_millers(
    cell: &UnitCell,
    lattice: BravaisLattice,
    resolution: f64,
) -> Vec<MillerIndex> {
    let mut millers = Vec::new();
    if !(resolution.is_finite() && resolution > 0.0) {
        return millers;
    }

    if check_enumeration(cell, resolution).is_err() {
        log::warn!("Resolution {} Å is too fine for this cell; indices capped at ±{}", resolution, MAX_INDEX);
    }

    let max_q = 1.0 / resolution;
    let [h_max, k_max, l_max] = index_bounds(cell, resolution);

    for h in -h_max..=h_max {
        for k in -k_max..=k_max {
            for l in -l_max..=l_max {
                if h == 0 && k == 0 && l == 0 { continue; }
                if !lattice.admits(h, k, l) { continue; }

                let q = cell.reciprocal_vector(h, k, l);
                if q.norm() > max_q { continue; }

                millers.push(MillerIndex::new(h, k, l, q));
            }
        }
    }

    log::debug!(
        "Generated {} {} reflections to {:.3} Å (bounds ±{} ±{} ±{})",
        millers.len(),
        lattice.symbol(),
        resolution,
        h_max,
        k_max,
        l_max
    );

    millers
}
