// src/physics/operations/refine.rs
use crate::config::RefinementSettings;
use crate::error::{MandexError, Result};
use crate::physics::ewald::closeness_score;
use crate::state::Session;
use crate::utils::simplex::{NelderMead, Parameter, SimplexOutcome};

#[derive(Debug, Clone, PartialEq)]
pub struct RefinementReport {
    /// Spots that drove the fit
    pub watched: usize,
    /// Tilt applied about lab x (radians)
    pub horizontal: f64,
    /// Tilt applied about lab y (radians)
    pub vertical: f64,
    pub outcome: SimplexOutcome,
}

/// The two tilt angles, read and written through the session's orientation.
pub fn orientation_parameters(settings: &RefinementSettings) -> Vec<Parameter<Session>> {
    vec![
        Parameter::new(
            "horizontal",
            |s: &Session| s.crystal().orientation().horizontal(),
            |s: &mut Session, v| s.crystal_mut().orientation_mut().set_horizontal(v),
            settings.step,
            settings.tolerance,
        ),
        Parameter::new(
            "vertical",
            |s: &Session| s.crystal().orientation().vertical(),
            |s: &mut Session, v| s.crystal_mut().orientation_mut().set_vertical(v),
            settings.step,
            settings.tolerance,
        ),
    ]
}

pub fn refine_orientation(session: &mut Session, settings: &RefinementSettings) -> Result<RefinementReport> {
    refine_with(session, settings, Vec::new())
}

/// Refine the tilts plus any `extra` parameters against the watched spots.
///
/// On return the tilts are folded into the orientation, the watch set is
/// cleared and predictions are recomputed.
pub fn refine_with(
    session: &mut Session,
    settings: &RefinementSettings,
    extra: Vec<Parameter<Session>>,
) -> Result<RefinementReport> {
    let watched = session.watch_set().len();
    if watched == 0 {
        return Err(MandexError::EmptyWatchSet);
    }

    // Tilts start from zero so the simplex explores around the current pose
    session.crystal_mut().orientation_mut().commit();

    let mut mead = NelderMead::new(|s: &Session| {
        closeness_score(s.crystal(), &s.detector().ewald_sphere(), s.watch_set())
    });
    for parameter in orientation_parameters(settings).into_iter().chain(extra) {
        mead.add_parameter(parameter);
    }
    mead.set_cycles(settings.cycles).set_early_exit(settings.early_exit);

    log::info!("Refining orientation against {} watched spots", watched);
    let outcome = mead.refine(session);

    let horizontal = session.crystal().orientation().horizontal();
    let vertical = session.crystal().orientation().vertical();
    log::info!(
        "Refinement: score {:.6} -> {:.6} after {} cycles ({} evaluations){}",
        outcome.start_score,
        outcome.score,
        outcome.cycles,
        outcome.evaluations,
        if outcome.converged { ", converged" } else { "" }
    );
    log::debug!(
        "Tilt applied: {:.4}° horizontal, {:.4}° vertical",
        horizontal.to_degrees(),
        vertical.to_degrees()
    );

    session.finish_refinement();

    Ok(RefinementReport { watched, horizontal, vertical, outcome })
}
