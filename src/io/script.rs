// src/io/script.rs

//! Replayable session scripts.
//!
//! One step per line, `#` starts a comment:
//!
//! ```text
//! cell 79.2 79.2 38 90 90 90
//! lattice P
//! axis 0 0 1
//! watch 2255 2200
//! refine
//! save matrix.dat
//! ```

use crate::error::{MandexError, Result};
use crate::io::commands::{tokenize, Command, CommandKind};
use crate::model::lattice::BravaisLattice;
use crate::physics::axis::RotationAxis;
use crate::physics::operations::RefinementReport;
use crate::state::{ReflectionReport, Session};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptStep {
    Numeric(Command),
    Lattice(BravaisLattice),
    Nudge { dx: f64, dy: f64 },
    Watch { x: f64, y: f64 },
    Identify { x: f64, y: f64 },
    Rotate { axis: RotationAxis, sign: f64 },
    Fix { from: [f64; 2], to: [f64; 2] },
    Unfix,
    Refine,
    Load(PathBuf),
    Save(PathBuf),
}

/// A parsed step and the 1-based line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub step: ScriptStep,
}

/// What running a script produced, for the caller to print.
#[derive(Debug, Default)]
pub struct ScriptOutput {
    pub identified: Vec<ReflectionReport>,
    pub refinements: Vec<RefinementReport>,
    /// Steps that touched nothing (a watch or identify far from any spot)
    pub misses: Vec<usize>,
}

fn numbers<const N: usize>(command: &'static str, rest: &str) -> Result<[f64; N]> {
    let values = tokenize(rest)?;
    <[f64; N]>::try_from(values.as_slice()).map_err(|_| MandexError::WrongArity {
        command,
        expected: N.to_string(),
        found: values.len(),
    })
}

fn path_arg(command: &'static str, rest: &str) -> Result<PathBuf> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(MandexError::WrongArity { command, expected: "a path".to_string(), found: 0 });
    }
    Ok(PathBuf::from(rest))
}

fn parse_step(keyword: &str, rest: &str) -> Result<ScriptStep> {
    if let Some(kind) = CommandKind::from_keyword(keyword) {
        return Ok(ScriptStep::Numeric(Command::parse(kind, rest)?));
    }

    let step = match keyword {
        "lattice" => ScriptStep::Lattice(BravaisLattice::from_symbol(rest.trim())?),
        "nudge" => {
            let [dx, dy] = numbers::<2>("nudge", rest)?;
            ScriptStep::Nudge { dx, dy }
        }
        "watch" => {
            let [x, y] = numbers::<2>("watch", rest)?;
            ScriptStep::Watch { x, y }
        }
        "identify" => {
            let [x, y] = numbers::<2>("identify", rest)?;
            ScriptStep::Identify { x, y }
        }
        "rotate" => {
            let mut words = rest.split_whitespace();
            let axis = words
                .next()
                .and_then(RotationAxis::from_symbol)
                .ok_or_else(|| MandexError::InvalidAxis(format!("'{}', expected h, v or b", rest.trim())))?;
            let sign = match words.next() {
                None | Some("+") => 1.0,
                Some("-") => -1.0,
                Some(other) => return Err(MandexError::NotNumeric { token: other.to_string() }),
            };
            ScriptStep::Rotate { axis, sign }
        }
        "fix" => {
            let [x1, y1, x2, y2] = numbers::<4>("fix", rest)?;
            ScriptStep::Fix { from: [x1, y1], to: [x2, y2] }
        }
        "unfix" => ScriptStep::Unfix,
        "refine" => ScriptStep::Refine,
        "load" => ScriptStep::Load(path_arg("load", rest)?),
        "save" => ScriptStep::Save(path_arg("save", rest)?),
        other => return Err(MandexError::UnknownCommand(other.to_string())),
    };
    Ok(step)
}

pub fn parse(text: &str) -> Result<Vec<ScriptLine>> {
    let mut steps = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let (keyword, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let step = parse_step(&keyword.to_ascii_lowercase(), rest)
            .map_err(|e| MandexError::Script { line: i + 1, source: Box::new(e) })?;
        steps.push(ScriptLine { line: i + 1, step });
    }

    log::debug!("Parsed {} script steps", steps.len());
    Ok(steps)
}

/// Execute steps in order. Relative paths resolve against `base_dir`.
/// Stops at the first failing step.
pub fn run(session: &mut Session, steps: &[ScriptLine], base_dir: &Path) -> Result<ScriptOutput> {
    let mut output = ScriptOutput::default();

    for ScriptLine { line, step } in steps {
        let wrap = |e: MandexError| MandexError::Script { line: *line, source: Box::new(e) };

        match step {
            ScriptStep::Numeric(command) => session.apply(command).map_err(wrap)?,
            ScriptStep::Lattice(lattice) => session.set_bravais_lattice(*lattice),
            ScriptStep::Nudge { dx, dy } => session.adjust_beam_centre(*dx, *dy).map_err(wrap)?,
            ScriptStep::Watch { x, y } => {
                if session.watch_near(*x, *y).is_none() {
                    log::warn!("line {}: no reflection near ({}, {})", line, x, y);
                    output.misses.push(*line);
                }
            }
            ScriptStep::Identify { x, y } => match session.identify(*x, *y) {
                Some(report) => output.identified.push(report),
                None => {
                    log::warn!("line {}: no reflection near ({}, {})", line, x, y);
                    output.misses.push(*line);
                }
            },
            ScriptStep::Rotate { axis, sign } => session.rotate_step(*axis, *sign),
            ScriptStep::Fix { from, to } => session.fix_axis(*from, *to).map_err(wrap)?,
            ScriptStep::Unfix => session.clear_fixed_axis(),
            ScriptStep::Refine => output.refinements.push(session.refine().map_err(wrap)?),
            ScriptStep::Load(path) => session.load_matrix(&base_dir.join(path)).map_err(wrap)?,
            ScriptStep::Save(path) => session.save_matrix(&base_dir.join(path)).map_err(wrap)?,
        }
    }

    Ok(output)
}

/// Parse and run a script file; its directory anchors relative paths.
pub fn run_file(session: &mut Session, path: &Path) -> Result<ScriptOutput> {
    let text = fs::read_to_string(path)?;
    let steps = parse(&text)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    log::info!("Running {} steps from {:?}", steps.len(), path);
    run(session, &steps, base_dir)
}
