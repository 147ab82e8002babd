// src/utils/simplex.rs

//! Derivative-free Nelder–Mead minimiser over externally owned parameters.
//!
//! The optimiser never stores parameter values itself: each [`Parameter`]
//! reads and writes a field of a caller-supplied context, and the objective
//! scores that context. This keeps it independent of the crystal model.

use std::cmp::Ordering;
use std::fmt;

const REFLECTION: f64 = 1.0;
const EXPANSION: f64 = 2.0;
const CONTRACTION: f64 = 0.5;
const SHRINK: f64 = 0.5;

/// One tunable value living inside a context `C`.
pub struct Parameter<C> {
    pub name: String,
    get: Box<dyn Fn(&C) -> f64>,
    set: Box<dyn Fn(&mut C, f64)>,
    /// Initial simplex offset
    pub step: f64,
    /// Simplex spread below which this parameter counts as converged
    pub tolerance: f64,
}

impl<C> Parameter<C> {
    pub fn new(
        name: impl Into<String>,
        get: impl Fn(&C) -> f64 + 'static,
        set: impl Fn(&mut C, f64) + 'static,
        step: f64,
        tolerance: f64,
    ) -> Self {
        Self {
            name: name.into(),
            get: Box::new(get),
            set: Box::new(set),
            step,
            tolerance,
        }
    }

    pub fn get(&self, ctx: &C) -> f64 {
        (self.get)(ctx)
    }

    pub fn set(&self, ctx: &mut C, value: f64) {
        (self.set)(ctx, value)
    }
}

impl<C> fmt::Debug for Parameter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("step", &self.step)
            .field("tolerance", &self.tolerance)
            .finish()
    }
}

/// What a run ended with. Not converging is a normal outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexOutcome {
    pub best: Vec<f64>,
    pub score: f64,
    pub start_score: f64,
    pub cycles: usize,
    pub evaluations: usize,
    pub converged: bool,
}

#[derive(Debug, Clone)]
struct Vertex {
    point: Vec<f64>,
    score: f64,
}

/// Nelder–Mead simplex with standard coefficients (1, 2, 0.5, 0.5).
pub struct NelderMead<C> {
    parameters: Vec<Parameter<C>>,
    objective: Box<dyn Fn(&C) -> f64>,
    cycles: usize,
    early_exit: bool,
}

impl<C> NelderMead<C> {
    pub fn new(objective: impl Fn(&C) -> f64 + 'static) -> Self {
        Self {
            parameters: Vec::new(),
            objective: Box::new(objective),
            cycles: 30,
            early_exit: true,
        }
    }

    pub fn add_parameter(&mut self, parameter: Parameter<C>) -> &mut Self {
        self.parameters.push(parameter);
        self
    }

    pub fn set_cycles(&mut self, cycles: usize) -> &mut Self {
        self.cycles = cycles;
        self
    }

    /// Stop before the cycle budget once every parameter's spread across the
    /// simplex is within its tolerance. On by default.
    pub fn set_early_exit(&mut self, early_exit: bool) -> &mut Self {
        self.early_exit = early_exit;
        self
    }

    pub fn parameters(&self) -> &[Parameter<C>] {
        &self.parameters
    }

    fn evaluate(&self, ctx: &mut C, point: &[f64], evaluations: &mut usize) -> f64 {
        for (param, &value) in self.parameters.iter().zip(point) {
            param.set(ctx, value);
        }
        *evaluations += 1;
        let score = (self.objective)(ctx);
        // NaN would poison the ordering; treat it as infinitely bad
        if score.is_nan() { f64::INFINITY } else { score }
    }

    fn converged(&self, simplex: &[Vertex]) -> bool {
        self.parameters.iter().enumerate().all(|(i, param)| {
            let (lo, hi) = simplex.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v.point[i]), hi.max(v.point[i]))
            });
            hi - lo <= param.tolerance
        })
    }

    /// Minimise the objective, leaving `ctx` at the best point found.
    pub fn refine(&self, ctx: &mut C) -> SimplexOutcome {
        let n = self.parameters.len();
        let start: Vec<f64> = self.parameters.iter().map(|p| p.get(ctx)).collect();
        let mut evaluations = 0;

        if n == 0 {
            let score = (self.objective)(ctx);
            return SimplexOutcome {
                best: start,
                score,
                start_score: score,
                cycles: 0,
                evaluations: 1,
                converged: true,
            };
        }

        let start_score = self.evaluate(ctx, &start, &mut evaluations);
        let mut simplex = vec![Vertex { point: start.clone(), score: start_score }];
        for (i, param) in self.parameters.iter().enumerate() {
            let mut point = start.clone();
            point[i] += param.step;
            let score = self.evaluate(ctx, &point, &mut evaluations);
            simplex.push(Vertex { point, score });
        }

        let mut cycles = 0;
        let mut converged = false;

        while cycles < self.cycles {
            simplex.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));

            if self.early_exit && self.converged(&simplex) {
                converged = true;
                break;
            }
            cycles += 1;

            let best = simplex[0].score;
            let second_worst = simplex[n - 1].score;
            let worst = simplex[n].clone();

            let centroid: Vec<f64> = (0..n)
                .map(|i| simplex[..n].iter().map(|v| v.point[i]).sum::<f64>() / n as f64)
                .collect();
            let towards = |target: &[f64], coeff: f64| -> Vec<f64> {
                centroid.iter().zip(target).map(|(c, t)| c + coeff * (t - c)).collect()
            };

            let reflected = towards(&worst.point, -REFLECTION);
            let reflected_score = self.evaluate(ctx, &reflected, &mut evaluations);

            if reflected_score < best {
                let expanded = towards(&reflected, EXPANSION);
                let expanded_score = self.evaluate(ctx, &expanded, &mut evaluations);
                simplex[n] = if expanded_score < reflected_score {
                    Vertex { point: expanded, score: expanded_score }
                } else {
                    Vertex { point: reflected, score: reflected_score }
                };
                continue;
            }

            if reflected_score < second_worst {
                simplex[n] = Vertex { point: reflected, score: reflected_score };
                continue;
            }

            // Outside contraction when the reflection beat the worst, inside otherwise
            let (contracted, bar) = if reflected_score < worst.score {
                (towards(&reflected, CONTRACTION), reflected_score)
            } else {
                (towards(&worst.point, CONTRACTION), worst.score)
            };
            let contracted_score = self.evaluate(ctx, &contracted, &mut evaluations);
            if contracted_score < bar {
                simplex[n] = Vertex { point: contracted, score: contracted_score };
                continue;
            }

            let anchor = simplex[0].point.clone();
            for vertex in simplex.iter_mut().skip(1) {
                let point: Vec<f64> = anchor
                    .iter()
                    .zip(&vertex.point)
                    .map(|(a, p)| a + SHRINK * (p - a))
                    .collect();
                vertex.score = self.evaluate(ctx, &point, &mut evaluations);
                vertex.point = point;
            }
        }

        simplex.sort_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(Ordering::Equal));
        let best = simplex.swap_remove(0);
        for (param, &value) in self.parameters.iter().zip(&best.point) {
            param.set(ctx, value);
        }

        SimplexOutcome {
            best: best.point,
            score: best.score,
            start_score,
            cycles,
            evaluations,
            converged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Point {
        x: f64,
        y: f64,
    }

    fn paraboloid() -> NelderMead<Point> {
        let mut mead = NelderMead::new(|p: &Point| (p.x - 3.0).powi(2) + 2.0 * (p.y + 2.0).powi(2));
        mead.add_parameter(Parameter::new("x", |p: &Point| p.x, |p: &mut Point, v| p.x = v, 1.0, 1e-7))
            .add_parameter(Parameter::new("y", |p: &Point| p.y, |p: &mut Point, v| p.y = v, 1.0, 1e-7));
        mead
    }

    #[test]
    fn test_paraboloid_minimum() {
        let mut mead = paraboloid();
        mead.set_cycles(200);
        let mut ctx = Point::default();
        let outcome = mead.refine(&mut ctx);

        assert!((ctx.x - 3.0).abs() < 1e-3, "x = {}", ctx.x);
        assert!((ctx.y + 2.0).abs() < 1e-3, "y = {}", ctx.y);
        assert!(outcome.score < 1e-6);
        assert!(outcome.score <= outcome.start_score);
        assert_eq!(outcome.best, vec![ctx.x, ctx.y]);
    }

    #[test]
    fn test_fixed_budget_still_improves() {
        let mut mead = paraboloid();
        mead.set_cycles(5).set_early_exit(false);
        let mut ctx = Point::default();
        let outcome = mead.refine(&mut ctx);

        assert_eq!(outcome.cycles, 5);
        assert!(!outcome.converged);
        assert!(outcome.score < outcome.start_score);
        // Context is left at the reported best point
        let here = (ctx.x - 3.0).powi(2) + 2.0 * (ctx.y + 2.0).powi(2);
        assert!((here - outcome.score).abs() < 1e-12);
    }

    #[test]
    fn test_early_exit_on_tolerance() {
        let mut mead = NelderMead::new(|p: &Point| (p.x - 1.0).powi(2));
        mead.add_parameter(Parameter::new("x", |p: &Point| p.x, |p: &mut Point, v| p.x = v, 0.5, 1e-3));
        mead.set_cycles(10_000);
        let mut ctx = Point::default();
        let outcome = mead.refine(&mut ctx);

        assert!(outcome.converged);
        assert!(outcome.cycles < 10_000);
        assert!((ctx.x - 1.0).abs() < 1e-2);
    }

    #[test]
    fn test_nan_objective_never_wins() {
        let mut mead = NelderMead::new(|p: &Point| if p.x > 0.5 { f64::NAN } else { (p.x + 1.0).powi(2) });
        mead.add_parameter(Parameter::new("x", |p: &Point| p.x, |p: &mut Point, v| p.x = v, 1.0, 1e-6));
        mead.set_cycles(100);
        let mut ctx = Point::default();
        let outcome = mead.refine(&mut ctx);

        assert!(outcome.score.is_finite());
        assert!((ctx.x + 1.0).abs() < 1e-2);
    }

    #[test]
    fn test_no_parameters() {
        let mead = NelderMead::new(|_: &Point| 4.0);
        let mut ctx = Point::default();
        let outcome = mead.refine(&mut ctx);
        assert_eq!(outcome.score, 4.0);
        assert!(outcome.best.is_empty());
    }
}
