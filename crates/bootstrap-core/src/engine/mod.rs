//! Interval refinement: one Hankel determinant per round, solved for
//! `det >= 0` and intersected into the surviving energy region.

mod round;

pub use round::{is_confirmable, refine_round};

use crate::checkpoint::CheckpointStore;
use crate::common::RunConfig;
use crate::domain::{BootstrapError, BootstrapResult, IntersectionMode, SolveMode};
use crate::numerics::{self, PositivityProbe, RationalFunction};
use crate::providers::MomentProvider;
use crate::region::{Interval, Region};
use crate::solver::{InequalitySolver, Relation, SturmSolver};
use std::time::Instant;
use tracing::{debug, info};

/// Result of a run, including rounds restored from a checkpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RefinementOutcome {
    /// `history[i]` is the region surviving round `i + 1`.
    pub history: Vec<Region>,
    pub confirmed: Region,
    pub rounds_computed: usize,
    /// Number of rounds loaded from a checkpoint, if one was resumed.
    pub resumed_from: Option<usize>,
}

impl RefinementOutcome {
    pub fn final_region(&self) -> Option<&Region> {
        self.history.last()
    }
}

/// Solved region of one determinant, before intersection.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSolution {
    pub order: usize,
    pub determinant_degree: Option<usize>,
    pub candidate: Region,
}

pub struct RefinementEngine<'a> {
    provider: &'a dyn MomentProvider,
    config: &'a RunConfig,
    solver: Box<dyn InequalitySolver + 'a>,
    checkpoint: Option<CheckpointStore>,
}

impl<'a> RefinementEngine<'a> {
    pub fn new(provider: &'a dyn MomentProvider, config: &'a RunConfig) -> BootstrapResult<Self> {
        config.validate()?;
        if config.round > provider.max_order() {
            return Err(BootstrapError::input_validation(
                "INPUT.ROUND",
                format!(
                    "round {} exceeds the {} provider's maximum order {}",
                    config.round,
                    provider.name(),
                    provider.max_order()
                ),
            ));
        }
        if config.mode == SolveMode::Polynomial
            && !provider.moments().iter().all(RationalFunction::is_polynomial)
        {
            return Err(BootstrapError::input_validation(
                "INPUT.SOLVE_MODE",
                format!(
                    "{} moments are rational in the energy variable; use rational mode",
                    provider.name()
                ),
            ));
        }

        Ok(Self {
            provider,
            config,
            solver: Box::new(SturmSolver::new(config.root_precision)?),
            checkpoint: None,
        })
    }

    pub fn with_solver(mut self, solver: impl InequalitySolver + 'a) -> Self {
        self.solver = Box::new(solver);
        self
    }

    pub fn with_checkpoint(mut self, checkpoint: CheckpointStore) -> Self {
        self.checkpoint = Some(checkpoint);
        self
    }

    pub fn run(&self) -> BootstrapResult<RefinementOutcome> {
        let config = self.config;
        let mut history = Vec::with_capacity(config.round);
        let mut confirmed = Region::empty();
        let mut resumed_from = None;

        if let Some(checkpoint) = self
            .checkpoint
            .as_ref()
            .map(CheckpointStore::load)
            .transpose()?
            .flatten()
        {
            resumed_from = Some(checkpoint.history.len());
            history = checkpoint.history;
            confirmed = checkpoint.confirmed;
        }

        if history.len() >= config.round {
            info!(
                rounds = history.len(),
                target = config.round,
                "checkpoint already covers the requested rounds"
            );
            return Ok(RefinementOutcome {
                history,
                confirmed,
                rounds_computed: 0,
                resumed_from,
            });
        }

        let mut surviving = history
            .last()
            .cloned()
            .unwrap_or_else(|| config.initial_interval.clone());
        let first_round = history.len() + 1;
        info!(
            provider = self.provider.name(),
            key = %self.provider.checkpoint_key(),
            first_round,
            last_round = config.round,
            mode = %config.mode,
            intersection = %config.intersection,
            "starting refinement"
        );

        for order in first_round..=config.round {
            let started = Instant::now();
            let reference = match config.intersection {
                IntersectionMode::Chained => &surviving,
                IntersectionMode::Independent => &config.initial_interval,
            };
            let solution = match reference.hull() {
                Some(window) => self.solve_round_within(order, &window)?,
                None => self.solve_round(order)?,
            };
            surviving = refine_round(
                &solution.candidate,
                reference,
                &mut confirmed,
                config.threshold,
                config.remerge_confirmed,
            );
            history.push(surviving.clone());

            info!(
                round = order,
                degree = ?solution.determinant_degree,
                elapsed_ms = started.elapsed().as_millis() as u64,
                region = %surviving,
                confirmed = %confirmed,
                "finished round"
            );

            if let Some(checkpoint) = &self.checkpoint {
                if checkpoint.save_every_round() {
                    checkpoint.save(&history, &confirmed)?;
                }
            }
        }

        if let Some(checkpoint) = &self.checkpoint {
            checkpoint.save(&history, &confirmed)?;
        }
        self.log_confirmed_probes(&confirmed);

        Ok(RefinementOutcome {
            rounds_computed: config.round + 1 - first_round,
            history,
            confirmed,
            resumed_from,
        })
    }

    /// Determinant of the order-`order` submatrix solved for `det >= 0`.
    pub fn solve_round(&self, order: usize) -> BootstrapResult<RoundSolution> {
        self.solve_round_within(order, &Interval::real_line())
    }

    /// Like [`Self::solve_round`], with the candidate restricted to `window`.
    /// Roots far outside the window are never isolated.
    pub fn solve_round_within(
        &self,
        order: usize,
        window: &Interval,
    ) -> BootstrapResult<RoundSolution> {
        let matrix = self.provider.submatrix(order)?;
        let (determinant_degree, output) = match self.config.mode {
            SolveMode::Polynomial => {
                let determinant = matrix.determinant_polynomial()?;
                debug!(order, degree = ?determinant.degree(), "polynomial determinant");
                (
                    determinant.degree(),
                    self.solver.solve_polynomial_within(
                        &determinant,
                        Relation::NonNegative,
                        window,
                    )?,
                )
            }
            SolveMode::Rational => {
                let determinant = matrix.determinant_rational()?;
                debug!(
                    order,
                    numerator_degree = ?determinant.numerator().degree(),
                    denominator_degree = ?determinant.denominator().degree(),
                    "rational determinant"
                );
                (
                    determinant.numerator().degree(),
                    self.solver.solve_rational_within(
                        determinant.numerator(),
                        determinant.denominator(),
                        Relation::NonNegative,
                        window,
                    )?,
                )
            }
        };

        Ok(RoundSolution {
            order,
            determinant_degree,
            candidate: output.into_region(),
        })
    }

    fn log_confirmed_probes(&self, confirmed: &Region) {
        for energy in confirmed.iter().filter_map(|interval| interval.midpoint()) {
            match probe_positivity(self.provider, self.config.round, energy) {
                Ok(probe) => debug!(
                    energy,
                    smallest_minor = ?probe.smallest_minor(),
                    admissible = probe.is_admissible(1.0e-9),
                    "positivity probe at confirmed interval"
                ),
                Err(error) => debug!(energy, %error, "positivity probe failed"),
            }
        }
    }
}

/// Leading principal minors of the numeric moment matrix of order `order`
/// at `energy`. All of them are non-negative at a true eigenvalue.
pub fn probe_positivity(
    provider: &dyn MomentProvider,
    order: usize,
    energy: f64,
) -> BootstrapResult<PositivityProbe> {
    if order == 0 || order > provider.max_order() {
        return Err(BootstrapError::input_validation(
            "INPUT.SUBMATRIX_ORDER",
            format!(
                "positivity probe order {order} is outside 1..={}",
                provider.max_order()
            ),
        ));
    }
    Ok(numerics::probe_positivity(provider.moments(), order, energy)?)
}
