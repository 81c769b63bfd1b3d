//! Convex estimator dispatching objectives to a solver backend

use num_traits::Float;
use core::fmt::{Debug, LowerExp};
use crate::constraint::LineConstraints;
use crate::error::{EstimationError, SolveStatus};
use crate::flow::FlowMatrix;
use crate::objective::ObjectiveKind;

//

/// Problem handed to a [`ConvexBackend`].
#[derive(Debug, Clone, Copy)]
pub struct ConvexProgram<'a, F: Float>
{
    /// Feasible region.
    pub constraints: &'a LineConstraints<F>,
    /// Criterion to optimize over the region.
    pub objective: ObjectiveKind,
}

/// Optimal point reported by a [`ConvexBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<F: Float>
{
    /// Optimal flow matrix.
    pub matrix: FlowMatrix<F>,
    /// Objective value at `matrix`, in the sense of the objective (maximized for entropy).
    pub objective_value: F,
}

/// Convex solver backend.
///
/// Solves a [`ConvexProgram`] to optimality.
/// Only [`SolveStatus::Optimal`] shall carry a [`Solution`].
pub trait ConvexBackend<F: Float>
{
    /// Solves the program.
    ///
    /// Returns a tuple of the terminal status and the solution if optimal.
    fn solve(&self, program: &ConvexProgram<'_, F>) -> (SolveStatus, Option<Solution<F>>);
}

//

/// Result of [`ConvexEstimator::estimate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexResult<F: Float>
{
    /// Estimated flow matrix.
    pub estimate: FlowMatrix<F>,
    /// Objective used.
    pub objective: ObjectiveKind,
    /// Objective value at `estimate`.
    pub objective_value: F,
    /// Largest constraint violation of `estimate`.
    pub violation: F,
}

/// Convex estimator.
///
/// Selects a point of the feasible region given by [`LineConstraints`] according to an [`ObjectiveKind`].
/// Numerical optimization is entirely delegated to the backend.
pub struct ConvexEstimator<B>
{
    backend: B,
}

impl<B> ConvexEstimator<B>
{
    /// Creates an instance.
    ///
    /// * `backend` is a solver backend such as [`crate::TotsuBackend`].
    pub fn new(backend: B) -> Self
    {
        ConvexEstimator {
            backend,
        }
    }

    /// Estimates a flow matrix.
    ///
    /// Returns `Ok` with [`ConvexResult`], or `Err` with [`EstimationError::EstimationFailure`]
    /// if the backend terminates with a non-optimal status.
    /// Elements on or below the diagonal and negative round-off are set to exactly zero.
    pub fn estimate<F>(&self, constraints: &LineConstraints<F>, objective: ObjectiveKind) -> Result<ConvexResult<F>, EstimationError<F>>
    where F: Float + Debug + LowerExp, B: ConvexBackend<F>
    {
        log::info!("----- {} started: {} stops", objective, constraints.n());

        let program = ConvexProgram {
            constraints,
            objective,
        };

        let failure = |status: SolveStatus| -> Result<ConvexResult<F>, EstimationError<F>> {
            log::warn!("----- {} failed: {}", objective, status);
            Err(EstimationError::EstimationFailure {objective, status})
        };

        match self.backend.solve(&program) {
            (SolveStatus::Optimal, Some(sol)) => {
                if sol.matrix.n() != constraints.n() {
                    log::error!("backend returned {} stops for {} stops", sol.matrix.n(), constraints.n());
                    return failure(SolveStatus::Error);
                }

                let mut estimate = sol.matrix;
                estimate.set_structural_zeros();
                let f0 = F::zero();
                estimate.set_map(|v| v.max(f0));

                let objective_value = objective.evaluate(&estimate);
                let violation = constraints.violation(&estimate);

                log::debug!("backend objective {:.3e}", sol.objective_value);
                log::info!("----- {} optimal: objective {:.3e}, violation {:.2e}", objective, objective_value, violation);

                Ok(ConvexResult {
                    estimate,
                    objective,
                    objective_value,
                    violation,
                })
            },
            (SolveStatus::Optimal, None) => {
                log::error!("backend reported optimal without a solution");
                failure(SolveStatus::Error)
            },
            (status, _) => failure(status),
        }
    }

    /// Estimates flow matrices for every objective in [`ObjectiveKind::ALL`].
    pub fn estimate_all<F>(&self, constraints: &LineConstraints<F>) -> Vec<(ObjectiveKind, Result<ConvexResult<F>, EstimationError<F>>)>
    where F: Float + Debug + LowerExp, B: ConvexBackend<F>
    {
        ObjectiveKind::ALL.iter()
            .map(|&k| (k, self.estimate(constraints, k)))
            .collect()
    }
}
