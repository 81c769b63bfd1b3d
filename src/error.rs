use num_traits::Float;
use crate::objective::ObjectiveKind;

//

/// Reasons why marginals are rejected before any estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputFault
{
    /// Fewer than two stops.
    TooFewStops(usize),
    /// A vector or matrix does not match the number of stops.
    LengthMismatch {
        /// Expected number of stops.
        expected: usize,
        /// Given length.
        found: usize,
    },
    /// Negative or non-finite count at the stop.
    InvalidValue(usize),
    /// Total boardings differ from total alightings.
    Unbalanced,
    /// Alightings at the stop exceed the passengers on board when arriving there.
    NegativeLoad(usize),
}

impl core::fmt::Display for InputFault {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self {
            InputFault::TooFewStops(n)    => write!(f, "TooFewStops: {} stops given, at least 2 required", n),
            InputFault::LengthMismatch {expected, found}
                                          => write!(f, "LengthMismatch: length {} given, {} expected", found, expected),
            InputFault::InvalidValue(i)   => write!(f, "InvalidValue: negative or non-finite count at stop {}", i),
            InputFault::Unbalanced        => write!(f, "Unbalanced: total boardings differ from total alightings"),
            InputFault::NegativeLoad(i)   => write!(f, "NegativeLoad: alightings at stop {} exceed passengers on board", i),
        }
    }
}

//

/// Terminal status of a convex solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus
{
    /// Optimal solution found.
    Optimal,
    /// Found an infeasibility certificate.
    Infeasible,
    /// Found an unboundedness certificate.
    Unbounded,
    /// Any other failure of the solver, e.g. iteration limit.
    Error,
}

impl core::fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", match &self {
            SolveStatus::Optimal    => "optimal",
            SolveStatus::Infeasible => "infeasible",
            SolveStatus::Unbounded  => "unbounded",
            SolveStatus::Error      => "error",
        })
    }
}

//

/// Estimation errors.
#[derive(Debug, Clone, PartialEq)]
pub enum EstimationError<F: Float>
{
    /// Marginals or seed cannot describe a single line.
    InfeasibleInput(InputFault),
    /// IPF reached its iteration cap without satisfying the drift threshold.
    Convergence {
        /// Passes performed.
        iterations: usize,
        /// Drift of the last pass.
        delta: F,
        /// Row factors of the last pass.
        row_factors: Vec<F>,
        /// Column factors of the last pass.
        col_factors: Vec<F>,
    },
    /// The solver terminated with a non-optimal status.
    EstimationFailure {
        /// Objective being solved.
        objective: ObjectiveKind,
        /// Raw status reported by the solver.
        status: SolveStatus,
    },
}

impl<F: Float + core::fmt::LowerExp> core::fmt::Display for EstimationError<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self {
            EstimationError::InfeasibleInput(fault) =>
                write!(f, "InfeasibleInput: {}", fault),
            EstimationError::Convergence {iterations, delta, ..} =>
                write!(f, "Convergence: drift {:.2e} after {} iterations", delta, iterations),
            EstimationError::EstimationFailure {objective, status} =>
                write!(f, "EstimationFailure: {} terminated as {}", objective, status),
        }
    }
}

impl<F: Float + core::fmt::Debug + core::fmt::LowerExp> std::error::Error for EstimationError<F> {}

impl<F: Float> From<InputFault> for EstimationError<F>
{
    fn from(fault: InputFault) -> Self
    {
        EstimationError::InfeasibleInput(fault)
    }
}
