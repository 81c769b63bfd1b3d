//! Convex backend built on `totsu`

use std::marker::PhantomData;
use num_traits::Float;
use core::fmt::{Debug, LowerExp};
use totsu::prelude::*;
use totsu_core::LinAlgEx;
use crate::constraint::LineConstraints;
use crate::convex::{ConvexBackend, ConvexProgram, Solution};
use crate::error::SolveStatus;
use crate::flow::FlowMatrix;
use crate::objective::ObjectiveKind;

mod program;
mod l1;
mod entropy;
mod l2;
mod linf;

//

/// Backend parameters.
///
/// The solver ones are passed to [`totsu_core::solver::SolverParam`] as they are.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexParam<F: Float>
{
    /// Max iteration number of the solver. `None` means no upper limit.
    pub max_iter: Option<usize>,
    /// Tolerance of the primal residual, dual residual and duality gap.
    pub eps_acc: F,
    /// Tolerance of the unboundness and infeasibility.
    pub eps_inf: F,
    /// Tolerance of small positive value to avoid division by zero.
    pub eps_zero: F,
    /// Period of iterations to output progress log(for debug/trace level).
    pub log_period: usize,
    /// Number of tangent planes approximating the entropy of each element.
    pub entropy_cuts: usize,
    /// Smallest tangent point relative to the total flow, which shall be in \\((0, 1)\\).
    /// The largest one is the total flow itself.
    pub entropy_span: F,
}

impl<F: Float> Default for ConvexParam<F>
{
    fn default() -> Self
    {
        let ten = F::from(10).unwrap();

        ConvexParam {
            max_iter: Some(500_000),
            eps_acc: ten.powi(-6),
            eps_inf: ten.powi(-6),
            eps_zero: ten.powi(-12),
            log_period: 10_000,
            entropy_cuts: 16,
            entropy_span: ten.powi(-4),
        }
    }
}

//

/// [`ConvexBackend`] solving every objective with `totsu`.
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// Only the \\(N(N-1)/2\\) elements \\(X_{ij}, i < j\\) become variables,
/// scaled by the total flow, and the constraints are kept as a sparse operator.
///
/// | objective | formulation |
/// |-----------|-------------|
/// | [`ObjectiveKind::MinL1`] | LP, \\(\min \mathbb{1}^T x\\) |
/// | [`ObjectiveKind::MaxEntropy`] | LP over tangent planes of \\(-x \ln x\\) |
/// | [`ObjectiveKind::MinL2`] | SOCP, \\(\min t \ {\rm s.t.} \ \\|x\\|_2 \le t\\) |
/// | [`ObjectiveKind::MinLInf`] | LP, \\(\min t \ {\rm s.t.} \ x \le t\\) |
///
/// * `L` is a [`totsu_core::LinAlgEx`] implementation such as [`FloatGeneric`].
pub struct TotsuBackend<L: LinAlgEx>
{
    ph_l: PhantomData<L>,
    /// Backend parameters.
    pub par: ConvexParam<L::F>,
}

impl<L: LinAlgEx> TotsuBackend<L>
{
    /// Creates an instance.
    ///
    /// Returns [`TotsuBackend`] instance with default parameters.
    pub fn new() -> Self
    {
        TotsuBackend {
            ph_l: PhantomData,
            par: ConvexParam::default(),
        }
    }

    /// Changes backend parameters.
    ///
    /// Returns [`TotsuBackend`] with its parameters changed.
    /// * `f` is a function to change parameters given by its argument.
    pub fn par<P>(mut self, f: P) -> Self
    where P: FnOnce(&mut ConvexParam<L::F>)
    {
        f(&mut self.par);
        self
    }

    fn solver(&self) -> Solver<L>
    {
        Solver::new().par(|p| {
            p.max_iter = self.par.max_iter;
            p.eps_acc = self.par.eps_acc;
            p.eps_inf = self.par.eps_inf;
            p.eps_zero = self.par.eps_zero;
            p.log_period = self.par.log_period;
        })
    }
}

impl<L: LinAlgEx> Default for TotsuBackend<L>
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl<L: LinAlgEx> ConvexBackend<L::F> for TotsuBackend<L>
where L::F: Float + Debug + LowerExp
{
    fn solve(&self, program: &ConvexProgram<'_, L::F>) -> (SolveStatus, Option<Solution<L::F>>)
    {
        let cons = program.constraints;
        let s = self.solver();

        let rslt = match program.objective {
            ObjectiveKind::MinL1 => l1::solve(s, cons),
            ObjectiveKind::MaxEntropy => entropy::solve(s, cons, self.par.entropy_cuts, self.par.entropy_span),
            ObjectiveKind::MinL2 => l2::solve(s, cons),
            ObjectiveKind::MinLInf => linf::solve(s, cons),
        };

        match rslt {
            Ok(x) => {
                let matrix = grid_matrix(cons, &x);
                let objective_value = program.objective.evaluate(&matrix);

                (SolveStatus::Optimal, Some(Solution {matrix, objective_value}))
            },
            Err(e) => {
                log::warn!("{}: {}", program.objective, e);

                (status_of(e), None)
            },
        }
    }
}

//

fn status_of(e: SolverError) -> SolveStatus
{
    match e {
        SolverError::Infeasible => SolveStatus::Infeasible,
        SolverError::Unbounded => SolveStatus::Unbounded,
        _ => SolveStatus::Error,
    }
}

/// Places the pair flows, in the order of [`LineConstraints::free_pairs`], into a matrix.
fn grid_matrix<F: Float>(cons: &LineConstraints<F>, y: &[F]) -> FlowMatrix<F>
{
    let mut x = FlowMatrix::new(cons.n());

    for ((i, j), &v) in cons.free_pairs().zip(y) {
        x[(i, j)] = v;
    }

    x
}
