//! Feasible region shared by every convex objective

use num_traits::Float;
use core::fmt::{Debug, LowerExp};
use crate::error::{EstimationError, InputFault};
use crate::flow::FlowMatrix;
use crate::marginals::Marginals;

//

/// Where a linear constraint comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin
{
    /// Alightings at the stop.
    ColSum(usize),
    /// Boardings at the stop.
    RowSum(usize),
    /// No travel from the first stop to the second one, as it is not downstream.
    StructuralZero(usize, usize),
    /// Flow of the pair is nonnegative.
    Nonneg(usize, usize),
}

/// Sparse linear constraint \\(\sum_k c_k x_k \ \square \ r\\) over the flattened matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint<F: Float>
{
    /// Pairs of a variable index and its coefficient.
    pub terms: Vec<(usize, F)>,
    /// Right-hand side.
    pub rhs: F,
    /// What the constraint expresses.
    pub origin: Origin,
}

//

/// Feasible region of a single line.
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// Variables are the \\(N^2\\) elements of \\(X\\) in row-major order (see [`LineConstraints::var`]).
/// \\[
/// \begin{array}{ll}
/// \sum_i X_{ij} = {\rm alighting}\_j & \forall j \\\\
/// \sum_j X_{ij} = {\rm boarding}\_i & \forall i \\\\
/// X_{ij} = 0 & \forall i \ge j \\\\
/// -X_{ij} \le 0 & \forall i, j
/// \end{array}
/// \\]
#[derive(Debug, Clone, PartialEq)]
pub struct LineConstraints<F: Float>
{
    n: usize,
    total: F,
    equalities: Vec<LinearConstraint<F>>,
    inequalities: Vec<LinearConstraint<F>>,
}

impl<F: Float> LineConstraints<F>
{
    /// Number of stops.
    pub fn n(&self) -> usize
    {
        self.n
    }

    /// Number of scalar variables, \\(N^2\\).
    pub fn n_vars(&self) -> usize
    {
        self.n * self.n
    }

    /// Variable index of element \\((i, j)\\).
    pub fn var(&self, i: usize, j: usize) -> usize
    {
        assert!(i < self.n);
        assert!(j < self.n);
        i * self.n + j
    }

    /// Total flow on the line.
    pub fn total(&self) -> F
    {
        self.total
    }

    /// Equality constraints: column sums, row sums, then structural zeros.
    pub fn equalities(&self) -> &[LinearConstraint<F>]
    {
        &self.equalities
    }

    /// Inequality constraints \\(\le\\): nonnegativity of every element.
    pub fn inequalities(&self) -> &[LinearConstraint<F>]
    {
        &self.inequalities
    }

    /// Pairs \\((i, j)\\) with \\(i < j\\), i.e. every pair that can carry flow.
    pub fn free_pairs(&self) -> impl Iterator<Item=(usize, usize)>
    {
        let n = self.n;
        (0.. n).flat_map(move |i| (i + 1.. n).map(move |j| (i, j)))
    }

    /// Largest violation of the constraints by `x`.
    ///
    /// `x` shall have the same number of stops.
    pub fn violation(&self, x: &FlowMatrix<F>) -> F
    {
        assert_eq!(x.n(), self.n);

        let data = x.as_slice();
        let lhs = |c: &LinearConstraint<F>| {
            c.terms.iter().fold(F::zero(), |acc, &(k, coef)| acc + coef * data[k])
        };

        let eq = self.equalities.iter()
            .map(|c| (lhs(c) - c.rhs).abs());
        let ineq = self.inequalities.iter()
            .map(|c| (lhs(c) - c.rhs).max(F::zero()));

        eq.chain(ineq).fold(F::zero(), F::max)
    }
}

//

/// Constraint builder parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintParam<F: Float>
{
    /// Tolerance of the balance of totals, relative to the total flow (at least one).
    pub tol_balance: F,
    /// Rejects marginals which no strictly upper-triangular matrix can reproduce.
    /// If `false`, the solver is left to detect it.
    pub check_load: bool,
}

impl<F: Float> Default for ConstraintParam<F>
{
    fn default() -> Self
    {
        let ten = F::from(10).unwrap();

        ConstraintParam {
            tol_balance: ten.powi(-9),
            check_load: true,
        }
    }
}

/// Builder of [`LineConstraints`].
pub struct ConstraintBuilder<F: Float>
{
    /// Builder parameters.
    pub par: ConstraintParam<F>,
}

impl<F: Float> ConstraintBuilder<F>
{
    /// Creates an instance.
    ///
    /// Returns [`ConstraintBuilder`] instance with default parameters.
    pub fn new() -> Self
    {
        ConstraintBuilder {
            par: ConstraintParam::default(),
        }
    }

    /// Changes builder parameters.
    ///
    /// Returns [`ConstraintBuilder`] with its parameters changed.
    /// * `f` is a function to change parameters given by its argument.
    pub fn par<P>(mut self, f: P) -> Self
    where P: FnOnce(&mut ConstraintParam<F>)
    {
        f(&mut self.par);
        self
    }
}

impl<F: Float> Default for ConstraintBuilder<F>
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl<F: Float + Debug + LowerExp> ConstraintBuilder<F>
{
    /// Builds the feasible region.
    ///
    /// Returns `Ok` with [`LineConstraints`], or `Err` with [`EstimationError::InfeasibleInput`]
    /// if the totals are unbalanced or, with [`ConstraintParam::check_load`],
    /// if alightings at some stop exceed the passengers on board.
    pub fn build(&self, marginals: &Marginals<F>) -> Result<LineConstraints<F>, EstimationError<F>>
    {
        let n = marginals.n();
        let total = marginals.total();
        let tol = self.par.tol_balance * total.max(F::one());

        if marginals.imbalance() > tol {
            log::error!("unbalanced totals: difference {:.2e}", marginals.imbalance());
            return Err(InputFault::Unbalanced.into());
        }

        if self.par.check_load {
            let load = marginals.onboard_load();
            for (k, &a) in marginals.alighting().iter().enumerate() {
                let arriving = if k == 0 {F::zero()} else {load[k - 1]};
                if a > arriving + tol {
                    log::error!("stop {}: {:.2e} alightings, {:.2e} on board", k, a, arriving);
                    return Err(InputFault::NegativeLoad(k).into());
                }
            }
        }

        let one = F::one();
        let var = |i: usize, j: usize| i * n + j;

        let mut equalities = Vec::with_capacity(2 * n + n * (n + 1) / 2);

        for (j, &a) in marginals.alighting().iter().enumerate() {
            equalities.push(LinearConstraint {
                terms: (0.. n).map(|i| (var(i, j), one)).collect(),
                rhs: a,
                origin: Origin::ColSum(j),
            });
        }
        for (i, &b) in marginals.boarding().iter().enumerate() {
            equalities.push(LinearConstraint {
                terms: (0.. n).map(|j| (var(i, j), one)).collect(),
                rhs: b,
                origin: Origin::RowSum(i),
            });
        }
        for i in 0.. n {
            for j in 0..= i {
                equalities.push(LinearConstraint {
                    terms: vec![(var(i, j), one)],
                    rhs: F::zero(),
                    origin: Origin::StructuralZero(i, j),
                });
            }
        }

        let mut inequalities = Vec::with_capacity(n * n);

        for i in 0.. n {
            for j in 0.. n {
                inequalities.push(LinearConstraint {
                    terms: vec![(var(i, j), -one)],
                    rhs: F::zero(),
                    origin: Origin::Nonneg(i, j),
                });
            }
        }

        log::debug!("{} stops: {} equalities, {} inequalities", n, equalities.len(), inequalities.len());

        Ok(LineConstraints {
            n,
            total,
            equalities,
            inequalities,
        })
    }
}
