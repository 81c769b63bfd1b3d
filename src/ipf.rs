//! Iterative proportional fitting

use num_traits::Float;
use core::fmt::{Debug, LowerExp};
use crate::error::{EstimationError, InputFault};
use crate::flow::FlowMatrix;
use crate::marginals::Marginals;

//

/// Drift measure between two consecutive passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Drift
{
    /// \\(|{\rm mean}(a' - a) + {\rm mean}(b' - b)|\\).
    ///
    /// Row and column changes of opposite signs may cancel each other.
    SignedMeanSum,
    /// \\(\max(\\|a' - a\\|\_\infty, \\|b' - b\\|\_\infty)\\).
    MaxAbs,
}

impl Drift
{
    fn measure<F: Float>(&self, a_new: &[F], a: &[F], b_new: &[F], b: &[F]) -> F
    {
        match self {
            Drift::SignedMeanSum => {
                (mean_diff(a_new, a) + mean_diff(b_new, b)).abs()
            },
            Drift::MaxAbs => {
                max_abs_diff(a_new, a).max(max_abs_diff(b_new, b))
            },
        }
    }
}

fn mean_diff<F: Float>(x: &[F], y: &[F]) -> F
{
    let sum = x.iter().zip(y).fold(F::zero(), |acc, (&p, &q)| acc + (p - q));
    match F::from(x.len()) {
        Some(len) if x.len() > 0 => sum / len,
        _ => F::zero(),
    }
}

fn max_abs_diff<F: Float>(x: &[F], y: &[F]) -> F
{
    x.iter().zip(y).fold(F::zero(), |acc, (&p, &q)| acc.max((p - q).abs()))
}

//

/// IPF parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct IpfParam<F: Float>
{
    /// Drift threshold to stop at.
    pub eps: F,
    /// Max number of passes.
    pub max_iter: usize,
    /// Drift measure compared with `eps`.
    pub drift: Drift,
    /// Lower clamp of every computed factor. `None` means classical IPF.
    ///
    /// Factors below the floor would shrink small seed elements even further;
    /// the default floor of one biases the estimate upward.
    pub factor_floor: Option<F>,
    /// Tolerance of the balance of totals, relative to the total flow (at least one).
    pub tol_balance: F,
    /// Period of passes to output progress log(for debug level).
    pub log_period: usize,
}

impl<F: Float> Default for IpfParam<F>
{
    fn default() -> Self
    {
        let ten = F::from(10).unwrap();

        IpfParam {
            eps: ten.powi(-3),
            max_iter: 10_000,
            drift: Drift::SignedMeanSum,
            factor_floor: Some(F::one()),
            tol_balance: ten.powi(-9),
            log_period: 100,
        }
    }
}

//

/// Result of [`Ipf::estimate`].
#[derive(Debug, Clone, PartialEq)]
pub struct IpfResult<F: Float>
{
    /// Estimated flow matrix.
    pub estimate: FlowMatrix<F>,
    /// Final row factors \\(a\\).
    pub row_factors: Vec<F>,
    /// Final column factors \\(b\\).
    pub col_factors: Vec<F>,
    /// Passes performed after the initial one.
    pub iterations: usize,
    /// Drift of the last pass.
    pub delta: F,
    /// Largest absolute deviation of the estimate's marginals from the target.
    ///
    /// Non-negligible when the seed structure cannot reproduce the marginals.
    pub residual: F,
}

//

/// IPF estimator.
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// Rescales a seed \\(S\\) into \\(X_{ij} = a_i b_j S_{ij}\\) so that the marginals of \\(X\\)
/// approach the target boardings \\(B\\) and alightings \\(A\\):
/// \\[
/// a_i \leftarrow { B_i \over \sum_j S_{ij} b_j }, \quad
/// b_j \leftarrow { A_j \over \sum_i a_i S_{ij} },
/// \\]
/// starting from \\(b = \mathbb{1}\\).
/// Each new factor which is not finite (no information in the seed) becomes zero,
/// and each finite one below [`IpfParam::factor_floor`] is raised to the floor.
pub struct Ipf<F: Float>
{
    /// IPF parameters.
    pub par: IpfParam<F>,
}

impl<F: Float> Ipf<F>
{
    /// Creates an instance.
    ///
    /// Returns [`Ipf`] instance with default parameters.
    pub fn new() -> Self
    {
        Ipf {
            par: IpfParam::default(),
        }
    }

    /// Changes IPF parameters.
    ///
    /// Returns [`Ipf`] with its parameters changed.
    /// * `f` is a function to change parameters given by its argument.
    pub fn par<P>(mut self, f: P) -> Self
    where P: FnOnce(&mut IpfParam<F>)
    {
        f(&mut self.par);
        self
    }
}

impl<F: Float> Default for Ipf<F>
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl<F: Float + Debug + LowerExp> Ipf<F>
{
    /// Estimates a flow matrix.
    ///
    /// Returns `Ok` with [`IpfResult`], or `Err` with
    /// [`EstimationError::InfeasibleInput`] if the seed has another number of stops or a negative or non-finite element,
    /// or if total boardings and alightings differ beyond [`IpfParam::tol_balance`], or
    /// [`EstimationError::Convergence`] if [`IpfParam::max_iter`] passes are not enough.
    /// * `marginals` are the target boardings and alightings.
    /// * `seed` is the prior \\(S\\), nonnegative, of the same number of stops.
    pub fn estimate(&self, marginals: &Marginals<F>, seed: &FlowMatrix<F>) -> Result<IpfResult<F>, EstimationError<F>>
    {
        let n = marginals.n();

        if seed.n() != n {
            log::error!("seed of {} stops for marginals of {} stops", seed.n(), n);
            return Err(InputFault::LengthMismatch {expected: n, found: seed.n()}.into());
        }
        for r in 0.. n {
            for c in 0.. n {
                let v = seed[(r, c)];
                if !v.is_finite() || v < F::zero() {
                    log::error!("seed ({}, {}) is {:.2e}", r, c, v);
                    return Err(InputFault::InvalidValue(r).into());
                }
            }
        }

        let tol = self.par.tol_balance * marginals.total().max(F::one());
        if marginals.imbalance() > tol {
            log::error!("imbalance {:.2e} exceeds {:.2e}", marginals.imbalance(), tol);
            return Err(InputFault::Unbalanced.into());
        }

        log::info!("----- IPF started: {} stops", n);
        log::debug!("{:?}", self.par);

        let floor = self.par.factor_floor;
        let boarding = marginals.boarding();
        let alighting = marginals.alighting();

        let ones = vec![F::one(); n];
        let mut a = row_factors(boarding, seed, &ones, floor);
        let mut b = col_factors(alighting, seed, &a, floor);

        let mut delta = F::infinity();

        for i in 1..= self.par.max_iter {
            let a_new = row_factors(boarding, seed, &b, floor);
            let b_new = col_factors(alighting, seed, &a_new, floor);

            delta = self.par.drift.measure(&a_new, &a, &b_new, &b);
            a = a_new;
            b = b_new;

            if self.par.log_period > 0 && i % self.par.log_period == 0 {
                log::debug!("{}: drift {:.2e}", i, delta);
            }
            log::trace!("{}: a {:?}", i, a);
            log::trace!("{}: b {:?}", i, b);

            if delta <= self.par.eps {
                let estimate = scaled(seed, &a, &b);
                let residual = marginals.residual(&estimate);

                log::info!("----- IPF converged: {} iterations, drift {:.2e}, residual {:.2e}", i, delta, residual);

                return Ok(IpfResult {
                    estimate,
                    row_factors: a,
                    col_factors: b,
                    iterations: i,
                    delta,
                    residual,
                });
            }
        }

        log::warn!("----- IPF exceeded {} iterations: drift {:.2e}", self.par.max_iter, delta);

        Err(EstimationError::Convergence {
            iterations: self.par.max_iter,
            delta,
            row_factors: a,
            col_factors: b,
        })
    }
}

//

fn clean<F: Float>(v: F, floor: Option<F>) -> F
{
    if !v.is_finite() {
        F::zero()
    }
    else {
        match floor {
            Some(fl) if v < fl => fl,
            _ => v,
        }
    }
}

fn row_factors<F: Float>(boarding: &[F], seed: &FlowMatrix<F>, b: &[F], floor: Option<F>) -> Vec<F>
{
    let n = boarding.len();

    (0.. n).map(|r| {
        let den = (0.. n).fold(F::zero(), |acc, c| acc + seed[(r, c)] * b[c]);
        clean(boarding[r] / den, floor)
    }).collect()
}

fn col_factors<F: Float>(alighting: &[F], seed: &FlowMatrix<F>, a: &[F], floor: Option<F>) -> Vec<F>
{
    let n = alighting.len();

    (0.. n).map(|c| {
        let den = (0.. n).fold(F::zero(), |acc, r| acc + a[r] * seed[(r, c)]);
        clean(alighting[c] / den, floor)
    }).collect()
}

fn scaled<F: Float>(seed: &FlowMatrix<F>, a: &[F], b: &[F]) -> FlowMatrix<F>
{
    FlowMatrix::new(seed.n()).by_fn(|r, c| a[r] * b[c] * seed[(r, c)])
}

//

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_clean()
    {
        assert_eq!(clean(f64::NAN, Some(1.)), 0.);
        assert_eq!(clean(f64::INFINITY, Some(1.)), 0.);
        assert_eq!(clean(0.25, Some(1.)), 1.);
        assert_eq!(clean(0., Some(1.)), 1.);
        assert_eq!(clean(0.25, None), 0.25);
        assert_eq!(clean(2.5, Some(1.)), 2.5);
    }

    #[test]
    fn test_drift_cancel()
    {
        let a = [1., 1.];
        let a_new = [2., 1.];
        let b = [1., 1.];
        let b_new = [0., 1.];

        assert_eq!(Drift::SignedMeanSum.measure(&a_new, &a, &b_new, &b), 0.);
        assert_eq!(Drift::MaxAbs.measure(&a_new, &a, &b_new, &b), 1.);
    }

    #[test]
    fn test_first_factors()
    {
        let seed = FlowMatrix::upper_uniform(3, 1.);

        let a = row_factors(&[5., 3., 0.], &seed, &[1., 1., 1.], Some(1.));
        assert_eq!(a, vec![2.5, 3., 0.]);

        let b = col_factors(&[0., 4., 4.], &seed, &a, Some(1.));
        assert_eq!(b, vec![0., 1.6, 1.]);
    }
}
