use num_traits::Float;
use crate::error::InputFault;
use crate::flow::FlowMatrix;

//

/// Observed boarding and alighting counts per stop.
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// For a flow matrix \\(X\\),
/// \\[
/// {\rm boarding}\_i = \sum_j X_{ij}, \quad
/// {\rm alighting}\_j = \sum_i X_{ij}.
/// \\]
#[derive(Debug, Clone, PartialEq)]
pub struct Marginals<F: Float>
{
    boarding: Vec<F>,
    alighting: Vec<F>,
}

impl<F: Float> Marginals<F>
{
    /// Creates an instance.
    ///
    /// Returns the [`Marginals`] instance, or `Err` with [`InputFault`]
    /// if the lengths differ, fewer than two stops are given or any count is negative or non-finite.
    /// Balance of the totals is not checked here; see [`Marginals::imbalance`].
    pub fn new(boarding: Vec<F>, alighting: Vec<F>) -> Result<Self, InputFault>
    {
        let n = boarding.len();

        if n < 2 {
            return Err(InputFault::TooFewStops(n));
        }
        if alighting.len() != n {
            return Err(InputFault::LengthMismatch {expected: n, found: alighting.len()});
        }
        for i in 0.. n {
            if !Self::valid_count(boarding[i]) || !Self::valid_count(alighting[i]) {
                return Err(InputFault::InvalidValue(i));
            }
        }

        Ok(Marginals {boarding, alighting})
    }

    /// Marginals observed from a flow matrix.
    pub fn from_flow(x: &FlowMatrix<F>) -> Self
    {
        Marginals {
            boarding: x.row_sums(),
            alighting: x.col_sums(),
        }
    }

    /// Number of stops.
    pub fn n(&self) -> usize
    {
        self.boarding.len()
    }

    /// Boardings per stop.
    pub fn boarding(&self) -> &[F]
    {
        &self.boarding
    }

    /// Alightings per stop.
    pub fn alighting(&self) -> &[F]
    {
        &self.alighting
    }

    /// Total boardings.
    pub fn total(&self) -> F
    {
        Self::sum(&self.boarding)
    }

    /// Absolute difference between total boardings and total alightings.
    pub fn imbalance(&self) -> F
    {
        (Self::sum(&self.boarding) - Self::sum(&self.alighting)).abs()
    }

    /// Onboard load profile.
    ///
    /// Element \\(k\\) is the number of passengers on board when leaving stop \\(k\\),
    /// \\(\sum_{i \le k} {\rm boarding}\_i - \sum_{j \le k} {\rm alighting}\_j\\).
    pub fn onboard_load(&self) -> Vec<F>
    {
        let mut load = F::zero();

        self.boarding.iter().zip(&self.alighting)
            .map(|(&b, &a)| {
                load = load + b - a;
                load
            })
            .collect()
    }

    /// Largest absolute deviation of the marginals of `x` from these marginals.
    ///
    /// `x` shall have the same number of stops.
    pub fn residual(&self, x: &FlowMatrix<F>) -> F
    {
        assert_eq!(x.n(), self.n());

        let rows = x.row_sums();
        let cols = x.col_sums();

        rows.iter().zip(&self.boarding)
            .chain(cols.iter().zip(&self.alighting))
            .map(|(&v, &t)| (v - t).abs())
            .fold(F::zero(), F::max)
    }

    fn valid_count(v: F) -> bool
    {
        v.is_finite() && v >= F::zero()
    }

    fn sum(v: &[F]) -> F
    {
        v.iter().fold(F::zero(), |acc, &x| acc + x)
    }
}

//

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_new_faults()
    {
        assert_eq!(Marginals::new(vec![1.], vec![1.]), Err(InputFault::TooFewStops(1)));
        assert_eq!(
            Marginals::new(vec![1., 0.], vec![0., 1., 0.]),
            Err(InputFault::LengthMismatch {expected: 2, found: 3})
        );
        assert_eq!(Marginals::new(vec![1., -1.], vec![0., 0.]), Err(InputFault::InvalidValue(1)));
        assert_eq!(Marginals::new(vec![f64::NAN, 0.], vec![0., 0.]), Err(InputFault::InvalidValue(0)));
    }

    #[test]
    fn test_load()
    {
        let m = Marginals::new(vec![5., 3., 0.], vec![0., 4., 4.]).unwrap();

        assert_eq!(m.onboard_load(), vec![5., 4., 0.]);
        assert_eq!(m.imbalance(), 0.);
        assert_eq!(m.total(), 8.);
    }
}
