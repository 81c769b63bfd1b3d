/*!
Origin-destination flow estimation of a single transit line.

<script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
<script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>

Given boardings \\(B\\) and alightings \\(A\\) counted at each of \\(N\\) stops,
this crate estimates the unobserved flow matrix \\(X\\),
whose element \\(X_{ij}\\) is the flow boarding at stop \\(i\\) and alighting at stop \\(j\\).
Since passengers travel only downstream, \\(X_{ij} = 0\\) for \\(i \ge j\\).
Many matrices reproduce the same marginals, so two families of estimators are provided:

* [`Ipf`] - iterative proportional fitting, rescaling a seed matrix until its marginals match.
* [`ConvexEstimator`] - picks one point of the feasible region
  \\[
  \begin{array}{ll}
  \sum_j X_{ij} = B_i, \ \sum_i X_{ij} = A_j, \\\\
  X_{ij} = 0 \ (i \ge j), \ X_{ij} \ge 0
  \end{array}
  \\]
  by one of the objectives of [`ObjectiveKind`], solved by [`TotsuBackend`] or any other [`ConvexBackend`].

# General usage

1. Construct [`Marginals`] from observed counts.
1. For IPF, choose a seed such as [`FlowMatrix::upper_uniform`],
   create an [`Ipf`] instance and optionally set its parameters, then invoke [`Ipf::estimate`].
1. For the convex path, build [`LineConstraints`] with [`ConstraintBuilder::build`],
   create a [`ConvexEstimator`] with a backend, then invoke [`ConvexEstimator::estimate`].
1. Compare estimates against a known ground truth with [`relative_error`] or [`Comparison`].

# Examples

```
use float_eq::assert_float_eq;
use transit_od::prelude::*;
use transit_od::*;

//env_logger::init(); // Use any logger crate as `transit_od` uses `log` crate.

let marginals = Marginals::new(vec![5., 3., 0.], vec![0., 4., 4.]).unwrap();

// the only matrix reproducing them
let expected = [
    0., 4., 1.,
    0., 0., 3.,
    0., 0., 0.,
];

let ipf = Ipf::new().par(|p| {
    p.eps = 1e-9;
});
let rslt = ipf.estimate(&marginals, &FlowMatrix::upper_uniform(3, 1.)).unwrap();
assert_float_eq!(rslt.estimate.as_slice()[..], expected.as_ref(), abs_all <= 1e-3);

let constraints = ConstraintBuilder::new().build(&marginals).unwrap();
let estimator = ConvexEstimator::new(TotsuBackend::<FloatGeneric<f64>>::new());
let rslt = estimator.estimate(&constraints, ObjectiveKind::MinL2).unwrap();
assert_float_eq!(rslt.estimate.as_slice()[..], expected.as_ref(), abs_all <= 1e-3);
```
*/

mod flow;
mod marginals;
mod error;
mod objective;

pub use flow::*;
pub use marginals::*;
pub use error::*;
pub use objective::*;

//

mod ipf;
mod constraint;
mod convex;
mod backend;

pub use ipf::*;
pub use constraint::*;
pub use convex::*;
pub use backend::{ConvexParam, TotsuBackend};

//

mod evaluate;

pub use evaluate::*;

//

/// Prelude
pub mod prelude
{
    pub use totsu::prelude::FloatGeneric;
    pub use totsu_core::LinAlgEx;
}
