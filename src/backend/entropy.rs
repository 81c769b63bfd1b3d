use num_traits::{Float, One, Zero};
use core::fmt::{Debug, LowerExp};
use totsu::prelude::*;
use totsu_core::LinAlgEx;
use crate::constraint::LineConstraints;
use super::program::LineProgram;

//

// variables y (pairs, in units of the total flow), s (one per pair)
// minimize -1^T s
// subject to s + (ln y_q + 1) y <= y_q  for each tangent point y_q
//            the line constraints
//
// Each cut is a tangent plane of the concave -y ln y at y_q,
// so their minimum approximates the entropy from above.
// With the total fixed, scaling x to y shifts the entropy by a constant only.
pub(super) fn solve<L>(s: Solver<L>, cons: &LineConstraints<L::F>, cuts: usize, span: L::F) -> Result<Vec<L::F>, SolverError>
where L: LinAlgEx, L::F: Float + Debug + LowerExp
{
    let f1 = L::F::one();

    let n_y = cons.free_pairs().count();
    let mut prog = LineProgram::<L>::new(cons, n_y);

    let points = tangent_points(f1, span, cuts);
    log::debug!("entropy: {} pairs, tangent points {:.2e}..{:.2e}", n_y, points[0], points[points.len() - 1]);

    for e in 0.. n_y {
        let s_e = n_y + e;
        prog.set_cost(s_e, -f1);

        for &y_q in &points {
            prog.push_le(vec![(s_e, f1), (e, y_q.ln() + f1)], y_q);
        }
    }

    prog.solve(s)
}

/// Geometric grid of `cuts` points (at least two) from `span * hi` to `hi`.
fn tangent_points<F: Float>(hi: F, span: F, cuts: usize) -> Vec<F>
{
    let cuts = cuts.max(2);
    let lo = hi * span;
    let ratio = (hi / lo).ln();
    let last = F::from(cuts - 1).unwrap_or_else(F::one);

    (0.. cuts).map(|q| {
        let t = F::from(q).unwrap_or_else(F::zero) / last;
        lo * (ratio * t).exp()
    }).collect()
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_tangent_points()
    {
        let p = tangent_points(100., 1e-4, 5);

        assert_eq!(p.len(), 5);
        assert!((p[0] - 1e-2).abs() < 1e-12);
        assert!((p[2] - 1.).abs() < 1e-12);
        assert!((p[4] - 100.).abs() < 1e-9);
    }
}
