use num_traits::{Float, One, Zero};
use core::fmt::{Debug, LowerExp};
use totsu::prelude::*;
use totsu_core::LinAlgEx;
use crate::constraint::LineConstraints;
use super::program::LineProgram;

//

// variables y (pairs), t
// minimize t
// subject to y - t <= 0
//            the line constraints
pub(super) fn solve<L>(s: Solver<L>, cons: &LineConstraints<L::F>) -> Result<Vec<L::F>, SolverError>
where L: LinAlgEx, L::F: Float + Debug + LowerExp
{
    let f0 = L::F::zero();
    let f1 = L::F::one();

    let mut prog = LineProgram::<L>::new(cons, 1);
    let n_y = prog.n_pairs();
    let t = n_y;

    prog.set_cost(t, f1);

    for e in 0.. n_y {
        prog.push_le(vec![(e, f1), (t, -f1)], f0);
    }

    prog.solve(s)
}
