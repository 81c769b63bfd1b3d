use num_traits::{Float, One};
use core::fmt::{Debug, LowerExp};
use totsu::prelude::*;
use totsu_core::LinAlgEx;
use crate::constraint::LineConstraints;
use super::program::LineProgram;

//

// minimize 1^T y
// subject to the line constraints
//
// |y| = y under the nonnegativity constraints.
pub(super) fn solve<L>(s: Solver<L>, cons: &LineConstraints<L::F>) -> Result<Vec<L::F>, SolverError>
where L: LinAlgEx, L::F: Float + Debug + LowerExp
{
    let mut prog = LineProgram::<L>::new(cons, 0);

    for e in 0.. prog.n_pairs() {
        prog.set_cost(e, L::F::one());
    }

    prog.solve(s)
}
