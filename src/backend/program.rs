//! Sparse conic program over the pairs which can carry flow

use num_traits::{Float, One, Zero};
use core::marker::PhantomData;
use core::fmt::{Debug, LowerExp};
use totsu::prelude::*;
use totsu::MatBuild;
use totsu_core::solver::{Cone, LinAlg, Operator, SliceLike};
use totsu_core::{ConeRPos, ConeSOC, ConeZero, LinAlgEx, splitm_mut};
use crate::constraint::{LineConstraints, LinearConstraint};

//

struct SpRow<F>
{
    terms: Vec<(usize, F)>,
    rhs: F,
}

/// Line program in the conic form of [`Solver`].
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// \\[
/// \begin{array}{ll}
/// {\rm minimize} & c^T z \\\\
/// {\rm subject \ to} & A z + s = b \\\\
/// & s \in \mathbb{R}\_+^{m_r} \times \mathcal{Q}^{m_q} \times \lbrace 0 \rbrace^{m_z},
/// \end{array}
/// \\]
/// where \\(z\\) starts with one variable per pair \\(i < j\\) in units of the total flow,
/// followed by auxiliary variables of each formulation.
/// Cells on or below the diagonal never become variables.
pub(super) struct LineProgram<L: LinAlgEx>
{
    n_pairs: usize,
    n_cols: usize,
    unit: L::F,
    vec_c: Vec<L::F>,
    rpos: Vec<SpRow<L::F>>,
    soc: Vec<SpRow<L::F>>,
    zero: Vec<SpRow<L::F>>,
}

impl<L: LinAlgEx> LineProgram<L>
{
    /// Translates `cons` onto the pair variables, followed by `n_aux` auxiliary variables.
    pub(super) fn new(cons: &LineConstraints<L::F>, n_aux: usize) -> Self
    {
        let f0 = L::F::zero();

        let mut col = vec![None; cons.n_vars()];
        let mut n_pairs = 0;
        for (i, j) in cons.free_pairs() {
            col[cons.var(i, j)] = Some(n_pairs);
            n_pairs += 1;
        }

        let unit = cons.total().max(L::F::one());

        // terms on eliminated cells vanish; so do the rows left as 0 = 0 or 0 <= 0
        let translate = |c: &LinearConstraint<L::F>| {
            let terms: Vec<(usize, L::F)> = c.terms.iter()
                .filter_map(|&(k, a)| col[k].map(|e| (e, a)))
                .collect();
            let rhs = c.rhs / unit;

            if terms.is_empty() && rhs == f0 {
                None
            }
            else {
                Some(SpRow {terms, rhs})
            }
        };

        let rpos: Vec<_> = cons.inequalities().iter().filter_map(&translate).collect();
        let zero: Vec<_> = cons.equalities().iter().filter_map(&translate).collect();

        log::debug!("{} pairs, {} inequalities, {} equalities", n_pairs, rpos.len(), zero.len());

        LineProgram {
            n_pairs,
            n_cols: n_pairs + n_aux,
            unit,
            vec_c: vec![f0; n_pairs + n_aux],
            rpos,
            soc: Vec::new(),
            zero,
        }
    }

    /// Number of pair variables, which lead \\(z\\).
    pub(super) fn n_pairs(&self) -> usize
    {
        self.n_pairs
    }

    /// Sets \\(c_k\\).
    pub(super) fn set_cost(&mut self, k: usize, c: L::F)
    {
        self.vec_c[k] = c;
    }

    /// Adds a row \\(a^T z \le h\\).
    pub(super) fn push_le(&mut self, terms: Vec<(usize, L::F)>, h: L::F)
    {
        self.rpos.push(SpRow {terms, rhs: h});
    }

    /// Adds an element \\(b - a^T z\\) to the second-order cone block.
    pub(super) fn push_soc(&mut self, terms: Vec<(usize, L::F)>, b: L::F)
    {
        self.soc.push(SpRow {terms, rhs: b});
    }

    /// Solves the program.
    ///
    /// Returns `Ok` with the flow of each pair in the order of [`LineConstraints::free_pairs`],
    /// or `Err` with [`SolverError`].
    pub(super) fn solve(self, s: Solver<L>) -> Result<Vec<L::F>, SolverError>
    where L::F: Float + Debug + LowerExp
    {
        let n = self.n_cols;
        let (m_r, m_q, m_z) = (self.rpos.len(), self.soc.len(), self.zero.len());
        let m = m_r + m_q + m_z;

        let rows: Vec<&SpRow<L::F>> = self.rpos.iter()
            .chain(self.soc.iter())
            .chain(self.zero.iter())
            .collect();

        let entries = rows.iter().enumerate()
            .flat_map(|(r, row)| row.terms.iter().map(move |&(c, a)| (r, c, a)))
            .collect();

        let vec_c = MatBuild::<L>::new(MatType::General(n, 1))
                    .by_fn(|r, _| self.vec_c[r]);
        let vec_b = MatBuild::<L>::new(MatType::General(m, 1))
                    .by_fn(|r, _| rows[r].rhs);
        let op_a = SpOp::<L>::new((m, n), entries);
        let cone = LineCone::<L>::new(m_r, m_q, m_z);

        let mut work = vec![L::F::zero(); Solver::<L>::query_worklen((m, n))];

        let rslt = s.solve((vec_c.as_op(), op_a, vec_b.as_op(), cone, work.as_mut_slice()))?;

        Ok(rslt.0[0.. self.n_pairs].iter().map(|&v| v * self.unit).collect())
    }
}

//

/// Sparse matrix operator of `(row, column, value)` entries, each position at most once.
pub(super) struct SpOp<L: LinAlg>
{
    ph_l: PhantomData<L>,
    size: (usize, usize),
    entries: Vec<(usize, usize, L::F)>,
}

impl<L: LinAlg> SpOp<L>
{
    pub(super) fn new(size: (usize, usize), entries: Vec<(usize, usize, L::F)>) -> Self
    {
        let (m, n) = size;
        assert!(entries.iter().all(|&(r, c, _)| r < m && c < n));

        SpOp {
            ph_l: PhantomData,
            size,
            entries,
        }
    }
}

impl<L: LinAlg> Operator<L> for SpOp<L>
{
    fn size(&self) -> (usize, usize)
    {
        self.size
    }

    fn op(&self, alpha: L::F, x: &L::Sl, beta: L::F, y: &mut L::Sl)
    {
        L::scale(beta, y);

        let x = x.get_ref();
        let y = y.get_mut();
        for &(r, c, a) in &self.entries {
            y[r] = y[r] + alpha * a * x[c];
        }
    }

    fn trans_op(&self, alpha: L::F, x: &L::Sl, beta: L::F, y: &mut L::Sl)
    {
        L::scale(beta, y);

        let x = x.get_ref();
        let y = y.get_mut();
        for &(r, c, a) in &self.entries {
            y[c] = y[c] + alpha * a * x[r];
        }
    }

    fn absadd_cols(&self, tau: &mut L::Sl)
    {
        let tau = tau.get_mut();
        for &(_, c, a) in &self.entries {
            tau[c] = tau[c] + a.abs();
        }
    }

    fn absadd_rows(&self, sigma: &mut L::Sl)
    {
        let sigma = sigma.get_mut();
        for &(r, _, a) in &self.entries {
            sigma[r] = sigma[r] + a.abs();
        }
    }
}

//

struct LineCone<L: LinAlg>
{
    m_r: usize,
    m_q: usize,
    m_z: usize,
    cone_rpos: ConeRPos<L>,
    cone_soc: ConeSOC<L>,
    cone_zero: ConeZero<L>,
}

impl<L: LinAlg> LineCone<L>
{
    fn new(m_r: usize, m_q: usize, m_z: usize) -> Self
    {
        LineCone {
            m_r, m_q, m_z,
            cone_rpos: ConeRPos::new(),
            cone_soc: ConeSOC::new(),
            cone_zero: ConeZero::new(),
        }
    }
}

impl<L: LinAlg> Cone<L> for LineCone<L>
{
    fn proj(&mut self, dual_cone: bool, x: &mut L::Sl) -> Result<(), ()>
    {
        let (m_r, m_q, m_z) = (self.m_r, self.m_q, self.m_z);
        splitm_mut!(x, (x_r; m_r), (x_q; m_q), (x_z; m_z));

        self.cone_rpos.proj(dual_cone, &mut x_r)?;
        self.cone_soc.proj(dual_cone, &mut x_q)?;
        self.cone_zero.proj(dual_cone, &mut x_z)?;
        Ok(())
    }

    fn product_group<G: Fn(&mut L::Sl) + Copy>(&self, dp_tau: &mut L::Sl, group: G)
    {
        let (m_r, m_q, m_z) = (self.m_r, self.m_q, self.m_z);
        splitm_mut!(dp_tau, (t_r; m_r), (t_q; m_q), (t_z; m_z));

        self.cone_rpos.product_group(&mut t_r, group);
        if m_q > 0 {
            self.cone_soc.product_group(&mut t_q, group);
        }
        self.cone_zero.product_group(&mut t_z, group);
    }
}

//

#[cfg(test)]
mod tests
{
    use super::*;

    type La = FloatGeneric<f64>;

    // dense reference of the sparse operator
    fn dense(op: &SpOp<La>) -> Vec<Vec<f64>>
    {
        let (m, n) = op.size();
        let mut d = vec![vec![0.; n]; m];
        for &(r, c, a) in &op.entries {
            d[r][c] += a;
        }
        d
    }

    #[test]
    fn test_spop()
    {
        let op = SpOp::<La>::new((3, 4), vec![
            (0, 0, 1.), (0, 3, -2.),
            (1, 1, 3.),
            (2, 0, -1.), (2, 2, 0.5), (2, 3, 4.),
        ]);
        let d = dense(&op);

        let x = [1., 2., 3., 4.];
        let mut y = [1., 1., 1.];
        op.op(2., &x, 0.5, &mut y);
        for r in 0.. 3 {
            let ref_y = 2. * (0.. 4).map(|c| d[r][c] * x[c]).sum::<f64>() + 0.5;
            assert!((y[r] - ref_y).abs() < 1e-12);
        }

        let w = [1., -1., 2.];
        let mut z = [0.; 4];
        op.trans_op(1., &w, 0., &mut z);
        for c in 0.. 4 {
            let ref_z = (0.. 3).map(|r| d[r][c] * w[r]).sum::<f64>();
            assert!((z[c] - ref_z).abs() < 1e-12);
        }

        let mut tau = [0.; 4];
        op.absadd_cols(&mut tau);
        assert_eq!(tau, [2., 3., 0.5, 6.]);

        let mut sigma = [1.; 3];
        op.absadd_rows(&mut sigma);
        assert_eq!(sigma, [4., 4., 6.5]);
    }
}
