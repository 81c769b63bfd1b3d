use std::ops::{Index, IndexMut};
use num_traits::Float;

//

/// Origin-destination flow matrix of a single line.
///
/// Dense square matrix in row-major order.
/// Element \\((i, j)\\) is the flow boarding at stop \\(i\\) and alighting at stop \\(j\\),
/// stops being numbered in travel order.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowMatrix<F: Float>
{
    n: usize,
    array: Vec<F>,
}

impl<F: Float> FlowMatrix<F>
{
    /// Creates an instance.
    ///
    /// Returns the [`FlowMatrix`] instance with zero data.
    /// * `n` is a number of stops.
    pub fn new(n: usize) -> Self
    {
        FlowMatrix {
            n,
            array: vec![F::zero(); n * n],
        }
    }

    /// Creates an instance from rows.
    ///
    /// Returns `None` if `rows` is not square.
    pub fn from_rows<R: AsRef<[F]>>(rows: &[R]) -> Option<Self>
    {
        let n = rows.len();
        let mut array = Vec::with_capacity(n * n);

        for row in rows {
            let row = row.as_ref();
            if row.len() != n {
                return None;
            }
            array.extend_from_slice(row);
        }

        Some(FlowMatrix {n, array})
    }

    /// Uniform seed over the strictly upper triangle.
    ///
    /// Every pair a passenger can actually travel gets `value`, every other element is zero.
    pub fn upper_uniform(n: usize, value: F) -> Self
    {
        Self::new(n).by_fn(|r, c| {
            if r < c {value} else {F::zero()}
        })
    }

    /// Number of stops.
    pub fn n(&self) -> usize
    {
        self.n
    }

    /// Data by a function.
    ///
    /// * `func` takes a row and a column of the matrix and returns data of each element.
    pub fn set_by_fn<M>(&mut self, mut func: M)
    where M: FnMut(usize, usize) -> F
    {
        for r in 0.. self.n {
            for c in 0.. self.n {
                self[(r, c)] = func(r, c);
            }
        }
    }
    /// Builder pattern of [`FlowMatrix::set_by_fn`].
    pub fn by_fn<M>(mut self, func: M) -> Self
    where M: FnMut(usize, usize) -> F
    {
        self.set_by_fn(func);
        self
    }

    /// Data mapped element-wise by a function.
    pub fn set_map<M>(&mut self, mut func: M)
    where M: FnMut(F) -> F
    {
        for v in self.array.iter_mut() {
            *v = func(*v);
        }
    }

    /// Sums of each row, i.e. boardings per stop.
    pub fn row_sums(&self) -> Vec<F>
    {
        self.array.chunks(self.n.max(1))
            .take(self.n)
            .map(|row| row.iter().fold(F::zero(), |acc, &v| acc + v))
            .collect()
    }

    /// Sums of each column, i.e. alightings per stop.
    pub fn col_sums(&self) -> Vec<F>
    {
        let mut sums = vec![F::zero(); self.n];
        for r in 0.. self.n {
            for c in 0.. self.n {
                sums[c] = sums[c] + self[(r, c)];
            }
        }
        sums
    }

    /// Sum of all elements.
    pub fn total(&self) -> F
    {
        self.array.iter().fold(F::zero(), |acc, &v| acc + v)
    }

    /// Smallest element, or zero for an empty matrix.
    pub fn min_entry(&self) -> F
    {
        self.array.iter().copied().reduce(F::min).unwrap_or_else(F::zero)
    }

    /// Largest element, or zero for an empty matrix.
    pub fn max_entry(&self) -> F
    {
        self.array.iter().copied().reduce(F::max).unwrap_or_else(F::zero)
    }

    /// Checks the single-line structure.
    ///
    /// Returns `true` if every element on or below the diagonal is within `tol` of zero
    /// and no element is below `-tol`.
    pub fn is_structurally_valid(&self, tol: F) -> bool
    {
        for r in 0.. self.n {
            for c in 0.. self.n {
                let v = self[(r, c)];
                if v < -tol || (r >= c && v.abs() > tol) {
                    return false;
                }
            }
        }
        true
    }

    /// Forces every element on or below the diagonal to exactly zero.
    pub fn set_structural_zeros(&mut self)
    {
        for r in 0.. self.n {
            for c in 0..= r {
                self[(r, c)] = F::zero();
            }
        }
    }

    /// Row-major data.
    pub fn as_slice(&self) -> &[F]
    {
        &self.array
    }

    fn index(&self, (r, c): (usize, usize)) -> usize
    {
        assert!(r < self.n);
        assert!(c < self.n);
        r * self.n + c
    }
}

//

impl<F: Float> Index<(usize, usize)> for FlowMatrix<F>
{
    type Output = F;
    fn index(&self, index: (usize, usize)) -> &Self::Output
    {
        let i = self.index(index);

        &self.array[i]
    }
}

impl<F: Float> IndexMut<(usize, usize)> for FlowMatrix<F>
{
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output
    {
        let i = self.index(index);

        &mut self.array[i]
    }
}

//

impl<F: Float + core::fmt::Display> core::fmt::Display for FlowMatrix<F>
{
    fn fmt(&self, f: &mut core::fmt::Formatter) -> Result<(), core::fmt::Error>
    {
        if self.n == 0 {
            return write!(f, "[ ]");
        }

        for r in 0.. self.n {
            write!(f, "{}", if r == 0 {"[ "} else {"  "})?;
            for c in 0.. self.n {
                if c > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{:8.3}", self[(r, c)])?;
            }
            if r + 1 < self.n {
                writeln!(f)?;
            }
        }
        write!(f, " ]")
    }
}

//

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_sums()
    {
        let x = FlowMatrix::from_rows(&[
            [0., 2., 3.],
            [0., 0., 4.],
            [0., 0., 0.],
        ]).unwrap();

        assert_eq!(x.row_sums(), vec![5., 4., 0.]);
        assert_eq!(x.col_sums(), vec![0., 2., 7.]);
        assert_eq!(x.total(), 9.);
        assert!(x.is_structurally_valid(0.));
    }

    #[test]
    fn test_structure()
    {
        let mut x = FlowMatrix::<f64>::new(3).by_fn(|r, c| (r + c) as f64);
        assert!(!x.is_structurally_valid(1e-9));

        x.set_structural_zeros();
        assert!(x.is_structurally_valid(0.));
        assert_eq!(x[(0, 2)], 2.);
        assert_eq!(x[(2, 1)], 0.);
    }

    #[test]
    fn test_from_rows_not_square()
    {
        assert!(FlowMatrix::from_rows(&[vec![0., 1.], vec![0.]]).is_none());
    }
}
