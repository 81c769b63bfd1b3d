use num_traits::Float;
use crate::flow::FlowMatrix;

//

/// Criterion selecting one point of the feasible region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectiveKind
{
    /// Minimizes \\(\sum_{ij} |X_{ij}|\\), also known as compressed sensing.
    MinL1,
    /// Maximizes \\(\sum_{ij} -X_{ij} \ln X_{ij}\\).
    MaxEntropy,
    /// Minimizes \\(\\|X\\|_2\\) of the flattened matrix.
    MinL2,
    /// Minimizes \\(\max_{ij} |X_{ij}|\\).
    MinLInf,
}

impl ObjectiveKind
{
    /// All objectives in a fixed order.
    pub const ALL: [ObjectiveKind; 4] = [
        ObjectiveKind::MinL1,
        ObjectiveKind::MaxEntropy,
        ObjectiveKind::MinL2,
        ObjectiveKind::MinLInf,
    ];

    /// Value of the objective at `x`.
    ///
    /// The entropy sums over positive elements only.
    pub fn evaluate<F: Float>(&self, x: &FlowMatrix<F>) -> F
    {
        let v = x.as_slice().iter();
        let f0 = F::zero();

        match self {
            ObjectiveKind::MinL1 => v.fold(f0, |acc, &e| acc + e.abs()),
            ObjectiveKind::MaxEntropy => v.filter(|&&e| e > f0).fold(f0, |acc, &e| acc - e * e.ln()),
            ObjectiveKind::MinL2 => v.fold(f0, |acc, &e| acc + e * e).sqrt(),
            ObjectiveKind::MinLInf => v.fold(f0, |acc, &e| acc.max(e.abs())),
        }
    }
}

impl core::fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", match &self {
            ObjectiveKind::MinL1      => "min-l1",
            ObjectiveKind::MaxEntropy => "max-entropy",
            ObjectiveKind::MinL2      => "min-l2",
            ObjectiveKind::MinLInf    => "min-linf",
        })
    }
}

impl core::str::FromStr for ObjectiveKind
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        ObjectiveKind::ALL.iter()
            .find(|k| k.to_string().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("unknown objective: {}", s))
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_parse()
    {
        for k in ObjectiveKind::ALL {
            assert_eq!(k.to_string().parse::<ObjectiveKind>(), Ok(k));
        }
        assert_eq!(" MAX-Entropy ".parse::<ObjectiveKind>(), Ok(ObjectiveKind::MaxEntropy));
        assert!("min-l3".parse::<ObjectiveKind>().is_err());
    }

    #[test]
    fn test_evaluate()
    {
        let x = FlowMatrix::from_rows(&[
            [0., 3., 4.],
            [0., 0., 1.],
            [0., 0., 0.],
        ]).unwrap();

        assert_eq!(ObjectiveKind::MinL1.evaluate(&x), 8.);
        assert_eq!(ObjectiveKind::MinL2.evaluate(&x), 26_f64.sqrt());
        assert_eq!(ObjectiveKind::MinLInf.evaluate(&x), 4.);

        let h = -(3_f64 * 3_f64.ln() + 4. * 4_f64.ln());
        assert!((ObjectiveKind::MaxEntropy.evaluate(&x) - h).abs() < 1e-12);
    }
}
