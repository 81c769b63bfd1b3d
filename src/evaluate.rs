//! Reconstruction error against a known ground truth

use num_traits::Float;
use crate::flow::FlowMatrix;

//

/// Summed absolute relative error \\(\sum |T - E| / \sum |T|\\).
///
/// Returns `None` if the sizes differ or the truth is all zero.
pub fn relative_error<F: Float>(truth: &FlowMatrix<F>, estimate: &FlowMatrix<F>) -> Option<F>
{
    if truth.n() != estimate.n() {
        return None;
    }

    let (num, den) = truth.as_slice().iter().zip(estimate.as_slice())
        .fold((F::zero(), F::zero()), |(num, den), (&t, &e)| {
            (num + (t - e).abs(), den + t.abs())
        });

    if den > F::zero() {
        Some(num / den)
    }
    else {
        None
    }
}

//

/// One row of a [`Comparison`] report.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry<F: Float>
{
    /// Estimator label.
    pub label: String,
    /// Relative error, or `None` if the estimator failed.
    pub error: Option<F>,
    /// Failure message of the estimator.
    pub note: Option<String>,
}

/// Comparison of several estimates against one ground truth.
#[derive(Debug, Clone)]
pub struct Comparison<F: Float>
{
    truth: FlowMatrix<F>,
    entries: Vec<Entry<F>>,
}

impl<F: Float> Comparison<F>
{
    /// Creates an instance.
    pub fn new(truth: FlowMatrix<F>) -> Self
    {
        Comparison {
            truth,
            entries: Vec::new(),
        }
    }

    /// Adds the outcome of an estimator.
    ///
    /// * `label` names the estimator.
    /// * `outcome` is its estimate, or an error to be reported as it is.
    pub fn add<E: core::fmt::Display>(&mut self, label: &str, outcome: Result<&FlowMatrix<F>, E>)
    {
        let entry = match outcome {
            Ok(estimate) => Entry {
                label: label.to_string(),
                error: relative_error(&self.truth, estimate),
                note: None,
            },
            Err(e) => Entry {
                label: label.to_string(),
                error: None,
                note: Some(e.to_string()),
            },
        };

        self.entries.push(entry);
    }

    /// Entries sorted by ascending error, failed ones last, ties in insertion order.
    pub fn ranked(&self) -> Vec<&Entry<F>>
    {
        let mut ranked: Vec<&Entry<F>> = self.entries.iter().collect();

        ranked.sort_by(|a, b| {
            match (a.error, b.error) {
                (Some(ea), Some(eb)) => ea.partial_cmp(&eb).unwrap_or(core::cmp::Ordering::Equal),
                (Some(_), None) => core::cmp::Ordering::Less,
                (None, Some(_)) => core::cmp::Ordering::Greater,
                (None, None) => core::cmp::Ordering::Equal,
            }
        });

        ranked
    }

    /// Best estimator, if any succeeded.
    pub fn best(&self) -> Option<&Entry<F>>
    {
        self.ranked().into_iter().next().filter(|e| e.error.is_some())
    }
}

impl<F: Float + core::fmt::Display> core::fmt::Display for Comparison<F>
{
    fn fmt(&self, f: &mut core::fmt::Formatter) -> Result<(), core::fmt::Error>
    {
        let width = self.entries.iter().map(|e| e.label.len()).max().unwrap_or(0).max(9);

        writeln!(f, "{:<width$}  relative error", "estimator", width = width)?;
        for e in self.ranked() {
            match (&e.error, &e.note) {
                (Some(err), _) => writeln!(f, "{:<width$}  {:.4}", e.label, err, width = width)?,
                (None, Some(note)) => writeln!(f, "{:<width$}  failed ({})", e.label, note, width = width)?,
                (None, None) => writeln!(f, "{:<width$}  n/a", e.label, width = width)?,
            }
        }
        Ok(())
    }
}
