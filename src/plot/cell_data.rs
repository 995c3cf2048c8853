use ndarray::ArrayD;
use ndarray::ArrayViewD;
use ndarray::Axis;
use ndarray::IxDyn;

use crate::error::PlotError;

/// The solution on one patch of one frame: cell centers and the
/// conserved quantities, with the equation index as the first axis
/// of `q`.
#[derive(Clone, Debug, PartialEq)]
pub struct CellData {
    centers: Vec<ArrayD<f64>>,
    q: ArrayD<f64>,
}

impl CellData {
    /// A patch of uniform cells spanning `[lower, upper]` whose cell
    /// counts are read from the shape of `q`.
    pub fn uniform(lower: &[f64], upper: &[f64], q: ArrayD<f64>) -> Result<Self, PlotError> {
        let num_dim = q.ndim().saturating_sub(1);
        if num_dim == 0 || lower.len() != num_dim || upper.len() != num_dim {
            return Err(PlotError::ShapeMismatch {
                expected: vec![lower.len()],
                got: vec![num_dim],
            });
        }
        let cells_shape = q.shape()[1..].to_vec();
        let centers = (0..num_dim)
            .map(|d| {
                let width = (upper[d] - lower[d]) / cells_shape[d] as f64;
                ArrayD::from_shape_fn(IxDyn(&cells_shape), |index| {
                    lower[d] + (index[d] as f64 + 0.5) * width
                })
            })
            .collect();
        Ok(Self { centers, q })
    }

    /// Cell data with explicitly given centers, e.g. on a mapped grid.
    pub fn new(centers: Vec<ArrayD<f64>>, q: ArrayD<f64>) -> Result<Self, PlotError> {
        let cells_shape = &q.shape()[1.min(q.ndim())..];
        if centers.len() != cells_shape.len() {
            return Err(PlotError::ShapeMismatch {
                expected: vec![cells_shape.len()],
                got: vec![centers.len()],
            });
        }
        if let Some(c) = centers.iter().find(|c| c.shape() != cells_shape) {
            return Err(PlotError::ShapeMismatch {
                expected: cells_shape.to_vec(),
                got: c.shape().to_vec(),
            });
        }
        Ok(Self { centers, q })
    }

    pub fn num_dim(&self) -> usize {
        self.centers.len()
    }

    pub fn num_eqn(&self) -> usize {
        self.q.shape()[0]
    }

    pub fn num_cells(&self) -> usize {
        self.q.shape()[1..].iter().product()
    }

    /// Cell center coordinate along `dim`.
    pub fn center(&self, dim: usize) -> ArrayViewD<f64> {
        self.centers[dim].view()
    }

    pub fn q(&self) -> ArrayViewD<f64> {
        self.q.view()
    }

    pub fn component(&self, index: usize) -> Result<ArrayViewD<f64>, PlotError> {
        if index >= self.num_eqn() {
            return Err(PlotError::VariableOutOfRange {
                index,
                num_eqn: self.num_eqn(),
            });
        }
        Ok(self.q.index_axis(Axis(0), index))
    }
}
