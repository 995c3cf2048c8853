use derive_custom::run_parameters;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ValidationError;

/// An upper domain edge, either given directly or as a fraction of
/// the extent of an earlier dimension.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged, deny_unknown_fields)]
pub enum Edge {
    Value(f64),
    FractionOfExtent { fraction_of_extent: f64, dim: usize },
}

/// A cell count, either given directly or derived from the cell count
/// of an earlier dimension (rounded down).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged, deny_unknown_fields)]
pub enum CellCount {
    Count(usize),
    FractionOfCells { fraction_of_cells: f64, dim: usize },
}

impl From<f64> for Edge {
    fn from(value: f64) -> Self {
        Edge::Value(value)
    }
}

impl From<usize> for CellCount {
    fn from(count: usize) -> Self {
        CellCount::Count(count)
    }
}

#[run_parameters("grid")]
#[derive(Debug, PartialEq)]
#[serde(default)]
pub struct GridParameters {
    pub num_dim: usize,
    pub lower: Vec<f64>,
    pub upper: Vec<Edge>,
    pub num_cells: Vec<CellCount>,
    /// Number of conserved quantities.
    pub num_eqn: usize,
    pub num_aux: usize,
    /// 0-based index into the aux array of the capacity function.
    pub capacity_index: Option<usize>,
}

impl Default for GridParameters {
    fn default() -> Self {
        Self {
            num_dim: 2,
            lower: vec![0.0, 0.0],
            upper: vec![Edge::Value(1.0), Edge::Value(1.0)],
            num_cells: vec![CellCount::Count(100), CellCount::Count(100)],
            num_eqn: 1,
            num_aux: 0,
            capacity_index: None,
        }
    }
}

/// The grid with all derived entries resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    pub num_dim: usize,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub num_cells: Vec<usize>,
    pub num_eqn: usize,
    pub num_aux: usize,
    pub capacity_index: Option<usize>,
}

fn check_reference(field: &str, d: usize, dim: usize) -> Result<(), ValidationError> {
    if dim >= d {
        Err(ValidationError::new(
            format!("grid.{}[{}]", field, d),
            format!(
                "can only be derived from an earlier dimension, not from dimension {}",
                dim
            ),
        ))
    } else {
        Ok(())
    }
}

fn check_length<T>(field: &str, list: &[T], num_dim: usize) -> Result<(), ValidationError> {
    if list.len() != num_dim {
        Err(ValidationError::new(
            format!("grid.{}", field),
            format!("has {} entries but num_dim is {}", list.len(), num_dim),
        ))
    } else {
        Ok(())
    }
}

impl GridParameters {
    /// Resolves derived entries and checks all grid invariants.
    /// Derived entries are evaluated from scratch on every call.
    pub fn resolve(&self) -> Result<Grid, ValidationError> {
        if !(1..=3).contains(&self.num_dim) {
            return Err(ValidationError::new(
                "grid.num_dim",
                format!("must be 1, 2 or 3, got {}", self.num_dim),
            ));
        }
        check_length("lower", &self.lower, self.num_dim)?;
        check_length("upper", &self.upper, self.num_dim)?;
        check_length("num_cells", &self.num_cells, self.num_dim)?;
        let upper = self.resolve_upper()?;
        for d in 0..self.num_dim {
            let (lower, upper) = (self.lower[d], upper[d]);
            if !lower.is_finite() || !upper.is_finite() {
                return Err(ValidationError::new(
                    format!("grid.lower[{}]", d),
                    format!("domain edges must be finite, got [{}, {}]", lower, upper),
                ));
            }
            if lower >= upper {
                return Err(ValidationError::new(
                    format!("grid.lower[{}]", d),
                    format!("lower edge {} is not below upper edge {}", lower, upper),
                ));
            }
        }
        let num_cells = self.resolve_num_cells()?;
        if self.num_eqn == 0 {
            return Err(ValidationError::new(
                "grid.num_eqn",
                "need at least one conserved quantity",
            ));
        }
        if let Some(index) = self.capacity_index {
            if index >= self.num_aux {
                return Err(ValidationError::new(
                    "grid.capacity_index",
                    format!(
                        "index {} does not refer to one of the {} aux variables",
                        index, self.num_aux
                    ),
                ));
            }
        }
        Ok(Grid {
            num_dim: self.num_dim,
            lower: self.lower.clone(),
            upper,
            num_cells,
            num_eqn: self.num_eqn,
            num_aux: self.num_aux,
            capacity_index: self.capacity_index,
        })
    }

    fn resolve_upper(&self) -> Result<Vec<f64>, ValidationError> {
        let mut upper: Vec<f64> = Vec::with_capacity(self.num_dim);
        for (d, edge) in self.upper.iter().enumerate() {
            let value = match *edge {
                Edge::Value(value) => value,
                Edge::FractionOfExtent {
                    fraction_of_extent,
                    dim,
                } => {
                    check_reference("upper", d, dim)?;
                    fraction_of_extent * (upper[dim] - self.lower[dim])
                }
            };
            upper.push(value);
        }
        Ok(upper)
    }

    fn resolve_num_cells(&self) -> Result<Vec<usize>, ValidationError> {
        let mut num_cells: Vec<usize> = Vec::with_capacity(self.num_dim);
        for (d, count) in self.num_cells.iter().enumerate() {
            let value = match *count {
                CellCount::Count(count) => count,
                CellCount::FractionOfCells {
                    fraction_of_cells,
                    dim,
                } => {
                    check_reference("num_cells", d, dim)?;
                    let derived = (fraction_of_cells * num_cells[dim] as f64).floor();
                    if !derived.is_finite() || derived < 0.0 {
                        return Err(ValidationError::new(
                            format!("grid.num_cells[{}]", d),
                            format!("fraction {} gives no valid cell count", fraction_of_cells),
                        ));
                    }
                    derived as usize
                }
            };
            if value == 0 {
                return Err(ValidationError::new(
                    format!("grid.num_cells[{}]", d),
                    "need at least one cell",
                ));
            }
            num_cells.push(value);
        }
        Ok(num_cells)
    }
}

impl Grid {
    pub fn contains(&self, point: &[f64]) -> bool {
        point.len() == self.num_dim
            && point
                .iter()
                .zip(self.lower.iter().zip(self.upper.iter()))
                .all(|(x, (lower, upper))| lower <= x && x <= upper)
    }
}
