use std::collections::HashSet;

use derive_custom::run_parameters;
use log::warn;
use serde::Deserialize;
use serde::Serialize;

use super::grid::Grid;
use crate::error::ValidationError;

/// A fixed probe that records the solution at `location` while
/// `t_start <= t <= t_end`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Gauge {
    pub id: u64,
    pub location: Vec<f64>,
    pub t_start: f64,
    pub t_end: f64,
}

impl Gauge {
    pub fn new(id: u64, location: &[f64], t_start: f64, t_end: f64) -> Self {
        Self {
            id,
            location: location.to_vec(),
            t_start,
            t_end,
        }
    }
}

#[run_parameters("gauges")]
#[derive(Debug, Default, PartialEq)]
#[serde(default)]
pub struct GaugeParameters {
    pub gauges: Vec<Gauge>,
}

impl GaugeParameters {
    pub fn validate(&self, grid: &Grid) -> Result<(), ValidationError> {
        let mut ids = HashSet::new();
        for (i, gauge) in self.gauges.iter().enumerate() {
            let field = |name: &str| format!("gauges.gauges[{}].{}", i, name);
            if !ids.insert(gauge.id) {
                return Err(ValidationError::new(
                    field("id"),
                    format!("gauge id {} is used more than once", gauge.id),
                ));
            }
            if gauge.location.len() != grid.num_dim {
                return Err(ValidationError::new(
                    field("location"),
                    format!(
                        "has {} coordinates but num_dim is {}",
                        gauge.location.len(),
                        grid.num_dim
                    ),
                ));
            }
            if gauge.location.iter().any(|x| !x.is_finite()) {
                return Err(ValidationError::new(
                    field("location"),
                    "coordinates must be finite",
                ));
            }
            if gauge.t_start.is_nan() || gauge.t_end.is_nan() || gauge.t_start > gauge.t_end {
                return Err(ValidationError::new(
                    field("t_start"),
                    format!(
                        "time window [{}, {}] is empty",
                        gauge.t_start, gauge.t_end
                    ),
                ));
            }
            if !grid.contains(&gauge.location) {
                warn!(
                    "Gauge {} at {:?} lies outside the domain, the solver may ignore it",
                    gauge.id, gauge.location
                );
            }
        }
        Ok(())
    }
}
