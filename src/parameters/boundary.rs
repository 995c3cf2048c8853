use derive_custom::run_parameters;

use crate::error::ValidationError;
use crate::tokens::BoundaryCondition;

#[run_parameters("boundary")]
#[derive(Debug, PartialEq)]
#[serde(default)]
pub struct BoundaryParameters {
    pub num_ghost: usize,
    pub bc_lower: Vec<BoundaryCondition>,
    pub bc_upper: Vec<BoundaryCondition>,
}

impl Default for BoundaryParameters {
    fn default() -> Self {
        Self {
            num_ghost: 2,
            bc_lower: vec![BoundaryCondition::Extrap; 2],
            bc_upper: vec![BoundaryCondition::Extrap; 2],
        }
    }
}

impl BoundaryParameters {
    pub fn validate(&self, num_dim: usize, min_num_ghost: usize) -> Result<(), ValidationError> {
        if self.num_ghost < min_num_ghost {
            return Err(ValidationError::new(
                "boundary.num_ghost",
                format!(
                    "{} ghost cells are too few for the chosen method, need {}",
                    self.num_ghost, min_num_ghost
                ),
            ));
        }
        for (name, bcs) in [("bc_lower", &self.bc_lower), ("bc_upper", &self.bc_upper)] {
            if bcs.len() != num_dim {
                return Err(ValidationError::new(
                    format!("boundary.{}", name),
                    format!("has {} entries but num_dim is {}", bcs.len(), num_dim),
                ));
            }
        }
        for (d, (lower, upper)) in self.bc_lower.iter().zip(self.bc_upper.iter()).enumerate() {
            let lower_periodic = *lower == BoundaryCondition::Periodic;
            let upper_periodic = *upper == BoundaryCondition::Periodic;
            if lower_periodic != upper_periodic {
                return Err(ValidationError::new(
                    format!("boundary.bc_lower[{}]", d),
                    format!(
                        "periodic boundaries must be set on both sides, got '{}' and '{}'",
                        lower, upper
                    ),
                ));
            }
        }
        Ok(())
    }
}
