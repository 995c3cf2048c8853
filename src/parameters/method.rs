use derive_custom::run_parameters;

use crate::error::ValidationError;
use crate::tokens::DimensionalSplit;
use crate::tokens::Limiter;
use crate::tokens::SourceSplit;
use crate::tokens::TransverseWaves;

#[run_parameters("method")]
#[derive(Debug, PartialEq)]
#[serde(default)]
pub struct MethodParameters {
    /// 1 is Godunov, 2 is Lax-Wendroff with limiters, 3 is third order.
    pub order: usize,
    pub dimensional_split: DimensionalSplit,
    pub transverse_waves: TransverseWaves,
    /// Number of waves in the Riemann solution.
    pub num_waves: usize,
    /// One limiter per wave family.
    pub limiter: Vec<Limiter>,
    pub use_fwaves: bool,
    pub source_split: SourceSplit,
}

impl Default for MethodParameters {
    fn default() -> Self {
        Self {
            order: 2,
            dimensional_split: DimensionalSplit::Unsplit,
            transverse_waves: TransverseWaves::All,
            num_waves: 1,
            limiter: vec![Limiter::Mc],
            use_fwaves: false,
            source_split: SourceSplit::None,
        }
    }
}

impl MethodParameters {
    pub fn validate(&self, amr_levels_max: usize) -> Result<(), ValidationError> {
        if !(1..=3).contains(&self.order) {
            return Err(ValidationError::new(
                "method.order",
                format!("must be 1, 2 or 3, got {}", self.order),
            ));
        }
        if self.num_waves == 0 {
            return Err(ValidationError::new(
                "method.num_waves",
                "need at least one wave",
            ));
        }
        if self.limiter.len() != self.num_waves {
            return Err(ValidationError::new(
                "method.limiter",
                format!(
                    "has {} entries but num_waves is {}",
                    self.limiter.len(),
                    self.num_waves
                ),
            ));
        }
        if amr_levels_max > 1 && self.dimensional_split != DimensionalSplit::Unsplit {
            return Err(ValidationError::new(
                "method.dimensional_split",
                format!(
                    "'{}' is not available with refinement, use 'unsplit'",
                    self.dimensional_split
                ),
            ));
        }
        Ok(())
    }

    /// Fewest ghost cells the method can work with.
    pub fn min_num_ghost(&self) -> usize {
        if self.order == 1 {
            1
        } else {
            2
        }
    }
}
