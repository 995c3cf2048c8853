use derive_custom::run_parameters;
use log::warn;
use serde::Deserialize;
use serde::Serialize;

use super::grid::Grid;
use crate::error::ValidationError;
use crate::tokens::AuxType;

/// Toggles for the solver's developer print statements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebugFlags {
    /// Domain flags.
    pub dprint: bool,
    /// Error estimation flags.
    pub eprint: bool,
    pub edebug: bool,
    /// Grid bisection and clustering.
    pub gprint: bool,
    /// Proper nesting.
    pub nprint: bool,
    /// Projection of tagged points.
    pub pprint: bool,
    /// Regridding summary.
    pub rprint: bool,
    /// Space and memory.
    pub sprint: bool,
    /// Time step reporting on each level.
    pub tprint: bool,
    pub uprint: bool,
}

impl DebugFlags {
    pub fn entries(&self) -> [(&'static str, bool); 10] {
        [
            ("dprint", self.dprint),
            ("eprint", self.eprint),
            ("edebug", self.edebug),
            ("gprint", self.gprint),
            ("nprint", self.nprint),
            ("pprint", self.pprint),
            ("rprint", self.rprint),
            ("sprint", self.sprint),
            ("tprint", self.tprint),
            ("uprint", self.uprint),
        ]
    }
}

#[run_parameters("amr")]
#[derive(Debug, PartialEq)]
#[serde(default)]
pub struct AmrParameters {
    pub amr_levels_max: usize,
    pub refinement_ratios_x: Vec<usize>,
    pub refinement_ratios_y: Vec<usize>,
    pub refinement_ratios_z: Vec<usize>,
    pub refinement_ratios_t: Vec<usize>,
    /// One entry per aux variable.
    pub aux_type: Vec<AuxType>,
    pub flag_richardson: bool,
    pub flag_richardson_tol: f64,
    pub flag2refine: bool,
    pub flag2refine_tol: f64,
    /// Steps taken on level L between regriddings of level L+1.
    pub regrid_interval: usize,
    /// Width of the buffer zone around flagged points.
    pub regrid_buffer_width: usize,
    /// Ratio of flagged points to refined cells below which clusters
    /// are split further.
    pub clustering_cutoff: f64,
    pub verbosity_regrid: usize,
    pub debug: DebugFlags,
}

impl Default for AmrParameters {
    fn default() -> Self {
        Self {
            amr_levels_max: 1,
            refinement_ratios_x: vec![],
            refinement_ratios_y: vec![],
            refinement_ratios_z: vec![],
            refinement_ratios_t: vec![],
            aux_type: vec![],
            flag_richardson: false,
            flag_richardson_tol: 1.0,
            flag2refine: true,
            flag2refine_tol: 0.05,
            regrid_interval: 2,
            regrid_buffer_width: 3,
            clustering_cutoff: 0.7,
            verbosity_regrid: 0,
            debug: DebugFlags::default(),
        }
    }
}

impl AmrParameters {
    /// The refinement ratio lists that the solver reads for a grid of
    /// the given dimension, in file order.
    pub fn ratios(&self, num_dim: usize) -> Vec<(&'static str, &[usize])> {
        let spatial = [
            ("refinement_ratios_x", &self.refinement_ratios_x),
            ("refinement_ratios_y", &self.refinement_ratios_y),
            ("refinement_ratios_z", &self.refinement_ratios_z),
        ];
        spatial
            .into_iter()
            .take(num_dim)
            .chain(std::iter::once((
                "refinement_ratios_t",
                &self.refinement_ratios_t,
            )))
            .map(|(name, ratios)| (name, ratios.as_slice()))
            .collect()
    }

    pub fn validate(&self, grid: &Grid) -> Result<(), ValidationError> {
        if self.amr_levels_max == 0 {
            return Err(ValidationError::new(
                "amr.amr_levels_max",
                "need at least one level",
            ));
        }
        let expected = self.amr_levels_max - 1;
        for (name, ratios) in self.ratios(grid.num_dim) {
            if ratios.len() != expected {
                return Err(ValidationError::new(
                    format!("amr.{}", name),
                    format!(
                        "has {} entries but amr_levels_max = {} needs {}",
                        ratios.len(),
                        self.amr_levels_max,
                        expected
                    ),
                ));
            }
            if ratios.contains(&0) {
                return Err(ValidationError::new(
                    format!("amr.{}", name),
                    "refinement ratios must be positive",
                ));
            }
        }
        self.validate_aux_type(grid)?;
        self.validate_flagging()?;
        if self.regrid_interval == 0 {
            return Err(ValidationError::new(
                "amr.regrid_interval",
                "must be at least 1",
            ));
        }
        if !(self.clustering_cutoff > 0.0 && self.clustering_cutoff <= 1.0) {
            return Err(ValidationError::new(
                "amr.clustering_cutoff",
                format!("must lie in (0, 1], got {}", self.clustering_cutoff),
            ));
        }
        if self.amr_levels_max > 1 && self.regrid_buffer_width < self.regrid_interval {
            warn!(
                "regrid_buffer_width ({}) is smaller than regrid_interval ({}), waves may escape refined patches",
                self.regrid_buffer_width, self.regrid_interval
            );
        }
        Ok(())
    }

    fn validate_aux_type(&self, grid: &Grid) -> Result<(), ValidationError> {
        if self.aux_type.len() != grid.num_aux {
            return Err(ValidationError::new(
                "amr.aux_type",
                format!(
                    "has {} entries but num_aux is {}",
                    self.aux_type.len(),
                    grid.num_aux
                ),
            ));
        }
        if let Some(index) = grid.capacity_index {
            if self.aux_type[index] != AuxType::Capacity {
                return Err(ValidationError::new(
                    format!("amr.aux_type[{}]", index),
                    format!(
                        "is the capacity function but has type '{}'",
                        self.aux_type[index]
                    ),
                ));
            }
        }
        Ok(())
    }

    fn validate_flagging(&self) -> Result<(), ValidationError> {
        for (name, enabled, tol) in [
            ("flag_richardson_tol", self.flag_richardson, self.flag_richardson_tol),
            ("flag2refine_tol", self.flag2refine, self.flag2refine_tol),
        ] {
            if enabled && !(tol.is_finite() && tol > 0.0) {
                return Err(ValidationError::new(
                    format!("amr.{}", name),
                    format!("must be finite and positive, got {}", tol),
                ));
            }
        }
        if self.flag_richardson && self.flag2refine {
            warn!("Both richardson estimation and flag2refine are enabled, cells flagged by either will be refined");
        }
        Ok(())
    }
}
