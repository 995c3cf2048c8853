use derive_traits::RunParameters;
use log::debug;
use serde_yaml::Value;

use crate::error::ValidationError;
use crate::parameters::parameter_file_contents::ParameterFileContents;
use crate::parameters::AmrParameters;
use crate::parameters::BoundaryParameters;
use crate::parameters::CheckpointParameters;
use crate::parameters::Gauge;
use crate::parameters::GaugeParameters;
use crate::parameters::Grid;
use crate::parameters::GridParameters;
use crate::parameters::MethodParameters;
use crate::parameters::OutputParameters;
use crate::parameters::Override;
use crate::parameters::ProblemParameters;
use crate::parameters::Region;
use crate::parameters::RegionParameters;
use crate::parameters::TimeParameters;

/// Collects parameter sections and overrides and turns them into a
/// validated [`RunConfiguration`].
#[derive(Clone, Debug, Default)]
pub struct RunConfigBuilder {
    contents: ParameterFileContents,
}

impl RunConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the sections of a YAML parameter file. Sections that
    /// are left out start at their defaults.
    pub fn from_parameter_file_contents(contents: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            contents: ParameterFileContents::new(contents)?,
        })
    }

    /// Replaces a whole section. Overrides still apply on top of it.
    pub fn with_section<T: RunParameters>(&mut self, params: &T) -> Result<&mut Self, ValidationError> {
        self.contents.insert_section(params)?;
        Ok(self)
    }

    pub fn add_override(&mut self, o: Override) -> &mut Self {
        self.contents.add_override(o);
        self
    }

    /// Overrides the field at the dotted `path`, for example
    /// `builder.set("grid.num_cells.0", 172)`.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<&mut Self, ValidationError> {
        let o = Override::at(path, value)?;
        Ok(self.add_override(o))
    }

    /// Reads every section, resolves derived fields and checks all
    /// invariants. Returns the first violation found.
    pub fn build(&self) -> Result<RunConfiguration, ValidationError> {
        let grid_parameters: GridParameters = self.contents.extract_parameter_struct()?;
        let time: TimeParameters = self.contents.extract_parameter_struct()?;
        let output: OutputParameters = self.contents.extract_parameter_struct()?;
        let method: MethodParameters = self.contents.extract_parameter_struct()?;
        let boundary: BoundaryParameters = self.contents.extract_parameter_struct()?;
        let amr: AmrParameters = self.contents.extract_parameter_struct()?;
        let checkpoint: CheckpointParameters = self.contents.extract_parameter_struct()?;
        let gauges: GaugeParameters = self.contents.extract_parameter_struct()?;
        let regions: RegionParameters = self.contents.extract_parameter_struct()?;
        let problem: ProblemParameters = self.contents.extract_parameter_struct()?;
        if let Some(section) = self.contents.unknown_sections(&section_names()).next() {
            return Err(ValidationError::new(section, "unknown parameter section"));
        }

        let grid = grid_parameters.resolve()?;
        time.validate()?;
        output.validate(grid.num_eqn, grid.num_aux)?;
        amr.validate(&grid)?;
        method.validate(amr.amr_levels_max)?;
        boundary.validate(grid.num_dim, method.min_num_ghost())?;
        checkpoint.validate(time.output_times.tfinal())?;
        gauges.validate(&grid)?;
        regions.validate(&grid, amr.amr_levels_max)?;
        problem.validate()?;
        debug!(
            "Built run configuration: {}d grid with cells {:?}, {} levels, {} gauges, {} regions",
            grid.num_dim,
            grid.num_cells,
            amr.amr_levels_max,
            gauges.gauges.len(),
            regions.regions.len()
        );
        Ok(RunConfiguration {
            grid,
            time,
            output,
            method,
            boundary,
            amr,
            checkpoint,
            gauges: gauges.gauges,
            regions: regions.regions,
            problem,
        })
    }
}

fn section_names() -> [&'static str; 10] {
    [
        GridParameters::section_name(),
        TimeParameters::section_name(),
        OutputParameters::section_name(),
        MethodParameters::section_name(),
        BoundaryParameters::section_name(),
        AmrParameters::section_name(),
        CheckpointParameters::section_name(),
        GaugeParameters::section_name(),
        RegionParameters::section_name(),
        ProblemParameters::section_name(),
    ]
}

/// A validated set of run parameters. Only [`RunConfigBuilder::build`]
/// creates one, and it cannot be changed afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct RunConfiguration {
    pub(crate) grid: Grid,
    pub(crate) time: TimeParameters,
    pub(crate) output: OutputParameters,
    pub(crate) method: MethodParameters,
    pub(crate) boundary: BoundaryParameters,
    pub(crate) amr: AmrParameters,
    pub(crate) checkpoint: CheckpointParameters,
    pub(crate) gauges: Vec<Gauge>,
    pub(crate) regions: Vec<Region>,
    pub(crate) problem: ProblemParameters,
}

impl RunConfiguration {
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn time(&self) -> &TimeParameters {
        &self.time
    }

    pub fn output(&self) -> &OutputParameters {
        &self.output
    }

    pub fn method(&self) -> &MethodParameters {
        &self.method
    }

    pub fn boundary(&self) -> &BoundaryParameters {
        &self.boundary
    }

    pub fn amr(&self) -> &AmrParameters {
        &self.amr
    }

    pub fn checkpoint(&self) -> &CheckpointParameters {
        &self.checkpoint
    }

    pub fn gauges(&self) -> &[Gauge] {
        &self.gauges
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn problem(&self) -> &ProblemParameters {
        &self.problem
    }
}
