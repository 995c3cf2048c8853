mod amr;
mod boundary;
mod checkpoint;
mod gauges;
mod grid;
mod method;
mod output;
pub(crate) mod parameter_file_contents;
mod problem;
mod regions;
mod time;

pub use amr::AmrParameters;
pub use amr::DebugFlags;
pub use boundary::BoundaryParameters;
pub use checkpoint::CheckpointParameters;
pub use checkpoint::CheckpointStyle;
pub use gauges::Gauge;
pub use gauges::GaugeParameters;
pub use grid::CellCount;
pub use grid::Edge;
pub use grid::Grid;
pub use grid::GridParameters;
pub use method::MethodParameters;
pub use output::ComponentSelection;
pub use output::Components;
pub use output::OutputParameters;
pub use parameter_file_contents::Override;
pub use problem::ParamValue;
pub use problem::ProblemParam;
pub use problem::ProblemParameters;
pub use regions::Region;
pub use regions::RegionParameters;
pub use time::OutputTimes;
pub use time::TimeParameters;
