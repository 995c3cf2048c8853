//! Run configuration, control files and plot specification for a
//! block-structured AMR finite-volume solver.
//!
//! A [`RunConfigBuilder`] collects parameter-file sections and
//! overrides, [`RunConfigBuilder::build`] validates them into a
//! [`RunConfiguration`] and [`ConfigSerializer`] renders that into the
//! control files the solver reads at startup.

pub mod error;
pub mod logging;
pub mod parameters;
pub mod plot;
pub mod presets;
pub(crate) mod run_config;
pub(crate) mod serializer;
pub mod tokens;

#[cfg(test)]
pub(crate) mod test_utils;

pub use error::Error;
pub use error::PlotError;
pub use error::SerializationError;
pub use error::ValidationError;
pub use error::WriteError;
pub use parameters::Override;
pub use plot::PlotSpec;
pub use plot::PlotSpecBuilder;
pub use run_config::RunConfigBuilder;
pub use run_config::RunConfiguration;
pub use serializer::write_run_files;
pub use serializer::ConfigSerializer;
pub use serializer::ControlFileSet;
pub use serializer::DataFile;
pub use serializer::AMR_FILE;
pub use serializer::CLAW_FILE;
pub use serializer::GAUGES_FILE;
pub use serializer::REGIONS_FILE;
