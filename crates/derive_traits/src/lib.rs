//! The trait implemented by `#[run_parameters]` lives in its own crate
//! so that the generated impls resolve the same path from the main
//! crate, its tests and its benches.
use serde::Deserialize;
use serde::Serialize;

/// A section of the parameter file, deserialized on its own.
pub trait RunParameters: Serialize + for<'de> Deserialize<'de> {
    fn section_name() -> &'static str;
}
