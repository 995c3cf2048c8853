use std::io;
use std::path::PathBuf;

use derive_more::Display;
use derive_more::From;

/// A configuration violates one of its invariants. Raised while
/// building a [`RunConfiguration`](crate::RunConfiguration) and never
/// auto-corrected.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display(fmt = "invalid {}: {}", field, reason)]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl std::error::Error for ValidationError {}

/// An inconsistency that was only discovered while rendering the
/// control files. Every instance of this points at a gap in
/// validation.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display(fmt = "cannot write {} in {}: {}", field, file, reason)]
pub struct SerializationError {
    pub file: String,
    pub field: String,
    pub reason: String,
}

impl SerializationError {
    pub fn new(
        file: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl std::error::Error for SerializationError {}

#[derive(Debug, Display)]
#[display(fmt = "failed to write {:?}: {}", path, source)]
pub struct WriteError {
    pub path: PathBuf,
    pub source: io::Error,
}

impl std::error::Error for WriteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// Errors a plot item can run into when it is evaluated against the
/// cell data of a single patch.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum PlotError {
    #[display(
        fmt = "variable index {} out of range for {} conserved quantities",
        index,
        num_eqn
    )]
    VariableOutOfRange { index: usize, num_eqn: usize },
    #[display(
        fmt = "reduction returned {} coordinates but {} values",
        num_coords,
        num_values
    )]
    LengthMismatch {
        num_coords: usize,
        num_values: usize,
    },
    #[display(fmt = "{} plots cannot be evaluated on {}-dimensional data", plot_type, num_dim)]
    UnsupportedDimension {
        plot_type: &'static str,
        num_dim: usize,
    },
    #[display(fmt = "expected cell data of shape {:?}, got {:?}", expected, got)]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
    },
}

impl std::error::Error for PlotError {}

/// Everything that can go wrong between a set of parameters and a
/// control-file set on disk.
#[derive(Debug, Display, From)]
pub enum Error {
    Validation(ValidationError),
    Serialization(SerializationError),
    Write(WriteError),
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Validation(e) => Some(e),
            Error::Serialization(e) => Some(e),
            Error::Write(e) => Some(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;
    use super::ValidationError;

    #[test]
    fn validation_error_names_the_field() {
        let err = ValidationError::new("grid.lower[0]", "must be below upper");
        assert_eq!(
            err.to_string(),
            "invalid grid.lower[0]: must be below upper"
        );
        let err: Error = err.into();
        assert!(matches!(err, Error::Validation(_)));
    }
}
