use derive_custom::run_parameters;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ValidationError;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case", deny_unknown_fields)]
pub enum CheckpointStyle {
    #[default]
    None,
    /// Checkpoint only at the final time.
    FinalOnly,
    Times {
        times: Vec<f64>,
    },
    /// Checkpoint every `interval` steps on the coarsest level and at
    /// the final time.
    Interval {
        interval: usize,
    },
}

impl CheckpointStyle {
    pub fn code(&self) -> i64 {
        match self {
            CheckpointStyle::None => 0,
            CheckpointStyle::FinalOnly => 1,
            CheckpointStyle::Times { .. } => 2,
            CheckpointStyle::Interval { .. } => 3,
        }
    }
}

#[run_parameters("checkpoint")]
#[derive(Debug, Default, PartialEq)]
#[serde(default)]
pub struct CheckpointParameters {
    pub schedule: CheckpointStyle,
}

impl CheckpointParameters {
    pub fn validate(&self, tfinal: Option<f64>) -> Result<(), ValidationError> {
        match &self.schedule {
            CheckpointStyle::None | CheckpointStyle::FinalOnly => Ok(()),
            CheckpointStyle::Times { times } => {
                if let Some(t) = times.iter().find(|t| !t.is_finite()) {
                    return Err(ValidationError::new(
                        "checkpoint.schedule.times",
                        format!("checkpoint time {} is not finite", t),
                    ));
                }
                if let Some(pair) = times.windows(2).find(|pair| pair[0] >= pair[1]) {
                    return Err(ValidationError::new(
                        "checkpoint.schedule.times",
                        format!(
                            "must be strictly increasing, but {} is followed by {}",
                            pair[0], pair[1]
                        ),
                    ));
                }
                if let Some(tfinal) = tfinal {
                    if let Some(t) = times.iter().find(|t| **t > tfinal) {
                        return Err(ValidationError::new(
                            "checkpoint.schedule.times",
                            format!("checkpoint time {} lies after tfinal = {}", t, tfinal),
                        ));
                    }
                }
                Ok(())
            }
            CheckpointStyle::Interval { interval } => {
                if *interval == 0 {
                    Err(ValidationError::new(
                        "checkpoint.schedule.interval",
                        "must be a positive number of steps",
                    ))
                } else {
                    Ok(())
                }
            }
        }
    }
}
