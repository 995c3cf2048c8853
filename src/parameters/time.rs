use derive_custom::run_parameters;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ValidationError;
use crate::serializer::unwritable;

/// When the solver writes output frames. Exactly one style is active.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case", deny_unknown_fields)]
pub enum OutputTimes {
    /// `num_output_times` frames at equally spaced times up to `tfinal`.
    EquallySpaced {
        num_output_times: usize,
        tfinal: f64,
        #[serde(default = "default_output_t0")]
        output_t0: bool,
    },
    /// Output at each of the given times. The last one is the final time.
    ExplicitTimes { times: Vec<f64> },
    /// Output every `output_step_interval` steps over `total_steps` steps.
    StepInterval {
        output_step_interval: usize,
        total_steps: usize,
        #[serde(default = "default_output_t0")]
        output_t0: bool,
    },
}

fn default_output_t0() -> bool {
    true
}

impl OutputTimes {
    pub fn code(&self) -> i64 {
        match self {
            OutputTimes::EquallySpaced { .. } => 1,
            OutputTimes::ExplicitTimes { .. } => 2,
            OutputTimes::StepInterval { .. } => 3,
        }
    }

    /// The time at which the integration stops, if the style fixes one.
    pub fn tfinal(&self) -> Option<f64> {
        match self {
            OutputTimes::EquallySpaced { tfinal, .. } => Some(*tfinal),
            OutputTimes::ExplicitTimes { times } => times.last().copied(),
            OutputTimes::StepInterval { .. } => None,
        }
    }
}

#[run_parameters("time")]
#[derive(Debug, PartialEq)]
#[serde(default)]
pub struct TimeParameters {
    pub t0: f64,
    pub output_times: OutputTimes,
    /// If false, every step uses `dt_initial`.
    pub dt_variable: bool,
    pub dt_initial: f64,
    pub dt_max: f64,
    pub cfl_desired: f64,
    pub cfl_max: f64,
    /// Maximum number of steps between two output times.
    pub steps_max: usize,
    pub restart: bool,
    pub restart_file: String,
}

impl Default for TimeParameters {
    fn default() -> Self {
        Self {
            t0: 0.0,
            output_times: OutputTimes::EquallySpaced {
                num_output_times: 10,
                tfinal: 1.0,
                output_t0: true,
            },
            dt_variable: true,
            dt_initial: 1.0e-5,
            dt_max: 1.0e99,
            cfl_desired: 0.9,
            cfl_max: 1.0,
            steps_max: 50000,
            restart: false,
            restart_file: "fort.chk00006".into(),
        }
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new(
            format!("time.{}", field),
            format!("must be finite and positive, got {}", value),
        ))
    }
}

impl TimeParameters {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.t0.is_finite() {
            return Err(ValidationError::new("time.t0", "must be finite"));
        }
        self.validate_output_times()?;
        positive("dt_initial", self.dt_initial)?;
        // dt_max is conventionally set to 1e99 to mean "unbounded"
        if self.dt_max.is_nan() || self.dt_max <= 0.0 {
            return Err(ValidationError::new(
                "time.dt_max",
                format!("must be positive, got {}", self.dt_max),
            ));
        }
        if self.dt_initial > self.dt_max {
            return Err(ValidationError::new(
                "time.dt_initial",
                format!("{} exceeds dt_max {}", self.dt_initial, self.dt_max),
            ));
        }
        positive("cfl_desired", self.cfl_desired)?;
        positive("cfl_max", self.cfl_max)?;
        if self.cfl_desired > self.cfl_max {
            return Err(ValidationError::new(
                "time.cfl_desired",
                format!("{} exceeds cfl_max {}", self.cfl_desired, self.cfl_max),
            ));
        }
        if self.steps_max == 0 {
            return Err(ValidationError::new(
                "time.steps_max",
                "must allow at least one step",
            ));
        }
        if self.restart && self.restart_file.trim().is_empty() {
            return Err(ValidationError::new(
                "time.restart_file",
                "restarting requires a checkpoint file",
            ));
        }
        if let Some(reason) = unwritable(&self.restart_file) {
            return Err(ValidationError::new("time.restart_file", reason));
        }
        Ok(())
    }

    fn validate_output_times(&self) -> Result<(), ValidationError> {
        match &self.output_times {
            OutputTimes::EquallySpaced { tfinal, .. } => {
                if !tfinal.is_finite() || *tfinal <= self.t0 {
                    return Err(ValidationError::new(
                        "time.output_times.tfinal",
                        format!("{} is not after t0 = {}", tfinal, self.t0),
                    ));
                }
            }
            OutputTimes::ExplicitTimes { times } => {
                if times.is_empty() {
                    return Err(ValidationError::new(
                        "time.output_times.times",
                        "need at least one output time",
                    ));
                }
                if let Some(t) = times.iter().find(|t| !t.is_finite() || **t < self.t0) {
                    return Err(ValidationError::new(
                        "time.output_times.times",
                        format!("output time {} lies before t0 = {}", t, self.t0),
                    ));
                }
                if let Some(pair) = times.windows(2).find(|pair| pair[0] >= pair[1]) {
                    return Err(ValidationError::new(
                        "time.output_times.times",
                        format!(
                            "must be strictly increasing, but {} is followed by {}",
                            pair[0], pair[1]
                        ),
                    ));
                }
            }
            OutputTimes::StepInterval {
                output_step_interval,
                total_steps,
                ..
            } => {
                if *output_step_interval == 0 {
                    return Err(ValidationError::new(
                        "time.output_times.output_step_interval",
                        "must be positive",
                    ));
                }
                if *total_steps == 0 {
                    return Err(ValidationError::new(
                        "time.output_times.total_steps",
                        "must be positive",
                    ));
                }
            }
        }
        Ok(())
    }
}
