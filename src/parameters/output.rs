use derive_custom::run_parameters;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ValidationError;
use crate::tokens::OutputFormat;

/// Which components of q (or aux) are written to the output frames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Components {
    Named(ComponentSelection),
    List(Vec<bool>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentSelection {
    All,
    None,
}

impl Components {
    /// One flag per component.
    pub fn flags(&self, num_components: usize) -> Vec<bool> {
        match self {
            Components::Named(ComponentSelection::All) => vec![true; num_components],
            Components::Named(ComponentSelection::None) => vec![false; num_components],
            Components::List(flags) => flags.clone(),
        }
    }

    fn validate(&self, field: &str, num_components: usize) -> Result<(), ValidationError> {
        match self {
            Components::List(flags) if flags.len() != num_components => {
                Err(ValidationError::new(
                    format!("output.{}", field),
                    format!(
                        "has {} entries for {} components",
                        flags.len(),
                        num_components
                    ),
                ))
            }
            _ => Ok(()),
        }
    }
}

#[run_parameters("output")]
#[derive(Debug, PartialEq)]
#[serde(default)]
pub struct OutputParameters {
    pub output_format: OutputFormat,
    pub output_q_components: Components,
    pub output_aux_components: Components,
    /// Write aux arrays only at the initial time.
    pub output_aux_onlyonce: bool,
    /// The current t, dt and cfl are printed every step on levels up
    /// to this one.
    pub verbosity: usize,
}

impl Default for OutputParameters {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Ascii,
            output_q_components: Components::Named(ComponentSelection::All),
            output_aux_components: Components::Named(ComponentSelection::None),
            output_aux_onlyonce: true,
            verbosity: 0,
        }
    }
}

impl OutputParameters {
    pub fn validate(&self, num_eqn: usize, num_aux: usize) -> Result<(), ValidationError> {
        self.output_q_components
            .validate("output_q_components", num_eqn)?;
        self.output_aux_components
            .validate("output_aux_components", num_aux)
    }
}

#[cfg(test)]
mod tests {
    use super::ComponentSelection;
    use super::Components;
    use super::OutputParameters;

    #[test]
    fn component_flags() {
        assert_eq!(
            Components::Named(ComponentSelection::All).flags(3),
            vec![true, true, true]
        );
        assert_eq!(
            Components::Named(ComponentSelection::None).flags(2),
            vec![false, false]
        );
    }

    #[test]
    fn component_lists_must_match_counts() {
        let params = OutputParameters {
            output_q_components: Components::List(vec![true, false]),
            ..Default::default()
        };
        assert!(params.validate(2, 0).is_ok());
        assert_eq!(
            params.validate(3, 0).unwrap_err().field,
            "output.output_q_components"
        );
    }

    #[test]
    fn read_from_yaml() {
        let params: OutputParameters = serde_yaml::from_str(
            "
output_format: 1
output_q_components: [true, false, true]
output_aux_components: none
",
        )
        .unwrap();
        assert_eq!(params.output_q_components.flags(3), vec![true, false, true]);
        assert_eq!(
            params.output_aux_components,
            Components::Named(ComponentSelection::None)
        );
    }
}
