use derive_custom::run_parameters;
use linked_hash_map::LinkedHashMap;
use serde::Deserialize;
use serde::Serialize;

use crate::error::ValidationError;
use crate::serializer::unusable_name;
use crate::serializer::unwritable;
use crate::serializer::FIXED_FILES;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Float(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Int(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.into())
    }
}

/// A problem-specific value, passed through to the solver verbatim.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProblemParam {
    pub value: ParamValue,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unit: Option<String>,
}

#[run_parameters("problem")]
#[derive(Debug, PartialEq)]
#[serde(default)]
pub struct ProblemParameters {
    /// Name of the record the solver reads the values into.
    pub name: String,
    pub file: String,
    pub params: LinkedHashMap<String, ProblemParam>,
}

impl Default for ProblemParameters {
    fn default() -> Self {
        Self {
            name: "probdata".into(),
            file: "setprob.data".into(),
            params: LinkedHashMap::new(),
        }
    }
}

impl ProblemParameters {
    /// Adds a parameter. Adding an existing name replaces its value
    /// but keeps its position.
    pub fn add_param(
        &mut self,
        name: &str,
        value: impl Into<ParamValue>,
        description: &str,
        unit: Option<&str>,
    ) {
        let param = ProblemParam {
            value: value.into(),
            description: description.into(),
            unit: unit.map(|unit| unit.into()),
        };
        match self.params.get_mut(name) {
            Some(existing) => *existing = param,
            None => {
                self.params.insert(name.into(), param);
            }
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("problem.name", &self.name), ("problem.file", &self.file)] {
            if value.trim().is_empty() {
                return Err(ValidationError::new(field, "must not be empty"));
            }
        }
        if self.file.contains('/') || FIXED_FILES.contains(&self.file.as_str()) {
            return Err(ValidationError::new(
                "problem.file",
                format!("'{}' is not a usable file name", self.file),
            ));
        }
        if let Some(reason) = unwritable(&self.name) {
            return Err(ValidationError::new("problem.name", reason));
        }
        for (name, param) in self.params.iter() {
            if let Some(reason) = unusable_name(name) {
                return Err(ValidationError::new(
                    "problem.params",
                    format!("'{}' is not a valid parameter name: {}", name, reason),
                ));
            }
            let value = match &param.value {
                ParamValue::String(value) => Some(value),
                _ => None,
            };
            let texts = [
                ("value", value),
                ("description", Some(&param.description)),
                ("unit", param.unit.as_ref()),
            ];
            for (key, text) in texts {
                if let Some(reason) = text.and_then(|text| unwritable(text)) {
                    return Err(ValidationError::new(
                        format!("problem.params.{}.{}", name, key),
                        reason,
                    ));
                }
            }
        }
        Ok(())
    }
}
