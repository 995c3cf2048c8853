use std::str::FromStr;

use derive_traits::RunParameters;
use linked_hash_map::LinkedHashMap;
use log::debug;
use serde_yaml::Mapping;
use serde_yaml::Value;

use crate::error::ValidationError;

/// Key of the field that selects the variant of a tagged sub-mapping
/// (output style, checkpoint style).
const TAG_KEY: &str = "style";

#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    pub section: String,
    pub keys: Vec<String>,
    pub value: Value,
}

impl Override {
    pub fn new<K: Into<String>>(
        section: impl Into<String>,
        keys: impl IntoIterator<Item = K>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            section: section.into(),
            keys: keys.into_iter().map(|k| k.into()).collect(),
            value: value.into(),
        }
    }

    /// An override of the field at the dotted `path`, e.g.
    /// `grid.num_cells.0`.
    pub fn at(path: &str, value: impl Into<Value>) -> Result<Self, ValidationError> {
        let mut keys = path.trim().split('.').map(|k| k.trim().to_owned());
        let section = keys
            .next()
            .filter(|section| !section.is_empty())
            .ok_or_else(|| ValidationError::new(path, "override without section"))?;
        Ok(Self {
            section,
            keys: keys.collect(),
            value: value.into(),
        })
    }

    fn field_name(&self) -> String {
        std::iter::once(self.section.as_str())
            .chain(self.keys.iter().map(|k| k.as_str()))
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Parses overrides of the form `section.key.0.key=value`, where the
/// value is read as YAML.
impl FromStr for Override {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, value) = s
            .split_once('=')
            .ok_or_else(|| ValidationError::new(s, "override needs the form path=value"))?;
        let value: Value = serde_yaml::from_str(value)
            .map_err(|e| ValidationError::new(s, format!("unreadable override value: {}", e)))?;
        Self::at(path, value)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ParameterFileContents {
    sections: LinkedHashMap<String, Value>,
    overrides: Vec<Override>,
}

fn insert_overrides<'a>(
    value: &mut Value,
    overrides: impl Iterator<Item = &'a Override>,
) -> Result<(), ValidationError> {
    for o in overrides {
        set_sublevel_value_by_keys(value, &o.keys, o.value.clone())
            .map_err(|reason| ValidationError::new(o.field_name(), reason))?;
    }
    Ok(())
}

/// Constructs a map of the form
/// key1: key2: key3: ... key_n: Value
/// If keys is empty, returns value
fn construct_sub_mapping(keys: &[String], value: Value) -> Value {
    if keys.is_empty() {
        value
    } else {
        let mut map = Mapping::default();
        map.insert(
            Value::String(keys[0].clone()),
            construct_sub_mapping(&keys[1..], value),
        );
        Value::Mapping(map)
    }
}

fn set_sublevel_value_by_keys(
    value: &mut Value,
    keys: &[String],
    target_value: Value,
) -> Result<(), String> {
    if keys.is_empty() {
        *value = target_value;
        return Ok(());
    }
    if value.is_null() {
        *value = construct_sub_mapping(keys, target_value);
        return Ok(());
    }
    match value {
        Value::Mapping(mapping) => {
            if keys.len() == 1 && keys[0] == TAG_KEY {
                // Switching the variant invalidates all fields of the old one.
                if mapping.get(TAG_KEY) != Some(&target_value) {
                    mapping.clear();
                }
                mapping.insert(Value::String(TAG_KEY.into()), target_value);
                return Ok(());
            }
            match mapping.get_mut(&keys[0]) {
                Some(sub_value) => set_sublevel_value_by_keys(sub_value, &keys[1..], target_value),
                None => {
                    mapping.insert(
                        Value::String(keys[0].clone()),
                        construct_sub_mapping(&keys[1..], target_value),
                    );
                    Ok(())
                }
            }
        }
        Value::Sequence(sequence) => {
            let index: usize = keys[0]
                .parse()
                .map_err(|_| format!("'{}' is not a list index", keys[0]))?;
            if index < sequence.len() {
                set_sublevel_value_by_keys(&mut sequence[index], &keys[1..], target_value)
            } else if index == sequence.len() {
                sequence.push(construct_sub_mapping(&keys[1..], target_value));
                Ok(())
            } else {
                Err(format!(
                    "index {} is past the end of a list of length {}",
                    index,
                    sequence.len()
                ))
            }
        }
        _ => Err(format!("cannot set key '{}' on a scalar value", keys[0])),
    }
}

impl ParameterFileContents {
    pub fn new(contents: &str) -> Result<Self, ValidationError> {
        let value: Value = serde_yaml::from_str(contents)
            .map_err(|e| ValidationError::new("parameter file", e.to_string()))?;
        let sections = match value {
            Value::Null => LinkedHashMap::new(),
            Value::Mapping(mapping) => mapping
                .into_iter()
                .map(|(k, v)| match k {
                    Value::String(name) => Ok((name, v)),
                    other => Err(ValidationError::new(
                        "parameter file",
                        format!("non-string section name {:?}", other),
                    )),
                })
                .collect::<Result<_, _>>()?,
            _ => {
                return Err(ValidationError::new(
                    "parameter file",
                    "top level must be a mapping of sections",
                ))
            }
        };
        Ok(Self {
            sections,
            overrides: vec![],
        })
    }

    /// Replaces the whole section belonging to `T`.
    pub fn insert_section<T: RunParameters>(&mut self, params: &T) -> Result<(), ValidationError> {
        let section_name = T::section_name();
        let value = serde_yaml::to_value(params)
            .map_err(|e| ValidationError::new(section_name, e.to_string()))?;
        self.sections.insert(section_name.into(), value);
        Ok(())
    }

    pub fn add_override(&mut self, o: Override) {
        self.overrides.push(o);
    }

    fn get_overrides_for_section<'a>(
        &'a self,
        section_name: &'a str,
    ) -> impl Iterator<Item = &'a Override> + 'a {
        self.overrides
            .iter()
            .filter(move |o| o.section == section_name)
    }

    /// Sections and overrides whose name no parameter struct asked for.
    pub fn unknown_sections<'a>(&'a self, known: &'a [&'a str]) -> impl Iterator<Item = &'a str> {
        self.sections
            .keys()
            .map(|s| s.as_str())
            .chain(self.overrides.iter().map(|o| o.section.as_str()))
            .filter(move |s| !known.contains(s))
    }

    /// Reads the section belonging to `T`. Sections missing from the
    /// parameter file start out at `T::default()`. Overrides are
    /// applied afterwards, in the order in which they were added.
    pub fn extract_parameter_struct<T: RunParameters + Default>(
        &self,
    ) -> Result<T, ValidationError> {
        let section_name = T::section_name();
        let mut value = match self.sections.get(section_name) {
            Some(section_value) => section_value.clone(),
            None => {
                debug!(
                    "Parameter section missing for '{}', assuming defaults",
                    section_name
                );
                serde_yaml::to_value(T::default())
                    .map_err(|e| ValidationError::new(section_name, e.to_string()))?
            }
        };
        insert_overrides(&mut value, self.get_overrides_for_section(section_name))?;
        serde_yaml::from_value(value).map_err(|err| {
            ValidationError::new(
                section_name,
                format!("failed to read parameter section: {}", err),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use derive_custom::run_parameters;

    use super::Override;
    use super::ParameterFileContents;

    #[run_parameters("x")]
    #[derive(Default, Debug)]
    struct X {
        a: usize,
        b: usize,
    }

    #[run_parameters("s")]
    #[derive(Default, Debug)]
    #[serde(tag = "style")]
    enum Style {
        #[default]
        Plain,
        Fancy {
            level: usize,
        },
    }

    #[test]
    fn r#override() {
        let mut contents = ParameterFileContents::new("x:\n  a: 1\n  b: 2").unwrap();
        contents.add_override(Override::new("x", ["a"], 5));
        let x = contents.extract_parameter_struct::<X>().unwrap();
        assert_eq!(x.a, 5);
        assert_eq!(x.b, 2);
    }

    #[test]
    fn override_in_omitted_section_starts_from_defaults() {
        let mut contents = ParameterFileContents::new("").unwrap();
        contents.add_override(Override::new("x", ["b"], 6));
        let x = contents.extract_parameter_struct::<X>().unwrap();
        assert_eq!(x.a, 0);
        assert_eq!(x.b, 6);
    }

    #[test]
    fn later_overrides_win() {
        let mut contents = ParameterFileContents::new("x:\n  a: 1\n  b: 2").unwrap();
        contents.add_override(Override::new("x", ["a"], 5));
        contents.add_override(Override::new("x", ["a"], 7));
        let x = contents.extract_parameter_struct::<X>().unwrap();
        assert_eq!(x.a, 7);
    }

    #[test]
    fn override_list_entries() {
        #[run_parameters("l")]
        #[derive(Default, Debug)]
        struct L {
            values: Vec<usize>,
        }
        let mut contents = ParameterFileContents::new("l:\n  values: [1, 2]").unwrap();
        contents.add_override("l.values.1=5".parse().unwrap());
        contents.add_override("l.values.2=9".parse().unwrap());
        let l = contents.extract_parameter_struct::<L>().unwrap();
        assert_eq!(l.values, vec![1, 5, 9]);
        contents.add_override("l.values.7=9".parse().unwrap());
        assert!(contents.extract_parameter_struct::<L>().is_err());
    }

    #[test]
    fn switching_the_style_tag_drops_old_fields() {
        let mut contents = ParameterFileContents::new("").unwrap();
        contents.add_override(Override::new("s", ["style"], "fancy"));
        contents.add_override(Override::new("s", ["level"], 3));
        let s = contents.extract_parameter_struct::<Style>().unwrap();
        assert!(matches!(s, Style::Fancy { level: 3 }));
        contents.add_override(Override::new("s", ["style"], "plain"));
        let s = contents.extract_parameter_struct::<Style>().unwrap();
        assert!(matches!(s, Style::Plain));
    }

    #[test]
    fn inserted_sections_replace_file_sections() {
        let mut contents = ParameterFileContents::new("x:\n  a: 1\n  b: 2").unwrap();
        contents.insert_section(&X { a: 3, b: 4 }).unwrap();
        contents.add_override(Override::new("x", ["b"], 8));
        let x = contents.extract_parameter_struct::<X>().unwrap();
        assert_eq!((x.a, x.b), (3, 8));
    }

    #[test]
    fn reject_unknown_fields() {
        let contents = ParameterFileContents::new("x:\n  a: 1\n  c: 2").unwrap();
        let err = contents.extract_parameter_struct::<X>().unwrap_err();
        assert_eq!(err.field, "x");
    }

    #[test]
    fn parse_override_from_str() {
        let o: Override = "grid.num_cells.0=172".parse().unwrap();
        assert_eq!(o, Override::new("grid", ["num_cells", "0"], 172u64));
        assert!("grid.num_cells".parse::<Override>().is_err());
    }

    #[test]
    fn unknown_sections_are_reported() {
        let mut contents = ParameterFileContents::new("x:\n  a: 1\nfoo: 3").unwrap();
        contents.add_override(Override::new("bar", ["a"], 1));
        let unknown: Vec<_> = contents.unknown_sections(&["x"]).collect();
        assert_eq!(unknown, vec!["foo", "bar"]);
    }
}
