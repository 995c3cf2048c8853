use std::fmt::Display;

use crate::error::SerializationError;

const BANNER: &str = "\
########################################################
### Generated file, do not edit.                    ###
### Change the run parameters and regenerate it.    ###
########################################################
";

const VALUE_WIDTH: usize = 20;

/// Separates a record's value from its name.
const SEPARATOR: &str = "=:";

pub(super) fn format_bool(value: bool) -> String {
    let token = if value { "T" } else { "F" };
    token.into()
}

/// Quotes a string the way the solver reads it back: embedded quotes
/// are doubled.
pub(super) fn format_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Why `text` cannot be placed on a record line, if it cannot.
pub fn unwritable(text: &str) -> Option<&'static str> {
    if text.contains(|c: char| c == '\n' || c == '\r') {
        Some("must not contain line breaks")
    } else if text.contains(SEPARATOR) {
        Some("must not contain the record separator '=:'")
    } else {
        None
    }
}

/// Why `name` cannot be used as a record name, if it cannot.
pub fn unusable_name(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("must not be empty")
    } else if name.contains(|c: char| c.is_whitespace() || c == '#' || c == '\'') {
        Some("must not contain whitespace, '#' or quotes")
    } else {
        unwritable(name)
    }
}

/// Builds the text of one control file, one record per line.
pub(super) struct DataFileWriter {
    file: String,
    text: String,
}

impl DataFileWriter {
    pub fn new(file: &str) -> Self {
        Self {
            file: file.into(),
            text: format!("{}\n", BANNER),
        }
    }

    pub fn error(&self, field: &str, reason: impl Into<String>) -> SerializationError {
        SerializationError::new(&self.file, field, reason)
    }

    fn record(&mut self, name: &str, value: &str, comment: Option<&str>) {
        let line = format!("{:<width$} {} {}", value, SEPARATOR, name, width = VALUE_WIDTH);
        self.text.push_str(&line);
        if let Some(comment) = comment {
            self.text.push_str(&format!("   # {}", comment));
        }
        self.text.push('\n');
    }

    fn check_text(&self, field: &str, text: &str) -> Result<(), SerializationError> {
        match unwritable(text) {
            Some(reason) => Err(self.error(field, reason)),
            None => Ok(()),
        }
    }

    fn check_finite(&self, name: &str, values: &[f64]) -> Result<(), SerializationError> {
        match values.iter().find(|x| !x.is_finite()) {
            Some(x) => Err(self.error(name, format!("{} is not a finite number", x))),
            None => Ok(()),
        }
    }

    /// Only valid before the first record.
    pub fn comment(&mut self, comment: &str) -> Result<(), SerializationError> {
        self.check_text("comment", comment)?;
        self.text.push_str(&format!("# {}\n", comment));
        Ok(())
    }

    pub fn blank(&mut self) {
        self.text.push('\n');
    }

    pub fn int(&mut self, name: &str, value: impl Display) {
        self.record(name, &value.to_string(), None);
    }

    pub fn ints<T: Display>(&mut self, name: &str, values: impl IntoIterator<Item = T>) {
        let joined = values
            .into_iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" ");
        self.record(name, &joined, None);
    }

    pub fn bool(&mut self, name: &str, value: bool) {
        self.record(name, &format_bool(value), None);
    }

    pub fn float(&mut self, name: &str, value: f64) -> Result<(), SerializationError> {
        self.floats(name, &[value])
    }

    pub fn floats(&mut self, name: &str, values: &[f64]) -> Result<(), SerializationError> {
        self.check_finite(name, values)?;
        self.ints(name, values.iter().map(|x| format!("{:?}", x)));
        Ok(())
    }

    pub fn string(&mut self, name: &str, value: &str) -> Result<(), SerializationError> {
        self.check_text(name, value)?;
        self.record(name, &format_string(value), None);
        Ok(())
    }

    pub fn strings<'a>(
        &mut self,
        name: &str,
        values: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), SerializationError> {
        let values: Vec<_> = values.into_iter().collect();
        for value in values.iter() {
            self.check_text(name, value)?;
        }
        self.ints(name, values.into_iter().map(format_string));
        Ok(())
    }

    /// A record carrying a trailing description. `value` is written
    /// as given.
    pub fn described(
        &mut self,
        name: &str,
        value: &str,
        description: &str,
    ) -> Result<(), SerializationError> {
        if let Some(reason) = unusable_name(name) {
            return Err(self.error(name, format!("invalid record name: {}", reason)));
        }
        self.check_text(name, value)?;
        self.check_text(name, description)?;
        let comment = Some(description).filter(|d| !d.is_empty());
        self.record(name, value, comment);
        Ok(())
    }

    /// A row of space separated values without a name, integers first.
    pub fn row(&mut self, name: &str, ints: &[u64], floats: &[f64]) -> Result<(), SerializationError> {
        self.check_finite(name, floats)?;
        let row: Vec<_> = ints
            .iter()
            .map(|i| i.to_string())
            .chain(floats.iter().map(|x| format!("{:?}", x)))
            .collect();
        self.text.push_str(&row.join(" "));
        self.text.push('\n');
        Ok(())
    }

    pub fn finish(self) -> String {
        self.text
    }
}

/// The records and rows of a control file, read back in file order.
#[derive(Debug, Default, PartialEq)]
pub struct DataFile {
    pub records: Vec<(String, String)>,
    pub rows: Vec<Vec<String>>,
}

impl DataFile {
    pub fn parse(text: &str) -> Self {
        let mut file = DataFile::default();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match line.split_once(SEPARATOR) {
                Some((value, rest)) => {
                    let name = match rest.split_once('#') {
                        Some((name, _)) => name,
                        None => rest,
                    };
                    file.records
                        .push((name.trim().to_owned(), value.trim().to_owned()));
                }
                None => file
                    .rows
                    .push(line.split_whitespace().map(|v| v.to_owned()).collect()),
            }
        }
        file
    }

    /// The value of the first record called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.records
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|(n, _)| n.as_str())
    }
}
