//! Structured extraction result
//!
//! The column set is only known at runtime. Rows are ordered maps keyed by
//! column name and may omit any column; a missing key means "no value".

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::borrow::Cow;

/// One extracted row, keys in the order the service sent them
pub type Row = Map<String, Value>;

/// Ordered header plus ordered rows, exactly as returned by the service
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub header: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<Row>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ExtractionResult {
    #[cfg(test)]
    pub fn new(header: Vec<String>, data: Vec<Row>) -> Self {
        Self { header, data }
    }

    pub fn column_count(&self) -> usize {
        self.header.len()
    }

    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.data.is_empty()
    }

    /// Value of `column` in row `row`, or "" when the row or key is absent
    #[cfg(test)]
    pub fn cell(&self, row: usize, column: &str) -> Cow<'_, str> {
        self.data
            .get(row)
            .map(|r| cell_text(r, column))
            .unwrap_or(Cow::Borrowed(""))
    }
}

/// Display text of a row's value for `column`
///
/// Strings are returned as-is. Other scalars use their JSON form, `null` and
/// missing keys are empty.
pub fn cell_text<'a>(row: &'a Row, column: &str) -> Cow<'a, str> {
    match row.get(column) {
        None | Some(Value::Null) => Cow::Borrowed(""),
        Some(Value::String(s)) => Cow::Borrowed(s.as_str()),
        Some(other) => Cow::Owned(other.to_string()),
    }
}

#[cfg(test)]
pub(crate) fn row(pairs: &[(&str, &str)]) -> Row {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_key_is_empty() {
        let result = ExtractionResult::new(
            vec!["Item".to_string(), "Price".to_string()],
            vec![row(&[("Item", "Cake")]), row(&[("Item", "Bun"), ("Price", "$2")])],
        );

        assert_eq!(result.cell(0, "Price"), "");
        assert_eq!(result.cell(1, "Price"), "$2");
        assert_eq!(result.cell(5, "Item"), "");
    }

    #[test]
    fn test_non_string_values_are_displayed() {
        let json = r#"{"header":["Line Number","Text"],"data":[{"Line Number":1,"Text":"Rye"},{"Line Number":null}]}"#;
        let result: ExtractionResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.cell(0, "Line Number"), "1");
        assert_eq!(result.cell(1, "Line Number"), "");
        assert_eq!(result.cell(1, "Text"), "");
    }

    #[test]
    fn test_null_header_reads_as_empty() {
        let result: ExtractionResult =
            serde_json::from_str(r#"{"header":null,"data":[]}"#).unwrap();
        assert!(result.header.is_empty());
        assert!(result.is_empty());

        let result: ExtractionResult = serde_json::from_str("{}").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_row_key_order_is_preserved() {
        let json = r#"{"header":["Z","A"],"data":[{"Z":"1","A":"2"}]}"#;
        let result: ExtractionResult = serde_json::from_str(json).unwrap();

        let keys: Vec<&str> = result.data[0].keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["Z", "A"]);
        assert_eq!(serde_json::to_string(&result).unwrap(), json);
    }
}
