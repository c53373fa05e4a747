//! Processing mode hint sent to the extraction service

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Expected document layout, forwarded as the `mode` form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    #[default]
    Auto,
    Table,
    Text,
}

impl ProcessingMode {
    pub fn all() -> [ProcessingMode; 3] {
        [
            ProcessingMode::Auto,
            ProcessingMode::Table,
            ProcessingMode::Text,
        ]
    }

    /// Wire value of the `mode` field
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingMode::Auto => "auto",
            ProcessingMode::Table => "table",
            ProcessingMode::Text => "text",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProcessingMode::Auto => "Auto detect",
            ProcessingMode::Table => "Table",
            ProcessingMode::Text => "Plain text",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ProcessingMode::Auto => "Let the service decide between table and text",
            ProcessingMode::Table => "Gridded price lists and menus",
            ProcessingMode::Text => "Free text, item/price and key/value lines",
        }
    }

    pub fn shortcut(&self) -> char {
        match self {
            ProcessingMode::Auto => '1',
            ProcessingMode::Table => '2',
            ProcessingMode::Text => '3',
        }
    }

    pub fn from_shortcut(c: char) -> Option<ProcessingMode> {
        Self::all().into_iter().find(|m| m.shortcut() == c)
    }

    pub fn next(&self) -> ProcessingMode {
        match self {
            ProcessingMode::Auto => ProcessingMode::Table,
            ProcessingMode::Table => ProcessingMode::Text,
            ProcessingMode::Text => ProcessingMode::Auto,
        }
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProcessingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ProcessingMode::Auto),
            "table" => Ok(ProcessingMode::Table),
            "text" => Ok(ProcessingMode::Text),
            other => Err(format!(
                "unknown mode '{}', expected one of: auto, table, text",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_auto() {
        assert_eq!(ProcessingMode::default(), ProcessingMode::Auto);
    }

    #[test]
    fn test_wire_values() {
        assert_eq!(
            serde_json::to_string(&ProcessingMode::Table).unwrap(),
            "\"table\""
        );
        assert_eq!("TEXT".parse::<ProcessingMode>(), Ok(ProcessingMode::Text));
        assert!("pdf".parse::<ProcessingMode>().is_err());
    }

    #[test]
    fn test_next_cycles_through_all() {
        let mut mode = ProcessingMode::Auto;
        for _ in 0..3 {
            mode = mode.next();
        }
        assert_eq!(mode, ProcessingMode::Auto);
    }

    #[test]
    fn test_from_shortcut() {
        assert_eq!(ProcessingMode::from_shortcut('2'), Some(ProcessingMode::Table));
        assert_eq!(ProcessingMode::from_shortcut('9'), None);
    }
}
