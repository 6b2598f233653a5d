use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer, ser::SerializeMap};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Integer(i64),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Integer(v) => write!(f, "{v}"),
            Cell::Text(v) => f.write_str(v),
            Cell::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Cell::Timestamp(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// A decoded row, cells in column order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    cells: Vec<(&'static str, Cell)>,
}

impl Row {
    pub fn new(cells: Vec<(&'static str, Cell)>) -> Self {
        Self { cells }
    }

    pub fn id(&self) -> Option<i64> {
        match self.get("id") {
            Some(Cell::Integer(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.cells
            .iter()
            .find(|(col, _)| *col == name)
            .map(|(_, cell)| cell)
    }

    /// Display text of a column; empty for nulls and unknown columns.
    pub fn text(&self, name: &str) -> String {
        self.get(name).map(ToString::to_string).unwrap_or_default()
    }

    /// Case-insensitive substring match against every cell.
    pub fn matches(&self, needle_lowercase: &str) -> bool {
        self.cells
            .iter()
            .any(|(_, cell)| cell.to_string().to_lowercase().contains(needle_lowercase))
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (col, cell) in &self.cells {
            map.serialize_entry(col, cell)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row::new(vec![
            ("id", Cell::Integer(7)),
            ("name", Cell::Text("Aminah Binti Ali".into())),
            ("joined_on", Cell::Date(NaiveDate::from_ymd_opt(2023, 4, 1).unwrap())),
            ("phone", Cell::Null),
        ])
    }

    #[test]
    fn display_text_is_blank_for_nulls() {
        let row = sample();
        assert_eq!(row.id(), Some(7));
        assert_eq!(row.text("joined_on"), "2023-04-01");
        assert_eq!(row.text("phone"), "");
        assert_eq!(row.text("missing"), "");
    }

    #[test]
    fn search_is_case_insensitive_over_all_cells() {
        let row = sample();
        assert!(row.matches("aminah"));
        assert!(row.matches("2023-04"));
        assert!(!row.matches("zaini"));
    }

    #[test]
    fn serializes_as_ordered_json_object() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert_eq!(
            json,
            r#"{"id":7,"name":"Aminah Binti Ali","joined_on":"2023-04-01","phone":null}"#
        );
    }
}
