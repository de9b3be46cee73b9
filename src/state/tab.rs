// Tabs, rows and cells - the server-authoritative resource lists

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// A single display cell inside a row. The server either sends a raw
/// string or a field/value pair with an optional shortened representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Field {
        field: String,
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        representation: Option<String>,
    },
    Raw(String),
}

impl Cell {
    /// The searchable value of the cell (representation is display-only).
    pub fn value(&self) -> &str {
        match self {
            Cell::Raw(s) => s,
            Cell::Field { value, .. } => value,
        }
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            Cell::Raw(_) => None,
            Cell::Field { field, .. } => Some(field),
        }
    }
}

/// An opaque resource record. Identity is the server-assigned `ID` when
/// present, else `Name`. Rows are never mutated client-side outside
/// sorting and filtering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "_representation", default)]
    pub cells: Vec<Cell>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Row {
    pub fn identity(&self) -> Option<&str> {
        self.id.as_deref().or(self.name.as_deref())
    }

    /// All cell values joined for substring search.
    pub fn joined_values(&self) -> String {
        self.cells
            .iter()
            .map(Cell::value)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Value of the named field, if the row carries it as a cell.
    pub fn field_value(&self, field: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|c| c.field() == Some(field))
            .map(Cell::value)
    }
}

/// A named collection of resource rows (containers, images, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Rows", default)]
    pub rows: Vec<Row>,
    #[serde(rename = "SortBy", default, skip_serializing_if = "Option::is_none")]
    pub sort_spec: Option<String>,
}

impl Tab {
    /// Client-applied stable sort. A leading `-` on the spec negates the
    /// order; comparison is numeric when both values parse, else string.
    pub fn apply_sort(&mut self) {
        let Some(spec) = self.sort_spec.clone() else {
            return;
        };
        let (field, descending) = match spec.strip_prefix('-') {
            Some(f) => (f.to_string(), true),
            None => (spec, false),
        };

        self.rows.sort_by(|a, b| {
            let va = a.field_value(&field).unwrap_or_default();
            let vb = b.field_value(&field).unwrap_or_default();
            let ord = compare_values(va, vb);
            if descending { ord.reverse() } else { ord }
        });
    }
}

pub fn singular(key: &str) -> &str {
    key.strip_suffix('s').unwrap_or(key)
}

fn compare_values(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(na), Ok(nb)) => na.partial_cmp(&nb).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn row(name: &str, size: &str) -> Row {
        Row {
            id: None,
            name: Some(name.to_string()),
            cells: vec![
                Cell::Field {
                    field: "Name".into(),
                    value: name.into(),
                    representation: None,
                },
                Cell::Field {
                    field: "Size".into(),
                    value: size.into(),
                    representation: None,
                },
            ],
            extra: Default::default(),
        }
    }

    #[test]
    fn test_cell_deserializes_both_shapes() {
        let raw: Cell = serde_json::from_str("\"plain\"").unwrap();
        assert_eq!(raw, Cell::Raw("plain".into()));

        let field: Cell =
            serde_json::from_str(r#"{"field":"Name","value":"alpha","representation":"a"}"#)
                .unwrap();
        assert_eq!(field.value(), "alpha");
        assert_eq!(field.field(), Some("Name"));
    }

    #[test]
    fn test_numeric_sort_inferred() {
        let mut tab = Tab {
            key: "images".into(),
            title: "Images".into(),
            rows: vec![row("a", "900"), row("b", "12"), row("c", "100")],
            sort_spec: Some("Size".into()),
        };
        tab.apply_sort();
        let names: Vec<_> = tab.rows.iter().map(|r| r.name.clone().unwrap()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_negated_spec_sorts_descending() {
        let mut tab = Tab {
            key: "images".into(),
            title: "Images".into(),
            rows: vec![row("a", "900"), row("b", "12"), row("c", "100")],
            sort_spec: Some("-Size".into()),
        };
        tab.apply_sort();
        let names: Vec<_> = tab.rows.iter().map(|r| r.name.clone().unwrap()).collect();
        assert_eq!(names, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_string_sort_is_stable() {
        let mut tab = Tab {
            key: "volumes".into(),
            title: "Volumes".into(),
            rows: vec![row("beta", "x"), row("alpha", "x"), row("gamma", "x")],
            sort_spec: Some("Name".into()),
        };
        tab.apply_sort();
        let names: Vec<_> = tab.rows.iter().map(|r| r.name.clone().unwrap()).collect();
        assert_eq!(names, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_singular_key() {
        assert_eq!(singular("containers"), "container");
        assert_eq!(singular("stacks"), "stack");
    }
}
