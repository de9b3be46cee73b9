// Inspector - detail panel for the focused row (logs, JSON, tables)

use serde::{Deserialize, Serialize};

use super::tab::Row;

/// One typed part of the inspector's content. `Lines` is the only part
/// that supports incremental append (live log tailing); every other
/// part type is replaced wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type", content = "Content", rename_all = "lowercase")]
pub enum InspectorPart {
    Rows(Vec<Row>),
    Table(TablePart),
    Json(serde_json::Value),
    Lines(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TablePart {
    #[serde(rename = "Headers", default)]
    pub headers: Vec<String>,
    #[serde(rename = "Rows", default)]
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inspector {
    pub is_enabled: bool,
    pub was_enabled: bool,
    pub current_tab: Option<String>,
    pub available_tabs: Vec<String>,
    pub content: Vec<InspectorPart>,
    pub horizontal_scroll: i32,
    pub vertical_scroll: i32,
}

impl Inspector {
    /// Whether the currently displayed content is a raw-lines stream.
    pub fn is_streaming_lines(&self) -> bool {
        matches!(self.content.first(), Some(InspectorPart::Lines(_)))
    }

    /// Apply freshly received content: append when both the incoming and
    /// the displayed parts are raw lines, replace otherwise.
    pub fn apply_content(&mut self, parts: Vec<InspectorPart>) {
        let incoming_lines = matches!(parts.first(), Some(InspectorPart::Lines(_)));
        if incoming_lines && self.is_streaming_lines() {
            self.content.extend(parts);
        } else {
            self.content = parts;
        }
    }

    /// All raw-lines flattened, in display order. Used by the local
    /// search engine when the Logs sub-tab is focused.
    pub fn all_lines(&self) -> Vec<String> {
        self.content
            .iter()
            .filter_map(|p| match p {
                InspectorPart::Lines(lines) => Some(lines.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Replace the raw-lines content with the given lines, dropping any
    /// previously accumulated lines parts.
    pub fn set_lines(&mut self, lines: Vec<String>) {
        self.content
            .retain(|p| !matches!(p, InspectorPart::Lines(_)));
        self.content.push(InspectorPart::Lines(lines));
    }

    pub fn reset_content(&mut self) {
        self.content.clear();
        self.horizontal_scroll = 0;
        self.vertical_scroll = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lines_append_other_parts_replace() {
        let mut inspector = Inspector::default();
        inspector.apply_content(vec![InspectorPart::Lines(vec!["a".into()])]);
        inspector.apply_content(vec![InspectorPart::Lines(vec!["b".into()])]);
        assert_eq!(inspector.all_lines(), vec!["a", "b"]);

        inspector.apply_content(vec![InspectorPart::Json(serde_json::json!({"k": 1}))]);
        assert_eq!(inspector.content.len(), 1);
        assert!(!inspector.is_streaming_lines());

        // Lines after a non-lines part replace instead of appending
        inspector.apply_content(vec![InspectorPart::Lines(vec!["c".into()])]);
        assert_eq!(inspector.all_lines(), vec!["c"]);
    }

    #[test]
    fn test_part_wire_format() {
        let part: InspectorPart =
            serde_json::from_str(r#"{"Type":"lines","Content":["one","two"]}"#).unwrap();
        assert_eq!(part, InspectorPart::Lines(vec!["one".into(), "two".into()]));

        let table: InspectorPart = serde_json::from_str(
            r#"{"Type":"table","Content":{"Headers":["H"],"Rows":[["v"]]}}"#,
        )
        .unwrap();
        match table {
            InspectorPart::Table(t) => assert_eq!(t.headers, vec!["H"]),
            other => panic!("unexpected part: {other:?}"),
        }
    }
}
