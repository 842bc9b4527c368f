// ============================================================
// COLUMN CLASSIFICATION
// ============================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    OrdinalScale,
    FixedChoice,
    Skip,
}

/// How one column is treated by one analyzer pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnClassification {
    pub column_index: usize,

    /// Original header text
    pub header: String,

    pub kind: ColumnKind,

    /// Human-readable topic name; `None` for skipped columns
    pub derived_label: Option<String>,
}

impl ColumnClassification {
    pub fn skip(column_index: usize, header: &str) -> Self {
        Self {
            column_index,
            header: header.to_string(),
            kind: ColumnKind::Skip,
            derived_label: None,
        }
    }

    pub fn labeled(column_index: usize, header: &str, kind: ColumnKind, label: String) -> Self {
        Self {
            column_index,
            header: header.to_string(),
            kind,
            derived_label: Some(label),
        }
    }

    /// Topic label, or the raw header when none was derived
    pub fn label(&self) -> &str {
        self.derived_label.as_deref().unwrap_or(&self.header)
    }
}

/// The three independent views over a table's columns.
///
/// A column may be `text` in one view and `fixed_choice` in another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnPlan {
    /// Free-text pass: every column, as `Text` or `Skip`
    pub text: BTreeMap<usize, ColumnClassification>,

    /// Columns recognized as 1..5 scales
    pub ordinal: BTreeMap<usize, ColumnClassification>,

    /// Columns recognized as small enumerable answer sets
    pub choice: BTreeMap<usize, ColumnClassification>,
}

impl ColumnPlan {
    pub fn text_columns(&self) -> impl Iterator<Item = &ColumnClassification> {
        self.text.values().filter(|c| c.kind == ColumnKind::Text)
    }

    /// One classification per column: text, then ordinal, then choice, else skip
    pub fn primary(&self) -> BTreeMap<usize, ColumnClassification> {
        let mut merged = self.text.clone();
        for view in [&self.ordinal, &self.choice] {
            for (index, classification) in view {
                let replace = merged
                    .get(index)
                    .map(|current| current.kind == ColumnKind::Skip)
                    .unwrap_or(true);
                if replace {
                    merged.insert(*index, classification.clone());
                }
            }
        }
        merged
    }
}
