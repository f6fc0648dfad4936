//! Label models.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The selected filter together with every label that can be selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSnapshot {
    pub selected_label: String,
    pub all_labels: BTreeSet<String>,
}

impl LabelSnapshot {
    /// Union of the stored labels and the selected one, so a label nobody
    /// has logged under yet still shows up.
    pub fn new(selected_label: String, stored_labels: BTreeSet<String>) -> Self {
        let mut all_labels = stored_labels;
        all_labels.insert(selected_label.clone());
        Self {
            selected_label,
            all_labels,
        }
    }
}

impl Default for LabelSnapshot {
    fn default() -> Self {
        Self::new(String::new(), BTreeSet::new())
    }
}
