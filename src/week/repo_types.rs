use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One meal slot in a week's grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRow {
    pub id: String,    // unique within its week
    pub title: String, // display label, also matched against log meal names
}

impl WeekRow {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

/// Week-key (Monday's date key) to that week's ordered rows.
pub type WeekRows = BTreeMap<String, Vec<WeekRow>>;
