use crate::rollup::domain::Status;
use serde::{Deserialize, Serialize};

/// Display colors per status. The engine never interprets these strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct StatusPalette {
    pub green: String,
    pub amber: String,
    pub red: String,
    pub gray: String,
}

impl StatusPalette {
    pub fn color_for(&self, status: Status) -> &str {
        match status {
            Status::Green => &self.green,
            Status::Amber => &self.amber,
            Status::Red => &self.red,
            Status::Gray => &self.gray,
        }
    }
}

impl Default for StatusPalette {
    fn default() -> Self {
        Self {
            green: "#22c55e".to_string(),
            amber: "#f59e0b".to_string(),
            red: "#ef4444".to_string(),
            gray: "#9ca3af".to_string(),
        }
    }
}
