//! Display Colors
//!
//! The four display attributes a renderer needs to draw one cell.

use serde::{Deserialize, Serialize};

/// Cytoplasm and nucleus colors, each with a border color.
///
/// Values are plain color names understood by the SVG exporter
/// (`"cyan"`, `"gray"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellColors {
    pub fill: String,
    pub fill_border: String,
    pub nucleus: String,
    pub nucleus_border: String,
}

impl CellColors {
    pub fn new(
        fill: impl Into<String>,
        fill_border: impl Into<String>,
        nucleus: impl Into<String>,
        nucleus_border: impl Into<String>,
    ) -> Self {
        Self {
            fill: fill.into(),
            fill_border: fill_border.into(),
            nucleus: nucleus.into(),
            nucleus_border: nucleus_border.into(),
        }
    }

    /// Returns the colors in renderer order: fill, fill border, nucleus, nucleus border.
    pub fn as_array(&self) -> [&str; 4] {
        [
            self.fill.as_str(),
            self.fill_border.as_str(),
            self.nucleus.as_str(),
            self.nucleus_border.as_str(),
        ]
    }
}
