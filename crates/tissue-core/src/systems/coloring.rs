//! Cell Coloring

use tissue_events::CellColors;

use crate::components::CellTypeId;
use crate::setup::definitions::{EMBED_TYPE, ENVELOP_TYPE};

/// Visualization colors for a cell of `cell_type`
pub fn color_for(cell_type: CellTypeId) -> CellColors {
    match cell_type {
        EMBED_TYPE => CellColors::new("cyan", "black", "gray", "black"),
        ENVELOP_TYPE => CellColors::new("red", "black", "gray", "black"),
        _ => CellColors::new("green", "black", "cyan", "black"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_types() {
        assert_eq!(color_for(EMBED_TYPE).fill, "cyan");
        assert_eq!(color_for(ENVELOP_TYPE).fill, "red");
        assert_eq!(color_for(ENVELOP_TYPE).nucleus, "gray");
    }

    #[test]
    fn test_every_type_gets_four_colors() {
        for tag in 0..64 {
            let colors = color_for(CellTypeId(tag));
            assert!(colors.as_array().iter().all(|c| !c.is_empty()));
        }
        assert_eq!(
            color_for(CellTypeId(99)).as_array(),
            ["green", "black", "cyan", "black"]
        );
    }
}
