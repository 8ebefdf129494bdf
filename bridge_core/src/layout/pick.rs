//! Hover pick regions.
//!
//! Built from the primitive list a drawing already carries; used by an
//! interactive surface to find the component under the cursor. Lookups never
//! feed back into layout.

use serde::{Deserialize, Serialize};

use crate::geometry::{DrawPrimitive, DrawRole, Point, Rect, Shape};

/// Hit slop around line primitives (px)
pub const DEFAULT_LINE_TOLERANCE_PX: f64 = 3.0;

/// One pickable area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PickRegion {
    pub role: DrawRole,
    pub bounds: Rect,
}

impl PickRegion {
    /// Hover label for the component under the cursor
    pub fn label(&self) -> &'static str {
        self.role.display_name()
    }
}

/// Pick regions in draw order (later regions are on top)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PickIndex {
    regions: Vec<PickRegion>,
}

impl PickIndex {
    /// Index every component primitive. Dimensions, labels, titles and notes
    /// are skipped; lines get `line_tolerance_px` of slop on every side.
    pub fn from_primitives(primitives: &[DrawPrimitive], line_tolerance_px: f64) -> Self {
        let regions = primitives
            .iter()
            .filter(|p| p.role.is_component())
            .map(|p| {
                let bounds = match p.shape {
                    Shape::Line { .. } => p.bounds().inflate(line_tolerance_px),
                    _ => p.bounds(),
                };
                PickRegion { role: p.role, bounds }
            })
            .collect();
        PickIndex { regions }
    }

    /// Topmost region containing `point`
    pub fn pick(&self, point: Point) -> Option<&PickRegion> {
        self.regions.iter().rev().find(|r| r.bounds.contains(point))
    }

    pub fn regions(&self) -> &[PickRegion] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
