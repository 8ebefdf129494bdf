//! # Drawing Settings
//!
//! Configuration for how the schematic is laid out on a drawing surface:
//! margins, component profiles, girder exaggeration and dimension offsets.
//! Settings are stored in project files next to the designs and can be
//! loaded on their own from JSON.
//!
//! ## Example
//!
//! ```rust
//! use bridge_core::settings::DrawingSettings;
//!
//! let settings = DrawingSettings::default();
//! assert_eq!(settings.cross_section_margin_px, 140.0);
//!
//! // Partial JSON is fine; everything missing keeps its default
//! let custom: DrawingSettings =
//!     serde_json::from_str(r#"{ "top_view_margin_px": 60.0 }"#).unwrap();
//! assert_eq!(custom.top_view_margin_px, 60.0);
//! assert_eq!(custom.cross_section_margin_px, 140.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::section::{CrashBarrierProfile, GirderExaggeration, GirderSectionProfile, RailingProfile};

/// Size of the drawing surface in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Viewport { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport::new(1200.0, 800.0)
    }
}

/// Offsets and sizes used when drawing dimension lines (pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionStyle {
    /// Overall deck width line, above the deck top
    pub total_width_above_px: f64,
    /// Footpath width lines, above the deck top
    pub footpath_above_px: f64,
    /// Carriageway (and median) lines, above the deck top
    pub carriageway_above_px: f64,
    /// Overhang line, below the girder baseline
    pub overhang_below_px: f64,
    /// Girder spacing line, below the girder baseline
    pub spacing_below_px: f64,
    /// Gap between a girder flange tip and a vertical thickness dimension
    pub vertical_gap_px: f64,
    /// Span length line, below the last girder in the top view
    pub span_below_px: f64,
    /// Bracing spacing line, raised above the span line
    pub bracing_raise_px: f64,
    /// Girder spacing line, right of the last girder end in the top view
    pub top_view_side_px: f64,
    /// Length of dotted extension lines on horizontal dimensions
    pub horizontal_extension_px: f64,
    /// Length of dotted extension lines on vertical dimensions
    pub vertical_extension_px: f64,
    /// Half length of the end ticks
    pub tick_px: f64,
    /// Arrowhead length
    pub arrow_px: f64,
}

impl Default for DimensionStyle {
    fn default() -> Self {
        DimensionStyle {
            total_width_above_px: 150.0,
            footpath_above_px: 100.0,
            carriageway_above_px: 60.0,
            overhang_below_px: 50.0,
            spacing_below_px: 90.0,
            vertical_gap_px: 15.0,
            span_below_px: 50.0,
            bracing_raise_px: 30.0,
            top_view_side_px: 75.0,
            horizontal_extension_px: 40.0,
            vertical_extension_px: 20.0,
            tick_px: 6.0,
            arrow_px: 4.0,
        }
    }
}

/// Everything that controls the drawing but is not a bridge parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingSettings {
    // === Cross-section framing ===
    /// Margin around the cross-section (px)
    pub cross_section_margin_px: f64,
    /// Vertical room kept free for dimensions and labels (px)
    pub cross_section_reserve_px: f64,
    /// Girder baseline distance above the bottom margin (px)
    pub cross_section_baseline_offset_px: f64,
    /// Extra height above the deck kept in view for barriers and railings (mm)
    pub cross_section_headroom_mm: f64,

    // === Top view framing ===
    /// Margin around the top view (px)
    pub top_view_margin_px: f64,
    /// Vertical room kept free for dimensions and notes (px)
    pub top_view_reserve_px: f64,
    /// How far the plan is lifted above the vertical center (px)
    pub top_view_center_lift_px: f64,

    // === Components ===
    pub girder: GirderSectionProfile,
    pub girder_exaggeration: GirderExaggeration,
    pub crash_barrier: CrashBarrierProfile,
    pub railing: RailingProfile,

    // === Top view details ===
    /// Smallest gap between the outer girder and the bearing line end (px)
    pub bearing_gap_min_px: f64,
    /// Bearing line overshoot as a fraction of the drawn girder spacing
    pub bearing_gap_ratio: f64,
    /// Half distance between the two lines of an end diaphragm (px)
    pub end_diaphragm_offset_px: f64,

    // === Annotation ===
    pub dimensions: DimensionStyle,
    /// Emit component labels, leader arrows, titles and notes
    pub show_labels: bool,
}

impl Default for DrawingSettings {
    fn default() -> Self {
        DrawingSettings {
            cross_section_margin_px: 140.0,
            cross_section_reserve_px: 250.0,
            cross_section_baseline_offset_px: 240.0,
            cross_section_headroom_mm: 1500.0,
            top_view_margin_px: 120.0,
            top_view_reserve_px: 180.0,
            top_view_center_lift_px: 40.0,
            girder: GirderSectionProfile::default(),
            girder_exaggeration: GirderExaggeration::default(),
            crash_barrier: CrashBarrierProfile::default(),
            railing: RailingProfile::default(),
            bearing_gap_min_px: 30.0,
            bearing_gap_ratio: 0.3,
            end_diaphragm_offset_px: 3.0,
            dimensions: DimensionStyle::default(),
            show_labels: true,
        }
    }
}
