//! # Top View Layout
//!
//! Plan of the girders, cross-bracing and bearing lines with skew applied.
//!
//! ## Skew projection
//!
//! Girder 0 is the reference. A feature at transverse offset `Δy` from it is
//! shifted along the span by
//!
//! ```text
//! Δx = Δy · tan(skew)
//! ```
//!
//! The same shift is used for girder ends, bracing ends, bearing line ends and
//! end diaphragms, so everything on one transverse line stays collinear.
//!
//! ## Bracing
//!
//! The requested bracing spacing is a target. The span is divided into
//! `max(1, ceil(span / spacing))` equal bays so bracing always lands on both
//! ends of the span.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geometry::{DrawPrimitive, DrawRole, LineStyle, Point};
use crate::parameters::{BridgeParameters, MAX_BRACING_BAYS};
use crate::settings::{DrawingSettings, Viewport};
use crate::units::{Degrees, Radians};

const MIN_SCALE: f64 = 1e-6;

/// Scale and origin of the plan on the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TopViewFrame {
    /// Pixels per millimeter
    pub scale: f64,
    /// Mid-span (px)
    pub center_x: f64,
    /// Transverse center of the girder group (px)
    pub center_y: f64,
}

impl TopViewFrame {
    pub fn new(scale: f64, center_x: f64, center_y: f64) -> Self {
        TopViewFrame {
            scale,
            center_x,
            center_y,
        }
    }

    /// Fit the span and the girder group into a viewport
    pub fn fit(viewport: Viewport, params: &BridgeParameters, settings: &DrawingSettings) -> Self {
        let m = settings.top_view_margin_px;
        let n = params.girder_count();
        let model_width_mm = if n > 1 {
            (n - 1) as f64 * params.girder_spacing_mm + 2.0 * params.deck_overhang_mm
        } else {
            2.0 * params.deck_overhang_mm
        };

        let span_fit = (viewport.width - 2.0 * m) / params.span_length_mm.max(1.0);
        let width_fit =
            (viewport.height - 2.0 * m - settings.top_view_reserve_px) / model_width_mm.max(1.0);
        let mut scale = span_fit.min(width_fit);
        if !scale.is_finite() || scale < MIN_SCALE {
            warn!(
                width = viewport.width,
                height = viewport.height,
                "Viewport too small for top view"
            );
            scale = MIN_SCALE;
        }

        TopViewFrame {
            scale,
            center_x: viewport.width / 2.0,
            center_y: viewport.height / 2.0 - settings.top_view_center_lift_px,
        }
    }
}

/// Longitudinal shift for a transverse offset under skew.
///
/// Works in any length unit; the result is in the unit of `delta_y`.
///
/// ```rust
/// use bridge_core::layout::top_view::skew_offset;
///
/// let shift = skew_offset(2750.0, 10.0);
/// assert!((shift - 484.9).abs() < 0.1);
/// ```
pub fn skew_offset(delta_y: f64, skew_angle_deg: f64) -> f64 {
    delta_y * Radians::from(Degrees(skew_angle_deg)).tan()
}

/// One girder center-line in plan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GirderLine {
    pub y: f64,
    pub x1: f64,
    pub x2: f64,
}

/// A bearing center-line at one end of the span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BearingLine {
    pub top: Point,
    pub bottom: Point,
}

/// Everything the top view engine placed, plus the primitives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopViewLayout {
    pub frame: TopViewFrame,
    /// Span start on girder 0 (px)
    pub span_start_px: f64,
    /// Span end on girder 0 (px)
    pub span_end_px: f64,
    pub girder_lines: Vec<GirderLine>,
    /// Number of bracing bays (0 when no bracing is drawn)
    pub brace_count: usize,
    /// Bracing stations along girder 0 (px), both span ends included
    pub bracing_stations: Vec<f64>,
    /// Start bearing first, then end bearing
    pub bearing_lines: Vec<BearingLine>,
    pub primitives: Vec<DrawPrimitive>,
}

impl TopViewLayout {
    /// Transverse position of the first girder (px)
    pub fn first_girder_y(&self) -> f64 {
        self.girder_lines.first().map(|g| g.y).unwrap_or(self.frame.center_y)
    }

    /// Transverse position of the last girder (px)
    pub fn last_girder_y(&self) -> f64 {
        self.girder_lines.last().map(|g| g.y).unwrap_or(self.frame.center_y)
    }
}

/// Number of bracing bays for a span and requested spacing.
///
/// Zero when the spacing is not positive; otherwise between one and
/// `MAX_BRACING_BAYS`.
pub fn bracing_count(span_length_mm: f64, cross_bracing_spacing_mm: f64) -> usize {
    if cross_bracing_spacing_mm <= 0.0 || !cross_bracing_spacing_mm.is_finite() {
        return 0;
    }
    let bays = (span_length_mm / cross_bracing_spacing_mm).ceil();
    if bays.is_nan() || bays < 1.0 {
        1
    } else {
        bays.min(MAX_BRACING_BAYS as f64) as usize
    }
}

/// Lay out the plan view.
pub fn layout_top_view(
    params: &BridgeParameters,
    frame: TopViewFrame,
    settings: &DrawingSettings,
) -> TopViewLayout {
    let scale = frame.scale;
    let n = params.girder_count();
    let tan = Radians::from(Degrees(params.skew_angle_deg)).tan();
    let spacing_px = params.girder_spacing_mm * scale;

    // Girder rows centered on the frame
    let ys: Vec<f64> = if n > 1 {
        let start = frame.center_y - (n - 1) as f64 * spacing_px / 2.0;
        (0..n).map(|i| start + i as f64 * spacing_px).collect()
    } else {
        vec![frame.center_y]
    };
    let y0 = ys[0];
    let shift = |y: f64| (y - y0) * tan;

    let span_px = params.span_length_mm * scale;
    let span_start_px = frame.center_x - span_px / 2.0;
    let span_end_px = frame.center_x + span_px / 2.0;

    let mut primitives = Vec::new();

    let girder_lines: Vec<GirderLine> = ys
        .iter()
        .map(|&y| GirderLine {
            y,
            x1: span_start_px + shift(y),
            x2: span_end_px + shift(y),
        })
        .collect();
    for g in &girder_lines {
        primitives.push(DrawPrimitive::line(
            DrawRole::Girder,
            Point::new(g.x1, g.y),
            Point::new(g.x2, g.y),
        ));
    }

    // Cross-bracing between adjacent girders at each station
    let mut brace_count = 0;
    let mut bracing_stations = Vec::new();
    if n > 1 {
        brace_count = bracing_count(params.span_length_mm, params.cross_bracing_spacing_mm);
    }
    if brace_count > 0 {
        let bay_px = span_px / brace_count as f64;
        bracing_stations = (0..=brace_count)
            .map(|section| span_start_px + section as f64 * bay_px)
            .collect();
        for &station in &bracing_stations {
            for pair in ys.windows(2) {
                primitives.push(DrawPrimitive::line(
                    DrawRole::CrossBracing,
                    Point::new(station + shift(pair[0]), pair[0]),
                    Point::new(station + shift(pair[1]), pair[1]),
                ));
            }
        }
    }

    // End diaphragms: a double line on each bearing between adjacent girders
    if params.end_diaphragms && n > 1 {
        let offset = settings.end_diaphragm_offset_px;
        for base in [span_start_px, span_end_px] {
            for pair in ys.windows(2) {
                for side in [-offset, offset] {
                    primitives.push(DrawPrimitive::line(
                        DrawRole::EndDiaphragm,
                        Point::new(base + side + shift(pair[0]), pair[0]),
                        Point::new(base + side + shift(pair[1]), pair[1]),
                    ));
                }
            }
        }
    }

    // Bearing lines overshoot the outer girders
    let gap = settings.bearing_gap_min_px.max(settings.bearing_gap_ratio * spacing_px);
    let top_extent = y0 - gap;
    let bottom_extent = ys[ys.len() - 1] + gap;
    let bearing_lines: Vec<BearingLine> = [span_start_px, span_end_px]
        .iter()
        .map(|&base| BearingLine {
            top: Point::new(base + shift(top_extent), top_extent),
            bottom: Point::new(base + shift(bottom_extent), bottom_extent),
        })
        .collect();
    for b in &bearing_lines {
        primitives.push(DrawPrimitive::styled_line(
            DrawRole::BearingLine,
            b.top,
            b.bottom,
            LineStyle::Dashed,
        ));
    }

    debug!(
        scale,
        girders = n,
        brace_count,
        skew = params.skew_angle_deg,
        primitives = primitives.len(),
        "Laid out top view"
    );

    TopViewLayout {
        frame,
        span_start_px,
        span_end_px,
        girder_lines,
        brace_count,
        bracing_stations,
        bearing_lines,
        primitives,
    }
}
