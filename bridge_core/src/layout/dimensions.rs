//! # Dimension Annotation
//!
//! Derives dimension lines from finished layouts. Endpoints come from the
//! placed geometry; label values come from the real-unit parameters, never
//! from pixel distances. Nothing here feeds back into layout.
//!
//! ## Placement
//!
//! Cross-section, stacked above the deck top:
//!
//! | Offset | Dimension            |
//! |--------|----------------------|
//! | 150 px | total deck width     |
//! | 100 px | footpaths            |
//! | 60 px  | carriageways, median |
//!
//! and below the girder baseline: overhang at 50 px, girder spacing at 90 px.
//! Vertical thickness dimensions sit beside the outer girders.
//!
//! Top view: span length below the last girder, bracing spacing 30 px above
//! that, girder spacing to the right of the span end.
//!
//! Labels use 2 decimals for meters and 0 decimals for millimeters.

use serde::{Deserialize, Serialize};

use crate::geometry::{DrawPrimitive, DrawRole, LineStyle, Point, TextAnchor, TextSize};
use crate::layout::cross_section::{CrossSectionLayout, ZoneKind};
use crate::layout::deck_width::DeckWidth;
use crate::layout::top_view::TopViewLayout;
use crate::parameters::BridgeParameters;
use crate::settings::DimensionStyle;
use crate::units::{Meters, Millimeters};

/// Direction of the dimension line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Which way the dotted extension lines run from the dimension line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ExtensionDirection {
    /// Unit step in screen coordinates
    fn step(self) -> (f64, f64) {
        match self {
            ExtensionDirection::Up => (0.0, -1.0),
            ExtensionDirection::Down => (0.0, 1.0),
            ExtensionDirection::Left => (-1.0, 0.0),
            ExtensionDirection::Right => (1.0, 0.0),
        }
    }
}

/// The quantity a dimension measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionKind {
    TotalDeckWidth,
    Footpath,
    Carriageway,
    Median,
    Overhang,
    GirderSpacing,
    DeckThickness,
    FootpathThickness,
    SpanLength,
    BracingSpacing,
}

/// One dimension line with its label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionAnnotation {
    pub kind: DimensionKind,
    pub from: Point,
    pub to: Point,
    pub label: String,
    pub orientation: Orientation,
    pub extension_direction: ExtensionDirection,
}

impl DimensionAnnotation {
    pub fn horizontal(
        kind: DimensionKind,
        x1: f64,
        x2: f64,
        y: f64,
        label: String,
        ext: ExtensionDirection,
    ) -> Self {
        DimensionAnnotation {
            kind,
            from: Point::new(x1, y),
            to: Point::new(x2, y),
            label,
            orientation: Orientation::Horizontal,
            extension_direction: ext,
        }
    }

    pub fn vertical(
        kind: DimensionKind,
        x: f64,
        y1: f64,
        y2: f64,
        label: String,
        ext: ExtensionDirection,
    ) -> Self {
        DimensionAnnotation {
            kind,
            from: Point::new(x, y1),
            to: Point::new(x, y2),
            label,
            orientation: Orientation::Vertical,
            extension_direction: ext,
        }
    }

    /// Expand into drawable primitives: the line, end ticks, arrowheads,
    /// dotted extension lines and the label.
    pub fn to_primitives(&self, style: &DimensionStyle) -> Vec<DrawPrimitive> {
        let (a, b) = (self.from, self.to);
        let t = style.tick_px;
        let s = style.arrow_px;
        let mut out = Vec::with_capacity(8);

        out.push(DrawPrimitive::line(DrawRole::Dimension, a, b));

        match self.orientation {
            Orientation::Horizontal => {
                for p in [a, b] {
                    out.push(DrawPrimitive::line(
                        DrawRole::Dimension,
                        Point::new(p.x, p.y - t),
                        Point::new(p.x, p.y + t),
                    ));
                }
                // Arrowheads point outward at both ends
                let dir = if b.x >= a.x { 1.0 } else { -1.0 };
                out.push(DrawPrimitive::polygon(
                    DrawRole::Dimension,
                    vec![
                        a,
                        Point::new(a.x + dir * s, a.y - s / 2.0),
                        Point::new(a.x + dir * s, a.y + s / 2.0),
                    ],
                ));
                out.push(DrawPrimitive::polygon(
                    DrawRole::Dimension,
                    vec![
                        b,
                        Point::new(b.x - dir * s, b.y - s / 2.0),
                        Point::new(b.x - dir * s, b.y + s / 2.0),
                    ],
                ));
            }
            Orientation::Vertical => {
                for p in [a, b] {
                    out.push(DrawPrimitive::line(
                        DrawRole::Dimension,
                        Point::new(p.x - t, p.y),
                        Point::new(p.x + t, p.y),
                    ));
                }
                let dir = if b.y >= a.y { 1.0 } else { -1.0 };
                out.push(DrawPrimitive::polygon(
                    DrawRole::Dimension,
                    vec![
                        a,
                        Point::new(a.x - s / 2.0, a.y + dir * s),
                        Point::new(a.x + s / 2.0, a.y + dir * s),
                    ],
                ));
                out.push(DrawPrimitive::polygon(
                    DrawRole::Dimension,
                    vec![
                        b,
                        Point::new(b.x - s / 2.0, b.y - dir * s),
                        Point::new(b.x + s / 2.0, b.y - dir * s),
                    ],
                ));
            }
        }

        let len = match self.orientation {
            Orientation::Horizontal => style.horizontal_extension_px,
            Orientation::Vertical => style.vertical_extension_px,
        };
        let (dx, dy) = self.extension_direction.step();
        for p in [a, b] {
            out.push(DrawPrimitive::styled_line(
                DrawRole::Dimension,
                p,
                Point::new(p.x + dx * len, p.y + dy * len),
                LineStyle::Dotted,
            ));
        }

        let mid = a.midpoint(b);
        let (position, anchor) = match (self.orientation, self.extension_direction) {
            (Orientation::Horizontal, _) => (Point::new(mid.x, mid.y - 8.0), TextAnchor::Middle),
            (Orientation::Vertical, ExtensionDirection::Left) => {
                (Point::new(mid.x - 12.0, mid.y + 3.0), TextAnchor::End)
            }
            (Orientation::Vertical, _) => {
                (Point::new(mid.x + 12.0, mid.y + 3.0), TextAnchor::Start)
            }
        };
        out.push(DrawPrimitive::sized_text(
            DrawRole::Dimension,
            position,
            self.label.clone(),
            anchor,
            TextSize::Small,
        ));

        out
    }
}

/// "3.50 m" from millimeters
pub fn format_meters(mm: f64) -> String {
    Meters::from(Millimeters(mm)).to_string()
}

/// "200mm"
pub fn format_millimeters(mm: f64) -> String {
    Millimeters(mm).to_string()
}

// ============================================================================
// Cross-section
// ============================================================================

/// Dimensions for a cross-section layout
pub fn cross_section_dimensions(
    params: &BridgeParameters,
    deck: &DeckWidth,
    layout: &CrossSectionLayout,
    style: &DimensionStyle,
) -> Vec<DimensionAnnotation> {
    use DimensionKind as K;
    use ExtensionDirection::{Down, Left, Right, Up};

    let mut dims = Vec::new();
    let top = layout.deck_top_y;
    let base = layout.frame.baseline_y;

    dims.push(DimensionAnnotation::horizontal(
        K::TotalDeckWidth,
        layout.deck_left_px,
        layout.deck_right_px,
        top - style.total_width_above_px,
        format!("Total Deck Width = {}", format_meters(deck.total_width_mm)),
        Down,
    ));

    for zone in &layout.zones {
        let (kind, y, label) = match zone.kind {
            ZoneKind::Footpath if zone.width_mm > 0.0 => (
                K::Footpath,
                top - style.footpath_above_px,
                format!("FP = {}", format_meters(zone.width_mm)),
            ),
            ZoneKind::Carriageway => (
                K::Carriageway,
                top - style.carriageway_above_px,
                format!("Carriageway = {}", format_meters(params.carriageway_width_mm)),
            ),
            ZoneKind::Median if zone.width_mm > 0.0 => (
                K::Median,
                top - style.carriageway_above_px,
                format!("Median = {}", format_meters(zone.width_mm)),
            ),
            _ => continue,
        };
        dims.push(DimensionAnnotation::horizontal(
            kind,
            zone.start_px,
            zone.end_px(),
            y,
            label,
            Down,
        ));
    }

    let girders = &layout.girder_positions;
    if let Some(&first) = girders.first() {
        dims.push(DimensionAnnotation::horizontal(
            K::Overhang,
            layout.deck_left_px,
            first,
            base + style.overhang_below_px,
            format!("Overhang = {}", format_meters(params.deck_overhang_mm)),
            Up,
        ));
    }
    if girders.len() > 1 {
        dims.push(DimensionAnnotation::horizontal(
            K::GirderSpacing,
            girders[0],
            girders[1],
            base + style.spacing_below_px,
            format!("Girder Spacing = {}", format_meters(params.girder_spacing_mm)),
            Up,
        ));
    }

    let half_flange = layout.flange_width_px / 2.0;
    if params.deck_thickness_mm > 0.0 {
        let x = girders.first().map_or(layout.deck_left_px - style.vertical_gap_px, |&g| {
            g - half_flange - style.vertical_gap_px
        });
        dims.push(DimensionAnnotation::vertical(
            K::DeckThickness,
            x,
            layout.deck_top_y,
            layout.deck_bottom_y,
            format_millimeters(params.deck_thickness_mm),
            Left,
        ));
    }
    if deck.footpath_count > 0 && params.footpath_thickness_mm > 0.0 {
        let x = girders.last().map_or(layout.deck_right_px + style.vertical_gap_px, |&g| {
            g + half_flange + style.vertical_gap_px
        });
        dims.push(DimensionAnnotation::vertical(
            K::FootpathThickness,
            x,
            layout.footpath_top_y,
            layout.deck_bottom_y,
            format_millimeters(params.footpath_thickness_mm),
            Right,
        ));
    }

    dims
}

// ============================================================================
// Top view
// ============================================================================

/// Dimensions for a top view layout
pub fn top_view_dimensions(
    params: &BridgeParameters,
    layout: &TopViewLayout,
    style: &DimensionStyle,
) -> Vec<DimensionAnnotation> {
    use DimensionKind as K;
    use ExtensionDirection::{Left, Up};

    let mut dims = Vec::new();
    let Some(first) = layout.girder_lines.first() else {
        return dims;
    };

    let span_y = layout.last_girder_y() + style.span_below_px;
    dims.push(DimensionAnnotation::horizontal(
        K::SpanLength,
        first.x1,
        first.x2,
        span_y,
        format!("Span Length = {}", format_meters(params.span_length_mm)),
        Up,
    ));

    if layout.bracing_stations.len() > 1 {
        dims.push(DimensionAnnotation::horizontal(
            K::BracingSpacing,
            layout.bracing_stations[0],
            layout.bracing_stations[1],
            span_y - style.bracing_raise_px,
            format!("Bracing = {}", format_meters(params.cross_bracing_spacing_mm)),
            Up,
        ));
    }

    if layout.girder_lines.len() > 1 {
        let last = &layout.girder_lines[layout.girder_lines.len() - 1];
        let x = last.x2 + style.top_view_side_px;
        dims.push(DimensionAnnotation::vertical(
            K::GirderSpacing,
            x,
            layout.girder_lines[0].y,
            layout.girder_lines[1].y,
            format_meters(params.girder_spacing_mm),
            Left,
        ));
    }

    dims
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Shape;
    use crate::layout::cross_section::{layout_cross_section, CrossSectionFrame};
    use crate::layout::deck_width::compute_deck_total_width;
    use crate::layout::top_view::{layout_top_view, TopViewFrame};
    use crate::parameters::FootpathConfig;
    use crate::settings::DrawingSettings;
    use approx::assert_relative_eq;

    fn balanced_defaults() -> BridgeParameters {
        BridgeParameters {
            deck_overhang_mm: 2000.0,
            girder_spacing_mm: 3500.0,
            ..Default::default()
        }
    }

    fn cross_dims(params: &BridgeParameters) -> (CrossSectionLayout, Vec<DimensionAnnotation>) {
        let settings = DrawingSettings::default();
        let deck = compute_deck_total_width(params);
        let frame = CrossSectionFrame::new(0.05, 600.0, 500.0);
        let layout = layout_cross_section(params, &deck, frame, &settings);
        let dims = cross_section_dimensions(params, &deck, &layout, &settings.dimensions);
        (layout, dims)
    }

    fn find(dims: &[DimensionAnnotation], kind: DimensionKind) -> Vec<&DimensionAnnotation> {
        dims.iter().filter(|d| d.kind == kind).collect()
    }

    #[test]
    fn test_format_precision() {
        assert_eq!(format_meters(14_500.0), "14.50 m");
        assert_eq!(format_meters(3333.3), "3.33 m");
        assert_eq!(format_millimeters(200.0), "200mm");
        assert_eq!(format_millimeters(17.6), "18mm");
    }

    #[test]
    fn test_cross_section_default_dimensions() {
        let (layout, dims) = cross_dims(&balanced_defaults());

        let total = find(&dims, DimensionKind::TotalDeckWidth)[0];
        assert_eq!(total.label, "Total Deck Width = 14.50 m");
        assert_eq!(total.from.x, layout.deck_left_px);
        assert_eq!(total.to.x, layout.deck_right_px);
        assert_relative_eq!(total.from.y, layout.deck_top_y - 150.0, epsilon = 1e-9);
        assert_eq!(total.extension_direction, ExtensionDirection::Down);

        assert_eq!(find(&dims, DimensionKind::Footpath).len(), 2);
        assert_eq!(find(&dims, DimensionKind::Footpath)[0].label, "FP = 1.50 m");
        assert_eq!(find(&dims, DimensionKind::Carriageway)[0].label, "Carriageway = 10.50 m");

        let overhang = find(&dims, DimensionKind::Overhang)[0];
        assert_eq!(overhang.label, "Overhang = 2.00 m");
        assert_eq!(overhang.to.x, layout.girder_positions[0]);
        assert_eq!(overhang.extension_direction, ExtensionDirection::Up);

        let spacing = find(&dims, DimensionKind::GirderSpacing)[0];
        assert_eq!(spacing.label, "Girder Spacing = 3.50 m");
        assert_relative_eq!(spacing.from.y, 500.0 + 90.0, epsilon = 1e-9);

        let fp_thick = find(&dims, DimensionKind::FootpathThickness)[0];
        assert_eq!(fp_thick.label, "200mm");
        assert_eq!(fp_thick.orientation, Orientation::Vertical);
        assert_eq!(fp_thick.from.y, layout.footpath_top_y);
        assert_eq!(fp_thick.to.y, layout.deck_bottom_y);
        assert!(fp_thick.from.x > layout.girder_positions[3]);

        let deck_thick = find(&dims, DimensionKind::DeckThickness)[0];
        assert_eq!(deck_thick.extension_direction, ExtensionDirection::Left);
        assert!(deck_thick.from.x < layout.girder_positions[0]);
    }

    #[test]
    fn test_cross_section_without_footpaths_or_spacing() {
        let params = BridgeParameters {
            num_girders: 1,
            footpath_config: FootpathConfig::None,
            ..balanced_defaults()
        };
        let (_, dims) = cross_dims(&params);
        assert!(find(&dims, DimensionKind::Footpath).is_empty());
        assert!(find(&dims, DimensionKind::FootpathThickness).is_empty());
        assert!(find(&dims, DimensionKind::GirderSpacing).is_empty());
        assert_eq!(find(&dims, DimensionKind::Overhang).len(), 1);
    }

    #[test]
    fn test_median_dimension() {
        let params = BridgeParameters {
            median_present: true,
            median_width_mm: 1200.0,
            ..balanced_defaults()
        };
        let (_, dims) = cross_dims(&params);
        assert_eq!(find(&dims, DimensionKind::Carriageway).len(), 2);
        assert_eq!(find(&dims, DimensionKind::Median)[0].label, "Median = 1.20 m");
    }

    #[test]
    fn test_top_view_dimensions() {
        let params = balanced_defaults();
        let settings = DrawingSettings::default();
        let layout = layout_top_view(&params, TopViewFrame::new(0.02, 600.0, 360.0), &settings);
        let dims = top_view_dimensions(&params, &layout, &settings.dimensions);

        let span = find(&dims, DimensionKind::SpanLength)[0];
        assert_eq!(span.label, "Span Length = 35.00 m");
        assert_relative_eq!(span.from.y, layout.last_girder_y() + 50.0, epsilon = 1e-9);
        assert_relative_eq!(span.to.x - span.from.x, 700.0, epsilon = 1e-6);

        let bracing = find(&dims, DimensionKind::BracingSpacing)[0];
        assert_eq!(bracing.label, "Bracing = 3.50 m");
        assert_relative_eq!(bracing.from.y, span.from.y - 30.0, epsilon = 1e-9);

        let spacing = find(&dims, DimensionKind::GirderSpacing)[0];
        assert_eq!(spacing.label, "3.50 m");
        assert_eq!(spacing.orientation, Orientation::Vertical);
        assert_relative_eq!(spacing.to.y - spacing.from.y, 70.0, epsilon = 1e-6);
    }

    #[test]
    fn test_primitive_expansion() {
        let style = DimensionStyle::default();
        let dim = DimensionAnnotation::horizontal(
            DimensionKind::Overhang,
            100.0,
            200.0,
            50.0,
            "Overhang = 1.00 m".to_string(),
            ExtensionDirection::Up,
        );
        let prims = dim.to_primitives(&style);
        assert_eq!(prims.len(), 8);
        assert!(prims.iter().all(|p| p.role == DrawRole::Dimension));

        let dotted: Vec<&DrawPrimitive> = prims
            .iter()
            .filter(|p| matches!(p.shape, Shape::Line { style: LineStyle::Dotted, .. }))
            .collect();
        assert_eq!(dotted.len(), 2);
        for p in dotted {
            if let Shape::Line { from, to, .. } = p.shape {
                assert_eq!(from.y, 50.0);
                assert_eq!(to.y, 10.0);
            }
        }

        let text = prims.last().unwrap();
        assert_eq!(text.label_text(), Some("Overhang = 1.00 m"));
        assert_eq!(text.bounds().x, 150.0);
    }

    #[test]
    fn test_vertical_expansion_text_side() {
        let style = DimensionStyle::default();
        let right = DimensionAnnotation::vertical(
            DimensionKind::FootpathThickness,
            10.0,
            0.0,
            20.0,
            "200mm".to_string(),
            ExtensionDirection::Right,
        );
        let left = DimensionAnnotation {
            extension_direction: ExtensionDirection::Left,
            ..right.clone()
        };
        let text_x = |d: &DimensionAnnotation| d.to_primitives(&style).last().unwrap().bounds().x;
        assert!(text_x(&right) > 10.0);
        assert!(text_x(&left) < 10.0);
    }
}
