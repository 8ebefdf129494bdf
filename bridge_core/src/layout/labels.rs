//! Component labels, leader arrows, view titles and the top view note block.
//!
//! Pure annotation: positions are read from the finished layouts.

use crate::geometry::{DrawPrimitive, DrawRole, Point, TextAnchor, TextSize};
use crate::layout::cross_section::{CrossSectionLayout, ZoneKind};
use crate::layout::top_view::{skew_offset, TopViewLayout};
use crate::parameters::BridgeParameters;
use crate::settings::DimensionStyle;
use crate::units::Millimeters;

pub const CROSS_SECTION_TITLE: &str = "CROSS-SECTION VIEW";
pub const TOP_VIEW_TITLE: &str = "TOP VIEW - Girder and Cross Bracing Layout";

const TITLE_POSITION: Point = Point { x: 30.0, y: 35.0 };
const LEADER_ARROW_PX: f64 = 5.0;
// Footpath names only fit in footpaths at least this big (px)
const FOOTPATH_LABEL_MIN_WIDTH_PX: f64 = 120.0;
const FOOTPATH_LABEL_MIN_THICKNESS_PX: f64 = 10.0;

/// Title text at the top-left corner
pub fn title(text: &str) -> DrawPrimitive {
    DrawPrimitive::sized_text(
        DrawRole::Title,
        TITLE_POSITION,
        text,
        TextAnchor::Start,
        TextSize::Title,
    )
}

/// Leader line from a label at `from` to the component at `to`, arrowhead at `to`
pub fn leader(from: Point, to: Point, text: &str) -> Vec<DrawPrimitive> {
    let angle = (to.y - from.y).atan2(to.x - from.x);
    let spread = std::f64::consts::PI / 6.0;
    let barb =
        |a: f64| Point::new(to.x - LEADER_ARROW_PX * a.cos(), to.y - LEADER_ARROW_PX * a.sin());

    vec![
        DrawPrimitive::line(DrawRole::Label, from, to),
        DrawPrimitive::polygon(
            DrawRole::Label,
            vec![to, barb(angle - spread), barb(angle + spread)],
        ),
        DrawPrimitive::sized_text(
            DrawRole::Label,
            Point::new(from.x - 5.0, from.y - 5.0),
            text,
            TextAnchor::Start,
            TextSize::Small,
        ),
    ]
}

fn label(position: Point, text: impl Into<String>, anchor: TextAnchor) -> DrawPrimitive {
    DrawPrimitive::sized_text(DrawRole::Label, position, text, anchor, TextSize::Small)
}

/// Names next to the cross-section components, plus the view title
pub fn cross_section_labels(
    params: &BridgeParameters,
    layout: &CrossSectionLayout,
) -> Vec<DrawPrimitive> {
    let mut out = vec![title(CROSS_SECTION_TITLE)];
    let base = layout.frame.baseline_y;

    for barrier in &layout.barriers {
        let b = barrier.bounds;
        let position = Point::new(b.center().x, b.top() - 8.0);
        out.push(label(position, "Crash Barrier", TextAnchor::Middle));
    }

    let mut carriageways = layout.zones_of(ZoneKind::Carriageway);
    if let Some(first) = carriageways.next() {
        let end = carriageways.last().map_or(first.end_px(), |z| z.end_px());
        let center = (first.start_px + end) / 2.0;
        out.push(label(Point::new(center, layout.deck_top_y - 8.0), "Deck", TextAnchor::Middle));
    }

    if let Some(stiffener) = layout.stiffeners.last() {
        let target = stiffener.center();
        out.extend(leader(Point::new(target.x + 40.0, base + 50.0), target, "Stiffener"));
    }

    let girders = &layout.girder_positions;
    if girders.len() > 1 {
        let mid = (girders[girders.len() - 2] + girders[girders.len() - 1]) / 2.0;
        let target = Point::new(mid, base - layout.girder_depth_px / 2.0);
        out.extend(leader(Point::new(mid + 45.0, base + 80.0), target, "Cross Bracing"));
    }

    let railing_text = format!("Railing = {}", Millimeters(params.railing_height_mm));
    let deck_mid = (layout.deck_left_px + layout.deck_right_px) / 2.0;
    for rail in &layout.railings {
        let y = rail.center().y + 3.0;
        if rail.center().x < deck_mid {
            let position = Point::new(rail.left() - 10.0, y);
            out.push(label(position, railing_text.clone(), TextAnchor::End));
        } else {
            let position = Point::new(rail.right() + 15.0, y);
            out.push(label(position, railing_text.clone(), TextAnchor::Start));
        }
    }

    let fp_thick_px = layout.deck_bottom_y - layout.footpath_top_y;
    if fp_thick_px > FOOTPATH_LABEL_MIN_THICKNESS_PX {
        for fp in layout.zones_of(ZoneKind::Footpath) {
            if fp.width_px > FOOTPATH_LABEL_MIN_WIDTH_PX {
                let y = layout.footpath_top_y + fp_thick_px / 2.0 + 3.0;
                out.push(label(Point::new(fp.center_px(), y), "Footpath", TextAnchor::Middle));
            }
        }
    }

    out
}

/// Numbered notes printed under the top view
pub fn top_view_notes(params: &BridgeParameters) -> Vec<String> {
    let mut notes = vec![
        format!("1. Girders: Quantity = {} nos.", params.girder_count()),
        "2. Cross bracing members (ISA 100×100×8) connecting adjacent girders".to_string(),
        "3. Dashed lines: Centerline of bearings at supports".to_string(),
        format!(
            "4. Skew angle: {:.1}° (angle between bearing CL and perpendicular to girder)",
            params.skew_angle_deg
        ),
        "5. Cross bracing distributed evenly to cover the entire span length".to_string(),
        "6. All dimensions in meters unless noted otherwise".to_string(),
    ];
    if params.end_diaphragms {
        notes.push("7. Double lines at bearings: End diaphragms".to_string());
    }
    notes
}

/// Labels, title and note block for the top view
pub fn top_view_labels(
    params: &BridgeParameters,
    layout: &TopViewLayout,
    style: &DimensionStyle,
    viewport_height: f64,
) -> Vec<DrawPrimitive> {
    let mut out = vec![title(TOP_VIEW_TITLE)];

    for bearing in &layout.bearing_lines {
        out.push(label(
            Point::new(bearing.top.x, bearing.top.y - 8.0),
            "CL Bearing",
            TextAnchor::Middle,
        ));
    }

    if let Some(first) = layout.girder_lines.first() {
        out.push(label(
            Point::new((first.x1 + first.x2) / 2.0, first.y - 15.0),
            "Girders",
            TextAnchor::Middle,
        ));
    }

    if layout.girder_lines.len() > 1 {
        let (g0, g1) = (&layout.girder_lines[0], &layout.girder_lines[1]);
        let last = &layout.girder_lines[layout.girder_lines.len() - 1];
        let x = last.x2 + style.top_view_side_px + 16.0;
        let mid_y = (g0.y + g1.y) / 2.0;
        out.push(label(Point::new(x, mid_y - 12.0), "Girder", TextAnchor::Start));
        out.push(label(Point::new(x, mid_y + 2.0), "Spacing", TextAnchor::Start));

        if let Some(&station) = layout.bracing_stations.first() {
            let x = station + skew_offset(mid_y - g0.y, params.skew_angle_deg) + 6.0;
            out.push(label(Point::new(x, mid_y + 3.0), "Cross Bracing", TextAnchor::Start));
        }
    }

    let notes_y = viewport_height - 160.0;
    out.push(DrawPrimitive::sized_text(
        DrawRole::Note,
        Point::new(30.0, notes_y + 5.0),
        "NOTES:",
        TextAnchor::Start,
        TextSize::Normal,
    ));
    for (i, note) in top_view_notes(params).into_iter().enumerate() {
        out.push(DrawPrimitive::sized_text(
            DrawRole::Note,
            Point::new(32.0, notes_y + 22.0 + i as f64 * 13.0),
            note,
            TextAnchor::Start,
            TextSize::Small,
        ));
    }

    out
}
