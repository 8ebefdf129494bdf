//! # Cross-Section Layout
//!
//! Projects the transverse build-up of the deck onto one horizontal axis.
//!
//! ## Zones
//!
//! Zones tile the deck strictly left to right with no gaps or overlaps:
//!
//! ```text
//! [footpath?] [barrier] [carriageway] ([median] [carriageway]) [barrier] [footpath?]
//! ```
//!
//! The railing is not a zone. It stands on the outer edge of a footpath and
//! grows inward over it, so the deck width never depends on it.
//!
//! ## Vertical layering
//!
//! Everything hangs off the girder baseline (screen y grows downward):
//!
//! ```text
//! girder_top   = baseline − girder_depth_drawn
//! deck_bottom  = girder_top
//! deck_top     = deck_bottom − deck_thickness
//! footpath_top = deck_bottom − footpath_thickness
//! ```
//!
//! The footpath shares its bottom with the deck whatever its own thickness.
//!
//! ## Girders
//!
//! The first girder sits one overhang in from the left deck edge, the last one
//! overhang in from the right, the rest evenly between (computed in mm, then
//! scaled). Each position is then clamped so the drawn flange stays on the
//! deck. With balanced parameters the clamp does nothing.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geometry::{DrawPrimitive, DrawRole, Point, Rect};
use crate::layout::deck_width::DeckWidth;
use crate::parameters::BridgeParameters;
use crate::section::BarrierFacing;
use crate::settings::{DrawingSettings, Viewport};

// Scale used when the viewport is too small to fit anything
const MIN_SCALE: f64 = 1e-6;

// ============================================================================
// Frame
// ============================================================================

/// Scale and origin of the cross-section on the drawing surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossSectionFrame {
    /// Pixels per millimeter
    pub scale: f64,
    /// Horizontal center of the deck (px)
    pub center_x: f64,
    /// Girder baseline, i.e. the underside of the bottom flanges (px)
    pub baseline_y: f64,
}

impl CrossSectionFrame {
    pub fn new(scale: f64, center_x: f64, baseline_y: f64) -> Self {
        CrossSectionFrame {
            scale,
            center_x,
            baseline_y,
        }
    }

    /// Fit the deck into a viewport.
    ///
    /// The scale is the smaller of the width fit and the height fit, where the
    /// height fit covers the drawn girder, the deck, the footpath and headroom
    /// for barriers and railings.
    pub fn fit(
        viewport: Viewport,
        params: &BridgeParameters,
        deck_total_mm: f64,
        settings: &DrawingSettings,
    ) -> Self {
        let m = settings.cross_section_margin_px;
        let drawn_depth_mm = settings.girder.depth_mm * settings.girder_exaggeration.depth;
        let stack_mm = drawn_depth_mm
            + params.deck_thickness_mm
            + params.footpath_thickness_mm
            + settings.cross_section_headroom_mm;

        let width_fit = (viewport.width - 2.0 * m) / deck_total_mm.max(1.0);
        let height_fit =
            (viewport.height - 2.0 * m - settings.cross_section_reserve_px) / stack_mm.max(1.0);
        let mut scale = width_fit.min(height_fit);
        if !scale.is_finite() || scale < MIN_SCALE {
            warn!(
                width = viewport.width,
                height = viewport.height,
                "Viewport too small for cross-section"
            );
            scale = MIN_SCALE;
        }

        CrossSectionFrame {
            scale,
            center_x: viewport.width / 2.0,
            baseline_y: viewport.height - m - settings.cross_section_baseline_offset_px,
        }
    }
}

// ============================================================================
// Zones
// ============================================================================

/// What occupies a stretch of the deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneKind {
    Footpath,
    CrashBarrier,
    Carriageway,
    Median,
}

/// One zone of the deck in projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeckZone {
    pub kind: ZoneKind,
    /// Left edge (px)
    pub start_px: f64,
    /// Drawn width (px)
    pub width_px: f64,
    /// Real width (mm)
    pub width_mm: f64,
}

impl DeckZone {
    /// Right edge (px)
    pub fn end_px(&self) -> f64 {
        self.start_px + self.width_px
    }

    pub fn center_px(&self) -> f64 {
        self.start_px + self.width_px / 2.0
    }
}

/// Lay the zones out left to right from `deck_left_px`.
///
/// Boundaries are cumulative sums, so consecutive zones always share an edge.
pub fn deck_zones(params: &BridgeParameters, deck_left_px: f64, scale: f64) -> Vec<DeckZone> {
    let mut widths = Vec::with_capacity(7);
    if params.footpath_config.has_left() {
        widths.push((ZoneKind::Footpath, params.footpath_width_mm));
    }
    widths.push((ZoneKind::CrashBarrier, params.crash_barrier_width_mm));
    widths.push((ZoneKind::Carriageway, params.carriageway_width_mm));
    if params.median_present {
        widths.push((ZoneKind::Median, params.effective_median_mm()));
        widths.push((ZoneKind::Carriageway, params.carriageway_width_mm));
    }
    widths.push((ZoneKind::CrashBarrier, params.crash_barrier_width_mm));
    if params.footpath_config.has_right() {
        widths.push((ZoneKind::Footpath, params.footpath_width_mm));
    }

    let mut cursor_mm = 0.0;
    widths
        .into_iter()
        .map(|(kind, width_mm)| {
            let zone = DeckZone {
                kind,
                start_px: deck_left_px + cursor_mm * scale,
                width_px: width_mm * scale,
                width_mm,
            };
            cursor_mm += width_mm;
            zone
        })
        .collect()
}

// ============================================================================
// Girder positions
// ============================================================================

/// Girder center-lines (px), left to right.
///
/// Never fails: a degenerate range collapses every girder onto its midpoint.
/// Outer girders are pulled in so the drawn flange stays on the deck. With the
/// default flange exaggeration the drawn half-flange (337.5 mm) is wider than
/// the minimum overhang, so this routinely moves the outer girders slightly.
pub fn girder_positions(
    params: &BridgeParameters,
    deck_total_mm: f64,
    deck_left_px: f64,
    scale: f64,
    flange_half_px: f64,
) -> Vec<f64> {
    let n = params.girder_count();
    let deck_right_px = deck_left_px + deck_total_mm * scale;
    let deck_mid_px = (deck_left_px + deck_right_px) / 2.0;

    let mut positions: Vec<f64> = if n == 1 {
        vec![deck_mid_px]
    } else {
        let first_mm = params.deck_overhang_mm;
        let last_mm = deck_total_mm - params.deck_overhang_mm;
        if first_mm > last_mm {
            warn!(
                overhang = params.deck_overhang_mm,
                deck_total_mm, "Overhang exceeds half the deck, collapsing girders"
            );
            vec![deck_mid_px; n]
        } else {
            let step_mm = (last_mm - first_mm) / (n - 1) as f64;
            (0..n)
                .map(|i| deck_left_px + (first_mm + i as f64 * step_mm) * scale)
                .collect()
        }
    };

    let min_x = deck_left_px + flange_half_px;
    let max_x = deck_right_px - flange_half_px;
    if min_x > max_x {
        warn!(min_x, max_x, "Deck narrower than a girder flange, collapsing girders");
        return vec![deck_mid_px; n];
    }

    let mut clamped = false;
    for x in positions.iter_mut() {
        let c = x.clamp(min_x, max_x);
        if (c - *x).abs() > 1e-9 {
            clamped = true;
        }
        *x = c;
    }
    if clamped {
        debug!(min_x, max_x, "Girder positions clamped onto the deck");
    }

    positions
}

// ============================================================================
// Layout
// ============================================================================

/// A crash barrier as placed on the deck
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BarrierPlacement {
    /// Footprint on the deck top, full barrier height
    pub bounds: Rect,
    pub facing: BarrierFacing,
}

/// Everything the cross-section engine placed, plus the primitives.
///
/// The named positions are what the dimension and label passes anchor to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSectionLayout {
    pub frame: CrossSectionFrame,
    pub deck_left_px: f64,
    pub deck_right_px: f64,
    pub deck_top_y: f64,
    pub deck_bottom_y: f64,
    pub girder_top_y: f64,
    pub footpath_top_y: f64,
    /// Drawn girder depth (px)
    pub girder_depth_px: f64,
    /// Drawn flange width (px)
    pub flange_width_px: f64,
    pub zones: Vec<DeckZone>,
    pub girder_positions: Vec<f64>,
    pub barriers: Vec<BarrierPlacement>,
    pub railings: Vec<Rect>,
    /// Two per girder, left then right of the web
    pub stiffeners: Vec<Rect>,
    pub primitives: Vec<DrawPrimitive>,
}

impl CrossSectionLayout {
    /// Zones of one kind, left to right
    pub fn zones_of(&self, kind: ZoneKind) -> impl Iterator<Item = &DeckZone> {
        self.zones.iter().filter(move |z| z.kind == kind)
    }

    /// Zone ends at the deck edges belonging to footpaths: (left, right)
    pub fn edge_footpaths(&self) -> (Option<&DeckZone>, Option<&DeckZone>) {
        let left = self.zones.first().filter(|z| z.kind == ZoneKind::Footpath);
        let right = self.zones.last().filter(|z| z.kind == ZoneKind::Footpath);
        (left, right)
    }
}

/// Lay out the cross-section.
///
/// `params` should already be normalized and balanced. The function does not
/// re-check that; it only guarantees the geometry stays on the deck.
pub fn layout_cross_section(
    params: &BridgeParameters,
    deck: &DeckWidth,
    frame: CrossSectionFrame,
    settings: &DrawingSettings,
) -> CrossSectionLayout {
    let scale = frame.scale;
    let girder = &settings.girder;
    let exag = &settings.girder_exaggeration;

    // === Vertical layering ===
    let baseline = frame.baseline_y;
    let girder_depth_px = girder.depth_mm * exag.depth * scale;
    let girder_top_y = baseline - girder_depth_px;
    let deck_bottom_y = girder_top_y;
    let deck_thick_px = params.deck_thickness_mm * scale;
    let deck_top_y = deck_bottom_y - deck_thick_px;
    let fp_thick_px = params.footpath_thickness_mm * scale;
    let footpath_top_y = deck_bottom_y - fp_thick_px;

    // === Horizontal extent ===
    let deck_width_px = deck.total_width_mm * scale;
    let deck_left_px = frame.center_x - deck_width_px / 2.0;
    let deck_right_px = deck_left_px + deck_width_px;

    let zones = deck_zones(params, deck_left_px, scale);

    let flange_width_px = girder.flange_width_mm * exag.flange_width * scale;
    let flange_half_px = girder.flange_half_width_mm() * exag.flange_width * scale;
    let positions =
        girder_positions(params, deck.total_width_mm, deck_left_px, scale, flange_half_px);

    let mut primitives = Vec::new();

    // Deck slab outline
    primitives.push(DrawPrimitive::rect(
        DrawRole::Deck,
        Rect::new(deck_left_px, deck_top_y, deck_width_px, deck_thick_px),
    ));

    // Carriageway and median fills, barrier bases, footpaths
    for zone in &zones {
        let prim = match zone.kind {
            ZoneKind::Carriageway => DrawPrimitive::rect(
                DrawRole::Carriageway,
                Rect::new(zone.start_px, deck_top_y, zone.width_px, deck_thick_px),
            ),
            ZoneKind::Median => DrawPrimitive::rect(
                DrawRole::Median,
                Rect::new(zone.start_px, deck_top_y, zone.width_px, deck_thick_px),
            ),
            ZoneKind::CrashBarrier => DrawPrimitive::rect(
                DrawRole::CrashBarrier,
                Rect::new(zone.start_px, deck_top_y, zone.width_px, deck_thick_px),
            ),
            ZoneKind::Footpath => {
                if zone.width_px <= 0.0 {
                    continue;
                }
                DrawPrimitive::rect(
                    DrawRole::Footpath,
                    Rect::new(zone.start_px, footpath_top_y, zone.width_px, fp_thick_px),
                )
            }
        };
        primitives.push(prim);
    }

    // Crash barrier profiles standing on the deck top
    let barriers = place_barriers(params, &zones, scale);
    for barrier in &barriers {
        let outline = settings.crash_barrier.outline(
            barrier.bounds.x,
            deck_top_y,
            barrier.bounds.width,
            scale,
            barrier.facing,
        );
        primitives.push(DrawPrimitive::polygon(DrawRole::CrashBarrier, outline));
    }
    let barrier_height_px = settings.crash_barrier.height_mm * scale;
    let barriers: Vec<BarrierPlacement> = barriers
        .into_iter()
        .map(|b| BarrierPlacement {
            bounds: Rect::new(
                b.bounds.x,
                deck_top_y - barrier_height_px,
                b.bounds.width,
                barrier_height_px,
            ),
            facing: b.facing,
        })
        .collect();

    // Deck soffit
    primitives.push(DrawPrimitive::line(
        DrawRole::Deck,
        Point::new(deck_left_px, deck_bottom_y),
        Point::new(deck_right_px, deck_bottom_y),
    ));

    // X-bracing under the girders, one panel per bay
    for pair in positions.windows(2) {
        let (x1, x2) = (pair[0], pair[1]);
        primitives.push(DrawPrimitive::line(
            DrawRole::CrossBracing,
            Point::new(x1, girder_top_y),
            Point::new(x2, baseline),
        ));
        primitives.push(DrawPrimitive::line(
            DrawRole::CrossBracing,
            Point::new(x1, baseline),
            Point::new(x2, girder_top_y),
        ));
    }

    // Girders and stiffeners
    let d = girder_depth_px;
    let bf = flange_width_px;
    let tf = girder.flange_thickness_mm * exag.flange_thickness * scale;
    let tw = girder.web_thickness_mm * exag.web_thickness * scale;
    let web_h = (d - 2.0 * tf).max(0.0);
    let stiff_w = girder.stiffener_width_mm() * exag.flange_width * scale;
    let stiff_h = (girder.stiffener_height_mm() * exag.depth * scale).min(web_h);
    let stiff_top = baseline - d + tf;

    let mut stiffeners = Vec::with_capacity(positions.len() * 2);
    for &x in &positions {
        let bottom_flange = Rect::new(x - bf / 2.0, baseline - tf, bf, tf);
        let web = Rect::new(x - tw / 2.0, baseline - d + tf, tw, web_h);
        let top_flange = Rect::new(x - bf / 2.0, baseline - d, bf, tf);
        for part in [bottom_flange, web, top_flange] {
            primitives.push(DrawPrimitive::rect(DrawRole::Girder, part));
        }

        let left = Rect::new(x - tw / 2.0 - stiff_w, stiff_top, stiff_w, stiff_h);
        let right = Rect::new(x + tw / 2.0, stiff_top, stiff_w, stiff_h);
        primitives.push(DrawPrimitive::rect(DrawRole::Stiffener, left));
        primitives.push(DrawPrimitive::rect(DrawRole::Stiffener, right));
        stiffeners.push(left);
        stiffeners.push(right);
    }

    // Railings on the outer footpath edges, growing inward
    let railing_w_px = settings.railing.drawn_width_mm(params.railing_width_mm) * scale;
    let railing_h_px = params.railing_height_mm * scale;
    let mut railings = Vec::new();
    let left_fp = zones.first().filter(|z| z.kind == ZoneKind::Footpath && z.width_px > 0.0);
    let right_fp = zones.last().filter(|z| z.kind == ZoneKind::Footpath && z.width_px > 0.0);
    if let Some(fp) = left_fp {
        railings.push(Rect::new(
            fp.start_px,
            footpath_top_y - railing_h_px,
            railing_w_px,
            railing_h_px,
        ));
    }
    if let Some(fp) = right_fp {
        railings.push(Rect::new(
            fp.end_px() - railing_w_px,
            footpath_top_y - railing_h_px,
            railing_w_px,
            railing_h_px,
        ));
    }
    for rail in &railings {
        primitives.push(DrawPrimitive::rect(DrawRole::Railing, *rail));
        let inset = (rail.width / 4.0).min(2.0);
        let count = settings.railing.rail_count;
        for i in 1..=count {
            let y = footpath_top_y - rail.height * f64::from(i) / f64::from(count + 1);
            primitives.push(DrawPrimitive::line(
                DrawRole::Railing,
                Point::new(rail.left() + inset, y),
                Point::new(rail.right() - inset, y),
            ));
        }
    }

    debug!(
        scale,
        girders = positions.len(),
        zones = zones.len(),
        primitives = primitives.len(),
        "Laid out cross-section"
    );

    CrossSectionLayout {
        frame,
        deck_left_px,
        deck_right_px,
        deck_top_y,
        deck_bottom_y,
        girder_top_y,
        footpath_top_y,
        girder_depth_px,
        flange_width_px,
        zones,
        girder_positions: positions,
        barriers,
        railings,
        stiffeners,
        primitives,
    }
}

/// Barrier footprints (x extent only; y is filled in by the caller).
///
/// Edge barriers fill their zones. A median carries one barrier at each edge
/// with its traffic face toward the adjacent carriageway.
fn place_barriers(
    params: &BridgeParameters,
    zones: &[DeckZone],
    scale: f64,
) -> Vec<BarrierPlacement> {
    let edge_barriers: Vec<&DeckZone> =
        zones.iter().filter(|z| z.kind == ZoneKind::CrashBarrier).collect();
    let mut placed = Vec::with_capacity(4);

    if let Some(left) = edge_barriers.first() {
        placed.push(BarrierPlacement {
            bounds: Rect::new(left.start_px, 0.0, left.width_px, 0.0),
            facing: BarrierFacing::Right,
        });
    }

    if let Some(median) = zones.iter().find(|z| z.kind == ZoneKind::Median) {
        let w = (params.crash_barrier_width_mm * scale).min(median.width_px / 2.0);
        if w > 0.0 {
            placed.push(BarrierPlacement {
                bounds: Rect::new(median.start_px, 0.0, w, 0.0),
                facing: BarrierFacing::Left,
            });
            placed.push(BarrierPlacement {
                bounds: Rect::new(median.end_px() - w, 0.0, w, 0.0),
                facing: BarrierFacing::Right,
            });
        }
    }

    if edge_barriers.len() > 1 {
        if let Some(right) = edge_barriers.last() {
            placed.push(BarrierPlacement {
                bounds: Rect::new(right.start_px, 0.0, right.width_px, 0.0),
                facing: BarrierFacing::Left,
            });
        }
    }

    placed
}
