//! # Layout Pipeline
//!
//! One recompute runs start to finish, synchronously:
//!
//! ```text
//! parameters ─ normalized ─> deck_width ─> balancer ─┬─> cross_section ─┐
//!                                                    └─> top_view ──────┴─> dimensions + labels
//! ```
//!
//! Every stage is a pure function over an immutable snapshot. The balancer's
//! adjustments come back as part of the result (balanced parameters plus
//! notices); the caller decides whether to keep them.
//!
//! ## Example
//!
//! ```rust
//! use bridge_core::layout::{compute_drawing, ViewKind};
//! use bridge_core::parameters::{BridgeParameters, EditedField};
//! use bridge_core::settings::{DrawingSettings, Viewport};
//!
//! let drawing = compute_drawing(
//!     &BridgeParameters::default(),
//!     EditedField::Other,
//!     ViewKind::CrossSection,
//!     Viewport::new(1200.0, 800.0),
//!     &DrawingSettings::default(),
//! );
//!
//! assert_eq!(drawing.parameters.deck_overhang_mm, 2000.0);
//! assert!(!drawing.notices.is_empty());
//! for line in drawing.status_messages() {
//!     println!("{line}");
//! }
//! ```

pub mod balancer;
pub mod cross_section;
pub mod deck_width;
pub mod dimensions;
pub mod labels;
pub mod pick;
pub mod top_view;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::info;

use crate::errors::BridgeError;
use crate::geometry::{DrawPrimitive, DrawRole};
use crate::parameters::{BridgeParameters, EditedField};
use crate::settings::{DrawingSettings, Viewport};

use balancer::{balance, AdjustmentNotice};
use cross_section::{layout_cross_section, CrossSectionFrame};
use deck_width::{compute_deck_total_width, DeckWidth};
use dimensions::{cross_section_dimensions, top_view_dimensions, DimensionAnnotation};
use labels::{cross_section_labels, top_view_labels};
use pick::{PickIndex, DEFAULT_LINE_TOLERANCE_PX};
use top_view::{layout_top_view, TopViewFrame};

/// Which view to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewKind {
    #[default]
    CrossSection,
    Top,
}

impl FromStr for ViewKind {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cross-section" | "cross_section" | "section" => Ok(ViewKind::CrossSection),
            "top" | "top-view" | "plan" => Ok(ViewKind::Top),
            other => Err(BridgeError::invalid_input(
                "view",
                other,
                "Expected cross-section or top",
            )),
        }
    }
}

impl std::fmt::Display for ViewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewKind::CrossSection => f.write_str("cross-section"),
            ViewKind::Top => f.write_str("top"),
        }
    }
}

/// Parameters after normalization and balancing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolved {
    pub parameters: BridgeParameters,
    pub deck: DeckWidth,
    /// Normalization notices first, then balancer notices
    pub notices: Vec<AdjustmentNotice>,
}

/// Normalize, size the deck and balance overhang against spacing
pub fn resolve(params: &BridgeParameters, edited: EditedField) -> Resolved {
    let normalized = params.normalized();
    let deck = compute_deck_total_width(&normalized.parameters);
    let outcome = balance(&normalized.parameters, edited, deck.total_width_mm);

    let mut notices = normalized.notices;
    notices.extend(outcome.notices.iter().cloned());

    Resolved {
        parameters: outcome.apply_to(&normalized.parameters),
        deck,
        notices,
    }
}

/// Result of one full recompute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    pub view: ViewKind,
    /// The balanced snapshot the geometry was drawn from
    pub parameters: BridgeParameters,
    pub deck: DeckWidth,
    pub notices: Vec<AdjustmentNotice>,
    pub dimensions: Vec<DimensionAnnotation>,
    /// Components, then dimension geometry, then labels
    pub primitives: Vec<DrawPrimitive>,
}

impl Drawing {
    /// One status line per notice
    pub fn status_messages(&self) -> Vec<String> {
        self.notices.iter().map(AdjustmentNotice::message).collect()
    }

    /// Hover regions for the components in this drawing
    pub fn pick_index(&self) -> PickIndex {
        PickIndex::from_primitives(&self.primitives, DEFAULT_LINE_TOLERANCE_PX)
    }

    /// Primitives with the given role
    pub fn primitives_of(&self, role: DrawRole) -> impl Iterator<Item = &DrawPrimitive> {
        self.primitives.iter().filter(move |p| p.role == role)
    }
}

/// Full recompute: resolve the parameters, fit the view into the viewport,
/// lay it out and annotate it.
pub fn compute_drawing(
    params: &BridgeParameters,
    edited: EditedField,
    view: ViewKind,
    viewport: Viewport,
    settings: &DrawingSettings,
) -> Drawing {
    let resolved = resolve(params, edited);
    match view {
        ViewKind::CrossSection => {
            let frame = CrossSectionFrame::fit(
                viewport,
                &resolved.parameters,
                resolved.deck.total_width_mm,
                settings,
            );
            draw_cross_section(resolved, frame, settings)
        }
        ViewKind::Top => {
            let frame = TopViewFrame::fit(viewport, &resolved.parameters, settings);
            draw_top_view(resolved, frame, viewport, settings)
        }
    }
}

/// Draw the cross-section in a caller-chosen frame
pub fn draw_cross_section(
    resolved: Resolved,
    frame: CrossSectionFrame,
    settings: &DrawingSettings,
) -> Drawing {
    let params = &resolved.parameters;
    let layout = layout_cross_section(params, &resolved.deck, frame, settings);
    let dimensions =
        cross_section_dimensions(params, &resolved.deck, &layout, &settings.dimensions);

    let mut primitives = layout.primitives.clone();
    for dim in &dimensions {
        primitives.extend(dim.to_primitives(&settings.dimensions));
    }
    if settings.show_labels {
        primitives.extend(cross_section_labels(params, &layout));
    }

    finish(ViewKind::CrossSection, resolved, dimensions, primitives, frame.scale)
}

/// Draw the top view in a caller-chosen frame; `viewport` anchors the notes
pub fn draw_top_view(
    resolved: Resolved,
    frame: TopViewFrame,
    viewport: Viewport,
    settings: &DrawingSettings,
) -> Drawing {
    let params = &resolved.parameters;
    let layout = layout_top_view(params, frame, settings);
    let dimensions = top_view_dimensions(params, &layout, &settings.dimensions);

    let mut primitives = layout.primitives.clone();
    for dim in &dimensions {
        primitives.extend(dim.to_primitives(&settings.dimensions));
    }
    if settings.show_labels {
        primitives.extend(top_view_labels(params, &layout, &settings.dimensions, viewport.height));
    }

    finish(ViewKind::Top, resolved, dimensions, primitives, frame.scale)
}

fn finish(
    view: ViewKind,
    resolved: Resolved,
    dimensions: Vec<DimensionAnnotation>,
    primitives: Vec<DrawPrimitive>,
    scale: f64,
) -> Drawing {
    info!(
        %view,
        scale,
        primitives = primitives.len(),
        dimensions = dimensions.len(),
        notices = resolved.notices.len(),
        "Recomputed drawing"
    );

    Drawing {
        view,
        parameters: resolved.parameters,
        deck: resolved.deck,
        notices: resolved.notices,
        dimensions,
        primitives,
    }
}
