//! # Deck Width
//!
//! Total deck width from the transverse components:
//!
//! ```text
//! no median:   carriageway + 2·crash_barrier + n_fp·footpath
//! with median: 2·carriageway + median + 2·crash_barrier + n_fp·footpath
//! ```
//!
//! The railing is drawn inward from the deck edge on top of the footpath and
//! never widens the deck.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::parameters::BridgeParameters;

/// Deck width and the number of footpaths that went into it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeckWidth {
    pub total_width_mm: f64,
    pub footpath_count: u32,
}

/// Compute the total deck width.
///
/// # Example
///
/// ```rust
/// use bridge_core::layout::deck_width::compute_deck_total_width;
/// use bridge_core::parameters::BridgeParameters;
///
/// let width = compute_deck_total_width(&BridgeParameters::default());
/// assert_eq!(width.total_width_mm, 14500.0);
/// assert_eq!(width.footpath_count, 2);
/// ```
pub fn compute_deck_total_width(params: &BridgeParameters) -> DeckWidth {
    let footpath_count = params.footpath_config.count();
    let carriageways = if params.median_present {
        2.0 * params.carriageway_width_mm + params.effective_median_mm()
    } else {
        params.carriageway_width_mm
    };

    let total_width_mm = carriageways
        + 2.0 * params.crash_barrier_width_mm
        + f64::from(footpath_count) * params.footpath_width_mm;

    debug!(total_width_mm, footpath_count, median = params.median_present, "Computed deck width");

    DeckWidth {
        total_width_mm,
        footpath_count,
    }
}
