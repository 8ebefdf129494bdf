//! # Overhang / Spacing Balancer
//!
//! Keeps the transverse girder layout consistent with the deck:
//!
//! ```text
//! deck_total = 2·overhang + (n − 1)·spacing        (n > 1)
//! deck_total = 2·overhang                          (n = 1)
//! ```
//!
//! Which side of the identity moves depends on what the user just edited:
//!
//! | Edited     | Recomputed | Bounds                              |
//! |------------|------------|-------------------------------------|
//! | `overhang` | spacing    | spacing clamped to [1000, 24000] mm |
//! | `spacing`  | overhang   | overhang clamped to [300, 2000] mm  |
//! | `other`    | overhang   | out of bounds: pin overhang, recompute spacing |
//!
//! The solve is closed form and single pass. Changes of 1 mm or less in the
//! overhang/spacing branches are not committed, which stops floating point
//! noise from bouncing a value back and forth between edits.
//!
//! The balancer returns new values; it never touches the caller's snapshot.
//!
//! ## Example
//!
//! ```rust
//! use bridge_core::layout::balancer::balance;
//! use bridge_core::parameters::{BridgeParameters, EditedField};
//!
//! // 14.5 m deck, 4 girders at 2.75 m → overhang would be 3.125 m (> 2.0 m max)
//! let params = BridgeParameters::default();
//! let outcome = balance(&params, EditedField::Other, 14_500.0);
//!
//! assert_eq!(outcome.overhang_mm, 2000.0);
//! assert_eq!(outcome.spacing_mm, 3500.0);
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::parameters::{
    BridgeParameters, EditedField, MAX_BRACING_BAYS, MAX_GIRDER_SPACING_MM, MAX_OVERHANG_MM,
    MIN_GIRDER_SPACING_MM, MIN_OVERHANG_MM,
};
use crate::units::{Meters, Millimeters};

/// Changes at or below this size (mm) are not committed
pub const HYSTERESIS_MM: f64 = 1.0;

// Sub-micron differences in the direct overhang assignment are float noise.
const NOISE_MM: f64 = 1e-6;

/// A field the engine changed on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustedField {
    DeckOverhang,
    GirderSpacing,
    CrossBracingSpacing,
}

impl AdjustedField {
    pub fn display_name(&self) -> &'static str {
        match self {
            AdjustedField::DeckOverhang => "Deck Overhang",
            AdjustedField::GirderSpacing => "Girder Spacing",
            AdjustedField::CrossBracingSpacing => "Cross Bracing Spacing",
        }
    }
}

/// Why a field was changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentReason {
    /// Recomputed so the girders fill the deck width exactly
    MatchDeckWidth,
    /// The overhang the deck needs is below the minimum; overhang pinned
    OverhangBelowMinimum,
    /// The overhang the deck needs is above the maximum; overhang pinned
    OverhangAboveMaximum,
    /// A single girder sits on the deck center line
    SingleGirder,
    /// Girder spacing was outside [1000, 24000] mm
    SpacingOutOfRange,
    /// Cross-bracing spacing cannot exceed the span
    ClampedToSpan,
    /// Cross-bracing spacing would give more bays than can be drawn
    BracingBayLimit,
}

impl AdjustmentReason {
    pub fn describe(&self) -> String {
        match self {
            AdjustmentReason::MatchDeckWidth => "to match deck width".to_string(),
            AdjustmentReason::OverhangBelowMinimum => {
                let min = Meters::from(Millimeters(MIN_OVERHANG_MM));
                format!("overhang held at the {min} minimum")
            }
            AdjustmentReason::OverhangAboveMaximum => {
                let max = Meters::from(Millimeters(MAX_OVERHANG_MM));
                format!("overhang held at the {max} maximum")
            }
            AdjustmentReason::SingleGirder => "single girder on the deck center line".to_string(),
            AdjustmentReason::SpacingOutOfRange => format!(
                "spacing held between {} and {}",
                Meters::from(Millimeters(MIN_GIRDER_SPACING_MM)),
                Meters::from(Millimeters(MAX_GIRDER_SPACING_MM))
            ),
            AdjustmentReason::ClampedToSpan => "limited to the span length".to_string(),
            AdjustmentReason::BracingBayLimit => {
                format!("limited to {MAX_BRACING_BAYS} bracing bays")
            }
        }
    }
}

/// Notice for a value the caller did not edit but the engine changed.
///
/// Meant for a status line; not part of the geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentNotice {
    pub field: AdjustedField,
    /// New value in millimeters
    pub new_value: f64,
    pub reason: AdjustmentReason,
}

impl AdjustmentNotice {
    pub fn new(field: AdjustedField, new_value: f64, reason: AdjustmentReason) -> Self {
        AdjustmentNotice {
            field,
            new_value,
            reason,
        }
    }

    /// Status text, e.g. "Girder Spacing adjusted to 3.500m to match deck width"
    pub fn message(&self) -> String {
        format!(
            "{} adjusted to {:.3}m {}",
            self.field.display_name(),
            Meters::from(Millimeters(self.new_value)).value(),
            self.reason.describe()
        )
    }
}

/// Result of one balancer pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceOutcome {
    pub overhang_mm: f64,
    pub spacing_mm: f64,
    pub notices: Vec<AdjustmentNotice>,
}

impl BalanceOutcome {
    /// Copy of `params` with the balanced overhang and spacing
    pub fn apply_to(&self, params: &BridgeParameters) -> BridgeParameters {
        BridgeParameters {
            deck_overhang_mm: self.overhang_mm,
            girder_spacing_mm: self.spacing_mm,
            ..params.clone()
        }
    }

    /// Whether anything was changed
    pub fn changed(&self) -> bool {
        !self.notices.is_empty()
    }
}

/// Resolve overhang and spacing against the deck width.
///
/// Incoming overhang and spacing are first clamped to their bounds (n > 1), so
/// every output respects them whatever the caller passes. A notice is emitted
/// for each field that ends up more than 1 mm away from the caller's value.
///
/// Pure and idempotent: feeding the outcome back in with the same
/// `edited` field produces no further change.
pub fn balance(
    params: &BridgeParameters,
    edited: EditedField,
    deck_total_mm: f64,
) -> BalanceOutcome {
    let n = params.girder_count();

    if n == 1 {
        // Spacing means nothing for one girder; it sits on the center line.
        let centered = deck_total_mm / 2.0;
        let mut notices = Vec::new();
        if (centered - params.deck_overhang_mm).abs() > HYSTERESIS_MM {
            notices.push(AdjustmentNotice::new(
                AdjustedField::DeckOverhang,
                centered,
                AdjustmentReason::SingleGirder,
            ));
        }
        debug!(deck_total_mm, overhang = centered, "Single girder centered");
        return finish(centered, params.girder_spacing_mm, notices);
    }

    let bays = (n - 1) as f64;
    let mut overhang = clamp_overhang(params.deck_overhang_mm);
    let mut spacing = clamp_spacing(params.girder_spacing_mm);
    let mut overhang_reason = if params.deck_overhang_mm < MIN_OVERHANG_MM {
        AdjustmentReason::OverhangBelowMinimum
    } else {
        AdjustmentReason::OverhangAboveMaximum
    };
    let mut spacing_reason = AdjustmentReason::SpacingOutOfRange;

    match edited {
        EditedField::Overhang => {
            let new_spacing = clamp_spacing((deck_total_mm - 2.0 * overhang) / bays);
            debug!(overhang, new_spacing, "Overhang edited, recomputing spacing");
            if (new_spacing - spacing).abs() > HYSTERESIS_MM {
                spacing = new_spacing;
                spacing_reason = AdjustmentReason::MatchDeckWidth;
            }
        }
        EditedField::Spacing => {
            let new_overhang = clamp_overhang((deck_total_mm - spacing * bays) / 2.0);
            debug!(spacing, new_overhang, "Spacing edited, recomputing overhang");
            if (new_overhang - overhang).abs() > HYSTERESIS_MM {
                overhang = new_overhang;
                overhang_reason = AdjustmentReason::MatchDeckWidth;
            }
        }
        EditedField::Other => {
            let required = (deck_total_mm - spacing * bays) / 2.0;
            let pinned = if required < MIN_OVERHANG_MM {
                Some((MIN_OVERHANG_MM, AdjustmentReason::OverhangBelowMinimum))
            } else if required > MAX_OVERHANG_MM {
                Some((MAX_OVERHANG_MM, AdjustmentReason::OverhangAboveMaximum))
            } else {
                None
            };

            match pinned {
                Some((bound, reason)) => {
                    // Always committed: the pinned pair must close the identity
                    spacing = clamp_spacing((deck_total_mm - 2.0 * bound) / bays);
                    overhang = bound;
                    overhang_reason = reason;
                    spacing_reason = reason;
                    debug!(required, bound, spacing, "Required overhang out of bounds, pinning");
                }
                None => {
                    debug!(required, "Required overhang within bounds");
                    if (required - overhang).abs() > NOISE_MM {
                        overhang = required;
                    }
                    overhang_reason = AdjustmentReason::MatchDeckWidth;
                }
            }
        }
    }

    let mut notices = Vec::new();
    if (spacing - params.girder_spacing_mm).abs() > HYSTERESIS_MM {
        notices.push(AdjustmentNotice::new(AdjustedField::GirderSpacing, spacing, spacing_reason));
    }
    if (overhang - params.deck_overhang_mm).abs() > HYSTERESIS_MM {
        notices.push(AdjustmentNotice::new(
            AdjustedField::DeckOverhang,
            overhang,
            overhang_reason,
        ));
    }
    finish(overhang, spacing, notices)
}

fn finish(overhang_mm: f64, spacing_mm: f64, notices: Vec<AdjustmentNotice>) -> BalanceOutcome {
    for notice in &notices {
        info!(field = ?notice.field, new_value = notice.new_value, "{}", notice.message());
    }
    BalanceOutcome {
        overhang_mm,
        spacing_mm,
        notices,
    }
}

fn clamp_spacing(spacing: f64) -> f64 {
    spacing.clamp(MIN_GIRDER_SPACING_MM, MAX_GIRDER_SPACING_MM)
}

fn clamp_overhang(overhang: f64) -> f64 {
    overhang.clamp(MIN_OVERHANG_MM, MAX_OVERHANG_MM)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::deck_width::compute_deck_total_width;
    use approx::assert_abs_diff_eq;

    fn residual(outcome: &BalanceOutcome, n: usize, deck_total: f64) -> f64 {
        (2.0 * outcome.overhang_mm + (n - 1) as f64 * outcome.spacing_mm - deck_total).abs()
    }

    #[test]
    fn test_default_example_pins_max_overhang() {
        let params = BridgeParameters::default();
        let deck = compute_deck_total_width(&params).total_width_mm;
        assert_eq!(deck, 14_500.0);

        let outcome = balance(&params, EditedField::Other, deck);
        assert_abs_diff_eq!(outcome.overhang_mm, 2000.0);
        assert_abs_diff_eq!(outcome.spacing_mm, 3500.0, epsilon = 1e-9);
        assert!(outcome.notices.iter().any(|n| {
            n.field == AdjustedField::GirderSpacing
                && n.reason == AdjustmentReason::OverhangAboveMaximum
        }));
        assert!(residual(&outcome, 4, deck) < 1.0);
    }

    #[test]
    fn test_required_below_minimum_pins_min_overhang() {
        let params = BridgeParameters {
            girder_spacing_mm: 4800.0,
            ..Default::default()
        };
        // required = (14500 - 14400) / 2 = 50 < 300
        let outcome = balance(&params, EditedField::Other, 14_500.0);
        assert_eq!(outcome.overhang_mm, MIN_OVERHANG_MM);
        assert_abs_diff_eq!(outcome.spacing_mm, (14_500.0 - 600.0) / 3.0, epsilon = 1e-9);
        assert!(residual(&outcome, 4, 14_500.0) < 1.0);
    }

    #[test]
    fn test_required_in_range_sets_overhang() {
        let params = BridgeParameters {
            girder_spacing_mm: 4000.0,
            ..Default::default()
        };
        // required = (14500 - 12000) / 2 = 1250
        let outcome = balance(&params, EditedField::Other, 14_500.0);
        assert_eq!(outcome.overhang_mm, 1250.0);
        assert_eq!(outcome.spacing_mm, 4000.0);
        assert_eq!(outcome.notices.len(), 1);
        assert_eq!(outcome.notices[0].field, AdjustedField::DeckOverhang);
    }

    #[test]
    fn test_overhang_edit_recomputes_spacing() {
        let params = BridgeParameters {
            deck_overhang_mm: 1250.0,
            girder_spacing_mm: 2750.0,
            ..Default::default()
        };
        let outcome = balance(&params, EditedField::Overhang, 14_500.0);
        assert_eq!(outcome.overhang_mm, 1250.0);
        assert_eq!(outcome.spacing_mm, 4000.0);
        assert!(outcome.notices[0].message().starts_with("Girder Spacing adjusted to 4.000m"));
    }

    #[test]
    fn test_overhang_edit_clamps_spacing() {
        let params = BridgeParameters {
            num_girders: 12,
            deck_overhang_mm: 2000.0,
            ..Default::default()
        };
        // (14500 - 4000) / 11 = 954.5 → clamped to 1000
        let outcome = balance(&params, EditedField::Overhang, 14_500.0);
        assert_eq!(outcome.spacing_mm, MIN_GIRDER_SPACING_MM);
    }

    #[test]
    fn test_spacing_edit_recomputes_overhang() {
        let params = BridgeParameters {
            girder_spacing_mm: 4200.0,
            ..Default::default()
        };
        // (14500 - 12600) / 2 = 950
        let outcome = balance(&params, EditedField::Spacing, 14_500.0);
        assert_eq!(outcome.overhang_mm, 950.0);
        assert_eq!(outcome.spacing_mm, 4200.0);
    }

    #[test]
    fn test_spacing_edit_clamps_overhang() {
        let params = BridgeParameters {
            girder_spacing_mm: 1000.0,
            ..Default::default()
        };
        // (14500 - 3000) / 2 = 5750 → 2000
        let outcome = balance(&params, EditedField::Spacing, 14_500.0);
        assert_eq!(outcome.overhang_mm, MAX_OVERHANG_MM);
    }

    #[test]
    fn test_hysteresis_suppresses_small_changes() {
        let params = BridgeParameters {
            deck_overhang_mm: 1250.0,
            girder_spacing_mm: 4000.4,
            ..Default::default()
        };
        let outcome = balance(&params, EditedField::Overhang, 14_500.0);
        assert_eq!(outcome.spacing_mm, 4000.4);
        assert!(!outcome.changed());
    }

    #[test]
    fn test_single_girder_ignores_spacing() {
        for edited in [EditedField::Overhang, EditedField::Spacing, EditedField::Other] {
            let params = BridgeParameters {
                num_girders: 1,
                girder_spacing_mm: 9999.0,
                ..Default::default()
            };
            let outcome = balance(&params, edited, 14_500.0);
            assert_eq!(outcome.overhang_mm, 7250.0);
            assert_eq!(outcome.spacing_mm, 9999.0);
        }
    }

    #[test]
    fn test_zero_girders_behaves_as_one() {
        let params = BridgeParameters {
            num_girders: 0,
            ..Default::default()
        };
        let outcome = balance(&params, EditedField::Other, 10_000.0);
        assert_eq!(outcome.overhang_mm, 5000.0);
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let cases = [
            BridgeParameters::default(),
            BridgeParameters {
                girder_spacing_mm: 4800.0,
                ..Default::default()
            },
            BridgeParameters {
                num_girders: 7,
                girder_spacing_mm: 1900.0,
                carriageway_width_mm: 16_000.0,
                ..Default::default()
            },
            BridgeParameters {
                num_girders: 12,
                footpath_config: crate::parameters::FootpathConfig::None,
                ..Default::default()
            },
        ];

        for params in cases {
            let deck = compute_deck_total_width(&params).total_width_mm;
            let first = balance(&params, EditedField::Other, deck);
            let again = balance(&first.apply_to(&params), EditedField::Other, deck);
            assert_eq!(again.overhang_mm, first.overhang_mm);
            assert_eq!(again.spacing_mm, first.spacing_mm);
            assert!(again.notices.is_empty(), "unexpected notices: {:?}", again.notices);
        }
    }

    #[test]
    fn test_balance_and_bounds_over_parameter_grid() {
        for n in 2..=12u32 {
            for spacing in [1000.0, 1800.0, 2750.0, 3500.0, 5000.0] {
                for carriageway in [7500.0, 10_500.0, 14_000.0] {
                    let params = BridgeParameters {
                        num_girders: n,
                        girder_spacing_mm: spacing,
                        carriageway_width_mm: carriageway,
                        ..Default::default()
                    };
                    let deck = compute_deck_total_width(&params).total_width_mm;
                    let outcome = balance(&params, EditedField::Other, deck);

                    assert!((MIN_OVERHANG_MM..=MAX_OVERHANG_MM).contains(&outcome.overhang_mm));
                    let spacing_range = MIN_GIRDER_SPACING_MM..=MAX_GIRDER_SPACING_MM;
                    assert!(spacing_range.contains(&outcome.spacing_mm));

                    // Only feasible layouts can close the identity
                    let feasible =
                        deck - 2.0 * MIN_OVERHANG_MM >= (n - 1) as f64 * MIN_GIRDER_SPACING_MM;
                    if feasible {
                        let r = residual(&outcome, n as usize, deck);
                        assert!(r < 1.0, "n={n} s={spacing} cw={carriageway}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_pinned_spacing_always_closes_the_deck() {
        // required = (14500 - 3 * 3499) / 2 = 2001.5, only 1 mm from the pinned spacing
        let params = BridgeParameters {
            girder_spacing_mm: 3499.0,
            ..Default::default()
        };
        let outcome = balance(&params, EditedField::Other, 14_500.0);
        assert_eq!(outcome.overhang_mm, MAX_OVERHANG_MM);
        assert_abs_diff_eq!(outcome.spacing_mm, 3500.0, epsilon = 1e-9);
        assert!(residual(&outcome, 4, 14_500.0) < 1.0);

        // Sub-millimeter spacing change on each of 11 bays
        let params = BridgeParameters {
            num_girders: 12,
            girder_spacing_mm: 1264.5,
            ..Default::default()
        };
        let outcome = balance(&params, EditedField::Other, 14_500.0);
        assert_eq!(outcome.overhang_mm, MIN_OVERHANG_MM);
        assert_abs_diff_eq!(outcome.spacing_mm, 13_900.0 / 11.0, epsilon = 1e-9);
        assert!(residual(&outcome, 12, 14_500.0) < 1.0);
        assert!(outcome.notices.iter().all(|n| n.field != AdjustedField::GirderSpacing));

        let again = balance(&outcome.apply_to(&params), EditedField::Other, 14_500.0);
        assert_eq!(again.spacing_mm, outcome.spacing_mm);
        assert!(again.notices.is_empty());
    }

    #[test]
    fn test_out_of_bounds_inputs_are_clamped() {
        let params = BridgeParameters {
            deck_overhang_mm: 5000.0,
            ..Default::default()
        };
        let outcome = balance(&params, EditedField::Overhang, 14_500.0);
        assert_eq!(outcome.overhang_mm, MAX_OVERHANG_MM);
        assert_abs_diff_eq!(outcome.spacing_mm, 3500.0, epsilon = 1e-9);
        assert!(outcome.notices.iter().any(|n| {
            n.field == AdjustedField::DeckOverhang
                && n.reason == AdjustmentReason::OverhangAboveMaximum
        }));

        let params = BridgeParameters {
            deck_overhang_mm: 100.0,
            girder_spacing_mm: 500.0,
            ..Default::default()
        };
        let outcome = balance(&params, EditedField::Spacing, 14_500.0);
        assert_eq!(outcome.spacing_mm, MIN_GIRDER_SPACING_MM);
        assert_eq!(outcome.overhang_mm, MAX_OVERHANG_MM);
        let spacing_notice = outcome
            .notices
            .iter()
            .find(|n| n.field == AdjustedField::GirderSpacing)
            .unwrap();
        assert_eq!(spacing_notice.reason, AdjustmentReason::SpacingOutOfRange);
        assert!(spacing_notice.message().ends_with("between 1.00 m and 24.00 m"));

        for edited in [EditedField::Overhang, EditedField::Spacing, EditedField::Other] {
            let outcome = balance(&params, edited, 14_500.0);
            assert!((MIN_OVERHANG_MM..=MAX_OVERHANG_MM).contains(&outcome.overhang_mm));
            assert!((MIN_GIRDER_SPACING_MM..=MAX_GIRDER_SPACING_MM).contains(&outcome.spacing_mm));
        }
    }

    #[test]
    fn test_notice_serialization() {
        let notice = AdjustmentNotice::new(
            AdjustedField::GirderSpacing,
            3500.0,
            AdjustmentReason::MatchDeckWidth,
        );
        let json = serde_json::to_string(&notice).unwrap();
        assert!(json.contains("\"field\":\"girder_spacing\""));
        assert!(json.contains("\"new_value\":3500.0"));
        assert!(json.contains("\"reason\":\"match_deck_width\""));
    }
}
