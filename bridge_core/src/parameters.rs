//! # Bridge Parameters
//!
//! The immutable snapshot of every input quantity the schematic is computed
//! from. A caller (a parameter form, the CLI, a project file) owns the value and
//! passes it by value into the engine on every recompute.
//!
//! All linear quantities are millimeters; the field suffixes say so.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "span_length_mm": 35000.0,
//!   "num_girders": 4,
//!   "girder_spacing_mm": 2750.0,
//!   "cross_bracing_spacing_mm": 3500.0,
//!   "carriageway_width_mm": 10500.0,
//!   "skew_angle_deg": 0.0,
//!   "deck_thickness_mm": 200.0,
//!   "footpath_width_mm": 1500.0,
//!   "footpath_thickness_mm": 200.0,
//!   "crash_barrier_width_mm": 500.0,
//!   "railing_height_mm": 1000.0,
//!   "railing_width_mm": 0.0,
//!   "footpath_config": "both",
//!   "deck_overhang_mm": 1000.0
//! }
//! ```
//!
//! `median_present`, `median_width_mm` and `end_diaphragms` are optional and
//! default to "no median" and "no end diaphragms".

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

use crate::errors::{BridgeError, BridgeResult};
use crate::layout::balancer::{AdjustedField, AdjustmentNotice, AdjustmentReason};

/// Smallest overhang allowed once there is more than one girder (mm)
pub const MIN_OVERHANG_MM: f64 = 300.0;

/// Largest overhang allowed once there is more than one girder (mm)
pub const MAX_OVERHANG_MM: f64 = 2000.0;

/// Smallest girder spacing the balancer will produce (mm)
pub const MIN_GIRDER_SPACING_MM: f64 = 1000.0;

/// Largest girder spacing the balancer will produce (mm)
pub const MAX_GIRDER_SPACING_MM: f64 = 24000.0;

/// Skew is limited to ±15 degrees
pub const MAX_SKEW_DEG: f64 = 15.0;

/// Most bracing bays the top view will lay out along one span
pub const MAX_BRACING_BAYS: usize = 500;

// Ranges the parameter form accepts. Only `validate` looks at these; the engine
// clamps instead of rejecting.
const FORM_SPAN_MM: (f64, f64) = (20_000.0, 45_000.0);
const FORM_GIRDERS: (u32, u32) = (2, 12);
const FORM_OVERHANG_MM: (f64, f64) = (100.0, 5000.0);
const FORM_THICKNESS_MM: (f64, f64) = (0.0, 500.0);

/// Which sides of the deck carry a footpath
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FootpathConfig {
    /// No footpath
    None,
    /// Footpath on the left edge only
    Left,
    /// Footpath on the right edge only
    Right,
    /// Footpaths on both edges
    #[default]
    Both,
}

impl FootpathConfig {
    /// Number of footpaths this configuration places on the deck
    pub fn count(self) -> u32 {
        match self {
            FootpathConfig::Both => 2,
            FootpathConfig::Left | FootpathConfig::Right => 1,
            FootpathConfig::None => 0,
        }
    }

    pub fn has_left(self) -> bool {
        matches!(self, FootpathConfig::Left | FootpathConfig::Both)
    }

    pub fn has_right(self) -> bool {
        matches!(self, FootpathConfig::Right | FootpathConfig::Both)
    }
}

impl FromStr for FootpathConfig {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(FootpathConfig::None),
            "left" => Ok(FootpathConfig::Left),
            "right" => Ok(FootpathConfig::Right),
            "both" => Ok(FootpathConfig::Both),
            other => Err(BridgeError::invalid_input(
                "footpath_config",
                other,
                "Expected one of: none, left, right, both",
            )),
        }
    }
}

/// The field the user just edited.
///
/// Drives which branch of the overhang/spacing balancer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditedField {
    /// The deck overhang was edited; girder spacing follows
    Overhang,
    /// The girder spacing was edited; overhang follows
    Spacing,
    /// Anything else (including deck width drivers)
    #[default]
    Other,
}

impl FromStr for EditedField {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overhang" => Ok(EditedField::Overhang),
            "spacing" => Ok(EditedField::Spacing),
            "other" => Ok(EditedField::Other),
            other => Err(BridgeError::invalid_input(
                "edited_field",
                other,
                "Expected one of: overhang, spacing, other",
            )),
        }
    }
}

impl std::fmt::Display for EditedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EditedField::Overhang => "overhang",
            EditedField::Spacing => "spacing",
            EditedField::Other => "other",
        };
        f.write_str(name)
    }
}

/// Every input quantity of the bridge schematic.
///
/// Missing fields deserialize to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeParameters {
    /// Span between bearing lines (mm)
    pub span_length_mm: f64,

    /// Number of longitudinal girders
    pub num_girders: u32,

    /// Center-to-center girder spacing (mm)
    pub girder_spacing_mm: f64,

    /// Requested cross-bracing spacing along the span (mm)
    ///
    /// A target only: bracing is distributed evenly so it reaches both ends.
    pub cross_bracing_spacing_mm: f64,

    /// Carriageway width (mm); with a median this is the width of each carriageway
    pub carriageway_width_mm: f64,

    /// Skew angle between the bearing line and the normal to the girders (degrees)
    pub skew_angle_deg: f64,

    /// Deck slab thickness (mm)
    pub deck_thickness_mm: f64,

    /// Width of each footpath (mm)
    pub footpath_width_mm: f64,

    /// Footpath thickness (mm)
    pub footpath_thickness_mm: f64,

    /// Width of each crash barrier (mm)
    pub crash_barrier_width_mm: f64,

    /// Railing height above the footpath (mm)
    pub railing_height_mm: f64,

    /// Railing width (mm). Visual only; never part of the deck width.
    pub railing_width_mm: f64,

    /// Footpath arrangement
    pub footpath_config: FootpathConfig,

    /// Distance from deck edge to the outermost girder center-line (mm)
    pub deck_overhang_mm: f64,

    /// Whether a central median splits the deck into two carriageways
    #[serde(default)]
    pub median_present: bool,

    /// Median width (mm), only used when `median_present`
    #[serde(default)]
    pub median_width_mm: f64,

    /// Draw end diaphragms on the bearing lines in the top view
    #[serde(default)]
    pub end_diaphragms: bool,
}

impl Default for BridgeParameters {
    fn default() -> Self {
        BridgeParameters {
            span_length_mm: 35_000.0,
            num_girders: 4,
            girder_spacing_mm: 2750.0,
            cross_bracing_spacing_mm: 3500.0,
            carriageway_width_mm: 10_500.0,
            skew_angle_deg: 0.0,
            deck_thickness_mm: 200.0,
            footpath_width_mm: 1500.0,
            footpath_thickness_mm: 200.0,
            crash_barrier_width_mm: 500.0,
            railing_height_mm: 1000.0,
            railing_width_mm: 0.0,
            footpath_config: FootpathConfig::Both,
            deck_overhang_mm: 1000.0,
            median_present: false,
            median_width_mm: 1200.0,
            end_diaphragms: false,
        }
    }
}

/// A normalized parameter snapshot plus any notices produced by normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub parameters: BridgeParameters,
    pub notices: Vec<AdjustmentNotice>,
}

impl BridgeParameters {
    /// Girder count as used by the layout, never less than one.
    pub fn girder_count(&self) -> usize {
        self.num_girders.max(1) as usize
    }

    /// Footpath width on the left edge (0 when there is no left footpath)
    pub fn left_footpath_mm(&self) -> f64 {
        if self.footpath_config.has_left() {
            self.footpath_width_mm
        } else {
            0.0
        }
    }

    /// Footpath width on the right edge (0 when there is no right footpath)
    pub fn right_footpath_mm(&self) -> f64 {
        if self.footpath_config.has_right() {
            self.footpath_width_mm
        } else {
            0.0
        }
    }

    /// Median width that actually enters the layout
    pub fn effective_median_mm(&self) -> f64 {
        if self.median_present {
            self.median_width_mm.max(0.0)
        } else {
            0.0
        }
    }

    /// Check the values against the ranges the parameter form enforces.
    ///
    /// The engine never calls this; it clamps instead. Use it to report
    /// problems to a user before recomputing.
    pub fn validate(&self) -> BridgeResult<()> {
        check_range(
            "span_length_mm",
            self.span_length_mm,
            FORM_SPAN_MM,
            "Span must be between 20 m and 45 m",
        )?;

        if self.num_girders < FORM_GIRDERS.0 || self.num_girders > FORM_GIRDERS.1 {
            return Err(BridgeError::invalid_input(
                "num_girders",
                self.num_girders.to_string(),
                "Number of girders must be between 2 and 12",
            ));
        }

        check_range(
            "girder_spacing_mm",
            self.girder_spacing_mm,
            (MIN_GIRDER_SPACING_MM, MAX_GIRDER_SPACING_MM),
            "Girder spacing must be between 1.0 m and 24.0 m",
        )?;
        check_range(
            "deck_overhang_mm",
            self.deck_overhang_mm,
            FORM_OVERHANG_MM,
            "Deck overhang must be between 0.1 m and 5.0 m",
        )?;
        check_range(
            "skew_angle_deg",
            self.skew_angle_deg,
            (-MAX_SKEW_DEG, MAX_SKEW_DEG),
            "Skew angle must be within ±15°",
        )?;
        check_range(
            "deck_thickness_mm",
            self.deck_thickness_mm,
            FORM_THICKNESS_MM,
            "Deck thickness must be between 0 and 500 mm",
        )?;
        check_range(
            "footpath_thickness_mm",
            self.footpath_thickness_mm,
            FORM_THICKNESS_MM,
            "Footpath thickness must be between 0 and 500 mm",
        )?;

        for (field, value) in [
            ("carriageway_width_mm", self.carriageway_width_mm),
            ("footpath_width_mm", self.footpath_width_mm),
            ("crash_barrier_width_mm", self.crash_barrier_width_mm),
            ("railing_height_mm", self.railing_height_mm),
            ("railing_width_mm", self.railing_width_mm),
            ("median_width_mm", self.median_width_mm),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(BridgeError::invalid_input(
                    field,
                    value.to_string(),
                    "Width must not be negative",
                ));
            }
        }

        if !self.cross_bracing_spacing_mm.is_finite() || self.cross_bracing_spacing_mm <= 0.0 {
            return Err(BridgeError::invalid_input(
                "cross_bracing_spacing_mm",
                self.cross_bracing_spacing_mm.to_string(),
                "Cross-bracing spacing must be positive",
            ));
        }

        Ok(())
    }

    /// Clamp every value into the range the engine works with.
    ///
    /// Never fails. Non-finite values fall back to zero before clamping, the
    /// girder count is raised to one, and the cross-bracing spacing is capped
    /// at the span and floored at `span / MAX_BRACING_BAYS` (each with a
    /// notice, since the caller did not edit it).
    pub fn normalized(&self) -> Normalized {
        let mut p = self.clone();
        let mut notices = Vec::new();

        p.num_girders = p.num_girders.max(1);
        p.span_length_mm = non_negative(p.span_length_mm);
        p.carriageway_width_mm = non_negative(p.carriageway_width_mm);
        p.deck_thickness_mm = non_negative(p.deck_thickness_mm);
        p.footpath_width_mm = non_negative(p.footpath_width_mm);
        p.footpath_thickness_mm = non_negative(p.footpath_thickness_mm);
        p.crash_barrier_width_mm = non_negative(p.crash_barrier_width_mm);
        p.railing_height_mm = non_negative(p.railing_height_mm);
        p.railing_width_mm = non_negative(p.railing_width_mm);
        p.median_width_mm = non_negative(p.median_width_mm);
        p.skew_angle_deg = finite_or_zero(p.skew_angle_deg).clamp(-MAX_SKEW_DEG, MAX_SKEW_DEG);
        p.girder_spacing_mm =
            finite_or_zero(p.girder_spacing_mm).clamp(MIN_GIRDER_SPACING_MM, MAX_GIRDER_SPACING_MM);

        p.deck_overhang_mm = non_negative(p.deck_overhang_mm);
        if p.num_girders > 1 {
            p.deck_overhang_mm = p.deck_overhang_mm.clamp(MIN_OVERHANG_MM, MAX_OVERHANG_MM);
        }

        p.cross_bracing_spacing_mm = non_negative(p.cross_bracing_spacing_mm);
        if p.cross_bracing_spacing_mm > p.span_length_mm {
            debug!(
                requested = p.cross_bracing_spacing_mm,
                span = p.span_length_mm,
                "Clamping cross-bracing spacing to span"
            );
            p.cross_bracing_spacing_mm = p.span_length_mm;
            notices.push(AdjustmentNotice::new(
                AdjustedField::CrossBracingSpacing,
                p.span_length_mm,
                AdjustmentReason::ClampedToSpan,
            ));
        }

        let min_bracing_mm = p.span_length_mm / MAX_BRACING_BAYS as f64;
        if p.cross_bracing_spacing_mm > 0.0 && p.cross_bracing_spacing_mm < min_bracing_mm {
            debug!(
                requested = p.cross_bracing_spacing_mm,
                floor = min_bracing_mm,
                "Raising cross-bracing spacing to the bay limit"
            );
            p.cross_bracing_spacing_mm = min_bracing_mm;
            notices.push(AdjustmentNotice::new(
                AdjustedField::CrossBracingSpacing,
                min_bracing_mm,
                AdjustmentReason::BracingBayLimit,
            ));
        }

        Normalized { parameters: p, notices }
    }
}

fn check_range(field: &str, value: f64, (lo, hi): (f64, f64), reason: &str) -> BridgeResult<()> {
    if !value.is_finite() || value < lo || value > hi {
        return Err(BridgeError::invalid_input(field, value.to_string(), reason));
    }
    Ok(())
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

fn non_negative(value: f64) -> f64 {
    finite_or_zero(value).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_are_valid() {
        assert!(BridgeParameters::default().validate().is_ok());
    }

    #[test]
    fn test_footpath_counts() {
        assert_eq!(FootpathConfig::Both.count(), 2);
        assert_eq!(FootpathConfig::Left.count(), 1);
        assert_eq!(FootpathConfig::Right.count(), 1);
        assert_eq!(FootpathConfig::None.count(), 0);
        assert!(FootpathConfig::Left.has_left() && !FootpathConfig::Left.has_right());
    }

    #[test]
    fn test_validate_rejects_short_span() {
        let params = BridgeParameters {
            span_length_mm: 10_000.0,
            ..Default::default()
        };
        let err = params.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(err.to_string().contains("span_length_mm"));
    }

    #[test]
    fn test_validate_rejects_excess_skew() {
        let params = BridgeParameters {
            skew_angle_deg: 20.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_normalize_clamps_bracing_to_span() {
        let params = BridgeParameters {
            span_length_mm: 20_000.0,
            cross_bracing_spacing_mm: 25_000.0,
            ..Default::default()
        };
        let normalized = params.normalized();
        assert_eq!(normalized.parameters.cross_bracing_spacing_mm, 20_000.0);
        assert_eq!(normalized.notices.len(), 1);
        assert_eq!(normalized.notices[0].field, AdjustedField::CrossBracingSpacing);
    }

    #[test]
    fn test_normalize_floors_tiny_bracing_spacing() {
        for tiny in [1e-12, f64::MIN_POSITIVE] {
            let params = BridgeParameters {
                cross_bracing_spacing_mm: tiny,
                ..Default::default()
            };
            let normalized = params.normalized();
            let floor = 35_000.0 / MAX_BRACING_BAYS as f64;
            assert_relative_eq!(normalized.parameters.cross_bracing_spacing_mm, floor);
            assert_eq!(normalized.notices.len(), 1);
            assert_eq!(normalized.notices[0].reason, AdjustmentReason::BracingBayLimit);
        }
    }

    #[test]
    fn test_normalize_degenerate_values() {
        let params = BridgeParameters {
            num_girders: 0,
            skew_angle_deg: 40.0,
            deck_thickness_mm: f64::NAN,
            deck_overhang_mm: 9000.0,
            ..Default::default()
        };
        let p = params.normalized().parameters;
        assert_eq!(p.num_girders, 1);
        assert_eq!(p.skew_angle_deg, MAX_SKEW_DEG);
        assert_eq!(p.deck_thickness_mm, 0.0);
        // Single girder: overhang is not bounded here, the balancer sets it
        assert_eq!(p.deck_overhang_mm, 9000.0);
    }

    #[test]
    fn test_normalize_bounds_overhang_for_multiple_girders() {
        let params = BridgeParameters {
            deck_overhang_mm: 100.0,
            ..Default::default()
        };
        assert_eq!(params.normalized().parameters.deck_overhang_mm, MIN_OVERHANG_MM);
    }

    #[test]
    fn test_optional_fields_default_when_missing() {
        let json = r#"{
            "span_length_mm": 35000.0, "num_girders": 4, "girder_spacing_mm": 2750.0,
            "cross_bracing_spacing_mm": 3500.0, "carriageway_width_mm": 10500.0,
            "skew_angle_deg": 0.0, "deck_thickness_mm": 200.0, "footpath_width_mm": 1500.0,
            "footpath_thickness_mm": 200.0, "crash_barrier_width_mm": 500.0,
            "railing_height_mm": 1000.0, "railing_width_mm": 0.0,
            "footpath_config": "both", "deck_overhang_mm": 1000.0
        }"#;
        let params: BridgeParameters = serde_json::from_str(json).unwrap();
        assert!(!params.median_present);
        assert!(!params.end_diaphragms);
        assert_eq!(params.footpath_config, FootpathConfig::Both);
    }

    #[test]
    fn test_edited_field_parsing() {
        assert_eq!("overhang".parse::<EditedField>().unwrap(), EditedField::Overhang);
        assert_eq!(" Spacing ".parse::<EditedField>().unwrap(), EditedField::Spacing);
        assert!("width".parse::<EditedField>().is_err());
        assert_eq!(EditedField::Other.to_string(), "other");
    }
}
