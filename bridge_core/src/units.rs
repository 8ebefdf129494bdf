//! # Unit Types
//!
//! Type-safe wrappers for the units the bridge schematic works in. They are
//! plain f64 newtypes so JSON stays clean (just numbers).
//!
//! ## Conventions
//!
//! - Every linear parameter is stored in millimeters.
//! - Dimension labels are shown in meters (2 decimals) or millimeters (0 decimals).
//! - Skew is entered in degrees and converted to radians for projection.
//!
//! ## Example
//!
//! ```rust
//! use bridge_core::units::{Meters, Millimeters};
//!
//! let spacing = Millimeters(2750.0);
//! let spacing_m: Meters = spacing.into();
//! assert_eq!(spacing_m.0, 2.75);
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// Length Units
// ============================================================================

/// Length in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

impl From<Meters> for Millimeters {
    fn from(m: Meters) -> Self {
        Millimeters(m.0 * 1000.0)
    }
}

impl From<Millimeters> for Meters {
    fn from(mm: Millimeters) -> Self {
        Meters(mm.0 / 1000.0)
    }
}

impl Meters {
    /// Raw value in meters
    pub fn value(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Meters {
    /// Meters always print with 2 decimals, the drawing's precision for meters.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} m", self.0)
    }
}

impl std::fmt::Display for Millimeters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0}mm", self.0)
    }
}

// ============================================================================
// Angle Units
// ============================================================================

/// Angle in degrees
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Degrees(pub f64);

/// Angle in radians
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Radians(pub f64);

impl From<Degrees> for Radians {
    fn from(deg: Degrees) -> Self {
        Radians(deg.0.to_radians())
    }
}

impl Radians {
    /// Tangent of the angle
    pub fn tan(self) -> f64 {
        self.0.tan()
    }
}
