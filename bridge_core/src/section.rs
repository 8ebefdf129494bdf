//! Static component profiles
//!
//! The girder I-section, the crash barrier safety-shape outline and the
//! railing. None of these are edited per bridge; they are part of the drawing
//! settings and describe how each component is drawn.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Rolled I-section used for every girder (mm).
///
/// The default is a 500 mm deep beam (ISMB 500 class).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GirderSectionProfile {
    /// Overall depth d
    pub depth_mm: f64,
    /// Flange width bf
    pub flange_width_mm: f64,
    /// Flange thickness tf
    pub flange_thickness_mm: f64,
    /// Web thickness tw
    pub web_thickness_mm: f64,
}

impl Default for GirderSectionProfile {
    fn default() -> Self {
        GirderSectionProfile {
            depth_mm: 500.0,
            flange_width_mm: 180.0,
            flange_thickness_mm: 17.2,
            web_thickness_mm: 10.2,
        }
    }
}

impl GirderSectionProfile {
    /// Stiffener plate width (bf - tw) / 2
    pub fn stiffener_width_mm(&self) -> f64 {
        ((self.flange_width_mm - self.web_thickness_mm) / 2.0).max(0.0)
    }

    /// Stiffener plate height d - 2·tf (clear web depth)
    pub fn stiffener_height_mm(&self) -> f64 {
        (self.depth_mm - 2.0 * self.flange_thickness_mm).max(0.0)
    }

    /// Half the flange width
    pub fn flange_half_width_mm(&self) -> f64 {
        self.flange_width_mm / 2.0
    }
}

impl std::fmt::Display for GirderSectionProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "I {:.0} (bf={:.0}, tf={:.1}, tw={:.1})",
            self.depth_mm, self.flange_width_mm, self.flange_thickness_mm, self.web_thickness_mm
        )
    }
}

/// Visual multipliers applied to the girder profile in the cross-section.
///
/// A 500 mm girder under a 14.5 m deck is a sliver at true scale, so the
/// section is drawn exaggerated. Use [`GirderExaggeration::UNITY`] for a
/// true-scale section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GirderExaggeration {
    pub depth: f64,
    pub flange_width: f64,
    pub flange_thickness: f64,
    pub web_thickness: f64,
}

impl GirderExaggeration {
    /// No exaggeration
    pub const UNITY: GirderExaggeration = GirderExaggeration {
        depth: 1.0,
        flange_width: 1.0,
        flange_thickness: 1.0,
        web_thickness: 1.0,
    };
}

impl Default for GirderExaggeration {
    fn default() -> Self {
        GirderExaggeration {
            depth: 3.0,
            flange_width: 3.75,
            flange_thickness: 4.05,
            web_thickness: 3.75,
        }
    }
}

/// Which way the sloped traffic face of a crash barrier points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarrierFacing {
    /// Sloped face on the right (a barrier on the left edge of a carriageway)
    Right,
    /// Sloped face on the left (a barrier on the right edge of a carriageway)
    Left,
}

/// Crash barrier safety-shape outline.
///
/// Proportions are taken from the barrier drawing: a narrow flat top, a sloped
/// upper face, a short vertical drop and a vertical lower face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrashBarrierProfile {
    /// Barrier height above the deck (mm)
    pub height_mm: f64,
    /// Inset of the flat top from the back face (mm)
    pub top_inset_mm: f64,
    /// Flat top width as a fraction of the base width
    pub top_width_ratio: f64,
    /// Height of the sloped face as a fraction of the barrier height
    pub slant_height_ratio: f64,
    /// Height of the short vertical drop as a fraction of the barrier height
    pub drop_height_ratio: f64,
    /// Horizontal position of the traffic face as a fraction of the base width
    pub slant_offset_ratio: f64,
}

impl Default for CrashBarrierProfile {
    fn default() -> Self {
        CrashBarrierProfile {
            height_mm: 800.0,
            top_inset_mm: 5.0,
            top_width_ratio: 30.0 / 245.0,
            slant_height_ratio: 350.0 / 600.0,
            drop_height_ratio: 60.0 / 600.0,
            slant_offset_ratio: 210.0 / 245.0,
        }
    }
}

impl CrashBarrierProfile {
    /// Outline polygon of a barrier standing on `base_y`.
    ///
    /// `x` is the left end of the barrier base and `base_width_px` its drawn
    /// width; the outline never leaves `[x, x + base_width_px]`.
    pub fn outline(
        &self,
        x: f64,
        base_y: f64,
        base_width_px: f64,
        scale: f64,
        facing: BarrierFacing,
    ) -> Vec<Point> {
        let h = self.height_mm * scale;
        let inset = (self.top_inset_mm * scale).min(base_width_px);
        let top_w = base_width_px * self.top_width_ratio;
        let slant_h = h * self.slant_height_ratio;
        let drop_h = h * self.drop_height_ratio;
        let slant_offset = base_width_px * self.slant_offset_ratio;
        let top_y = base_y - h;

        match facing {
            BarrierFacing::Right => vec![
                Point::new(x + inset, top_y),
                Point::new(x + inset + top_w, top_y),
                Point::new(x + slant_offset, top_y + slant_h),
                Point::new(x + slant_offset, top_y + slant_h + drop_h),
                Point::new(x + slant_offset, base_y),
                Point::new(x, base_y),
            ],
            BarrierFacing::Left => {
                let right = x + base_width_px;
                vec![
                    Point::new(right - inset - top_w, top_y),
                    Point::new(right - inset, top_y),
                    Point::new(right, base_y),
                    Point::new(right - slant_offset, base_y),
                    Point::new(right - slant_offset, top_y + slant_h + drop_h),
                    Point::new(right - slant_offset, top_y + slant_h),
                ]
            }
        }
    }
}

/// Pedestrian railing drawn on the outer edge of a footpath
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RailingProfile {
    /// Narrowest railing ever drawn (mm); the parameter width may be zero
    pub min_width_mm: f64,
    /// Number of horizontal rails
    pub rail_count: u32,
    /// Post diameter (mm)
    pub post_diameter_mm: f64,
}

impl Default for RailingProfile {
    fn default() -> Self {
        RailingProfile {
            min_width_mm: 100.0,
            rail_count: 3,
            post_diameter_mm: 50.0,
        }
    }
}

impl RailingProfile {
    /// Drawn railing width for a given parameter width (mm)
    pub fn drawn_width_mm(&self, railing_width_mm: f64) -> f64 {
        railing_width_mm.max(self.min_width_mm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_stiffener_dimensions() {
        let girder = GirderSectionProfile::default();
        assert_relative_eq!(girder.stiffener_width_mm(), 84.9, epsilon = 1e-9);
        assert_relative_eq!(girder.stiffener_height_mm(), 465.6, epsilon = 1e-9);
    }

    #[test]
    fn test_barrier_outline_stays_on_base() {
        let profile = CrashBarrierProfile::default();
        for facing in [BarrierFacing::Left, BarrierFacing::Right] {
            let pts = profile.outline(100.0, 400.0, 25.0, 0.05, facing);
            assert_eq!(pts.len(), 6);
            for p in &pts {
                assert!(p.x >= 100.0 - 1e-9 && p.x <= 125.0 + 1e-9);
                assert!(p.y <= 400.0 && p.y >= 400.0 - 800.0 * 0.05 - 1e-9);
            }
        }
    }

    #[test]
    fn test_barrier_outlines_mirror() {
        let profile = CrashBarrierProfile::default();
        let right = profile.outline(0.0, 0.0, 50.0, 0.1, BarrierFacing::Right);
        let left = profile.outline(0.0, 0.0, 50.0, 0.1, BarrierFacing::Left);
        // The flat top of a right-facing barrier mirrors the left-facing one
        assert_relative_eq!(right[0].x, 50.0 - left[1].x, epsilon = 1e-9);
        assert_relative_eq!(right[1].x, 50.0 - left[0].x, epsilon = 1e-9);
    }

    #[test]
    fn test_railing_minimum_width() {
        let railing = RailingProfile::default();
        assert_eq!(railing.drawn_width_mm(0.0), 100.0);
        assert_eq!(railing.drawn_width_mm(150.0), 150.0);
    }
}
