//! Draw primitives
//!
//! The vocabulary the layout engines emit and an external rendering surface
//! consumes: rectangles, polygons, lines and text labels in projected (pixel)
//! coordinates, each tagged with the bridge component it belongs to. Colors and
//! pens are the renderer's business; it picks them by [`DrawRole`].
//!
//! Screen convention: x grows to the right, y grows downward.

use serde::{Deserialize, Serialize};

/// A point in projected coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Midpoint between two points
    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Axis-aligned rectangle: `(x, y)` is the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect { x, y, width, height }
    }

    /// Rectangle spanning two corners in any order
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Rect::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Smallest rectangle containing every point, `None` for an empty set
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min, mut max) = (*first, *first);
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some(Rect::from_corners(min, max))
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive containment test
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Grow on every side by `margin`
    pub fn inflate(&self, margin: f64) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + 2.0 * margin,
            self.height + 2.0 * margin,
        )
    }
}

/// Which bridge component a primitive belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DrawRole {
    /// Deck slab outline and soffit line
    Deck,
    Carriageway,
    Footpath,
    CrashBarrier,
    Median,
    Girder,
    Stiffener,
    CrossBracing,
    Railing,
    BearingLine,
    EndDiaphragm,
    /// Dimension lines, ticks, arrowheads, extension lines and their text
    Dimension,
    /// Component name labels and leader arrows
    Label,
    Title,
    Note,
}

impl DrawRole {
    /// Human-readable component name
    pub fn display_name(&self) -> &'static str {
        match self {
            DrawRole::Deck => "Deck",
            DrawRole::Carriageway => "Carriageway",
            DrawRole::Footpath => "Footpath",
            DrawRole::CrashBarrier => "Crash Barrier",
            DrawRole::Median => "Median",
            DrawRole::Girder => "Girder",
            DrawRole::Stiffener => "Stiffener",
            DrawRole::CrossBracing => "Cross Bracing",
            DrawRole::Railing => "Railing",
            DrawRole::BearingLine => "CL Bearing",
            DrawRole::EndDiaphragm => "End Diaphragm",
            DrawRole::Dimension => "Dimension",
            DrawRole::Label => "Label",
            DrawRole::Title => "Title",
            DrawRole::Note => "Note",
        }
    }

    /// Whether the role is a physical bridge component (as opposed to annotation)
    pub fn is_component(&self) -> bool {
        !matches!(self, DrawRole::Dimension | DrawRole::Label | DrawRole::Title | DrawRole::Note)
    }
}

/// Line dash pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

/// Horizontal anchoring of a text label relative to its position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

/// Relative text size; the renderer maps it to a font size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSize {
    Title,
    #[default]
    Normal,
    Small,
}

/// The geometric part of a primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "kebab-case")]
pub enum Shape {
    Rect {
        rect: Rect,
    },
    Polygon {
        points: Vec<Point>,
    },
    Line {
        from: Point,
        to: Point,
        style: LineStyle,
    },
    TextLabel {
        position: Point,
        text: String,
        anchor: TextAnchor,
        size: TextSize,
    },
}

/// One tagged shape handed to the rendering surface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawPrimitive {
    pub role: DrawRole,
    #[serde(flatten)]
    pub shape: Shape,
}

impl DrawPrimitive {
    pub fn rect(role: DrawRole, rect: Rect) -> Self {
        DrawPrimitive {
            role,
            shape: Shape::Rect { rect },
        }
    }

    pub fn polygon(role: DrawRole, points: Vec<Point>) -> Self {
        DrawPrimitive {
            role,
            shape: Shape::Polygon { points },
        }
    }

    pub fn line(role: DrawRole, from: Point, to: Point) -> Self {
        Self::styled_line(role, from, to, LineStyle::Solid)
    }

    pub fn styled_line(role: DrawRole, from: Point, to: Point, style: LineStyle) -> Self {
        DrawPrimitive {
            role,
            shape: Shape::Line { from, to, style },
        }
    }

    pub fn text(
        role: DrawRole,
        position: Point,
        text: impl Into<String>,
        anchor: TextAnchor,
    ) -> Self {
        Self::sized_text(role, position, text, anchor, TextSize::Normal)
    }

    pub fn sized_text(
        role: DrawRole,
        position: Point,
        text: impl Into<String>,
        anchor: TextAnchor,
        size: TextSize,
    ) -> Self {
        DrawPrimitive {
            role,
            shape: Shape::TextLabel {
                position,
                text: text.into(),
                anchor,
                size,
            },
        }
    }

    /// Bounding box of the geometry.
    ///
    /// Text has no metrics here, so a label's box is degenerate at its anchor.
    pub fn bounds(&self) -> Rect {
        match &self.shape {
            Shape::Rect { rect } => *rect,
            Shape::Polygon { points } => Rect::bounding(points).unwrap_or_default(),
            Shape::Line { from, to, .. } => Rect::from_corners(*from, *to),
            Shape::TextLabel { position, .. } => Rect::new(position.x, position.y, 0.0, 0.0),
        }
    }

    /// Text content, if this is a label
    pub fn label_text(&self) -> Option<&str> {
        match &self.shape {
            Shape::TextLabel { text, .. } => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), Point::new(25.0, 40.0));
        assert!(r.contains(Point::new(40.0, 60.0)));
        assert!(!r.contains(Point::new(41.0, 60.0)));
    }

    #[test]
    fn test_bounding_box() {
        let pts = [Point::new(5.0, 1.0), Point::new(-2.0, 4.0), Point::new(3.0, -3.0)];
        let b = Rect::bounding(&pts).unwrap();
        assert_eq!(b, Rect::new(-2.0, -3.0, 7.0, 7.0));
        assert!(Rect::bounding(&[]).is_none());
        assert_eq!(b.inflate(1.0), Rect::new(-3.0, -4.0, 9.0, 9.0));
    }

    #[test]
    fn test_primitive_json_is_tagged() {
        let prim = DrawPrimitive::styled_line(
            DrawRole::BearingLine,
            Point::new(0.0, 0.0),
            Point::new(1.0, 5.0),
            LineStyle::Dashed,
        );
        let json = serde_json::to_string(&prim).unwrap();
        assert!(json.contains("\"role\":\"bearing-line\""));
        assert!(json.contains("\"shape\":\"line\""));
        assert!(json.contains("\"style\":\"dashed\""));

        let roundtrip: DrawPrimitive = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, prim);
    }

    #[test]
    fn test_text_label_json() {
        let prim =
            DrawPrimitive::text(DrawRole::Label, Point::new(1.0, 2.0), "Deck", TextAnchor::Middle);
        let json = serde_json::to_string(&prim).unwrap();
        assert!(json.contains("\"shape\":\"text-label\""));
        assert_eq!(prim.label_text(), Some("Deck"));
    }
}
