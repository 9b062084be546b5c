//! Connector attachment points.
//!
//! A connector terminates on one of eight compass positions around the
//! bounding box of a concept's key primitive. [`AttachmentPoint::facing`]
//! picks the position that faces another node, given the delta toward it.

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Point};

/// Below this `|dx / dy|` ratio a connector leaves through the top or bottom edge.
const VERTICAL_RATIO: f32 = 0.5;

/// Above this `|dx / dy|` ratio a connector leaves through the left or right edge.
const HORIZONTAL_RATIO: f32 = 2.0;

/// One of the eight compass positions on a node's boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentPoint {
    TopLeft,
    #[default]
    TopCentre,
    TopRight,
    CentreLeft,
    CentreRight,
    BottomLeft,
    BottomCentre,
    BottomRight,
}

impl AttachmentPoint {
    /// Selects the attachment point facing a node at offset `(dx, dy)`.
    ///
    /// The offset is measured from this node toward the other one, in
    /// diagram coordinates (y grows downward).
    ///
    /// - `dy == 0`: the horizontal centre facing the other node.
    /// - `|dx / dy| < 0.5`: the vertical centre facing the other node.
    /// - `|dx / dy| > 2`: the horizontal centre facing the other node.
    /// - otherwise: the diagonal corner matching the signs of `dx` and `dy`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use sediment_core::attachment::AttachmentPoint;
    /// assert_eq!(AttachmentPoint::facing(5.0, 0.0), AttachmentPoint::CentreRight);
    /// assert_eq!(AttachmentPoint::facing(1.0, 10.0), AttachmentPoint::BottomCentre);
    /// assert_eq!(AttachmentPoint::facing(-30.0, 3.0), AttachmentPoint::CentreLeft);
    /// assert_eq!(AttachmentPoint::facing(-4.0, -4.0), AttachmentPoint::TopLeft);
    /// ```
    pub fn facing(dx: f32, dy: f32) -> Self {
        if dy == 0.0 {
            return if dx >= 0.0 {
                Self::CentreRight
            } else {
                Self::CentreLeft
            };
        }

        let ratio = (dx / dy).abs();
        if ratio < VERTICAL_RATIO {
            if dy > 0.0 {
                Self::BottomCentre
            } else {
                Self::TopCentre
            }
        } else if ratio > HORIZONTAL_RATIO {
            if dx > 0.0 {
                Self::CentreRight
            } else {
                Self::CentreLeft
            }
        } else {
            match (dx > 0.0, dy > 0.0) {
                (true, true) => Self::BottomRight,
                (false, true) => Self::BottomLeft,
                (true, false) => Self::TopRight,
                (false, false) => Self::TopLeft,
            }
        }
    }

    /// Returns true for the three positions on the top edge or the three on the bottom edge.
    pub fn is_top_or_bottom(self) -> bool {
        !self.is_side_centre()
    }

    /// Returns true for the centre-left and centre-right positions.
    pub fn is_side_centre(self) -> bool {
        matches!(self, Self::CentreLeft | Self::CentreRight)
    }

    /// Returns the diagram coordinates of this attachment point on `bounds`.
    pub fn position_on(self, bounds: Bounds) -> Point {
        let center = bounds.center();
        let x = match self {
            Self::TopLeft | Self::CentreLeft | Self::BottomLeft => bounds.min_x(),
            Self::TopCentre | Self::BottomCentre => center.x(),
            Self::TopRight | Self::CentreRight | Self::BottomRight => bounds.max_x(),
        };
        let y = match self {
            Self::TopLeft | Self::TopCentre | Self::TopRight => bounds.min_y(),
            Self::CentreLeft | Self::CentreRight => center.y(),
            Self::BottomLeft | Self::BottomCentre | Self::BottomRight => bounds.max_y(),
        };
        Point::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::Size;

    use super::*;

    #[test]
    fn test_facing_same_row() {
        assert_eq!(AttachmentPoint::facing(10.0, 0.0), AttachmentPoint::CentreRight);
        assert_eq!(AttachmentPoint::facing(-10.0, 0.0), AttachmentPoint::CentreLeft);
        assert_eq!(AttachmentPoint::facing(0.0, 0.0), AttachmentPoint::CentreRight);
    }

    #[test]
    fn test_facing_mostly_vertical() {
        assert_eq!(AttachmentPoint::facing(0.0, 3.0), AttachmentPoint::BottomCentre);
        assert_eq!(AttachmentPoint::facing(1.0, -3.0), AttachmentPoint::TopCentre);
        assert_eq!(AttachmentPoint::facing(-1.4, 3.0), AttachmentPoint::BottomCentre);
    }

    #[test]
    fn test_facing_mostly_horizontal() {
        assert_eq!(AttachmentPoint::facing(10.0, 3.0), AttachmentPoint::CentreRight);
        assert_eq!(AttachmentPoint::facing(-10.0, -3.0), AttachmentPoint::CentreLeft);
    }

    #[test]
    fn test_facing_diagonal() {
        assert_eq!(AttachmentPoint::facing(3.0, 3.0), AttachmentPoint::BottomRight);
        assert_eq!(AttachmentPoint::facing(-3.0, 3.0), AttachmentPoint::BottomLeft);
        assert_eq!(AttachmentPoint::facing(3.0, -3.0), AttachmentPoint::TopRight);
        assert_eq!(AttachmentPoint::facing(-3.0, -3.0), AttachmentPoint::TopLeft);
        // Boundary ratios are diagonal.
        assert_eq!(AttachmentPoint::facing(1.5, 3.0), AttachmentPoint::BottomRight);
        assert_eq!(AttachmentPoint::facing(6.0, 3.0), AttachmentPoint::BottomRight);
    }

    #[test]
    fn test_facing_is_antisymmetric() {
        let pairs = [(10.0, 0.0), (1.0, 4.0), (9.0, 2.0), (3.0, -2.0)];
        for (dx, dy) in pairs {
            let forward = AttachmentPoint::facing(dx, dy);
            let backward = AttachmentPoint::facing(-dx, -dy);
            assert_ne!(forward, backward, "dx={dx} dy={dy}");
        }
    }

    #[test]
    fn test_position_on() {
        let bounds = Bounds::new_from_top_left(Point::new(10.0, 20.0), Size::new(8.0, 4.0));

        assert_eq!(AttachmentPoint::TopLeft.position_on(bounds), Point::new(10.0, 20.0));
        assert_eq!(AttachmentPoint::TopCentre.position_on(bounds), Point::new(14.0, 20.0));
        assert_eq!(AttachmentPoint::CentreRight.position_on(bounds), Point::new(18.0, 22.0));
        assert_eq!(AttachmentPoint::BottomLeft.position_on(bounds), Point::new(10.0, 24.0));
        assert_eq!(AttachmentPoint::BottomRight.position_on(bounds), Point::new(18.0, 24.0));
    }

    #[test]
    fn test_edge_classification() {
        assert!(AttachmentPoint::TopLeft.is_top_or_bottom());
        assert!(AttachmentPoint::BottomCentre.is_top_or_bottom());
        assert!(AttachmentPoint::CentreLeft.is_side_centre());
        assert!(!AttachmentPoint::CentreRight.is_top_or_bottom());
    }
}
