use serde::{Deserialize, Serialize};

/// A point in some 2D coordinate space.
///
/// Raw mouse/touch coordinates are in client (viewport) space while everything the selector
/// stores is in the local space of the video surface.
#[derive(Clone, Copy, PartialEq, Default, Debug, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Converts this client position into the local space of a surface whose top-left corner
    /// is at `origin`.
    #[inline]
    pub fn relative_to(self, origin: Position) -> Position {
        Position::new(self.x - origin.x, self.y - origin.y)
    }
}

#[derive(Clone, Copy, PartialEq, Default, Debug, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether either dimension cannot be divided by.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

/// An axis-aligned rectangle in surface-local coordinates.
///
/// All four fields are non-negative when constructed through [`BoundingBox::from_corners`].
#[derive(Clone, Copy, PartialEq, Default, Debug, Serialize, Deserialize)]
pub struct BoundingBox {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    /// Normalizes two opposite corners into a box, independent of drag direction.
    pub fn from_corners(start: Position, end: Position) -> Self {
        Self {
            left: start.x.min(end.x),
            top: start.y.min(end.y),
            width: (end.x - start.x).abs(),
            height: (end.y - start.y).abs(),
        }
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Whether this box has no area (e.g. a click without drag).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 || self.height == 0.0
    }

    /// Whether either side of this box is shorter than `min`.
    #[inline]
    pub fn is_smaller_than(&self, min: f64) -> bool {
        self.width < min || self.height < min
    }

    /// Clips this box to `0..size.width` and `0..size.height`.
    ///
    /// A box entirely outside `size` collapses to zero area on the nearest edge.
    pub fn clamp_to(&self, size: Size) -> BoundingBox {
        let left = self.left.clamp(0.0, size.width);
        let top = self.top.clamp(0.0, size.height);
        let right = self.right().clamp(0.0, size.width);
        let bottom = self.bottom().clamp(0.0, size.height);

        BoundingBox {
            left,
            top,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Rescales this box from a surface of size `from` into a surface of size `to`.
    ///
    /// Used to map a selection drawn over the displayed video element into the pixel space of
    /// the video frame. Returns the box unchanged when `from` cannot be divided by.
    pub fn scale(&self, from: Size, to: Size) -> BoundingBox {
        if from.is_degenerate() {
            return *self;
        }

        let sx = to.width / from.width;
        let sy = to.height / from.height;
        BoundingBox {
            left: self.left * sx,
            top: self.top * sy,
            width: self.width * sx,
            height: self.height * sy,
        }
    }
}

/// The body of a start tracking command in video frame pixels.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug, Serialize, Deserialize)]
pub struct TrackingTarget {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl From<BoundingBox> for TrackingTarget {
    fn from(value: BoundingBox) -> Self {
        Self {
            x: value.left.round() as i32,
            y: value.top.round() as i32,
            width: value.width.round() as i32,
            height: value.height.round() as i32,
        }
    }
}

impl From<[f64; 4]> for BoundingBox {
    /// Converts an `[x, y, width, height]` array as reported in telemetry.
    fn from([left, top, width, height]: [f64; 4]) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_corners_independent_of_direction() {
        let expected = BoundingBox {
            left: 5.0,
            top: 10.0,
            width: 45.0,
            height: 70.0,
        };
        let a = Position::new(5.0, 10.0);
        let b = Position::new(50.0, 80.0);
        let c = Position::new(5.0, 80.0);
        let d = Position::new(50.0, 10.0);

        assert_eq!(BoundingBox::from_corners(a, b), expected);
        assert_eq!(BoundingBox::from_corners(b, a), expected);
        assert_eq!(BoundingBox::from_corners(c, d), expected);
        assert_eq!(BoundingBox::from_corners(d, c), expected);
    }

    #[test]
    fn from_corners_non_negative_with_negative_coordinates() {
        let bbox =
            BoundingBox::from_corners(Position::new(-20.0, 15.0), Position::new(-60.0, -5.0));

        assert_eq!(bbox.left, -60.0);
        assert_eq!(bbox.top, -5.0);
        assert_eq!(bbox.width, 40.0);
        assert_eq!(bbox.height, 20.0);
        assert!(bbox.width >= 0.0 && bbox.height >= 0.0);
    }

    #[test]
    fn relative_to_subtracts_origin() {
        let local = Position::new(130.0, 75.5).relative_to(Position::new(100.0, 50.0));

        assert_eq!(local, Position::new(30.0, 25.5));
    }

    #[test]
    fn empty_and_small() {
        let point = BoundingBox::from_corners(Position::new(3.0, 3.0), Position::new(3.0, 3.0));
        let line = BoundingBox::from_corners(Position::new(3.0, 3.0), Position::new(30.0, 3.0));
        let small = BoundingBox::from_corners(Position::new(0.0, 0.0), Position::new(3.0, 30.0));

        assert!(point.is_empty());
        assert!(line.is_empty());
        assert!(!small.is_empty());
        assert!(small.is_smaller_than(4.0));
        assert!(!small.is_smaller_than(3.0));
    }

    #[test]
    fn scale_to_frame_size() {
        let bbox = BoundingBox {
            left: 10.0,
            top: 20.0,
            width: 100.0,
            height: 50.0,
        };
        let scaled = bbox.scale(Size::new(320.0, 240.0), Size::new(640.0, 480.0));

        assert_eq!(
            scaled,
            BoundingBox {
                left: 20.0,
                top: 40.0,
                width: 200.0,
                height: 100.0,
            }
        );
        assert_eq!(bbox.scale(Size::new(0.0, 240.0), Size::new(640.0, 480.0)), bbox);
    }

    #[test]
    fn tracking_target_rounds_to_pixels() {
        let target = TrackingTarget::from(BoundingBox {
            left: 10.4,
            top: 20.5,
            width: 99.6,
            height: 0.2,
        });

        assert_eq!(
            target,
            TrackingTarget {
                x: 10,
                y: 21,
                width: 100,
                height: 0,
            }
        );
        assert_eq!(
            serde_json::to_value(target).unwrap(),
            serde_json::json!({ "x": 10, "y": 21, "width": 100, "height": 0 })
        );
    }

    #[test]
    fn telemetry_box_scales_back_to_surface() {
        let bbox = BoundingBox::from([200.0, 100.0, 64.0, 48.0]);

        assert_eq!(
            bbox.scale(Size::new(640.0, 480.0), Size::new(320.0, 240.0)),
            BoundingBox {
                left: 100.0,
                top: 50.0,
                width: 32.0,
                height: 24.0,
            }
        );
    }

    #[test]
    fn clamp_to_frame() {
        let frame = Size::new(640.0, 480.0);
        let overhanging =
            BoundingBox::from_corners(Position::new(-20.0, 400.0), Position::new(100.0, 520.0));
        let outside =
            BoundingBox::from_corners(Position::new(700.0, 10.0), Position::new(800.0, 50.0));
        let inside =
            BoundingBox::from_corners(Position::new(10.0, 10.0), Position::new(50.0, 50.0));

        assert_eq!(
            overhanging.clamp_to(frame),
            BoundingBox {
                left: 0.0,
                top: 400.0,
                width: 100.0,
                height: 80.0,
            }
        );
        assert!(outside.clamp_to(frame).is_empty());
        assert_eq!(outside.clamp_to(frame).left, 640.0);
        assert_eq!(inside.clamp_to(frame), inside);
    }
}
