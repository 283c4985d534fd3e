//! Bounding box selection over the video surface.
//!
//! [`BoundingBoxSelector`] turns a mouse or touch drag into a [`BoundingBox`] in the surface's
//! local coordinates. It only owns gesture-local state. Whether tracking is active is owned by
//! the caller, which arms the selector when it wants a new target and receives the finished box
//! as the return value of [`BoundingBoxSelector::on_gesture_end`].

use log::debug;

use crate::{BoundingBox, Position};

/// Where a gesture event came from.
///
/// Touch events carry the identifier of the touch point so that only the touch point that
/// started the gesture drives it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GestureSource {
    Mouse,
    Touch(i32),
}

/// A raw gesture coordinate together with the surface origin it is measured against.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct GesturePoint {
    pub source: GestureSource,
    /// Position in client (viewport) coordinates.
    pub client: Position,
    /// Top-left corner of the surface in client coordinates at the time of the event.
    pub origin: Position,
}

impl GesturePoint {
    pub fn new(source: GestureSource, client: Position, origin: Position) -> Self {
        Self {
            source,
            client,
            origin,
        }
    }

    #[inline]
    fn local(&self) -> Position {
        self.client.relative_to(self.origin)
    }
}

/// An in-progress drag.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Drag {
    pub source: GestureSource,
    pub start: Position,
    pub current: Position,
}

#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub enum SelectorState {
    /// Not armed, every gesture event is ignored.
    #[default]
    Idle,
    /// Armed and waiting for a gesture to begin.
    Armed,
    Dragging(Drag),
}

#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct BoundingBoxSelector {
    state: SelectorState,
}

impl BoundingBoxSelector {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn state(&self) -> SelectorState {
        self.state
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        matches!(self.state, SelectorState::Armed)
    }

    #[inline]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, SelectorState::Dragging(_))
    }

    /// The box spanned by the current drag, if any.
    pub fn preview(&self) -> Option<BoundingBox> {
        match self.state {
            SelectorState::Dragging(drag) => {
                Some(BoundingBox::from_corners(drag.start, drag.current))
            }
            SelectorState::Idle | SelectorState::Armed => None,
        }
    }

    /// Arms the selector so the next gesture draws a box.
    ///
    /// Returns `true` if this call changed the state. Arming while armed or dragging does
    /// nothing.
    pub fn arm(&mut self) -> bool {
        if !matches!(self.state, SelectorState::Idle) {
            return false;
        }
        debug!(target: "selector", "armed");
        self.state = SelectorState::Armed;
        true
    }

    /// Leaves the armed state without a gesture.
    pub fn disarm(&mut self) -> bool {
        if !matches!(self.state, SelectorState::Armed) {
            return false;
        }
        debug!(target: "selector", "disarmed");
        self.state = SelectorState::Idle;
        true
    }

    /// Abandons any armed state or in-progress drag without producing a box.
    ///
    /// This is the recovery path for gestures whose end event never arrives, such as when the
    /// window loses focus mid-drag.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            SelectorState::Idle => false,
            SelectorState::Armed | SelectorState::Dragging(_) => {
                debug!(target: "selector", "cancelled from {:?}", self.state);
                self.state = SelectorState::Idle;
                true
            }
        }
    }

    /// Begins a drag at `point`. Only valid while armed.
    pub fn on_gesture_start(&mut self, point: GesturePoint) -> bool {
        if !matches!(self.state, SelectorState::Armed) {
            return false;
        }

        let start = point.local();
        self.state = SelectorState::Dragging(Drag {
            source: point.source,
            start,
            current: start,
        });
        true
    }

    /// Moves the free corner of the current drag to `point`.
    ///
    /// Events from another source than the one that started the drag are ignored. There is no
    /// range check, the box may extend past the surface when the pointer leaves it.
    pub fn on_gesture_move(&mut self, point: GesturePoint) -> bool {
        let SelectorState::Dragging(ref mut drag) = self.state else {
            return false;
        };
        if drag.source != point.source {
            return false;
        }

        drag.current = point.local();
        true
    }

    /// Finishes the current drag and returns its box.
    ///
    /// A click without movement returns a zero-area box, callers decide whether that is a
    /// meaningful selection.
    pub fn on_gesture_end(&mut self, source: GestureSource) -> Option<BoundingBox> {
        let SelectorState::Dragging(drag) = self.state else {
            return None;
        };
        if drag.source != source {
            return None;
        }

        let bbox = BoundingBox::from_corners(drag.start, drag.current);
        debug!(target: "selector", "selected {bbox:?}");
        self.state = SelectorState::Idle;
        Some(bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: Position = Position::new(0.0, 0.0);

    fn mouse(x: f64, y: f64) -> GesturePoint {
        GesturePoint::new(GestureSource::Mouse, Position::new(x, y), ORIGIN)
    }

    fn touch(id: i32, x: f64, y: f64) -> GesturePoint {
        GesturePoint::new(GestureSource::Touch(id), Position::new(x, y), ORIGIN)
    }

    #[test]
    fn scripted_gesture() {
        let mut selector = BoundingBoxSelector::new();

        assert!(selector.arm());
        assert!(selector.on_gesture_start(mouse(10.0, 10.0)));
        assert!(selector.on_gesture_move(mouse(50.0, 30.0)));
        assert!(selector.on_gesture_move(mouse(5.0, 80.0)));

        assert_eq!(
            selector.on_gesture_end(GestureSource::Mouse),
            Some(BoundingBox {
                left: 5.0,
                top: 10.0,
                width: 45.0,
                height: 70.0,
            })
        );
        assert_eq!(selector.state(), SelectorState::Idle);
    }

    #[test]
    fn corners_normalized_in_every_direction() {
        let corners = [
            (0.0, 0.0, 30.0, 20.0),
            (30.0, 20.0, 0.0, 0.0),
            (30.0, 0.0, 0.0, 20.0),
            (0.0, 20.0, 30.0, 0.0),
            (-12.5, 7.0, 3.0, -40.0),
        ];

        for (x0, y0, x1, y1) in corners {
            let mut selector = BoundingBoxSelector::new();
            selector.arm();
            selector.on_gesture_start(mouse(x0, y0));
            selector.on_gesture_move(mouse(x1, y1));
            let bbox = selector.on_gesture_end(GestureSource::Mouse).unwrap();

            assert_eq!(bbox.left, f64::min(x0, x1));
            assert_eq!(bbox.top, f64::min(y0, y1));
            assert_eq!(bbox.width, (x1 - x0).abs());
            assert_eq!(bbox.height, (y1 - y0).abs());
            assert!(bbox.width >= 0.0 && bbox.height >= 0.0);
        }
    }

    #[test]
    fn arm_idempotent() {
        let mut selector = BoundingBoxSelector::new();

        assert!(selector.arm());
        assert!(!selector.arm());
        assert_eq!(selector.state(), SelectorState::Armed);

        selector.on_gesture_start(mouse(1.0, 1.0));
        assert!(!selector.arm());
        assert!(selector.is_dragging());
    }

    #[test]
    fn idle_ignores_gestures() {
        let mut selector = BoundingBoxSelector::new();

        assert!(!selector.on_gesture_start(mouse(10.0, 10.0)));
        assert!(!selector.on_gesture_move(mouse(20.0, 20.0)));
        assert_eq!(selector.on_gesture_end(GestureSource::Mouse), None);
        assert_eq!(selector.state(), SelectorState::Idle);
    }

    #[test]
    fn click_without_drag_is_zero_area() {
        let mut selector = BoundingBoxSelector::new();
        selector.arm();
        selector.on_gesture_start(mouse(42.0, 17.0));

        let bbox = selector.on_gesture_end(GestureSource::Mouse).unwrap();

        assert_eq!(bbox.left, 42.0);
        assert_eq!(bbox.top, 17.0);
        assert_eq!(bbox.width, 0.0);
        assert_eq!(bbox.height, 0.0);
        assert!(bbox.is_empty());
    }

    #[test]
    fn move_after_emission_ignored() {
        let mut selector = BoundingBoxSelector::new();
        selector.arm();
        selector.on_gesture_start(mouse(0.0, 0.0));
        selector.on_gesture_move(mouse(10.0, 10.0));
        selector.on_gesture_end(GestureSource::Mouse);

        assert!(!selector.on_gesture_move(mouse(100.0, 100.0)));
        assert!(!selector.on_gesture_start(mouse(100.0, 100.0)));
        assert_eq!(selector.state(), SelectorState::Idle);
        assert_eq!(selector.preview(), None);
    }

    #[test]
    fn local_coordinates_subtract_origin() {
        let origin = Position::new(200.0, 120.0);
        let mut selector = BoundingBoxSelector::new();
        selector.arm();
        selector.on_gesture_start(GesturePoint::new(
            GestureSource::Mouse,
            Position::new(210.0, 130.0),
            origin,
        ));
        selector.on_gesture_move(GesturePoint::new(
            GestureSource::Mouse,
            Position::new(260.0, 200.0),
            origin,
        ));

        assert_eq!(
            selector.on_gesture_end(GestureSource::Mouse),
            Some(BoundingBox {
                left: 10.0,
                top: 10.0,
                width: 50.0,
                height: 70.0,
            })
        );
    }

    #[test]
    fn out_of_surface_coordinates_kept() {
        let mut selector = BoundingBoxSelector::new();
        selector.arm();
        selector.on_gesture_start(mouse(10.0, 10.0));
        assert!(selector.on_gesture_move(mouse(-500.0, 1e6)));

        let bbox = selector.on_gesture_end(GestureSource::Mouse).unwrap();
        assert_eq!(bbox.left, -500.0);
        assert_eq!(bbox.height, 1e6 - 10.0);
    }

    #[test]
    fn only_primary_touch_tracked() {
        let mut selector = BoundingBoxSelector::new();
        selector.arm();
        selector.on_gesture_start(touch(1, 10.0, 10.0));

        assert!(!selector.on_gesture_move(touch(2, 300.0, 300.0)));
        assert!(!selector.on_gesture_move(mouse(300.0, 300.0)));
        assert!(selector.on_gesture_move(touch(1, 20.0, 40.0)));
        assert_eq!(selector.on_gesture_end(GestureSource::Touch(2)), None);
        assert!(selector.is_dragging());

        assert_eq!(
            selector.on_gesture_end(GestureSource::Touch(1)),
            Some(BoundingBox {
                left: 10.0,
                top: 10.0,
                width: 10.0,
                height: 30.0,
            })
        );
    }

    #[test]
    fn preview_follows_drag() {
        let mut selector = BoundingBoxSelector::new();
        selector.arm();
        assert_eq!(selector.preview(), None);

        selector.on_gesture_start(mouse(30.0, 30.0));
        selector.on_gesture_move(mouse(10.0, 50.0));

        assert_eq!(
            selector.preview(),
            Some(BoundingBox {
                left: 10.0,
                top: 30.0,
                width: 20.0,
                height: 20.0,
            })
        );
    }

    #[test]
    fn cancel_drops_drag_without_emission() {
        let mut selector = BoundingBoxSelector::new();
        selector.arm();
        selector.on_gesture_start(mouse(0.0, 0.0));
        selector.on_gesture_move(mouse(10.0, 10.0));

        assert!(selector.cancel());
        assert_eq!(selector.state(), SelectorState::Idle);
        assert_eq!(selector.on_gesture_end(GestureSource::Mouse), None);
        assert!(!selector.cancel());
    }

    #[test]
    fn disarm_only_when_armed() {
        let mut selector = BoundingBoxSelector::new();
        assert!(!selector.disarm());

        selector.arm();
        assert!(selector.disarm());
        assert_eq!(selector.state(), SelectorState::Idle);

        selector.arm();
        selector.on_gesture_start(mouse(0.0, 0.0));
        assert!(!selector.disarm());
        assert!(selector.is_dragging());
    }
}
