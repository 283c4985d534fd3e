use std::rc::Rc;

use backend::{
    BoundingBox, BoundingBoxSelector, Drag, GesturePoint, GestureSource, Position, SelectorState,
    Size,
};
use dioxus::{document::EvalError, html::input_data::MouseButton, prelude::*};
use log::debug;

const VIDEO_FEED_ID: &str = "video-feed";
const FRAME_SIZE_JS: &str = r#"
    const frameInterval = setInterval(async () => {
        const feed = document.getElementById("video-feed");
        if (feed !== null && feed.naturalWidth > 0 && feed.naturalHeight > 0) {
            clearInterval(frameInterval);
            await dioxus.send([feed.naturalWidth, feed.naturalHeight]);
        }
    }, 100);
"#;
const WINDOW_BLUR_JS: &str = r#"
    while (true) {
        await new Promise((resolve) => window.addEventListener("blur", resolve, { once: true }));
        await dioxus.send(true);
    }
"#;

/// A finished selection together with the sizes needed to map it onto the video frame.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Selection {
    pub bbox: BoundingBox,
    /// Size of the displayed surface the box was drawn on.
    pub surface: Size,
    /// Intrinsic size of the video frame.
    pub frame: Size,
}

#[derive(Clone, Copy, PartialEq, Debug)]
struct SurfaceRect {
    origin: Position,
    size: Size,
}

/// The video feed with the bounding box selector layered over it.
///
/// The selector is owned by the caller so that it can be armed or cancelled from elsewhere on the
/// page. This component only forwards gesture events to it and draws its preview. `tracked` is in
/// frame pixels and is scaled onto the surface for drawing.
#[component]
pub fn VideoSurface(
    mut selector: Signal<BoundingBoxSelector>,
    feed_url: ReadSignal<String>,
    connected: ReadSignal<bool>,
    tracked: ReadSignal<Option<BoundingBox>>,
    on_select: Callback<Selection>,
) -> Element {
    let mut element = use_signal(|| None::<Rc<MountedData>>);
    let rect = use_signal(|| None::<SurfaceRect>);
    let mut frame = use_signal(|| None::<Size>);
    let mut feed_error = use_signal(|| false);
    let mut feed_attempt = use_signal(|| 0_u32);

    let feed_src = use_memo(move || {
        let url = feed_url();
        match feed_attempt() {
            0 => url,
            attempt => format!("{url}?attempt={attempt}"),
        }
    });
    let preview = use_memo(move || selector().preview());
    let tracked_on_surface = use_memo(move || {
        let surface = rect()?.size;
        let frame = frame().unwrap_or(surface);
        tracked().map(|bbox| bbox.scale(frame, surface))
    });
    let mouse_dragging = use_memo(move || {
        matches!(
            selector().state(),
            SelectorState::Dragging(Drag {
                source: GestureSource::Mouse,
                ..
            })
        )
    });
    let capturing = use_memo(move || !matches!(selector().state(), SelectorState::Idle));
    let aspect_ratio = use_memo(move || {
        frame()
            .filter(|frame| !frame.is_degenerate())
            .map(|frame| format!("aspect-ratio: {} / {};", frame.width, frame.height))
            .unwrap_or_else(|| "aspect-ratio: 16 / 9;".to_string())
    });

    let emit = use_callback(move |bbox: BoundingBox| {
        let Some(surface) = rect.peek().map(|rect| rect.size) else {
            return;
        };
        let frame = frame.peek().unwrap_or(surface);
        on_select(Selection {
            bbox,
            surface,
            frame,
        });
    });
    // Starts from the last known rect so the end event of a quick click still finds a drag, then
    // refreshes the rect for the moves that follow
    let start = use_callback(move |(source, client): (GestureSource, Position)| {
        let started = start_gesture(&mut selector.write(), *rect.peek(), source, client);
        spawn(async move {
            let measured = measure(rect, element()).await;
            if !started {
                start_gesture(&mut selector.write(), measured, source, client);
            }
        });
    });
    let drag = use_callback(move |(source, client): (GestureSource, Position)| {
        let Some(origin) = rect.peek().map(|rect| rect.origin) else {
            return;
        };
        selector
            .write()
            .on_gesture_move(GesturePoint::new(source, client, origin));
    });
    let end = use_callback(move |source: GestureSource| {
        if !selector.peek().is_dragging() {
            return;
        }
        let selected = selector.write().on_gesture_end(source);
        if let Some(bbox) = selected {
            emit(bbox);
        }
    });

    // Reads the intrinsic frame size once the feed starts showing frames
    use_effect(move || {
        let _ = feed_src();
        spawn(async move {
            let mut eval = document::eval(FRAME_SIZE_JS);
            if let Ok((width, height)) = eval.recv::<(f64, f64)>().await {
                debug!(target: "surface", "video frame size {width}x{height}");
                frame.set(Some(Size::new(width, height)));
            }
        });
    });
    // Retries the feed when the controller becomes reachable again
    use_effect(move || {
        if connected() && *feed_error.peek() {
            feed_error.set(false);
            feed_attempt += 1;
        }
    });
    // Drops the gesture when the window loses focus
    use_future(move || async move {
        let mut eval = document::eval(WINDOW_BLUR_JS);
        loop {
            match eval.recv::<bool>().await {
                Ok(_) => {
                    if selector.peek().is_dragging() {
                        selector.write().cancel();
                    }
                }
                Err(EvalError::Finished) => eval = document::eval(WINDOW_BLUR_JS),
                Err(_) => break,
            }
        }
    });

    rsx! {
        div {
            class: "relative w-full max-h-full bg-black select-none overflow-hidden data-[capturing=true]:cursor-crosshair",
            style: "{aspect_ratio} touch-action: {touch_action(capturing())};",
            "data-capturing": capturing(),
            onmounted: move |e: MountedEvent| async move {
                element.set(Some(e.data()));
                measure(rect, element()).await;
            },
            onresize: move |_| async move {
                measure(rect, element()).await;
            },
            onmousedown: move |e: MouseEvent| {
                if e.trigger_button() != Some(MouseButton::Primary) || !selector.peek().is_armed() {
                    return;
                }
                e.prevent_default();
                start((GestureSource::Mouse, client_position(&e)));
            },
            onmouseup: move |e: MouseEvent| {
                if e.trigger_button() == Some(MouseButton::Primary) {
                    end(GestureSource::Mouse);
                }
            },
            ontouchstart: move |e: TouchEvent| {
                if !selector.peek().is_armed() {
                    return;
                }
                e.prevent_default();
                if let Some(touch) = e.touches_changed().first() {
                    let point = touch.client_coordinates();
                    start((
                        GestureSource::Touch(touch.identifier()),
                        Position::new(point.x, point.y),
                    ));
                }
            },
            ontouchmove: move |e: TouchEvent| {
                if !selector.peek().is_dragging() {
                    return;
                }
                e.prevent_default();
                for touch in e.touches_changed() {
                    let point = touch.client_coordinates();
                    drag((
                        GestureSource::Touch(touch.identifier()),
                        Position::new(point.x, point.y),
                    ));
                }
            },
            ontouchend: move |e: TouchEvent| {
                if !selector.peek().is_dragging() {
                    return;
                }
                e.prevent_default();
                for touch in e.touches_changed() {
                    end(GestureSource::Touch(touch.identifier()));
                }
            },
            ontouchcancel: move |_| {
                selector.write().cancel();
            },
            if feed_error() {
                div { class: "absolute inset-0 flex items-center justify-center text-sm text-secondary-text",
                    "Video feed unavailable"
                }
            } else {
                img {
                    id: VIDEO_FEED_ID,
                    class: "absolute inset-0 size-full object-fill pointer-events-none",
                    draggable: false,
                    alt: "Video feed",
                    src: feed_src(),
                    onerror: move |_| {
                        debug!(target: "surface", "video feed failed to load");
                        feed_error.set(true);
                        frame.set(None);
                    },
                }
            }
            if let Some(bbox) = tracked_on_surface() {
                BoxOverlay { bbox, class: "border-2 border-tracked-border" }
            }
            if let Some(bbox) = preview() {
                BoxOverlay { bbox, class: "border-2 border-dashed border-selection-border" }
            }
            if selector().is_armed() {
                div { class: "absolute top-2 left-2 px-2 py-1 text-xs text-primary-text bg-overlay-surface pointer-events-none",
                    "Drag over the video to select a target"
                }
            }
            if mouse_dragging() {
                // Keeps receiving the drag after the pointer leaves the surface
                div {
                    class: "fixed inset-0 z-50 cursor-crosshair",
                    onmousemove: move |e: MouseEvent| {
                        drag((GestureSource::Mouse, client_position(&e)));
                    },
                    onmouseup: move |e: MouseEvent| {
                        e.stop_propagation();
                        if e.trigger_button() == Some(MouseButton::Primary) {
                            end(GestureSource::Mouse);
                        }
                    },
                }
            }
        }
    }
}

#[component]
fn BoxOverlay(bbox: BoundingBox, class: String) -> Element {
    rsx! {
        div {
            class: "absolute pointer-events-none {class}",
            style: "left: {bbox.left}px; top: {bbox.top}px; width: {bbox.width}px; height: {bbox.height}px;",
        }
    }
}

fn touch_action(capturing: bool) -> &'static str {
    if capturing { "none" } else { "auto" }
}

fn client_position(event: &MouseEvent) -> Position {
    let point = event.client_coordinates();
    Position::new(point.x, point.y)
}

/// Starts a drag on `selector` at `client`, relative to the surface at `rect`.
///
/// Does nothing until the surface has been measured.
fn start_gesture(
    selector: &mut BoundingBoxSelector,
    rect: Option<SurfaceRect>,
    source: GestureSource,
    client: Position,
) -> bool {
    let Some(rect) = rect else {
        return false;
    };
    selector.on_gesture_start(GesturePoint::new(source, client, rect.origin))
}

/// Reads the surface's client rect and stores it in `rect`.
async fn measure(
    mut rect: Signal<Option<SurfaceRect>>,
    element: Option<Rc<MountedData>>,
) -> Option<SurfaceRect> {
    let client_rect = element?.get_client_rect().await.ok()?;
    let measured = SurfaceRect {
        origin: Position::new(client_rect.origin.x, client_rect.origin.y),
        size: Size::new(client_rect.size.width, client_rect.size.height),
    };
    if *rect.peek() != Some(measured) {
        rect.set(Some(measured));
    }

    Some(measured)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_rect() -> SurfaceRect {
        SurfaceRect {
            origin: Position::new(100.0, 50.0),
            size: Size::new(640.0, 360.0),
        }
    }

    #[test]
    fn click_without_movement_selects_point() {
        let mut selector = BoundingBoxSelector::new();
        selector.arm();

        assert!(start_gesture(
            &mut selector,
            Some(surface_rect()),
            GestureSource::Mouse,
            Position::new(130.0, 90.0),
        ));
        let bbox = selector.on_gesture_end(GestureSource::Mouse).unwrap();

        assert_eq!(bbox.left, 30.0);
        assert_eq!(bbox.top, 40.0);
        assert!(bbox.is_empty());
        assert!(!selector.is_armed());
    }

    #[test]
    fn gesture_waits_for_measured_surface() {
        let mut selector = BoundingBoxSelector::new();
        selector.arm();

        assert!(!start_gesture(
            &mut selector,
            None,
            GestureSource::Touch(1),
            Position::new(130.0, 90.0),
        ));
        assert!(selector.is_armed());
    }

    #[test]
    fn gesture_ignored_when_not_armed() {
        let mut selector = BoundingBoxSelector::new();

        assert!(!start_gesture(
            &mut selector,
            Some(surface_rect()),
            GestureSource::Mouse,
            Position::new(130.0, 90.0),
        ));
        assert!(selector.on_gesture_end(GestureSource::Mouse).is_none());
    }
}
