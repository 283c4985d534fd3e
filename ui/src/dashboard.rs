use backend::{
    BoundingBox, BoundingBoxSelector, CommandOutcome, Settings, quit, redetect, start_following,
    start_tracking, stop_following, stop_tracking, toggle_segmentation,
};
use dioxus::prelude::*;
use log::info;

use crate::{
    AppState,
    components::{
        button::{Button, ButtonStyle},
        indicator::Indicator,
    },
    surface::{Selection, VideoSurface},
};

#[component]
pub fn DashboardScreen() -> Element {
    let settings = use_context::<AppState>().settings;
    let device = use_context::<AppState>().device;
    let selector = use_signal(BoundingBoxSelector::new);
    // Whether this page started tracking, reconciled with the tracker status on each poll
    let mut tracking = use_signal(|| false);
    let mut message = use_signal(|| None::<String>);

    let settings_view = use_memo(move || settings().unwrap_or_default());
    let feed_url = use_memo(move || settings_view().video_feed_url());
    let connected = use_memo(move || device().is_some_and(|state| state.connected));
    let tracked = use_memo(move || {
        device()
            .filter(|state| state.connected && state.tracker.tracker_started)
            .and_then(|state| state.tracker.bounding_box)
            .map(BoundingBox::from)
    });

    use_effect(move || {
        if let Some(state) = device()
            && state.connected
            && *tracking.peek() != state.tracker.tracker_started
        {
            tracking.set(state.tracker.tracker_started);
        }
    });

    let on_select = use_callback(move |selection: Selection| {
        let bbox = selection.bbox;
        if let Some(rejected) = reject_reason(&settings_view.peek(), bbox) {
            info!(target: "dashboard", "selection {bbox:?} ignored, {rejected}");
            message.set(Some(format!("Selection ignored, {rejected}")));
            return;
        }

        spawn(async move {
            if start_tracking(bbox, selection.surface, selection.frame).await {
                tracking.set(true);
                message.set(None);
            } else {
                message.set(Some("Failed to start tracking".to_string()));
            }
        });
    });

    rsx! {
        div { class: "flex flex-col gap-3 py-2",
            VideoSurface {
                selector,
                feed_url: feed_url(),
                connected: connected(),
                tracked: tracked(),
                on_select,
            }
            Indicators { tracking }
            Buttons { selector, tracking, message }
            if let Some(message) = message() {
                p { class: "text-xs text-secondary-text", {message} }
            }
            Info {}
        }
    }
}

#[component]
fn Indicators(tracking: ReadSignal<bool>) -> Element {
    let device = use_context::<AppState>().device;
    let connected = use_memo(move || device().is_some_and(|state| state.connected));
    let following = use_memo(move || device().is_some_and(|state| state.follower.following_active));
    let segmentation = use_memo(move || device().is_some_and(|state| state.segmentation_active));

    rsx! {
        div { class: "flex flex-wrap gap-4",
            Indicator {
                label: "Connection",
                on: connected(),
                text: if connected() { "Connected" } else { "Disconnected" },
            }
            Indicator { label: "Tracking", on: tracking() }
            Indicator { label: "Following", on: following() }
            Indicator { label: "Segmentation", on: segmentation() }
        }
    }
}

#[component]
fn Buttons(
    mut selector: Signal<BoundingBoxSelector>,
    mut tracking: Signal<bool>,
    mut message: Signal<Option<String>>,
) -> Element {
    let device = use_context::<AppState>().device;
    let disabled = use_memo(move || !device().is_some_and(|state| state.connected));
    let following = use_memo(move || device().is_some_and(|state| state.follower.following_active));
    let segmentation = use_memo(move || device().is_some_and(|state| state.segmentation_active));
    let selecting = use_memo(move || selector().is_armed() || selector().is_dragging());

    rsx! {
        div { class: "flex flex-wrap items-center gap-2",
            Button {
                class: "w-28",
                style: ButtonStyle::Primary,
                active: selecting(),
                on_click: move |_| {
                    let mut selector = selector.write();
                    if !selector.disarm() && !selector.cancel() {
                        selector.arm();
                    }
                },
                if selecting() {
                    "Cancel"
                } else {
                    "Select target"
                }
            }
            Button {
                class: "w-28",
                style: ButtonStyle::Primary,
                disabled: disabled() || !tracking(),
                on_click: move |_| async move {
                    if stop_tracking().await {
                        tracking.set(false);
                        message.set(None);
                    } else {
                        message.set(Some("Failed to stop tracking".to_string()));
                    }
                },
                "Stop tracking"
            }
            Button {
                class: "w-28",
                style: ButtonStyle::Secondary,
                disabled: disabled(),
                active: segmentation(),
                on_click: move |_| async move {
                    match toggle_segmentation().await {
                        Some(_) => message.set(None),
                        None => message.set(Some("Failed to toggle segmentation".to_string())),
                    }
                },
                "Segmentation"
            }
            Button {
                class: "w-28",
                style: ButtonStyle::Secondary,
                disabled: disabled(),
                on_click: move |_| async move {
                    let text = match redetect().await {
                        Some(outcome) if outcome.success => "Re-detected target".to_string(),
                        Some(outcome) => format!("Re-detect failed, {}", outcome.message),
                        None => "Failed to re-detect".to_string(),
                    };
                    message.set(Some(text));
                },
                "Re-detect"
            }
            Button {
                class: "w-28",
                style: ButtonStyle::Secondary,
                disabled: disabled(),
                active: following(),
                on_click: move |_| async move {
                    let outcome = if *following.peek() {
                        stop_following().await
                    } else {
                        start_following().await
                    };
                    message.set(outcome_message(outcome));
                },
                if following() {
                    "Unfollow"
                } else {
                    "Follow"
                }
            }
            Button {
                class: "w-28",
                style: ButtonStyle::Danger,
                disabled: disabled(),
                on_click: move |_| async move {
                    let outcome = quit().await;
                    message.set(outcome_message(outcome));
                },
                "Quit"
            }
        }
    }
}

#[component]
fn Info() -> Element {
    #[derive(Debug, PartialEq, Clone)]
    struct DeviceInfo {
        tracked_box: String,
        center: String,
        normalized_center: String,
        profile: String,
    }

    let device = use_context::<AppState>().device;
    let info = use_memo(move || {
        let mut info = DeviceInfo {
            tracked_box: "None".to_string(),
            center: "None".to_string(),
            normalized_center: "None".to_string(),
            profile: "Unknown".to_string(),
        };

        if let Some(state) = device() {
            if let Some([x, y, width, height]) = state.tracker.bounding_box {
                info.tracked_box = format!("{x:.0}, {y:.0}, {width:.0} x {height:.0}");
            }
            if let Some([x, y]) = state.tracker.center {
                info.center = format!("{x:.0}, {y:.0}");
            }
            if let Some([x, y]) = state.tracker.normalized_center {
                info.normalized_center = format!("{x:.3}, {y:.3}");
            }
            if let Some(profile) = state.follower.profile_name {
                info.profile = profile;
            }
        }

        info
    });

    rsx! {
        div { class: "grid grid-cols-2 items-center justify-center py-3 gap-1 max-w-md",
            InfoItem { name: "Tracked box", value: info().tracked_box }
            InfoItem { name: "Center", value: info().center }
            InfoItem { name: "Normalized center", value: info().normalized_center }
            InfoItem { name: "Follower profile", value: info().profile }
        }
    }
}

#[component]
fn InfoItem(name: String, value: String) -> Element {
    rsx! {
        p { class: "text-sm text-primary-text font-mono", "{name}" }
        p { class: "text-sm text-primary-text text-right font-mono", "{value}" }
    }
}

/// Checks `bbox` against the selection policy in `settings`.
///
/// A box without area is only judged by `ignore_empty_selection`, the minimum size applies to
/// boxes that have one.
fn reject_reason(settings: &Settings, bbox: BoundingBox) -> Option<String> {
    if bbox.is_empty() {
        return settings
            .ignore_empty_selection
            .then(|| "the box has no area".to_string());
    }
    if bbox.is_smaller_than(settings.min_selection_size) {
        return Some(format!(
            "the box is smaller than {}px",
            settings.min_selection_size
        ));
    }

    None
}

fn outcome_message(outcome: Option<CommandOutcome>) -> Option<String> {
    match outcome {
        Some(outcome) if outcome.succeeded() => outcome.steps.last().cloned(),
        Some(outcome) => Some(outcome.errors.join(", ")),
        None => Some("Controller did not respond".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use backend::Position;

    use super::*;

    fn bbox(width: f64, height: f64) -> BoundingBox {
        BoundingBox::from_corners(
            Position::new(10.0, 10.0),
            Position::new(10.0 + width, 10.0 + height),
        )
    }

    #[test]
    fn empty_selection_rejected_only_when_ignored() {
        let mut settings = Settings {
            min_selection_size: 0.0,
            ..Settings::default()
        };

        assert!(reject_reason(&settings, bbox(0.0, 0.0)).is_some());

        settings.ignore_empty_selection = false;
        assert!(reject_reason(&settings, bbox(0.0, 0.0)).is_none());
    }

    #[test]
    fn empty_selection_kept_despite_minimum_size() {
        let settings = Settings {
            ignore_empty_selection: false,
            ..Settings::default()
        };

        assert!(settings.min_selection_size > 0.0);
        assert!(reject_reason(&settings, bbox(0.0, 0.0)).is_none());
        assert!(reject_reason(&settings, bbox(0.0, 40.0)).is_none());
        assert!(reject_reason(&settings, bbox(2.0, 40.0)).is_some());
    }

    #[test]
    fn small_selection_rejected() {
        let settings = Settings::default();

        assert!(reject_reason(&settings, bbox(3.0, 40.0)).is_some());
        assert!(reject_reason(&settings, bbox(40.0, 40.0)).is_none());
    }

    #[test]
    fn outcome_message_reports_errors() {
        let failed = CommandOutcome {
            steps: vec!["Connected to drone.".to_string()],
            errors: vec!["Offboard mode rejected".to_string()],
        };
        let succeeded = CommandOutcome {
            steps: vec![
                "Connected to drone.".to_string(),
                "Offboard mode started.".to_string(),
            ],
            errors: vec![],
        };

        assert_eq!(outcome_message(Some(failed)).unwrap(), "Offboard mode rejected");
        assert_eq!(outcome_message(Some(succeeded)).unwrap(), "Offboard mode started.");
        assert!(outcome_message(None).is_some());
    }
}
