use std::sync::{LazyLock, Mutex};

use tokio::{
    sync::{
        broadcast, mpsc,
        oneshot::{self, Sender},
    },
    task::spawn_blocking,
};

mod client;
mod database;
mod models;
mod poller;
mod run;
mod selector;

pub use {
    models::*,
    run::init,
    selector::{BoundingBoxSelector, Drag, GesturePoint, GestureSource, SelectorState},
};

type PendingRequest = (Request, Sender<Response>);

static REQUESTS: LazyLock<(
    mpsc::UnboundedSender<PendingRequest>,
    Mutex<Option<mpsc::UnboundedReceiver<PendingRequest>>>,
)> = LazyLock::new(|| {
    let (tx, rx) = mpsc::unbounded_channel();
    (tx, Mutex::new(Some(rx)))
});

macro_rules! send_request {
    ($variant:ident $(( $( $field:ident ),* ))?) => {{
        let request = Request::$variant$(( $( $field ),* ))?;
        let (tx, rx) = oneshot::channel();
        REQUESTS.0.send((request, tx)).expect("channel open");

        let response = rx.await.expect("successful response");
        match response {
            Response::$variant => (),
            _ => panic!("mismatch response and request type"),
        }}
    };

    ($variant:ident $(( $( $field:ident ),* ))? => ( $( $response:ident ),+ )) => {{
        let request = Request::$variant$(( $( $field ),* ))?;
        let (tx, rx) = oneshot::channel();
        REQUESTS.0.send((request, tx)).expect("channel open");

        let response = rx.await.expect("successful response");
        match response {
            Response::$variant($( $response ),+) => ($( $response),+),
            _ => panic!("mismatch response and request type"),
        }}
    };
}

/// Represents request from UI.
#[derive(Debug)]
enum Request {
    StartTracking(TrackingTarget),
    StopTracking,
    ToggleSegmentation,
    Redetect,
    StartFollowing,
    StopFollowing,
    Quit,
    UpdateSettings(Settings),
    DeviceStateReceiver,
}

/// Represents response to UI [`Request`].
#[derive(Debug)]
enum Response {
    StartTracking(bool),
    StopTracking(bool),
    ToggleSegmentation(Option<bool>),
    Redetect(Option<RedetectOutcome>),
    StartFollowing(Option<CommandOutcome>),
    StopFollowing(Option<CommandOutcome>),
    Quit(Option<CommandOutcome>),
    UpdateSettings,
    DeviceStateReceiver(broadcast::Receiver<DeviceState>),
}

/// Starts tracking the object selected by `bbox`.
///
/// `bbox` is in the coordinates of the displayed surface of size `surface` and is rescaled to
/// the video frame of size `frame` and clipped to the frame before being sent.
///
/// Returns `true` if the controller accepted the target.
pub async fn start_tracking(bbox: BoundingBox, surface: Size, frame: Size) -> bool {
    let target = TrackingTarget::from(bbox.scale(surface, frame).clamp_to(frame));
    send_request!(StartTracking(target) => (started))
}

/// Stops tracking.
///
/// Returns `true` if the controller accepted the command.
pub async fn stop_tracking() -> bool {
    send_request!(StopTracking => (stopped))
}

/// Toggles segmentation.
///
/// Returns whether segmentation is active afterward or `None` if the command failed.
pub async fn toggle_segmentation() -> Option<bool> {
    send_request!(ToggleSegmentation => (active))
}

/// Asks the controller to re-detect the tracked object.
pub async fn redetect() -> Option<RedetectOutcome> {
    send_request!(Redetect => (outcome))
}

/// Starts following the tracked object.
pub async fn start_following() -> Option<CommandOutcome> {
    send_request!(StartFollowing => (outcome))
}

/// Stops following the tracked object.
pub async fn stop_following() -> Option<CommandOutcome> {
    send_request!(StopFollowing => (outcome))
}

/// Shuts down the controller.
pub async fn quit() -> Option<CommandOutcome> {
    send_request!(Quit => (outcome))
}

/// Applies `settings` to the controller client and the status polling.
pub async fn update_settings(settings: Settings) {
    send_request!(UpdateSettings(settings))
}

/// Subscribes to device state published after each status poll.
///
/// The current state is re-published right after subscribing.
pub async fn device_state_receiver() -> broadcast::Receiver<DeviceState> {
    send_request!(DeviceStateReceiver => (receiver))
}

/// Queries settings from the database.
pub async fn query_settings() -> Settings {
    spawn_blocking(database::query_settings).await.unwrap()
}

/// Upserts `settings` to the database.
///
/// Returns the updated [`Settings`] or original if fails.
pub async fn upsert_settings(mut settings: Settings) -> Settings {
    spawn_blocking(move || {
        let _ = database::upsert_settings(&mut settings);
        settings
    })
    .await
    .unwrap()
}

fn take_request_receiver() -> Option<mpsc::UnboundedReceiver<PendingRequest>> {
    LazyLock::force(&REQUESTS).1.lock().unwrap().take()
}
