use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::Duration,
};

use anyhow::{Result, anyhow};
use log::{debug, error, info, warn};
use tokio::{
    select,
    sync::broadcast::{Sender, channel},
    task::spawn_blocking,
};

use crate::{
    CommandOutcome, DeviceState, Request, Response, Settings,
    client::{Controller, HttpController},
    database,
    poller::StatusPoller,
    take_request_receiver,
};

/// Starts the background runtime serving UI requests and polling device status.
///
/// Calling this more than once does nothing.
pub fn init() {
    static LOOPING: AtomicBool = AtomicBool::new(false);

    if LOOPING
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::Acquire)
        .is_ok()
    {
        thread::spawn(|| {
            let tokio_rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .unwrap();
            tokio_rt.block_on(async {
                run_loop().await;
            });
        });
    }
}

async fn run_loop() {
    let Some(mut requests) = take_request_receiver() else {
        error!(target: "run", "request receiver already taken");
        return;
    };
    let settings = spawn_blocking(database::query_settings).await.unwrap();
    let mut runner = Runner::new(&settings, HttpController::new);
    info!(target: "run", "polling {} every {:?}", settings.controller_url, runner.poller.period());

    loop {
        select! {
            Some((request, tx)) = requests.recv() => {
                let response = runner.handle(request).await;
                let _ = tx.send(response);
            }
            _ = runner.poller.tick() => {
                runner.poll_status().await;
            }
        }
    }
}

/// Owns the controller client, the status poller and the last known [`DeviceState`].
#[derive(Debug)]
struct Runner<C> {
    /// `None` when the configured controller url is unusable.
    controller: Option<C>,
    build: fn(&Settings) -> Result<C>,
    poller: StatusPoller,
    state: DeviceState,
    state_tx: Sender<DeviceState>,
}

impl<C: Controller> Runner<C> {
    fn new(settings: &Settings, build: fn(&Settings) -> Result<C>) -> Self {
        Self {
            controller: build_controller(settings, build),
            build,
            poller: StatusPoller::from_millis(settings.status_interval_millis),
            state: DeviceState::default(),
            state_tx: channel(5).0,
        }
    }

    fn controller(&self) -> Result<&C> {
        self.controller
            .as_ref()
            .ok_or(anyhow!("controller url is not configured correctly"))
    }

    fn publish(&self) {
        let _ = self.state_tx.send(self.state.clone());
    }

    /// Restarts the polling period after a command and publishes the optimistic state.
    fn commanded(&mut self) {
        self.poller.reset();
        self.publish();
    }

    async fn handle(&mut self, request: Request) -> Response {
        debug!(target: "run", "handling {request:?}");
        match request {
            Request::StartTracking(target) => {
                let result = async { self.controller()?.start_tracking(target).await }.await;
                let started = log_result("start tracking", result).is_some();
                if started {
                    self.state.tracker.tracker_started = true;
                    self.commanded();
                }
                Response::StartTracking(started)
            }
            Request::StopTracking => {
                let result = async { self.controller()?.stop_tracking().await }.await;
                let stopped = log_result("stop tracking", result).is_some();
                if stopped {
                    self.state.tracker.tracker_started = false;
                    self.state.tracker.bounding_box = None;
                    // The controller drops segmentation together with the tracker
                    self.state.segmentation_active = false;
                    self.commanded();
                }
                Response::StopTracking(stopped)
            }
            Request::ToggleSegmentation => {
                let result = async { self.controller()?.toggle_segmentation().await }.await;
                let active = log_result("toggle segmentation", result);
                if let Some(active) = active {
                    self.state.segmentation_active = active;
                    self.commanded();
                }
                Response::ToggleSegmentation(active)
            }
            Request::Redetect => {
                let result = async { self.controller()?.redetect().await }.await;
                let outcome = log_result("redetect", result);
                if let Some(outcome) = outcome.as_ref() {
                    if !outcome.success {
                        warn!(target: "run", "redetect unsuccessful {}", outcome.message);
                    }
                    self.commanded();
                }
                Response::Redetect(outcome)
            }
            Request::StartFollowing => {
                let result = async { self.controller()?.start_following().await }.await;
                let outcome = log_result("start following", result);
                if let Some(outcome) = outcome.as_ref() {
                    log_outcome("start following", outcome);
                    if outcome.succeeded() {
                        self.state.follower.following_active = true;
                    }
                    self.commanded();
                }
                Response::StartFollowing(outcome)
            }
            Request::StopFollowing => {
                let result = async { self.controller()?.stop_following().await }.await;
                let outcome = log_result("stop following", result);
                if let Some(outcome) = outcome.as_ref() {
                    log_outcome("stop following", outcome);
                    if outcome.succeeded() {
                        self.state.follower.following_active = false;
                    }
                    self.commanded();
                }
                Response::StopFollowing(outcome)
            }
            Request::Quit => {
                let result = async { self.controller()?.quit().await }.await;
                let outcome = log_result("quit", result);
                if let Some(outcome) = outcome.as_ref() {
                    log_outcome("quit", outcome);
                }
                Response::Quit(outcome)
            }
            Request::UpdateSettings(settings) => {
                self.update_settings(&settings);
                Response::UpdateSettings
            }
            Request::DeviceStateReceiver => {
                let receiver = self.state_tx.subscribe();
                self.publish();
                Response::DeviceStateReceiver(receiver)
            }
        }
    }

    fn update_settings(&mut self, settings: &Settings) {
        self.controller = build_controller(settings, self.build);
        self.poller
            .set_period(Duration::from_millis(settings.status_interval_millis));
        info!(
            target: "run",
            "settings applied, polling {} every {:?}",
            settings.controller_url,
            self.poller.period()
        );
    }

    /// Queries tracker and follower status and publishes the resulting [`DeviceState`].
    ///
    /// A failed query marks the device disconnected and keeps the previous value of whatever
    /// could not be queried.
    async fn poll_status(&mut self) {
        let Some(controller) = self.controller.as_ref() else {
            self.set_connected(false);
            self.publish();
            return;
        };

        let (tracker, follower) =
            tokio::join!(controller.tracker_status(), controller.follower_status());
        let mut connected = true;
        match tracker {
            Ok(tracker) => self.state.tracker = tracker,
            Err(err) => {
                connected = false;
                debug!(target: "run", "polling tracker status failed {err:#}");
            }
        }
        match follower {
            Ok(follower) => self.state.follower = follower,
            Err(err) => {
                connected = false;
                debug!(target: "run", "polling follower status failed {err:#}");
            }
        }
        self.set_connected(connected);
        self.publish();
    }

    fn set_connected(&mut self, connected: bool) {
        if self.state.connected != connected {
            if connected {
                info!(target: "run", "controller connected");
            } else {
                warn!(target: "run", "controller disconnected");
            }
        }
        self.state.connected = connected;
    }
}

fn build_controller<C>(settings: &Settings, build: fn(&Settings) -> Result<C>) -> Option<C> {
    build(settings)
        .inspect_err(|err| {
            error!(target: "run", "failed to create controller client {err:#}");
        })
        .ok()
}

fn log_result<T>(command: &str, result: Result<T>) -> Option<T> {
    result
        .inspect(|_| {
            info!(target: "run", "{command} succeeded");
        })
        .inspect_err(|err| {
            error!(target: "run", "{command} failed {err:#}");
        })
        .ok()
}

fn log_outcome(command: &str, outcome: &CommandOutcome) {
    for step in outcome.steps.iter() {
        debug!(target: "run", "{command}: {step}");
    }
    for error in outcome.errors.iter() {
        error!(target: "run", "{command}: {error}");
    }
}
