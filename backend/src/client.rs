use std::{fmt::Debug, time::Duration};

use anyhow::{Context, Result, bail};
use log::debug;
#[cfg(test)]
use mockall::automock;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    CommandOutcome, FollowerStatus, RedetectOutcome, Settings, TrackerStatus, TrackingTarget,
};

const START_TRACKING: &str = "commands/start_tracking";
const STOP_TRACKING: &str = "commands/stop_tracking";
const TOGGLE_SEGMENTATION: &str = "commands/toggle_segmentation";
const REDETECT: &str = "commands/redetect";
const START_OFFBOARD_MODE: &str = "commands/start_offboard_mode";
const STOP_OFFBOARD_MODE: &str = "commands/stop_offboard_mode";
const QUIT: &str = "commands/quit";
const TRACKER_DATA: &str = "telemetry/tracker_data";
const FOLLOWER_DATA: &str = "telemetry/follower_data";

/// The remote controller operating the tracker and the follower.
#[cfg_attr(test, automock)]
pub(crate) trait Controller: Debug {
    /// Starts tracking the object inside `target`.
    async fn start_tracking(&self, target: TrackingTarget) -> Result<()>;

    async fn stop_tracking(&self) -> Result<()>;

    /// Toggles segmentation and returns whether it is now active.
    async fn toggle_segmentation(&self) -> Result<bool>;

    /// Asks the detector to find the tracked object again.
    async fn redetect(&self) -> Result<RedetectOutcome>;

    /// Connects the follower and starts offboard mode.
    async fn start_following(&self) -> Result<CommandOutcome>;

    async fn stop_following(&self) -> Result<CommandOutcome>;

    /// Shuts the controller down.
    async fn quit(&self) -> Result<CommandOutcome>;

    async fn tracker_status(&self) -> Result<TrackerStatus>;

    async fn follower_status(&self) -> Result<FollowerStatus>;
}

#[derive(Deserialize)]
struct SegmentationReply {
    #[serde(default)]
    segmentation_active: bool,
}

/// [`Controller`] over the controller's HTTP API.
#[derive(Debug)]
pub struct HttpController {
    http: Client,
    base: Url,
}

impl HttpController {
    pub fn new(settings: &Settings) -> Result<Self> {
        let mut base = Url::parse(settings.controller_url.trim())
            .with_context(|| format!("invalid controller url {}", settings.controller_url))?;
        if base.cannot_be_a_base() {
            bail!("controller url {base} cannot be a base");
        }
        // Url::join replaces the last segment unless the path ends with a slash
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder()
            .timeout(Duration::from_millis(settings.request_timeout_millis))
            .build()?;

        Ok(Self { http, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    async fn send(&self, path: &str, request: RequestBuilder) -> Result<Response> {
        let response = request
            .send()
            .await
            .with_context(|| format!("request to {path} failed"))?;
        let status = response.status();
        if !status.is_success() {
            bail!("{path} replied with {status}");
        }
        debug!(target: "client", "{path} replied with {status}");

        Ok(response)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.http.post(self.endpoint(path)?);
        let response = self.send(path, request).await?;

        Ok(response.json::<T>().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.http.get(self.endpoint(path)?);
        let response = self.send(path, request).await?;

        Ok(response.json::<T>().await?)
    }
}

impl Controller for HttpController {
    async fn start_tracking(&self, target: TrackingTarget) -> Result<()> {
        let request = self.http.post(self.endpoint(START_TRACKING)?).json(&target);
        self.send(START_TRACKING, request).await?;

        Ok(())
    }

    async fn stop_tracking(&self) -> Result<()> {
        let request = self.http.post(self.endpoint(STOP_TRACKING)?);
        self.send(STOP_TRACKING, request).await?;

        Ok(())
    }

    async fn toggle_segmentation(&self) -> Result<bool> {
        self.post::<SegmentationReply>(TOGGLE_SEGMENTATION)
            .await
            .map(|reply| reply.segmentation_active)
    }

    async fn redetect(&self) -> Result<RedetectOutcome> {
        self.post(REDETECT).await
    }

    async fn start_following(&self) -> Result<CommandOutcome> {
        self.post(START_OFFBOARD_MODE).await
    }

    async fn stop_following(&self) -> Result<CommandOutcome> {
        self.post(STOP_OFFBOARD_MODE).await
    }

    async fn quit(&self) -> Result<CommandOutcome> {
        self.post(QUIT).await
    }

    async fn tracker_status(&self) -> Result<TrackerStatus> {
        self.get(TRACKER_DATA).await
    }

    async fn follower_status(&self) -> Result<FollowerStatus> {
        self.get(FOLLOWER_DATA).await
    }
}
