use serde::{Deserialize, Serialize};
use strum::Display;

use super::deserialize_with_ok_or_default;

/// Tracker telemetry as reported by the controller.
#[derive(Clone, PartialEq, Default, Debug, Serialize, Deserialize)]
pub struct TrackerStatus {
    #[serde(default)]
    pub tracker_started: bool,
    /// The tracked box in frame pixels as `[x, y, width, height]`.
    #[serde(default, deserialize_with = "deserialize_with_ok_or_default")]
    pub bounding_box: Option<[f64; 4]>,
    #[serde(default, deserialize_with = "deserialize_with_ok_or_default")]
    pub center: Option<[f64; 2]>,
    /// Center normalized such that the frame center is `(0, 0)` and corners are `(±1, ±1)`.
    #[serde(default, deserialize_with = "deserialize_with_ok_or_default")]
    pub normalized_center: Option<[f64; 2]>,
}

/// Follower telemetry as reported by the controller.
#[derive(Clone, PartialEq, Default, Debug, Serialize, Deserialize)]
pub struct FollowerStatus {
    #[serde(default)]
    pub following_active: bool,
    #[serde(default)]
    pub profile_name: Option<String>,
}

/// The latest known state of the device, published after each status poll.
#[derive(Clone, PartialEq, Default, Debug)]
pub struct DeviceState {
    /// Whether the last poll reached the controller.
    pub connected: bool,
    pub tracker: TrackerStatus,
    pub follower: FollowerStatus,
    /// Last segmentation mode the controller reported, cleared when tracking stops.
    pub segmentation_active: bool,
}

impl DeviceState {
    pub fn connection(&self) -> ConnectionStatus {
        if self.connected {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Display)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

/// Reply of commands reporting each step taken (e.g. connecting the follower).
#[derive(Clone, PartialEq, Default, Debug, Serialize, Deserialize)]
pub struct CommandOutcome {
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl CommandOutcome {
    #[inline]
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Clone, PartialEq, Default, Debug, Serialize, Deserialize)]
pub struct RedetectOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, deserialize_with = "deserialize_with_ok_or_default")]
    pub bounding_box: Option<[f64; 4]>,
}
