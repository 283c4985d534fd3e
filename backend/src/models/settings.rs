use serde::{Deserialize, Serialize};

use crate::impl_identifiable;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(skip_serializing, default)]
    pub id: Option<i64>,
    /// Base URL of the remote controller (commands, telemetry and video feed).
    #[serde(default = "controller_url_default")]
    pub controller_url: String,
    #[serde(default = "status_interval_millis_default")]
    pub status_interval_millis: u64,
    #[serde(default = "request_timeout_millis_default")]
    pub request_timeout_millis: u64,
    /// Drops zero-area selections instead of submitting them.
    #[serde(default = "ignore_empty_selection_default")]
    pub ignore_empty_selection: bool,
    /// Selections narrower or shorter than this, in surface pixels, are dropped.
    #[serde(default = "min_selection_size_default")]
    pub min_selection_size: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            id: None,
            controller_url: controller_url_default(),
            status_interval_millis: status_interval_millis_default(),
            request_timeout_millis: request_timeout_millis_default(),
            ignore_empty_selection: ignore_empty_selection_default(),
            min_selection_size: min_selection_size_default(),
        }
    }
}

impl_identifiable!(Settings);

impl Settings {
    /// URL of the MJPEG video feed served by the controller.
    pub fn video_feed_url(&self) -> String {
        format!("{}/video_feed", self.controller_url.trim().trim_end_matches('/'))
    }
}

fn controller_url_default() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn status_interval_millis_default() -> u64 {
    2000
}

fn request_timeout_millis_default() -> u64 {
    5000
}

fn ignore_empty_selection_default() -> bool {
    true
}

fn min_selection_size_default() -> f64 {
    4.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let settings =
            serde_json::from_str::<Settings>(r#"{ "controller_url": "http://drone.local:5077" }"#)
                .unwrap();

        assert_eq!(settings.controller_url, "http://drone.local:5077");
        assert_eq!(settings.status_interval_millis, 2000);
        assert_eq!(settings.request_timeout_millis, 5000);
        assert!(settings.ignore_empty_selection);
    }

    #[test]
    fn video_feed_url_trims_slash() {
        let settings = Settings {
            controller_url: "http://drone.local:5077/".to_string(),
            ..Settings::default()
        };

        assert_eq!(settings.video_feed_url(), "http://drone.local:5077/video_feed");
    }

    #[test]
    fn video_feed_url_trims_whitespace() {
        let settings = Settings {
            controller_url: "  http://drone.local:5077/ \n".to_string(),
            ..Settings::default()
        };

        assert_eq!(settings.video_feed_url(), "http://drone.local:5077/video_feed");
    }
}
