//! Educational video lookup.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::adapter::{AdapterError, CapabilityAdapter};

/// A search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub published_at: String,
    pub url: String,
}

/// Extended metadata for one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoDetails {
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// ISO-8601 duration, e.g. `PT10M30S`.
    pub duration: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub channel: String,
}

impl VideoDetails {
    pub fn readable_duration(&self) -> String {
        format_iso_duration(&self.duration)
    }
}

/// A recommended channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub channel_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscriber_count: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_count: Option<String>,
}

/// Videos gathered across a plan, in day order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub entries: Vec<PlaylistEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    pub day: u32,
    pub day_title: String,
    #[serde(flatten)]
    pub video: Video,
}

#[async_trait]
pub trait VideoSearch: CapabilityAdapter {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Video>, AdapterError>;

    async fn video_details(&self, video_id: &str) -> Result<Option<VideoDetails>, AdapterError>;

    async fn educational_channels(&self, subject: &str)
        -> Result<Vec<ChannelInfo>, AdapterError>;
}

static ISO_DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$").unwrap());

/// `PT1H2M3S` → `1h 2m 3s`, `PT10M30S` → `10m 30s`, `PT45S` → `45s`.
pub fn format_iso_duration(duration: &str) -> String {
    let Some(caps) = ISO_DURATION.captures(duration) else {
        return "Unknown duration".to_string();
    };
    let part = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    let (hours, minutes, seconds) = (part(1), part(2), part(3));
    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
