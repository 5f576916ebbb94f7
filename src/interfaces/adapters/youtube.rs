//! YouTube Data API v3 video search.

use async_trait::async_trait;
use serde::Deserialize;

use super::http;
use crate::capabilities::{AdapterMode, Capability, Credential};
use crate::config::Settings;
use crate::interfaces::adapter::{AdapterError, CapabilityAdapter};
use crate::interfaces::video::{ChannelInfo, Video, VideoDetails, VideoSearch};

const VENDOR: &str = "YouTube";

/// Upper bound the API accepts for `maxResults`.
const MAX_RESULTS: usize = 50;

pub struct YouTubeSearch {
    client: reqwest::Client,
    base_url: String,
    api_key: Credential,
    fingerprint: String,
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchItem {
    id: SearchId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    #[serde(default)]
    video_id: Option<String>,
    #[serde(default)]
    channel_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Snippet {
    title: String,
    description: String,
    channel_title: String,
    published_at: String,
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Thumbnails {
    medium: Option<Thumbnail>,
    default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

impl Thumbnails {
    fn best(&self) -> String {
        self.medium
            .as_ref()
            .or(self.default.as_ref())
            .map(|t| t.url.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    #[serde(default)]
    snippet: Snippet,
    #[serde(default)]
    content_details: ContentDetails,
    #[serde(default)]
    statistics: Statistics,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContentDetails {
    duration: String,
}

/// Counts arrive as decimal strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
}

fn count(value: &Option<String>) -> u64 {
    value.as_deref().and_then(|v| v.parse().ok()).unwrap_or(0)
}

impl YouTubeSearch {
    pub fn new(client: reqwest::Client, settings: &Settings, api_key: Credential) -> Self {
        let fingerprint = api_key.fingerprint();
        Self {
            client,
            base_url: settings.endpoints.youtube.trim_end_matches('/').to_string(),
            api_key,
            fingerprint,
        }
    }

    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        resource: &str,
        params: &[(&str, &str)],
    ) -> Result<Page<T>, AdapterError> {
        let request = self
            .client
            .get(format!("{}/{}", self.base_url, resource))
            .query(params)
            .header(http::GOOGLE_API_KEY, self.api_key.expose());
        http::send_json(VENDOR, request).await
    }
}

impl CapabilityAdapter for YouTubeSearch {
    fn name(&self) -> &str {
        "YouTube"
    }

    fn capability(&self) -> Capability {
        Capability::VideoSearch
    }

    fn mode(&self) -> AdapterMode {
        AdapterMode::Live
    }

    fn credential_fingerprint(&self) -> Option<&str> {
        Some(&self.fingerprint)
    }
}

#[async_trait]
impl VideoSearch for YouTubeSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Video>, AdapterError> {
        if max_results == 0 || query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let max = max_results.min(MAX_RESULTS).to_string();
        let page: Page<SearchItem> = self
            .get(
                "search",
                &[
                    ("part", "snippet"),
                    ("q", query.trim()),
                    ("type", "video"),
                    ("maxResults", max.as_str()),
                    ("videoEmbeddable", "true"),
                    ("videoSyndicated", "true"),
                    ("safeSearch", "strict"),
                ],
            )
            .await?;

        Ok(page
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                Some(Video {
                    url: format!("https://www.youtube.com/watch?v={}", video_id),
                    thumbnail: item.snippet.thumbnails.best(),
                    video_id,
                    title: item.snippet.title,
                    description: item.snippet.description,
                    channel: item.snippet.channel_title,
                    published_at: item.snippet.published_at,
                })
            })
            .collect())
    }

    async fn video_details(&self, video_id: &str) -> Result<Option<VideoDetails>, AdapterError> {
        let page: Page<VideoItem> = self
            .get(
                "videos",
                &[("part", "snippet,contentDetails,statistics"), ("id", video_id)],
            )
            .await?;
        Ok(page.items.into_iter().next().map(|item| VideoDetails {
            video_id: video_id.to_string(),
            title: item.snippet.title,
            description: item.snippet.description,
            duration: item.content_details.duration,
            view_count: count(&item.statistics.view_count),
            like_count: count(&item.statistics.like_count),
            channel: item.snippet.channel_title,
        }))
    }

    async fn educational_channels(
        &self,
        subject: &str,
    ) -> Result<Vec<ChannelInfo>, AdapterError> {
        let query = format!("{} tutorial education", subject.trim());
        let page: Page<SearchItem> = self
            .get(
                "search",
                &[
                    ("part", "snippet"),
                    ("q", query.as_str()),
                    ("type", "channel"),
                    ("maxResults", "5"),
                    ("order", "relevance"),
                ],
            )
            .await?;
        Ok(page
            .items
            .into_iter()
            .filter_map(|item| {
                Some(ChannelInfo {
                    channel_id: item.id.channel_id?,
                    title: item.snippet.title,
                    description: item.snippet.description,
                    subscriber_count: None,
                    video_count: None,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn search(server: &MockServer) -> YouTubeSearch {
        let mut settings = Settings::default();
        settings.endpoints.youtube = server.uri();
        let key = Credential::parse(Capability::VideoSearch, "yt-key").unwrap().unwrap();
        YouTubeSearch::new(reqwest::Client::new(), &settings, key)
    }

    #[tokio::test]
    async fn test_search_maps_items() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "rust lifetimes"))
            .and(query_param("type", "video"))
            .and(query_param("safeSearch", "strict"))
            .and(query_param("maxResults", "2"))
            .and(header("x-goog-api-key", "yt-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kind": "youtube#searchListResponse",
                "items": [{
                    "id": {"kind": "youtube#video", "videoId": "abc123"},
                    "snippet": {
                        "title": "Lifetimes explained",
                        "description": "d",
                        "channelTitle": "Rustacean Station",
                        "publishedAt": "2024-02-01T00:00:00Z",
                        "thumbnails": {"medium": {"url": "https://i.ytimg.com/abc/mq.jpg"}}
                    }
                }]
            })))
            .mount(&server)
            .await;

        let videos = search(&server).search("rust lifetimes", 2).await.unwrap();
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].url, "https://www.youtube.com/watch?v=abc123");
        assert_eq!(videos[0].thumbnail, "https://i.ytimg.com/abc/mq.jpg");
        assert_eq!(videos[0].channel, "Rustacean Station");
    }

    #[tokio::test]
    async fn test_video_details_parses_string_counts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("id", "abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [{
                    "snippet": {"title": "T", "description": "D", "channelTitle": "C"},
                    "contentDetails": {"duration": "PT1H2M3S"},
                    "statistics": {"viewCount": "1500", "likeCount": "20"}
                }]
            })))
            .mount(&server)
            .await;

        let details = search(&server).video_details("abc123").await.unwrap().unwrap();
        assert_eq!(details.view_count, 1500);
        assert_eq!(details.like_count, 20);
        assert_eq!(details.readable_duration(), "1h 2m 3s");
    }

    #[tokio::test]
    async fn test_unknown_video_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        assert!(search(&server).video_details("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_quota_error_surfaces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": {"code": 403, "message": "quotaExceeded"}
            })))
            .mount(&server)
            .await;

        let err = search(&server).search("sql", 3).await.unwrap_err();
        assert!(matches!(err, AdapterError::Api { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_transport_failure_does_not_expose_key() {
        let mut settings = Settings::default();
        settings.endpoints.youtube = "http://127.0.0.1:1".to_string();
        let key = Credential::parse(Capability::VideoSearch, "SUPERSECRETKEY")
            .unwrap()
            .unwrap();
        let search = YouTubeSearch::new(reqwest::Client::new(), &settings, key);

        let err = search.search("rust", 3).await.unwrap_err();
        assert!(matches!(err, AdapterError::Http(_)));
        assert!(!err.to_string().contains("SUPERSECRETKEY"));
    }
}
