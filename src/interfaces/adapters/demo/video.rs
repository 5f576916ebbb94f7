use std::sync::Arc;

use async_trait::async_trait;

use crate::capabilities::{AdapterMode, Capability};
use crate::fixtures::FixtureStore;
use crate::interfaces::adapter::{AdapterError, CapabilityAdapter};
use crate::interfaces::video::{ChannelInfo, Video, VideoDetails, VideoSearch};

/// Serves the fixture video and channel templates for any query.
pub struct DemoVideoSearch {
    fixtures: Arc<FixtureStore>,
}

impl DemoVideoSearch {
    pub fn new(fixtures: Arc<FixtureStore>) -> Self {
        Self { fixtures }
    }
}

impl CapabilityAdapter for DemoVideoSearch {
    fn name(&self) -> &str {
        "Demo video search"
    }

    fn capability(&self) -> Capability {
        Capability::VideoSearch
    }

    fn mode(&self) -> AdapterMode {
        AdapterMode::Demo
    }
}

#[async_trait]
impl VideoSearch for DemoVideoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Video>, AdapterError> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let mut videos = self.fixtures.videos_for(query);
        videos.truncate(max_results);
        Ok(videos)
    }

    async fn video_details(&self, video_id: &str) -> Result<Option<VideoDetails>, AdapterError> {
        Ok(self.fixtures.video_details_for(video_id))
    }

    async fn educational_channels(
        &self,
        subject: &str,
    ) -> Result<Vec<ChannelInfo>, AdapterError> {
        Ok(self.fixtures.channels_for(subject))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search() -> DemoVideoSearch {
        DemoVideoSearch::new(Arc::new(FixtureStore::embedded().unwrap()))
    }

    #[tokio::test]
    async fn test_search_respects_max_results() {
        let search = search();
        assert_eq!(search.search("sql joins", 10).await.unwrap().len(), 3);
        let two = search.search("sql joins", 2).await.unwrap();
        assert_eq!(two.len(), 2);
        assert!(two[0].title.contains("sql joins"));
        assert!(search.search("  ", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_details_and_channels() {
        let search = search();
        let details = search.video_details("xyz").await.unwrap().unwrap();
        assert_eq!(details.video_id, "xyz");
        assert_eq!(details.view_count, 1_000_000);
        assert_eq!(search.educational_channels("Rust").await.unwrap().len(), 2);
    }
}
