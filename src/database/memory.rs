use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{ConflictSnafu, Result, VideoRepository};
use crate::model::{UpdateVideo, Video, VideoId};

/// In-process [VideoRepository]. Nothing is persisted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    videos: DashMap<VideoId, Video>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }
}

#[async_trait]
impl VideoRepository for InMemoryRepository {
    async fn get(&self, id: VideoId) -> Result<Option<Video>> {
        Ok(self.videos.get(&id).map(|video| video.value().clone()))
    }

    async fn insert(&self, video: Video) -> Result<()> {
        // the entry guard holds the shard lock, so check-and-insert is atomic
        match self.videos.entry(video.id) {
            Entry::Occupied(_) => ConflictSnafu { id: video.id }.fail(),
            Entry::Vacant(slot) => {
                slot.insert(video);
                Ok(())
            }
        }
    }

    async fn update(&self, id: VideoId, update: &UpdateVideo) -> Result<Option<Video>> {
        let Some(mut video) = self.videos.get_mut(&id) else {
            return Ok(None);
        };

        update.apply(&mut video);
        Ok(Some(video.value().clone()))
    }

    async fn delete(&self, id: VideoId) -> Result<bool> {
        Ok(self.videos.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::RepositoryError;

    #[tokio::test]
    async fn conflict_leaves_existing_record() {
        let repository = InMemoryRepository::new();
        let original = Video::new(VideoId::new(1), "a".into(), 1, 1);

        repository.insert(original.clone()).await.unwrap();
        let result = repository
            .insert(Video::new(VideoId::new(1), "b".into(), 2, 2))
            .await;

        assert!(matches!(result, Err(RepositoryError::Conflict { .. })));
        assert_eq!(repository.get(VideoId::new(1)).await.unwrap(), Some(original));
        assert_eq!(repository.len(), 1);
    }

    #[tokio::test]
    async fn update_and_delete() {
        let repository = InMemoryRepository::new();
        repository
            .insert(Video::new(VideoId::new(2), "b".into(), 5, 6))
            .await
            .unwrap();

        let updated = repository
            .update(VideoId::new(2), &UpdateVideo::new(Some("c".into()), None, None))
            .await
            .unwrap();
        assert_eq!(updated, Some(Video::new(VideoId::new(2), "c".into(), 5, 6)));

        assert!(repository.delete(VideoId::new(2)).await.unwrap());
        assert!(repository.is_empty());
        assert_eq!(
            repository
                .update(VideoId::new(2), &UpdateVideo::default())
                .await
                .unwrap(),
            None
        );
    }
}
