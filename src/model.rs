use derive_new::new;
use serde::{Deserialize, Serialize};
use snafu::Snafu;

/// Caller-supplied primary key of a [Video].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, new)]
#[serde(transparent)]
pub struct VideoId(i64);

impl VideoId {
    pub fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for VideoId {
    fn from(id: i64) -> Self {
        VideoId(id)
    }
}

/// Only a plain run of ASCII digits is an id, so `+1`, `-1` and ` 1` never alias another video.
impl std::str::FromStr for VideoId {
    type Err = ParseVideoId;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if input.is_empty() || !input.bytes().all(|byte| byte.is_ascii_digit()) {
            return Err(ParseVideoId::new(input.to_string()));
        }

        input
            .parse()
            .map(VideoId)
            .map_err(|_| ParseVideoId::new(input.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu, new)]
#[snafu(display("Failed to parse video id: {}", text))]
pub struct ParseVideoId {
    pub text: String,
}

impl std::fmt::Display for VideoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A stored video record. Serializes to exactly `{id, name, views, likes}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct Video {
    pub id: VideoId,
    pub name: String,
    pub views: i64,
    pub likes: i64,
}

/// Validated payload of a create request, every field present.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct CreateVideo {
    pub name: String,
    pub views: i64,
    pub likes: i64,
}

impl CreateVideo {
    pub fn into_video(self, id: VideoId) -> Video {
        Video {
            id,
            name: self.name,
            views: self.views,
            likes: self.likes,
        }
    }
}

/// Validated payload of a partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, new)]
pub struct UpdateVideo {
    pub name: Option<String>,
    pub views: Option<i64>,
    pub likes: Option<i64>,
}

impl UpdateVideo {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.views.is_none() && self.likes.is_none()
    }

    /// Overwrites the supplied fields of `video` in place.
    pub fn apply(&self, video: &mut Video) {
        if let Some(name) = &self.name {
            video.name.clone_from(name);
        }
        if let Some(views) = self.views {
            video.views = views;
        }
        if let Some(likes) = self.likes {
            video.likes = likes;
        }
    }
}
