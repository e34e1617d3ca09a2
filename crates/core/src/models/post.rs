use serde::{Deserialize, Serialize};

/// Author of a post, flattened from the upstream `post.user` object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostUser {
    pub id: String,
    pub username: String,
    pub is_verified: bool,
    pub profile_pic_url: String,
}

/// One rendition of an image or video (`image_versions2.candidates[]` /
/// `video_versions[]` upstream).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaCandidate {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// An entry of a carousel post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarouselMedia {
    pub media_type: i64,
    #[serde(default)]
    pub image_versions: Vec<MediaCandidate>,
    #[serde(default)]
    pub video_versions: Vec<MediaCandidate>,
}

/// A normalized upstream post. Identity is `id`.
///
/// Media fields carry `#[serde(default)]` so snapshots written before they
/// existed still load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: String,
    pub user: PostUser,
    pub content: String,
    /// 1 = image, 2 = video, 8 = carousel (upstream convention).
    pub media_type: i64,
    pub like_count: i64,
    /// Unix seconds.
    pub taken_at: i64,
    pub has_replies: bool,
    pub cursor: Option<String>,

    #[serde(default)]
    pub has_liked: bool,
    #[serde(default)]
    pub image_versions: Vec<MediaCandidate>,
    #[serde(default)]
    pub video_versions: Vec<MediaCandidate>,
    #[serde(default)]
    pub carousel_media: Vec<CarouselMedia>,
    #[serde(default)]
    pub accessibility_caption: Option<String>,
}

/// Pagination info reported with one search page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// The result of a single upstream search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub posts: Vec<PostRecord>,
    pub pagination: Pagination,
}
