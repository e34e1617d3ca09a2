//! Permissive view of the upstream search response.
//!
//! The upstream schema is not ours, so every field is optional. The edge and
//! thread-item arrays are kept as raw JSON values so a single malformed entry
//! can be decoded (and dropped) on its own without failing the whole page.
//!
//! Only the path to a post (`node`, `thread`, `thread_items`, `post`) is
//! decoded strictly. Leaves go through [`lenient`]: a value of the wrong type
//! reads as absent and the post keeps its remaining fields.

use serde::Deserialize;
use serde_json::Value;

/// `deserialize_with` helpers that never fail on a type mismatch.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::RawId;

    fn value<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
        Option::<Value>::deserialize(d)
    }

    /// Integers, floats (truncated) and numeric strings.
    pub fn int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        Ok(value(d)?.and_then(|v| match v {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }))
    }

    pub fn dimension<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Ok(int(d)?.and_then(|n| u32::try_from(n).ok()))
    }

    /// Booleans and the strings `"true"` / `"false"`.
    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(value(d)?.and_then(|v| match v {
            Value::Bool(b) => Some(b),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }))
    }

    /// Strings; bare numbers are rendered as text.
    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(value(d)?.and_then(|v| match v {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }))
    }

    pub fn id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<RawId>, D::Error> {
        Ok(value(d)?.and_then(|v| serde_json::from_value(v).ok()))
    }

    /// A nested object that is dropped as a whole if it does not decode.
    pub fn nested<'de, D, T>(d: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(value(d)?.and_then(|v| serde_json::from_value(v).ok()))
    }

    /// An array whose undecodable elements are skipped one by one.
    pub fn list<'de, D, T>(d: D) -> Result<Option<Vec<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(value(d)?.and_then(|v| match v {
            Value::Array(items) => Some(
                items
                    .into_iter()
                    .filter_map(|item| serde_json::from_value(item).ok())
                    .collect(),
            ),
            _ => None,
        }))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RawSearchResponse {
    pub data: Option<RawSearchData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawSearchData {
    #[serde(rename = "searchResults")]
    pub search_results: Option<RawSearchResults>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawSearchResults {
    pub edges: Option<Vec<Value>>,
    #[serde(default, deserialize_with = "lenient::nested")]
    pub page_info: Option<RawPageInfo>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawPageInfo {
    #[serde(default, deserialize_with = "lenient::flag")]
    pub has_next_page: Option<bool>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub end_cursor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawEdge {
    pub node: Option<RawNode>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub cursor: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawNode {
    pub thread: Option<RawThread>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawThread {
    pub thread_items: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawThreadItem {
    pub post: Option<RawPost>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub should_show_replies_cta: Option<bool>,
}

/// Upstream ids show up both as strings and as bare numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(serde_json::Number),
}

impl RawId {
    /// `None` for an empty string id.
    pub fn into_string(self) -> Option<String> {
        let s = match self {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        };
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RawPost {
    #[serde(default, deserialize_with = "lenient::id")]
    pub pk: Option<RawId>,
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: Option<RawId>,
    #[serde(default, deserialize_with = "lenient::nested")]
    pub user: Option<RawUser>,
    #[serde(default, deserialize_with = "lenient::nested")]
    pub caption: Option<RawCaption>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub taken_at: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub like_count: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub media_type: Option<i64>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub has_liked: Option<bool>,
    #[serde(default, deserialize_with = "lenient::nested")]
    pub image_versions2: Option<RawImageVersions>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub video_versions: Option<Vec<RawCandidate>>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub carousel_media: Option<Vec<RawCarouselItem>>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub accessibility_caption: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawUser {
    #[serde(default, deserialize_with = "lenient::id")]
    pub pk: Option<RawId>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub is_verified: Option<bool>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub profile_pic_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawCaption {
    #[serde(default, deserialize_with = "lenient::text")]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawImageVersions {
    #[serde(default, deserialize_with = "lenient::list")]
    pub candidates: Option<Vec<RawCandidate>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawCandidate {
    #[serde(default, deserialize_with = "lenient::text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient::dimension")]
    pub width: Option<u32>,
    #[serde(default, deserialize_with = "lenient::dimension")]
    pub height: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawCarouselItem {
    #[serde(default, deserialize_with = "lenient::int")]
    pub media_type: Option<i64>,
    #[serde(default, deserialize_with = "lenient::nested")]
    pub image_versions2: Option<RawImageVersions>,
    #[serde(default, deserialize_with = "lenient::list")]
    pub video_versions: Option<Vec<RawCandidate>>,
}
