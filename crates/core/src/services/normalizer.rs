//! Flattens raw upstream search results into [`PostRecord`]s.
//!
//! Walks `edge.node.thread.thread_items[].post`. Each step is an explicit
//! presence check; an edge or item missing part of that path, or failing to
//! decode, is dropped. Missing leaves become `""`, `0` or `false`.

use serde_json::Value;

use crate::models::post::{CarouselMedia, MediaCandidate, Pagination, PostRecord, PostUser};
use crate::models::raw::{
    RawCandidate, RawEdge, RawImageVersions, RawPost, RawSearchResponse, RawThreadItem,
};

/// Normalize a list of raw edges. Never fails; output keeps input order and
/// may contain duplicate ids.
pub fn normalize(edges: &[Value]) -> Vec<PostRecord> {
    edges.iter().flat_map(normalize_edge).collect()
}

/// Normalize a whole response: posts plus pagination.
pub fn normalize_response(raw: &RawSearchResponse) -> (Vec<PostRecord>, Pagination) {
    let results = raw.data.as_ref().and_then(|d| d.search_results.as_ref());

    let posts = results
        .and_then(|r| r.edges.as_deref())
        .map(normalize)
        .unwrap_or_default();

    let pagination = results
        .and_then(|r| r.page_info.as_ref())
        .map(|p| Pagination {
            has_next_page: p.has_next_page.unwrap_or(false),
            end_cursor: p.end_cursor.clone().filter(|c| !c.is_empty()),
        })
        .unwrap_or_default();

    (posts, pagination)
}

fn normalize_edge(edge: &Value) -> Vec<PostRecord> {
    let Ok(edge) = serde_json::from_value::<RawEdge>(edge.clone()) else {
        return Vec::new();
    };
    let Some(items) = edge
        .node
        .and_then(|n| n.thread)
        .and_then(|t| t.thread_items)
    else {
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| {
            let item: RawThreadItem = serde_json::from_value(item).ok()?;
            let post = item.post?;
            to_record(post, item.should_show_replies_cta, edge.cursor.clone())
        })
        .collect()
}

fn to_record(post: RawPost, has_replies: Option<bool>, cursor: Option<String>) -> Option<PostRecord> {
    let id = post
        .pk
        .and_then(|pk| pk.into_string())
        .or_else(|| post.id.and_then(|id| id.into_string()))?;

    let user = post
        .user
        .map(|u| PostUser {
            id: u.pk.and_then(|pk| pk.into_string()).unwrap_or_default(),
            username: u.username.unwrap_or_default(),
            is_verified: u.is_verified.unwrap_or(false),
            profile_pic_url: u.profile_pic_url.unwrap_or_default(),
        })
        .unwrap_or_default();

    let carousel_media = post
        .carousel_media
        .unwrap_or_default()
        .into_iter()
        .map(|c| CarouselMedia {
            media_type: c.media_type.unwrap_or(0),
            image_versions: image_candidates(c.image_versions2),
            video_versions: candidates(c.video_versions),
        })
        .collect();

    Some(PostRecord {
        id,
        user,
        content: post.caption.and_then(|c| c.text).unwrap_or_default(),
        media_type: post.media_type.unwrap_or(0),
        like_count: post.like_count.unwrap_or(0),
        taken_at: post.taken_at.unwrap_or(0),
        has_replies: has_replies.unwrap_or(false),
        cursor,
        has_liked: post.has_liked.unwrap_or(false),
        image_versions: image_candidates(post.image_versions2),
        video_versions: candidates(post.video_versions),
        carousel_media,
        accessibility_caption: post.accessibility_caption.filter(|c| !c.is_empty()),
    })
}

fn image_candidates(versions: Option<RawImageVersions>) -> Vec<MediaCandidate> {
    candidates(versions.and_then(|v| v.candidates))
}

/// Candidates without a URL are useless to the client and are skipped.
fn candidates(raw: Option<Vec<RawCandidate>>) -> Vec<MediaCandidate> {
    raw.unwrap_or_default()
        .into_iter()
        .filter_map(|c| {
            let url = c.url.filter(|u| !u.is_empty())?;
            Some(MediaCandidate {
                url,
                width: c.width.unwrap_or(0),
                height: c.height.unwrap_or(0),
            })
        })
        .collect()
}
