use std::collections::HashSet;

use crate::models::post::PostRecord;

/// Concatenate post lists in order and keep the first record seen for each id.
///
/// Output order is the order of first occurrence, so the result does not
/// depend on how often upstream pagination repeats a post.
pub fn merge<I>(lists: I) -> Vec<PostRecord>
where
    I: IntoIterator<Item = Vec<PostRecord>>,
{
    let mut seen = HashSet::new();
    lists
        .into_iter()
        .flatten()
        .filter(|post| seen.insert(post.id.clone()))
        .collect()
}
