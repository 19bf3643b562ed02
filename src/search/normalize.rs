//! Per-family request building and payload normalization.
//!
//! # Responsibilities
//! - Build each family's search endpoint URL with a percent-encoded query
//! - Parse each family's payload and map it into `SearchResultItem`
//!
//! # Design Decisions
//! - One usable-item predicate for every family: it must be a video with an id
//! - The cap is applied after filtering
//! - A malformed top-level shape is an error; a malformed single entry is dropped

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::ResponseShape;
use crate::search::types::SearchResultItem;

/// Path prefix Piped uses for video links.
pub const PIPED_WATCH_PREFIX: &str = "/watch?v=";

/// Thumbnail index preferred in Invidious payloads (medium quality).
const INVIDIOUS_THUMBNAIL_INDEX: usize = 4;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("payload is not valid JSON for this family: {0}")]
    Shape(#[from] serde_json::Error),
}

impl ResponseShape {
    /// Search endpoint for `base` with the raw `query` percent-encoded.
    ///
    /// Returns `None` if `base` cannot carry a path.
    pub fn search_url(&self, base: &Url, query: &str) -> Option<Url> {
        let mut url = base.clone();
        {
            let mut segments = url.path_segments_mut().ok()?;
            segments.pop_if_empty();
            match self {
                ResponseShape::Invidious => segments.extend(["api", "v1", "search"]),
                ResponseShape::Piped => segments.push("search"),
            };
        }
        {
            let mut pairs = url.query_pairs_mut();
            pairs.clear().append_pair("q", query);
            match self {
                ResponseShape::Invidious => pairs.append_pair("type", "video"),
                ResponseShape::Piped => pairs.append_pair("filter", "videos"),
            };
        }
        Some(url)
    }

    /// Parse `body` and map at most `cap` usable items into canonical form.
    pub fn normalize(&self, body: &[u8], cap: usize) -> Result<Vec<SearchResultItem>, NormalizeError> {
        match self {
            ResponseShape::Invidious => normalize_invidious(body, cap),
            ResponseShape::Piped => normalize_piped(body, cap),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvidiousEntry {
    #[serde(rename = "type")]
    kind: Option<String>,
    video_id: Option<String>,
    title: Option<String>,
    author: Option<String>,
    #[serde(default)]
    video_thumbnails: Vec<InvidiousThumbnail>,
    length_seconds: Option<i64>,
    view_count: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct InvidiousThumbnail {
    url: Option<String>,
}

impl InvidiousEntry {
    fn thumbnail(&self) -> String {
        let pick = |idx: usize| {
            self.video_thumbnails
                .get(idx)
                .and_then(|t| t.url.as_deref())
                .filter(|u| !u.is_empty())
        };
        pick(INVIDIOUS_THUMBNAIL_INDEX)
            .or_else(|| pick(0))
            .unwrap_or_default()
            .to_string()
    }

    fn into_item(self) -> Option<SearchResultItem> {
        if self.kind.as_deref() != Some("video") {
            return None;
        }
        let thumbnail_url = self.thumbnail();
        let video_id = self.video_id.filter(|id| !id.is_empty())?;
        Some(SearchResultItem {
            video_id,
            title: self.title.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            thumbnail_url,
            duration_seconds: self.length_seconds,
            view_count: self.view_count,
        })
    }
}

fn normalize_invidious(body: &[u8], cap: usize) -> Result<Vec<SearchResultItem>, NormalizeError> {
    let entries: Vec<Value> = serde_json::from_slice(body)?;
    Ok(entries
        .into_iter()
        .filter_map(|v| serde_json::from_value::<InvidiousEntry>(v).ok())
        .filter_map(InvidiousEntry::into_item)
        .take(cap)
        .collect())
}

#[derive(Debug, Deserialize)]
struct PipedPage {
    items: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PipedItem {
    url: Option<String>,
    title: Option<String>,
    uploader_name: Option<String>,
    thumbnail: Option<String>,
    duration: Option<i64>,
    views: Option<i64>,
}

impl PipedItem {
    fn into_item(self) -> Option<SearchResultItem> {
        let video_id = self
            .url
            .as_deref()
            .and_then(|u| u.strip_prefix(PIPED_WATCH_PREFIX))
            .filter(|id| !id.is_empty())?
            .to_string();
        Some(SearchResultItem {
            video_id,
            title: self.title.unwrap_or_default(),
            author: self.uploader_name.unwrap_or_default(),
            thumbnail_url: self.thumbnail.unwrap_or_default(),
            duration_seconds: self.duration,
            view_count: self.views,
        })
    }
}

fn normalize_piped(body: &[u8], cap: usize) -> Result<Vec<SearchResultItem>, NormalizeError> {
    let page: PipedPage = serde_json::from_slice(body)?;
    Ok(page
        .items
        .into_iter()
        .filter_map(|v| serde_json::from_value::<PipedItem>(v).ok())
        .filter_map(PipedItem::into_item)
        .take(cap)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(n: usize) -> SearchResultItem {
        SearchResultItem {
            video_id: format!("vid{n}"),
            title: format!("Title {n}"),
            author: format!("Author {n}"),
            thumbnail_url: format!("https://i.ytimg.com/vi/vid{n}/mqdefault.jpg"),
            duration_seconds: Some(60 + n as i64),
            view_count: Some(1000 * n as i64),
        }
    }

    fn as_invidious(item: &SearchResultItem) -> Value {
        json!({
            "type": "video",
            "videoId": item.video_id,
            "title": item.title,
            "author": item.author,
            "videoThumbnails": [{ "quality": "maxres", "url": item.thumbnail_url }],
            "lengthSeconds": item.duration_seconds,
            "viewCount": item.view_count,
        })
    }

    fn as_piped(item: &SearchResultItem) -> Value {
        json!({
            "type": "stream",
            "url": format!("{PIPED_WATCH_PREFIX}{}", item.video_id),
            "title": item.title,
            "uploaderName": item.author,
            "thumbnail": item.thumbnail_url,
            "duration": item.duration_seconds,
            "views": item.view_count,
        })
    }

    #[test]
    fn test_search_urls_encode_query() {
        let base = Url::parse("https://inv.example/").unwrap();
        let url = ResponseShape::Invidious.search_url(&base, "lo-fi & chill/beats").unwrap();
        assert_eq!(
            url.as_str(),
            "https://inv.example/api/v1/search?q=lo-fi+%26+chill%2Fbeats&type=video"
        );

        let base = Url::parse("https://piped.example/api").unwrap();
        let url = ResponseShape::Piped.search_url(&base, "a b").unwrap();
        assert_eq!(url.as_str(), "https://piped.example/api/search?q=a+b&filter=videos");
    }

    #[test]
    fn test_invidious_keeps_only_videos() {
        let body = json!([
            { "type": "channel", "author": "Someone", "authorId": "UC1" },
            as_invidious(&item(1)),
            { "type": "playlist", "title": "Mix", "playlistId": "PL1" },
            as_invidious(&item(2)),
        ]);
        let items = ResponseShape::Invidious
            .normalize(body.to_string().as_bytes(), 15)
            .unwrap();
        assert_eq!(items, vec![item(1), item(2)]);
    }

    #[test]
    fn test_invidious_thumbnail_preference() {
        let thumbs: Vec<Value> = (0..6)
            .map(|i| json!({ "quality": format!("q{i}"), "url": format!("https://t/{i}.jpg") }))
            .collect();
        let body = json!([
            { "type": "video", "videoId": "a", "videoThumbnails": thumbs },
            { "type": "video", "videoId": "b", "videoThumbnails": [{ "url": "https://t/only.jpg" }] },
            { "type": "video", "videoId": "c" },
        ]);
        let items = ResponseShape::Invidious
            .normalize(body.to_string().as_bytes(), 15)
            .unwrap();
        assert_eq!(items[0].thumbnail_url, "https://t/4.jpg");
        assert_eq!(items[1].thumbnail_url, "https://t/only.jpg");
        assert_eq!(items[2].thumbnail_url, "");
        assert_eq!(items[2].title, "");
        assert_eq!(items[2].duration_seconds, None);
    }

    #[test]
    fn test_invidious_wrong_shape_is_error() {
        let body = json!({ "error": "rate limited" });
        assert!(ResponseShape::Invidious
            .normalize(body.to_string().as_bytes(), 15)
            .is_err());
        assert!(ResponseShape::Invidious.normalize(b"<html>", 15).is_err());
    }

    #[test]
    fn test_piped_strips_watch_prefix_and_drops_channels() {
        let body = json!({
            "items": [
                as_piped(&item(1)),
                { "type": "channel", "url": "/channel/UC1", "name": "Someone" },
                as_piped(&item(2)),
            ],
            "nextpage": null,
        });
        let items = ResponseShape::Piped
            .normalize(body.to_string().as_bytes(), 15)
            .unwrap();
        assert_eq!(items, vec![item(1), item(2)]);
    }

    #[test]
    fn test_piped_missing_thumbnail_is_empty() {
        let body = json!({ "items": [{ "url": "/watch?v=xyz", "title": "T" }] });
        let items = ResponseShape::Piped
            .normalize(body.to_string().as_bytes(), 15)
            .unwrap();
        assert_eq!(items[0].video_id, "xyz");
        assert_eq!(items[0].thumbnail_url, "");
        assert_eq!(items[0].author, "");
    }

    #[test]
    fn test_piped_wrong_shape_is_error() {
        let body = json!([as_piped(&item(1))]);
        assert!(ResponseShape::Piped
            .normalize(body.to_string().as_bytes(), 15)
            .is_err());
    }

    #[test]
    fn test_canonical_round_trip_is_lossless() {
        let originals: Vec<_> = (1..=5).map(item).collect();

        let invidious = Value::Array(originals.iter().map(as_invidious).collect());
        let back = ResponseShape::Invidious
            .normalize(invidious.to_string().as_bytes(), 15)
            .unwrap();
        assert_eq!(back, originals);

        let piped = json!({ "items": originals.iter().map(as_piped).collect::<Vec<_>>() });
        let back = ResponseShape::Piped
            .normalize(piped.to_string().as_bytes(), 15)
            .unwrap();
        assert_eq!(back, originals);
    }

    #[test]
    fn test_cap_applies_after_filter() {
        let mut entries = Vec::new();
        for n in 0..40 {
            entries.push(json!({ "type": "channel", "author": "x" }));
            entries.push(as_invidious(&item(n)));
        }
        let body = Value::Array(entries).to_string();
        let items = ResponseShape::Invidious.normalize(body.as_bytes(), 15).unwrap();
        assert_eq!(items.len(), 15);
        assert_eq!(items[14], item(14));

        let piped = json!({ "items": (0..40).map(|n| as_piped(&item(n))).collect::<Vec<_>>() });
        let items = ResponseShape::Piped
            .normalize(piped.to_string().as_bytes(), 15)
            .unwrap();
        assert_eq!(items.len(), 15);
    }
}
