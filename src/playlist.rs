use serde::Deserialize;

use crate::error::Result;

/// MRSS playlist document. It does not carry the streams itself; its first
/// media content reference points at the rendition-list document.
#[derive(Debug, Deserialize)]
pub struct MediaPlaylist {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(default)]
    item: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    #[serde(rename = "group")]
    group: Option<MediaGroup>,
}

#[derive(Debug, Deserialize)]
struct MediaGroup {
    #[serde(rename = "content", default)]
    content: Vec<MediaContent>,
}

#[derive(Debug, Deserialize)]
struct MediaContent {
    #[serde(rename = "@url")]
    url: String,
}

impl MediaPlaylist {
    /// URL of the first media content reference, in document order.
    pub fn first_content_url(&self) -> Option<&str> {
        self.channel
            .item
            .iter()
            .filter_map(|item| item.group.as_ref())
            .flat_map(|group| group.content.iter())
            .map(|content| content.url.as_str())
            .find(|url| !url.is_empty())
    }
}

pub fn parse_media_playlist(xml: &str) -> Result<MediaPlaylist> {
    Ok(quick_xml::de::from_str(xml)?)
}

/// Rendition-list document: the quality variants offered for one episode.
#[derive(Debug, Deserialize)]
pub struct RenditionList {
    video: Video,
}

#[derive(Debug, Deserialize)]
struct Video {
    #[serde(default)]
    item: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    #[serde(default)]
    rendition: Vec<Rendition>,
}

#[derive(Debug, Deserialize)]
pub struct Rendition {
    #[serde(rename = "@bitrate")]
    pub bitrate: u32,
    pub src: String,
}

impl RenditionList {
    pub fn renditions(&self) -> impl Iterator<Item = &Rendition> {
        self.video.item.iter().flat_map(|item| item.rendition.iter())
    }
}

pub fn parse_rendition_list(xml: &str) -> Result<RenditionList> {
    Ok(quick_xml::de::from_str(xml)?)
}

/// Picks the rendition with the highest declared bitrate.
///
/// Strictly-greater-than comparison, so the first of equal candidates wins.
/// `None` when the document offers no renditions at all.
pub fn select_best_rendition(list: &RenditionList) -> Option<&Rendition> {
    let mut best: Option<&Rendition> = None;
    for rendition in list.renditions() {
        if best.is_none_or(|incumbent| rendition.bitrate > incumbent.bitrate) {
            best = Some(rendition);
        }
    }
    best
}
