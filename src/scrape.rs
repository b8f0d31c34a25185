use std::path::{Path, PathBuf};

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{Error, Result};

/// Localized label substrings stripped from the season/episode heading.
/// The source site publishes in one locale only.
const SEASON_LABEL: &str = "Seizoen ";
const EPISODE_LABEL: &str = "- Aflevering ";

/// One entry of the listing page, in document order.
#[derive(Debug, Clone)]
pub struct Episode {
    pub id: String,
    pub title: String,
    pub url: String,
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|_| Error::Selector(css.to_string()))
}

pub fn normalize_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extracts the full episodes from a parsed listing page.
///
/// A missing playlist container fails the whole listing; a malformed list
/// item never does. Items are dropped when they are not categorized as a
/// full episode or when any of id, subtitle or link is absent.
pub fn extract_episodes(doc: &Html, base: &Url) -> Result<Vec<Episode>> {
    let playlist_sel = selector("ol.playlist")?;
    let item_sel = selector("li")?;

    let playlist = doc
        .select(&playlist_sel)
        .next()
        .ok_or(Error::MissingPlaylist)?;

    let mut episodes = Vec::new();
    for item in playlist.select(&item_sel) {
        if let Some(episode) = extract_listing_item(item, base) {
            episodes.push(episode);
        }
    }

    Ok(episodes)
}

fn extract_listing_item(item: ElementRef<'_>, base: &Url) -> Option<Episode> {
    if item.value().attr("data-category")? != "fullepisode" {
        return None;
    }

    let id = item.value().attr("data-item-id")?;

    let subtitle_sel = Selector::parse("p.subtitle").ok()?;
    let title = normalize_text(&item.select(&subtitle_sel).next()?.text().collect::<String>());
    if title.is_empty() {
        return None;
    }

    let anchor_sel = Selector::parse("a").ok()?;
    let href = item.select(&anchor_sel).next()?.value().attr("href")?;
    let url = base.join(href).ok()?;

    Some(Episode {
        id: id.to_string(),
        title,
        url: url.to_string(),
    })
}

/// Text of the season/episode heading on an episode detail page.
pub fn extract_heading(doc: &Html) -> Result<String> {
    let heading_sel = selector("h6.season-episode")?;
    let heading = doc
        .select(&heading_sel)
        .next()
        .ok_or(Error::MissingNumbering)?;

    Ok(normalize_text(&heading.text().collect::<String>()))
}

/// Derives the canonical `S<SS>E<EE>` numbering from the heading text.
///
/// After stripping the localized labels, exactly two integer tokens must
/// remain; anything else is an error rather than silently wrong output.
pub fn derive_numbering(heading: &str) -> Result<String> {
    let residue = heading.replace(SEASON_LABEL, "").replace(EPISODE_LABEL, "");
    let residue = residue.trim();

    let mut tokens = residue.split(' ');
    let (Some(season), Some(episode), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return Err(Error::Numbering(heading.to_string()));
    };

    let season: u32 = season
        .parse()
        .map_err(|_| Error::Numbering(heading.to_string()))?;
    let episode: u32 = episode
        .parse()
        .map_err(|_| Error::Numbering(heading.to_string()))?;

    Ok(format!("S{season:02}E{episode:02}"))
}

/// Media-playlist URL of the episode's player, from the detail page.
pub fn extract_playlist_url(doc: &Html) -> Result<String> {
    let wrapper_sel = selector("div.player-wrapper")?;

    doc.select(&wrapper_sel)
        .next()
        .and_then(|wrapper| wrapper.value().attr("data-mrss"))
        .filter(|url| !url.is_empty())
        .map(|url| url.to_string())
        .ok_or(Error::MissingPlaylistUrl)
}

/// Destination file for an episode, `<dest_dir>/<show> - S<SS>E<EE>.mp4`.
/// Its existence is the idempotency key: present means already downloaded.
pub fn episode_destination(dest_dir: &Path, show_name: &str, numbering: &str) -> PathBuf {
    dest_dir.join(format!("{show_name} - {numbering}.mp4"))
}
