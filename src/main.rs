use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use reqwest::Client;
use scraper::Html;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;
use url::Url;

mod download;
mod error;
mod fetch;
mod playlist;
mod scrape;

use download::{CAPTURE_BIN, CAPTURE_TEMP_FILE, SCANNER_BIN};
use error::{Error, Result};
use fetch::fetch_page;
use scrape::Episode;

#[derive(Debug, Parser)]
#[command(
    name = "sponge",
    version,
    about = "Scrapes a show's listing page and archives its full episodes"
)]
struct Cli {
    /// Show name used in the destination file names
    #[arg(value_name = "SHOW_NAME")]
    show_name: String,

    /// Directory the finished .mp4 files are moved into
    #[arg(value_name = "DEST_PATH")]
    dest_path: PathBuf,

    /// URL of the show's episode listing page
    #[arg(value_name = "PAGE_URL")]
    page_url: String,
}

fn main() {
    // Usage errors exit with 1 rather than clap's default 2.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            process::exit(1);
        }
    };

    if let Err(e) = bootstrap(cli) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn bootstrap(cli: Cli) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let client = Client::builder().build().map_err(Error::Client)?;
    let page_url = Url::parse(&cli.page_url).map_err(|source| Error::Url {
        url: cli.page_url.clone(),
        source,
    })?;

    info!("scraping {page_url}");
    let listing = fetch_page(&client, page_url.as_str()).await?;
    let episodes = scrape::extract_episodes(&Html::parse_document(&listing), &page_url)?;
    info!("found {} full episodes", episodes.len());

    let mut downloaded = 0usize;
    for episode in &episodes {
        match process_episode(&client, &cli, episode).await {
            Ok(true) => downloaded += 1,
            Ok(false) => {}
            Err(err) => warn!("skipping '{}': {err}", episode.title),
        }
    }

    if downloaded > 0 {
        info!("downloaded {downloaded} new episodes, scanning the library");
        download::trigger_library_scan(Path::new(SCANNER_BIN), &cli.dest_path);
    }

    Ok(())
}

/// Runs one episode through detail resolution, rendition selection and
/// capture. Returns whether a new file landed in the library; failures
/// along the way only ever cost this episode, not the batch.
async fn process_episode(client: &Client, cli: &Cli, episode: &Episode) -> Result<bool> {
    info!("parsing '{}'", episode.title);
    let page = fetch_page(client, &episode.url).await?;
    let doc = Html::parse_document(&page);

    let heading = scrape::extract_heading(&doc)?;
    let numbering = scrape::derive_numbering(&heading)?;

    let dest = scrape::episode_destination(&cli.dest_path, &cli.show_name, &numbering);
    if dest.is_file() {
        info!("file already exists: {}", dest.display());
        return Ok(false);
    }

    let playlist_url = scrape::extract_playlist_url(&doc)?;
    let mrss = fetch_page(client, &playlist_url).await?;
    let media_playlist = playlist::parse_media_playlist(&mrss)?;
    let content_url = media_playlist
        .first_content_url()
        .ok_or(Error::MissingContentUrl)?;

    let renditions_xml = fetch_page(client, content_url).await?;
    let renditions = playlist::parse_rendition_list(&renditions_xml)?;

    let best = playlist::select_best_rendition(&renditions).filter(|r| !r.src.is_empty());
    let Some(best) = best else {
        warn!("no usable stream for '{}', skipping", episode.title);
        return Ok(false);
    };
    info!("best rendition has bitrate {}", best.bitrate);

    info!("downloading to {}", dest.display());
    let ok = download::download_stream(
        Path::new(CAPTURE_BIN),
        &best.src,
        Path::new(CAPTURE_TEMP_FILE),
        &dest,
    )?;
    if !ok {
        warn!("could not download '{}'", episode.title);
        return Ok(false);
    }

    info!("downloaded {}", dest.display());
    Ok(true)
}
