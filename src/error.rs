use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("could not build http client: {0}")]
    Client(reqwest::Error),

    #[error("could not fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid url {url}: {source}")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid selector `{0}`")]
    Selector(String),

    #[error("listing page has no playlist container")]
    MissingPlaylist,

    #[error("episode page has no season/episode heading")]
    MissingNumbering,

    #[error("could not parse season/episode from {0:?}")]
    Numbering(String),

    #[error("episode page has no player wrapper with a playlist url")]
    MissingPlaylistUrl,

    #[error("playlist has no media content url")]
    MissingContentUrl,

    #[error("could not deserialize playlist document: {0}")]
    Xml(#[from] quick_xml::DeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
