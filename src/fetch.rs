use reqwest::Client;

use crate::error::{Error, Result};

/// Fetches the decoded text body of `url`.
///
/// Plain GET with the client's defaults; the redirect policy, timeouts and
/// connection handling are whatever reqwest ships with. A response that
/// still carries a non-2xx status after redirects is an error.
pub async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await.map_err(|source| Error::Fetch {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|source| Error::Fetch {
        url: url.to_string(),
        source,
    })
}
