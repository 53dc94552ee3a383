//! Retrieval of vendor listings and driver archives.

use crate::error::DriverError;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::path::Path;
use std::io::Write;
use tokio::fs;
use tracing::debug;

/// "Fetch these bytes or fail". Anything other than `200 OK` is an error.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DriverError>;
}

/// Fetches `url` and decodes the body as UTF-8, replacing invalid sequences.
pub async fn fetch_text(fetcher: &dyn Fetch, url: &str) -> Result<String, DriverError> {
    let bytes = fetcher.fetch(url).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// [`Fetch`] over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, DriverError> {
        // api.github.com rejects requests without a User-Agent.
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DriverError> {
        debug!("Downloading: {url}");
        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(DriverError::Download {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

/// Downloads `url` into `dest_path`, creating parent directories first.
///
/// The body goes to a temporary file next to `dest_path` that is renamed into
/// place once complete, so the cache never holds a truncated archive.
pub async fn download_file(
    fetcher: &dyn Fetch,
    url: &str,
    dest_path: &Path,
) -> Result<(), DriverError> {
    debug!("Downloading from: {url} to: {}", dest_path.display());

    let parent = dest_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();
    fs::create_dir_all(&parent)
        .await
        .map_err(|e| DriverError::io(&parent, e))?;

    let content = fetcher.fetch(url).await?;

    let dest = dest_path.to_path_buf();
    tokio::task::spawn_blocking(move || persist_atomically(&parent, &dest, &content))
        .await
        .map_err(|e| DriverError::io(dest_path, std::io::Error::other(e)))?
}

fn persist_atomically(dir: &Path, dest: &Path, content: &[u8]) -> Result<(), DriverError> {
    let mut partial = tempfile::Builder::new()
        .prefix(".partial-")
        .tempfile_in(dir)
        .map_err(|e| DriverError::io(dir, e))?;
    partial
        .write_all(content)
        .and_then(|()| partial.as_file().sync_all())
        .map_err(|e| DriverError::io(partial.path(), e))?;
    partial
        .persist(dest)
        .map_err(|e| DriverError::io(dest, e.error))?;
    Ok(())
}
