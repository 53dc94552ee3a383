//! GitHub releases API, used by vendors that publish drivers as release assets.

use serde::Deserialize;
use tracing::debug;

use crate::downloader::{Fetch, fetch_text};
use crate::drivers::RawEntry;
use crate::error::DriverError;

const API_URL: &str = "https://api.github.com/repos";
const DOWNLOAD_URL: &str = "https://github.com";

#[derive(Debug, Deserialize)]
struct Asset {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
    #[serde(default)]
    assets: Vec<Asset>,
}

/// A GitHub repository that hosts driver releases.
#[derive(Debug, Clone, Copy)]
pub struct GithubRepo {
    pub owner: &'static str,
    pub repo: &'static str,
}

impl GithubRepo {
    pub const fn new(owner: &'static str, repo: &'static str) -> Self {
        Self { owner, repo }
    }

    pub fn releases_url(&self) -> String {
        format!("{API_URL}/{}/{}/releases", self.owner, self.repo)
    }

    pub fn asset_url(&self, tag: &str, filename: &str) -> String {
        format!(
            "{DOWNLOAD_URL}/{}/{}/releases/download/{tag}/{filename}",
            self.owner, self.repo
        )
    }

    /// Every release asset paired with its tag. Signature files (`.asc`) are
    /// dropped here.
    pub async fn fetch_assets(&self, fetcher: &dyn Fetch) -> Result<Vec<RawEntry>, DriverError> {
        let url = self.releases_url();
        let body = fetch_text(fetcher, &url).await?;
        let assets = parse_releases(&body).map_err(|source| DriverError::JsonParseError {
            url: url.clone(),
            source,
        })?;
        debug!("{} assets listed in {url}", assets.len());
        Ok(assets)
    }
}

pub fn parse_releases(body: &str) -> Result<Vec<RawEntry>, serde_json::Error> {
    let releases: Vec<Release> = serde_json::from_str(body)?;
    Ok(releases
        .into_iter()
        .flat_map(|release| {
            let tag = release.tag_name;
            release
                .assets
                .into_iter()
                .filter(|asset| !asset.name.ends_with(".asc"))
                .map(move |asset| RawEntry::asset(tag.clone(), asset.name))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_assets_and_skips_signatures() {
        let body = r#"[
            {"tag_name": "v0.28.0", "assets": [
                {"name": "geckodriver-v0.28.0-linux64.tar.gz"},
                {"name": "geckodriver-v0.28.0-linux64.tar.gz.asc"}
            ]},
            {"tag_name": "v0.1.0"}
        ]"#;
        assert_eq!(
            parse_releases(body).unwrap(),
            vec![RawEntry::asset("v0.28.0", "geckodriver-v0.28.0-linux64.tar.gz")]
        );
    }

    #[test]
    fn builds_urls() {
        let repo = GithubRepo::new("mozilla", "geckodriver");
        assert_eq!(
            repo.releases_url(),
            "https://api.github.com/repos/mozilla/geckodriver/releases"
        );
        assert_eq!(
            repo.asset_url("v0.28.0", "geckodriver-v0.28.0-win32.zip"),
            "https://github.com/mozilla/geckodriver/releases/download/v0.28.0/geckodriver-v0.28.0-win32.zip"
        );
    }
}
