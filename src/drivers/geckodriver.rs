//! geckodriver (and its predecessor `wires`) from mozilla/geckodriver releases.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::downloader::Fetch;
use crate::drivers::github::GithubRepo;
use crate::drivers::{DriverType, ListingEntry, RawEntry, VendorAdapter};
use crate::error::DriverError;
use crate::platform::normalize_os_token;

const REPO: GithubRepo = GithubRepo::new("mozilla", "geckodriver");

// Old macOS builds such as "geckodriver-0.8.0-OSX.gz" carry no arch suffix.
static ASSET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(geckodriver|wires)-.*?-(linux|win|macos|macOS|OSX|osx|arm)(32|64|7hf)*\.(.*)")
        .expect("valid geckodriver pattern")
});

pub struct GeckoDriver;

#[async_trait]
impl VendorAdapter for GeckoDriver {
    fn driver_type(&self) -> DriverType {
        DriverType::Gecko
    }

    async fn fetch_listing(&self, fetcher: &dyn Fetch) -> Result<Vec<RawEntry>, DriverError> {
        REPO.fetch_assets(fetcher).await
    }

    fn parse_entry(&self, raw: &RawEntry) -> Option<ListingEntry> {
        let tag = raw.tag.as_deref()?;
        let caps = ASSET_PATTERN.captures(&raw.name)?;
        Some(ListingEntry {
            version: tag.replace('v', ""),
            os: normalize_os_token(&caps[2]),
            arch: caps.get(3).map(|m| m.as_str()).unwrap_or_default().to_string(),
            filename: raw.name.clone(),
        })
    }

    fn download_url(&self, version: &str, filename: &str) -> String {
        REPO.asset_url(&format!("v{version}"), filename)
    }
}
