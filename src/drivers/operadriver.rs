//! operadriver from operasoftware/operachromiumdriver releases.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::downloader::Fetch;
use crate::drivers::github::GithubRepo;
use crate::drivers::{DriverType, ListingEntry, RawEntry, VendorAdapter};
use crate::error::DriverError;

const REPO: GithubRepo = GithubRepo::new("operasoftware", "operachromiumdriver");

static ASSET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(operadriver)_(linux|win|mac)(32|64)*\.(.*)").expect("valid operadriver pattern")
});

// Tags look like "v.96.0.4664.45" or "v0.2.2"; only the number run matters.
static TAG_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+(\.[0-9]+)+").expect("valid version pattern"));

pub struct OperaDriver;

#[async_trait]
impl VendorAdapter for OperaDriver {
    fn driver_type(&self) -> DriverType {
        DriverType::Opera
    }

    async fn fetch_listing(&self, fetcher: &dyn Fetch) -> Result<Vec<RawEntry>, DriverError> {
        REPO.fetch_assets(fetcher).await
    }

    fn parse_entry(&self, raw: &RawEntry) -> Option<ListingEntry> {
        let caps = ASSET_PATTERN.captures(&raw.name)?;
        let version = TAG_VERSION.find(raw.tag.as_deref()?)?;
        Some(ListingEntry {
            version: version.as_str().to_string(),
            os: caps[2].to_string(),
            arch: caps.get(3).map(|m| m.as_str()).unwrap_or_default().to_string(),
            filename: raw.name.clone(),
        })
    }

    fn download_url(&self, version: &str, filename: &str) -> String {
        // Early releases were tagged "v0.x.y", later ones "v.NN.x.y.z".
        let prefix = if version.starts_with('0') { "v" } else { "v." };
        REPO.asset_url(&format!("{prefix}{version}"), filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(tag: &str, name: &str) -> Option<ListingEntry> {
        OperaDriver.parse_entry(&RawEntry::asset(tag, name))
    }

    #[test]
    fn extracts_version_from_tag() {
        let entry = parse("v.96.0.4664.45", "operadriver_win64.zip").unwrap();
        assert_eq!(entry.version, "96.0.4664.45");
        assert_eq!((entry.os.as_str(), entry.arch.as_str()), ("win", "64"));

        assert_eq!(parse("v0.2.2", "operadriver_linux32.zip").unwrap().version, "0.2.2");
    }

    #[test]
    fn skips_checksums_and_tags_without_version() {
        assert_eq!(parse("v.96.0.4664.45", "sha512_sum"), None);
        assert_eq!(parse("nightly", "operadriver_win64.zip"), None);
    }

    #[test]
    fn download_url_uses_tag_style_of_the_era() {
        assert_eq!(
            OperaDriver.download_url("0.2.2", "operadriver_win32.zip"),
            "https://github.com/operasoftware/operachromiumdriver/releases/download/v0.2.2/operadriver_win32.zip"
        );
        assert_eq!(
            OperaDriver.download_url("96.0.4664.45", "operadriver_win64.zip"),
            "https://github.com/operasoftware/operachromiumdriver/releases/download/v.96.0.4664.45/operadriver_win64.zip"
        );
    }
}
