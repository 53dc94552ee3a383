//! chromedriver from the legacy Google Cloud Storage bucket.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::downloader::Fetch;
use crate::drivers::listing::fetch_xml_keys;
use crate::drivers::{DriverType, ListingEntry, RawEntry, VendorAdapter};
use crate::error::DriverError;

pub const CHROMEDRIVER_URL: &str = "https://chromedriver.storage.googleapis.com";

static KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(([0-9]+\.){1,3}[0-9]+).*/chromedriver_(linux|win|mac)(32|64)\.zip")
        .expect("valid chromedriver pattern")
});

pub struct ChromeDriver;

#[async_trait]
impl VendorAdapter for ChromeDriver {
    fn driver_type(&self) -> DriverType {
        DriverType::Chrome
    }

    async fn fetch_listing(&self, fetcher: &dyn Fetch) -> Result<Vec<RawEntry>, DriverError> {
        fetch_xml_keys(fetcher, CHROMEDRIVER_URL, "Key").await
    }

    fn parse_entry(&self, raw: &RawEntry) -> Option<ListingEntry> {
        let caps = KEY_PATTERN.captures(&raw.name)?;
        let os = &caps[3];
        let arch = &caps[4];
        Some(ListingEntry {
            version: caps[1].to_string(),
            os: os.to_string(),
            arch: arch.to_string(),
            filename: format!("chromedriver_{os}{arch}.zip"),
        })
    }

    fn download_url(&self, version: &str, filename: &str) -> String {
        format!("{CHROMEDRIVER_URL}/{version}/{filename}")
    }
}
