//! msedgedriver from the Azure blob container.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::downloader::Fetch;
use crate::drivers::listing::fetch_xml_keys;
use crate::drivers::{DriverType, ListingEntry, RawEntry, VendorAdapter};
use crate::error::DriverError;

pub const EDGEDRIVER_URL: &str = "https://msedgewebdriverstorage.blob.core.windows.net/edgewebdriver";

static BLOB_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(([0-9]+\.){1,3}[0-9]+).*/edgedriver_(linux|win|mac|arm)(32|64|86)\.zip")
        .expect("valid edgedriver pattern")
});

pub struct EdgeDriver;

#[async_trait]
impl VendorAdapter for EdgeDriver {
    fn driver_type(&self) -> DriverType {
        DriverType::Edge
    }

    async fn fetch_listing(&self, fetcher: &dyn Fetch) -> Result<Vec<RawEntry>, DriverError> {
        fetch_xml_keys(fetcher, &format!("{EDGEDRIVER_URL}/?comp=list"), "Name").await
    }

    fn parse_entry(&self, raw: &RawEntry) -> Option<ListingEntry> {
        let caps = BLOB_PATTERN.captures(&raw.name)?;
        let os = &caps[3];
        let arch = &caps[4];
        Some(ListingEntry {
            version: caps[1].to_string(),
            os: os.to_string(),
            arch: arch.to_string(),
            filename: format!("edgedriver_{os}{arch}.zip"),
        })
    }

    fn download_url(&self, version: &str, filename: &str) -> String {
        format!("{EDGEDRIVER_URL}/{version}/{filename}")
    }
}
