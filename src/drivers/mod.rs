//! Vendor adapters and the closed set of supported driver types.

pub mod chromedriver;
pub mod edgedriver;
pub mod geckodriver;
pub mod github;
pub mod listing;
pub mod operadriver;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use clap::ValueEnum;
use tracing::debug;

use crate::downloader::Fetch;
use crate::error::DriverError;
use crate::index::VersionIndex;

pub use chromedriver::ChromeDriver;
pub use edgedriver::EdgeDriver;
pub use geckodriver::GeckoDriver;
pub use operadriver::OperaDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum)]
pub enum DriverType {
    Chrome,
    Gecko,
    Opera,
    Edge,
}

impl DriverType {
    pub const ALL: [DriverType; 4] = [
        DriverType::Chrome,
        DriverType::Gecko,
        DriverType::Opera,
        DriverType::Edge,
    ];

    /// Name used on the command line and as the manifest section.
    pub fn name(self) -> &'static str {
        match self {
            DriverType::Chrome => "chrome",
            DriverType::Gecko => "gecko",
            DriverType::Opera => "opera",
            DriverType::Edge => "edge",
        }
    }

    /// Executable names that may appear inside this vendor's archives.
    pub fn executable_names(self) -> &'static [&'static str] {
        match self {
            DriverType::Chrome => &["chromedriver"],
            DriverType::Gecko => &["geckodriver", "wires"],
            DriverType::Opera => &["operadriver"],
            DriverType::Edge => &["msedgedriver", "edgewebdriver"],
        }
    }

    /// Executable names across every vendor.
    pub fn all_executable_names() -> Vec<&'static str> {
        Self::ALL
            .iter()
            .flat_map(|driver_type| driver_type.executable_names().iter().copied())
            .collect()
    }

    /// geckodriver publishes a single macOS build without an arch suffix.
    pub fn has_arch_on_mac(self) -> bool {
        !matches!(self, DriverType::Gecko)
    }

    pub fn adapter(self) -> Box<dyn VendorAdapter> {
        match self {
            DriverType::Chrome => Box::new(ChromeDriver),
            DriverType::Gecko => Box::new(GeckoDriver),
            DriverType::Opera => Box::new(OperaDriver),
            DriverType::Edge => Box::new(EdgeDriver),
        }
    }
}

impl fmt::Display for DriverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DriverType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|driver_type| driver_type.name() == s)
            .ok_or_else(|| format!("Invalid driver type: {s}"))
    }
}

/// One raw item of a vendor listing: a bucket key, or a release asset name
/// together with the release tag it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntry {
    pub tag: Option<String>,
    pub name: String,
}

impl RawEntry {
    pub fn key(name: impl Into<String>) -> Self {
        Self {
            tag: None,
            name: name.into(),
        }
    }

    pub fn asset(tag: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            name: name.into(),
        }
    }
}

/// A listing item that parsed into an installable archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub version: String,
    pub os: String,
    pub arch: String,
    pub filename: String,
}

/// Knows where a vendor publishes its drivers and how to read its listing.
#[async_trait]
pub trait VendorAdapter: Send + Sync {
    fn driver_type(&self) -> DriverType;

    /// Retrieves the raw listing from the vendor endpoint.
    async fn fetch_listing(&self, fetcher: &dyn Fetch) -> Result<Vec<RawEntry>, DriverError>;

    /// Parses one listing item. Items that are not driver archives (checksums,
    /// `index.html`, notes, signatures) yield `None`.
    fn parse_entry(&self, raw: &RawEntry) -> Option<ListingEntry>;

    /// URL of the archive `filename` published for `version`.
    fn download_url(&self, version: &str, filename: &str) -> String;
}

/// Fetches the vendor listing and indexes every recognised entry.
pub async fn build_index(
    adapter: &dyn VendorAdapter,
    fetcher: &dyn Fetch,
) -> Result<VersionIndex, DriverError> {
    let raw = adapter.fetch_listing(fetcher).await?;
    let mut index = VersionIndex::new();
    for item in &raw {
        if let Some(entry) = adapter.parse_entry(item) {
            index.record(&entry.version, &entry.os, &entry.arch, &entry.filename);
        }
    }
    debug!(
        "Indexed {} {}driver versions from {} listing entries",
        index.len(),
        adapter.driver_type(),
        raw.len()
    );
    Ok(index)
}
