// Top-level public modules
pub mod archive;
pub mod browser;
pub mod config;
pub mod downloader;
pub mod drivers;
pub mod error;
pub mod index;
pub mod installer;
pub mod manifest;
pub mod platform;
pub mod report;
pub mod resolver;

pub use config::Settings;
pub use downloader::{Fetch, HttpFetcher};
pub use drivers::{DriverType, VendorAdapter};
pub use error::DriverError;
pub use index::VersionIndex;
pub use installer::{DeleteOutcome, InstallOutcome, InstallationManager, UpdateOutcome};
pub use manifest::{Manifest, ManifestEntry};
pub use platform::{HostPlatform, detect_host_platform};
pub use resolver::DriverRequest;
