#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use rsdriver::installer::InstallationManager;
use rsdriver::manifest::{Manifest, ManifestEntry};
use rsdriver::{DriverError, Fetch, HostPlatform, Settings};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

pub const CHROME_LISTING_URL: &str = "https://chromedriver.storage.googleapis.com";
pub const GECKO_LISTING_URL: &str = "https://api.github.com/repos/mozilla/geckodriver/releases";

pub const CHROME_LISTING: &str = r#"<?xml version='1.0' encoding='UTF-8'?>
<ListBucketResult xmlns="http://doc.s3.amazonaws.com/2006-03-01">
  <Name>chromedriver</Name>
  <Contents><Key>2.0/chromedriver_linux32.zip</Key></Contents>
  <Contents><Key>2.0/chromedriver_linux64.zip</Key></Contents>
  <Contents><Key>2.0/chromedriver_mac32.zip</Key></Contents>
  <Contents><Key>2.0/chromedriver_win32.zip</Key></Contents>
  <Contents><Key>2.0/notes.txt</Key></Contents>
  <Contents><Key>2.1/chromedriver_win32.zip</Key></Contents>
  <Contents><Key>71.0.3578.33/chromedriver_win32.zip</Key></Contents>
  <Contents><Key>81.0.4044.20/chromedriver_linux64.zip</Key></Contents>
  <Contents><Key>81.0.4044.20/chromedriver_win32.zip</Key></Contents>
  <Contents><Key>LATEST_RELEASE</Key></Contents>
  <Contents><Key>index.html</Key></Contents>
</ListBucketResult>"#;

pub const GECKO_LISTING: &str = r#"[
  {"tag_name": "v0.28.0", "assets": [
    {"name": "geckodriver-v0.28.0-linux64.tar.gz"},
    {"name": "geckodriver-v0.28.0-linux64.tar.gz.asc"},
    {"name": "geckodriver-v0.28.0-macos.tar.gz"},
    {"name": "geckodriver-v0.28.0-win64.zip"}
  ]},
  {"tag_name": "v0.4.2", "assets": [
    {"name": "wires-0.4.2-linux64.gz"},
    {"name": "wires-0.4.2-osx.gz"}
  ]}
]"#;

pub fn chrome_archive_url(version: &str, filename: &str) -> String {
    format!("{CHROME_LISTING_URL}/{version}/{filename}")
}

/// In-memory [`Fetch`]: serves registered URLs, answers 404 otherwise and
/// records every request.
#[derive(Default)]
pub struct FakeFetcher {
    responses: HashMap<String, Vec<u8>>,
    requests: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.responses.insert(url.into(), body.into());
        self
    }

    pub fn chrome() -> Self {
        Self::new().with(CHROME_LISTING_URL, CHROME_LISTING)
    }

    pub fn gecko() -> Self {
        Self::new().with(GECKO_LISTING_URL, GECKO_LISTING)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

#[async_trait]
impl Fetch for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DriverError> {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| DriverError::Download {
                url: url.to_string(),
                status: 404,
            })
    }
}

pub fn zip_bytes(entry_name: &str, content: &[u8]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(entry_name, SimpleFileOptions::default())
        .unwrap();
    writer.write_all(content).unwrap();
    writer.finish().unwrap().into_inner()
}

pub fn gz_bytes(content: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content).unwrap();
    encoder.finish().unwrap()
}

pub fn settings(dir: &TempDir) -> Settings {
    Settings::new(dir.path().join("drivers"), dir.path().join("cache"))
        .setup_dirs()
        .unwrap()
}

pub fn manager(
    dir: &TempDir,
    host: HostPlatform,
    fetcher: FakeFetcher,
) -> InstallationManager<FakeFetcher> {
    InstallationManager::new(settings(dir), host, fetcher).unwrap()
}

pub fn entry(version: &str, os: &str, arch: &str, filename: &str) -> ManifestEntry {
    ManifestEntry {
        version: version.into(),
        os: os.into(),
        arch: arch.into(),
        filename: filename.into(),
        checksum: "56db17c16d7fc9003694a2a01e37dc87".into(),
    }
}

/// Writes `entries` to the manifest of `settings` before a manager loads it.
pub fn write_manifest(settings: &Settings, entries: &[(&str, ManifestEntry)]) {
    let mut manifest = Manifest::load(&settings.manifest_path()).unwrap();
    for (driver_type, entry) in entries {
        manifest.set(driver_type, entry);
    }
    manifest.save().unwrap();
}

pub fn read(path: &Path) -> Vec<u8> {
    std::fs::read(path).unwrap()
}
