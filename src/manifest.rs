//! Installed-driver state persisted in `<DRIVERS_HOME>/.drivers.ini`.
//!
//! One section per driver type:
//!
//! ```ini
//! [chrome]
//! VERSION=81.0.4044.20
//! OS=win
//! ARCHITECTURE=32
//! FILENAME=chromedriver.exe
//! CHECKSUM=56db17c16d7fc9003694a2a01e37dc87
//! ```

use std::path::{Path, PathBuf};

use ini::Ini;
use tracing::debug;

use crate::error::DriverError;

pub const KEY_VERSION: &str = "VERSION";
pub const KEY_OS: &str = "OS";
pub const KEY_ARCHITECTURE: &str = "ARCHITECTURE";
pub const KEY_FILENAME: &str = "FILENAME";
pub const KEY_CHECKSUM: &str = "CHECKSUM";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManifestEntry {
    pub version: String,
    pub os: String,
    pub arch: String,
    pub filename: String,
    pub checksum: String,
}

pub struct Manifest {
    path: PathBuf,
    ini: Ini,
}

impl Manifest {
    /// Loads the manifest at `path`; a missing file is an empty manifest.
    pub fn load(path: &Path) -> Result<Self, DriverError> {
        let ini = if path.is_file() {
            Ini::load_from_file(path).map_err(|e| DriverError::ManifestError {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
        } else {
            Ini::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            ini,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Section names, i.e. installed driver types, in file order.
    pub fn driver_types(&self) -> Vec<String> {
        self.ini
            .sections()
            .flatten()
            .map(str::to_string)
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.driver_types().is_empty()
    }

    pub fn contains(&self, driver_type: &str) -> bool {
        self.ini.section(Some(driver_type)).is_some()
    }

    /// Entry for `driver_type`. Missing fields come back empty so that a
    /// corrupted section can be detected instead of failing here.
    pub fn get(&self, driver_type: &str) -> Option<ManifestEntry> {
        let section = self.ini.section(Some(driver_type))?;
        let field = |key: &str| section.get(key).unwrap_or_default().to_string();
        Some(ManifestEntry {
            version: field(KEY_VERSION),
            os: field(KEY_OS),
            arch: field(KEY_ARCHITECTURE),
            filename: field(KEY_FILENAME),
            checksum: field(KEY_CHECKSUM),
        })
    }

    pub fn set(&mut self, driver_type: &str, entry: &ManifestEntry) {
        self.ini.delete(Some(driver_type));
        self.ini
            .with_section(Some(driver_type))
            .set(KEY_VERSION, entry.version.as_str())
            .set(KEY_OS, entry.os.as_str())
            .set(KEY_ARCHITECTURE, entry.arch.as_str())
            .set(KEY_FILENAME, entry.filename.as_str())
            .set(KEY_CHECKSUM, entry.checksum.as_str());
        debug!("Driver {driver_type} added to ini file");
    }

    pub fn remove(&mut self, driver_type: &str) -> Option<ManifestEntry> {
        let entry = self.get(driver_type)?;
        self.ini.delete(Some(driver_type));
        debug!("Driver {driver_type} removed from ini");
        Some(entry)
    }

    /// Overwrites the file with the current state.
    pub fn save(&self) -> Result<(), DriverError> {
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| DriverError::io(&self.path, e))
    }
}
