//! Install, update and delete workflows over the manifest, cache and
//! installation directory.

use std::cmp::Ordering;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::archive;
use crate::browser;
use crate::config::Settings;
use crate::downloader::{Fetch, download_file};
use crate::drivers::{DriverType, VendorAdapter, build_index};
use crate::error::DriverError;
use crate::index::{VersionIndex, compare_versions};
use crate::manifest::{Manifest, ManifestEntry};
use crate::platform::HostPlatform;
use crate::resolver::{DriverRequest, Resolution, resolve};

const WIN_EXTENSION: &str = ".exe";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed(ManifestEntry),
    /// The manifest already records the requested version, OS and arch.
    AlreadySatisfied { version: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    NotInstalled,
    /// The manifest section has no VERSION.
    Corrupted,
    AlreadyNewest { local: String, remote: String },
    Updated { from: String, to: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    NotInstalled,
    Deleted { file_found: bool },
}

/// Drives every state change of the installation directory.
///
/// The manifest is only written after the driver file is in place.
pub struct InstallationManager<F: Fetch> {
    settings: Settings,
    host: HostPlatform,
    fetcher: F,
    manifest: Manifest,
}

impl<F: Fetch> InstallationManager<F> {
    pub fn new(settings: Settings, host: HostPlatform, fetcher: F) -> Result<Self, DriverError> {
        let manifest = Manifest::load(&settings.manifest_path())?;
        debug!("Identified OS: {}", host.os);
        debug!("Identified architecture: {}", host.arch);
        Ok(Self {
            settings,
            host,
            fetcher,
            manifest,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn host(&self) -> &HostPlatform {
        &self.host
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// `<cache>/<driver type>/<version>/<archive>`
    pub fn cache_path(&self, driver_type: DriverType, version: &str, filename: &str) -> PathBuf {
        self.settings
            .cache_dir
            .join(driver_type.name())
            .join(version)
            .join(filename)
    }

    /// Everything the vendor currently publishes for `driver_type`.
    pub async fn available(&self, driver_type: DriverType) -> Result<VersionIndex, DriverError> {
        build_index(driver_type.adapter().as_ref(), &self.fetcher).await
    }

    /// Installs the driver described by `request`, replacing any installed
    /// driver of the same type.
    pub async fn install(&mut self, request: &DriverRequest) -> Result<InstallOutcome, DriverError> {
        debug!(
            "Requested version: {}, OS: {}, arch: {}",
            request.version.as_deref().unwrap_or(""),
            request.os.as_deref().unwrap_or(""),
            request.arch.as_deref().unwrap_or("")
        );
        let adapter = request.driver_type.adapter();
        let index = build_index(adapter.as_ref(), &self.fetcher).await?;
        self.install_from_index(adapter.as_ref(), &index, request)
            .await
    }

    async fn install_from_index(
        &mut self,
        adapter: &dyn VendorAdapter,
        index: &VersionIndex,
        request: &DriverRequest,
    ) -> Result<InstallOutcome, DriverError> {
        let installed = self.manifest.get(request.driver_type.name());
        let resolution = resolve(request, index, installed.as_ref(), &self.host)?;
        if resolution.already_satisfied {
            return Ok(InstallOutcome::AlreadySatisfied {
                version: resolution.version,
            });
        }
        let entry = self.install_resolution(adapter, &resolution).await?;
        Ok(InstallOutcome::Installed(entry))
    }

    async fn install_resolution(
        &mut self,
        adapter: &dyn VendorAdapter,
        resolution: &Resolution,
    ) -> Result<ManifestEntry, DriverError> {
        let driver_type = adapter.driver_type();
        let archive_path = self.cache_path(driver_type, &resolution.version, &resolution.filename);

        // Cached archives are reused as they are, without re-verification.
        if archive_path.is_file() {
            debug!("{driver_type}driver in cache");
        } else {
            info!("Requested driver not found in cache");
            let url = adapter.download_url(&resolution.version, &resolution.filename);
            download_file(&self.fetcher, &url, &archive_path).await?;
        }

        let work_dir = tempfile::Builder::new()
            .prefix("rsdriver-")
            .tempdir()
            .map_err(|e| DriverError::io(std::env::temp_dir(), e))?;
        archive::extract(&archive_path, work_dir.path()).await?;
        let extracted =
            archive::find_driver_executable(work_dir.path(), &DriverType::all_executable_names())?;
        let file_name = installed_file_name(&extracted, &resolution.os)?;

        if let Some(previous) = self.manifest.get(driver_type.name()) {
            self.delete_driver_file(&previous.filename)?;
        }

        let destination = self.settings.drivers_home.join(&file_name);
        tokio::fs::copy(&extracted, &destination)
            .await
            .map_err(|e| DriverError::io(&destination, e))?;
        make_executable(&destination)?;

        let entry = ManifestEntry {
            version: resolution.version.clone(),
            os: resolution.os.clone(),
            arch: resolution.arch.clone(),
            filename: file_name,
            checksum: archive::md5_checksum(&destination)?,
        };
        self.manifest.set(driver_type.name(), &entry);
        self.manifest.save()?;

        info!(
            "Installed {driver_type}driver:\nVERSION: {}\nOS: {}\nARCHITECTURE: {}",
            entry.version, entry.os, entry.arch
        );
        Ok(entry)
    }

    /// Installs the driver version closest to the locally installed browser,
    /// for the host OS and arch.
    pub async fn install_matching_browser(
        &mut self,
        driver_type: DriverType,
        browser_path: Option<&Path>,
    ) -> Result<InstallOutcome, DriverError> {
        if driver_type == DriverType::Edge && self.host.os != "win" {
            return Err(DriverError::MatchBrowserUnsupported);
        }
        let browser_version = browser::get_browser_version(driver_type, browser_path).await?;
        self.install_for_browser_version(driver_type, &browser_version)
            .await
    }

    pub async fn install_for_browser_version(
        &mut self,
        driver_type: DriverType,
        browser_version: &str,
    ) -> Result<InstallOutcome, DriverError> {
        if let Some(entry) = self.manifest.get(driver_type.name()) {
            if entry.version == browser_version
                && entry.os == self.host.os
                && entry.arch == self.host.arch
            {
                info!("Required version of driver already installed");
                return Ok(InstallOutcome::AlreadySatisfied {
                    version: entry.version,
                });
            }
        }

        let adapter = driver_type.adapter();
        let index = build_index(adapter.as_ref(), &self.fetcher).await?;
        let version = index
            .closest_version(browser_version, &self.host.os)
            .ok_or_else(|| DriverError::NoCloseVersion {
                browser_version: browser_version.to_string(),
            })?;
        info!(
            "Found webdriver nearest version: {version} for OS: {}",
            self.host.os
        );

        let request = DriverRequest::new(
            driver_type,
            Some(version),
            Some(self.host.os.clone()),
            Some(self.host.arch.clone()),
        );
        self.install_from_index(adapter.as_ref(), &index, &request)
            .await
    }

    /// Replaces the installed driver with the newest published version,
    /// keeping its OS and arch.
    pub async fn update(&mut self, driver_type: DriverType) -> Result<UpdateOutcome, DriverError> {
        debug!("Updating {driver_type}driver");
        let Some(entry) = self.manifest.get(driver_type.name()) else {
            info!("Driver {driver_type}driver is not installed");
            return Ok(UpdateOutcome::NotInstalled);
        };
        if entry.version.is_empty() {
            info!("Corrupted .ini file");
            return Ok(UpdateOutcome::Corrupted);
        }

        let adapter = driver_type.adapter();
        let index = build_index(adapter.as_ref(), &self.fetcher).await?;
        let remote = index.newest_version(driver_type.name())?;
        let local = entry.version;
        if compare_versions(&local, &remote) != Ordering::Less {
            info!(
                "{driver_type}driver is already in newest version. Local: {local}, remote: {remote}"
            );
            return Ok(UpdateOutcome::AlreadyNewest { local, remote });
        }

        let request = DriverRequest::new(
            driver_type,
            Some(remote.clone()),
            Some(entry.os),
            Some(entry.arch),
        );
        self.install_from_index(adapter.as_ref(), &index, &request)
            .await?;
        info!("Updated {driver_type}driver: {local} -> {remote}");
        Ok(UpdateOutcome::Updated {
            from: local,
            to: remote,
        })
    }

    /// Updates each of `driver_types`, or every installed driver when empty.
    pub async fn update_many(
        &mut self,
        driver_types: &[DriverType],
    ) -> Result<Vec<(DriverType, UpdateOutcome)>, DriverError> {
        let targets: Vec<DriverType> = if driver_types.is_empty() {
            self.manifest
                .driver_types()
                .into_iter()
                .filter_map(|name| match name.parse::<DriverType>() {
                    Ok(driver_type) => Some(driver_type),
                    Err(e) => {
                        warn!("Skipping manifest section: {e}");
                        None
                    }
                })
                .collect()
        } else {
            driver_types.to_vec()
        };
        if targets.is_empty() {
            info!("No drivers installed");
        }

        let mut outcomes = Vec::with_capacity(targets.len());
        for driver_type in targets {
            let outcome = self.update(driver_type).await?;
            outcomes.push((driver_type, outcome));
        }
        Ok(outcomes)
    }

    /// Deletes each of `driver_types`, or every installed driver when empty.
    /// Types that are not installed are reported and skipped.
    pub fn delete(
        &mut self,
        driver_types: &[DriverType],
    ) -> Result<Vec<(String, DeleteOutcome)>, DriverError> {
        let targets: Vec<String> = if driver_types.is_empty() {
            self.manifest.driver_types()
        } else {
            driver_types.iter().map(|t| t.name().to_string()).collect()
        };
        if targets.is_empty() {
            info!("No drivers installed");
        }

        let mut outcomes = Vec::with_capacity(targets.len());
        for name in targets {
            let Some(entry) = self.manifest.get(&name) else {
                info!("Driver: {name} is not installed");
                outcomes.push((name, DeleteOutcome::NotInstalled));
                continue;
            };
            let file_found = self.delete_driver_file(&entry.filename)?;
            self.manifest.remove(&name);
            self.manifest.save()?;
            info!("Driver: {name} deleted");
            outcomes.push((name, DeleteOutcome::Deleted { file_found }));
        }
        Ok(outcomes)
    }

    /// Removes the archive cache; it is recreated on the next download.
    pub async fn clear_cache(&self) {
        info!(
            "Removing cache directory: {}",
            self.settings.cache_dir.display()
        );
        if let Err(e) = tokio::fs::remove_dir_all(&self.settings.cache_dir).await {
            debug!("Cache directory not removed: {e}");
        }
    }

    /// Removes an installed driver file. A file that is already gone is
    /// reported as not found; any other failure is an error.
    fn delete_driver_file(&self, filename: &str) -> Result<bool, DriverError> {
        if filename.is_empty() {
            debug!("Driver file not found: {filename}");
            return Ok(false);
        }
        let path = self.settings.drivers_home.join(filename);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!("Driver file deleted: {filename}");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Driver file not found: {filename}");
                Ok(false)
            }
            Err(e) => Err(DriverError::io(path, e)),
        }
    }
}

/// Name the extracted driver gets in the installation directory. Windows
/// targets always end in `.exe`.
fn installed_file_name(extracted: &Path, os: &str) -> Result<String, DriverError> {
    let name = extracted
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| DriverError::DriverExecutableNotFound {
            path: extracted.to_path_buf(),
        })?;
    if os == "win" && !name.to_lowercase().ends_with(WIN_EXTENSION) {
        Ok(format!("{name}{WIN_EXTENSION}"))
    } else {
        Ok(name.to_string())
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), DriverError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| DriverError::io(path, e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), DriverError> {
    Ok(())
}
