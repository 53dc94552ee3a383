//! Turns a partial request into one concrete archive to install.

use tracing::{debug, info};

use crate::drivers::DriverType;
use crate::error::DriverError;
use crate::index::VersionIndex;
use crate::manifest::ManifestEntry;
use crate::platform::HostPlatform;

/// What the user asked for. Blank fields are filled in by [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverRequest {
    pub driver_type: DriverType,
    pub version: Option<String>,
    pub os: Option<String>,
    pub arch: Option<String>,
}

impl DriverRequest {
    /// Empty strings are treated the same as omitted values.
    pub fn new(
        driver_type: DriverType,
        version: Option<String>,
        os: Option<String>,
        arch: Option<String>,
    ) -> Self {
        fn non_empty(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }
        Self {
            driver_type,
            version: non_empty(version),
            os: non_empty(os),
            arch: non_empty(arch),
        }
    }

    pub fn newest(driver_type: DriverType) -> Self {
        Self::new(driver_type, None, None, None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub version: String,
    pub os: String,
    pub arch: String,
    /// Archive name at the resolved index leaf. Empty when the request was
    /// already satisfied by a version the listing no longer carries.
    pub filename: String,
    /// The manifest already holds exactly this version, OS and arch.
    pub already_satisfied: bool,
}

/// Resolves `request` against `index`, the currently installed entry (if any)
/// and the host platform.
///
/// Validation stops at the first missing axis: version, then OS, then arch.
pub fn resolve(
    request: &DriverRequest,
    index: &VersionIndex,
    installed: Option<&ManifestEntry>,
    host: &HostPlatform,
) -> Result<Resolution, DriverError> {
    let driver_type = request.driver_type;
    let version = match &request.version {
        Some(version) => version.clone(),
        None => {
            let newest = index.newest_version(driver_type.name())?;
            debug!("Highest version of driver is: {newest}");
            newest
        }
    };
    let os = request.os.clone().unwrap_or_else(|| host.os.clone());
    let mut arch = request.arch.clone().unwrap_or_else(|| host.arch.clone());
    if !driver_type.has_arch_on_mac() && os == "mac" {
        arch = String::new();
    }
    debug!("I will download following version: {version}, OS: {os}, arch: {arch}");

    // Plain string equality: the manifest stores exactly what the vendor listed.
    if let Some(entry) = installed {
        if entry.os == os && entry.arch == arch && entry.version == version {
            info!("Requested driver already installed");
            let filename = index
                .filename(&version, &os, &arch)
                .unwrap_or_default()
                .to_string();
            return Ok(Resolution {
                version,
                os,
                arch,
                filename,
                already_satisfied: true,
            });
        }
    }

    if !index.has_version(&version) {
        return Err(DriverError::VersionNotFound {
            version,
            driver_type: driver_type.name().to_string(),
        });
    }
    if !index.has_os(&version, &os) {
        return Err(DriverError::OsNotFound { os, version });
    }
    let filename = match index.filename(&version, &os, &arch) {
        Some(filename) => filename.to_string(),
        None => return Err(DriverError::ArchNotFound { arch, version, os }),
    };

    Ok(Resolution {
        version,
        os,
        arch,
        filename,
        already_satisfied: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chrome_index() -> VersionIndex {
        let mut index = VersionIndex::new();
        for (version, os, arch) in [
            ("2.0", "linux", "32"),
            ("2.0", "linux", "64"),
            ("2.0", "win", "32"),
            ("71.0.3578.33", "linux", "64"),
            ("71.0.3578.33", "mac", "64"),
            ("71.0.3578.33", "win", "32"),
            ("81.0.4044.20", "win", "32"),
        ] {
            index.record(version, os, arch, &format!("chromedriver_{os}{arch}.zip"));
        }
        index
    }

    fn entry(version: &str, os: &str, arch: &str) -> ManifestEntry {
        ManifestEntry {
            version: version.into(),
            os: os.into(),
            arch: arch.into(),
            filename: "chromedriver.exe".into(),
            checksum: "56db17c16d7fc9003694a2a01e37dc87".into(),
        }
    }

    fn win32() -> HostPlatform {
        HostPlatform::new("win", "32")
    }

    #[test]
    fn blank_request_resolves_to_newest_for_host() {
        let resolution = resolve(
            &DriverRequest::newest(DriverType::Chrome),
            &chrome_index(),
            None,
            &win32(),
        )
        .unwrap();
        assert_eq!(resolution.version, "81.0.4044.20");
        assert_eq!(resolution.os, "win");
        assert_eq!(resolution.arch, "32");
        assert_eq!(resolution.filename, "chromedriver_win32.zip");
        assert!(!resolution.already_satisfied);
    }

    #[test]
    fn empty_strings_count_as_blank() {
        let request = DriverRequest::new(
            DriverType::Chrome,
            Some(String::new()),
            Some(String::new()),
            Some(String::new()),
        );
        assert_eq!(request, DriverRequest::newest(DriverType::Chrome));
    }

    #[test]
    fn exact_manifest_match_is_already_satisfied() {
        let installed = entry("81.0.4044.20", "win", "32");
        let resolution = resolve(
            &DriverRequest::newest(DriverType::Chrome),
            &chrome_index(),
            Some(&installed),
            &win32(),
        )
        .unwrap();
        assert!(resolution.already_satisfied);
    }

    #[test]
    fn numerically_equal_but_differently_spelled_version_is_not_satisfied() {
        let mut index = chrome_index();
        index.record("2.00", "win", "32", "chromedriver_win32.zip");
        let installed = entry("2.0", "win", "32");
        let request = DriverRequest::new(
            DriverType::Chrome,
            Some("2.00".into()),
            None,
            None,
        );
        let resolution = resolve(&request, &index, Some(&installed), &win32()).unwrap();
        assert!(!resolution.already_satisfied);
        assert_eq!(resolution.version, "2.00");
    }

    #[test]
    fn unknown_version_names_version_and_driver_only() {
        let request = DriverRequest::new(
            DriverType::Chrome,
            Some("1.1.1.1".into()),
            Some("not_supported".into()),
            Some("not_supported".into()),
        );
        let err = resolve(&request, &chrome_index(), None, &win32()).unwrap_err();
        let message = err.to_string();
        assert_eq!(message, "There is no such version: 1.1.1.1 of chromedriver");
        assert!(!message.contains("not_supported"));
    }

    #[test]
    fn unknown_os_is_reported_before_arch() {
        let request = DriverRequest::new(
            DriverType::Chrome,
            Some("71.0.3578.33".into()),
            Some("not_supported".into()),
            Some("not_supported".into()),
        );
        let err = resolve(&request, &chrome_index(), None, &win32()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "There is no such OS not_supported for version: 71.0.3578.33"
        );
    }

    #[test]
    fn unknown_arch_is_reported() {
        let request = DriverRequest::new(
            DriverType::Chrome,
            Some("71.0.3578.33".into()),
            Some("win".into()),
            Some("not_supported".into()),
        );
        let err = resolve(&request, &chrome_index(), None, &win32()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "There is no such arch not_supported for version 71.0.3578.33 and OS: win"
        );
    }

    #[test]
    fn gecko_on_mac_forces_empty_arch() {
        let mut index = VersionIndex::new();
        index.record("0.28.0", "mac", "", "geckodriver-v0.28.0-macos.tar.gz");
        let request = DriverRequest::new(
            DriverType::Gecko,
            None,
            Some("mac".into()),
            Some("64".into()),
        );
        let resolution = resolve(&request, &index, None, &win32()).unwrap();
        assert_eq!(resolution.arch, "");
        assert_eq!(resolution.filename, "geckodriver-v0.28.0-macos.tar.gz");
    }

    #[test]
    fn chrome_on_mac_keeps_arch() {
        let request = DriverRequest::new(
            DriverType::Chrome,
            Some("71.0.3578.33".into()),
            Some("mac".into()),
            None,
        );
        let host = HostPlatform::new("linux", "64");
        let resolution = resolve(&request, &chrome_index(), None, &host).unwrap();
        assert_eq!(resolution.arch, "64");
    }

    #[test]
    fn blank_version_against_empty_index_fails() {
        let err = resolve(
            &DriverRequest::newest(DriverType::Edge),
            &VersionIndex::new(),
            None,
            &win32(),
        )
        .unwrap_err();
        assert!(matches!(err, DriverError::EmptyIndex { .. }));
    }
}
