//! Host OS and architecture in the vocabulary used by the vendor listings.

use crate::error::DriverError;
use tracing::debug;

/// OS name and bitness of the machine rsdriver runs on, e.g. `("linux", "64")`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPlatform {
    pub os: String,
    pub arch: String,
}

impl HostPlatform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }
}

/// Detects the current host platform.
///
/// Not cached: every caller asks again, so tests construct a `HostPlatform`
/// directly instead of patching anything global.
pub fn detect_host_platform() -> Result<HostPlatform, DriverError> {
    host_platform_from(std::env::consts::OS, std::env::consts::ARCH)
}

/// Maps a system name and machine string (as reported by `uname` or
/// `std::env::consts`) to listing tokens.
pub fn host_platform_from(system: &str, machine: &str) -> Result<HostPlatform, DriverError> {
    let system = system.to_lowercase();
    let os = match system.as_str() {
        "darwin" | "macos" => "mac",
        "windows" => "win",
        "linux" => "linux",
        _ => {
            return Err(DriverError::UnsupportedPlatform(format!(
                "Unknown OS type: {system}"
            )));
        }
    };
    debug!("Current's OS type string: {system} -> {os}");

    let arch = match machine.to_lowercase().as_str() {
        "x86_64" | "amd64" => "64",
        "i386" | "i586" | "i686" | "x86" | "32" => "32",
        _ => {
            return Err(DriverError::UnsupportedPlatform(format!(
                "Unknown architecture: {machine}"
            )));
        }
    };
    debug!("Current's OS architecture string: {machine} -> {arch} bit");

    Ok(HostPlatform::new(os, arch))
}

/// Collapses the vendors' spellings of macOS into `mac`.
pub fn normalize_os_token(token: &str) -> String {
    match token.to_lowercase().as_str() {
        "osx" | "macos" | "mac" => "mac".to_string(),
        _ => token.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_system_names() {
        assert_eq!(host_platform_from("Windows", "AMD64").unwrap().os, "win");
        assert_eq!(host_platform_from("Darwin", "x86_64").unwrap().os, "mac");
        assert_eq!(host_platform_from("macos", "x86_64").unwrap().os, "mac");
        assert_eq!(host_platform_from("Linux", "x86_64").unwrap().os, "linux");
    }

    #[test]
    fn maps_machines() {
        assert_eq!(host_platform_from("linux", "x86_64").unwrap().arch, "64");
        assert_eq!(host_platform_from("linux", "AMD64").unwrap().arch, "64");
        assert_eq!(host_platform_from("linux", "i386").unwrap().arch, "32");
        assert_eq!(host_platform_from("linux", "i586").unwrap().arch, "32");
        assert_eq!(host_platform_from("linux", "x86").unwrap().arch, "32");
    }

    #[test]
    fn rejects_unknown_system_and_machine() {
        let err = host_platform_from("nok", "x86_64").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported platform: Unknown OS type: nok");

        let err = host_platform_from("linux", "nok").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unsupported platform: Unknown architecture: nok"
        );
    }

    #[test]
    fn normalizes_mac_spellings() {
        for token in ["osx", "OSX", "macos", "macOS", "mac"] {
            assert_eq!(normalize_os_token(token), "mac");
        }
        assert_eq!(normalize_os_token("linux"), "linux");
        assert_eq!(normalize_os_token("arm"), "arm");
    }
}
