//! Version detection of the browser a driver type automates.
//!
//! Used by `install --match-browser`. On macOS and Linux the browser binary is
//! run with `--version`; on Windows Chrome is asked through PowerShell, Firefox
//! through its `application.ini`, and Edge through the registry.

use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::info;

use crate::drivers::DriverType;
use crate::error::DriverError;

/// Gets the version of the browser driven by `driver_type`.
///
/// If `path_override` is provided it is used directly; otherwise the browser is
/// looked up in the standard locations of the current system.
pub async fn get_browser_version(
    driver_type: DriverType,
    path_override: Option<&Path>,
) -> Result<String, DriverError> {
    let version = match (driver_type, path_override) {
        (DriverType::Edge, None) => edge_version_from_registry().await?,
        (_, Some(path)) => get_version_on_platform(driver_type, path).await?,
        (_, None) => {
            let path = find_browser_path(driver_type).ok_or_else(|| {
                DriverError::BrowserNotFound {
                    driver_type: driver_type.name().to_string(),
                }
            })?;
            get_version_on_platform(driver_type, &path).await?
        }
    };
    info!("{driver_type} browser installed in version: {version}");
    Ok(version)
}

fn find_browser_path(driver_type: DriverType) -> Option<PathBuf> {
    find_browser_path_system(driver_type)
}

// --- Platform-Specific Implementations ---

#[cfg(target_os = "windows")]
fn find_browser_path_system(driver_type: DriverType) -> Option<PathBuf> {
    let (sub_path, exe_name) = match driver_type {
        DriverType::Chrome => ("Google\\Chrome\\Application", "chrome.exe"),
        DriverType::Gecko => ("Mozilla Firefox", "firefox.exe"),
        DriverType::Opera => ("Programs\\Opera", "opera.exe"),
        DriverType::Edge => ("Microsoft\\Edge\\Application", "msedge.exe"),
    };

    ["ProgramFiles", "ProgramFiles(x86)", "LOCALAPPDATA"]
        .into_iter()
        .filter_map(|var| std::env::var(var).ok())
        .map(|base| Path::new(&base).join(sub_path).join(exe_name))
        .find(|path| path.exists())
}

#[cfg(target_os = "macos")]
fn find_browser_path_system(driver_type: DriverType) -> Option<PathBuf> {
    let path = match driver_type {
        DriverType::Chrome => "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        DriverType::Gecko => "/Applications/Firefox.app/Contents/MacOS/firefox",
        DriverType::Opera => "/Applications/Opera.app/Contents/MacOS/Opera",
        DriverType::Edge => "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
    };
    Some(PathBuf::from(path)).filter(|path| path.exists())
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn find_browser_path_system(driver_type: DriverType) -> Option<PathBuf> {
    let candidates: &[&str] = match driver_type {
        DriverType::Chrome => &[
            "google-chrome",
            "google-chrome-stable",
            "chromium-browser",
            "chromium",
        ],
        DriverType::Gecko => &["firefox"],
        DriverType::Opera => &["opera"],
        DriverType::Edge => &["microsoft-edge", "microsoft-edge-stable"],
    };

    candidates.iter().find_map(|name| which::which(name).ok())
}

#[cfg(target_os = "windows")]
async fn get_version_on_platform(
    driver_type: DriverType,
    path: &Path,
) -> Result<String, DriverError> {
    if driver_type == DriverType::Gecko {
        // application.ini is more reliable than the binary on Windows.
        let install_dir = path.parent().ok_or_else(|| DriverError::BrowserNotFound {
            driver_type: driver_type.name().to_string(),
        })?;
        let ini_path = install_dir.join("application.ini");
        let content = tokio::fs::read_to_string(&ini_path)
            .await
            .map_err(|e| DriverError::io(&ini_path, e))?;
        let version = content
            .lines()
            .find_map(|line| line.strip_prefix("Version="))
            .map(|s| s.trim().to_string());
        return version.ok_or(DriverError::BrowserVersionParsingError { output: content });
    }

    let command_str = format!(
        "(Get-Command '{}').Version.ToString()",
        path.to_string_lossy()
    );
    let stdout = run_command("powershell", &["-Command", &command_str]).await?;
    Ok(stdout.trim().to_string())
}

#[cfg(not(target_os = "windows"))]
async fn get_version_on_platform(
    _driver_type: DriverType,
    path: &Path,
) -> Result<String, DriverError> {
    let program = path.to_string_lossy();
    let stdout = run_command(&program, &["--version"]).await?;
    parse_version_output(&stdout)
}

#[cfg(target_os = "windows")]
async fn edge_version_from_registry() -> Result<String, DriverError> {
    let stdout = run_command(
        "reg",
        &["query", "HKCU\\Software\\Microsoft\\Edge\\BLBeacon", "/v", "version"],
    )
    .await?;
    parse_version_output(&stdout)
}

#[cfg(not(target_os = "windows"))]
async fn edge_version_from_registry() -> Result<String, DriverError> {
    Err(DriverError::MatchBrowserUnsupported)
}

async fn run_command(program: &str, args: &[&str]) -> Result<String, DriverError> {
    let command = format!("'{program}' {}", args.join(" "));
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| DriverError::CommandExecutionError {
            command: command.clone(),
            source: e,
        })?;
    String::from_utf8(output.stdout)
        .map_err(|e| DriverError::CommandOutputParsingError { command, source: e })
}

/// First whitespace-separated token that starts with a digit and contains a dot,
/// e.g. `"Google Chrome 89.0.4389.114 "` → `"89.0.4389.114"`.
pub fn parse_version_output(output: &str) -> Result<String, DriverError> {
    output
        .split_whitespace()
        .find(|s| s.starts_with(|c: char| c.is_ascii_digit()) && s.contains('.'))
        .map(str::to_string)
        .ok_or_else(|| DriverError::BrowserVersionParsingError {
            output: output.to_string(),
        })
}
