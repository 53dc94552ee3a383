use std::path::PathBuf;
use thiserror::Error;

/// Error type for all possible failures in the library.
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Env variable '{0}' not defined")]
    MissingEnv(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("Could not determine the home directory for the cache")]
    HomeNotFound,

    #[error("Failed to execute command '{command}': {source}")]
    CommandExecutionError {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command '{command}' output could not be parsed: {source}")]
    CommandOutputParsingError {
        command: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Browser for {driver_type}driver not found")]
    BrowserNotFound { driver_type: String },

    #[error("Failed to parse browser version from output: '{output}'")]
    BrowserVersionParsingError { output: String },

    #[error("Switch '--match-browser' is supported for Edge web driver only in Windows environment")]
    MatchBrowserUnsupported,

    #[error("Didn't find any webdriver version close to web browser version {browser_version}")]
    NoCloseVersion { browser_version: String },

    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Cannot download file {url} (status {status})")]
    Download { url: String, status: u16 },

    #[error("Failed to parse JSON response from '{url}': {source}")]
    JsonParseError {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse listing from '{url}': {reason}")]
    ListingParseError { url: String, reason: String },

    #[error("No {driver_type}driver versions found in the remote listing")]
    EmptyIndex { driver_type: String },

    #[error("There is no such version: {version} of {driver_type}driver")]
    VersionNotFound { version: String, driver_type: String },

    #[error("There is no such OS {os} for version: {version}")]
    OsNotFound { os: String, version: String },

    #[error("There is no such arch {arch} for version {version} and OS: {os}")]
    ArchNotFound {
        arch: String,
        version: String,
        os: String,
    },

    #[error("No drivers installed")]
    NoDriversInstalled,

    #[error("{0} directory does not exist")]
    MissingDirectory(PathBuf),

    #[error("I/O error accessing path '{path}': {source}")]
    IoError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read manifest '{path}': {reason}")]
    ManifestError { path: PathBuf, reason: String },

    #[error("Failed to decompress zip file '{path}': {source}")]
    ZipError {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Unsupported archive format: {0}")]
    UnsupportedArchive(PathBuf),

    #[error("Driver executable not found in the archive extracted to '{path}'")]
    DriverExecutableNotFound { path: PathBuf },
}

impl DriverError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DriverError::IoError {
            path: path.into(),
            source,
        }
    }
}
