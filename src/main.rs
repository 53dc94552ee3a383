use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rsdriver::installer::{InstallOutcome, InstallationManager};
use rsdriver::manifest::Manifest;
use rsdriver::report::{self, dir_size, format_size};
use rsdriver::{DriverError, DriverRequest, DriverType, HttpFetcher, Settings, detect_host_platform};

/// Download and manage selenium WebDrivers from a single app.
#[derive(Parser, Debug)]
#[command(name = "rsdriver", version, about)]
struct Cli {
    /// Log debug messages
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show where WebDrivers and the cache live, with their sizes
    ShowEnv,

    /// List installed WebDrivers in a form of table
    ShowInstalled,

    /// List WebDrivers available to install for a driver type
    ShowAvailable {
        /// Type of the WebDriver
        #[arg(short, long = "driver-type", value_enum)]
        driver_type: DriverType,
    },

    /// Delete the download cache directory
    ClearCache,

    /// Download a version of a WebDriver type
    Install {
        /// Type of the WebDriver
        #[arg(short, long = "driver-type", value_enum)]
        driver_type: DriverType,

        /// Requested version (default: newest)
        #[arg(short = 'v', long = "version", default_value = "", conflicts_with = "match_browser")]
        driver_version: String,

        /// Target operating system (default: current OS)
        #[arg(short, long, default_value = "")]
        os: String,

        /// Target architecture (default: current architecture)
        #[arg(short, long, default_value = "")]
        arch: String,

        /// Install the version closest to the locally installed browser
        #[arg(short, long)]
        match_browser: bool,

        /// Browser executable used with --match-browser
        #[arg(long, requires = "match_browser")]
        browser_path: Option<PathBuf>,
    },

    /// Update given WebDrivers, or all installed WebDrivers
    Update {
        /// Type of the WebDriver, may be repeated
        #[arg(short, long = "driver-type", value_enum)]
        driver_type: Vec<DriverType>,
    },

    /// Delete given WebDrivers, or all installed WebDrivers
    Delete {
        /// Type of the WebDriver, may be repeated
        #[arg(short, long = "driver-type", value_enum)]
        driver_type: Vec<DriverType>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    ExitCode::from(exit_status(runtime.block_on(run(cli.command))))
}

/// 0 for success, including every no-op outcome; 1 for any failure.
/// Argument errors never get here: clap exits with 2 on its own.
fn exit_status(result: Result<(), DriverError>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            error!("{e}");
            1
        }
    }
}

async fn run(command: Commands) -> Result<(), DriverError> {
    let settings = Settings::from_env()?;

    match command {
        Commands::ShowEnv => {
            info!(
                "WebDrivers are installed in: {}, total size is: {}",
                settings.drivers_home.display(),
                format_size(dir_size(&settings.drivers_home))
            );
            info!(
                "rsdriver cache is in: {}, total size is: {}",
                settings.cache_dir.display(),
                format_size(dir_size(&settings.cache_dir))
            );
            Ok(())
        }
        Commands::ShowInstalled => {
            if !settings.drivers_home.is_dir() {
                return Err(DriverError::MissingDirectory(settings.drivers_home));
            }
            let manifest = Manifest::load(&settings.manifest_path())?;
            println!("{}", report::installed_table(&manifest)?);
            Ok(())
        }
        Commands::ShowAvailable { driver_type } => {
            let manager = manager(settings)?;
            let index = manager.available(driver_type).await?;
            info!("Available {driver_type} drivers:");
            println!("{}", report::available_table(&index));
            Ok(())
        }
        Commands::ClearCache => {
            manager(settings)?.clear_cache().await;
            Ok(())
        }
        Commands::Install {
            driver_type,
            driver_version,
            os,
            arch,
            match_browser,
            browser_path,
        } => {
            let mut manager = manager(settings)?;
            let outcome = if match_browser {
                manager
                    .install_matching_browser(driver_type, browser_path.as_deref())
                    .await?
            } else {
                let request = DriverRequest::new(driver_type, Some(driver_version), Some(os), Some(arch));
                manager.install(&request).await?
            };
            if let InstallOutcome::AlreadySatisfied { version } = outcome {
                info!("{driver_type}driver {version} is already installed");
            }
            Ok(())
        }
        Commands::Update { driver_type } => {
            manager(settings)?.update_many(&driver_type).await?;
            Ok(())
        }
        Commands::Delete { driver_type } => {
            manager(settings)?.delete(&driver_type)?;
            Ok(())
        }
    }
}

fn manager(settings: Settings) -> Result<InstallationManager<HttpFetcher>, DriverError> {
    let settings = settings.setup_dirs()?;
    let host = detect_host_platform()?;
    InstallationManager::new(settings, host, HttpFetcher::new()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_driver_type_is_a_usage_error() {
        let err = Cli::try_parse_from(["rsdriver", "install", "-d", "nope"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn repeated_driver_types_are_collected() {
        let cli = Cli::try_parse_from(["rsdriver", "delete", "-d", "chrome", "-d", "gecko"]).unwrap();
        match cli.command {
            Commands::Delete { driver_type } => {
                assert_eq!(driver_type, vec![DriverType::Chrome, DriverType::Gecko]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn version_and_match_browser_conflict() {
        let err = Cli::try_parse_from(["rsdriver", "install", "-d", "chrome", "-v", "2.0", "-m"])
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn success_maps_to_zero_and_failures_to_one() {
        assert_eq!(exit_status(Ok(())), 0);
        assert_eq!(
            exit_status(Err(DriverError::VersionNotFound {
                version: "1.0".into(),
                driver_type: "chrome".into(),
            })),
            1
        );
        assert_eq!(
            exit_status(Err(DriverError::MissingEnv("DRIVERS_HOME".into()))),
            1
        );
        assert_eq!(
            exit_status(Err(DriverError::Download {
                url: "https://chromedriver.storage.googleapis.com".into(),
                status: 503,
            })),
            1
        );
    }
}
