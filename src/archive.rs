//! Unpacking driver archives and locating the executable inside them.

use crate::error::DriverError;
use flate2::read::GzDecoder;
use md5::{Digest, Md5};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    TarGz,
    /// A single gzip-compressed file, e.g. `wires-0.4.2-osx.gz`.
    Gz,
}

impl ArchiveKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_lowercase();
        if name.ends_with(".zip") {
            Some(ArchiveKind::Zip)
        } else if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(ArchiveKind::TarGz)
        } else if name.ends_with(".gz") {
            Some(ArchiveKind::Gz)
        } else {
            None
        }
    }
}

/// Decompresses `archive_path` into `extract_to`.
///
/// The decompressors are synchronous, so the work runs in `spawn_blocking`.
pub async fn extract(archive_path: &Path, extract_to: &Path) -> Result<(), DriverError> {
    let kind = ArchiveKind::from_path(archive_path)
        .ok_or_else(|| DriverError::UnsupportedArchive(archive_path.to_path_buf()))?;
    let archive_path_buf = archive_path.to_path_buf();
    let extract_to_buf = extract_to.to_path_buf();

    tokio::task::spawn_blocking(move || {
        std::fs::create_dir_all(&extract_to_buf)
            .map_err(|e| DriverError::io(&extract_to_buf, e))?;
        match kind {
            ArchiveKind::Zip => unzip_file(&archive_path_buf, &extract_to_buf),
            ArchiveKind::TarGz => untar_gz_file(&archive_path_buf, &extract_to_buf),
            ArchiveKind::Gz => gunzip_file(&archive_path_buf, &extract_to_buf),
        }
    })
    .await
    .map_err(|e| DriverError::io(archive_path, std::io::Error::other(e)))??;

    debug!(
        "Uncompressed {} to {}",
        archive_path.display(),
        extract_to.display()
    );
    Ok(())
}

fn unzip_file(archive_path: &Path, extract_to: &Path) -> Result<(), DriverError> {
    let file = File::open(archive_path).map_err(|e| DriverError::io(archive_path, e))?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| {
        DriverError::ZipError {
            path: archive_path.to_path_buf(),
            source: e,
        }
    })?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(|e| DriverError::ZipError {
            path: archive_path.to_path_buf(),
            source: e,
        })?;

        let outpath = match file.enclosed_name() {
            Some(path) => extract_to.join(path),
            None => continue,
        };

        if file.is_dir() {
            std::fs::create_dir_all(&outpath).map_err(|e| DriverError::io(&outpath, e))?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DriverError::io(parent, e))?;
        }
        let mut outfile = File::create(&outpath).map_err(|e| DriverError::io(&outpath, e))?;
        std::io::copy(&mut file, &mut outfile).map_err(|e| DriverError::io(&outpath, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = file.unix_mode() {
                std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))
                    .map_err(|e| DriverError::io(&outpath, e))?;
            }
        }
    }
    Ok(())
}

fn untar_gz_file(archive_path: &Path, extract_to: &Path) -> Result<(), DriverError> {
    let file = File::open(archive_path).map_err(|e| DriverError::io(archive_path, e))?;
    let mut archive = tar::Archive::new(GzDecoder::new(BufReader::new(file)));
    archive
        .unpack(extract_to)
        .map_err(|e| DriverError::io(archive_path, e))
}

fn gunzip_file(archive_path: &Path, extract_to: &Path) -> Result<(), DriverError> {
    let name = archive_path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.trim_end_matches(".gz").to_string())
        .ok_or_else(|| DriverError::UnsupportedArchive(archive_path.to_path_buf()))?;
    let outpath = extract_to.join(name);

    let file = File::open(archive_path).map_err(|e| DriverError::io(archive_path, e))?;
    let mut decoder = GzDecoder::new(BufReader::new(file));
    let mut outfile = File::create(&outpath).map_err(|e| DriverError::io(&outpath, e))?;
    std::io::copy(&mut decoder, &mut outfile).map_err(|e| DriverError::io(&outpath, e))?;
    Ok(())
}

/// Finds the driver executable under `search_path`.
///
/// Archives may nest the binary in a folder and ship sidecar files; the first
/// regular file (in file-name order) whose name contains one of `names` wins.
pub fn find_driver_executable(search_path: &Path, names: &[&str]) -> Result<PathBuf, DriverError> {
    for entry in WalkDir::new(search_path).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(search_path).to_path_buf();
            DriverError::io(
                path,
                e.into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("WalkDir error")),
            )
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        if names.iter().any(|name| file_name.contains(name)) {
            return Ok(entry.into_path());
        }
    }

    Err(DriverError::DriverExecutableNotFound {
        path: search_path.to_path_buf(),
    })
}

/// Hex MD5 digest of the file's contents.
pub fn md5_checksum(path: &Path) -> Result<String, DriverError> {
    let bytes = std::fs::read(path).map_err(|e| DriverError::io(path, e))?;
    let checksum = format!("{:x}", Md5::digest(&bytes));
    debug!("Checksum of file {}: {checksum}", path.display());
    Ok(checksum)
}
