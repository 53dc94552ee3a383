//! Console tables and sizes for the `show-*` commands.

use std::path::Path;

use walkdir::WalkDir;

use crate::error::DriverError;
use crate::index::VersionIndex;
use crate::manifest::Manifest;

/// One row per published (version, OS), arches joined by spaces.
pub fn available_table(index: &VersionIndex) -> String {
    let rows: Vec<Vec<String>> = index
        .rows()
        .into_iter()
        .map(|(version, os, arches)| vec![version, os, arches.join(" ")])
        .collect();
    render_table(&["VERSION", "OS", "ARCHITECTURE"], &rows)
}

/// One row per manifest section. An empty manifest is an error.
pub fn installed_table(manifest: &Manifest) -> Result<String, DriverError> {
    let rows: Vec<Vec<String>> = manifest
        .driver_types()
        .into_iter()
        .filter_map(|driver_type| {
            let entry = manifest.get(&driver_type)?;
            Some(vec![
                driver_type,
                entry.version,
                entry.os,
                entry.arch,
                entry.filename,
                entry.checksum,
            ])
        })
        .collect();
    if rows.is_empty() {
        return Err(DriverError::NoDriversInstalled);
    }
    Ok(render_table(
        &["DRIVER TYPE", "VERSION", "OS", "ARCHITECTURE", "FILENAME", "CHECKSUM"],
        &rows,
    ))
}

/// Renders `rows` under `headers` as an aligned plain-text table with a
/// leading row-index column.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let index_width = rows.len().saturating_sub(1).to_string().len().max(2);
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut lines = vec![format_line("", index_width, headers, &widths)];
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let rule: Vec<&str> = rule.iter().map(String::as_str).collect();
    lines.push(format_line(&"-".repeat(index_width), index_width, &rule, &widths));
    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<&str> = row.iter().map(String::as_str).collect();
        lines.push(format_line(&i.to_string(), index_width, &cells, &widths));
    }
    lines.join("\n")
}

fn format_line(index: &str, index_width: usize, cells: &[&str], widths: &[usize]) -> String {
    let mut out = format!("{index:>index_width$}");
    for (cell, &width) in cells.iter().zip(widths) {
        out.push_str(&format!("  {cell:<width$}"));
    }
    out.trim_end().to_string()
}

/// Decimal size with up to two decimals: "0 bytes", "365 bytes", "1.69 KB".
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["KB", "MB", "GB", "TB", "PB"];
    if bytes < 1000 {
        return if bytes == 1 {
            "1 byte".to_string()
        } else {
            format!("{bytes} bytes")
        };
    }
    let mut value = bytes as f64;
    let mut unit = UNITS[0];
    for candidate in UNITS {
        value /= 1000.0;
        unit = candidate;
        // Compare what will be printed, so 999.999 KB shows as 1 MB.
        if (value * 100.0).round() < 100_000.0 {
            break;
        }
    }
    let number = format!("{value:.2}");
    let number = number.trim_end_matches('0').trim_end_matches('.');
    format!("{number} {unit}")
}

/// Total size of the regular files under `dir`; unreadable entries count as 0.
pub fn dir_size(dir: &Path) -> u64 {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}
