//! In-memory index of what a vendor offers: version → OS → arch → archive name.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::error::DriverError;

type ArchMap = BTreeMap<String, String>;
type OsMap = BTreeMap<String, ArchMap>;

/// Versions published by one vendor, built fresh from a single listing fetch.
#[derive(Debug, Default, Clone)]
pub struct VersionIndex {
    versions: BTreeMap<String, OsMap>,
}

impl VersionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an archive for `(version, os, arch)`. A later record for the same
    /// key path replaces the earlier one.
    pub fn record(&mut self, version: &str, os: &str, arch: &str, filename: &str) {
        self.versions
            .entry(version.to_string())
            .or_default()
            .entry(os.to_string())
            .or_default()
            .insert(arch.to_string(), filename.to_string());
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn has_version(&self, version: &str) -> bool {
        self.versions.contains_key(version)
    }

    pub fn has_os(&self, version: &str, os: &str) -> bool {
        self.versions
            .get(version)
            .is_some_and(|oses| oses.contains_key(os))
    }

    pub fn filename(&self, version: &str, os: &str, arch: &str) -> Option<&str> {
        self.versions
            .get(version)?
            .get(os)?
            .get(arch)
            .map(String::as_str)
    }

    /// Highest version under numeric-segment ordering ("2.10" > "2.9").
    pub fn newest_version(&self, driver_type: &str) -> Result<String, DriverError> {
        self.versions
            .keys()
            .max_by(|a, b| compare_versions(a, b))
            .cloned()
            .ok_or_else(|| DriverError::EmptyIndex {
                driver_type: driver_type.to_string(),
            })
    }

    /// Versions in ascending numeric-segment order.
    pub fn sorted_versions(&self) -> Vec<&str> {
        let mut versions: Vec<&str> = self.versions.keys().map(String::as_str).collect();
        versions.sort_by(|a, b| compare_versions(a, b));
        versions
    }

    /// `(version, os, [arches])` rows, sorted by version.
    pub fn rows(&self) -> Vec<(String, String, Vec<String>)> {
        self.sorted_versions()
            .into_iter()
            .flat_map(|version| {
                self.versions[version].iter().map(move |(os, arches)| {
                    (
                        version.to_string(),
                        os.clone(),
                        arches.keys().cloned().collect(),
                    )
                })
            })
            .collect()
    }

    /// The listed version closest to `target`, measured by the longest run of
    /// characters the two strings share, restricted to versions published for
    /// `os`. Among equally close versions the newest wins.
    pub fn closest_version(&self, target: &str, os: &str) -> Option<String> {
        let mut best: Option<(usize, &str)> = None;
        for version in self.sorted_versions().into_iter().rev() {
            if !self.has_os(version, os) {
                continue;
            }
            let score = longest_common_substring(version, target);
            if best.is_none_or(|(best_score, _)| score > best_score) {
                best = Some((score, version));
            }
        }
        best.map(|(_, version)| version.to_string())
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Number(u64),
    Text(&'a str),
}

fn segments(version: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let bytes = version.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        let c = bytes[start];
        if !c.is_ascii_alphanumeric() {
            start += 1;
            continue;
        }
        let numeric = c.is_ascii_digit();
        let mut end = start;
        while end < bytes.len()
            && bytes[end].is_ascii_alphanumeric()
            && bytes[end].is_ascii_digit() == numeric
        {
            end += 1;
        }
        let run = &version[start..end];
        out.push(match run.parse::<u64>() {
            Ok(n) if numeric => Segment::Number(n),
            _ => Segment::Text(run),
        });
        start = end;
    }
    out
}

/// Orders loosely formatted versions segment by segment.
///
/// Digit runs compare numerically and letter runs lexically; separators are
/// ignored. A number sorts before text in the same position, and a version that
/// is a strict prefix of another is older ("2.0" < "2.0.1").
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let (left, right) = (segments(a), segments(b));
    for (l, r) in left.iter().zip(right.iter()) {
        let ord = match (l, r) {
            (Segment::Number(x), Segment::Number(y)) => x.cmp(y),
            (Segment::Text(x), Segment::Text(y)) => x.cmp(y),
            (Segment::Number(_), Segment::Text(_)) => Ordering::Less,
            (Segment::Text(_), Segment::Number(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    left.len().cmp(&right.len())
}

fn longest_common_substring(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut best = 0;
    let mut previous = vec![0usize; b.len() + 1];
    for &x in a {
        let mut current = vec![0usize; b.len() + 1];
        for (j, &y) in b.iter().enumerate() {
            if x == y {
                current[j + 1] = previous[j] + 1;
                best = best.max(current[j + 1]);
            }
        }
        previous = current;
    }
    best
}
