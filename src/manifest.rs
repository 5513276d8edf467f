//! `requirements.txt` discovery and pinning.
//!
//! The manifest is parsed line by line into [`ManifestLine`]s so a package
//! is matched by name wherever it appears, not only on the first line.
//! Lines that are not requirements (comments, blanks, `-r` includes) are
//! written back untouched.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

const MANIFEST_SUFFIX: &str = "requirements.txt";

/// One line of a requirements manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestLine {
    Requirement {
        name: String,
        /// Version after `==`, if the line is an exact pin.
        version: Option<String>,
        raw: String,
    },
    Other(String),
}

impl ManifestLine {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with('-') {
            return ManifestLine::Other(raw.to_string());
        }

        let name_len = trimmed
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(trimmed.len());
        if name_len == 0 {
            return ManifestLine::Other(raw.to_string());
        }

        let version = trimmed.find("==").map(|pos| {
            trimmed[pos + 2..]
                .trim_start()
                .split(|c: char| c.is_whitespace() || matches!(c, ';' | '#' | ','))
                .next()
                .unwrap_or_default()
                .to_string()
        });

        ManifestLine::Requirement {
            name: trimmed[..name_len].to_string(),
            version,
            raw: raw.to_string(),
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            ManifestLine::Requirement { raw, .. } => raw,
            ManifestLine::Other(raw) => raw,
        }
    }

    pub fn is_package(&self, package: &str) -> bool {
        match self {
            ManifestLine::Requirement { name, .. } => {
                normalize_name(name) == normalize_name(package)
            }
            ManifestLine::Other(_) => false,
        }
    }
}

/// What [`apply_pin`] did to the checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PinOutcome {
    Replaced { path: PathBuf },
    Appended { path: PathBuf },
    NoManifest,
}

/// Finds the first file under `repo_root` whose name ends in
/// `requirements.txt`. Entries are visited in file-name order; `.git` is
/// skipped.
pub fn find_manifest(repo_root: &Path) -> Result<PathBuf> {
    let walker = WalkDir::new(repo_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.file_name() != ".git");

    for entry in walker {
        let entry = entry.map_err(|e| Error::Io {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| repo_root.to_path_buf()),
            source: e.into(),
        })?;

        if entry.file_type().is_file()
            && entry.file_name().to_string_lossy().ends_with(MANIFEST_SUFFIX)
        {
            debug!(path = %entry.path().display(), "found manifest");
            return Ok(entry.into_path());
        }
    }

    Err(Error::ManifestNotFound {
        root: repo_root.to_path_buf(),
    })
}

/// Rewrites `text` so that `package` is pinned to `version`.
///
/// Every requirement line naming `package` becomes `package==version`. If
/// there is none, the pin is appended after a newline separator. Line
/// endings follow the input, so a CRLF manifest stays CRLF. Returns the new
/// text and whether an existing line was replaced.
pub fn pin_text(text: &str, package: &str, version: &str) -> (String, bool) {
    let pin = format!("{}=={}", package, version);

    if text.is_empty() {
        return (pin, false);
    }

    let mut replaced = false;
    let lines: Vec<String> = text
        .split('\n')
        .map(ManifestLine::parse)
        .map(|line| {
            if line.is_package(package) {
                replaced = true;
                // Keep the CR of a CRLF terminator that split('\n') left behind.
                if line.raw().ends_with('\r') {
                    format!("{}\r", pin)
                } else {
                    pin.clone()
                }
            } else {
                line.raw().to_string()
            }
        })
        .collect();

    if replaced {
        (lines.join("\n"), true)
    } else {
        let newline = if text.contains("\r\n") { "\r\n" } else { "\n" };
        (format!("{}{}{}", text, newline, pin), false)
    }
}

/// Pins `package` to `version` in the checkout's requirements manifest.
///
/// A checkout without a manifest is not an error: the tree is left as is
/// and [`PinOutcome::NoManifest`] is returned.
///
/// # Errors
///
/// Returns [`Error::Io`] if the manifest cannot be read or written.
pub fn apply_pin(repo_root: &Path, package: &str, version: &str) -> Result<PinOutcome> {
    let path = match find_manifest(repo_root) {
        Ok(path) => path,
        Err(Error::ManifestNotFound { root }) => {
            warn!(root = %root.display(), "no requirements manifest, skipping pin");
            return Ok(PinOutcome::NoManifest);
        }
        Err(e) => return Err(e),
    };

    let text = fs::read_to_string(&path).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;

    let (patched, replaced) = pin_text(&text, package, version);

    fs::write(&path, patched).map_err(|source| Error::Io {
        path: path.clone(),
        source,
    })?;

    info!(
        path = %path.display(),
        package,
        version,
        replaced,
        "pinned requirement"
    );

    Ok(if replaced {
        PinOutcome::Replaced { path }
    } else {
        PinOutcome::Appended { path }
    })
}

/// PEP 503 name normalization: case-insensitive, runs of `-`, `_`, `.` equal.
fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.push(c.to_ascii_lowercase());
            in_separator = false;
        }
    }
    out
}
