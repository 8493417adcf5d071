//! File discovery and loading for config files.
//!
//! Two modes decide which files are decoded:
//!
//! - **Base name** ([`load_first_available`]): the candidates `{base}.json`,
//!   `{base}.toml`, `{base}.yaml` and `{base}.yml` are alternatives, probed in
//!   that order. Only the first one that exists is decoded.
//! - **Explicit list** ([`load_sequential`]): every file that exists is
//!   decoded, in list order, each one layered over the previous result.
//!
//! Missing files are silently skipped in both modes, as are blank entries.
//! Only actual I/O errors (permissions, a directory where a file should be)
//! are propagated, and they abort the whole load.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::KonfigError;
use crate::record::Record;
use crate::resolve::Target;
use crate::types::Format;

/// Extensions probed for a base name, highest precedence first.
pub const BASE_EXTENSIONS: [&str; 4] = ["json", "toml", "yaml", "yml"];

/// Expand a base name into its extension-qualified candidates.
///
/// The extension is appended, never substituted: `config/app.v2` probes
/// `config/app.v2.json`, not `config/app.json`.
pub fn base_candidates(base: &Path) -> Vec<PathBuf> {
    BASE_EXTENSIONS
        .iter()
        .map(|ext| {
            let mut candidate = OsString::from(base.as_os_str());
            candidate.push(".");
            candidate.push(ext);
            PathBuf::from(candidate)
        })
        .collect()
}

/// Trim surrounding whitespace from a path entry. `None` for blank entries.
fn clean(path: &Path) -> Option<PathBuf> {
    match path.to_str() {
        Some(s) if s.trim().is_empty() => None,
        Some(s) => Some(PathBuf::from(s.trim())),
        None => Some(path.to_path_buf()),
    }
}

/// Read a file, mapping "not found" to `None`.
fn read_if_exists(path: &Path) -> Result<Option<Vec<u8>>, KonfigError> {
    match std::fs::read(path) {
        Ok(data) => Ok(Some(data)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            trace!(path = %path.display(), "config file not found, skipping");
            Ok(None)
        }
        Err(e) => Err(KonfigError::Read {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Decode only the first candidate that exists. Returns whether one was found.
pub(crate) fn load_first_available<T>(
    target: &mut Target<'_, T>,
    candidates: &[PathBuf],
) -> Result<bool, KonfigError>
where
    T: Record + Serialize + DeserializeOwned,
{
    for candidate in candidates {
        let Some(path) = clean(candidate) else {
            continue;
        };
        let Some(data) = read_if_exists(&path)? else {
            continue;
        };
        target.decode(&path, &data)?;
        return Ok(true);
    }
    Ok(false)
}

/// Decode every file that exists, in order. Returns whether any was found.
///
/// An error on file N leaves files before it applied and files after it unread.
pub(crate) fn load_sequential<T>(
    target: &mut Target<'_, T>,
    files: &[PathBuf],
) -> Result<bool, KonfigError>
where
    T: Record + Serialize + DeserializeOwned,
{
    let mut loaded = false;
    for file in files {
        let Some(path) = clean(file) else {
            continue;
        };
        let Some(data) = read_if_exists(&path)? else {
            continue;
        };
        target.decode(&path, &data)?;
        loaded = true;
    }
    Ok(loaded)
}

/// Decode exactly one file with a fixed format. An empty filename is a no-op;
/// a missing file is an error.
pub(crate) fn load_single<T>(path: &Path, record: &mut T, format: Format) -> Result<(), KonfigError>
where
    T: Record + Serialize + DeserializeOwned,
{
    if path.as_os_str().is_empty() {
        return Ok(());
    }

    let mut target = Target::new(record)?;
    let data = std::fs::read(path).map_err(|e| KonfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    target.decode_as(path, &data, format)
}

/// Filter `files` down to the entries that exist as regular files, preserving
/// order. Kept entries are returned exactly as given.
///
/// Empty entries, missing paths and non-regular files (directories) are
/// dropped. Returns [`KonfigError::NoSources`] if nothing is left, and
/// [`KonfigError::Stat`] for any metadata error other than "not found".
pub fn get_config_files_with_ext<I, P>(files: I) -> Result<Vec<PathBuf>, KonfigError>
where
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    let mut matched = Vec::new();
    for file in files {
        let path: PathBuf = file.into();
        if path.as_os_str().is_empty() {
            continue;
        }
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => matched.push(path),
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(KonfigError::Stat { path, source: e });
            }
        }
    }

    if matched.is_empty() {
        return Err(KonfigError::NoSources);
    }
    Ok(matched)
}
