//! One-call shortcuts over [`Konfig`] and the single-file decoders.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::builder::Konfig;
use crate::error::KonfigError;
use crate::file;
use crate::record::Record;
use crate::types::Format;

/// Load from the first of `{base}.json`, `{base}.toml`, `{base}.yaml`,
/// `{base}.yml` that exists, then from the environment.
///
/// Kept for callers of the older entry point. Nothing is cached between calls.
pub fn get_conf<T>(base: impl Into<PathBuf>, record: &mut T) -> Result<(), KonfigError>
where
    T: Record + Serialize + DeserializeOwned,
{
    load_config_file_no_ext(record, base)
}

/// Probe `base` with each supported extension and decode the first match,
/// then apply environment variables.
pub fn load_config_file_no_ext<T>(record: &mut T, base: impl Into<PathBuf>) -> Result<(), KonfigError>
where
    T: Record + Serialize + DeserializeOwned,
{
    Konfig::new().base(base).load(record)
}

/// Decode every existing file in `files`, later ones winning, then apply
/// environment variables.
pub fn load_config_files<T, I, P>(record: &mut T, files: I) -> Result<(), KonfigError>
where
    T: Record + Serialize + DeserializeOwned,
    I: IntoIterator<Item = P>,
    P: Into<PathBuf>,
{
    Konfig::new().files(files).load(record)
}

/// Decode `filename` as JSON into `record`. An empty filename does nothing.
pub fn load_json<T>(filename: impl AsRef<Path>, record: &mut T) -> Result<(), KonfigError>
where
    T: Record + Serialize + DeserializeOwned,
{
    file::load_single(filename.as_ref(), record, Format::Json)
}

/// Decode `filename` as TOML into `record`. An empty filename does nothing.
pub fn load_toml<T>(filename: impl AsRef<Path>, record: &mut T) -> Result<(), KonfigError>
where
    T: Record + Serialize + DeserializeOwned,
{
    file::load_single(filename.as_ref(), record, Format::Toml)
}

/// Decode `filename` as YAML into `record`. An empty filename does nothing.
pub fn load_yaml<T>(filename: impl AsRef<Path>, record: &mut T) -> Result<(), KonfigError>
where
    T: Record + Serialize + DeserializeOwned,
{
    file::load_single(filename.as_ref(), record, Format::Yaml)
}
