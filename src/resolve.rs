//! Core resolution pipeline: layer config files and environment variables onto
//! a caller-owned record.
//!
//! Steps:
//!
//! 1. Snapshot the record as a JSON tree (rejects non-struct targets before any I/O)
//! 2. Base name, if set: decode the first of `.json`, `.toml`, `.yaml`, `.yml` found
//! 3. Explicit files, if set: decode every file found, in order
//! 4. Environment variables on top (always runs, so env wins ties)
//! 5. Report `NoSources` if neither files nor env contributed anything
//!
//! Every file is applied by deep-merging its tree over the snapshot and
//! deserializing the result back into the record. Keys a file does not mention
//! keep the values earlier layers gave them. Fields the tree cannot hold at all
//! (unexported, hidden, skipped by serde) are carried over from the record as
//! it was before the file.

use std::path::Path;

use serde::Serialize;
use serde::de::{Deserialize, DeserializeOwned};
use serde_json::{Map, Value};
use tracing::debug;

use crate::env;
use crate::error::KonfigError;
use crate::file;
use crate::merge::deep_merge;
use crate::record::{Record, Slot};
use crate::types::{Format, Settings};

/// A record being populated from files, plus the merged tree it was built from.
pub(crate) struct Target<'a, T> {
    record: &'a mut T,
    tree: Value,
}

impl<'a, T> Target<'a, T>
where
    T: Record + Serialize + DeserializeOwned,
{
    pub fn new(record: &'a mut T) -> Result<Self, KonfigError> {
        let tree = serde_json::to_value(&*record).map_err(KonfigError::Serialize)?;
        if !tree.is_object() {
            return Err(KonfigError::NotARecord);
        }
        Ok(Self { record, tree })
    }

    /// Decode `data` with the format implied by `path`'s extension.
    ///
    /// Without a recognized extension, TOML, JSON and YAML are tried in that
    /// order and the first one that both parses and fits the record wins.
    pub fn decode(&mut self, path: &Path, data: &[u8]) -> Result<(), KonfigError> {
        if let Some(format) = Format::from_path(path) {
            return self.decode_as(path, data, format);
        }

        for format in Format::FALLBACK_ORDER {
            if let Ok(document) = format.parse(data)
                && self.overlay(document).is_ok()
            {
                debug!(path = %path.display(), format = format.name(), "decoded config file by fallback");
                return Ok(());
            }
        }

        Err(KonfigError::Decode {
            path: path.to_path_buf(),
            format: "any supported format",
            reason: "failed to decode configuration data".into(),
        })
    }

    pub fn decode_as(&mut self, path: &Path, data: &[u8], format: Format) -> Result<(), KonfigError> {
        let decode_error = |reason: String| KonfigError::Decode {
            path: path.to_path_buf(),
            format: format.name(),
            reason,
        };

        let document = format.parse(data).map_err(decode_error)?;
        self.overlay(document)
            .map_err(|e| decode_error(e.to_string()))?;

        debug!(path = %path.display(), format = format.name(), "decoded config file");
        Ok(())
    }

    /// Merge `document` over the current tree and store the result. The record
    /// is only replaced if the merged tree deserializes.
    fn overlay(&mut self, document: Value) -> Result<(), serde_json::Error> {
        let merged = deep_merge(self.tree.clone(), document);
        let mut fresh = T::deserialize(&merged)?;
        carry_uncovered(&mut fresh, &mut *self.record, merged.as_object());
        *self.record = fresh;
        self.tree = merged;
        Ok(())
    }

    pub fn into_record(self) -> &'a mut T {
        self.record
    }
}

/// Move every field `tree` does not describe from `previous` into `fresh`.
///
/// `fresh` was just deserialized from the merged tree, so whatever serde could
/// not see came back as its default.
fn carry_uncovered(
    fresh: &mut dyn Record,
    previous: &mut dyn Record,
    tree: Option<&Map<String, Value>>,
) {
    for (field, old) in fresh.fields().into_iter().zip(previous.fields()) {
        let covered = if field.tags.is_exported() {
            tree.and_then(|tree| field.tags.file_keys().find_map(|key| tree.get(key)))
        } else {
            None
        };

        match (field.slot, old.slot) {
            (Slot::Record(nested), Slot::Record(old)) => {
                carry_uncovered(nested, old, covered.and_then(Value::as_object));
            }
            (Slot::Optional(nested), Slot::Optional(old)) => match covered {
                None => {
                    nested.carry_from(old.as_any_mut());
                }
                Some(subtree) => {
                    if let (Some(nested), Some(old)) = (nested.present(), old.present()) {
                        carry_uncovered(nested, old, subtree.as_object());
                    }
                }
            },
            (Slot::Value(value), Slot::Value(old)) if covered.is_none() => {
                value.carry_from(old.as_any_mut());
            }
            (Slot::Hidden(value), Slot::Hidden(old)) => {
                value.carry_from(old.as_any_mut());
            }
            _ => {}
        }
    }
}

/// Populate `record` from the sources described by `settings`.
///
/// `lookup` resolves environment keys; pass [`env::process_env`] for the real
/// process environment.
pub(crate) fn resolve<T, F>(record: &mut T, settings: &Settings, lookup: &F) -> Result<(), KonfigError>
where
    T: Record + Serialize + DeserializeOwned,
    F: Fn(&str) -> Option<String>,
{
    // 1: Validate before touching the filesystem
    let mut target = Target::new(record)?;
    let mut loaded = false;

    // 2: Base name, first match only
    if let Some(base) = settings.base() {
        loaded |= file::load_first_available(&mut target, &file::base_candidates(base))?;
    }

    // 3: Explicit files, each overriding the last
    if !settings.files().is_empty() {
        loaded |= file::load_sequential(&mut target, settings.files())?;
    }

    // 4: Env vars on top
    let record = target.into_record();
    let applied = env::bind(record, settings.env_prefix(), lookup)?;

    // 5: Something has to have contributed
    if !loaded && applied == 0 {
        return Err(KonfigError::NoSources);
    }

    debug!(files = loaded, env_applied = applied, "configuration loaded");
    Ok(())
}
