//! Environment binding: derive a key for every record field and apply matching
//! environment variables on top of whatever the config files produced.
//!
//! # Key derivation
//!
//! For each field the first usable hint wins: the explicit `env` tag, the
//! `alias` tag, the structural tags (`json`, `yaml`, `toml`, in that order),
//! and finally the declared field name. An `env` tag of `-` disables the field
//! outright; a `-` in any other tag just falls through to the next hint.
//!
//! The chosen name is transliterated by [`to_env_key`] and joined to the
//! current prefix with `_`. Nested records use their own full key as the
//! prefix for their children, so `database.port` under prefix `APP` becomes
//! `APP_DATABASE_PORT`.
//!
//! # Lookup
//!
//! The binder takes a lookup function instead of reading the process
//! environment directly, so tests can pass synthetic data instead of
//! `std::env::var`.

use tracing::{debug, trace};

use crate::error::KonfigError;
use crate::record::{CoerceError, Record, SKIP, Slot, Tags, tag_name};

/// Transliterate a field name into an environment variable key.
///
/// Letters are uppercased. `_`, `-`, `.` and whitespace act as separators;
/// runs of them collapse into a single `_` and leading or trailing ones are
/// dropped. A separator is also inserted where a lowercase letter is followed
/// by an uppercase one, and wherever ASCII digits start or stop:
///
/// ```
/// use konfig::to_env_key;
///
/// assert_eq!(to_env_key("HTTP2Port"), "HTTP_2_PORT");
/// assert_eq!(to_env_key("DatabaseURL"), "DATABASE_URL");
/// assert_eq!(to_env_key("  spaced name  "), "SPACED_NAME");
/// ```
pub fn to_env_key(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev: Option<char> = None;

    for c in name.trim().chars() {
        if is_separator(c) {
            push_separator(&mut out);
            prev = None;
            continue;
        }
        if let Some(p) = prev
            && is_boundary(p, c)
        {
            push_separator(&mut out);
        }
        out.extend(c.to_uppercase());
        prev = Some(c);
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}

fn is_separator(c: char) -> bool {
    matches!(c, '_' | '-' | '.') || c.is_whitespace()
}

fn is_boundary(prev: char, current: char) -> bool {
    (prev.is_lowercase() && current.is_uppercase())
        || (prev.is_ascii_digit() != current.is_ascii_digit())
}

// Never leading, never doubled.
fn push_separator(out: &mut String) {
    if !out.is_empty() && !out.ends_with('_') {
        out.push('_');
    }
}

/// First structural hint that is non-empty and not the skip sentinel.
fn first_usable_hint(tags: &Tags) -> Option<&'static str> {
    [tags.alias, tags.json, tags.yaml, tags.toml]
        .into_iter()
        .flatten()
        .map(tag_name)
        .find(|name| !name.is_empty() && *name != SKIP)
}

/// Derive the full environment key for a field, or `None` if the field is
/// skipped (explicit `-` tag, or a name that transliterates to nothing).
pub(crate) fn env_key(tags: &Tags, prefix: &str) -> Option<String> {
    let name = match tags.env {
        Some(SKIP) => return None,
        Some(explicit) if !tag_name(explicit).is_empty() => tag_name(explicit),
        _ => first_usable_hint(tags).unwrap_or(tags.name),
    };

    let key = to_env_key(name);
    if key.is_empty() {
        return None;
    }

    if prefix.is_empty() {
        Some(key)
    } else {
        Some(format!("{prefix}_{key}"))
    }
}

/// Read a variable from the process environment.
///
/// Variables that are set but not valid unicode count as absent.
pub(crate) fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Walk `record` and assign every field whose key is present in `lookup`.
///
/// Returns the number of fields that received a value. The first coercion
/// failure aborts the walk; fields assigned before it keep their new values.
pub(crate) fn bind<F>(record: &mut dyn Record, prefix: &str, lookup: &F) -> Result<usize, KonfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = 0;

    for field in record.fields() {
        if !field.tags.is_exported() {
            continue;
        }
        let Some(key) = env_key(&field.tags, prefix) else {
            trace!(field = field.tags.name(), "field skipped for environment binding");
            continue;
        };

        match field.slot {
            Slot::Record(nested) => applied += bind(nested, &key, lookup)?,
            Slot::Optional(nested) => applied += bind(nested.materialize(), &key, lookup)?,
            Slot::Hidden(_) => {}
            Slot::Value(value) => {
                let Some(raw) = lookup(&key) else {
                    continue;
                };
                value.assign(&raw).map_err(|e| match e {
                    CoerceError::Invalid(reason) => KonfigError::InvalidEnv {
                        key: key.clone(),
                        reason,
                    },
                    CoerceError::Unsupported(kind) => KonfigError::UnsupportedKind {
                        key: key.clone(),
                        kind,
                    },
                })?;
                debug!(key = %key, "applied environment override");
                applied += 1;
            }
        }
    }

    Ok(applied)
}
