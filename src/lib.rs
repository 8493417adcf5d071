//! Populate a configuration struct from JSON, TOML or YAML files and
//! environment variables.
//!
//! ```ignore
//! let mut config = AppConfig::default();
//! konfig::load(
//!     &mut config,
//!     [
//!         LoadOption::files(["config/base.toml", "config/local.yaml"]),
//!         LoadOption::env_prefix("APP"),
//!     ],
//! )?;
//! ```
//!
//! The record you pass in is the schema. Whatever it holds before the call
//! acts as the defaults; every source only overwrites the keys it mentions.
//!
//! # Layer precedence
//!
//! ```text
//! Values already in the record
//!        ↑ overridden by
//! Base-name file        first of {base}.json, .toml, .yaml, .yml
//!        ↑ overridden by
//! Explicit files        in list order, later files win
//!        ↑ overridden by
//! Environment vars      PREFIX_FIELD_NAME
//! ```
//!
//! Missing files are skipped. If no file was decoded and no environment
//! variable matched, loading fails with [`KonfigError::NoSources`] so callers
//! can tell "nothing configured" apart from "configured with defaults".
//! Optional nested records are allocated by the environment pass even then.
//!
//! Unexported fields, [`Field::hidden`] state and fields serde skips are never
//! reset by a file load.
//!
//! # File formats
//!
//! The format comes from the extension (`.json`, `.toml`, `.yaml`, `.yml`,
//! case-insensitive). Files with any other extension are tried as TOML, then
//! JSON, then YAML. Field names in files follow the record's serde names.
//!
//! # Environment variables
//!
//! Records describe their fields through the [`Record`] trait, since Rust has
//! no runtime reflection. Each field's key is derived from its tags (`env`,
//! then `alias`, `json`, `yaml`, `toml`, then the declared name) and passed
//! through [`to_env_key`]:
//!
//! | Field | Prefix | Env var |
//! |-------|--------|---------|
//! | `server_url` | | `SERVER_URL` |
//! | `maxConns` | `APP` | `APP_MAX_CONNS` |
//! | `database.port` | `APP` | `APP_DATABASE_PORT` |
//!
//! Nested records extend the prefix with their own key. An `env` tag of `"-"`
//! ([`SKIP`]) keeps a field out of the environment entirely. Values are parsed
//! according to the field's type via [`EnvValue`].
//!
//! ```ignore
//! impl Record for AppConfig {
//!     fn fields(&mut self) -> Vec<Field<'_>> {
//!         vec![
//!             Field::value(Tags::new("server"), &mut self.server),
//!             Field::value(Tags::new("secret").env(SKIP), &mut self.secret),
//!             Field::record(Tags::new("database"), &mut self.database),
//!             Field::optional(Tags::new("cache"), &mut self.cache),
//!         ]
//!     }
//! }
//! ```
//!
//! # Error handling
//!
//! All fallible operations return [`KonfigError`]. The first error aborts the
//! load; sources applied before it stay applied.

pub mod error;
pub mod record;
pub mod types;

mod builder;
mod env;
mod file;
mod merge;
mod ops;
mod resolve;

#[cfg(test)]
mod fixtures;

pub use builder::{Konfig, load};
pub use env::to_env_key;
pub use error::KonfigError;
pub use file::{BASE_EXTENSIONS, base_candidates, get_config_files_with_ext};
pub use ops::{
    get_conf, load_config_file_no_ext, load_config_files, load_json, load_toml, load_yaml,
};
pub use record::{Carry, CoerceError, EnvValue, Field, OptionalRecord, Record, SKIP, Slot, Tags};
pub use types::{Format, LoadOption, Settings};
