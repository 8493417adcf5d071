use std::path::PathBuf;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::env;
use crate::error::KonfigError;
use crate::record::Record;
use crate::resolve;
use crate::types::{LoadOption, Settings};

/// Builder for configuring and running a load.
///
/// Each method records one [`LoadOption`]; options are applied in call order
/// when [`load()`](Self::load) runs. Calling [`files()`](Self::files) more than
/// once appends, calling [`env_prefix()`](Self::env_prefix) again replaces.
///
/// ```ignore
/// let mut config = AppConfig::default();
/// Konfig::new()
///     .env_prefix("APP")
///     .files(["config/base.toml", "config/local.yaml"])
///     .load(&mut config)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Konfig {
    options: Vec<LoadOption>,
}

impl Konfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix every derived environment key with `{prefix}_`.
    pub fn env_prefix(self, prefix: impl Into<String>) -> Self {
        self.option(LoadOption::env_prefix(prefix))
    }

    /// Append config files, lowest priority first.
    pub fn files<I, P>(self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.option(LoadOption::files(files))
    }

    /// Append a single config file.
    pub fn file(self, file: impl Into<PathBuf>) -> Self {
        self.option(LoadOption::files([file]))
    }

    /// Probe `{base}.json`, `{base}.toml`, `{base}.yaml`, `{base}.yml` and
    /// decode the first one found.
    pub(crate) fn base(self, base: impl Into<PathBuf>) -> Self {
        self.option(LoadOption::base(base))
    }

    /// Record a prebuilt option.
    pub fn option(mut self, option: LoadOption) -> Self {
        self.options.push(option);
        self
    }

    /// The settings this builder would load with.
    pub fn settings(&self) -> Settings {
        Settings::from_options(self.options.iter().cloned())
    }

    /// Populate `record` from config files, then from the process environment.
    ///
    /// Returns [`KonfigError::NoSources`] when no file was found and no
    /// environment variable matched. On any other error the record keeps
    /// whatever earlier sources already wrote into it.
    ///
    /// The environment pass allocates every `Option` nested record it walks,
    /// so even a `NoSources` return can leave those fields `Some(default)`.
    pub fn load<T>(self, record: &mut T) -> Result<(), KonfigError>
    where
        T: Record + Serialize + DeserializeOwned,
    {
        self.load_with_env(record, &env::process_env)
    }

    /// Like [`load`](Self::load) but resolving environment keys through
    /// `lookup` instead of the process environment.
    pub(crate) fn load_with_env<T, F>(self, record: &mut T, lookup: &F) -> Result<(), KonfigError>
    where
        T: Record + Serialize + DeserializeOwned,
        F: Fn(&str) -> Option<String>,
    {
        let settings = self.settings();
        resolve::resolve(record, &settings, lookup)
    }
}

/// Populate `record` from the sources described by `options`.
///
/// Files are decoded first (base name, then the explicit list), environment
/// variables are applied last and always win.
///
/// On [`KonfigError::NoSources`] nothing was read into the record, but
/// `Option` nested records (see [`Field::optional`](crate::Field::optional))
/// have still been allocated as `Some(default)` by the environment pass.
pub fn load<T>(record: &mut T, options: impl IntoIterator<Item = LoadOption>) -> Result<(), KonfigError>
where
    T: Record + Serialize + DeserializeOwned,
{
    options
        .into_iter()
        .fold(Konfig::new(), Konfig::option)
        .load(record)
}
