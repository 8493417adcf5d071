use std::path::{Path, PathBuf};

use serde_json::Value;

/// A config file serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
    Yaml,
}

impl Format {
    /// Order in which formats are attempted for a file without a known extension.
    pub const FALLBACK_ORDER: [Format; 3] = [Format::Toml, Format::Json, Format::Yaml];

    /// Pick a format from the file extension, case-insensitively.
    /// `None` for a missing or unrecognized extension.
    pub fn from_path(path: &Path) -> Option<Format> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "json" => Some(Format::Json),
            "toml" => Some(Format::Toml),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Json => "JSON",
            Format::Toml => "TOML",
            Format::Yaml => "YAML",
        }
    }

    /// Parse raw file bytes into a JSON value tree.
    pub(crate) fn parse(self, data: &[u8]) -> Result<Value, String> {
        match self {
            Format::Json => serde_json::from_slice(data).map_err(|e| e.to_string()),
            Format::Toml => {
                let text = std::str::from_utf8(data).map_err(|e| e.to_string())?;
                let table: toml::Table = toml::from_str(text).map_err(|e| e.to_string())?;
                serde_json::to_value(table).map_err(|e| e.to_string())
            }
            Format::Yaml => {
                let doc: serde_yaml::Value =
                    serde_yaml::from_slice(data).map_err(|e| e.to_string())?;
                serde_json::to_value(doc).map_err(|e| e.to_string())
            }
        }
    }
}

/// Immutable per-call settings, built from [`LoadOption`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    env_prefix: String,
    files: Vec<PathBuf>,
    base: Option<PathBuf>,
}

impl Settings {
    /// Apply options in order. Later prefixes replace earlier ones; file lists
    /// accumulate.
    pub fn from_options(options: impl IntoIterator<Item = LoadOption>) -> Self {
        options
            .into_iter()
            .fold(Settings::default(), |settings, option| option.apply(settings))
    }

    pub fn env_prefix(&self) -> &str {
        &self.env_prefix
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn base(&self) -> Option<&Path> {
        self.base.as_deref()
    }
}

/// One step in building [`Settings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOption(OptionKind);

#[derive(Debug, Clone, PartialEq, Eq)]
enum OptionKind {
    EnvPrefix(String),
    Files(Vec<PathBuf>),
    Base(PathBuf),
}

impl LoadOption {
    /// Prefix prepended (with `_`) to every derived environment key.
    /// Used verbatim, not transliterated.
    pub fn env_prefix(prefix: impl Into<String>) -> Self {
        LoadOption(OptionKind::EnvPrefix(prefix.into()))
    }

    /// Config files to decode in order; later files override earlier ones.
    /// Repeating this option appends to the list.
    pub fn files<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        LoadOption(OptionKind::Files(files.into_iter().map(Into::into).collect()))
    }

    /// Base filename (no extension) probed as `.json`, `.toml`, `.yaml`, `.yml`.
    pub(crate) fn base(base: impl Into<PathBuf>) -> Self {
        LoadOption(OptionKind::Base(base.into()))
    }

    pub(crate) fn apply(self, mut settings: Settings) -> Settings {
        match self.0 {
            OptionKind::EnvPrefix(prefix) => settings.env_prefix = prefix,
            OptionKind::Files(files) => settings.files.extend(files),
            OptionKind::Base(base) => {
                settings.base = (!base.as_os_str().is_empty()).then_some(base);
            }
        }
        settings
    }
}
