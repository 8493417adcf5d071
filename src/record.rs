//! Field descriptors: how a config struct exposes itself to the environment binder.
//!
//! A [`Record`] hands out a table of [`Field`]s in declaration order. Each field
//! carries its naming hints ([`Tags`]) and a typed mutable handle ([`Slot`]) into
//! the struct, so the binder can walk arbitrarily nested shapes without any
//! runtime introspection:
//!
//! ```ignore
//! impl Record for AppConfig {
//!     fn fields(&mut self) -> Vec<Field<'_>> {
//!         vec![
//!             Field::value(Tags::new("host"), &mut self.host),
//!             Field::value(Tags::new("port").env("LISTEN_PORT"), &mut self.port),
//!             Field::record(Tags::new("database"), &mut self.database),
//!             Field::optional(Tags::new("tls"), &mut self.tls),
//!         ]
//!     }
//! }
//! ```
//!
//! Scalars coerce from the raw environment string through [`EnvValue`]. It is
//! implemented for strings, `bool`, every integer width, `f32`/`f64`, `char`,
//! `PathBuf` and `Option` of any of those. Sequences and maps implement it too,
//! but always fail with an unsupported-kind error: element-level overrides are
//! not a thing.
//!
//! Loading a file rebuilds the record through serde. Fields the file layer
//! cannot describe (unexported fields, [`Field::hidden`] state, anything serde
//! skips) are moved back from the previous value afterwards through [`Carry`].

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::path::PathBuf;

/// Tag value that disables a field for environment binding.
pub const SKIP: &str = "-";

/// A config struct whose fields can be populated from environment variables.
pub trait Record {
    /// Describe every field, in declaration order.
    fn fields(&mut self) -> Vec<Field<'_>>;
}

/// One entry of a record's descriptor table.
pub struct Field<'a> {
    pub tags: Tags,
    pub slot: Slot<'a>,
}

impl<'a> Field<'a> {
    /// A scalar (or `Option<scalar>`) field.
    pub fn value(tags: Tags, value: &'a mut dyn EnvValue) -> Self {
        Self {
            tags,
            slot: Slot::Value(value),
        }
    }

    /// A nested record. Its fields are bound under this field's key.
    pub fn record(tags: Tags, record: &'a mut dyn Record) -> Self {
        Self {
            tags,
            slot: Slot::Record(record),
        }
    }

    /// An `Option<record>`, allocated when the binder reaches it.
    pub fn optional(tags: Tags, record: &'a mut dyn OptionalRecord) -> Self {
        Self {
            tags,
            slot: Slot::Optional(record),
        }
    }

    /// Private state of any type. Never bound from the environment, and kept
    /// as-is across file loads.
    pub fn hidden(name: &'static str, value: &'a mut dyn Carry) -> Self {
        Self {
            tags: Tags::new(name).unexported(),
            slot: Slot::Hidden(value),
        }
    }
}

/// Typed mutable handle into a record field.
pub enum Slot<'a> {
    Value(&'a mut dyn EnvValue),
    Record(&'a mut dyn Record),
    Optional(&'a mut dyn OptionalRecord),
    Hidden(&'a mut dyn Carry),
}

/// A field value that can be moved between two instances of the same record.
///
/// Implemented for every `'static` type.
pub trait Carry: Any {
    /// Swap with `previous` if it holds the same type. Returns whether it did.
    fn carry_from(&mut self, previous: &mut dyn Any) -> bool;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> Carry for T {
    fn carry_from(&mut self, previous: &mut dyn Any) -> bool {
        match previous.downcast_mut::<T>() {
            Some(previous) => {
                std::mem::swap(self, previous);
                true
            }
            None => false,
        }
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// An optional nested record that can be materialized on demand.
pub trait OptionalRecord: Carry {
    /// Allocate the record if absent and return it.
    fn materialize(&mut self) -> &mut dyn Record;

    /// The record, if present. Never allocates.
    fn present(&mut self) -> Option<&mut dyn Record>;
}

impl<T: Record + Default + 'static> OptionalRecord for Option<T> {
    fn materialize(&mut self) -> &mut dyn Record {
        self.get_or_insert_with(T::default)
    }

    fn present(&mut self) -> Option<&mut dyn Record> {
        self.as_mut().map(|record| record as &mut dyn Record)
    }
}

/// Naming hints for one field.
///
/// The binder derives the environment key from the first usable hint in this
/// order: `env`, `alias`, `json`, `yaml`, `toml`, then the declared name. Hint
/// values follow the struct-tag convention of `name,options`; only the part
/// before the first comma is used.
///
/// Config files address the field by its `json`, `yaml` or `toml` hint, else
/// by the declared name. That name has to match the serde name of the field,
/// otherwise file values for it are discarded when the record is rebuilt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tags {
    pub(crate) name: &'static str,
    pub(crate) env: Option<&'static str>,
    pub(crate) alias: Option<&'static str>,
    pub(crate) json: Option<&'static str>,
    pub(crate) yaml: Option<&'static str>,
    pub(crate) toml: Option<&'static str>,
    pub(crate) exported: bool,
}

impl Tags {
    /// Hints for a field declared as `name`.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            env: None,
            alias: None,
            json: None,
            yaml: None,
            toml: None,
            exported: true,
        }
    }

    /// Explicit environment key. [`SKIP`] disables the field entirely.
    pub fn env(mut self, key: &'static str) -> Self {
        self.env = Some(key);
        self
    }

    /// Library-specific alias, consulted after `env`.
    pub fn alias(mut self, name: &'static str) -> Self {
        self.alias = Some(name);
        self
    }

    pub fn json(mut self, name: &'static str) -> Self {
        self.json = Some(name);
        self
    }

    pub fn yaml(mut self, name: &'static str) -> Self {
        self.yaml = Some(name);
        self
    }

    pub fn toml(mut self, name: &'static str) -> Self {
        self.toml = Some(name);
        self
    }

    /// Mark the field as private. The binder never reads or writes it.
    pub fn unexported(mut self) -> Self {
        self.exported = false;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn is_exported(&self) -> bool {
        self.exported
    }

    /// Names a config file may use for this field, most specific first.
    pub(crate) fn file_keys(&self) -> impl Iterator<Item = &'static str> {
        [self.json, self.yaml, self.toml]
            .into_iter()
            .flatten()
            .map(tag_name)
            .filter(|name| !name.is_empty() && *name != SKIP)
            .chain(std::iter::once(self.name))
    }
}

/// Strip struct-tag options: `"name,omitempty"` → `"name"`.
pub(crate) fn tag_name(raw: &str) -> &str {
    raw.split(',').next().unwrap_or_default()
}

/// Why a raw environment string could not be stored in a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoerceError {
    /// The value does not parse as the target type, or overflows it.
    Invalid(String),
    /// The target type has no string coercion at all.
    Unsupported(&'static str),
}

/// A field type that can be assigned from a raw environment string.
pub trait EnvValue: Carry {
    fn assign(&mut self, raw: &str) -> Result<(), CoerceError>;
}

impl EnvValue for String {
    fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
        raw.clone_into(self);
        Ok(())
    }
}

impl EnvValue for PathBuf {
    fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
        *self = PathBuf::from(raw);
        Ok(())
    }
}

impl EnvValue for char {
    fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                *self = c;
                Ok(())
            }
            _ => Err(CoerceError::Invalid(format!(
                "expected a single character, got {raw:?}"
            ))),
        }
    }
}

impl EnvValue for bool {
    fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
        *self = match raw {
            "1" | "t" | "T" | "TRUE" | "true" | "True" => true,
            "0" | "f" | "F" | "FALSE" | "false" | "False" => false,
            _ => {
                return Err(CoerceError::Invalid(format!(
                    "invalid boolean {raw:?}, expected true or false"
                )));
            }
        };
        Ok(())
    }
}

// `str::parse` for integers is base-10, range-checked against the target
// width, and rejects a leading `-` for unsigned types.
macro_rules! integer_env_value {
    ($($ty:ty),*) => {
        $(
            impl EnvValue for $ty {
                fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
                    *self = raw.parse::<$ty>().map_err(|e| {
                        CoerceError::Invalid(format!("{raw:?} as {}: {e}", stringify!($ty)))
                    })?;
                    Ok(())
                }
            }
        )*
    };
}

integer_env_value!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! float_env_value {
    ($($ty:ty),*) => {
        $(
            impl EnvValue for $ty {
                fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
                    let value = raw.parse::<$ty>().map_err(|e| {
                        CoerceError::Invalid(format!("{raw:?} as {}: {e}", stringify!($ty)))
                    })?;
                    if value.is_infinite() && !is_infinity_literal(raw) {
                        return Err(CoerceError::Invalid(format!(
                            "{raw:?} is out of range for {}",
                            stringify!($ty)
                        )));
                    }
                    *self = value;
                    Ok(())
                }
            }
        )*
    };
}

float_env_value!(f32, f64);

/// `str::parse` saturates overflowing floats to infinity; only an explicit
/// `inf`/`infinity` spelling may produce one.
fn is_infinity_literal(raw: &str) -> bool {
    let unsigned = raw.trim_start_matches(['+', '-']);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

impl<T: EnvValue + Default + 'static> EnvValue for Option<T> {
    fn assign(&mut self, raw: &str) -> Result<(), CoerceError> {
        self.get_or_insert_with(T::default).assign(raw)
    }
}

impl<T: 'static> EnvValue for Vec<T> {
    fn assign(&mut self, _raw: &str) -> Result<(), CoerceError> {
        Err(CoerceError::Unsupported("sequence"))
    }
}

impl<K: 'static, V: 'static, S: BuildHasher + 'static> EnvValue for HashMap<K, V, S> {
    fn assign(&mut self, _raw: &str) -> Result<(), CoerceError> {
        Err(CoerceError::Unsupported("map"))
    }
}

impl<K: 'static, V: 'static> EnvValue for BTreeMap<K, V> {
    fn assign(&mut self, _raw: &str) -> Result<(), CoerceError> {
        Err(CoerceError::Unsupported("map"))
    }
}
