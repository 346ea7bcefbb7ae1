//! File formats understood by the loader.
//!
//! A codec turns text into any deserializable type and back. Layered loads
//! merge documents in the codec's own tree.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{fmt, str::FromStr};

/// Errors raised by a single codec
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("invalid TOML: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("cannot encode TOML: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A supported serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Codec {
    Toml,
    Json,
    Yaml,
}

impl Codec {
    pub fn name(self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// Parse `text` into `T`
    pub fn decode<T: DeserializeOwned>(self, text: &str) -> Result<T, CodecError> {
        Ok(match self {
            Self::Toml => toml::from_str(text)?,
            Self::Json => serde_json::from_str(text)?,
            Self::Yaml => serde_yaml::from_str(text)?,
        })
    }

    /// Serialize `value` to text
    pub fn encode<T: Serialize + ?Sized>(self, value: &T) -> Result<String, CodecError> {
        Ok(match self {
            Self::Toml => toml::to_string(value)?,
            Self::Json => serde_json::to_string_pretty(value)?,
            Self::Yaml => serde_yaml::to_string(value)?,
        })
    }

    /// Parse `text` and layer it over `base`, returning the merged value
    ///
    /// The merge happens in the codec's own document tree, so anything the
    /// format can express survives (YAML tags, TOML tables). YAML is
    /// re-read from text to keep its scalar leniency.
    pub fn overlay<T>(self, base: &T, text: &str) -> Result<T, CodecError>
    where
        T: Serialize + DeserializeOwned,
    {
        match self {
            Self::Toml => {
                let base = toml::Value::try_from(base)?;
                let overlay = toml::Value::Table(toml::from_str(text)?);
                Ok(merge_toml(base, overlay).try_into()?)
            }
            Self::Json => {
                let base = serde_json::to_value(base)?;
                let overlay: Value = serde_json::from_str(text)?;
                Ok(serde_json::from_value(deep_merge(base, overlay))?)
            }
            Self::Yaml => {
                let base = serde_yaml::to_value(base)?;
                let overlay: serde_yaml::Value = serde_yaml::from_str(text)?;
                let merged = serde_yaml::to_string(&merge_yaml(base, overlay))?;
                Ok(serde_yaml::from_str(&merged)?)
            }
        }
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Codec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unknown format '{}', expected toml, json or yaml", other)),
        }
    }
}

/// Deep merge two documents, with `overlay` taking precedence over `base`
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Arrays, strings, numbers and booleans are replaced entirely
/// - A null overlay keeps the base value
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged_value = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged_value);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// [`deep_merge`] for TOML trees
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_value) in overlay_table {
                let merged_value = match base_table.remove(&key) {
                    Some(base_value) => merge_toml(base_value, overlay_value),
                    None => overlay_value,
                };
                base_table.insert(key, merged_value);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// [`deep_merge`] for YAML trees; tagged values are replaced whole
pub fn merge_yaml(base: serde_yaml::Value, overlay: serde_yaml::Value) -> serde_yaml::Value {
    use serde_yaml::Value as Yaml;

    match (base, overlay) {
        (Yaml::Mapping(mut base_map), Yaml::Mapping(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged_value = match base_map.remove(&key) {
                    Some(base_value) => merge_yaml(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged_value);
            }
            Yaml::Mapping(base_map)
        }
        (base, Yaml::Null) => base,
        (_, overlay) => overlay,
    }
}
