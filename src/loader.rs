use crate::codec::{Codec, CodecError};
use crate::error::{ConfigError, ConfigResult};
use crate::field::Record;
use serde::{Serialize, de::DeserializeOwned, de::IgnoredAny};
use std::{collections::BTreeMap, fs, path::Path};
use tracing::debug;

/// Outcome of one codec trying one file
#[derive(Debug)]
struct Attempt {
    codec: Codec,
    error: CodecError,
}

/// Loads files by trying an ordered list of codecs until one succeeds
///
/// The order is the trial order for reads; the first codec is the only one
/// used for writes. File extensions are never consulted.
///
/// # Example
/// ```no_run
/// use configor::{ChainedLoader, Codec};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Default, Serialize, Deserialize)]
/// #[serde(default)]
/// struct Settings {
///     port: u16,
/// }
///
/// let loader = ChainedLoader::new([Codec::Yaml, Codec::Json]);
/// let mut settings = Settings::default();
/// loader.load(&mut settings, "settings.yml").unwrap();
/// loader.dump(&settings, "settings.out.yml").unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainedLoader {
    codecs: Vec<Codec>,
}

impl Default for ChainedLoader {
    /// TOML, then JSON, then YAML
    fn default() -> Self {
        Self::new([Codec::Toml, Codec::Json, Codec::Yaml])
    }
}

impl ChainedLoader {
    pub fn new(codecs: impl Into<Vec<Codec>>) -> Self {
        Self {
            codecs: codecs.into(),
        }
    }

    pub fn codecs(&self) -> &[Codec] {
        &self.codecs
    }

    /// Codec used by [`dump`](Self::dump)
    pub fn primary(&self) -> Option<Codec> {
        self.codecs.first().copied()
    }

    /// Load `path` on top of the current value of `target`
    ///
    /// Keys present in the file replace the target's values; everything
    /// else keeps its current value. Fails with `LoadFailure` when no
    /// codec accepts the file.
    pub fn load<T>(&self, target: &mut T, path: impl AsRef<Path>) -> ConfigResult<()>
    where
        T: Serialize + DeserializeOwned,
    {
        let loaded = self.try_each(path.as_ref(), |codec, text| codec.overlay(&*target, text))?;
        *target = loaded;
        Ok(())
    }

    /// Load `path` into a fresh value that replaces `target` entirely
    pub fn plain_load<T>(&self, target: &mut T, path: impl AsRef<Path>) -> ConfigResult<()>
    where
        T: DeserializeOwned,
    {
        *target = self.try_each(path.as_ref(), |codec, text| codec.decode(text))?;
        Ok(())
    }

    /// Load `path` into a fresh value, then move over the fields it names
    ///
    /// Works for targets that cannot be layered as a document. Nested
    /// records named by the file are replaced whole; fields the file does
    /// not mention keep their current value.
    pub fn patch_load<T: Record>(&self, target: &mut T, path: impl AsRef<Path>) -> ConfigResult<()> {
        let (loaded, keys) = self.try_each(path.as_ref(), |codec, text| {
            let loaded: T = codec.decode(text)?;
            // An empty document names no fields
            let keys = codec
                .decode::<BTreeMap<String, IgnoredAny>>(text)
                .unwrap_or_default();
            Ok((loaded, keys))
        })?;

        target.replace_fields(loaded, &|name| keys.contains_key(name));
        Ok(())
    }

    /// Write `target` to `path` with the primary codec
    pub fn dump<T>(&self, target: &T, path: impl AsRef<Path>) -> ConfigResult<()>
    where
        T: Serialize + ?Sized,
    {
        let path = path.as_ref();
        let Some(codec) = self.primary() else {
            return Err(ConfigError::EncodeFailure {
                path: path.to_path_buf(),
                format: "none".to_string(),
                message: "no codec registered".to_string(),
            });
        };

        let text = codec
            .encode(target)
            .map_err(|e| ConfigError::EncodeFailure {
                path: path.to_path_buf(),
                format: codec.name().to_string(),
                message: e.to_string(),
            })?;

        fs::write(path, text).map_err(|source| ConfigError::WriteFailure {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), format = %codec, "dumped configuration");
        Ok(())
    }

    fn try_each<T, F>(&self, path: &Path, mut decode: F) -> ConfigResult<T>
    where
        F: FnMut(Codec, &str) -> Result<T, CodecError>,
    {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cannot read configuration file");
                return Err(ConfigError::LoadFailure {
                    path: path.to_path_buf(),
                });
            }
        };

        let mut attempts = Vec::with_capacity(self.codecs.len());
        for &codec in &self.codecs {
            match decode(codec, &text) {
                Ok(value) => {
                    debug!(path = %path.display(), format = %codec, "loaded configuration file");
                    return Ok(value);
                }
                Err(error) => attempts.push(Attempt { codec, error }),
            }
        }

        debug!(path = %path.display(), ?attempts, "no format could load configuration file");
        Err(ConfigError::LoadFailure {
            path: path.to_path_buf(),
        })
    }
}
