use crate::binder::{Binder, env_non_empty};
use crate::docs::EnvDocs;
use crate::environment::Environment;
use crate::error::{ConfigError, ConfigResult};
use crate::field::{PrefixPath, Record};
use crate::literal::{LiteralParser, YamlLiterals};
use crate::loader::ChainedLoader;
use crate::resolve;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Variable holding the environment prefix when none is set explicitly
pub const ENV_PREFIX_VAR: &str = "CONFIGOR_ENV_PREFIX";

/// Prefix of derived variable names when nothing else is configured
pub const DEFAULT_ENV_PREFIX: &str = "Configor";

/// Prefix value that disables prefixing altogether
pub const NO_ENV_PREFIX: &str = "-";

/// File read by [`Configor::with_dotenv`]
pub const DOTENV_FILE: &str = ".env";

/// Loads configuration files into a record and binds it
///
/// `load` resolves the candidate files, loads each with the
/// [`ChainedLoader`], then applies environment overrides, defaults and
/// required checks with the [`Binder`].
///
/// # Example
/// ```no_run
/// use configor::Configor;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Serialize, Deserialize, Configor)]
/// #[serde(default)]
/// struct Settings {
///     #[field(default = "configor")]
///     app_name: String,
///     #[field(required, env = "DBPassword")]
///     password: String,
/// }
///
/// let mut settings = Settings::default();
/// Configor::new()
///     .with_env_prefix("APP")
///     .load(&mut settings, &["config.yml"])
///     .unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct Configor<P = YamlLiterals> {
    environment: Option<Environment>,
    env_prefix: Option<String>,
    loader: ChainedLoader,
    literals: P,
    dotenv: Option<PathBuf>,
}

impl Configor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P: LiteralParser> Configor<P> {
    /// Use `environment` instead of reading `CONFIGOR_ENV`
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Use `prefix` instead of reading `CONFIGOR_ENV_PREFIX`; `-` disables it
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Derive variable names from field names alone
    pub fn without_env_prefix(self) -> Self {
        self.with_env_prefix(NO_ENV_PREFIX)
    }

    pub fn with_loader(mut self, loader: ChainedLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Parse defaults and overrides with `literals`
    pub fn with_literals<Q: LiteralParser>(self, literals: Q) -> Configor<Q> {
        Configor {
            environment: self.environment,
            env_prefix: self.env_prefix,
            loader: self.loader,
            literals,
            dotenv: self.dotenv,
        }
    }

    /// Read `.env` into the process environment before binding
    pub fn with_dotenv(mut self, enabled: bool) -> Self {
        self.dotenv = enabled.then(|| PathBuf::from(DOTENV_FILE));
        self
    }

    /// Read `file` into the process environment before binding
    ///
    /// A relative name is searched in the current directory and its
    /// ancestors. A missing file is ignored; a malformed one fails the load.
    pub fn with_dotenv_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.dotenv = Some(file.into());
        self
    }

    pub fn loader(&self) -> &ChainedLoader {
        &self.loader
    }

    /// Explicit environment, else `CONFIGOR_ENV`, else `development`
    pub fn environment(&self) -> ConfigResult<Environment> {
        match &self.environment {
            Some(environment) => Ok(environment.clone()),
            None => Environment::from_env(),
        }
    }

    /// Explicit prefix, else `CONFIGOR_ENV_PREFIX`, else `Configor`
    ///
    /// Returns `None` when the prefix is `-`.
    pub fn env_prefix(&self) -> Option<String> {
        let prefix = self
            .env_prefix
            .clone()
            .filter(|prefix| !prefix.is_empty())
            .or_else(|| env_non_empty(ENV_PREFIX_VAR))
            .unwrap_or_else(|| DEFAULT_ENV_PREFIX.to_string());

        (prefix != NO_ENV_PREFIX).then_some(prefix)
    }

    /// Root of every derived variable name
    pub fn prefix_path(&self) -> PrefixPath {
        match self.env_prefix() {
            Some(prefix) => PrefixPath::with_prefix(prefix),
            None => PrefixPath::new(),
        }
    }

    /// Files that [`load`](Self::load) would read for `files`, in load order
    pub fn configuration_files<F: AsRef<Path>>(&self, files: &[F]) -> ConfigResult<Vec<PathBuf>> {
        Ok(resolve::configuration_files(files, &self.environment()?))
    }

    /// Load every resolved file into `target`, then bind it
    ///
    /// A file that cannot be layered onto the current value is loaded on its
    /// own and the fields it names are moved over. Any error aborts the
    /// whole load.
    pub fn load<T, F>(&self, target: &mut T, files: &[F]) -> ConfigResult<()>
    where
        T: Record + Serialize,
        F: AsRef<Path>,
    {
        if let Some(dotenv) = &self.dotenv {
            load_dotenv(dotenv)?;
        }

        for file in self.configuration_files(files)? {
            if let Err(e) = self.loader.load(target, &file) {
                debug!(file = %file.display(), error = %e, "layered load failed, retrying field by field");
                self.loader.patch_load(target, &file)?;
            }
        }

        self.bind(target)
    }

    /// Apply environment overrides, defaults and required checks
    pub fn bind<T: Record>(&self, target: &mut T) -> ConfigResult<()> {
        Binder::new(&self.literals).bind(target, &self.prefix_path())
    }

    /// Write `target` with the loader's primary codec
    pub fn dump<T: Serialize>(&self, target: &T, path: impl AsRef<Path>) -> ConfigResult<()> {
        self.loader.dump(target, path)
    }

    /// Document the variables `target` responds to under this prefix
    pub fn docs<T: Record>(&self, target: &mut T) -> ConfigResult<EnvDocs> {
        EnvDocs::collect(target, &self.prefix_path())
    }
}

fn load_dotenv(file: &Path) -> ConfigResult<()> {
    match dotenvy::from_filename(file) {
        Ok(path) => {
            debug!(path = %path.display(), "loaded dotenv file");
            Ok(())
        }
        Err(e) if e.not_found() => Ok(()),
        Err(source) => Err(ConfigError::DotenvFailure {
            path: file.to_path_buf(),
            source,
        }),
    }
}

/// Load `files` into `target` with the default [`Configor`]
pub fn load<T, F>(target: &mut T, files: &[F]) -> ConfigResult<()>
where
    T: Record + Serialize,
    F: AsRef<Path>,
{
    Configor::new().load(target, files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Codec;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_prefix_resolution_order() {
        temp_env::with_var(ENV_PREFIX_VAR, Some("FROM_ENV"), || {
            assert_eq!(Configor::new().env_prefix().as_deref(), Some("FROM_ENV"));
            assert_eq!(
                Configor::new().with_env_prefix("APP").env_prefix().as_deref(),
                Some("APP")
            );
        });
        temp_env::with_var_unset(ENV_PREFIX_VAR, || {
            assert_eq!(Configor::new().env_prefix().as_deref(), Some("Configor"));
            assert_eq!(Configor::new().with_env_prefix("").env_prefix().as_deref(), Some("Configor"));
        });
    }

    #[test]
    #[serial]
    fn test_dash_disables_prefix() {
        temp_env::with_var(ENV_PREFIX_VAR, Some("-"), || {
            assert_eq!(Configor::new().env_prefix(), None);
            assert_eq!(Configor::new().prefix_path(), PrefixPath::new());
        });
        assert_eq!(Configor::new().without_env_prefix().env_prefix(), None);
    }

    #[test]
    #[serial]
    fn test_explicit_environment_wins() {
        temp_env::with_var("CONFIGOR_ENV", Some("staging"), || {
            let configor = Configor::new();
            assert_eq!(configor.environment().unwrap().name(), "staging");

            let configor = configor.with_environment(Environment::production());
            assert_eq!(configor.environment().unwrap(), Environment::production());
        });
    }

    #[test]
    #[serial]
    fn test_invalid_environment_fails_resolution() {
        temp_env::with_var("CONFIGOR_ENV", Some("a/b"), || {
            let result = Configor::new().configuration_files(&["config.yml"]);
            assert!(result.is_err());
        });
    }

    #[derive(Debug, Default, Serialize, serde::Deserialize, crate::Configor)]
    #[serde(default)]
    struct Settings {
        name: String,
    }

    #[test]
    #[serial]
    fn test_missing_dotenv_file_is_ignored() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut settings = Settings::default();

        let result = Configor::new()
            .with_env_prefix("DotenvTest")
            .with_dotenv_file(dir.path().join("missing.env"))
            .load(&mut settings, &[] as &[&str]);
        assert!(result.is_ok());
    }

    #[test]
    #[serial]
    fn test_dotenv_file_feeds_overrides() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("app.env");
        std::fs::write(&path, "DOTENVTEST_NAME=from-dotenv\n").unwrap();

        temp_env::with_var_unset("DOTENVTEST_NAME", || {
            let mut settings = Settings::default();
            Configor::new()
                .with_env_prefix("DotenvTest")
                .with_dotenv_file(&path)
                .load(&mut settings, &[] as &[&str])
                .unwrap();
            assert_eq!(settings.name, "from-dotenv");
        });
    }

    #[test]
    #[serial]
    fn test_malformed_dotenv_file_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.env");
        std::fs::write(&path, "1BROKEN=value\n").unwrap();

        let mut settings = Settings::default();
        let result = Configor::new()
            .with_env_prefix("DotenvTest")
            .with_dotenv_file(&path)
            .load(&mut settings, &[] as &[&str]);
        assert!(matches!(result, Err(ConfigError::DotenvFailure { path: p, .. }) if p == path));
    }

    #[test]
    fn test_with_loader_and_literals() {
        let configor = Configor::new()
            .with_loader(ChainedLoader::new([Codec::Yaml]))
            .with_literals(YamlLiterals);
        assert_eq!(configor.loader().codecs(), [Codec::Yaml]);
    }
}
