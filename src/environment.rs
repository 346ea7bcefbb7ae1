use crate::binder::env_non_empty;
use crate::error::ConfigError;
use std::{fmt, str::FromStr};

/// Variable holding the environment name when none is set explicitly
pub const ENVIRONMENT_VAR: &str = "CONFIGOR_ENV";

/// The deployment environment, used to pick environment-specific files
///
/// `config.yml` loaded in `production` is followed by
/// `config.production.yml` when that file exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Environment(String);

impl Environment {
    pub fn development() -> Self {
        Self("development".to_string())
    }

    pub fn production() -> Self {
        Self("production".to_string())
    }

    pub fn test() -> Self {
        Self("test".to_string())
    }

    /// Read `CONFIGOR_ENV`, falling back to `development`
    pub fn from_env() -> Result<Self, ConfigError> {
        match env_non_empty(ENVIRONMENT_VAR) {
            Some(name) => name.parse(),
            None => Ok(Self::development()),
        }
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_production(&self) -> bool {
        matches!(self.0.as_str(), "prod" | "production")
    }

    pub fn is_development(&self) -> bool {
        matches!(self.0.as_str(), "dev" | "development")
    }

    pub fn is_test(&self) -> bool {
        self.0 == "test"
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::development()
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(ConfigError::InvalidEnvironment {
                key: ENVIRONMENT_VAR.to_string(),
                value: s.to_string(),
                description: "Expected a non-empty name without path separators, such as 'production'"
                    .to_string(),
            });
        }
        Ok(Self(name.to_string()))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
