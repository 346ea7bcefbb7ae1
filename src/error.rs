use colored::Colorize;
use std::{fmt, io, path::PathBuf};

/// Result alias used throughout the crate
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading, binding or dumping configuration
///
/// Every variant is fatal to the call that produced it. A failed load may
/// leave the target partially bound.
#[derive(Debug)]
pub enum ConfigError {
    /// No registered codec could load the file
    LoadFailure { path: PathBuf },
    /// The destination of a dump could not be written
    WriteFailure { path: PathBuf, source: io::Error },
    /// The primary codec could not encode the value being dumped
    EncodeFailure {
        path: PathBuf,
        format: String,
        message: String,
    },
    /// A required field is blank after the file, environment and default passes
    RequiredFieldMissing { field: String },
    /// An environment variable holds a value that does not parse into the field
    MalformedOverride {
        field: String,
        variable: String,
        value: String,
        reason: String,
    },
    /// A `default` literal does not parse into the field
    MalformedDefault {
        field: String,
        value: String,
        reason: String,
    },
    /// A dotenv file exists but could not be read or parsed
    DotenvFailure {
        path: PathBuf,
        source: dotenvy::Error,
    },
    /// The environment name is not usable as a file suffix
    InvalidEnvironment {
        key: String,
        value: String,
        description: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailure { path } => {
                write!(
                    f,
                    "{}: Could not be loaded by any registered format",
                    path.display().to_string().magenta().bold()
                )
            }
            ConfigError::WriteFailure { path, source } => {
                write!(
                    f,
                    "{}: Could not be written: {}",
                    path.display().to_string().magenta().bold(),
                    source
                )
            }
            ConfigError::EncodeFailure {
                path,
                format,
                message,
            } => {
                write!(
                    f,
                    "{}: Could not be encoded as {}: {}",
                    path.display().to_string().magenta().bold(),
                    format.cyan(),
                    message
                )
            }
            ConfigError::RequiredFieldMissing { field } => {
                write!(f, "{}: Is required, but blank", field.magenta().bold())
            }
            ConfigError::MalformedOverride {
                field,
                variable,
                value,
                reason,
            } => {
                writeln!(
                    f,
                    "{}: Invalid value {} in environment variable {}",
                    field.magenta().bold(),
                    format!("'{}'", value).red(),
                    variable.cyan(),
                )?;
                write!(f, "\tReason: {}", reason)
            }
            ConfigError::MalformedDefault {
                field,
                value,
                reason,
            } => {
                writeln!(
                    f,
                    "{}: Invalid default value {}",
                    field.magenta().bold(),
                    format!("'{}'", value).red(),
                )?;
                write!(f, "\tReason: {}", reason)
            }
            ConfigError::DotenvFailure { path, source } => {
                write!(
                    f,
                    "{}: Could not be read: {}",
                    path.display().to_string().magenta().bold(),
                    source
                )
            }
            ConfigError::InvalidEnvironment {
                key,
                value,
                description,
            } => {
                writeln!(
                    f,
                    "{}: Invalid value {}",
                    key.magenta().bold(),
                    format!("'{}'", value).red(),
                )?;
                write!(f, "\tDescription: {}", description)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::WriteFailure { source, .. } => Some(source),
            ConfigError::DotenvFailure { source, .. } => Some(source),
            _ => None,
        }
    }
}
