//! Struct-driven configuration loading.
//!
//! A record deriving [`Configor`] is loaded from TOML, JSON or YAML files
//! (whichever format parses first), then bound: every field may be
//! overridden from the environment, filled from a `default` literal, or
//! rejected when `required` and still blank.
//!
//! ```no_run
//! use configor::Configor;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize, Configor)]
//! #[serde(default)]
//! struct Database {
//!     #[field(default = "root")]
//!     user: String,
//!     #[field(required, env = "DBPassword")]
//!     password: String,
//!     #[field(default = "3306")]
//!     port: u32,
//! }
//!
//! #[derive(Debug, Default, Serialize, Deserialize, Configor)]
//! #[serde(default)]
//! struct Config {
//!     #[field(default = "configor")]
//!     app_name: String,
//!     db: Database,
//! }
//!
//! let mut config = Config::default();
//! configor::load(&mut config, &["config.yml"]).unwrap();
//! ```

// Lets the derive's `::configor::` paths resolve inside this crate
extern crate self as configor;

pub mod binder;
pub mod codec;
pub mod docs;
pub mod environment;
pub mod error;
pub mod field;
pub mod literal;
pub mod loader;
pub mod loading;
mod macros;
pub mod resolve;
mod value;

pub use binder::Binder;
pub use codec::{Codec, CodecError};
pub use docs::{EnvDoc, EnvDocs};
pub use environment::Environment;
pub use error::{ConfigError, ConfigResult};
pub use field::{ConfigValue, FieldDescriptor, FieldVisitor, PrefixPath, Record};
pub use literal::{LiteralParser, YamlLiterals};
pub use loader::ChainedLoader;
pub use loading::{Configor, load};

// Re-export macro
pub use configor_macros::Configor;
