use crate::codec::{Codec, CodecError};
use serde::de::DeserializeOwned;

/// Turns `default` literals and environment values into typed field values
pub trait LiteralParser {
    fn parse<T: DeserializeOwned>(&self, literal: &str) -> Result<T, CodecError>;
}

/// Parses literals with the YAML grammar
///
/// `3306` becomes a number, `[a, b]` a sequence, `{host: x}` a mapping, and
/// any plain scalar is accepted by string fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YamlLiterals;

impl LiteralParser for YamlLiterals {
    fn parse<T: DeserializeOwned>(&self, literal: &str) -> Result<T, CodecError> {
        Codec::Yaml.decode(literal)
    }
}
