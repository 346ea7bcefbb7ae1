use crate::error::{ConfigError, ConfigResult};
use crate::field::{ConfigValue, FieldDescriptor, FieldVisitor, PrefixPath, Record};
use crate::literal::{LiteralParser, YamlLiterals};
use std::env;
use tracing::debug;

/// Reads an environment variable, treating unset, non-unicode and empty alike
pub fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

/// Applies environment overrides, defaults and required checks to a record
///
/// For every field, in declared order:
/// 1. the first candidate environment variable with a non-empty value is
///    parsed into the field;
/// 2. if the field is still blank, its `default` literal is parsed into it,
///    or the bind fails when it is `required`;
/// 3. nested records and record elements of sequences are bound in turn.
///
/// The first error aborts the walk.
///
/// # Example
/// ```rust
/// use configor::{Binder, Configor, PrefixPath, YamlLiterals};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Serialize, Deserialize, Configor)]
/// #[serde(default)]
/// struct Settings {
///     #[field(default = "8080")]
///     port: u16,
/// }
///
/// let mut settings = Settings::default();
/// Binder::new(&YamlLiterals)
///     .bind(&mut settings, &PrefixPath::with_prefix("DocExample"))
///     .unwrap();
/// assert_eq!(settings.port, 8080);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Binder<'a, P = YamlLiterals> {
    literals: &'a P,
}

impl<'a, P: LiteralParser> Binder<'a, P> {
    pub fn new(literals: &'a P) -> Self {
        Self { literals }
    }

    /// Bind every field of `target` below `path`
    pub fn bind<T: Record>(&mut self, target: &mut T, path: &PrefixPath) -> ConfigResult<()> {
        target.visit_fields(path, self)
    }

    /// Parse the first non-empty candidate variable into `value`
    fn apply_override<T: ConfigValue>(
        &self,
        field: &FieldDescriptor,
        path: &PrefixPath,
        value: &mut T,
    ) -> ConfigResult<()> {
        for variable in path.env_names(field) {
            let Some(raw) = env_non_empty(&variable) else {
                continue;
            };

            *value = self
                .literals
                .parse(&raw)
                .map_err(|e| ConfigError::MalformedOverride {
                    field: path.qualified(field),
                    variable: variable.clone(),
                    value: raw.clone(),
                    reason: e.to_string(),
                })?;
            debug!(field = %path.qualified(field), %variable, "applied environment override");
            break;
        }
        Ok(())
    }

    /// Fill a blank `value` from its default, or reject it when required
    fn apply_default<T: ConfigValue>(
        &self,
        field: &FieldDescriptor,
        path: &PrefixPath,
        value: &mut T,
    ) -> ConfigResult<()> {
        if !value.is_blank() {
            return Ok(());
        }

        if let Some(literal) = field.default_literal() {
            *value = self
                .literals
                .parse(literal)
                .map_err(|e| ConfigError::MalformedDefault {
                    field: path.qualified(field),
                    value: literal.to_string(),
                    reason: e.to_string(),
                })?;
        } else if field.required {
            return Err(ConfigError::RequiredFieldMissing {
                field: path.qualified(field),
            });
        }
        Ok(())
    }
}

impl<P: LiteralParser> FieldVisitor for Binder<'_, P> {
    fn visit_field<T: ConfigValue>(
        &mut self,
        field: &FieldDescriptor,
        path: &PrefixPath,
        value: &mut T,
    ) -> ConfigResult<()> {
        self.apply_override(field, path, value)?;
        self.apply_default(field, path, value)?;
        value.accept(field, path, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Configor;
    use serde::{Deserialize, Serialize};
    use serial_test::serial;

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Configor)]
    #[serde(default)]
    struct Limits {
        #[field(default = "3")]
        retries: u8,
        #[field(required)]
        timeout: u32,
        after: String,
    }

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, Configor)]
    #[serde(default)]
    struct Service {
        #[field(default = "svc")]
        name: String,
        limits: Limits,
        tags: Vec<String>,
    }

    fn bind(service: &mut Service) -> ConfigResult<()> {
        Binder::new(&YamlLiterals).bind(service, &PrefixPath::with_prefix("BinderTest"))
    }

    #[test]
    fn test_env_non_empty() {
        temp_env::with_vars(
            [("BINDER_TEST_SET", Some("x")), ("BINDER_TEST_EMPTY", Some(""))],
            || {
                assert_eq!(env_non_empty("BINDER_TEST_SET"), Some("x".to_string()));
                assert_eq!(env_non_empty("BINDER_TEST_EMPTY"), None);
                assert_eq!(env_non_empty("BINDER_TEST_UNSET"), None);
            },
        );
    }

    #[test]
    #[serial]
    fn test_defaults_fill_blank_fields() {
        let mut service = Service::default();
        service.limits.timeout = 30;

        bind(&mut service).unwrap();

        assert_eq!(service.name, "svc");
        assert_eq!(service.limits.retries, 3);
        assert_eq!(service.limits.timeout, 30);
    }

    #[test]
    #[serial]
    fn test_file_value_is_kept_over_default() {
        let mut service = Service::default();
        service.name = "from-file".to_string();
        service.limits.timeout = 30;

        bind(&mut service).unwrap();

        assert_eq!(service.name, "from-file");
    }

    #[test]
    #[serial]
    fn test_verbatim_name_wins_over_upper_case() {
        temp_env::with_vars(
            [
                ("BinderTest_name", Some("verbatim")),
                ("BINDERTEST_NAME", Some("upper")),
                ("BINDERTEST_LIMITS_TIMEOUT", Some("5")),
            ],
            || {
                let mut service = Service::default();
                bind(&mut service).unwrap();
                assert_eq!(service.name, "verbatim");
                assert_eq!(service.limits.timeout, 5);
            },
        );
    }

    #[test]
    #[serial]
    fn test_empty_variable_falls_through_to_next_candidate() {
        temp_env::with_vars(
            [
                ("BinderTest_name", Some("")),
                ("BINDERTEST_NAME", Some("upper")),
                ("BINDERTEST_LIMITS_TIMEOUT", Some("5")),
            ],
            || {
                let mut service = Service::default();
                bind(&mut service).unwrap();
                assert_eq!(service.name, "upper");
            },
        );
    }

    #[test]
    #[serial]
    fn test_override_parses_sequences() {
        temp_env::with_vars(
            [
                ("BINDERTEST_TAGS", Some("[a, b]")),
                ("BINDERTEST_LIMITS_TIMEOUT", Some("5")),
            ],
            || {
                let mut service = Service::default();
                bind(&mut service).unwrap();
                assert_eq!(service.tags, vec!["a", "b"]);
            },
        );
    }

    #[test]
    #[serial]
    fn test_required_missing_aborts_before_later_siblings() {
        let mut service = Service::default();

        let result = bind(&mut service);

        assert!(matches!(
            result,
            Err(ConfigError::RequiredFieldMissing { ref field }) if field == "limits.timeout"
        ));
        assert_eq!(service.limits.retries, 3);
        assert!(service.limits.after.is_empty());
    }

    #[test]
    #[serial]
    fn test_malformed_override_names_field_and_variable() {
        temp_env::with_vars([("BINDERTEST_LIMITS_TIMEOUT", Some("soon"))], || {
            let mut service = Service::default();

            match bind(&mut service) {
                Err(ConfigError::MalformedOverride {
                    field,
                    variable,
                    value,
                    ..
                }) => {
                    assert_eq!(field, "limits.timeout");
                    assert_eq!(variable, "BINDERTEST_LIMITS_TIMEOUT");
                    assert_eq!(value, "soon");
                }
                other => panic!("Expected MalformedOverride, got {:?}", other),
            }
        });
    }

    #[test]
    #[serial]
    fn test_whole_record_override() {
        temp_env::with_vars(
            [("BINDERTEST_LIMITS", Some("{retries: 9, timeout: 60}"))],
            || {
                let mut service = Service::default();
                bind(&mut service).unwrap();
                assert_eq!(service.limits.retries, 9);
                assert_eq!(service.limits.timeout, 60);
            },
        );
    }
}
