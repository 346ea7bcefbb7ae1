// Declarative helpers shared by the crate and by user code.
// The `Configor` derive itself lives in the configor-macros crate.

/// Implement [`ConfigValue`](crate::ConfigValue) for plain scalar types
///
/// The type must implement `Default`, `PartialEq` and `DeserializeOwned`;
/// it counts as blank when it equals its default.
///
/// # Example
/// ```rust
/// use serde::Deserialize;
///
/// #[derive(Debug, Default, PartialEq, Deserialize)]
/// #[serde(rename_all = "lowercase")]
/// enum Level {
///     #[default]
///     Info,
///     Debug,
/// }
///
/// configor::config_scalar!(Level);
/// ```
#[macro_export]
macro_rules! config_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::ConfigValue for $ty {
                fn is_blank(&self) -> bool {
                    *self == <$ty as ::core::default::Default>::default()
                }
            }
        )+
    };
}
