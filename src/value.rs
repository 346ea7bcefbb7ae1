use crate::error::ConfigResult;
use crate::field::{ConfigValue, FieldDescriptor, FieldVisitor, PrefixPath};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::path::PathBuf;

crate::config_scalar!(
    bool, char, String, PathBuf, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
    f32, f64,
);

// Absent counts as blank; a present value is walked as if held directly.
impl<T: ConfigValue> ConfigValue for Option<T> {
    fn is_blank(&self) -> bool {
        self.is_none()
    }

    fn accept<V: FieldVisitor>(
        &mut self,
        field: &FieldDescriptor,
        path: &PrefixPath,
        visitor: &mut V,
    ) -> ConfigResult<()> {
        match self {
            Some(value) => value.accept(field, path, visitor),
            None => Ok(()),
        }
    }

    fn accept_item<V: FieldVisitor>(
        &mut self,
        field: &FieldDescriptor,
        path: &PrefixPath,
        index: usize,
        visitor: &mut V,
    ) -> ConfigResult<()> {
        match self {
            Some(value) => value.accept_item(field, path, index, visitor),
            None => Ok(()),
        }
    }
}

impl<T: ConfigValue> ConfigValue for Box<T> {
    fn is_blank(&self) -> bool {
        (**self).is_blank()
    }

    fn accept<V: FieldVisitor>(
        &mut self,
        field: &FieldDescriptor,
        path: &PrefixPath,
        visitor: &mut V,
    ) -> ConfigResult<()> {
        (**self).accept(field, path, visitor)
    }

    fn accept_item<V: FieldVisitor>(
        &mut self,
        field: &FieldDescriptor,
        path: &PrefixPath,
        index: usize,
        visitor: &mut V,
    ) -> ConfigResult<()> {
        (**self).accept_item(field, path, index, visitor)
    }
}

impl<T: ConfigValue> ConfigValue for Vec<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }

    fn accept<V: FieldVisitor>(
        &mut self,
        field: &FieldDescriptor,
        path: &PrefixPath,
        visitor: &mut V,
    ) -> ConfigResult<()> {
        visitor.visit_sequence(field, path, self.as_mut_slice())
    }
}

// Maps are bound as a whole; their entries are not walked.
impl<K, V> ConfigValue for HashMap<K, V>
where
    K: DeserializeOwned + Eq + Hash,
    V: DeserializeOwned,
{
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> ConfigValue for BTreeMap<K, V>
where
    K: DeserializeOwned + Ord,
    V: DeserializeOwned,
{
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars_blank_at_zero() {
        assert!(0u16.is_blank());
        assert!(!3306u16.is_blank());
        assert!(String::new().is_blank());
        assert!(!"configor".to_string().is_blank());
        assert!(false.is_blank());
        assert!(!true.is_blank());
        assert!(0.0f64.is_blank());
        assert!(PathBuf::new().is_blank());
    }

    #[test]
    fn test_option_blank_only_when_none() {
        assert!(None::<u32>.is_blank());
        assert!(!Some(0u32).is_blank());
    }

    #[test]
    fn test_collections_blank_when_empty() {
        assert!(Vec::<String>::new().is_blank());
        assert!(!vec![String::new()].is_blank());
        assert!(HashMap::<String, u8>::new().is_blank());
        assert!(!BTreeMap::from([("a".to_string(), 1u8)]).is_blank());
    }

    #[test]
    fn test_box_delegates() {
        assert!(Box::new(0i64).is_blank());
        assert!(!Box::new(7i64).is_blank());
    }
}
