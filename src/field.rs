use crate::error::ConfigResult;
use serde::de::DeserializeOwned;

/// Static metadata about one field of a [`Record`]
///
/// Tables of descriptors are generated by `#[derive(Configor)]` from the
/// `#[field(...)]` attribute and the field's doc comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Field name as declared in the struct
    pub name: &'static str,
    /// Human-readable description taken from the doc comment
    pub description: &'static str,
    /// Explicit environment variable, replacing the derived names
    pub env: Option<&'static str>,
    /// Literal parsed into the field when it is still blank
    pub default: Option<&'static str>,
    /// Whether a blank field without default aborts the bind
    pub required: bool,
    /// Whether the field adds no segment to its children's prefix path
    pub anonymous: bool,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            description: "",
            env: None,
            default: None,
            required: false,
            anonymous: false,
        }
    }

    pub const fn with_env(mut self, env: &'static str) -> Self {
        self.env = Some(env);
        self
    }

    pub const fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }

    /// The `default` literal, treating an empty one as absent
    pub fn default_literal(&self) -> Option<&'static str> {
        self.default.filter(|literal| !literal.is_empty())
    }
}

/// Ancestor segments accumulated while descending into nested records
///
/// The first `root` segments are the environment prefix; they take part in
/// derived variable names but not in qualified field names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixPath {
    segments: Vec<String>,
    root: usize,
}

impl PrefixPath {
    /// An empty path: derived names are just the field names
    pub fn new() -> Self {
        Self::default()
    }

    /// A path starting with an environment prefix such as `Configor`
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            segments: vec![prefix.into()],
            root: 1,
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Candidate environment variables for `field`, in lookup order
    ///
    /// An explicit `env` name is the only candidate. Otherwise the joined
    /// path is tried verbatim, then upper-cased.
    pub fn env_names(&self, field: &FieldDescriptor) -> Vec<String> {
        if let Some(env) = field.env {
            return vec![env.to_string()];
        }

        let joined = self
            .segments
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(field.name))
            .collect::<Vec<_>>()
            .join("_");
        let upper = joined.to_uppercase();

        vec![joined, upper]
    }

    /// Dotted name of `field` below the environment prefix, e.g. `db.password`
    pub fn qualified(&self, field: &FieldDescriptor) -> String {
        self.segments[self.root..]
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(field.name))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Path for the fields of the record held by `field`
    pub fn child(&self, field: &FieldDescriptor) -> Self {
        let mut path = self.clone();
        if !field.anonymous {
            path.segments.push(field.name.to_string());
        }
        path
    }

    /// Path for the fields of element `index` of the sequence held by `field`
    pub fn element(&self, field: &FieldDescriptor, index: usize) -> Self {
        let mut path = self.child(field);
        path.segments.push(index.to_string());
        path
    }
}

/// A value that can sit in a configuration field
///
/// Scalars only report whether they are blank. Records, sequences and
/// options also route the visitor into their contents.
pub trait ConfigValue: DeserializeOwned {
    /// Whether the value equals its type's zero value
    fn is_blank(&self) -> bool;

    /// Dispatch this value, held by `field`, to the matching visitor hook
    fn accept<V: FieldVisitor>(
        &mut self,
        field: &FieldDescriptor,
        path: &PrefixPath,
        visitor: &mut V,
    ) -> ConfigResult<()> {
        visitor.visit_scalar(field, path, self)
    }

    /// Dispatch this value as element `index` of the sequence held by `field`
    ///
    /// Only records take part; other elements are left alone.
    fn accept_item<V: FieldVisitor>(
        &mut self,
        _field: &FieldDescriptor,
        _path: &PrefixPath,
        _index: usize,
        _visitor: &mut V,
    ) -> ConfigResult<()> {
        Ok(())
    }
}

/// A struct whose fields can be walked in declared order
///
/// Implemented by `#[derive(Configor)]`.
pub trait Record: ConfigValue {
    /// Descriptors of the visited fields, in declared order
    fn fields() -> &'static [FieldDescriptor];

    /// Hand every visited field to `visitor.visit_field`, in declared order
    fn visit_fields<V: FieldVisitor>(&mut self, path: &PrefixPath, visitor: &mut V)
    -> ConfigResult<()>;

    /// Move each field of `other` whose name satisfies `named` into `self`
    ///
    /// Covers skipped fields too.
    fn replace_fields(&mut self, other: Self, named: &dyn Fn(&str) -> bool);
}

/// Hooks called while walking a [`Record`]
///
/// Only `visit_field` is mandatory. The provided hooks implement the
/// structural descent: records extend the path by the field name (unless
/// anonymous), sequence elements additionally by their index.
pub trait FieldVisitor: Sized {
    fn visit_field<T: ConfigValue>(
        &mut self,
        field: &FieldDescriptor,
        path: &PrefixPath,
        value: &mut T,
    ) -> ConfigResult<()>;

    fn visit_scalar<T: ConfigValue>(
        &mut self,
        _field: &FieldDescriptor,
        _path: &PrefixPath,
        _value: &mut T,
    ) -> ConfigResult<()> {
        Ok(())
    }

    fn visit_record<R: Record>(
        &mut self,
        field: &FieldDescriptor,
        path: &PrefixPath,
        record: &mut R,
    ) -> ConfigResult<()> {
        record.visit_fields(&path.child(field), self)
    }

    fn visit_sequence<T: ConfigValue>(
        &mut self,
        field: &FieldDescriptor,
        path: &PrefixPath,
        items: &mut [T],
    ) -> ConfigResult<()> {
        for (index, item) in items.iter_mut().enumerate() {
            item.accept_item(field, path, index, self)?;
        }
        Ok(())
    }

    fn visit_element<R: Record>(
        &mut self,
        field: &FieldDescriptor,
        path: &PrefixPath,
        index: usize,
        record: &mut R,
    ) -> ConfigResult<()> {
        record.visit_fields(&path.element(field, index), self)
    }
}
