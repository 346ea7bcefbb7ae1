use crate::error::ConfigResult;
use crate::field::{ConfigValue, FieldDescriptor, FieldVisitor, PrefixPath, Record};
use std::{fs, path::Path};

/// Documentation of one field and the variables that override it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvDoc {
    /// Dotted field name, e.g. `db.password`
    pub field: String,
    /// Candidate environment variables, in lookup order
    pub variables: Vec<String>,
    pub required: bool,
    pub default: Option<String>,
    pub description: String,
}

/// Collects the environment variables a record responds to
///
/// Sequences contribute one set of rows per element present in the walked
/// value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvDocs {
    entries: Vec<EnvDoc>,
}

impl EnvDocs {
    /// Walk `target` below `path` and document every field
    pub fn collect<T: Record>(target: &mut T, path: &PrefixPath) -> ConfigResult<Self> {
        let mut docs = Self::default();
        target.visit_fields(path, &mut docs)?;
        Ok(docs)
    }

    pub fn entries(&self) -> &[EnvDoc] {
        &self.entries
    }

    /// Render the entries as a markdown table
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str("## Environment Variables Summary\n\n");
        md.push_str("| Field | Variables | Required | Default | Description |\n");
        md.push_str("|-------|-----------|----------|---------|-------------|\n");
        for entry in &self.entries {
            let required_str = if entry.required { "Yes" } else { "No" };
            let variables = entry
                .variables
                .iter()
                .map(|v| format!("`{}`", v))
                .collect::<Vec<_>>()
                .join(", ");
            let default_display = entry.default.as_deref().unwrap_or("-");
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                entry.field, variables, required_str, default_display, entry.description
            ));
        }

        md
    }

    /// Write the markdown table to `path`
    pub fn write(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        fs::write(path, self.to_markdown())
    }
}

impl FieldVisitor for EnvDocs {
    fn visit_field<T: ConfigValue>(
        &mut self,
        field: &FieldDescriptor,
        path: &PrefixPath,
        value: &mut T,
    ) -> ConfigResult<()> {
        self.entries.push(EnvDoc {
            field: path.qualified(field),
            variables: path.env_names(field),
            required: field.required,
            default: field.default_literal().map(str::to_string),
            description: field.description.to_string(),
        });
        value.accept(field, path, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Configor;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, Serialize, Deserialize, Configor)]
    #[serde(default)]
    struct Contact {
        #[field(required)]
        email: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize, Configor)]
    #[serde(default)]
    struct Settings {
        /// Listening port
        #[field(default = "8080")]
        port: u16,
        #[field(env = "API_TOKEN", required)]
        token: String,
        contacts: Vec<Contact>,
    }

    #[test]
    fn test_collect_rows_in_declared_order() {
        let mut settings = Settings {
            contacts: vec![Contact::default()],
            ..Default::default()
        };
        let docs = EnvDocs::collect(&mut settings, &PrefixPath::with_prefix("App")).unwrap();
        let fields: Vec<_> = docs.entries().iter().map(|e| e.field.as_str()).collect();

        assert_eq!(fields, ["port", "token", "contacts", "contacts.0.email"]);
        assert_eq!(docs.entries()[0].variables, ["App_port", "APP_PORT"]);
        assert_eq!(docs.entries()[0].default.as_deref(), Some("8080"));
        assert_eq!(docs.entries()[0].description, "Listening port");
        assert_eq!(docs.entries()[1].variables, ["API_TOKEN"]);
        assert!(docs.entries()[1].required);
        assert_eq!(docs.entries()[3].variables[1], "APP_CONTACTS_0_EMAIL");
    }

    #[test]
    fn test_collect_does_not_modify_target() {
        let mut settings = Settings::default();
        EnvDocs::collect(&mut settings, &PrefixPath::new()).unwrap();
        assert_eq!(settings.port, 0);
        assert!(settings.token.is_empty());
    }

    #[test]
    fn test_markdown_table() {
        let mut settings = Settings::default();
        let docs = EnvDocs::collect(&mut settings, &PrefixPath::with_prefix("App")).unwrap();
        let md = docs.to_markdown();

        assert!(md.contains("| Field | Variables | Required | Default | Description |"));
        assert!(md.contains("| port | `App_port`, `APP_PORT` | No | 8080 | Listening port |"));
        assert!(md.contains("| token | `API_TOKEN` | Yes | - |  |"));
    }

    #[test]
    fn test_write_docs() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("CONFIG.md");
        EnvDocs::default().write(&path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("## Environment Variables Summary"));
    }
}
