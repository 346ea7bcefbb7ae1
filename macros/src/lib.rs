use proc_macro::TokenStream;
use quote::quote;
use std::collections::HashMap;
use syn::{
    Attribute, Data, DeriveInput, Expr, ExprLit, Fields, Lit, Meta, Token, ext::IdentExt,
    parse_macro_input,
};

/// Helper enum for parsed attribute values
enum MetaValue {
    Lit(Lit),
    Flag,
}

/// Derive `configor::Record` and `configor::ConfigValue` for a struct
///
/// Recognized field options, all inside `#[field(...)]`:
/// - `default = "literal"`: parsed into the field when it is blank
/// - `required`: a blank field without default fails the bind
/// - `env = "NAME"`: the only variable that overrides the field
/// - `anonymous`: the field adds no segment to its children's variable names
/// - `skip`: the field is not bound; it still counts toward the record's
///   blankness, so its type needs `Default + PartialEq`
#[proc_macro_derive(Configor, attributes(field))]
pub fn derive_configor(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match generate_record(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate_record(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "#[derive(Configor)] does not support generic structs",
        ));
    }

    // Extract fields from the struct
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "#[derive(Configor)] only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "#[derive(Configor)] only supports structs with named fields",
            ));
        }
    };

    let mut descriptors = Vec::new();
    let mut visits = Vec::new();
    let mut blank_checks = Vec::new();
    let mut idents = Vec::new();
    let mut replacements = Vec::new();

    for field in fields {
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let config = parse_field_config(&field.attrs)?;
        let name = field_ident.unraw().to_string();

        idents.push(field_ident);
        replacements.push(quote! {
            if named(#name) {
                self.#field_ident = #field_ident;
            }
        });

        if config.skip {
            // Not visited, but a record holding data is not blank
            let ty = &field.ty;
            blank_checks.push(quote! {
                && self.#field_ident == <#ty as ::core::default::Default>::default()
            });
            continue;
        }

        let description = doc_comment(&field.attrs);
        let env = option_tokens(config.env.as_deref());
        let default = option_tokens(config.default.as_deref());
        let required = config.required;
        let anonymous = config.anonymous;

        let index = descriptors.len();
        descriptors.push(quote! {
            ::configor::FieldDescriptor {
                name: #name,
                description: #description,
                env: #env,
                default: #default,
                required: #required,
                anonymous: #anonymous,
            }
        });
        visits.push(quote! {
            visitor.visit_field(&fields[#index], path, &mut self.#field_ident)?;
        });
        blank_checks.push(quote! {
            && ::configor::ConfigValue::is_blank(&self.#field_ident)
        });
    }

    Ok(quote! {
        impl ::configor::Record for #struct_name {
            fn fields() -> &'static [::configor::FieldDescriptor] {
                const FIELDS: &[::configor::FieldDescriptor] = &[#(#descriptors),*];
                FIELDS
            }

            #[allow(unused_variables)]
            fn visit_fields<__V: ::configor::FieldVisitor>(
                &mut self,
                path: &::configor::PrefixPath,
                visitor: &mut __V,
            ) -> ::configor::ConfigResult<()> {
                let fields = <Self as ::configor::Record>::fields();
                #(#visits)*
                ::core::result::Result::Ok(())
            }

            #[allow(unused_variables)]
            fn replace_fields(&mut self, other: Self, named: &dyn Fn(&str) -> bool) {
                let Self { #(#idents),* } = other;
                #(#replacements)*
            }
        }

        impl ::configor::ConfigValue for #struct_name {
            fn is_blank(&self) -> bool {
                true #(#blank_checks)*
            }

            fn accept<__V: ::configor::FieldVisitor>(
                &mut self,
                field: &::configor::FieldDescriptor,
                path: &::configor::PrefixPath,
                visitor: &mut __V,
            ) -> ::configor::ConfigResult<()> {
                visitor.visit_record(field, path, self)
            }

            fn accept_item<__V: ::configor::FieldVisitor>(
                &mut self,
                field: &::configor::FieldDescriptor,
                path: &::configor::PrefixPath,
                index: usize,
                visitor: &mut __V,
            ) -> ::configor::ConfigResult<()> {
                visitor.visit_element(field, path, index, self)
            }
        }
    })
}

#[derive(Debug, Default)]
struct FieldConfig {
    env: Option<String>,
    default: Option<String>,
    required: bool,
    anonymous: bool,
    skip: bool,
}

fn option_tokens(value: Option<&str>) -> proc_macro2::TokenStream {
    match value {
        Some(value) => quote! { ::core::option::Option::Some(#value) },
        None => quote! { ::core::option::Option::None },
    }
}

/// Join the field's `///` lines into one description
fn doc_comment(attrs: &[Attribute]) -> String {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(ExprLit {
                    lit: Lit::Str(s), ..
                }) => Some(s.value().trim().to_string()),
                _ => None,
            },
            _ => None,
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse #[field(env = "X", default = "Y", required)] syntax
fn parse_field_list(meta_list: &syn::MetaList) -> syn::Result<HashMap<String, MetaValue>> {
    let mut values = HashMap::new();

    meta_list.parse_nested_meta(|meta| {
        let key = meta
            .path
            .get_ident()
            .ok_or_else(|| meta.error("expected identifier"))?
            .to_string();

        if !matches!(
            key.as_str(),
            "env" | "default" | "required" | "anonymous" | "skip"
        ) {
            return Err(meta.error(format!(
                "unknown field option `{}`, expected env, default, required, anonymous or skip",
                key
            )));
        }

        if meta.input.peek(Token![=]) {
            meta.input.parse::<Token![=]>()?;
            let value: Lit = meta.input.parse()?;
            values.insert(key, MetaValue::Lit(value));
        } else {
            values.insert(key, MetaValue::Flag);
        }

        Ok(())
    })?;

    Ok(values)
}

/// Literal as the text the runtime literal parser will see
fn literal_text(lit: &Lit) -> syn::Result<String> {
    match lit {
        Lit::Str(s) => Ok(s.value()),
        Lit::Int(i) => Ok(i.base10_digits().to_string()),
        Lit::Float(f) => Ok(f.base10_digits().to_string()),
        Lit::Bool(b) => Ok(b.value.to_string()),
        other => Err(syn::Error::new_spanned(
            other,
            "expected a string, integer, float or bool literal",
        )),
    }
}

fn flag(values: &HashMap<String, MetaValue>, key: &str) -> syn::Result<bool> {
    match values.get(key) {
        None => Ok(false),
        Some(MetaValue::Flag) => Ok(true),
        Some(MetaValue::Lit(Lit::Bool(b))) => Ok(b.value),
        Some(MetaValue::Lit(other)) => Err(syn::Error::new_spanned(
            other,
            format!("`{}` takes no value or a bool", key),
        )),
    }
}

fn parse_field_config(attrs: &[Attribute]) -> syn::Result<FieldConfig> {
    let mut config = FieldConfig::default();

    for field_attr in attrs.iter().filter(|attr| attr.path().is_ident("field")) {
        // Parse it as a Meta::List
        let parsed = match &field_attr.meta {
            Meta::List(list) => parse_field_list(list)?,
            _ => {
                return Err(syn::Error::new_spanned(
                    field_attr,
                    "field attribute must be a list: #[field(default = \"...\", ...)]",
                ));
            }
        };

        if let Some(value) = parsed.get("env") {
            let env = match value {
                MetaValue::Lit(Lit::Str(s)) => s.value(),
                _ => {
                    return Err(syn::Error::new_spanned(
                        field_attr,
                        "env must be a string literal: env = \"VAR_NAME\"",
                    ));
                }
            };
            if env.is_empty() {
                return Err(syn::Error::new_spanned(field_attr, "env must not be empty"));
            }
            config.env = Some(env);
        }

        if let Some(value) = parsed.get("default") {
            config.default = match value {
                MetaValue::Lit(lit) => Some(literal_text(lit)?),
                MetaValue::Flag => {
                    return Err(syn::Error::new_spanned(
                        field_attr,
                        "default needs a value: default = \"literal\"",
                    ));
                }
            };
        }

        config.required |= flag(&parsed, "required")?;
        config.anonymous |= flag(&parsed, "anonymous")?;
        config.skip |= flag(&parsed, "skip")?;
    }

    if config.skip && (config.env.is_some() || config.default.is_some() || config.required) {
        return Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "skip cannot be combined with env, default or required",
        ));
    }

    Ok(config)
}
