//! Export of a [`Schema`] as a JSON Schema document.
//!
//! The exported document describes the *configuration* accepted by a data source (attribute names,
//! not manifest keys). Editors can use it to validate configuration files passed to the CLI.

use schemars::{Schema as JsonSchema, json_schema};
use serde_json::{Map, Value, json};

use crate::schema::{
    Schema,
    attribute::{Attribute, AttributeKind, Attributes, ElementType},
    validator::Validator,
};

const JSON_SCHEMA_DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

impl Schema {
    /// Builds a JSON Schema (draft 2020-12) describing the accepted configuration.
    pub fn to_json_schema(&self, title: &str) -> JsonSchema {
        let mut schema = object_schema(self.attributes());
        schema.insert("$schema".to_owned(), JSON_SCHEMA_DIALECT.into());
        schema.insert("title".to_owned(), title.into());
        schema.insert("description".to_owned(), self.description().into());
        schema
    }
}

fn object_schema(attributes: &Attributes) -> JsonSchema {
    let properties = attributes
        .iter()
        .map(|(name, attribute)| {
            let mut schema = attribute_schema(attribute);
            if !attribute.mode().is_required() {
                allow_null(&mut schema);
            }
            (name.to_owned(), schema.to_value())
        })
        .collect::<Map<_, _>>();

    let required = attributes
        .iter()
        .filter(|(_, attribute)| attribute.mode().is_required())
        .map(|(name, _)| name)
        .collect::<Vec<_>>();

    let mut schema = json_schema!({
        "type": "object",
        "properties": properties,
        "additionalProperties": false,
    });

    if !required.is_empty() {
        schema.insert("required".to_owned(), required.into());
    }

    schema
}

fn attribute_schema(attribute: &Attribute) -> JsonSchema {
    let mut schema = match attribute.kind() {
        AttributeKind::String => element_schema(&ElementType::String),
        AttributeKind::Bool => element_schema(&ElementType::Bool),
        AttributeKind::Int64 => element_schema(&ElementType::Int64),
        AttributeKind::List(element) => json_schema!({
            "type": "array",
            "items": element_schema(element),
        }),
        AttributeKind::Map(element) => json_schema!({
            "type": "object",
            "additionalProperties": element_schema(element),
        }),
        AttributeKind::SingleNested(attributes) => object_schema(attributes),
        AttributeKind::ListNested(attributes) => json_schema!({
            "type": "array",
            "items": object_schema(attributes),
        }),
    };

    if !attribute.get_description().is_empty() {
        schema.insert(
            "description".to_owned(),
            attribute.get_description().into(),
        );
    }

    if attribute.mode().is_computed() {
        schema.insert("readOnly".to_owned(), true.into());
    }

    for validator in attribute.validators() {
        match validator {
            Validator::MinLength(min_length) => {
                schema.insert("minLength".to_owned(), (*min_length).into());
            }
            Validator::OneOf(allowed) => {
                schema.insert("enum".to_owned(), Value::from(allowed.to_vec()));
            }
            Validator::Regex { regex, .. } => {
                schema.insert("pattern".to_owned(), regex.as_str().into());
            }
            Validator::Timestamp => {
                schema.insert("format".to_owned(), "date-time".into());
            }
            Validator::ObjectName
            | Validator::NamespaceName
            | Validator::Labels
            | Validator::Annotations => {}
        }
    }

    schema
}

/// Unset attributes may be given as `null`.
fn allow_null(schema: &mut JsonSchema) {
    if let Some(Value::String(type_name)) = schema.get("type").cloned() {
        schema.insert("type".to_owned(), json!([type_name, "null"]));
    }

    if let Some(Value::Array(allowed)) = schema.get_mut("enum") {
        allowed.push(Value::Null);
    }
}

fn element_schema(element: &ElementType) -> JsonSchema {
    match element {
        ElementType::String => json_schema!({"type": "string"}),
        ElementType::Bool => json_schema!({"type": "boolean"}),
        ElementType::Int64 => json_schema!({"type": "integer", "format": "int64"}),
        ElementType::List(inner) => json_schema!({
            "type": "array",
            "items": element_schema(inner),
        }),
        ElementType::Map(inner) => json_schema!({
            "type": "object",
            "additionalProperties": element_schema(inner),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_nested_attributes() {
        let schema = Schema::new(
            "Example",
            Attributes::new()
                .attribute(
                    "metadata",
                    Attribute::single_nested(
                        Attributes::new().attribute("name", Attribute::string().required()),
                    )
                    .required(),
                )
                .attribute(
                    "log_format",
                    Attribute::string()
                        .description("Log format")
                        .validator(Validator::OneOf(&["logfmt", "json"])),
                )
                .attribute(
                    "params",
                    Attribute::map(ElementType::list_of(ElementType::String)),
                )
                .attribute("yaml", Attribute::string().computed()),
        );

        let exported = schema.to_json_schema("example_manifest").to_value();

        assert_eq!(
            exported,
            json!({
                "$schema": JSON_SCHEMA_DIALECT,
                "title": "example_manifest",
                "description": "Example",
                "type": "object",
                "additionalProperties": false,
                "required": ["metadata"],
                "properties": {
                    "metadata": {
                        "type": "object",
                        "additionalProperties": false,
                        "required": ["name"],
                        "properties": {
                            "name": {"type": "string"},
                        },
                    },
                    "log_format": {
                        "type": ["string", "null"],
                        "description": "Log format",
                        "enum": ["logfmt", "json", null],
                    },
                    "params": {
                        "type": ["object", "null"],
                        "additionalProperties": {
                            "type": "array",
                            "items": {"type": "string"},
                        },
                    },
                    "yaml": {"type": ["string", "null"], "readOnly": true},
                },
            })
        );
    }
}
