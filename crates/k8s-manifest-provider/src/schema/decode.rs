//! Schema driven validation and translation of configuration values.
//!
//! Decoding walks a configuration value alongside the attribute tree. It reports every problem it
//! finds as a diagnostic and produces the same data keyed by wire names, with every unset (`null`)
//! attribute dropped.

use serde_json::{Map, Value};

use crate::{
    diagnostics::{AttributePath, Diagnostics},
    schema::attribute::{Attribute, AttributeKind, Attributes, ElementType},
};

impl Attributes {
    /// Decodes a configuration object. Returns [`None`] if `value` is not an object.
    pub(crate) fn decode_object(
        &self,
        value: &Value,
        path: &AttributePath,
        diagnostics: &mut Diagnostics,
    ) -> Option<Value> {
        let Some(object) = value.as_object() else {
            type_mismatch(diagnostics, path, "object");
            return None;
        };

        for name in object.keys().filter(|name| self.get(name).is_none()) {
            diagnostics.add_attribute_error(
                &path.attribute(name),
                "Unsupported argument",
                format!("An argument named {name:?} is not expected here."),
            );
        }

        let mut decoded = Map::new();

        for (name, attribute) in self.iter() {
            let attribute_path = path.attribute(name);
            let value = object.get(name).filter(|value| !value.is_null());

            match (attribute.mode().is_computed(), value) {
                (true, Some(_)) => diagnostics.add_attribute_error(
                    &attribute_path,
                    "Invalid Configuration for Read-Only Attribute",
                    format!("Cannot set value for attribute {attribute_path}, it is computed."),
                ),
                (true, None) => {}
                (false, None) => {
                    if attribute.mode().is_required() {
                        diagnostics.add_attribute_error(
                            &attribute_path,
                            "Missing required argument",
                            format!("The argument {name:?} is required, but no definition was found."),
                        );
                    }
                }
                (false, Some(value)) => {
                    if let Some(wire_value) = attribute.decode(value, &attribute_path, diagnostics) {
                        decoded.insert(self.wire_name(name), wire_value);
                    }
                }
            }
        }

        for group in self.exclusive_groups() {
            let set = group
                .iter()
                .filter(|name| object.get(**name).is_some_and(|value| !value.is_null()))
                .collect::<Vec<_>>();

            if set.len() > 1 {
                diagnostics.add_attribute_warning(
                    path,
                    "Conflicting attributes",
                    format!(
                        "Only one of {group:?} should be set, but {set:?} are. All of them are rendered into the manifest."
                    ),
                );
            }
        }

        Some(Value::Object(decoded))
    }
}

impl Attribute {
    fn decode(
        &self,
        value: &Value,
        path: &AttributePath,
        diagnostics: &mut Diagnostics,
    ) -> Option<Value> {
        let decoded = match self.kind() {
            AttributeKind::String => decode_scalar(&ElementType::String, value, path, diagnostics),
            AttributeKind::Bool => decode_scalar(&ElementType::Bool, value, path, diagnostics),
            AttributeKind::Int64 => decode_scalar(&ElementType::Int64, value, path, diagnostics),
            AttributeKind::List(element) => {
                decode_element(&ElementType::list_of(element.clone()), value, path, diagnostics)
            }
            AttributeKind::Map(element) => {
                decode_element(&ElementType::map_of(element.clone()), value, path, diagnostics)
            }
            AttributeKind::SingleNested(attributes) => {
                attributes.decode_object(value, path, diagnostics)
            }
            AttributeKind::ListNested(attributes) => {
                let Some(items) = value.as_array() else {
                    type_mismatch(diagnostics, path, "list of object");
                    return None;
                };

                let decoded = items
                    .iter()
                    .enumerate()
                    .filter_map(|(index, item)| {
                        attributes.decode_object(item, &path.index(index), diagnostics)
                    })
                    .collect::<Vec<_>>();

                (decoded.len() == items.len()).then_some(Value::Array(decoded))
            }
        };

        if decoded.is_some() {
            for validator in self.validators() {
                validator.validate(path, value, diagnostics);
            }
        }

        decoded
    }
}

fn decode_scalar(
    element: &ElementType,
    value: &Value,
    path: &AttributePath,
    diagnostics: &mut Diagnostics,
) -> Option<Value> {
    let matches = match element {
        ElementType::String => value.is_string(),
        ElementType::Bool => value.is_boolean(),
        ElementType::Int64 => value.as_i64().is_some(),
        ElementType::List(_) | ElementType::Map(_) => false,
    };

    if matches {
        Some(value.clone())
    } else {
        type_mismatch(diagnostics, path, &element.to_string());
        None
    }
}

fn decode_element(
    element: &ElementType,
    value: &Value,
    path: &AttributePath,
    diagnostics: &mut Diagnostics,
) -> Option<Value> {
    match element {
        ElementType::List(inner) => {
            let Some(items) = value.as_array() else {
                type_mismatch(diagnostics, path, &element.to_string());
                return None;
            };

            let decoded = items
                .iter()
                .enumerate()
                .filter_map(|(index, item)| {
                    decode_element(inner, item, &path.index(index), diagnostics)
                })
                .collect::<Vec<_>>();

            (decoded.len() == items.len()).then_some(Value::Array(decoded))
        }
        ElementType::Map(inner) => {
            let Some(entries) = value.as_object() else {
                type_mismatch(diagnostics, path, &element.to_string());
                return None;
            };

            let decoded = entries
                .iter()
                .filter_map(|(key, item)| {
                    decode_element(inner, item, &path.key(key), diagnostics)
                        .map(|item| (key.clone(), item))
                })
                .collect::<Map<_, _>>();

            (decoded.len() == entries.len()).then_some(Value::Object(decoded))
        }
        scalar => decode_scalar(scalar, value, path, diagnostics),
    }
}

fn type_mismatch(diagnostics: &mut Diagnostics, path: &AttributePath, expected: &str) {
    let target = if path.is_root() {
        "configuration".to_owned()
    } else {
        format!("attribute {path}")
    };

    diagnostics.add_attribute_error(
        path,
        "Incorrect attribute value type",
        format!("Inappropriate value for {target}: {expected} required."),
    );
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::Validator;

    fn attributes() -> Attributes {
        Attributes::new()
            .attribute("name", Attribute::string().required())
            .attribute("replica_count", Attribute::int64())
            .attribute("paused", Attribute::boolean())
            .attribute(
                "params",
                Attribute::map(ElementType::list_of(ElementType::String)),
            )
            .attribute(
                "tolerations",
                Attribute::list_nested(
                    Attributes::new()
                        .attribute("key", Attribute::string())
                        .attribute("toleration_seconds", Attribute::int64()),
                ),
            )
            .attribute(
                "log_format",
                Attribute::string().validator(Validator::OneOf(&["logfmt", "json"])),
            )
            .attribute("ca", Attribute::string())
            .attribute("ca_file", Attribute::string())
            .attribute("yaml", Attribute::string().computed())
            .exclusive(&["ca", "ca_file"])
    }

    fn decode(value: &Value) -> (Option<Value>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let decoded = attributes().decode_object(value, &AttributePath::root(), &mut diagnostics);
        (decoded, diagnostics)
    }

    fn error_paths(diagnostics: &Diagnostics) -> Vec<String> {
        diagnostics
            .errors()
            .filter_map(|d| d.attribute.as_ref().map(ToString::to_string))
            .collect()
    }

    #[test]
    fn translates_names_and_drops_nulls() {
        let (decoded, diagnostics) = decode(&json!({
            "name": "am1",
            "replica_count": 2,
            "paused": null,
            "params": {"module": ["http_2xx"]},
            "tolerations": [{"key": "dedicated", "toleration_seconds": null}],
            "log_format": null,
            "yaml": null,
        }));

        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert_eq!(
            decoded,
            Some(json!({
                "name": "am1",
                "replicaCount": 2,
                "params": {"module": ["http_2xx"]},
                "tolerations": [{"key": "dedicated"}],
            }))
        );
    }

    #[test]
    fn reports_missing_unknown_and_computed() {
        let (_, diagnostics) = decode(&json!({
            "replicaCount": 2,
            "yaml": "apiVersion: v1",
        }));

        assert_eq!(
            error_paths(&diagnostics),
            ["replicaCount", "name", "yaml"]
        );
    }

    #[test]
    fn reports_type_mismatches_with_paths() {
        let (_, diagnostics) = decode(&json!({
            "name": 1,
            "replica_count": 1.5,
            "params": {"module": [1]},
            "tolerations": [{"key": "a"}, {"toleration_seconds": "300"}],
        }));

        assert_eq!(
            error_paths(&diagnostics),
            [
                "name",
                "replica_count",
                r#"params["module"][0]"#,
                "tolerations[1].toleration_seconds",
            ]
        );
    }

    #[test]
    fn runs_validators() {
        let (_, diagnostics) = decode(&json!({"name": "am1", "log_format": "text"}));

        assert_eq!(error_paths(&diagnostics), ["log_format"]);
    }

    #[test]
    fn exclusive_groups_only_warn() {
        let (decoded, diagnostics) = decode(&json!({
            "name": "am1",
            "ca": "secret",
            "ca_file": "/etc/ca.crt",
        }));

        assert!(!diagnostics.has_error());
        assert_eq!(diagnostics.warnings().count(), 1);
        assert_eq!(
            decoded,
            Some(json!({"name": "am1", "ca": "secret", "caFile": "/etc/ca.crt"}))
        );
    }

    #[test]
    fn rejects_non_objects() {
        let (decoded, diagnostics) = decode(&json!(["am1"]));

        assert_eq!(decoded, None);
        assert_eq!(diagnostics.errors().count(), 1);
    }
}
