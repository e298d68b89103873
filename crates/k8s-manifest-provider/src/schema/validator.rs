use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::{
    diagnostics::{AttributePath, Diagnostics},
    validation,
};

const INVALID_VALUE_SUMMARY: &str = "Invalid Attribute Value";

/// A reusable check attached to an attribute.
///
/// String validators are applied to string values, map validators to every entry of map
/// values. A validator never fails for values of a type it does not apply to, the type itself is
/// checked by the decoder.
#[derive(Clone, Debug)]
pub enum Validator {
    /// The string must be at least this many bytes long.
    MinLength(usize),

    /// The string must be one of the listed values.
    OneOf(&'static [&'static str]),

    /// The string must match the regex.
    Regex {
        regex: &'static LazyLock<Regex>,
        message: &'static str,
    },

    /// The string must be a valid object name.
    ObjectName,

    /// The string must be a valid namespace name.
    NamespaceName,

    /// The string must be an RFC 3339 timestamp.
    Timestamp,

    /// Every map key must be a qualified name and every map value a valid label value.
    Labels,

    /// Every map key must be a qualified name.
    Annotations,
}

impl Validator {
    pub fn regex(regex: &'static LazyLock<Regex>, message: &'static str) -> Self {
        Self::Regex { regex, message }
    }

    /// Runs the validator against `value`, adding an error diagnostic for every violation.
    pub fn validate(&self, path: &AttributePath, value: &Value, diagnostics: &mut Diagnostics) {
        match (self, value) {
            (Self::Labels, Value::Object(map)) => {
                for (key, value) in map {
                    let key_path = path.key(key);
                    if let Err(errors) = validation::is_qualified_name(key) {
                        report(diagnostics, &key_path, "label key", &errors);
                    }
                    if let Some(Err(errors)) = value.as_str().map(validation::is_label_value) {
                        report(diagnostics, &key_path, "label value", &errors);
                    }
                }
            }
            (Self::Annotations, Value::Object(map)) => {
                for key in map.keys() {
                    if let Err(errors) = validation::is_qualified_name(key) {
                        report(diagnostics, &path.key(key), "annotation key", &errors);
                    }
                }
            }
            (_, Value::String(value)) => {
                if let Err(errors) = self.validate_str(value) {
                    report(diagnostics, path, "value", &errors);
                }
            }
            _ => {}
        }
    }

    fn validate_str(&self, value: &str) -> Result<(), validation::Errors> {
        match self {
            Self::MinLength(min_length) => validation::has_min_length(value, *min_length),
            Self::OneOf(allowed) => validation::is_one_of(value, allowed),
            Self::Regex { regex, message } => validation::matches_regex(value, *regex, *message),
            Self::ObjectName => validation::is_object_name(value),
            Self::NamespaceName => validation::is_namespace_name(value),
            Self::Timestamp => validation::is_rfc_3339_timestamp(value),
            Self::Labels | Self::Annotations => Ok(()),
        }
    }
}

fn report(
    diagnostics: &mut Diagnostics,
    path: &AttributePath,
    what: &str,
    errors: &validation::Errors,
) {
    diagnostics.add_attribute_error(
        path,
        INVALID_VALUE_SUMMARY,
        format!("Attribute {path} {what} is invalid: {errors}"),
    );
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    static RETENTION_REGEX: LazyLock<Regex> =
        LazyLock::new(|| Regex::new("^[0-9]+(ms|s|m|h)$").expect("failed to compile test regex"));

    fn run(validator: &Validator, value: &Value) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        validator.validate(
            &AttributePath::root().attribute("spec").attribute("field"),
            value,
            &mut diagnostics,
        );
        diagnostics
    }

    #[rstest]
    #[case(Validator::MinLength(1), json!("a"), 0)]
    #[case(Validator::MinLength(1), json!(""), 1)]
    #[case(Validator::OneOf(&["logfmt", "json"]), json!("json"), 0)]
    #[case(Validator::OneOf(&["logfmt", "json"]), json!("text"), 1)]
    #[case(Validator::regex(&RETENTION_REGEX, "must be a duration"), json!("120h"), 0)]
    #[case(Validator::regex(&RETENTION_REGEX, "must be a duration"), json!("abc"), 1)]
    #[case(Validator::ObjectName, json!("am1"), 0)]
    #[case(Validator::ObjectName, json!("AM1"), 1)]
    #[case(Validator::NamespaceName, json!("monitoring"), 0)]
    #[case(Validator::NamespaceName, json!("mon.itoring"), 1)]
    #[case(Validator::Timestamp, json!("2024-01-01T00:00:00Z"), 0)]
    #[case(Validator::Timestamp, json!("now"), 1)]
    #[case(Validator::Labels, json!({"app.kubernetes.io/name": "vmalertmanager"}), 0)]
    #[case(Validator::Labels, json!({"-bad": "ok", "good": "-bad"}), 2)]
    #[case(Validator::Annotations, json!({"example.com/note": "any value is fine here!"}), 0)]
    #[case(Validator::Annotations, json!({"a/b/c": "x"}), 1)]
    fn validators(#[case] validator: Validator, #[case] value: Value, #[case] errors: usize) {
        assert_eq!(run(&validator, &value).errors().count(), errors);
    }

    #[test]
    fn validators_skip_other_types() {
        assert!(run(&Validator::MinLength(10), &json!(5)).is_empty());
        assert!(run(&Validator::Labels, &json!("not a map")).is_empty());
    }

    #[test]
    fn map_errors_point_at_the_key() {
        let diagnostics = run(&Validator::Labels, &json!({"-bad": "ok"}));
        let diagnostic = diagnostics.iter().next().expect("one diagnostic");

        assert_eq!(
            diagnostic
                .attribute
                .as_ref()
                .map(ToString::to_string)
                .as_deref(),
            Some(r#"spec.field["-bad"]"#)
        );
    }
}
