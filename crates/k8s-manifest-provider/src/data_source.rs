//! Read-only data sources rendering custom resources as manifests.

use std::marker::PhantomData;

use serde_json::Value;
use snafu::Report;
use tracing::{debug, instrument};

use crate::{
    diagnostics::Diagnostics,
    manifest::{self, Manifest, ManifestConfig, ManifestKind, ObjectMetadata},
    schema::{Attribute, Attributes, Schema},
};

/// Name of the computed attribute holding the rendered manifest.
pub const YAML_ATTRIBUTE: &str = "yaml";

/// The result of [`DataSource::read`].
#[derive(Debug, Default)]
pub struct ReadResponse {
    /// The echoed configuration with the computed attributes set. [`None`] if any error occurred.
    pub state: Option<Value>,
    pub diagnostics: Diagnostics,
}

impl ReadResponse {
    /// Returns the rendered manifest of a successful read.
    pub fn yaml(&self) -> Option<&str> {
        self.state.as_ref()?.get(YAML_ATTRIBUTE)?.as_str()
    }
}

/// A data source of the provider.
pub trait DataSource: Send + Sync {
    /// Returns the full type name, like `k8s_operator_victoriametrics_com_vm_auth_v1beta1_manifest`.
    fn type_name(&self, prefix: &str) -> String;

    fn schema(&self) -> &Schema;

    /// Validates `config` without reading.
    fn validate_config(&self, config: &Value) -> Diagnostics;

    fn read(&self, config: &Value) -> ReadResponse;
}

/// Renders the custom resource `K` as a manifest.
pub struct ManifestDataSource<K> {
    schema: Schema,
    kind: PhantomData<fn() -> K>,
}

impl<K: ManifestKind> ManifestDataSource<K> {
    pub fn new() -> Self {
        let attributes = Attributes::new()
            .attribute(
                "metadata",
                Attribute::nested::<ObjectMetadata>()
                    .required()
                    .description("Data that helps uniquely identify the object."),
            )
            .attribute(
                "spec",
                Attribute::nested::<K::Spec>()
                    .description("The specification of the desired state of the resource."),
            )
            .attribute(
                YAML_ATTRIBUTE,
                Attribute::string()
                    .computed()
                    .description("The generated manifest in YAML format."),
            );

        Self {
            schema: Schema::new(K::DESCRIPTION, attributes),
            kind: PhantomData,
        }
    }

    /// Decodes `config`, returning [`None`] if an error diagnostic was added.
    fn decode(&self, config: &Value, diagnostics: &mut Diagnostics) -> Option<Value> {
        let decoded = self.schema.decode(config, diagnostics)?;
        (!diagnostics.has_error()).then_some(decoded)
    }
}

impl<K: ManifestKind> Default for ManifestDataSource<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ManifestKind> DataSource for ManifestDataSource<K> {
    fn type_name(&self, prefix: &str) -> String {
        K::type_name(prefix)
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    #[instrument(skip_all, fields(kind = K::KIND))]
    fn validate_config(&self, config: &Value) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        self.schema.decode(config, &mut diagnostics);
        debug!(diagnostics = diagnostics.len(), "validated configuration");
        diagnostics
    }

    #[instrument(skip_all, fields(kind = K::KIND))]
    fn read(&self, config: &Value) -> ReadResponse {
        let mut diagnostics = Diagnostics::new();

        let Some(decoded) = self.decode(config, &mut diagnostics) else {
            debug!("configuration is invalid, skipping read");
            return ReadResponse {
                state: None,
                diagnostics,
            };
        };

        let state = match render::<K>(decoded) {
            Ok(yaml) => {
                let mut state = config.clone();
                if let Value::Object(object) = &mut state {
                    object.insert(YAML_ATTRIBUTE.to_owned(), Value::String(yaml));
                }
                Some(state)
            }
            Err(error) => {
                diagnostics.add_error(
                    "Unable to marshal manifest",
                    Report::from_error(error).to_string(),
                );
                None
            }
        };

        ReadResponse { state, diagnostics }
    }
}

fn render<K: ManifestKind>(decoded: Value) -> Result<String, manifest::Error> {
    let config = ManifestConfig::<K::Spec>::from_wire::<K>(decoded)?;
    Manifest::new::<K>(config).to_yaml()
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rstest::rstest;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::*;
    use crate::schema::NestedSchema;

    #[derive(Clone, Debug, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct ExampleSpec {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        log_format: Option<String>,
    }

    impl NestedSchema for ExampleSpec {
        fn attributes() -> Attributes {
            Attributes::new().attribute(
                "log_format",
                Attribute::string()
                    .validator(crate::schema::Validator::OneOf(&["logfmt", "json"])),
            )
        }
    }

    struct Example;

    impl ManifestKind for Example {
        type Spec = ExampleSpec;

        const DESCRIPTION: &'static str = "Example";
        const GROUP: &'static str = "example.com";
        const KIND: &'static str = "Example";
        const VERSION: &'static str = "v1";
    }

    fn data_source() -> ManifestDataSource<Example> {
        ManifestDataSource::new()
    }

    #[test]
    fn read_echoes_configuration() {
        let config = json!({
            "metadata": {"name": "am1", "namespace": "monitoring", "labels": null},
            "spec": {"log_format": "json"},
        });

        let response = data_source().read(&config);

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        let state = response.state.as_ref().expect("read succeeds");
        assert_eq!(state["metadata"], config["metadata"]);
        assert_eq!(state["spec"], config["spec"]);
        assert_eq!(
            response.yaml(),
            Some(indoc! {"
                apiVersion: example.com/v1
                kind: Example
                metadata:
                  name: am1
                  namespace: monitoring
                spec:
                  logFormat: json
            "})
        );
    }

    #[rstest]
    #[case(json!({"metadata": {"name": "am1", "namespace": "monitoring"}, "spec": {"log_format": "text"}}))]
    #[case(json!({"metadata": {"name": "am1"}}))]
    #[case(json!({"metadata": {"name": "am1", "namespace": "monitoring"}, "yaml": "kind: Example"}))]
    #[case(json!({"metadata": {"name": "am1", "namespace": "monitoring"}, "status": {}}))]
    #[case(json!("am1"))]
    fn read_rejects_invalid_configuration(#[case] config: Value) {
        let response = data_source().read(&config);

        assert!(response.state.is_none());
        assert!(response.diagnostics.has_error());
    }

    #[test]
    fn validate_config_matches_read() {
        let config = json!({"metadata": {"name": "", "namespace": "monitoring"}});

        let diagnostics = data_source().validate_config(&config);
        let response = data_source().read(&config);

        assert_eq!(diagnostics, response.diagnostics);
        assert_eq!(diagnostics.errors().count(), 2);
    }

    #[test]
    fn schema_declares_computed_yaml() {
        let data_source = data_source();
        let yaml = data_source
            .schema()
            .attributes()
            .get(YAML_ATTRIBUTE)
            .expect("yaml is declared");

        assert!(yaml.mode().is_computed());
        assert_eq!(
            data_source.type_name("k8s"),
            "k8s_example_com_example_v1_manifest"
        );
    }

    #[derive(Clone, Debug, Default, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct DriftedSpec {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        replica_count: Option<String>,
    }

    impl NestedSchema for DriftedSpec {
        fn attributes() -> Attributes {
            Attributes::new().attribute("replica_count", Attribute::int64())
        }
    }

    struct Drifted;

    impl ManifestKind for Drifted {
        type Spec = DriftedSpec;

        const DESCRIPTION: &'static str = "Drifted";
        const GROUP: &'static str = "example.com";
        const KIND: &'static str = "Drifted";
        const VERSION: &'static str = "v1";
    }

    #[test]
    fn read_failure_writes_no_state() {
        let config = json!({
            "metadata": {"name": "am1", "namespace": "monitoring"},
            "spec": {"replica_count": 1},
        });

        let response = ManifestDataSource::<Drifted>::new().read(&config);

        assert!(response.state.is_none());
        assert_eq!(response.diagnostics.len(), 1);

        let error = response
            .diagnostics
            .errors()
            .next()
            .expect("one error diagnostic");
        assert_eq!(error.summary, "Unable to marshal manifest");
        assert!(
            error
                .detail
                .contains("failed to decode configuration into Drifted manifest"),
            "{}",
            error.detail
        );
    }
}
