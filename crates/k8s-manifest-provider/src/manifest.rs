//! The typed manifest record shared by every resource kind.
//!
//! A [`ManifestConfig`] holds what a user configured (metadata and spec). A [`Manifest`] is the
//! rendered object: the configuration plus the `apiVersion` and `kind` constants of its
//! [`ManifestKind`].

use std::collections::BTreeMap;

use convert_case::{Case, Casing};
use k8s_manifest_shared::yaml::{self, SerializeOptions};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use snafu::{ResultExt, Snafu};
use tracing::debug;

use crate::schema::{Attribute, Attributes, ElementType, NestedSchema, Validator};

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to decode configuration into {kind} manifest"))]
    DecodeConfiguration {
        source: serde_json::Error,
        kind: &'static str,
    },

    #[snafu(display("failed to serialize {kind} manifest as YAML"))]
    SerializeManifest { source: yaml::Error, kind: String },
}

/// A custom resource kind which can be rendered as a manifest.
pub trait ManifestKind: Send + Sync + 'static {
    /// The API group, for example `operator.victoriametrics.com`.
    const GROUP: &'static str;

    /// The API version within [`Self::GROUP`], for example `v1beta1`.
    const VERSION: &'static str;

    /// The kind, for example `VMAlertmanager`.
    const KIND: &'static str;

    /// Human readable description of the data source.
    const DESCRIPTION: &'static str;

    /// The model of the `spec` field.
    type Spec: Serialize + DeserializeOwned + NestedSchema;

    /// Returns `<group>/<version>`.
    fn api_version() -> String {
        format!("{group}/{version}", group = Self::GROUP, version = Self::VERSION)
    }

    /// Returns the data source type name for the given provider prefix.
    ///
    /// ```
    /// use k8s_manifest_provider::{crd::victoriametrics::VmAlertmanager, manifest::ManifestKind};
    ///
    /// assert_eq!(
    ///     VmAlertmanager::type_name("k8s"),
    ///     "k8s_operator_victoriametrics_com_vm_alertmanager_v1beta1_manifest"
    /// );
    /// ```
    fn type_name(prefix: &str) -> String {
        format!(
            "{prefix}_{group}_{kind}_{version}_manifest",
            group = Self::GROUP.replace('.', "_"),
            kind = Self::KIND.to_case(Case::Snake),
            version = Self::VERSION,
        )
    }
}

/// The subset of Kubernetes object metadata which can be configured.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    pub name: String,
    pub namespace: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

impl NestedSchema for ObjectMetadata {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "name",
                Attribute::string()
                    .required()
                    .description("Unique identifier for this object within the namespace.")
                    .validator(Validator::MinLength(1))
                    .validator(Validator::ObjectName),
            )
            .attribute(
                "namespace",
                Attribute::string()
                    .required()
                    .description("Namespace of the object. Must be a valid DNS label.")
                    .validator(Validator::NamespaceName),
            )
            .attribute(
                "labels",
                Attribute::map(ElementType::String)
                    .description("Map of string keys and values that can be used to organize and categorize objects.")
                    .validator(Validator::Labels),
            )
            .attribute(
                "annotations",
                Attribute::map(ElementType::String)
                    .description("Unstructured key value map stored with a resource that may be set by external tools to store and retrieve arbitrary metadata.")
                    .validator(Validator::Annotations),
            )
    }
}

/// The user supplied part of a manifest.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestConfig<S> {
    pub metadata: ObjectMetadata,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<S>,
}

impl<S> ManifestConfig<S>
where
    S: DeserializeOwned,
{
    /// Deserializes a configuration which was already decoded into wire names.
    pub fn from_wire<K>(value: Value) -> Result<Self>
    where
        K: ManifestKind<Spec = S>,
    {
        serde_json::from_value(value).context(DecodeConfigurationSnafu { kind: K::KIND })
    }
}

/// A complete manifest, ready to be serialized.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest<S> {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMetadata,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<S>,
}

impl<S> Manifest<S>
where
    S: Serialize,
{
    /// Builds the manifest of `config`, using the constants of `K`.
    pub fn new<K>(config: ManifestConfig<S>) -> Self
    where
        K: ManifestKind<Spec = S>,
    {
        let ManifestConfig { metadata, spec } = config;

        Self {
            api_version: K::api_version(),
            kind: K::KIND.to_owned(),
            metadata,
            spec,
        }
    }

    /// Serializes the manifest as a single YAML document.
    pub fn to_yaml(&self) -> Result<String> {
        debug!(
            kind = %self.kind,
            name = %self.metadata.name,
            namespace = %self.metadata.namespace,
            "serializing manifest"
        );

        yaml::to_string(self, SerializeOptions::default())
            .with_context(|_| SerializeManifestSnafu { kind: &self.kind })
    }
}
