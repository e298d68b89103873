//! Types shared between several VictoriaMetrics custom resources.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{
    ConfigMapKeySelector, EmptyDirVolumeSource, PersistentVolumeClaimSpec, SecretKeySelector,
};
use serde::{Deserialize, Serialize};

use crate::schema::{Attribute, Attributes, ElementType, NestedSchema, Validator};

/// Container image settings.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_policy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl NestedSchema for Image {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "pull_policy",
                Attribute::string()
                    .description("PullPolicy describes how to pull docker image")
                    .validator(Validator::OneOf(&["Always", "IfNotPresent", "Never"])),
            )
            .attribute(
                "repository",
                Attribute::string().description("Repository contains name of docker image + it's repository if needed"),
            )
            .attribute(
                "tag",
                Attribute::string().description("Tag contains desired docker image version"),
            )
    }
}

/// Metadata applied to objects created by the operator, such as pods or claims.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedObjectMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl NestedSchema for EmbeddedObjectMetadata {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "annotations",
                Attribute::map(ElementType::String)
                    .description("Annotations is an unstructured key value map stored with a resource that may be set by external tools to store and retrieve arbitrary metadata.")
                    .validator(Validator::Annotations),
            )
            .attribute(
                "labels",
                Attribute::map(ElementType::String)
                    .description("Labels Map of string keys and values that can be used to organize and categorize (scope and select) objects.")
                    .validator(Validator::Labels),
            )
            .attribute(
                "name",
                Attribute::string()
                    .description("Name must be unique within a namespace.")
                    .validator(Validator::ObjectName),
            )
    }
}

/// Storage of a StatefulSet, either an emptyDir or a claim template.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_mount_sub_path: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_dir: Option<EmptyDirVolumeSource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_claim_template: Option<EmbeddedPersistentVolumeClaim>,
}

impl NestedSchema for StorageSpec {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "disable_mount_sub_path",
                Attribute::boolean().description("Deprecated: subPath usage will be disabled by default in a future release, this option will become unnecessary. DisableMountSubPath allows to remove any subPath usage in volume mounts."),
            )
            .attribute(
                "empty_dir",
                Attribute::nested::<EmptyDirVolumeSource>().description("EmptyDirVolumeSource to be used by the StatefulSet."),
            )
            .attribute(
                "volume_claim_template",
                Attribute::nested::<EmbeddedPersistentVolumeClaim>().description("A PVC spec to be used by the StatefulSet."),
            )
            .exclusive(&["empty_dir", "volume_claim_template"])
    }
}

/// A persistent volume claim template.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedPersistentVolumeClaim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EmbeddedObjectMetadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<PersistentVolumeClaimSpec>,
}

impl NestedSchema for EmbeddedPersistentVolumeClaim {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "metadata",
                Attribute::nested::<EmbeddedObjectMetadata>().description("EmbeddedMetadata contains metadata relevant to an EmbeddedResource."),
            )
            .attribute(
                "spec",
                Attribute::nested::<PersistentVolumeClaimSpec>().description("Spec defines the desired characteristics of a volume requested by a pod author."),
            )
    }
}

/// Pod disruption budget created for the workload.
///
/// `min_available` and `max_unavailable` are int-or-string values, they are always rendered as
/// strings.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedPodDisruptionBudgetSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_unavailable: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_available: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector_labels: Option<BTreeMap<String, String>>,
}

impl NestedSchema for EmbeddedPodDisruptionBudgetSpec {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "max_unavailable",
                Attribute::string().description("An eviction is allowed if at most 'maxUnavailable' pods selected by 'selector' are unavailable after the eviction."),
            )
            .attribute(
                "min_available",
                Attribute::string().description("An eviction is allowed if at least 'minAvailable' pods selected by 'selector' will still be available after the eviction."),
            )
            .attribute(
                "selector_labels",
                Attribute::map(ElementType::String).description("Replaces default labels selector generated by operator, it's useful when you need to create custom budget."),
            )
            .exclusive(&["max_unavailable", "min_available"])
    }
}

/// A value read from either a Secret or a ConfigMap.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecretOrConfigMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map: Option<ConfigMapKeySelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<SecretKeySelector>,
}

impl NestedSchema for SecretOrConfigMap {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "config_map",
                Attribute::nested::<ConfigMapKeySelector>().description("ConfigMap containing data to use for the targets."),
            )
            .attribute(
                "secret",
                Attribute::nested::<SecretKeySelector>().description("Secret containing data to use for the targets."),
            )
            .exclusive(&["config_map", "secret"])
    }
}

/// TLS settings used to scrape targets.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TlsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca: Option<SecretOrConfigMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert: Option<SecretOrConfigMap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure_skip_verify: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_secret: Option<SecretKeySelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_name: Option<String>,
}

impl NestedSchema for TlsConfig {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "ca",
                Attribute::nested::<SecretOrConfigMap>().description("Struct containing the CA cert to use for the targets."),
            )
            .attribute(
                "ca_file",
                Attribute::string().description("Path to the CA cert in the container to use for the targets."),
            )
            .attribute(
                "cert",
                Attribute::nested::<SecretOrConfigMap>().description("Struct containing the client cert file for the targets."),
            )
            .attribute(
                "cert_file",
                Attribute::string().description("Path to the client cert file in the container for the targets."),
            )
            .attribute(
                "insecure_skip_verify",
                Attribute::boolean().description("Disable target certificate validation."),
            )
            .attribute(
                "key_file",
                Attribute::string().description("Path to the client key file in the container for the targets."),
            )
            .attribute(
                "key_secret",
                Attribute::nested::<SecretKeySelector>().description("Secret containing the client key file for the targets."),
            )
            .attribute(
                "server_name",
                Attribute::string().description("Used to verify the hostname for the targets."),
            )
            .exclusive(&["ca", "ca_file"])
            .exclusive(&["cert", "cert_file"])
            .exclusive(&["key_file", "key_secret"])
    }
}

/// HTTP basic authentication credentials.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicAuth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretKeySelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<SecretKeySelector>,
}

impl NestedSchema for BasicAuth {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "password",
                Attribute::nested::<SecretKeySelector>().description("Password defines reference for secret with password value"),
            )
            .attribute(
                "password_file",
                Attribute::string().description("PasswordFile defines path to password file at disk must be pre-mounted"),
            )
            .attribute(
                "username",
                Attribute::nested::<SecretKeySelector>().description("Username defines reference for secret with username value"),
            )
            .exclusive(&["password", "password_file"])
    }
}

/// Generic `Authorization` header configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Authorization {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<SecretKeySelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
}

impl NestedSchema for Authorization {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "credentials",
                Attribute::nested::<SecretKeySelector>().description("Reference to the secret with value for authorization"),
            )
            .attribute(
                "credentials_file",
                Attribute::string().description("File with value for authorization"),
            )
            .attribute(
                "type",
                Attribute::string().description("Type of authorization, default to bearer"),
            )
            .exclusive(&["credentials", "credentials_file"])
    }
}

/// OAuth2 client credentials flow.
///
/// The upstream type uses snake_case keys.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct OAuth2 {
    pub client_id: SecretOrConfigMap,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<SecretKeySelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_params: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scopes: Option<Vec<String>>,

    pub token_url: String,
}

impl NestedSchema for OAuth2 {
    fn attributes() -> Attributes {
        Attributes::new()
            .keep_wire_names()
            .attribute(
                "client_id",
                Attribute::nested::<SecretOrConfigMap>()
                    .required()
                    .description("The secret or configmap containing the OAuth2 client id"),
            )
            .attribute(
                "client_secret",
                Attribute::nested::<SecretKeySelector>().description("The secret containing the OAuth2 client secret"),
            )
            .attribute(
                "client_secret_file",
                Attribute::string().description("ClientSecretFile defines path for client secret file."),
            )
            .attribute(
                "endpoint_params",
                Attribute::map(ElementType::String).description("Parameters to append to the token URL"),
            )
            .attribute(
                "scopes",
                Attribute::list(ElementType::String).description("OAuth2 scopes used for the token request"),
            )
            .attribute(
                "token_url",
                Attribute::string()
                    .required()
                    .description("The URL to fetch the token from")
                    .validator(Validator::MinLength(1)),
            )
            .exclusive(&["client_secret", "client_secret_file"])
    }
}

/// A relabeling rule, applied to targets or scraped samples.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelabelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#if: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#match: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modulus: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_labels: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_label: Option<String>,
}

impl NestedSchema for RelabelConfig {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "action",
                Attribute::string().description("Action to perform based on regex matching. Default is 'replace'"),
            )
            .attribute(
                "if",
                Attribute::string().description("If represents metricsQL match expression."),
            )
            .attribute(
                "labels",
                Attribute::map(ElementType::String).description("Labels is used together with Match for 'action: graphite'"),
            )
            .attribute(
                "match",
                Attribute::string().description("Match is used together with Labels for 'action: graphite'"),
            )
            .attribute(
                "modulus",
                Attribute::int64().description("Modulus to take of the hash of the source label values."),
            )
            .attribute(
                "regex",
                Attribute::string().description("Regular expression against which the extracted value is matched. Default is '(.*)'"),
            )
            .attribute(
                "replacement",
                Attribute::string().description("Replacement value against which a regex replace is performed if the regular expression matches. Regex capture groups are available. Default is '$1'"),
            )
            .attribute(
                "separator",
                Attribute::string().description("Separator placed between concatenated source label values. default is ';'."),
            )
            .attribute(
                "source_labels",
                Attribute::list(ElementType::String).description("The source labels select values from existing labels. Their content is concatenated using the configured separator and matched against the configured regular expression for the replace, keep, and drop actions."),
            )
            .attribute(
                "target_label",
                Attribute::string().description("Label to which the resulting value is written in a replace action. It is mandatory for replace actions. Regex capture groups are available."),
            )
    }
}
