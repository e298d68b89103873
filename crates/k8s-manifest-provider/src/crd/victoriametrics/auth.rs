use std::collections::BTreeMap;

use k8s_openapi::{
    api::core::v1::{
        EnvVar, LocalObjectReference, ResourceRequirements, SecretKeySelector, Toleration,
    },
    apimachinery::pkg::apis::meta::v1::LabelSelector,
};
use serde::{Deserialize, Serialize};

use crate::{
    crd::victoriametrics::{
        GROUP, VERSION,
        common::{EmbeddedObjectMetadata, EmbeddedPodDisruptionBudgetSpec, Image},
    },
    manifest::ManifestKind,
    schema::{Attribute, Attributes, ElementType, NestedSchema, Validator},
};

const LOG_FORMATS: &[&str] = &["default", "json"];
const LOG_LEVELS: &[&str] = &["INFO", "WARN", "ERROR", "FATAL", "PANIC"];
const LOAD_BALANCING_POLICIES: &[&str] = &["least_loaded", "first_available"];

/// The `VMAuth` custom resource, which runs an authenticating proxy in front of VictoriaMetrics
/// components.
pub struct VmAuth;

impl ManifestKind for VmAuth {
    type Spec = VmAuthSpec;

    const DESCRIPTION: &'static str = "VMAuth is the Schema for the vmauths API";
    const GROUP: &'static str = GROUP;
    const KIND: &'static str = "VMAuth";
    const VERSION: &'static str = VERSION;
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VmAuthSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_args: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_envs: Option<Vec<EnvVar>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_secrets: Option<Vec<LocalObjectReference>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress: Option<EmbeddedIngress>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<License>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_selector: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_disruption_budget: Option<EmbeddedPodDisruptionBudgetSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_metadata: Option<EmbeddedObjectMetadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_class_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replica_count: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select_all_by_default: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_grace_period_seconds: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerations: Option<Vec<Toleration>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unauthorized_access_config: Option<UnauthorizedAccessConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_default_resources: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_namespace_selector: Option<LabelSelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_selector: Option<LabelSelector>,
}

impl NestedSchema for VmAuthSpec {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "config_secret",
                Attribute::string().description("ConfigSecret is the name of a Kubernetes Secret in the same namespace as the VMAuth object, which contains auth configuration for vmauth, configuration must be inside secret key: config.yaml. It must be created and managed manually."),
            )
            .attribute(
                "extra_args",
                Attribute::map(ElementType::String).description("ExtraArgs that will be passed to the application container for example remoteWrite.tmpDataPath: /tmp"),
            )
            .attribute(
                "extra_envs",
                Attribute::list_of::<EnvVar>().description("ExtraEnvs that will be passed to the application container"),
            )
            .attribute(
                "image",
                Attribute::nested::<Image>().description("Image - docker image settings if no specified operator uses default version from operator config"),
            )
            .attribute(
                "image_pull_secrets",
                Attribute::list_of::<LocalObjectReference>().description("ImagePullSecrets An optional list of references to secrets in the same namespace to use for pulling images from registries"),
            )
            .attribute(
                "ingress",
                Attribute::nested::<EmbeddedIngress>().description("Ingress enables ingress configuration for VMAuth."),
            )
            .attribute(
                "license",
                Attribute::nested::<License>().description("License allows to configure license key to be used for enterprise features."),
            )
            .attribute(
                "log_format",
                Attribute::string()
                    .description("LogFormat for VMAuth to be configured with.")
                    .validator(Validator::OneOf(LOG_FORMATS)),
            )
            .attribute(
                "log_level",
                Attribute::string()
                    .description("LogLevel for victoria metrics single to be configured with.")
                    .validator(Validator::OneOf(LOG_LEVELS)),
            )
            .attribute(
                "node_selector",
                Attribute::map(ElementType::String).description("NodeSelector Define which Nodes the Pods are scheduled on."),
            )
            .attribute(
                "paused",
                Attribute::boolean().description("Paused If set to true all actions on the underlying managed objects are not going to be performed, except for delete actions."),
            )
            .attribute(
                "pod_disruption_budget",
                Attribute::nested::<EmbeddedPodDisruptionBudgetSpec>().description("PodDisruptionBudget created by operator"),
            )
            .attribute(
                "pod_metadata",
                Attribute::nested::<EmbeddedObjectMetadata>().description("PodMetadata configures Labels and Annotations which are propagated to the VMAuth pods."),
            )
            .attribute(
                "port",
                Attribute::string().description("Port listen address"),
            )
            .attribute(
                "priority_class_name",
                Attribute::string().description("PriorityClassName class assigned to the Pods"),
            )
            .attribute(
                "replica_count",
                Attribute::int64().description("ReplicaCount is the expected size of the Application."),
            )
            .attribute(
                "resources",
                Attribute::nested::<ResourceRequirements>().description("Resources container resource request and limits, if operator uses default values."),
            )
            .attribute(
                "select_all_by_default",
                Attribute::boolean().description("SelectAllByDefault changes default behavior for empty CRD selectors, such userSelector. with selectAllByDefault: true and empty userSelector and userNamespaceSelector Operator selects all exist users"),
            )
            .attribute(
                "service_account_name",
                Attribute::string().description("ServiceAccountName is the name of the ServiceAccount to use to run the pods"),
            )
            .attribute(
                "termination_grace_period_seconds",
                Attribute::int64().description("TerminationGracePeriodSeconds period for container graceful termination"),
            )
            .attribute(
                "tolerations",
                Attribute::list_of::<Toleration>().description("Tolerations If specified, the pod's tolerations."),
            )
            .attribute(
                "unauthorized_access_config",
                Attribute::nested::<UnauthorizedAccessConfig>().description("UnauthorizedAccessConfig configures access for un authorized users"),
            )
            .attribute(
                "use_default_resources",
                Attribute::boolean().description("UseDefaultResources controls resource settings. By default, operator sets built-in resource requirements"),
            )
            .attribute(
                "user_namespace_selector",
                Attribute::nested::<LabelSelector>().description("UserNamespaceSelector Namespaces to be selected for VMAuth discovery. Works in combination with Selector."),
            )
            .attribute(
                "user_selector",
                Attribute::nested::<LabelSelector>().description("UserSelector defines VMUser to be selected for config file generation. Works in combination with NamespaceSelector."),
            )
    }
}

/// Ingress created in front of the VMAuth service.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedIngress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_hosts: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_secret_name: Option<String>,
}

impl NestedSchema for EmbeddedIngress {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "annotations",
                Attribute::map(ElementType::String)
                    .description("Annotations is an unstructured key value map stored with a resource that may be set by external tools to store and retrieve arbitrary metadata.")
                    .validator(Validator::Annotations),
            )
            .attribute(
                "class_name",
                Attribute::string().description("ClassName defines ingress class name for VMAuth"),
            )
            .attribute(
                "host",
                Attribute::string().description("Host defines ingress host parameter for default rule It will be used, only if TlsHosts is empty"),
            )
            .attribute(
                "labels",
                Attribute::map(ElementType::String)
                    .description("Labels Map of string keys and values that can be used to organize and categorize (scope and select) objects.")
                    .validator(Validator::Labels),
            )
            .attribute(
                "paths",
                Attribute::list(ElementType::String).description("Paths defines ingress paths parameter for default rule"),
            )
            .attribute(
                "tls_hosts",
                Attribute::list(ElementType::String).description("TlsHosts configures TLS access for ingress, tlsSecretName must be defined for it."),
            )
            .attribute(
                "tls_secret_name",
                Attribute::string().description("TlsSecretName defines secretname at the VMAuth namespace with cert and key"),
            )
    }
}

/// Enterprise license, given inline or as a secret reference.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_ref: Option<SecretKeySelector>,
}

impl NestedSchema for License {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "key",
                Attribute::string().description("Enterprise license key. This flag is available only in VictoriaMetrics enterprise."),
            )
            .attribute(
                "key_ref",
                Attribute::nested::<SecretKeySelector>().description("KeyRef is reference to secret with license key for enterprise features."),
            )
            .exclusive(&["key", "key_ref"])
    }
}

/// Routing for requests without credentials. The upstream type uses snake_case keys.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct UnauthorizedAccessConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_url: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_src_path_prefix_parts: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_filters: Option<IpFilters>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancing_policy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_status_codes: Option<Vec<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_insecure_skip_verify: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_map: Option<Vec<UrlMap>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_prefix: Option<Vec<String>>,
}

impl NestedSchema for UnauthorizedAccessConfig {
    fn attributes() -> Attributes {
        Attributes::new()
            .keep_wire_names()
            .attribute(
                "default_url",
                Attribute::list(ElementType::String).description("DefaultURLs backend url for non-matching paths filter usually used for default backend with error message"),
            )
            .attribute(
                "drop_src_path_prefix_parts",
                Attribute::int64().description("DropSrcPathPrefixParts is the number of '/'-delimited request path prefix parts to drop before proxying the request to backend."),
            )
            .attribute(
                "headers",
                Attribute::list(ElementType::String).description("Headers represent additional http headers, that vmauth uses in form of ['header_key: header_value'] multiple values for header key: ['header_key: value1,value2']"),
            )
            .attribute(
                "ip_filters",
                Attribute::nested::<IpFilters>().description("IPFilters defines per target src ip filters"),
            )
            .attribute(
                "load_balancing_policy",
                Attribute::string()
                    .description("LoadBalancingPolicy defines load balancing policy to use for backend urls.")
                    .validator(Validator::OneOf(LOAD_BALANCING_POLICIES)),
            )
            .attribute(
                "response_headers",
                Attribute::list(ElementType::String).description("ResponseHeaders represent additional http headers, that vmauth adds for request response in form of ['header_key: header_value']"),
            )
            .attribute(
                "retry_status_codes",
                Attribute::list(ElementType::Int64).description("RetryStatusCodes defines http status codes in numeric format for request retries"),
            )
            .attribute(
                "tls_insecure_skip_verify",
                Attribute::boolean().description("TLSInsecureSkipVerify - whether to skip TLS verification when connecting to backend over HTTPS."),
            )
            .attribute(
                "url_map",
                Attribute::list_of::<UrlMap>().description("URLMap is a list of url routes for unauthorized users"),
            )
            .attribute(
                "url_prefix",
                Attribute::list(ElementType::String).description("URLPrefix defines prefix prefix for destination"),
            )
            .exclusive(&["url_map", "url_prefix"])
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct IpFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_list: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny_list: Option<Vec<String>>,
}

impl NestedSchema for IpFilters {
    fn attributes() -> Attributes {
        Attributes::new()
            .keep_wire_names()
            .attribute("allow_list", Attribute::list(ElementType::String))
            .attribute("deny_list", Attribute::list(ElementType::String))
    }
}

/// A single routing rule of [`UnauthorizedAccessConfig`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct UrlMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_src_path_prefix_parts: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancing_policy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_status_codes: Option<Vec<i64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_hosts: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_paths: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_prefix: Option<Vec<String>>,
}

impl NestedSchema for UrlMap {
    fn attributes() -> Attributes {
        Attributes::new()
            .keep_wire_names()
            .attribute(
                "drop_src_path_prefix_parts",
                Attribute::int64().description("DropSrcPathPrefixParts is the number of '/'-delimited request path prefix parts to drop before proxying the request to backend."),
            )
            .attribute(
                "headers",
                Attribute::list(ElementType::String).description("RequestHeaders represent additional http headers, that vmauth uses in form of ['header_key: header_value']"),
            )
            .attribute(
                "load_balancing_policy",
                Attribute::string()
                    .description("LoadBalancingPolicy defines load balancing policy to use for backend urls.")
                    .validator(Validator::OneOf(LOAD_BALANCING_POLICIES)),
            )
            .attribute(
                "response_headers",
                Attribute::list(ElementType::String).description("ResponseHeaders represent additional http headers, that vmauth adds for request response"),
            )
            .attribute(
                "retry_status_codes",
                Attribute::list(ElementType::Int64).description("RetryStatusCodes defines http status codes in numeric format for request retries"),
            )
            .attribute(
                "src_hosts",
                Attribute::list(ElementType::String).description("SrcHosts is an optional list of regular expressions, which must match the request hostname."),
            )
            .attribute(
                "src_paths",
                Attribute::list(ElementType::String).description("SrcPaths is an optional list of regular expressions, which must match the request path."),
            )
            .attribute(
                "url_prefix",
                Attribute::list(ElementType::String).description("UrlPrefix contains backend url prefixes for the proxied request url."),
            )
    }
}
