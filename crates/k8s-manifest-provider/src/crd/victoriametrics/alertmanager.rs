use std::{collections::BTreeMap, sync::LazyLock};

use k8s_openapi::{
    api::core::v1::{
        EnvVar, LocalObjectReference, ResourceRequirements, SecretKeySelector, Toleration,
        VolumeMount,
    },
    apimachinery::pkg::apis::meta::v1::LabelSelector,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    crd::victoriametrics::{
        GROUP, VERSION,
        common::{EmbeddedObjectMetadata, EmbeddedPodDisruptionBudgetSpec, Image, StorageSpec},
    },
    manifest::ManifestKind,
    schema::{Attribute, Attributes, ElementType, NestedSchema, Validator},
};

static RETENTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^[0-9]+(ms|s|m|h)$").expect("failed to compile retention regex")
});

const LOG_FORMATS: &[&str] = &["logfmt", "json"];
const LOG_LEVELS: &[&str] = &["debug", "info", "warn", "error"];
const CLIENT_AUTH_TYPES: &[&str] = &[
    "NoClientCert",
    "RequestClientCert",
    "RequireAnyClientCert",
    "VerifyClientCertIfGiven",
    "RequireAndVerifyClientCert",
];

/// The `VMAlertmanager` custom resource, which runs an Alertmanager cluster.
pub struct VmAlertmanager;

impl ManifestKind for VmAlertmanager {
    type Spec = VmAlertmanagerSpec;

    const DESCRIPTION: &'static str = "VMAlertmanager represents Victoria-Metrics deployment for Alertmanager.";
    const GROUP: &'static str = GROUP;
    const KIND: &'static str = "VMAlertmanager";
    const VERSION: &'static str = VERSION;
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VmAlertmanagerSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_advertise_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_domain_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_maps: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_namespace_selector: Option<LabelSelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_raw_yaml: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_selector: Option<LabelSelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_namespace_matcher: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_route_continue_enforce: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns_policy: Option<String>,

    #[serde(rename = "externalURL", default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_args: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_envs: Option<Vec<EnvVar>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_network: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_secrets: Option<Vec<LocalObjectReference>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen_local: Option<bool>,

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
    pub port_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority_class_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replica_count: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequirements>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retention: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secrets: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select_all_by_default: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_grace_period_seconds: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tolerations: Option<Vec<Toleration>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_default_resources: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_mounts: Option<Vec<VolumeMount>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_config: Option<AlertmanagerWebConfig>,
}

impl NestedSchema for VmAlertmanagerSpec {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "cluster_advertise_address",
                Attribute::string().description("ClusterAdvertiseAddress is the explicit address to advertise in cluster. Needs to be provided for non RFC1918 (public) addresses."),
            )
            .attribute(
                "cluster_domain_name",
                Attribute::string().description("ClusterDomainName defines domain name suffix for in-cluster dns addresses aka .cluster.local used to build pod peer addresses for in-cluster communication"),
            )
            .attribute(
                "config_maps",
                Attribute::list(ElementType::String).description("ConfigMaps is a list of ConfigMaps in the same namespace as the VMAlertmanager object, which shall be mounted into the VMAlertmanager Pods."),
            )
            .attribute(
                "config_namespace_selector",
                Attribute::nested::<LabelSelector>().description("ConfigNamespaceSelector defines namespace selector for VMAlertmanagerConfig discovery. Works in combination with Selector."),
            )
            .attribute(
                "config_raw_yaml",
                Attribute::string().description("ConfigRawYaml - raw configuration for alertmanager, it helps it to start without secret. priority -> hardcoded ConfigRaw -> ConfigRaw, provided by user -> ConfigSecret."),
            )
            .attribute(
                "config_secret",
                Attribute::string().description("ConfigSecret is the name of a Kubernetes Secret in the same namespace as the VMAlertmanager object, which contains configuration for this VMAlertmanager, configuration must be inside secret key: alertmanager.yaml."),
            )
            .attribute(
                "config_selector",
                Attribute::nested::<LabelSelector>().description("ConfigSelector defines selector for VMAlertmanagerConfig, result config will be merged with with Raw or Secret config."),
            )
            .attribute(
                "disable_namespace_matcher",
                Attribute::boolean().description("DisableNamespaceMatcher disables top route namespace label matcher for VMAlertmanagerConfig. It may be useful if alert doesn't have namespace label for some reason"),
            )
            .attribute(
                "disable_route_continue_enforce",
                Attribute::boolean().description("DisableRouteContinueEnforce cancel the behavior for VMAlertmanagerConfig that always enforce first-level route continue to true"),
            )
            .attribute(
                "dns_policy",
                Attribute::string().description("DNSPolicy sets DNS policy for the pod"),
            )
            .attribute(
                "external_url",
                Attribute::string()
                    .wire_name("externalURL")
                    .description("ExternalURL the VMAlertmanager instances will be available under. This is necessary to generate correct URLs. This is necessary if VMAlertmanager is not served from root of a DNS name."),
            )
            .attribute(
                "extra_args",
                Attribute::map(ElementType::String).description("ExtraArgs that will be passed to VMAlertmanager pod for example log.level: debug"),
            )
            .attribute(
                "extra_envs",
                Attribute::list_of::<EnvVar>().description("ExtraEnvs that will be added to VMAlertmanager pod"),
            )
            .attribute(
                "host_network",
                Attribute::boolean().description("HostNetwork controls whether the pod may use the node network namespace"),
            )
            .attribute(
                "image",
                Attribute::nested::<Image>().description("Image - docker image settings for VMAlertmanager if no specified operator uses default config version"),
            )
            .attribute(
                "image_pull_secrets",
                Attribute::list_of::<LocalObjectReference>().description("ImagePullSecrets An optional list of references to secrets in the same namespace to use for pulling images from registries"),
            )
            .attribute(
                "listen_local",
                Attribute::boolean().description("ListenLocal makes the VMAlertmanager server listen on loopback, so that it does not bind against the Pod IP. Note this is only for the VMAlertmanager UI, not the gossip communication."),
            )
            .attribute(
                "log_format",
                Attribute::string()
                    .description("LogFormat for VMAlertmanager to be configured with.")
                    .validator(Validator::OneOf(LOG_FORMATS)),
            )
            .attribute(
                "log_level",
                Attribute::string()
                    .description("Log level for VMAlertmanager to be configured with.")
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
                Attribute::nested::<EmbeddedObjectMetadata>().description("PodMetadata configures Labels and Annotations which are propagated to the VMAlertmanager pods."),
            )
            .attribute(
                "port_name",
                Attribute::string().description("PortName used for the pods and governing service. This defaults to web"),
            )
            .attribute(
                "priority_class_name",
                Attribute::string().description("PriorityClassName class assigned to the Pods"),
            )
            .attribute(
                "replica_count",
                Attribute::int64().description("ReplicaCount is the expected size of the VMAlertmanager cluster. The controller will eventually make the size of the running cluster equal to the expected size."),
            )
            .attribute(
                "resources",
                Attribute::nested::<ResourceRequirements>().description("Resources container resource request and limits, if operator uses default values."),
            )
            .attribute(
                "retention",
                Attribute::string()
                    .description("Retention Time duration VMAlertmanager shall retain data for. Default is '120h', and must match the regular expression [0-9]+(ms|s|m|h) (milliseconds seconds minutes hours).")
                    .validator(Validator::regex(&RETENTION_REGEX, "must be a duration in milliseconds, seconds, minutes or hours")),
            )
            .attribute(
                "route_prefix",
                Attribute::string().description("RoutePrefix VMAlertmanager registers HTTP handlers for. This is useful, if using ExternalURL and a proxy is rewriting HTTP routes of a request, and the actual ExternalURL is still true, but the server serves requests under a different route prefix."),
            )
            .attribute(
                "secrets",
                Attribute::list(ElementType::String).description("Secrets is a list of Secrets in the same namespace as the VMAlertmanager object, which shall be mounted into the VMAlertmanager Pods."),
            )
            .attribute(
                "select_all_by_default",
                Attribute::boolean().description("SelectAllByDefault changes default behavior for empty CRD selectors, such ConfigSelector. with selectAllByDefault: true and undefined ConfigSelector and ConfigNamespaceSelector Operator selects all exist alertManagerConfigs"),
            )
            .attribute(
                "service_account_name",
                Attribute::string().description("ServiceAccountName is the name of the ServiceAccount to use"),
            )
            .attribute(
                "storage",
                Attribute::nested::<StorageSpec>().description("Storage is the definition of how storage will be used by the VMAlertmanager instances."),
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
                "use_default_resources",
                Attribute::boolean().description("UseDefaultResources controls resource settings. By default, operator sets built-in resource requirements"),
            )
            .attribute(
                "volume_mounts",
                Attribute::list_of::<VolumeMount>().description("VolumeMounts allows configuration of additional VolumeMounts on the output StatefulSet definition."),
            )
            .attribute(
                "web_config",
                Attribute::nested::<AlertmanagerWebConfig>().description("WebConfig defines configuration for webserver https://github.com/prometheus/alertmanager/blob/main/docs/https.md"),
            )
    }
}

/// Web server configuration. The upstream types use snake_case keys.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct AlertmanagerWebConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_server_config: Option<AlertmanagerHttpConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_server_config: Option<TlsServerConfig>,
}

impl NestedSchema for AlertmanagerWebConfig {
    fn attributes() -> Attributes {
        Attributes::new()
            .keep_wire_names()
            .attribute(
                "http_server_config",
                Attribute::nested::<AlertmanagerHttpConfig>().description("AlertmanagerHTTPConfig defines http server configuration for alertmanager"),
            )
            .attribute(
                "tls_server_config",
                Attribute::nested::<TlsServerConfig>().description("TLSServerConfig defines VMAlert server TLS configuration."),
            )
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct AlertmanagerHttpConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http2: Option<bool>,
}

impl NestedSchema for AlertmanagerHttpConfig {
    fn attributes() -> Attributes {
        Attributes::new()
            .keep_wire_names()
            .attribute(
                "headers",
                Attribute::map(ElementType::String).description("Headers defines list of headers that can be added to HTTP responses."),
            )
            .attribute(
                "http2",
                Attribute::boolean().description("HTTP2 enables HTTP/2 support. Note that HTTP/2 is only supported with TLS. This can not be changed on the fly."),
            )
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TlsServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cert_secret_ref: Option<SecretKeySelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cipher_suites: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_auth_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ca_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_ca_secret_ref: Option<SecretKeySelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curve_preferences: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_secret_ref: Option<SecretKeySelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefer_server_cipher_suites: Option<bool>,
}

impl NestedSchema for TlsServerConfig {
    fn attributes() -> Attributes {
        Attributes::new()
            .keep_wire_names()
            .attribute(
                "cert_file",
                Attribute::string().description("CertFile defines path to the pre-mounted file with certificate mutually exclusive with CertSecretRef"),
            )
            .attribute(
                "cert_secret_ref",
                Attribute::nested::<SecretKeySelector>().description("Secret containing the TLS certificate for the server"),
            )
            .attribute(
                "cipher_suites",
                Attribute::list(ElementType::String).description("CipherSuites defines list of supported cipher suites for TLS versions up to TLS 1.2"),
            )
            .attribute(
                "client_auth_type",
                Attribute::string()
                    .description("Cert is the client certificate policy.")
                    .validator(Validator::OneOf(CLIENT_AUTH_TYPES)),
            )
            .attribute(
                "client_ca_file",
                Attribute::string().description("ClientCAFile defines path to the pre-mounted file with CA mutually exclusive with ClientCASecretRef"),
            )
            .attribute(
                "client_ca_secret_ref",
                Attribute::nested::<SecretKeySelector>().description("ClientCA defines reference for secret with CA content under given key mutually exclusive with ClientCAFile"),
            )
            .attribute(
                "curve_preferences",
                Attribute::list(ElementType::String).description("CurvePreferences defines elliptic curves that will be used in an ECDHE handshake, in preference order."),
            )
            .attribute(
                "key_file",
                Attribute::string().description("KeyFile defines path to the pre-mounted file with certificate key mutually exclusive with KeySecretRef"),
            )
            .attribute(
                "key_secret_ref",
                Attribute::nested::<SecretKeySelector>().description("Key defines reference for secret with certificate key content under given key mutually exclusive with KeyFile"),
            )
            .attribute(
                "max_version",
                Attribute::string()
                    .description("MaxVersion maximum TLS version that is acceptable.")
                    .validator(Validator::OneOf(&["TLS10", "TLS11", "TLS12", "TLS13"])),
            )
            .attribute(
                "min_version",
                Attribute::string()
                    .description("MinVersion minimum TLS version that is acceptable.")
                    .validator(Validator::OneOf(&["TLS10", "TLS11", "TLS12", "TLS13"])),
            )
            .attribute(
                "prefer_server_cipher_suites",
                Attribute::boolean().description("PreferServerCipherSuites controls whether the server selects the client's most preferred ciphersuite"),
            )
            .exclusive(&["cert_file", "cert_secret_ref"])
            .exclusive(&["client_ca_file", "client_ca_secret_ref"])
            .exclusive(&["key_file", "key_secret_ref"])
    }
}
