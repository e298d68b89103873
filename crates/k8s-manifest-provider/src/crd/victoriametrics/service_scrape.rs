use std::collections::BTreeMap;

use k8s_openapi::{
    api::core::v1::SecretKeySelector, apimachinery::pkg::apis::meta::v1::LabelSelector,
};
use serde::{Deserialize, Serialize};

use crate::{
    crd::victoriametrics::{
        GROUP, VERSION,
        common::{Authorization, BasicAuth, OAuth2, RelabelConfig, TlsConfig},
    },
    manifest::ManifestKind,
    schema::{Attribute, Attributes, ElementType, NestedSchema, Validator},
};

const DISCOVERY_ROLES: &[&str] = &["endpoints", "service", "endpointslices"];
const SCHEMES: &[&str] = &["http", "https", "HTTP", "HTTPS"];

/// The `VMServiceScrape` custom resource, which defines scrape targets discovered through
/// Kubernetes services.
pub struct VmServiceScrape;

impl ManifestKind for VmServiceScrape {
    type Spec = VmServiceScrapeSpec;

    const DESCRIPTION: &'static str = "VMServiceScrape is scrape configuration for endpoints associated with kubernetes service, it generates scrape configuration for vmagent based on selectors.";
    const GROUP: &'static str = GROUP;
    const KIND: &'static str = "VMServiceScrape";
    const VERSION: &'static str = VERSION;
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VmServiceScrapeSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attach_metadata: Option<AttachMetadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<Vec<Endpoint>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_label: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_selector: Option<NamespaceSelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_target_labels: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_limit: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrape_class: Option<String>,

    pub selector: LabelSelector,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_limit: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_labels: Option<Vec<String>>,
}

impl NestedSchema for VmServiceScrapeSpec {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "attach_metadata",
                Attribute::nested::<AttachMetadata>().description("AttachMetadata configures metadata attaching from service discovery"),
            )
            .attribute(
                "discovery_role",
                Attribute::string()
                    .description("DiscoveryRole - defines kubernetes_sd role for objects discovery. by default, its endpoints. can be changed to service or endpointslices. note, that with service setting, you have to use port: 'name' and cannot use targetPort for endpoints.")
                    .validator(Validator::OneOf(DISCOVERY_ROLES)),
            )
            .attribute(
                "endpoints",
                Attribute::list_of::<Endpoint>().description("A list of endpoints allowed as part of this ServiceScrape."),
            )
            .attribute(
                "job_label",
                Attribute::string().description("The label to use to retrieve the job name from."),
            )
            .attribute(
                "namespace_selector",
                Attribute::nested::<NamespaceSelector>().description("Selector to select which namespaces the Endpoints objects are discovered from."),
            )
            .attribute(
                "pod_target_labels",
                Attribute::list(ElementType::String).description("PodTargetLabels transfers labels on the Kubernetes Pod onto the target."),
            )
            .attribute(
                "sample_limit",
                Attribute::int64().description("SampleLimit defines per-scrape limit on number of scraped samples that will be accepted."),
            )
            .attribute(
                "scrape_class",
                Attribute::string().description("ScrapeClass defined scrape class to apply"),
            )
            .attribute(
                "selector",
                Attribute::nested::<LabelSelector>()
                    .required()
                    .description("Selector to select Endpoints objects by corresponding Service labels."),
            )
            .attribute(
                "series_limit",
                Attribute::int64().description("SeriesLimit defines per-scrape limit on number of unique time series a single target can expose during all the scrapes on the time window of 24h."),
            )
            .attribute(
                "target_labels",
                Attribute::list(ElementType::String).description("TargetLabels transfers labels on the Kubernetes Service onto the target."),
            )
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<bool>,
}

impl NestedSchema for AttachMetadata {
    fn attributes() -> Attributes {
        Attributes::new().attribute(
            "node",
            Attribute::boolean().description("Node instructs vmagent to add node specific metadata from service discovery Valid for roles: pod, endpoints, endpointslice."),
        )
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceSelector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_names: Option<Vec<String>>,
}

impl NestedSchema for NamespaceSelector {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "any",
                Attribute::boolean().description("Boolean describing whether all namespaces are selected in contrast to a list restricting them."),
            )
            .attribute(
                "match_names",
                Attribute::list(ElementType::String).description("List of namespace names."),
            )
            .exclusive(&["any", "match_names"])
    }
}

/// A scrapeable endpoint serving metrics.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    #[serde(rename = "attach_metadata", default, skip_serializing_if = "Option::is_none")]
    pub attach_metadata: Option<AttachMetadata>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization: Option<Authorization>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<BasicAuth>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token_file: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token_secret: Option<SecretKeySelector>,

    #[serde(rename = "follow_redirects", default, skip_serializing_if = "Option::is_none")]
    pub follow_redirects: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub honor_labels: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub honor_timestamps: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_relabel_configs: Option<Vec<RelabelConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oauth2: Option<OAuth2>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, Vec<String>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,

    #[serde(rename = "proxyURL", default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relabel_configs: Option<Vec<RelabelConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_limit: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,

    #[serde(rename = "scrape_interval", default, skip_serializing_if = "Option::is_none")]
    pub scrape_interval: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrape_timeout: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_limit: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_port: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_config: Option<TlsConfig>,

    #[serde(rename = "vm_scrape_params", default, skip_serializing_if = "Option::is_none")]
    pub vm_scrape_params: Option<VmScrapeParams>,
}

impl NestedSchema for Endpoint {
    fn attributes() -> Attributes {
        Attributes::new()
            .attribute(
                "attach_metadata",
                Attribute::nested::<AttachMetadata>()
                    .wire_name("attach_metadata")
                    .description("AttachMetadata configures metadata attaching from service discovery"),
            )
            .attribute(
                "authorization",
                Attribute::nested::<Authorization>().description("Authorization with http header Authorization"),
            )
            .attribute(
                "basic_auth",
                Attribute::nested::<BasicAuth>().description("BasicAuth allow an endpoint to authenticate over basic authentication"),
            )
            .attribute(
                "bearer_token_file",
                Attribute::string().description("File to read bearer token for scraping targets."),
            )
            .attribute(
                "bearer_token_secret",
                Attribute::nested::<SecretKeySelector>().description("Secret to mount to read bearer token for scraping targets. The secret needs to be in the same namespace as the scrape object and accessible by the victoria-metrics operator."),
            )
            .attribute(
                "follow_redirects",
                Attribute::boolean()
                    .wire_name("follow_redirects")
                    .description("FollowRedirects controls redirects for scraping."),
            )
            .attribute(
                "honor_labels",
                Attribute::boolean().description("HonorLabels chooses the metric's labels on collisions with target labels."),
            )
            .attribute(
                "honor_timestamps",
                Attribute::boolean().description("HonorTimestamps controls whether vmagent respects the timestamps present in scraped data."),
            )
            .attribute(
                "interval",
                Attribute::string().description("Interval at which metrics should be scraped"),
            )
            .attribute(
                "metric_relabel_configs",
                Attribute::list_of::<RelabelConfig>().description("MetricRelabelConfigs to apply to samples after scrapping."),
            )
            .attribute(
                "oauth2",
                Attribute::nested::<OAuth2>().description("OAuth2 defines auth configuration"),
            )
            .attribute(
                "params",
                Attribute::map(ElementType::list_of(ElementType::String)).description("Optional HTTP URL parameters"),
            )
            .attribute(
                "path",
                Attribute::string().description("HTTP path to scrape for metrics."),
            )
            .attribute(
                "port",
                Attribute::string().description("Name of the service port this endpoint refers to. Mutually exclusive with targetPort."),
            )
            .attribute(
                "proxy_url",
                Attribute::string()
                    .wire_name("proxyURL")
                    .description("ProxyURL eg http://proxyserver:2195 Directs scrapes to proxy through this endpoint."),
            )
            .attribute(
                "relabel_configs",
                Attribute::list_of::<RelabelConfig>().description("RelabelConfigs to apply to samples during service discovery."),
            )
            .attribute(
                "sample_limit",
                Attribute::int64().description("SampleLimit defines per-scrape limit on number of scraped samples that will be accepted."),
            )
            .attribute(
                "scheme",
                Attribute::string()
                    .description("HTTP scheme to use for scraping.")
                    .validator(Validator::OneOf(SCHEMES)),
            )
            .attribute(
                "scrape_interval",
                Attribute::string()
                    .wire_name("scrape_interval")
                    .description("ScrapeInterval is the same as Interval and has priority over it. one of scrape_interval or interval can be used"),
            )
            .attribute(
                "scrape_timeout",
                Attribute::string().description("Timeout after which the scrape is ended"),
            )
            .attribute(
                "series_limit",
                Attribute::int64().description("SeriesLimit defines per-scrape limit on number of unique time series a single target can expose during all the scrapes on the time window of 24h."),
            )
            .attribute(
                "target_port",
                Attribute::string().description("Name or number of the pod port this endpoint refers to. Mutually exclusive with port."),
            )
            .attribute(
                "tls_config",
                Attribute::nested::<TlsConfig>().description("TLSConfig configuration to use when scraping the endpoint"),
            )
            .attribute(
                "vm_scrape_params",
                Attribute::nested::<VmScrapeParams>()
                    .wire_name("vm_scrape_params")
                    .description("VMScrapeParams defines VictoriaMetrics specific scrape parameters"),
            )
            .exclusive(&["port", "target_port"])
            .exclusive(&["interval", "scrape_interval"])
            .exclusive(&["bearer_token_file", "bearer_token_secret"])
    }
}

/// VictoriaMetrics specific scrape settings. The upstream type uses snake_case keys.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct VmScrapeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_compression: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_keep_alive: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric_relabel_debug: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_stale_markers: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relabel_debug: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrape_align_interval: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scrape_offset: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_parse: Option<bool>,
}

impl NestedSchema for VmScrapeParams {
    fn attributes() -> Attributes {
        Attributes::new()
            .keep_wire_names()
            .attribute("disable_compression", Attribute::boolean())
            .attribute(
                "disable_keep_alive",
                Attribute::boolean().description("disable_keepalive allows disabling HTTP keep-alive when scraping targets."),
            )
            .attribute(
                "headers",
                Attribute::list(ElementType::String).description("Headers allows sending custom headers to scrape targets must be in of semicolon separated header with it's value eg: headerName: headerValue vmagent supports since 1.79.0 version"),
            )
            .attribute(
                "metric_relabel_debug",
                Attribute::boolean().description("deprecated since v0.55.0"),
            )
            .attribute(
                "no_stale_markers",
                Attribute::boolean(),
            )
            .attribute(
                "relabel_debug",
                Attribute::boolean().description("deprecated since v0.55.0"),
            )
            .attribute(
                "scrape_align_interval",
                Attribute::string(),
            )
            .attribute(
                "scrape_offset",
                Attribute::string(),
            )
            .attribute(
                "stream_parse",
                Attribute::boolean(),
            )
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::diagnostics::{AttributePath, Diagnostics};

    fn decode(config: &Value) -> (Option<Value>, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let decoded = VmServiceScrapeSpec::attributes().decode_object(
            config,
            &AttributePath::root(),
            &mut diagnostics,
        );
        (decoded, diagnostics)
    }

    #[test]
    fn selector_is_required() {
        let (_, diagnostics) = decode(&json!({"job_label": "app"}));

        let paths = diagnostics
            .errors()
            .filter_map(|d| d.attribute.as_ref().map(ToString::to_string))
            .collect::<Vec<_>>();
        assert_eq!(paths, ["selector"]);
    }

    #[test]
    fn endpoint_wire_names() {
        let (decoded, diagnostics) = decode(&json!({
            "selector": {"match_labels": {"app": "vmagent"}},
            "endpoints": [{
                "port": "http",
                "scheme": "HTTPS",
                "params": {"module": ["http_2xx"], "target": ["a", "b"]},
                "proxy_url": "http://proxy:3128",
                "scrape_interval": "30s",
                "scrape_timeout": "10s",
                "follow_redirects": true,
                "vm_scrape_params": {"stream_parse": true, "scrape_offset": "5s"},
            }],
        }));
        assert!(diagnostics.is_empty(), "{diagnostics:?}");

        let decoded = decoded.expect("config is an object");
        assert_eq!(
            decoded,
            json!({
                "selector": {"matchLabels": {"app": "vmagent"}},
                "endpoints": [{
                    "port": "http",
                    "scheme": "HTTPS",
                    "params": {"module": ["http_2xx"], "target": ["a", "b"]},
                    "proxyURL": "http://proxy:3128",
                    "scrape_interval": "30s",
                    "scrapeTimeout": "10s",
                    "follow_redirects": true,
                    "vm_scrape_params": {"stream_parse": true, "scrape_offset": "5s"},
                }],
            })
        );

        let typed: VmServiceScrapeSpec =
            serde_json::from_value(decoded.clone()).expect("fits model");
        assert_eq!(serde_json::to_value(typed).expect("serializes"), decoded);
    }

    #[test]
    fn endpoint_errors_point_into_the_list() {
        let (_, diagnostics) = decode(&json!({
            "selector": {},
            "discovery_role": "pod",
            "endpoints": [
                {"port": "http"},
                {"scheme": "ftp", "params": {"module": "http_2xx"}},
            ],
        }));

        let paths = diagnostics
            .errors()
            .filter_map(|d| d.attribute.as_ref().map(ToString::to_string))
            .collect::<Vec<_>>();
        assert_eq!(
            paths,
            [
                "discovery_role",
                r#"endpoints[1].params["module"]"#,
                "endpoints[1].scheme",
            ]
        );
    }
}
