use indoc::indoc;
use k8s_manifest_provider::{
    DataSource, Diagnostics, Provider,
    crd::victoriametrics::{
        VmAlertmanager, VmAlertmanagerSpec, VmAuth, VmAuthSpec, VmServiceScrape,
        VmServiceScrapeSpec,
    },
    manifest::{Manifest, ManifestConfig, ManifestKind},
};
use k8s_manifest_shared::yaml;
use rstest::rstest;
use serde_json::{Value, json};

const ALERTMANAGER_CONFIG: &str = indoc! {r#"
    metadata:
      name: am1
      namespace: monitoring
      labels:
        app.kubernetes.io/name: vmalertmanager
      annotations:
        example.com/owner: platform
    spec:
      cluster_advertise_address: 10.0.0.1:9094
      cluster_domain_name: cluster.local
      config_maps: [am-templates]
      config_namespace_selector:
        match_labels:
          team: platform
      config_raw_yaml: |
        route:
          receiver: blackhole
      config_secret: am-config
      config_selector:
        match_expressions:
          - key: tier
            operator: In
            values: [monitoring]
      disable_namespace_matcher: true
      disable_route_continue_enforce: false
      dns_policy: ClusterFirst
      external_url: https://alerts.example.com
      extra_args:
        log.level: debug
      extra_envs:
        - name: GOMAXPROCS
          value: "2"
      host_network: false
      image:
        pull_policy: IfNotPresent
        repository: prom/alertmanager
        tag: v0.27.0
      image_pull_secrets:
        - name: registry
      listen_local: false
      log_format: json
      log_level: info
      node_selector:
        kubernetes.io/os: linux
      paused: false
      pod_disruption_budget:
        min_available: "1"
        selector_labels:
          app: vmalertmanager
      pod_metadata:
        labels:
          team: platform
      port_name: web
      priority_class_name: high
      replica_count: 3
      resources:
        limits:
          memory: 256Mi
        requests:
          cpu: 100m
      retention: 120h
      route_prefix: /
      secrets: [am-tls]
      select_all_by_default: true
      service_account_name: vmalertmanager
      storage:
        disable_mount_sub_path: true
        volume_claim_template:
          metadata:
            name: am-data
          spec:
            access_modes: [ReadWriteOnce]
            data_source:
              api_group: snapshot.storage.k8s.io
              kind: VolumeSnapshot
              name: snap
            resources:
              requests:
                storage: 2Gi
            storage_class_name: standard
            volume_mode: Filesystem
      termination_grace_period_seconds: 30
      tolerations:
        - key: dedicated
          operator: Equal
          value: monitoring
          effect: NoSchedule
      use_default_resources: false
      volume_mounts:
        - name: templates
          mount_path: /etc/templates
          read_only: true
      web_config:
        http_server_config:
          http2: true
          headers:
            X-Frame-Options: deny
        tls_server_config:
          cert_secret_ref:
            name: am-tls
            key: tls.crt
          key_secret_ref:
            name: am-tls
            key: tls.key
          min_version: TLS12
"#};

const AUTH_CONFIG: &str = indoc! {r#"
    metadata:
      name: vmauth
      namespace: monitoring
    spec:
      config_secret: vmauth-config
      extra_args:
        loggerLevel: WARN
      extra_envs:
        - name: TZ
          value: UTC
      image:
        repository: victoriametrics/vmauth
        tag: v1.102.0
      image_pull_secrets:
        - name: registry
      ingress:
        class_name: nginx
        host: vmauth.example.com
        paths: [/]
        tls_hosts: [vmauth.example.com]
        tls_secret_name: vmauth-tls
        annotations:
          cert-manager.io/cluster-issuer: letsencrypt
      license:
        key_ref:
          name: vm-license
          key: license
      log_format: json
      log_level: WARN
      node_selector:
        kubernetes.io/os: linux
      paused: false
      pod_disruption_budget:
        max_unavailable: "1"
      pod_metadata:
        annotations:
          example.com/scrape: "true"
      port: "8427"
      priority_class_name: high
      replica_count: 2
      resources:
        requests:
          cpu: 50m
      select_all_by_default: true
      service_account_name: vmauth
      termination_grace_period_seconds: 15
      tolerations:
        - operator: Exists
      unauthorized_access_config:
        url_map:
          - src_paths: ["/api/v1/query.*"]
            url_prefix: ["http://vmselect:8481/select/0/prometheus"]
            retry_status_codes: [502, 503]
            drop_src_path_prefix_parts: 1
        ip_filters:
          allow_list: [10.0.0.0/8]
        default_url: ["http://default-backend/"]
        load_balancing_policy: least_loaded
        tls_insecure_skip_verify: true
      use_default_resources: true
      user_namespace_selector:
        match_labels:
          team: platform
      user_selector:
        match_labels:
          app: vmuser
"#};

const SERVICE_SCRAPE_CONFIG: &str = indoc! {r#"
    metadata:
      name: node-exporter
      namespace: monitoring
    spec:
      attach_metadata:
        node: true
      discovery_role: endpointslices
      endpoints:
        - port: metrics
          path: /metrics
          scheme: https
          params:
            module: [http_2xx]
          interval: 30s
          scrape_timeout: 10s
          honor_labels: true
          honor_timestamps: false
          follow_redirects: true
          proxy_url: http://proxy:3128
          sample_limit: 10000
          series_limit: 5000
          basic_auth:
            username:
              name: scrape-auth
              key: username
            password:
              name: scrape-auth
              key: password
          oauth2:
            client_id:
              secret:
                name: oauth
                key: id
            client_secret:
              name: oauth
              key: secret
            scopes: [metrics]
            token_url: https://auth.example.com/token
          tls_config:
            ca:
              config_map:
                name: ca-bundle
                key: ca.crt
            insecure_skip_verify: false
            server_name: node-exporter.monitoring.svc
          relabel_configs:
            - source_labels: [__meta_kubernetes_pod_node_name]
              target_label: node
              action: replace
          metric_relabel_configs:
            - if: '{__name__=~"go_.*"}'
              action: drop
          vm_scrape_params:
            stream_parse: true
            disable_keep_alive: true
            headers: ["X-Scope: monitoring"]
          attach_metadata:
            node: false
        - target_port: "9100"
          bearer_token_secret:
            name: scrape-token
            key: token
          authorization:
            type: Bearer
            credentials_file: /var/run/secrets/token
          scrape_interval: 1m
      job_label: app.kubernetes.io/name
      namespace_selector:
        match_names: [monitoring, kube-system]
      pod_target_labels: [team]
      sample_limit: 20000
      scrape_class: default
      selector:
        match_labels:
          app.kubernetes.io/name: node-exporter
      series_limit: 10000
      target_labels: [tier]
"#};

fn parse(config: &str) -> Value {
    yaml::from_str(config).expect("test YAML is valid")
}

fn data_source<K: ManifestKind>(provider: &Provider) -> &dyn DataSource {
    provider
        .data_source(&K::type_name(provider.prefix()))
        .expect("kind is registered")
}

fn error_paths(diagnostics: &Diagnostics) -> Vec<String> {
    diagnostics
        .errors()
        .filter_map(|diagnostic| diagnostic.attribute.as_ref().map(ToString::to_string))
        .collect()
}

/// Decodes `config` with the data source schema and checks that the typed model keeps every
/// decoded field.
fn assert_schema_matches_model<K>(config: &Value)
where
    K: ManifestKind,
    K::Spec: PartialEq + std::fmt::Debug,
{
    let provider = Provider::default();
    let mut diagnostics = Diagnostics::new();

    let decoded = data_source::<K>(&provider)
        .schema()
        .decode(config, &mut diagnostics)
        .expect("config is an object");
    assert!(diagnostics.is_empty(), "{diagnostics:?}");

    let typed = ManifestConfig::<K::Spec>::from_wire::<K>(decoded.clone())
        .expect("decoded configuration fits the model");
    assert!(typed.spec.is_some());
    assert_eq!(serde_json::to_value(&typed).expect("model serializes"), decoded);
}

fn assert_yaml_round_trips<K>(config: &Value)
where
    K: ManifestKind,
    K::Spec: PartialEq + std::fmt::Debug,
{
    let provider = Provider::default();
    let data_source = data_source::<K>(&provider);

    let response = data_source.read(config);
    let rendered = response.yaml().expect("read succeeds");

    let mut diagnostics = Diagnostics::new();
    let decoded = data_source
        .schema()
        .decode(config, &mut diagnostics)
        .expect("config is an object");
    let expected = Manifest::new::<K>(
        ManifestConfig::<K::Spec>::from_wire::<K>(decoded).expect("decoded configuration fits"),
    );

    let parsed: Manifest<K::Spec> = yaml::from_str(rendered).expect("rendered YAML is valid");
    assert_eq!(parsed, expected);
    assert_eq!(parsed.api_version, "operator.victoriametrics.com/v1beta1");
    assert_eq!(parsed.kind, K::KIND);
}

#[test]
fn minimal_alertmanager() {
    let provider = Provider::default();
    let response = data_source::<VmAlertmanager>(&provider).read(&json!({
        "metadata": {"name": "am1", "namespace": "monitoring"},
    }));

    assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
    assert_eq!(
        response.yaml(),
        Some(indoc! {"
            apiVersion: operator.victoriametrics.com/v1beta1
            kind: VMAlertmanager
            metadata:
              name: am1
              namespace: monitoring
        "})
    );
}

#[test]
fn invalid_retention_produces_no_yaml() {
    let provider = Provider::default();
    let response = data_source::<VmAlertmanager>(&provider).read(&json!({
        "metadata": {"name": "am1", "namespace": "monitoring"},
        "spec": {"retention": "abc"},
    }));

    assert!(response.state.is_none());
    assert_eq!(error_paths(&response.diagnostics), ["spec.retention"]);
}

#[rstest]
#[case(json!({"metadata": {"namespace": "monitoring"}}), "metadata.name")]
#[case(json!({"metadata": {"name": "am1"}}), "metadata.namespace")]
#[case(json!({"metadata": {"name": "am1", "namespace": null}}), "metadata.namespace")]
#[case(json!({"spec": {}}), "metadata")]
#[case(json!({"metadata": {"name": "am1", "namespace": "monitoring"}, "yaml": "kind: VMAuth"}), "yaml")]
#[case(json!({"metadata": {"name": "am1", "namespace": "monitoring"}, "kind": "VMAuth"}), "kind")]
#[case(json!({"metadata": {"name": "Am1", "namespace": "monitoring"}}), "metadata.name")]
#[case(json!({"metadata": {"name": "am1", "namespace": "monitoring", "labels": {"a/b/c": "x"}}}), r#"metadata.labels["a/b/c"]"#)]
fn rejected_configurations(#[case] config: Value, #[case] path: &str) {
    let provider = Provider::default();

    for type_name in provider.data_source_type_names() {
        let data_source = provider.data_source(type_name).expect("listed data source exists");
        let response = data_source.read(&config);

        assert!(response.state.is_none(), "{type_name} accepted {config}");
        assert!(
            error_paths(&response.diagnostics).contains(&path.to_owned()),
            "{type_name}: {:?}",
            response.diagnostics
        );
    }
}

#[test]
fn service_scrape_requires_selector() {
    let provider = Provider::default();
    let response = data_source::<VmServiceScrape>(&provider).read(&json!({
        "metadata": {"name": "scrape", "namespace": "monitoring"},
        "spec": {"job_label": "app"},
    }));

    assert!(response.state.is_none());
    assert_eq!(error_paths(&response.diagnostics), ["spec.selector"]);
}

#[test]
fn state_echoes_configuration() {
    let provider = Provider::default();
    let config = parse(AUTH_CONFIG);
    let response = data_source::<VmAuth>(&provider).read(&config);

    let mut state = response.state.expect("read succeeds");
    let yaml = state
        .as_object_mut()
        .and_then(|state| state.remove("yaml"))
        .expect("yaml is set");

    assert!(yaml.is_string());
    assert_eq!(state, config);
}

#[rstest]
#[case::alertmanager(ALERTMANAGER_CONFIG)]
#[case::auth(AUTH_CONFIG)]
#[case::service_scrape(SERVICE_SCRAPE_CONFIG)]
fn reads_are_deterministic(#[case] config: &str) {
    let provider = Provider::default();
    let config = parse(config);

    for type_name in provider.data_source_type_names() {
        let data_source = provider.data_source(type_name).expect("listed data source exists");
        let first = data_source.read(&config);
        let second = data_source.read(&config);

        assert_eq!(first.state, second.state);
        assert_eq!(first.diagnostics, second.diagnostics);
    }
}

#[test]
fn alertmanager_schema_matches_model() {
    assert_schema_matches_model::<VmAlertmanager>(&parse(ALERTMANAGER_CONFIG));
}

#[test]
fn auth_schema_matches_model() {
    assert_schema_matches_model::<VmAuth>(&parse(AUTH_CONFIG));
}

#[test]
fn service_scrape_schema_matches_model() {
    assert_schema_matches_model::<VmServiceScrape>(&parse(SERVICE_SCRAPE_CONFIG));
}

#[test]
fn alertmanager_yaml_round_trips() {
    assert_yaml_round_trips::<VmAlertmanager>(&parse(ALERTMANAGER_CONFIG));
}

#[test]
fn auth_yaml_round_trips() {
    assert_yaml_round_trips::<VmAuth>(&parse(AUTH_CONFIG));
}

#[test]
fn service_scrape_yaml_round_trips() {
    assert_yaml_round_trips::<VmServiceScrape>(&parse(SERVICE_SCRAPE_CONFIG));
}

#[test]
fn rendered_keys_use_wire_names() {
    let provider = Provider::default();
    let response = data_source::<VmServiceScrape>(&provider).read(&parse(SERVICE_SCRAPE_CONFIG));
    let rendered = response.yaml().expect("read succeeds");

    let manifest: Value = yaml::from_str(rendered).expect("rendered YAML is valid");
    let endpoint = &manifest["spec"]["endpoints"][0];

    assert_eq!(endpoint["proxyURL"], "http://proxy:3128");
    assert_eq!(endpoint["scrapeTimeout"], "10s");
    assert_eq!(endpoint["vm_scrape_params"]["disable_keep_alive"], true);
    assert_eq!(endpoint["oauth2"]["token_url"], "https://auth.example.com/token");
    assert_eq!(endpoint["tlsConfig"]["ca"]["configMap"]["name"], "ca-bundle");
    assert_eq!(manifest["spec"]["endpoints"][1]["scrape_interval"], "1m");
    assert!(manifest.get("status").is_none());
}

#[test]
fn unset_fields_are_omitted() {
    let provider = Provider::default();
    let response = data_source::<VmAlertmanager>(&provider).read(&json!({
        "metadata": {"name": "am1", "namespace": "monitoring", "labels": null},
        "spec": {"replica_count": 1, "retention": null, "storage": {"empty_dir": null}},
    }));

    assert_eq!(
        response.yaml(),
        Some(indoc! {"
            apiVersion: operator.victoriametrics.com/v1beta1
            kind: VMAlertmanager
            metadata:
              name: am1
              namespace: monitoring
            spec:
              replicaCount: 1
              storage: {}
        "})
    );
}

#[test]
fn typed_specs_are_exported() {
    let spec = VmAuthSpec {
        replica_count: Some(1),
        ..VmAuthSpec::default()
    };
    assert_eq!(serde_json::to_value(spec).expect("serializes"), json!({"replicaCount": 1}));

    let spec = VmAlertmanagerSpec::default();
    assert_eq!(serde_json::to_value(spec).expect("serializes"), json!({}));

    let spec = VmServiceScrapeSpec::default();
    assert_eq!(serde_json::to_value(spec).expect("serializes"), json!({"selector": {}}));
}
