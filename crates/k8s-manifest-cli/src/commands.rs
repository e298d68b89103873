use std::{
    io::Write,
    path::{Path, PathBuf},
};

use k8s_manifest_provider::{DataSource, Diagnostics, Provider};
use k8s_manifest_shared::yaml;
use serde_json::Value;
use snafu::{OptionExt, ResultExt, Snafu, ensure};
use tracing::{debug, info};

use crate::cli::{Command, ConfigArgs, Opts, OutputFormat};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("unknown data source {type_name:?}, run `list` to print all type names"))]
    UnknownDataSource { type_name: String },

    #[snafu(display("failed to read configuration file {path:?}"))]
    ReadConfig {
        source: std::io::Error,
        path: PathBuf,
    },

    #[snafu(display("failed to parse configuration file {path:?}"))]
    ParseConfig { source: yaml::Error, path: PathBuf },

    #[snafu(display("failed to serialize output as JSON"))]
    SerializeJson { source: serde_json::Error },

    #[snafu(display("failed to write output"))]
    WriteOutput { source: std::io::Error },

    #[snafu(display("configuration of {type_name} has {errors} error(s)"))]
    InvalidConfiguration { type_name: String, errors: usize },
}

/// Runs the parsed command, writing its output to `out` and diagnostics to `err`.
pub fn run(opts: Opts, out: &mut impl Write, err: &mut impl Write) -> Result<()> {
    let provider = Provider::new(opts.provider_prefix);

    match opts.command {
        Command::List => {
            for type_name in provider.data_source_type_names() {
                writeln!(out, "{type_name}").context(WriteOutputSnafu)?;
            }
        }
        Command::Schema { type_name } => {
            let data_source = data_source(&provider, &type_name)?;
            let schema = data_source.schema().to_json_schema(&type_name);
            let schema = serde_json::to_string_pretty(&schema).context(SerializeJsonSnafu)?;

            writeln!(out, "{schema}").context(WriteOutputSnafu)?;
        }
        Command::Validate(ConfigArgs { type_name, config }) => {
            let data_source = data_source(&provider, &type_name)?;
            let config = read_config(&config)?;

            let diagnostics = data_source.validate_config(&config);
            report(&type_name, &diagnostics, err)?;

            writeln!(out, "{type_name}: configuration is valid").context(WriteOutputSnafu)?;
        }
        Command::Read {
            config: ConfigArgs { type_name, config },
            output,
        } => {
            let data_source = data_source(&provider, &type_name)?;
            let config = read_config(&config)?;

            let response = data_source.read(&config);
            report(&type_name, &response.diagnostics, err)?;

            match (output, response.yaml(), &response.state) {
                (OutputFormat::Yaml, Some(yaml), _) => {
                    out.write_all(yaml.as_bytes()).context(WriteOutputSnafu)?;
                }
                (OutputFormat::State, _, Some(state)) => {
                    let state = serde_json::to_string_pretty(state).context(SerializeJsonSnafu)?;
                    writeln!(out, "{state}").context(WriteOutputSnafu)?;
                }
                // A read without errors always produces a state
                _ => {}
            }

            info!(type_name = %type_name, "rendered manifest");
        }
    }

    Ok(())
}

fn data_source<'a>(provider: &'a Provider, type_name: &str) -> Result<&'a dyn DataSource> {
    provider
        .data_source(type_name)
        .context(UnknownDataSourceSnafu { type_name })
}

/// Reads a YAML (or JSON) configuration file.
fn read_config(path: &Path) -> Result<Value> {
    debug!(path = %path.display(), "reading configuration file");

    let contents = std::fs::read_to_string(path).context(ReadConfigSnafu { path })?;
    yaml::from_str(&contents).context(ParseConfigSnafu { path })
}

/// Writes all diagnostics to `err` and fails if any of them is an error.
fn report(type_name: &str, diagnostics: &Diagnostics, err: &mut impl Write) -> Result<()> {
    for diagnostic in diagnostics.iter() {
        writeln!(err, "{diagnostic}").context(WriteOutputSnafu)?;
    }

    let errors = diagnostics.errors().count();
    ensure!(errors == 0, InvalidConfigurationSnafu { type_name, errors });

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use clap::Parser;
    use indoc::indoc;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    use super::*;

    const ALERTMANAGER: &str = "k8s_operator_victoriametrics_com_vm_alertmanager_v1beta1_manifest";

    fn config_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temporary file must be created");
        file.write_all(contents.as_bytes())
            .expect("temporary file must be writable");
        file
    }

    fn run_args(args: &[&str]) -> (Result<()>, String, String) {
        let opts = Opts::try_parse_from(
            ["k8s-manifest", "--provider-prefix", "k8s"]
                .iter()
                .chain(args),
        )
        .expect("arguments must parse");

        let (mut out, mut err) = (Vec::new(), Vec::new());
        let result = run(opts, &mut out, &mut err);

        (
            result,
            String::from_utf8(out).expect("output must be UTF-8"),
            String::from_utf8(err).expect("diagnostics must be UTF-8"),
        )
    }

    #[test]
    fn list() {
        let (result, out, _) = run_args(&["list"]);

        result.expect("list must succeed");
        assert_eq!(out, indoc! {"
            k8s_operator_victoriametrics_com_vm_alertmanager_v1beta1_manifest
            k8s_operator_victoriametrics_com_vm_auth_v1beta1_manifest
            k8s_operator_victoriametrics_com_vm_service_scrape_v1beta1_manifest
        "});
    }

    #[test]
    fn read_yaml() {
        let file = config_file(indoc! {"
            metadata:
              name: am1
              namespace: monitoring
            spec:
              replica_count: 2
        "});
        let path = file.path().to_string_lossy();

        let (result, out, err) = run_args(&["read", ALERTMANAGER, "--config", &path]);

        result.expect("read must succeed");
        assert_eq!(err, "");
        assert_eq!(out, indoc! {"
            apiVersion: operator.victoriametrics.com/v1beta1
            kind: VMAlertmanager
            metadata:
              name: am1
              namespace: monitoring
            spec:
              replicaCount: 2
        "});
    }

    #[test]
    fn read_state() {
        let file = config_file(r#"{"metadata": {"name": "am1", "namespace": "monitoring"}}"#);
        let path = file.path().to_string_lossy();

        let (result, out, _) = run_args(&["read", ALERTMANAGER, "-c", &path, "-o", "state"]);

        result.expect("read must succeed");
        let state: Value = serde_json::from_str(&out).expect("state must be JSON");
        assert_eq!(state["metadata"]["name"], "am1");
        assert!(state["yaml"].as_str().is_some_and(|yaml| yaml.contains("kind: VMAlertmanager")));
    }

    #[rstest]
    #[case("validate")]
    #[case("read")]
    fn invalid_configuration(#[case] command: &str) {
        let file = config_file(indoc! {"
            metadata:
              name: am1
              namespace: monitoring
            spec:
              retention: 5d
        "});
        let path = file.path().to_string_lossy();

        let (result, out, err) = run_args(&[command, ALERTMANAGER, "--config", &path]);

        assert!(matches!(
            result,
            Err(Error::InvalidConfiguration { errors: 1, .. })
        ));
        assert_eq!(out, "");
        assert!(err.starts_with("error: "), "{err}");
        assert!(err.contains("(at spec.retention)"), "{err}");
    }

    #[test]
    fn validate() {
        let file = config_file(indoc! {"
            metadata:
              name: am1
              namespace: monitoring
        "});
        let path = file.path().to_string_lossy();

        let (result, out, _) = run_args(&["validate", ALERTMANAGER, "--config", &path]);

        result.expect("validation must succeed");
        assert_eq!(out, format!("{ALERTMANAGER}: configuration is valid\n"));
    }

    #[test]
    fn schema() {
        let (result, out, _) = run_args(&["schema", ALERTMANAGER]);

        result.expect("schema must succeed");
        let schema: Value = serde_json::from_str(&out).expect("schema must be JSON");
        assert_eq!(schema["title"], ALERTMANAGER);
        assert!(schema["properties"]["yaml"].is_object());
    }

    #[test]
    fn unknown_data_source() {
        let (result, ..) = run_args(&["schema", "k8s_unknown_manifest"]);

        assert!(matches!(result, Err(Error::UnknownDataSource { type_name }) if type_name == "k8s_unknown_manifest"));
    }

    #[test]
    fn missing_config_file() {
        let (result, ..) = run_args(&["read", ALERTMANAGER, "--config", "/does/not/exist.yaml"]);

        assert!(matches!(result, Err(Error::ReadConfig { .. })));
    }

    #[test]
    fn malformed_config_file() {
        let file = config_file("metadata: [");
        let path = file.path().to_string_lossy();

        let (result, ..) = run_args(&["validate", ALERTMANAGER, "--config", &path]);

        assert!(matches!(result, Err(Error::ParseConfig { .. })));
    }
}
