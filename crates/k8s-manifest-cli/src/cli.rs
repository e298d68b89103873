//! Command line arguments of the `k8s-manifest` binary.
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use k8s_manifest_provider::provider::DEFAULT_PREFIX;

use crate::logging::LogFormat;

#[derive(Debug, PartialEq, Eq, Parser)]
#[command(
    name = "k8s-manifest",
    author,
    version,
    about = "Renders VictoriaMetrics operator custom resources as Kubernetes manifests"
)]
pub struct Opts {
    /// Prefix of all data source type names
    #[arg(
        long,
        env = "K8S_MANIFEST_PROVIDER_PREFIX",
        default_value = DEFAULT_PREFIX,
        global = true
    )]
    pub provider_prefix: String,

    /// Format of the log events written to stderr
    #[arg(
        long,
        env = "K8S_MANIFEST_LOG_FORMAT",
        value_enum,
        default_value_t,
        global = true
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print the type names of all data sources.
    List,

    /// Print the JSON Schema of a data source configuration.
    Schema {
        /// Type name as printed by `list`
        type_name: String,
    },

    /// Validate a configuration file and print its diagnostics.
    Validate(ConfigArgs),

    /// Read a data source and print the rendered manifest.
    Read {
        #[command(flatten)]
        config: ConfigArgs,

        /// Print either the manifest or the complete state as JSON
        #[arg(long, short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },
}

#[derive(Debug, PartialEq, Eq, Args)]
pub struct ConfigArgs {
    /// Type name as printed by `list`
    pub type_name: String,

    /// Provides the path to a YAML or JSON configuration file
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: PathBuf,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Yaml,
    State,
}
