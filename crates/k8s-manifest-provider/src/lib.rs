//! Read-only data sources which render Kubernetes custom resources as YAML manifests.
//!
//! Every data source accepts a configuration object (attribute names in snake_case, `null` for
//! unset attributes), validates it against a static [`schema::Schema`] and renders the resource
//! with its `apiVersion` and `kind` into the computed `yaml` attribute.
//!
//! ```
//! use k8s_manifest_provider::Provider;
//! use serde_json::json;
//!
//! let provider = Provider::default();
//! let data_source = provider
//!     .data_source("k8s_operator_victoriametrics_com_vm_alertmanager_v1beta1_manifest")
//!     .unwrap();
//!
//! let response = data_source.read(&json!({
//!     "metadata": {"name": "am1", "namespace": "monitoring"},
//! }));
//!
//! assert!(response.yaml().unwrap().starts_with("apiVersion: operator.victoriametrics.com/v1beta1"));
//! ```
pub mod crd;
pub mod data_source;
pub mod diagnostics;
pub mod manifest;
pub mod provider;
pub mod schema;
pub mod validation;

pub use data_source::{DataSource, ReadResponse};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use provider::Provider;
