//! The registry of every data source offered by the provider.

use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    crd::victoriametrics::{VmAlertmanager, VmAuth, VmServiceScrape},
    data_source::{DataSource, ManifestDataSource},
    manifest::ManifestKind,
};

/// The type name prefix used when none is configured.
pub const DEFAULT_PREFIX: &str = "k8s";

/// Holds one data source per supported resource kind, keyed by type name.
pub struct Provider {
    prefix: String,
    data_sources: BTreeMap<String, Box<dyn DataSource>>,
}

impl Provider {
    pub fn new(prefix: impl Into<String>) -> Self {
        let mut provider = Self {
            prefix: prefix.into(),
            data_sources: BTreeMap::new(),
        };

        provider.register::<VmAlertmanager>();
        provider.register::<VmAuth>();
        provider.register::<VmServiceScrape>();

        debug!(
            prefix = %provider.prefix,
            data_sources = provider.data_sources.len(),
            "registered data sources"
        );
        provider
    }

    fn register<K: ManifestKind>(&mut self) {
        self.data_sources.insert(
            K::type_name(&self.prefix),
            Box::new(ManifestDataSource::<K>::new()),
        );
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Looks up a data source by its full type name.
    pub fn data_source(&self, type_name: &str) -> Option<&dyn DataSource> {
        self.data_sources.get(type_name).map(Box::as_ref)
    }

    /// Returns all type names in sorted order.
    pub fn data_source_type_names(&self) -> impl Iterator<Item = &str> {
        self.data_sources.keys().map(String::as_str)
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_names_are_sorted() {
        let provider = Provider::default();

        assert_eq!(
            provider.data_source_type_names().collect::<Vec<_>>(),
            [
                "k8s_operator_victoriametrics_com_vm_alertmanager_v1beta1_manifest",
                "k8s_operator_victoriametrics_com_vm_auth_v1beta1_manifest",
                "k8s_operator_victoriametrics_com_vm_service_scrape_v1beta1_manifest",
            ]
        );
    }

    #[test]
    fn lookup_uses_prefix() {
        let provider = Provider::new("custom");

        assert!(
            provider
                .data_source("custom_operator_victoriametrics_com_vm_auth_v1beta1_manifest")
                .is_some()
        );
        assert!(
            provider
                .data_source("k8s_operator_victoriametrics_com_vm_auth_v1beta1_manifest")
                .is_none()
        );
    }
}
