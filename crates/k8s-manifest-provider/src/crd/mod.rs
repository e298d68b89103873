//! Custom resource models which can be rendered as manifests.

pub mod victoriametrics;
