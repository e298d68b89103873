//! Custom resources of the [VictoriaMetrics operator](https://docs.victoriametrics.com/operator/).
//!
//! All kinds live in the `operator.victoriametrics.com` group and are served as `v1beta1`.

mod alertmanager;
mod auth;
pub mod common;
mod service_scrape;

pub use alertmanager::*;
pub use auth::*;
pub use service_scrape::*;

/// The API group of all VictoriaMetrics operator custom resources.
pub const GROUP: &str = "operator.victoriametrics.com";

/// The API version served for all kinds in [`GROUP`].
pub const VERSION: &str = "v1beta1";
