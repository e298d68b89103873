//! Static declarations of the configuration accepted by a data source.
//!
//! A [`Schema`] is a tree of [`Attribute`]s. It is built once per resource kind and never changes
//! afterwards. The schema is used to
//!
//! - validate and decode configuration values (see [`Schema::decode`]),
//! - translate attribute names (snake_case) into manifest keys (see [`Attributes::wire_name`]),
//! - export a JSON Schema of the accepted configuration (see [`Schema::to_json_schema`]).
//!
//! Typed model structs declare their own part of the tree by implementing [`NestedSchema`].

use serde_json::Value;

use crate::diagnostics::{AttributePath, Diagnostics};

mod attribute;
mod decode;
mod json_schema;
pub mod k8s;
mod validator;

pub use attribute::*;
pub use validator::*;

/// Implemented by model structs which are rendered as nested objects.
pub trait NestedSchema {
    /// The attributes of the nested object, in declaration order.
    fn attributes() -> Attributes;
}

/// The complete configuration schema of one data source.
#[derive(Clone, Debug)]
pub struct Schema {
    description: &'static str,
    attributes: Attributes,
}

impl Schema {
    pub fn new(description: &'static str, attributes: Attributes) -> Self {
        Self {
            description,
            attributes,
        }
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Validates `config` against the schema.
    ///
    /// Returns the configuration keyed by wire names, with all unset attributes removed. Problems
    /// are added to `diagnostics`. The returned value must not be used if an error was added.
    pub fn decode(&self, config: &Value, diagnostics: &mut Diagnostics) -> Option<Value> {
        self.attributes
            .decode_object(config, &AttributePath::root(), diagnostics)
    }
}
