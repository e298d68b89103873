use std::fmt::Display;

use convert_case::{Case, Casing};
use indexmap::IndexMap;

use crate::schema::{NestedSchema, validator::Validator};

/// Whether an attribute must, may or must not be set in the configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display, strum::EnumIs)]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    Required,
    #[default]
    Optional,

    /// Output only, set by the data source itself.
    Computed,
}

/// The type of the elements of a list or map attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ElementType {
    String,
    Bool,
    Int64,
    List(Box<ElementType>),
    Map(Box<ElementType>),
}

impl ElementType {
    pub fn list_of(element: Self) -> Self {
        Self::List(Box::new(element))
    }

    pub fn map_of(element: Self) -> Self {
        Self::Map(Box::new(element))
    }
}

impl Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Bool => f.write_str("bool"),
            Self::Int64 => f.write_str("number"),
            Self::List(element) => write!(f, "list of {element}"),
            Self::Map(element) => write!(f, "map of {element}"),
        }
    }
}

/// The semantic type of an attribute.
#[derive(Clone, Debug)]
pub enum AttributeKind {
    String,
    Bool,
    Int64,
    List(ElementType),
    Map(ElementType),

    /// A single nested object.
    SingleNested(Attributes),

    /// An ordered list of nested objects.
    ListNested(Attributes),
}

impl Display for AttributeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Bool => f.write_str("bool"),
            Self::Int64 => f.write_str("number"),
            Self::List(element) => write!(f, "list of {element}"),
            Self::Map(element) => write!(f, "map of {element}"),
            Self::SingleNested(_) => f.write_str("object"),
            Self::ListNested(_) => f.write_str("list of object"),
        }
    }
}

/// Declares a single configuration attribute.
///
/// Attributes are optional unless [`Attribute::required`] or [`Attribute::computed`] is called.
///
/// ```
/// use k8s_manifest_provider::schema::{Attribute, ElementType, Validator};
///
/// let log_format = Attribute::string()
///     .description("LogFormat for Alertmanager to be configured with.")
///     .validator(Validator::OneOf(&["logfmt", "json"]));
///
/// let args = Attribute::map(ElementType::String);
///
/// assert!(log_format.mode().is_optional());
/// assert_eq!(args.kind().to_string(), "map of string");
/// ```
#[derive(Clone, Debug)]
pub struct Attribute {
    kind: AttributeKind,
    mode: Mode,
    description: &'static str,
    wire_name: Option<&'static str>,
    validators: Vec<Validator>,
}

impl Attribute {
    fn new(kind: AttributeKind) -> Self {
        Self {
            kind,
            mode: Mode::default(),
            description: "",
            wire_name: None,
            validators: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::new(AttributeKind::String)
    }

    pub fn boolean() -> Self {
        Self::new(AttributeKind::Bool)
    }

    pub fn int64() -> Self {
        Self::new(AttributeKind::Int64)
    }

    pub fn list(element: ElementType) -> Self {
        Self::new(AttributeKind::List(element))
    }

    pub fn map(element: ElementType) -> Self {
        Self::new(AttributeKind::Map(element))
    }

    pub fn single_nested(attributes: Attributes) -> Self {
        Self::new(AttributeKind::SingleNested(attributes))
    }

    pub fn list_nested(attributes: Attributes) -> Self {
        Self::new(AttributeKind::ListNested(attributes))
    }

    /// A single nested object, using the attributes declared by `T`.
    pub fn nested<T: NestedSchema>() -> Self {
        Self::single_nested(T::attributes())
    }

    /// A list of nested objects, using the attributes declared by `T`.
    pub fn list_of<T: NestedSchema>() -> Self {
        Self::list_nested(T::attributes())
    }

    pub fn required(mut self) -> Self {
        self.mode = Mode::Required;
        self
    }

    pub fn computed(mut self) -> Self {
        self.mode = Mode::Computed;
        self
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Overrides the key used for this attribute inside the rendered manifest.
    pub fn wire_name(mut self, wire_name: &'static str) -> Self {
        self.wire_name = Some(wire_name);
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn get_description(&self) -> &'static str {
        self.description
    }

    pub fn validators(&self) -> &[Validator] {
        &self.validators
    }
}

/// How attribute names are translated into manifest keys.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WireCase {
    /// `volume_claim_template` becomes `volumeClaimTemplate`.
    #[default]
    Camel,

    /// The attribute name is used as is.
    AsDeclared,
}

/// An ordered set of named attributes, describing one (nested) object.
#[derive(Clone, Debug, Default)]
pub struct Attributes {
    entries: IndexMap<&'static str, Attribute>,
    wire_case: WireCase,
    exclusive_groups: Vec<&'static [&'static str]>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps the declared attribute names as manifest keys, for objects whose upstream type
    /// uses snake_case keys.
    pub fn keep_wire_names(mut self) -> Self {
        self.wire_case = WireCase::AsDeclared;
        self
    }

    pub fn attribute(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.entries.insert(name, attribute);
        self
    }

    /// Declares that at most one of the named attributes should be set.
    ///
    /// This is advisory: configurations setting more than one of them are accepted and only
    /// produce a warning.
    pub fn exclusive(mut self, group: &'static [&'static str]) -> Self {
        self.exclusive_groups.push(group);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.entries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Attribute)> {
        self.entries.iter().map(|(name, attribute)| (*name, attribute))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn exclusive_groups(&self) -> &[&'static [&'static str]] {
        &self.exclusive_groups
    }

    /// Returns the manifest key used for the attribute `name`.
    pub fn wire_name(&self, name: &str) -> String {
        match self.entries.get(name).and_then(|attribute| attribute.wire_name) {
            Some(wire_name) => wire_name.to_owned(),
            None => match self.wire_case {
                WireCase::Camel => name.to_case(Case::Camel),
                WireCase::AsDeclared => name.to_owned(),
            },
        }
    }
}
