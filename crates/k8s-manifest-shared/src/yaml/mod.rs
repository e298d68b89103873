//! Utility functions for processing data in the YAML file format
use std::io::Write;

use serde::{Serialize, de::DeserializeOwned};
use snafu::{ResultExt, Snafu};

type Result<T, E = Error> = std::result::Result<T, E>;

/// Represents every error which can be encountered during YAML (de)serialization.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to serialize YAML"))]
    SerializeYaml { source: serde_yaml::Error },

    #[snafu(display("failed to deserialize YAML"))]
    DeserializeYaml { source: serde_yaml::Error },

    #[snafu(display("failed to write YAML document separator"))]
    WriteDocumentSeparator { source: std::io::Error },

    #[snafu(display("failed to parse bytes as valid UTF-8 string"))]
    ParseUtf8Bytes { source: std::string::FromUtf8Error },
}

/// Provides configurable options during YAML serialization.
///
/// Manifests are rendered without a leading document separator, which is what
/// [`SerializeOptions::default()`] produces. Use [`SerializeOptions::explicit_document()`]
/// when multiple documents are written into one stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Adds leading triple dashes (`---`) to the output string.
    pub explicit_document: bool,

    /// Serialize enum variants as YAML maps using the variant name as the key.
    pub singleton_map: bool,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            explicit_document: false,
            singleton_map: true,
        }
    }
}

impl SerializeOptions {
    /// Same as the default options, but every document starts with `---`.
    pub fn explicit_document() -> Self {
        Self {
            explicit_document: true,
            ..Self::default()
        }
    }
}

/// Serializes the given data structure and writes it to a [`Writer`](Write).
pub fn serialize<T, W>(value: &T, mut writer: W, options: SerializeOptions) -> Result<()>
where
    T: Serialize,
    W: Write,
{
    if options.explicit_document {
        writer
            .write_all(b"---\n")
            .context(WriteDocumentSeparatorSnafu)?;
    }

    let mut serializer = serde_yaml::Serializer::new(writer);

    if options.singleton_map {
        serde_yaml::with::singleton_map_recursive::serialize(value, &mut serializer)
            .context(SerializeYamlSnafu)?;
    } else {
        value
            .serialize(&mut serializer)
            .context(SerializeYamlSnafu)?;
    }

    Ok(())
}

/// Serializes the given data structure into a YAML [`String`].
///
/// # Example
///
/// ```
/// use k8s_manifest_shared::yaml::{self, SerializeOptions};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// #[serde(rename_all = "camelCase")]
/// struct Metadata {
///     name: String,
///     #[serde(skip_serializing_if = "Option::is_none")]
///     namespace: Option<String>,
/// }
///
/// let value = Metadata {
///     name: "am1".into(),
///     namespace: None,
/// };
///
/// let actual_yaml = yaml::to_string(&value, SerializeOptions::default()).unwrap();
/// assert_eq!(actual_yaml, "name: am1\n");
/// ```
pub fn to_string<T>(value: &T, options: SerializeOptions) -> Result<String>
where
    T: Serialize,
{
    let mut buffer = Vec::new();
    serialize(value, &mut buffer, options)?;

    String::from_utf8(buffer).context(ParseUtf8BytesSnafu)
}

/// Deserializes a single YAML document into `T`.
pub fn from_str<T>(input: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_yaml::from_str(input).context(DeserializeYamlSnafu)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use indoc::indoc;
    use rstest::rstest;

    use super::*;

    #[derive(Debug, PartialEq, Eq, Serialize)]
    #[serde(rename_all = "camelCase")]
    enum Source {
        Inline(String),
    }

    #[derive(Debug, PartialEq, Eq, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Spec {
        source: Source,
        labels: BTreeMap<String, String>,
    }

    fn spec() -> Spec {
        Spec {
            source: Source::Inline("http://localhost".into()),
            labels: BTreeMap::from([
                ("b".to_owned(), "2".to_owned()),
                ("a".to_owned(), "1".to_owned()),
            ]),
        }
    }

    #[rstest]
    #[case(SerializeOptions::default(), indoc! {"
        source:
          inline: http://localhost
        labels:
          a: '1'
          b: '2'
    "})]
    #[case(SerializeOptions::explicit_document(), indoc! {"
        ---
        source:
          inline: http://localhost
        labels:
          a: '1'
          b: '2'
    "})]
    fn serialize_with_options(#[case] options: SerializeOptions, #[case] expected: &str) {
        let actual = to_string(&spec(), options).expect("test value serializes");
        assert_eq!(actual, expected);
    }

    #[test]
    fn serialize_is_deterministic() {
        let first = to_string(&spec(), SerializeOptions::default()).expect("test value serializes");
        let second =
            to_string(&spec(), SerializeOptions::default()).expect("test value serializes");
        assert_eq!(first, second);
    }

    #[test]
    fn round_trip() {
        let labels = spec().labels;
        let yaml = to_string(&labels, SerializeOptions::default()).expect("test value serializes");
        let decoded: BTreeMap<String, String> = from_str(&yaml).expect("serialized YAML is valid");
        assert_eq!(decoded, labels);
    }

    #[test]
    fn deserialize_invalid_input() {
        let result = from_str::<BTreeMap<String, String>>("source: [");
        assert!(matches!(result, Err(Error::DeserializeYaml { .. })));
    }
}
