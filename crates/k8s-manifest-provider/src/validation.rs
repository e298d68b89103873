// This is adapted from Kubernetes.
// See apimachinery/pkg/util/validation/validation.go and apimachinery/pkg/api/validation/generic.go in the Kubernetes source

//! Predicate checks applied to individual configuration values.
//!
//! Every check returns [`Ok`] or an [`Errors`] value containing *all* problems found for the input,
//! so that a single diagnostic can explain everything that is wrong with a value.

use std::{fmt::Display, str::FromStr, sync::LazyLock};

use const_format::concatcp;
use regex::Regex;
use snafu::Snafu;

/// Minimal length required by RFC 1123 is 63. Up to 255 allowed, unsupported by k8s.
const RFC_1123_LABEL_MAX_LENGTH: usize = 63;
const RFC_1123_LABEL_FMT: &str = "[a-z0-9]([-a-z0-9]*[a-z0-9])?";
const RFC_1123_LABEL_ERROR_MSG: &str = "a lowercase RFC 1123 label must consist of lower case alphanumeric characters or '-', and must start and end with an alphanumeric character";

/// This is a subdomain's max length in DNS (RFC 1123)
const RFC_1123_SUBDOMAIN_MAX_LENGTH: usize = 253;
const RFC_1123_SUBDOMAIN_FMT: &str =
    concatcp!(RFC_1123_LABEL_FMT, "(\\.", RFC_1123_LABEL_FMT, ")*");
const RFC_1123_SUBDOMAIN_ERROR_MSG: &str = "a lowercase RFC 1123 subdomain must consist of lower case alphanumeric characters, '-' or '.', and must start and end with an alphanumeric character";

/// Applies to label values and to the name segment of qualified keys.
const QUALIFIED_NAME_MAX_LENGTH: usize = 63;
const QUALIFIED_NAME_FMT: &str = "([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]";
const QUALIFIED_NAME_ERROR_MSG: &str = "name part must consist of alphanumeric characters, '-', '_' or '.', and must start and end with an alphanumeric character";
const LABEL_VALUE_ERROR_MSG: &str = "a valid label must be an empty string or consist of alphanumeric characters, '-', '_' or '.', and must start and end with an alphanumeric character";

// Lazily initialized regular expressions
static RFC_1123_LABEL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{RFC_1123_LABEL_FMT}$")).expect("failed to compile RFC 1123 label regex")
});

static RFC_1123_SUBDOMAIN_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{RFC_1123_SUBDOMAIN_FMT}$"))
        .expect("failed to compile RFC 1123 subdomain regex")
});

static QUALIFIED_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{QUALIFIED_NAME_FMT}$")).expect("failed to compile qualified name regex")
});

type Result<T = (), E = Errors> = std::result::Result<T, E>;

/// A collection of errors discovered during validation.
#[derive(Debug)]
pub struct Errors(Vec<Error>);

impl Errors {
    pub fn iter(&self) -> impl Iterator<Item = &Error> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Error> for Errors {
    fn from(error: Error) -> Self {
        Self(vec![error])
    }
}

impl Display for Errors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            let prefix = match i {
                0 => "",
                _ => ", ",
            };
            write!(f, "{prefix}{error}")?;
        }
        Ok(())
    }
}
impl std::error::Error for Errors {}

/// A single validation error.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(transparent)]
    Regex { source: RegexError },

    #[snafu(display("input is {length} bytes long but must be no more than {max_length}"))]
    TooLong { length: usize, max_length: usize },

    #[snafu(display("input is {length} bytes long but must be at least {min_length}"))]
    TooShort { length: usize, min_length: usize },

    #[snafu(display("input must not be empty"))]
    Empty,

    #[snafu(display("input {value:?} must be one of {allowed:?}"))]
    NotOneOf {
        value: String,
        allowed: &'static [&'static str],
    },

    #[snafu(display("a qualified name must contain at most one '/' separating prefix and name"))]
    NestedPrefix,

    #[snafu(display("prefix part {prefix:?} is invalid: {source}"))]
    InvalidPrefix { prefix: String, source: Errors },

    #[snafu(display("input is not a valid RFC 3339 timestamp"))]
    InvalidTimestamp { source: jiff::Error },
}

#[derive(Debug)]
pub struct RegexError {
    /// The primary error message.
    msg: &'static str,

    /// The regex that the input must match.
    regex: &'static str,

    /// Examples of valid inputs (if non-empty).
    examples: &'static [&'static str],
}

impl Display for RegexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Self {
            msg,
            regex,
            examples,
        } = self;
        write!(f, "{msg} (")?;
        for (i, example) in examples.iter().enumerate() {
            let prefix = match i {
                0 => "e.g.",
                _ => "or",
            };
            write!(f, "{prefix} {example:?}, ")?;
        }
        write!(f, "regex used for validation is {regex:?})")
    }
}

impl std::error::Error for RegexError {}

/// Returns [`Ok`] if `value`'s length fits within `max_length`.
fn validate_str_length(value: &str, max_length: usize) -> Result<(), Error> {
    if value.len() > max_length {
        TooLongSnafu {
            length: value.len(),
            max_length,
        }
        .fail()
    } else {
        Ok(())
    }
}

/// Returns [`Ok`] if `value` matches `regex`.
fn validate_str_regex(
    value: &str,
    regex: &'static Regex,
    error_msg: &'static str,
    examples: &'static [&'static str],
) -> Result<(), Error> {
    if regex.is_match(value) {
        Ok(())
    } else {
        Err(RegexError {
            msg: error_msg,
            regex: regex
                .as_str()
                // Clean up start/end-of-line markers
                .trim_start_matches('^')
                .trim_end_matches('$'),
            examples,
        }
        .into())
    }
}

/// Returns [`Ok`] if *all* validations are [`Ok`], otherwise returns all errors.
fn validate_all(validations: impl IntoIterator<Item = Result<(), Error>>) -> Result {
    let errors = validations
        .into_iter()
        .filter_map(std::result::Result::err)
        .collect::<Vec<_>>();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(Errors(errors))
    }
}

/// Tests for a string that conforms to the definition of a label in DNS (RFC 1123), lower case only.
/// Maximum label length supported by k8s is 63 characters (minimum required).
pub fn is_rfc_1123_label(value: &str) -> Result {
    validate_all([
        validate_str_length(value, RFC_1123_LABEL_MAX_LENGTH),
        validate_str_regex(
            value,
            &RFC_1123_LABEL_REGEX,
            RFC_1123_LABEL_ERROR_MSG,
            &["my-name", "123-abc"],
        ),
    ])
}

/// Tests for a string that conforms to the definition of a subdomain in DNS (RFC 1123), lower case only.
pub fn is_rfc_1123_subdomain(value: &str) -> Result {
    validate_all([
        validate_str_length(value, RFC_1123_SUBDOMAIN_MAX_LENGTH),
        validate_str_regex(
            value,
            &RFC_1123_SUBDOMAIN_REGEX,
            RFC_1123_SUBDOMAIN_ERROR_MSG,
            &["example.com"],
        ),
    ])
}

/// Validates the name of a namespaced object.
///
/// Most resource kinds accept any DNS subdomain as name.
pub fn is_object_name(value: &str) -> Result {
    is_rfc_1123_subdomain(value)
}

/// Validates a namespace name, which must be a DNS label.
pub fn is_namespace_name(value: &str) -> Result {
    is_rfc_1123_label(value)
}

/// Tests for a qualified name as used by label and annotation keys, e.g. `app.kubernetes.io/name`.
///
/// The optional prefix must be a DNS subdomain, the name part must be no longer than 63 characters.
pub fn is_qualified_name(value: &str) -> Result {
    let parts = value.split('/').collect::<Vec<_>>();
    let (prefix, name) = match parts[..] {
        [name] => (None, name),
        [prefix, name] => (Some(prefix), name),
        _ => return Err(Error::NestedPrefix.into()),
    };

    let prefix_validation = prefix.map(|prefix| {
        if prefix.is_empty() {
            return Err(Error::InvalidPrefix {
                prefix: prefix.to_owned(),
                source: Errors::from(Error::Empty),
            });
        }

        is_rfc_1123_subdomain(prefix).map_err(|source| Error::InvalidPrefix {
            prefix: prefix.to_owned(),
            source,
        })
    });

    if name.is_empty() {
        return validate_all(prefix_validation.into_iter().chain([EmptySnafu.fail()]));
    }

    validate_all(prefix_validation.into_iter().chain([
        validate_str_length(name, QUALIFIED_NAME_MAX_LENGTH),
        validate_str_regex(
            name,
            &QUALIFIED_NAME_REGEX,
            QUALIFIED_NAME_ERROR_MSG,
            &["MyName", "my.name", "123-abc"],
        ),
    ]))
}

/// Tests for a valid label value. Label values may be empty.
pub fn is_label_value(value: &str) -> Result {
    if value.is_empty() {
        return Ok(());
    }

    validate_all([
        validate_str_length(value, QUALIFIED_NAME_MAX_LENGTH),
        validate_str_regex(
            value,
            &QUALIFIED_NAME_REGEX,
            LABEL_VALUE_ERROR_MSG,
            &["MyValue", "my_value", "12345"],
        ),
    ])
}

/// Returns [`Ok`] if `value` is one of the `allowed` values. The comparison is case-sensitive.
pub fn is_one_of(value: &str, allowed: &'static [&'static str]) -> Result {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(Error::NotOneOf {
            value: value.to_owned(),
            allowed,
        }
        .into())
    }
}

/// Returns [`Ok`] if `value` is at least `min_length` bytes long.
pub fn has_min_length(value: &str, min_length: usize) -> Result {
    if value.len() < min_length {
        Err(Error::TooShort {
            length: value.len(),
            min_length,
        }
        .into())
    } else {
        Ok(())
    }
}

/// Returns [`Ok`] if `value` matches `regex`, reporting `error_msg` otherwise.
pub fn matches_regex(value: &str, regex: &'static Regex, error_msg: &'static str) -> Result {
    validate_all([validate_str_regex(value, regex, error_msg, &[])])
}

/// Tests for an RFC 3339 timestamp, e.g. `2024-01-01T12:00:00Z`.
pub fn is_rfc_3339_timestamp(value: &str) -> Result {
    jiff::Timestamp::from_str(value)
        .map(|_| ())
        .map_err(|source| Error::InvalidTimestamp { source }.into())
}
