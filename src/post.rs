//! Defines the [`Post`] and [`Metadata`] types and the [`extract`] function
//! which pulls a post's header block out of its source document.
//!
//! A post document begins with a YAML header block fenced by `---` lines:
//!
//! ```md
//! ---
//! post_title: Hello, world!
//! post_author: Jane Doe
//! post_date: 2024-01-01 10:00
//! post_tags: [greet]
//! post_slug: hello-world
//! post_summary: A greeting.
//! is_public: true
//! ---
//! # Hello
//! ```

use chrono::NaiveDateTime;
use regex::Regex;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

/// The format of the `post_date` header field.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// The header keys every post must define.
pub const REQUIRED_FIELDS: [&str; 7] = [
    "post_title",
    "post_author",
    "post_date",
    "post_tags",
    "post_slug",
    "post_summary",
    "is_public",
];

/// A single blog entry. Posts are created by
/// [`crate::index::build_index`] and are not modified afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The location of the source document.
    pub source_path: PathBuf,

    /// The output directory relative to the site root, e.g.
    /// `2024/01/31/hello-world`. Always `/`-separated so it can be dropped
    /// into links as-is.
    pub destination_dir: String,

    /// The parsed `post_date`.
    pub date: NaiveDateTime,

    /// The header block.
    pub metadata: Metadata,
}

/// The typed contents of a post's header block.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Metadata {
    #[serde(deserialize_with = "scalar_string")]
    pub post_title: String,

    #[serde(deserialize_with = "scalar_string")]
    pub post_author: String,

    /// The raw date, formatted per [`DATE_FORMAT`].
    #[serde(deserialize_with = "scalar_string")]
    pub post_date: String,

    #[serde(deserialize_with = "scalar_strings")]
    pub post_tags: Vec<String>,

    #[serde(deserialize_with = "scalar_string")]
    pub post_slug: String,

    #[serde(deserialize_with = "scalar_string")]
    pub post_summary: String,

    pub is_public: bool,

    /// Any keys beyond [`REQUIRED_FIELDS`]. These are handed to the templates
    /// untouched.
    #[serde(skip)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Metadata {
    /// Parses `post_date` per [`DATE_FORMAT`].
    pub fn date(&self) -> Result<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.post_date, DATE_FORMAT).map_err(|err| {
            Error::InvalidDate {
                date: self.post_date.clone(),
                err,
            }
        })
    }
}

/// Searches `input` for a header block and parses it into [`Metadata`].
///
/// Returns `Ok(None)` when the document has no header block, or when the
/// block is empty; such documents aren't posts and should be skipped. A block
/// which is present but can't be parsed is an error.
pub fn extract(input: &str) -> Result<Option<Metadata>> {
    let block = match header_block(input) {
        Some(block) => block,
        None => return Ok(None),
    };

    let value: serde_yaml::Value = serde_yaml::from_str(block)?;
    let mapping = match value {
        serde_yaml::Value::Null => return Ok(None),
        serde_yaml::Value::Mapping(mapping) if mapping.is_empty() => return Ok(None),
        serde_yaml::Value::Mapping(mapping) => mapping,
        _ => return Err(Error::NotAMapping),
    };

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !mapping.contains_key(&serde_yaml::Value::from(*field)))
        .collect();
    if !missing.is_empty() {
        return Err(Error::MissingFields(missing));
    }

    let mut extra = BTreeMap::new();
    for (key, value) in mapping.iter() {
        if let Some(key) = key.as_str() {
            if !REQUIRED_FIELDS.contains(&key) {
                extra.insert(key.to_owned(), value.clone());
            }
        }
    }

    let mut metadata: Metadata = serde_yaml::from_value(serde_yaml::Value::Mapping(mapping))?;
    metadata.extra = extra;

    if !is_path_segment(&metadata.post_slug) {
        return Err(Error::InvalidSlug(metadata.post_slug));
    }

    Ok(Some(metadata))
}

/// Reports whether `slug` can be used verbatim as a single URL path segment
/// and directory name.
pub fn is_path_segment(slug: &str) -> bool {
    const UNSAFE: &[char] = &['/', '\\', '?', '#', '%', '<', '>', '"'];
    !slug.is_empty()
        && slug != "."
        && !slug.contains("..")
        && !slug
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || UNSAFE.contains(&c))
}

// Returns the text between the opening and closing fences. The opening fence
// must start the document.
fn header_block(input: &str) -> Option<&str> {
    static HEADER: OnceLock<Regex> = OnceLock::new();
    let re = HEADER.get_or_init(|| Regex::new(r"(?s)\A---\s+(.+?)\n---").unwrap());
    re.captures(input).and_then(|c| c.get(1)).map(|m| m.as_str())
}

// Accepts any YAML scalar where a string is expected, so `post_slug: 2024` or
// `post_title: true` read the way they were written.
fn scalar_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    struct ScalarVisitor;

    impl<'de> Visitor<'de> for ScalarVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string or other scalar value")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<String, E> {
            Ok(v.to_owned())
        }

        fn visit_string<E: de::Error>(self, v: String) -> std::result::Result<String, E> {
            Ok(v)
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> std::result::Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(ScalarVisitor)
}

fn scalar_strings<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "scalar_string")] String);

    let v = Vec::deserialize(deserializer)?;
    Ok(v.into_iter().map(|Wrapper(s)| s).collect())
}

/// Represents the result of a header-parsing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a post's header block.
#[derive(Debug)]
pub enum Error {
    /// Returned when the header block isn't valid YAML or a field has the
    /// wrong type.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when the header block is YAML but not a key/value mapping.
    NotAMapping,

    /// Returned when required header keys are absent. Lists all of them.
    MissingFields(Vec<&'static str>),

    /// Returned when `post_date` doesn't match [`DATE_FORMAT`].
    InvalidDate {
        date: String,
        err: chrono::ParseError,
    },

    /// Returned when `post_slug` isn't safe to use as a URL path segment.
    InvalidSlug(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::DeserializeYaml(err) => write!(f, "invalid header block: {}", err),
            Error::NotAMapping => {
                write!(f, "header block must be a list of `key: value` pairs")
            }
            Error::MissingFields(fields) => {
                write!(f, "header block is missing fields: {}", fields.join(", "))
            }
            Error::InvalidDate { date, err } => write!(
                f,
                "invalid post_date `{}` (expected `YYYY-MM-DD HH:MM`): {}",
                date, err
            ),
            Error::InvalidSlug(slug) => write!(
                f,
                "post_slug `{}` is not URL-safe (try `{}`)",
                slug,
                slug::slugify(slug)
            ),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::DeserializeYaml(err) => Some(err),
            Error::InvalidDate { err, .. } => Some(err),
            Error::NotAMapping | Error::MissingFields(_) | Error::InvalidSlug(_) => None,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const MINIMAL: &str = "---\npost_title: X\npost_date: 2024-01-01 10:00\npost_slug: x\npost_tags: [a]\npost_summary: s\npost_author: A\nis_public: true\n---\nbody";

    #[test]
    fn test_extract_minimal() -> Result<()> {
        let metadata = extract(MINIMAL)?.expect("header block");
        assert_eq!(
            Metadata {
                post_title: "X".to_owned(),
                post_author: "A".to_owned(),
                post_date: "2024-01-01 10:00".to_owned(),
                post_tags: vec!["a".to_owned()],
                post_slug: "x".to_owned(),
                post_summary: "s".to_owned(),
                is_public: true,
                extra: BTreeMap::new(),
            },
            metadata
        );
        assert_eq!(
            NaiveDateTime::parse_from_str("2024-01-01 10:00", DATE_FORMAT).unwrap(),
            metadata.date()?
        );
        Ok(())
    }

    #[test]
    fn test_extract_no_header() -> Result<()> {
        assert_eq!(None, extract("# Just a document\n\nNo header here.")?);
        assert_eq!(None, extract("")?);
        Ok(())
    }

    #[test]
    fn test_extract_header_not_at_start() -> Result<()> {
        let input = format!("preamble\n{}", MINIMAL);
        assert_eq!(None, extract(&input)?);
        Ok(())
    }

    #[test]
    fn test_extract_empty_header() -> Result<()> {
        assert_eq!(None, extract("---\n~\n---\nbody")?);
        assert_eq!(None, extract("---\n{}\n---\nbody")?);
        Ok(())
    }

    #[test]
    fn test_extract_lists_missing_fields() {
        match extract("---\npost_title: X\npost_author: A\n---\n") {
            Err(Error::MissingFields(fields)) => assert_eq!(
                vec![
                    "post_date",
                    "post_tags",
                    "post_slug",
                    "post_summary",
                    "is_public"
                ],
                fields
            ),
            other => panic!("expected missing fields, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_malformed_yaml() {
        match extract("---\npost_title: [unclosed\n---\n") {
            Err(Error::DeserializeYaml(_)) => {}
            other => panic!("expected yaml error, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_not_a_mapping() {
        match extract("---\njust some words\n---\n") {
            Err(Error::NotAMapping) => {}
            other => panic!("expected NotAMapping, got {:?}", other),
        }
    }

    #[test]
    fn test_extract_wrong_type() {
        let input = MINIMAL.replace("is_public: true", "is_public: [a]");
        assert!(matches!(extract(&input), Err(Error::DeserializeYaml(_))));
    }

    #[test]
    fn test_extract_scalar_values_as_strings() -> Result<()> {
        let input = MINIMAL
            .replace("post_slug: x", "post_slug: 2024")
            .replace("post_tags: [a]", "post_tags: [rust, 42]");
        let metadata = extract(&input)?.expect("header block");
        assert_eq!("2024", metadata.post_slug);
        assert_eq!(vec!["rust".to_owned(), "42".to_owned()], metadata.post_tags);
        Ok(())
    }

    #[test]
    fn test_extract_keeps_extra_fields() -> Result<()> {
        let input = MINIMAL.replace("is_public: true", "is_public: false\ncover: cat.jpg");
        let metadata = extract(&input)?.expect("header block");
        assert!(!metadata.is_public);
        assert_eq!(
            Some(&serde_yaml::Value::from("cat.jpg")),
            metadata.extra.get("cover")
        );
        assert_eq!(1, metadata.extra.len());
        Ok(())
    }

    #[test]
    fn test_extract_rejects_unsafe_slug() {
        for bad in &["Hello World", "a/b", "what?", "top#1", "100%", "..", "a..b"] {
            let input = MINIMAL.replace("post_slug: x", &format!("post_slug: \"{}\"", bad));
            match extract(&input) {
                Err(Error::InvalidSlug(slug)) => assert_eq!(*bad, slug),
                other => panic!("expected InvalidSlug for `{}`, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_extract_accepts_url_safe_slugs() -> Result<()> {
        for good in &["my_post", "2024_recap", "Intro", "a.b", "v1~draft"] {
            let input = MINIMAL.replace("post_slug: x", &format!("post_slug: {}", good));
            let metadata = extract(&input)?.expect("header block");
            assert_eq!(*good, metadata.post_slug);
        }
        Ok(())
    }

    #[test]
    fn test_invalid_slug_suggests_slugified_form() {
        let err = Error::InvalidSlug("Hello World".to_owned());
        assert_eq!(
            "post_slug `Hello World` is not URL-safe (try `hello-world`)",
            err.to_string()
        );
    }

    #[test]
    fn test_invalid_date() -> Result<()> {
        let input = MINIMAL.replace("2024-01-01 10:00", "January 1st");
        let metadata = extract(&input)?.expect("header block");
        assert!(matches!(metadata.date(), Err(Error::InvalidDate { .. })));
        Ok(())
    }
}
