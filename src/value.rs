//! Conversions from posts and header values into template [`Value`]s.

use crate::post::{Metadata, Post};
use gtmpl_value::Value;
use std::collections::HashMap;

/// Converts a [`Post`] into a [`Value::Object`] with fields `source_path`,
/// `destination_dir`, `url`, `date`, and `metadata`. `url` is the post's
/// link, prefixed with `root_url`.
pub fn post_value(post: &Post, root_url: &str) -> Value {
    let mut m: HashMap<String, Value> = HashMap::new();
    m.insert(
        "source_path".to_owned(),
        Value::String(post.source_path.display().to_string()),
    );
    m.insert(
        "destination_dir".to_owned(),
        Value::String(post.destination_dir.clone()),
    );
    m.insert(
        "url".to_owned(),
        Value::String(crate::render::post_url(root_url, &post.destination_dir)),
    );
    m.insert(
        "date".to_owned(),
        Value::String(post.date.format(crate::post::DATE_FORMAT).to_string()),
    );
    m.insert("metadata".to_owned(), Value::from(&post.metadata));
    Value::Object(m)
}

impl From<&Metadata> for Value {
    /// Converts [`Metadata`] into a [`Value::Object`] keyed by header field.
    /// Extra header fields are included alongside the required ones.
    fn from(meta: &Metadata) -> Value {
        let mut m: HashMap<String, Value> = meta
            .extra
            .iter()
            .map(|(k, v)| (k.clone(), yaml_value(v)))
            .collect();
        m.insert("post_title".to_owned(), Value::String(meta.post_title.clone()));
        m.insert("post_author".to_owned(), Value::String(meta.post_author.clone()));
        m.insert("post_date".to_owned(), Value::String(meta.post_date.clone()));
        m.insert(
            "post_tags".to_owned(),
            Value::Array(meta.post_tags.iter().cloned().map(Value::String).collect()),
        );
        m.insert("post_slug".to_owned(), Value::String(meta.post_slug.clone()));
        m.insert(
            "post_summary".to_owned(),
            Value::String(meta.post_summary.clone()),
        );
        m.insert("is_public".to_owned(), Value::Bool(meta.is_public));
        Value::Object(m)
    }
}

/// Converts an arbitrary YAML value from a header block.
pub fn yaml_value(v: &serde_yaml::Value) -> Value {
    use serde_yaml::Value as Yaml;
    match v {
        Yaml::Null => Value::Nil,
        Yaml::Bool(b) => Value::Bool(*b),
        Yaml::Number(n) => match n.as_i64() {
            Some(i) => Value::from(i),
            None => match n.as_u64() {
                Some(u) => Value::from(u),
                None => Value::from(n.as_f64().unwrap_or_default()),
            },
        },
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Sequence(seq) => Value::Array(seq.iter().map(yaml_value).collect()),
        Yaml::Mapping(mapping) => Value::Object(
            mapping
                .iter()
                .filter_map(|(k, v)| k.as_str().map(|k| (k.to_owned(), yaml_value(v))))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::BTreeMap;

    fn metadata() -> Metadata {
        let mut extra = BTreeMap::new();
        extra.insert("cover".to_owned(), serde_yaml::Value::from("cat.jpg"));
        Metadata {
            post_title: "X".to_owned(),
            post_author: "A".to_owned(),
            post_date: "2024-01-01 10:00".to_owned(),
            post_tags: vec!["a".to_owned(), "b".to_owned()],
            post_slug: "x".to_owned(),
            post_summary: "s".to_owned(),
            is_public: true,
            extra,
        }
    }

    fn string(v: Option<&Value>) -> &str {
        match v {
            Some(Value::String(s)) => s,
            _ => panic!("expected a string value"),
        }
    }

    #[test]
    fn test_metadata_value() {
        let m = match Value::from(&metadata()) {
            Value::Object(m) => m,
            _ => panic!("expected an object"),
        };
        assert_eq!("X", string(m.get("post_title")));
        assert_eq!("cat.jpg", string(m.get("cover")));
        assert!(matches!(m.get("is_public"), Some(Value::Bool(true))));
        match m.get("post_tags") {
            Some(Value::Array(tags)) => {
                assert_eq!(2, tags.len());
                assert_eq!("b", string(tags.get(1)));
            }
            _ => panic!("expected an array of tags"),
        }
        assert_eq!(8, m.len());
    }

    #[test]
    fn test_yaml_value() {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str("{name: n, tags: [x, ~], flag: false}").unwrap();
        let m = match yaml_value(&yaml) {
            Value::Object(m) => m,
            _ => panic!("expected an object"),
        };
        assert_eq!("n", string(m.get("name")));
        assert!(matches!(m.get("flag"), Some(Value::Bool(false))));
        match m.get("tags") {
            Some(Value::Array(tags)) => {
                assert_eq!("x", string(tags.get(0)));
                assert!(matches!(tags.get(1), Some(Value::Nil)));
            }
            _ => panic!("expected an array"),
        }
    }
}
