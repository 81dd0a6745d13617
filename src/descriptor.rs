//! Per-book `info` descriptors.
//!
//! Both dialects are parsed into a generic JSON value and normalized by the
//! same code into a [`Descriptor`], so the record assembly never sees which
//! dialect a field came from.

use std::path::Path;

use serde_json::{Map, Value};

use crate::formats::Site;

pub const YAML_DESCRIPTOR: &str = "info.yaml";
pub const JSON_DESCRIPTOR: &str = "info.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Yaml,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
    #[error("invalid YAML")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid JSON")]
    Json(#[from] serde_json::Error),
    #[error("descriptor root must be a mapping, found {0}")]
    NotAMapping(&'static str),
}

impl Dialect {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Yaml => YAML_DESCRIPTOR,
            Self::Json => JSON_DESCRIPTOR,
        }
    }

    pub fn site(self) -> Site {
        match self {
            Self::Yaml => Site::Anchira,
            Self::Json => Site::Nexus,
        }
    }

    /// Infers the dialect from a descriptor's file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    pub fn parse(self, text: &str) -> Result<Descriptor, DescriptorError> {
        let value = match self {
            Self::Yaml => serde_yaml::from_str::<Value>(text)?,
            Self::Json => serde_json::from_str::<Value>(text)?,
        };
        match value {
            Value::Object(fields) => Ok(Descriptor::from_fields(&fields)),
            other => Err(DescriptorError::NotAMapping(value_kind(&other))),
        }
    }
}

/// Descriptor fields after loose-typing has been resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor {
    pub title: Option<String>,
    pub artists: Vec<String>,
    pub tags: Vec<String>,
    pub parodies: Vec<String>,
    pub groups: Vec<String>,
    pub pages: Option<u64>,
    pub source: Option<String>,
}

impl Descriptor {
    pub fn from_fields(fields: &Map<String, Value>) -> Self {
        let parodies = match fields.get("Parody") {
            Some(value) => text_list("Parody", value),
            None => fields
                .get("Series")
                .map(|value| text_list("Series", value))
                .unwrap_or_default(),
        };

        Self {
            title: fields.get("Title").and_then(|v| text("Title", v)),
            artists: fields
                .get("Artist")
                .map(|v| text_list("Artist", v))
                .unwrap_or_default(),
            tags: fields
                .get("Tags")
                .map(|v| text_list("Tags", v))
                .unwrap_or_default(),
            parodies,
            groups: fields
                .get("Groups")
                .map(|v| text_list("Groups", v))
                .unwrap_or_default(),
            pages: fields.get("Pages").and_then(|v| count("Pages", v)),
            source: fields.get("Source").and_then(|v| text("Source", v)),
        }
    }
}

fn text(field: &str, value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        other => {
            tracing::warn!(field, found = value_kind(other), "ignoring non-text field");
            None
        }
    }
}

fn text_list(field: &str, value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| text(field, item))
            .collect(),
        Value::Null => Vec::new(),
        Value::String(_) | Value::Number(_) | Value::Bool(_) => {
            text(field, value).into_iter().collect()
        }
        other => {
            tracing::warn!(field, found = value_kind(other), "ignoring non-list field");
            Vec::new()
        }
    }
}

fn count(field: &str, value: &Value) -> Option<u64> {
    let parsed = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    if parsed.is_none() && !value.is_null() {
        tracing::warn!(field, %value, "ignoring field that is not a page count");
    }
    parsed
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_descriptor_with_lists() -> anyhow::Result<()> {
        let descriptor = Dialect::Yaml.parse(
            "Title: Summer Days\n\
Artist:\n  - Jane Doe\n  - John Roe\n\
Tags:\n  - full color\n  - romance\n\
Parody:\n  - Original Work\n\
Pages: 24\n\
Source: https://example.com/g/1\n",
        )?;

        assert_eq!(descriptor.title.as_deref(), Some("Summer Days"));
        assert_eq!(descriptor.artists, vec!["Jane Doe", "John Roe"]);
        assert_eq!(descriptor.tags, vec!["full color", "romance"]);
        assert_eq!(descriptor.parodies, vec!["Original Work"]);
        assert_eq!(descriptor.pages, Some(24));
        assert_eq!(descriptor.source.as_deref(), Some("https://example.com/g/1"));
        Ok(())
    }

    #[test]
    fn json_descriptor_with_scalar_artist_and_groups() -> anyhow::Result<()> {
        let descriptor = Dialect::Json.parse(
            r#"{"Title": "Night Walk", "Artist": "Jane Doe", "Groups": ["Circle A"], "Extra": 1}"#,
        )?;

        assert_eq!(descriptor.artists, vec!["Jane Doe"]);
        assert_eq!(descriptor.groups, vec!["Circle A"]);
        assert!(descriptor.tags.is_empty());
        assert_eq!(descriptor.pages, None);
        assert_eq!(descriptor.source, None);
        Ok(())
    }

    #[test]
    fn wrong_types_fall_back_to_absent() -> anyhow::Result<()> {
        let descriptor = Dialect::Json.parse(
            r#"{"Title": ["x"], "Tags": {"a": 1}, "Pages": "many", "Artist": [[1], "Jane"]}"#,
        )?;

        assert_eq!(descriptor.title, None);
        assert!(descriptor.tags.is_empty());
        assert_eq!(descriptor.pages, None);
        assert_eq!(descriptor.artists, vec!["Jane"]);
        Ok(())
    }

    #[test]
    fn numeric_yaml_names_become_text() -> anyhow::Result<()> {
        let descriptor = Dialect::Yaml.parse(
            "Title: 1984\n\
Parody: 1984\n\
Artist: 2501\n\
Tags:\n  - 2024\n  - romance\n  - true\n\
Groups:\n  - 7\n",
        )?;

        assert_eq!(descriptor.title.as_deref(), Some("1984"));
        assert_eq!(descriptor.parodies, vec!["1984"]);
        assert_eq!(descriptor.artists, vec!["2501"]);
        assert_eq!(descriptor.tags, vec!["2024", "romance", "true"]);
        assert_eq!(descriptor.groups, vec!["7"]);
        Ok(())
    }

    #[test]
    fn page_count_accepts_numeric_text() -> anyhow::Result<()> {
        let descriptor = Dialect::Yaml.parse("Pages: \"12\"\n")?;
        assert_eq!(descriptor.pages, Some(12));

        let descriptor = Dialect::Json.parse(r#"{"Pages": -3}"#)?;
        assert_eq!(descriptor.pages, None);
        Ok(())
    }

    #[test]
    fn series_is_read_when_parody_is_absent() -> anyhow::Result<()> {
        let descriptor = Dialect::Yaml.parse("Series: Space Opera\n")?;
        assert_eq!(descriptor.parodies, vec!["Space Opera"]);

        let descriptor = Dialect::Yaml.parse("Parody: A\nSeries: B\n")?;
        assert_eq!(descriptor.parodies, vec!["A"]);
        Ok(())
    }

    #[test]
    fn non_mapping_root_is_rejected() {
        let err = Dialect::Json.parse("[1, 2]").unwrap_err();
        assert!(matches!(err, DescriptorError::NotAMapping("list")));

        let err = Dialect::Yaml.parse("just a line\n").unwrap_err();
        assert!(matches!(err, DescriptorError::NotAMapping("string")));
    }

    #[test]
    fn invalid_syntax_is_an_error() {
        assert!(matches!(
            Dialect::Json.parse("{\"Title\": "),
            Err(DescriptorError::Json(_))
        ));
        assert!(matches!(
            Dialect::Yaml.parse("Title: [unclosed\n"),
            Err(DescriptorError::Yaml(_))
        ));
    }

    #[test]
    fn dialect_from_extension() {
        assert_eq!(Dialect::from_path(Path::new("a/info.yaml")), Some(Dialect::Yaml));
        assert_eq!(Dialect::from_path(Path::new("a/info.YML")), Some(Dialect::Yaml));
        assert_eq!(Dialect::from_path(Path::new("a/info.json")), Some(Dialect::Json));
        assert_eq!(Dialect::from_path(Path::new("a/info.txt")), None);
    }
}
