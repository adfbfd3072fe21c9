//! Permissive head tag extraction.
//!
//! This is not an HTML parser. It exposes the tags of a head fragment to island
//! consumers with a single scan and accepts the following limitations:
//! unquoted or single-quoted attribute values are skipped, and a `>` inside an
//! attribute value ends the tag early.

use std::sync::LazyLock;

use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};

static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?P<tag>[a-z][a-z0-9]*)(?P<raw_attrs>\s[^>]*)>").expect("valid tag regex")
});

static HTML_TAG_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?P<name>[a-z][a-z0-9_:-]*)="(?P<value>[^"]*)""#).expect("valid attr regex")
});

/// Attributes of an extracted tag, in source order.
///
/// Serializes as a JSON object. A repeated attribute keeps its first position
/// and its last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlAttrs(Vec<(String, String)>);

impl HtmlAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl Serialize for HtmlAttrs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A `(tagName, attributes)` pair. Serializes as a two-element JSON array.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HtmlTag(pub String, pub HtmlAttrs);

impl HtmlTag {
    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn attrs(&self) -> &HtmlAttrs {
        &self.1
    }
}

/// Extract opening tags and their `name="value"` attributes from a head fragment.
///
/// Closing tags, self-closing tags and tags without attributes are not
/// reported.
pub fn extract_html_tags(html: &str) -> Vec<HtmlTag> {
    HTML_TAG_RE
        .captures_iter(html)
        .filter(|caps| !caps["raw_attrs"].trim_end().ends_with('/'))
        .map(|caps| {
            let mut attrs = HtmlAttrs::new();
            for attr in HTML_TAG_ATTR_RE.captures_iter(&caps["raw_attrs"]) {
                attrs.insert(&attr["name"], &attr["value"]);
            }
            HtmlTag(caps["tag"].to_string(), attrs)
        })
        .collect()
}
