//! Island request parsing and the island JSON response.
//!
//! An island request renders one component detached from the full document:
//! `/__island/<ComponentName>:<hashId>?format=json&props=...`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::loose::decode_object;
use crate::tags::HtmlTag;

/// Url prefix marking an island request.
pub const ISLAND_MARKER: &str = "/__island";

/// Teleport slot the renderer fills with the island markup.
pub const ISLAND_TELEPORT: &str = "strata-island";

static HTML_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid comment regex"));

/// Requested shape of an island response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IslandFormat {
    Html,
    Json,
}

impl IslandFormat {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "html" => Some(Self::Html),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Descriptor of one island render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IslandContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<IslandFormat>,
    pub name: String,
    #[serde(default)]
    pub props: Map<String, Value>,
}

impl IslandContext {
    /// Whether the island should be answered with the JSON response.
    ///
    /// Only an explicit `format=html` produces a document.
    pub fn wants_json(&self) -> bool {
        self.format != Some(IslandFormat::Html)
    }
}

/// Where the island parameters come from.
#[derive(Debug, Clone, Copy)]
pub enum IslandParams<'a> {
    /// Raw query string (GET requests).
    Query(&'a str),
    /// Decoded request body (every other method).
    Body(Option<&'a Value>),
}

impl IslandParams<'_> {
    fn into_map(self) -> Map<String, Value> {
        match self {
            Self::Query(query) => url::form_urlencoded::parse(query.as_bytes())
                .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
                .collect(),
            Self::Body(Some(Value::Object(map))) => map.clone(),
            Self::Body(_) => Map::new(),
        }
    }
}

/// Parse an island request url and its parameters.
///
/// The path segment after the marker is `componentName:hashId`; everything from
/// `?` on is ignored here since the parameters arrive through `params`. No
/// validation is performed on any field.
pub fn resolve_island_context(url: &str, params: IslandParams<'_>) -> IslandContext {
    let rest = url.get(ISLAND_MARKER.len() + 1..).unwrap_or_default();
    let path = rest.split('?').next().unwrap_or_default();
    let mut segments = path.split(':');
    let name = segments.next().unwrap_or_default().to_string();
    let id = segments.next().map(str::to_string);

    let params = params.into_map();
    let target_url = params
        .get("url")
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .unwrap_or("/")
        .to_string();
    let format = params
        .get("format")
        .and_then(Value::as_str)
        .and_then(IslandFormat::parse);

    IslandContext {
        id,
        url: target_url,
        format,
        name,
        props: decode_props(params.get("props")),
    }
}

/// Decode island props from a serialized or structured value.
///
/// Malformed input yields an empty mapping.
pub fn decode_props(raw: Option<&Value>) -> Map<String, Value> {
    decode_object(raw)
}

/// Remove every `<!-- ... -->` marker the renderer left in a markup slot.
pub fn strip_html_comments(html: &str) -> String {
    HTML_COMMENT_RE.replace_all(html, "").into_owned()
}

/// JSON body returned to island consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IslandResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub html: String,
    pub state: Map<String, Value>,
    pub tags: Vec<HtmlTag>,
}
