//! Hydration payload, application errors and render metadata.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::loose::{decode_loose, deserialize_loose_u16};

/// Url prefix marking an error-page request.
pub const ERROR_MARKER: &str = "/__error";

/// Application state delivered to the client runtime for hydration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_rendered: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default)]
    pub state: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<PayloadError>,
    /// Fields the application added that the core does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Payload {
    /// Initial payload of an error-page render.
    pub fn with_error(error: PayloadError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

/// Error condition carried by the payload.
///
/// Application code sets it while rendering; error-page requests receive it
/// pre-populated from their query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_loose_u16",
        skip_serializing_if = "Option::is_none"
    )]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl PayloadError {
    /// Build the error from an error-page query string.
    pub fn from_query(query: &str) -> Self {
        let mut error = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = value.into_owned();
            match key.as_ref() {
                "url" => error.url = Some(value),
                "statusCode" => error.status_code = value.trim().parse().ok(),
                "statusMessage" => error.status_message = Some(value),
                "message" => error.message = Some(value),
                "description" => error.description = Some(value),
                "data" => error.data = Some(decode_loose(&value)),
                _ => {}
            }
        }
        error
    }

    /// Encode the error as an error-page query string.
    pub fn to_query(&self) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        if let Some(url) = &self.url {
            query.append_pair("url", url);
        }
        if let Some(code) = self.status_code {
            query.append_pair("statusCode", &code.to_string());
        }
        if let Some(status_message) = &self.status_message {
            query.append_pair("statusMessage", status_message);
        }
        if let Some(message) = &self.message {
            query.append_pair("message", message);
        }
        if let Some(description) = &self.description {
            query.append_pair("description", description);
        }
        if let Some(data) = &self.data {
            query.append_pair("data", &data.to_string());
        }
        query.finish()
    }

    /// Url of the error-page request that renders this error.
    pub fn error_page_url(&self) -> String {
        format!("{ERROR_MARKER}?{}", self.to_query())
    }
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self
            .message
            .as_deref()
            .or(self.status_message.as_deref())
            .unwrap_or("Application error");
        match self.status_code {
            Some(code) => write!(f, "{code}: {message}"),
            None => f.write_str(message),
        }
    }
}

impl std::error::Error for PayloadError {}

/// Head and body fragments produced by the application's metadata manager.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedMeta {
    #[serde(default)]
    pub html_attrs: Option<String>,
    #[serde(default)]
    pub head_tags: Option<String>,
    #[serde(default)]
    pub body_attrs: Option<String>,
    #[serde(default)]
    pub body_scripts_prepend: Option<String>,
    #[serde(default)]
    pub body_scripts: Option<String>,
}
