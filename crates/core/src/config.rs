//! Runtime configuration snapshot shared by every render.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Application-level url settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Public base url the application is mounted under.
    #[serde(rename = "baseURL")]
    pub base_url: String,
    /// Directory, relative to the base url, holding built client assets.
    #[serde(rename = "buildAssetsDir")]
    pub build_assets_dir: String,
    /// Optional CDN origin that replaces the base url for assets.
    #[serde(rename = "cdnURL", default)]
    pub cdn_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "/".to_string(),
            build_assets_dir: "/_strata/".to_string(),
            cdn_url: String::new(),
        }
    }
}

/// Configuration visible to the server bundle during a render.
///
/// Only `app` and `public` ever reach the client payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub app: AppConfig,
    #[serde(default)]
    pub public: Map<String, Value>,
    #[serde(default)]
    pub private: Map<String, Value>,
}

impl RuntimeConfig {
    /// The subset of the configuration that is safe to ship to the client.
    pub fn client_config(&self) -> Value {
        serde_json::json!({
            "public": self.public,
            "app": self.app,
        })
    }
}

/// Url of a built client asset.
pub fn build_assets_url(app: &AppConfig, file: &str) -> String {
    let origin = if app.cdn_url.is_empty() {
        app.base_url.as_str()
    } else {
        app.cdn_url.as_str()
    };
    join_url(&[origin, &app.build_assets_dir, file])
}

/// Join url segments with exactly one slash between them.
fn join_url(segments: &[&str]) -> String {
    let mut joined = String::new();
    for segment in segments.iter().filter(|s| !s.is_empty()) {
        if joined.is_empty() {
            joined.push_str(segment);
            continue;
        }
        match (joined.ends_with('/'), segment.starts_with('/')) {
            (true, true) => joined.push_str(&segment[1..]),
            (false, false) => {
                joined.push('/');
                joined.push_str(segment);
            }
            _ => joined.push_str(segment),
        }
    }
    joined
}
