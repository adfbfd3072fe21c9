//! Client asset manifest and the head/body fragments derived from it.
//!
//! The manifest is produced by the client build (Vite format). The renderer
//! only consumes it: every chunk reachable from an entry or from a module the
//! app reported during render is preloaded, its styles linked, and the entries
//! loaded as module scripts.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::{build_assets_url, AppConfig};
use crate::error::{CoreError, Result};

/// One chunk of the client build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestChunk {
    pub file: String,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub is_entry: bool,
    #[serde(default)]
    pub is_dynamic_entry: bool,
    #[serde(default)]
    pub css: Vec<String>,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub dynamic_imports: Vec<String>,
}

/// Client build manifest keyed by chunk id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientManifest(pub BTreeMap<String, ManifestChunk>);

/// Pre-rendered asset fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedAssets {
    pub resource_hints: String,
    pub styles: String,
    pub scripts: String,
}

impl ClientManifest {
    /// Parse a manifest from its JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CoreError::InvalidManifest(e.to_string()))
    }

    pub fn chunk(&self, id: &str) -> Option<&ManifestChunk> {
        self.0.get(id)
    }

    /// Ids of the entry chunks, in manifest order.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, chunk)| chunk.is_entry)
            .map(|(id, _)| id.as_str())
    }

    /// Render preload hints, stylesheet links and entry scripts.
    ///
    /// `modules` are ids (or source paths) of chunks used while rendering on
    /// top of the entries; unknown ids are ignored.
    pub fn render_assets(&self, app: &AppConfig, modules: &BTreeSet<String>) -> RenderedAssets {
        let mut roots: Vec<&str> = self.entries().collect();
        for module in modules {
            if let Some(id) = self.resolve_module(module) {
                if !roots.contains(&id) {
                    roots.push(id);
                }
            }
        }

        let mut visited = HashSet::new();
        let mut preload = Vec::new();
        let mut css = Vec::new();
        let mut dynamic = Vec::new();
        for root in &roots {
            self.collect(root, &mut visited, &mut preload, &mut css, &mut dynamic);
        }

        let mut resource_hints = String::new();
        for file in &preload {
            resource_hints.push_str(&format!(
                r#"<link rel="modulepreload" as="script" crossorigin href="{}">"#,
                build_assets_url(app, file)
            ));
        }
        let preloaded: HashSet<&str> = preload.iter().copied().collect();
        for file in dynamic.iter().filter(|file| !preloaded.contains(*file)) {
            resource_hints.push_str(&format!(
                r#"<link rel="prefetch" as="script" crossorigin href="{}">"#,
                build_assets_url(app, file)
            ));
        }

        let styles = css
            .iter()
            .map(|file| {
                format!(
                    r#"<link rel="stylesheet" href="{}">"#,
                    build_assets_url(app, file)
                )
            })
            .collect();

        let scripts = self
            .entries()
            .filter_map(|id| self.chunk(id))
            .map(|chunk| {
                format!(
                    r#"<script type="module" src="{}" crossorigin></script>"#,
                    build_assets_url(app, &chunk.file)
                )
            })
            .collect();

        RenderedAssets {
            resource_hints,
            styles,
            scripts,
        }
    }

    fn resolve_module(&self, module: &str) -> Option<&str> {
        if let Some((id, _)) = self.0.get_key_value(module) {
            return Some(id.as_str());
        }
        self.0
            .iter()
            .find(|(_, chunk)| chunk.src.as_deref() == Some(module))
            .map(|(id, _)| id.as_str())
    }

    fn collect<'a>(
        &'a self,
        id: &str,
        visited: &mut HashSet<&'a str>,
        preload: &mut Vec<&'a str>,
        css: &mut Vec<&'a str>,
        dynamic: &mut Vec<&'a str>,
    ) {
        let Some((id, chunk)) = self.0.get_key_value(id) else {
            return;
        };
        if !visited.insert(id.as_str()) {
            return;
        }

        if chunk.file.ends_with(".js") || chunk.file.ends_with(".mjs") {
            preload.push(&chunk.file);
        }
        for file in &chunk.css {
            if !css.contains(&file.as_str()) {
                css.push(file);
            }
        }
        for import in &chunk.dynamic_imports {
            if let Some(target) = self.chunk(import) {
                if !dynamic.contains(&target.file.as_str()) {
                    dynamic.push(&target.file);
                }
            }
        }
        for import in &chunk.imports {
            self.collect(import, visited, preload, css, dynamic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> ClientManifest {
        ClientManifest::from_json(
            r#"{
                "src/entry.ts": {
                    "file": "entry.a1.js",
                    "src": "src/entry.ts",
                    "isEntry": true,
                    "css": ["entry.a1.css"],
                    "imports": ["_vendor.js"],
                    "dynamicImports": ["pages/about.vue"]
                },
                "_vendor.js": {
                    "file": "vendor.b2.js",
                    "css": ["vendor.b2.css"]
                },
                "pages/about.vue": {
                    "file": "about.c3.js",
                    "src": "pages/about.vue",
                    "isDynamicEntry": true,
                    "css": ["about.c3.css"],
                    "imports": ["_vendor.js"]
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_entries() {
        let manifest = manifest();
        let entries: Vec<&str> = manifest.entries().collect();
        assert_eq!(entries, vec!["src/entry.ts"]);
    }

    #[test]
    fn test_render_assets_for_entries() {
        let assets = manifest().render_assets(&AppConfig::default(), &BTreeSet::new());

        assert_eq!(
            assets.resource_hints,
            concat!(
                r#"<link rel="modulepreload" as="script" crossorigin href="/_strata/entry.a1.js">"#,
                r#"<link rel="modulepreload" as="script" crossorigin href="/_strata/vendor.b2.js">"#,
                r#"<link rel="prefetch" as="script" crossorigin href="/_strata/about.c3.js">"#,
            )
        );
        assert_eq!(
            assets.styles,
            concat!(
                r#"<link rel="stylesheet" href="/_strata/entry.a1.css">"#,
                r#"<link rel="stylesheet" href="/_strata/vendor.b2.css">"#,
            )
        );
        assert_eq!(
            assets.scripts,
            r#"<script type="module" src="/_strata/entry.a1.js" crossorigin></script>"#
        );
    }

    #[test]
    fn test_render_assets_includes_rendered_modules() {
        let modules = BTreeSet::from(["pages/about.vue".to_string()]);
        let assets = manifest().render_assets(&AppConfig::default(), &modules);

        assert!(assets
            .resource_hints
            .contains(r#"rel="modulepreload" as="script" crossorigin href="/_strata/about.c3.js""#));
        assert!(!assets.resource_hints.contains("prefetch"));
        assert!(assets.styles.contains("about.c3.css"));
        // Only entries become scripts.
        assert!(!assets.scripts.contains("about.c3.js"));
    }

    #[test]
    fn test_unknown_modules_are_ignored() {
        let modules = BTreeSet::from(["does/not/exist.vue".to_string()]);
        let with_unknown = manifest().render_assets(&AppConfig::default(), &modules);
        let plain = manifest().render_assets(&AppConfig::default(), &BTreeSet::new());
        assert_eq!(with_unknown, plain);
    }

    #[test]
    fn test_invalid_manifest() {
        let result = ClientManifest::from_json("[1, 2]");
        assert!(matches!(result, Err(CoreError::InvalidManifest(_))));
    }

    #[test]
    fn test_empty_manifest_renders_nothing() {
        let assets = ClientManifest::default().render_assets(&AppConfig::default(), &BTreeSet::new());
        assert_eq!(assets, RenderedAssets::default());
    }
}
