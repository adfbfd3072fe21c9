//! Pure rendering logic - no I/O, no async, no side effects.
//!
//! This crate provides:
//! - The render data model (payload, island context, island response)
//! - HTML document assembly from ordered fragment lists
//! - Head tag extraction for island consumers
//! - Client manifest fragment rendering (preloads, styles, scripts)
//! - Runtime configuration and the hydration state serializer
//!
//! # Example
//!
//! ```
//! use strata_core::{normalize_chunks, render_html_document, HtmlContext};
//!
//! let html = HtmlContext {
//!     html_attrs: vec![r#"lang="en""#.to_string()],
//!     head: normalize_chunks([Some(" <title>T</title> ")]),
//!     body: vec!["<div>X</div>".to_string()],
//!     ..Default::default()
//! };
//!
//! assert_eq!(
//!     render_html_document(&html),
//!     r#"<!DOCTYPE html><html lang="en"><head><title>T</title></head><body ><div>X</div></body></html>"#
//! );
//! ```

pub mod config;
pub mod document;
mod error;
pub mod island;
pub mod loose;
pub mod manifest;
pub mod payload;
pub mod serializer;
pub mod tags;

pub use config::{build_assets_url, AppConfig, RuntimeConfig};
pub use document::{normalize_chunks, render_html_document, HtmlContext};
pub use error::{CoreError, Result};
pub use island::{
    decode_props, resolve_island_context, strip_html_comments, IslandContext, IslandFormat,
    IslandParams, IslandResponse, ISLAND_MARKER, ISLAND_TELEPORT,
};
pub use loose::decode_loose;
pub use manifest::{ClientManifest, ManifestChunk, RenderedAssets};
pub use payload::{Payload, PayloadError, RenderedMeta, ERROR_MARKER};
pub use serializer::{render_state_script, JsonStateSerializer, StateSerializer, STATE_GLOBAL};
pub use tags::{extract_html_tags, HtmlAttrs, HtmlTag};
