//! Wire types exchanged with the server bundle.
//!
//! The bundle reads an [`EngineRequest`] from
//! `globalThis.__STRATA_SSR_CONTEXT__` and reports an [`EngineOutput`] through
//! `__strataSetResult(output)`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strata_core::{IslandContext, Payload, RenderedMeta, RuntimeConfig};

use crate::error::{Result, SsrCoreError, MAX_CONTEXT_SIZE};

/// Request line and headers as seen by the server bundle.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineRequestInfo {
    pub method: String,
    pub headers: BTreeMap<String, String>,
}

/// Render context handed to the server bundle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineRequest {
    pub url: String,
    pub no_ssr: bool,
    pub error: bool,
    pub runtime_config: RuntimeConfig,
    #[serde(default)]
    pub payload: Option<Payload>,
    #[serde(default)]
    pub island: Option<IslandContext>,
    pub request: EngineRequestInfo,
}

impl EngineRequest {
    /// Serialize for injection, rejecting contexts above [`MAX_CONTEXT_SIZE`].
    pub fn to_json(&self) -> Result<String> {
        let json =
            serde_json::to_string(self).map_err(|e| SsrCoreError::Serialization(e.to_string()))?;

        if json.len() > MAX_CONTEXT_SIZE {
            return Err(SsrCoreError::ContextTooLarge {
                size: json.len(),
                max: MAX_CONTEXT_SIZE,
            });
        }

        Ok(json)
    }
}

/// Everything the server bundle reports back after rendering.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineOutput {
    pub html: String,
    pub teleports: BTreeMap<String, String>,
    pub payload: Option<Payload>,
    pub styles: Option<String>,
    pub meta: Option<RenderedMeta>,
    /// Client chunks used while rendering.
    pub modules: Vec<String>,
    pub status_code: Option<u16>,
    pub status_message: Option<String>,
}

impl EngineOutput {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| SsrCoreError::InvalidOutput(e.to_string()))
    }
}
