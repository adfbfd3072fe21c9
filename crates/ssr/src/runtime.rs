//! JsRuntime execution of the server bundle.
//!
//! This module contains the impure side-effect code that executes
//! JavaScript using deno_core's JsRuntime.

use std::cell::RefCell;

use deno_core::{extension, op2, JsRuntime, RuntimeOptions};
use strata_ssr_core::{generate_polyfills, EngineOutput};

use crate::error::{Result, SsrError};

thread_local! {
    /// Serialized output reported by the bundle for the render in progress.
    static RENDER_RESULT: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Receives the serialized [`EngineOutput`] from JavaScript.
#[op2(fast)]
fn op_set_result(#[string] json: String) {
    RENDER_RESULT.with(|cell| {
        *cell.borrow_mut() = Some(json);
    });
}

extension!(strata_ssr_ext, ops = [op_set_result]);

/// Execute the server bundle for one render context.
///
/// **MUST be called from a dedicated thread** - `JsRuntime` is not `Send`.
pub async fn render(bundle_code: &str, context_json: &str, node_env: &str) -> Result<EngineOutput> {
    // A previous render that failed mid-way must not leak its result.
    RENDER_RESULT.with(|cell| cell.borrow_mut().take());

    let polyfills = generate_polyfills(context_json, node_env)?;

    let mut runtime = JsRuntime::new(RuntimeOptions {
        extensions: vec![strata_ssr_ext::init()],
        ..Default::default()
    });

    runtime
        .execute_script("<polyfills>", polyfills)
        .map_err(|e| SsrError::JsExecution(e.to_string()))?;

    runtime
        .execute_script("<server-bundle>", bundle_code.to_string())
        .map_err(|e| SsrError::JsExecution(e.to_string()))?;

    // Run event loop to completion (async components, data fetching)
    runtime
        .run_event_loop(Default::default())
        .await
        .map_err(|e| SsrError::JsExecution(e.to_string()))?;

    let json = RENDER_RESULT
        .with(|cell| cell.borrow_mut().take())
        .ok_or(SsrError::NoOutput)?;

    Ok(EngineOutput::from_json(&json)?)
}
