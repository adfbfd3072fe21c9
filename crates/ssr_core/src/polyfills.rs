//! Pure polyfill generation for the server bundle.
//!
//! The bundle runs on a bare `deno_core` runtime, so the few Web and Node APIs
//! it relies on are provided here as plain JavaScript.

use crate::error::{Result, SsrCoreError};

/// Generate the prelude evaluated before the server bundle.
///
/// The context is injected by double-encoding it: a JSON string containing
/// JSON, handed to `JSON.parse`, so it can never be evaluated as code.
pub fn generate_polyfills(context_json: &str, node_env: &str) -> Result<String> {
    let context_json_escaped = serde_json::to_string(context_json)
        .map_err(|e| SsrCoreError::Serialization(e.to_string()))?;

    let node_env_escaped = node_env.replace('\\', "\\\\").replace('\'', "\\'");

    Ok(format!(
        r#"
// Render context - safely injected by Rust
globalThis.__STRATA_SSR_CONTEXT__ = JSON.parse({context_json_escaped});

globalThis.process = {{
    env: {{ NODE_ENV: '{node_env_escaped}' }},
    nextTick: (fn) => queueMicrotask(fn),
}};

{RESULT_HELPER}
{CONSOLE_POLYFILL}
{PERFORMANCE_POLYFILL}
{TEXT_ENCODER_POLYFILL}
"#
    ))
}

const RESULT_HELPER: &str = r#"
// Report the render output back to Rust
globalThis.__strataSetResult = (output) => Deno.core.ops.op_set_result(JSON.stringify(output));
"#;

const CONSOLE_POLYFILL: &str = r#"
// Console polyfill - forward JS logs to Rust stdout
const __fmt = (args) => args.map(a => typeof a === 'object' ? JSON.stringify(a) : String(a)).join(' ');
globalThis.console = {
    log: (...args) => Deno.core.print('[JS] ' + __fmt(args) + '\n', false),
    info: (...args) => Deno.core.print('[JS] ' + __fmt(args) + '\n', false),
    warn: (...args) => Deno.core.print('[JS WARN] ' + __fmt(args) + '\n', false),
    error: (...args) => Deno.core.print('[JS ERROR] ' + __fmt(args) + '\n', true),
    debug: () => {},
};
"#;

const PERFORMANCE_POLYFILL: &str = r#"
const performanceStart = Date.now();
globalThis.performance = { now: () => Date.now() - performanceStart };
"#;

const TEXT_ENCODER_POLYFILL: &str = r#"
class TextEncoderPolyfill {
    encode(str) {
        const utf8 = unescape(encodeURIComponent(str));
        const result = new Uint8Array(utf8.length);
        for (let i = 0; i < utf8.length; i++) result[i] = utf8.charCodeAt(i);
        return result;
    }
}
globalThis.TextEncoder = TextEncoderPolyfill;

class TextDecoderPolyfill {
    constructor(label = 'utf-8') { this.encoding = label.toLowerCase(); }
    decode(input) {
        if (!input) return '';
        const bytes = input instanceof Uint8Array ? input : new Uint8Array(input);
        let result = '';
        for (let i = 0; i < bytes.length; i++) result += String.fromCharCode(bytes[i]);
        return decodeURIComponent(escape(result));
    }
}
globalThis.TextDecoder = TextDecoderPolyfill;
"#;
