//! Catch-all render handler.
//!
//! Every request that is not an asset or a health check goes through the dispatcher.
//! Failures are rendered once more as an error page; if that yields nothing a
//! plain-text response carries the status.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};
use strata_renderer::{
    sanitize_error, DispatchError, IncomingRequest, RenderResponse, ResponseHandle,
};

use crate::state::AppState;

/// Largest request body accepted for island renders and form posts.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Axum response for a rendered page or island.
struct Rendered(RenderResponse);

impl IntoResponse for Rendered {
    fn into_response(self) -> Response {
        let RenderResponse {
            body,
            status_code,
            headers,
            ..
        } = self.0;

        let mut response = Response::new(Body::from(body));
        *response.status_mut() =
            StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        for (name, value) in headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(name),
                HeaderValue::try_from(value),
            ) {
                response.headers_mut().insert(name, value);
            }
        }
        response
    }
}

/// Fallback handler: render the request url.
pub async fn render_page(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();

    let mut incoming = IncomingRequest::new(parts.method.clone(), parts.uri.clone())
        .with_headers(parts.headers.clone());
    if parts.method != Method::GET {
        match to_bytes(body, MAX_BODY_BYTES).await {
            Ok(bytes) => {
                if let Some(body) = decode_body(&parts.headers, &bytes) {
                    incoming = incoming.with_body(body);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read request body");
                return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
            }
        }
    }

    let url = incoming.url().to_string();
    let response = ResponseHandle::new();
    match state.dispatcher.render(incoming, response.clone()).await {
        Ok(Some(rendered)) => Rendered(rendered).into_response(),
        Ok(None) => empty_response(&response),
        Err(error) => render_error_page(&state, &parts.headers, &url, error).await,
    }
}

/// Render the error page for a failed request.
async fn render_error_page(
    state: &AppState,
    headers: &HeaderMap,
    url: &str,
    error: DispatchError,
) -> Response {
    let status = error.status_code();
    match &error {
        DispatchError::Application(_) => {
            tracing::debug!(url, status, error = %error, "Rendering error page")
        }
        _ => tracing::error!(url, status, error = %error, "Render failed, rendering error page"),
    }

    let payload_error = error.to_payload_error(url);
    let error_url = payload_error.error_page_url();
    let request = match error_url.parse::<Uri>() {
        Ok(uri) => IncomingRequest::new(Method::GET, uri).with_headers(headers.clone()),
        Err(e) => {
            tracing::error!(error = %e, "Invalid error page url");
            return plain_error(status, &error);
        }
    };

    let response = ResponseHandle::new();
    response.set_status(status, payload_error.status_message.clone());
    match state.dispatcher.render(request, response).await {
        Ok(Some(rendered)) => Rendered(rendered).into_response(),
        Ok(None) => plain_error(status, &error),
        Err(e) => {
            tracing::error!(error = %e, "Error page render failed");
            plain_error(status, &error)
        }
    }
}

fn plain_error(status: u16, error: &DispatchError) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, sanitize_error(error)).into_response()
}

fn empty_response(response: &ResponseHandle) -> Response {
    let status = StatusCode::from_u16(response.status().status_code)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Body::empty()).into_response()
}

/// Decode a JSON or url-encoded form body. Anything else is ignored.
fn decode_body(headers: &HeaderMap, bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if content_type.starts_with("application/json") {
        return serde_json::from_slice(bytes).ok();
    }
    if content_type.starts_with("application/x-www-form-urlencoded") {
        let form: Map<String, Value> = url::form_urlencoded::parse(bytes)
            .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
            .collect();
        return Some(Value::Object(form));
    }
    None
}
