//! Render errors including renderer initialization and engine failures.

use strata_core::{CoreError, PayloadError};
use thiserror::Error;

/// Renderer initialization failures.
///
/// Cloneable so that every caller sharing one in-flight initialization can
/// observe the same failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    #[error("Client manifest is not available")]
    ManifestUnavailable,

    #[error("Server bundle is not available")]
    ServerBundleUnavailable,

    #[error("Failed to load {what}: {reason}")]
    Load { what: String, reason: String },
}

/// Failures while producing rendered output for one request.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Renderer initialization failed: {0}")]
    Init(#[from] InitError),

    #[error("Render engine error: {0}")]
    Engine(String),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

/// Failures surfaced to the caller of the dispatcher.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The page could not be rendered.
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    /// The application stored an error in the payload while rendering.
    #[error("Application error: {0}")]
    Application(PayloadError),

    #[error("Response serialization failed: {0}")]
    Serialization(#[from] CoreError),
}

pub type Result<T> = std::result::Result<T, DispatchError>;

impl DispatchError {
    /// Status code the transport should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Application(error) => error.status_code.unwrap_or(500),
            Self::Render(_) | Self::Serialization(_) => 500,
        }
    }

    /// Error to render on the error page for this failure.
    pub fn to_payload_error(&self, url: &str) -> PayloadError {
        match self {
            Self::Application(error) => PayloadError {
                url: error.url.clone().or_else(|| Some(url.to_string())),
                ..error.clone()
            },
            Self::Render(_) | Self::Serialization(_) => PayloadError {
                url: Some(url.to_string()),
                status_code: Some(500),
                status_message: Some("Server Error".to_string()),
                message: Some(sanitize_error(self)),
                ..Default::default()
            },
        }
    }
}

/// Sanitize error messages for client-facing responses.
///
/// Hides internal details while providing useful feedback.
pub fn sanitize_error(error: &DispatchError) -> String {
    match error {
        // Safe to expose
        DispatchError::Application(error) => error.to_string(),
        // Hide internal details
        DispatchError::Render(RenderError::Init(_)) => "Renderer unavailable".to_string(),
        DispatchError::Render(_) => "Render failed".to_string(),
        DispatchError::Serialization(_) => "Render produced invalid output".to_string(),
    }
}
