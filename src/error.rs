//! Error types for engine setup and obstacle asset loading
//!
//! The per-frame simulation never fails. Errors come from acquiring GPU
//! resources (fatal, reported before the loop starts), from the render call,
//! or from the obstacle asset loader (recovered with placeholder boxes).

use thiserror::Error;

/// Fatal or propagated engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// The page has no usable canvas/WebGPU context
    #[error("rendering context unavailable: {0}")]
    ContextUnavailable(String),

    /// No GPU adapter matched the surface
    #[error("no compatible GPU adapter: {0}")]
    Adapter(String),

    /// The adapter refused to hand out a device
    #[error("failed to acquire GPU device: {0}")]
    Device(String),

    /// Frame acquisition failed in a way the renderer could not recover from
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// The engine was used after `dispose()`
    #[error("engine has been disposed")]
    Disposed,
}

/// Obstacle model loading failures
#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("failed to fetch '{path}': {reason}")]
    Fetch { path: String, reason: String },

    #[error("failed to parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("model '{path}' has no mesh parts")]
    Empty { path: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_are_descriptive() {
        let err = EngineError::ContextUnavailable("no canvas element".into());
        assert_eq!(err.to_string(), "rendering context unavailable: no canvas element");

        let err = AssetLoadError::Empty {
            path: "assets/tree.json".into(),
        };
        assert!(err.to_string().contains("assets/tree.json"));
    }
}
