//! Error types for engine and browser operations.

/// Errors that can occur while driving the rendering engine.
#[derive(Debug)]
pub enum EngineError {
    /// The engine subsystem failed to start. Fatal: no editor is offered.
    InitializationFailed(String),
    /// Browser creation was rejected by the engine.
    CreationFailed(String),
    /// A browser already exists (or is being created) for this host.
    BrowserExists,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InitializationFailed(msg) => {
                write!(f, "engine initialization failed: {msg}")
            }
            Self::CreationFailed(msg) => write!(f, "browser creation failed: {msg}"),
            Self::BrowserExists => write!(f, "a browser already exists for this host"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Result type for engine and browser operations.
pub type Result<T> = std::result::Result<T, EngineError>;
