//! Doppel Core - session-scoped memoization and background tasks
//!
//! This crate provides the execution-model primitives for the Doppel
//! client: a per-session result store that survives re-invocations of
//! the render function, a compute-once memoization wrapper, and a
//! background task handle for running blocking work off the render
//! thread. It knows nothing about HTTP; the wire layer lives in
//! `doppel-client`.

// Module declarations
pub mod memo;
pub mod session;
pub mod task;

use thiserror::Error;

/// Failure taxonomy for remote operations.
///
/// The three classes stay distinguishable all the way to the rendering
/// decision because they produce different user-facing messages.
/// Variants carry owned strings rather than source errors so that
/// cached failure outcomes can be cloned out of the session store on
/// every render pass.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Connection, DNS or timeout failure before any response existed.
    /// Also covers internal faults captured on a task thread.
    #[error("network failure: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Protocol { status: u16, body: String },

    /// HTTP 200 whose payload encodes a structured service error.
    #[error("{code}: {message}")]
    Domain { code: String, message: String },
}

impl ApiError {
    /// Create a transport error from any displayable cause.
    pub fn transport(cause: impl std::fmt::Display) -> Self {
        Self::Transport(cause.to_string())
    }

    /// The domain error code, if this is a domain-level failure.
    pub fn domain_code(&self) -> Option<&str> {
        match self {
            Self::Domain { code, .. } => Some(code),
            _ => None,
        }
    }
}

/// Outcome of a remote operation: success value or classified failure.
/// Immutable once produced and cached as-is, including failures.
pub type Outcome<T> = Result<T, ApiError>;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::{
        memo::Memoizer,
        session::SessionState,
        task::TaskHandle,
        ApiError, Outcome,
    };
}

// Re-export key types at the crate root
pub use memo::Memoizer;
pub use session::SessionState;
pub use task::TaskHandle;
