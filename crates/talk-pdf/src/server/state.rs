//! Application state for the HTTP server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::session::ChatSession;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// The single chat session served by this process
    session: ChatSession,
}

impl AppState {
    /// Create state with hosted providers
    pub fn new(config: RagConfig) -> Result<Self> {
        Ok(Self::with_session(ChatSession::new(config)?))
    }

    /// Create state around an existing session
    pub fn with_session(session: ChatSession) -> Self {
        Self {
            inner: Arc::new(AppStateInner { session }),
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.inner.session
    }

    /// Ready once documents are processed
    pub fn is_ready(&self) -> bool {
        self.inner.session.is_ready()
    }
}
