//! UI collaborator hooks.
//!
//! The client reports two things to whatever UI sits on top of it: a
//! transient notification for failed requests, and a redirect to the login
//! entry point after a 401.

use std::fmt;
use std::sync::Arc;

/// Callbacks into the presentation layer.
pub trait UiHooks: Send + Sync + fmt::Debug {
    /// Show a short-lived message to the user.
    fn notify(&self, message: &str);

    /// Navigate back to the unauthenticated entry screen.
    fn redirect_to_login(&self);
}

/// Hooks shared across clones of the client.
pub type SharedUiHooks = Arc<dyn UiHooks>;

/// Hooks that only write to the log. Used when no UI is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHooks;

impl UiHooks for LogHooks {
    fn notify(&self, message: &str) {
        tracing::warn!(message, "request failed");
    }

    fn redirect_to_login(&self) {
        tracing::warn!("session rejected by server, login required");
    }
}
