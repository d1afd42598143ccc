//! Read-only view of the external session store.
//!
//! Sessions are created and persisted elsewhere. The dispatcher only asks
//! whether the client behind a request is authenticated.

use std::sync::Arc;

use crate::dispatch::RequestContext;

/// Session state visible to the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<String>,
}

impl Session {
    /// A session with no logged-in user.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// A session belonging to `user`.
    pub fn authenticated(user: impl Into<String>) -> Self {
        Self {
            user: Some(user.into()),
        }
    }

    /// Authenticated user identity, if any.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

/// Looks up the session for the client behind a request.
pub trait SessionProvider: Send + Sync {
    /// Returns the session for `context`, or `None` when the client has none.
    fn session(&self, context: &RequestContext) -> Option<Session>;
}

impl<T> SessionProvider for Arc<T>
where
    T: SessionProvider + ?Sized,
{
    fn session(&self, context: &RequestContext) -> Option<Session> {
        (**self).session(context)
    }
}

/// Provider for deployments without a session store: nobody is authenticated.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSessions;

impl SessionProvider for NoSessions {
    fn session(&self, _context: &RequestContext) -> Option<Session> {
        None
    }
}

/// Provider that returns the same session for every request.
///
/// Suits single-user tools that run the dispatcher in-process.
#[derive(Debug, Default, Clone)]
pub struct StaticSessions {
    session: Option<Session>,
}

impl StaticSessions {
    /// Serves `session` to every request.
    pub fn new(session: Option<Session>) -> Self {
        Self { session }
    }
}

impl SessionProvider for StaticSessions {
    fn session(&self, _context: &RequestContext) -> Option<Session> {
        self.session.clone()
    }
}
