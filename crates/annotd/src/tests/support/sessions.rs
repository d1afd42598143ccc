//! Session provider mock.

use mockall::mock;

use crate::dispatch::RequestContext;
use crate::session::{Session, SessionProvider};

mock! {
    pub Sessions {}
    impl SessionProvider for Sessions {
        fn session(&self, context: &RequestContext) -> Option<Session>;
    }
}

/// A provider that must never be consulted.
#[must_use]
pub fn untouched_sessions() -> MockSessions {
    let mut sessions = MockSessions::new();
    sessions.expect_session().never();
    sessions
}

/// A provider that answers every lookup with `session`.
#[must_use]
pub fn sessions_returning(session: Option<Session>) -> MockSessions {
    let mut sessions = MockSessions::new();
    sessions
        .expect_session()
        .returning(move |_context: &RequestContext| session.clone());
    sessions
}
