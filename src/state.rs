use std::sync::{Arc, Mutex};

use crate::behavior::AnyBox;
use crate::cookie::{self, Cookie};
use crate::proxy::{AnyArc, ForwardingProxy};
use crate::session::{CallKind, Session, UnexpectedCallEvent};

/// The state one controller shares with every dispatch through its cookie.
pub(crate) struct SharedState {
    pub session: Arc<dyn Session>,
    pub proxy: Mutex<ForwardingProxy>,
    /// The fake's plain-data region (`Some` in owning mode only).
    pub data: Mutex<Option<AnyBox>>,
    pub cookie: Cookie,
}

impl SharedState {
    pub fn new(
        session: Arc<dyn Session>,
        original: Option<AnyArc>,
        data: Option<AnyBox>,
    ) -> Arc<Self> {
        let cookie = cookie::issue();
        let shared = Arc::new(Self {
            session,
            proxy: Mutex::new(ForwardingProxy::new(original)),
            data: Mutex::new(data),
            cookie,
        });
        cookie::register(cookie, &shared);
        shared
    }

    pub fn detach_proxy(&self) {
        self.proxy.lock().unwrap().detach();
    }

    /// Teardown path: detach dispatch and drop the cookie mapping, in that
    /// order, before the instance handle is released.
    pub fn disconnect(&self) {
        self.detach_proxy();
        cookie::unregister(self.cookie);
    }

    /// Reports the event to the session, then fails the current test with
    /// the session-formatted description.
    pub fn raise_unexpected(
        &self,
        kind: CallKind,
        ordinal: usize,
        method: String,
        inputs_debug: String,
    ) -> ! {
        let event = UnexpectedCallEvent {
            kind,
            ordinal,
            method,
            inputs_debug,
        };
        self.session.handle(&event);
        panic!("{}", self.session.format(&event));
    }
}
