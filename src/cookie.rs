//! The identity map from mock instances back to their controllers.
//!
//! A fake instance carries only an opaque [Cookie]; the association to the
//! owning controller's shared state lives in this engine-owned registry, not
//! inside the instance. For the instance's whole lifetime the cookie
//! resolves to exactly one live controller; a controller unregisters itself
//! before releasing its instance.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use once_cell::sync::Lazy;

use crate::state::SharedState;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Cookie(u64);

static NEXT_COOKIE: AtomicU64 = AtomicU64::new(1);

static REGISTRY: Lazy<Mutex<HashMap<Cookie, Weak<SharedState>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

pub(crate) fn issue() -> Cookie {
    Cookie(NEXT_COOKIE.fetch_add(1, Ordering::SeqCst))
}

pub(crate) fn register(cookie: Cookie, shared: &Arc<SharedState>) {
    REGISTRY
        .lock()
        .unwrap()
        .insert(cookie, Arc::downgrade(shared));
}

pub(crate) fn resolve(cookie: Cookie) -> Option<Arc<SharedState>> {
    REGISTRY
        .lock()
        .unwrap()
        .get(&cookie)
        .and_then(Weak::upgrade)
}

pub(crate) fn unregister(cookie: Cookie) {
    REGISTRY.lock().unwrap().remove(&cookie);
}
