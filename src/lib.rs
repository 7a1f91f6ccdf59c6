//!
//! `proxymock` is a runtime mocking engine: given a capability trait, it
//! lets test code replace the behavior of any of its operations (destruction
//! included) with programmable stand-ins, without touching the original
//! implementation.
//!
//! There is no dispatch-table patching involved. The mockable capability is
//! declared as a [MockTarget]; a forwarding adapter implements the trait and
//! routes every operation through [MockDispatch], which consults a per-slot
//! handler registry and falls back to a wrapped real implementation, or to
//! the unmocked-call trap on a fake.
//!
//! ```rust
//! use std::sync::Arc;
//! use proxymock::*;
//!
//! trait Engine: Send + Sync {
//!     fn start(&self, power: u32) -> bool;
//! }
//!
//! mock_target! {
//!     target EngineTarget for Engine {
//!         type Data = ();
//!         fn start(&self, power: u32) -> bool => EngineStart;
//!     }
//! }
//!
//! let mock = MockController::<EngineTarget>::owned(Arc::new(RecordingSession::new()));
//! mock.stub::<EngineStart>()
//!     .add_invocation_handler(|(power,)| *power > 0, |(_power,)| true);
//!
//! assert!(mock.get().start(9000));
//! ```
//!
//! Wrapping a live instance instead of faking one turns the mock into a
//! spy: unstubbed operations reach the real implementation, and
//! [MethodMockingContext::original_method] gives stubbed slots access to it.

#![forbid(unsafe_code)]

mod behavior;
mod context;
mod cookie;
mod eval;
mod fake;
mod invocation;
mod macros;
mod proxy;
mod session;
mod slot;
mod state;

pub use context::{DtorMockingContext, DtorSentinel, MethodMockingContext, OriginalMethod};
pub use eval::MockDispatch;
pub use fake::MockTarget;
pub use invocation::Invocation;
pub use session::{CallKind, RecordingSession, Session, UnexpectedCallEvent};
pub use slot::{BaseOf, DataMemberSlot, DynMethodSlot, MethodSlot};

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use behavior::AnyBox;
use context::SlotKind;
use proxy::AnyArc;
use state::SharedState;

/// Whether teardown releases the instance. Wrapping never owns; owning
/// flips to `Wrapper` on `detach` or `release`.
enum Ownership {
    Owner,
    Wrapper,
}

/// Owns or wraps one mock instance, drives binding of its slots, aggregates
/// invocation history and manages reset, detach and teardown.
///
/// Exactly one controller owns a given fake instance's lifetime; a wrapping
/// controller never owns. Single-threaded use per controller is assumed.
pub struct MockController<T: MockTarget> {
    shared: Arc<SharedState>,
    instance: Mutex<Option<Arc<T::Instance>>>,
    ownership: Mutex<Ownership>,
}

impl<T: MockTarget> MockController<T> {
    /// Builds an owning controller over a fresh fake instance. Every slot
    /// of the fake initially routes to the unmocked-call trap.
    pub fn owned(session: Arc<dyn Session>) -> Self {
        let data: AnyBox = Box::new(T::Data::default());
        let shared = SharedState::new(session, None, Some(data));
        let instance = fake::create_fake_instance::<T>(MockDispatch::new(shared.cookie));
        Self {
            shared,
            instance: Mutex::new(Some(instance)),
            ownership: Mutex::new(Ownership::Owner),
        }
    }

    /// Wraps a live external instance without taking ownership of it.
    /// Unstubbed operations forward to `instance`; stubbed ones dispatch to
    /// their handlers.
    pub fn wrap(session: Arc<dyn Session>, instance: Arc<T::Instance>) -> Self {
        let original: AnyArc = Arc::new(instance);
        let shared = SharedState::new(session, Some(original), None);
        let adapter = T::proxy_instance(MockDispatch::new(shared.cookie));
        Self {
            shared,
            instance: Mutex::new(Some(adapter)),
            ownership: Mutex::new(Ownership::Wrapper),
        }
    }

    /// Opens the binding surface for one slot. The slot must belong to the
    /// target or one of its declared bases, which is checked at compile
    /// time. Idempotent: repeated calls return contexts over the same
    /// recorded behavior.
    pub fn stub<S>(&self) -> MethodMockingContext<S>
    where
        S: MethodSlot,
        S::Target: BaseOf<T>,
    {
        MethodMockingContext::new(self.shared.clone(), SlotKind::Method)
    }

    /// Opens the binding surface for the one destructor slot, with the same
    /// idempotency as [stub](Self::stub).
    pub fn stub_dtor(&self) -> DtorMockingContext<T> {
        DtorMockingContext::new(self.shared.clone())
    }

    /// Replaces a data member's value in the fake's plain-data region. The
    /// member must belong to a declared base; only an owning controller has
    /// a data region to write.
    pub fn stub_data_member<M>(&self, value: M::Value)
    where
        M: DataMemberSlot,
        M::Target: BaseOf<T>,
    {
        let mut guard = self.shared.data.lock().unwrap();
        let data = guard.as_mut().unwrap_or_else(|| {
            panic!(
                "{}: data members can only be stubbed on an owned fake",
                T::NAME
            )
        });
        let data = data.downcast_mut::<T::Data>().unwrap_or_else(|| {
            panic!(
                "{}: fatal: data region stored under mismatched target type",
                T::NAME
            )
        });
        *M::project(data) = value;
    }

    /// Marks the controller non-owning and disconnects dispatch from the
    /// instance: a wrapped instance reverts to its real behavior, a fake
    /// reverts to the trap. Idempotent.
    pub fn detach(&self) {
        *self.ownership.lock().unwrap() = Ownership::Wrapper;
        self.shared.detach_proxy();
    }

    /// Clears every slot binding and, when owning, reinstalls a pristine
    /// plain-data region. Dispatch stays attached and the invocation log is
    /// kept.
    pub fn reset(&self) {
        self.shared.proxy.lock().unwrap().reset();
        if matches!(*self.ownership.lock().unwrap(), Ownership::Owner) {
            let pristine: AnyBox = Box::new(T::Data::default());
            *self.shared.data.lock().unwrap() = Some(pristine);
        }
    }

    /// Collects the union of every invocation recorded across all stubbed
    /// slots of this controller, destructor included. Invocation identity
    /// is its ordinal, so re-collection never duplicates.
    pub fn collect_actual_invocations(&self, into: &mut BTreeSet<Invocation>) {
        let proxy = self.shared.proxy.lock().unwrap();
        for behavior in proxy.behaviors() {
            into.extend(behavior.invocations().iter().cloned());
        }
    }

    /// The live/faked instance, for handing to code under test.
    pub fn get(&self) -> Arc<T::Instance> {
        self.instance
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| panic!("{}: instance was released from its controller", T::NAME))
    }

    /// Transfers the owning handle to the caller and flips the controller
    /// to non-owning, keeping dispatch attached: when the last handle
    /// drops, the stubbed destructor handler observes the destruction.
    pub fn release(&self) -> Arc<T::Instance> {
        let taken = self.instance.lock().unwrap().take();
        *self.ownership.lock().unwrap() = Ownership::Wrapper;
        taken.unwrap_or_else(|| panic!("{}: instance was already released", T::NAME))
    }

    /// The session this controller reports unexpected calls to.
    pub fn session(&self) -> Arc<dyn Session> {
        self.shared.session.clone()
    }
}

impl<T: MockTarget> Drop for MockController<T> {
    fn drop(&mut self) {
        // Detach before the instance handle drops: an owned fake released
        // here tears down plainly, not through the destructor slot.
        self.shared.disconnect();
    }
}
