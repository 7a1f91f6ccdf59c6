use std::any::TypeId;
use std::sync::Arc;

use crate::cookie::{self, Cookie};
use crate::fake::MockTarget;
use crate::invocation::{self, Invocation};
use crate::session::CallKind;
use crate::slot::{DtorSlot, MethodSlot};
use crate::state::SharedState;

/// The shared interception routine, as embedded in a forwarding adapter.
/// Carries only the cookie; the owning controller is resolved through the
/// identity map on every dispatch.
#[derive(Clone, Debug)]
pub struct MockDispatch {
    cookie: Cookie,
}

impl MockDispatch {
    pub(crate) fn new(cookie: Cookie) -> Self {
        Self { cookie }
    }

    fn resolve(&self) -> Arc<SharedState> {
        cookie::resolve(self.cookie)
            .unwrap_or_else(|| panic!("mock instance used after its controller was dropped"))
    }

    /// Dispatches one operation: match bindings newest-first, record the
    /// call, run the matched handler. An unstubbed slot falls back to the
    /// wrapped real implementation, or raises the unmocked-call failure on
    /// a fake. A stubbed slot whose inputs match no binding records the
    /// call and raises the unmatched failure.
    ///
    /// Matchers and handlers run outside the registry lock, so a handler
    /// may re-enter the mock.
    pub fn eval<S: MethodSlot>(&self, inputs: S::Inputs<'_>) -> S::Output {
        let shared = self.resolve();

        let (attached, bindings, description, original) = {
            let proxy = shared.proxy.lock().unwrap();
            let behavior = proxy.method_mock(TypeId::of::<S>());
            (
                proxy.is_attached(),
                behavior
                    .map(|behavior| behavior.bindings_newest_first())
                    .unwrap_or_default(),
                behavior.map(|behavior| behavior.describe()),
                proxy.original_instance::<S::Target>(),
            )
        };

        if attached && !bindings.is_empty() {
            for binding in &bindings {
                if binding.matches::<S>(&inputs) {
                    record_method_call::<S>(&shared, Invocation::record::<S>(&inputs));
                    return binding.handle::<S>(inputs);
                }
            }

            let invocation = Invocation::record::<S>(&inputs);
            let ordinal = invocation.ordinal();
            let inputs_debug = invocation.inputs_debug().to_string();
            record_method_call::<S>(&shared, invocation);

            let method = description.unwrap_or_else(|| S::NAME.to_string());
            shared.raise_unexpected(CallKind::Unmatched, ordinal, method, inputs_debug)
        } else {
            match original {
                Some(original) => S::call_original(&*original, inputs),
                None => {
                    let ordinal = invocation::next_ordinal();
                    shared.raise_unexpected(
                        CallKind::Unmocked,
                        ordinal,
                        S::NAME.to_string(),
                        S::debug_inputs(&inputs),
                    )
                }
            }
        }
    }

    /// Destructor interception, called from the adapter's `Drop` glue.
    ///
    /// Runs the matching destructor handler while the controller is
    /// attached; an attached fake with no destructor handler fails the
    /// test. Detached instances, and instances outliving their controller,
    /// tear down plainly. Failures are suppressed mid-panic so teardown
    /// during an unwind never aborts the process.
    pub fn dispatch_drop<T: MockTarget>(&self) {
        let Some(shared) = cookie::resolve(self.cookie) else {
            return;
        };

        let (attached, bindings, description, has_original) = {
            let proxy = shared.proxy.lock().unwrap();
            let dtor = proxy.dtor_mock();
            (
                proxy.is_attached(),
                dtor.map(|dtor| dtor.bindings_newest_first())
                    .unwrap_or_default(),
                dtor.map(|dtor| dtor.describe()),
                proxy.original_instance::<T>().is_some(),
            )
        };

        if !attached {
            return;
        }

        if !bindings.is_empty() {
            for binding in &bindings {
                if binding.matches::<DtorSlot<T>>(&()) {
                    record_dtor_call(&shared, Invocation::record::<DtorSlot<T>>(&()));
                    binding.handle::<DtorSlot<T>>(());
                    return;
                }
            }

            if std::thread::panicking() {
                return;
            }
            let invocation = Invocation::record::<DtorSlot<T>>(&());
            let ordinal = invocation.ordinal();
            record_dtor_call(&shared, invocation);

            let method = description.unwrap_or_else(|| format!("{}::drop", T::NAME));
            shared.raise_unexpected(CallKind::Unmatched, ordinal, method, "()".to_string())
        } else if !has_original {
            if std::thread::panicking() {
                return;
            }
            let ordinal = invocation::next_ordinal();
            shared.raise_unexpected(
                CallKind::Unmocked,
                ordinal,
                format!("{}::drop", T::NAME),
                "()".to_string(),
            )
        }
    }

    /// Reads from the fake's plain-data region. Adapters use this to serve
    /// non-dispatched data members.
    pub fn read_data<T: MockTarget, R>(&self, read: impl FnOnce(&T::Data) -> R) -> R {
        let shared = self.resolve();
        let guard = shared.data.lock().unwrap();
        let data = guard.as_ref().unwrap_or_else(|| {
            panic!("{}: wrapped instances have no synthetic data region", T::NAME)
        });
        let data = data.downcast_ref::<T::Data>().unwrap_or_else(|| {
            panic!(
                "{}: fatal: data region stored under mismatched target type",
                T::NAME
            )
        });
        read(data)
    }
}

fn record_method_call<S: MethodSlot>(shared: &SharedState, invocation: Invocation) {
    if let Some(behavior) = shared
        .proxy
        .lock()
        .unwrap()
        .method_mock_mut(TypeId::of::<S>())
    {
        behavior.record(invocation);
    }
}

fn record_dtor_call(shared: &SharedState, invocation: Invocation) {
    if let Some(dtor) = shared.proxy.lock().unwrap().dtor_mock_mut() {
        dtor.record(invocation);
    }
}
