use std::marker::PhantomData;
use std::sync::Arc;

use crate::behavior::{DynBinding, HandlerFn, MatchingFn, RecordedBehavior};
use crate::fake::MockTarget;
use crate::invocation::{self, Invocation};
use crate::session::CallKind;
use crate::slot::{DtorSlot, DynMethodSlot, MethodSlot};
use crate::state::SharedState;

#[derive(Clone, Copy)]
pub(crate) enum SlotKind {
    Method,
    Dtor,
}

/// Per-slot binding surface handed out by `stub`. The slot's recorded
/// behavior is materialized on first use and shared by every context over
/// the same slot, so repeated `stub` calls see one accumulated history.
pub struct MethodMockingContext<S: MethodSlot> {
    shared: Arc<SharedState>,
    kind: SlotKind,
    slot: PhantomData<S>,
}

impl<S: MethodSlot> MethodMockingContext<S> {
    pub(crate) fn new(shared: Arc<SharedState>, kind: SlotKind) -> Self {
        Self {
            shared,
            kind,
            slot: PhantomData,
        }
    }

    fn with_behavior<R>(&self, f: impl FnOnce(&mut RecordedBehavior) -> R) -> R {
        let mut proxy = self.shared.proxy.lock().unwrap();
        let behavior = match self.kind {
            SlotKind::Method => proxy.stub(DynMethodSlot::new::<S>()),
            SlotKind::Dtor => proxy.stub_dtor(DynMethodSlot::new::<S>()),
        };
        f(behavior)
    }

    /// Appends a (matcher, handler) binding. At match time the most
    /// recently added matching binding wins: the last stub wins.
    pub fn add_invocation_handler(
        &self,
        matcher: impl (for<'i> Fn(&S::Inputs<'i>) -> bool) + Send + Sync + 'static,
        handler: impl (for<'i> Fn(S::Inputs<'i>) -> S::Output) + Send + Sync + 'static,
    ) -> &Self {
        let binding =
            DynBinding::new::<S>(MatchingFn(Box::new(matcher)), HandlerFn(Box::new(handler)));
        self.with_behavior(|behavior| behavior.add_binding(binding));
        self
    }

    /// Applies the visitor to every invocation recorded for this slot, in
    /// recording order.
    pub fn scan_invocations(&self, mut visitor: impl FnMut(&Invocation)) {
        let snapshot = self.with_behavior(|behavior| behavior.invocations().to_vec());
        for invocation in &snapshot {
            visitor(invocation);
        }
    }

    /// Diagnostics only: names used when this slot shows up in a failure.
    pub fn set_metadata(
        &self,
        mock_name: impl Into<String>,
        method_name: impl Into<String>,
    ) -> &Self {
        let mock_name = mock_name.into();
        let method_name = method_name.into();
        self.with_behavior(|behavior| behavior.set_metadata(mock_name, method_name));
        self
    }

    /// A callable invoking the real pre-mock implementation on the live
    /// instance, resolved against the unpatched snapshot. Usable after the
    /// slot has been stubbed, which is what makes partial spying work. On
    /// an owned fake the pre-mock implementation is the unmocked trap.
    pub fn original_method(&self) -> OriginalMethod<S> {
        let original = self
            .shared
            .proxy
            .lock()
            .unwrap()
            .original_instance::<S::Target>();
        let target = match original {
            Some(instance) => OriginalTarget::Live(instance),
            None => OriginalTarget::Trap(self.shared.clone()),
        };
        OriginalMethod { target }
    }
}

enum OriginalTarget<S: MethodSlot> {
    Live(Arc<<S::Target as MockTarget>::Instance>),
    Trap(Arc<SharedState>),
}

/// The pre-mock implementation of one slot, bound to the live instance.
pub struct OriginalMethod<S: MethodSlot> {
    target: OriginalTarget<S>,
}

impl<S: MethodSlot> OriginalMethod<S> {
    pub fn call(&self, inputs: S::Inputs<'_>) -> S::Output {
        match &self.target {
            OriginalTarget::Live(instance) => S::call_original(&**instance, inputs),
            OriginalTarget::Trap(shared) => {
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

/// Binding surface for the one destructor slot. Same contract as
/// [MethodMockingContext], specialized to the destructor signature.
pub struct DtorMockingContext<T: MockTarget> {
    inner: MethodMockingContext<DtorSlot<T>>,
}

impl<T: MockTarget> DtorMockingContext<T> {
    pub(crate) fn new(shared: Arc<SharedState>) -> Self {
        Self {
            inner: MethodMockingContext::new(shared, SlotKind::Dtor),
        }
    }

    pub fn add_invocation_handler(
        &self,
        matcher: impl Fn() -> bool + Send + Sync + 'static,
        handler: impl Fn() + Send + Sync + 'static,
    ) -> &Self {
        self.inner
            .add_invocation_handler(move |_: &()| matcher(), move |_: ()| handler());
        self
    }

    pub fn scan_invocations(&self, visitor: impl FnMut(&Invocation)) {
        self.inner.scan_invocations(visitor);
    }

    pub fn set_metadata(
        &self,
        mock_name: impl Into<String>,
        method_name: impl Into<String>,
    ) -> &Self {
        self.inner.set_metadata(mock_name, method_name);
        self
    }

    /// Real destruction is the controller's responsibility, so the
    /// pre-mock destructor is a no-op sentinel.
    pub fn original_method(&self) -> DtorSentinel {
        DtorSentinel
    }
}

/// No-op stand-in for a destructor's pre-mock implementation.
pub struct DtorSentinel;

impl DtorSentinel {
    pub fn call(&self) {}
}
