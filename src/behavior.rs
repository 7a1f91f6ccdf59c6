use std::any::Any;
use std::sync::Arc;

use crate::invocation::Invocation;
use crate::slot::{DynMethodSlot, MethodSlot};

pub(crate) type AnyBox = Box<dyn Any + Send + Sync + 'static>;

fn downcast_box<'b, T: 'static>(any_box: &'b AnyBox, slot: &DynMethodSlot) -> &'b T {
    any_box.downcast_ref().unwrap_or_else(|| {
        panic!(
            "{}: fatal: binding stored under mismatched slot type",
            slot.name()
        )
    })
}

pub(crate) struct MatchingFn<S: MethodSlot>(
    #[allow(clippy::type_complexity)]
    pub  Box<dyn (for<'i> Fn(&S::Inputs<'i>) -> bool) + Send + Sync>,
);

pub(crate) struct HandlerFn<S: MethodSlot>(
    #[allow(clippy::type_complexity)]
    pub  Box<dyn (for<'i> Fn(S::Inputs<'i>) -> S::Output) + Send + Sync>,
);

/// One (matcher, handler) pair, type-erased so behaviors for different slots
/// can live in one registry. Downcast back through the slot type at dispatch.
pub(crate) struct DynBinding {
    slot: DynMethodSlot,
    matcher: AnyBox,
    handler: AnyBox,
}

impl DynBinding {
    pub fn new<S: MethodSlot>(matcher: MatchingFn<S>, handler: HandlerFn<S>) -> Self {
        Self {
            slot: DynMethodSlot::new::<S>(),
            matcher: Box::new(matcher),
            handler: Box::new(handler),
        }
    }

    pub fn matches<S: MethodSlot>(&self, inputs: &S::Inputs<'_>) -> bool {
        (downcast_box::<MatchingFn<S>>(&self.matcher, &self.slot).0)(inputs)
    }

    pub fn handle<S: MethodSlot>(&self, inputs: S::Inputs<'_>) -> S::Output {
        (downcast_box::<HandlerFn<S>>(&self.handler, &self.slot).0)(inputs)
    }
}

/// Holds all the state recorded for one slot during its controller's
/// lifetime: the ordered bindings and the full invocation log. Created
/// lazily on first stub use; at most one per slot per controller.
pub(crate) struct RecordedBehavior {
    slot: DynMethodSlot,
    bindings: Vec<Arc<DynBinding>>,
    invocations: Vec<Invocation>,
    mock_name: Option<String>,
    method_name: Option<String>,
}

impl RecordedBehavior {
    pub fn new(slot: DynMethodSlot) -> Self {
        Self {
            slot,
            bindings: Vec::new(),
            invocations: Vec::new(),
            mock_name: None,
            method_name: None,
        }
    }

    pub fn add_binding(&mut self, binding: DynBinding) {
        self.bindings.push(Arc::new(binding));
    }

    pub fn clear_bindings(&mut self) {
        self.bindings.clear();
    }

    /// Most-recently-added binding first: the last stub wins.
    pub fn bindings_newest_first(&self) -> Vec<Arc<DynBinding>> {
        self.bindings.iter().rev().cloned().collect()
    }

    pub fn record(&mut self, invocation: Invocation) {
        self.invocations.push(invocation);
    }

    pub fn invocations(&self) -> &[Invocation] {
        &self.invocations
    }

    pub fn set_metadata(&mut self, mock_name: String, method_name: String) {
        self.mock_name = Some(mock_name);
        self.method_name = Some(method_name);
    }

    pub fn describe(&self) -> String {
        match (&self.mock_name, &self.method_name) {
            (Some(mock_name), Some(method_name)) => format!("{mock_name}.{method_name}"),
            _ => self.slot.name().to_string(),
        }
    }
}
