use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::behavior::RecordedBehavior;
use crate::fake::MockTarget;
use crate::slot::DynMethodSlot;

pub(crate) type AnyArc = Arc<dyn Any + Send + Sync + 'static>;

/// The table-patch collaborator, rendered as a forwarding registry: one
/// recorded behavior per stubbed slot, the one destructor slot, and an
/// unpatched snapshot of the real implementation (wrap mode only). A slot
/// with no behavior routes to the unmocked trap.
pub(crate) struct ForwardingProxy {
    methods: BTreeMap<TypeId, RecordedBehavior>,
    dtor: Option<RecordedBehavior>,
    original: Option<AnyArc>,
    attached: bool,
}

impl ForwardingProxy {
    pub fn new(original: Option<AnyArc>) -> Self {
        Self {
            methods: BTreeMap::new(),
            dtor: None,
            original,
            attached: true,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Disconnects dispatch: every slot reverts to its pre-mock route.
    pub fn detach(&mut self) {
        self.attached = false;
    }

    /// Materializes the slot's behavior if this is its first stub use.
    pub fn stub(&mut self, slot: DynMethodSlot) -> &mut RecordedBehavior {
        self.methods
            .entry(slot.type_id())
            .or_insert_with(|| RecordedBehavior::new(slot))
    }

    pub fn is_stubbed(&self, type_id: TypeId) -> bool {
        self.methods.contains_key(&type_id)
    }

    pub fn method_mock(&self, type_id: TypeId) -> Option<&RecordedBehavior> {
        self.methods.get(&type_id)
    }

    pub fn method_mock_mut(&mut self, type_id: TypeId) -> Option<&mut RecordedBehavior> {
        self.methods.get_mut(&type_id)
    }

    pub fn stub_dtor(&mut self, slot: DynMethodSlot) -> &mut RecordedBehavior {
        self.dtor.get_or_insert_with(|| RecordedBehavior::new(slot))
    }

    pub fn is_dtor_stubbed(&self) -> bool {
        self.dtor.is_some()
    }

    pub fn dtor_mock(&self) -> Option<&RecordedBehavior> {
        self.dtor.as_ref()
    }

    pub fn dtor_mock_mut(&mut self) -> Option<&mut RecordedBehavior> {
        self.dtor.as_mut()
    }

    /// The unpatched snapshot: the wrapped real instance, if any.
    pub fn original_instance<T: MockTarget>(&self) -> Option<Arc<T::Instance>> {
        self.original
            .as_ref()
            .and_then(|any| any.downcast_ref::<Arc<T::Instance>>())
            .cloned()
    }

    /// Unbinds every slot. Recorded invocations stay with their behaviors.
    pub fn reset(&mut self) {
        for behavior in self.methods.values_mut() {
            behavior.clear_bindings();
        }
        if let Some(dtor) = &mut self.dtor {
            dtor.clear_bindings();
        }
    }

    pub fn behaviors(&self) -> impl Iterator<Item = &RecordedBehavior> {
        self.methods.values().chain(self.dtor.iter())
    }
}
