use std::any::TypeId;
use std::marker::PhantomData;

use crate::fake::MockTarget;

/// Identifies one overridable operation of a mock target. Implemented by
/// zero-sized marker types, one per method, unique per target.
pub trait MethodSlot: Sized + 'static {
    /// The target (or declared base) this operation belongs to.
    type Target: MockTarget;

    /// The call arguments as a tuple.
    type Inputs<'i>;

    /// The return type of the operation.
    type Output: 'static;

    /// Display name used in failure messages, e.g. `"Engine::start"`.
    const NAME: &'static str;

    /// Renders an argument snapshot for invocation records and failures.
    fn debug_inputs(inputs: &Self::Inputs<'_>) -> String;

    /// Invokes the pre-mock implementation of this operation directly on a
    /// live instance, bypassing the handler registry.
    fn call_original(
        instance: &<Self::Target as MockTarget>::Instance,
        inputs: Self::Inputs<'_>,
    ) -> Self::Output;
}

/// Declares `Self` as a base capability of mock target `T`. Bases share the
/// target's instance and data-region types, so their slots and data members
/// dispatch against the composite instance unchanged.
///
/// Every target is trivially a base of itself; composite targets add
/// explicit impls for each declared base.
pub trait BaseOf<T: MockTarget>:
    MockTarget<Instance = <T as MockTarget>::Instance, Data = <T as MockTarget>::Data>
{
}

impl<T: MockTarget> BaseOf<T> for T {}

/// Identifies one member of a target's plain-data region.
pub trait DataMemberSlot: 'static {
    /// The target (or declared base) the member belongs to.
    type Target: MockTarget;

    /// The member's value type.
    type Value: Send + Sync + 'static;

    /// Display name used in failure messages.
    const NAME: &'static str;

    /// Projects the member out of the target's data region.
    fn project(data: &mut <Self::Target as MockTarget>::Data) -> &mut Self::Value;
}

/// Type-erased slot identity: the `TypeId` of the slot marker type plus its
/// display name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DynMethodSlot {
    type_id: TypeId,
    name: &'static str,
}

impl DynMethodSlot {
    pub(crate) fn new<S: MethodSlot>() -> Self {
        Self {
            type_id: TypeId::of::<S>(),
            name: S::NAME,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }
}

/// The one destructor slot of a target.
pub(crate) struct DtorSlot<T: MockTarget>(PhantomData<T>);

impl<T: MockTarget> MethodSlot for DtorSlot<T> {
    type Target = T;
    type Inputs<'i> = ();
    type Output = ();

    const NAME: &'static str = "drop";

    fn debug_inputs(_inputs: &()) -> String {
        "()".to_string()
    }

    // Real destruction belongs to the controller, never to user code.
    fn call_original(_instance: &T::Instance, _inputs: ()) {}
}
