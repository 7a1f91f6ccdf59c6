use std::sync::Arc;

use crate::eval::MockDispatch;

/// A mockable target: the declared, closed set of capability interfaces a
/// mock instance implements, plus the plain-data region a fake carries.
///
/// `Instance` is typically a trait object type (`dyn Trait + Send + Sync`).
/// The [mock_target](crate::mock_target) macro implements this trait for the
/// common case; implement it by hand when the adapter needs custom behavior,
/// such as serving reads from the data region.
pub trait MockTarget: Sized + 'static {
    /// The interface type the forwarding adapter implements.
    type Instance: ?Sized + Send + Sync + 'static;

    /// The plain-data region of a fake instance. `reset` on an owning
    /// controller reinstalls `Data::default()` without touching dispatch.
    type Data: Default + Send + Sync + 'static;

    /// Display name used in failure messages.
    const NAME: &'static str;

    /// Builds the forwarding adapter around a dispatch handle. Every
    /// operation of the returned instance must route through the handle.
    fn proxy_instance(dispatch: MockDispatch) -> Arc<Self::Instance>;
}

/// Allocates a synthetic instance whose every operation initially routes to
/// the shared unmocked trap: with no bindings registered, dispatch has
/// nowhere else to go. Allocation failure is fatal and propagates as-is.
pub(crate) fn create_fake_instance<T: MockTarget>(dispatch: MockDispatch) -> Arc<T::Instance> {
    T::proxy_instance(dispatch)
}
