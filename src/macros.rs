/// Generates the [MockTarget](crate::MockTarget) impl, the forwarding
/// adapter (destructor glue included) and one
/// [MethodSlot](crate::MethodSlot) type per operation of a trait.
///
/// Argument types must be owned and implement `Debug`; operations taking
/// references need a hand-written adapter and slot impls.
///
/// ```rust
/// use proxymock::*;
///
/// trait Engine: Send + Sync {
///     fn start(&self, power: u32) -> bool;
///     fn stop(&self);
/// }
///
/// mock_target! {
///     pub target EngineTarget for Engine {
///         type Data = ();
///         fn start(&self, power: u32) -> bool => EngineStart;
///         fn stop(&self) => EngineStop;
///     }
/// }
/// ```
#[macro_export]
macro_rules! mock_target {
    (
        $(#[$meta:meta])*
        $vis:vis target $target:ident for $iface:path {
            type Data = $data:ty;
            $(
                fn $method:ident(&self $(, $arg:ident : $argty:ty)* $(,)?) $(-> $ret:ty)? => $slot:ident;
            )*
        }
    ) => {
        $(#[$meta])*
        $vis struct $target;

        impl $crate::MockTarget for $target {
            type Instance = dyn $iface + ::core::marker::Send + ::core::marker::Sync;
            type Data = $data;

            const NAME: &'static str = stringify!($iface);

            fn proxy_instance(
                dispatch: $crate::MockDispatch,
            ) -> ::std::sync::Arc<Self::Instance> {
                struct Adapter {
                    dispatch: $crate::MockDispatch,
                }

                impl $iface for Adapter {
                    $(
                        fn $method(&self $(, $arg: $argty)*) $(-> $ret)? {
                            self.dispatch.eval::<$slot>(($($arg,)*))
                        }
                    )*
                }

                impl ::core::ops::Drop for Adapter {
                    fn drop(&mut self) {
                        self.dispatch.dispatch_drop::<$target>();
                    }
                }

                ::std::sync::Arc::new(Adapter { dispatch })
            }
        }

        $(
            $vis struct $slot;

            impl $crate::MethodSlot for $slot {
                type Target = $target;
                type Inputs<'i> = ($($argty,)*);
                type Output = ($($ret)?);

                const NAME: &'static str =
                    concat!(stringify!($iface), "::", stringify!($method));

                fn debug_inputs(inputs: &Self::Inputs<'_>) -> ::std::string::String {
                    ::std::format!("{:?}", inputs)
                }

                fn call_original(
                    instance: &<Self::Target as $crate::MockTarget>::Instance,
                    ($($arg,)*): Self::Inputs<'_>,
                ) -> Self::Output {
                    instance.$method($($arg),*)
                }
            }
        )*
    };
}
