use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use proxymock::*;

trait Beacon: Send + Sync {
    fn ping(&self) -> u32;
    fn shine(&self, level: u8);
}

struct BeaconTarget;

impl MockTarget for BeaconTarget {
    type Instance = dyn Beacon;
    type Data = ();

    const NAME: &'static str = "Beacon";

    fn proxy_instance(dispatch: MockDispatch) -> Arc<Self::Instance> {
        Arc::new(BeaconAdapter { dispatch })
    }
}

struct BeaconAdapter {
    dispatch: MockDispatch,
}

impl Beacon for BeaconAdapter {
    fn ping(&self) -> u32 {
        self.dispatch.eval::<BeaconPing>(())
    }

    fn shine(&self, level: u8) {
        self.dispatch.eval::<BeaconShine>((level,))
    }
}

impl Drop for BeaconAdapter {
    fn drop(&mut self) {
        self.dispatch.dispatch_drop::<BeaconTarget>();
    }
}

struct BeaconPing;

impl MethodSlot for BeaconPing {
    type Target = BeaconTarget;
    type Inputs<'i> = ();
    type Output = u32;

    const NAME: &'static str = "Beacon::ping";

    fn debug_inputs(_inputs: &Self::Inputs<'_>) -> String {
        "()".to_string()
    }

    fn call_original(instance: &dyn Beacon, _inputs: Self::Inputs<'_>) -> u32 {
        instance.ping()
    }
}

struct BeaconShine;

impl MethodSlot for BeaconShine {
    type Target = BeaconTarget;
    type Inputs<'i> = (u8,);
    type Output = ();

    const NAME: &'static str = "Beacon::shine";

    fn debug_inputs(inputs: &Self::Inputs<'_>) -> String {
        format!("{inputs:?}")
    }

    fn call_original(instance: &dyn Beacon, (level,): Self::Inputs<'_>) -> Self::Output {
        instance.shine(level)
    }
}

fn expect_panic(f: impl FnOnce()) -> String {
    let payload = catch_unwind(AssertUnwindSafe(f)).expect_err("call should have panicked");
    if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&'static str>() {
        message.to_string()
    } else {
        panic!("panic payload should be a string")
    }
}

#[test]
fn every_unstubbed_call_fails_with_increasing_ordinals() {
    let session = Arc::new(RecordingSession::new());
    let mock = MockController::<BeaconTarget>::owned(session.clone());
    let instance = mock.get();

    let message = expect_panic(|| {
        instance.ping();
    });
    assert!(message.contains("Beacon::ping"));
    assert!(message.contains("no handlers registered"));

    expect_panic(|| {
        instance.shine(3);
    });
    expect_panic(|| {
        instance.ping();
    });

    let events = session.events();
    assert_eq!(3, events.len());
    assert!(events
        .iter()
        .all(|event| event.kind == CallKind::Unmocked));
    assert!(events[0].ordinal < events[1].ordinal);
    assert!(events[1].ordinal < events[2].ordinal);
}

#[test]
fn stubbing_one_slot_leaves_the_others_trapped() {
    let session = Arc::new(RecordingSession::new());
    let mock = MockController::<BeaconTarget>::owned(session.clone());
    mock.stub::<BeaconPing>()
        .add_invocation_handler(|_| true, |_| 42);

    let instance = mock.get();
    assert_eq!(42, instance.ping());

    let message = expect_panic(|| {
        instance.shine(1);
    });
    assert!(message.contains("Beacon::shine"));
    assert_eq!(1, session.events().len());
}

#[test]
fn trap_reports_through_the_controller_session() {
    let session = Arc::new(RecordingSession::new());
    let mock = MockController::<BeaconTarget>::owned(session.clone());
    let instance = mock.get();

    let message = expect_panic(|| {
        instance.shine(7);
    });

    let events = session.events();
    assert_eq!(1, events.len());
    assert_eq!(CallKind::Unmocked, events[0].kind);
    assert_eq!("Beacon::shine", events[0].method);
    assert_eq!("(7,)", events[0].inputs_debug);
    // The raised failure carries exactly the session-formatted event.
    assert_eq!(message, mock.session().format(&events[0]));
}

#[test]
fn unstubbed_traps_are_not_added_to_any_invocation_log() {
    let mock = MockController::<BeaconTarget>::owned(Arc::new(RecordingSession::new()));
    let instance = mock.get();
    expect_panic(|| {
        instance.ping();
    });

    let mut collected = std::collections::BTreeSet::new();
    mock.collect_actual_invocations(&mut collected);
    assert!(collected.is_empty());
}
