//! A composite target declaring a closed set of base capabilities: slots and
//! data members declared against a base dispatch through the composite
//! instance unchanged.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use proxymock::*;

trait Reader: Send + Sync {
    fn read(&self) -> u8;
}

trait Writer: Send + Sync {
    fn write(&self, byte: u8);
}

trait Device: Reader + Writer {
    fn label(&self) -> String;
}

#[derive(Default)]
struct DeviceData {
    label: String,
}

struct DeviceTarget;

impl MockTarget for DeviceTarget {
    type Instance = dyn Device;
    type Data = DeviceData;

    const NAME: &'static str = "Device";

    fn proxy_instance(dispatch: MockDispatch) -> Arc<Self::Instance> {
        Arc::new(DeviceAdapter { dispatch })
    }
}

struct ReaderBase;

impl MockTarget for ReaderBase {
    type Instance = dyn Device;
    type Data = DeviceData;

    const NAME: &'static str = "Reader";

    fn proxy_instance(dispatch: MockDispatch) -> Arc<Self::Instance> {
        DeviceTarget::proxy_instance(dispatch)
    }
}

impl BaseOf<DeviceTarget> for ReaderBase {}

struct WriterBase;

impl MockTarget for WriterBase {
    type Instance = dyn Device;
    type Data = DeviceData;

    const NAME: &'static str = "Writer";

    fn proxy_instance(dispatch: MockDispatch) -> Arc<Self::Instance> {
        DeviceTarget::proxy_instance(dispatch)
    }
}

impl BaseOf<DeviceTarget> for WriterBase {}

struct DeviceAdapter {
    dispatch: MockDispatch,
}

impl Reader for DeviceAdapter {
    fn read(&self) -> u8 {
        self.dispatch.eval::<ReaderRead>(())
    }
}

impl Writer for DeviceAdapter {
    fn write(&self, byte: u8) {
        self.dispatch.eval::<WriterWrite>((byte,))
    }
}

impl Device for DeviceAdapter {
    fn label(&self) -> String {
        self.dispatch
            .read_data::<DeviceTarget, _>(|data| data.label.clone())
    }
}

impl Drop for DeviceAdapter {
    fn drop(&mut self) {
        self.dispatch.dispatch_drop::<DeviceTarget>();
    }
}

struct ReaderRead;

impl MethodSlot for ReaderRead {
    type Target = ReaderBase;
    type Inputs<'i> = ();
    type Output = u8;

    const NAME: &'static str = "Reader::read";

    fn debug_inputs(_inputs: &Self::Inputs<'_>) -> String {
        "()".to_string()
    }

    fn call_original(instance: &dyn Device, _inputs: Self::Inputs<'_>) -> u8 {
        instance.read()
    }
}

struct WriterWrite;

impl MethodSlot for WriterWrite {
    type Target = WriterBase;
    type Inputs<'i> = (u8,);
    type Output = ();

    const NAME: &'static str = "Writer::write";

    fn debug_inputs(inputs: &Self::Inputs<'_>) -> String {
        format!("{inputs:?}")
    }

    fn call_original(instance: &dyn Device, (byte,): Self::Inputs<'_>) {
        instance.write(byte)
    }
}

struct LabelMember;

impl DataMemberSlot for LabelMember {
    type Target = ReaderBase;
    type Value = String;

    const NAME: &'static str = "Reader::label";

    fn project(data: &mut DeviceData) -> &mut String {
        &mut data.label
    }
}

#[test]
fn base_slots_stub_through_the_composite_controller() {
    let mock = MockController::<DeviceTarget>::owned(Arc::new(RecordingSession::new()));
    mock.stub::<ReaderRead>()
        .add_invocation_handler(|_| true, |_| 0xA5);
    mock.stub::<WriterWrite>()
        .add_invocation_handler(|(byte,)| *byte < 16, |_| ());

    let instance = mock.get();
    assert_eq!(0xA5, instance.read());
    instance.write(7);

    assert!(catch_unwind(AssertUnwindSafe(|| instance.write(200))).is_err());
}

#[test]
fn base_data_members_write_the_composite_data_region() {
    let mock = MockController::<DeviceTarget>::owned(Arc::new(RecordingSession::new()));
    mock.stub_data_member::<LabelMember>("dev0".to_string());

    assert_eq!("dev0", mock.get().label());
}

#[test]
fn wrapped_composites_forward_unstubbed_base_operations() {
    struct NullDevice;

    impl Reader for NullDevice {
        fn read(&self) -> u8 {
            0
        }
    }

    impl Writer for NullDevice {
        fn write(&self, _byte: u8) {}
    }

    impl Device for NullDevice {
        fn label(&self) -> String {
            "null".to_string()
        }
    }

    let real: Arc<dyn Device> = Arc::new(NullDevice);
    let mock = MockController::<DeviceTarget>::wrap(Arc::new(RecordingSession::new()), real);
    mock.stub::<ReaderRead>()
        .add_invocation_handler(|_| true, |_| 9);

    let instance = mock.get();
    assert_eq!(9, instance.read());
    instance.write(3);
}
