use std::fmt::Display;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::slot::{DynMethodSlot, MethodSlot};

/// One process-wide counter gives a total order over every recorded call,
/// across all controllers.
static NEXT_ORDINAL: AtomicUsize = AtomicUsize::new(1);

pub(crate) fn next_ordinal() -> usize {
    NEXT_ORDINAL.fetch_add(1, Ordering::SeqCst)
}

/// One observed call on a mocked slot: its globally monotonic ordinal, the
/// slot identity and an argument snapshot. Immutable once recorded; ordered
/// by ordinal.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Invocation {
    ordinal: usize,
    method: DynMethodSlot,
    inputs_debug: String,
}

impl Invocation {
    pub(crate) fn record<S: MethodSlot>(inputs: &S::Inputs<'_>) -> Self {
        Self {
            ordinal: next_ordinal(),
            method: DynMethodSlot::new::<S>(),
            inputs_debug: S::debug_inputs(inputs),
        }
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn method_name(&self) -> &'static str {
        self.method.name()
    }

    pub fn inputs_debug(&self) -> &str {
        &self.inputs_debug
    }
}

impl Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{} [#{}]",
            self.method.name(),
            self.inputs_debug,
            self.ordinal
        )
    }
}
