use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::signals::Callback;

/// Memory ordering strength for one side (write or read) of a trigger.
///
/// Orderings that are not valid for a side are strengthened to
/// [`MemoryOrder::SeqCst`]: a store never uses `Acquire`/`AcqRel` and a load
/// never uses `Release`/`AcqRel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemoryOrder {
    /// Atomicity only.
    Relaxed,
    Acquire,
    Release,
    AcqRel,
    /// Single total order across all threads.
    #[default]
    SeqCst,
}

impl MemoryOrder {
    fn for_store(self) -> Ordering {
        match self {
            MemoryOrder::Relaxed => Ordering::Relaxed,
            MemoryOrder::Release => Ordering::Release,
            MemoryOrder::Acquire | MemoryOrder::AcqRel | MemoryOrder::SeqCst => Ordering::SeqCst,
        }
    }

    fn for_load(self) -> Ordering {
        match self {
            MemoryOrder::Relaxed => Ordering::Relaxed,
            MemoryOrder::Acquire => Ordering::Acquire,
            MemoryOrder::Release | MemoryOrder::AcqRel | MemoryOrder::SeqCst => Ordering::SeqCst,
        }
    }
}

/// Thread-safe one-shot event flag.
///
/// Clones share the underlying flag: triggering any handle is visible through
/// every other handle. Once triggered the flag stays set.
#[derive(Clone)]
pub struct EventTrigger {
    write: MemoryOrder,
    read: MemoryOrder,
    flag: Arc<AtomicBool>,
}

impl EventTrigger {
    /// Creates an untriggered flag using sequentially consistent reads and writes.
    pub fn new() -> Self {
        Self::with_ordering(MemoryOrder::SeqCst, MemoryOrder::SeqCst)
    }

    /// Creates an untriggered flag with explicit write and read orderings.
    pub fn with_ordering(write: MemoryOrder, read: MemoryOrder) -> Self {
        Self {
            write,
            read,
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Sets the flag using the write ordering. Idempotent.
    pub fn trigger(&self) {
        self.flag.store(true, self.write.for_store());
    }

    /// Reads the flag using the read ordering.
    pub fn is_triggered(&self) -> bool {
        self.flag.load(self.read.for_load())
    }

    /// Default invocation. Same as [`trigger`](Self::trigger).
    pub fn call(&self) {
        self.trigger();
    }

    /// Converts the trigger into a plain "fire" callback sharing the same flag.
    pub fn into_callback(self) -> Callback {
        Arc::new(move || self.trigger())
    }

    /// Returns the write ordering this handle was created with.
    pub fn write_order(&self) -> MemoryOrder {
        self.write
    }

    /// Returns the read ordering this handle was created with.
    pub fn read_order(&self) -> MemoryOrder {
        self.read
    }

    /// Returns true if both handles share one flag.
    pub fn same_flag(&self, other: &EventTrigger) -> bool {
        Arc::ptr_eq(&self.flag, &other.flag)
    }
}

impl Default for EventTrigger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventTrigger")
            .field("write", &self.write)
            .field("read", &self.read)
            .field("triggered", &self.is_triggered())
            .finish()
    }
}
