use crate::axis::MT_AXIS_COUNT;
use crate::matcher::DEFAULT_MATCH_THRESHOLD;
use crate::queue::DEFAULT_QUEUE_CAPACITY;

/// Slot table size used when the device does not say otherwise.
pub const DEFAULT_MAX_SLOTS: usize = 32;
pub const MAX_SLOTS: usize = 64;
pub const MIN_QUEUE_CAPACITY: usize = 256;
/// Complete packets of a fully populated slot table the queue always holds.
pub const MIN_QUEUED_PACKETS: usize = 4;

/// Smallest queue that holds `MIN_QUEUED_PACKETS` packets in which every
/// slot is born with every axis reported.
pub fn min_queue_capacity(max_slots: usize) -> usize {
    // per slot: slot select, tracking id, the other axes
    let packet = max_slots * (MT_AXIS_COUNT + 1) + 1;
    MIN_QUEUE_CAPACITY.max(MIN_QUEUED_PACKETS * packet)
}

/// Tunables of one converter instance, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Number of protocol B slots, i.e. simultaneous contacts.
    pub max_slots: usize,
    /// Output queue size in events.
    pub queue_capacity: usize,
    /// Largest normalized distance at which a contact still continues a slot.
    pub match_threshold: f64,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            max_slots: DEFAULT_MAX_SLOTS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl Config {
    pub fn with_max_slots(self, max_slots: usize) -> Config {
        Config { max_slots, ..self }
    }

    pub fn with_queue_capacity(self, queue_capacity: usize) -> Config {
        Config {
            queue_capacity,
            ..self
        }
    }

    pub fn with_match_threshold(self, match_threshold: f64) -> Config {
        Config {
            match_threshold,
            ..self
        }
    }

    pub(crate) fn sanitized(self) -> Config {
        let max_slots = self.max_slots.clamp(1, MAX_SLOTS);
        Config {
            max_slots,
            queue_capacity: self.queue_capacity.max(min_queue_capacity(max_slots)),
            match_threshold: if self.match_threshold.is_nan() {
                DEFAULT_MATCH_THRESHOLD
            } else {
                self.match_threshold
            },
        }
    }
}
