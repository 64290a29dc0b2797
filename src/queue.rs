use crate::event::{EventKind, InputEvent};
use std::collections::{TryReserveError, VecDeque};
use tracing::debug;

/// Default capacity, enough for several complete packets of a fully
/// populated slot table.
pub const DEFAULT_QUEUE_CAPACITY: usize = 8192;

/// Bounded FIFO of converted events.
///
/// When an enqueue does not fit, the oldest entries are evicted, never the
/// new ones. Eviction continues up to the next `SYN_REPORT` so that the
/// consumer does not start reading in the middle of a packet. If the evicted
/// entries selected a slot, the last such `ABS_MT_SLOT` is put back in front
/// of what remains: later packets omit the select while the slot is
/// unchanged, and the consumer never saw the evicted one.
#[derive(Debug)]
pub struct OutputQueue {
    events: VecDeque<InputEvent>,
    capacity: usize,
    dropped: u64,
}

impl OutputQueue {
    pub fn with_capacity(capacity: usize) -> Result<OutputQueue, TryReserveError> {
        let capacity = capacity.max(1);
        let mut events = VecDeque::new();
        events.try_reserve_exact(capacity)?;
        Ok(OutputQueue {
            events,
            capacity,
            dropped: 0,
        })
    }

    pub fn push(&mut self, event: InputEvent) {
        self.enqueue(&[event]);
    }

    pub fn enqueue(&mut self, events: &[InputEvent]) {
        if events.len() >= self.capacity {
            self.replace_with_tail(events);
            return;
        }
        if self.events.len() + events.len() > self.capacity {
            self.evict(events);
        }
        self.events.extend(events.iter().copied());
    }

    fn evict(&mut self, incoming: &[InputEvent]) {
        let mut evicted = 0;
        let mut selection = None;
        let mut at_boundary = true;
        while let Some(event) = self.events.front().copied() {
            if at_boundary {
                let restated = usize::from(self.restatement(selection, incoming).is_some());
                if self.events.len() + incoming.len() + restated <= self.capacity {
                    break;
                }
            }
            at_boundary = event.is_syn_report();
            if is_slot_select(&event) {
                selection = Some(event);
            }
            self.events.pop_front();
            evicted += 1;
        }
        self.record_dropped(evicted);
        if let Some(select) = self.restatement(selection, incoming) {
            self.events.push_front(select);
        }
    }

    /// Keeps only the newest entries of a batch that alone fills the queue.
    fn replace_with_tail(&mut self, events: &[InputEvent]) {
        let mut skipped = events.len() - self.capacity;
        if last_slot_select(self.events.iter().chain(&events[..skipped])).is_some()
            && !events[skipped..].first().map_or(false, is_slot_select)
        {
            skipped += 1;
        }
        let selection = last_slot_select(self.events.iter().chain(&events[..skipped]));
        self.record_dropped(self.events.len() + skipped);
        self.events.clear();
        self.events.extend(events[skipped..].iter().copied());
        if let Some(select) = self.restatement(selection, &[]) {
            self.events.push_front(select);
        }
    }

    /// The slot select to put in front of the remaining entries, if the
    /// evicted ones chose a slot and the remaining ones do not start by
    /// choosing one themselves.
    fn restatement(
        &self,
        selection: Option<InputEvent>,
        incoming: &[InputEvent],
    ) -> Option<InputEvent> {
        let head = self.events.front().or(incoming.first());
        match head {
            Some(head) if is_slot_select(head) => None,
            _ => selection,
        }
    }

    fn record_dropped(&mut self, count: usize) {
        if count > 0 {
            self.dropped += count as u64;
            debug!(count, total = self.dropped, "output queue full, dropped oldest events");
        }
    }

    pub fn pop(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Total number of events evicted since construction.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

fn is_slot_select(event: &InputEvent) -> bool {
    matches!(event.kind(), EventKind::Slot(_))
}

fn last_slot_select<'a>(events: impl Iterator<Item = &'a InputEvent>) -> Option<InputEvent> {
    events.filter(|event| is_slot_select(event)).last().copied()
}
