use crate::axis::{AxisTable, MtAxis};
use crate::codes::MT_ID_NULL;
use crate::event::{InputEvent, TimeVal};
use crate::frame::{Contact, Frame};
use crate::matcher::{Assignment, ContactMatcher};
use tracing::{debug, warn};

#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
struct SlotState {
    tracking_id: Option<i32>,
    values: Contact,
}

/// The protocol B slot table. Turns matched frames into the minimal set of
/// slot, tracking id and axis events.
#[derive(Debug)]
pub struct SlotTracker {
    slots: Vec<SlotState>,
    matcher: ContactMatcher,
    next_tracking_id: i32,
    current_slot: Option<usize>,
}

impl SlotTracker {
    pub fn new(max_slots: usize, matcher: ContactMatcher) -> SlotTracker {
        SlotTracker {
            slots: vec![SlotState::default(); max_slots],
            matcher,
            next_tracking_id: 0,
            current_slot: None,
        }
    }

    pub fn max_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn has_active(&self) -> bool {
        self.slots.iter().any(|slot| slot.tracking_id.is_some())
    }

    pub fn tracking_id(&self, slot: usize) -> Option<i32> {
        self.slots.get(slot).and_then(|slot| slot.tracking_id)
    }

    /// `(slot index, last emitted values)` of every active slot, ascending.
    pub fn active_slots(&self) -> Vec<(usize, Contact)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.tracking_id.is_some())
            .map(|(index, slot)| (index, slot.values))
            .collect()
    }

    /// Matches `frame` against the active slots and returns the converted
    /// packet. An empty frame while no slot is active produces nothing.
    pub fn apply_frame(&mut self, axes: &AxisTable, frame: &Frame) -> Vec<InputEvent> {
        if frame.is_empty() && !self.has_active() {
            return vec![];
        }
        let assignment = self
            .matcher
            .assign(axes, &self.active_slots(), &frame.contacts);
        self.apply(axes, &assignment, frame)
    }

    /// Ends, updates and starts slots as `assignment` says, then appends the
    /// frame's pass-through events and one `SYN_REPORT`.
    pub fn apply(
        &mut self,
        axes: &AxisTable,
        assignment: &Assignment,
        frame: &Frame,
    ) -> Vec<InputEvent> {
        let time = frame.time;
        let mut events = vec![];

        let mut continued_by = vec![None; self.slots.len()];
        for (contact, slot) in assignment.continued.iter().enumerate() {
            if let Some(slot) = slot {
                if let Some(entry) = continued_by.get_mut(*slot) {
                    *entry = Some(contact);
                }
            }
        }

        for slot in 0..self.slots.len() {
            if assignment.ended.contains(&slot) {
                self.end(slot, time, &mut events);
            } else if let Some(contact) = continued_by[slot] {
                self.update(axes, slot, &frame.contacts[contact], time, &mut events);
            }
        }

        // slots that were idle before this frame are preferred over
        // the ones that just ended
        let mut free = (0..self.slots.len())
            .filter(|slot| {
                self.slots[*slot].tracking_id.is_none() && !assignment.ended.contains(slot)
            })
            .chain(assignment.ended.iter().copied())
            .collect::<Vec<usize>>()
            .into_iter();
        for contact in assignment.births() {
            match free.next() {
                Some(slot) => self.begin(axes, slot, &frame.contacts[contact], time, &mut events),
                None => debug!(contact, "no free slot, dropping new contact"),
            }
        }

        events.extend(frame.passthrough.iter().copied());
        events.push(InputEvent::syn_report(time));
        events
    }

    fn select(&mut self, slot: usize, time: TimeVal, events: &mut Vec<InputEvent>) {
        if self.current_slot != Some(slot) {
            events.push(InputEvent::slot(time, slot));
            self.current_slot = Some(slot);
        }
    }

    fn begin(
        &mut self,
        axes: &AxisTable,
        slot: usize,
        contact: &Contact,
        time: TimeVal,
        events: &mut Vec<InputEvent>,
    ) {
        let tracking_id = self.take_tracking_id();
        self.select(slot, time, events);
        events.push(InputEvent::tracking_id(time, tracking_id));
        let mut values = Contact::default();
        for axis in reported_axes(axes) {
            let value = contact
                .get(axis)
                .unwrap_or_else(|| axes.info(axis).clamp(0));
            values.set(axis, value);
            events.push(InputEvent::axis(time, axis, value));
        }
        self.slots[slot] = SlotState {
            tracking_id: Some(tracking_id),
            values,
        };
    }

    fn update(
        &mut self,
        axes: &AxisTable,
        slot: usize,
        contact: &Contact,
        time: TimeVal,
        events: &mut Vec<InputEvent>,
    ) {
        let previous = self.slots[slot].values;
        let mut changes = vec![];
        for axis in reported_axes(axes) {
            if let Some(value) = contact.get(axis) {
                let value = match previous.get(axis) {
                    Some(old) => defuzz(value, old, axes.info(axis).fuzz),
                    None => value,
                };
                if previous.get(axis) != Some(value) {
                    changes.push((axis, value));
                }
            }
        }
        if changes.is_empty() {
            return;
        }
        self.select(slot, time, events);
        for (axis, value) in changes {
            self.slots[slot].values.set(axis, value);
            events.push(InputEvent::axis(time, axis, value));
        }
    }

    fn end(&mut self, slot: usize, time: TimeVal, events: &mut Vec<InputEvent>) {
        self.select(slot, time, events);
        events.push(InputEvent::tracking_id(time, MT_ID_NULL));
        self.slots[slot] = SlotState::default();
    }

    /// Ids increase monotonically until `i32::MAX`. Past that the counter
    /// starts over at 0 and skips ids still held by an active slot, so ids
    /// are unique among live contacts but retired ones can come back.
    fn take_tracking_id(&mut self) -> i32 {
        loop {
            let tracking_id = self.next_tracking_id;
            self.next_tracking_id = match self.next_tracking_id.checked_add(1) {
                Some(next) => next,
                None => {
                    warn!("tracking id counter wrapped around");
                    0
                }
            };
            let held = self
                .slots
                .iter()
                .any(|slot| slot.tracking_id == Some(tracking_id));
            if !held {
                return tracking_id;
            }
        }
    }
}

fn reported_axes(axes: &AxisTable) -> impl Iterator<Item = MtAxis> + '_ {
    axes.enabled_axes()
        .filter(|axis| *axis != MtAxis::TrackingId)
}

/// Kernel-style hysteresis (`input_defuzz_abs_event`).
pub fn defuzz(value: i32, old: i32, fuzz: i32) -> i32 {
    if fuzz > 0 {
        let (value, old, fuzz) = (i64::from(value), i64::from(old), i64::from(fuzz));
        let filtered = if value > old - fuzz / 2 && value < old + fuzz / 2 {
            old
        } else if value > old - fuzz && value < old + fuzz {
            (old * 3 + value) / 4
        } else if value > old - fuzz * 2 && value < old + fuzz * 2 {
            (old + value) / 2
        } else {
            value
        };
        filtered as i32
    } else {
        value
    }
}
