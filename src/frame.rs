use crate::axis::{AxisTable, MtAxis, MT_AXIS_COUNT};
use crate::event::{EventKind, InputEvent, Syn, TimeVal};
use tracing::{debug, trace};

/// One anonymous protocol A contact: the axis values reported between two
/// `SYN_MT_REPORT` markers.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct Contact {
    values: [Option<i32>; MT_AXIS_COUNT],
}

impl Contact {
    pub fn at(x: i32, y: i32) -> Contact {
        Contact::default()
            .with(MtAxis::PositionX, x)
            .with(MtAxis::PositionY, y)
    }

    pub fn with(mut self, axis: MtAxis, value: i32) -> Contact {
        self.set(axis, value);
        self
    }

    pub fn get(&self, axis: MtAxis) -> Option<i32> {
        self.values[axis.index()]
    }

    pub fn set(&mut self, axis: MtAxis, value: i32) {
        self.values[axis.index()] = Some(value);
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }
}

/// Everything reported between two `SYN_REPORT` markers.
#[derive(PartialEq, Eq, Debug, Clone, Default)]
pub struct Frame {
    pub time: TimeVal,
    pub contacts: Vec<Contact>,
    /// Non-MT events forwarded unchanged before the closing `SYN_REPORT`.
    pub passthrough: Vec<InputEvent>,
}

impl Frame {
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty() && self.passthrough.is_empty()
    }
}

/// Groups raw protocol A events into frames of anonymous contacts.
#[derive(Debug)]
pub struct FrameAccumulator {
    current: Contact,
    contacts: Vec<Contact>,
    passthrough: Vec<InputEvent>,
    max_contacts: usize,
}

impl FrameAccumulator {
    pub fn new(max_contacts: usize) -> FrameAccumulator {
        FrameAccumulator {
            current: Contact::default(),
            contacts: Vec::with_capacity(max_contacts),
            passthrough: vec![],
            max_contacts,
        }
    }

    /// Feeds one event; returns the finished frame on `SYN_REPORT`.
    pub fn put_event(&mut self, axes: &AxisTable, event: &InputEvent) -> Option<Frame> {
        match event.kind() {
            EventKind::Syn(Syn::Report) => return Some(self.finish(event.time)),
            EventKind::Syn(Syn::MtReport) => self.push_contact(),
            EventKind::Syn(Syn::Dropped) => {
                debug!("SYN_DROPPED: discarding the partial frame");
                self.reset();
            }
            EventKind::Syn(Syn::Other(_)) => {}
            // tracking ids are assigned by the converter, never taken from the source
            EventKind::Axis(MtAxis::TrackingId, _) => {}
            EventKind::Axis(axis, value) => {
                if axes.is_enabled(axis) {
                    self.current.set(axis, axes.info(axis).clamp(value));
                }
            }
            EventKind::Slot(_) => {}
            EventKind::Other => self.passthrough.push(*event),
        }
        None
    }

    fn push_contact(&mut self) {
        let contact = std::mem::take(&mut self.current);
        if contact.is_empty() {
            return;
        }
        if self.contacts.len() < self.max_contacts {
            self.contacts.push(contact);
        } else {
            debug!(
                max_contacts = self.max_contacts,
                "frame is full, dropping contact"
            );
        }
    }

    fn finish(&mut self, time: TimeVal) -> Frame {
        if !self.current.is_empty() {
            trace!("discarding contact without SYN_MT_REPORT");
        }
        self.current = Contact::default();
        let frame = Frame {
            time,
            contacts: std::mem::take(&mut self.contacts),
            passthrough: std::mem::take(&mut self.passthrough),
        };
        trace!(
            contacts = frame.contacts.len(),
            passthrough = frame.passthrough.len(),
            "frame finished"
        );
        frame
    }

    fn reset(&mut self) {
        self.current = Contact::default();
        self.contacts.clear();
        self.passthrough.clear();
    }
}
