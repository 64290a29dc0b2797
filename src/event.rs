use crate::axis::MtAxis;
use crate::codes::*;

#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub struct TimeVal {
    pub tv_sec: i64,
    pub tv_usec: i64,
}

/// A kernel input event: the `{time, type, code, value}` triple in both the
/// protocol A input and the protocol B output.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct InputEvent {
    pub time: TimeVal,
    pub event_type: u16,
    pub code: u16,
    pub value: i32,
}

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Syn {
    /// `SYN_REPORT`, end of packet.
    Report,
    /// `SYN_MT_REPORT`, end of one anonymous contact.
    MtReport,
    /// `SYN_DROPPED`, the kernel buffer overran.
    Dropped,
    Other(u16),
}

/// Tagged view of an `InputEvent`, carrying only what is valid for its class.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum EventKind {
    Syn(Syn),
    Slot(i32),
    Axis(MtAxis, i32),
    /// Anything that is neither an MT axis nor a synchronization marker.
    Other,
}

impl InputEvent {
    pub fn new(time: TimeVal, event_type: u16, code: u16, value: i32) -> InputEvent {
        InputEvent {
            time,
            event_type,
            code,
            value,
        }
    }

    pub fn syn_report(time: TimeVal) -> InputEvent {
        InputEvent::new(time, EV_SYN, SYN_REPORT, 0)
    }

    pub fn syn_mt_report(time: TimeVal) -> InputEvent {
        InputEvent::new(time, EV_SYN, SYN_MT_REPORT, 0)
    }

    pub fn slot(time: TimeVal, slot: usize) -> InputEvent {
        InputEvent::new(time, EV_ABS, ABS_MT_SLOT, slot as i32)
    }

    pub fn tracking_id(time: TimeVal, tracking_id: i32) -> InputEvent {
        InputEvent::new(time, EV_ABS, ABS_MT_TRACKING_ID, tracking_id)
    }

    pub fn axis(time: TimeVal, axis: MtAxis, value: i32) -> InputEvent {
        InputEvent::new(time, EV_ABS, axis.code(), value)
    }

    pub fn kind(&self) -> EventKind {
        match self.event_type {
            EV_SYN => EventKind::Syn(match self.code {
                SYN_REPORT => Syn::Report,
                SYN_MT_REPORT => Syn::MtReport,
                SYN_DROPPED => Syn::Dropped,
                other => Syn::Other(other),
            }),
            EV_ABS if self.code == ABS_MT_SLOT => EventKind::Slot(self.value),
            EV_ABS => match MtAxis::from_code(self.code) {
                Some(axis) => EventKind::Axis(axis, self.value),
                None => EventKind::Other,
            },
            _ => EventKind::Other,
        }
    }

    pub fn is_syn_report(&self) -> bool {
        self.kind() == EventKind::Syn(Syn::Report)
    }
}
