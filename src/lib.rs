//! Conversion of anonymous multitouch reports (protocol A) into slotted,
//! tracked contacts (protocol B).
//!
//! ```
//! use mtdev::codes::*;
//! use mtdev::{AbsInfo, InputEvent, MtDev, TimeVal};
//!
//! let mut dev = MtDev::new().unwrap();
//! dev.set_abs(ABS_MT_POSITION_X, AbsInfo::new(0, 1000));
//! dev.set_abs(ABS_MT_POSITION_Y, AbsInfo::new(0, 1000));
//!
//! let time = TimeVal::default();
//! dev.put_event(&InputEvent::new(time, EV_ABS, ABS_MT_POSITION_X, 10));
//! dev.put_event(&InputEvent::new(time, EV_ABS, ABS_MT_POSITION_Y, 10));
//! dev.put_event(&InputEvent::syn_mt_report(time));
//! dev.put_event(&InputEvent::syn_report(time));
//!
//! while let Some(event) = dev.get_event() {
//!     println!("{:?}", event);
//! }
//! ```

pub mod axis;
pub mod codes;
pub mod config;
#[cfg(feature = "device")]
pub mod device;
pub mod error;
pub mod event;
pub mod frame;
pub mod matcher;
pub mod queue;
pub mod slots;

pub use crate::axis::{AbsInfo, AxisTable, MtAxis};
pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::event::{EventKind, InputEvent, Syn, TimeVal};

use crate::frame::FrameAccumulator;
use crate::matcher::ContactMatcher;
use crate::queue::OutputQueue;
use crate::slots::SlotTracker;

/// One converter instance. Owns its axis table, slot table, the frame in
/// progress and the output queue; instances share nothing.
#[derive(Debug)]
pub struct MtDev {
    config: Config,
    axes: AxisTable,
    frame: FrameAccumulator,
    slots: SlotTracker,
    queue: OutputQueue,
}

impl MtDev {
    pub fn new() -> Result<MtDev> {
        MtDev::with_config(Config::default())
    }

    /// Fails only if the output queue cannot be allocated.
    pub fn with_config(config: Config) -> Result<MtDev> {
        let config = config.sanitized();
        Ok(MtDev {
            config,
            axes: AxisTable::new(),
            frame: FrameAccumulator::new(config.max_slots),
            slots: SlotTracker::new(
                config.max_slots,
                ContactMatcher::new(config.match_threshold),
            ),
            queue: OutputQueue::with_capacity(config.queue_capacity)?,
        })
    }

    pub fn config(&self) -> Config {
        self.config
    }

    /// Enables `code` and sets its axis range.
    pub fn set_abs(&mut self, code: u16, info: AbsInfo) {
        self.axes.set_abs(code, info);
    }

    /// Enables or disables `code` without changing its range.
    pub fn set_event(&mut self, code: u16, enabled: bool) {
        self.axes.set_event(code, enabled);
    }

    pub fn set_mt_event(&mut self, code: u16, enabled: bool) {
        self.set_event(code, enabled);
    }

    pub fn has_mt_event(&self, code: u16) -> bool {
        self.axes.has_event(code)
    }

    pub fn abs_info(&self, code: u16) -> Option<AbsInfo> {
        self.axes.abs_info(code)
    }

    pub fn set_abs_minimum(&mut self, code: u16, value: i32) {
        self.axes.set_minimum(code, value);
    }

    pub fn set_abs_maximum(&mut self, code: u16, value: i32) {
        self.axes.set_maximum(code, value);
    }

    pub fn set_abs_fuzz(&mut self, code: u16, value: i32) {
        self.axes.set_fuzz(code, value);
    }

    pub fn set_abs_resolution(&mut self, code: u16, value: i32) {
        self.axes.set_resolution(code, value);
    }

    /// Feeds one kernel event. Never blocks; when the output queue is full
    /// the oldest converted events are dropped.
    pub fn put_event(&mut self, event: &InputEvent) {
        if self.axes.has_slot() {
            self.queue.push(*event);
            return;
        }
        if let Some(frame) = self.frame.put_event(&self.axes, event) {
            let packet = self.slots.apply_frame(&self.axes, &frame);
            self.queue.enqueue(&packet);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Takes the oldest converted event, `None` once the queue is drained.
    pub fn get_event(&mut self) -> Option<InputEvent> {
        self.queue.pop()
    }

    /// Drains every converted event currently queued.
    pub fn events(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        std::iter::from_fn(move || self.get_event())
    }

    /// Number of converted events lost to queue overflow.
    pub fn dropped_events(&self) -> u64 {
        self.queue.dropped()
    }
}
