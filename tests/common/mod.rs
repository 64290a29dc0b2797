#![allow(dead_code)]

use mtdev::codes::*;
use mtdev::{AbsInfo, InputEvent, MtDev, TimeVal};

pub fn t() -> TimeVal {
    TimeVal::default()
}

pub fn mtdev() -> MtDev {
    let mut dev = MtDev::new().unwrap();
    configure(&mut dev);
    dev
}

pub fn configure(dev: &mut MtDev) {
    dev.set_abs(ABS_MT_POSITION_X, AbsInfo::new(0, 1000));
    dev.set_abs(ABS_MT_POSITION_Y, AbsInfo::new(0, 1000));
}

pub fn touchpoint(dev: &mut MtDev, x: i32, y: i32) {
    dev.put_event(&InputEvent::new(t(), EV_ABS, ABS_MT_POSITION_X, x));
    dev.put_event(&InputEvent::new(t(), EV_ABS, ABS_MT_POSITION_Y, y));
    dev.put_event(&InputEvent::syn_mt_report(t()));
}

pub fn syn(dev: &mut MtDev) {
    dev.put_event(&InputEvent::syn_report(t()));
}

/// Feeds one protocol A packet and drains what came out.
pub fn packet(dev: &mut MtDev, contacts: &[(i32, i32)]) -> Vec<InputEvent> {
    for (x, y) in contacts.iter() {
        touchpoint(dev, *x, *y);
    }
    syn(dev);
    dev.events().collect()
}

/// Splits a protocol B stream at its `SYN_REPORT`s.
pub fn packets(events: &[InputEvent]) -> Vec<Vec<InputEvent>> {
    let mut result = vec![];
    let mut current = vec![];
    for event in events {
        if event.is_syn_report() {
            result.push(std::mem::take(&mut current));
        } else {
            current.push(*event);
        }
    }
    if !current.is_empty() {
        result.push(current);
    }
    result
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, PartialEq, Clone)]
pub enum TouchState {
    NoTouch {
        slot: usize,
        tracking_id: i32,
    },
    Touch {
        slot: usize,
        tracking_id: i32,
        position: Position,
    },
}

#[derive(Debug, Clone, Copy)]
struct SlotState {
    tracking_id: i32,
    position: Position,
    touching: bool,
}

/// Reads a protocol B stream back into per-slot touch states, the way a
/// display server would.
#[derive(Debug)]
pub struct TouchStateReader {
    slots: Vec<SlotState>,
    active_slot: Option<usize>,
}

impl TouchStateReader {
    pub fn new(max_slots: usize) -> TouchStateReader {
        TouchStateReader {
            slots: vec![
                SlotState {
                    tracking_id: MT_ID_NULL,
                    position: Position { x: 0, y: 0 },
                    touching: false,
                };
                max_slots
            ],
            active_slot: None,
        }
    }

    /// Applies one packet and returns the states of the slots it touched.
    pub fn process_packet(&mut self, packet: &[InputEvent]) -> Vec<TouchState> {
        let mut changed = vec![false; self.slots.len()];
        for event in packet {
            if event.event_type != EV_ABS {
                continue;
            }
            match event.code {
                ABS_MT_SLOT => {
                    self.active_slot = if event.value >= 0 && (event.value as usize) < self.slots.len() {
                        Some(event.value as usize)
                    } else {
                        None
                    };
                }
                ABS_MT_POSITION_X => {
                    if let Some(active_slot) = self.active_slot {
                        changed[active_slot] = true;
                        self.slots[active_slot].position.x = event.value;
                    }
                }
                ABS_MT_POSITION_Y => {
                    if let Some(active_slot) = self.active_slot {
                        changed[active_slot] = true;
                        self.slots[active_slot].position.y = event.value;
                    }
                }
                ABS_MT_TRACKING_ID => {
                    if let Some(active_slot) = self.active_slot {
                        changed[active_slot] = true;
                        match event.value {
                            MT_ID_NULL => self.slots[active_slot].touching = false,
                            tracking_id => {
                                self.slots[active_slot].tracking_id = tracking_id;
                                self.slots[active_slot].touching = true;
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        changed
            .iter()
            .enumerate()
            .filter(|(_, changed)| **changed)
            .map(|(slot, _)| self.touch_state(slot))
            .collect()
    }

    fn touch_state(&self, slot: usize) -> TouchState {
        let state = self.slots[slot];
        if state.touching {
            TouchState::Touch {
                slot,
                tracking_id: state.tracking_id,
                position: state.position,
            }
        } else {
            TouchState::NoTouch {
                slot,
                tracking_id: state.tracking_id,
            }
        }
    }

    /// `(slot, tracking id)` of every slot currently touching.
    pub fn touching(&self) -> Vec<(usize, i32)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, state)| state.touching)
            .map(|(slot, state)| (slot, state.tracking_id))
            .collect()
    }
}
