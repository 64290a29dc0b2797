//! The kernel device side: axis calibration and raw event reads through
//! libevdev.

use crate::axis::AbsInfo;
use crate::codes::*;
use crate::event::{InputEvent, TimeVal};
use crate::{MtDev, Result};
use evdev_rs::enums::{event_code_to_int, int_to_event_code, EventCode};
use evdev_rs::{Device, DeviceWrapper, GrabMode, ReadFlag, ReadStatus};
use nix::fcntl::{fcntl, FcntlArg, OFlag};
use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;
use tracing::{debug, info};

/// Something that can report axis calibration, like an evdev node.
pub trait AbsSource {
    fn query_abs(&self, code: u16) -> io::Result<Option<AbsInfo>>;
}

/// Something that yields raw kernel events.
pub trait EventSource {
    /// `Ok(None)` when a non-blocking descriptor has nothing pending.
    fn read_event(&mut self) -> io::Result<Option<InputEvent>>;
}

/// Opens an evdev node, optionally non-blocking and grabbed.
pub fn open(path: &str, grab: bool, nonblock: bool) -> io::Result<Device> {
    let file = File::open(path)?;
    if nonblock {
        let flags = fcntl(file.as_raw_fd(), FcntlArg::F_GETFL)?;
        let flags = OFlag::from_bits_truncate(flags) | OFlag::O_NONBLOCK;
        fcntl(file.as_raw_fd(), FcntlArg::F_SETFL(flags))?;
    }
    let mut device = Device::new_from_file(file)?;
    if grab {
        device.grab(GrabMode::Grab)?;
    }
    Ok(device)
}

fn abs_code(code: u16) -> Option<EventCode> {
    match int_to_event_code(u32::from(EV_ABS), u32::from(code)) {
        event_code @ EventCode::EV_ABS(_) => Some(event_code),
        _ => None,
    }
}

impl AbsSource for Device {
    fn query_abs(&self, code: u16) -> io::Result<Option<AbsInfo>> {
        let info = abs_code(code)
            .and_then(|event_code| DeviceWrapper::abs_info(self, &event_code))
            .map(|info| AbsInfo {
                minimum: info.minimum,
                maximum: info.maximum,
                fuzz: info.fuzz,
                resolution: info.resolution,
            });
        Ok(info)
    }
}

impl EventSource for Device {
    /// Reads with `ReadFlag::NORMAL` only. After a `SYN_DROPPED` libevdev
    /// reports `ReadStatus::Sync`, but the state replay it offers through
    /// `ReadFlag::SYNC` is not drained here. The converter drops the partial
    /// frame and continues with the events that follow.
    fn read_event(&mut self) -> io::Result<Option<InputEvent>> {
        match self.next_event(ReadFlag::NORMAL) {
            Ok((status, event)) => {
                if matches!(status, ReadStatus::Sync) {
                    debug!("device dropped events, skipping its state replay");
                }
                let (event_type, code) = event_code_to_int(&event.event_code);
                Ok(Some(InputEvent {
                    time: TimeVal {
                        tv_sec: event.time.tv_sec as i64,
                        tv_usec: event.time.tv_usec as i64,
                    },
                    event_type: event_type as u16,
                    code: code as u16,
                    value: event.value,
                }))
            }
            Err(error) if error.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(error) => Err(error),
        }
    }
}

impl MtDev {
    /// Reads the calibration of every MT axis the device reports. On error
    /// the axes configured so far are kept.
    pub fn configure(&mut self, device: &impl AbsSource) -> Result<()> {
        let mut axes = 0;
        for code in ABS_MT_SLOT..=ABS_MT_TOOL_Y {
            if let Some(info) = device.query_abs(code)? {
                self.set_abs(code, info);
                axes += 1;
            }
        }
        info!(
            axes,
            native_slots = self.has_mt_event(ABS_MT_SLOT),
            "configured from device"
        );
        Ok(())
    }

    /// Reads one raw event, feeds it through `put_event` and returns it.
    /// `Ok(None)` means nothing was pending on a non-blocking descriptor.
    pub fn fetch_event(&mut self, device: &mut impl EventSource) -> Result<Option<InputEvent>> {
        let event = device.read_event()?;
        if let Some(event) = &event {
            self.put_event(event);
        }
        Ok(event)
    }
}
