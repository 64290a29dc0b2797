mod cli;

use mtdev::codes::*;
use mtdev::{device, AbsInfo, InputEvent, MtDev, TimeVal};
use std::fmt::Debug;
use std::thread::sleep;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub struct ErrorString(pub String);

impl From<String> for ErrorString {
    fn from(string: String) -> ErrorString {
        ErrorString(string)
    }
}

impl From<&str> for ErrorString {
    fn from(string: &str) -> ErrorString {
        ErrorString(string.to_string())
    }
}

impl From<mtdev::Error> for ErrorString {
    fn from(error: mtdev::Error) -> ErrorString {
        ErrorString(format!("{} ({})", error, error.errno()))
    }
}

pub trait AddMessage<T> {
    fn add_message(self, message: String) -> Result<T, ErrorString>;
}

impl<T, E: Debug> AddMessage<T> for Result<T, E> {
    fn add_message(self, message: String) -> Result<T, ErrorString> {
        self.map_err(|e| ErrorString(format!("{}: {:?}", message, e)))
    }
}

fn main() -> Result<(), ErrorString> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = cli::parse(cli::command())?;
    let mut dev = MtDev::with_config(args.config)?;
    if args.demo {
        walk(&mut dev);
        print_events(&mut dev);
        return Ok(());
    }
    let path = args.device.ok_or("no device given")?;
    let mut device = device::open(&path, args.grab, args.nonblock)
        .add_message(format!("can't open {}", path))?;
    dev.configure(&device)?;
    info!(path = path.as_str(), "reading events");
    loop {
        match dev.fetch_event(&mut device)? {
            Some(_) => print_events(&mut dev),
            None => sleep(Duration::from_millis(10)),
        }
    }
}

fn print_events(dev: &mut MtDev) {
    for event in dev.events() {
        println!(
            "{}.{:06} {:#x} {:#x} {}",
            event.time.tv_sec, event.time.tv_usec, event.event_type, event.code, event.value
        );
    }
}

fn touchpoint(dev: &mut MtDev, x: i32, y: i32) {
    let time = TimeVal::default();
    dev.put_event(&InputEvent::new(time, EV_ABS, ABS_MT_POSITION_X, x));
    dev.put_event(&InputEvent::new(time, EV_ABS, ABS_MT_POSITION_Y, y));
    dev.put_event(&InputEvent::syn_mt_report(time));
}

fn syn(dev: &mut MtDev) {
    dev.put_event(&InputEvent::syn_report(TimeVal::default()));
}

/// Two contacts walking, one lifting, both touching down again.
fn walk(dev: &mut MtDev) {
    dev.set_abs(ABS_MT_POSITION_X, AbsInfo::new(0, 1000));
    dev.set_abs(ABS_MT_POSITION_Y, AbsInfo::new(0, 1000));

    touchpoint(dev, 10, 10);
    touchpoint(dev, 500, 500);
    syn(dev);

    touchpoint(dev, 20, 20);
    touchpoint(dev, 520, 520);
    syn(dev);

    touchpoint(dev, 20, 20);
    syn(dev);

    touchpoint(dev, 10, 10);
    touchpoint(dev, 500, 500);
    syn(dev);

    touchpoint(dev, 20, 20);
    touchpoint(dev, 520, 520);
    syn(dev);
}
