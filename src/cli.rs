use crate::ErrorString;
use clap::{Arg, ArgAction, ArgMatches, Command};
use mtdev::Config;
use std::ffi::OsString;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct Args {
    pub device: Option<String>,
    pub grab: bool,
    pub nonblock: bool,
    pub demo: bool,
    pub config: Config,
}

pub fn command() -> Command {
    Command::new("mtdev-test")
        .version("0.1.0")
        .about("prints the protocol B events converted from a multitouch device")
        .arg(
            Arg::new("device")
                .value_name("DEVICE")
                .help("evdev node to read, e.g. /dev/input/event5")
                .required_unless_present("demo"),
        )
        .arg(
            Arg::new("grab")
                .long("grab")
                .help("grabs the device for exclusive access (default: false)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("nonblock")
                .long("nonblock")
                .help("opens the device with O_NONBLOCK and polls it (default: false)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("max-slots")
                .long("max-slots")
                .value_name("N")
                .help(format!(
                    "number of protocol B slots (default: {})",
                    Config::default().max_slots
                )),
        )
        .arg(
            Arg::new("queue-capacity")
                .long("queue-capacity")
                .value_name("N")
                .help(format!(
                    "output queue size in events (default: {})",
                    Config::default().queue_capacity
                )),
        )
        .arg(
            Arg::new("threshold")
                .long("threshold")
                .value_name("DISTANCE")
                .help(format!(
                    "largest normalized distance a contact may travel between frames (default: {})",
                    Config::default().match_threshold
                )),
        )
        .arg(
            Arg::new("demo")
                .long("demo")
                .help("replays two walking contacts instead of reading a device (default: false)")
                .action(ArgAction::SetTrue),
        )
}

pub fn parse(app: Command) -> Result<Args, ErrorString> {
    from_matches(&app.get_matches())
}

pub fn parse_from<I, T>(app: Command, args: I) -> Result<Args, ErrorString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = app
        .try_get_matches_from(args)
        .map_err(|e| ErrorString::from(format!("{}", e)))?;
    from_matches(&matches)
}

fn from_matches(matches: &ArgMatches) -> Result<Args, ErrorString> {
    let default = Config::default();
    let config = Config {
        max_slots: parse_with_default(value_of(matches, "max-slots"), default.max_slots)?,
        queue_capacity: parse_with_default(
            value_of(matches, "queue-capacity"),
            default.queue_capacity,
        )?,
        match_threshold: parse_with_default(
            value_of(matches, "threshold"),
            default.match_threshold,
        )?,
    };
    Ok(Args {
        device: matches.get_one::<String>("device").cloned(),
        grab: matches.get_flag("grab"),
        nonblock: matches.get_flag("nonblock"),
        demo: matches.get_flag("demo"),
        config,
    })
}

fn value_of<'a>(matches: &'a ArgMatches, name: &str) -> Option<&'a str> {
    matches.get_one::<String>(name).map(String::as_str)
}

fn parse_with_default<N>(input: Option<&str>, default: N) -> Result<N, ErrorString>
where
    N: FromStr,
    <N as FromStr>::Err: Display,
{
    match input {
        None => Ok(default),
        Some(string) => string
            .parse()
            .map_err(|e| ErrorString::from(format!("{}: {}", string, e))),
    }
}
