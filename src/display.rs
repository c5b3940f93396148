//! Line-oriented rendering for the terminal frontend. Every drawing
//! function re-derives its output from the values it is handed; nothing
//! here holds state.

use std::io::{self, Write};
use std::time::Duration;

use stopwatch_core::{format_hms_cs_opt, split_hms};

pub const HELP_TEXT: &str = "\
commands:
  start        open the clock
  stop         freeze the clock
  lap, l       capture the current elapsed time
  reset, r     clear everything (keeps running if it was running)
  help, h, ?   show this text
  quit, q      exit";

/// Overwrite the live status line in place.
pub fn draw_status(
    out: &mut impl Write,
    running: bool,
    elapsed: Option<Duration>,
) -> io::Result<()> {
    let state = if running { "running" } else { "stopped" };
    write!(out, "\r{}  [{}]   ", format_hms_cs_opt(elapsed), state)?;
    out.flush()
}

/// Print a captured lap on its own line; the status line redraws below it.
/// Trailing padding clears leftovers from the overwritten status line.
pub fn draw_lap(out: &mut impl Write, lap: Option<Duration>) -> io::Result<()> {
    writeln!(out, "\rlap  {}          ", format_hms_cs_opt(lap))
}

pub fn draw_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\r{}", HELP_TEXT)
}

/// Final total printed on exit.
pub fn draw_summary(out: &mut impl Write, elapsed: Option<Duration>) -> io::Result<()> {
    match elapsed {
        Some(total) => {
            let (h, m, s) = split_hms(total);
            writeln!(out, "\rtotal  {}h {:02}m {:02}s          ", h, m, s.trunc() as u64)
        }
        None => writeln!(out, "\rno time recorded          "),
    }
}
