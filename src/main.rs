//! Terminal stopwatch frontend.
//!
//! Owns a `stopwatch_core::Stopwatch` and drives it from two event
//! sources: a pump thread that ticks on a fixed cadence while the clock
//! runs, and an input thread that forwards stdin lines as commands. The
//! live display is re-derived from the engine on every tick; the lap line
//! is refreshed from the engine's lap notification instead of polling.

mod command;
mod display;

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use stopwatch_core::{format_hms_cs_opt, Stopwatch};

use crate::command::Command;

/// Terminal stopwatch with lap capture
#[derive(Parser, Debug)]
#[command(name = "stopwatch")]
#[command(about = "Terminal stopwatch with lap capture", long_about = None)]
#[command(version)]
struct Args {
    /// Live display refresh interval in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 50)]
    refresh_ms: u64,

    /// Start idle instead of running
    #[arg(long)]
    paused: bool,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

enum AppEvent {
    Tick,
    Line(String),
    InputClosed,
}

struct App {
    engine: Stopwatch,
    pump_gate: Arc<AtomicBool>,
    quitting: bool,
}

impl App {
    fn new(pump_gate: Arc<AtomicBool>) -> Self {
        let mut engine = Stopwatch::new();
        engine.on_lap(|lap| {
            let mut out = io::stdout();
            if let Err(e) = display::draw_lap(&mut out, lap) {
                log::error!("lap display failed: {}", e);
            }
        });
        Self {
            engine,
            pump_gate,
            quitting: false,
        }
    }

    fn redraw(&self, out: &mut impl Write) -> io::Result<()> {
        display::draw_status(out, self.engine.is_running(), self.engine.elapsed(Instant::now()))
    }

    fn handle_command(&mut self, cmd: Command, out: &mut impl Write) -> io::Result<()> {
        let now = Instant::now();
        log::debug!("command: {:?}", cmd);
        match cmd {
            Command::Start => {
                self.engine.start(now);
                self.pump_gate.store(true, Ordering::Relaxed);
            }
            Command::Stop => {
                self.engine.stop(now);
                self.pump_gate.store(false, Ordering::Relaxed);
            }
            Command::Lap => {
                self.engine.lap(now);
            }
            Command::Reset => {
                // Reset while running keeps running, with the clock zeroed
                let was_running = self.engine.is_running();
                self.engine.reset();
                if was_running {
                    self.engine.start(Instant::now());
                }
            }
            Command::Help => display::draw_help(out)?,
            Command::Quit => {
                self.quitting = true;
                self.pump_gate.store(false, Ordering::Relaxed);
            }
        }
        self.redraw(out)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    log::info!("stopwatch v{}", env!("CARGO_PKG_VERSION"));

    let (tx, rx) = mpsc::channel();
    let pump_gate = Arc::new(AtomicBool::new(false));
    spawn_pump(
        tx.clone(),
        Arc::clone(&pump_gate),
        Duration::from_millis(args.refresh_ms.max(1)),
    );
    spawn_input_reader(tx);

    let mut app = App::new(pump_gate);
    let mut out = io::stdout();

    display::draw_help(&mut out)?;
    if !args.paused {
        app.engine.start(Instant::now());
        app.pump_gate.store(true, Ordering::Relaxed);
    }
    app.redraw(&mut out)?;

    for event in rx {
        match event {
            AppEvent::Tick => app.redraw(&mut out)?,
            AppEvent::Line(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<Command>() {
                    Ok(cmd) => app.handle_command(cmd, &mut out)?,
                    Err(e) => {
                        log::warn!("{}", e);
                        writeln!(out, "\r{}          ", e)?;
                    }
                }
                if app.quitting {
                    break;
                }
            }
            AppEvent::InputClosed => break,
        }
    }

    let total = app.engine.elapsed(Instant::now());
    log::debug!("exiting with total {}", format_hms_cs_opt(total));
    display::draw_summary(&mut out, total)?;
    Ok(())
}

/// Tick the main loop on a fixed cadence while the gate is open. The gate
/// closes whenever the clock is stopped so an idle stopwatch costs nothing
/// but a sleeping thread.
fn spawn_pump(tx: Sender<AppEvent>, gate: Arc<AtomicBool>, interval: Duration) {
    thread::spawn(move || loop {
        thread::sleep(interval);
        if !gate.load(Ordering::Relaxed) {
            continue;
        }
        if tx.send(AppEvent::Tick).is_err() {
            break;
        }
    });
}

/// Forward stdin lines to the main loop; end-of-input ends the app.
fn spawn_input_reader(tx: Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::error!("stdin read failed: {}", e);
                    break;
                }
            };
            if tx.send(AppEvent::Line(line)).is_err() {
                return;
            }
        }
        tx.send(AppEvent::InputClosed).ok();
    });
}

fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    };

    Builder::new().filter_level(level).init();
}
