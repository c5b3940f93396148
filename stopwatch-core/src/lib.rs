//! Pure stopwatch timing logic with no platform dependencies.
//! Testable on host, driven by any frontend that supplies the clock.

use std::time::{Duration, Instant};

/// Callback invoked after each lap capture with the captured value.
pub type LapListener = Box<dyn FnMut(Option<Duration>)>;

/// Elapsed-time accumulator with lap capture.
///
/// The engine never reads a clock itself: every time-dependent operation
/// takes the current instant from the caller, so the same code runs under
/// a live clock in the frontend and under fabricated instants in tests.
///
/// All timing fields are `None` until the first `start` after construction
/// or `reset`; queries surface that never-started state to callers instead
/// of substituting a zero.
pub struct Stopwatch {
    started: Option<Instant>,
    accumulated: Option<Duration>,
    last_lap: Option<Duration>,
    lap_listeners: Vec<LapListener>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            started: None,
            accumulated: None,
            last_lap: None,
            lap_listeners: Vec::new(),
        }
    }

    /// True while a run segment is open.
    pub fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Total elapsed time as of `now`: the open segment (if any) plus all
    /// completed segments since the last reset. `None` until the first
    /// start.
    pub fn elapsed(&self, now: Instant) -> Option<Duration> {
        match self.started {
            Some(started) => {
                let segment = now.saturating_duration_since(started);
                match self.accumulated {
                    Some(acc) => Some(acc + segment),
                    None => Some(segment),
                }
            }
            None => self.accumulated,
        }
    }

    /// Elapsed time captured by the most recent lap. `None` until the
    /// first lap after construction or reset.
    pub fn last_lap(&self) -> Option<Duration> {
        self.last_lap
    }

    /// Open a run segment at `now`. No-op while already running:
    /// restamping the segment start would silently drop time already
    /// counted toward the open segment.
    pub fn start(&mut self, now: Instant) {
        if self.started.is_some() {
            return;
        }
        self.started = Some(now);
        if self.accumulated.is_none() {
            self.accumulated = Some(Duration::ZERO);
        }
    }

    /// Close the open run segment at `now` and fold it into the total.
    /// No-op while idle.
    pub fn stop(&mut self, now: Instant) {
        if let Some(started) = self.started.take() {
            let segment = now.saturating_duration_since(started);
            self.accumulated = Some(self.accumulated.unwrap_or(Duration::ZERO) + segment);
        }
    }

    /// Clear all timing state. A running engine lands idle and the open
    /// segment is discarded rather than folded in. Registered lap
    /// listeners survive a reset.
    pub fn reset(&mut self) {
        self.started = None;
        self.accumulated = None;
        self.last_lap = None;
    }

    /// Snapshot the total elapsed time as of `now` without touching the
    /// running state, notify listeners, and return the captured value.
    /// While idle this captures the frozen total; before the first start
    /// it captures (and reports) `None`.
    pub fn lap(&mut self, now: Instant) -> Option<Duration> {
        let lap = self.elapsed(now);
        self.last_lap = lap;
        for listener in &mut self.lap_listeners {
            listener(lap);
        }
        lap
    }

    /// Register a callback fired once per `lap` call, after the capture
    /// is recorded, carrying the captured value. Listeners run
    /// synchronously on the caller's thread in registration order.
    pub fn on_lap<F>(&mut self, listener: F)
    where
        F: FnMut(Option<Duration>) + 'static,
    {
        self.lap_listeners.push(Box::new(listener));
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Split a duration into whole hours, whole minutes, and seconds with
/// fractional milliseconds.
pub fn split_hms(d: Duration) -> (u64, u64, f64) {
    let total_secs = d.as_secs();
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = (total_secs % 60) as f64 + f64::from(d.subsec_millis()) / 1000.0;
    (h, m, s)
}

/// Format a duration as "HH:MM:SS.cs" (centiseconds)
pub fn format_hms_cs(d: Duration) -> String {
    let total_secs = d.as_secs();
    let cs = d.subsec_millis() / 10;
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    format!("{:02}:{:02}:{:02}.{:02}", h, m, s, cs)
}

/// Format an optional duration, rendering the never-started state as a
/// placeholder instead of a zero time.
pub fn format_hms_cs_opt(d: Option<Duration>) -> String {
    match d {
        Some(d) => format_hms_cs(d),
        None => String::from("--:--:--.--"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_fresh_engine_is_idle() {
        let sw = Stopwatch::new();
        assert!(!sw.is_running());
        assert_eq!(sw.elapsed(Instant::now()), None);
        assert_eq!(sw.last_lap(), None);
    }

    #[test]
    fn test_elapsed_accumulates_across_segments() {
        let mut sw = Stopwatch::new();
        let t0 = Instant::now();

        sw.start(t0);
        assert!(sw.is_running());
        assert_eq!(sw.elapsed(t0 + secs(5)), Some(secs(5)));

        sw.stop(t0 + secs(5));
        assert!(!sw.is_running());
        assert_eq!(sw.elapsed(t0 + secs(60)), Some(secs(5)));

        sw.start(t0 + secs(60));
        sw.stop(t0 + secs(63));
        assert_eq!(sw.elapsed(t0 + secs(90)), Some(secs(8)));
    }

    #[test]
    fn test_elapsed_monotonic_while_running() {
        let mut sw = Stopwatch::new();
        let t0 = Instant::now();
        sw.start(t0);
        let first = sw.elapsed(t0 + secs(1));
        let second = sw.elapsed(t0 + secs(2));
        assert!(second >= first);
    }

    #[test]
    fn test_stop_while_idle_is_a_no_op() {
        let mut sw = Stopwatch::new();
        let t0 = Instant::now();
        sw.start(t0);
        sw.stop(t0 + secs(2));
        sw.lap(t0 + secs(2));

        sw.stop(t0 + secs(10));
        assert!(!sw.is_running());
        assert_eq!(sw.elapsed(t0 + secs(10)), Some(secs(2)));
        assert_eq!(sw.last_lap(), Some(secs(2)));
    }

    #[test]
    fn test_start_while_running_keeps_open_segment() {
        let mut sw = Stopwatch::new();
        let t0 = Instant::now();
        sw.start(t0);
        sw.start(t0 + secs(30));
        assert_eq!(sw.elapsed(t0 + secs(40)), Some(secs(40)));
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut sw = Stopwatch::new();
        let t0 = Instant::now();
        sw.start(t0);
        sw.lap(t0 + secs(1));
        sw.stop(t0 + secs(2));
        sw.start(t0 + secs(3));

        sw.reset();
        assert!(!sw.is_running());
        assert_eq!(sw.elapsed(t0 + secs(10)), None);
        assert_eq!(sw.last_lap(), None);
    }

    #[test]
    fn test_reset_discards_open_segment() {
        let mut sw = Stopwatch::new();
        let t0 = Instant::now();
        sw.start(t0);
        sw.reset();
        sw.start(t0 + secs(100));
        assert_eq!(sw.elapsed(t0 + secs(101)), Some(secs(1)));
    }

    #[test]
    fn test_lap_snapshots_without_stopping() {
        let mut sw = Stopwatch::new();
        let t0 = Instant::now();
        sw.start(t0);

        assert_eq!(sw.lap(t0 + secs(5)), Some(secs(5)));
        assert!(sw.is_running());

        // Clock keeps counting past the capture
        assert_eq!(sw.elapsed(t0 + secs(9)), Some(secs(9)));
        assert_eq!(sw.last_lap(), Some(secs(5)));

        assert_eq!(sw.lap(t0 + secs(9)), Some(secs(9)));
        assert_eq!(sw.last_lap(), Some(secs(9)));
    }

    #[test]
    fn test_lap_while_idle_captures_frozen_value() {
        let mut sw = Stopwatch::new();
        let t0 = Instant::now();
        sw.start(t0);
        sw.stop(t0 + secs(4));
        assert_eq!(sw.lap(t0 + secs(20)), Some(secs(4)));
    }

    #[test]
    fn test_lap_before_first_start_is_none() {
        let mut sw = Stopwatch::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        sw.on_lap(move |lap| sink.borrow_mut().push(lap));

        assert_eq!(sw.lap(Instant::now()), None);
        assert_eq!(*seen.borrow(), vec![None]);
    }

    #[test]
    fn test_lap_notifies_once_per_call_with_returned_value() {
        let mut sw = Stopwatch::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        sw.on_lap(move |lap| sink.borrow_mut().push(lap));

        let t0 = Instant::now();
        sw.start(t0);
        let first = sw.lap(t0 + secs(1));
        let second = sw.lap(t0 + secs(3));
        assert_eq!(*seen.borrow(), vec![first, second]);
    }

    #[test]
    fn test_listeners_run_in_registration_order() {
        let mut sw = Stopwatch::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second"] {
            let sink = Rc::clone(&order);
            sw.on_lap(move |_| sink.borrow_mut().push(tag));
        }
        sw.lap(Instant::now());
        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_listeners_survive_reset() {
        let mut sw = Stopwatch::new();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        sw.on_lap(move |_| *sink.borrow_mut() += 1);

        let t0 = Instant::now();
        sw.start(t0);
        sw.lap(t0 + secs(1));
        sw.reset();
        sw.lap(t0 + secs(2));
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn test_split_hms() {
        assert_eq!(split_hms(Duration::ZERO), (0, 0, 0.0));
        let (h, m, s) = split_hms(Duration::from_millis(3_723_450));
        assert_eq!((h, m), (1, 2));
        assert!((s - 3.45).abs() < 1e-9);
    }

    #[test]
    fn test_format_hms_cs() {
        assert_eq!(format_hms_cs(Duration::ZERO), "00:00:00.00");
        assert_eq!(format_hms_cs(Duration::from_millis(12_340)), "00:00:12.34");
        assert_eq!(format_hms_cs(Duration::from_millis(3_661_000)), "01:01:01.00");
    }

    #[test]
    fn test_format_hms_cs_opt() {
        assert_eq!(format_hms_cs_opt(None), "--:--:--.--");
        assert_eq!(format_hms_cs_opt(Some(Duration::from_secs(61))), "00:01:01.00");
    }
}
