//! Wall-clock sources and the fixed-timestep game clock.
//!
//! The host calls `Session::frame` at whatever rate it renders. GameTime
//! converts that variable delta into a whole number of 100ms ticks, so the
//! simulation advances in identical steps regardless of frame rate.

use std::cell::Cell;

/// Foreground simulation rate.
pub const TICKS_PER_SECOND: u32 = 10;

/// Largest frame delta fed to the accumulator. Longer gaps (tab in the
/// background, debugger pause) are handled by offline reconciliation.
const MAX_FRAME_DELTA_MS: f64 = 500.0;

pub struct GameTime {
    /// Milliseconds per tick (e.g. 100ms = 10 ticks/sec)
    ms_per_tick: f64,
    /// Accumulated milliseconds not yet consumed as ticks
    accumulator: f64,
    /// Total elapsed ticks since creation
    pub total_ticks: u64,
    /// Timestamp of the last update (ms), None if first frame
    last_timestamp: Option<f64>,
}

impl GameTime {
    /// `ticks_per_sec`: how many game ticks per real-time second (e.g. 10).
    pub fn new(ticks_per_sec: u32) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec.max(1) as f64,
            accumulator: 0.0,
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    pub fn ms_per_tick(&self) -> f64 {
        self.ms_per_tick
    }

    /// Seconds of simulated time per tick.
    pub fn tick_seconds(&self) -> f64 {
        self.ms_per_tick / 1000.0
    }

    /// Feed a wall-clock timestamp. Returns the number of ticks to run
    /// this frame.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            Some(prev) => (now_ms - prev).clamp(0.0, MAX_FRAME_DELTA_MS),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;
        ticks
    }

    /// Forget the gap since the last frame. Used after a hidden interval
    /// has been reconciled separately.
    pub fn resync(&mut self, now_ms: f64) {
        self.last_timestamp = Some(now_ms);
        self.accumulator = 0.0;
    }
}

/// Source of wall-clock milliseconds.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// `Date.now()`.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserClock;

#[cfg(target_arch = "wasm32")]
impl Clock for BrowserClock {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

/// Unix time from the OS clock, for native hosts.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

#[cfg(not(target_arch = "wasm32"))]
impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0.0, |d| d.as_secs_f64() * 1000.0)
    }
}

/// Hand-driven clock for tests and replays.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}
