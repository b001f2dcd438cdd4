use std::fmt;

use serde::{Deserialize, Serialize};
use time::Duration;

/// Simulated time handed to the motion updater for one frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameTime {
    /// Absolute simulated time (`days`) since the epoch.
    pub sim_days: f64,
    /// Simulated time (`days`) elapsed since the previous frame. Zero while
    /// paused, negative when running backwards.
    pub delta_days: f64,
}

/// Accumulates simulated days from real elapsed time.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimClock {
    days: f64,
    /// Simulated days per real second. May be negative.
    time_scale: f64,
    paused: bool,
}

impl Default for SimClock {
    fn default() -> Self {
        Self {
            days: 0.0,
            time_scale: 1.0,
            paused: false,
        }
    }
}

impl SimClock {
    pub fn new(time_scale: f64) -> Self {
        let mut clock = Self::default();
        clock.set_time_scale(time_scale);
        clock
    }

    pub fn days(&self) -> f64 {
        self.days
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advance by `real` elapsed wall-clock time.
    pub fn tick(&mut self, real: Duration) -> FrameTime {
        if self.paused {
            return FrameTime {
                sim_days: self.days,
                delta_days: 0.0,
            };
        }
        let delta_days = real.as_seconds_f64() * self.time_scale;
        self.days += delta_days;
        FrameTime {
            sim_days: self.days,
            delta_days,
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume, unless the time scale is zero.
    pub fn resume(&mut self) {
        self.paused = self.time_scale == 0.0;
    }

    /// Flip the pause state and return the new one. A clock with a zero
    /// time scale always ends up paused.
    pub fn toggle_pause(&mut self) -> bool {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
        self.paused
    }

    /// Change the time scale; a zero scale pauses the clock.
    pub fn set_time_scale(&mut self, time_scale: f64) {
        self.time_scale = time_scale;
        if time_scale == 0.0 {
            self.paused = true;
        }
    }

    /// Rewind to the epoch, keeping the pause state and time scale.
    /// Spin is not unwound, so the returned delta is zero.
    pub fn reset(&mut self) -> FrameTime {
        self.days = 0.0;
        FrameTime::default()
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{:+.2}d (x{})", self.days, self.time_scale)?;
        if self.paused {
            f.write_str(" [paused]")?;
        }
        Ok(())
    }
}
