//! Frame clock: timestamp-to-tick conversion

/// Converts frame timestamps (seconds, monotonic) into simulation ticks.
///
/// One tick is one frame at the reference rate (60Hz by default), which is
/// the unit all per-tick particle constants are expressed in.
pub struct FrameClock {
    /// Total elapsed time in seconds since the first frame
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    /// Reference frame rate that defines one tick
    pub tick_rate: f64,
    /// Frames longer than this are clamped (tab switches, debugger pauses)
    pub max_delta: f64,
    /// Timestamp of the previous frame
    last_timestamp: Option<f64>,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self {
            total_time: 0.0,
            delta_time: 0.0,
            tick_rate: 60.0,
            max_delta: 0.25,
            last_timestamp: None,
        }
    }
}

impl FrameClock {
    /// Create a new clock with a 60Hz reference rate
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock with a custom reference rate
    pub fn with_tick_rate(hz: f64) -> Self {
        Self {
            tick_rate: hz,
            ..Self::default()
        }
    }

    /// Advance to `timestamp` and return the elapsed ticks.
    /// The first frame after a reset counts as exactly one tick.
    pub fn advance(&mut self, timestamp: f64) -> f32 {
        let Some(last) = self.last_timestamp.replace(timestamp) else {
            self.delta_time = 1.0 / self.tick_rate;
            self.total_time += self.delta_time;
            return 1.0;
        };

        // Clamp to avoid a huge catch-up step (and negative time on clock skew)
        self.delta_time = (timestamp - last).clamp(0.0, self.max_delta);
        self.total_time += self.delta_time;
        (self.delta_time * self.tick_rate) as f32
    }

    /// Forget the previous timestamp; the next frame is a fresh first frame
    pub fn reset(&mut self) {
        *self = Self {
            tick_rate: self.tick_rate,
            max_delta: self.max_delta,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_defaults() {
        let clock = FrameClock::new();
        assert!((clock.tick_rate - 60.0).abs() < 1e-10);
        assert_eq!(clock.total_time, 0.0);
        assert_eq!(clock.delta_time, 0.0);
    }

    #[test]
    fn test_first_frame_is_one_tick() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.advance(12.5), 1.0);
    }

    #[test]
    fn test_ticks_follow_elapsed_time() {
        let mut clock = FrameClock::new();
        clock.advance(0.0);
        let ticks = clock.advance(1.0 / 30.0);
        assert!((ticks - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_long_frames_are_clamped() {
        let mut clock = FrameClock::with_tick_rate(60.0);
        clock.advance(0.0);
        let ticks = clock.advance(10.0);
        assert!((ticks - 15.0).abs() < 1e-4);
        assert!((clock.delta_time - 0.25).abs() < 1e-10);
    }

    #[test]
    fn test_reset_keeps_rate() {
        let mut clock = FrameClock::with_tick_rate(30.0);
        clock.advance(0.0);
        clock.advance(0.5);
        clock.reset();
        assert_eq!(clock.total_time, 0.0);
        assert!((clock.tick_rate - 30.0).abs() < 1e-10);
        assert_eq!(clock.advance(100.0), 1.0);
    }
}
