use std::time::Duration;

/// Decides, for every scheduling opportunity the host offers, whether the
/// simulation should advance.
pub trait Ticker {
    fn should_tick(&mut self, now: Duration) -> bool;

    /// Asks for one more tick. Only meaningful for tickers that do not run
    /// on their own.
    fn request_tick(&mut self) {}
}

/// Ticks on every display frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct EveryFrame;

impl Ticker for EveryFrame {
    fn should_tick(&mut self, _: Duration) -> bool {
        true
    }
}

/// Ticks at most `fps` times per second, skipping frames in between.
#[derive(Debug, Clone, Copy)]
pub struct FixedRate {
    fps: u32,
    last_tick_micros: Option<u128>,
}

impl FixedRate {
    pub fn new(fps: u32) -> Self {
        FixedRate {
            fps: fps.max(1),
            last_tick_micros: None,
        }
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    pub fn set_fps(&mut self, fps: u32) {
        self.fps = fps.max(1);
    }
}

impl Ticker for FixedRate {
    fn should_tick(&mut self, now: Duration) -> bool {
        let now_micros = now.as_micros();
        let should_tick = match self.last_tick_micros {
            None => true,
            Some(last) => now_micros.saturating_sub(last) >= 1_000_000 / self.fps as u128,
        };

        if should_tick {
            self.last_tick_micros = Some(now_micros);
        }

        should_tick
    }
}

/// Ticks only when asked to, one tick per request. Drives headless runs and
/// tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct Manual {
    pending: u64,
}

impl Manual {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn pending(&self) -> u64 {
        self.pending
    }
}

impl Ticker for Manual {
    fn should_tick(&mut self, _: Duration) -> bool {
        if self.pending == 0 {
            return false;
        }
        self.pending -= 1;
        true
    }

    fn request_tick(&mut self) {
        self.pending += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{EveryFrame, FixedRate, Manual, Ticker};

    #[test]
    fn every_frame_always_ticks() {
        let mut ticker = EveryFrame;
        assert!((0..5).all(|i| ticker.should_tick(Duration::from_millis(i))));
    }

    #[test]
    fn fixed_rate_skips_frames_in_between() {
        let mut ticker = FixedRate::new(10);
        let ticks: Vec<bool> = [0, 16, 33, 99, 100, 150, 201]
            .iter()
            .map(|ms| ticker.should_tick(Duration::from_millis(*ms)))
            .collect();

        assert_eq!(ticks, vec![true, false, false, false, true, false, true]);
    }

    #[test]
    fn fixed_rate_never_divides_by_zero() {
        let mut ticker = FixedRate::new(0);
        assert_eq!(ticker.fps(), 1);
        assert!(ticker.should_tick(Duration::ZERO));
        assert!(!ticker.should_tick(Duration::from_millis(500)));
    }

    #[test]
    fn manual_ticks_once_per_request() {
        let mut ticker = Manual::new();
        assert!(!ticker.should_tick(Duration::ZERO));

        ticker.request_tick();
        ticker.request_tick();
        assert_eq!(ticker.pending(), 2);
        assert!(ticker.should_tick(Duration::ZERO));
        assert!(ticker.should_tick(Duration::ZERO));
        assert!(!ticker.should_tick(Duration::ZERO));
    }
}
