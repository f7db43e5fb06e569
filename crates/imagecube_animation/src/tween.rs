//! Progress tweens
//!
//! A [`Tween`] drives a single normalized value from 0.0 to 1.0 over a fixed
//! duration. Each advance yields a [`Frame`] that downstream renderers map onto
//! whatever properties they animate.

use crate::easing::Easing;

/// One step of a running tween
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    /// Eased progress in `[0, 1]`
    pub progress: f32,
    /// True only for the frame emitted when the tween starts
    pub is_first: bool,
    /// True for the frame that reaches progress 1.0
    pub is_last: bool,
}

impl Frame {
    /// The terminal frame of any tween
    pub const LAST: Frame = Frame {
        progress: 1.0,
        is_first: false,
        is_last: true,
    };
}

/// A 0 → 1 animation with easing
#[derive(Clone, Debug)]
pub struct Tween {
    duration_ms: u32,
    easing: Easing,
    current_time: f32,
    playing: bool,
}

impl Tween {
    pub fn new(duration_ms: u32, easing: Easing) -> Self {
        Self {
            duration_ms,
            easing,
            current_time: 0.0,
            playing: false,
        }
    }

    /// Rewind and start playing, returning the initial frame.
    ///
    /// A zero-length tween is complete immediately, so its first frame is
    /// also its last.
    pub fn start(&mut self) -> Frame {
        self.current_time = 0.0;
        self.playing = self.duration_ms > 0;
        if self.playing {
            Frame {
                progress: self.easing.apply(0.0),
                is_first: true,
                is_last: false,
            }
        } else {
            Frame {
                is_first: true,
                ..Frame::LAST
            }
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Linear time fraction, before easing
    pub fn time_fraction(&self) -> f32 {
        if self.duration_ms == 0 {
            return 1.0;
        }
        (self.current_time / self.duration_ms as f32).clamp(0.0, 1.0)
    }

    /// Eased progress
    pub fn progress(&self) -> f32 {
        let t = self.time_fraction();
        if t >= 1.0 {
            // Exact terminal value regardless of easing round-off
            return 1.0;
        }
        self.easing.apply(t)
    }

    /// Advance by delta time (in milliseconds).
    ///
    /// Returns `None` when the tween is not playing.
    pub fn tick(&mut self, dt_ms: f32) -> Option<Frame> {
        if !self.playing {
            return None;
        }

        self.current_time += dt_ms;
        let is_last = self.current_time >= self.duration_ms as f32;
        if is_last {
            self.current_time = self.duration_ms as f32;
            self.playing = false;
        }

        Some(Frame {
            progress: self.progress(),
            is_first: false,
            is_last,
        })
    }

    /// Jump straight to the end
    pub fn finish(&mut self) -> Frame {
        self.current_time = self.duration_ms as f32;
        self.playing = false;
        Frame::LAST
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_tween_reports_halfway() {
        let mut tween = Tween::new(1000, Easing::Linear);
        let first = tween.start();
        assert!(first.is_first);
        assert_eq!(first.progress, 0.0);

        let frame = tween.tick(500.0).unwrap();
        assert!(!frame.is_first);
        assert!(!frame.is_last);
        assert!((frame.progress - 0.5).abs() < 1e-6);
    }

    #[test]
    fn overshooting_tick_lands_on_one() {
        let mut tween = Tween::new(100, Easing::EaseInOut);
        tween.start();
        let frame = tween.tick(250.0).unwrap();
        assert!(frame.is_last);
        assert_eq!(frame.progress, 1.0);
        assert!(!tween.is_playing());
        assert!(tween.tick(16.0).is_none());
    }

    #[test]
    fn zero_duration_completes_on_start() {
        let mut tween = Tween::new(0, Easing::Linear);
        let frame = tween.start();
        assert!(frame.is_first);
        assert!(frame.is_last);
        assert_eq!(frame.progress, 1.0);
        assert!(!tween.is_playing());
    }

    #[test]
    fn finish_fast_forwards() {
        let mut tween = Tween::new(2000, Easing::Swing);
        tween.start();
        tween.tick(10.0);
        assert_eq!(tween.finish(), Frame::LAST);
        assert_eq!(tween.progress(), 1.0);
    }
}
