//! Animation scheduler
//!
//! Owns every running tween and every pending one-shot timer, and advances
//! them together each time the host ticks it. Each entry is tagged with an
//! owner key so the host can route the resulting events.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tracing::trace;

use crate::tween::{Frame, Tween};

new_key_type! {
    pub struct TweenId;
    pub struct TimerId;
}

/// Something that happened during a [`AnimationScheduler::tick`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SchedulerEvent<K> {
    /// A one-shot timer elapsed; it has already been removed
    TimerFired { owner: K, id: TimerId },
    /// A tween advanced; tweens emitting their last frame are removed
    Frame { owner: K, id: TweenId, frame: Frame },
}

struct PendingTimer<K> {
    owner: K,
    remaining_ms: f32,
}

/// The animation scheduler that ticks all active tweens and timers
pub struct AnimationScheduler<K> {
    tweens: SlotMap<TweenId, (K, Tween)>,
    timers: SlotMap<TimerId, PendingTimer<K>>,
}

impl<K: Copy> AnimationScheduler<K> {
    pub fn new() -> Self {
        Self {
            tweens: SlotMap::with_key(),
            timers: SlotMap::with_key(),
        }
    }

    /// Start a tween and return its id with the initial frame.
    ///
    /// A tween whose first frame is already the last is not retained.
    pub fn add_tween(&mut self, owner: K, mut tween: Tween) -> (TweenId, Frame) {
        let frame = tween.start();
        let id = self.tweens.insert((owner, tween));
        if frame.is_last {
            self.tweens.remove(id);
        }
        (id, frame)
    }

    /// Drop a tween without producing further frames
    pub fn cancel_tween(&mut self, id: TweenId) -> Option<Tween> {
        self.tweens.remove(id).map(|(_, tween)| tween)
    }

    /// Remove a tween and return its terminal frame
    pub fn finish_tween(&mut self, id: TweenId) -> Option<Frame> {
        self.tweens
            .remove(id)
            .map(|(_, mut tween)| tween.finish())
    }

    /// Schedule a one-shot callback `delay_ms` from now
    pub fn schedule(&mut self, owner: K, delay_ms: u32) -> TimerId {
        self.timers.insert(PendingTimer {
            owner,
            remaining_ms: delay_ms as f32,
        })
    }

    /// Cancel a pending timer; returns false if it already fired
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.remove(id).is_some()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Advance all timers and tweens by `dt_ms` milliseconds.
    ///
    /// Timer events come first, ordered by due time, followed by tween
    /// frames.
    pub fn tick(&mut self, dt_ms: f32) -> SmallVec<[SchedulerEvent<K>; 4]> {
        let mut events = SmallVec::new();

        let mut due: SmallVec<[(f32, TimerId); 4]> = SmallVec::new();
        for (id, timer) in self.timers.iter_mut() {
            timer.remaining_ms -= dt_ms;
            if timer.remaining_ms <= 0.0 {
                due.push((timer.remaining_ms, id));
            }
        }
        due.sort_by(|a, b| a.0.total_cmp(&b.0));
        for (_, id) in due {
            if let Some(timer) = self.timers.remove(id) {
                trace!(?id, "timer fired");
                events.push(SchedulerEvent::TimerFired {
                    owner: timer.owner,
                    id,
                });
            }
        }

        let mut finished: SmallVec<[TweenId; 4]> = SmallVec::new();
        for (id, (owner, tween)) in self.tweens.iter_mut() {
            if let Some(frame) = tween.tick(dt_ms) {
                if frame.is_last {
                    finished.push(id);
                }
                events.push(SchedulerEvent::Frame {
                    owner: *owner,
                    id,
                    frame,
                });
            }
        }
        for id in finished {
            self.tweens.remove(id);
        }

        events
    }

    /// Check if any tweens are still running
    pub fn has_active_animations(&self) -> bool {
        self.tweens.iter().any(|(_, (_, t))| t.is_playing())
    }

    pub fn tween_count(&self) -> usize {
        self.tweens.len()
    }
}

impl<K: Copy> Default for AnimationScheduler<K> {
    fn default() -> Self {
        Self::new()
    }
}
