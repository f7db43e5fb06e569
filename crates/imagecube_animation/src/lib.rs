//! Image Cube Animation Engine
//!
//! Easing curves, progress tweens, and one-shot timers.
//!
//! # Features
//!
//! - **Easing**: named curves, resolvable from configuration strings
//! - **Tweens**: 0 → 1 progress animations emitting first/last-frame flags
//! - **Timers**: cancellable one-shot deferred callbacks
//! - **Scheduler**: advances tweens and timers together from a host tick

pub mod easing;
pub mod scheduler;
pub mod tween;

pub use easing::Easing;
pub use scheduler::{AnimationScheduler, SchedulerEvent, TimerId, TweenId};
pub use tween::{Frame, Tween};
