//! Playback state machine.
//!
//! The only writer of `frame` and `lane`. Timer ticks and interaction
//! mappers both end up in [`ViewerCore::update_frame`] or the tick path,
//! which share one notification contract: `FrameChanged` when frame or lane
//! moved, then always `Frame` and `Draw`.

use crate::math::{clamp, wrap};
use crate::scheduler::TimerId;
use crate::viewer::{Event, ViewerCore};

/// Timer bookkeeping of the playback state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlaybackState {
    /// Interval the timer was armed with
    pub frame_time: u32,
    /// Frame before the latest mutation
    pub last_frame: usize,
    /// Lane before the latest mutation
    pub last_lane: usize,
    /// Armed animation timer, `None` when idle
    pub handler: Option<TimerId>,
}

/// Options for [`ViewerCore::play_to`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlayToOptions {
    /// Pick the direction of the shorter way round
    pub nearest: bool,
    /// Animate even when already on the target frame
    pub force: bool,
}

impl ViewerCore {
    /// Playback bookkeeping, created on first access.
    pub fn playback(&mut self) -> PlaybackState {
        *self.store.get_or_default::<PlaybackState>()
    }

    /// Check if the animation timer is armed.
    pub fn is_playing(&self) -> bool {
        self.store
            .get::<PlaybackState>()
            .is_some_and(|p| p.handler.is_some())
    }

    /// Set frame and/or lane and notify listeners.
    ///
    /// Frames wrap when `wrap` is set and clamp otherwise; lanes likewise
    /// with `wrap_lane`. `None` leaves the value untouched.
    pub fn update_frame(&mut self, frame: Option<i64>, lane: Option<i64>) {
        self.capture_last();
        if let Some(frame) = frame {
            self.state.frame = range(frame, self.state.frames, self.state.wrap);
        }
        if let Some(lane) = lane {
            self.state.lane = range(lane, self.state.lanes, self.state.wrap_lane);
        }
        log::trace!("frame update -> frame {} lane {}", self.state.frame, self.state.lane);
        self.notify_frame();
    }

    /// Set `animate` and arm the timer.
    pub fn start_animation(&mut self) {
        self.state.animate = true;
        self.apply_animation();
    }

    /// Clear `animate` and cancel the timer. Safe to call when idle.
    pub fn stop_animation(&mut self) {
        self.state.animate = false;
        self.cancel_animation_timer();
    }

    /// Bring the timer in line with `animate` and `frame_time`.
    ///
    /// Idempotent. A changed `frame_time` re-arms the running timer at the
    /// new interval.
    pub fn apply_animation(&mut self) {
        let frame_time = self.state.frame_time.max(1);
        let playback = self.playback();

        if playback.handler.is_some() {
            if !self.state.animate {
                self.stop_animation();
            } else if playback.frame_time != frame_time {
                self.cancel_animation_timer();
            }
        }

        if self.state.animate && !self.is_playing() {
            let id = self.scheduler.arm(frame_time);
            let playback = self.store.get_or_default::<PlaybackState>();
            playback.frame_time = frame_time;
            playback.handler = Some(id);
            log::debug!("armed animation timer {id:?} every {frame_time}ms");
        }
    }

    /// Start the animation when stopped, stop it when running.
    pub fn toggle_animation(&mut self) {
        if self.is_playing() {
            self.stop_animation();
        } else {
            self.start_animation();
        }
    }

    /// Move `step` frames, facing the direction of travel.
    pub fn skip_frames(&mut self, step: i64) {
        self.state.reverse = step < 0;
        self.update_frame(Some(self.state.frame as i64 + step), None);
    }

    /// Move one frame forward.
    pub fn next_frame(&mut self) {
        self.skip_frames(1);
    }

    /// Move one frame backward.
    pub fn prev_frame(&mut self) {
        self.skip_frames(-1);
    }

    /// Animate until `frame` is reached, then stop.
    pub fn play_to(&mut self, frame: usize, options: PlayToOptions) {
        if !options.force && self.state.frame == frame {
            return;
        }
        if options.nearest {
            let frames = self.state.frames.max(1) as i64;
            let current = self.state.frame as i64;
            let direct = frame as i64 - current;
            let around = if direct > 0 { direct - frames } else { direct + frames };
            let shortest = if direct.abs() < around.abs() { direct } else { around };
            self.state.reverse = shortest < 0;
        }
        self.state.animate = true;
        self.state.looping = false;
        self.state.stop_frame = frame;
        self.apply_animation();
    }

    /// Set the tick interval. Takes effect on the next [`apply_animation`](Self::apply_animation).
    pub fn set_frame_time(&mut self, frame_time: u32) {
        self.state.frame_time = frame_time;
    }

    /// Set the animation direction.
    pub fn set_reverse(&mut self, reverse: bool) {
        self.state.reverse = reverse;
    }

    /// Set the animate flag. Takes effect on the next [`apply_animation`](Self::apply_animation).
    pub fn set_animate(&mut self, animate: bool) {
        self.state.animate = animate;
    }

    /// Set whether the animation loops past `stop_frame`.
    pub fn set_loop(&mut self, looping: bool) {
        self.state.looping = looping;
    }

    /// Advance one animation step. Ignored when the timer is not armed.
    pub(crate) fn tick_animation(&mut self) {
        if !self.is_playing() {
            return;
        }
        self.capture_last();

        let step = if self.state.reverse { -1 } else { 1 };
        let frames = self.state.frames.max(1) as i64;
        self.state.frame = wrap(self.state.frame as i64 + step, 0, frames - 1, frames) as usize;
        log::trace!("animation tick -> frame {}", self.state.frame);

        if !self.state.looping && self.state.frame == self.state.stop_frame {
            self.stop_animation();
        }
        self.notify_frame();
    }

    /// Re-range frame and lane after `frames` or `lanes` changed.
    pub(crate) fn restrict_frame(&mut self) {
        self.state.frame = range(self.state.frame as i64, self.state.frames, self.state.wrap);
        self.state.lane = range(self.state.lane as i64, self.state.lanes, self.state.wrap_lane);
    }

    fn cancel_animation_timer(&mut self) {
        let playback = self.store.get_or_default::<PlaybackState>();
        if let Some(handler) = playback.handler.take() {
            self.scheduler.cancel(handler);
            log::debug!("cancelled animation timer {handler:?}");
        }
    }

    fn capture_last(&mut self) {
        let (frame, lane) = (self.state.frame, self.state.lane);
        let playback = self.store.get_or_default::<PlaybackState>();
        playback.last_frame = frame;
        playback.last_lane = lane;
    }

    fn notify_frame(&mut self) {
        let playback = self.playback();
        if playback.last_frame != self.state.frame || playback.last_lane != self.state.lane {
            self.emit(Event::FrameChanged);
        }
        self.emit(Event::Frame);
        self.emit(Event::Draw);
    }
}

/// Bring `value` into `[0, count)` by wrapping or clamping.
fn range(value: i64, count: usize, wrapping: bool) -> usize {
    let count = count.max(1) as i64;
    let ranged = if wrapping {
        wrap(value, 0, count - 1, count)
    } else {
        clamp(value, 0, count - 1)
    };
    ranged as usize
}
