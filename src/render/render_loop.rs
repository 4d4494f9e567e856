//! Render cadence and frame statistics.
//!
//! [`RenderLoop`] does not own a thread or timer. It tracks whether the loop is running, when the
//! next tick is due, and what the achieved rate looks like; the session asks it whether a tick is
//! due, runs the tick, and reports back. All timestamps come from the session clock.

use std::collections::VecDeque;
use std::time::Duration;

use serde::Serialize;

use crate::foundation::core::Fps;

const MAX_SAMPLES: usize = 120;

/// Snapshot of render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct RenderStats {
    /// Achieved frames per second over the recent window, measured from frame start times.
    pub fps: f64,
    /// Frames composited since the stats were last reset.
    pub total_frames: u64,
    /// Frames the loop should have produced but did not because a tick ran late.
    pub dropped_frames: u64,
    /// Ticks that had no surface or no output scene to paint.
    pub skipped_ticks: u64,
    /// Mean time spent producing a frame over the recent window, in milliseconds.
    pub avg_frame_ms: f64,
    /// Longest time spent producing a frame since the stats were last reset, in milliseconds.
    pub max_frame_ms: f64,
}

/// Render cadence state machine and statistics collector.
#[derive(Clone, Debug)]
pub struct RenderLoop {
    fps: Fps,
    interval: Duration,
    running: bool,
    next_deadline: Option<Duration>,

    last_frame_at: Option<Duration>,
    frame_starts: VecDeque<Duration>,
    frame_costs: VecDeque<Duration>,
    total_frames: u64,
    dropped_frames: u64,
    skipped_ticks: u64,
    max_frame: Duration,
}

impl RenderLoop {
    /// Stopped loop targeting `fps`.
    pub fn new(fps: Fps) -> Self {
        Self {
            fps,
            interval: fps.frame_interval(),
            running: false,
            next_deadline: None,
            last_frame_at: None,
            frame_starts: VecDeque::with_capacity(MAX_SAMPLES),
            frame_costs: VecDeque::with_capacity(MAX_SAMPLES),
            total_frames: 0,
            dropped_frames: 0,
            skipped_ticks: 0,
            max_frame: Duration::ZERO,
        }
    }

    /// Target rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Target frame interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Change the target rate. A running loop keeps its next deadline.
    pub fn set_fps(&mut self, fps: Fps) {
        self.fps = fps;
        self.interval = fps.frame_interval();
    }

    /// Start ticking at `now`. Returns `false` if the loop was already running.
    pub fn start(&mut self, now: Duration) -> bool {
        if self.running {
            tracing::debug!("render loop already running");
            return false;
        }
        self.running = true;
        self.next_deadline = Some(now);
        self.last_frame_at = None;
        tracing::info!(fps = self.fps.as_f64(), "render loop started");
        true
    }

    /// Stop and drop the pending tick. Returns `false` if the loop was not running.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.next_deadline = None;
        tracing::info!(frames = self.total_frames, "render loop stopped");
        true
    }

    /// `true` between [`start`](Self::start) and [`stop`](Self::stop).
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// When the next tick is due, if running.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.next_deadline
    }

    /// `true` when running and the next deadline has passed.
    pub fn is_due(&self, now: Duration) -> bool {
        self.next_deadline.is_some_and(|d| now >= d)
    }

    /// Schedule the tick after one that finished at `finished_at`.
    ///
    /// The cadence stays aligned to the original start time. Slots that passed while a tick was
    /// running are skipped rather than run back to back.
    pub fn schedule_next(&mut self, finished_at: Duration) {
        let Some(deadline) = self.next_deadline else {
            return;
        };
        let mut next = deadline + self.interval;
        if next <= finished_at && !self.interval.is_zero() {
            let behind = (finished_at - next).as_nanos() / self.interval.as_nanos();
            let steps = u32::try_from(behind + 1).unwrap_or(u32::MAX);
            next += self.interval.saturating_mul(steps);
        }
        self.next_deadline = Some(next);
    }

    /// Record a composited frame that started at `started` and took `cost`.
    pub fn record_frame(&mut self, started: Duration, cost: Duration) {
        if let Some(prev) = self.last_frame_at {
            let delta = started.saturating_sub(prev);
            let dropped = dropped_between(delta, self.interval);
            if dropped > 0 {
                tracing::debug!(dropped, delta_ms = delta.as_secs_f64() * 1000.0, "frames dropped");
                self.dropped_frames += dropped;
            }
        }
        self.last_frame_at = Some(started);
        self.total_frames += 1;
        self.max_frame = self.max_frame.max(cost);

        push_bounded(&mut self.frame_starts, started);
        push_bounded(&mut self.frame_costs, cost);
    }

    /// Record a tick that painted nothing.
    ///
    /// The next frame's delta is not measured across the gap, so skipping is never counted as
    /// dropping.
    pub fn record_skip(&mut self) {
        self.skipped_ticks += 1;
        self.last_frame_at = None;
        self.frame_starts.clear();
    }

    /// Current statistics.
    pub fn stats(&self) -> RenderStats {
        let avg_frame_ms = if self.frame_costs.is_empty() {
            0.0
        } else {
            let sum: f64 = self.frame_costs.iter().map(|d| d.as_secs_f64()).sum();
            sum * 1000.0 / self.frame_costs.len() as f64
        };
        RenderStats {
            fps: window_fps(&self.frame_starts),
            total_frames: self.total_frames,
            dropped_frames: self.dropped_frames,
            skipped_ticks: self.skipped_ticks,
            avg_frame_ms,
            max_frame_ms: self.max_frame.as_secs_f64() * 1000.0,
        }
    }

    /// Zero all counters and windows. Cadence state is untouched.
    pub fn reset_stats(&mut self) {
        self.last_frame_at = None;
        self.frame_starts.clear();
        self.frame_costs.clear();
        self.total_frames = 0;
        self.dropped_frames = 0;
        self.skipped_ticks = 0;
        self.max_frame = Duration::ZERO;
    }
}

fn push_bounded(window: &mut VecDeque<Duration>, v: Duration) {
    window.push_back(v);
    if window.len() > MAX_SAMPLES {
        window.pop_front();
    }
}

fn window_fps(starts: &VecDeque<Duration>) -> f64 {
    let (Some(first), Some(last)) = (starts.front(), starts.back()) else {
        return 0.0;
    };
    if starts.len() < 2 {
        return 0.0;
    }
    let span = last.saturating_sub(*first).as_secs_f64();
    if span > 0.0 {
        (starts.len() - 1) as f64 / span
    } else {
        0.0
    }
}

/// Frames missed between two frames `delta` apart at `interval` cadence.
///
/// Deltas up to 1.5 intervals are jitter; beyond that, `round(delta / interval) - 1` frames were
/// dropped.
pub fn dropped_between(delta: Duration, interval: Duration) -> u64 {
    if interval.is_zero() {
        return 0;
    }
    let ratio = delta.as_secs_f64() / interval.as_secs_f64();
    if ratio <= 1.5 {
        return 0;
    }
    (ratio.round() as u64).saturating_sub(1)
}

#[cfg(test)]
#[path = "../../tests/unit/render/render_loop.rs"]
mod tests;
