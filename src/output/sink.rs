use std::collections::VecDeque;

use crate::foundation::core::Fps;
use crate::foundation::error::StudioResult;
use crate::render::backend::FrameRGBA;

/// Configuration provided to a [`FrameSink`] when the studio attaches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Target frames-per-second.
    pub fps: Fps,
}

/// Downstream consumer of composited frames (preview surface, encoder, network egress).
///
/// Ordering contract: `push_frame` is called with strictly increasing frame numbers.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> StudioResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, frame_number: u64, frame: &FrameRGBA) -> StudioResult<()>;
    /// Called once when the sink is detached.
    fn end(&mut self) -> StudioResult<()>;
    /// `false` while the surface cannot accept frames; those ticks are skipped.
    fn is_ready(&self) -> bool {
        true
    }
}

/// In-memory sink for tests and debugging.
///
/// Keeps the most recent frames up to an optional bound and counts everything pushed.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    limit: Option<usize>,
    pushed: u64,
    ended: bool,
    pub(crate) frames: VecDeque<(u64, FrameRGBA)>,
}

impl InMemorySink {
    /// Sink that keeps every frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that keeps only the last `n` frames (at least one).
    pub fn keep_last(n: usize) -> Self {
        Self {
            limit: Some(n.max(1)),
            ..Self::default()
        }
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Frames kept, oldest first.
    pub fn frames(&self) -> impl Iterator<Item = &(u64, FrameRGBA)> {
        self.frames.iter()
    }

    /// Most recent frame.
    pub fn last_frame(&self) -> Option<&FrameRGBA> {
        self.frames.back().map(|(_, f)| f)
    }

    /// Frames pushed since `begin`, including ones no longer kept.
    pub fn pushed(&self) -> u64 {
        self.pushed
    }

    /// `true` once `end` was called.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> StudioResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.pushed = 0;
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, frame_number: u64, frame: &FrameRGBA) -> StudioResult<()> {
        self.frames.push_back((frame_number, frame.clone()));
        if let Some(limit) = self.limit {
            while self.frames.len() > limit {
                self.frames.pop_front();
            }
        }
        self.pushed += 1;
        Ok(())
    }

    fn end(&mut self) -> StudioResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/output/sink.rs"]
mod tests;
