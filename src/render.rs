use std::io;

use crate::game::Snapshot;

/// Something that can draw a frame. Called on every `Wake::Render`; it only
/// reads the snapshot.
pub trait RenderSink {
    fn draw(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()>;
}

/// Keeps the most recent frame's headline numbers. Useful for headless runs.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FrameCounter {
    pub frames: u64,
    pub last_score: u64,
    pub last_level: u32,
}

impl RenderSink for FrameCounter {
    fn draw(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()> {
        self.frames += 1;
        self.last_score = snapshot.score;
        self.last_level = snapshot.level;
        Ok(())
    }
}
