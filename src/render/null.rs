use super::{Renderer, ScaleMap};
use crate::core::{ChannelName, Frame};
use anyhow::Result;
use async_trait::async_trait;

/// Accepts every frame and presents nothing. Counts what it saw.
#[derive(Debug, Default)]
pub struct NullRenderer {
    scales: ScaleMap,
    frames: u64,
    dirty_frames: u64,
}

impl NullRenderer {
    pub fn new(scales: ScaleMap) -> Self {
        Self {
            scales,
            ..Self::default()
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn dirty_frames(&self) -> u64 {
        self.dirty_frames
    }
}

#[async_trait]
impl Renderer for NullRenderer {
    async fn render(&mut self, frame: &Frame) -> Result<()> {
        self.frames += 1;
        if !frame.is_empty() {
            self.dirty_frames += 1;
        }
        Ok(())
    }

    fn autoscale_channels(&self) -> Vec<ChannelName> {
        self.scales.autoscale_channels()
    }
}
