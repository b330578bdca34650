//! Presentation layer interface.
//!
//! The core hands a renderer one [`StreamLayout`] at startup and then one
//! [`Frame`] per tick. Everything visual (axes, colours, labels, fixed
//! ranges) belongs on this side of the boundary; the only thing the core
//! asks back is which channels autoscale.

pub mod json;
pub mod null;
pub mod scale;

pub use json::JsonLinesRenderer;
pub use null::NullRenderer;
pub use scale::{ScaleMap, ScalePolicy};

use crate::core::{ChannelName, Frame, StreamLayout};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait Renderer: Send {
    /// Called once before the first frame.
    async fn start(&mut self, _layout: &StreamLayout) -> Result<()> {
        Ok(())
    }

    /// Called every tick, including ticks where nothing changed.
    async fn render(&mut self, frame: &Frame) -> Result<()>;

    /// Channels whose axis range must be refreshed every tick.
    fn autoscale_channels(&self) -> Vec<ChannelName> {
        Vec::new()
    }

    /// True once the renderer can no longer present anything (e.g. its
    /// output was closed). The host stops when this turns true.
    fn is_closed(&self) -> bool {
        false
    }

    async fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
