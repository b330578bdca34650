use super::{Renderer, ScaleMap};
use crate::core::{ChannelName, Frame, StreamLayout};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::io::ErrorKind;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::info;

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Message<'a> {
    Layout {
        #[serde(flatten)]
        layout: &'a StreamLayout,
        scales: &'a ScaleMap,
    },
    Frame(&'a Frame),
}

/// Writes the layout and then one JSON object per frame, one per line.
///
/// Frames with nothing dirty are skipped unless `write_empty_frames` is set.
/// A closed output (broken pipe) marks the renderer closed instead of
/// failing the run.
pub struct JsonLinesRenderer<W> {
    out: W,
    scales: ScaleMap,
    write_empty_frames: bool,
    closed: bool,
    buf: Vec<u8>,
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesRenderer<W> {
    pub fn new(out: W, scales: ScaleMap) -> Self {
        Self {
            out,
            scales,
            write_empty_frames: false,
            closed: false,
            buf: Vec::with_capacity(4096),
        }
    }

    pub fn with_empty_frames(mut self, enabled: bool) -> Self {
        self.write_empty_frames = enabled;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    async fn write_message(&mut self, message: &Message<'_>) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.buf.clear();
        serde_json::to_writer(&mut self.buf, message).context("Failed to encode frame")?;
        self.buf.push(b'\n');

        let result = match self.out.write_all(&self.buf).await {
            Ok(()) => self.out.flush().await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                info!("frame output closed by reader");
                self.closed = true;
                Ok(())
            }
            Err(e) => Err(e).context("Failed to write frame"),
        }
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> Renderer for JsonLinesRenderer<W> {
    async fn start(&mut self, layout: &StreamLayout) -> Result<()> {
        let scales = self.scales.clone();
        self.write_message(&Message::Layout {
            layout,
            scales: &scales,
        })
        .await
    }

    async fn render(&mut self, frame: &Frame) -> Result<()> {
        if frame.is_empty() && !self.write_empty_frames {
            return Ok(());
        }
        self.write_message(&Message::Frame(frame)).await
    }

    fn autoscale_channels(&self) -> Vec<ChannelName> {
        self.scales.autoscale_channels()
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn finish(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        match self.out.flush().await {
            Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e).context("Failed to flush output"),
            _ => Ok(()),
        }
    }
}
