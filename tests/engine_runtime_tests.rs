use anyhow::Result;
use async_trait::async_trait;
use crossbeam_channel::{Receiver, Sender};
use std::io::{self, BufReader, Cursor, Read};
use std::sync::Arc;
use std::time::Duration;
use telemscope::core::{ChannelName, ChannelSpec, ChannelTable, Frame, StreamLayout};
use telemscope::engine::{
    FrameScheduler, PipelineState, RuntimeOptions, ScopeRuntime, StopReason, StreamEndPolicy,
};
use telemscope::ingest::{IngestPipeline, ReaderExit};
use telemscope::observability::PipelineMetrics;
use telemscope::render::Renderer;

#[derive(Default)]
struct RecordingRenderer {
    layout: Option<StreamLayout>,
    frames: Vec<Frame>,
    autoscale: Vec<ChannelName>,
    close_after: Option<usize>,
    finished: bool,
}

#[async_trait]
impl Renderer for RecordingRenderer {
    async fn start(&mut self, layout: &StreamLayout) -> Result<()> {
        self.layout = Some(layout.clone());
        Ok(())
    }

    async fn render(&mut self, frame: &Frame) -> Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn autoscale_channels(&self) -> Vec<ChannelName> {
        self.autoscale.clone()
    }

    fn is_closed(&self) -> bool {
        self.close_after.map_or(false, |n| self.frames.len() >= n)
    }

    async fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}

/// Blocks on a channel for input; end-of-stream once the sender is dropped.
struct LiveInput {
    rx: Receiver<Vec<u8>>,
}

impl Read for LiveInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.rx.recv() {
            Ok(chunk) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                Ok(n)
            }
            Err(_) => Ok(0),
        }
    }
}

fn live_input() -> (Sender<Vec<u8>>, BufReader<LiveInput>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (tx, BufReader::new(LiveInput { rx }))
}

fn runtime<I>(
    input: I,
    renderer: RecordingRenderer,
    policy: StreamEndPolicy,
) -> ScopeRuntime<RecordingRenderer>
where
    I: io::BufRead + Send + 'static,
{
    let table = Arc::new(
        ChannelTable::new(&[ChannelSpec::new(1, "mode"), ChannelSpec::new(2, "temp")]).unwrap(),
    );
    let metrics = Arc::new(PipelineMetrics::new());
    let (ingest, consumer) = IngestPipeline::spawn(input, metrics.clone()).unwrap();
    let scheduler = FrameScheduler::new(table, 3, consumer, metrics.clone()).unwrap();
    ScopeRuntime::new(
        ingest,
        scheduler,
        renderer,
        metrics,
        RuntimeOptions {
            tick_interval: Duration::from_millis(5),
            on_stream_end: policy,
        },
    )
}

#[tokio::test]
async fn test_end_of_stream_flushes_then_exits() -> Result<()> {
    let input = Cursor::new(b"x\t1\t20.0\nx\tNaN\t21.0\nx\t2\tabc\n".to_vec());
    let mut runtime = runtime(input, RecordingRenderer::default(), StreamEndPolicy::Exit);

    let outcome = runtime.run_until(std::future::pending()).await?;

    assert_eq!(outcome.reason, StopReason::StreamEnded);
    assert_eq!(outcome.reader_exit, Some(ReaderExit::EndOfStream));
    assert_eq!(outcome.metrics.records_decoded, 3);
    assert_eq!(outcome.metrics.field_errors, 1);
    assert!(matches!(runtime.state(), PipelineState::Stopped { .. }));

    let renderer = runtime.into_renderer();
    assert!(renderer.finished);
    assert_eq!(renderer.layout.unwrap().window_len, 3);
    assert_eq!(renderer.frames.len() as u64, outcome.ticks);

    let last_mode = renderer
        .frames
        .iter()
        .rev()
        .find_map(|f| f.samples("mode").map(|s| s.to_vec()))
        .unwrap();
    assert_eq!(last_mode, vec![None, Some(1.0), Some(2.0)]);
    Ok(())
}

#[tokio::test]
async fn test_hold_keeps_ticking_until_shutdown() -> Result<()> {
    let input = Cursor::new(b"x\t4\t5\n".to_vec());
    let mut runtime = runtime(input, RecordingRenderer::default(), StreamEndPolicy::Hold);

    let outcome = runtime
        .run_until(tokio::time::sleep(Duration::from_millis(120)))
        .await?;

    assert_eq!(outcome.reason, StopReason::Interrupted);
    assert_eq!(outcome.reader_exit, Some(ReaderExit::EndOfStream));

    let renderer = runtime.into_renderer();
    let dirty_frames = renderer.frames.iter().filter(|f| !f.is_empty()).count();
    assert_eq!(dirty_frames, 1);
    assert!(renderer.frames.len() > 2);
    Ok(())
}

#[tokio::test]
async fn test_shutdown_while_input_is_live() -> Result<()> {
    let (feed, input) = live_input();
    let renderer = RecordingRenderer {
        autoscale: vec![ChannelName::from("temp")],
        ..RecordingRenderer::default()
    };
    let mut runtime = runtime(input, renderer, StreamEndPolicy::Exit);

    feed.send(b"x\t1\t-3.0\n".to_vec()).unwrap();
    let outcome = runtime
        .run_until(tokio::time::sleep(Duration::from_millis(80)))
        .await?;

    assert_eq!(outcome.reason, StopReason::Interrupted);
    assert_eq!(outcome.reader_exit, None);

    let renderer = runtime.into_renderer();
    let last = renderer.frames.last().unwrap();
    let range = last.range("temp").unwrap();
    assert_eq!((range.min, range.max), (Some(-3.0), Some(-3.0)));

    drop(feed);
    Ok(())
}

#[tokio::test]
async fn test_closed_output_stops_the_run() -> Result<()> {
    let (feed, input) = live_input();
    let renderer = RecordingRenderer {
        close_after: Some(2),
        ..RecordingRenderer::default()
    };
    let mut runtime = runtime(input, renderer, StreamEndPolicy::Exit);

    let outcome = runtime.run_until(std::future::pending()).await?;

    assert_eq!(outcome.reason, StopReason::OutputClosed);
    assert_eq!(outcome.ticks, 2);
    drop(feed);
    Ok(())
}
