//! Synthetic telemetry source for exercising the scope.
//!
//! Writes one tab-separated record per period to stdout, laid out like the
//! vehicle log: timestamp in field 0, the flight mode stepping through 0..=5,
//! then a slow sine per remaining channel. Optionally blanks the sensor
//! fields with the missing marker or injects garbage.

use anyhow::{Context, Result};
use clap::Parser;
use std::f64::consts::PI;
use std::io::{ErrorKind, Write};
use std::time::{Duration, Instant};
use telemscope::config::LoggingConfig;
use telemscope::core::{ChannelTable, RecordBuilder, FIELD_SEPARATOR};
use telemscope::logging;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "synth_feed")]
#[command(about = "Emit synthetic vehicle telemetry records on stdout", long_about = None)]
struct Cli {
    /// Records per second
    #[arg(long, default_value = "100")]
    rate_hz: f64,

    /// Stop after this many records (runs until the reader goes away otherwise)
    #[arg(long)]
    count: Option<u64>,

    /// Every Nth record carries the missing marker for every sensor channel
    #[arg(long)]
    missing_every: Option<u64>,

    /// Every Nth record has an unparsable token in its first mapped field
    #[arg(long)]
    garbage_every: Option<u64>,

    /// Base frequency of the generated waves in Hz
    #[arg(long, default_value = "0.5")]
    frequency: f64,
}

const MODE_PERIOD_SECS: f64 = 2.0;

struct WaveSource {
    table: ChannelTable,
    builder: RecordBuilder,
    frequency: f64,
}

impl WaveSource {
    fn new(frequency: f64) -> Self {
        let table = ChannelTable::vehicle();
        let builder = RecordBuilder::new(table.max_position());
        Self {
            table,
            builder,
            frequency,
        }
    }

    fn record(&mut self, t: f64, missing: bool, garbage: bool) -> String {
        self.builder.clear_all();
        self.builder.set(0, t);
        if let Some(mode) = self.table.position_of("mode") {
            self.builder.set(mode, ((t / MODE_PERIOD_SECS) as u64 % 6) as f64);
        }
        if !missing {
            for (i, (position, name)) in self.table.entries().enumerate() {
                if name == "mode" {
                    continue;
                }
                // Spread the channels over slightly different frequencies.
                let freq = self.frequency * (1.0 + i as f64 * 0.05);
                let phase = i as f64 * PI / 8.0;
                self.builder.set(position, (2.0 * PI * freq * t + phase).sin());
            }
        }
        let line = self.builder.encode();
        if garbage {
            corrupt_first_field(&line)
        } else {
            line
        }
    }
}

fn corrupt_first_field(line: &str) -> String {
    let mut fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() > 1 {
        fields[1] = "1.2.3";
    }
    fields.join(&FIELD_SEPARATOR.to_string())
}

fn every(n: Option<u64>, seq: u64) -> bool {
    matches!(n, Some(n) if n > 0 && seq % n == n - 1)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&LoggingConfig::default())?;

    if !(cli.rate_hz > 0.0) {
        anyhow::bail!("--rate-hz must be positive");
    }

    let period = Duration::from_secs_f64(1.0 / cli.rate_hz);
    let mut interval = tokio::time::interval(period);
    let mut source = WaveSource::new(cli.frequency);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let started = Instant::now();

    info!(rate_hz = cli.rate_hz, count = ?cli.count, "feeding");

    let mut seq = 0u64;
    while cli.count.map_or(true, |count| seq < count) {
        interval.tick().await;
        let t = started.elapsed().as_secs_f64();
        let line = source.record(
            t,
            every(cli.missing_every, seq),
            every(cli.garbage_every, seq),
        );

        match out.write_all(line.as_bytes()).and_then(|_| out.flush()) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                debug!(records = seq, "reader went away");
                return Ok(());
            }
            Err(e) => return Err(e).context("Failed to write record"),
        }
        seq += 1;
    }

    info!(records = seq, "feed complete");
    Ok(())
}
