//! Structured logging for run telemetry.

use chrono::{DateTime, Utc};
use color_eyre::eyre::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Structured log event types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LogEvent {
    /// Telemetry sample from one encode/channel/decode round trip.
    Telemetry(TelemetryEvent),

    /// Statistical summary across all rounds.
    Statistics(StatisticsEvent),

    /// General info message.
    Info { message: String },

    /// Warning message.
    Warn { message: String },

    /// Error message.
    Error {
        message: String,
        details: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryEvent {
    pub timestamp: DateTime<Utc>,
    pub pre_fec_ber: f64,
    pub post_fec_ber: f64,
    pub symbols_decoded: usize,
    pub barker_timing_error: Option<i64>,
    pub fec_ok: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsEvent {
    pub timestamp: DateTime<Utc>,
    pub duration_secs: f64,
    pub pre_fec_ber: StatSummary,
    pub post_fec_ber: StatSummary,
    pub trials: usize,
    pub frame_errors: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatSummary {
    pub mean: f64,
    pub stddev: f64,
    pub min: f64,
    pub max: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Logger that writes one formatted line per event.
pub struct StructuredLogger {
    format: LogFormat,
    writer: Box<dyn Write + Send>,
    start_time: DateTime<Utc>,
}

impl StructuredLogger {
    pub fn new(format: LogFormat, target: LogTarget) -> Result<Self> {
        let writer: Box<dyn Write + Send> = match target {
            LogTarget::Stdout => Box::new(io::stdout()),
            LogTarget::Stderr => Box::new(io::stderr()),
        };
        Ok(Self {
            format,
            writer,
            start_time: Utc::now(),
        })
    }

    /// Same as [`Self::new`], but writes to `path` instead of a stream.
    pub fn to_file(format: LogFormat, path: &std::path::Path) -> Result<Self> {
        Ok(Self {
            format,
            writer: Box::new(BufWriter::new(File::create(path)?)),
            start_time: Utc::now(),
        })
    }

    pub fn log(&mut self, event: LogEvent) -> Result<()> {
        let output = match self.format {
            LogFormat::Json => serde_json::to_string(&event)?,
            LogFormat::Pretty => self.format_pretty(&event),
        };
        writeln!(self.writer, "{}", output)?;
        self.writer.flush()?;
        Ok(())
    }

    fn format_pretty(&self, event: &LogEvent) -> String {
        let ts = Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
        match event {
            LogEvent::Telemetry(t) => format!(
                "[{}] TELEMETRY: BER pre={:.6} post={:.6} | symbols={} | barker_err={:?} | fec_ok={}",
                ts, t.pre_fec_ber, t.post_fec_ber, t.symbols_decoded, t.barker_timing_error, t.fec_ok
            ),
            LogEvent::Statistics(s) => format!(
                "[{}] STATISTICS ({:.2}s, {} trials, {} frame errors): pre-FEC BER μ={:.6} σ={:.6} | post-FEC BER μ={:.6} σ={:.6}",
                ts, s.duration_secs, s.trials, s.frame_errors,
                s.pre_fec_ber.mean, s.pre_fec_ber.stddev, s.post_fec_ber.mean, s.post_fec_ber.stddev
            ),
            LogEvent::Info { message } => format!("[{}] INFO: {}", ts, message),
            LogEvent::Warn { message } => format!("[{}] WARN: {}", ts, message),
            LogEvent::Error { message, details } => match details {
                Some(d) => format!("[{}] ERROR: {} | {}", ts, message, d),
                None => format!("[{}] ERROR: {}", ts, message),
            },
        }
    }

    pub fn elapsed(&self) -> f64 {
        (Utc::now() - self.start_time).num_milliseconds() as f64 / 1000.0
    }
}
