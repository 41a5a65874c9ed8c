//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber from the resolved configuration
//! - Honour the output buffering mode for stdout
//! - Flush buffered output when the process winds down
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Log level configurable via config, overridden by `RUST_LOG`

use std::io::{self, BufWriter, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{BufferingMode, LogFormat, ProcessConfig};

const BUFFER_CAPACITY: usize = 64 * 1024;

/// Log destination honouring a [`BufferingMode`].
///
/// Unbuffered sinks flush after every write; buffered sinks only flush when
/// the buffer fills or [`flush`](Self::flush) is called.
pub struct OutputSink<W: Write> {
    mode: BufferingMode,
    inner: Arc<Mutex<BufWriter<W>>>,
}

impl<W: Write> OutputSink<W> {
    pub fn new(target: W, mode: BufferingMode) -> Self {
        Self {
            mode,
            inner: Arc::new(Mutex::new(BufWriter::with_capacity(BUFFER_CAPACITY, target))),
        }
    }

    pub fn flush(&self) -> io::Result<()> {
        self.lock().flush()
    }

    fn lock(&self) -> MutexGuard<'_, BufWriter<W>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write> Clone for OutputSink<W> {
    fn clone(&self) -> Self {
        Self {
            mode: self.mode,
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Per-event writer handed out by [`OutputSink`].
pub struct SinkWriter<'a, W: Write> {
    sink: &'a OutputSink<W>,
}

impl<W: Write> Write for SinkWriter<'_, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut inner = self.sink.lock();
        let written = inner.write(buf)?;
        if self.sink.mode == BufferingMode::Unbuffered {
            inner.flush()?;
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.lock().flush()
    }
}

impl<'a, W: Write + 'a> MakeWriter<'a> for OutputSink<W> {
    type Writer = SinkWriter<'a, W>;

    fn make_writer(&'a self) -> Self::Writer {
        SinkWriter { sink: self }
    }
}

/// Flushes stdout when dropped. Keep it alive for the life of the process.
#[must_use = "dropping the guard flushes and stops buffering guarantees"]
pub struct LogGuard {
    sink: OutputSink<io::Stdout>,
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        let _ = self.sink.flush();
    }
}

fn filter_for(config: &ProcessConfig) -> EnvFilter {
    let level = config.observability.log_level.to_ascii_lowercase();
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("service_runner={level},tower_http={level}")))
}

/// Install the global subscriber.
///
/// If a subscriber is already installed (tests, embedding) the existing one
/// is kept and only the guard is returned.
pub fn install(config: &ProcessConfig) -> LogGuard {
    let sink = OutputSink::new(io::stdout(), config.buffering_mode());
    let registry = tracing_subscriber::registry().with(filter_for(config));

    let result = match config.observability.log_format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(sink.clone()))
            .try_init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(sink.clone()))
            .try_init(),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Global subscriber already installed");
    }

    LogGuard { sink }
}
