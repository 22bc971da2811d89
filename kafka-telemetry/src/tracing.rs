use std::backtrace::{Backtrace, BacktraceStatus};
use std::io::Write;
use std::panic::PanicHookInfo;
use std::sync::{Arc, Once};

use kafka_config::Environment;
use thiserror::Error;
use tracing::subscriber::{SetGlobalDefaultError, set_global_default};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_log::{LogTracer, log_tracer::SetLoggerError};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, FmtSubscriber, Registry, fmt, layer::SubscriberExt};

/// JSON field naming the binary that emitted a line.
const APP_FIELD: &str = "app";

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to init log tracer: {0}")]
    InitLogTracer(#[from] SetLoggerError),

    #[error("failed to set global default subscriber: {0}")]
    SetGlobalDefault(#[from] SetGlobalDefaultError),

    #[error("an io error occurred: {0}")]
    Io(#[from] std::io::Error),
}

/// Keeps buffered log lines alive until dropped.
///
/// Both binaries are short lived, so the guard has to live until the end of
/// `main` or the last lines are lost.
#[must_use]
pub enum LogFlusher {
    /// Flushes the non-blocking stdout writer on drop.
    Flusher(WorkerGuard),
    /// Development output is written synchronously.
    NullFlusher,
}

static INIT_TEST_TRACING: Once = Once::new();

/// Enables readable tracing output in tests when `ENABLE_TRACING` is set.
///
/// ```bash
/// ENABLE_TRACING=1 cargo test test_name
/// ```
pub fn init_test_tracing() {
    INIT_TEST_TRACING.call_once(|| {
        if std::env::var("ENABLE_TRACING").is_ok() {
            Environment::Dev.set();
            let _log_flusher =
                init_tracing("test").expect("Failed to initialize tracing for tests");
        }
    });
}

/// Adds the `app` field to every JSON object written through it.
///
/// Anything that is not a JSON object, or already has the field, is forwarded as is.
struct AppFieldWriter<W> {
    inner: W,
    app_name: Arc<str>,
}

impl<W> AppFieldWriter<W> {
    fn new(inner: W, app_name: Arc<str>) -> Self {
        Self { inner, app_name }
    }

    fn with_app_field(&self, buf: &[u8]) -> Option<Vec<u8>> {
        let line = std::str::from_utf8(buf).ok()?;
        let value = serde_json::from_str::<serde_json::Value>(line).ok()?;
        let serde_json::Value::Object(mut fields) = value else {
            return None;
        };
        if fields.contains_key(APP_FIELD) {
            return None;
        }

        fields.insert(APP_FIELD.to_string(), self.app_name.as_ref().into());

        let mut output = serde_json::to_vec(&fields).ok()?;
        if line.ends_with('\n') {
            output.push(b'\n');
        }

        Some(output)
    }
}

impl<W: Write> Write for AppFieldWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let Some(output) = self.with_app_field(buf) else {
            return self.inner.write(buf);
        };

        self.inner.write_all(&output)?;
        // The caller only knows about its own buffer.
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

/// Installs the global subscriber of a helper binary.
///
/// Production-like environments log JSON lines to stdout, development logs
/// pretty-printed output. The level defaults to `info` and honors `RUST_LOG`.
pub fn init_tracing(app_name: &str) -> Result<LogFlusher, TracingError> {
    // Captures records of libraries built on the `log` crate.
    LogTracer::init()?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL));

    let log_flusher = if Environment::load()?.is_prod() {
        init_json_tracing(app_name.into(), filter)?
    } else {
        init_pretty_tracing(filter)?
    };

    install_panic_hook();

    Ok(log_flusher)
}

fn init_json_tracing(app_name: Arc<str>, filter: EnvFilter) -> Result<LogFlusher, TracingError> {
    let (stdout, guard) = tracing_appender::non_blocking(std::io::stdout());

    let layer = fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(move || AppFieldWriter::new(stdout.make_writer(), app_name.clone()));

    set_global_default(Registry::default().with(filter).with(layer))?;

    Ok(LogFlusher::Flusher(guard))
}

fn init_pretty_tracing(filter: EnvFilter) -> Result<LogFlusher, TracingError> {
    let subscriber = FmtSubscriber::builder()
        .pretty()
        .with_ansi(true)
        .with_file(false)
        .with_line_number(false)
        .with_env_filter(filter)
        .finish();

    set_global_default(subscriber)?;

    Ok(LogFlusher::NullFlusher)
}

/// Logs panics through tracing, then runs the previously installed hook.
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        log_panic(info);
        previous(info);
    }));
}

fn log_panic(info: &PanicHookInfo) {
    let payload = info
        .payload()
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| info.payload().downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic payload");
    let location = info.location().map(ToString::to_string);

    let backtrace = Backtrace::capture();
    if backtrace.status() == BacktraceStatus::Captured {
        tracing::error!(
            panic.payload = payload,
            panic.location = location,
            panic.backtrace = %backtrace,
            "a panic occurred",
        );
    } else {
        tracing::error!(
            panic.payload = payload,
            panic.location = location,
            "a panic occurred, run with RUST_BACKTRACE=1 to display the backtrace",
        );
    }
}
