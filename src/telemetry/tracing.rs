use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::time::SystemTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::config::paths::{PathError, Paths};
use crate::config::schema::ServerConfig;

const LOG_FILE_NAME: &str = "server.log";

#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub level: Level,
    pub log_to_file: bool,
    pub log_to_stderr: bool,
    pub json_format: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            log_to_file: false,
            log_to_stderr: true,
            json_format: false,
        }
    }
}

impl TracingConfig {
    /// Logging settings from the `[server]` section; an unknown level falls
    /// back to info.
    pub fn from_server_config(config: &ServerConfig) -> Self {
        Self {
            level: config.log_level.parse().unwrap_or(Level::INFO),
            log_to_file: config.log_to_file,
            log_to_stderr: true,
            json_format: config.json_logs,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Failed to initialize state directory: {0}")]
    StateDir(#[from] PathError),

    #[error("Failed to open log file {path}: {source}")]
    LogFileOpen { path: PathBuf, source: io::Error },

    #[error("Global tracing subscriber already installed: {message}")]
    AlreadyInitialized { message: String },
}

/// Flushes the log file when dropped.
#[derive(Debug)]
pub struct TracingGuard {
    file: Option<Arc<Mutex<File>>>,
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            if let Ok(mut handle) = file.lock() {
                let _ = handle.flush();
            }
        }
    }
}

struct FileWriter {
    file: Arc<Mutex<File>>,
}

impl io::Write for FileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file mutex poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .file
            .lock()
            .map_err(|_| io::Error::other("log file mutex poisoned"))?;
        guard.flush()
    }
}

#[derive(Clone)]
struct FileMakeWriter {
    file: Arc<Mutex<File>>,
}

impl<'a> MakeWriter<'a> for FileMakeWriter {
    type Writer = FileWriter;

    fn make_writer(&'a self) -> Self::Writer {
        FileWriter {
            file: Arc::clone(&self.file),
        }
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn fmt_layer<W>(writer: W, json: bool) -> BoxedLayer
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_level(true)
        .with_timer(SystemTime);
    if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

fn open_log_file() -> Result<Arc<Mutex<File>>, TracingError> {
    let dir = Paths::ensure_state_dir()?;
    let path = dir.join(LOG_FILE_NAME);
    let file = File::options()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| TracingError::LogFileOpen { path, source })?;
    Ok(Arc::new(Mutex::new(file)))
}

/// Installs the process-wide subscriber.
pub fn init_tracing(config: &TracingConfig) -> Result<TracingGuard, TracingError> {
    let file = if config.log_to_file {
        Some(open_log_file()?)
    } else {
        None
    };

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if config.log_to_stderr {
        layers.push(fmt_layer(std::io::stderr, config.json_format));
    }
    if let Some(file) = &file {
        let writer = FileMakeWriter {
            file: Arc::clone(file),
        };
        layers.push(fmt_layer(writer, config.json_format));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(resolve_env_filter(config))
        .try_init()
        .map_err(|err| TracingError::AlreadyInitialized {
            message: err.to_string(),
        })?;

    Ok(TracingGuard { file })
}

fn resolve_env_filter(config: &TracingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_str()))
}
