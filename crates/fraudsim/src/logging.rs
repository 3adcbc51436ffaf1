use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// File name of the run log under the data directory
pub const LOG_FILE_NAME: &str = "fraudsim.log";
/// Trim the log once it grows past this many bytes
const MAX_LOG_SIZE: u64 = 5 * 1024 * 1024;
/// Bytes of recent history kept by a trim
const KEEP_SIZE: u64 = 1024 * 1024;

/// Cut `log_path` down to its last `keep` bytes once it exceeds `max_size`.
///
/// Returns whether the file was trimmed. The kept tail starts at a line boundary
/// and is preceded by a marker line.
fn trim_oversized_log(log_path: &Path, max_size: u64, keep: u64) -> std::io::Result<bool> {
    let len = match fs::metadata(log_path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e),
    };
    if len <= max_size {
        return Ok(false);
    }

    let mut tail = Vec::new();
    {
        let mut file = File::open(log_path)?;
        file.seek(SeekFrom::Start(len.saturating_sub(keep)))?;
        file.read_to_end(&mut tail)?;
    }
    let first_line = tail
        .iter()
        .position(|&b| b == b'\n')
        .map_or(0, |i| i + 1);

    let mut file = File::create(log_path)?;
    file.write_all(b"--- fraudsim log trimmed ---\n")?;
    file.write_all(&tail[first_line..])?;
    Ok(true)
}

/// Log file shared by every event the file layer writes
#[derive(Clone)]
struct SharedLogFile(Arc<Mutex<File>>);

/// Handle given to one event; writes go straight to the shared file
struct LogHandle(Arc<Mutex<File>>);

impl LogHandle {
    fn with_file<T>(&self, f: impl FnOnce(&mut File) -> T) -> T {
        // A panic mid-write leaves the file usable
        let mut guard = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

impl Write for LogHandle {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.with_file(|file| file.write(buf))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.with_file(|file| file.flush())
    }
}

impl<'a> MakeWriter<'a> for SharedLogFile {
    type Writer = LogHandle;

    fn make_writer(&'a self) -> Self::Writer {
        LogHandle(Arc::clone(&self.0))
    }
}

/// Send `fraudsim` and `fraudsim_core` events at `level` to `{log_dir}/fraudsim.log`.
///
/// `RUST_LOG` overrides `level`. The file is trimmed at startup when oversized.
/// `echo_stderr` also prints warnings to stderr; the dashboard owns the terminal
/// and leaves it off.
pub fn init_logging(log_dir: &Path, level: &str, echo_stderr: bool) -> color_eyre::Result<()> {
    fs::create_dir_all(log_dir)?;

    let log_path = log_dir.join(LOG_FILE_NAME);

    if let Err(e) = trim_oversized_log(&log_path, MAX_LOG_SIZE, KEEP_SIZE) {
        eprintln!("warning: could not trim {}: {e}", log_path.display());
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    let log_file = SharedLogFile(Arc::new(Mutex::new(file)));

    let default_filter = format!("fraudsim={level},fraudsim_core={level}");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let stderr_layer = echo_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr.with_max_level(tracing::Level::WARN))
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(log_file)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false),
        )
        .with(stderr_layer)
        .try_init()?;

    tracing::info!(log_path = %log_path.display(), "logging started");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_keeps_recent_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);
        let content: String = (0..200).map(|i| format!("line {i}\n")).collect();
        fs::write(&path, &content).unwrap();

        assert!(trim_oversized_log(&path, 100, 50).unwrap());

        let rotated = fs::read_to_string(&path).unwrap();
        assert!(rotated.starts_with("--- fraudsim log trimmed ---\n"));
        assert!(rotated.ends_with("line 199\n"));
        assert!(!rotated.contains("line 0\n"));
    }

    #[test]
    fn test_small_or_missing_log_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);
        fs::write(&path, "short\n").unwrap();
        assert!(!trim_oversized_log(&path, 100, 50).unwrap());
        assert!(!trim_oversized_log(&dir.path().join("missing.log"), 100, 50).unwrap());
    }

    #[test]
    fn test_handles_share_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);
        let shared = SharedLogFile(Arc::new(Mutex::new(File::create(&path).unwrap())));

        shared.make_writer().write_all(b"first\n").unwrap();
        let mut second = shared.make_writer();
        second.write_all(b"second\n").unwrap();
        second.flush().unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }
}
