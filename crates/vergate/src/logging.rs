use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use vergate_platform::AppPaths;

/// Log file capped at `max_size` bytes.
///
/// Once a write pushes the file past the cap, the older half is dropped. The
/// file is recreated if something deletes it while the process runs.
struct CappedLogFile {
    path: PathBuf,
    max_size: u64,
    file: Option<File>,
    size: u64,
}

impl CappedLogFile {
    fn open(path: PathBuf, max_size: u64) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut log = Self {
            path,
            max_size,
            file: None,
            size: 0,
        };
        if log.current_size() > max_size {
            keep_recent_half(&log.path)?;
        }
        log.reopen()?;
        Ok(log)
    }

    fn current_size(&self) -> u64 {
        std::fs::metadata(&self.path).map_or(0, |metadata| metadata.len())
    }

    fn reopen(&mut self) -> io::Result<&mut File> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.size = file.metadata()?.len();
        Ok(self.file.insert(file))
    }

    fn writable(&mut self) -> io::Result<&mut File> {
        if self.file.is_none() || !self.path.exists() {
            return self.reopen();
        }
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("log file not available"))
    }
}

impl Write for CappedLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.writable()?.write(buf)?;
        self.size += written as u64;

        if self.size > self.max_size {
            self.file = None;
            keep_recent_half(&self.path)?;
            self.reopen()?;
        }
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.as_mut().map_or(Ok(()), File::flush)
    }
}

/// Rewrite `path` with only the newer half of its lines.
fn keep_recent_half(path: &Path) -> io::Result<()> {
    let contents = std::fs::read(path)?;
    let half = contents.len() / 2;
    let keep_from = contents[half..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(half, |pos| half + pos + 1);
    std::fs::write(path, &contents[keep_from..])
}

fn logger_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .add_filter_allow_str("vergate")
        .build()
}

/// Debug builds print everything on stderr; release builds print warnings.
fn terminal_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

pub fn init_logging(paths: &AppPaths, debug_enabled: bool, max_log_size: u64) {
    let config = logger_config();
    let log_path = paths.log_file();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        terminal_level(),
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    match CappedLogFile::open(log_path.clone(), max_log_size) {
        Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Debug, config, file)),
        Err(error) => eprintln!("vergate: cannot write {}: {error}", log_path.display()),
    }

    if CombinedLogger::init(loggers).is_err() {
        return;
    }
    set_logging_enabled(debug_enabled);
    log::debug!("Logging to {}", log_path.display());
}

/// Warnings always reach the log; debug detail only when enabled.
pub fn set_logging_enabled(enabled: bool) {
    log::set_max_level(if enabled {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    });
}
