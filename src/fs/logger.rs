//! Console and file logger.
//!
//! Implements the [`log`] facade. Every record is printed to the console and appended to
//! `log.txt`, which is truncated when the logger is installed. A missing SD card only
//! disables the file output.
//!
//! # Log Output
//!
//! ```text
//! INFO [1s 3ms] seeker::competition - Mode Disabled -> Autonomous
//! DEBUG [1s 55ms] seeker::auton - Auton cycle: 1 objects, target Some((170, 150)), ...
//! WARN [1s 80ms] seeker::peripherals::vision - Vision Sensor Error: AI Vision Sensor is disconnected
//! ```

use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    sync::{Mutex, OnceLock},
    time::Duration,
};

use humantime::{FormattedDuration, format_duration};
use log::{LevelFilter, Metadata, Record, SetLoggerError};

const LOG_FILE: &str = "log.txt";

/// A logger that writes to the console and to `log.txt`.
pub struct SeekerLogger {
    /// `None` if the file could not be opened.
    file_writer: Mutex<Option<BufWriter<File>>>,
}

impl SeekerLogger {
    fn new() -> Self {
        let file_writer = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(LOG_FILE)
            .ok()
            .map(BufWriter::new);

        Self {
            file_writer: Mutex::new(file_writer),
        }
    }
}

impl log::Log for SeekerLogger {
    fn enabled(&self, metadata: &Metadata) -> bool { metadata.level() <= log::max_level() }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_line(record);
        print!("{}", line);

        if let Ok(mut writer) = self.file_writer.lock() {
            if let Some(writer) = writer.as_mut() {
                let _ = writer.write_all(line.as_bytes());
            }
        }
    }

    fn flush(&self) {
        if let Ok(mut writer) = self.file_writer.lock() {
            if let Some(writer) = writer.as_mut() {
                let _ = writer.flush();
            }
        }
    }
}

/// `LEVEL [uptime] target - message`, newline terminated.
fn format_line(record: &Record) -> String {
    format!(
        "{} [{}] {} - {}\n",
        record.level(),
        uptime(),
        record.target(),
        record.args()
    )
}

static LOGGER: OnceLock<SeekerLogger> = OnceLock::new();

/// Installs the logger and sets the maximum level to `level`.
///
/// # Errors
///
/// Returns [`SetLoggerError`] if a logger is already installed.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| {
        start_time();
        SeekerLogger::new()
    });
    log::set_logger(logger).map(|()| log::set_max_level(level))
}

#[cfg(target_os = "vexos")]
fn start_time() {}

#[cfg(not(target_os = "vexos"))]
fn start_time() -> std::time::Instant {
    static START: OnceLock<std::time::Instant> = OnceLock::new();
    *START.get_or_init(std::time::Instant::now)
}

/// Time since the program started, rounded to milliseconds.
fn uptime() -> FormattedDuration {
    #[cfg(target_os = "vexos")]
    let elapsed = vexide::time::user_uptime();
    #[cfg(not(target_os = "vexos"))]
    let elapsed = start_time().elapsed();

    format_duration(Duration::from_millis(elapsed.as_millis() as u64))
}

#[cfg(test)]
mod tests {
    use log::{Level, LevelFilter, Record, info};

    use super::*;

    fn bracketed(line: &str) -> &str {
        let start = line.find('[').unwrap() + 1;
        let end = line.find(']').unwrap();
        &line[start..end]
    }

    #[test]
    fn uptime_is_whole_milliseconds() {
        let formatted = uptime().to_string();
        assert!(!formatted.contains("us"));
        assert!(!formatted.contains("ns"));
    }

    #[test]
    fn line_carries_level_uptime_and_target() {
        let line = format_line(
            &Record::builder()
                .level(Level::Warn)
                .target("seeker::auton")
                .args(format_args!("Turn of 8.0 degrees timed out"))
                .build(),
        );

        assert!(line.starts_with("WARN ["));
        assert!(line.ends_with("] seeker::auton - Turn of 8.0 degrees timed out\n"));
        let uptime = humantime::parse_duration(bracketed(&line)).unwrap();
        assert_eq!(uptime.subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    #[ignore = "filesystem access needed (file write)"]
    fn records_reach_log_file() {
        init(LevelFilter::Debug).expect("Failed to initialize logger");

        info!("Mode Disabled -> Autonomous");
        log::trace!("below the installed level");
        log::logger().flush();

        let contents = std::fs::read_to_string(LOG_FILE).unwrap();
        let line = contents
            .lines()
            .find(|line| line.ends_with("Mode Disabled -> Autonomous"))
            .unwrap();
        assert!(line.starts_with("INFO ["));
        assert!(line.contains("] seeker::fs::logger::tests - "));
        assert!(!contents.contains("below the installed level"));
    }
}
