//! Process logging backed by flexi_logger
//!
//! Library code only uses the `log` facade; the binary calls [`init_logging`]
//! once at startup to install the backend.

use std::str::FromStr;
use std::sync::{Mutex, OnceLock};

use flexi_logger::{DeferredNow, FileSpec, Logger, LoggerHandle};

static LOGGER_HANDLE: OnceLock<Mutex<LoggerHandle>> = OnceLock::new();

/// Output layout of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::EnumString, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum LogFormat {
    /// `2025-01-01 12:00:00.000 INF message`
    #[default]
    Text,
    /// Text plus the emitting module and line
    Ext,
    /// One compact JSON object per line
    Json,
}

/// Logging settings resolved from CLI and config file
#[derive(Debug, Clone, Default)]
pub struct LogSettings {
    pub level: Option<String>,
    pub format: LogFormat,
    pub file: Option<String>,
    pub color: bool,
}

impl LogSettings {
    /// Parse a format name, falling back to text for unknown values
    pub fn format_from_name(name: Option<&str>) -> LogFormat {
        name.and_then(|n| LogFormat::from_str(n).ok())
            .unwrap_or_default()
    }
}

/// Install the flexi_logger backend
pub fn init_logging(settings: &LogSettings) -> Result<(), Box<dyn std::error::Error>> {
    let level_str = settings.level.as_deref().unwrap_or("info");
    let mut logger = Logger::try_with_str(level_str)?;

    logger = match (settings.format, settings.color) {
        (LogFormat::Json, _) => logger.format(json_format),
        (LogFormat::Ext, true) => logger.format(extended_color_format),
        (LogFormat::Ext, false) => logger.format(extended_format),
        (LogFormat::Text, true) => logger.format(simple_color_format),
        (LogFormat::Text, false) => logger.format(simple_format),
    };

    if let Some(file_path) = settings.file.as_deref().filter(|p| *p != "none") {
        let file_spec = FileSpec::try_from(std::path::Path::new(file_path))?;
        logger = logger.log_to_file(file_spec);
    }

    let handle = logger.start()?;
    let _ = LOGGER_HANDLE.set(Mutex::new(handle));
    Ok(())
}

/// Change the active log level at runtime
///
/// Only the level can change after initialisation; format, colour and file
/// output are fixed by flexi_logger once the logger has started.
pub fn reconfigure_logging(log_level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let handle_mutex = LOGGER_HANDLE
        .get()
        .ok_or("Logger handle not initialised. Call init_logging first.")?;
    let mut handle = handle_mutex
        .lock()
        .map_err(|_| "Could not acquire logger handle lock")?;
    handle.parse_and_push_temp_spec(log_level)?;
    Ok(())
}

fn level_abbr(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERR",
        log::Level::Warn => "WRN",
        log::Level::Info => "INF",
        log::Level::Debug => "DBG",
        log::Level::Trace => "TRC",
    }
}

fn level_colored(level: log::Level) -> colored::ColoredString {
    use colored::Colorize;

    let abbr = level_abbr(level);
    match level {
        log::Level::Error => abbr.red().bold(),
        log::Level::Warn => abbr.yellow(),
        log::Level::Info => abbr.green(),
        log::Level::Debug => abbr.blue(),
        log::Level::Trace => abbr.magenta(),
    }
}

fn simple_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_abbr(record.level()),
        record.args()
    )
}

fn simple_color_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    use colored::Colorize;

    write!(
        w,
        "{} {} {}",
        now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        level_colored(record.level()),
        record.args()
    )
}

fn extended_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f"),
        level_abbr(record.level()),
        record.args(),
        format_target_as_path(record.target(), record.line())
    )
}

fn extended_color_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    use colored::Colorize;

    write!(
        w,
        "{} {} {} ({})",
        now.format("%Y-%m-%d %H:%M:%S%.3f").to_string().dimmed(),
        level_colored(record.level()),
        record.args(),
        format_target_as_path(record.target(), record.line()).dimmed()
    )
}

fn json_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &log::Record,
) -> Result<(), std::io::Error> {
    let json_obj = serde_json::json!({
        "timestamp": now.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        "level": level_abbr(record.level()),
        "message": record.args().to_string(),
        "target": format_target_as_path(record.target(), record.line()),
    });

    match serde_json::to_string(&json_obj) {
        Ok(json_string) => w.write_all(json_string.as_bytes()),
        Err(_) => w.write_all(b"{\"error\":\"Failed to serialize log message\"}"),
    }
}

// prodcons::pipeline::consumer -> pipeline/consumer.rs:42
fn format_target_as_path(target: &str, line: Option<u32>) -> String {
    let path_like = match target.strip_prefix("prodcons::") {
        Some(without_prefix) => without_prefix.replace("::", "/") + ".rs",
        None => target.replace("::", "/"),
    };

    match line {
        Some(line_num) => format!("{path_like}:{line_num}"),
        None => path_like,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(
        format: fn(&mut dyn std::io::Write, &mut DeferredNow, &log::Record) -> Result<(), std::io::Error>,
        level: log::Level,
    ) -> String {
        let mut buffer = Vec::new();
        let mut now = DeferredNow::new();
        let record = log::Record::builder()
            .level(level)
            .target("prodcons::pipeline::consumer")
            .line(Some(42))
            .args(format_args!("Consumer-1 consumed: 7"))
            .build();

        format(&mut buffer, &mut now, &record).expect("Format function should succeed");
        String::from_utf8(buffer).expect("Output should be valid UTF-8")
    }

    #[test]
    fn test_simple_format_has_level_and_message() {
        let output = render(simple_format, log::Level::Info);
        assert!(output.contains("INF Consumer-1 consumed: 7"), "got: {output}");
        assert!(!output.contains("pipeline/consumer.rs"));
    }

    #[test]
    fn test_extended_format_includes_target_path() {
        let output = render(extended_format, log::Level::Debug);
        assert!(output.contains("DBG Consumer-1 consumed: 7"));
        assert!(output.ends_with("(pipeline/consumer.rs:42)"), "got: {output}");
    }

    #[test]
    fn test_json_format_is_single_object() {
        let output = render(json_format, log::Level::Warn);
        let value: serde_json::Value =
            serde_json::from_str(&output).expect("JSON format should produce valid JSON");

        assert_eq!(value["level"], "WRN");
        assert_eq!(value["message"], "Consumer-1 consumed: 7");
        assert_eq!(value["target"], "pipeline/consumer.rs:42");
        assert!(!output.contains('\n'));
    }

    #[test]
    fn test_format_target_for_external_crate() {
        assert_eq!(format_target_as_path("tokio::runtime", None), "tokio/runtime");
        assert_eq!(
            format_target_as_path("prodcons::queue::internal", Some(7)),
            "queue/internal.rs:7"
        );
    }

    #[test]
    fn test_log_format_names() {
        assert_eq!(LogSettings::format_from_name(Some("json")), LogFormat::Json);
        assert_eq!(LogSettings::format_from_name(Some("ext")), LogFormat::Ext);
        assert_eq!(LogSettings::format_from_name(Some("bogus")), LogFormat::Text);
        assert_eq!(LogSettings::format_from_name(None), LogFormat::Text);
        assert_eq!(LogFormat::Json.to_string(), "json");
    }

    #[test]
    #[serial_test::serial]
    fn test_reconfigure_without_init_fails() {
        if LOGGER_HANDLE.get().is_none() {
            assert!(reconfigure_logging("debug").is_err());
        }
    }

    #[test]
    #[serial_test::serial]
    fn test_init_with_file_then_reconfigure() {
        let dir = tempfile::tempdir().unwrap();
        let settings = LogSettings {
            level: Some("info".to_string()),
            format: LogFormat::Ext,
            file: Some(dir.path().join("prodcons.log").display().to_string()),
            color: false,
        };

        init_logging(&settings).expect("Logger should start once per process");
        assert!(reconfigure_logging("debug").is_ok());
    }
}
