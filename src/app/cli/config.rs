//! TOML configuration file discovery and loading
//!
//! One file configures the whole application: the pipeline keys are read by
//! [`PipelineConfig`], the remaining application keys (`log-level`,
//! `log-format`, `log-file`, `color`, `duration`) are read here. Command line
//! flags always win over file values.

use super::args::Args;
use crate::core::logging::LogSettings;
use crate::pipeline::api::{PipelineConfig, PipelineError, PipelineResult};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_DIR_NAME: &str = "Prodcons";
pub const CONFIG_FILE_NAME: &str = "prodcons.toml";

/// Values read from a configuration file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSettings {
    pub pipeline: PipelineConfig,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub log_file: Option<String>,
    pub color: Option<bool>,
    pub duration_secs: Option<u64>,
}

/// Fully merged application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub pipeline: PipelineConfig,
    pub log: LogSettings,
    /// `None` runs until interrupted
    pub duration: Option<Duration>,
}

/// Default configuration file location, e.g. `~/.config/Prodcons/prodcons.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Pick the configuration file to load
///
/// An explicitly requested file must exist; the default file is optional.
pub fn resolve_config_path(
    requested: Option<&Path>,
    default_path: Option<PathBuf>,
) -> PipelineResult<Option<PathBuf>> {
    match requested {
        Some(path) if path.exists() => Ok(Some(path.to_path_buf())),
        Some(path) => Err(PipelineError::ConfigFile {
            path: path.display().to_string(),
            message: "the specified configuration file does not exist".to_string(),
        }),
        None => Ok(default_path.filter(|path| path.exists())),
    }
}

/// Parse the application and pipeline keys of a TOML document
pub fn parse_file_settings(contents: &str, path: &Path) -> PipelineResult<FileSettings> {
    let file_error = |message: String| PipelineError::ConfigFile {
        path: path.display().to_string(),
        message,
    };

    let config: toml::Table = toml::from_str(contents).map_err(|e| file_error(e.to_string()))?;
    let pipeline =
        PipelineConfig::from_toml_str(contents).map_err(|e| file_error(e.to_string()))?;

    let log_file = config
        .get("log-file")
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let duration_secs = match config.get("duration").map(|v| v.as_integer()) {
        Some(Some(secs)) if secs >= 0 => Some(secs as u64),
        Some(_) => {
            return Err(file_error(
                "duration must be a non-negative number of seconds".to_string(),
            ))
        }
        None => None,
    };

    Ok(FileSettings {
        pipeline,
        log_level: config
            .get("log-level")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        log_format: config
            .get("log-format")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        log_file,
        color: config.get("color").and_then(|v| v.as_bool()),
        duration_secs,
    })
}

/// Discover and read the configuration file, if any
pub async fn load_file_settings(requested: Option<&Path>) -> PipelineResult<FileSettings> {
    let Some(path) = resolve_config_path(requested, default_config_path())? else {
        log::debug!("No configuration file found; using defaults");
        return Ok(FileSettings::default());
    };

    let contents =
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| PipelineError::ConfigFile {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
    parse_file_settings(&contents, &path)
}

impl AppSettings {
    /// Merge file values with command line flags; flags take precedence
    pub fn merge(file: FileSettings, args: &Args, terminal: bool) -> Self {
        let mut pipeline = file.pipeline;
        args.apply_overrides(&mut pipeline);

        let log_file = match &args.log_file {
            Some(path) => Some(path.display().to_string()),
            None => file.log_file,
        }
        .filter(|path| !path.eq_ignore_ascii_case("none") && path != "-");

        let format_name = args.log_format.as_deref().or(file.log_format.as_deref());
        let color = args.color_choice().or(file.color).unwrap_or(terminal);

        let duration = match args.run_duration() {
            Some(requested) => requested,
            None => file
                .duration_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        };

        Self {
            pipeline,
            log: LogSettings {
                level: args.log_level.clone().or(file.log_level),
                format: LogSettings::format_from_name(format_name),
                file: log_file,
                color,
            },
            duration,
        }
    }
}
