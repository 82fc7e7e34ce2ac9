// Configuration loading and parsing (tablecast.toml).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tablecast_core::Season;
use thiserror::Error;

/// Name of the config file inside `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "tablecast.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub season: Season,
    pub data_paths: DataPaths,
    pub report: ReportConfig,
}

// ---------------------------------------------------------------------------
// tablecast.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the whole file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    season: Season,
    data_paths: DataPaths,
    report: ReportConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub fixtures: String,
    pub standings: String,
    /// Optional predictions CSV (`fixture,home,away`).
    #[serde(default)]
    pub predictions: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Table,
    Chart,
    /// One gameweek's fixtures with their ids and predictions.
    Fixtures,
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(ViewMode::Table),
            "chart" => Ok(ViewMode::Chart),
            "fixtures" => Ok(ViewMode::Fixtures),
            other => Err(format!(
                "unknown view '{other}', expected 'table', 'chart' or 'fixtures'"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    pub view: ViewMode,
    pub format: OutputFormat,
    /// How many teams from the top of the projected table the chart shows
    /// when no explicit team list is given.
    pub chart_top_teams: usize,
    /// Explicit teams to show. Empty means "all" for the table and
    /// `chart_top_teams` for the chart.
    #[serde(default)]
    pub teams: Vec<String>,
    /// Gameweek listed by the fixtures view. Unset means the first gameweek
    /// of the replay window.
    #[serde(default)]
    pub gameweek: Option<u32>,
    pub zones: ZoneConfig,
}

/// Table positions that carry a consequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ZoneConfig {
    /// Positions 1..=champions_league qualify for the Champions League.
    pub champions_league: usize,
    /// Positions after the Champions League places up to this one.
    pub europa_league: usize,
    /// This position and everything below is relegated.
    pub relegation_from: usize,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        ZoneConfig {
            champions_league: 4,
            europa_league: 5,
            relegation_from: 18,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/tablecast.toml` relative to
/// the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    parse_config(&text, &path)
}

/// Parse and validate config text. `path` is only used in error messages.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let file: ConfigFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    let config = Config {
        season: file.season,
        data_paths: file.data_paths,
        report: file.report,
    };

    validate(&config)?;

    Ok(config)
}

/// Create `config/tablecast.toml` from `defaults/tablecast.toml` when it is
/// missing. Returns the path written, or `None` when a config already exists.
/// An existing file is never overwritten.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.exists() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    let copy_err = |what: &str, path: &Path, e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("{what} {}: {e}", path.display()),
    };

    let mut defaults = std::fs::File::open(&source).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!(
            "no config/{CONFIG_FILE} and no defaults/{CONFIG_FILE} under {} ({e}); \
             run from the project root",
            base_dir.display()
        ),
    })?;

    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(|e| copy_err("failed to create", dir, e))?;
    }

    // `create_new` so a config written concurrently is left alone.
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(None),
        Err(e) => return Err(copy_err("failed to create", target.as_path(), e)),
    };
    std::io::copy(&mut defaults, &mut dest)
        .map_err(|e| copy_err("failed to write", target.as_path(), e))?;

    Ok(Some(target))
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let season = &config.season;

    let counts: &[(&str, usize)] = &[
        ("season.num_teams", season.num_teams),
        ("season.num_gameweeks", season.num_gameweeks as usize),
        ("season.fixtures_per_gameweek", season.fixtures_per_gameweek),
        ("report.chart_top_teams", config.report.chart_top_teams),
    ];
    for (name, val) in counts {
        if *val == 0 {
            return Err(invalid(name, "must be > 0"));
        }
    }

    if let Err(e) = season.replay_window.validate(season.num_gameweeks) {
        return Err(invalid("season.replay_window", e.to_string()));
    }

    if let Some(gw) = config.report.gameweek {
        if gw == 0 || gw > season.num_gameweeks {
            return Err(invalid(
                "report.gameweek",
                format!("must be within 1..={}, got {gw}", season.num_gameweeks),
            ));
        }
    }

    let zones = &config.report.zones;
    if zones.europa_league < zones.champions_league {
        return Err(invalid(
            "report.zones.europa_league",
            format!(
                "must be >= champions_league ({}), got {}",
                zones.champions_league, zones.europa_league
            ),
        ));
    }
    if zones.relegation_from <= zones.europa_league || zones.relegation_from > season.num_teams {
        return Err(invalid(
            "report.zones.relegation_from",
            format!(
                "must be after europa_league ({}) and at most num_teams ({}), got {}",
                zones.europa_league, season.num_teams, zones.relegation_from
            ),
        ));
    }

    if config.data_paths.fixtures.trim().is_empty() {
        return Err(invalid("data_paths.fixtures", "must not be empty"));
    }
    if config.data_paths.standings.trim().is_empty() {
        return Err(invalid("data_paths.standings", "must not be empty"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
