use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_ROWS: usize = 1;
pub const DEFAULT_COLS: usize = 5;
pub const DEFAULT_TIME_LIMIT_SECS: f64 = 2.0;
pub const DEFAULT_ROUNDS_TO_WIN: u32 = 5;
pub const DEFAULT_COUNTDOWN_SECS: u64 = 5;
pub const DEFAULT_COOLDOWN_MILLIS: u64 = 2000;

/// Largest `rows` or `cols` the grid can still lay out and draw.
pub const MAX_GRID_SIDE: usize = 20;

/// Upper bound for every timed setting, in seconds.
pub const MAX_DELAY_SECS: u64 = 24 * 60 * 60;

/// Validated tunables for one session. Construct through [`SessionConfig::new`]
/// or [`SessionConfig::validate`]; the fields are read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    rows: usize,
    cols: usize,
    time_limit_secs: f64,
    rounds_to_win: u32,
    countdown_secs: u64,
    cooldown_millis: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            rounds_to_win: DEFAULT_ROUNDS_TO_WIN,
            countdown_secs: DEFAULT_COUNTDOWN_SECS,
            cooldown_millis: DEFAULT_COOLDOWN_MILLIS,
        }
    }
}

/// Field names as they appear in settings forms and error messages.
pub mod field {
    pub const ROWS: &str = "rows";
    pub const COLS: &str = "cols";
    pub const TIME_LIMIT: &str = "time_limit";
    pub const ROUNDS: &str = "rounds";
    pub const COUNTDOWN: &str = "countdown";
    pub const COOLDOWN: &str = "cooldown";

    pub const ALL: [&str; 6] = [ROWS, COLS, TIME_LIMIT, ROUNDS, COUNTDOWN, COOLDOWN];
}

impl SessionConfig {
    pub fn new(
        rows: usize,
        cols: usize,
        time_limit_secs: f64,
        rounds_to_win: u32,
        countdown_secs: u64,
        cooldown_millis: u64,
    ) -> Result<Self, ConfigError> {
        if rows == 0 {
            return Err(ConfigError::new(field::ROWS, "must be at least 1"));
        }
        if cols == 0 {
            return Err(ConfigError::new(field::COLS, "must be at least 1"));
        }
        if rows > MAX_GRID_SIDE {
            return Err(ConfigError::new(
                field::ROWS,
                format!("must be at most {}", MAX_GRID_SIDE),
            ));
        }
        if cols > MAX_GRID_SIDE {
            return Err(ConfigError::new(
                field::COLS,
                format!("must be at most {}", MAX_GRID_SIDE),
            ));
        }
        if rows * cols < 2 {
            return Err(ConfigError::new(
                field::COLS,
                "grid needs at least 2 cells so a decoy exists",
            ));
        }
        if !time_limit_secs.is_finite() || time_limit_secs <= 0.0 {
            return Err(ConfigError::new(
                field::TIME_LIMIT,
                "must be a positive number of seconds",
            ));
        }
        if time_limit_secs > MAX_DELAY_SECS as f64 {
            return Err(ConfigError::new(field::TIME_LIMIT, "must be at most one day"));
        }
        if rounds_to_win == 0 {
            return Err(ConfigError::new(field::ROUNDS, "must be at least 1"));
        }
        if countdown_secs > MAX_DELAY_SECS {
            return Err(ConfigError::new(field::COUNTDOWN, "must be at most one day"));
        }
        if cooldown_millis > MAX_DELAY_SECS * 1000 {
            return Err(ConfigError::new(field::COOLDOWN, "must be at most one day"));
        }

        Ok(Self {
            rows,
            cols,
            time_limit_secs,
            rounds_to_win,
            countdown_secs,
            cooldown_millis,
        })
    }

    /// Parses and range-checks every field of a settings form. Either all
    /// fields are accepted or the first offending one is reported.
    pub fn validate(raw: &RawConfig) -> Result<Self, ConfigError> {
        let rows = parse_field::<usize>(field::ROWS, raw.rows.as_deref())?;
        let cols = parse_field::<usize>(field::COLS, raw.cols.as_deref())?;
        let time_limit = parse_field::<f64>(field::TIME_LIMIT, raw.time_limit.as_deref())?;
        let rounds = parse_field::<u32>(field::ROUNDS, raw.rounds.as_deref())?;
        let countdown = parse_field::<u64>(field::COUNTDOWN, raw.countdown.as_deref())?;
        let cooldown = parse_field::<u64>(field::COOLDOWN, raw.cooldown.as_deref())?;

        Self::new(rows, cols, time_limit, rounds, countdown, cooldown)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn time_limit_secs(&self) -> f64 {
        self.time_limit_secs
    }

    pub fn time_limit(&self) -> Duration {
        Duration::from_secs_f64(self.time_limit_secs)
    }

    pub fn rounds_to_win(&self) -> u32 {
        self.rounds_to_win
    }

    pub fn countdown_secs(&self) -> u64 {
        self.countdown_secs
    }

    pub fn countdown(&self) -> Duration {
        Duration::from_secs(self.countdown_secs)
    }

    pub fn cooldown_millis(&self) -> u64 {
        self.cooldown_millis
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_millis)
    }

    /// Re-checks a value that bypassed the constructors (e.g. one read from disk).
    pub fn revalidate(self) -> Result<Self, ConfigError> {
        Self::new(
            self.rows,
            self.cols,
            self.time_limit_secs,
            self.rounds_to_win,
            self.countdown_secs,
            self.cooldown_millis,
        )
    }
}

fn parse_field<T: std::str::FromStr>(name: &'static str, value: Option<&str>) -> Result<T, ConfigError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::new(name, "missing value"))?;

    value
        .parse::<T>()
        .map_err(|_| ConfigError::new(name, format!("'{}' is not a valid number", value)))
}

/// Un-validated field values as typed into a settings form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawConfig {
    pub rows: Option<String>,
    pub cols: Option<String>,
    pub time_limit: Option<String>,
    pub rounds: Option<String>,
    pub countdown: Option<String>,
    pub cooldown: Option<String>,
}

impl RawConfig {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.slot(name).and_then(|v| v.as_deref())
    }

    /// Sets a field by name; returns false for unknown names.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.slot_mut(name) {
            Some(slot) => {
                *slot = Some(value.into());
                true
            }
            None => false,
        }
    }

    fn slot(&self, name: &str) -> Option<&Option<String>> {
        match name {
            field::ROWS => Some(&self.rows),
            field::COLS => Some(&self.cols),
            field::TIME_LIMIT => Some(&self.time_limit),
            field::ROUNDS => Some(&self.rounds),
            field::COUNTDOWN => Some(&self.countdown),
            field::COOLDOWN => Some(&self.cooldown),
            _ => None,
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            field::ROWS => Some(&mut self.rows),
            field::COLS => Some(&mut self.cols),
            field::TIME_LIMIT => Some(&mut self.time_limit),
            field::ROUNDS => Some(&mut self.rounds),
            field::COUNTDOWN => Some(&mut self.countdown),
            field::COOLDOWN => Some(&mut self.cooldown),
            _ => None,
        }
    }
}

impl From<&SessionConfig> for RawConfig {
    fn from(cfg: &SessionConfig) -> Self {
        Self {
            rows: Some(cfg.rows.to_string()),
            cols: Some(cfg.cols.to_string()),
            time_limit: Some(cfg.time_limit_secs.to_string()),
            rounds: Some(cfg.rounds_to_win.to_string()),
            countdown: Some(cfg.countdown_secs.to_string()),
            cooldown: Some(cfg.cooldown_millis.to_string()),
        }
    }
}

/// A configuration field that failed to parse or fell outside its bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub field: &'static str,
    pub reason: String,
}

impl ConfigError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {}: {}", self.field, self.reason)
    }
}

impl std::error::Error for ConfigError {}

pub trait ConfigStore {
    fn load(&self) -> SessionConfig;
    fn save(&self, cfg: &SessionConfig) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "flinch") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("flinch_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> SessionConfig {
        fs::read(&self.path)
            .ok()
            .and_then(|bytes| serde_json::from_slice::<SessionConfig>(&bytes).ok())
            .and_then(|cfg| cfg.revalidate().ok())
            .unwrap_or_default()
    }

    fn save(&self, cfg: &SessionConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
