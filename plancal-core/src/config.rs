//! plancal configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::error::{PlancalError, PlancalResult};
use crate::normalize::{OffsetRule, SeasonalOffsetRule, TzdbOffsetRule};

static DEFAULT_ENDPOINT: &str = "https://planzajec.uek.krakow.pl/index.php";
static DEFAULT_LANGUAGE_CENTER_GROUP: &str = "*Centrum Językowe*";
static DEFAULT_LANGUAGE_CLASS_LABEL: &str = "lektorat";
static DEFAULT_DIRECTORY: &str = "group_folder.json";
static DEFAULT_SCHEDULES_DIR: &str = "schedules";
static DEFAULT_TIMEZONE: &str = "Europe/Warsaw";
static ENV_PREFIX: &str = "PLANCAL";
const DEFAULT_PERIOD: u32 = 3;

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_period() -> u32 {
    DEFAULT_PERIOD
}

fn default_language_center_group() -> String {
    DEFAULT_LANGUAGE_CENTER_GROUP.to_string()
}

fn default_language_class_label() -> String {
    DEFAULT_LANGUAGE_CLASS_LABEL.to_string()
}

fn default_directory() -> PathBuf {
    PathBuf::from(DEFAULT_DIRECTORY)
}

fn default_schedules_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SCHEDULES_DIR)
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_winter_hours() -> i32 {
    1
}

fn default_summer_hours() -> i32 {
    2
}

/// Global configuration at ~/.config/plancal/config.toml
///
/// Every key is optional; `PLANCAL_*` environment variables override the file
/// (nested keys use `__`, e.g. `PLANCAL_OFFSET__RULE=tzdb`).
#[derive(Debug, Deserialize, Clone)]
pub struct PlancalConfig {
    /// Timetable endpoint queried once per sub-group.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Reporting-period code sent as `okres`.
    #[serde(default = "default_period")]
    pub period: u32,

    /// Group whose sub-groups keep language classes.
    #[serde(default = "default_language_center_group")]
    pub language_center_group: String,

    /// Class-type label of language classes.
    #[serde(default = "default_language_class_label")]
    pub language_class_label: String,

    /// JSON file mapping groups to `[name, id]` sub-group entries.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// Where `<id>.ics` files are written.
    #[serde(default = "default_schedules_dir")]
    pub schedules_dir: PathBuf,

    /// Let rows with a blank date inherit the previous row's date instead of dropping them.
    #[serde(default)]
    pub continue_blank_dates: bool,

    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub offset: OffsetConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OffsetRuleKind {
    /// Closed-form last-Sunday-of-March/October rule.
    #[default]
    Seasonal,
    /// IANA timezone database via chrono-tz.
    Tzdb,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OffsetConfig {
    #[serde(default)]
    pub rule: OffsetRuleKind,

    #[serde(default = "default_winter_hours")]
    pub winter_hours: i32,

    #[serde(default = "default_summer_hours")]
    pub summer_hours: i32,

    /// Only used by the `tzdb` rule.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

impl Default for OffsetConfig {
    fn default() -> Self {
        OffsetConfig {
            rule: OffsetRuleKind::default(),
            winter_hours: default_winter_hours(),
            summer_hours: default_summer_hours(),
            timezone: default_timezone(),
        }
    }
}

impl Default for PlancalConfig {
    fn default() -> Self {
        PlancalConfig {
            endpoint: default_endpoint(),
            period: default_period(),
            language_center_group: default_language_center_group(),
            language_class_label: default_language_class_label(),
            directory: default_directory(),
            schedules_dir: default_schedules_dir(),
            continue_blank_dates: false,
            request_timeout_secs: None,
            offset: OffsetConfig::default(),
        }
    }
}

impl PlancalConfig {
    pub fn config_path() -> PlancalResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| PlancalError::Config("Could not determine config directory".into()))?
            .join("plancal");

        Ok(config_dir.join("config.toml"))
    }

    /// Load ~/.config/plancal/config.toml, creating a commented-out template on first use.
    pub fn load() -> PlancalResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> PlancalResult<Self> {
        Self::load_with_env(path, ENV_PREFIX)
    }

    fn load_with_env(path: &Path, env_prefix: &str) -> PlancalResult<Self> {
        Config::builder()
            .add_source(File::new(&path.to_string_lossy(), FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| PlancalError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PlancalError::Config(e.to_string()))
    }

    pub fn directory_path(&self) -> PathBuf {
        expand_tilde(&self.directory)
    }

    pub fn schedules_path(&self) -> PathBuf {
        expand_tilde(&self.schedules_dir)
    }

    /// Build the offset rule selected by `[offset]`.
    pub fn offset_rule(&self) -> PlancalResult<Box<dyn OffsetRule>> {
        match self.offset.rule {
            OffsetRuleKind::Seasonal => Ok(Box::new(SeasonalOffsetRule::from_hours(
                self.offset.winter_hours,
                self.offset.summer_hours,
            )?)),
            OffsetRuleKind::Tzdb => {
                let tz = self.offset.timezone.parse::<chrono_tz::Tz>().map_err(|e| {
                    PlancalError::Config(format!("Unknown timezone '{}': {e}", self.offset.timezone))
                })?;
                Ok(Box::new(TzdbOffsetRule::new(tz)))
            }
        }
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> PlancalResult<()> {
        let contents = format!(
            "\
# plancal configuration

# Timetable endpoint and reporting period:
# endpoint = \"{DEFAULT_ENDPOINT}\"
# period = {DEFAULT_PERIOD}

# Group directory (JSON) and output folder for .ics files:
# directory = \"{DEFAULT_DIRECTORY}\"
# schedules_dir = \"{DEFAULT_SCHEDULES_DIR}\"

# Language classes are only kept for this group:
# language_center_group = \"{DEFAULT_LANGUAGE_CENTER_GROUP}\"
# language_class_label = \"{DEFAULT_LANGUAGE_CLASS_LABEL}\"

# Rows with a blank date continue the previous row's date:
# continue_blank_dates = false

# Give up on a request after this many seconds (no timeout by default):
# request_timeout_secs = 60

# [offset]
# rule = \"seasonal\"   # or \"tzdb\"
# winter_hours = 1
# summer_hours = 2
# timezone = \"{DEFAULT_TIMEZONE}\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PlancalError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| PlancalError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

fn expand_tilde(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = PlancalConfig::load_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.period, 3);
        assert_eq!(cfg.language_class_label, "lektorat");
        assert_eq!(cfg.offset.rule, OffsetRuleKind::Seasonal);
        assert!(!cfg.continue_blank_dates);
    }

    #[test]
    fn test_template_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        PlancalConfig::create_default_config(&path).unwrap();

        let cfg = PlancalConfig::load_from(&path).unwrap();
        assert_eq!(cfg.schedules_dir, PathBuf::from("schedules"));
        assert_eq!(cfg.offset.summer_hours, 2);
    }

    #[test]
    fn test_file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "period = 5\nschedules_dir = \"out\"\n\n[offset]\nrule = \"tzdb\"\ntimezone = \"Europe/Berlin\"\n",
        )
        .unwrap();

        let cfg = PlancalConfig::load_from(&path).unwrap();
        assert_eq!(cfg.period, 5);
        assert_eq!(cfg.schedules_dir, PathBuf::from("out"));
        assert_eq!(cfg.offset.rule, OffsetRuleKind::Tzdb);
        assert!(cfg.offset_rule().is_ok());
    }

    #[test]
    fn test_unknown_timezone_is_config_error() {
        let mut cfg = PlancalConfig::default();
        cfg.offset.rule = OffsetRuleKind::Tzdb;
        cfg.offset.timezone = "Mars/Olympus".to_string();

        assert!(matches!(cfg.offset_rule(), Err(PlancalError::Config(_))));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "period = 5\nlanguage_class_label = \"lektorat\"\n\n[offset]\nrule = \"seasonal\"\n",
        )
        .unwrap();

        // SAFETY: only this test reads variables with this prefix.
        unsafe {
            std::env::set_var("PLANCALENVTEST_PERIOD", "7");
            std::env::set_var("PLANCALENVTEST_OFFSET__RULE", "tzdb");
            std::env::set_var("PLANCALENVTEST_OFFSET__SUMMER_HOURS", "3");
        }

        let cfg = PlancalConfig::load_with_env(&path, "PLANCALENVTEST").unwrap();

        unsafe {
            std::env::remove_var("PLANCALENVTEST_PERIOD");
            std::env::remove_var("PLANCALENVTEST_OFFSET__RULE");
            std::env::remove_var("PLANCALENVTEST_OFFSET__SUMMER_HOURS");
        }

        assert_eq!(cfg.period, 7);
        assert_eq!(cfg.offset.rule, OffsetRuleKind::Tzdb);
        assert_eq!(cfg.offset.summer_hours, 3);
        assert_eq!(cfg.offset.winter_hours, 1);
        assert_eq!(cfg.language_class_label, "lektorat");
    }
}
