//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{path::PathBuf, str::FromStr};

use chrono_tz::Tz;
use clap::Parser;
use config::{Config, Environment, File};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::{
    domain::document::HeadingLevel,
    util::timezone::{DEFAULT_DATE_PATTERN, ZonedDateFormatter},
};

pub use cli::{
    ArticleArgs, CliArgs, Command, CommonOverrides, OutputFormat, RenderFileArgs, RenderOverrides,
    TocArgs,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "quire";
const ENV_PREFIX: &str = "QUIRE";
const DEFAULT_STORE_ROOT: &str = "content";
const DEFAULT_TIMEZONE: &str = "UTC";
const DEFAULT_ASSET_SCHEME: &str = "https";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub render: RenderSettings,
    pub store: StoreSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub date_pattern: String,
    pub timezone: Tz,
    pub asset_scheme: String,
    pub toc_levels: Vec<HeadingLevel>,
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub root: PathBuf,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("render.toc_levels"),
    );

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(cli.command.overrides());

    Settings::from_raw(raw)
}

/// Resolve configuration using the process arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    render: RawRenderSettings,
    store: RawStoreSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &CommonOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(root) = overrides.store_root.as_ref() {
            self.store.root = Some(root.clone());
        }

        self.apply_render_overrides(&overrides.render);
    }

    fn apply_render_overrides(&mut self, overrides: &RenderOverrides) {
        if let Some(pattern) = overrides.date_pattern.as_ref() {
            self.render.date_pattern = Some(pattern.clone());
        }
        if let Some(timezone) = overrides.timezone.as_ref() {
            self.render.timezone = Some(timezone.clone());
        }
        if let Some(scheme) = overrides.asset_scheme.as_ref() {
            self.render.asset_scheme = Some(scheme.clone());
        }
        if let Some(levels) = overrides.toc_levels.as_ref() {
            self.render.toc_levels = Some(levels.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            render,
            store,
        } = raw;

        let logging = build_logging_settings(logging)?;
        let render = build_render_settings(render)?;
        let store = build_store_settings(store)?;

        Ok(Self {
            logging,
            render,
            store,
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::WARN,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_render_settings(render: RawRenderSettings) -> Result<RenderSettings, LoadError> {
    let date_pattern = render
        .date_pattern
        .unwrap_or_else(|| DEFAULT_DATE_PATTERN.to_string());

    let timezone_name = render
        .timezone
        .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
    let timezone = Tz::from_str(timezone_name.trim()).map_err(|err| {
        LoadError::invalid("render.timezone", format!("`{timezone_name}`: {err}"))
    })?;

    ZonedDateFormatter::new(&date_pattern, timezone)
        .map_err(|err| LoadError::invalid("render.date_pattern", err.to_string()))?;

    let asset_scheme = render
        .asset_scheme
        .unwrap_or_else(|| DEFAULT_ASSET_SCHEME.to_string());
    if asset_scheme.trim().trim_end_matches(':').is_empty() {
        return Err(LoadError::invalid(
            "render.asset_scheme",
            "scheme must not be empty",
        ));
    }

    let toc_levels = match render.toc_levels {
        Some(levels) => parse_toc_levels(&levels)?,
        None => HeadingLevel::ALL.to_vec(),
    };

    Ok(RenderSettings {
        date_pattern,
        timezone,
        asset_scheme,
        toc_levels,
    })
}

fn parse_toc_levels(levels: &[u8]) -> Result<Vec<HeadingLevel>, LoadError> {
    if levels.is_empty() {
        return Err(LoadError::invalid(
            "render.toc_levels",
            "at least one heading level is required",
        ));
    }

    levels
        .iter()
        .map(|&level| {
            HeadingLevel::from_u8(level).ok_or_else(|| {
                LoadError::invalid(
                    "render.toc_levels",
                    format!("heading level {level} is outside 2..=6"),
                )
            })
        })
        .collect()
}

fn build_store_settings(store: RawStoreSettings) -> Result<StoreSettings, LoadError> {
    let root = store
        .root
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_ROOT));
    if root.as_os_str().is_empty() {
        return Err(LoadError::invalid("store.root", "path must not be empty"));
    }

    Ok(StoreSettings { root })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRenderSettings {
    date_pattern: Option<String>,
    timezone: Option<String>,
    asset_scheme: Option<String>,
    #[serde(deserialize_with = "levels_from_list_or_number")]
    toc_levels: Option<Vec<u8>>,
}

/// The environment layer yields a bare number for a single level and a list otherwise.
fn levels_from_list_or_number<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Levels {
        One(u8),
        Many(Vec<u8>),
    }

    Ok(Some(match Levels::deserialize(deserializer)? {
        Levels::One(level) => vec![level],
        Levels::Many(levels) => levels,
    }))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStoreSettings {
    root: Option<PathBuf>,
}
