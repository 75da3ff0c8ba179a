use std::str::FromStr;

use anyhow::Context;
use serde::Deserialize;
use time::{macros::format_description, UtcOffset};
use tracing::warn;

/// Bounds applied to every uploaded meal photo.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageConfig {
    pub max_edge: u32,
    pub quality: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            max_edge: 520,
            quality: 80,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Postgres connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
    pub storage_capacity_bytes: usize,
    pub image: ImageConfig,
    /// Decides which calendar day "today" is for entries logged without a date.
    pub utc_offset: UtcOffset,
}

pub const DEFAULT_STORAGE_CAPACITY: usize = 5 * 1024 * 1024;

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let defaults = ImageConfig::default();
        let image = ImageConfig {
            max_edge: env_or("IMAGE_MAX_EDGE", defaults.max_edge),
            quality: env_or("IMAGE_QUALITY", defaults.quality).clamp(1, 100),
        };
        anyhow::ensure!(image.max_edge > 0, "IMAGE_MAX_EDGE must be positive");
        let utc_offset = match std::env::var("APP_UTC_OFFSET").ok().filter(|v| !v.trim().is_empty()) {
            Some(raw) => parse_offset(&raw)?,
            None => UtcOffset::current_local_offset().unwrap_or_else(|e| {
                warn!(error = %e, "local UTC offset unknown, dates follow UTC; set APP_UTC_OFFSET");
                UtcOffset::UTC
            }),
        };
        Ok(Self {
            database_url,
            storage_capacity_bytes: env_or("STORAGE_CAPACITY_BYTES", DEFAULT_STORAGE_CAPACITY),
            image,
            utc_offset,
        })
    }
}

/// Parses `+08:00` / `-05:30` style offsets.
fn parse_offset(raw: &str) -> anyhow::Result<UtcOffset> {
    UtcOffset::parse(
        raw.trim(),
        format_description!("[offset_hour sign:mandatory]:[offset_minute]"),
    )
    .with_context(|| format!("APP_UTC_OFFSET `{}` is not like +08:00", raw))
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            storage_capacity_bytes: DEFAULT_STORAGE_CAPACITY,
            image: ImageConfig::default(),
            utc_offset: UtcOffset::UTC,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    parse_or(std::env::var(key).ok().as_deref(), default)
}

fn parse_or<T: FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn parse_or_falls_back_on_garbage() {
        assert_eq!(parse_or::<u32>(Some("640"), 520), 640);
        assert_eq!(parse_or::<u32>(Some(" 640 "), 520), 640);
        assert_eq!(parse_or::<u32>(Some("big"), 520), 520);
        assert_eq!(parse_or::<u32>(None, 520), 520);
    }

    #[test]
    fn defaults_match_photo_bounds() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.image.max_edge, 520);
        assert_eq!(cfg.image.quality, 80);
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.utc_offset, UtcOffset::UTC);
    }

    #[test]
    fn offsets_parse_with_sign() {
        assert_eq!(parse_offset("+08:00").unwrap().whole_hours(), 8);
        assert_eq!(parse_offset(" -05:30 ").unwrap().whole_minutes(), -330);
        assert!(parse_offset("8").is_err());
        assert!(parse_offset("UTC+8").is_err());
    }
}
